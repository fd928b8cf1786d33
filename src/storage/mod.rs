// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Blob store for product and gift images.
//!
//! Objects are addressed as `<folder>/<unix-ms>_<filename>`. Uploads return
//! a public URL that is stored verbatim in product documents; deletes are
//! addressed by that same URL.

pub mod firebase;
pub mod memory;

pub use firebase::FirebaseStorage;
pub use memory::MemoryBlobStore;

use crate::error::AppError;
use crate::models::FileUpload;
use async_trait::async_trait;

/// Folder for product images.
pub const PRODUCTS_FOLDER: &str = "products";
/// Folder for gift images.
pub const GIFTS_FOLDER: &str = "gifts";

/// Hosted object storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` at `path`, returning its public download URL.
    async fn upload(&self, path: &str, data: &[u8], content_type: &str)
        -> Result<String, AppError>;

    /// Delete the object behind a URL previously returned by `upload`.
    async fn delete(&self, url: &str) -> Result<(), AppError>;
}

/// Object path for a file uploaded at `unix_ms`.
///
/// Two files with the same name uploaded in the same millisecond collide;
/// the later upload wins.
pub fn blob_path(folder: &str, filename: &str, unix_ms: i64) -> String {
    format!("{}/{}_{}", folder, unix_ms, filename)
}

/// Upload a selected file into `folder`, returning its URL.
pub async fn upload_file(
    blobs: &dyn BlobStore,
    folder: &str,
    file: &FileUpload,
) -> Result<String, AppError> {
    let path = blob_path(
        folder,
        &file.filename,
        crate::time_utils::unix_millis(chrono::Utc::now()),
    );
    let url = blobs.upload(&path, &file.data, &file.content_type).await?;
    tracing::debug!(path = %path, bytes = file.data.len(), "Uploaded blob");
    Ok(url)
}

/// Delete a blob, logging and swallowing any failure.
///
/// Returns whether the delete succeeded.
pub async fn delete_best_effort(blobs: &dyn BlobStore, url: &str, what: &str) -> bool {
    match blobs.delete(url).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Failed to delete {}", what);
            false
        }
    }
}
