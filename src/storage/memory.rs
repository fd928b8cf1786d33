// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process blob store that records every call.

use crate::error::AppError;
use crate::storage::BlobStore;
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::Mutex;

const URL_SCHEME: &str = "memory://";

/// In-memory blob store.
///
/// URLs have the form `memory://{path}`. Upload and delete attempts are
/// logged in call order so tests can assert on side effects.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: DashMap<String, Vec<u8>>,
    failing_uploads: DashSet<String>,
    failing_deletes: DashSet<String>,
    uploads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL an object at `path` is served from.
    pub fn url_for(path: &str) -> String {
        format!("{}{}", URL_SCHEME, path)
    }

    /// Make uploads whose file name contains `needle` fail.
    pub fn fail_uploads_matching(&self, needle: &str) {
        self.failing_uploads.insert(needle.to_string());
    }

    /// Make deleting `url` fail.
    pub fn fail_delete(&self, url: &str) {
        self.failing_deletes.insert(url.to_string());
    }

    /// Paths of every upload attempt, in order.
    pub fn upload_attempts(&self) -> Vec<String> {
        lock(&self.uploads).clone()
    }

    /// URLs of every delete attempt, in order.
    pub fn delete_attempts(&self) -> Vec<String> {
        lock(&self.deletes).clone()
    }

    pub fn contains(&self, url: &str) -> bool {
        url.strip_prefix(URL_SCHEME)
            .is_some_and(|path| self.objects.contains_key(path))
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        path: &str,
        data: &[u8],
        _content_type: &str,
    ) -> Result<String, AppError> {
        lock(&self.uploads).push(path.to_string());

        if self
            .failing_uploads
            .iter()
            .any(|needle| path.contains(needle.as_str()))
        {
            return Err(AppError::Blob(format!("Injected upload failure: {}", path)));
        }

        self.objects.insert(path.to_string(), data.to_vec());
        Ok(Self::url_for(path))
    }

    async fn delete(&self, url: &str) -> Result<(), AppError> {
        lock(&self.deletes).push(url.to_string());

        if self.failing_deletes.contains(url) {
            return Err(AppError::Blob(format!("Injected delete failure: {}", url)));
        }

        let path = url
            .strip_prefix(URL_SCHEME)
            .ok_or_else(|| AppError::Blob(format!("Not a memory URL: {}", url)))?;
        self.objects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| AppError::Blob(format!("No such object: {}", path)))
    }
}
