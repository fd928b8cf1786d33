// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Storage client over its REST API.
//!
//! Upload: `POST {base}/v0/b/{bucket}/o?name={path}` with the raw bytes.
//! Download URL: `{base}/v0/b/{bucket}/o/{encoded path}?alt=media&token={token}`.
//! Delete: `DELETE {base}/v0/b/{bucket}/o/{encoded path}`.

use crate::error::AppError;
use crate::storage::BlobStore;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Upload response metadata (only the fields we use).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    /// Comma-separated download tokens
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Firebase Storage client.
#[derive(Clone)]
pub struct FirebaseStorage {
    http: Client,
    base_url: String,
    bucket: String,
    auth_token: Option<String>,
}

impl FirebaseStorage {
    pub fn new(base_url: &str, bucket: &str, auth_token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            auth_token,
        }
    }

    fn objects_url(&self) -> String {
        format!("{}/v0/b/{}/o", self.base_url, self.bucket)
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.objects_url(), urlencoding::encode(path))
    }

    /// Public download URL for an uploaded object.
    fn download_url(&self, path: &str, token: Option<&str>) -> String {
        match token {
            Some(token) => format!(
                "{}?alt=media&token={}",
                self.object_url(path),
                urlencoding::encode(token)
            ),
            None => format!("{}?alt=media", self.object_url(path)),
        }
    }

    /// Recover the object path from a download URL.
    ///
    /// Accepts download URLs for this bucket and `gs://{bucket}/{path}` URLs.
    pub fn path_from_url(&self, url: &str) -> Option<String> {
        if let Some(rest) = url.strip_prefix("gs://") {
            let (bucket, path) = rest.split_once('/')?;
            return (bucket == self.bucket && !path.is_empty()).then(|| path.to_string());
        }

        let prefix = format!("{}/", self.objects_url());
        let encoded = url.strip_prefix(&prefix)?;
        let encoded = encoded.split(['?', '#']).next().unwrap_or_default();
        if encoded.is_empty() {
            return None;
        }
        urlencoding::decode(encoded).ok().map(|p| p.into_owned())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl BlobStore for FirebaseStorage {
    async fn upload(
        &self,
        path: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, AppError> {
        let request = self
            .http
            .post(self.objects_url())
            .query(&[("name", path)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data.to_vec());

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| AppError::Blob(format!("Upload of {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Blob(format!(
                "Upload of {} failed with {}: {}",
                path, status, body
            )));
        }

        let metadata: ObjectMetadata = response
            .json()
            .await
            .map_err(|e| AppError::Blob(format!("Invalid upload response: {}", e)))?;

        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|t| !t.is_empty());

        Ok(self.download_url(&metadata.name, token))
    }

    async fn delete(&self, url: &str) -> Result<(), AppError> {
        let path = self
            .path_from_url(url)
            .ok_or_else(|| AppError::Blob(format!("Not an object URL for this bucket: {}", url)))?;

        let response = self
            .authorize(self.http.delete(self.object_url(&path)))
            .send()
            .await
            .map_err(|e| AppError::Blob(format!("Delete of {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Blob(format!(
                "Delete of {} failed with {}",
                path,
                response.status()
            )));
        }

        tracing::debug!(path = %path, "Deleted blob");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> FirebaseStorage {
        FirebaseStorage::new(
            "https://firebasestorage.googleapis.com/",
            "shop.appspot.com",
            None,
        )
    }

    #[test]
    fn test_download_url_round_trips_to_path() {
        let storage = storage();
        let url = storage.download_url("products/17_front face.jpg", Some("tok-1"));

        assert_eq!(
            url,
            "https://firebasestorage.googleapis.com/v0/b/shop.appspot.com/o/products%2F17_front%20face.jpg?alt=media&token=tok-1"
        );
        assert_eq!(
            storage.path_from_url(&url).as_deref(),
            Some("products/17_front face.jpg")
        );
    }

    #[test]
    fn test_gs_url_accepted_for_same_bucket_only() {
        let storage = storage();
        assert_eq!(
            storage
                .path_from_url("gs://shop.appspot.com/gifts/1_a.png")
                .as_deref(),
            Some("gifts/1_a.png")
        );
        assert_eq!(storage.path_from_url("gs://other/gifts/1_a.png"), None);
    }

    #[test]
    fn test_foreign_url_rejected() {
        let storage = storage();
        assert_eq!(
            storage.path_from_url("https://images.unsplash.com/photo-1"),
            None
        );
    }
}
