// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::Response;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use watch_storefront::config::Config;
use watch_storefront::db::{DocumentStore, FirestoreDb, MemoryStore};
use watch_storefront::models::FileUpload;
use watch_storefront::routes::create_router;
use watch_storefront::services::{CatalogState, CatalogSync};
use watch_storefront::storage::{BlobStore, MemoryBlobStore};
use watch_storefront::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Fresh in-memory document and blob stores.
#[allow(dead_code)]
pub fn test_stores() -> (MemoryStore, Arc<MemoryBlobStore>) {
    (MemoryStore::new(), Arc::new(MemoryBlobStore::new()))
}

#[allow(dead_code)]
pub fn dyn_store(store: &MemoryStore) -> Arc<dyn DocumentStore> {
    Arc::new(store.clone())
}

#[allow(dead_code)]
pub fn dyn_blobs(blobs: &Arc<MemoryBlobStore>) -> Arc<dyn BlobStore> {
    blobs.clone()
}

/// Test app wired to in-memory stores.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: MemoryStore,
    pub blobs: Arc<MemoryBlobStore>,
}

/// Create a test app with in-memory dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let (store, blobs) = test_stores();
    let state = Arc::new(AppState::new(
        Config::default(),
        dyn_store(&store),
        dyn_blobs(&blobs),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        blobs,
    }
}

/// A small image file.
#[allow(dead_code)]
pub fn image(name: &str) -> FileUpload {
    FileUpload::new(name, "image/jpeg", b"\xff\xd8\xff".to_vec())
}

/// Wait until the catalog state satisfies `pred`, failing after 5 seconds.
#[allow(dead_code)]
pub async fn wait_for_catalog<F>(catalog: &CatalogSync, pred: F) -> CatalogState
where
    F: Fn(&CatalogState) -> bool,
{
    let mut rx = catalog.watch();
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let state = rx.borrow_and_update();
                if pred(&state) {
                    return state.clone();
                }
            }
            rx.changed().await.expect("catalog task ended");
        }
    })
    .await;
    result.expect("Timed out waiting for catalog state")
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
