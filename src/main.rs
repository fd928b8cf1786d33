// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Watch Storefront API Server
//!
//! Serves the live product catalog, product pages and the admin editing
//! workflows backed by Firestore and Firebase Storage.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watch_storefront::{
    config::{Config, StoreBackend},
    db::{DocumentStore, FirestoreDb, MemoryStore},
    storage::{BlobStore, FirebaseStorage, MemoryBlobStore},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.store_backend,
        "Starting Watch Storefront API"
    );

    let (store, blobs) = match config.store_backend {
        StoreBackend::Firestore => {
            let store: Arc<dyn DocumentStore> =
                Arc::new(FirestoreDb::new(&config.gcp_project_id).await?);
            let blobs: Arc<dyn BlobStore> = Arc::new(FirebaseStorage::new(
                &config.storage_base_url,
                &config.storage_bucket,
                config.storage_auth_token.clone(),
            ));
            tracing::info!(bucket = %config.storage_bucket, "Firebase Storage initialized");
            (store, blobs)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory stores; data is lost on exit");
            let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
            let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
            (store, blobs)
        }
    };

    // Build shared state; this also opens the catalog subscription
    let state = Arc::new(AppState::new(config.clone(), store, blobs));

    // Build router
    let app = watch_storefront::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("watch_storefront=debug,info")),
        )
        .with(format)
        .init();
}
