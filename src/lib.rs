// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Watch storefront backend.
//!
//! Keeps a live projection of the product catalog from a hosted document
//! store, runs the admin editing workflows for products and reviews, and
//! serves product pages, cart quotes and purchase links over a JSON API.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod time_utils;

use config::Config;
use db::DocumentStore;
use services::{CatalogSync, ProductEditor, ReviewEditor};
use std::sync::Arc;
use storage::BlobStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub catalog: CatalogSync,
}

impl AppState {
    /// Build state and start the catalog subscription.
    pub fn new(config: Config, store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        let catalog = CatalogSync::start(store.clone());
        Self {
            config,
            store,
            blobs,
            catalog,
        }
    }

    pub fn product_editor(&self) -> ProductEditor {
        ProductEditor::new(self.store.clone(), self.blobs.clone())
    }

    pub fn review_editor(&self) -> ReviewEditor {
        ReviewEditor::new(self.store.clone())
    }
}
