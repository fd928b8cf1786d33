// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catalog sync model.
//!
//! Holds one subscription to the product collection and republishes the
//! normalized product list on every snapshot. Each snapshot replaces the
//! list wholesale; nothing is diffed or patched.

use crate::db::{DocumentStore, Snapshot};
use crate::models::{Category, Product};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub use crate::error::LOAD_FAILED;

/// Current state of the catalog projection.
#[derive(Debug, Clone)]
pub enum CatalogState {
    /// No snapshot received yet
    Loading,
    /// Latest snapshot, normalized
    Ready(Arc<Vec<Product>>),
    /// Subscription failed; `last` is the last list received before that
    Failed {
        message: String,
        last: Arc<Vec<Product>>,
    },
}

impl CatalogState {
    /// The products currently known, whatever the state.
    pub fn products(&self) -> Arc<Vec<Product>> {
        match self {
            CatalogState::Loading => Arc::new(Vec::new()),
            CatalogState::Ready(products) => products.clone(),
            CatalogState::Failed { last, .. } => last.clone(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, CatalogState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CatalogState::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Normalize a full snapshot into the product list.
pub fn normalize_snapshot(snapshot: &Snapshot) -> Vec<Product> {
    snapshot.documents.iter().map(Product::from_raw).collect()
}

/// Live projection of the product collection.
///
/// Dropping the model (or calling `shutdown`) cancels the subscription.
pub struct CatalogSync {
    state: watch::Receiver<CatalogState>,
    task: JoinHandle<()>,
}

impl CatalogSync {
    /// Subscribe to the product collection and start consuming snapshots.
    pub fn start(store: Arc<dyn DocumentStore>) -> Self {
        let (tx, rx) = watch::channel(CatalogState::Loading);
        let task = tokio::spawn(run(store, tx));
        Self { state: rx, task }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn watch(&self) -> watch::Receiver<CatalogState> {
        self.state.clone()
    }

    pub fn products(&self) -> Arc<Vec<Product>> {
        self.state.borrow().products()
    }

    pub fn product(&self, key: &str) -> Option<Product> {
        self.products().iter().find(|p| p.key == key).cloned()
    }

    /// Products in one category (catalog grid filters and category pages).
    pub fn by_category(&self, category: &Category) -> Vec<Product> {
        self.products()
            .iter()
            .filter(|p| &p.category == category)
            .cloned()
            .collect()
    }

    /// Products flagged as new arrivals.
    pub fn new_arrivals(&self) -> Vec<Product> {
        self.products()
            .iter()
            .filter(|p| p.is_new)
            .cloned()
            .collect()
    }

    /// Stop consuming snapshots and release the subscription.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for CatalogSync {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Consume the subscription until it ends or fails.
async fn run(store: Arc<dyn DocumentStore>, tx: watch::Sender<CatalogState>) {
    let mut snapshots = match store.subscribe_products().await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(error = %e, "Error subscribing to products");
            mark_failed(&tx);
            return;
        }
    };

    while let Some(item) = snapshots.next().await {
        match item {
            Ok(snapshot) => {
                let products = normalize_snapshot(&snapshot);
                tracing::debug!(count = products.len(), "Catalog snapshot applied");
                tx.send_replace(CatalogState::Ready(Arc::new(products)));
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching products");
                mark_failed(&tx);
                return;
            }
        }
    }

    tracing::debug!("Product subscription ended");
}

fn mark_failed(tx: &watch::Sender<CatalogState>) {
    tx.send_modify(|state| {
        let last = state.products();
        *state = CatalogState::Failed {
            message: LOAD_FAILED.to_string(),
            last,
        };
    });
}
