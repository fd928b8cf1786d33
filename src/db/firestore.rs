// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing the product document store.
//!
//! Layout:
//! - `products/{key}`: one document per product
//! - `reviews`: map field inside each product, keyed by review key
//!
//! Subscriptions attach a Firestore listen target to the collection. Every
//! change event marks the collection dirty; a pump task then re-reads the
//! whole collection and delivers it as one snapshot, coalescing bursts.

use crate::db::{
    collections, new_store_key, DocumentStore, RawDocument, Snapshot, SnapshotStream,
};
use crate::error::AppError;
use crate::models::{ProductPatch, ProductRecord, ReviewRecord};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::{
    FirestoreListenerTarget, FirestoreMemListenStateStorage, FirestoreWritePrecondition,
};
use futures_util::{stream, StreamExt};
use gcloud_sdk::google::firestore::v1::Document;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

/// Listen target id for the product collection subscription.
const PRODUCTS_TARGET_ID: u32 = 17;

/// Map-field wrapper used for single-review writes.
#[derive(Serialize, Deserialize)]
struct ReviewsPatch {
    reviews: BTreeMap<String, ReviewRecord>,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Store(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| AppError::Store(format!("Failed to connect to Firestore Emulator: {}", e)))?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Store("Database not connected (offline mode)".to_string()))
    }

    /// Read the whole product collection.
    async fn read_snapshot(&self) -> Result<Snapshot, AppError> {
        let documents = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::PRODUCTS)
            .query()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        let documents = documents
            .iter()
            .map(to_raw_document)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Snapshot { documents })
    }

    /// Write a subset of a product's fields, named by Firestore field paths.
    ///
    /// The product must already exist; a missing document is `NotFound`
    /// rather than being created by the write.
    async fn update_fields<T>(
        &self,
        key: &str,
        fields: Vec<String>,
        object: &T,
    ) -> Result<(), AppError>
    where
        T: Serialize + Sync + Send,
        for<'de> T: Deserialize<'de>,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::PRODUCTS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(key)
            .object(object)
            .execute()
            .await
            .map_err(|e| update_error(key, e))?;
        Ok(())
    }
}

/// Map a failed product update, reporting a missing document as `NotFound`.
fn update_error(key: &str, err: FirestoreError) -> AppError {
    match err {
        FirestoreError::DataNotFoundError(_) => {
            AppError::NotFound(format!("Product {} not found", key))
        }
        other => AppError::Store(other.to_string()),
    }
}

/// Field path of one entry in a product's review map.
///
/// Legacy keys may contain characters outside `[A-Za-z0-9_]`, so the
/// segment is always backquoted.
fn review_field_path(review_key: &str) -> String {
    let escaped = review_key.replace('\\', "\\\\").replace('`', "\\`");
    format!("{}.`{}`", collections::REVIEWS_FIELD, escaped)
}

/// Convert a Firestore document into a keyed raw document.
fn to_raw_document(doc: &Document) -> Result<RawDocument, AppError> {
    let key = doc
        .name
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();

    let value: Value = firestore::FirestoreDb::deserialize_doc_to(doc)
        .map_err(|e| AppError::Store(format!("Failed to decode document {}: {}", key, e)))?;

    let mut fields = match value {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    // Drop metadata injected by the deserializer.
    fields.retain(|name, _| !name.starts_with("_firestore"));

    Ok(RawDocument { key, fields })
}

#[async_trait]
impl DocumentStore for FirestoreDb {
    async fn subscribe_products(&self) -> Result<SnapshotStream, AppError> {
        let client = self.get_client()?.clone();

        let mut listener = client
            .create_listener(FirestoreMemListenStateStorage::new())
            .await
            .map_err(|e| AppError::Store(format!("Failed to create listener: {}", e)))?;

        client
            .fluent()
            .select()
            .from(collections::PRODUCTS)
            .listen()
            .add_target(FirestoreListenerTarget::new(PRODUCTS_TARGET_ID), &mut listener)
            .map_err(|e| AppError::Store(format!("Failed to add listen target: {}", e)))?;

        let dirty = Arc::new(Notify::new());
        let on_event = dirty.clone();
        listener
            .start(move |_event| {
                on_event.notify_one();
                async move { Ok(()) }
            })
            .await
            .map_err(|e| AppError::Store(format!("Failed to start listener: {}", e)))?;

        tracing::info!(collection = collections::PRODUCTS, "Product subscription started");

        let (tx, rx) = mpsc::unbounded_channel();
        let db = self.clone();
        tokio::spawn(async move {
            // Initial state, then one full re-read per burst of changes.
            let mut pending = true;
            loop {
                if !pending {
                    tokio::select! {
                        _ = dirty.notified() => {}
                        _ = tx.closed() => break,
                    }
                }
                pending = false;

                let snapshot = db.read_snapshot().await;
                let failed = snapshot.is_err();
                if tx.send(snapshot).is_err() || failed {
                    break;
                }
            }

            if let Err(e) = listener.shutdown().await {
                tracing::warn!(error = %e, "Failed to shut down product listener");
            }
            tracing::debug!("Product subscription closed");
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(stream.boxed())
    }

    async fn get_product(&self, key: &str) -> Result<Option<RawDocument>, AppError> {
        let doc = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PRODUCTS)
            .one(key)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        doc.as_ref().map(to_raw_document).transpose()
    }

    async fn push_product(&self, product: &ProductRecord) -> Result<String, AppError> {
        let key = new_store_key();
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::PRODUCTS)
            .document_id(&key)
            .object(product)
            .execute()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        tracing::debug!(key = %key, "Product document created");
        Ok(key)
    }

    async fn update_product(&self, key: &str, patch: &ProductPatch) -> Result<(), AppError> {
        let fields = patch
            .field_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.update_fields(key, fields, patch).await
    }

    async fn remove_product(&self, key: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::PRODUCTS)
            .document_id(key)
            .execute()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(())
    }

    async fn push_review(
        &self,
        product_key: &str,
        review: &ReviewRecord,
    ) -> Result<String, AppError> {
        let review_key = new_store_key();
        self.set_review(product_key, &review_key, review).await?;
        Ok(review_key)
    }

    async fn set_review(
        &self,
        product_key: &str,
        review_key: &str,
        review: &ReviewRecord,
    ) -> Result<(), AppError> {
        let patch = ReviewsPatch {
            reviews: BTreeMap::from([(review_key.to_string(), review.clone())]),
        };
        self.update_fields(product_key, vec![review_field_path(review_key)], &patch)
            .await
    }

    async fn remove_review(&self, product_key: &str, review_key: &str) -> Result<(), AppError> {
        // A masked field absent from the written object is deleted.
        let patch = ReviewsPatch {
            reviews: BTreeMap::new(),
        };
        self.update_fields(product_key, vec![review_field_path(review_key)], &patch)
            .await
    }
}
