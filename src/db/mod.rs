//! Document store layer.
//!
//! The catalog lives in one collection of product documents, each carrying
//! its reviews as a keyed map. Consumers always receive complete snapshots
//! of that collection, never deltas.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{ProductPatch, ProductRecord, ReviewRecord};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde_json::{Map, Value};

/// Collection names as constants.
pub mod collections {
    pub const PRODUCTS: &str = "products";
    /// Map field inside a product document holding its reviews
    pub const REVIEWS_FIELD: &str = "reviews";
}

/// A stored document with its key, fields left unparsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub key: String,
    pub fields: Map<String, Value>,
}

/// The complete product collection at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub documents: Vec<RawDocument>,
}

/// Stream of full snapshots. An `Err` item ends the subscription.
pub type SnapshotStream = BoxStream<'static, Result<Snapshot, AppError>>;

/// Hosted document store holding the product collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Subscribe to the product collection.
    ///
    /// The current state is delivered first, then one full snapshot per
    /// remote change. Dropping the stream unsubscribes.
    async fn subscribe_products(&self) -> Result<SnapshotStream, AppError>;

    /// One-time read of a single product document.
    async fn get_product(&self, key: &str) -> Result<Option<RawDocument>, AppError>;

    /// Append a product, returning its generated key.
    async fn push_product(&self, product: &ProductRecord) -> Result<String, AppError>;

    /// Replace the fields named by the patch on an existing product.
    async fn update_product(&self, key: &str, patch: &ProductPatch) -> Result<(), AppError>;

    async fn remove_product(&self, key: &str) -> Result<(), AppError>;

    /// Append a review under a product, returning its generated key.
    async fn push_review(
        &self,
        product_key: &str,
        review: &ReviewRecord,
    ) -> Result<String, AppError>;

    /// Overwrite the review stored under `review_key`.
    async fn set_review(
        &self,
        product_key: &str,
        review_key: &str,
        review: &ReviewRecord,
    ) -> Result<(), AppError>;

    async fn remove_review(&self, product_key: &str, review_key: &str) -> Result<(), AppError>;
}

/// Generate a document/map key.
///
/// Keys start with a letter and are alphanumeric so they are valid as
/// unquoted field path segments.
pub fn new_store_key() -> String {
    format!("k{}", uuid::Uuid::new_v4().simple())
}
