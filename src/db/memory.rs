// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Used for local development without credentials and as the test double
//! for the workflows. Every mutation pushes a full snapshot to all live
//! subscribers, matching the hosted store's contract. Failures can be
//! injected per operation class.

use crate::db::{
    collections, new_store_key, DocumentStore, RawDocument, Snapshot, SnapshotStream,
};
use crate::error::AppError;
use crate::models::{ProductPatch, ProductRecord, ReviewRecord};
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

type Subscriber = mpsc::UnboundedSender<Result<Snapshot, AppError>>;

#[derive(Default)]
struct Inner {
    docs: Mutex<BTreeMap<String, Value>>,
    subscribers: Mutex<Vec<Subscriber>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_subscribe: AtomicBool,
    write_count: AtomicUsize,
}

/// In-memory document store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw document as-is (e.g. legacy shapes) and notify subscribers.
    pub fn insert_raw(&self, key: &str, document: Value) {
        let mut docs = self.docs();
        docs.insert(key.to_string(), document);
        self.broadcast(&docs);
    }

    /// Current raw value of a document.
    pub fn document(&self, key: &str) -> Option<Value> {
        self.docs().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.docs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs().is_empty()
    }

    /// Number of successful write operations so far.
    pub fn write_count(&self) -> usize {
        self.inner.write_count.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_subscribe(&self, fail: bool) {
        self.inner.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    /// Terminate every live subscription with an error.
    pub fn break_subscriptions(&self, message: &str) {
        let subscribers = std::mem::take(&mut *self.subscribers());
        for tx in subscribers {
            let _ = tx.send(Err(AppError::Store(message.to_string())));
        }
    }

    /// Number of subscriptions whose receiving side is still alive.
    pub fn live_subscriptions(&self) -> usize {
        let mut subscribers = self.subscribers();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }

    fn docs(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.inner
            .docs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_reads(&self) -> Result<(), AppError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Store("Injected read failure".to_string()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), AppError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Store("Injected write failure".to_string()));
        }
        Ok(())
    }

    /// Push the snapshot of `docs` to every subscriber.
    ///
    /// Called with the documents lock held so snapshots arrive in write order.
    fn broadcast(&self, docs: &BTreeMap<String, Value>) {
        let snapshot = snapshot_of(docs);
        self.subscribers()
            .retain(|tx| tx.send(Ok(snapshot.clone())).is_ok());
    }

    /// Apply a mutation to an existing document and notify.
    fn mutate<F>(&self, key: &str, f: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        self.check_writes()?;
        let mut docs = self.docs();
        let doc = docs
            .get_mut(key)
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", key)))?;
        if !doc.is_object() {
            *doc = Value::Object(Map::new());
        }
        if let Value::Object(fields) = doc {
            f(fields);
        }
        self.inner.write_count.fetch_add(1, Ordering::SeqCst);
        self.broadcast(&docs);
        Ok(())
    }
}

fn snapshot_of(docs: &BTreeMap<String, Value>) -> Snapshot {
    Snapshot {
        documents: docs
            .iter()
            .map(|(key, value)| RawDocument {
                key: key.clone(),
                fields: value.as_object().cloned().unwrap_or_default(),
            })
            .collect(),
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))
}

fn reviews_map(fields: &mut Map<String, Value>) -> &mut Map<String, Value> {
    let reviews = fields
        .entry(collections::REVIEWS_FIELD)
        .or_insert_with(|| Value::Object(Map::new()));
    if !reviews.is_object() {
        *reviews = Value::Object(Map::new());
    }
    match reviews {
        Value::Object(map) => map,
        _ => unreachable!("reviews was just replaced with an object"),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn subscribe_products(&self) -> Result<SnapshotStream, AppError> {
        if self.inner.fail_subscribe.load(Ordering::SeqCst) {
            return Err(AppError::Store("Injected subscribe failure".to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        {
            let docs = self.docs();
            // Initial state goes out before any later change can.
            let _ = tx.send(Ok(snapshot_of(&docs)));
            self.subscribers().push(tx);
        }

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(stream.boxed())
    }

    async fn get_product(&self, key: &str) -> Result<Option<RawDocument>, AppError> {
        self.check_reads()?;
        Ok(self.docs().get(key).map(|value| RawDocument {
            key: key.to_string(),
            fields: value.as_object().cloned().unwrap_or_default(),
        }))
    }

    async fn push_product(&self, product: &ProductRecord) -> Result<String, AppError> {
        let value = to_value(product)?;
        self.check_writes()?;
        let key = new_store_key();
        let mut docs = self.docs();
        docs.insert(key.clone(), value);
        self.inner.write_count.fetch_add(1, Ordering::SeqCst);
        self.broadcast(&docs);
        Ok(key)
    }

    async fn update_product(&self, key: &str, patch: &ProductPatch) -> Result<(), AppError> {
        let value = to_value(patch)?;
        self.mutate(key, |fields| {
            if let Value::Object(changes) = value {
                for (name, v) in changes {
                    fields.insert(name, v);
                }
            }
        })
    }

    async fn remove_product(&self, key: &str) -> Result<(), AppError> {
        self.check_writes()?;
        let mut docs = self.docs();
        docs.remove(key);
        self.inner.write_count.fetch_add(1, Ordering::SeqCst);
        self.broadcast(&docs);
        Ok(())
    }

    async fn push_review(
        &self,
        product_key: &str,
        review: &ReviewRecord,
    ) -> Result<String, AppError> {
        let value = to_value(review)?;
        let review_key = new_store_key();
        self.mutate(product_key, |fields| {
            reviews_map(fields).insert(review_key.clone(), value);
        })?;
        Ok(review_key)
    }

    async fn set_review(
        &self,
        product_key: &str,
        review_key: &str,
        review: &ReviewRecord,
    ) -> Result<(), AppError> {
        let value = to_value(review)?;
        self.mutate(product_key, |fields| {
            reviews_map(fields).insert(review_key.to_string(), value);
        })
    }

    async fn remove_review(&self, product_key: &str, review_key: &str) -> Result<(), AppError> {
        self.mutate(product_key, |fields| {
            if let Some(Value::Object(reviews)) = fields.get_mut(collections::REVIEWS_FIELD) {
                reviews.remove(review_key);
            }
        })
    }
}
