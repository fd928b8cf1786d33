// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with FIRESTORE_EMULATOR_HOST pointing at a local emulator.
//!
//! Products are created under fresh keys, so tests can share one emulator.

use futures_util::StreamExt;
use std::collections::BTreeMap;
use std::time::Duration;
use watch_storefront::db::DocumentStore;
use watch_storefront::models::{Gift, Product, ProductPatch, ProductRecord, ReviewRecord};

mod common;
use common::test_db;

fn record(name: &str) -> ProductRecord {
    ProductRecord {
        name: name.to_string(),
        category: "Luxury".to_string(),
        price: 45000.0,
        description: "Steel".to_string(),
        warranty: "2 years".to_string(),
        images: vec!["https://img/1".to_string()],
        gift: Gift {
            name: "Box".to_string(),
            value: 10.0,
            image: String::new(),
        },
        is_new: false,
        reviews: BTreeMap::new(),
        num_reviews_to_show: 5,
        bullet_points: vec!["A".to_string(), "B".to_string()],
    }
}

async fn load(db: &watch_storefront::db::FirestoreDb, key: &str) -> Product {
    let doc = db
        .get_product(key)
        .await
        .unwrap()
        .expect("product should exist");
    Product::from_raw(&doc)
}

#[tokio::test]
async fn test_product_create_update_remove() {
    require_emulator!();

    let db = test_db().await;
    let key = db.push_product(&record("Royal Oak")).await.unwrap();

    let product = load(&db, &key).await;
    assert_eq!(product.name, "Royal Oak");
    assert_eq!(product.bullet_points, vec!["A", "B"]);
    assert!(product.reviews.is_empty());

    let patch = ProductPatch {
        name: "Royal Oak Jumbo".to_string(),
        category: "Luxury".to_string(),
        price: 50000.0,
        description: "Steel".to_string(),
        warranty: "2 years".to_string(),
        num_reviews_to_show: 3,
        gift: product.gift.clone(),
        bullet_points: vec!["C".to_string()],
        images: None,
    };
    db.update_product(&key, &patch).await.unwrap();

    let product = load(&db, &key).await;
    assert_eq!(product.name, "Royal Oak Jumbo");
    assert_eq!(product.images, vec!["https://img/1"]);
    assert_eq!(product.num_reviews_to_show, 3);

    db.remove_product(&key).await.unwrap();
    assert!(db.get_product(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn test_review_writes_touch_only_their_entry() {
    require_emulator!();

    let db = test_db().await;
    let key = db.push_product(&record("Nautilus")).await.unwrap();

    let alice = ReviewRecord::admin(
        "uuid-a".into(),
        "Alice".into(),
        5,
        "Great".into(),
        false,
        "2024-01-01T00:00:00.000Z".into(),
    );
    let bob = ReviewRecord::customer(
        "1700000000000".into(),
        "Bob".into(),
        4,
        "Nice".into(),
        "2024-01-02T00:00:00.000Z".into(),
    );
    let alice_key = db.push_review(&key, &alice).await.unwrap();
    let bob_key = db.push_review(&key, &bob).await.unwrap();

    let product = load(&db, &key).await;
    let authors: Vec<&str> = product.reviews.iter().map(|r| r.author.as_str()).collect();
    assert_eq!(authors, vec!["Alice", "Bob"]);

    let mut edited = alice.clone();
    edited.rating = 2;
    db.set_review(&key, &alice_key, &edited).await.unwrap();
    db.remove_review(&key, &bob_key).await.unwrap();

    let product = load(&db, &key).await;
    assert_eq!(product.reviews.len(), 1);
    assert_eq!(product.reviews[0].rating, 2);
    assert_eq!(product.reviews[0].id, "uuid-a");
    assert_eq!(product.name, "Nautilus");

    db.remove_product(&key).await.unwrap();
}

#[tokio::test]
async fn test_subscription_delivers_full_snapshots() {
    require_emulator!();

    let db = test_db().await;
    let mut snapshots = db.subscribe_products().await.unwrap();

    let first = tokio::time::timeout(Duration::from_secs(10), snapshots.next())
        .await
        .expect("no initial snapshot")
        .unwrap()
        .unwrap();

    let key = db.push_product(&record("Daytona")).await.unwrap();
    assert!(!first.documents.iter().any(|d| d.key == key));

    let seen = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(snapshot) = snapshots.next().await {
            let snapshot = snapshot.unwrap();
            if snapshot.documents.iter().any(|d| d.key == key) {
                return true;
            }
        }
        false
    })
    .await
    .expect("timed out waiting for snapshot");
    assert!(seen);

    drop(snapshots);
    db.remove_product(&key).await.unwrap();
}

#[tokio::test]
async fn test_writes_to_missing_product_do_not_create_it() {
    require_emulator!();

    let db = test_db().await;
    let key = db.push_product(&record("Speedmaster")).await.unwrap();
    db.remove_product(&key).await.unwrap();

    let review = ReviewRecord::customer(
        "1700000000000".into(),
        "Bob".into(),
        5,
        "Late".into(),
        "2024-01-02T00:00:00.000Z".into(),
    );
    let err = db.push_review(&key, &review).await.unwrap_err();
    assert!(matches!(err, watch_storefront::error::AppError::NotFound(_)));

    let patch = ProductPatch {
        name: "Ghost".to_string(),
        category: "Sport".to_string(),
        price: 1.0,
        description: String::new(),
        warranty: String::new(),
        num_reviews_to_show: 5,
        gift: Gift::default(),
        bullet_points: vec![],
        images: None,
    };
    let err = db.update_product(&key, &patch).await.unwrap_err();
    assert!(matches!(err, watch_storefront::error::AppError::NotFound(_)));

    assert!(db.get_product(&key).await.unwrap().is_none());
}
