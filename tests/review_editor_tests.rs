// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Review editing workflow tests.

use serde_json::json;
use watch_storefront::error::{AppError, ValidationError};
use watch_storefront::models::ReviewOrigin;
use watch_storefront::services::{
    CatalogSync, Confirmation, ReviewEditor, ReviewForm, ReviewFormEvent,
};

mod common;
use common::{dyn_store, test_stores, wait_for_catalog};

fn alice_form(product_key: &str) -> ReviewForm {
    let mut form = ReviewForm::for_product(product_key);
    for event in [
        ReviewFormEvent::SetReviewer("Alice".into()),
        ReviewFormEvent::SetRating(5),
        ReviewFormEvent::SetComment("Great".into()),
        ReviewFormEvent::SetIsFake(false),
    ] {
        form.apply(event);
    }
    form
}

#[tokio::test]
async fn test_create_review_adds_one_entry_seen_by_catalog() {
    let (store, _) = test_stores();
    store.insert_raw("P1", json!({"name": "Royal Oak", "reviews": {}}));
    let catalog = CatalogSync::start(dyn_store(&store));
    let editor = ReviewEditor::new(dyn_store(&store));

    let saved = editor.submit(&alice_form("P1")).await.unwrap();
    assert!(saved.created);

    let doc = store.document("P1").unwrap();
    let reviews = doc["reviews"].as_object().unwrap();
    assert_eq!(reviews.len(), 1);
    let entry = &reviews[&saved.review_key];
    assert_eq!(entry["reviewer"], "Alice");
    assert_eq!(entry["rating"], 5);
    assert_eq!(entry["comment"], "Great");
    assert_eq!(entry["isFake"], false);
    assert!(!entry["id"].as_str().unwrap().is_empty());

    let state = wait_for_catalog(&catalog, |s| {
        s.products()
            .iter()
            .any(|p| p.key == "P1" && p.reviews.len() == 1)
    })
    .await;
    let products = state.products();
    let review = &products[0].reviews[0];
    assert_eq!(review.author, "Alice");
    assert_eq!(review.key, saved.review_key);
    assert_eq!(review.origin, ReviewOrigin::Admin);
}

#[tokio::test]
async fn test_submit_without_product_fails_before_write() {
    let (store, _) = test_stores();
    let editor = ReviewEditor::new(dyn_store(&store));

    let mut form = alice_form("P1");
    form.apply(ReviewFormEvent::SelectProduct(None));
    form.apply(ReviewFormEvent::SetReviewer("Alice".into()));

    let err = editor.submit(&form).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::NoProductSelected)
    ));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_out_of_range_rating_rejected() {
    let (store, _) = test_stores();
    store.insert_raw("P1", json!({"name": "X"}));
    let editor = ReviewEditor::new(dyn_store(&store));

    let mut form = alice_form("P1");
    form.apply(ReviewFormEvent::SetRating(0));

    assert!(matches!(
        editor.submit(&form).await,
        Err(AppError::Validation(ValidationError::Field(_)))
    ));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_edit_overwrites_in_place_and_keeps_embedded_id() {
    let (store, _) = test_stores();
    store.insert_raw(
        "P1",
        json!({"reviews": {
            "k1": {"id": "uuid-1", "reviewer": "Alice", "rating": 5, "comment": "Great",
                   "isFake": false, "createdAt": "2024-01-01T00:00:00.000Z"},
            "k2": {"id": "uuid-2", "reviewer": "Bob", "rating": 3, "comment": "Ok"}
        }}),
    );
    let editor = ReviewEditor::new(dyn_store(&store));

    let product = watch_storefront::models::Product::from_raw(&watch_storefront::db::RawDocument {
        key: "P1".into(),
        fields: store.document("P1").unwrap().as_object().cloned().unwrap(),
    });
    let review = product.reviews.iter().find(|r| r.key == "k1").unwrap();

    let mut form = ReviewForm::for_edit("P1", review);
    form.apply(ReviewFormEvent::SetRating(2));
    form.apply(ReviewFormEvent::SetIsFake(true));

    let saved = editor.submit(&form).await.unwrap();
    assert!(!saved.created);
    assert_eq!(saved.review_key, "k1");

    let doc = store.document("P1").unwrap();
    let reviews = doc["reviews"].as_object().unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews["k1"]["id"], "uuid-1");
    assert_eq!(reviews["k1"]["rating"], 2);
    assert_eq!(reviews["k1"]["isFake"], true);
    assert_eq!(reviews["k1"]["createdAt"], "2024-01-01T00:00:00.000Z");
    assert_eq!(reviews["k2"]["reviewer"], "Bob");
}

#[tokio::test]
async fn test_declined_delete_makes_no_store_call() {
    let (store, _) = test_stores();
    store.insert_raw("P1", json!({"reviews": {"k1": {"reviewer": "A"}}}));
    let editor = ReviewEditor::new(dyn_store(&store));

    let deleted = editor
        .delete("P1", "k1", Confirmation::Declined)
        .await
        .unwrap();

    assert!(!deleted);
    assert_eq!(store.write_count(), 0);
    assert!(store.document("P1").unwrap()["reviews"].get("k1").is_some());
}

#[tokio::test]
async fn test_confirmed_delete_removes_entry() {
    let (store, _) = test_stores();
    store.insert_raw(
        "P1",
        json!({"reviews": {"k1": {"reviewer": "A"}, "k2": {"reviewer": "B"}}}),
    );
    let editor = ReviewEditor::new(dyn_store(&store));

    let deleted = editor
        .delete("P1", "k1", Confirmation::Confirmed)
        .await
        .unwrap();

    assert!(deleted);
    let doc = store.document("P1").unwrap();
    assert!(doc["reviews"].get("k1").is_none());
    assert!(doc["reviews"].get("k2").is_some());
}

#[tokio::test]
async fn test_write_failure_is_store_error() {
    let (store, _) = test_stores();
    store.insert_raw("P1", json!({}));
    store.set_fail_writes(true);
    let editor = ReviewEditor::new(dyn_store(&store));

    let err = editor.submit(&alice_form("P1")).await.unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
}
