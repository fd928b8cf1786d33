// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes for product and review management.
//!
//! Request bodies are replayed as form events so the HTTP path goes through
//! the same checks as an interactive form.

use crate::error::{AppError, Result};
use crate::models::{Category, FileUpload, Product};
use crate::services::{
    Confirmation, ProductForm, ProductFormEvent, ReviewForm, ReviewFormEvent, SubmitOutcome,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/products", post(create_product))
        .route(
            "/api/admin/products/{key}",
            put(update_product).delete(delete_product),
        )
        .route("/api/admin/products/{key}/reviews", post(create_review))
        .route(
            "/api/admin/products/{key}/reviews/{review_key}",
            put(update_review).delete(delete_review),
        )
}

// ─── Payloads ────────────────────────────────────────────────

/// File sent inline as base64.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePayload {
    pub filename: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    pub data: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

impl FilePayload {
    fn decode(self) -> Result<FileUpload> {
        if self.filename.is_empty() || self.filename.contains('/') {
            return Err(AppError::BadRequest(format!(
                "Invalid file name: {:?}",
                self.filename
            )));
        }
        let data = STANDARD.decode(self.data.as_bytes()).map_err(|_| {
            AppError::BadRequest(format!("Invalid base64 data for {}", self.filename))
        })?;
        Ok(FileUpload::new(self.filename, self.content_type, data))
    }
}

/// Gift fields. Omitted fields keep the form's current values.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GiftPayload {
    pub name: Option<String>,
    pub value: Option<f64>,
    pub image: Option<FilePayload>,
}

/// Product fields. Every field is optional so an edit only touches what the
/// request names; a create starts from an empty form and is then checked.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub warranty: Option<String>,
    pub images: Option<Vec<FilePayload>>,
    pub gift: Option<GiftPayload>,
    pub num_reviews_to_show: Option<u32>,
    pub bullet_points: Option<Vec<String>>,
}

impl ProductPayload {
    /// Replay the fields present in the payload onto `form`.
    fn apply_to(self, form: &mut ProductForm) -> Result<()> {
        let mut events = Vec::new();
        if let Some(name) = self.name {
            events.push(ProductFormEvent::SetName(name));
        }
        if let Some(category) = self.category {
            events.push(ProductFormEvent::SetCategory(Category::from(category)));
        }
        if let Some(price) = self.price {
            events.push(ProductFormEvent::SetPrice(price));
        }
        if let Some(description) = self.description {
            events.push(ProductFormEvent::SetDescription(description));
        }
        if let Some(warranty) = self.warranty {
            events.push(ProductFormEvent::SetWarranty(warranty));
        }
        if let Some(images) = self.images {
            let images = images
                .into_iter()
                .map(FilePayload::decode)
                .collect::<Result<Vec<_>>>()?;
            events.push(ProductFormEvent::SetImages(images));
        }
        if let Some(gift) = self.gift {
            if let Some(name) = gift.name {
                events.push(ProductFormEvent::SetGiftName(name));
            }
            if let Some(value) = gift.value {
                events.push(ProductFormEvent::SetGiftValue(value));
            }
            if let Some(image) = gift.image {
                events.push(ProductFormEvent::SetGiftImage(Some(image.decode()?)));
            }
        }
        if let Some(n) = self.num_reviews_to_show {
            events.push(ProductFormEvent::SetNumReviewsToShow(n));
        }

        // A bullet point list, when given, replaces the current one.
        if let Some(bullet_points) = self.bullet_points {
            for index in (0..form.bullet_points.len()).rev() {
                events.push(ProductFormEvent::RemoveBulletPoint { index });
            }
            for (index, value) in bullet_points.into_iter().enumerate() {
                events.push(ProductFormEvent::AddBulletPoint);
                events.push(ProductFormEvent::SetBulletPoint { index, value });
            }
        }

        for event in events {
            form.apply(event)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProductSavedResponse {
    pub key: String,
    pub created: bool,
}

impl From<SubmitOutcome> for ProductSavedResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        let created = matches!(outcome, SubmitOutcome::Created { .. });
        Self {
            key: outcome.key().to_string(),
            created,
        }
    }
}

// ─── Products ────────────────────────────────────────────────

async fn load_product(state: &AppState, key: &str) -> Result<Product> {
    state
        .store
        .get_product(key)
        .await?
        .map(|doc| Product::from_raw(&doc))
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", key)))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<ProductSavedResponse>)> {
    let mut form = ProductForm::default();
    payload.apply_to(&mut form)?;

    let outcome = state.product_editor().submit(&form, None).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ProductSavedResponse>> {
    // Prefill from the stored product so omitted fields keep their values.
    let product = load_product(&state, &key).await?;
    let mut form = ProductForm::from_product(&product);
    payload.apply_to(&mut form)?;

    let outcome = state.product_editor().submit(&form, Some(&key)).await?;
    Ok(Json(outcome.into()))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<StatusCode> {
    state.product_editor().delete_product(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Reviews ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub reviewer: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub is_fake: bool,
}

impl ReviewPayload {
    fn apply_to(self, form: &mut ReviewForm) {
        for event in [
            ReviewFormEvent::SetReviewer(self.reviewer),
            ReviewFormEvent::SetRating(self.rating),
            ReviewFormEvent::SetComment(self.comment),
            ReviewFormEvent::SetIsFake(self.is_fake),
        ] {
            form.apply(event);
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ReviewSavedResponse {
    pub product_key: String,
    pub review_key: String,
    pub created: bool,
}

async fn create_review(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(payload): Json<ReviewPayload>,
) -> Result<(StatusCode, Json<ReviewSavedResponse>)> {
    let mut form = ReviewForm::for_product(&key);
    payload.apply_to(&mut form);

    let saved = state.review_editor().submit(&form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReviewSavedResponse {
            product_key: saved.product_key,
            review_key: saved.review_key,
            created: saved.created,
        }),
    ))
}

async fn update_review(
    State(state): State<Arc<AppState>>,
    Path((key, review_key)): Path<(String, String)>,
    Json(payload): Json<ReviewPayload>,
) -> Result<Json<ReviewSavedResponse>> {
    let product = load_product(&state, &key).await?;
    let review = product
        .reviews
        .iter()
        .find(|r| r.key == review_key)
        .ok_or_else(|| AppError::NotFound(format!("Review {} not found", review_key)))?;

    let mut form = ReviewForm::for_edit(&key, review);
    payload.apply_to(&mut form);

    let saved = state.review_editor().submit(&form).await?;
    Ok(Json(ReviewSavedResponse {
        product_key: saved.product_key,
        review_key: saved.review_key,
        created: saved.created,
    }))
}

#[derive(Deserialize)]
struct DeleteQuery {
    #[serde(default)]
    confirm: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ReviewDeletedResponse {
    pub deleted: bool,
}

/// Delete a review. Without `?confirm=true` nothing is written.
async fn delete_review(
    State(state): State<Arc<AppState>>,
    Path((key, review_key)): Path<(String, String)>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<ReviewDeletedResponse>> {
    let deleted = state
        .review_editor()
        .delete(&key, &review_key, Confirmation::from(query.confirm))
        .await?;
    Ok(Json(ReviewDeletedResponse { deleted }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    fn payload(images: usize, bullets: usize) -> ProductPayload {
        ProductPayload {
            name: Some("Seamaster".into()),
            category: Some("Sport".into()),
            price: Some(6500.0),
            images: Some(
                (0..images)
                    .map(|i| FilePayload {
                        filename: format!("{}.jpg", i),
                        content_type: "image/jpeg".into(),
                        data: STANDARD.encode(b"jpg"),
                    })
                    .collect(),
            ),
            bullet_points: Some((0..bullets).map(|i| format!("point {}", i)).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_payload_replays_onto_form() {
        let mut form = ProductForm::default();
        payload(2, 3).apply_to(&mut form).unwrap();

        assert_eq!(form.name, "Seamaster");
        assert_eq!(form.category, Category::Sport);
        assert_eq!(form.images.len(), 2);
        assert_eq!(form.images[0].data, b"jpg");
        assert_eq!(form.bullet_points, vec!["point 0", "point 1", "point 2"]);
    }

    #[test]
    fn test_payload_replaces_existing_bullet_points() {
        let mut form = ProductForm {
            bullet_points: vec!["old".into(), "older".into()],
            ..Default::default()
        };
        payload(1, 1).apply_to(&mut form).unwrap();
        assert_eq!(form.bullet_points, vec!["point 0"]);
    }

    #[test]
    fn test_omitted_fields_keep_form_values() {
        let mut form = ProductForm {
            name: "Seamaster".into(),
            description: "Diver".into(),
            warranty: "5 years".into(),
            gift_name: "Strap".into(),
            gift_value: 150.0,
            bullet_points: vec!["Ceramic bezel".into()],
            ..Default::default()
        };
        let update = ProductPayload {
            name: Some("Renamed".into()),
            ..Default::default()
        };
        update.apply_to(&mut form).unwrap();

        assert_eq!(form.name, "Renamed");
        assert_eq!(form.description, "Diver");
        assert_eq!(form.warranty, "5 years");
        assert_eq!(form.gift_name, "Strap");
        assert_eq!(form.gift_value, 150.0);
        assert_eq!(form.bullet_points, vec!["Ceramic bezel"]);
    }

    #[test]
    fn test_payload_limits_enforced() {
        let mut form = ProductForm::default();
        assert!(payload(5, 0).apply_to(&mut form).is_err());

        let mut form = ProductForm::default();
        assert!(payload(1, 11).apply_to(&mut form).is_err());
    }

    #[test]
    fn test_bad_base64_is_bad_request() {
        let file = FilePayload {
            filename: "a.jpg".into(),
            content_type: "image/jpeg".into(),
            data: "not base64!".into(),
        };
        assert!(matches!(file.decode(), Err(AppError::BadRequest(_))));
    }
}
