// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public storefront routes: catalog, product pages, customer reviews.

use crate::error::{AppError, Result};
use crate::models::{Category, Product, Review};
use crate::services::catalog::CatalogState;
use crate::services::{purchase_link, CustomerReview, ProductView};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{key}", get(get_product))
        .route("/api/products/{key}/reviews", post(submit_review))
}

// ─── Catalog ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogQuery {
    category: Option<String>,
    #[serde(default)]
    new_arrivals: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CatalogResponse {
    pub loading: bool,
    /// Set once the subscription has failed; `products` is then the last
    /// list received
    pub error: Option<String>,
    pub products: Vec<Product>,
}

/// Current catalog projection, optionally filtered.
async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>> {
    let catalog = state.catalog.state();

    if let CatalogState::Failed { message, last } = &catalog {
        if last.is_empty() {
            return Err(AppError::Unavailable(message.clone()));
        }
    }

    let category = query.category.map(Category::from);
    let products = catalog
        .products()
        .iter()
        .filter(|p| category.as_ref().is_none_or(|c| &p.category == c))
        .filter(|p| !query.new_arrivals || p.is_new)
        .cloned()
        .collect();

    Ok(Json(CatalogResponse {
        loading: catalog.is_loading(),
        error: catalog.error().map(str::to_string),
        products,
    }))
}

// ─── Product page ────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProductDetailResponse {
    pub product: Product,
    /// Random preview of up to three reviews
    pub review_sample: Vec<Review>,
    /// Reviews listed on the page, capped by `numReviewsToShow`
    pub reviews: Vec<Review>,
    pub review_count: usize,
    pub purchase_link: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub carousel_interval_ms: u64,
}

fn detail_response(state: &AppState, view: &ProductView) -> ProductDetailResponse {
    let product = view.product();
    ProductDetailResponse {
        review_sample: view.sample().reviews().to_vec(),
        reviews: product.visible_reviews().to_vec(),
        review_count: product.reviews.len(),
        purchase_link: purchase_link(product, &state.config.whatsapp_phone),
        carousel_interval_ms: state.config.carousel_interval_ms,
        product: product.clone(),
    }
}

/// Product page data, read directly from the store.
async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<ProductDetailResponse>> {
    let view = ProductView::load(state.store.clone(), &key).await?;
    Ok(Json(detail_response(&state, &view)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ReviewSubmittedResponse {
    pub review: Review,
    pub detail: ProductDetailResponse,
}

/// Customer review from a product page.
async fn submit_review(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(input): Json<CustomerReview>,
) -> Result<(StatusCode, Json<ReviewSubmittedResponse>)> {
    let mut view = ProductView::load(state.store.clone(), &key).await?;
    let review = view.submit_review(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReviewSubmittedResponse {
            review,
            detail: detail_response(&state, &view),
        }),
    ))
}
