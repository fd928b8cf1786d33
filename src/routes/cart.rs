// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cart quote. The cart itself lives in the client.

use crate::models::{Cart, CartItem};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/cart/quote", post(quote))
}

#[derive(Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct QuoteResponse {
    pub items: Vec<CartItem>,
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
}

async fn quote(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuoteRequest>,
) -> Json<QuoteResponse> {
    let cart = Cart::from_items(request.items, state.config.shipping_cost);
    Json(QuoteResponse {
        items: cart.items().to_vec(),
        subtotal: cart.subtotal(),
        shipping: cart.shipping(),
        total: cart.total(),
    })
}
