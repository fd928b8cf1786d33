// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shopping cart. Held by the client only; nothing here is persisted.

use crate::models::product::{Gift, Product};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CartItem {
    pub product_key: String,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub quantity: u32,
    #[serde(default)]
    pub gift: Option<Gift>,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// Cart contents plus the flat shipping charge.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
    shipping: f64,
}

impl Cart {
    pub fn new(shipping: f64) -> Self {
        Self {
            items: Vec::new(),
            shipping,
        }
    }

    /// Build a cart from client-held items; quantities below 1 are raised to 1.
    pub fn from_items(items: Vec<CartItem>, shipping: f64) -> Self {
        let items = items
            .into_iter()
            .map(|mut item| {
                item.quantity = item.quantity.max(1);
                item
            })
            .collect();
        Self { items, shipping }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Add one unit of a product, merging with an existing line.
    pub fn add(&mut self, product: &Product) {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_key == product.key)
        {
            item.quantity += 1;
            return;
        }

        self.items.push(CartItem {
            product_key: product.key.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.images.first().cloned().unwrap_or_default(),
            quantity: 1,
            gift: Some(product.gift.clone()).filter(|g| !g.name.is_empty()),
        });
    }

    /// Set a line's quantity. Never drops below 1; use `remove` instead.
    pub fn update_quantity(&mut self, product_key: &str, quantity: u32) {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_key == product_key)
        {
            item.quantity = quantity.max(1);
        }
    }

    pub fn remove(&mut self, product_key: &str) {
        self.items.retain(|item| item.product_key != product_key);
    }

    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn shipping(&self) -> f64 {
        self.shipping
    }

    pub fn total(&self) -> f64 {
        self.subtotal() + self.shipping
    }
}
