// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Product model for storage and API.

use crate::db::RawDocument;
use crate::models::review::{reviews_from_value, Review, ReviewRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Most images a product may carry.
pub const MAX_IMAGES: usize = 4;
/// Most bullet points a product may carry.
pub const MAX_BULLET_POINTS: usize = 10;
/// Display cap used when a document does not specify one.
pub const DEFAULT_REVIEWS_TO_SHOW: u32 = 5;

/// Watch category.
///
/// Forms only offer the three known categories, but the store accepts any
/// string, so unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    Luxury,
    Sport,
    Smart,
    Other(String),
}

impl Category {
    /// The categories offered by the admin form.
    pub const KNOWN: [Category; 3] = [Category::Luxury, Category::Sport, Category::Smart];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Luxury => "Luxury",
            Category::Sport => "Sport",
            Category::Smart => "Smart",
            Category::Other(s) => s.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Other(_))
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Luxury" => Category::Luxury,
            "Sport" => Category::Sport,
            "Smart" => Category::Smart,
            _ => Category::Other(s),
        }
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free gift bundled with a watch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Gift {
    pub name: String,
    pub value: f64,
    /// Blob URL, or empty when no image was uploaded
    pub image: String,
}

/// Product as held by the catalog and product views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Product {
    /// Store-generated document key
    pub key: String,
    pub name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub category: Category,
    pub price: f64,
    pub description: String,
    pub warranty: String,
    pub images: Vec<String>,
    pub bullet_points: Vec<String>,
    pub gift: Gift,
    pub is_new: bool,
    pub num_reviews_to_show: u32,
    pub reviews: Vec<Review>,
}

impl Product {
    /// Normalize a stored document.
    ///
    /// Absent or malformed `images`/`bulletPoints` become empty lists and
    /// `reviews` (a keyed map) becomes a list ordered by creation time.
    pub fn from_raw(doc: &RawDocument) -> Self {
        let fields = &doc.fields;

        let gift = match fields.get("gift") {
            Some(Value::Object(g)) => Gift {
                name: text(g, "name"),
                value: number(g, "value"),
                image: text(g, "image"),
            },
            _ => Gift::default(),
        };

        let num_reviews_to_show = fields
            .get("numReviewsToShow")
            .and_then(Value::as_f64)
            .filter(|n| *n >= 1.0)
            .map(|n| n as u32)
            .unwrap_or(DEFAULT_REVIEWS_TO_SHOW);

        Self {
            key: doc.key.clone(),
            name: text(fields, "name"),
            category: Category::from(text(fields, "category")),
            price: number(fields, "price"),
            description: text(fields, "description"),
            warranty: text(fields, "warranty"),
            images: string_list(fields.get("images")),
            bullet_points: string_list(fields.get("bulletPoints")),
            gift,
            is_new: fields
                .get("isNew")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            num_reviews_to_show,
            reviews: reviews_from_value(fields.get("reviews")),
        }
    }

    /// Reviews the product page may list, capped by `num_reviews_to_show`.
    pub fn visible_reviews(&self) -> &[Review] {
        let cap = (self.num_reviews_to_show as usize).min(self.reviews.len());
        &self.reviews[..cap]
    }

    /// Every blob URL owned by this product (images, then gift image).
    pub fn blob_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.images.iter().map(String::as_str).collect();
        if !self.gift.image.is_empty() {
            urls.push(&self.gift.image);
        }
        urls
    }
}

fn text(map: &Map<String, Value>, name: &str) -> String {
    map.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn number(map: &Map<String, Value>, name: &str) -> f64 {
    map.get(name)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Full product document written on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    pub warranty: String,
    pub images: Vec<String>,
    pub gift: Gift,
    pub is_new: bool,
    pub reviews: BTreeMap<String, ReviewRecord>,
    pub num_reviews_to_show: u32,
    pub bullet_points: Vec<String>,
}

/// Partial update written on edit. `images` is only replaced when new
/// images were uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    pub warranty: String,
    pub num_reviews_to_show: u32,
    pub gift: Gift,
    pub bullet_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ProductPatch {
    /// Top-level document fields this patch replaces.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = vec![
            "name",
            "category",
            "price",
            "description",
            "warranty",
            "numReviewsToShow",
            "gift",
            "bulletPoints",
        ];
        if self.images.is_some() {
            names.push("images");
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(key: &str, value: Value) -> RawDocument {
        RawDocument {
            key: key.to_string(),
            fields: value.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_from_raw_full_document() {
        let product = Product::from_raw(&raw(
            "p1",
            json!({
                "name": "Royal Oak",
                "category": "Luxury",
                "price": 45000,
                "description": "Steel",
                "warranty": "2 years",
                "images": ["https://img/1", "https://img/2"],
                "bulletPoints": ["A", "B"],
                "gift": {"name": "AirPods", "value": 249, "image": "https://img/g"},
                "isNew": true,
                "numReviewsToShow": 3
            }),
        ));

        assert_eq!(product.key, "p1");
        assert_eq!(product.category, Category::Luxury);
        assert_eq!(product.price, 45000.0);
        assert_eq!(product.images.len(), 2);
        assert_eq!(product.bullet_points, vec!["A", "B"]);
        assert_eq!(product.gift.value, 249.0);
        assert!(product.is_new);
        assert_eq!(product.num_reviews_to_show, 3);
        assert!(product.reviews.is_empty());
    }

    #[test]
    fn test_from_raw_coerces_malformed_lists() {
        let product = Product::from_raw(&raw(
            "p2",
            json!({"name": "X", "images": "not-a-list", "bulletPoints": {"0": "A"}}),
        ));

        assert!(product.images.is_empty());
        assert!(product.bullet_points.is_empty());
        assert_eq!(product.gift, Gift::default());
        assert!(!product.is_new);
        assert_eq!(product.num_reviews_to_show, DEFAULT_REVIEWS_TO_SHOW);
    }

    #[test]
    fn test_unknown_category_kept_verbatim() {
        let product = Product::from_raw(&raw("p3", json!({"category": "Vintage"})));
        assert_eq!(product.category, Category::Other("Vintage".to_string()));
        assert!(!product.category.is_known());
        assert_eq!(serde_json::to_value(&product.category).unwrap(), "Vintage");
    }

    #[test]
    fn test_blob_urls_include_gift_image() {
        let mut product = Product::from_raw(&raw("p4", json!({"images": ["a", "b"]})));
        assert_eq!(product.blob_urls(), vec!["a", "b"]);

        product.gift.image = "g".to_string();
        assert_eq!(product.blob_urls(), vec!["a", "b", "g"]);
    }

    #[test]
    fn test_patch_field_names_follow_images() {
        let mut patch = ProductPatch {
            name: "n".into(),
            category: "Sport".into(),
            price: 1.0,
            description: String::new(),
            warranty: String::new(),
            num_reviews_to_show: 5,
            gift: Gift::default(),
            bullet_points: vec![],
            images: None,
        };
        assert!(!patch.field_names().contains(&"images"));
        assert!(serde_json::to_value(&patch).unwrap().get("images").is_none());

        patch.images = Some(vec!["u".into()]);
        assert!(patch.field_names().contains(&"images"));
    }
}
