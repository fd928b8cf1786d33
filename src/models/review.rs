// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Review model.
//!
//! Two review shapes exist in stored data: admin-authored reviews carry
//! `reviewer` and `isFake`, customer-submitted reviews carry `user` and
//! `date`. Both decode into one [`Review`] tagged with its [`ReviewOrigin`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Who authored a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ReviewOrigin {
    /// Written through the admin console
    Admin,
    /// Submitted from a product page
    Customer,
}

/// Stored review record, as written to a product's `reviews` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: String,
    /// Admin-shape author field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
    /// Customer-shape author field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub rating: u8,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_fake: Option<bool>,
    /// Submission time shown on customer reviews (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Creation time used for ordering (RFC3339, millisecond precision)
    pub created_at: String,
    pub origin: ReviewOrigin,
}

impl ReviewRecord {
    /// Build an admin-authored record.
    pub fn admin(
        id: String,
        reviewer: String,
        rating: u8,
        comment: String,
        is_fake: bool,
        created_at: String,
    ) -> Self {
        Self {
            id,
            reviewer: Some(reviewer),
            user: None,
            rating,
            comment,
            is_fake: Some(is_fake),
            date: None,
            created_at,
            origin: ReviewOrigin::Admin,
        }
    }

    /// Build a customer-submitted record. `date` doubles as the creation time.
    pub fn customer(id: String, user: String, rating: u8, comment: String, date: String) -> Self {
        Self {
            id,
            reviewer: None,
            user: Some(user),
            rating,
            comment,
            is_fake: None,
            date: Some(date.clone()),
            created_at: date,
            origin: ReviewOrigin::Customer,
        }
    }
}

/// A review as seen by catalog and product views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Review {
    /// Key of this entry inside the product's `reviews` map
    pub key: String,
    /// Identifier embedded in the record (may differ from `key`)
    pub id: String,
    pub author: String,
    pub rating: u8,
    pub comment: String,
    pub is_fake: Option<bool>,
    pub date: Option<String>,
    pub created_at: Option<String>,
    pub origin: ReviewOrigin,
}

impl Review {
    /// Decode a stored review, tolerating both legacy shapes.
    ///
    /// Returns `None` for entries that are not objects.
    pub fn from_value(key: &str, value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |name: &str| obj.get(name).and_then(Value::as_str).map(str::to_string);

        let user = text("user");
        let date = text("date");
        let origin = match obj.get("origin").and_then(Value::as_str) {
            Some("customer") => ReviewOrigin::Customer,
            Some("admin") => ReviewOrigin::Admin,
            _ if user.is_some() || date.is_some() => ReviewOrigin::Customer,
            _ => ReviewOrigin::Admin,
        };

        let author = text("reviewer").or(user).unwrap_or_default();
        let rating = obj
            .get("rating")
            .and_then(Value::as_f64)
            .map(|r| r.round().clamp(1.0, 5.0) as u8)
            .unwrap_or(5);

        Some(Self {
            key: key.to_string(),
            id: text("id").unwrap_or_else(|| key.to_string()),
            author,
            rating,
            comment: text("comment").unwrap_or_default(),
            is_fake: obj.get("isFake").and_then(Value::as_bool),
            date: date.clone(),
            created_at: text("createdAt").or(date),
            origin,
        })
    }

    /// Local view of a record that was just written under `key`.
    pub fn from_record(key: &str, record: &ReviewRecord) -> Self {
        Self {
            key: key.to_string(),
            id: record.id.clone(),
            author: record
                .reviewer
                .clone()
                .or_else(|| record.user.clone())
                .unwrap_or_default(),
            rating: record.rating,
            comment: record.comment.clone(),
            is_fake: record.is_fake,
            date: record.date.clone(),
            created_at: Some(record.created_at.clone()),
            origin: record.origin,
        }
    }

    /// Ordering key: creation time first, then store key for ties and
    /// legacy entries without a timestamp.
    pub fn sort_key(&self) -> (&str, &str) {
        (self.created_at.as_deref().unwrap_or(""), self.key.as_str())
    }
}

/// Decode a stored `reviews` value (keyed map, or legacy array) into an
/// ordered list.
pub fn reviews_from_value(value: Option<&Value>) -> Vec<Review> {
    let mut reviews: Vec<Review> = match value {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(key, v)| Review::from_value(key, v))
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(i, v)| Review::from_value(&i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    };
    reviews.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    reviews
}
