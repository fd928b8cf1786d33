// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Review editing workflow for the admin console.
//!
//! Reviews live inside their product's `reviews` map. A create appends a
//! new entry under a store-generated key with a fresh UUID embedded as
//! `id`; an edit overwrites the entry at its existing key.

use crate::db::DocumentStore;
use crate::error::{Result, ValidationError};
use crate::models::{Review, ReviewRecord};
use crate::time_utils::format_utc_rfc3339;
use std::sync::Arc;
use validator::Validate;

/// Admin review form.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ReviewForm {
    /// Product the review belongs to
    pub product_key: Option<String>,
    /// Store key of the review being edited; `None` creates a new review
    pub review_id: Option<String>,
    pub reviewer: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: u8,
    pub comment: String,
    pub is_fake: bool,
    /// Embedded id and creation time carried over from the review being edited
    existing_id: Option<String>,
    existing_created_at: Option<String>,
}

impl Default for ReviewForm {
    fn default() -> Self {
        Self {
            product_key: None,
            review_id: None,
            reviewer: String::new(),
            rating: 5,
            comment: String::new(),
            is_fake: false,
            existing_id: None,
            existing_created_at: None,
        }
    }
}

/// One change to the review form.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewFormEvent {
    SetReviewer(String),
    SetRating(u8),
    SetComment(String),
    SetIsFake(bool),
    /// Choose the parent product. Clears any selected review.
    SelectProduct(Option<String>),
    /// Load a review for editing, or `None` to go back to creating.
    SelectReview(Option<Review>),
}

impl ReviewForm {
    /// Form for a new review on `product_key`.
    pub fn for_product(product_key: &str) -> Self {
        Self {
            product_key: Some(product_key.to_string()),
            ..Default::default()
        }
    }

    /// Pre-fill the form for editing `review`.
    pub fn for_edit(product_key: &str, review: &Review) -> Self {
        let mut form = Self::for_product(product_key);
        form.load_review(review);
        form
    }

    fn load_review(&mut self, review: &Review) {
        self.review_id = Some(review.key.clone());
        self.reviewer = review.author.clone();
        self.rating = review.rating;
        self.comment = review.comment.clone();
        self.is_fake = review.is_fake.unwrap_or(false);
        self.existing_id = Some(review.id.clone());
        self.existing_created_at = review.created_at.clone();
    }

    fn clear_review(&mut self) {
        let product_key = self.product_key.take();
        *self = Self {
            product_key,
            ..Default::default()
        };
    }

    pub fn apply(&mut self, event: ReviewFormEvent) {
        match event {
            ReviewFormEvent::SetReviewer(reviewer) => self.reviewer = reviewer,
            ReviewFormEvent::SetRating(rating) => self.rating = rating,
            ReviewFormEvent::SetComment(comment) => self.comment = comment,
            ReviewFormEvent::SetIsFake(is_fake) => self.is_fake = is_fake,
            ReviewFormEvent::SelectProduct(product_key) => {
                self.clear_review();
                self.product_key = product_key;
            }
            ReviewFormEvent::SelectReview(Some(review)) => self.load_review(&review),
            ReviewFormEvent::SelectReview(None) => self.clear_review(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.review_id.is_some()
    }
}

/// Where a submitted review was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmitted {
    pub product_key: String,
    pub review_key: String,
    pub created: bool,
}

/// Explicit user answer to "delete this review?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

/// Create, edit and delete admin reviews.
#[derive(Clone)]
pub struct ReviewEditor {
    store: Arc<dyn DocumentStore>,
}

impl ReviewEditor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn submit(&self, form: &ReviewForm) -> Result<ReviewSubmitted> {
        let product_key = form
            .product_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ValidationError::NoProductSelected)?;
        form.validate().map_err(ValidationError::from)?;

        let now = format_utc_rfc3339(chrono::Utc::now());

        match &form.review_id {
            Some(review_key) => {
                let record = ReviewRecord::admin(
                    form.existing_id
                        .clone()
                        .unwrap_or_else(|| review_key.clone()),
                    form.reviewer.clone(),
                    form.rating,
                    form.comment.clone(),
                    form.is_fake,
                    form.existing_created_at.clone().unwrap_or(now),
                );
                self.store
                    .set_review(product_key, review_key, &record)
                    .await?;
                tracing::info!(product = %product_key, review = %review_key, "Review updated");
                Ok(ReviewSubmitted {
                    product_key: product_key.to_string(),
                    review_key: review_key.clone(),
                    created: false,
                })
            }
            None => {
                let record = ReviewRecord::admin(
                    uuid::Uuid::new_v4().to_string(),
                    form.reviewer.clone(),
                    form.rating,
                    form.comment.clone(),
                    form.is_fake,
                    now,
                );
                let review_key = self.store.push_review(product_key, &record).await?;
                tracing::info!(
                    product = %product_key,
                    review = %review_key,
                    id = %record.id,
                    "Review created"
                );
                Ok(ReviewSubmitted {
                    product_key: product_key.to_string(),
                    review_key,
                    created: true,
                })
            }
        }
    }

    /// Delete a review once the user has confirmed.
    ///
    /// Returns `Ok(false)` without touching the store when declined.
    pub async fn delete(
        &self,
        product_key: &str,
        review_key: &str,
        confirmation: Confirmation,
    ) -> Result<bool> {
        if confirmation == Confirmation::Declined {
            tracing::debug!(product = %product_key, review = %review_key, "Review delete declined");
            return Ok(false);
        }

        self.store.remove_review(product_key, review_key).await?;
        tracing::info!(product = %product_key, review = %review_key, "Review deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewOrigin;

    fn review() -> Review {
        Review {
            key: "k1".into(),
            id: "embedded".into(),
            author: "Alice".into(),
            rating: 4,
            comment: "Nice".into(),
            is_fake: Some(true),
            date: None,
            created_at: Some("2024-01-01T00:00:00.000Z".into()),
            origin: ReviewOrigin::Admin,
        }
    }

    #[test]
    fn test_for_edit_prefills() {
        let form = ReviewForm::for_edit("p1", &review());
        assert_eq!(form.product_key.as_deref(), Some("p1"));
        assert_eq!(form.review_id.as_deref(), Some("k1"));
        assert_eq!(form.reviewer, "Alice");
        assert!(form.is_fake);
        assert!(form.is_editing());
    }

    #[test]
    fn test_select_product_clears_review() {
        let mut form = ReviewForm::for_edit("p1", &review());
        form.apply(ReviewFormEvent::SelectProduct(Some("p2".into())));

        assert_eq!(form.product_key.as_deref(), Some("p2"));
        assert!(!form.is_editing());
        assert!(form.reviewer.is_empty());
    }

    #[test]
    fn test_select_review_none_keeps_product() {
        let mut form = ReviewForm::for_edit("p1", &review());
        form.apply(ReviewFormEvent::SelectReview(None));

        assert_eq!(form.product_key.as_deref(), Some("p1"));
        assert_eq!(form.review_id, None);
        assert_eq!(form.rating, 5);
    }

    #[test]
    fn test_rating_range_validated() {
        let mut form = ReviewForm::for_product("p1");
        form.apply(ReviewFormEvent::SetRating(6));
        assert!(form.validate().is_err());
        form.apply(ReviewFormEvent::SetRating(1));
        assert!(form.validate().is_ok());
    }
}
