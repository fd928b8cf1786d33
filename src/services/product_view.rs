// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-product view model.
//!
//! Loads one product with a single read, then keeps local state for the
//! product page: a rotating image index, a random sample of reviews, and
//! optimistically merged customer reviews. A later authoritative copy of
//! the product replaces all of it.

use crate::db::DocumentStore;
use crate::error::{AppError, Result, ValidationError};
use crate::models::{Product, Review, ReviewRecord};
use crate::time_utils::{format_utc_rfc3339, unix_millis};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use validator::Validate;

pub use crate::error::LOAD_DETAILS_FAILED;

/// Number of reviews in the preview panel.
pub const SAMPLE_SIZE: usize = 3;

/// Index into a product's images, wrapping in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageCarousel {
    len: usize,
    index: usize,
}

impl ImageCarousel {
    pub fn new(len: usize) -> Self {
        Self { len, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current index. Always 0 when there are no images.
    pub fn current(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
        self.index
    }

    pub fn prev(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
        self.index
    }

    /// Adjust to a new image count, keeping the index in bounds.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = 0;
        }
    }

    /// Advance a copy of this carousel every `period` on a background task.
    ///
    /// The first step happens one full period after the call.
    pub fn spawn_rotation(&self, period: Duration) -> CarouselHandle {
        let mut carousel = *self;
        let (tx, rx) = watch::channel(carousel.current());

        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            loop {
                ticker.tick().await;
                tx.send_replace(carousel.next());
            }
        });

        CarouselHandle { index: rx, task }
    }
}

/// Running carousel rotation. Stopped on `stop()` or drop.
pub struct CarouselHandle {
    index: watch::Receiver<usize>,
    task: JoinHandle<()>,
}

impl CarouselHandle {
    pub fn current(&self) -> usize {
        *self.index.borrow()
    }

    /// Receiver notified on every step.
    pub fn watch(&self) -> watch::Receiver<usize> {
        self.index.clone()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for CarouselHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Random preview of up to [`SAMPLE_SIZE`] reviews.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewSample {
    reviews: Vec<Review>,
}

impl ReviewSample {
    /// Draw a fresh sample by shuffling all reviews.
    pub fn draw(reviews: &[Review]) -> Self {
        Self::draw_with(reviews, &mut rand::thread_rng())
    }

    pub fn draw_with<R: Rng + ?Sized>(reviews: &[Review], rng: &mut R) -> Self {
        let mut reviews = reviews.to_vec();
        reviews.shuffle(rng);
        reviews.truncate(SAMPLE_SIZE);
        Self { reviews }
    }

    /// Sample after a local submit: the previous sample plus `review`,
    /// reshuffled.
    pub fn with_new(&self, review: Review) -> Self {
        let mut reviews = self.reviews.clone();
        reviews.push(review);
        Self::draw(&reviews)
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }
}

/// Review submitted from a product page.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerReview {
    #[validate(length(min = 1, message = "Please enter your name."))]
    pub user: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Local state of one product page.
pub struct ProductView {
    store: Arc<dyn DocumentStore>,
    product: Product,
    sample: ReviewSample,
    carousel: ImageCarousel,
}

impl ProductView {
    /// Read the product once. A missing document is `NotFound`.
    pub async fn load(store: Arc<dyn DocumentStore>, key: &str) -> Result<Self> {
        let doc = match store.get_product(key).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(product = %key, error = %e, "Error loading product");
                return Err(AppError::Store(LOAD_DETAILS_FAILED.to_string()));
            }
        };
        let doc = doc.ok_or_else(|| AppError::NotFound(format!("Product {} not found", key)))?;

        Ok(Self::from_product(store, Product::from_raw(&doc)))
    }

    pub fn from_product(store: Arc<dyn DocumentStore>, product: Product) -> Self {
        Self {
            store,
            sample: ReviewSample::draw(&product.reviews),
            carousel: ImageCarousel::new(product.images.len()),
            product,
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    /// All reviews, including locally merged ones.
    pub fn reviews(&self) -> &[Review] {
        &self.product.reviews
    }

    pub fn sample(&self) -> &ReviewSample {
        &self.sample
    }

    pub fn carousel(&self) -> &ImageCarousel {
        &self.carousel
    }

    pub fn carousel_mut(&mut self) -> &mut ImageCarousel {
        &mut self.carousel
    }

    /// Image shown at the carousel's current index, if any.
    pub fn current_image(&self) -> Option<&str> {
        self.product
            .images
            .get(self.carousel.current())
            .map(String::as_str)
    }

    /// Write a customer review, then merge it into local state.
    pub async fn submit_review(&mut self, input: CustomerReview) -> Result<Review> {
        input.validate().map_err(ValidationError::from)?;

        let now = chrono::Utc::now();
        let record = ReviewRecord::customer(
            unix_millis(now).to_string(),
            input.user,
            input.rating,
            input.comment,
            format_utc_rfc3339(now),
        );

        let key = self.store.push_review(&self.product.key, &record).await?;
        let review = Review::from_record(&key, &record);

        self.product.reviews.push(review.clone());
        self.sample = self.sample.with_new(review.clone());

        tracing::info!(product = %self.product.key, review = %key, "Customer review submitted");
        Ok(review)
    }

    /// Replace local state with an authoritative copy of the product.
    pub fn apply_snapshot(&mut self, product: &Product) {
        if product.reviews != self.product.reviews {
            self.sample = ReviewSample::draw(&product.reviews);
        }
        self.carousel.set_len(product.images.len());
        self.product = product.clone();
    }
}
