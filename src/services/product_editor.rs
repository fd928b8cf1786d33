// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Product editing workflow.
//!
//! Submitting a product form runs, in order:
//! 1. Validate the form (no side effects on failure)
//! 2. Upload all selected images concurrently, then the gift image
//! 3. Edit only: delete the previous images if new ones were uploaded
//! 4. Write the product document
//!
//! A failure between upload and write leaves orphaned blobs behind; nothing
//! is rolled back.

use crate::db::DocumentStore;
use crate::error::{AppError, Result, ValidationError};
use crate::models::product::{MAX_BULLET_POINTS, MAX_IMAGES};
use crate::models::{Category, FileUpload, Gift, Product, ProductPatch, ProductRecord};
use crate::storage::{self, BlobStore, GIFTS_FOLDER, PRODUCTS_FOLDER};
use futures_util::future::{join_all, try_join_all};
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::Validate;

/// Admin product form.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProductForm {
    #[validate(length(min = 1, message = "Product name is required."))]
    pub name: String,
    pub category: Category,
    #[validate(range(min = 0.0, message = "Price cannot be negative."))]
    pub price: f64,
    pub description: String,
    pub warranty: String,
    /// Newly selected image files (never pre-filled on edit)
    pub images: Vec<FileUpload>,
    pub gift_name: String,
    #[validate(range(min = 0.0, message = "Gift value cannot be negative."))]
    pub gift_value: f64,
    pub gift_image: Option<FileUpload>,
    #[validate(range(min = 1, message = "Reviews to show must be at least 1."))]
    pub num_reviews_to_show: u32,
    pub bullet_points: Vec<String>,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: Category::default(),
            price: 0.0,
            description: String::new(),
            warranty: String::new(),
            images: Vec::new(),
            gift_name: String::new(),
            gift_value: 0.0,
            gift_image: None,
            num_reviews_to_show: crate::models::product::DEFAULT_REVIEWS_TO_SHOW,
            bullet_points: Vec::new(),
        }
    }
}

/// One change to the product form.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductFormEvent {
    SetName(String),
    SetCategory(Category),
    SetPrice(f64),
    SetDescription(String),
    SetWarranty(String),
    SetImages(Vec<FileUpload>),
    SetGiftName(String),
    SetGiftValue(f64),
    SetGiftImage(Option<FileUpload>),
    SetNumReviewsToShow(u32),
    AddBulletPoint,
    SetBulletPoint { index: usize, value: String },
    RemoveBulletPoint { index: usize },
}

impl ProductForm {
    /// Pre-fill the form for editing an existing product.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            description: product.description.clone(),
            warranty: product.warranty.clone(),
            images: Vec::new(),
            gift_name: product.gift.name.clone(),
            gift_value: product.gift.value,
            gift_image: None,
            num_reviews_to_show: product.num_reviews_to_show,
            bullet_points: product.bullet_points.clone(),
        }
    }

    /// Apply a form event. Rejected events leave the form unchanged.
    pub fn apply(&mut self, event: ProductFormEvent) -> std::result::Result<(), ValidationError> {
        match event {
            ProductFormEvent::SetName(name) => self.name = name,
            ProductFormEvent::SetCategory(category) => {
                if !category.is_known() {
                    return Err(ValidationError::UnknownCategory(category.to_string()));
                }
                self.category = category;
            }
            ProductFormEvent::SetPrice(price) => self.price = price,
            ProductFormEvent::SetDescription(description) => self.description = description,
            ProductFormEvent::SetWarranty(warranty) => self.warranty = warranty,
            ProductFormEvent::SetImages(images) => {
                if images.len() > MAX_IMAGES {
                    return Err(ValidationError::TooManyImages);
                }
                self.images = images;
            }
            ProductFormEvent::SetGiftName(name) => self.gift_name = name,
            ProductFormEvent::SetGiftValue(value) => self.gift_value = value,
            ProductFormEvent::SetGiftImage(file) => self.gift_image = file,
            ProductFormEvent::SetNumReviewsToShow(n) => self.num_reviews_to_show = n,
            ProductFormEvent::AddBulletPoint => {
                if self.bullet_points.len() >= MAX_BULLET_POINTS {
                    return Err(ValidationError::TooManyBulletPoints);
                }
                self.bullet_points.push(String::new());
            }
            ProductFormEvent::SetBulletPoint { index, value } => {
                let point = self
                    .bullet_points
                    .get_mut(index)
                    .ok_or(ValidationError::NoSuchBulletPoint(index))?;
                *point = value;
            }
            ProductFormEvent::RemoveBulletPoint { index } => {
                if index >= self.bullet_points.len() {
                    return Err(ValidationError::NoSuchBulletPoint(index));
                }
                self.bullet_points.remove(index);
            }
        }
        Ok(())
    }

    /// Check the form for a create (`creating`) or an edit.
    pub fn check(&self, creating: bool) -> std::result::Result<(), ValidationError> {
        if creating && self.images.is_empty() {
            return Err(ValidationError::NoImages);
        }
        if self.images.len() > MAX_IMAGES {
            return Err(ValidationError::TooManyImages);
        }
        if self.bullet_points.len() > MAX_BULLET_POINTS {
            return Err(ValidationError::TooManyBulletPoints);
        }
        self.validate()?;
        if !self.category.is_known() {
            return Err(ValidationError::UnknownCategory(self.category.to_string()));
        }
        Ok(())
    }
}

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created { key: String },
    Updated { key: String },
}

impl SubmitOutcome {
    pub fn key(&self) -> &str {
        match self {
            SubmitOutcome::Created { key } | SubmitOutcome::Updated { key } => key,
        }
    }
}

/// Create, edit and delete products.
#[derive(Clone)]
pub struct ProductEditor {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

impl ProductEditor {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Submit the form, creating a product or editing `editing_key`.
    pub async fn submit(
        &self,
        form: &ProductForm,
        editing_key: Option<&str>,
    ) -> Result<SubmitOutcome> {
        form.check(editing_key.is_none())?;

        // Resolve the product being edited before anything is uploaded.
        let current = match editing_key {
            Some(key) => Some(self.load(key).await?),
            None => None,
        };

        let image_urls = try_join_all(
            form.images
                .iter()
                .map(|file| storage::upload_file(self.blobs.as_ref(), PRODUCTS_FOLDER, file)),
        )
        .await?;

        let gift_image_url = match &form.gift_image {
            Some(file) => Some(storage::upload_file(self.blobs.as_ref(), GIFTS_FOLDER, file).await?),
            None => None,
        };

        match current {
            Some(current) => {
                self.apply_edit(form, current, image_urls, gift_image_url)
                    .await
            }
            None => self.create(form, image_urls, gift_image_url).await,
        }
    }

    async fn create(
        &self,
        form: &ProductForm,
        image_urls: Vec<String>,
        gift_image_url: Option<String>,
    ) -> Result<SubmitOutcome> {
        let record = ProductRecord {
            name: form.name.clone(),
            category: form.category.to_string(),
            price: form.price,
            description: form.description.clone(),
            warranty: form.warranty.clone(),
            images: image_urls,
            gift: Gift {
                name: form.gift_name.clone(),
                value: form.gift_value,
                image: gift_image_url.unwrap_or_default(),
            },
            is_new: false,
            reviews: BTreeMap::new(),
            num_reviews_to_show: form.num_reviews_to_show,
            bullet_points: form.bullet_points.clone(),
        };

        let key = self.store.push_product(&record).await?;
        tracing::info!(key = %key, images = record.images.len(), "Product created");
        Ok(SubmitOutcome::Created { key })
    }

    async fn apply_edit(
        &self,
        form: &ProductForm,
        current: Product,
        image_urls: Vec<String>,
        gift_image_url: Option<String>,
    ) -> Result<SubmitOutcome> {
        let mut patch = ProductPatch {
            name: form.name.clone(),
            category: form.category.to_string(),
            price: form.price,
            description: form.description.clone(),
            warranty: form.warranty.clone(),
            num_reviews_to_show: form.num_reviews_to_show,
            gift: Gift {
                name: form.gift_name.clone(),
                value: form.gift_value,
                image: gift_image_url.unwrap_or_else(|| current.gift.image.clone()),
            },
            bullet_points: form.bullet_points.clone(),
            images: None,
        };

        if !image_urls.is_empty() {
            let deleted = join_all(current.images.iter().map(|url| {
                storage::delete_best_effort(self.blobs.as_ref(), url, "old product image")
            }))
            .await;
            tracing::debug!(
                key = %current.key,
                attempted = deleted.len(),
                deleted = deleted.iter().filter(|ok| **ok).count(),
                "Replaced product images"
            );
            patch.images = Some(image_urls);
        }

        self.store.update_product(&current.key, &patch).await?;
        tracing::info!(key = %current.key, "Product updated");
        Ok(SubmitOutcome::Updated { key: current.key })
    }

    /// Delete a product and, best-effort, all of its blobs.
    ///
    /// The document is removed even if some blob deletions fail.
    pub async fn delete_product(&self, key: &str) -> Result<()> {
        let product = self.load(key).await?;

        let urls = product.blob_urls();
        let deleted = join_all(
            urls.iter()
                .map(|url| storage::delete_best_effort(self.blobs.as_ref(), url, "product blob")),
        )
        .await;

        self.store.remove_product(key).await?;

        tracing::info!(
            key = %key,
            blobs = urls.len(),
            blobs_deleted = deleted.iter().filter(|ok| **ok).count(),
            "Product deleted"
        );
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Product> {
        self.store
            .get_product(key)
            .await?
            .map(|doc| Product::from_raw(&doc))
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", key)))
    }
}
