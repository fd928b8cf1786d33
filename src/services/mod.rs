// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - storefront workflows and view models.

pub mod catalog;
pub mod product_editor;
pub mod product_view;
pub mod purchase;
pub mod review_editor;

pub use catalog::{CatalogState, CatalogSync};
pub use product_editor::{ProductEditor, ProductForm, ProductFormEvent, SubmitOutcome};
pub use product_view::{CustomerReview, ImageCarousel, ProductView, ReviewSample};
pub use purchase::purchase_link;
pub use review_editor::{Confirmation, ReviewEditor, ReviewForm, ReviewFormEvent};
