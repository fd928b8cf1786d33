// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod cart;
pub mod product;
pub mod review;
pub mod upload;

pub use cart::{Cart, CartItem};
pub use product::{Category, Gift, Product, ProductPatch, ProductRecord};
pub use review::{Review, ReviewOrigin, ReviewRecord};
pub use upload::FileUpload;
