// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Message shown for any failed product/review submission.
pub const SUBMIT_FAILED: &str = "Failed to submit form. Please try again.";

/// Message shown when the catalog subscription fails.
pub const LOAD_FAILED: &str = "Failed to load products.";

/// Message shown when a single product read fails.
pub const LOAD_DETAILS_FAILED: &str = "Failed to load product details.";

/// Store/blob messages that are already safe to show as-is. Anything else
/// carries backend detail and is replaced by `SUBMIT_FAILED`.
const CALLER_MESSAGES: [&str; 3] = [SUBMIT_FAILED, LOAD_FAILED, LOAD_DETAILS_FAILED];

fn caller_message(detail: &str) -> String {
    if CALLER_MESSAGES.contains(&detail) {
        detail.to_string()
    } else {
        SUBMIT_FAILED.to_string()
    }
}

/// Form validation failures. These are raised before any network effect.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please upload at least 1 image.")]
    NoImages,

    #[error("You can upload a maximum of 4 images.")]
    TooManyImages,

    #[error("You can add up to 10 bullet points.")]
    TooManyBulletPoints,

    #[error("No bullet point at position {0}.")]
    NoSuchBulletPoint(usize),

    #[error("No product selected for the review.")]
    NoProductSelected,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("{0}")]
    Field(String),
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Report the first failing field; forms surface one message at a time.
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
            })
            .next()
            .unwrap_or_else(|| "Invalid form".to_string());
        ValidationError::Field(message)
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Document store error: {0}")]
    Store(String),

    #[error("Blob store error: {0}")]
    Blob(String),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                Some(err.to_string()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Store(msg) => {
                tracing::error!(error = %msg, "Document store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store_error",
                    Some(caller_message(msg)),
                )
            }
            AppError::Blob(msg) => {
                tracing::error!(error = %msg, "Blob store error");
                (
                    StatusCode::BAD_GATEWAY,
                    "blob_error",
                    Some(caller_message(msg)),
                )
            }
            AppError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                Some(msg.clone()),
            ),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers and workflows
pub type Result<T> = std::result::Result<T, AppError>;
