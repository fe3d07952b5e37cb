//! Typed errors and HTTP mapping.

use crate::response::ApiResponse;
use axum::{
    extract::rejection::{BytesRejection, JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt::Display;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors raised by a [`crate::store::StudentStore`] implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The unique index on roll number rejected the write.
    #[error("roll number already exists")]
    DuplicateRollNumber,
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("query: {0}")]
    Query(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Request-level error. The `Display` text is what the client sees in the envelope message.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    MethodNotAllowed(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    Internal(String),
    #[error("{0}")]
    Unavailable(String),
}

impl AppError {
    /// Log the underlying failure and hide it behind a generic message.
    pub fn internal(message: &str, source: impl Display) -> Self {
        tracing::error!(error = %source, "{}", message);
        AppError::Internal(message.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "rejected request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge("Request body too large.".into());
        }
        AppError::BadRequest("Invalid JSON body.".into())
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "failed to read request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge("Request body too large.".into());
        }
        AppError::BadRequest("Invalid JSON body.".into())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "rejected query string");
        AppError::BadRequest("Invalid query parameters.".into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::failure(self.status_code(), self.to_string()).into_response()
    }
}
