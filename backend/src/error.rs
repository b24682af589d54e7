//! Error handling for the stock replenishment service
//!
//! Provides consistent JSON error responses for the HTTP surface

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::ReorderError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Calculation errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // External service errors
    #[error("Mail delivery failed: {0}")]
    MailDelivery(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<ReorderError> for AppError {
    fn from(err: ReorderError) -> Self {
        match err {
            ReorderError::InvalidInput(msg) => AppError::InvalidInput(msg),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        let detail = |code: &str, message: String, field: Option<String>| ErrorDetail {
            code: code.to_string(),
            message,
            field,
        };

        match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                detail("VALIDATION_ERROR", message.clone(), Some(field.clone())),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                detail("NOT_FOUND", format!("{} not found", resource), None),
            ),
            AppError::InvalidInput(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                detail("INVALID_INPUT", msg.clone(), None),
            ),
            AppError::MailDelivery(msg) => (
                StatusCode::BAD_GATEWAY,
                detail("MAIL_DELIVERY_ERROR", format!("Mail delivery failed: {}", msg), None),
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail("CONFIGURATION_ERROR", format!("Configuration error: {}", msg), None),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail("DATABASE_ERROR", "A database error occurred".to_string(), None),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail("INTERNAL_ERROR", msg.clone(), None),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail(
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                ),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;
