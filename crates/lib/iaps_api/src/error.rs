//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// JSON error body returned on failure.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.as_str()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.as_str()),
            AppError::InvalidOperation(m) => {
                (StatusCode::BAD_REQUEST, "invalid_operation", m.as_str())
            }
            AppError::Internal(detail) => {
                error!(detail = %detail, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: kind.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".into()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<iaps_core::auth::AuthError> for AppError {
    fn from(e: iaps_core::auth::AuthError) -> Self {
        match e {
            iaps_core::auth::AuthError::CredentialError => {
                AppError::Unauthorized("Invalid credentials".into())
            }
            iaps_core::auth::AuthError::TokenError(msg) => AppError::Unauthorized(msg),
            iaps_core::auth::AuthError::ValidationError(msg) => AppError::Validation(msg),
            iaps_core::auth::AuthError::DbError(e) => AppError::from(e),
            iaps_core::auth::AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<iaps_core::roster::EngineError> for AppError {
    fn from(e: iaps_core::roster::EngineError) -> Self {
        match e {
            iaps_core::roster::EngineError::NotFound(msg) => AppError::NotFound(msg),
            iaps_core::roster::EngineError::Forbidden(msg) => AppError::Forbidden(msg),
            iaps_core::roster::EngineError::Conflict(msg) => AppError::Conflict(msg),
            iaps_core::roster::EngineError::InvalidOperation(msg) => {
                AppError::InvalidOperation(msg)
            }
            iaps_core::roster::EngineError::Validation(msg) => AppError::Validation(msg),
            iaps_core::roster::EngineError::Internal(msg) => AppError::Internal(msg),
            iaps_core::roster::EngineError::Db(e) => AppError::from(e),
        }
    }
}
