// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No usable credentials: never configured, cleared, or undecryptable.
    #[error("LinkedIn credentials not configured")]
    Unauthorized,

    #[error("LinkedIn access token missing; complete the OAuth login first")]
    MissingAccessToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("LinkedIn API error: {0}")]
    LinkedInApi(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

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
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "credentials_not_configured",
                Some(self.to_string()),
            ),
            AppError::MissingAccessToken => (
                StatusCode::UNAUTHORIZED,
                "access_token_missing",
                Some(self.to_string()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Authentication(msg) => (
                StatusCode::BAD_REQUEST,
                "authentication_failed",
                Some(msg.clone()),
            ),
            AppError::LinkedInApi(msg) => {
                tracing::error!(error = %msg, "LinkedIn API error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "linkedin_error",
                    Some(msg.clone()),
                )
            }
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
            }
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

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
