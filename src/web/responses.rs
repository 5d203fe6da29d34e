//! HTTP response types and utilities
//!
//! Every endpoint answers with an [`ApiResponse`] envelope. Errors are mapped
//! to status codes in one place, [`handle_error`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::{AppError, AppResult};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Response timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    /// Create an error response
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Answer 200 with the data, or the mapped error
pub fn handle_result<T>(result: AppResult<T>) -> Response
where
    T: Serialize,
{
    match result {
        Ok(data) => ok(data).into_response(),
        Err(error) => handle_error(error),
    }
}

/// Convert AppError to appropriate HTTP response
///
/// Store failures are answered with their operation only; the
/// underlying cause is logged, never returned.
pub fn handle_error(error: AppError) -> Response {
    let (status, message) = match &error {
        AppError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
        AppError::NotFound { resource, id } => (
            StatusCode::NOT_FOUND,
            format!("{} with id '{}' not found", resource, id),
        ),
        AppError::Conflict { message } => (StatusCode::CONFLICT, message.clone()),
        AppError::Store { .. } => (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
    };

    if status.is_server_error() {
        error!("Request failed: {:#}", ErrorChain(&error));
    }

    (status, Json(ApiResponse::error(message))).into_response()
}

/// Displays an error followed by its sources
struct ErrorChain<'a>(&'a (dyn std::error::Error + 'static));

impl std::fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, ": {}", cause)?;
            source = cause.source();
        }
        Ok(())
    }
}

/// Success response helpers
pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Error response helpers
pub fn bad_request(message: &str) -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(message.to_string())),
    )
}

pub fn not_found(resource: &str, id: i64) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error(format!(
            "{} with id '{}' not found",
            resource, id
        ))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RepositoryError;

    #[test]
    fn error_kinds_map_to_status_codes() {
        let cases = [
            (AppError::validation("Invalid Music ID"), StatusCode::BAD_REQUEST),
            (AppError::not_found("radio program", 9), StatusCode::NOT_FOUND),
            (AppError::conflict("Music already added to Program"), StatusCode::CONFLICT),
            (
                AppError::store(
                    "add radio program",
                    RepositoryError::query_failed("insert_radio_program", "disk full"),
                ),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(handle_error(error).status(), expected);
        }
    }
}
