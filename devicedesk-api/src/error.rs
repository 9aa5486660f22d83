/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// Handlers return `Result<T, ApiError>`, which converts to the appropriate
/// status code and a `{error, message}` JSON body.
///
/// Domain errors (`NotFound`, `NotAvailable`, validation failures, bad
/// credentials) are produced directly by handlers; store failures are
/// translated at this boundary and never expose raw diagnostics. The
/// underlying error is logged and the client sees a generic message.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400) - missing or malformed input, rejected before any
    /// store access
    BadRequest(String),

    /// Bad request (400) - field-level validation failures
    Validation(Vec<ValidationErrorDetail>),

    /// Bad request (400) - assignment transition not permitted from the
    /// device's current state (or the device does not exist; callers are
    /// not told which)
    NotAvailable(String),

    /// Unauthorized (401) - credential mismatch
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - uniqueness violation (serial number, username)
    Conflict(String),

    /// Internal server error (500) - store or hashing failure
    Internal(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g. "bad_request", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::NotAvailable(msg) => write!(f, "Not available: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::NotAvailable(msg) => (StatusCode::BAD_REQUEST, "not_available", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Internal(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique/foreign-key violations carry the constraint name
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("username") {
                        return ApiError::Conflict("Username already exists".to_string());
                    }
                    if constraint.contains("serial_number") {
                        return ApiError::Conflict("Serial number already exists".to_string());
                    }
                    if constraint.contains("holder") {
                        return ApiError::BadRequest(
                            "Referenced user does not exist".to_string(),
                        );
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert validator errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        let errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::Validation(errors)
    }
}

/// Convert credential hashing errors to API errors
impl From<devicedesk_shared::auth::password::PasswordError> for ApiError {
    fn from(err: devicedesk_shared::auth::password::PasswordError) -> Self {
        ApiError::Internal(format!("Credential operation failed: {}", err))
    }
}

/// Convert blob storage errors to API errors
impl From<devicedesk_shared::storage::StorageError> for ApiError {
    fn from(err: devicedesk_shared::storage::StorageError) -> Self {
        ApiError::Internal(format!("Blob storage failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("userId is required".to_string());
        assert_eq!(err.to_string(), "Bad request: userId is required");

        let err = ApiError::NotFound("Device not found".to_string());
        assert_eq!(err.to_string(), "Not found: Device not found");
    }

    #[test]
    fn test_validation_error_display() {
        let errors = vec![
            ValidationErrorDetail {
                field: "username".to_string(),
                message: "username is required".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "password is required".to_string(),
            },
        ];

        let err = ApiError::Validation(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[test]
    fn test_not_available_is_bad_request() {
        let response =
            ApiError::NotAvailable("Device is not available or does not exist".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_body_is_generic() {
        let response = ApiError::Internal("connection refused to 10.0.0.5".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
