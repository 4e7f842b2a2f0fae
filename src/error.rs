// Typed API error: maps domain failures to JSON HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Error surfaced to API callers as `{"error": "<message>"}`.
///
/// Handlers return `Result<_, ApiError>` and use `?` on store calls; sqlx
/// failures become `Internal`, which logs the detail server-side and sends
/// a generic message to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400: missing or malformed input.
    #[error("{0}")]
    Validation(String),
    /// 401: missing or invalid credentials/token.
    #[error("{0}")]
    Unauthorized(String),
    /// 404: resource does not exist or is not owned by the caller.
    #[error("{0}")]
    NotFound(String),
    /// 409: uniqueness violated (duplicate email).
    #[error("{0}")]
    Conflict(String),
    /// 500: unexpected store failure. Logged, not exposed.
    #[error("internal server error")]
    Internal(#[from] sqlx::Error),
    /// 500: password hashing or token signing failed. Logged, not exposed.
    #[error("internal server error")]
    Crypto(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Internal(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            Self::Crypto(e) => {
                tracing::error!("Auth error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::validation("bad").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("no token").into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::not_found("missing").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::conflict("duplicate").into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal(sqlx::Error::RowNotFound)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_passthrough() {
        let err = ApiError::not_found("Island not found");
        assert_eq!(err.to_string(), "Island not found");
    }

    #[test]
    fn test_internal_masks_detail() {
        let err = ApiError::Internal(sqlx::Error::PoolClosed);
        assert_eq!(err.to_string(), "internal server error");

        let err = ApiError::Crypto("hash failure detail".to_string());
        assert_eq!(err.to_string(), "internal server error");
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
