//! API error types with JSON responses.
//!
//! Every failure leaves the server as
//! `{"error": {"code": ..., "message": ..., "details": ...}}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notes_core::ValidationErrors;
use serde::Serialize;

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body or parameters do not match their schema (400).
    #[error("{message}")]
    ValidationFailed {
        message: String,
        details: serde_json::Value,
    },

    /// Any other invalid input value (400).
    #[error("{0}")]
    ValueError(String),

    /// Missing, malformed, expired or otherwise unverifiable token (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to touch the resource (403).
    #[error("{0}")]
    Forbidden(String),

    /// Not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Store error (500).
    #[error("storage error: {0}")]
    Store(#[from] notes_store::StoreError),
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::ValueError(_) => "VALUE_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) | Self::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationFailed { .. } | Self::ValueError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients. Server-side failures stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Internal(_) | Self::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationFailed {
            message: "Data validation failed".to_string(),
            details: serde_json::to_value(errors.violations()).unwrap_or_default(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationFailed {
            message: "Request body could not be parsed".to_string(),
            details: serde_json::json!([{ "field": "body", "message": rejection.body_text() }]),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::ValidationFailed {
            message: "Query parameters could not be parsed".to_string(),
            details: serde_json::json!([{ "field": "query", "message": rejection.body_text() }]),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    /// Error code (e.g., "NOT_FOUND", "VALIDATION_FAILED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Structured context, e.g. the list of invalid fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let message = self.public_message();
        let code = self.code().to_string();
        let details = match self {
            Self::ValidationFailed { details, .. } => Some(details),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use notes_core::FieldViolation;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::ValueError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_envelope_carries_details() {
        let errors = ValidationErrors(vec![FieldViolation {
            field: "title",
            message: "must be at least 1 character(s)".to_string(),
        }]);
        let (status, body) = body_json(errors.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(body["error"]["message"], "Data validation failed");
        assert_eq!(body["error"]["details"][0]["field"], "title");
    }

    #[tokio::test]
    async fn test_not_found_envelope_omits_details() {
        let (status, body) = body_json(ApiError::NotFound("Note not found".into())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Note not found");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_message_is_generic() {
        let (status, body) =
            body_json(ApiError::Internal("connection refused to 10.0.0.3".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "Internal server error");
    }
}
