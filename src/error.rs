//! Error types for the overlay service
//!
//! Provides unified error handling using thiserror. Cache misses, expiry
//! and history boundaries are not errors and never appear here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::collaborators::{CompressionError, DetectionError, OcrError, TranslationError};

// == App Error Enum ==
/// Unified error type for the overlay service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Page or text box not found in the document
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Compression(#[from] CompressionError),

    /// An external call exceeded its deadline
    #[error("Timed out after {0} ms: {1}")]
    Timeout(u64, String),

    /// Persisted state could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Ocr(_)
            | AppError::Detection(_)
            | AppError::Translation(_)
            | AppError::Compression(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(..) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Persistence(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the overlay service.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (AppError::NotFound("page".to_string()), StatusCode::NOT_FOUND),
            (AppError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (
                AppError::Ocr(OcrError::Recognition("blurry".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Timeout(30_000, "ocr".to_string()),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                AppError::Internal("error".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let response = AppError::NotFound("text box 42".to_string()).into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["error"], "Not found: text box 42");
    }

    #[test]
    fn test_collaborator_errors_convert() {
        let err: AppError = TranslationError::AllProvidersFailed.into();
        assert!(matches!(err, AppError::Translation(_)));
    }
}
