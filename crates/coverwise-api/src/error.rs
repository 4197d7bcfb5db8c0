//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Message returned when comparison cannot reach any model.
pub const MODELS_BUSY_MESSAGE: &str = "All AI models are currently busy. Please try again later.";

/// Errors surfaced to HTTP clients as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// Generation failed on every model (extraction).
    AiService(String),
    /// Generation failed on every model (comparison).
    Busy(String),
    Internal(String),
}

impl ApiError {
    /// Comparison reports backend exhaustion as a retryable 429.
    pub fn busy_if_exhausted(err: coverwise_core::Error) -> Self {
        match err {
            coverwise_core::Error::AllBackendsExhausted { .. } => {
                ApiError::Busy(MODELS_BUSY_MESSAGE.to_string())
            }
            other => other.into(),
        }
    }
}

impl From<coverwise_core::Error> for ApiError {
    fn from(err: coverwise_core::Error) -> Self {
        match err {
            coverwise_core::Error::AllBackendsExhausted { last, .. } => {
                ApiError::AiService(format!("AI Service Error: {}", last))
            }
            coverwise_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::AiService(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Busy(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverwise_core::{BackendFailure, Error};

    fn exhausted() -> Error {
        Error::AllBackendsExhausted {
            attempted: 7,
            last: BackendFailure::QuotaExceeded("429 RESOURCE_EXHAUSTED".into()),
        }
    }

    #[test]
    fn test_exhaustion_maps_to_ai_service_error() {
        match ApiError::from(exhausted()) {
            ApiError::AiService(msg) => {
                assert_eq!(msg, "AI Service Error: quota exceeded: 429 RESOURCE_EXHAUSTED")
            }
            other => panic!("Expected AiService, got {:?}", other),
        }
    }

    #[test]
    fn test_exhaustion_maps_to_busy_for_comparison() {
        let err = ApiError::busy_if_exhausted(exhausted());
        assert!(matches!(err, ApiError::Busy(msg) if msg == MODELS_BUSY_MESSAGE));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::AiService("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::Busy("x".into()), StatusCode::TOO_MANY_REQUESTS),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err = ApiError::from(Error::Reference("bad csv".into()));
        assert!(matches!(err, ApiError::Internal(msg) if msg.contains("bad csv")));
    }
}
