//! Error types for coverwise.

use thiserror::Error;

/// Result type alias using coverwise's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a single backend call failed.
///
/// The fallback invoker treats every variant the same way (move on to the
/// next candidate) but keeps the cause so the terminal error can report it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendFailure {
    /// Backend unreachable, timed out, or returned a server error.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Backend rejected the request (bad payload, unknown model).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit or quota exhausted.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Backend answered but the body carried no usable text.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendFailure {
    /// Classify an HTTP status code returned by a generation endpoint.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => Self::QuotaExceeded(message),
            400 | 404 => Self::InvalidRequest(message),
            _ => Self::Unavailable(message),
        }
    }
}

impl From<reqwest::Error> for BackendFailure {
    fn from(e: reqwest::Error) -> Self {
        BackendFailure::Unavailable(e.to_string())
    }
}

/// Core error type for coverwise operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Every model candidate failed; carries the last observed cause.
    #[error("All {attempted} model candidates failed; last error: {last}")]
    AllBackendsExhausted {
        attempted: usize,
        #[source]
        last: BackendFailure,
    },

    /// Inference/generation failed outside the fallback loop
    #[error("Inference error: {0}")]
    Inference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reference data could not be read or parsed
    #[error("Reference data error: {0}")]
    Reference(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_all_backends_exhausted() {
        let err = Error::AllBackendsExhausted {
            attempted: 3,
            last: BackendFailure::QuotaExceeded("resource exhausted".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "All 3 model candidates failed; last error: quota exceeded: resource exhausted"
        );
    }

    #[test]
    fn test_all_backends_exhausted_exposes_source() {
        use std::error::Error as _;

        let err = Error::AllBackendsExhausted {
            attempted: 1,
            last: BackendFailure::Unavailable("connection refused".to_string()),
        };
        let source = err.source().expect("source should be the last cause");
        assert_eq!(source.to_string(), "backend unavailable: connection refused");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_error_display_reference() {
        let err = Error::Reference("bad header row".to_string());
        assert_eq!(err.to_string(), "Reference data error: bad header row");
    }

    #[test]
    fn test_from_status_quota() {
        assert_eq!(
            BackendFailure::from_status(429, "slow down"),
            BackendFailure::QuotaExceeded("slow down".to_string())
        );
    }

    #[test]
    fn test_from_status_invalid_request() {
        assert!(matches!(
            BackendFailure::from_status(400, "bad"),
            BackendFailure::InvalidRequest(_)
        ));
        assert!(matches!(
            BackendFailure::from_status(404, "no such model"),
            BackendFailure::InvalidRequest(_)
        ));
    }

    #[test]
    fn test_from_status_server_error_is_unavailable() {
        assert!(matches!(
            BackendFailure::from_status(503, "overloaded"),
            BackendFailure::Unavailable(_)
        ));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>(r#"{"invalid": json}"#);
        let err: Error = json_err.unwrap_err().into();
        assert!(err.to_string().contains("Serialization error:"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
        assert_send::<BackendFailure>();
    }
}
