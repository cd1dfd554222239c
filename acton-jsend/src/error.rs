//! Framework error types
//!
//! [`Error`] covers faults of the framework itself: configuration,
//! deployment and misuse of the response primitives. Failures raised by
//! endpoint code are modelled by [`Failure`](crate::failure::Failure).

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::failure::Failure;

/// Result type alias using the framework error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the framework
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// A handler asked for the database connection but none was injected
    ///
    /// This is a deployment fault, not a request failure.
    #[error("No database connection was provided.")]
    MissingDatabase,

    /// Database error
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(Box<sqlx::Error>),

    /// The response was already finalized; no further writes are allowed
    #[error("Response already finished")]
    ResponseFinished,

    /// Envelope serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error signals a deployment misconfiguration
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Config(_) | Error::MissingDatabase)
    }
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(Box::new(err))
    }
}

/// Framework errors reaching an endpoint boundary are never disclosure-safe
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        Failure::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_database_message() {
        let err = Error::MissingDatabase;
        assert_eq!(err.to_string(), "No database connection was provided.");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_response_finished_is_not_configuration() {
        assert!(!Error::ResponseFinished.is_configuration());
    }

    #[test]
    fn test_io_error_conversion() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "disk gone").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn test_figment_error_is_boxed() {
        let err: Error = figment::Error::from("bad key".to_string()).into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.is_configuration());
    }
}
