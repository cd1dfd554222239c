//! Endpoint failure taxonomy
//!
//! Every error an endpoint raises is classified, at the point it is
//! constructed, into exactly one [`Failure`] variant:
//!
//! - [`Failure::Api`]: a domain error raised on purpose by application code
//! - [`Failure::Validation`]: malformed client input
//! - [`Failure::Unclassified`]: anything else, treated as sensitive
//!
//! The first two are disclosure-safe: their wording is controlled by the code
//! that raised them. Unclassified failures may come from deep inside a
//! library and are never shown to clients unless the service runs in debug
//! mode.
//!
//! # Example
//!
//! ```rust
//! use acton_jsend::failure::{api_assert, ApiError, ApiResult, Failure};
//! use axum::http::StatusCode;
//!
//! fn reserve(seats: u32) -> ApiResult<u32> {
//!     api_assert(seats <= 4, StatusCode::BAD_REQUEST, "at most 4 seats per booking")?;
//!     Ok(seats)
//! }
//!
//! let failure = reserve(9).unwrap_err();
//! assert!(failure.is_disclosure_safe());
//! assert_eq!(failure.status(), StatusCode::BAD_REQUEST);
//! ```

use std::{fmt, sync::Arc};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result type for endpoint code
pub type ApiResult<T> = std::result::Result<T, Failure>;

/// Domain error raised deliberately by application code
///
/// `log_message` is shown to clients verbatim, so it must never expose
/// internals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status to respond with
    pub status: StatusCode,
    /// Disclosure-safe message
    pub log_message: Option<String>,
}

impl ApiError {
    /// Create a domain error with a disclosure-safe message
    pub fn new(status: StatusCode, log_message: impl Into<String>) -> Self {
        Self {
            status,
            log_message: Some(log_message.into()),
        }
    }

    /// Create a domain error carrying only a status
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            log_message: None,
        }
    }

    /// 400 Bad Request
    pub fn bad_request(log_message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, log_message)
    }

    /// 401 Unauthorized
    pub fn unauthorized(log_message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, log_message)
    }

    /// 403 Forbidden
    pub fn forbidden(log_message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, log_message)
    }

    /// 404 Not Found
    pub fn not_found(log_message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, log_message)
    }

    /// 409 Conflict
    pub fn conflict(log_message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, log_message)
    }

    /// The disclosure-safe message, if one was supplied
    pub fn log_message(&self) -> Option<&str> {
        self.log_message.as_deref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP {}: {}",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("Unknown")
        )?;
        if let Some(ref message) = self.log_message {
            write!(f, " ({})", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Client input did not match what the endpoint expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// What is wrong with the input
    pub message: String,
    /// Location of the offending value inside the input, if known
    pub path: Option<String>,
    /// Disclosure-safe override for the client-facing message
    pub log_message: Option<String>,
}

impl ValidationError {
    /// Create a validation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            log_message: None,
        }
    }

    /// Attach the location of the offending value
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Replace the client-facing message
    #[must_use]
    pub fn with_log_message(mut self, log_message: impl Into<String>) -> Self {
        self.log_message = Some(log_message.into());
        self
    }

    /// The disclosure-safe message, if one was supplied
    pub fn log_message(&self) -> Option<&str> {
        self.log_message.as_deref()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path {
            Some(ref path) => write!(f, "{} (at {})", self.message, path),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A classified endpoint failure
#[derive(Debug, Error)]
pub enum Failure {
    /// Domain error; disclosure-safe
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Input validation error; disclosure-safe
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Anything else; disclosure gated by the debug flag
    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

impl Failure {
    /// Classify an arbitrary error as unclassified
    pub fn unclassified(err: impl Into<anyhow::Error>) -> Self {
        Failure::Unclassified(err.into())
    }

    /// Status code this failure responds with unless overridden
    pub fn status(&self) -> StatusCode {
        match self {
            Failure::Api(e) => e.status,
            Failure::Validation(_) => StatusCode::BAD_REQUEST,
            Failure::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the failure text may be shown to clients
    pub fn is_disclosure_safe(&self) -> bool {
        !matches!(self, Failure::Unclassified(_))
    }

    /// The explicit disclosure-safe message, if the failure carries one
    pub fn log_message(&self) -> Option<&str> {
        match self {
            Failure::Api(e) => e.log_message(),
            Failure::Validation(e) => e.log_message(),
            Failure::Unclassified(_) => None,
        }
    }
}

impl From<std::io::Error> for Failure {
    fn from(err: std::io::Error) -> Self {
        Failure::unclassified(err)
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Failure::unclassified(err)
    }
}

impl From<crate::error::Error> for Failure {
    fn from(err: crate::error::Error) -> Self {
        Failure::unclassified(err)
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for Failure {
    fn from(err: sqlx::Error) -> Self {
        Failure::unclassified(err)
    }
}

/// Raise a domain error unless `condition` holds
pub fn api_assert(
    condition: bool,
    status: StatusCode,
    log_message: impl Into<String>,
) -> Result<(), ApiError> {
    if condition {
        Ok(())
    } else {
        Err(ApiError::new(status, log_message))
    }
}

/// Context handed to the failure translator
///
/// Pairs the status selected for the failure with the error that caused it.
/// Returned from an endpoint, it travels as a response extension until the
/// API layer translates it into an envelope.
#[derive(Debug, Clone)]
pub struct FailedRequest {
    status: StatusCode,
    error: Option<Arc<Failure>>,
}

impl FailedRequest {
    /// Fail with an explicit status and error
    pub fn new(status: StatusCode, error: impl Into<Failure>) -> Self {
        Self {
            status,
            error: Some(Arc::new(error.into())),
        }
    }

    /// Fail with a status but no error context
    ///
    /// The translator treats this as a server bug and always answers 500.
    pub fn without_context(status: StatusCode) -> Self {
        Self {
            status,
            error: None,
        }
    }

    /// The status selected for the failure
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The triggering error, if any
    pub fn error(&self) -> Option<&Failure> {
        self.error.as_deref()
    }
}

impl From<Failure> for FailedRequest {
    fn from(failure: Failure) -> Self {
        Self {
            status: failure.status(),
            error: Some(Arc::new(failure)),
        }
    }
}

impl From<ApiError> for FailedRequest {
    fn from(err: ApiError) -> Self {
        Failure::from(err).into()
    }
}

impl From<ValidationError> for FailedRequest {
    fn from(err: ValidationError) -> Self {
        Failure::from(err).into()
    }
}

impl IntoResponse for FailedRequest {
    fn into_response(self) -> Response {
        let mut response = self.status.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        FailedRequest::from(self).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Failure::from(self).into_response()
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        Failure::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_with_message() {
        let err = ApiError::new(StatusCode::BAD_REQUEST, "quota exceeded");
        assert_eq!(err.to_string(), "HTTP 400: Bad Request (quota exceeded)");
    }

    #[test]
    fn test_api_error_display_without_message() {
        let err = ApiError::status(StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
        assert!(err.log_message().is_none());
    }

    #[test]
    fn test_api_error_unknown_reason() {
        let err = ApiError::status(StatusCode::from_u16(599).unwrap());
        assert_eq!(err.to_string(), "HTTP 599: Unknown");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("expected a string").at("user.name");
        assert_eq!(err.to_string(), "expected a string (at user.name)");
        assert!(err.log_message().is_none());
    }

    #[test]
    fn test_classification_by_construction() {
        let api: Failure = ApiError::conflict("already booked").into();
        assert!(matches!(api, Failure::Api(_)));
        assert!(api.is_disclosure_safe());
        assert_eq!(api.status(), StatusCode::CONFLICT);
        assert_eq!(api.log_message(), Some("already booked"));

        let validation: Failure = ValidationError::new("missing field `name`").into();
        assert!(matches!(validation, Failure::Validation(_)));
        assert!(validation.is_disclosure_safe());
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let io: Failure = std::io::Error::new(std::io::ErrorKind::Other, "socket closed").into();
        assert!(matches!(io, Failure::Unclassified(_)));
        assert!(!io.is_disclosure_safe());
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(io.log_message().is_none());
    }

    #[test]
    fn test_unclassified_display_is_inner_message() {
        let failure = Failure::unclassified(anyhow::anyhow!("division by zero"));
        assert_eq!(failure.to_string(), "division by zero");
    }

    #[test]
    fn test_framework_error_is_unclassified() {
        let failure: Failure = crate::error::Error::MissingDatabase.into();
        assert!(!failure.is_disclosure_safe());
    }

    #[test]
    fn test_api_assert() {
        assert!(api_assert(true, StatusCode::BAD_REQUEST, "never").is_ok());
        let err = api_assert(false, StatusCode::FORBIDDEN, "not yours").unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.log_message(), Some("not yours"));
    }

    #[test]
    fn test_failure_response_carries_context() {
        let response = Failure::from(ApiError::not_found("no such user")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let ctx = response.extensions().get::<FailedRequest>().unwrap();
        assert_eq!(ctx.status(), StatusCode::NOT_FOUND);
        assert!(matches!(ctx.error(), Some(Failure::Api(_))));
    }

    #[test]
    fn test_failed_request_status_override() {
        let ctx = FailedRequest::new(
            StatusCode::SERVICE_UNAVAILABLE,
            Failure::unclassified(anyhow::anyhow!("pool exhausted")),
        );
        assert_eq!(ctx.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(ctx.error().is_some());

        let bare = FailedRequest::without_context(StatusCode::BAD_REQUEST);
        assert!(bare.error().is_none());
    }
}
