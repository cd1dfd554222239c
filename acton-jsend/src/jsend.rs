//! JSend response envelopes
//!
//! Every response of an API route group is wrapped in one of three shapes:
//!
//! ```text
//! {"status": "success", "data": ...}
//! {"status": "fail",    "data": ...}
//! {"status": "error",   "message": "...", "data": ... | null, "code": 500}
//! ```
//!
//! [`JSend`] is a stateless renderer; handlers compose it rather than
//! inheriting envelope behaviour.
//!
//! ```rust
//! use acton_jsend::jsend::{Envelope, JSend};
//!
//! let envelope = JSend::fail("quota exceeded");
//! assert_eq!(
//!     serde_json::to_string(&envelope).unwrap(),
//!     r#"{"status":"fail","data":"quota exceeded"}"#
//! );
//! assert!(matches!(envelope, Envelope::Fail { .. }));
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// A JSend envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T = serde_json::Value> {
    /// The request succeeded
    Success {
        /// Response payload
        data: T,
    },
    /// The request was rejected because of something the client did
    Fail {
        /// Disclosure-safe description of the problem
        data: T,
    },
    /// The server failed to process the request
    Error {
        /// Human-readable summary, usually the HTTP reason phrase
        message: String,
        /// Diagnostic payload; serialized as `null` when absent
        data: Option<T>,
        /// Numeric error code, usually the HTTP status
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<u16>,
    },
}

impl<T> Envelope<T> {
    /// The JSend `status` tag of this envelope
    pub fn status(&self) -> &'static str {
        match self {
            Envelope::Success { .. } => "success",
            Envelope::Fail { .. } => "fail",
            Envelope::Error { .. } => "error",
        }
    }

    /// The HTTP status used when the envelope is returned directly
    ///
    /// Success maps to 200, fail to 400 and error to its code (500 when
    /// absent or not a valid status). Wrap in `(StatusCode, Envelope)` to
    /// pick another one.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Envelope::Success { .. } => StatusCode::OK,
            Envelope::Fail { .. } => StatusCode::BAD_REQUEST,
            Envelope::Error { code, .. } => code
                .and_then(|c| StatusCode::from_u16(c).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Transform the payload type
    pub fn map<U, F>(self, f: F) -> Envelope<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Envelope::Success { data } => Envelope::Success { data: f(data) },
            Envelope::Fail { data } => Envelope::Fail { data: f(data) },
            Envelope::Error {
                message,
                data,
                code,
            } => Envelope::Error {
                message,
                data: data.map(f),
                code,
            },
        }
    }
}

/// Response extension marking a body that is already a JSend envelope
#[derive(Debug, Clone, Copy)]
pub(crate) struct Enveloped;

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self)).into_response();
        // Json falls back to a plain-text 500 when serialization fails;
        // that one still needs translating.
        if response.status() == status {
            response.extensions_mut().insert(Enveloped);
        }
        response
    }
}

/// Stateless JSend renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct JSend;

impl JSend {
    /// `{"status": "success", "data": data}`
    pub fn success<T>(data: T) -> Envelope<T> {
        Envelope::Success { data }
    }

    /// `{"status": "fail", "data": data}`
    pub fn fail<T>(data: T) -> Envelope<T> {
        Envelope::Fail { data }
    }

    /// `{"status": "error", "message": message, "data": data, "code": code}`
    pub fn error<T>(message: impl Into<String>, data: Option<T>, code: Option<u16>) -> Envelope<T> {
        Envelope::Error {
            message: message.into(),
            data,
            code,
        }
    }
}
