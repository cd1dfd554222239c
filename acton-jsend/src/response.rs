//! Buffered response writer
//!
//! The primitives the failure translator needs from the HTTP layer:
//! set the status, reset whatever was written so far, write one body and
//! finalize. Once [`ResponseWriter::finish`] has been called every further
//! mutation fails with [`Error::ResponseFinished`] and leaves the buffered
//! response untouched.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{Error, Result};

/// Content type written with every JSON body
pub const APPLICATION_JSON: &str = "application/json";

/// A response under construction
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Bytes>,
    finished: bool,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter {
    /// An empty `200 OK` response
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: None,
            finished: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finished {
            return Err(Error::ResponseFinished);
        }
        Ok(())
    }

    /// Set the response status
    pub fn set_status(&mut self, status: StatusCode) -> Result<()> {
        self.ensure_open()?;
        self.status = status;
        Ok(())
    }

    /// Set a header, replacing any previous value
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) -> Result<()> {
        self.ensure_open()?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Reset status, headers and body
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.status = StatusCode::OK;
        self.headers.clear();
        self.body = None;
        Ok(())
    }

    /// Serialize `value` as the JSON body
    pub fn write_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        self.ensure_open()?;
        let bytes = serde_json::to_vec(value)?;
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_JSON),
        );
        self.body = Some(Bytes::from(bytes));
        Ok(())
    }

    /// Finalize the response; no further writes are permitted
    pub fn finish(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.finished = true;
        Ok(())
    }

    /// Whether [`finish`](Self::finish) has been called
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Current status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Current headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Current body, if one was written
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

impl IntoResponse for ResponseWriter {
    fn into_response(self) -> Response {
        let mut response = Response::new(self.body.map(Body::from).unwrap_or_else(Body::empty));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_json_sets_content_type() {
        let mut writer = ResponseWriter::new();
        writer.write_json(&json!({"ok": true})).unwrap();
        assert_eq!(writer.headers()[header::CONTENT_TYPE], APPLICATION_JSON);
        assert_eq!(writer.body().unwrap().as_ref(), br#"{"ok":true}"#);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut writer = ResponseWriter::new();
        writer.set_status(StatusCode::ACCEPTED).unwrap();
        writer
            .set_header(header::ETAG, HeaderValue::from_static("\"v1\""))
            .unwrap();
        writer.write_json(&json!([1, 2])).unwrap();

        writer.clear().unwrap();
        assert_eq!(writer.status(), StatusCode::OK);
        assert!(writer.headers().is_empty());
        assert!(writer.body().is_none());
    }

    #[test]
    fn test_finished_writer_rejects_mutation() {
        let mut writer = ResponseWriter::new();
        writer.set_status(StatusCode::BAD_REQUEST).unwrap();
        writer.write_json(&json!("first")).unwrap();
        writer.finish().unwrap();

        assert!(matches!(
            writer.set_status(StatusCode::OK),
            Err(Error::ResponseFinished)
        ));
        assert!(matches!(writer.clear(), Err(Error::ResponseFinished)));
        assert!(matches!(
            writer.write_json(&json!("second")),
            Err(Error::ResponseFinished)
        ));
        assert!(matches!(writer.finish(), Err(Error::ResponseFinished)));

        assert_eq!(writer.status(), StatusCode::BAD_REQUEST);
        assert_eq!(writer.body().unwrap().as_ref(), br#""first""#);
    }

    #[test]
    fn test_into_response() {
        let mut writer = ResponseWriter::new();
        writer.set_status(StatusCode::CREATED).unwrap();
        writer.write_json(&json!({"id": 7})).unwrap();
        writer.finish().unwrap();
        let response = writer.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], APPLICATION_JSON);
    }
}
