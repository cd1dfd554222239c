//! Content-type defaults per handler role

use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::Response,
};

/// Content type axum picks on its own for bare string bodies
const IMPLICIT_TEXT: &str = "text/plain; charset=utf-8";

/// A handler role with a fixed response content type
pub trait HandlerRole {
    /// Content type every response of this role carries
    const CONTENT_TYPE: &'static str;

    /// Apply the role content type
    ///
    /// A content type chosen explicitly by the endpoint is kept. A missing
    /// one, or axum's implicit `text/plain; charset=utf-8` for string
    /// bodies, is replaced. The two cannot be told apart, so an endpoint
    /// that wants plain text inside a role group sets any other spelling,
    /// such as `text/plain`.
    fn initialize(headers: &mut HeaderMap) {
        let implicit = headers
            .get(header::CONTENT_TYPE)
            .map_or(true, |value| value == IMPLICIT_TEXT);
        if implicit {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(Self::CONTENT_TYPE),
            );
        }
    }
}

/// `map_response` middleware running a role's initializer
pub(crate) async fn initialize<R: HandlerRole>(mut response: Response) -> Response {
    R::initialize(response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Csv;

    impl HandlerRole for Csv {
        const CONTENT_TYPE: &'static str = "text/csv";
    }

    #[test]
    fn test_sets_missing_content_type() {
        let mut headers = HeaderMap::new();
        Csv::initialize(&mut headers);
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    }

    #[test]
    fn test_replaces_implicit_text() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(IMPLICIT_TEXT));
        Csv::initialize(&mut headers);
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    }

    #[test]
    fn test_keeps_other_plain_text_spellings() {
        for explicit in ["text/plain", "text/plain;charset=utf-8", "text/plain; charset=UTF-8"] {
            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(explicit));
            Csv::initialize(&mut headers);
            assert_eq!(headers[header::CONTENT_TYPE], explicit);
        }
    }

    #[test]
    fn test_keeps_explicit_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
        Csv::initialize(&mut headers);
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(headers.get_all(header::CONTENT_TYPE).iter().count(), 1);
    }
}
