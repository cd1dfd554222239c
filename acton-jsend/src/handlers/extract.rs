//! JSON body extraction that fails with classified errors

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;

use crate::failure::{ApiError, FailedRequest, Failure, ValidationError};

/// Client-facing text for bodies that are not JSON at all
pub const MALFORMED_JSON: &str = "Input is malformed; could not decode JSON object.";

/// [`Json`] extractor whose rejections are JSend-ready
///
/// Syntax errors become an [`ApiError`], shape mismatches a
/// [`ValidationError`]; both reach the client as `fail` envelopes. Anything
/// else the body reader reports is unclassified.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = FailedRequest;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(classify(rejection)),
        }
    }
}

fn classify(rejection: JsonRejection) -> FailedRequest {
    match rejection {
        JsonRejection::JsonSyntaxError(_) => ApiError::bad_request(MALFORMED_JSON).into(),
        JsonRejection::JsonDataError(e) => ValidationError::new(e.body_text()).into(),
        JsonRejection::MissingJsonContentType(e) => {
            ApiError::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, e.body_text()).into()
        }
        other => FailedRequest::new(
            other.status(),
            Failure::unclassified(anyhow::Error::msg(other.body_text())),
        ),
    }
}
