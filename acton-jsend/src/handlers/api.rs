//! JSON API role and failure translation
//!
//! [`translate`] decides which envelope a failed request gets;
//! [`ApiHandler::write_error`] writes that decision through a
//! [`ResponseWriter`]; [`ApiHandler::wrap`] installs both on an axum router
//! so every failure inside the route group ends up as a JSend envelope.
//!
//! # Disclosure rules
//!
//! | failure                    | envelope | client sees                             |
//! |----------------------------|----------|-----------------------------------------|
//! | [`Failure::Api`]           | fail     | `log_message`, else the error text      |
//! | [`Failure::Validation`]    | fail     | `log_message`, else the error text      |
//! | [`Failure::Unclassified`]  | error    | reason phrase; error text only in debug |
//! | no error context           | error    | `Internal Server Error`, always 500     |

use std::any::Any;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{from_fn_with_state, map_response, Next},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

use super::{
    base::BaseHandler,
    role::{initialize, HandlerRole},
};
use crate::{
    error::{Error, Result},
    failure::{FailedRequest, Failure},
    jsend::{Enveloped, Envelope, JSend},
    response::{ResponseWriter, APPLICATION_JSON},
};

/// Reason phrase used when a status has none
const UNKNOWN_REASON: &str = "Unknown";

/// Upper bound on framework error bodies read back for translation
const FRAMEWORK_BODY_LIMIT: usize = 64 * 1024;

/// Sent when translation itself fails
const FATAL_BODY: &str =
    r#"{"status":"error","message":"Internal Server Error","data":null,"code":500}"#;

/// Outcome of translating one failed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Final response status
    pub status: StatusCode,
    /// Envelope to send
    pub envelope: Envelope<String>,
    /// The failure arrived without error context
    pub missing_context: bool,
}

/// Decide the response for a failed request
///
/// Pure: no logging, no I/O. `debug` gates whether the text of an
/// unclassified error is attached as `data`.
pub fn translate(status: StatusCode, error: Option<&Failure>, debug: bool) -> Translation {
    let Some(error) = error else {
        return Translation {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            envelope: JSend::error(
                reason_phrase(StatusCode::INTERNAL_SERVER_ERROR),
                None,
                Some(StatusCode::INTERNAL_SERVER_ERROR.as_u16()),
            ),
            missing_context: true,
        };
    };

    let envelope = match error {
        Failure::Api(_) | Failure::Validation(_) => JSend::fail(
            error
                .log_message()
                .map_or_else(|| error.to_string(), str::to_owned),
        ),
        Failure::Unclassified(inner) => JSend::error(
            reason_phrase(status),
            debug.then(|| inner.to_string()),
            Some(status.as_u16()),
        ),
    };

    Translation {
        status,
        envelope,
        missing_context: false,
    }
}

fn reason_phrase(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or(UNKNOWN_REASON)
}

/// Role for endpoints answering with JSON
#[derive(Debug, Clone, Default)]
pub struct ApiHandler<D = ()> {
    base: BaseHandler<D>,
}

impl<D> HandlerRole for ApiHandler<D> {
    const CONTENT_TYPE: &'static str = APPLICATION_JSON;
}

impl<D> ApiHandler<D>
where
    D: Clone + Send + Sync + 'static,
{
    /// Create an API role over the shared handler base
    pub fn new(base: BaseHandler<D>) -> Self {
        Self { base }
    }

    /// The shared handler base
    pub fn base(&self) -> &BaseHandler<D> {
        &self.base
    }

    /// The injected database connection
    pub fn db_conn(&self) -> Result<&D> {
        self.base.db_conn()
    }

    /// Write the envelope for a failed request and finalize the response
    ///
    /// Clears anything already written, sets the final status, writes
    /// exactly one envelope and finishes `writer`. Without error context the
    /// status is forced to 500 and the fault is logged. Fails with
    /// [`Error::ResponseFinished`], leaving `writer` untouched, when the
    /// response was already finalized.
    pub fn write_error(
        &self,
        writer: &mut ResponseWriter,
        status: StatusCode,
        error: Option<&Failure>,
    ) -> Result<()> {
        if writer.is_finished() {
            return Err(Error::ResponseFinished);
        }

        let translation = translate(status, error, self.base.debug());
        if translation.missing_context {
            tracing::error!(
                status = status.as_u16(),
                "Failure reported without error context"
            );
        }

        writer.clear()?;
        writer.set_status(translation.status)?;
        writer.write_json(&translation.envelope)?;
        writer.finish()
    }

    /// Render a failed request as a finished response
    ///
    /// Unclassified failures are logged here, before translation hides
    /// their text from the client.
    pub fn render_failure(&self, failed: &FailedRequest) -> Response {
        if let Some(failure) = failed.error() {
            report_unclassified(failed.status(), failure);
        }

        let mut writer = ResponseWriter::new();
        match self.write_error(&mut writer, failed.status(), failed.error()) {
            Ok(()) => writer.into_response(),
            Err(e) => escalate(e),
        }
    }

    /// Install the API role on every route of `router`
    ///
    /// Adds, innermost first: request timeout and body limit from the
    /// configuration, panic recovery, the JSON content-type initializer and
    /// the failure translator. A 404 fallback replaces any fallback set on
    /// `router`, so unmatched paths stay inside the group even when it is
    /// nested.
    pub fn wrap<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let config = self.base.config();
        router
            .fallback(route_not_found)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.service.timeout(),
            ))
            .layer(RequestBodyLimitLayer::new(
                config.middleware.body_limit_bytes(),
            ))
            .layer(CatchPanicLayer::custom(panic_failure))
            .layer(map_response(initialize::<Self>))
            .layer(from_fn_with_state(self.clone(), translate_failures::<D>))
    }
}

/// Post-failure hook: turn every error response of the group into an envelope
async fn translate_failures<D>(
    State(handler): State<ApiHandler<D>>,
    request: Request,
    next: Next,
) -> Response
where
    D: Clone + Send + Sync + 'static,
{
    let response = next.run(request).await;

    if response.extensions().get::<Enveloped>().is_some() {
        return response;
    }
    if let Some(failed) = response.extensions().get::<FailedRequest>() {
        return handler.render_failure(failed);
    }

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    // Raised by the framework itself (routing, extractors, limits)
    let detail = match axum::body::to_bytes(response.into_body(), FRAMEWORK_BODY_LIMIT).await {
        Ok(bytes) if !bytes.is_empty() => String::from_utf8_lossy(&bytes).into_owned(),
        _ => reason_phrase(status).to_string(),
    };
    handler.render_failure(&FailedRequest::new(
        status,
        Failure::unclassified(anyhow::Error::msg(detail)),
    ))
}

async fn route_not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

fn report_unclassified(status: StatusCode, failure: &Failure) {
    let Failure::Unclassified(inner) = failure else {
        return;
    };
    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), error = %inner, "Unclassified failure");
    } else {
        tracing::warn!(status = status.as_u16(), error = %inner, "Unclassified failure");
    }
}

fn panic_as_failure(payload: Box<dyn Any + Send + 'static>) -> Failure {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };
    Failure::unclassified(anyhow::Error::msg(detail))
}

/// Panics are unclassified failures like any other
fn panic_failure(payload: Box<dyn Any + Send + 'static>) -> Response {
    FailedRequest::new(StatusCode::INTERNAL_SERVER_ERROR, panic_as_failure(payload))
        .into_response()
}

/// Panic recovery for routes outside any API group
///
/// No translation layer sits above it, so the error envelope is rendered
/// directly.
pub(crate) fn panic_envelope(
    debug: bool,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone + Send + Sync + 'static {
    move |payload: Box<dyn Any + Send + 'static>| {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let failure = panic_as_failure(payload);
        report_unclassified(status, &failure);
        let translation = translate(status, Some(&failure), debug);
        (translation.status, translation.envelope).into_response()
    }
}

fn escalate(err: Error) -> Response {
    tracing::error!(error = %err, "Failure translation failed");
    let mut response = Response::new(Body::from(FATAL_BODY));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(APPLICATION_JSON),
    );
    response
}
