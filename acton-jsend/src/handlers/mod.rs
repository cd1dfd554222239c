//! Handler roles
//!
//! Every endpoint group is wrapped by one role:
//!
//! - [`ApiHandler`] answers with `application/json` and translates every
//!   failure in the group into a JSend envelope
//! - [`ViewHandler`] answers with `text/html`
//!
//! Both sit on a [`BaseHandler`] carrying the configuration and the injected
//! database connection.
//!
//! # Example
//!
//! ```rust,no_run
//! use acton_jsend::prelude::*;
//! use axum::{routing::get, Router};
//!
//! async fn quota() -> ApiResult<Envelope> {
//!     Err(ApiError::bad_request("quota exceeded").into())
//! }
//!
//! let api = ApiHandler::new(BaseHandler::<()>::new(Config::default()));
//! let app: Router = api.wrap(Router::new().route("/quota", get(quota)));
//! ```

mod api;
mod base;
mod extract;
mod role;
mod view;

pub use api::{translate, ApiHandler, Translation};
pub(crate) use api::panic_envelope;
pub use base::BaseHandler;
pub use extract::{ValidatedJson, MALFORMED_JSON};
pub use role::HandlerRole;
pub use view::ViewHandler;
