//! # acton-jsend
//!
//! JSON REST conventions for axum services: JSend envelopes, per-role
//! content types, injected database access and a failure translator that
//! keeps internal error details away from clients.
//!
//! ## Features
//!
//! - **JSend envelopes**: `success`, `fail` and `error` bodies via [`jsend::JSend`]
//! - **Handler roles**: [`handlers::ApiHandler`] for JSON, [`handlers::ViewHandler`] for HTML
//! - **Failure translation**: domain and validation errors are shown verbatim,
//!   unclassified errors only in debug mode
//! - **Database accessor**: fails fast when no connection was injected
//! - **Configuration**: figment layering of defaults, files and `ACTON_` env vars
//! - **Graceful shutdown**: SIGTERM and SIGINT handling
//!
//! ## Example
//!
//! ```rust,no_run
//! use acton_jsend::prelude::*;
//! use axum::{routing::get, Router};
//!
//! async fn quota() -> ApiResult<Envelope> {
//!     Err(ApiError::bad_request("quota exceeded").into())
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let api = ApiHandler::new(BaseHandler::<()>::new(config.clone()));
//!     let app = api.wrap(Router::new().route("/quota", get(quota)));
//!
//!     Server::new(config).serve(app).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod failure;
pub mod handlers;
pub mod jsend;
pub mod observability;
pub mod response;
pub mod server;

#[cfg(feature = "database")]
pub mod database;

/// Commonly used types
pub mod prelude {
    pub use crate::config::{Config, DatabaseConfig, MiddlewareConfig, ServiceConfig};

    pub use crate::error::{Error, Result};
    pub use crate::failure::{
        api_assert, ApiError, ApiResult, FailedRequest, Failure, ValidationError,
    };
    pub use crate::handlers::{
        ApiHandler, BaseHandler, HandlerRole, ValidatedJson, ViewHandler,
    };
    pub use crate::jsend::{Envelope, JSend};
    pub use crate::observability::init_tracing;
    pub use crate::response::ResponseWriter;
    pub use crate::server::Server;
}
