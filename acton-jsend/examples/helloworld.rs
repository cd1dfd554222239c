//! Hello World Example
//!
//! This example demonstrates:
//! - A JSON API group whose failures are rendered as JSend envelopes
//! - An HTML view group using the view role content type
//! - Injecting a connection-like resource into the handler base
//!
//! Run with: cargo run --example helloworld
//!
//! Test with:
//!   curl http://localhost:8080/api/hello
//!   curl http://localhost:8080/api/notes
//!   curl -X POST http://localhost:8080/api/notes \
//!     -H "Content-Type: application/json" -d '{"text":"buy milk"}'
//!   curl -X POST http://localhost:8080/api/notes \
//!     -H "Content-Type: application/json" -d '{"text":""}'
//!   curl http://localhost:8080/api/divide/0
//!   ACTON_SERVICE_DEBUG=true cargo run --example helloworld

use std::sync::{Arc, RwLock};

use acton_jsend::prelude::*;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;

type Notes = Arc<RwLock<Vec<String>>>;

#[derive(Debug, Deserialize)]
struct NewNote {
    text: String,
}

async fn hello() -> Envelope {
    JSend::success(serde_json::json!({ "message": "Hello, World!" }))
}

async fn list_notes(State(api): State<ApiHandler<Notes>>) -> ApiResult<Envelope<Vec<String>>> {
    let notes = api
        .db_conn()?
        .read()
        .map_err(|e| Failure::unclassified(anyhow::anyhow!("notes lock poisoned: {e}")))?
        .clone();
    Ok(JSend::success(notes))
}

async fn add_note(
    State(api): State<ApiHandler<Notes>>,
    ValidatedJson(note): ValidatedJson<NewNote>,
) -> ApiResult<Envelope<usize>> {
    api_assert(
        !note.text.trim().is_empty(),
        StatusCode::BAD_REQUEST,
        "Note text must not be empty",
    )?;

    let mut notes = api
        .db_conn()?
        .write()
        .map_err(|e| Failure::unclassified(anyhow::anyhow!("notes lock poisoned: {e}")))?;
    notes.push(note.text);
    Ok(JSend::success(notes.len()))
}

async fn divide(Path(divisor): Path<i64>) -> ApiResult<Envelope<i64>> {
    100_i64
        .checked_div(divisor)
        .map(JSend::success)
        .ok_or_else(|| Failure::unclassified(anyhow::anyhow!("division by zero")))
}

async fn index() -> &'static str {
    "<h1>Hello, World!</h1><p>See <a href=\"/api/hello\">/api/hello</a></p>"
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    let notes: Notes = Arc::default();
    let base = BaseHandler::new(config.clone()).with_db_conn(notes);

    let api = ApiHandler::new(base.clone());
    let api_routes = api.wrap(
        Router::new()
            .route("/hello", get(hello))
            .route("/notes", get(list_notes).post(add_note))
            .route("/divide/{divisor}", get(divide))
            .with_state(api.clone()),
    );

    let views = ViewHandler::new(base).wrap(Router::new().route("/", get(index)));

    let app = Router::new().nest("/api", api_routes).merge(views);

    Server::new(config).serve(app).await
}
