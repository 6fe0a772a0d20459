//! # rag-http
//!
//! HTTP Surface (spec §4.6): request routing, JSON and server-sent-event
//! responses, session lifecycle, health/liveness. One logical task per
//! request (axum's per-connection/per-request task model); shared state
//! (cache, pools, pipeline, orchestrator) is reached only through its
//! typed API (spec §4.6 Concurrency, §5 Shared-resource policy).

pub mod error;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub use error::HttpError;
pub use state::AppState;

/// Build the full router: every route in spec §4.6/§6, plus the
/// cross-cutting middleware (body size limit, CORS allow-list, request
/// tracing) spec §4.6 requires.
#[must_use]
pub fn build_router(state: AppState, cors_origins: &[String], max_request_bytes: usize) -> Router {
    let cors = build_cors_layer(cors_origins);

    Router::new()
        .route("/sessions", post(routes::sessions::create_session))
        .route("/sessions/{id}", get(routes::sessions::get_session))
        .route("/chat", post(routes::chat::chat))
        .route("/chat/stream", post(routes::chat::chat_stream))
        .route("/search/{kind}", post(routes::search::dispatch))
        .route("/documents", get(routes::documents::list_documents))
        .route("/documents/{id}", get(routes::documents::get_document))
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_request_bytes))
        .with_state(state)
}

/// An empty allow-list means no browser origin is granted access — the
/// restrictive default (spec §6 `CORS_ORIGINS` has no stated default,
/// so this project does not guess an open one).
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
        .max_age(Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_origin_list_yields_a_closed_cors_layer() {
        // Smoke test: building the layer with no origins must not panic,
        // and is exercised end-to-end by the router integration tests.
        let _layer = build_cors_layer(&[]);
    }
}
