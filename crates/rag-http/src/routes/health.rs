//! `GET /health` composite liveness (spec §4.6, §6).

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: Status,
    pub store: bool,
    pub graph_store: Option<bool>,
    pub llm: bool,
}

/// `GET /health` -> `{ status: healthy|degraded|unhealthy, store,
/// graph_store, llm }` (spec §6). `graph_store` is `null` when no graph
/// backend is configured (spec §1: knowledge-graph construction is a
/// pluggable, out-of-scope collaborator).
pub async fn health(State(state): State<AppState>) -> Response {
    let store_ok = state.store.ping().await.is_ok();
    let llm_ok = state.orchestrator.llm_health().await;
    let graph_store = state.graph_configured.then_some(true);

    let status = if store_ok && llm_ok {
        Status::Healthy
    } else if store_ok || llm_ok {
        Status::Degraded
    } else {
        Status::Unhealthy
    };

    let code = match status {
        Status::Healthy | Status::Degraded => StatusCode::OK,
        Status::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        code,
        Json(HealthResponse {
            status,
            store: store_ok,
            graph_store,
            llm: llm_ok,
        }),
    )
        .into_response()
}
