//! `POST /search/{vector|text|hybrid}` (spec §4.6, §6).

use axum::Json;
use axum::extract::{Path, State};
use rag_core::search::{SearchMode, SearchResult};
use serde::{Deserialize, Serialize};

use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_k")]
    pub k: u32,
    /// Accepted for wire-shape parity with spec §6; the retrieval pipeline
    /// does not yet have a metadata filter predicate to apply it to
    /// (ingestion/filter schema is out of scope, spec §1).
    #[serde(default)]
    pub filters: Option<serde_json::Value>,
}

const fn default_k() -> u32 {
    5
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// Populated for `hybrid` only, when intent detection ran (spec §8
    /// scenario 6: exposing the chosen weights in a debug field).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_intent: Option<rag_core::search::Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_weights: Option<(f64, f64)>,
}

async fn run_search(
    state: &AppState,
    request: SearchRequest,
    mode: SearchMode,
) -> Result<Json<SearchResponse>, HttpError> {
    let outcome = state.pipeline.retrieve(&request.query, mode, request.k).await?;
    Ok(Json(SearchResponse {
        results: outcome.results,
        debug_intent: outcome.intent,
        debug_weights: outcome.weights,
    }))
}

/// Dispatches on the `{vector|text|hybrid}` path segment so the three
/// routes can share one handler registration (spec §6 lists them as one
/// family, `POST /search/vector|text|hybrid`).
pub async fn dispatch(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, HttpError> {
    let mode = match kind.as_str() {
        "vector" => SearchMode::Vector,
        "text" => SearchMode::Text,
        "hybrid" => SearchMode::Hybrid,
        other => {
            return Err(HttpError::new(
                axum::http::StatusCode::NOT_FOUND,
                format!("unknown search type: {other}"),
            ));
        }
    };
    run_search(&state, request, mode).await
}
