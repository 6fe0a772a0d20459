//! `GET /documents`, `GET /documents/{id}` (spec §4.6, §6).

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

const fn default_limit() -> i64 {
    20
}

/// `GET /documents?limit=&offset=` -> `[ {id, title, source, created_at,
/// chunk_count} ]` (spec §6).
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<rag_store::DocumentSummary>>, HttpError> {
    let documents = state.store.list_documents(query.limit, query.offset).await?;
    Ok(Json(documents))
}

/// `GET /documents/{id}` -> full document metadata and chunk count (spec §6).
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<rag_core::document::Document>, HttpError> {
    let document = state.store.get_document(&id).await?;
    Ok(Json(document))
}
