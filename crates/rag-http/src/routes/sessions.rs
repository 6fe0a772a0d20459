//! `POST /sessions`, `GET /sessions/{id}` (spec §4.6, §6).

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use rag_core::session::Role;
use serde::{Deserialize, Serialize};

use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub id: String,
}

/// `POST /sessions` body `{ user_id?, metadata? }` -> `{ id }` (spec §6).
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, HttpError> {
    let metadata = if request.metadata.is_null() {
        serde_json::json!({})
    } else {
        request.metadata
    };
    let session = state.store.create_session(request.user_id, metadata).await?;
    Ok(Json(CreateSessionResponse { id: session.id }))
}

#[derive(Debug, Serialize)]
pub struct MessageView {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: String,
    pub messages: Vec<MessageView>,
    pub metadata: serde_json::Value,
}

/// `GET /sessions/{id}` -> `{ id, messages: [{role, content, created_at}],
/// metadata }` (spec §6).
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, HttpError> {
    let session = state.store.get_session(&id).await?;
    // Bounded by the same per-session history window the orchestrator
    // loads for a turn (spec §4.5 LoadHistory).
    let messages = state.store.recent_messages(&id, 50).await?;

    Ok(Json(SessionView {
        id: session.id,
        messages: messages
            .into_iter()
            .map(|m| MessageView {
                role: m.role,
                content: m.content,
                created_at: m.created_at,
            })
            .collect(),
        metadata: serde_json::to_value(session.metadata).unwrap_or_default(),
    }))
}
