//! `POST /chat`, `POST /chat/stream` (spec §4.6, §4.5, wire shape spec §6).

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt as _};
use rag_agent::StreamEvent;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub search_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CitationView {
    pub document_id: String,
    pub document_title: String,
    pub chunk_id: String,
    pub score: f64,
}

impl From<rag_agent::Citation> for CitationView {
    fn from(c: rag_agent::Citation) -> Self {
        Self {
            document_id: c.document_id,
            document_title: c.document_title,
            chunk_id: c.chunk_id,
            score: c.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub citations: Vec<CitationView>,
}

/// Resolve or create the session this turn belongs to (spec §4.5 `Init`).
async fn resolve_session(state: &AppState, session_id: Option<String>) -> Result<String, HttpError> {
    match session_id {
        Some(id) => {
            // Validates the session exists before the orchestrator touches
            // its history (spec §6 `GET /sessions/{id}` 404 shape carries
            // over to an unknown `session_id` on `POST /chat`).
            state.store.get_session(&id).await?;
            Ok(id)
        }
        None => Ok(state.store.create_session(None, serde_json::json!({})).await?.id),
    }
}

/// Folds the optional `search_type` hint into the text handed to the
/// model. The orchestrator's tool registry (spec §4.5) exposes
/// `vector_search`/`hybrid_search` as independently callable tools; this
/// hint steers which one the model prefers without hard-wiring a fixed
/// tool choice into the turn loop.
fn with_search_type_hint(message: &str, search_type: Option<&str>) -> String {
    match search_type {
        Some(kind) if kind != "auto" => format!("[preferred_search:{kind}] {message}"),
        _ => message.to_string(),
    }
}

/// `POST /chat` body `{ session_id?, message, search_type? }` -> `{
/// response, session_id, citations }` (spec §6).
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, HttpError> {
    if request.message.trim().is_empty() {
        return Err(HttpError::new(
            axum::http::StatusCode::BAD_REQUEST,
            "message must not be empty",
        ));
    }

    let session_id = resolve_session(&state, request.session_id).await?;
    let message = with_search_type_hint(&request.message, request.search_type.as_deref());

    let outcome = state
        .orchestrator
        .run_turn(&session_id, &message, CancellationToken::new())
        .await?;

    Ok(Json(ChatResponse {
        response: outcome.content,
        session_id,
        citations: outcome.citations.into_iter().map(CitationView::from).collect(),
    }))
}

/// `POST /chat/stream`: same body as `POST /chat`; response is a stream of
/// server-sent events, `token | citation | end | error`, each carrying a
/// JSON `data` payload (spec §6).
///
/// Cancellation (spec §4.5, §8 scenario 5): the per-turn run is spawned
/// onto its own task wired to a [`CancellationToken`]. If the client
/// disconnects, axum drops the SSE body stream, which drops the channel
/// receiver; the next event the orchestrator tries to send fails, which
/// it treats as cancellation and abandons the turn without persisting an
/// assistant message.
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, HttpError> {
    if request.message.trim().is_empty() {
        return Err(HttpError::new(
            axum::http::StatusCode::BAD_REQUEST,
            "message must not be empty",
        ));
    }

    let session_id = resolve_session(&state, request.session_id).await?;
    let message = with_search_type_hint(&request.message, request.search_type.as_deref());

    let (tx, rx) = tokio::sync::mpsc::channel::<StreamEvent>(32);
    let cancellation = CancellationToken::new();
    let orchestrator = state.orchestrator.clone();
    let turn_session_id = session_id.clone();
    let turn_cancellation = cancellation.clone();

    tokio::spawn(async move {
        orchestrator
            .run_turn_streaming(&turn_session_id, &message, turn_cancellation, tx)
            .await;
    });

    // If the SSE response body is ever dropped without the channel being
    // drained to `None` (a disconnect mid-stream), fire the cancellation
    // token as a backstop so the spawned turn unwinds promptly even if it
    // is currently blocked somewhere that doesn't itself touch the
    // channel (e.g. a store round-trip between tool calls).
    let guard = CancelOnDrop(cancellation);

    let stream = ReceiverStream::new(rx).map(move |event| {
        let _keep_alive = &guard;
        Ok(Event::default().event(event.event_name()).json_data(event.data()).unwrap_or_else(|_| {
            Event::default().event("error").data("event serialization failed")
        }))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

struct CancelOnDrop(CancellationToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        debug!("chat stream dropped, cancelling in-flight turn");
        self.0.cancel();
    }
}
