//! The per-turn state machine (spec §4.5): `Init` -> `LoadHistory` ->
//! `CallModel` -> (`ToolLoop` | `Emit`) -> `Persist` -> `End`.
//!
//! The machine is represented as an enum the orchestrator's `run_turn`
//! loop matches on rather than a generic state-transition table, matching
//! the shape of plain sequential control flow the teacher corpus favors
//! for request-scoped work.

use rag_core::session::Message;

use crate::llm::ToolCall;

/// A citation attached to an assistant reply, carrying enough of the
/// originating chunk to let a client render a source link (spec §6).
#[derive(Debug, Clone, serde::Serialize)]
pub struct Citation {
    pub document_id: String,
    pub document_title: String,
    pub chunk_id: String,
    pub score: f64,
}

/// The current step of a turn in progress.
#[derive(Debug)]
pub enum TurnState {
    Init,
    LoadHistory,
    CallModel { history: Vec<Message> },
    ToolLoop { history: Vec<Message>, pending: Vec<ToolCall> },
    Emit { history: Vec<Message>, content: String, citations: Vec<Citation> },
    Persist { content: String, citations: Vec<Citation> },
    End { content: String, citations: Vec<Citation> },
}
