//! Server-sent-event payloads for `POST /chat/stream` (spec §4.5 `Emit`,
//! wire shape spec §6): `{type: "token" | "citation" | "end" | "error",
//! data}`.
//!
//! The upstream LLM provider's own incremental-delta streaming is an
//! external-collaborator detail (spec §1); [`crate::llm::chunk_into_tokens`]
//! reproduces the client-observable token cadence from a completed
//! response rather than parsing partial provider deltas (spec §9).

use serde::Serialize;

use crate::state::Citation;

/// One event in the `/chat/stream` SSE channel.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Token(String),
    Citation(Citation),
    End { content: String, citations: Vec<Citation> },
    Error(String),
}

#[derive(Serialize)]
struct TokenPayload<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct EndPayload<'a> {
    content: &'a str,
    citations: &'a [Citation],
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    message: &'a str,
}

impl StreamEvent {
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Token(_) => "token",
            Self::Citation(_) => "citation",
            Self::End { .. } => "end",
            Self::Error(_) => "error",
        }
    }

    /// The `data` payload for this event, already shaped as JSON.
    #[must_use]
    pub fn data(&self) -> serde_json::Value {
        match self {
            Self::Token(text) => serde_json::json!(TokenPayload { text }),
            Self::Citation(citation) => serde_json::json!(citation),
            Self::End { content, citations } => serde_json::json!(EndPayload { content, citations }),
            Self::Error(message) => serde_json::json!(ErrorPayload { message }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_event_carries_its_text_in_data() {
        let event = StreamEvent::Token("hello ".to_string());
        assert_eq!(event.event_name(), "token");
        assert_eq!(event.data()["text"], "hello ");
    }

    #[test]
    fn end_event_carries_content_and_citations() {
        let event = StreamEvent::End {
            content: "answer".to_string(),
            citations: vec![],
        };
        assert_eq!(event.event_name(), "end");
        assert_eq!(event.data()["content"], "answer");
    }
}
