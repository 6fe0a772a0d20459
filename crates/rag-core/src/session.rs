//! Session and message entities (spec §3).
//!
//! Sessions are created on first turn and never mutated except metadata.
//! Messages are append-only; ordering is by `created_at`, ties broken by
//! `id`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// The role a message is attributed to, matching the chat-completion
/// "role/content/tool_calls" shape the LLM provider speaks (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Check the ordering invariant from spec §3 over a session's message log:
/// `created_at` is non-decreasing and an assistant message is strictly
/// preceded by a user or tool message.
#[must_use]
pub fn messages_are_well_ordered(messages: &[Message]) -> bool {
    let mut last_time = None;
    let mut preceding_role: Option<Role> = None;
    for m in messages {
        if let Some(prev) = last_time
            && m.created_at < prev
        {
            return false;
        }
        if m.role == Role::Assistant
            && !matches!(preceding_role, Some(Role::User) | Some(Role::Tool))
        {
            return false;
        }
        last_time = Some(m.created_at);
        preceding_role = Some(m.role);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn msg(role: Role, offset_secs: i64) -> Message {
        Message {
            id: format!("msg_{offset_secs}"),
            session_id: "sess_1".into(),
            role,
            content: "hi".into(),
            metadata: HashMap::new(),
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn user_then_assistant_is_well_ordered() {
        let messages = vec![msg(Role::User, 0), msg(Role::Assistant, 1)];
        assert!(messages_are_well_ordered(&messages));
    }

    #[test]
    fn assistant_without_preceding_turn_is_rejected() {
        let messages = vec![msg(Role::Assistant, 0)];
        assert!(!messages_are_well_ordered(&messages));
    }

    #[test]
    fn out_of_order_timestamps_are_rejected() {
        let messages = vec![msg(Role::User, 5), msg(Role::Assistant, 1)];
        assert!(!messages_are_well_ordered(&messages));
    }
}
