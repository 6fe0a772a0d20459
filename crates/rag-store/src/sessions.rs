//! Session/Message repository (spec §3: owned by the store, append-only).
//!
//! Lives alongside the vector store gateway rather than in its own crate
//! because spec §3 places Session/Message ownership with "the store" and
//! both share this crate's connection pool.

use chrono::Utc;
use rag_core::ids::new_id;
use rag_core::session::{Message, Role, Session};
use sqlx::{PgPool, Row};

use crate::error::StoreError;

fn role_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
        Role::Tool => "tool",
    }
}

fn parse_role(s: &str) -> Role {
    match s {
        "assistant" => Role::Assistant,
        "system" => Role::System,
        "tool" => Role::Tool,
        _ => Role::User,
    }
}

/// # Errors
///
/// Returns [`StoreError::StoreUnavailable`] on a connection/transport
/// failure.
pub async fn create_session(
    pool: &PgPool,
    user_id: Option<String>,
    metadata: serde_json::Value,
) -> Result<Session, StoreError> {
    let id = new_id("sess");
    let created_at = Utc::now();

    sqlx::query("INSERT INTO sessions (id, user_id, metadata, created_at) VALUES ($1, $2, $3, $4)")
        .bind(&id)
        .bind(&user_id)
        .bind(&metadata)
        .bind(created_at)
        .execute(pool)
        .await?;

    Ok(Session {
        id,
        user_id,
        metadata: metadata.as_object().cloned().unwrap_or_default().into_iter().collect(),
        created_at,
    })
}

/// # Errors
///
/// Returns [`StoreError::NotFound`] if no session has `id`.
pub async fn get_session(pool: &PgPool, id: &str) -> Result<Session, StoreError> {
    let row = sqlx::query("SELECT id, user_id, metadata, created_at FROM sessions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    let row = row.ok_or_else(|| StoreError::NotFound(format!("session {id}")))?;
    Ok(Session {
        id: row.get("id"),
        user_id: row.get("user_id"),
        metadata: row
            .get::<serde_json::Value, _>("metadata")
            .as_object()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .collect(),
        created_at: row.get("created_at"),
    })
}

/// Append one message to a session's log. Ordering is enforced by
/// `created_at` (assigned here, monotonic per caller) with `id` as the tie
/// break (spec §3).
///
/// # Errors
///
/// Returns [`StoreError::StoreUnavailable`] on a connection/transport
/// failure.
pub async fn append_message(
    pool: &PgPool,
    session_id: &str,
    role: Role,
    content: String,
    metadata: serde_json::Value,
) -> Result<Message, StoreError> {
    let id = new_id("msg");
    let created_at = Utc::now();

    sqlx::query(
        "INSERT INTO messages (id, session_id, role, content, metadata, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&id)
    .bind(session_id)
    .bind(role_str(role))
    .bind(&content)
    .bind(&metadata)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(Message {
        id,
        session_id: session_id.to_string(),
        role,
        content,
        metadata: metadata.as_object().cloned().unwrap_or_default().into_iter().collect(),
        created_at,
    })
}

/// Fetch the last `limit` messages of a session, oldest first, ordered by
/// `created_at` then `id` (spec §3, §4.5 "`LoadHistory`... bounded by
/// token budget" — the caller applies the token budget on top of this
/// count-bounded fetch).
///
/// # Errors
///
/// Returns [`StoreError::StoreUnavailable`] on a connection/transport
/// failure.
pub async fn recent_messages(
    pool: &PgPool,
    session_id: &str,
    limit: i64,
) -> Result<Vec<Message>, StoreError> {
    let rows = sqlx::query(
        r"
        SELECT id, session_id, role, content, metadata, created_at
        FROM (
            SELECT id, session_id, role, content, metadata, created_at
            FROM messages
            WHERE session_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
        ) recent
        ORDER BY created_at ASC, id ASC
        ",
    )
    .bind(session_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Message {
            id: row.get("id"),
            session_id: row.get("session_id"),
            role: parse_role(row.get::<String, _>("role").as_str()),
            content: row.get("content"),
            metadata: row
                .get::<serde_json::Value, _>("metadata")
                .as_object()
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .collect(),
            created_at: row.get("created_at"),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_wire_string() {
        for role in [Role::User, Role::Assistant, Role::System, Role::Tool] {
            assert_eq!(parse_role(role_str(role)), role);
        }
    }

    #[test]
    fn unknown_role_string_defaults_to_user() {
        assert_eq!(parse_role("bogus"), Role::User);
    }
}
