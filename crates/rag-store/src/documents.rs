//! Plain reads over documents (spec §4.3 operation 4).

use chrono::{DateTime, Utc};
use rag_core::document::Document;
use sqlx::{PgPool, Row};

use crate::error::StoreError;

/// A document row augmented with its chunk count, as surfaced over HTTP
/// (spec §6 `GET /documents`).
#[derive(Debug, Clone, serde::Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub chunk_count: i64,
}

/// # Errors
///
/// Returns [`StoreError::NotFound`] if no document has `id`, or
/// [`StoreError::StoreUnavailable`] on a connection/transport failure.
pub async fn get_document(pool: &PgPool, id: &str) -> Result<Document, StoreError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION READ ONLY").execute(&mut *tx).await?;

    let row = sqlx::query(
        "SELECT id, title, source, content, metadata, created_at FROM documents WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;
    tx.commit().await?;

    let row = row.ok_or_else(|| StoreError::NotFound(format!("document {id}")))?;
    Ok(Document {
        id: row.get("id"),
        title: row.get("title"),
        source: row.get("source"),
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
}

/// # Errors
///
/// Returns [`StoreError::StoreUnavailable`] on a connection/transport
/// failure.
pub async fn list_documents(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<DocumentSummary>, StoreError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION READ ONLY").execute(&mut *tx).await?;

    let rows = sqlx::query(
        r"
        SELECT
            d.id, d.title, d.source, d.created_at,
            COUNT(c.id) AS chunk_count
        FROM documents d
        LEFT JOIN chunks c ON c.document_id = d.id
        GROUP BY d.id, d.title, d.source, d.created_at
        ORDER BY d.created_at DESC, d.id ASC
        LIMIT $1 OFFSET $2
        ",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(rows
        .into_iter()
        .map(|row| DocumentSummary {
            id: row.get("id"),
            title: row.get("title"),
            source: row.get("source"),
            created_at: row.get("created_at"),
            chunk_count: row.get("chunk_count"),
        })
        .collect())
}
