//! Lexical (full-text) search primitive (spec §4.3 operation 2).

use rag_core::document::EmbeddingProvider;
use rag_core::search::SearchResult;
use sqlx::{PgPool, Row};

use crate::error::StoreError;
use crate::vector::clamp_k;

/// Cover-density rank, normalized by document length (`ts_rank_cd` bitmask
/// 32), restricted to rows where `embedding_provider = provider` so text
/// and vector results stay comparable for hybrid fusion.
///
/// # Errors
///
/// Returns [`StoreError::StoreUnavailable`] on a connection/transport
/// failure.
pub async fn text_search(
    pool: &PgPool,
    query_text: &str,
    provider: EmbeddingProvider,
    k: u32,
) -> Result<Vec<SearchResult>, StoreError> {
    let k = clamp_k(k);

    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION READ ONLY").execute(&mut *tx).await?;

    let rows = sqlx::query(
        r"
        SELECT
            c.id AS chunk_id,
            c.document_id,
            c.chunk_index,
            c.content,
            c.metadata,
            d.title AS document_title,
            d.source AS document_source,
            ts_rank_cd(to_tsvector('english', c.content), plainto_tsquery('english', $1), 32) AS rank
        FROM chunks c
        JOIN documents d ON d.id = c.document_id
        WHERE c.embedding_provider = $2
          AND to_tsvector('english', c.content) @@ plainto_tsquery('english', $1)
        ORDER BY rank DESC, c.id ASC
        LIMIT $3
        ",
    )
    .bind(query_text)
    .bind(provider.as_str())
    .bind(i64::from(k))
    .fetch_all(&mut *tx)
    .await?;
    tx.commit().await?;

    let results = rows
        .into_iter()
        .map(|row| {
            let rank: f64 = row.get("rank");
            SearchResult {
                chunk_id: row.get("chunk_id"),
                document_id: row.get("document_id"),
                chunk_index: u32::try_from(row.get::<i32, _>("chunk_index")).unwrap_or(0),
                content: row.get("content"),
                score: rank,
                vector_similarity: 0.0,
                text_similarity: rank,
                metadata: row
                    .get::<serde_json::Value, _>("metadata")
                    .as_object()
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .collect(),
                document_title: row.get("document_title"),
                document_source: row.get("document_source"),
            }
        })
        .collect();

    Ok(results)
}
