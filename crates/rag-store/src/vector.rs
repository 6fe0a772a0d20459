//! Pure-vector search primitive (spec §4.3 operation 1).

use rag_core::document::EmbeddingProvider;
use rag_core::search::SearchResult;
use sqlx::{PgPool, Row};

use crate::error::StoreError;
use crate::literal::vector_literal;

/// Clamp `k` into the spec's documented range (spec §4.3 "k is clamped to
/// [1, 100]").
#[must_use]
pub fn clamp_k(k: u32) -> u32 {
    k.clamp(1, 100)
}

/// Returns the `k` chunks minimizing cosine distance to `query_vec`,
/// restricted to rows where `embedding_provider = provider`.
///
/// `dimension` is the dimension declared for `provider` by the caller's
/// provider registry; a mismatch against `query_vec.len()` is reported as
/// [`StoreError::DimensionMismatch`] without issuing any query (spec §4.3
/// scenario 2: "no query is issued to the store").
///
/// # Errors
///
/// Returns [`StoreError::DimensionMismatch`] on a length mismatch, or
/// [`StoreError::StoreUnavailable`] on a connection/transport failure.
pub async fn vector_search(
    pool: &PgPool,
    query_vec: &[f32],
    provider: EmbeddingProvider,
    dimension: usize,
    k: u32,
) -> Result<Vec<SearchResult>, StoreError> {
    if query_vec.len() != dimension {
        return Err(StoreError::DimensionMismatch {
            expected: dimension,
            actual: query_vec.len(),
        });
    }
    let k = clamp_k(k);
    let literal = vector_literal(query_vec);

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
            1.0 - (c.embedding <=> $1::vector) AS similarity
        FROM chunks c
        JOIN documents d ON d.id = c.document_id
        WHERE c.embedding_provider = $2
        ORDER BY c.embedding <=> $1::vector ASC, c.id ASC
        LIMIT $3
        ",
    )
    .bind(&literal)
    .bind(provider.as_str())
    .bind(i64::from(k))
    .fetch_all(&mut *tx)
    .await?;
    tx.commit().await?;

    let results = rows
        .into_iter()
        .map(|row| {
            let similarity: f64 = row.get("similarity");
            SearchResult {
                chunk_id: row.get("chunk_id"),
                document_id: row.get("document_id"),
                chunk_index: u32::try_from(row.get::<i32, _>("chunk_index")).unwrap_or(0),
                content: row.get("content"),
                score: similarity,
                vector_similarity: similarity,
                text_similarity: 0.0,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn k_is_clamped_to_documented_range() {
        assert_eq!(clamp_k(0), 1);
        assert_eq!(clamp_k(1), 1);
        assert_eq!(clamp_k(100), 100);
        assert_eq!(clamp_k(500), 100);
    }
}
