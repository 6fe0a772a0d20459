//! Weighted reciprocal-rank fusion of vector and text candidate sets
//! (spec §4.3 operation 3).
//!
//! The fixed RRF primitive lives here; which weights to use for a given
//! query is an application-layer (retrieval pipeline) decision per spec
//! §9's open question about where intent detection belongs.

use std::collections::HashMap;

use rag_core::document::EmbeddingProvider;
use rag_core::search::SearchResult;
use sqlx::PgPool;

use crate::error::StoreError;
use crate::text::text_search;
use crate::vector::{clamp_k, vector_search};

/// Reciprocal-rank-fusion constant (spec §4.3, §GLOSSARY).
const RRF_K: f64 = 60.0;

/// Fuse vector and text candidate sets by weighted reciprocal rank and
/// return the top `k` by fused score.
///
/// Computes two candidate sets of size `2k` (vector top-2k, text top-2k),
/// both restricted to `provider`, then scores each candidate as
/// `w_vec * 1/(RRF_K + rank_vec) + w_text * 1/(RRF_K + rank_text)`
/// (missing ranks contribute 0). Falls back to pure-vector results if the
/// text query matches nothing (spec §4.3 "If no chunks match the text
/// query, hybrid falls back to pure-vector results").
///
/// # Errors
///
/// Propagates [`StoreError`] from either underlying search.
#[allow(clippy::too_many_arguments)]
pub async fn hybrid_search(
    pool: &PgPool,
    query_vec: &[f32],
    query_text: &str,
    provider: EmbeddingProvider,
    dimension: usize,
    k: u32,
    w_vec: f64,
    w_text: f64,
) -> Result<Vec<SearchResult>, StoreError> {
    let k = clamp_k(k);
    let candidate_k = (k * 2).min(100);

    let vector_candidates = vector_search(pool, query_vec, provider, dimension, candidate_k).await?;
    let text_candidates = text_search(pool, query_text, provider, candidate_k).await?;

    if text_candidates.is_empty() {
        let mut fallback = vector_candidates;
        fallback.truncate(k as usize);
        return Ok(fallback);
    }

    Ok(fuse(vector_candidates, text_candidates, w_vec, w_text, k))
}

/// Pure fusion logic, separated from the I/O above so it can be unit
/// tested without a database.
fn fuse(
    vector_candidates: Vec<SearchResult>,
    text_candidates: Vec<SearchResult>,
    w_vec: f64,
    w_text: f64,
    k: u32,
) -> Vec<SearchResult> {
    let mut by_chunk: HashMap<String, SearchResult> = HashMap::new();
    let mut fused_score: HashMap<String, f64> = HashMap::new();

    for (rank, candidate) in vector_candidates.into_iter().enumerate() {
        let contribution = w_vec * (1.0 / (RRF_K + (rank + 1) as f64));
        *fused_score.entry(candidate.chunk_id.clone()).or_insert(0.0) += contribution;
        by_chunk
            .entry(candidate.chunk_id.clone())
            .and_modify(|existing| existing.vector_similarity = candidate.vector_similarity)
            .or_insert(candidate);
    }

    for (rank, candidate) in text_candidates.into_iter().enumerate() {
        let contribution = w_text * (1.0 / (RRF_K + (rank + 1) as f64));
        *fused_score.entry(candidate.chunk_id.clone()).or_insert(0.0) += contribution;
        by_chunk
            .entry(candidate.chunk_id.clone())
            .and_modify(|existing| existing.text_similarity = candidate.text_similarity)
            .or_insert(candidate);
    }

    let mut results: Vec<SearchResult> = by_chunk
        .into_iter()
        .map(|(chunk_id, mut result)| {
            result.score = fused_score.get(&chunk_id).copied().unwrap_or(0.0);
            result
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
    results.truncate(k as usize);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn result(chunk_id: &str, vector_similarity: f64, text_similarity: f64) -> SearchResult {
        SearchResult {
            chunk_id: chunk_id.to_string(),
            document_id: "doc_1".to_string(),
            chunk_index: 0,
            content: "content".to_string(),
            score: 0.0,
            vector_similarity,
            text_similarity,
            metadata: Map::new(),
            document_title: "Strategy 101".to_string(),
            document_source: "corpus".to_string(),
        }
    }

    #[test]
    fn fused_order_is_non_increasing_in_score() {
        let vector_candidates = vec![result("a", 0.9, 0.0), result("b", 0.5, 0.0)];
        let text_candidates = vec![result("b", 0.0, 0.8), result("c", 0.0, 0.3)];

        let fused = fuse(vector_candidates, text_candidates, 0.7, 0.3, 3);

        for pair in fused.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn candidate_present_in_both_sets_outranks_single_set_candidates() {
        let vector_candidates = vec![result("both", 0.8, 0.0), result("vec_only", 0.8, 0.0)];
        let text_candidates = vec![result("both", 0.0, 0.8), result("text_only", 0.0, 0.8)];

        let fused = fuse(vector_candidates, text_candidates, 0.7, 0.3, 4);

        let both = fused.iter().position(|r| r.chunk_id == "both").unwrap();
        assert_eq!(both, 0, "candidate in both sets should rank first");
    }

    #[test]
    fn ties_break_by_chunk_id_ascending() {
        let vector_candidates = vec![result("z", 0.9, 0.0), result("a", 0.9, 0.0)];
        let fused = fuse(vector_candidates, vec![], 1.0, 0.0, 2);
        assert_eq!(fused[0].chunk_id, "a");
        assert_eq!(fused[1].chunk_id, "z");
    }

    #[test]
    fn result_is_truncated_to_k() {
        let vector_candidates = vec![result("a", 0.9, 0.0), result("b", 0.8, 0.0), result("c", 0.7, 0.0)];
        let fused = fuse(vector_candidates, vec![], 1.0, 0.0, 2);
        assert_eq!(fused.len(), 2);
    }
}
