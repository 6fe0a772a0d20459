//! Near-duplicate suppression over neighboring chunks (spec §4.4 step 6).
//!
//! Groups candidates by `(document_id, chunk_index / 3)` and keeps only
//! the top-scoring representative per group, then re-sorts by descending
//! score.

use std::collections::HashMap;

use rag_core::search::SearchResult;

/// Chunks within this many positions of each other are treated as the
/// "same neighborhood" for diversification (spec §4.4: `chunk_index ÷ 3`).
const GROUP_WIDTH: u32 = 3;

#[must_use]
pub fn diversify(candidates: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut best: HashMap<(String, u32), SearchResult> = HashMap::new();

    for candidate in candidates {
        let group = (candidate.document_id.clone(), candidate.chunk_index / GROUP_WIDTH);
        match best.get(&group) {
            Some(existing) if existing.score >= candidate.score => {}
            _ => {
                best.insert(group, candidate);
            }
        }
    }

    let mut results: Vec<SearchResult> = best.into_values().collect();
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn result(chunk_id: &str, document_id: &str, chunk_index: u32, score: f64) -> SearchResult {
        SearchResult {
            chunk_id: chunk_id.to_string(),
            document_id: document_id.to_string(),
            chunk_index,
            content: "content".to_string(),
            score,
            vector_similarity: score,
            text_similarity: 0.0,
            metadata: Map::new(),
            document_title: "Strategy 101".to_string(),
            document_source: "corpus".to_string(),
        }
    }

    #[test]
    fn keeps_best_representative_per_neighborhood() {
        let candidates = vec![
            result("c0", "doc", 0, 0.5),
            result("c1", "doc", 1, 0.9),
            result("c2", "doc", 2, 0.4),
        ];
        let diversified = diversify(candidates);
        assert_eq!(diversified.len(), 1);
        assert_eq!(diversified[0].chunk_id, "c1");
    }

    #[test]
    fn distinct_neighborhoods_are_both_kept() {
        let candidates = vec![result("c0", "doc", 0, 0.5), result("c3", "doc", 3, 0.6)];
        let diversified = diversify(candidates);
        assert_eq!(diversified.len(), 2);
    }

    #[test]
    fn different_documents_never_collapse() {
        let candidates = vec![result("c0", "doc_a", 0, 0.5), result("c1", "doc_b", 0, 0.5)];
        let diversified = diversify(candidates);
        assert_eq!(diversified.len(), 2);
    }

    #[test]
    fn result_is_sorted_by_descending_score() {
        let candidates = vec![
            result("a", "doc", 0, 0.3),
            result("b", "doc", 10, 0.9),
            result("c", "doc", 20, 0.6),
        ];
        let diversified = diversify(candidates);
        for pair in diversified.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
