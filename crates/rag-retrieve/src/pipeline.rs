//! The retrieval pipeline itself (spec §4.4).

use std::sync::Arc;

use rag_cache::{Cache, fingerprint};
use rag_core::document::EmbeddingProvider;
use rag_core::search::{Intent, SearchMode, SearchResult};
use rag_embed::Embedder;
use rag_store::VectorStoreGateway;
use tracing::warn;

use crate::diversify::diversify;
use crate::error::RetrieveError;
use crate::intent::detect_intent;

/// Queries longer than this are rejected outright (spec §4.4 step 1).
pub const MAX_QUERY_CHARS: usize = 4000;

/// The result of a `retrieve` call, including the debug fields spec §8
/// scenario 6 requires for verifying intent routing.
#[derive(Debug, Clone)]
pub struct RetrieveOutcome {
    pub results: Vec<SearchResult>,
    /// Populated only when `mode` was `Auto`.
    pub intent: Option<Intent>,
    /// The (`w_vec`, `w_text`) pair actually used, when hybrid fusion ran.
    pub weights: Option<(f64, f64)>,
    /// Set when an embedding failure forced a vector/hybrid query to
    /// degrade to pure text (spec §4.4 "Failure semantics").
    pub degraded_to_text: bool,
}

pub struct RetrievalPipeline {
    embedder: Arc<dyn Embedder>,
    cache: Arc<Cache>,
    store: VectorStoreGateway,
    provider: EmbeddingProvider,
    model: String,
    cache_ttl: std::time::Duration,
}

impl RetrievalPipeline {
    #[must_use]
    pub fn new(
        embedder: Arc<dyn Embedder>,
        cache: Arc<Cache>,
        store: VectorStoreGateway,
        provider: EmbeddingProvider,
        model: String,
        cache_ttl: std::time::Duration,
    ) -> Self {
        Self {
            embedder,
            cache,
            store,
            provider,
            model,
            cache_ttl,
        }
    }

    /// Normalize the query: trim, collapse internal whitespace runs to a
    /// single space (spec §4.4 step 1).
    fn normalize(query: &str) -> Result<String, RetrieveError> {
        let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return Err(RetrieveError::Validation("query must not be empty".into()));
        }
        if normalized.chars().count() > MAX_QUERY_CHARS {
            return Err(RetrieveError::Validation(format!(
                "query exceeds MAX_QUERY_CHARS ({MAX_QUERY_CHARS})"
            )));
        }
        Ok(normalized)
    }

    /// Embed `query` via the cache, falling back to the embedding client
    /// on a miss (spec §4.4 step 4).
    async fn embed_cached(&self, query: &str) -> Result<Vec<f32>, RetrieveError> {
        let key = fingerprint(format!("{query}|{}|{}", self.provider, self.model).as_bytes());

        if let Some(bytes) = self.cache.get(&key) {
            if let Ok(vector) = serde_json::from_slice::<Vec<f32>>(&bytes) {
                self.cache.record_backing_success();
                return Ok(vector);
            }
        }

        match self.embedder.embed_one(query.to_string()).await {
            Ok(vector) => {
                self.cache.record_backing_success();
                if let Ok(bytes) = serde_json::to_vec(&vector) {
                    let _ = self.cache.put(&key, bytes, Some(self.cache_ttl));
                }
                Ok(vector)
            }
            Err(e) => {
                self.cache.record_backing_failure();
                Err(RetrieveError::Embed(e))
            }
        }
    }

    /// Translate a user query string into a ranked, citation-bearing
    /// passage list (spec §4.4).
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::Validation`] on an empty or oversize
    /// query, or propagates a store error (the pipeline never silently
    /// returns empty results on a store failure).
    pub async fn retrieve(
        &self,
        query: &str,
        mode: SearchMode,
        k: u32,
    ) -> Result<RetrieveOutcome, RetrieveError> {
        if k == 0 {
            return Ok(RetrieveOutcome {
                results: Vec::new(),
                intent: None,
                weights: None,
                degraded_to_text: false,
            });
        }

        let query = Self::normalize(query)?;

        let (intent, weights) = match mode {
            SearchMode::Hybrid | SearchMode::Auto => {
                let intent = detect_intent(&query);
                (Some(intent), Some(intent.hybrid_weights()))
            }
            SearchMode::Vector | SearchMode::Text => (None, None),
        };

        let wants_vector = matches!(
            mode,
            SearchMode::Vector | SearchMode::Hybrid | SearchMode::Auto
        );

        let (results, degraded_to_text) = if wants_vector {
            match self.embed_cached(&query).await {
                Ok(query_vec) => {
                    let results = match mode {
                        SearchMode::Vector => {
                            self.store.vector_search(&query_vec, self.provider, k).await?
                        }
                        SearchMode::Hybrid | SearchMode::Auto => {
                            let (w_vec, w_text) = weights.unwrap_or((0.7, 0.3));
                            self.store
                                .hybrid_search(&query_vec, &query, self.provider, k, w_vec, w_text)
                                .await?
                        }
                        SearchMode::Text => unreachable!("wants_vector excludes Text"),
                    };
                    (results, false)
                }
                Err(e) => {
                    warn!(error = %e, "embedding failed, degrading to pure text search");
                    let results = self.store.text_search(&query, self.provider, k).await?;
                    (results, true)
                }
            }
        } else {
            (self.store.text_search(&query, self.provider, k).await?, false)
        };

        let diversified = diversify(results);
        let mut top_k = diversified;
        #[allow(clippy::cast_possible_truncation)]
        top_k.truncate(k as usize);

        Ok(RetrieveOutcome {
            results: top_k,
            intent,
            weights,
            degraded_to_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(
            RetrievalPipeline::normalize("  what   is\tstrategy  ").unwrap(),
            "what is strategy"
        );
    }

    #[test]
    fn normalize_rejects_empty_query() {
        assert!(RetrievalPipeline::normalize("   ").is_err());
    }

    #[test]
    fn normalize_rejects_oversize_query() {
        let long = "a".repeat(MAX_QUERY_CHARS + 1);
        assert!(RetrievalPipeline::normalize(&long).is_err());
    }

    #[test]
    fn normalize_accepts_exactly_max_chars() {
        let exact = "a".repeat(MAX_QUERY_CHARS);
        assert!(RetrievalPipeline::normalize(&exact).is_ok());
    }
}
