//! Retrieval pipeline error types (spec §4.4, §7).

use rag_cache::CacheError;
use rag_embed::EmbedError;
use rag_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrieveError {
    /// The query was empty or exceeded `MAX_QUERY_CHARS` (spec §4.4 step 1).
    #[error("validation error: {0}")]
    Validation(String),

    /// The store is unreachable; the pipeline surfaces this rather than
    /// returning a silent empty result (spec §4.4 "Failure semantics").
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The embedding client's own over-budget rejection, distinct from a
    /// degrade-to-text path (which swallows transient embedding errors).
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Embed(#[from] EmbedError),
}
