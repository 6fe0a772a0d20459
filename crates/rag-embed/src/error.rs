//! Embedding client error types (spec §4.1).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedError {
    /// Input was empty or a batch exceeded size limits.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Retries against the provider were exhausted due to sustained 429s.
    #[error("rate limited after retries exhausted")]
    RateLimited,

    /// The provider returned an HTTP error (and it was not retried, or
    /// retries were exhausted).
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The caller's cancellation token fired mid-request.
    #[error("operation cancelled")]
    Cancelled,

    /// `close()` was already called; the client no longer accepts calls.
    #[error("embedding client is closed")]
    ClientClosed,
}
