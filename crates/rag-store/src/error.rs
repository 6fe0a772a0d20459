//! Vector store gateway error types (spec §4.3, §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A vector query's length did not match the dimension declared for
    /// its provider. A programming defect, not a transient condition
    /// (spec §7: reported as 500).
    #[error("dimension mismatch: provider declares {expected}, query vector has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The provider tag has no declared dimension registered with this
    /// gateway.
    #[error("unknown embedding provider: {0}")]
    UnknownProvider(String),

    /// Connection or transport failure talking to the store. The gateway
    /// never retries this itself (spec §4.3) — callers decide.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Input failed validation before a query was issued.
    #[error("validation error: {0}")]
    Validation(String),

    /// Entity lookup returned no result.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::StoreUnavailable(e.to_string())
    }
}
