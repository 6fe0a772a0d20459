//! Cross-cutting error types for the retrieval engine.
//!
//! This module defines errors that can originate from any crate in the
//! system. Domain-specific errors (e.g. `StoreError`, `CacheError`) are
//! defined in their respective crates and typically wrap these.

use thiserror::Error;

/// Errors that can be raised by any crate in the workspace.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (size, shape, missing field).
    #[error("validation error: {0}")]
    Validation(String),

    /// A vector operation crossed provider or dimension boundaries.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The caller (client disconnect, shutdown) cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
