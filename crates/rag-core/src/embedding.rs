//! Transient embedding types shared between the embedding client, cache,
//! and retrieval pipeline (spec §3).

use serde::{Deserialize, Serialize};

/// A request to embed a single piece of text. Transient — never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    pub text: String,
}

/// A fixed-length vector representation of a text.
pub type Embedding = Vec<f32>;
