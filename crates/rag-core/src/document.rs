//! Document and chunk entities (spec §3).
//!
//! Documents are immutable once ingested; chunks are append-only from the
//! core's perspective. Ingestion itself (chunking, one-shot embedding of a
//! static corpus) is out of scope — these types describe the shape the
//! core reads, not how rows get here.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A provider of text embeddings, tagged so vectors from different
/// providers (and therefore different dimensions) are never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProvider {
    OpenAi,
    Cohere,
    VoyageAi,
    Local,
}

impl EmbeddingProvider {
    /// The dimension this provider is expected to produce, if fixed.
    ///
    /// Dimension is otherwise configured per deployment (`EMBED_DIM`); this
    /// only covers providers with a single well-known default.
    #[must_use]
    pub const fn default_dimension(self) -> Option<usize> {
        match self {
            Self::OpenAi => Some(1536),
            Self::Cohere => Some(1024),
            Self::VoyageAi => Some(1024),
            Self::Local => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Cohere => "cohere",
            Self::VoyageAi => "voyageai",
            Self::Local => "local",
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable source document in the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub source: String,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// A contiguous slice of a document's text paired with a single embedding.
///
/// Invariant: `embedding_dim` equals `embedding.len()` and equals the
/// dimension declared by `embedding_provider`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    /// Non-negative, unique per document.
    pub chunk_index: u32,
    pub content: String,
    pub embedding: Vec<f32>,
    pub embedding_provider: EmbeddingProvider,
    pub embedding_model: String,
    pub embedding_dim: u32,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Chunk {
    /// Check the dimension invariant from spec §3: `embedding_dim` must
    /// equal the actual vector length.
    #[must_use]
    pub fn dimension_is_consistent(&self) -> bool {
        self.embedding.len() == self.embedding_dim as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_consistency_detects_mismatch() {
        let chunk = Chunk {
            id: "chk_1".into(),
            document_id: "doc_1".into(),
            chunk_index: 0,
            content: "hello".into(),
            embedding: vec![0.0; 3],
            embedding_provider: EmbeddingProvider::OpenAi,
            embedding_model: "text-embedding-3-small".into(),
            embedding_dim: 4,
            metadata: HashMap::new(),
        };
        assert!(!chunk.dimension_is_consistent());
    }

    #[test]
    fn provider_display_matches_wire_tag() {
        assert_eq!(EmbeddingProvider::OpenAi.to_string(), "openai");
    }
}
