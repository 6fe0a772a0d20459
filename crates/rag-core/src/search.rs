//! Search result and query-shaping types shared by the store gateway and
//! retrieval pipeline (spec §3, §4.3, §4.4).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Which retrieval primitive a query should use. `Auto` triggers intent
/// detection in the retrieval pipeline (spec §4.4 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Vector,
    Text,
    Hybrid,
    Auto,
}

/// A coarse classification of a user query, used to pick hybrid-search
/// weights (spec §4.4 step 2-3). Detection is deterministic and
/// side-effect free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Factual,
    Conceptual,
    Procedural,
    Balanced,
}

impl Intent {
    /// The (`w_vec`, `w_text`) weight pair for hybrid search (spec §4.4 step 3).
    #[must_use]
    pub const fn hybrid_weights(self) -> (f64, f64) {
        match self {
            Self::Factual => (0.4, 0.6),
            Self::Conceptual => (0.8, 0.2),
            Self::Procedural => (0.6, 0.4),
            Self::Balanced => (0.7, 0.3),
        }
    }
}

/// A single ranked passage, ephemeral and produced per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk_id: String,
    pub document_id: String,
    /// Carried so the retrieval pipeline can diversify by
    /// `(document_id, chunk_index / 3)` (spec §4.4 step 6) without a
    /// second store round-trip.
    pub chunk_index: u32,
    pub content: String,
    /// Final, fused score used for ranking.
    pub score: f64,
    /// Raw cosine similarity, carried for observability (spec §4.3).
    pub vector_similarity: f64,
    /// Raw lexical rank, carried for observability (spec §4.3).
    pub text_similarity: f64,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub document_title: String,
    pub document_source: String,
}
