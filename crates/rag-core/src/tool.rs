//! Tool invocation types shared by the agent orchestrator and HTTP surface
//! (spec §3, §4.5).
//!
//! The tool registry itself (validation, dispatch) lives in `rag-agent` —
//! this crate only carries the wire-level shape so `rag-http` can surface
//! tool activity to clients without depending on the orchestrator.

use serde::{Deserialize, Serialize};

/// The fixed set of tools the agent orchestrator may expose to the LLM.
/// `graph_search`, `get_entity_relationships`, and `get_entity_timeline`
/// are pluggable per spec §1 — the core ships a typed stub for them since
/// knowledge-graph construction is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    VectorSearch,
    HybridSearch,
    GraphSearch,
    GetDocument,
    ListDocuments,
    GetEntityRelationships,
    GetEntityTimeline,
}

impl ToolName {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VectorSearch => "vector_search",
            Self::HybridSearch => "hybrid_search",
            Self::GraphSearch => "graph_search",
            Self::GetDocument => "get_document",
            Self::ListDocuments => "list_documents",
            Self::GetEntityRelationships => "get_entity_relationships",
            Self::GetEntityTimeline => "get_entity_timeline",
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::VectorSearch,
            Self::HybridSearch,
            Self::GraphSearch,
            Self::GetDocument,
            Self::ListDocuments,
            Self::GetEntityRelationships,
            Self::GetEntityTimeline,
        ]
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tool call/result pair, as surfaced to clients and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: ToolName,
    pub arguments: serde_json::Value,
    pub result: serde_json::Value,
}
