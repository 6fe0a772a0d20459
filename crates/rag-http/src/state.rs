//! Shared application state handed to every handler via [`axum::extract::State`].

use std::sync::Arc;

use rag_agent::AgentOrchestrator;
use rag_cache::Cache;
use rag_retrieve::RetrievalPipeline;
use rag_store::VectorStoreGateway;

/// Everything a handler needs, behind one cheap `Arc` clone per request.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RetrievalPipeline>,
    pub orchestrator: Arc<AgentOrchestrator>,
    pub store: VectorStoreGateway,
    pub cache: Arc<Cache>,
    /// Whether a graph store is configured (spec §6 `GRAPH_URL`), reported
    /// verbatim by `GET /health` (spec §4.6). Graph construction itself is
    /// out of scope (spec §1); this is purely a configuration flag.
    pub graph_configured: bool,
}

impl AppState {
    #[must_use]
    pub const fn new(
        pipeline: Arc<RetrievalPipeline>,
        orchestrator: Arc<AgentOrchestrator>,
        store: VectorStoreGateway,
        cache: Arc<Cache>,
        graph_configured: bool,
    ) -> Self {
        Self {
            pipeline,
            orchestrator,
            store,
            cache,
            graph_configured,
        }
    }
}
