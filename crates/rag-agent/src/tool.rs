//! The tool registry (spec §3, §4.5): validates and dispatches model-issued
//! tool calls against the retrieval pipeline and the store gateway.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rag_core::search::SearchMode;
use rag_core::tool::ToolName;
use rag_retrieve::RetrievalPipeline;
use rag_store::VectorStoreGateway;
use schemars::schema_for;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use crate::error::AgentError;
use crate::llm::ToolSchema;

/// Per-invocation context threaded through a tool call: a cancellation
/// token the orchestrator can fire on shutdown or client disconnect, and
/// the deadline the call must respect (spec §4.5, 10s default).
#[derive(Clone)]
pub struct ToolContext {
    pub cancellation: CancellationToken,
}

/// A tool the orchestrator can expose to the LLM.
#[async_trait]
pub trait SearchTool: Send + Sync {
    fn name(&self) -> ToolName;

    /// JSON schema for the tool's arguments, handed to the LLM so it can
    /// construct a well-formed call (spec §9 Design Notes: derived from
    /// the argument type, never duplicated by hand).
    fn schema(&self) -> Value;

    async fn invoke(&self, arguments: Value, ctx: &ToolContext) -> Result<Value, AgentError>;

    fn description(&self) -> &'static str;
}

fn invalid_arguments(tool: ToolName, err: serde_json::Error) -> AgentError {
    AgentError::InvalidArguments {
        tool: tool.to_string(),
        reason: err.to_string(),
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct VectorSearchArgs {
    query: String,
    #[serde(default = "default_k")]
    k: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct HybridSearchArgs {
    query: String,
    #[serde(default = "default_k")]
    k: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GetDocumentArgs {
    document_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ListDocumentsArgs {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

const fn default_k() -> u32 {
    5
}

const fn default_limit() -> i64 {
    20
}

/// Wraps [`RetrievalPipeline::retrieve`] for vector-only search.
pub struct VectorSearchTool {
    pipeline: Arc<RetrievalPipeline>,
}

impl VectorSearchTool {
    #[must_use]
    pub const fn new(pipeline: Arc<RetrievalPipeline>) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl SearchTool for VectorSearchTool {
    fn name(&self) -> ToolName {
        ToolName::VectorSearch
    }

    fn schema(&self) -> Value {
        serde_json::to_value(schema_for!(VectorSearchArgs)).unwrap_or(Value::Null)
    }

    fn description(&self) -> &'static str {
        "Search the knowledge base by semantic similarity."
    }

    async fn invoke(&self, arguments: Value, _ctx: &ToolContext) -> Result<Value, AgentError> {
        let args: VectorSearchArgs =
            serde_json::from_value(arguments).map_err(|e| invalid_arguments(self.name(), e))?;
        let outcome = self
            .pipeline
            .retrieve(&args.query, SearchMode::Vector, args.k)
            .await?;
        Ok(json!({ "results": outcome.results }))
    }
}

/// Wraps [`RetrievalPipeline::retrieve`] for hybrid vector+text search.
pub struct HybridSearchTool {
    pipeline: Arc<RetrievalPipeline>,
}

impl HybridSearchTool {
    #[must_use]
    pub const fn new(pipeline: Arc<RetrievalPipeline>) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl SearchTool for HybridSearchTool {
    fn name(&self) -> ToolName {
        ToolName::HybridSearch
    }

    fn schema(&self) -> Value {
        serde_json::to_value(schema_for!(HybridSearchArgs)).unwrap_or(Value::Null)
    }

    fn description(&self) -> &'static str {
        "Search the knowledge base using both semantic similarity and keyword relevance."
    }

    async fn invoke(&self, arguments: Value, _ctx: &ToolContext) -> Result<Value, AgentError> {
        let args: HybridSearchArgs =
            serde_json::from_value(arguments).map_err(|e| invalid_arguments(self.name(), e))?;
        let outcome = self
            .pipeline
            .retrieve(&args.query, SearchMode::Auto, args.k)
            .await?;
        Ok(json!({
            "results": outcome.results,
            "intent": outcome.intent,
        }))
    }
}

/// Fetches a single document by id from the store gateway.
pub struct GetDocumentTool {
    store: VectorStoreGateway,
}

impl GetDocumentTool {
    #[must_use]
    pub const fn new(store: VectorStoreGateway) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SearchTool for GetDocumentTool {
    fn name(&self) -> ToolName {
        ToolName::GetDocument
    }

    fn schema(&self) -> Value {
        serde_json::to_value(schema_for!(GetDocumentArgs)).unwrap_or(Value::Null)
    }

    fn description(&self) -> &'static str {
        "Fetch a single document by id."
    }

    async fn invoke(&self, arguments: Value, _ctx: &ToolContext) -> Result<Value, AgentError> {
        let args: GetDocumentArgs =
            serde_json::from_value(arguments).map_err(|e| invalid_arguments(self.name(), e))?;
        let document = self.store.get_document(&args.document_id).await?;
        Ok(json!(document))
    }
}

/// Lists documents in the store, paginated.
pub struct ListDocumentsTool {
    store: VectorStoreGateway,
}

impl ListDocumentsTool {
    #[must_use]
    pub const fn new(store: VectorStoreGateway) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SearchTool for ListDocumentsTool {
    fn name(&self) -> ToolName {
        ToolName::ListDocuments
    }

    fn schema(&self) -> Value {
        serde_json::to_value(schema_for!(ListDocumentsArgs)).unwrap_or(Value::Null)
    }

    fn description(&self) -> &'static str {
        "List documents stored in the knowledge base."
    }

    async fn invoke(&self, arguments: Value, _ctx: &ToolContext) -> Result<Value, AgentError> {
        let args: ListDocumentsArgs =
            serde_json::from_value(arguments).map_err(|e| invalid_arguments(self.name(), e))?;
        let summaries = self.store.list_documents(args.limit, args.offset).await?;
        Ok(json!({ "documents": summaries }))
    }
}

/// Knowledge-graph tools are pluggable per spec §1; graph construction is
/// out of scope for this crate, so the registry ships a typed stub that
/// reports the capability as unavailable rather than panicking or
/// silently no-opping.
pub struct UnavailableGraphTool {
    tool_name: ToolName,
}

impl UnavailableGraphTool {
    #[must_use]
    pub const fn new(tool_name: ToolName) -> Self {
        Self { tool_name }
    }
}

#[async_trait]
impl SearchTool for UnavailableGraphTool {
    fn name(&self) -> ToolName {
        self.tool_name
    }

    fn schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn description(&self) -> &'static str {
        "Unavailable: no knowledge graph backend is configured."
    }

    async fn invoke(&self, _arguments: Value, _ctx: &ToolContext) -> Result<Value, AgentError> {
        Err(AgentError::UnknownTool(format!(
            "{} is not backed by a knowledge graph in this deployment",
            self.tool_name
        )))
    }
}

/// Validates and dispatches tool calls by name (spec §4.5 `ToolLoop`).
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<HashMap<ToolName, Arc<dyn SearchTool>>>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new(tools: Vec<Arc<dyn SearchTool>>) -> Self {
        let map = tools.into_iter().map(|t| (t.name(), t)).collect();
        Self {
            tools: Arc::new(map),
        }
    }

    #[must_use]
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .values()
            .map(|tool| ToolSchema {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.schema(),
            })
            .collect()
    }

    /// # Errors
    ///
    /// Returns [`AgentError::UnknownTool`] if `name` is not registered, or
    /// propagates the tool's own invocation error.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Value,
        ctx: &ToolContext,
    ) -> Result<Value, AgentError> {
        let tool = ToolName::all()
            .iter()
            .find(|t| t.as_str() == name)
            .and_then(|t| self.tools.get(t))
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))?;
        tool.invoke(arguments, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl SearchTool for EchoTool {
        fn name(&self) -> ToolName {
            ToolName::GetDocument
        }

        fn schema(&self) -> Value {
            json!({})
        }

        fn description(&self) -> &'static str {
            "echo"
        }

        async fn invoke(&self, arguments: Value, _ctx: &ToolContext) -> Result<Value, AgentError> {
            Ok(arguments)
        }
    }

    #[tokio::test]
    async fn dispatch_finds_registered_tool_by_name() {
        let registry = ToolRegistry::new(vec![Arc::new(EchoTool)]);
        let ctx = ToolContext {
            cancellation: CancellationToken::new(),
        };
        let result = registry
            .dispatch("get_document", json!({"a": 1}), &ctx)
            .await
            .unwrap();
        assert_eq!(result, json!({"a": 1}));
    }

    #[tokio::test]
    async fn dispatch_rejects_unknown_tool_name() {
        let registry = ToolRegistry::new(vec![]);
        let ctx = ToolContext {
            cancellation: CancellationToken::new(),
        };
        let err = registry
            .dispatch("does_not_exist", json!({}), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::UnknownTool(_)));
    }
}
