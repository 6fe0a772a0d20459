//! # rag-agent
//!
//! Agent Orchestrator (spec §4.5): drives a chat turn through history
//! load, model call, tool loop, and persistence. Exposes a typed tool
//! registry over the retrieval pipeline and store gateway, and a thin
//! HTTP client for the external LLM provider.

pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod state;
pub mod stream;
pub mod tool;

pub use error::AgentError;
pub use llm::{ChatCompletion, ChatMessage, ChatRequest, HttpLlmClient, LlmClient, LlmConfig, ToolCall};
pub use orchestrator::{AgentOrchestrator, TurnOutcome, LLM_TIMEOUT, MAX_TOOL_CALLS, TOOL_TIMEOUT, TURN_TIMEOUT};
pub use state::Citation;
pub use stream::StreamEvent;
pub use tool::{
    GetDocumentTool, HybridSearchTool, ListDocumentsTool, SearchTool, ToolContext, ToolRegistry,
    UnavailableGraphTool, VectorSearchTool,
};
