//! Agent orchestrator error types (spec §4.5, §7).

use rag_retrieve::RetrieveError;
use rag_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// The model invoked a tool name the registry does not recognize
    /// (spec §4.5 "Unknown tools produce a typed error returned to the
    /// model").
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments failed schema validation.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// The per-turn tool-call budget (spec §4.5, e.g. 8) was exceeded.
    #[error("tool call budget of {budget} exceeded for this turn")]
    ToolBudgetExceeded { budget: u32 },

    /// A session referenced by id does not exist.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The LLM provider returned an error or an unparseable response.
    #[error("LLM provider error: {0}")]
    Llm(String),

    /// A turn, tool call, or LLM call exceeded its deadline (spec §4.5).
    #[error("deadline exceeded: {0}")]
    Timeout(String),

    /// Client disconnect or shutdown cancelled the turn (spec §4.5
    /// Cancellation). Not surfaced as an error to the user.
    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Retrieve(#[from] RetrieveError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
