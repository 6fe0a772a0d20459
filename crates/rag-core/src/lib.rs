//! # rag-core
//!
//! Shared domain types and cross-cutting error kinds for the retrieval
//! engine. Every other crate in the workspace depends on this one; it
//! depends on nothing else in the workspace.
//!
//! - Entity structs for the data model (documents, chunks, sessions, messages)
//! - Embedding and search result types shared by the embedding client,
//!   cache, store gateway, and retrieval pipeline
//! - Tool invocation types shared by the agent orchestrator and HTTP surface
//! - ID generation helpers
//! - Cross-cutting error types

pub mod document;
pub mod embedding;
pub mod errors;
pub mod ids;
pub mod search;
pub mod session;
pub mod tool;

pub use document::{Chunk, Document, EmbeddingProvider};
pub use embedding::{Embedding, EmbeddingRequest};
pub use errors::CoreError;
pub use search::{Intent, SearchMode, SearchResult};
pub use session::{Message, Role, Session};
pub use tool::{ToolInvocation, ToolName};
