//! # rag-store
//!
//! Vector Store Gateway (spec §4.3): a thin, typed client over a
//! relational store with a vector extension (PostgreSQL + `pgvector`,
//! per the Open Question decision in `DESIGN.md`). Isolates SQL from the
//! rest of the system behind [`gateway::VectorStoreGateway`].
//!
//! Also owns the Session/Message repository (spec §3 places their
//! ownership with "the store").

pub mod documents;
pub mod error;
pub mod gateway;
pub mod hybrid;
pub mod literal;
pub mod pool;
pub mod sessions;
pub mod text;
pub mod vector;

pub use documents::DocumentSummary;
pub use error::StoreError;
pub use gateway::VectorStoreGateway;
