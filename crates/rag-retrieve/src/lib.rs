//! # rag-retrieve
//!
//! Retrieval Pipeline (spec §4.4): turns a query string into a ranked,
//! citation-bearing passage list. Orchestrates the embedding client, the
//! cache layer, and the vector store gateway; applies intent detection,
//! dynamic hybrid weighting, and near-duplicate diversification.

pub mod diversify;
pub mod error;
pub mod intent;
pub mod pipeline;

pub use error::RetrieveError;
pub use intent::detect_intent;
pub use pipeline::{MAX_QUERY_CHARS, RetrieveOutcome, RetrievalPipeline};
