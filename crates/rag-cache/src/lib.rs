//! # rag-cache
//!
//! In-memory cache layer with LRU eviction, TTL expiry, byte-budget
//! enforcement, and a circuit breaker over the computation it memoizes
//! (spec §4.2).

pub mod cache;
pub mod circuit;
pub mod entry;
pub mod error;
pub mod fingerprint;

pub use cache::{Cache, CacheStats};
pub use circuit::CircuitState;
pub use error::CacheError;
pub use fingerprint::fingerprint;
