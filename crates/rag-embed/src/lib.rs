//! # rag-embed
//!
//! Connection-pooled, rate-limited, batching embedding client (spec §4.1).
//!
//! Wraps a remote text-to-vector HTTP provider. The shared `reqwest`
//! client, the bounded-concurrency semaphore, and the sliding rate-limit
//! window are this crate's only mutable state — no per-call globals.

pub mod batching;
pub mod client;
pub mod error;
pub mod rate_limit;

pub use client::{EmbedConfig, EmbedOutcome, Embedder, HttpEmbeddingClient, MAX_CHARS};
pub use error::EmbedError;
