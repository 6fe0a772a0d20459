//! Cache error types.
//!
//! The cache never masks errors from the computation it memoizes (spec
//! §7) — it caches only successful results. This enum exists for the
//! cache's own bookkeeping failures (over-budget puts), not for wrapping
//! backing-store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    /// A single entry's size exceeds the total byte budget; it can never
    /// fit no matter how much else is evicted.
    #[error("entry of {size} bytes exceeds the cache budget of {budget} bytes")]
    EntryTooLarge { size: u64, budget: u64 },
}
