//! The stored cache entry shape (spec §3).

use std::time::Instant;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Vec<u8>,
    pub size_bytes: u64,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl CacheEntry {
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}
