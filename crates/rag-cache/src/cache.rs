//! The cache itself: LRU + TTL + byte budget, single-lock, with a circuit
//! breaker over whatever backing computation the caller wraps (spec §4.2).

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::circuit::{CircuitBreaker, CircuitState};
use crate::entry::CacheEntry;
use crate::error::CacheError;

const DEFAULT_TTL: Duration = Duration::from_secs(3600);
const BREAKER_THRESHOLD: u32 = 5;
const BREAKER_COOLDOWN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub bytes_used: u64,
    pub entries: usize,
}

struct Inner {
    lru: LruCache<String, CacheEntry>,
    bytes_used: u64,
}

/// An in-memory, byte-budgeted, TTL-expiring LRU cache with a circuit
/// breaker. Safe under concurrent access: a single lock protects the LRU
/// structure and byte accounting, and no I/O or long work happens while
/// it's held (spec §4.2 Concurrency).
pub struct Cache {
    budget_bytes: u64,
    default_ttl: Duration,
    inner: Mutex<Inner>,
    breaker: CircuitBreaker,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    closed: AtomicBool,
}

impl Cache {
    #[must_use]
    pub fn new(budget_bytes: u64) -> Self {
        Self::with_ttl(budget_bytes, DEFAULT_TTL)
    }

    #[must_use]
    pub fn with_ttl(budget_bytes: u64, default_ttl: Duration) -> Self {
        Self {
            budget_bytes,
            default_ttl,
            inner: Mutex::new(Inner {
                // unbounded by count; eviction is driven by byte budget and
                // TTL, not a fixed entry count.
                lru: LruCache::unbounded(),
                bytes_used: 0,
            }),
            breaker: CircuitBreaker::new(BREAKER_THRESHOLD, BREAKER_COOLDOWN),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Look up a key. Returns `None` on a genuine miss, an expired entry,
    /// or when the circuit breaker is open (spec §4.2: "In Open state,
    /// `get` returns miss immediately").
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        if self.breaker.state() == CircuitState::Open {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        let now = Instant::now();
        let hit = match inner.lru.get(key) {
            Some(entry) if entry.is_expired(now) => {
                let size = entry.size_bytes;
                inner.lru.pop(key);
                inner.bytes_used -= size;
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        };
        drop(inner);

        if hit.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    /// Insert a value, evicting least-recently-used entries until it fits
    /// the byte budget. A `put` while the breaker is open is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::EntryTooLarge`] if `value.len()` alone exceeds
    /// the total byte budget.
    pub fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<(), CacheError> {
        if self.closed.load(Ordering::Acquire) || self.breaker.state() == CircuitState::Open {
            return Ok(());
        }

        let size = value.len() as u64;
        if size > self.budget_bytes {
            return Err(CacheError::EntryTooLarge {
                size,
                budget: self.budget_bytes,
            });
        }

        let now = Instant::now();
        let entry = CacheEntry {
            value,
            size_bytes: size,
            created_at: now,
            expires_at: now + ttl.unwrap_or(self.default_ttl),
        };

        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        if let Some(old) = inner.lru.peek(key) {
            inner.bytes_used -= old.size_bytes;
        }

        let mut evicted = 0u64;
        while inner.bytes_used + size > self.budget_bytes {
            match inner.lru.pop_lru() {
                Some((_, evicted_entry)) => {
                    inner.bytes_used -= evicted_entry.size_bytes;
                    evicted += 1;
                }
                None => break,
            }
        }

        inner.bytes_used += size;
        inner.lru.put(key.to_string(), entry);
        drop(inner);

        if evicted > 0 {
            self.evictions.fetch_add(evicted, Ordering::Relaxed);
        }
        Ok(())
    }

    pub fn invalidate(&self, key: &str) {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        if let Some(entry) = inner.lru.pop(key) {
            inner.bytes_used -= entry.size_bytes;
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner.lru.clear();
        inner.bytes_used = 0;
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().expect("cache mutex poisoned");
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            bytes_used: inner.bytes_used,
            entries: inner.lru.len(),
        }
    }

    /// Record the outcome of the backing computation/store this cache
    /// wraps. The cache never infers success/failure itself — callers
    /// report it explicitly so the circuit breaker tracks the right thing.
    pub fn record_backing_success(&self) {
        self.breaker.record_success();
    }

    pub fn record_backing_failure(&self) {
        self.breaker.record_failure();
    }

    #[must_use]
    pub fn breaker_state(&self) -> CircuitState {
        self.breaker.state()
    }

    /// Release any resources and stop serving further calls. Safe to call
    /// concurrently with in-flight `get`/`put` (spec §4.2).
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let cache = Cache::new(1024);
        cache.put("k", b"v".to_vec(), None).unwrap();
        assert_eq!(cache.get("k"), Some(b"v".to_vec()));
    }

    #[test]
    fn miss_is_recorded() {
        let cache = Cache::new(1024);
        assert_eq!(cache.get("missing"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn byte_budget_is_never_exceeded() {
        let cache = Cache::new(30);
        for i in 0..10 {
            let _ = cache.put(&format!("k{i}"), vec![0u8; 10], None);
        }
        assert!(cache.stats().bytes_used <= 30);
    }

    #[test]
    fn eviction_is_least_recently_used() {
        let cache = Cache::new(20);
        cache.put("a", vec![0u8; 10], None).unwrap();
        cache.put("b", vec![0u8; 10], None).unwrap();
        // touch "a" so "b" becomes the LRU entry
        assert!(cache.get("a").is_some());
        cache.put("c", vec![0u8; 10], None).unwrap();
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn entry_larger_than_budget_is_rejected() {
        let cache = Cache::new(10);
        let err = cache.put("k", vec![0u8; 20], None).unwrap_err();
        assert!(matches!(err, CacheError::EntryTooLarge { .. }));
    }

    #[test]
    fn expired_entry_is_treated_as_miss() {
        let cache = Cache::with_ttl(1024, Duration::from_millis(1));
        cache.put("k", b"v".to_vec(), None).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn per_call_ttl_overrides_default() {
        let cache = Cache::new(1024);
        cache
            .put("k", b"v".to_vec(), Some(Duration::from_millis(1)))
            .unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn circuit_breaker_short_circuits_gets_when_open() {
        let cache = Cache::new(1024);
        cache.put("k", b"v".to_vec(), None).unwrap();
        for _ in 0..5 {
            cache.record_backing_failure();
        }
        assert_eq!(cache.breaker_state(), CircuitState::Open);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn hits_plus_misses_equals_total_gets() {
        let cache = Cache::new(1024);
        cache.put("k", b"v".to_vec(), None).unwrap();
        let mut total = 0;
        for _ in 0..3 {
            cache.get("k");
            total += 1;
        }
        for _ in 0..2 {
            cache.get("missing");
            total += 1;
        }
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, total);
    }

    #[test]
    fn invalidate_removes_entry_and_frees_bytes() {
        let cache = Cache::new(1024);
        cache.put("k", vec![0u8; 10], None).unwrap();
        cache.invalidate("k");
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().bytes_used, 0);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = Cache::new(1024);
        cache.put("a", vec![0u8; 10], None).unwrap();
        cache.put("b", vec![0u8; 10], None).unwrap();
        cache.clear();
        assert_eq!(cache.stats().entries, 0);
        assert_eq!(cache.stats().bytes_used, 0);
    }
}
