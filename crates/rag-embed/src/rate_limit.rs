//! Sliding 60-second rate window (spec §4.1).

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(60);

/// Tracks request timestamps in a sliding 60s window and makes callers wait
/// when the window is full.
pub struct RateLimiter {
    limit: u32,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(limit_per_min: u32) -> Self {
        Self {
            limit: limit_per_min,
            timestamps: Mutex::new(VecDeque::new()),
        }
    }

    /// Block until there is room in the window, then record a slot.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut timestamps = self.timestamps.lock().await;
                let now = Instant::now();
                while let Some(&front) = timestamps.front() {
                    if now.duration_since(front) >= WINDOW {
                        timestamps.pop_front();
                    } else {
                        break;
                    }
                }

                if timestamps.len() < self.limit as usize {
                    timestamps.push_back(now);
                    None
                } else {
                    let oldest = *timestamps.front().expect("window is full, front exists");
                    Some(WINDOW - now.duration_since(oldest))
                }
            };

            match wait {
                None => return,
                Some(duration) => tokio::time::sleep(duration).await,
            }
        }
    }

    /// Fraction of the window currently in use, in `[0.0, 1.0]`. Used to
    /// decide whether to shrink the dynamic batch size (spec §4.1).
    pub async fn utilization(&self) -> f64 {
        let mut timestamps = self.timestamps.lock().await;
        let now = Instant::now();
        while let Some(&front) = timestamps.front() {
            if now.duration_since(front) >= WINDOW {
                timestamps.pop_front();
            } else {
                break;
            }
        }
        f64::from(u32::try_from(timestamps.len()).unwrap_or(u32::MAX)) / f64::from(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_does_not_block_under_limit() {
        let limiter = RateLimiter::new(5);
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(limiter.utilization().await >= 0.99);
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_blocks_until_window_clears() {
        let limiter = RateLimiter::new(1);
        limiter.acquire().await;

        let start = Instant::now();
        // spawn so we can advance the paused clock concurrently
        let handle = tokio::spawn(async move {
            limiter.acquire().await;
            limiter
        });
        tokio::time::advance(Duration::from_secs(61)).await;
        let limiter = handle.await.unwrap();
        assert!(Instant::now().duration_since(start) >= Duration::from_secs(60));
        assert!(limiter.utilization().await <= 1.0);
    }
}
