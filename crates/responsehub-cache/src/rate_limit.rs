//! Fixed-window in-memory rate limiter.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use responsehub_core::traits::rate_limit::RateLimiter;

/// Simple in-memory fixed-window rate limiter.
///
/// Each key owns a window that starts on its first attempt and lasts for
/// the decay duration given to that attempt. Attempts inside the window
/// count against the limit; once the window expires the next attempt
/// starts a fresh one.
#[derive(Debug, Default)]
pub struct MemoryRateLimiter {
    /// Key → active window state.
    windows: DashMap<String, Window>,
}

#[derive(Debug, Clone)]
struct Window {
    started: Instant,
    decay: Duration,
    hits: u64,
}

impl Window {
    fn expired(&self) -> bool {
        self.started.elapsed() >= self.decay
    }
}

impl MemoryRateLimiter {
    /// Creates a new rate limiter.
    pub fn new() -> Self {
        Self::default()
    }

    fn active_window(&self, key: &str) -> Option<Window> {
        self.windows
            .get(key)
            .map(|entry| entry.value().clone())
            .filter(|window| !window.expired())
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn remaining(&self, key: &str, max_attempts: u64) -> u64 {
        match self.active_window(key) {
            Some(window) => max_attempts.saturating_sub(window.hits),
            None => max_attempts,
        }
    }

    async fn available_in(&self, key: &str) -> u64 {
        match self.active_window(key) {
            Some(window) => window
                .decay
                .saturating_sub(window.started.elapsed())
                .as_secs(),
            None => 0,
        }
    }

    async fn attempt(&self, key: &str, max_attempts: u64, decay: Duration) -> bool {
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window {
                started: Instant::now(),
                decay,
                hits: 0,
            });

        if entry.expired() {
            entry.started = Instant::now();
            entry.decay = decay;
            entry.hits = 0;
        }

        if entry.hits < max_attempts {
            entry.hits += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_up_to_max_attempts() {
        let limiter = MemoryRateLimiter::new();
        let decay = Duration::from_secs(60);

        assert!(limiter.attempt("ip1", 2, decay).await);
        assert!(limiter.attempt("ip1", 2, decay).await);
        assert!(!limiter.attempt("ip1", 2, decay).await);
    }

    #[tokio::test]
    async fn remaining_counts_down() {
        let limiter = MemoryRateLimiter::new();
        let decay = Duration::from_secs(60);

        assert_eq!(limiter.remaining("ip2", 3).await, 3);
        limiter.attempt("ip2", 3, decay).await;
        assert_eq!(limiter.remaining("ip2", 3).await, 2);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let limiter = MemoryRateLimiter::new();
        let decay = Duration::from_secs(60);

        assert!(limiter.attempt("a", 1, decay).await);
        assert!(!limiter.attempt("a", 1, decay).await);
        assert!(limiter.attempt("b", 1, decay).await);
    }

    #[tokio::test]
    async fn expired_window_resets() {
        let limiter = MemoryRateLimiter::new();
        let decay = Duration::from_millis(10);

        assert!(limiter.attempt("c", 1, decay).await);
        assert!(!limiter.attempt("c", 1, decay).await);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(limiter.attempt("c", 1, decay).await);
        assert_eq!(limiter.available_in("missing").await, 0);
    }
}
