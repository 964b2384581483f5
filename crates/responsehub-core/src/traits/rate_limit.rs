//! Rate limiter trait for pluggable counting backends.

use std::time::Duration;

use async_trait::async_trait;

/// Trait for rate-limiting backends.
///
/// Counters are keyed by an opaque string (the engine uses the client IP).
/// The backend owns the counter storage and window bookkeeping; the engine
/// only reads remaining/reset values and attempts to consume.
#[async_trait]
pub trait RateLimiter: Send + Sync + std::fmt::Debug + 'static {
    /// Number of attempts left in the current window for `key`.
    async fn remaining(&self, key: &str, max_attempts: u64) -> u64;

    /// Seconds until the current window for `key` resets. Zero when no
    /// window is active.
    async fn available_in(&self, key: &str) -> u64;

    /// Try to consume one attempt. Returns `true` when the attempt was
    /// allowed and counted, `false` when the limit is exhausted.
    async fn attempt(&self, key: &str, max_attempts: u64, decay: Duration) -> bool;
}
