//! # responsehub-cache
//!
//! Counter and cache providers for ResponseHub:
//!
//! - **memory**: In-process response cache using [moka](https://crates.io/crates/moka)
//! - **rate_limit**: Fixed-window in-memory rate limiter
//!
//! The cache provider is selected at runtime based on configuration.

pub mod keys;
pub mod memory;
pub mod provider;
pub mod rate_limit;

pub use provider::CacheManager;
pub use rate_limit::MemoryRateLimiter;
