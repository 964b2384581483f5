//! Collaborator traits consumed by the response engine.
//!
//! The engine never talks to a concrete router, translation catalog, rate
//! limiter, or cache directly; it is handed implementations of these traits
//! at construction time.

pub mod cache;
pub mod rate_limit;
pub mod router;
pub mod translator;

pub use cache::CacheProvider;
pub use rate_limit::RateLimiter;
pub use router::{RouteInfo, RouteResolver};
pub use translator::Translator;
