//! # responsehub-core
//!
//! Core crate for ResponseHub. Contains collaborator traits, configuration
//! schemas, envelope and link types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ResponseHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
