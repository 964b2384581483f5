//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. The configuration is loaded once at startup, wrapped in
//! an `Arc`, and injected into every component; nothing reads ambient
//! process-wide state at request time.

pub mod logging;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Name of the environment the API runs in (e.g. `"production"`).
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Default API version reported to clients.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Environments in which exception details may be rendered to clients.
    #[serde(default = "default_show_exception_environments")]
    pub show_exception_environments: Vec<String>,
    /// Envelope key scheme.
    #[serde(default)]
    pub structure: StructureConfig,
    /// Response body compression settings.
    #[serde(default)]
    pub compression: CompressionConfig,
    /// Rate limiting for paginated endpoints.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Response caching for paginated endpoints.
    #[serde(default)]
    pub paginated_cache: PaginatedCacheConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            api_version: default_api_version(),
            show_exception_environments: default_show_exception_environments(),
            structure: StructureConfig::default(),
            compression: CompressionConfig::default(),
            rate_limit: RateLimitConfig::default(),
            paginated_cache: PaginatedCacheConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Envelope key scheme: maps the fixed logical roles to output field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Output key for the success flag.
    #[serde(default = "default_success_key")]
    pub success_key: String,
    /// Output key for the response message.
    #[serde(default = "default_message_key")]
    pub message_key: String,
    /// Output key for the data payload.
    #[serde(default = "default_data_key")]
    pub data_key: String,
    /// Output key for validation errors.
    #[serde(default = "default_errors_key")]
    pub errors_key: String,
    /// Output key for the numeric error code.
    #[serde(default = "default_error_code_key")]
    pub error_code_key: String,
    /// Output key for pagination metadata.
    #[serde(default = "default_meta_key")]
    pub meta_key: String,
    /// Output key for HATEOAS links.
    #[serde(default = "default_links_key")]
    pub links_key: String,
    /// Whether to inject the configured API version into responses.
    #[serde(default = "default_true")]
    pub include_api_version: bool,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            success_key: default_success_key(),
            message_key: default_message_key(),
            data_key: default_data_key(),
            errors_key: default_errors_key(),
            error_code_key: default_error_code_key(),
            meta_key: default_meta_key(),
            links_key: default_links_key(),
            include_api_version: true,
        }
    }
}

/// Response body compression configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    /// Whether gzip compression is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minimum body size in bytes before compression is attempted.
    #[serde(default = "default_compression_threshold")]
    pub threshold_bytes: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_bytes: default_compression_threshold(),
        }
    }
}

/// Rate limiting configuration for paginated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum attempts per decay window.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u64,
    /// Length of the decay window in minutes.
    #[serde(default = "default_decay_minutes")]
    pub decay_minutes: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            decay_minutes: default_decay_minutes(),
        }
    }
}

/// Response caching configuration for paginated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedCacheConfig {
    /// Whether paginated responses are cached.
    #[serde(default)]
    pub enabled: bool,
    /// Prefix applied to every paginated cache key.
    #[serde(default = "default_cache_prefix")]
    pub prefix: String,
    /// TTL for cached paginated responses in seconds.
    #[serde(default = "default_cache_duration")]
    pub duration_seconds: u64,
}

impl Default for PaginatedCacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            prefix: default_cache_prefix(),
            duration_seconds: default_cache_duration(),
        }
    }
}

/// Top-level cache provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache provider type: currently only `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Default TTL for cached entries in seconds.
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: u64,
    /// In-memory cache configuration.
    #[serde(default)]
    pub memory: MemoryCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            default_ttl_seconds: default_ttl(),
            memory: MemoryCacheConfig::default(),
        }
    }
}

/// In-memory cache backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    /// Maximum number of entries in the cache.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// TTL for in-memory entries in seconds.
    #[serde(default = "default_memory_ttl")]
    pub time_to_live_seconds: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            time_to_live_seconds: default_memory_ttl(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `RESPONSEHUB__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("RESPONSEHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_api_version() -> String {
    "1.0".to_string()
}

fn default_show_exception_environments() -> Vec<String> {
    vec![
        "local".to_string(),
        "testing".to_string(),
        "development".to_string(),
    ]
}

fn default_success_key() -> String {
    "success".to_string()
}

fn default_message_key() -> String {
    "message".to_string()
}

fn default_data_key() -> String {
    "data".to_string()
}

fn default_errors_key() -> String {
    "errors".to_string()
}

fn default_error_code_key() -> String {
    "error_code".to_string()
}

fn default_meta_key() -> String {
    "meta".to_string()
}

fn default_links_key() -> String {
    "_links".to_string()
}

fn default_true() -> bool {
    true
}

fn default_compression_threshold() -> usize {
    1024
}

fn default_max_attempts() -> u64 {
    60
}

fn default_decay_minutes() -> u64 {
    1
}

fn default_cache_prefix() -> String {
    "responsehub_paginated_".to_string()
}

fn default_cache_duration() -> u64 {
    3600
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_ttl() -> u64 {
    300
}

fn default_max_capacity() -> u64 {
    10000
}

fn default_memory_ttl() -> u64 {
    300
}
