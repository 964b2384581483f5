//! Cache key builders for ResponseHub cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use sha2::{Digest, Sha256};

/// Cache key for a paginated response.
///
/// The payload is the serialized page data plus the outgoing headers; two
/// requests producing the same payload share the same cached response.
pub fn paginated_response(prefix: &str, payload: &[u8]) -> String {
    let digest = Sha256::digest(payload);
    format!("{prefix}{digest:x}")
}

/// Rate limit counter key for a client IP.
pub fn rate_limit(client_ip: &str) -> String {
    format!("api_rate_limit:{client_ip}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginated_key_is_prefixed_hex_digest() {
        let key = paginated_response("responsehub_paginated_", b"payload");
        assert!(key.starts_with("responsehub_paginated_"));
        assert_eq!(key.len(), "responsehub_paginated_".len() + 64);
    }

    #[test]
    fn identical_payloads_share_a_key() {
        let a = paginated_response("p_", b"same");
        let b = paginated_response("p_", b"same");
        let c = paginated_response("p_", b"different");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
