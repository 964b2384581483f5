//! Read-only snapshot of the inbound request.

use axum::http::header;
use axum::http::request::Parts;

/// The pieces of the inbound request the response engine reads.
///
/// Built explicitly by the caller (or from axum request parts) and passed
/// into every response-building operation; the engine never reaches into
/// ambient request state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// HTTP method of the request.
    pub method: String,
    /// Full request URL.
    pub url: String,
    /// Client IP address, used as the rate-limit key.
    pub client_ip: String,
    /// `Accept` header, if present.
    pub accept: Option<String>,
    /// `If-None-Match` header, if present.
    pub if_none_match: Option<String>,
    /// `If-Modified-Since` header, if present.
    pub if_modified_since: Option<String>,
}

impl RequestContext {
    /// Create a context with no conditional or negotiation headers.
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        client_ip: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            client_ip: client_ip.into(),
            accept: None,
            if_none_match: None,
            if_modified_since: None,
        }
    }

    /// Set the `Accept` header.
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Set the `If-None-Match` header.
    pub fn with_if_none_match(mut self, etag: impl Into<String>) -> Self {
        self.if_none_match = Some(etag.into());
        self
    }

    /// Set the `If-Modified-Since` header.
    pub fn with_if_modified_since(mut self, date: impl Into<String>) -> Self {
        self.if_modified_since = Some(date.into());
        self
    }

    /// Build a context from axum request parts plus the resolved client IP.
    pub fn from_parts(parts: &Parts, client_ip: impl Into<String>) -> Self {
        let header_value = |name: header::HeaderName| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        Self {
            method: parts.method.to_string(),
            url: parts.uri.to_string(),
            client_ip: client_ip.into(),
            accept: header_value(header::ACCEPT),
            if_none_match: header_value(header::IF_NONE_MATCH),
            if_modified_since: header_value(header::IF_MODIFIED_SINCE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn from_parts_reads_headers() {
        let request = Request::builder()
            .method("GET")
            .uri("http://localhost/api/users?page=2")
            .header("Accept", "application/xml")
            .header("If-None-Match", "abc123")
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();

        let ctx = RequestContext::from_parts(&parts, "10.0.0.9");
        assert_eq!(ctx.method, "GET");
        assert_eq!(ctx.url, "http://localhost/api/users?page=2");
        assert_eq!(ctx.client_ip, "10.0.0.9");
        assert_eq!(ctx.accept.as_deref(), Some("application/xml"));
        assert_eq!(ctx.if_none_match.as_deref(), Some("abc123"));
        assert_eq!(ctx.if_modified_since, None);
    }
}
