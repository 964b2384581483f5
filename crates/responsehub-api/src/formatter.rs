//! Envelope shaping and wire-response assembly.
//!
//! [`ResponseFormatter`] is a stateless transform: it shapes arbitrary data
//! into the canonical envelope under the current key scheme, negotiates the
//! output format, serializes, and applies the compression gate. Everything
//! it needs arrives through its arguments or the injected configuration.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use base64::Engine as _;
use base64::prelude::BASE64_STANDARD;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};

use responsehub_core::config::ApiConfig;
use responsehub_core::error::AppError;
use responsehub_core::result::AppResult;
use responsehub_core::types::{RequestContext, ResponseFormat, ResponseStructure};

use crate::{compress, logging, negotiation, xml};

/// Bookkeeping fields of a page object. They feed the `meta` block and are
/// not copied into the envelope as-is.
const PAGINATOR_KEYS: [&str; 12] = [
    "data",
    "current_page",
    "from",
    "last_page",
    "path",
    "per_page",
    "to",
    "total",
    "first_page_url",
    "last_page_url",
    "prev_page_url",
    "next_page_url",
];

/// Reshapes raw data before it enters the envelope.
///
/// A statically-typed replacement for runtime resource-class resolution:
/// callers pass the transform explicitly.
pub trait ResourceTransform: Send + Sync {
    /// Transform a single item.
    fn transform(&self, item: &Value) -> Value;

    /// Transform a list by transforming each element.
    fn transform_list(&self, items: &[Value]) -> Value {
        Value::Array(items.iter().map(|item| self.transform(item)).collect())
    }
}

impl<F> ResourceTransform for F
where
    F: Fn(&Value) -> Value + Send + Sync,
{
    fn transform(&self, item: &Value) -> Value {
        self(item)
    }
}

/// A fully shaped envelope, ready for serialization.
#[derive(Debug, Clone)]
pub struct FormattedResponse {
    /// Ordered envelope content.
    pub content: Map<String, Value>,
    /// Final HTTP status code.
    pub status_code: StatusCode,
    /// Outgoing headers.
    pub headers: HeaderMap,
}

/// Final wire response: status, headers, and serialized body bytes.
#[derive(Debug, Clone)]
pub struct WireResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Outgoing headers.
    pub headers: HeaderMap,
    /// Serialized (possibly compressed) body.
    pub body: Bytes,
}

impl IntoResponse for WireResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Serializable snapshot of a wire response for the response cache.
///
/// Bodies may be gzip binary, so they are base64-encoded into the JSON
/// cache value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl CachedResponse {
    /// Snapshot a wire response.
    pub fn capture(response: &WireResponse) -> Self {
        let headers = response
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Self {
            status: response.status.as_u16(),
            headers,
            body: BASE64_STANDARD.encode(&response.body),
        }
    }

    /// Rebuild the wire response from a snapshot.
    pub fn restore(self) -> AppResult<WireResponse> {
        let status = StatusCode::from_u16(self.status)
            .map_err(|e| AppError::cache(format!("Cached status code is invalid: {e}")))?;

        let mut headers = HeaderMap::new();
        for (name, value) in self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| AppError::cache(format!("Cached header name is invalid: {e}")))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|e| AppError::cache(format!("Cached header value is invalid: {e}")))?;
            headers.append(name, value);
        }

        let body = BASE64_STANDARD
            .decode(self.body.as_bytes())
            .map_err(|e| AppError::cache(format!("Cached body is not valid base64: {e}")))?;

        Ok(WireResponse {
            status,
            headers,
            body: Bytes::from(body),
        })
    }
}

/// The envelope-shaping and serialization engine.
#[derive(Clone)]
pub struct ResponseFormatter {
    config: Arc<ApiConfig>,
}

impl ResponseFormatter {
    /// Create a formatter over the injected configuration.
    pub fn new(config: Arc<ApiConfig>) -> Self {
        Self { config }
    }

    /// Shape `data` into the canonical envelope.
    ///
    /// The success flag defaults to true, message and data to null. Page
    /// objects get a `meta` block. An `exception` entry forces a 200 status
    /// to 500, and a failed envelope always carries an error code.
    pub fn format(
        &self,
        data: Value,
        status_code: StatusCode,
        headers: HeaderMap,
        structure: &ResponseStructure,
        transform: Option<&dyn ResourceTransform>,
    ) -> FormattedResponse {
        let source = Self::transform_data(data, structure, transform);
        let page = is_page_object(&source);

        let mut content = Map::new();
        content.insert(
            structure.success_key.clone(),
            source
                .get(&structure.success_key)
                .cloned()
                .unwrap_or(Value::Bool(true)),
        );
        content.insert(
            structure.message_key.clone(),
            source
                .get(&structure.message_key)
                .cloned()
                .unwrap_or(Value::Null),
        );
        content.insert(
            structure.data_key.clone(),
            source
                .get(&structure.data_key)
                .cloned()
                .unwrap_or(Value::Null),
        );

        if page {
            content.insert(
                structure.data_key.clone(),
                source.get("data").cloned().unwrap_or(Value::Null),
            );
            content.insert(structure.meta_key.clone(), page_meta(&source));
        }

        for (key, value) in &source {
            if key == &structure.success_key
                || key == &structure.message_key
                || key == &structure.data_key
            {
                continue;
            }
            if page && PAGINATOR_KEYS.contains(&key.as_str()) {
                continue;
            }
            content.insert(key.clone(), value.clone());
        }

        let mut status_code = status_code;
        if content.contains_key("exception") && status_code == StatusCode::OK {
            status_code = StatusCode::INTERNAL_SERVER_ERROR;
        }

        let failed = matches!(
            content.get(&structure.success_key),
            Some(Value::Bool(false))
        );
        if failed && !content.contains_key(&structure.error_code_key) {
            content.insert(structure.error_code_key.clone(), json!(1));
        }

        FormattedResponse {
            content,
            status_code,
            headers,
        }
    }

    /// Build the wire response: inject the API version, shape the envelope,
    /// log it, negotiate the output format, serialize, and apply the
    /// compression gate.
    pub fn response(
        &self,
        data: Option<Value>,
        status_code: StatusCode,
        headers: HeaderMap,
        api_version: Option<&str>,
        structure: &ResponseStructure,
        ctx: &RequestContext,
    ) -> AppResult<WireResponse> {
        let mut data = data.unwrap_or_else(|| Value::Object(Map::new()));

        // A version already present in the data wins over the configured one.
        if let (Some(version), Value::Object(map)) = (api_version, &mut data) {
            if structure.include_api_version && !map.contains_key("api_version") {
                map.insert(
                    "api_version".to_string(),
                    Value::String(version.to_string()),
                );
            }
        }

        let formatted = self.format(data, status_code, headers, structure, None);

        logging::log_response(
            &ctx.method,
            &ctx.url,
            formatted.status_code,
            &formatted.content,
        );

        let format = negotiation::negotiate(ctx.accept.as_deref().unwrap_or("application/json"));
        self.create_response(formatted, format)
    }

    /// Serialize a formatted response in the given format and apply the
    /// compression gate.
    pub fn create_response(
        &self,
        formatted: FormattedResponse,
        format: ResponseFormat,
    ) -> AppResult<WireResponse> {
        let FormattedResponse {
            content,
            status_code,
            mut headers,
        } = formatted;

        let body = match format {
            ResponseFormat::Json => serde_json::to_vec(&content)?,
            ResponseFormat::Xml => xml::to_xml(&content)?.into_bytes(),
        };

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(format.content_type()),
        );
        let body = self.maybe_compress(body, &mut headers);

        Ok(WireResponse {
            status: status_code,
            headers,
            body: Bytes::from(body),
        })
    }

    /// Project `data` down to the requested top-level fields.
    ///
    /// An empty field list is the identity; unknown fields are dropped.
    /// Only top-level keys match: dotted paths are compared literally.
    pub fn fields(&self, data: &Map<String, Value>, fields: &[String]) -> Map<String, Value> {
        if fields.is_empty() {
            return data.clone();
        }

        let mut filtered = Map::new();
        for field in fields {
            if let Some(value) = data.get(field) {
                filtered.insert(field.clone(), value.clone());
            }
        }
        filtered
    }

    /// SHA-256 hex digest of the canonical serialization of `data`.
    pub fn generate_etag(&self, data: &Map<String, Value>) -> AppResult<String> {
        let serialized = serde_json::to_vec(data)?;
        Ok(format!("{:x}", Sha256::digest(&serialized)))
    }

    /// Whether the request's conditional headers match the current resource.
    pub fn not_modified(
        &self,
        ctx: &RequestContext,
        etag: &str,
        last_modified: DateTime<Utc>,
    ) -> bool {
        if ctx.if_none_match.as_deref() == Some(etag) {
            return true;
        }

        if let Some(raw) = &ctx.if_modified_since {
            if let Some(since) = parse_http_date(raw) {
                if last_modified <= since {
                    return true;
                }
            }
        }

        false
    }

    /// Last-modified timestamp of `data`, read from its `updated_at` entry
    /// when present, otherwise now.
    pub fn last_modified_date(&self, data: &Map<String, Value>) -> DateTime<Utc> {
        match data.get("updated_at") {
            Some(Value::String(raw)) => parse_timestamp(raw).unwrap_or_else(Utc::now),
            _ => Utc::now(),
        }
    }

    fn transform_data(
        data: Value,
        structure: &ResponseStructure,
        transform: Option<&dyn ResourceTransform>,
    ) -> Map<String, Value> {
        let transformed = transform.map(|t| match &data {
            Value::Array(items) => t.transform_list(items),
            other => t.transform(other),
        });

        let mut source = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert(structure.data_key.clone(), other);
                map
            }
        };

        // The transform owns the data key; every other caller-supplied
        // top-level key survives verbatim.
        if let Some(value) = transformed {
            source.insert(structure.data_key.clone(), value);
        }

        source
    }

    fn maybe_compress(&self, body: Vec<u8>, headers: &mut HeaderMap) -> Vec<u8> {
        let settings = &self.config.compression;
        if !settings.enabled || body.len() <= settings.threshold_bytes {
            return body;
        }

        match compress::gzip(&body) {
            Some(compressed) if compressed.len() < body.len() => {
                headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
                compressed
            }
            _ => body,
        }
    }
}

fn is_page_object(source: &Map<String, Value>) -> bool {
    ["current_page", "per_page", "total", "data"]
        .iter()
        .all(|key| source.contains_key(*key))
}

fn page_meta(source: &Map<String, Value>) -> Value {
    let field = |key: &str| source.get(key).cloned().unwrap_or(Value::Null);
    json!({
        "current_page": field("current_page"),
        "from": field("from"),
        "last_page": field("last_page"),
        "path": field("path"),
        "per_page": field("per_page"),
        "to": field("to"),
        "total": field("total"),
    })
}

fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .or_else(|| DateTime::parse_from_rfc2822(raw).ok())
        .map(|date| date.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use responsehub_core::config::CompressionConfig;

    fn formatter() -> ResponseFormatter {
        ResponseFormatter::new(Arc::new(ApiConfig::default()))
    }

    fn formatter_with_compression(enabled: bool, threshold_bytes: usize) -> ResponseFormatter {
        let config = ApiConfig {
            compression: CompressionConfig {
                enabled,
                threshold_bytes,
            },
            ..ApiConfig::default()
        };
        ResponseFormatter::new(Arc::new(config))
    }

    fn object(value: Value) -> Map<String, Value> {
        let Value::Object(map) = value else {
            unreachable!()
        };
        map
    }

    fn ctx() -> RequestContext {
        RequestContext::new("GET", "http://localhost/api/test", "127.0.0.1")
    }

    #[test]
    fn defaults_fill_missing_roles() {
        let structure = ResponseStructure::default();
        let formatted = formatter().format(
            json!({"data": {"id": 1}}),
            StatusCode::OK,
            HeaderMap::new(),
            &structure,
            None,
        );
        assert_eq!(formatted.content["success"], json!(true));
        assert_eq!(formatted.content["message"], Value::Null);
        assert_eq!(formatted.content["data"], json!({"id": 1}));
        assert_eq!(formatted.status_code, StatusCode::OK);
    }

    #[test]
    fn exception_rewrites_ok_to_internal_error() {
        let structure = ResponseStructure::default();
        let formatted = formatter().format(
            json!({"success": false, "exception": {"message": "boom"}}),
            StatusCode::OK,
            HeaderMap::new(),
            &structure,
            None,
        );
        assert_eq!(formatted.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(formatted.content["exception"], json!({"message": "boom"}));
    }

    #[test]
    fn exception_keeps_explicit_error_status() {
        let structure = ResponseStructure::default();
        let formatted = formatter().format(
            json!({"success": false, "exception": {"message": "boom"}}),
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
            &structure,
            None,
        );
        assert_eq!(formatted.status_code, StatusCode::NOT_FOUND);
    }

    #[test]
    fn failed_envelope_gets_default_error_code() {
        let structure = ResponseStructure::default();
        let formatted = formatter().format(
            json!({"success": false, "message": "nope"}),
            StatusCode::BAD_REQUEST,
            HeaderMap::new(),
            &structure,
            None,
        );
        assert_eq!(formatted.content["error_code"], json!(1));
    }

    #[test]
    fn explicit_error_code_is_kept() {
        let structure = ResponseStructure::default();
        let formatted = formatter().format(
            json!({"success": false, "error_code": 422}),
            StatusCode::UNPROCESSABLE_ENTITY,
            HeaderMap::new(),
            &structure,
            None,
        );
        assert_eq!(formatted.content["error_code"], json!(422));
    }

    #[test]
    fn page_objects_gain_meta() {
        let structure = ResponseStructure::default();
        let formatted = formatter().format(
            json!({
                "data": [{"id": 1}],
                "current_page": 1,
                "from": 1,
                "last_page": 3,
                "path": "/api/users",
                "per_page": 1,
                "to": 1,
                "total": 3,
                "next_page_url": "/api/users?page=2",
            }),
            StatusCode::OK,
            HeaderMap::new(),
            &structure,
            None,
        );

        assert_eq!(formatted.content["data"], json!([{"id": 1}]));
        assert_eq!(
            formatted.content["meta"],
            json!({
                "current_page": 1,
                "from": 1,
                "last_page": 3,
                "path": "/api/users",
                "per_page": 1,
                "to": 1,
                "total": 3,
            })
        );
        assert!(!formatted.content.contains_key("next_page_url"));
    }

    #[test]
    fn transform_owns_data_key_but_other_keys_survive() {
        let structure = ResponseStructure::default();
        let transform = |item: &Value| json!({"wrapped": item});
        let formatted = formatter().format(
            json!({"data": {"id": 5}, "status": "archived"}),
            StatusCode::OK,
            HeaderMap::new(),
            &structure,
            Some(&transform),
        );

        assert_eq!(
            formatted.content["data"],
            json!({"wrapped": {"data": {"id": 5}, "status": "archived"}})
        );
        assert_eq!(formatted.content["status"], json!("archived"));
    }

    #[test]
    fn list_transform_maps_each_element() {
        let structure = ResponseStructure::default();
        let transform = |item: &Value| json!({"id": item["id"]});
        let formatted = formatter().format(
            json!([{"id": 1, "secret": "a"}, {"id": 2, "secret": "b"}]),
            StatusCode::OK,
            HeaderMap::new(),
            &structure,
            Some(&transform),
        );
        assert_eq!(formatted.content["data"], json!([{"id": 1}, {"id": 2}]));
    }

    #[test]
    fn scalar_data_lands_under_data_key() {
        let structure = ResponseStructure::default();
        let formatted = formatter().format(
            json!("pong"),
            StatusCode::OK,
            HeaderMap::new(),
            &structure,
            None,
        );
        assert_eq!(formatted.content["data"], json!("pong"));
    }

    #[test]
    fn version_in_data_wins_over_configured_version() {
        let structure = ResponseStructure::default();
        let response = formatter()
            .response(
                Some(json!({"data": null, "api_version": "0.9"})),
                StatusCode::OK,
                HeaderMap::new(),
                Some("2.0"),
                &structure,
                &ctx(),
            )
            .unwrap();

        let content: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(content["api_version"], json!("0.9"));
    }

    #[test]
    fn configured_version_is_injected_when_absent() {
        let structure = ResponseStructure::default();
        let response = formatter()
            .response(
                Some(json!({"data": null})),
                StatusCode::OK,
                HeaderMap::new(),
                Some("2.0"),
                &structure,
                &ctx(),
            )
            .unwrap();

        let content: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(content["api_version"], json!("2.0"));
    }

    #[test]
    fn version_injection_respects_structure_flag() {
        let structure = ResponseStructure {
            include_api_version: false,
            ..ResponseStructure::default()
        };
        let response = formatter()
            .response(
                Some(json!({"data": null})),
                StatusCode::OK,
                HeaderMap::new(),
                Some("2.0"),
                &structure,
                &ctx(),
            )
            .unwrap();

        let content: Value = serde_json::from_slice(&response.body).unwrap();
        assert!(content.get("api_version").is_none());
    }

    #[test]
    fn fields_empty_list_is_identity() {
        let data = object(json!({"a": 1, "b": 2}));
        assert_eq!(formatter().fields(&data, &[]), data);
    }

    #[test]
    fn fields_projects_known_top_level_keys() {
        let data = object(json!({"a": 1, "b": {"c": 2}, "d": 3}));
        let projected = formatter().fields(
            &data,
            &["a".to_string(), "b".to_string(), "missing".to_string()],
        );
        assert_eq!(projected, object(json!({"a": 1, "b": {"c": 2}})));
    }

    #[test]
    fn dotted_fields_do_not_select_nested_keys() {
        let data = object(json!({"user": {"name": "kim"}}));
        let projected = formatter().fields(&data, &["user.name".to_string()]);
        assert!(projected.is_empty());
    }

    #[test]
    fn etag_is_deterministic_and_sensitive() {
        let f = formatter();
        let data = object(json!({"id": 1, "name": "a"}));
        let changed = object(json!({"id": 1, "name": "b"}));
        assert_eq!(
            f.generate_etag(&data).unwrap(),
            f.generate_etag(&data).unwrap()
        );
        assert_ne!(
            f.generate_etag(&data).unwrap(),
            f.generate_etag(&changed).unwrap()
        );
    }

    #[test]
    fn not_modified_matches_etag_exactly() {
        let f = formatter();
        let now = Utc::now();
        let matching = ctx().with_if_none_match("abc");
        let differing = ctx().with_if_none_match("xyz");
        assert!(f.not_modified(&matching, "abc", now));
        assert!(!f.not_modified(&differing, "abc", now));
    }

    #[test]
    fn not_modified_compares_modification_dates() {
        let f = formatter();
        let last_modified = DateTime::parse_from_rfc3339("2025-03-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let fresh = ctx().with_if_modified_since("Sat, 01 Mar 2025 12:00:00 GMT");
        assert!(f.not_modified(&fresh, "etag", last_modified));

        let stale = ctx().with_if_modified_since("Fri, 28 Feb 2025 00:00:00 GMT");
        assert!(!f.not_modified(&stale, "etag", last_modified));

        let garbled = ctx().with_if_modified_since("not a date");
        assert!(!f.not_modified(&garbled, "etag", last_modified));
    }

    #[test]
    fn last_modified_reads_updated_at() {
        let data = object(json!({"updated_at": "2025-03-01T10:30:00Z"}));
        let parsed = formatter().last_modified_date(&data);
        assert_eq!(parsed.to_rfc3339(), "2025-03-01T10:30:00+00:00");
    }

    #[test]
    fn compression_applies_above_threshold() {
        let f = formatter_with_compression(true, 64);
        let structure = ResponseStructure::default();
        let big = "payload ".repeat(100);
        let formatted = f.format(
            json!({"data": big}),
            StatusCode::OK,
            HeaderMap::new(),
            &structure,
            None,
        );
        let response = f.create_response(formatted, ResponseFormat::Json).unwrap();
        assert_eq!(
            response.headers.get(header::CONTENT_ENCODING).unwrap(),
            "gzip"
        );
    }

    #[test]
    fn small_bodies_are_not_compressed() {
        let f = formatter_with_compression(true, 1024);
        let structure = ResponseStructure::default();
        let formatted = f.format(
            json!({"data": "tiny"}),
            StatusCode::OK,
            HeaderMap::new(),
            &structure,
            None,
        );
        let response = f.create_response(formatted, ResponseFormat::Json).unwrap();
        assert!(response.headers.get(header::CONTENT_ENCODING).is_none());
    }

    #[test]
    fn disabled_compression_never_applies() {
        let f = formatter_with_compression(false, 0);
        let structure = ResponseStructure::default();
        let formatted = f.format(
            json!({"data": "x".repeat(4096)}),
            StatusCode::OK,
            HeaderMap::new(),
            &structure,
            None,
        );
        let response = f.create_response(formatted, ResponseFormat::Json).unwrap();
        assert!(response.headers.get(header::CONTENT_ENCODING).is_none());
    }

    #[test]
    fn xml_format_sets_content_type() {
        let structure = ResponseStructure::default();
        let formatted = formatter().format(
            json!({"data": {"id": 1}}),
            StatusCode::OK,
            HeaderMap::new(),
            &structure,
            None,
        );
        let response = formatter()
            .create_response(formatted, ResponseFormat::Xml)
            .unwrap();
        assert_eq!(
            response.headers.get(header::CONTENT_TYPE).unwrap(),
            "application/xml"
        );
        assert!(response.body.starts_with(b"<?xml"));
    }

    #[test]
    fn cached_response_round_trips() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let original = WireResponse {
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static(b"{\"ok\":true}"),
        };

        let restored = CachedResponse::capture(&original).restore().unwrap();
        assert_eq!(restored.status, original.status);
        assert_eq!(restored.body, original.body);
        assert_eq!(
            restored.headers.get(header::CONTENT_TYPE),
            original.headers.get(header::CONTENT_TYPE)
        );
    }
}
