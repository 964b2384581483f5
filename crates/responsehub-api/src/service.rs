//! The public response-building service.
//!
//! [`ApiResponseService`] owns the runtime-mutable envelope configuration
//! and the error-code mapping table, and orchestrates the formatter,
//! negotiator, link generator, rate limiter, and response cache to
//! implement every response-building operation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::Response;
use serde_json::{Map, Value, json};

use responsehub_cache::CacheManager;
use responsehub_cache::keys;
use responsehub_core::config::ApiConfig;
use responsehub_core::error::AppError;
use responsehub_core::result::AppResult;
use responsehub_core::traits::cache::CacheProvider;
use responsehub_core::traits::rate_limit::RateLimiter;
use responsehub_core::traits::router::RouteResolver;
use responsehub_core::traits::translator::Translator;
use responsehub_core::types::{
    ExceptionDetail, PaginatedData, RequestContext, ResponseStructure, StreamItem,
};

use crate::formatter::{CachedResponse, ResponseFormatter, WireResponse};
use crate::links::HateoasLinkGenerator;
use crate::localize::LocalizationHelper;
use crate::{logging, stream, structure};

/// Orchestrates envelope construction for every response shape.
///
/// The envelope structure and the error-code mapping table are the only
/// mutable state; both are swapped as `Arc` snapshots so in-flight requests
/// never observe a partial update.
pub struct ApiResponseService {
    config: Arc<ApiConfig>,
    formatter: ResponseFormatter,
    localizer: LocalizationHelper,
    link_generator: HateoasLinkGenerator,
    router: Arc<dyn RouteResolver>,
    rate_limiter: Arc<dyn RateLimiter>,
    cache: Arc<CacheManager>,
    api_version: String,
    structure: RwLock<Arc<ResponseStructure>>,
    error_code_mappings: RwLock<Arc<HashMap<i64, Value>>>,
}

impl ApiResponseService {
    /// Create the service, validating the configured envelope structure.
    pub fn new(
        config: Arc<ApiConfig>,
        translator: Arc<dyn Translator>,
        router: Arc<dyn RouteResolver>,
        rate_limiter: Arc<dyn RateLimiter>,
        cache: Arc<CacheManager>,
    ) -> AppResult<Self> {
        let structure_map = match serde_json::to_value(&config.structure)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let validated = structure::validate(&structure_map)?;

        Ok(Self {
            formatter: ResponseFormatter::new(Arc::clone(&config)),
            localizer: LocalizationHelper::new(translator),
            link_generator: HateoasLinkGenerator::new(Arc::clone(&router)),
            router,
            rate_limiter,
            cache,
            api_version: config.api_version.clone(),
            structure: RwLock::new(Arc::new(validated)),
            error_code_mappings: RwLock::new(Arc::new(HashMap::new())),
            config,
        })
    }

    /// Snapshot of the current envelope structure.
    pub fn structure(&self) -> Arc<ResponseStructure> {
        self.structure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Merge `new_structure` onto the current structure, re-validate, and
    /// swap the result in atomically.
    pub fn update_response_structure(&self, new_structure: Map<String, Value>) -> AppResult<()> {
        let current = self.structure();
        let mut merged = match serde_json::to_value(current.as_ref())? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in new_structure {
            merged.insert(key, value);
        }

        let validated = structure::validate(&merged)?;
        *self
            .structure
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(validated);
        Ok(())
    }

    /// Replace the error-code mapping table wholesale.
    pub fn set_error_code_mappings(&self, mappings: HashMap<i64, Value>) {
        *self
            .error_code_mappings
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(mappings);
    }

    /// Look up the detail record for an error code.
    ///
    /// Codes mapped to anything other than an object report not-found,
    /// guarding against malformed mapping tables.
    pub fn get_error_code_mapping(&self, error_code: i64) -> Option<Map<String, Value>> {
        let mappings = self
            .error_code_mappings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match mappings.get(&error_code) {
            Some(Value::Object(map)) => Some(map.clone()),
            _ => None,
        }
    }

    /// Build a success envelope.
    pub fn success_response(
        &self,
        ctx: &RequestContext,
        message: &str,
        data: Value,
        headers: HeaderMap,
        status_code: StatusCode,
        links: &Map<String, Value>,
    ) -> AppResult<WireResponse> {
        let structure = self.structure();
        let mut response_data = Map::new();
        response_data.insert(structure.success_key.clone(), Value::Bool(true));
        response_data.insert(
            structure.message_key.clone(),
            Value::String(self.localizer.localize(message)),
        );
        response_data.insert(structure.data_key.clone(), data);

        if !links.is_empty() {
            response_data.insert(
                structure.links_key.clone(),
                Value::Object(self.link_generator.generate_many(links)?),
            );
        }

        self.formatter.response(
            Some(Value::Object(response_data)),
            status_code,
            headers,
            Some(&self.api_version),
            &structure,
            ctx,
        )
    }

    /// Build an error envelope.
    ///
    /// Attaches `error_details` when the error code has a mapping, and the
    /// structured exception detail only when the current environment is on
    /// the show-exception allow-list.
    pub fn error_response(
        &self,
        ctx: &RequestContext,
        message: &str,
        status_code: StatusCode,
        error: Option<ExceptionDetail>,
        error_code: i64,
        headers: HeaderMap,
        links: &Map<String, Value>,
    ) -> AppResult<WireResponse> {
        let structure = self.structure();
        let mut response_data = Map::new();
        response_data.insert(structure.success_key.clone(), Value::Bool(false));
        response_data.insert(
            structure.message_key.clone(),
            Value::String(message.to_string()),
        );
        response_data.insert(structure.error_code_key.clone(), json!(error_code));

        if let Some(details) = self.get_error_code_mapping(error_code) {
            response_data.insert("error_details".to_string(), Value::Object(details));
        }

        if !links.is_empty() {
            response_data.insert(
                structure.links_key.clone(),
                Value::Object(self.link_generator.generate_many(links)?),
            );
        }

        if let Some(detail) = error {
            if self.should_show_exception_details() {
                response_data.insert("exception".to_string(), serde_json::to_value(detail)?);
            }
        }

        self.formatter.response(
            Some(Value::Object(response_data)),
            status_code,
            headers,
            Some(&self.api_version),
            &structure,
            ctx,
        )
    }

    /// Build a validation-error envelope (error code fixed to 422).
    pub fn validation_error_response(
        &self,
        ctx: &RequestContext,
        errors: Value,
        message: Option<&str>,
        status_code: StatusCode,
        headers: HeaderMap,
    ) -> AppResult<WireResponse> {
        let structure = self.structure();
        let mut response_data = Map::new();
        response_data.insert(structure.success_key.clone(), Value::Bool(false));
        response_data.insert(
            structure.message_key.clone(),
            Value::String(message.unwrap_or("Validation failed").to_string()),
        );
        response_data.insert(structure.errors_key.clone(), errors);
        response_data.insert(
            structure.error_code_key.clone(),
            json!(StatusCode::UNPROCESSABLE_ENTITY.as_u16()),
        );

        self.formatter.response(
            Some(Value::Object(response_data)),
            status_code,
            headers,
            Some(&self.api_version),
            &structure,
            ctx,
        )
    }

    /// Build a paginated envelope with metadata and navigation links,
    /// enforcing the rate limit and the optional response cache.
    pub async fn paginated_response(
        &self,
        ctx: &RequestContext,
        data: PaginatedData,
        message: &str,
        headers: HeaderMap,
        links: &Map<String, Value>,
    ) -> AppResult<WireResponse> {
        let structure = self.structure();
        let mut response_data = Map::new();
        response_data.insert(structure.success_key.clone(), Value::Bool(true));
        response_data.insert(
            structure.message_key.clone(),
            Value::String(self.localizer.localize(message)),
        );
        response_data.insert(structure.data_key.clone(), data.data.clone());
        response_data.insert(
            structure.meta_key.clone(),
            json!({
                "current_page": data.current_page,
                "from": data.from,
                "last_page": data.last_page,
                "path": data.path,
                "per_page": data.per_page,
                "to": data.to,
                "total": data.total,
            }),
        );

        let mut generated = Map::new();
        generated.insert("first".to_string(), nav_link(&data.first_page_url, "first"));
        generated.insert("last".to_string(), nav_link(&data.last_page_url, "last"));
        generated.insert("prev".to_string(), nav_link(&data.prev_page_url, "prev"));
        generated.insert("next".to_string(), nav_link(&data.next_page_url, "next"));
        for (rel, link) in self.link_generator.generate_many(links)? {
            generated.insert(rel, link);
        }
        response_data.insert(structure.links_key.clone(), Value::Object(generated));

        // Cache key covers the page data plus the caller-supplied headers;
        // the volatile rate-limit headers are excluded.
        let mut cache_payload = serde_json::to_vec(&data)?;
        let header_pairs: Vec<(String, String)> = headers
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        cache_payload.extend(serde_json::to_vec(&header_pairs)?);

        let rate_limit_key = keys::rate_limit(&ctx.client_ip);
        let max_attempts = self.config.rate_limit.max_attempts;
        let decay = Duration::from_secs(self.config.rate_limit.decay_minutes * 60);

        let mut headers = headers;
        headers.insert("X-RateLimit-Limit", HeaderValue::from(max_attempts));
        headers.insert(
            "X-RateLimit-Remaining",
            HeaderValue::from(self.rate_limiter.remaining(&rate_limit_key, max_attempts).await),
        );
        headers.insert(
            "X-RateLimit-Reset",
            HeaderValue::from(self.rate_limiter.available_in(&rate_limit_key).await),
        );

        let allowed = self
            .rate_limiter
            .attempt(&rate_limit_key, max_attempts, decay)
            .await;
        if !allowed {
            return self.error_response(
                ctx,
                "Too Many Requests",
                StatusCode::TOO_MANY_REQUESTS,
                None,
                StatusCode::TOO_MANY_REQUESTS.as_u16() as i64,
                headers,
                &Map::new(),
            );
        }

        if self.config.paginated_cache.enabled {
            let cache_key =
                keys::paginated_response(&self.config.paginated_cache.prefix, &cache_payload);

            if let Some(cached) = self.cache.get_json::<CachedResponse>(&cache_key).await? {
                return cached.restore();
            }

            let response = self.formatter.response(
                Some(Value::Object(response_data)),
                StatusCode::OK,
                headers,
                Some(&self.api_version),
                &structure,
                ctx,
            )?;
            self.cache
                .set_json(
                    &cache_key,
                    &CachedResponse::capture(&response),
                    Duration::from_secs(self.config.paginated_cache.duration_seconds),
                )
                .await?;
            return Ok(response);
        }

        self.formatter.response(
            Some(Value::Object(response_data)),
            StatusCode::OK,
            headers,
            Some(&self.api_version),
            &structure,
            ctx,
        )
    }

    /// Build a line-delimited JSON streaming response.
    ///
    /// The header line carries the success flag, localized message, and API
    /// version; generator items follow in iteration order. A generator
    /// failure aborts before any body is produced.
    pub fn stream_response<F, I>(
        &self,
        data_generator: F,
        message: &str,
        headers: HeaderMap,
        status_code: StatusCode,
    ) -> AppResult<Response>
    where
        F: FnOnce() -> AppResult<I>,
        I: IntoIterator<Item = StreamItem>,
        I::IntoIter: Send + 'static,
    {
        let structure = self.structure();
        let items = data_generator().map_err(|e| {
            AppError::invalid_stream(format!("Stream data generator failed: {}", e.message))
        })?;

        let mut head = Map::new();
        head.insert(structure.success_key.clone(), Value::Bool(true));
        head.insert(
            structure.message_key.clone(),
            Value::String(self.localizer.localize(message)),
        );
        head.insert(
            "api_version".to_string(),
            Value::String(self.api_version.clone()),
        );
        let header_line = serde_json::to_string(&head)?;

        let mut response = Response::new(stream::build(header_line, items));
        *response.status_mut() = status_code;
        *response.headers_mut() = headers;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(response)
    }

    /// Build a metadata envelope describing every `api`-prefixed route.
    pub fn metadata_response(
        &self,
        ctx: &RequestContext,
        additional_info: Value,
        headers: HeaderMap,
    ) -> AppResult<WireResponse> {
        let endpoints: Vec<Value> = self
            .router
            .list_routes()
            .into_iter()
            .filter(|route| route.uri.trim_start_matches('/').starts_with("api"))
            .map(|route| {
                json!({
                    "uri": route.uri,
                    "methods": route.methods,
                    "name": route.name,
                })
            })
            .collect();

        let metadata = json!({
            "version": self.api_version,
            "endpoints": endpoints,
            "additional_info": additional_info,
        });

        let structure = self.structure();
        let mut response_data = Map::new();
        response_data.insert(structure.success_key.clone(), Value::Bool(true));
        response_data.insert(
            structure.message_key.clone(),
            Value::String("API Metadata".to_string()),
        );
        response_data.insert(structure.data_key.clone(), metadata);

        self.formatter.response(
            Some(Value::Object(response_data)),
            StatusCode::OK,
            headers,
            Some(&self.api_version),
            &structure,
            ctx,
        )
    }

    /// Build a bulk-operation envelope.
    ///
    /// Each operation is re-keyed under the current structure; the overall
    /// success flag is the AND of the per-operation flags. Entries that are
    /// not objects are skipped entirely.
    pub fn bulk_operation_response(
        &self,
        ctx: &RequestContext,
        operations: &[Value],
        message: &str,
        headers: HeaderMap,
        status_code: StatusCode,
    ) -> AppResult<WireResponse> {
        let structure = self.structure();
        let mut overall_success = true;
        let mut formatted_operations = Vec::new();

        for operation in operations {
            let Value::Object(op) = operation else {
                continue;
            };

            let success = op.get("success").and_then(Value::as_bool).unwrap_or(false);
            let op_message = op.get("message").and_then(Value::as_str).unwrap_or("");

            let mut formatted = Map::new();
            formatted.insert(structure.success_key.clone(), Value::Bool(success));
            formatted.insert(
                structure.message_key.clone(),
                Value::String(self.localizer.localize(op_message)),
            );
            if let Some(data) = op.get("data") {
                formatted.insert(structure.data_key.clone(), data.clone());
            }
            if let Some(code) = op.get("error_code") {
                formatted.insert(structure.error_code_key.clone(), code.clone());
            }

            formatted_operations.push(Value::Object(formatted));
            if !success {
                overall_success = false;
            }
        }

        let mut response_data = Map::new();
        response_data.insert(structure.success_key.clone(), Value::Bool(overall_success));
        response_data.insert(
            structure.message_key.clone(),
            Value::String(self.localizer.localize(message)),
        );
        response_data.insert(
            "operations".to_string(),
            Value::Array(formatted_operations),
        );

        self.formatter.response(
            Some(Value::Object(response_data)),
            status_code,
            headers,
            Some(&self.api_version),
            &structure,
            ctx,
        )
    }

    /// Build an envelope containing only the requested top-level fields.
    pub fn partial_response(
        &self,
        ctx: &RequestContext,
        data: &Map<String, Value>,
        fields: &[String],
        message: &str,
        headers: HeaderMap,
        status_code: StatusCode,
    ) -> AppResult<WireResponse> {
        let filtered = self.formatter.fields(data, fields);

        let structure = self.structure();
        let mut response_data = Map::new();
        response_data.insert(structure.success_key.clone(), Value::Bool(true));
        response_data.insert(
            structure.message_key.clone(),
            Value::String(self.localizer.localize(message)),
        );
        response_data.insert(structure.data_key.clone(), Value::Object(filtered));

        self.formatter.response(
            Some(Value::Object(response_data)),
            status_code,
            headers,
            Some(&self.api_version),
            &structure,
            ctx,
        )
    }

    /// Build an envelope honoring conditional-request semantics.
    ///
    /// Unmodified resources short-circuit to a bodyless 304; otherwise the
    /// response carries `ETag`, `Last-Modified`, and a revalidation
    /// `Cache-Control`.
    pub fn conditional_response(
        &self,
        ctx: &RequestContext,
        data: Map<String, Value>,
        message: &str,
        headers: HeaderMap,
        status_code: StatusCode,
        links: &Map<String, Value>,
    ) -> AppResult<WireResponse> {
        let structure = self.structure();
        let mut response_data = Map::new();
        response_data.insert(structure.success_key.clone(), Value::Bool(true));
        response_data.insert(
            structure.message_key.clone(),
            Value::String(self.localizer.localize(message)),
        );
        response_data.insert(structure.data_key.clone(), Value::Object(data.clone()));

        if !links.is_empty() {
            response_data.insert(
                structure.links_key.clone(),
                Value::Object(self.link_generator.generate_many(links)?),
            );
        }

        let etag = self.formatter.generate_etag(&response_data)?;
        let last_modified = self.formatter.last_modified_date(&data);

        if self.formatter.not_modified(ctx, &etag, last_modified) {
            logging::log_response(&ctx.method, &ctx.url, StatusCode::NOT_MODIFIED, &Map::new());
            return Ok(WireResponse {
                status: StatusCode::NOT_MODIFIED,
                headers,
                body: bytes::Bytes::new(),
            });
        }

        let mut headers = headers;
        headers.insert(
            header::ETAG,
            HeaderValue::from_str(&format!("\"{etag}\""))
                .map_err(|e| AppError::internal(format!("ETag header is invalid: {e}")))?,
        );
        headers.insert(
            header::LAST_MODIFIED,
            HeaderValue::from_str(&last_modified.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
                .map_err(|e| AppError::internal(format!("Last-Modified header is invalid: {e}")))?,
        );
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("private, must-revalidate"),
        );

        self.formatter.response(
            Some(Value::Object(response_data)),
            status_code,
            headers,
            Some(&self.api_version),
            &structure,
            ctx,
        )
    }

    fn should_show_exception_details(&self) -> bool {
        self.config
            .show_exception_environments
            .contains(&self.config.environment)
    }
}

fn nav_link(url: &Option<String>, rel: &str) -> Value {
    match url {
        Some(href) => json!({"href": href, "rel": rel, "method": "GET"}),
        None => Value::Null,
    }
}
