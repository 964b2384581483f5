//! ResponseHub demo server.
//!
//! Wires configuration, logging, and the in-memory collaborators into an
//! [`ApiResponseService`] and serves a few example endpoints.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::{Map, Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, fmt};

use responsehub_api::routes::RouteTable;
use responsehub_api::service::ApiResponseService;
use responsehub_cache::{CacheManager, MemoryRateLimiter};
use responsehub_core::config::ApiConfig;
use responsehub_core::error::AppError;
use responsehub_core::result::AppResult;
use responsehub_core::traits::translator::MapTranslator;
use responsehub_core::types::{PaginatedData, RequestContext, StreamItem};

#[derive(Clone)]
struct AppState {
    service: Arc<ApiResponseService>,
}

#[tokio::main]
async fn main() {
    let env = std::env::var("RESPONSEHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match ApiConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &ApiConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: ApiConfig) -> Result<(), AppError> {
    tracing::info!(
        "Starting ResponseHub demo server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = Arc::new(config);

    let routes = RouteTable::new("http://localhost:8080")
        .route("users.index", &["GET"], "api/users")
        .route("users.show", &["GET"], "api/users/{id}")
        .route("users.stream", &["GET"], "api/users/stream")
        .route("meta", &["GET"], "api/meta");

    let cache = Arc::new(CacheManager::new(&config.cache)?);
    let service = ApiResponseService::new(
        Arc::clone(&config),
        Arc::new(MapTranslator::default()),
        Arc::new(routes),
        Arc::new(MemoryRateLimiter::new()),
        cache,
    )?;

    let mut mappings = HashMap::new();
    mappings.insert(
        4040,
        json!({"message": "The requested user does not exist", "code": 4040}),
    );
    service.set_error_code_mappings(mappings);

    let state = AppState {
        service: Arc::new(service),
    };

    let app = Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/stream", get(stream_users))
        .route("/api/users/{id}", get(show_user))
        .route("/api/meta", get(metadata))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = "0.0.0.0:8080";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("ResponseHub listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

fn users() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Ada Lovelace", "updated_at": "2025-05-01T09:00:00Z"}),
        json!({"id": 2, "name": "Grace Hopper", "updated_at": "2025-05-02T10:30:00Z"}),
        json!({"id": 3, "name": "Edsger Dijkstra", "updated_at": "2025-05-03T14:45:00Z"}),
    ]
}

fn respond(result: AppResult<responsehub_api::WireResponse>) -> Response {
    match result {
        Ok(response) => response.into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/users
async fn list_users(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: axum::extract::Request,
) -> Response {
    let (parts, _) = request.into_parts();
    let ctx = RequestContext::from_parts(&parts, addr.ip().to_string());

    let all = users();
    let total = all.len() as u64;
    let page = PaginatedData::new(
        Value::Array(all),
        1,
        25,
        total,
        "http://localhost:8080/api/users",
    );

    respond(
        state
            .service
            .paginated_response(&ctx, page, "OK", HeaderMap::new(), &Map::new())
            .await,
    )
}

/// GET /api/users/{id}
async fn show_user(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(id): Path<u64>,
    request: axum::extract::Request,
) -> Response {
    let (parts, _) = request.into_parts();
    let ctx = RequestContext::from_parts(&parts, addr.ip().to_string());

    let user = users()
        .into_iter()
        .find(|user| user["id"] == json!(id));

    match user {
        Some(user) => {
            let links = match json!({"self": {"route": "users.show", "params": {"id": id}}}) {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            respond(state.service.success_response(
                &ctx,
                "OK",
                user,
                HeaderMap::new(),
                StatusCode::OK,
                &links,
            ))
        }
        None => respond(state.service.error_response(
            &ctx,
            "User not found",
            StatusCode::NOT_FOUND,
            None,
            4040,
            HeaderMap::new(),
            &Map::new(),
        )),
    }
}

/// GET /api/users/stream
async fn stream_users(State(state): State<AppState>) -> Response {
    let result = state.service.stream_response(
        || Ok(users().into_iter().map(StreamItem::Value).collect::<Vec<_>>()),
        "OK",
        HeaderMap::new(),
        StatusCode::OK,
    );

    match result {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

/// GET /api/meta
async fn metadata(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: axum::extract::Request,
) -> Response {
    let (parts, _) = request.into_parts();
    let ctx = RequestContext::from_parts(&parts, addr.ip().to_string());

    respond(state.service.metadata_response(
        &ctx,
        json!({"documentation": "https://example.com/docs"}),
        HeaderMap::new(),
    ))
}
