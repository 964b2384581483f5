//! Response logging.

use axum::http::StatusCode;
use serde_json::{Map, Value};

/// Log a response with method, URL, status, and envelope content.
///
/// Responses with status >= 400 are logged at error level, everything else
/// at info.
pub fn log_response(method: &str, url: &str, status: StatusCode, content: &Map<String, Value>) {
    let data = serde_json::to_string(content).unwrap_or_else(|_| "{}".to_string());
    let message = format!(
        "API Response - Method: {method}, URL: {url}, Status: {}, Data: {data}",
        status.as_u16()
    );

    if status.as_u16() >= 400 {
        tracing::error!(target: "api_response", "{message}");
    } else {
        tracing::info!(target: "api_response", "{message}");
    }
}
