//! Envelope key scheme and the exception-detail record.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The validated envelope key scheme.
///
/// Maps the fixed logical roles (success flag, message, data payload, ...)
/// to the literal field names used in wire responses. Constructed once from
/// configuration at service startup and swapped wholesale on runtime
/// updates; request handling only ever sees a complete, validated instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStructure {
    /// Output key for the success flag.
    pub success_key: String,
    /// Output key for the response message.
    pub message_key: String,
    /// Output key for the data payload.
    pub data_key: String,
    /// Output key for validation errors.
    pub errors_key: String,
    /// Output key for the numeric error code.
    pub error_code_key: String,
    /// Output key for pagination metadata.
    pub meta_key: String,
    /// Output key for HATEOAS links.
    pub links_key: String,
    /// Whether to inject the configured API version into responses.
    pub include_api_version: bool,
}

impl Default for ResponseStructure {
    fn default() -> Self {
        Self {
            success_key: "success".to_string(),
            message_key: "message".to_string(),
            data_key: "data".to_string(),
            errors_key: "errors".to_string(),
            error_code_key: "error_code".to_string(),
            meta_key: "meta".to_string(),
            links_key: "_links".to_string(),
            include_api_version: true,
        }
    }
}

/// Plain serializable record describing a captured error.
///
/// Errors are converted into this record at the boundary where they occur;
/// the formatting pipeline only ever sees the record, never a live error
/// value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionDetail {
    /// The error message.
    pub message: String,
    /// Source file where the error was captured.
    pub file: String,
    /// Line number where the error was captured.
    pub line: u32,
    /// Numeric error code, zero when the error carries none.
    pub code: i64,
    /// Captured stack trace frames, most recent first.
    pub trace: Vec<String>,
}

impl ExceptionDetail {
    /// Capture an error message at the caller's location.
    #[track_caller]
    pub fn capture(message: impl Into<String>, code: i64) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            file: location.file().to_string(),
            line: location.line(),
            code,
            trace: Vec::new(),
        }
    }

    /// Attach stack trace frames to a captured detail.
    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        self.trace = trace;
        self
    }
}

impl From<&AppError> for ExceptionDetail {
    #[track_caller]
    fn from(err: &AppError) -> Self {
        let mut detail = Self::capture(err.message.clone(), 0);
        if let Some(source) = &err.source {
            detail.trace.push(source.to_string());
        }
        detail
    }
}
