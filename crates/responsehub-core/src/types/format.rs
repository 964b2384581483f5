//! Negotiated output serialization formats.

use serde::{Deserialize, Serialize};

/// Output serialization format selected from the `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// JSON body (`application/json`).
    Json,
    /// XML body (`application/xml`).
    Xml,
}

impl ResponseFormat {
    /// The `Content-Type` header value for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }
}
