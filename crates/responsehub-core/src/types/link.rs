//! HATEOAS link types.

use serde::{Deserialize, Serialize};

/// A HATEOAS link describing a related resource or action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkObject {
    /// Absolute URL of the linked resource.
    pub href: String,
    /// Relationship of the link to the current resource.
    pub rel: String,
    /// HTTP method associated with the link.
    pub method: String,
}

impl LinkObject {
    /// Create a link.
    pub fn new(href: impl Into<String>, rel: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
            method: method.into(),
        }
    }
}
