//! Route table trait for HATEOAS link generation and endpoint discovery.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::result::AppResult;

/// A registered route as reported by endpoint discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteInfo {
    /// The route path, e.g. `"api/users/{id}"`.
    pub uri: String,
    /// Declared HTTP methods, in declaration order.
    pub methods: Vec<String>,
    /// Route name, if the route was registered with one.
    pub name: Option<String>,
}

/// Trait for resolving named routes to URLs and enumerating routes.
///
/// Implemented by whatever owns the application's route table; the engine
/// only performs lookups.
pub trait RouteResolver: Send + Sync + 'static {
    /// Resolve a named route plus parameters to an absolute URL.
    fn resolve_url(&self, name: &str, params: &Map<String, Value>) -> AppResult<String>;

    /// Declared HTTP methods of a named route, in declaration order.
    fn methods_of(&self, name: &str) -> AppResult<Vec<String>>;

    /// Enumerate every registered route.
    fn list_routes(&self) -> Vec<RouteInfo>;
}
