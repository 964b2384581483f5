//! In-memory named route table.

use serde_json::{Map, Value};

use responsehub_core::error::AppError;
use responsehub_core::result::AppResult;
use responsehub_core::traits::router::{RouteInfo, RouteResolver};

/// A named route table backing link generation and endpoint discovery.
///
/// Routes are registered at startup; lookups substitute `{param}`
/// placeholders in the path and append leftover parameters as a query
/// string.
#[derive(Debug, Clone)]
pub struct RouteTable {
    base_url: String,
    routes: Vec<NamedRoute>,
}

#[derive(Debug, Clone)]
struct NamedRoute {
    name: String,
    uri: String,
    methods: Vec<String>,
}

impl RouteTable {
    /// Create an empty table. `base_url` prefixes every resolved URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            routes: Vec::new(),
        }
    }

    /// Register a named route.
    pub fn route(
        mut self,
        name: impl Into<String>,
        methods: &[&str],
        uri: impl Into<String>,
    ) -> Self {
        self.routes.push(NamedRoute {
            name: name.into(),
            uri: uri.into(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
        });
        self
    }

    fn find(&self, name: &str) -> AppResult<&NamedRoute> {
        self.routes
            .iter()
            .find(|route| route.name == name)
            .ok_or_else(|| AppError::not_found(format!("Route '{name}' is not registered")))
    }
}

impl RouteResolver for RouteTable {
    fn resolve_url(&self, name: &str, params: &Map<String, Value>) -> AppResult<String> {
        let route = self.find(name)?;
        let mut path = route.uri.clone();
        let mut query: Vec<(String, String)> = Vec::new();

        for (key, value) in params {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let placeholder = format!("{{{key}}}");
            if path.contains(&placeholder) {
                path = path.replace(&placeholder, &rendered);
            } else {
                query.push((key.clone(), rendered));
            }
        }

        let mut url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        if !query.is_empty() {
            let pairs: Vec<String> = query
                .into_iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            url.push('?');
            url.push_str(&pairs.join("&"));
        }

        Ok(url)
    }

    fn methods_of(&self, name: &str) -> AppResult<Vec<String>> {
        Ok(self.find(name)?.methods.clone())
    }

    fn list_routes(&self) -> Vec<RouteInfo> {
        self.routes
            .iter()
            .map(|route| RouteInfo {
                uri: route.uri.clone(),
                methods: route.methods.clone(),
                name: Some(route.name.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> RouteTable {
        RouteTable::new("http://localhost:8080")
            .route("users.show", &["GET"], "api/users/{id}")
            .route("users.store", &["POST", "PUT"], "api/users")
    }

    #[test]
    fn substitutes_path_parameters() {
        let mut params = Map::new();
        params.insert("id".to_string(), json!(42));
        let url = table().resolve_url("users.show", &params).unwrap();
        assert_eq!(url, "http://localhost:8080/api/users/42");
    }

    #[test]
    fn leftover_parameters_become_query_string() {
        let mut params = Map::new();
        params.insert("id".to_string(), json!("7"));
        params.insert("expand".to_string(), json!("profile"));
        let url = table().resolve_url("users.show", &params).unwrap();
        assert_eq!(url, "http://localhost:8080/api/users/7?expand=profile");
    }

    #[test]
    fn unknown_route_is_not_found() {
        let err = table().resolve_url("missing", &Map::new()).unwrap_err();
        assert_eq!(err.kind, responsehub_core::error::ErrorKind::NotFound);
    }

    #[test]
    fn methods_preserve_declaration_order() {
        let methods = table().methods_of("users.store").unwrap();
        assert_eq!(methods, vec!["POST".to_string(), "PUT".to_string()]);
    }

    #[test]
    fn lists_all_routes() {
        let routes = table().list_routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].name.as_deref(), Some("users.show"));
        assert_eq!(routes[0].uri, "api/users/{id}");
    }
}
