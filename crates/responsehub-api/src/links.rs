//! HATEOAS link generation over a route resolver.

use std::sync::Arc;

use serde_json::{Map, Value};

use responsehub_core::result::AppResult;
use responsehub_core::traits::router::RouteResolver;
use responsehub_core::types::LinkObject;

/// Builds `{href, rel, method}` link objects from named routes.
#[derive(Clone)]
pub struct HateoasLinkGenerator {
    router: Arc<dyn RouteResolver>,
}

impl HateoasLinkGenerator {
    /// Create a generator over the given route resolver.
    pub fn new(router: Arc<dyn RouteResolver>) -> Self {
        Self { router }
    }

    /// Generate a link for a named route.
    ///
    /// The link method is the route's first declared method; unknown routes,
    /// routes without methods, and resolver failures all fall back to `GET`.
    pub fn generate(
        &self,
        route: &str,
        params: &Map<String, Value>,
        rel: &str,
    ) -> AppResult<LinkObject> {
        let href = self.router.resolve_url(route, params)?;
        Ok(LinkObject::new(href, rel, self.route_method(route)))
    }

    /// Generate a links block from relation → route-spec entries.
    ///
    /// A spec is either a bare route name or an object with a `route` key
    /// and optional `params`. Entries in neither form are skipped.
    pub fn generate_many(&self, links: &Map<String, Value>) -> AppResult<Map<String, Value>> {
        let mut generated = Map::new();

        for (rel, spec) in links {
            let link = match spec {
                Value::String(route) => Some(self.generate(route, &Map::new(), rel)?),
                Value::Object(info) => match info.get("route").and_then(Value::as_str) {
                    Some(route) => {
                        let params = info
                            .get("params")
                            .and_then(Value::as_object)
                            .cloned()
                            .unwrap_or_default();
                        Some(self.generate(route, &params, rel)?)
                    }
                    None => None,
                },
                _ => None,
            };

            if let Some(link) = link {
                generated.insert(rel.clone(), serde_json::to_value(link)?);
            }
        }

        Ok(generated)
    }

    fn route_method(&self, route: &str) -> String {
        match self.router.methods_of(route) {
            Ok(methods) => methods
                .into_iter()
                .next()
                .unwrap_or_else(|| "GET".to_string()),
            Err(_) => "GET".to_string(),
        }
    }
}
