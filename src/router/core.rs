use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use tracing::{debug, info, warn};

use super::pattern::PathPattern;
use super::route::{IntoMethods, RouteDefinition, RouteOptions};
use crate::controller::Callback;
use crate::error::RegistrationError;

/// All definitions registered under one path pattern, in registration order.
#[derive(Debug, Clone)]
pub struct RouteGroup {
    path: String,
    pattern: PathPattern,
    routes: Vec<Arc<RouteDefinition>>,
}

impl RouteGroup {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn routes(&self) -> &[Arc<RouteDefinition>] {
        &self.routes
    }

    /// First definition (registration order) that accepts `method`, with HEAD
    /// served by a GET definition.
    #[must_use]
    pub fn select(&self, method: &Method) -> Option<&Arc<RouteDefinition>> {
        self.routes.iter().find(|route| route.methods.accepts(method))
    }

    /// Methods answered at this path, for the `Allow` header. HEAD is listed
    /// whenever GET is.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<String> {
        let mut allowed: Vec<String> = Vec::new();
        for route in &self.routes {
            for method in route.methods.iter() {
                if !allowed.iter().any(|m| m == method.as_str()) {
                    allowed.push(method.as_str().to_string());
                }
            }
        }
        if allowed.iter().any(|m| m == "GET") && !allowed.iter().any(|m| m == "HEAD") {
            allowed.push(Method::HEAD.as_str().to_string());
        }
        allowed
    }
}

/// Result of looking a request path up in the table.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub group: &'a RouteGroup,
    /// Placeholder captures (`{id}` → `("id", "123")`); empty for literal paths
    pub url_params: Vec<(String, String)>,
}

/// Ordered, keyed collection of route definitions.
///
/// Keyed by path pattern (insertion order preserved, several definitions per
/// path) and by route id (unique across the table).
///
/// ```rust
/// use http::Method;
/// use xpress_mvc::{RouteOptions, RouteTable};
///
/// let mut table = RouteTable::new();
/// table
///     .register("/posts", Method::GET, "PostsController->index", RouteOptions::new().route_id("posts"))
///     .unwrap();
/// table
///     .register("/posts", Method::POST, "PostsController->create", RouteOptions::new())
///     .unwrap();
///
/// assert_eq!(table.get("/posts").map(<[_]>::len), Some(2));
/// assert_eq!(table.find_by_id("posts"), Some("/posts"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    groups: Vec<RouteGroup>,
    by_path: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a definition to the sequence for `path_pattern`.
    ///
    /// Several definitions may share a path, even with the same method; the
    /// first registered wins at dispatch. A non-empty route id already owned
    /// by another definition is rejected and leaves the table unchanged.
    pub fn register<M, C>(
        &mut self,
        path_pattern: &str,
        methods: M,
        callback: C,
        options: RouteOptions,
    ) -> Result<Arc<RouteDefinition>, RegistrationError>
    where
        M: IntoMethods,
        C: Into<Callback>,
    {
        if path_pattern.is_empty() {
            return Err(RegistrationError::EmptyPath);
        }
        if !path_pattern.starts_with('/') {
            return Err(RegistrationError::InvalidPath {
                path: path_pattern.to_string(),
            });
        }

        let methods = methods.into_methods()?;
        if methods.is_empty() {
            return Err(RegistrationError::NoMethods {
                path: path_pattern.to_string(),
            });
        }

        let RouteOptions {
            route_id,
            default_values,
        } = options;
        let route_id = route_id.filter(|id| !id.is_empty());

        if let Some(id) = &route_id {
            if let Some(existing) = self.find_by_id(id) {
                warn!(
                    route_id = %id,
                    path = %path_pattern,
                    existing_path = %existing,
                    "Rejected duplicate route id"
                );
                return Err(RegistrationError::DuplicateRouteId {
                    route_id: id.clone(),
                    existing_path: existing.to_string(),
                });
            }
        }

        let idx = match self.by_path.get(path_pattern) {
            Some(idx) => *idx,
            None => {
                let pattern = PathPattern::compile(path_pattern).map_err(|e| {
                    RegistrationError::InvalidPattern {
                        path: path_pattern.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                self.groups.push(RouteGroup {
                    path: path_pattern.to_string(),
                    pattern,
                    routes: Vec::new(),
                });
                let idx = self.groups.len() - 1;
                self.by_path.insert(path_pattern.to_string(), idx);
                idx
            }
        };

        let definition = Arc::new(RouteDefinition {
            path_pattern: path_pattern.to_string(),
            methods,
            callback: callback.into(),
            route_id,
            default_values,
        });

        if let Some(id) = &definition.route_id {
            self.by_id.insert(id.clone(), idx);
        }

        let group = &mut self.groups[idx];
        group.routes.push(Arc::clone(&definition));

        info!(
            path = %definition.path_pattern,
            methods = %definition.methods,
            callback = %definition.callback,
            route_id = definition.route_id.as_deref().unwrap_or(""),
            position = group.routes.len() - 1,
            "Route registered"
        );

        Ok(definition)
    }

    /// Definitions registered at exactly `path_pattern`.
    #[must_use]
    pub fn get(&self, path_pattern: &str) -> Option<&[Arc<RouteDefinition>]> {
        self.group(path_pattern).map(RouteGroup::routes)
    }

    #[must_use]
    pub fn group(&self, path_pattern: &str) -> Option<&RouteGroup> {
        self.by_path.get(path_pattern).map(|idx| &self.groups[*idx])
    }

    #[must_use]
    pub fn contains_path(&self, path_pattern: &str) -> bool {
        self.by_path.contains_key(path_pattern)
    }

    /// The full `path → definitions` mapping in insertion order.
    #[must_use]
    pub fn get_routes(&self) -> Vec<(&str, &[Arc<RouteDefinition>])> {
        self.groups
            .iter()
            .map(|group| (group.path.as_str(), group.routes.as_slice()))
            .collect()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.path.as_str())
    }

    /// Number of distinct path patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of definitions across all paths.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.groups.iter().map(|group| group.routes.len()).sum()
    }

    /// Path pattern owning `route_id`.
    #[must_use]
    pub fn find_by_id(&self, route_id: &str) -> Option<&str> {
        self.by_id
            .get(route_id)
            .map(|idx| self.groups[*idx].path.as_str())
    }

    /// Definition carrying `route_id`.
    #[must_use]
    pub fn find_route_by_id(&self, route_id: &str) -> Option<&Arc<RouteDefinition>> {
        let group = &self.groups[*self.by_id.get(route_id)?];
        group
            .routes
            .iter()
            .find(|route| route.route_id.as_deref() == Some(route_id))
    }

    /// Methods answered at `path_pattern`; empty when the path is unknown.
    #[must_use]
    pub fn allowed_methods(&self, path_pattern: &str) -> Vec<String> {
        self.group(path_pattern)
            .map(RouteGroup::allowed_methods)
            .unwrap_or_default()
    }

    /// Find the group serving a request path: exact pattern first, then the
    /// first placeholder pattern (insertion order) that matches.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<RouteMatch<'_>> {
        if let Some(group) = self.group(path) {
            debug!(path = %path, "Literal route match");
            return Some(RouteMatch {
                group,
                url_params: Vec::new(),
            });
        }

        for group in self.groups.iter().filter(|g| !g.pattern.is_literal()) {
            if let Some(url_params) = group.pattern.captures(path) {
                debug!(
                    path = %path,
                    route_pattern = %group.path,
                    url_params = ?url_params,
                    "Pattern route match"
                );
                return Some(RouteMatch { group, url_params });
            }
        }

        None
    }

    /// Remove every definition.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.by_path.clear();
        self.by_id.clear();
    }
}
