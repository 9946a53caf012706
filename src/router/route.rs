use std::fmt;

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;

use crate::controller::Callback;
use crate::error::RegistrationError;
use crate::request::ParamMap;

/// HTTP methods a definition answers to, in declaration order.
///
/// `HEAD` is never added implicitly; the dispatcher serves HEAD from a GET
/// definition at match time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodSet(SmallVec<[Method; 4]>);

impl MethodSet {
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Parse a comma and/or whitespace separated list such as `"GET, POST"`.
    /// Tokens are uppercased before parsing.
    pub fn parse(list: &str) -> Result<Self, RegistrationError> {
        let mut set = Self::new();
        for token in list.split(|c: char| c == ',' || c.is_whitespace()) {
            if token.is_empty() {
                continue;
            }
            let method = Method::from_bytes(token.to_ascii_uppercase().as_bytes()).map_err(|_| {
                RegistrationError::InvalidMethod {
                    method: token.to_string(),
                }
            })?;
            set.insert(method);
        }
        Ok(set)
    }

    /// Add a method; duplicates are ignored.
    pub fn insert(&mut self, method: Method) {
        if !self.0.contains(&method) {
            self.0.push(method);
        }
    }

    #[must_use]
    pub fn contains(&self, method: &Method) -> bool {
        self.0.contains(method)
    }

    /// Whether a request with `method` may be served by this set, including
    /// the HEAD-by-GET fallback. No other method pair falls back.
    #[must_use]
    pub fn accepts(&self, method: &Method) -> bool {
        self.contains(method) || (*method == Method::HEAD && self.contains(&Method::GET))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.0.iter()
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, method) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(method.as_str())?;
        }
        Ok(())
    }
}

impl FromIterator<Method> for MethodSet {
    fn from_iter<I: IntoIterator<Item = Method>>(iter: I) -> Self {
        let mut set = Self::new();
        for method in iter {
            set.insert(method);
        }
        set
    }
}

/// Anything that can name the methods of a registration: a single
/// [`Method`], a list of them, or a textual list like `"GET, POST"`.
pub trait IntoMethods {
    fn into_methods(self) -> Result<MethodSet, RegistrationError>;
}

impl IntoMethods for MethodSet {
    fn into_methods(self) -> Result<MethodSet, RegistrationError> {
        Ok(self)
    }
}

impl IntoMethods for Method {
    fn into_methods(self) -> Result<MethodSet, RegistrationError> {
        Ok(std::iter::once(self).collect())
    }
}

impl IntoMethods for &str {
    fn into_methods(self) -> Result<MethodSet, RegistrationError> {
        MethodSet::parse(self)
    }
}

impl IntoMethods for Vec<Method> {
    fn into_methods(self) -> Result<MethodSet, RegistrationError> {
        Ok(self.into_iter().collect())
    }
}

impl<const N: usize> IntoMethods for [Method; N] {
    fn into_methods(self) -> Result<MethodSet, RegistrationError> {
        Ok(self.into_iter().collect())
    }
}

/// Optional parts of a registration.
///
/// ```rust
/// use xpress_mvc::RouteOptions;
///
/// let options = RouteOptions::new()
///     .route_id("post-archive")
///     .default_value("page", 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    pub route_id: Option<String>,
    pub default_values: ParamMap,
}

impl RouteOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable identifier for permalink lookups. An empty id counts as none.
    #[must_use]
    pub fn route_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.route_id = if id.is_empty() { None } else { Some(id) };
        self
    }

    #[must_use]
    pub fn default_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_values.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn default_values(mut self, values: ParamMap) -> Self {
        self.default_values = values;
        self
    }
}

/// One registered `(path, methods, callback, defaults, id)` tuple. Immutable
/// once registered.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pub path_pattern: String,
    pub methods: MethodSet,
    pub callback: Callback,
    pub route_id: Option<String>,
    pub default_values: ParamMap,
}
