use std::ops::Index;
use std::sync::Arc;

use http::Method;
use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::ids::RequestId;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage shared by [`Request`] and [`Response`](crate::Response).
///
/// Names are `Arc<str>` because they repeat across requests (`content-type`,
/// `allow`, ...) and clone in O(1).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// One parameter layer.
pub type ParamMap = Map<String, Value>;

static NULL: Value = Value::Null;

/// Where a parameter came from. Declaration order is lookup precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSource {
    Url,
    Body,
    Query,
    Defaults,
}

impl ParamSource {
    /// Highest precedence first.
    pub const PRECEDENCE: [ParamSource; 4] = [
        ParamSource::Url,
        ParamSource::Body,
        ParamSource::Query,
        ParamSource::Defaults,
    ];
}

/// A single inbound HTTP interaction.
///
/// ```rust
/// use http::Method;
/// use xpress_mvc::Request;
///
/// let mut req = Request::from_uri(Method::GET, "/posts?page=2");
/// assert_eq!(req.path(), "/posts");
/// assert_eq!(req.param_str("page").as_deref(), Some("2"));
///
/// req.set_url_params([("page", "3")]);
/// assert_eq!(req["page"], "3");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    request_id: RequestId,
    method: Method,
    path: String,
    headers: HeaderVec,
    body: Option<Value>,
    url_params: ParamMap,
    body_params: ParamMap,
    query_params: ParamMap,
    default_params: ParamMap,
}

impl Request {
    /// Create a request for `path`. The path is taken verbatim; use
    /// [`Request::from_uri`] when it still carries a query string.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            headers: HeaderVec::new(),
            body: None,
            url_params: ParamMap::new(),
            body_params: ParamMap::new(),
            query_params: ParamMap::new(),
            default_params: ParamMap::new(),
        }
    }

    /// Create a request from a method token as received on the wire.
    ///
    /// The token is trimmed and uppercased (`"head"` becomes `HEAD`).
    pub fn parse(method: &str, path: impl Into<String>) -> Result<Self, http::method::InvalidMethod> {
        let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())?;
        Ok(Self::new(method, path))
    }

    /// Create a request from a path that may carry `?query`. Query pairs are
    /// form-decoded into the query layer as strings.
    pub fn from_uri(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };
        let mut req = Self::new(method, path);
        if let Some(query) = query {
            req.query_params = url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect();
        }
        req
    }

    #[inline]
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn set_request_id(&mut self, id: RequestId) {
        self.request_id = id;
    }

    #[inline]
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    /// Raw body as supplied by the host.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Store the decoded body. A JSON object also replaces the body layer so
    /// its fields become parameters.
    pub fn set_body(&mut self, body: Value) {
        if let Value::Object(map) = &body {
            self.body_params = map.clone();
        }
        self.body = Some(body);
    }

    pub fn set_query_params<I, K, V>(&mut self, params: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.query_params = collect_params(params);
    }

    pub fn set_body_params<I, K, V>(&mut self, params: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.body_params = collect_params(params);
    }

    pub fn set_url_params<I, K, V>(&mut self, params: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.url_params = collect_params(params);
    }

    pub fn set_default_params<I, K, V>(&mut self, params: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.default_params = collect_params(params);
    }

    /// Fill in route defaults. Keys already present in any layer are left
    /// untouched.
    pub fn apply_defaults(&mut self, defaults: &ParamMap) {
        for (key, value) in defaults {
            if !self.has_param(key) {
                self.default_params.insert(key.clone(), value.clone());
            }
        }
    }

    #[must_use]
    pub fn layer(&self, source: ParamSource) -> &ParamMap {
        match source {
            ParamSource::Url => &self.url_params,
            ParamSource::Body => &self.body_params,
            ParamSource::Query => &self.query_params,
            ParamSource::Defaults => &self.default_params,
        }
    }

    fn layer_mut(&mut self, source: ParamSource) -> &mut ParamMap {
        match source {
            ParamSource::Url => &mut self.url_params,
            ParamSource::Body => &mut self.body_params,
            ParamSource::Query => &mut self.query_params,
            ParamSource::Defaults => &mut self.default_params,
        }
    }

    /// Layer that currently answers for `key`.
    #[must_use]
    pub fn param_source(&self, key: &str) -> Option<ParamSource> {
        ParamSource::PRECEDENCE
            .into_iter()
            .find(|source| self.layer(*source).contains_key(key))
    }

    #[must_use]
    pub fn get_param(&self, key: &str) -> Option<&Value> {
        self.param_source(key)
            .and_then(|source| self.layer(source).get(key))
    }

    /// Parameter rendered as text. Numbers and booleans are formatted, `null`
    /// is treated as absent, arrays and objects are JSON-encoded.
    #[must_use]
    pub fn param_str(&self, key: &str) -> Option<String> {
        match self.get_param(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }

    #[must_use]
    pub fn has_param(&self, key: &str) -> bool {
        self.param_source(key).is_some()
    }

    /// Overwrite `key` in the layer that currently answers for it, or add it
    /// to the query layer.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let source = self.param_source(&key).unwrap_or(ParamSource::Query);
        self.layer_mut(source).insert(key, value.into());
    }

    /// All parameters merged by precedence.
    #[must_use]
    pub fn params(&self) -> ParamMap {
        let mut merged = ParamMap::new();
        for source in ParamSource::PRECEDENCE.into_iter().rev() {
            for (key, value) in self.layer(source) {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}

impl Index<&str> for Request {
    type Output = Value;

    /// Missing keys index to `Value::Null`.
    fn index(&self, key: &str) -> &Value {
        self.get_param(key).unwrap_or(&NULL)
    }
}

fn collect_params<I, K, V>(params: I) -> ParamMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
