//! Outbound side of a dispatch.
//!
//! Handlers may return a [`Response`] directly or anything implementing
//! [`IntoResponse`]; the dispatcher wraps the latter. Error bodies follow the
//! host's REST envelope: `{"code", "message", "data": {"status"}}`.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::request::HeaderVec;

pub const CODE_NO_ROUTE: &str = "rest_no_route";
pub const CODE_METHOD_NOT_ALLOWED: &str = "rest_method_not_allowed";
pub const CODE_INVALID_HANDLER: &str = "rest_invalid_handler";
pub const CODE_HANDLER_ERROR: &str = "rest_handler_error";

/// Status code, headers and data produced by a dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response data; serialized by the host
    pub data: Value,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, data: Value) -> Self {
        Self {
            status,
            headers,
            data,
        }
    }

    /// 200 with `data`
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self::json(200, data)
    }

    /// Response with a JSON content type
    #[must_use]
    pub fn json(status: u16, data: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            data,
        }
    }

    /// Error response in the REST envelope
    #[must_use]
    pub fn error(status: u16, code: &str, message: &str) -> Self {
        Self::json(
            status,
            json!({
                "code": code,
                "message": message,
                "data": { "status": status },
            }),
        )
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::error(
            404,
            CODE_NO_ROUTE,
            "No route was found matching the URL and request method",
        )
    }

    /// 405 carrying an `Allow` header with the methods the path answers to
    #[must_use]
    pub fn method_not_allowed(allowed: &[String]) -> Self {
        let mut resp = Self::error(
            405,
            CODE_METHOD_NOT_ALLOWED,
            "Method not allowed for this route",
        );
        resp.set_header("allow", allowed.join(", "));
        resp
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// The `code` field of an error envelope, if this is one
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        if !self.is_error() {
            return None;
        }
        self.data.get("code").and_then(Value::as_str)
    }

    /// Get a header by name
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Conversion from a handler's return value into a [`Response`].
pub trait IntoResponse {
    fn into_response(self) -> anyhow::Result<Response>;
}

impl IntoResponse for Response {
    fn into_response(self) -> anyhow::Result<Response> {
        Ok(self)
    }
}

impl IntoResponse for Value {
    fn into_response(self) -> anyhow::Result<Response> {
        Ok(Response::ok(self))
    }
}

impl IntoResponse for String {
    fn into_response(self) -> anyhow::Result<Response> {
        Ok(Response::ok(Value::String(self)))
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> anyhow::Result<Response> {
        Ok(Response::ok(Value::String(self.to_string())))
    }
}

impl IntoResponse for () {
    fn into_response(self) -> anyhow::Result<Response> {
        Ok(Response::ok(Value::Null))
    }
}

impl<T: IntoResponse> IntoResponse for Option<T> {
    fn into_response(self) -> anyhow::Result<Response> {
        match self {
            Some(inner) => inner.into_response(),
            None => Ok(Response::ok(Value::Null)),
        }
    }
}

impl<T, E> IntoResponse for Result<T, E>
where
    T: IntoResponse,
    E: Into<anyhow::Error>,
{
    fn into_response(self) -> anyhow::Result<Response> {
        self.map_err(Into::into)?.into_response()
    }
}
