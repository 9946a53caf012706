//! Error types.
//!
//! Registration happens during a controlled startup phase, so misuse there
//! fails fast with a [`RegistrationError`]. Everything reachable from
//! dispatch is converted into a [`Response`](crate::Response) instead; handlers
//! signal a specific status by returning an [`HttpError`] through `anyhow`.

use std::fmt;

/// Returned by [`RouteTable::register`](crate::RouteTable::register) when a
/// route definition is malformed or conflicts with one already registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The path pattern is empty.
    EmptyPath,
    /// The path pattern does not start with `/`.
    InvalidPath {
        /// The offending pattern
        path: String,
    },
    /// The method set is empty.
    NoMethods {
        /// The path the definition was registered at
        path: String,
    },
    /// A method token could not be parsed as an HTTP method.
    InvalidMethod {
        /// The offending token
        method: String,
    },
    /// Another definition already carries this route id.
    DuplicateRouteId {
        /// The duplicated id
        route_id: String,
        /// Path of the definition that already owns the id
        existing_path: String,
    },
    /// A `{placeholder}` pattern failed to compile.
    InvalidPattern {
        /// The offending pattern
        path: String,
        /// Compiler message
        reason: String,
    },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::EmptyPath => write!(f, "route path must not be empty"),
            RegistrationError::InvalidPath { path } => {
                write!(f, "route path '{}' must start with '/'", path)
            }
            RegistrationError::NoMethods { path } => {
                write!(f, "route '{}' must declare at least one HTTP method", path)
            }
            RegistrationError::InvalidMethod { method } => {
                write!(f, "'{}' is not a valid HTTP method", method)
            }
            RegistrationError::DuplicateRouteId {
                route_id,
                existing_path,
            } => write!(
                f,
                "route id '{}' is already registered for '{}'",
                route_id, existing_path
            ),
            RegistrationError::InvalidPattern { path, reason } => {
                write!(f, "route pattern '{}' is invalid: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

/// An error carrying the HTTP status a handler wants to answer with.
///
/// ```rust
/// use xpress_mvc::{HttpError, Request};
///
/// fn show(req: &mut Request) -> anyhow::Result<serde_json::Value> {
///     let id = req.param_str("id").ok_or_else(|| HttpError::bad_request("missing id"))?;
///     Ok(serde_json::json!({ "id": id }))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    /// HTTP status code
    pub status: u16,
    /// Human readable message, exposed in the response body
    pub message: String,
}

impl HttpError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for HttpError {}
