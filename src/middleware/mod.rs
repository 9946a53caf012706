//! # Middleware Module
//!
//! Hooks that run around every handler invocation, in the order they were
//! added to the dispatcher.
//!
//! - `before` may short-circuit the request by returning a response; the
//!   handler is then skipped but every middleware's `after` still runs.
//! - `after` may rewrite the final response.
//!
//! Middleware only sees requests that matched a route and a method; 404 and
//! 405 outcomes are produced before the chain runs.

mod core;
mod tracing;

pub use core::Middleware;
pub use tracing::TracingMiddleware;
