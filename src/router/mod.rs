//! # Router Module
//!
//! The route table: registration, lookup by path, lookup by route id, and
//! several definitions per path.
//!
//! ## Overview
//!
//! Routes are registered during startup by bootstrap code and treated as
//! read-only afterwards. Each path pattern owns an ordered list of
//! definitions, so a GET and a POST handler (or a primary and a fallback
//! handler for the same verb) can share one URL:
//!
//! ```text
//! /tests/default_value ─┬─ [0] GET  → SampleController->ok     id=test-default-value
//!                       └─ [1] POST → __return_null            id=test-same-url-route
//! /tests/head_request  ─── [0] GET  → SampleController->ok
//! ```
//!
//! ## Matching
//!
//! 1. Exact path lookup.
//! 2. Otherwise the first `{placeholder}` pattern, in registration order, whose
//!    compiled regex matches. Captures become URL parameters.
//!
//! Method selection within a group is first-registered-wins, with HEAD served
//! by GET (see [`RouteGroup::select`]).

mod core;
mod pattern;
mod route;

pub use core::{RouteGroup, RouteMatch, RouteTable};
pub(crate) use pattern::fill_placeholders;
pub use route::{IntoMethods, MethodSet, RouteDefinition, RouteOptions};
