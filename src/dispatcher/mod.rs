//! # Dispatcher Module
//!
//! Runs a request through the route table and hands back a [`Response`].
//!
//! ## Overview
//!
//! The dispatcher owns no routes. It receives a [`RouteTable`] snapshot per
//! call, which keeps it usable from any number of threads while the server
//! swaps tables underneath.
//!
//! ## Request Flow
//!
//! 1. Look the path up (literal first, then `{placeholder}` patterns)
//! 2. Pick the first definition accepting the method; HEAD falls back to GET
//! 3. Fill the URL layer from captures and the defaults layer from the route
//! 4. Run middleware `before`; an early response skips the handler
//! 5. Resolve the callback through the [`CallableRegistry`]
//! 6. Run the handler, then middleware `after`
//!
//! ## Error Handling
//!
//! | Situation                          | Status | Code                      |
//! |------------------------------------|--------|---------------------------|
//! | No path matched                    | 404    | `rest_no_route`           |
//! | Path matched, method not accepted  | 405    | `rest_method_not_allowed` |
//! | Callback does not resolve          | 500    | `rest_invalid_handler`    |
//! | Handler returned [`HttpError`]     | its    | `rest_handler_error`      |
//! | Handler returned any other error   | 500    | `rest_handler_error`      |
//! | Handler or constructor panicked    | 500    | `rest_handler_error`      |
//! | Middleware hook panicked           | 500    | `rest_handler_error`      |
//!
//! Error details only reach the response body when debug errors are enabled
//! (`XPRESS_DEBUG_ERRORS`); they are always logged.
//!
//! [`Response`]: crate::Response
//! [`RouteTable`]: crate::RouteTable
//! [`CallableRegistry`]: crate::CallableRegistry
//! [`HttpError`]: crate::HttpError

mod core;

pub use core::Dispatcher;
