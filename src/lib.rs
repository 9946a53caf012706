//! # XPress MVC
//!
//! **XPress MVC** is the routing and dispatch engine of an MVC layer embedded
//! in a host web application. The host parses the HTTP request; this crate
//! decides which handler runs, with which parameters, and what comes back.
//!
//! ## Overview
//!
//! - Routes are registered at startup: a path pattern, a set of methods, a
//!   callback, optional default parameter values and an optional route id.
//! - Several definitions may share one path. The first registered definition
//!   that accepts the request method wins, and HEAD is served by GET.
//! - Callbacks are either closures or text: `"Controller->method"` names an
//!   action on a controller type, a bare name refers to a registered function.
//! - Route ids give stable permalinks, built through a host-supplied URL
//!   generator that is not trusted to keep the path intact.
//!
//! ## Architecture
//!
//! - **[`router`]** - Route table: registration, path and id lookup, `{placeholder}` patterns
//! - **[`dispatcher`]** - Method selection, parameter defaulting, handler invocation, error mapping
//! - **[`controller`]** - Callback forms, the [`Controller`] trait and the callable registry
//! - **[`permalink`]** - Route id to absolute URL, with path correction
//! - **[`server`]** - Facade owning a route table snapshot, a dispatcher and a permalink builder
//! - **[`request`]** / **[`response`]** - The request abstraction and handler output
//! - **[`middleware`]** - Hooks around handler invocation
//! - **[`runtime_config`]** / **[`logging`]** - Environment configuration and `tracing` setup
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Server
//!     participant Table as RouteTable
//!     participant Dispatcher
//!     participant Registry as CallableRegistry
//!     participant Handler
//!
//!     Host->>Server: dispatch(request)
//!     Server->>Table: load snapshot
//!     Server->>Dispatcher: dispatch(table, request)
//!     Dispatcher->>Table: lookup(path)
//!     alt No Route
//!         Dispatcher-->>Host: 404 rest_no_route
//!     end
//!     Dispatcher->>Dispatcher: select(method), HEAD via GET
//!     alt No Method
//!         Dispatcher-->>Host: 405 rest_method_not_allowed + Allow
//!     end
//!     Dispatcher->>Dispatcher: URL params + defaults
//!     Dispatcher->>Registry: make_callable(callback)
//!     alt Not Invocable
//!         Dispatcher-->>Host: 500 rest_invalid_handler
//!     end
//!     Dispatcher->>Handler: call(request)
//!     Handler-->>Dispatcher: IntoResponse / error / panic
//!     Dispatcher-->>Host: Response
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use serde_json::json;
//! use xpress_mvc::{controller, Request, Response, RouteOptions, Server};
//!
//! #[derive(Default)]
//! struct PostsController;
//!
//! #[controller]
//! impl PostsController {
//!     pub fn index(&mut self, req: &mut Request) -> Response {
//!         Response::ok(json!({ "page": req["page"] }))
//!     }
//! }
//!
//! let mut server = Server::new();
//! server.register_controller::<PostsController>("PostsController");
//! server
//!     .register_route(
//!         "/posts",
//!         Method::GET,
//!         "PostsController->index",
//!         RouteOptions::new().route_id("posts").default_value("page", 1),
//!     )
//!     .unwrap();
//!
//! let mut req = Request::new(Method::HEAD, "/posts");
//! let resp = server.dispatch(&mut req);
//! assert_eq!(resp.status, 200);
//! assert_eq!(resp.data["page"], 1);
//! assert_eq!(server.get_route_permalink("posts").as_deref(), Some("http://localhost/posts"));
//! ```
//!
//! ## Configuration
//!
//! See [`runtime_config`] for the `XPRESS_*` environment variables and
//! [`logging::init_logging`] for subscriber setup.

extern crate self as xpress_mvc;

pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod permalink;
pub mod request;
pub mod response;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use controller::{Callable, CallableRegistry, Callback, Controller, Handler, HandlerResult};
pub use dispatcher::Dispatcher;
pub use error::{HttpError, RegistrationError};
pub use ids::RequestId;
pub use middleware::{Middleware, TracingMiddleware};
pub use permalink::{HomeUrl, PermalinkBuilder, UrlGenerator};
pub use request::{ParamSource, Request};
pub use response::{IntoResponse, Response};
pub use router::{MethodSet, RouteDefinition, RouteOptions, RouteTable};
pub use runtime_config::RuntimeConfig;
pub use server::Server;
pub use xpress_mvc_macros::controller;
