//! # Server Module
//!
//! [`Server`] ties the engine together for a host process: one route table,
//! one dispatcher with its callable registry, one permalink builder.
//!
//! ## Lifecycle
//!
//! ```text
//! startup ── register_controller / register_function / add_middleware  (&mut self)
//!         └─ register_route                                            (&self)
//! serving ── dispatch / get_routes / get_route_permalink               (&self)
//! tests   ── reset                                                     (&self)
//! ```
//!
//! The route table is published through an [`arc_swap::ArcSwap`]. Readers
//! load the current snapshot without locking; each registration clones the
//! table, appends to the clone and swaps it in, so a dispatch already in
//! flight keeps the table it started with.
//!
//! ```rust
//! use http::Method;
//! use serde_json::json;
//! use xpress_mvc::{Callback, Request, RouteOptions, Server};
//!
//! let server = Server::new();
//! server
//!     .register_route(
//!         "/hello/{name}",
//!         Method::GET,
//!         Callback::direct(|req: &mut Request| json!({ "hello": req["name"] })),
//!         RouteOptions::new().route_id("hello"),
//!     )
//!     .unwrap();
//!
//! let mut req = Request::new(Method::GET, "/hello/world");
//! let resp = server.dispatch(&mut req);
//! assert_eq!(resp.data["hello"], "world");
//! assert_eq!(
//!     server.get_route_permalink_with("hello", &[("name", "rust lang")]).as_deref(),
//!     Some("http://localhost/hello/rust%20lang")
//! );
//! ```

mod core;

pub use core::Server;
