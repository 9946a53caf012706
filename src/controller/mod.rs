//! # Controller Module
//!
//! Turns a route's callback reference into something the dispatcher can
//! invoke.
//!
//! A [`Callback`] is one of:
//!
//! - **Direct**: a closure or function value, invoked as-is.
//! - **ControllerMethod**: the textual `"Controller->method"` form. The
//!   [`CallableRegistry`] maps the controller name to a factory that checks
//!   the action exists, builds a fresh controller instance and binds the
//!   action to it. No instance is cached between calls.
//! - **Function**: a bare name looked up in the registry's function table
//!   (`__return_null` and friends are pre-registered).
//!
//! Resolution never fails loudly: an unknown controller, action or function
//! yields `None` and callers decide what that means.
//!
//! Controllers implement [`Controller`], usually through the `#[controller]`
//! attribute:
//!
//! ```rust
//! use xpress_mvc::{controller, CallableRegistry, Request, Response};
//! use serde_json::json;
//!
//! #[derive(Default)]
//! struct GreetingController;
//!
//! #[controller]
//! impl GreetingController {
//!     pub fn hello(&mut self, req: &mut Request) -> Response {
//!         Response::ok(json!({ "hello": req.param_str("name") }))
//!     }
//! }
//!
//! let mut registry = CallableRegistry::new();
//! registry.register_controller::<GreetingController>("GreetingController");
//! assert!(registry.make_callable(&"GreetingController->hello".into()).is_some());
//! assert!(registry.make_callable(&"GreetingController->bye".into()).is_none());
//! ```

mod core;

pub use core::{Action, Callable, CallableRegistry, Callback, Controller, Handler, HandlerResult};
