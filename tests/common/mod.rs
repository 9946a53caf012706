//! Shared fixtures: the sample controllers and the sample route set.

#![allow(dead_code)]

use std::sync::Once;

use http::Method;
use parking_lot::{const_mutex, Mutex};
use serde_json::{json, Value};
use xpress_mvc::{controller, Request, RouteOptions, Server};

pub const SAMPLE_CONTROLLER: &str = "XPress_MVC_Sample_Controller";

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness so it only shows for
/// failing tests.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("xpress_mvc=debug")
            .with_test_writer()
            .try_init();
    });
}

#[derive(Default)]
pub struct SampleController;

#[controller]
impl SampleController {
    /// Echoes the merged parameters.
    pub fn ok(&mut self, req: &mut Request) -> Value {
        json!({ "params": req.params() })
    }
}

/// `(path, action, method)` for every `LoggingController` call.
pub static CALL_LOG: Mutex<Vec<(String, &'static str, String)>> = const_mutex(Vec::new());

/// Records its calls in [`CALL_LOG`].
#[derive(Default)]
pub struct LoggingController;

#[controller]
impl LoggingController {
    pub fn primary(&mut self, req: &mut Request) -> &'static str {
        record(req, "primary");
        "primary"
    }

    pub fn fallback(&mut self, req: &mut Request) -> &'static str {
        record(req, "fallback");
        "fallback"
    }
}

fn record(req: &Request, action: &'static str) {
    CALL_LOG
        .lock()
        .push((req.path().to_string(), action, req.method().to_string()));
}

/// Calls logged for `path`, in order.
pub fn calls_for(path: &str) -> Vec<(&'static str, String)> {
    CALL_LOG
        .lock()
        .iter()
        .filter(|(p, _, _)| p == path)
        .map(|(_, action, method)| (*action, method.clone()))
        .collect()
}

/// Register the sample routes:
///
/// ```text
/// /tests/default_value  GET   Sample->ok     id=test-default-value   foo=bar
///                       POST  __return_null  id=test-same-url-route
/// /tests/head_request   GET   Sample->ok
/// ```
pub fn register_sample_routes(server: &Server) {
    server
        .register_route(
            "/tests/default_value",
            Method::GET,
            format!("{SAMPLE_CONTROLLER}->ok"),
            RouteOptions::new()
                .route_id("test-default-value")
                .default_value("foo", "bar"),
        )
        .expect("register GET /tests/default_value");
    server
        .register_route(
            "/tests/default_value",
            Method::POST,
            "__return_null",
            RouteOptions::new().route_id("test-same-url-route"),
        )
        .expect("register POST /tests/default_value");
    server
        .register_route(
            "/tests/head_request",
            Method::GET,
            format!("{SAMPLE_CONTROLLER}->ok"),
            RouteOptions::new(),
        )
        .expect("register GET /tests/head_request");
}

/// A server with both controllers and the sample routes registered.
pub fn sample_server() -> Server {
    init_tracing();
    let mut server = Server::new();
    server.register_controller::<SampleController>(SAMPLE_CONTROLLER);
    server.register_controller::<LoggingController>("LoggingController");
    register_sample_routes(&server);
    server
}
