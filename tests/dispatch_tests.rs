//! Dispatch ordering, method handling, parameter precedence and the
//! middleware chain, exercised through [`Server`].

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use serde_json::json;
use xpress_mvc::{
    controller, HttpError, Middleware, ParamSource, Request, Response, RouteDefinition, RouteOptions,
    RuntimeConfig, Server, TracingMiddleware,
};

use common::{calls_for, sample_server};

#[test]
fn test_first_registered_wins_for_same_method() {
    let server = sample_server();
    server
        .register_route("/tests/priority", Method::GET, "LoggingController->primary", RouteOptions::new())
        .unwrap();
    server
        .register_route("/tests/priority", Method::GET, "LoggingController->fallback", RouteOptions::new())
        .unwrap();

    for _ in 0..3 {
        let mut req = Request::new(Method::GET, "/tests/priority");
        assert_eq!(server.dispatch(&mut req).data, "primary");
    }
    assert_eq!(
        calls_for("/tests/priority"),
        vec![
            ("primary", "GET".to_string()),
            ("primary", "GET".to_string()),
            ("primary", "GET".to_string()),
        ]
    );
}

#[test]
fn test_head_uses_first_get_definition() {
    let server = sample_server();
    server
        .register_route("/tests/head_order", Method::POST, "LoggingController->fallback", RouteOptions::new())
        .unwrap();
    server
        .register_route("/tests/head_order", Method::GET, "LoggingController->primary", RouteOptions::new())
        .unwrap();

    let mut req = Request::new(Method::HEAD, "/tests/head_order");
    let resp = server.dispatch(&mut req);
    assert_eq!(resp.status, 200);
    assert_eq!(calls_for("/tests/head_order"), vec![("primary", "HEAD".to_string())]);
}

#[test]
fn test_explicit_head_definition_preferred_when_first() {
    let server = sample_server();
    server
        .register_route("/tests/explicit_head", "HEAD", "LoggingController->fallback", RouteOptions::new())
        .unwrap();
    server
        .register_route("/tests/explicit_head", "GET", "LoggingController->primary", RouteOptions::new())
        .unwrap();

    let mut req = Request::new(Method::HEAD, "/tests/explicit_head");
    assert_eq!(server.dispatch(&mut req).data, "fallback");
}

#[test]
fn test_method_tokens_are_normalized() {
    let server = sample_server();
    server
        .register_route("/tests/lowercase", "get, post", "__return_true", RouteOptions::new())
        .unwrap();

    let mut req = Request::parse(" head ", "/tests/lowercase").unwrap();
    assert_eq!(req.method(), &Method::HEAD);
    assert_eq!(server.dispatch(&mut req).status, 200);

    let mut req = Request::parse("Post", "/tests/lowercase").unwrap();
    assert_eq!(server.dispatch(&mut req).data, true);
}

#[test]
fn test_options_not_synthesized() {
    let server = sample_server();
    let mut req = Request::new(Method::OPTIONS, "/tests/default_value");
    let resp = server.dispatch(&mut req);
    assert_eq!(resp.status, 405);
    assert_eq!(resp.get_header("allow"), Some("GET, POST, HEAD"));
}

#[test]
fn test_parameter_precedence() {
    let server = sample_server();
    server
        .register_route(
            "/tests/layers/{foo}",
            Method::POST,
            "XPress_MVC_Sample_Controller->ok",
            RouteOptions::new().default_value("foo", "default").default_value("page", 1),
        )
        .unwrap();

    let mut req = Request::from_uri(Method::POST, "/tests/layers/from-url?foo=from-query&q=search");
    req.set_body(json!({ "foo": "from-body" }));
    let resp = server.dispatch(&mut req);

    assert_eq!(resp.data["params"]["foo"], "from-url");
    assert_eq!(resp.data["params"]["q"], "search");
    assert_eq!(resp.data["params"]["page"], 1);
    assert_eq!(req.param_source("foo"), Some(ParamSource::Url));
    assert_eq!(req.param_source("page"), Some(ParamSource::Defaults));
    assert_eq!(req.layer(ParamSource::Body)["foo"], "from-body");
}

#[test]
fn test_literal_path_beats_placeholder() {
    let server = sample_server();
    server
        .register_route("/tests/{slug}", Method::GET, "LoggingController->fallback", RouteOptions::new())
        .unwrap();

    let mut literal = Request::new(Method::GET, "/tests/head_request");
    assert!(literal.get_param("slug").is_none());
    server.dispatch(&mut literal);
    assert!(literal.get_param("slug").is_none());

    let mut pattern = Request::new(Method::GET, "/tests/anything");
    assert_eq!(server.dispatch(&mut pattern).data, "fallback");
    assert_eq!(pattern["slug"], "anything");
}

#[test]
fn test_handler_error_detail_follows_config() {
    fn failing(_req: &mut Request) -> anyhow::Result<Response> {
        Err(anyhow::anyhow!("disk full"))
    }

    let quiet = Server::new();
    quiet
        .register_route("/tests/fail", Method::GET, xpress_mvc::Callback::direct(failing), RouteOptions::new())
        .unwrap();
    let mut req = Request::new(Method::GET, "/tests/fail");
    let resp = quiet.dispatch(&mut req);
    assert_eq!(resp.status, 500);
    assert_eq!(resp.error_code(), Some("rest_handler_error"));
    assert_ne!(resp.data["message"], "disk full");

    let config = RuntimeConfig::from_lookup(|key| {
        (key == "XPRESS_DEBUG_ERRORS").then(|| "true".to_string())
    });
    let verbose = Server::with_config(config);
    verbose
        .register_route("/tests/fail", Method::GET, xpress_mvc::Callback::direct(failing), RouteOptions::new())
        .unwrap();
    let mut req = Request::new(Method::GET, "/tests/fail");
    assert_eq!(verbose.dispatch(&mut req).data["message"], "disk full");
}

#[test]
fn test_http_error_status_passes_through() {
    let server = Server::new();
    server
        .register_route(
            "/tests/gone",
            Method::GET,
            xpress_mvc::Callback::direct(|_req: &mut Request| -> anyhow::Result<Response> {
                Err(HttpError::new(410, "moved away").into())
            }),
            RouteOptions::new(),
        )
        .unwrap();
    let mut req = Request::new(Method::GET, "/tests/gone");
    let resp = server.dispatch(&mut req);
    assert_eq!(resp.status, 410);
    assert_eq!(resp.data["data"]["status"], 410);
}

struct RequireToken {
    rejected: AtomicUsize,
}

impl Middleware for RequireToken {
    fn before(&self, req: &Request, route: &RouteDefinition) -> Option<Response> {
        if route.route_id.as_deref() != Some("test-default-value") {
            return None;
        }
        match req.get_header("authorization") {
            Some("Bearer sample") => None,
            _ => {
                self.rejected.fetch_add(1, Ordering::SeqCst);
                Some(Response::error(401, "rest_forbidden", "Sorry, you are not allowed to do that."))
            }
        }
    }
}

struct StampLatency;

impl Middleware for StampLatency {
    fn after(&self, _req: &Request, res: &mut Response, latency: Duration) {
        res.set_header("x-latency-us", latency.as_micros().to_string());
    }
}

#[test]
fn test_middleware_chain() {
    let guard = Arc::new(RequireToken {
        rejected: AtomicUsize::new(0),
    });
    let mut server = sample_server();
    server.add_middleware(Arc::new(TracingMiddleware));
    server.add_middleware(Arc::clone(&guard) as Arc<dyn Middleware>);
    server.add_middleware(Arc::new(StampLatency));

    let mut anonymous = Request::new(Method::GET, "/tests/default_value");
    let resp = server.dispatch(&mut anonymous);
    assert_eq!(resp.status, 401);
    assert!(resp.get_header("x-latency-us").is_some());

    let mut authorized = Request::new(Method::GET, "/tests/default_value");
    authorized.set_header("Authorization", "Bearer sample");
    assert_eq!(server.dispatch(&mut authorized).status, 200);

    let mut other = Request::new(Method::GET, "/tests/head_request");
    assert_eq!(server.dispatch(&mut other).status, 200);

    assert_eq!(guard.rejected.load(Ordering::SeqCst), 1);
}

struct Fragile;

impl Default for Fragile {
    fn default() -> Self {
        panic!("constructor failed")
    }
}

#[controller]
impl Fragile {
    pub fn ok(&mut self, _req: &mut Request) -> serde_json::Value {
        serde_json::Value::Null
    }
}

#[test]
fn test_failing_controller_constructor_returns_500() {
    let mut server = Server::new();
    server.register_controller::<Fragile>("Fragile");
    server
        .register_route("/fragile", Method::GET, "Fragile->ok", RouteOptions::new())
        .unwrap();

    let mut req = Request::new(Method::GET, "/fragile");
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| server.dispatch(&mut req)));
    let resp = outcome.expect("dispatch must not unwind");
    assert_eq!(resp.status, 500);
    assert_eq!(resp.error_code(), Some("rest_handler_error"));

    // The server keeps serving afterwards.
    server
        .register_route("/fine", Method::GET, "__return_true", RouteOptions::new())
        .unwrap();
    let mut req = Request::new(Method::GET, "/fine");
    assert_eq!(server.dispatch(&mut req).status, 200);
}
