//! End-to-end tests for [`Server`]: registration, dispatch, permalinks and
//! callable resolution against the sample route set.

mod common;

use std::sync::Arc;
use std::thread;

use http::Method;
use serde_json::Value;
use xpress_mvc::permalink::UrlGenerator;
use xpress_mvc::{Callback, RegistrationError, Request, RouteOptions, RuntimeConfig, Server};

use common::{sample_server, SAMPLE_CONTROLLER};

#[test]
fn test_register_routes() {
    let server = sample_server();
    let table = server.get_routes();

    assert_eq!(table.len(), 2);
    assert!(table.contains_path("/tests/head_request"));
    assert!(table.contains_path("/tests/default_value"));

    let routes = table.get("/tests/default_value").unwrap();
    assert_eq!(routes.len(), 2);

    assert!(routes[0].methods.contains(&Method::GET));
    assert_eq!(routes[0].route_id.as_deref(), Some("test-default-value"));
    assert_eq!(
        routes[0].callback.to_string(),
        format!("{SAMPLE_CONTROLLER}->ok")
    );

    assert!(routes[1].methods.contains(&Method::POST));
    assert_eq!(routes[1].route_id.as_deref(), Some("test-same-url-route"));
    assert_eq!(routes[1].callback.to_string(), "__return_null");
}

#[test]
fn test_unregistered_path_is_absent() {
    let server = sample_server();
    let table = server.get_routes();
    assert_eq!(table.len(), 2);
    assert!(!table.contains_path("/tests/delete_route"));
}

#[test]
fn test_default_param() {
    let server = sample_server();
    let mut req = Request::new(Method::GET, "/tests/default_value");
    let resp = server.dispatch(&mut req);

    assert_eq!(resp.status, 200);
    assert_eq!(req["foo"], "bar");
    assert_eq!(resp.data["params"]["foo"], "bar");
}

#[test]
fn test_default_param_is_overridden() {
    let server = sample_server();
    let mut req = Request::new(Method::GET, "/tests/default_value");
    req.set_query_params([("foo", 123)]);
    let resp = server.dispatch(&mut req);

    assert_eq!(resp.status, 200);
    assert_eq!(req.param_str("foo").as_deref(), Some("123"));
    assert_eq!(resp.data["params"]["foo"], 123);
}

#[test]
fn test_head_request_handled_by_get() {
    let server = sample_server();
    let mut req = Request::new(Method::HEAD, "/tests/head_request");
    assert_eq!(server.dispatch(&mut req).status, 200);
}

#[test]
fn test_head_not_served_without_get() {
    let server = sample_server();
    server
        .register_route("/tests/post_only", Method::POST, "__return_true", RouteOptions::new())
        .unwrap();
    let mut req = Request::new(Method::HEAD, "/tests/post_only");
    let resp = server.dispatch(&mut req);
    assert_eq!(resp.status, 405);
    assert_eq!(resp.get_header("allow"), Some("POST"));
}

#[test]
fn test_same_path_serves_each_method() {
    let server = sample_server();

    let mut get = Request::new(Method::GET, "/tests/default_value");
    assert_eq!(server.dispatch(&mut get).data["params"]["foo"], "bar");

    let mut post = Request::new(Method::POST, "/tests/default_value");
    let resp = server.dispatch(&mut post);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.data, Value::Null);
}

#[test]
fn test_find_route_by_id() {
    let server = sample_server();
    let table = server.get_routes();
    assert_eq!(table.find_by_id("test-default-value"), Some("/tests/default_value"));
    assert_eq!(table.find_by_id("test-same-url-route"), Some("/tests/default_value"));
    assert_eq!(table.find_by_id("invalid-route-id"), None);
}

#[test]
fn test_get_route_permalink() {
    let server = sample_server();

    let permalink = server.get_route_permalink("test-default-value").unwrap();
    assert!(permalink.contains("/tests/default_value"));

    let permalink = server.get_route_permalink("test-same-url-route").unwrap();
    assert!(permalink.contains("/tests/default_value"));

    assert!(server.get_route_permalink("invalid-route-id").is_none());
}

/// Behaves like a translation plugin: puts a language slug in front of the
/// path.
struct AddLanguage;

impl UrlGenerator for AddLanguage {
    fn absolute_url(&self, path: &str) -> String {
        format!("http://localhost{path}").replace(path, &format!("/pt-br{path}"))
    }
}

#[test]
fn test_get_route_permalink_with_translation_plugin() {
    let server = sample_server().with_url_generator(Arc::new(AddLanguage));

    let permalink = server.get_route_permalink("test-default-value").unwrap();
    assert!(permalink.contains("/tests/default_value"));
    assert!(!permalink.contains("/pt-br"));
}

#[test]
fn test_permalink_uses_configured_home() {
    let config = RuntimeConfig::from_lookup(|key| {
        (key == "XPRESS_HOME_URL").then(|| "https://example.com/site".to_string())
    });
    let server = Server::with_config(config);
    common::register_sample_routes(&server);

    assert_eq!(
        server.get_route_permalink("test-default-value").as_deref(),
        Some("https://example.com/site/tests/default_value")
    );
}

#[test]
fn test_xpress_mvc_is_callable() {
    let server = sample_server();
    assert!(server
        .make_callable(format!("{SAMPLE_CONTROLLER}->ok"))
        .is_some());
    assert!(server
        .make_callable(format!("{SAMPLE_CONTROLLER}->unexisting_method"))
        .is_none());
    assert!(server.make_callable("__return_null").is_some());
    assert!(server.make_callable("Missing_Controller->ok").is_none());
}

#[test]
fn test_introspection_is_idempotent() {
    let server = sample_server();
    let first: Vec<(String, usize)> = server
        .get_routes()
        .get_routes()
        .into_iter()
        .map(|(path, routes)| (path.to_string(), routes.len()))
        .collect();
    let second: Vec<(String, usize)> = server
        .get_routes()
        .get_routes()
        .into_iter()
        .map(|(path, routes)| (path.to_string(), routes.len()))
        .collect();
    assert_eq!(first, second);
    assert_eq!(
        server.get_route_permalink("test-default-value"),
        server.get_route_permalink("test-default-value")
    );
}

#[test]
fn test_duplicate_route_id_rejected() {
    let server = sample_server();
    let err = server
        .register_route(
            "/tests/other",
            Method::GET,
            "__return_true",
            RouteOptions::new().route_id("test-default-value"),
        )
        .unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicateRouteId { .. }));
    assert!(!server.get_routes().contains_path("/tests/other"));
    assert_eq!(
        server.get_routes().find_by_id("test-default-value"),
        Some("/tests/default_value")
    );
}

#[test]
fn test_reset_clears_routes() {
    let server = sample_server();
    server.reset();

    let table = server.get_routes();
    assert!(table.is_empty());
    assert!(server.get_route_permalink("test-default-value").is_none());

    let mut req = Request::new(Method::GET, "/tests/default_value");
    assert_eq!(server.dispatch(&mut req).status, 404);

    // Controllers survive a reset.
    common::register_sample_routes(&server);
    let mut req = Request::new(Method::GET, "/tests/default_value");
    assert_eq!(server.dispatch(&mut req).status, 200);
}

#[test]
fn test_snapshot_outlives_registration() {
    let server = sample_server();
    let before = server.get_routes();
    server
        .register_route("/tests/late", Method::GET, "__return_true", RouteOptions::new())
        .unwrap();

    assert!(!before.contains_path("/tests/late"));
    assert!(server.get_routes().contains_path("/tests/late"));
}

#[test]
fn test_concurrent_dispatch() {
    let server = Arc::new(sample_server());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let server = Arc::clone(&server);
            thread::spawn(move || {
                let mut req = Request::new(Method::GET, "/tests/default_value");
                req.set_query_params([("foo", i)]);
                server.dispatch(&mut req).data["params"]["foo"].clone()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), i);
    }
}

#[test]
fn test_closure_callback() {
    let server = sample_server();
    server
        .register_route(
            "/tests/closure/{id}",
            [Method::GET, Method::PUT],
            Callback::direct(|req: &mut Request| req.param_str("id")),
            RouteOptions::new().route_id("closure"),
        )
        .unwrap();

    let mut req = Request::new(Method::PUT, "/tests/closure/42");
    assert_eq!(server.dispatch(&mut req).data, "42");
    assert_eq!(
        server
            .get_route_permalink_with("closure", &[("id", "42")])
            .as_deref(),
        Some("http://localhost/tests/closure/42")
    );
}
