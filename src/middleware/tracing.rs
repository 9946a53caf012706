use std::time::Duration;

use tracing::info;

use super::Middleware;
use crate::request::Request;
use crate::response::Response;
use crate::router::RouteDefinition;

/// Logs one event per dispatched request with its route, status and latency.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &Request, route: &RouteDefinition) -> Option<Response> {
        info!(
            request_id = %req.request_id(),
            method = %req.method(),
            path = %req.path(),
            route_pattern = %route.path_pattern,
            route_id = route.route_id.as_deref().unwrap_or(""),
            callback = %route.callback,
            "Request accepted"
        );
        None
    }

    fn after(&self, req: &Request, res: &mut Response, latency: Duration) {
        info!(
            request_id = %req.request_id(),
            method = %req.method(),
            path = %req.path(),
            status = res.status,
            latency_us = latency.as_micros() as u64,
            "Request completed"
        );
    }
}
