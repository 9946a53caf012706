use std::time::Duration;

use crate::request::Request;
use crate::response::Response;
use crate::router::RouteDefinition;

pub trait Middleware: Send + Sync {
    fn before(&self, _req: &Request, _route: &RouteDefinition) -> Option<Response> {
        None
    }
    fn after(&self, _req: &Request, _res: &mut Response, _latency: Duration) {}
}
