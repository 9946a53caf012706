use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::controller::CallableRegistry;
use crate::error::HttpError;
use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::{Response, CODE_HANDLER_ERROR, CODE_INVALID_HANDLER};
use crate::router::{RouteDefinition, RouteTable};

/// Matches requests against a [`RouteTable`] and runs the resolved handler.
///
/// `dispatch` never fails: every outcome, including handler errors and
/// panics, comes back as a [`Response`].
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CallableRegistry>,
    middlewares: Vec<Arc<dyn Middleware>>,
    debug_errors: bool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(CallableRegistry::new())
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: CallableRegistry) -> Self {
        Dispatcher {
            registry: Arc::new(registry),
            middlewares: Vec::new(),
            debug_errors: false,
        }
    }

    /// Expose handler error messages in 500 bodies.
    #[must_use]
    pub fn with_debug_errors(mut self, enabled: bool) -> Self {
        self.debug_errors = enabled;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &CallableRegistry {
        &self.registry
    }

    /// Mutable access for registering controllers and functions. Clones the
    /// registry if a copy of this dispatcher shares it.
    pub fn registry_mut(&mut self) -> &mut CallableRegistry {
        Arc::make_mut(&mut self.registry)
    }

    /// Add middleware to the processing pipeline. Middleware runs in the
    /// order it was added.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Dispatch `req` against `table`.
    ///
    /// A valid ULID in an `x-request-id` header becomes the request id.
    ///
    /// 1. Path lookup; 404 when nothing is registered for it.
    /// 2. First definition accepting the method (HEAD served by GET); 405
    ///    with an `Allow` header otherwise.
    /// 3. Placeholder captures go to the URL layer, route defaults fill in
    ///    whatever the request does not already carry.
    /// 4. Middleware `before`; the first response returned ends the chain.
    /// 5. Callback resolution; 500 when it names nothing invocable. Nothing
    ///    is constructed when middleware answered in step 4.
    /// 6. Handler, then middleware `after`. Handler errors become error
    ///    responses. A panic anywhere in steps 4 to 6, controller
    ///    construction included, becomes a 500.
    pub fn dispatch(&self, table: &RouteTable, req: &mut Request) -> Response {
        let start = Instant::now();
        if let Some(header) = req.get_header("x-request-id") {
            let adopted = RequestId::from_header_or_new(Some(header));
            req.set_request_id(adopted);
        }
        let request_id = req.request_id();

        // D1: Route lookup
        let Some(route_match) = table.lookup(req.path()) else {
            warn!(
                request_id = %request_id,
                method = %req.method(),
                path = %req.path(),
                "No route matched"
            );
            return Response::not_found();
        };
        let group = route_match.group;

        // D2: Method selection
        let Some(route) = group.select(req.method()) else {
            let allowed = group.allowed_methods();
            warn!(
                request_id = %request_id,
                method = %req.method(),
                path = %req.path(),
                route_pattern = %group.path(),
                allowed = ?allowed,
                "Method not allowed"
            );
            return Response::method_not_allowed(&allowed);
        };
        let route = Arc::clone(route);

        debug!(
            request_id = %request_id,
            method = %req.method(),
            path = %req.path(),
            route_pattern = %route.path_pattern,
            route_id = route.route_id.as_deref().unwrap_or(""),
            "Route matched"
        );

        // D3: Parameters
        if !route_match.url_params.is_empty() {
            req.set_url_params(route_match.url_params);
        }
        req.apply_defaults(&route.default_values);

        // D4: Middleware before execution
        let mut early_resp: Option<Response> = None;
        for (idx, mw) in self.middlewares.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| mw.before(req, &route))) {
                Ok(None) => {}
                Ok(Some(resp)) => {
                    debug!(
                        request_id = %request_id,
                        middleware_idx = idx,
                        "Middleware returned early response"
                    );
                    early_resp = Some(resp);
                    break;
                }
                Err(panic) => {
                    early_resp = Some(self.panic_response(
                        request_id,
                        "middleware before",
                        panic.as_ref(),
                    ));
                    break;
                }
            }
        }

        let mut resp = match early_resp {
            Some(resp) => resp,
            None => self.invoke(&route, req),
        };

        // D7: Middleware after execution
        let latency = start.elapsed();
        for mw in &self.middlewares {
            let outcome = catch_unwind(AssertUnwindSafe(|| mw.after(req, &mut resp, latency)));
            if let Err(panic) = outcome {
                resp = self.panic_response(request_id, "middleware after", panic.as_ref());
            }
        }

        resp
    }

    fn invoke(&self, route: &RouteDefinition, req: &mut Request) -> Response {
        let request_id = req.request_id();

        // D5: Callback resolution
        let resolved = catch_unwind(AssertUnwindSafe(|| {
            self.registry.make_callable(&route.callback)
        }));
        let mut callable = match resolved {
            Ok(Some(callable)) => callable,
            Ok(None) => {
                error!(
                    request_id = %request_id,
                    path = %req.path(),
                    callback = %route.callback,
                    "Route callback is not invocable"
                );
                return Response::error(
                    500,
                    CODE_INVALID_HANDLER,
                    "The handler for the route is invalid",
                );
            }
            Err(panic) => {
                return self.panic_response(request_id, "controller construction", panic.as_ref());
            }
        };

        // D6: Handler execution
        info!(
            request_id = %request_id,
            handler = %callable.name(),
            method = %req.method(),
            path = %req.path(),
            "Handler execution start"
        );
        let handler_start = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| callable.call(req)));
        let elapsed_us = handler_start.elapsed().as_micros() as u64;

        match outcome {
            Ok(Ok(resp)) => {
                info!(
                    request_id = %request_id,
                    handler = %callable.name(),
                    status = resp.status,
                    duration_us = elapsed_us,
                    "Handler execution complete"
                );
                resp
            }
            Ok(Err(err)) => {
                warn!(
                    request_id = %request_id,
                    handler = %callable.name(),
                    error = %format!("{err:#}"),
                    duration_us = elapsed_us,
                    "Handler returned an error"
                );
                self.error_response(&err)
            }
            Err(panic) => self.panic_response(request_id, callable.name(), panic.as_ref()),
        }
    }

    /// 500 for a panic caught at `stage` (a handler name or a pipeline step).
    fn panic_response(
        &self,
        request_id: RequestId,
        stage: &str,
        payload: &(dyn Any + Send),
    ) -> Response {
        let panic_message = panic_message(payload);
        error!(
            request_id = %request_id,
            stage = %stage,
            panic_message = %panic_message,
            "Panic during dispatch"
        );
        let message = if self.debug_errors {
            format!("{stage} panicked: {panic_message}")
        } else {
            "The handler failed to complete the request".to_string()
        };
        Response::error(500, CODE_HANDLER_ERROR, &message)
    }

    fn error_response(&self, err: &anyhow::Error) -> Response {
        if let Some(http) = err.downcast_ref::<HttpError>() {
            return Response::error(http.status, CODE_HANDLER_ERROR, &http.message);
        }
        let message = if self.debug_errors {
            format!("{err:#}")
        } else {
            "The handler failed to complete the request".to_string()
        };
        Response::error(500, CODE_HANDLER_ERROR, &message)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
