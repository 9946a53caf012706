use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tracing::info;

use crate::controller::{Callable, Callback, Controller, Handler};
use crate::dispatcher::Dispatcher;
use crate::error::RegistrationError;
use crate::middleware::Middleware;
use crate::permalink::{PermalinkBuilder, UrlGenerator};
use crate::request::Request;
use crate::response::Response;
use crate::router::{IntoMethods, RouteDefinition, RouteOptions, RouteTable};
use crate::runtime_config::RuntimeConfig;

/// Route table, dispatcher and permalink builder for one host process.
pub struct Server {
    routes: ArcSwap<RouteTable>,
    /// Serializes clone-and-swap registrations
    write_lock: Mutex<()>,
    dispatcher: Dispatcher,
    permalinks: PermalinkBuilder,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    /// Server with default configuration (`http://localhost`, generic error
    /// messages) and the built-in functions registered.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Server configured from `XPRESS_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_config(RuntimeConfig::from_env())
    }

    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        info!(
            home_url = %config.home_url,
            debug_errors = config.debug_errors,
            "Server configured"
        );
        Self {
            routes: ArcSwap::from_pointee(RouteTable::new()),
            write_lock: Mutex::new(()),
            dispatcher: Dispatcher::default().with_debug_errors(config.debug_errors),
            permalinks: PermalinkBuilder::new(config.home_url),
        }
    }

    /// Use `generator` for permalinks instead of the plain home URL.
    #[must_use]
    pub fn with_url_generator(mut self, generator: Arc<dyn UrlGenerator>) -> Self {
        self.permalinks = self.permalinks.with_generator(generator);
        self
    }

    /// Append a route definition. See [`RouteTable::register`].
    pub fn register_route<M, C>(
        &self,
        path_pattern: &str,
        methods: M,
        callback: C,
        options: RouteOptions,
    ) -> Result<Arc<RouteDefinition>, RegistrationError>
    where
        M: IntoMethods,
        C: Into<Callback>,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = RouteTable::clone(&self.routes.load());
        let definition = next.register(path_pattern, methods, callback, options)?;
        self.routes.store(Arc::new(next));
        Ok(definition)
    }

    /// Make `C`'s actions reachable as `"{name}->action"`.
    pub fn register_controller<C: Controller>(&mut self, name: &str) {
        self.dispatcher.registry_mut().register_controller::<C>(name);
    }

    /// Make `handler` reachable by its bare name.
    pub fn register_function<H: Handler>(&mut self, name: &str, handler: H) {
        self.dispatcher.registry_mut().register_function(name, handler);
    }

    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.dispatcher.add_middleware(mw);
    }

    /// Dispatch against the current route table snapshot.
    pub fn dispatch(&self, req: &mut Request) -> Response {
        let table = self.routes.load();
        self.dispatcher.dispatch(&table, req)
    }

    /// Current route table snapshot.
    #[must_use]
    pub fn get_routes(&self) -> Arc<RouteTable> {
        self.routes.load_full()
    }

    #[must_use]
    pub fn get_route_permalink(&self, route_id: &str) -> Option<String> {
        self.permalinks
            .get_route_permalink(&self.routes.load(), route_id)
    }

    #[must_use]
    pub fn get_route_permalink_with(&self, route_id: &str, params: &[(&str, &str)]) -> Option<String> {
        self.permalinks
            .get_route_permalink_with(&self.routes.load(), route_id, params)
    }

    /// Resolve a callback against this server's registry.
    #[must_use]
    pub fn make_callable(&self, callback: impl Into<Callback>) -> Option<Callable> {
        self.dispatcher.registry().make_callable(&callback.into())
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn permalinks(&self) -> &PermalinkBuilder {
        &self.permalinks
    }

    /// Drop every route. Controllers, functions and middleware stay
    /// registered.
    pub fn reset(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let dropped = self.routes.load().route_count();
        self.routes.store(Arc::new(RouteTable::new()));
        info!(routes = dropped, "Route table reset");
    }
}
