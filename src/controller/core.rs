use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::request::Request;
use crate::response::{IntoResponse, Response};

pub type HandlerResult = anyhow::Result<Response>;

/// A directly invocable handler.
///
/// Implemented for every `Fn(&mut Request) -> R` where `R: IntoResponse`.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: &mut Request) -> HandlerResult;
}

impl<F, R> Handler for F
where
    F: Fn(&mut Request) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
    fn call(&self, req: &mut Request) -> HandlerResult {
        self(req).into_response()
    }
}

/// A controller action bound to a `&mut` instance.
pub type Action<C> = fn(&mut C, &mut Request) -> HandlerResult;

/// A type whose public methods are reachable as `"Name->method"` callbacks.
///
/// A fresh instance (via `Default`) is built for every resolution.
pub trait Controller: Default + Send + 'static {
    /// Look up an action by method name.
    fn action(name: &str) -> Option<Action<Self>>;

    /// Names of all actions, for introspection.
    fn actions() -> &'static [&'static str] {
        &[]
    }
}

/// Reference to the code a route runs.
#[derive(Clone)]
pub enum Callback {
    Direct(Arc<dyn Handler>),
    ControllerMethod { controller: String, method: String },
    Function(String),
    /// Text that is neither `A->b` nor a plain name; never resolves.
    Invalid(String),
}

impl Callback {
    /// Wrap a closure or function value.
    pub fn direct<H: Handler>(handler: H) -> Self {
        Callback::Direct(Arc::new(handler))
    }

    /// Parse the textual form. `"Controller->method"` becomes
    /// [`Callback::ControllerMethod`], a bare identifier (`::` paths allowed)
    /// becomes [`Callback::Function`], anything else is
    /// [`Callback::Invalid`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Some((controller, method)) = trimmed.split_once("->") {
            let (controller, method) = (controller.trim(), method.trim());
            if is_identifier(controller) && is_identifier(method) && !method.contains("::") {
                return Callback::ControllerMethod {
                    controller: controller.to_string(),
                    method: method.to_string(),
                };
            }
            return Callback::Invalid(text.to_string());
        }
        if is_identifier(trimmed) {
            return Callback::Function(trimmed.to_string());
        }
        Callback::Invalid(text.to_string())
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.split("::")
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_'))
}

impl From<&str> for Callback {
    fn from(text: &str) -> Self {
        Callback::parse(text)
    }
}

impl From<String> for Callback {
    fn from(text: String) -> Self {
        Callback::parse(&text)
    }
}

impl From<Arc<dyn Handler>> for Callback {
    fn from(handler: Arc<dyn Handler>) -> Self {
        Callback::Direct(handler)
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Direct(_) => f.write_str("<closure>"),
            Callback::ControllerMethod { controller, method } => {
                write!(f, "{}->{}", controller, method)
            }
            Callback::Function(name) => f.write_str(name),
            Callback::Invalid(text) => f.write_str(text),
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Direct(_) => f.write_str("Direct(<closure>)"),
            Callback::ControllerMethod { controller, method } => f
                .debug_struct("ControllerMethod")
                .field("controller", controller)
                .field("method", method)
                .finish(),
            Callback::Function(name) => f.debug_tuple("Function").field(name).finish(),
            Callback::Invalid(text) => f.debug_tuple("Invalid").field(text).finish(),
        }
    }
}

enum CallableKind {
    Shared(Arc<dyn Handler>),
    Bound(Box<dyn FnMut(&mut Request) -> HandlerResult + Send>),
}

/// A resolved callback, ready to run against a request.
pub struct Callable {
    name: String,
    kind: CallableKind,
}

impl Callable {
    fn shared(name: String, handler: Arc<dyn Handler>) -> Self {
        Self {
            name,
            kind: CallableKind::Shared(handler),
        }
    }

    fn bound<F>(name: String, f: F) -> Self
    where
        F: FnMut(&mut Request) -> HandlerResult + Send + 'static,
    {
        Self {
            name,
            kind: CallableKind::Bound(Box::new(f)),
        }
    }

    /// Textual form of the callback this was resolved from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&mut self, req: &mut Request) -> HandlerResult {
        match &mut self.kind {
            CallableKind::Shared(handler) => handler.call(req),
            CallableKind::Bound(f) => f(req),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable").field("name", &self.name).finish()
    }
}

type ControllerFactory = Arc<dyn Fn(&str) -> Option<Callable> + Send + Sync>;

/// Controller constructors and named functions that textual callbacks
/// resolve against.
#[derive(Clone)]
pub struct CallableRegistry {
    controllers: HashMap<String, ControllerFactory>,
    functions: HashMap<String, Arc<dyn Handler>>,
}

impl Default for CallableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallableRegistry {
    /// A registry holding only the built-in functions (`__return_null`,
    /// `__return_true`, `__return_false`, `__return_empty_array`).
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_function("__return_null", |_req: &mut Request| Value::Null);
        registry.register_function("__return_true", |_req: &mut Request| Value::Bool(true));
        registry.register_function("__return_false", |_req: &mut Request| Value::Bool(false));
        registry.register_function("__return_empty_array", |_req: &mut Request| json!([]));
        registry
    }

    /// A registry with nothing registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            controllers: HashMap::new(),
            functions: HashMap::new(),
        }
    }

    /// Make `C`'s actions reachable as `"{name}->action"`.
    pub fn register_controller<C: Controller>(&mut self, name: &str) {
        let label = name.to_string();
        let factory: ControllerFactory = Arc::new(move |method: &str| {
            let action = C::action(method)?;
            let mut instance = C::default();
            Some(Callable::bound(
                format!("{}->{}", label, method),
                move |req: &mut Request| action(&mut instance, req),
            ))
        });
        if self.controllers.insert(name.to_string(), factory).is_some() {
            warn!(controller = %name, "Replaced existing controller");
        }
        debug!(controller = %name, actions = ?C::actions(), "Controller registered");
    }

    /// Make `handler` reachable by its bare name.
    pub fn register_function<H: Handler>(&mut self, name: &str, handler: H) {
        if self
            .functions
            .insert(name.to_string(), Arc::new(handler))
            .is_some()
        {
            warn!(function = %name, "Replaced existing function");
        }
    }

    #[must_use]
    pub fn has_controller(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Resolve a callback. `None` when the controller, action or function is
    /// unknown, or the text is malformed.
    ///
    /// For `Controller->method` the action is checked before a controller
    /// instance is built, so a failed resolution constructs nothing.
    #[must_use]
    pub fn make_callable(&self, callback: &Callback) -> Option<Callable> {
        let resolved = match callback {
            Callback::Direct(handler) => Some(Callable::shared(
                callback.to_string(),
                Arc::clone(handler),
            )),
            Callback::ControllerMethod { controller, method } => self
                .controllers
                .get(controller)
                .and_then(|factory| factory(method)),
            Callback::Function(name) => self
                .functions
                .get(name)
                .map(|handler| Callable::shared(name.clone(), Arc::clone(handler))),
            Callback::Invalid(_) => None,
        };

        if resolved.is_none() {
            debug!(callback = %callback, "Callback did not resolve");
        }
        resolved
    }

    /// Whether `callback` would resolve. Builds (and drops) a controller
    /// instance on success.
    #[must_use]
    pub fn is_callable(&self, callback: &Callback) -> bool {
        self.make_callable(callback).is_some()
    }
}

impl fmt::Debug for CallableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut controllers: Vec<&String> = self.controllers.keys().collect();
        controllers.sort();
        let mut functions: Vec<&String> = self.functions.keys().collect();
        functions.sort();
        f.debug_struct("CallableRegistry")
            .field("controllers", &controllers)
            .field("functions", &functions)
            .finish()
    }
}
