//! Named handler and middleware registry.
//!
//! Route tables loaded from files refer to handlers by name. The registry maps
//! those names to callables, and also backs the name-based registration calls
//! on the dispatcher ([`Dispatcher::set_not_found_named`],
//! [`Dispatcher::add_middleware_named`]).
//!
//! [`Dispatcher::set_not_found_named`]: crate::dispatcher::Dispatcher::set_not_found_named
//! [`Dispatcher::add_middleware_named`]: crate::dispatcher::Dispatcher::add_middleware_named

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::dispatcher::RequestContext;
use crate::middleware::{from_fn, Middleware, MiddlewareAbort};
use crate::router::Handler;

#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
    middleware: HashMap<String, Arc<dyn Middleware>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handler_names())
            .field("middleware", &self.middleware_names())
            .finish()
    }
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`, replacing any previous one.
    pub fn register_handler<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&RequestContext, &[String]) + Send + Sync + 'static,
    {
        debug!(handler = name, "Handler registered");
        self.handlers.insert(name.to_owned(), Arc::new(handler));
        self
    }

    pub fn register_middleware(&mut self, name: &str, mw: Arc<dyn Middleware>) -> &mut Self {
        debug!(middleware = name, "Middleware registered by name");
        self.middleware.insert(name.to_owned(), mw);
        self
    }

    /// Register a closure middleware under `name`.
    pub fn register_middleware_fn<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&RequestContext) -> Result<(), MiddlewareAbort> + Send + Sync + 'static,
    {
        self.register_middleware(name, Arc::new(from_fn(name, f)))
    }

    #[must_use]
    pub fn handler(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).map(Arc::clone)
    }

    #[must_use]
    pub fn middleware(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        self.middleware.get(name).map(Arc::clone)
    }

    /// Registered handler names, sorted
    #[must_use]
    pub fn handler_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn middleware_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.middleware.keys().cloned().collect();
        names.sort();
        names
    }
}
