use std::fmt;
use std::time::Duration;

use crate::dispatcher::{CycleOutcome, RequestContext};

/// Reason a middleware stopped a dispatch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiddlewareAbort {
    reason: String,
}

impl MiddlewareAbort {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for MiddlewareAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for MiddlewareAbort {}

pub trait Middleware: Send + Sync {
    fn before(&self, _ctx: &RequestContext) -> Result<(), MiddlewareAbort> {
        Ok(())
    }

    fn after(&self, _ctx: &RequestContext, _outcome: &CycleOutcome, _latency: Duration) {}

    /// Name used in logs and abort reports
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Middleware built from a closure, see [`from_fn`].
pub struct FnMiddleware<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a [`Middleware`].
///
/// ```rust
/// use hashrouter::middleware::{from_fn, Middleware, MiddlewareAbort};
///
/// let deny_all = from_fn("deny_all", |_ctx| Err(MiddlewareAbort::new("closed")));
/// assert_eq!(deny_all.name(), "deny_all");
/// ```
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnMiddleware<F>
where
    F: Fn(&RequestContext) -> Result<(), MiddlewareAbort> + Send + Sync,
{
    FnMiddleware {
        name: name.into(),
        f,
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&RequestContext) -> Result<(), MiddlewareAbort> + Send + Sync,
{
    fn before(&self, ctx: &RequestContext) -> Result<(), MiddlewareAbort> {
        (self.f)(ctx)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
