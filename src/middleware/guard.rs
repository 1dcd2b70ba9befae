use super::{Middleware, MiddlewareAbort};
use crate::dispatcher::RequestContext;

type AllowFn = Box<dyn Fn(&RequestContext) -> bool + Send + Sync>;

/// Aborts cycles whose first segment is protected unless `allow` approves.
///
/// ```rust
/// use hashrouter::middleware::GuardMiddleware;
///
/// let guard = GuardMiddleware::new(["admin", "billing"], |_ctx| false);
/// assert!(guard.protects("admin"));
/// assert!(!guard.protects("pages"));
/// ```
pub struct GuardMiddleware {
    protected: Vec<String>,
    allow: AllowFn,
}

impl GuardMiddleware {
    pub fn new<I, S, F>(protected: I, allow: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&RequestContext) -> bool + Send + Sync + 'static,
    {
        Self {
            protected: protected.into_iter().map(Into::into).collect(),
            allow: Box::new(allow),
        }
    }

    #[must_use]
    pub fn protects(&self, segment: &str) -> bool {
        self.protected.iter().any(|p| p == segment)
    }
}

impl Middleware for GuardMiddleware {
    fn before(&self, ctx: &RequestContext) -> Result<(), MiddlewareAbort> {
        match ctx.path().first() {
            Some(segment) if self.protects(segment) && !(self.allow)(ctx) => Err(
                MiddlewareAbort::new(format!("access to '{}' denied", ctx.fragment())),
            ),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "guard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_protected_prefix() {
        let guard = GuardMiddleware::new(["admin"], |_| false);
        let err = guard.before(&RequestContext::detached("admin/users")).unwrap_err();
        assert_eq!(err.reason(), "access to 'admin/users' denied");
        assert!(guard.before(&RequestContext::detached("pages/1")).is_ok());
        assert!(guard.before(&RequestContext::detached("")).is_ok());
    }

    #[test]
    fn test_allow_lets_through() {
        let guard = GuardMiddleware::new(vec!["admin".to_string()], |_| true);
        assert!(guard.before(&RequestContext::detached("admin")).is_ok());
    }
}
