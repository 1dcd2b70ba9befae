use std::sync::{Arc, Weak};
use std::time::SystemTime;

use super::core::{Dispatcher, Inner};
use crate::history::HistorySnapshot;
use crate::host::{strip_marker, NavigationMode};
use crate::ids::CycleId;
use crate::path::{extract_segments, SegmentVec};

/// Options for [`RequestContext::go_with`] and [`Dispatcher::go`].
///
/// Replaces the positional `go(location, params, hide)` overload: `params` are
/// appended to the location, `hide` keeps the navigation out of the host's
/// native history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    pub params: Vec<String>,
    pub hide: bool,
}

impl NavigateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    #[must_use]
    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }

    /// Replace the current host entry instead of pushing a new one.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hide = true;
        self
    }

    #[must_use]
    pub fn mode(&self) -> NavigationMode {
        if self.hide {
            NavigationMode::Replace
        } else {
            NavigationMode::Push
        }
    }
}

/// Build the fragment `go` navigates to.
///
/// A leading `#` on `location` is dropped and `params` are appended with `/`.
/// An empty location means root, so `build_target("", ["a"])` is `"a"`.
///
/// ```rust
/// use hashrouter::dispatcher::build_target;
///
/// assert_eq!(build_target("#pages", &["45".to_string()]), "pages/45");
/// assert_eq!(build_target("pages/", &["45".to_string()]), "pages/45");
/// assert_eq!(build_target("", &[]), "");
/// ```
#[must_use]
pub fn build_target(location: &str, params: &[String]) -> String {
    let location = strip_marker(location);
    if params.is_empty() {
        return location.to_owned();
    }
    let mut target = location.trim_end_matches('/').to_owned();
    for param in params {
        if !target.is_empty() {
            target.push('/');
        }
        target.push_str(param);
    }
    target
}

/// Per-cycle value handed to middleware, handlers and the not-found handler.
///
/// Built fresh for every dispatch cycle. `route` and `parameters` are filled in
/// once the path resolves; everything else is fixed at construction. The
/// history is an owned snapshot, so navigation performed by a handler does not
/// change what this context reports.
#[derive(Clone)]
pub struct RequestContext {
    id: CycleId,
    time: SystemTime,
    fragment: String,
    path: SegmentVec,
    route: Option<String>,
    parameters: Vec<String>,
    history: HistorySnapshot,
    navigator: Weak<Inner>,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("id", &self.id)
            .field("time", &self.time)
            .field("fragment", &self.fragment)
            .field("path", &self.path)
            .field("route", &self.route)
            .field("parameters", &self.parameters)
            .field("history", &self.history)
            .finish()
    }
}

impl RequestContext {
    pub(crate) fn new(
        fragment: String,
        path: SegmentVec,
        history: HistorySnapshot,
        navigator: &Arc<Inner>,
    ) -> Self {
        Self {
            id: CycleId::new(),
            time: SystemTime::now(),
            fragment,
            path,
            route: None,
            parameters: Vec::new(),
            history,
            navigator: Arc::downgrade(navigator),
        }
    }

    /// A context not attached to any dispatcher.
    ///
    /// Navigation methods are no-ops and the history is empty. Useful for
    /// exercising middleware and handlers in isolation.
    #[must_use]
    pub fn detached(fragment: &str) -> Self {
        let fragment = strip_marker(fragment).to_owned();
        Self {
            id: CycleId::new(),
            time: SystemTime::now(),
            path: extract_segments(&fragment),
            fragment,
            route: None,
            parameters: Vec::new(),
            history: HistorySnapshot::default(),
            navigator: Weak::new(),
        }
    }

    pub(crate) fn set_route(&mut self, route: String, parameters: Vec<String>) {
        self.route = Some(route);
        self.parameters = parameters;
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> CycleId {
        self.id
    }

    /// When the cycle started
    #[inline]
    #[must_use]
    pub fn time(&self) -> SystemTime {
        self.time
    }

    /// The raw fragment that triggered the cycle
    #[inline]
    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Name of the matched route, `None` until resolution or when nothing matched
    #[inline]
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &HistorySnapshot {
        &self.history
    }

    fn dispatcher(&self) -> Option<Dispatcher> {
        self.navigator.upgrade().map(Dispatcher::from_inner)
    }

    /// Step the dispatcher's history back. See [`Dispatcher::back`].
    pub fn back(&self) -> bool {
        self.dispatcher().is_some_and(|d| d.back())
    }

    /// Step the dispatcher's history forward. See [`Dispatcher::forward`].
    pub fn forward(&self) -> bool {
        self.dispatcher().is_some_and(|d| d.forward())
    }

    /// Navigate to `location`, visible in native history.
    pub fn go(&self, location: &str) {
        self.go_with(location, &NavigateOptions::default());
    }

    /// Navigate to `location` with params and visibility options.
    pub fn go_with(&self, location: &str, options: &NavigateOptions) {
        if let Some(dispatcher) = self.dispatcher() {
            dispatcher.go(location, options);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_target_appends_params() {
        let params = vec!["45".to_string(), "foo".to_string()];
        assert_eq!(build_target("pages", &params), "pages/45/foo");
        assert_eq!(build_target("", &params), "45/foo");
        assert_eq!(build_target("#about", &[]), "about");
    }

    #[test]
    fn test_options_mode() {
        assert_eq!(NavigateOptions::new().mode(), NavigationMode::Push);
        let options = NavigateOptions::new().params(["1", "2"]).hidden();
        assert_eq!(options.mode(), NavigationMode::Replace);
        assert_eq!(options.params, vec!["1", "2"]);
    }

    #[test]
    fn test_detached_context() {
        let ctx = RequestContext::detached("#pages/45");
        assert_eq!(ctx.fragment(), "pages/45");
        assert_eq!(ctx.path(), ["pages", "45"]);
        assert_eq!(ctx.route(), None);
        assert!(ctx.parameters().is_empty());
        assert!(ctx.history().is_empty());
        assert!(!ctx.back());
        assert!(!ctx.forward());
        ctx.go("anywhere");
    }

    #[test]
    fn test_set_route() {
        let mut ctx = RequestContext::detached("pages/45");
        ctx.set_route("pages".to_string(), vec!["45".to_string()]);
        assert_eq!(ctx.route(), Some("pages"));
        assert_eq!(ctx.parameters(), ["45"]);
    }
}
