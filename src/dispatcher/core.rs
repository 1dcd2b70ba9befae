use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use arc_swap::ArcSwapOption;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, info_span, warn};

use super::context::{build_target, NavigateOptions, RequestContext};
use crate::error::RouterError;
use crate::history::{HistorySnapshot, HistoryTracker, RecordOutcome};
use crate::host::{strip_marker, Location};
use crate::middleware::{from_fn, ChainAbort, Middleware, MiddlewareAbort, MiddlewareChain};
use crate::path::{extract_segments, SegmentVec};
use crate::registry::HandlerRegistry;
use crate::router::{resolve, Handler, Resolution, RouteTable, Router, NOT_FOUND_KEY};
use crate::runtime_config::RuntimeConfig;

/// Receives middleware aborts and handler panics.
pub type ErrorHandler = Arc<dyn Fn(&RequestContext, &DispatchError) + Send + Sync>;

/// A failure inside a dispatch cycle, delivered to the error handler.
#[derive(Debug, Clone)]
pub enum DispatchError {
    /// A middleware returned an abort from `before`
    MiddlewareAbort {
        /// Position of the aborting middleware in the chain
        index: usize,
        middleware: String,
        reason: MiddlewareAbort,
    },
    /// A handler (or the not-found handler) panicked
    HandlerPanicked {
        /// Route being handled, `404` for the not-found handler
        route: String,
        message: String,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::MiddlewareAbort {
                index,
                middleware,
                reason,
            } => write!(f, "middleware '{}' (#{}) aborted: {}", middleware, index, reason),
            DispatchError::HandlerPanicked { route, message } => {
                write!(f, "handler for '{}' panicked: {}", route, message)
            }
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<ChainAbort> for DispatchError {
    fn from(abort: ChainAbort) -> Self {
        DispatchError::MiddlewareAbort {
            index: abort.index,
            middleware: abort.middleware,
            reason: abort.abort,
        }
    }
}

/// How a dispatch cycle ended, as seen by [`Middleware::after`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A route or index handler ran
    Handled { route: String },
    /// No route matched; the not-found handler (if any) ran
    NotFound,
    /// A middleware aborted the cycle
    Aborted { middleware: String },
    /// The handler panicked
    Panicked { route: String },
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Handled { .. } => f.write_str("handled"),
            CycleOutcome::NotFound => f.write_str("not_found"),
            CycleOutcome::Aborted { .. } => f.write_str("aborted"),
            CycleOutcome::Panicked { .. } => f.write_str("panicked"),
        }
    }
}

#[derive(Default)]
struct DispatchQueue {
    pending: VecDeque<String>,
    draining: bool,
}

pub(crate) struct Inner {
    config: RuntimeConfig,
    host: Arc<dyn Location>,
    router: ArcSwapOption<Router>,
    history: Mutex<HistoryTracker>,
    middleware: RwLock<MiddlewareChain>,
    not_found: ArcSwapOption<Handler>,
    error_handler: ArcSwapOption<ErrorHandler>,
    routing: AtomicBool,
    queue: Mutex<DispatchQueue>,
}

/// The router instance.
///
/// Cheap to clone; clones share state. Handlers reach it through their
/// [`RequestContext`].
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routing", &self.is_routing())
            .field("middleware", &self.middleware_count())
            .field("history", &self.history())
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher over `host`, configured from the environment.
    #[must_use]
    pub fn new(host: Arc<dyn Location>) -> Self {
        Self::with_config(host, RuntimeConfig::from_env())
    }

    #[must_use]
    pub fn with_config(host: Arc<dyn Location>, config: RuntimeConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                host,
                router: ArcSwapOption::empty(),
                history: Mutex::new(HistoryTracker::new()),
                middleware: RwLock::new(MiddlewareChain::new()),
                not_found: ArcSwapOption::empty(),
                error_handler: ArcSwapOption::empty(),
                routing: AtomicBool::new(false),
                queue: Mutex::new(DispatchQueue::default()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Begin routing with `table`.
    ///
    /// Takes the table's not-found handler (if any), subscribes to the host's
    /// fragment changes and dispatches the current fragment once. Calling it
    /// again after the first call is a no-op.
    ///
    /// The returned error is the result of that first dispatch, e.g.
    /// [`RouterError::DispatchOverflow`] for a redirect loop. By then the
    /// listener is installed, so the dispatcher stays routing and later
    /// fragment changes are still dispatched.
    pub fn start(&self, mut table: RouteTable) -> Result<(), RouterError> {
        if self.inner.routing.swap(true, Ordering::AcqRel) {
            debug!("Dispatcher already routing, start ignored");
            return Ok(());
        }

        if let Some(handler) = table.take_not_found() {
            self.set_not_found(handler);
        }
        self.inner.router.store(Some(Arc::new(Router::new(table))));

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner.host.subscribe(Arc::new(move |fragment: &str| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Err(e) = Dispatcher::from_inner(inner).dispatch(Some(fragment)) {
                error!(error = %e, fragment, "Dispatch triggered by fragment change failed");
            }
        }));

        info!(
            fragment = %self.inner.host.fragment(),
            max_cycles_per_drain = self.inner.config.max_cycles_per_drain,
            "Routing started"
        );
        self.dispatch(None)
    }

    #[must_use]
    pub fn is_routing(&self) -> bool {
        self.inner.routing.load(Ordering::Acquire)
    }

    /// Replace the not-found handler.
    pub fn set_not_found_handler<F>(&self, handler: F)
    where
        F: Fn(&RequestContext, &[String]) + Send + Sync + 'static,
    {
        self.set_not_found(Arc::new(handler));
    }

    pub fn set_not_found(&self, handler: Handler) {
        self.inner.not_found.store(Some(Arc::new(handler)));
    }

    /// Replace the not-found handler with the one registered under `name`.
    ///
    /// Fails with [`RouterError::NotCallable`] when `name` is unknown; the
    /// previous handler stays in place.
    pub fn set_not_found_named(
        &self,
        registry: &HandlerRegistry,
        name: &str,
    ) -> Result<(), RouterError> {
        let handler = registry.handler(name).ok_or_else(|| RouterError::NotCallable {
            name: name.to_owned(),
        })?;
        self.set_not_found(handler);
        Ok(())
    }

    #[must_use]
    pub fn has_not_found_handler(&self) -> bool {
        self.inner.not_found.load().is_some()
    }

    /// Set the handler that receives middleware aborts and handler panics.
    pub fn set_error_handler<F>(&self, handler: F)
    where
        F: Fn(&RequestContext, &DispatchError) + Send + Sync + 'static,
    {
        let handler: ErrorHandler = Arc::new(handler);
        self.inner.error_handler.store(Some(Arc::new(handler)));
    }

    /// Append a middleware to the chain.
    pub fn add_middleware(&self, mw: Arc<dyn Middleware>) {
        self.inner.middleware.write().add(mw);
    }

    /// Append a closure middleware.
    pub fn add_middleware_fn<F>(&self, name: &str, f: F)
    where
        F: Fn(&RequestContext) -> Result<(), MiddlewareAbort> + Send + Sync + 'static,
    {
        self.add_middleware(Arc::new(from_fn(name, f)));
    }

    /// Append the middleware registered under `name`.
    ///
    /// Unknown names are ignored and leave the chain unchanged. Returns whether
    /// a middleware was added.
    pub fn add_middleware_named(&self, registry: &HandlerRegistry, name: &str) -> bool {
        match registry.middleware(name) {
            Some(mw) => {
                self.add_middleware(mw);
                true
            }
            None => {
                debug!(middleware = name, "Ignoring unknown middleware name");
                false
            }
        }
    }

    #[must_use]
    pub fn middleware_count(&self) -> usize {
        self.inner.middleware.read().len()
    }

    /// Snapshot of the internal history.
    #[must_use]
    pub fn history(&self) -> HistorySnapshot {
        self.inner.history.lock().snapshot()
    }

    /// Segments of the host's current fragment.
    #[must_use]
    pub fn current_path(&self) -> SegmentVec {
        extract_segments(&self.inner.host.fragment())
    }

    #[must_use]
    pub fn host(&self) -> &Arc<dyn Location> {
        &self.inner.host
    }

    /// Step back through the internal history.
    ///
    /// Moves the cursor and tells the host to show the previous entry. The
    /// dispatch that follows is a re-visit and does not grow the history.
    /// Returns false at the first entry.
    pub fn back(&self) -> bool {
        let target = {
            let mut history = self.inner.history.lock();
            let target = history.step_back();
            if let Some(target) = &target {
                self.expect_revisit(&mut history, target);
            }
            target
        };
        self.revisit(target, "back")
    }

    /// Step forward through the internal history. Returns false at the last entry.
    pub fn forward(&self) -> bool {
        let target = {
            let mut history = self.inner.history.lock();
            let target = history.step_forward();
            if let Some(target) = &target {
                self.expect_revisit(&mut history, target);
            }
            target
        };
        self.revisit(target, "forward")
    }

    fn expect_revisit(&self, history: &mut HistoryTracker, target: &str) {
        // The host stays silent when the fragment does not change, so only
        // mark a re-visit that will actually produce a dispatch.
        if self.inner.host.fragment() != target {
            history.expect_revisit(target);
        }
    }

    fn revisit(&self, target: Option<String>, direction: &'static str) -> bool {
        match target {
            Some(target) => {
                debug!(direction, target = %target, "History step");
                self.inner
                    .host
                    .navigate(&target, self.inner.config.revisit_mode);
                true
            }
            None => {
                debug!(direction, "History step at boundary ignored");
                false
            }
        }
    }

    /// Navigate the host to `location` plus `options.params`.
    ///
    /// An empty location navigates to root. Navigating to the current fragment
    /// produces no dispatch.
    pub fn go(&self, location: &str, options: &NavigateOptions) {
        let target = build_target(location, &options.params);
        debug!(target = %target, hidden = options.hide, "Navigate");
        self.inner.host.navigate(&target, options.mode());
    }

    /// Run a dispatch cycle for `fragment`, or the host's current fragment.
    ///
    /// If a cycle is already running this only queues the fragment; the
    /// running drain picks it up.
    pub fn dispatch(&self, fragment: Option<&str>) -> Result<(), RouterError> {
        let fragment = match fragment {
            Some(fragment) => strip_marker(fragment).to_owned(),
            None => self.inner.host.fragment(),
        };

        {
            let mut queue = self.inner.queue.lock();
            queue.pending.push_back(fragment);
            if queue.draining {
                debug!(pending = queue.pending.len(), "Dispatch queued behind running cycle");
                return Ok(());
            }
            queue.draining = true;
        }

        self.drain()
    }

    fn drain(&self) -> Result<(), RouterError> {
        let limit = self.inner.config.max_cycles_per_drain;
        let mut cycles = 0usize;

        loop {
            let next = {
                let mut queue = self.inner.queue.lock();
                match queue.pending.pop_front() {
                    Some(fragment) => fragment,
                    None => {
                        self.drop_stale_revisits();
                        queue.draining = false;
                        return Ok(());
                    }
                }
            };

            if cycles >= limit {
                let dropped = {
                    let mut queue = self.inner.queue.lock();
                    let dropped = queue.pending.len() + 1;
                    queue.pending.clear();
                    self.drop_stale_revisits();
                    queue.draining = false;
                    dropped
                };
                error!(limit, dropped, next = %next, "Dispatch overflow, pending triggers dropped");
                return Err(RouterError::DispatchOverflow { limit });
            }
            cycles += 1;

            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| self.run_cycle(next))) {
                let mut queue = self.inner.queue.lock();
                queue.pending.clear();
                self.drop_stale_revisits();
                queue.draining = false;
                drop(queue);
                resume_unwind(payload);
            }
        }
    }

    // Called with the queue lock held, so no trigger is in flight.
    fn drop_stale_revisits(&self) {
        let dropped = self.inner.history.lock().clear_pending_revisits();
        if dropped > 0 {
            debug!(dropped, "Dropped re-visits that produced no dispatch");
        }
    }

    fn run_cycle(&self, fragment: String) {
        let started = Instant::now();
        let path = extract_segments(&fragment);

        let snapshot = {
            let mut history = self.inner.history.lock();
            match history.record(&fragment) {
                RecordOutcome::Appended { index } => debug!(index, "History entry recorded"),
                RecordOutcome::Revisit { index } => debug!(index, "History re-visit"),
            }
            history.snapshot()
        };

        let mut ctx = RequestContext::new(fragment, path, snapshot, &self.inner);
        let span = info_span!("dispatch", cycle_id = %ctx.id(), fragment = %ctx.fragment());
        let _guard = span.enter();

        // Snapshot the chain so middleware may register middleware without deadlocking.
        let chain = self.inner.middleware.read().clone();

        let (outcome, reached) = match chain.run(&ctx) {
            Ok(()) => (self.resolve_and_invoke(&mut ctx), chain.len()),
            Err(abort) => {
                let reached = abort.index + 1;
                let outcome = CycleOutcome::Aborted {
                    middleware: abort.middleware.clone(),
                };
                self.report(&ctx, DispatchError::from(abort));
                (outcome, reached)
            }
        };

        let latency = started.elapsed();
        chain.run_after(reached, &ctx, &outcome, latency);
        debug!(
            outcome = %outcome,
            route = ctx.route().unwrap_or("-"),
            latency_us = latency.as_micros() as u64,
            "Dispatch cycle complete"
        );
    }

    fn resolve_and_invoke(&self, ctx: &mut RequestContext) -> CycleOutcome {
        let router = self.inner.router.load_full();
        let resolution = match router.as_deref() {
            Some(router) => router.resolve(ctx.path()),
            None => resolve(ctx.path(), None),
        };

        match resolution {
            Resolution::Matched {
                handler,
                route,
                args,
            } => {
                ctx.set_route(route.clone(), args.clone());
                self.invoke(&handler, ctx, &args, route)
            }
            Resolution::Root { handler, route } => {
                ctx.set_route(route.clone(), Vec::new());
                self.invoke(&handler, ctx, &[], route)
            }
            Resolution::NotFound => {
                match self.inner.not_found.load_full() {
                    Some(handler) => {
                        let args = [ctx.fragment().to_owned()];
                        let outcome = self.invoke(&handler, ctx, &args, NOT_FOUND_KEY.to_owned());
                        if matches!(outcome, CycleOutcome::Panicked { .. }) {
                            return outcome;
                        }
                    }
                    None => debug!("No route matched and no not-found handler is registered"),
                }
                CycleOutcome::NotFound
            }
        }
    }

    fn invoke(
        &self,
        handler: &Handler,
        ctx: &RequestContext,
        args: &[String],
        route: String,
    ) -> CycleOutcome {
        match catch_unwind(AssertUnwindSafe(|| handler(ctx, args))) {
            Ok(()) => CycleOutcome::Handled { route },
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(route = %route, panic_message = %message, "Handler panicked");
                self.report(
                    ctx,
                    DispatchError::HandlerPanicked {
                        route: route.clone(),
                        message,
                    },
                );
                CycleOutcome::Panicked { route }
            }
        }
    }

    fn report(&self, ctx: &RequestContext, err: DispatchError) {
        match self.inner.error_handler.load_full() {
            Some(handler) => handler(ctx, &err),
            None => warn!(error = %err, "Dispatch error with no error handler registered"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
