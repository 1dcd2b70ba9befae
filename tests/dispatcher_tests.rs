mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{setup, setup_with, Recorder};
use hashrouter::router::NOT_FOUND_KEY;
use hashrouter::{
    DispatchError, HandlerRegistry, Location, NavigateOptions, RequestContext, RouteTable,
    RouterError, RuntimeConfig,
};
use parking_lot::Mutex;

#[test]
fn test_start_is_one_shot() {
    let rec = Recorder::new();
    let (location, dispatcher) = setup("pages/1");
    assert!(!dispatcher.is_routing());

    dispatcher
        .start(RouteTable::new().route("pages", rec.handler("first")))
        .unwrap();
    assert!(dispatcher.is_routing());
    dispatcher
        .start(RouteTable::new().route("pages", rec.handler("second")))
        .unwrap();

    location.set_fragment("pages/2");
    assert_eq!(rec.names(), vec!["first", "first"]);
    assert_eq!(location.listener_count(), 1);
}

#[test]
fn test_start_extracts_not_found_entry() {
    let rec = Recorder::new();
    let (location, dispatcher) = setup("");
    let table = RouteTable::new()
        .index(rec.handler("home"))
        .route(NOT_FOUND_KEY, rec.handler("table_404"));
    dispatcher.start(table).unwrap();
    assert!(dispatcher.has_not_found_handler());

    location.set_fragment("404");
    location.set_fragment("elsewhere");
    assert_eq!(rec.names(), vec!["home", "table_404", "table_404"]);
    assert_eq!(rec.last().unwrap().args, vec!["elsewhere"]);
}

#[test]
fn test_missing_not_found_handler_does_nothing() {
    let rec = Recorder::new();
    let (location, dispatcher) = setup("");
    dispatcher.start(RouteTable::new().route("a", rec.handler("a"))).unwrap();
    location.set_fragment("b");
    assert!(rec.calls().is_empty());
    assert_eq!(dispatcher.history().entries(), ["", "b"]);
}

#[test]
fn test_set_not_found_named() {
    let rec = Recorder::new();
    let mut registry = HandlerRegistry::new();
    registry.register_handler("registered", rec.handler("registered"));

    let (location, dispatcher) = setup("");
    dispatcher.set_not_found_handler(rec.handler("original"));

    let err = dispatcher.set_not_found_named(&registry, "nope").unwrap_err();
    assert!(matches!(err, RouterError::NotCallable { ref name } if name == "nope"));

    dispatcher.start(RouteTable::new()).unwrap();
    assert_eq!(rec.names(), vec!["original"]);

    dispatcher.set_not_found_named(&registry, "registered").unwrap();
    location.set_fragment("x");
    assert_eq!(rec.names(), vec!["original", "registered"]);
}

#[test]
fn test_handler_navigation_is_serialized() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let (location, dispatcher) = setup("");

    let log = Arc::clone(&order);
    let table = RouteTable::new()
        .route("login", move |ctx, _args| {
            log.lock().push("login:start".to_string());
            ctx.go("home");
            log.lock().push("login:end".to_string());
        })
        .route("home", {
            let log = Arc::clone(&order);
            move |ctx: &RequestContext, _args: &[String]| {
                log.lock().push(format!("home:{}", ctx.history().len()))
            }
        });
    dispatcher.start(table).unwrap();
    location.set_fragment("login");

    assert_eq!(*order.lock(), vec!["login:start", "login:end", "home:3"]);
    assert_eq!(dispatcher.history().entries(), ["", "login", "home"]);
    assert_eq!(location.native_history(), vec!["", "login", "home"]);
}

#[test]
fn test_redirect_loop_overflows() {
    let (location, dispatcher) = setup_with("", RuntimeConfig::default().with_max_cycles(5));
    let table = RouteTable::new()
        .route("ping", |ctx, _args| ctx.go("pong"))
        .route("pong", |ctx, _args| ctx.go("ping"));
    dispatcher.start(table).unwrap();

    // The listener swallows the overflow after logging it; drive dispatch directly.
    location.set_fragment("ping");
    assert_eq!(dispatcher.history().len(), 6);

    let err = dispatcher.dispatch(Some("pong")).unwrap_err();
    assert!(matches!(err, RouterError::DispatchOverflow { limit: 5 }));

    // The queue is usable again afterwards.
    dispatcher.dispatch(Some("elsewhere")).unwrap();
    assert_eq!(dispatcher.history().current(), Some("elsewhere"));
}

#[test]
fn test_handler_panic_goes_to_error_handler() {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let rec = Recorder::new();
    let (location, dispatcher) = setup("");

    let sink = Arc::clone(&errors);
    dispatcher.set_error_handler(move |ctx: &RequestContext, err: &DispatchError| {
        sink.lock().push((ctx.fragment().to_owned(), err.to_string()));
    });
    let table = RouteTable::new()
        .route("boom", |_ctx, _args| panic!("kaboom"))
        .route("fine", rec.handler("fine"));
    dispatcher.start(table).unwrap();

    location.set_fragment("boom");
    location.set_fragment("fine");

    let errors = errors.lock();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "boom");
    assert!(errors[0].1.contains("kaboom"));
    assert_eq!(rec.names(), vec!["fine"]);
}

#[test]
fn test_context_history_is_a_snapshot() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (location, dispatcher) = setup("");

    let sink = Arc::clone(&seen);
    let table = RouteTable::new()
        .index(|_ctx, _args| {})
        .route("a", move |ctx, _args| {
            let before = ctx.history().entries().to_vec();
            ctx.go("b");
            let after = ctx.history().entries().to_vec();
            sink.lock().push((before, after));
        })
        .route("b", |_ctx, _args| {});
    dispatcher.start(table).unwrap();
    location.set_fragment("a");

    let seen = seen.lock();
    assert_eq!(seen[0].0, vec!["", "a"]);
    assert_eq!(seen[0].0, seen[0].1);
    assert_eq!(dispatcher.history().entries(), ["", "a", "b"]);
}

#[test]
fn test_context_fields() {
    let checked = Arc::new(AtomicUsize::new(0));
    let (location, dispatcher) = setup("");
    let counter = Arc::clone(&checked);
    let table = RouteTable::new()
        .index(|_ctx, _args| {})
        .route("pages", move |ctx, args| {
            assert_eq!(ctx.fragment(), "pages/45/foo");
            assert_eq!(ctx.path(), ["pages", "45", "foo"]);
            assert_eq!(ctx.route(), Some("pages"));
            assert_eq!(ctx.parameters(), args);
            assert_eq!(ctx.history().current(), Some("pages/45/foo"));
            assert!(ctx.time() <= std::time::SystemTime::now());
            counter.fetch_add(1, Ordering::SeqCst);
        });
    dispatcher.start(table).unwrap();
    location.set_fragment("#pages/45/foo");
    assert_eq!(checked.load(Ordering::SeqCst), 1);
}

#[test]
fn test_go_builds_target_from_params() {
    let rec = Recorder::new();
    let (location, dispatcher) = setup("");
    dispatcher
        .start(
            RouteTable::new()
                .index(rec.handler("home"))
                .route("pages", rec.handler("pages")),
        )
        .unwrap();

    dispatcher.go("#pages", &NavigateOptions::new().param("45").param("foo"));
    assert_eq!(location.fragment(), "pages/45/foo");
    assert_eq!(rec.last().unwrap().args, vec!["45", "foo"]);

    dispatcher.go("", &NavigateOptions::new());
    assert_eq!(rec.last().unwrap().handler, "home");
}

#[test]
fn test_dispatchers_are_independent() {
    let rec = Recorder::new();
    let (first_loc, first) = setup("");
    let (_second_loc, second) = setup("");
    first.start(RouteTable::new().index(rec.handler("first"))).unwrap();
    second.add_middleware_fn("noop", |_| Ok(()));

    first_loc.set_fragment("x");
    assert_eq!(first.history().len(), 2);
    assert!(second.history().is_empty());
    assert_eq!(first.middleware_count(), 0);
    assert_eq!(second.middleware_count(), 1);
    assert!(!second.is_routing());
}
