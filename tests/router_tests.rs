mod common;

use common::{setup, Recorder};
use hashrouter::router::{resolve, Resolution, Router, ROOT_KEY};
use hashrouter::RouteTable;

fn scenario_table(rec: &Recorder) -> RouteTable {
    RouteTable::new()
        .index(rec.handler("f0"))
        .route("pages", rec.handler("f1"))
        .route("about", rec.handler("f2"))
}

#[test]
fn test_flat_scenario() {
    let rec = Recorder::new();
    let (location, dispatcher) = setup("");
    dispatcher.set_not_found_handler(rec.handler("not_found"));
    dispatcher.start(scenario_table(&rec)).unwrap();

    for fragment in ["pages/45", "pages/45/foo", "about", "missing"] {
        location.set_fragment(fragment);
    }

    let calls = rec.calls();
    let summary: Vec<(&str, Vec<String>)> = calls
        .iter()
        .map(|c| (c.handler, c.args.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("f0", vec![]),
            ("f1", vec!["45".to_string()]),
            ("f1", vec!["45".to_string(), "foo".to_string()]),
            ("f2", vec![]),
            ("not_found", vec!["missing".to_string()]),
        ]
    );
}

#[test]
fn test_nested_scenario() {
    let rec = Recorder::new();
    let (location, dispatcher) = setup("clients");
    let table = RouteTable::new().nest(
        "clients",
        RouteTable::new().index(rec.handler("g0")).route("list", rec.handler("g1")),
    );
    dispatcher.start(table).unwrap();
    location.set_fragment("clients/list");

    assert_eq!(rec.names(), vec!["g0", "g1"]);
    let calls = rec.calls();
    assert_eq!(calls[0].route.as_deref(), Some("clients"));
    assert!(calls[0].parameters.is_empty());
    assert_eq!(calls[1].route.as_deref(), Some("list"));
}

#[test]
fn test_leaf_at_depth_sets_route_and_parameters() {
    let rec = Recorder::new();
    let (location, dispatcher) = setup("");
    let table = RouteTable::new().nest(
        "a",
        RouteTable::new().nest("b", RouteTable::new().route("c", rec.handler("leaf"))),
    );
    dispatcher.set_not_found_handler(rec.handler("not_found"));
    dispatcher.start(table).unwrap();
    rec.clear();

    location.set_fragment("a/b/c/1/2/3");
    let calls = rec.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].handler, "leaf");
    assert_eq!(calls[0].route.as_deref(), Some("c"));
    assert_eq!(calls[0].parameters, vec!["1", "2", "3"]);
    assert_eq!(calls[0].args, calls[0].parameters);
}

#[test]
fn test_deepest_miss_calls_not_found_with_fragment() {
    let rec = Recorder::new();
    let (location, dispatcher) = setup("");
    let table = RouteTable::new()
        .index(rec.handler("home"))
        .nest("a", RouteTable::new().nest("b", RouteTable::new().index(rec.handler("b_index"))));
    dispatcher.set_not_found_handler(rec.handler("not_found"));
    dispatcher.start(table).unwrap();
    rec.clear();

    location.set_fragment("a/b/zzz");
    location.set_fragment("a");
    let calls = rec.calls();
    assert_eq!(rec.names(), vec!["not_found", "not_found"]);
    assert_eq!(calls[0].args, vec!["a/b/zzz"]);
    assert_eq!(calls[1].args, vec!["a"]);
    assert_eq!(calls[0].route, None);
}

#[test]
fn test_root_with_trailing_slash_and_empty_segment() {
    let rec = Recorder::new();
    let table = scenario_table(&rec);
    let router = Router::new(table);
    match router.route("") {
        Resolution::Root { route, .. } => assert_eq!(route, ROOT_KEY),
        other => panic!("expected root, got {other:?}"),
    }
    match router.route("/pages") {
        Resolution::Root { .. } => {}
        other => panic!("leading empty segment selects the index, got {other:?}"),
    }
    assert!(resolve(&[], None).is_not_found());
}

#[test]
fn test_no_other_handler_invoked() {
    let rec = Recorder::new();
    let (location, dispatcher) = setup("");
    dispatcher.set_not_found_handler(rec.handler("not_found"));
    dispatcher.start(scenario_table(&rec)).unwrap();
    rec.clear();

    location.set_fragment("about/x");
    assert_eq!(rec.names(), vec!["f2"]);
}
