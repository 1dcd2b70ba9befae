use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::dispatcher::RequestContext;
use crate::path::{extract_segments, is_root};

/// Reserved key for the index handler of a table level.
pub const ROOT_KEY: &str = "_";

/// Reserved key for the not-found handler of the top-level table.
pub const NOT_FOUND_KEY: &str = "404";

/// A route handler.
///
/// Receives the request context and the leftover path segments as positional
/// arguments. The not-found handler uses the same signature and receives the
/// failing fragment as its single argument.
pub type Handler = Arc<dyn Fn(&RequestContext, &[String]) + Send + Sync>;

/// A table entry: a leaf handler or a nested table.
#[derive(Clone)]
pub enum RouteNode {
    Handler(Handler),
    Table(RouteTable),
}

impl fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteNode::Handler(_) => f.write_str("Handler"),
            RouteNode::Table(table) => f.debug_tuple("Table").field(table).finish(),
        }
    }
}

/// Nested mapping from segment names to handlers or sub-tables.
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, RouteNode>,
    not_found: Option<Handler>,
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes)
            .field("not_found", &self.not_found.is_some())
            .finish()
    }
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the index handler (`_`) of this level.
    #[must_use]
    pub fn index<F>(self, handler: F) -> Self
    where
        F: Fn(&RequestContext, &[String]) + Send + Sync + 'static,
    {
        self.route(ROOT_KEY, handler)
    }

    /// Add a leaf route.
    #[must_use]
    pub fn route<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&RequestContext, &[String]) + Send + Sync + 'static,
    {
        self.insert(name, RouteNode::Handler(Arc::new(handler)));
        self
    }

    /// Add a nested table under `name`.
    #[must_use]
    pub fn nest(mut self, name: &str, table: RouteTable) -> Self {
        self.insert(name, RouteNode::Table(table));
        self
    }

    /// Set the not-found handler (`404`).
    #[must_use]
    pub fn not_found<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RequestContext, &[String]) + Send + Sync + 'static,
    {
        self.not_found = Some(Arc::new(handler));
        self
    }

    /// Insert a node, returning the node it replaced.
    ///
    /// A handler inserted under [`NOT_FOUND_KEY`] becomes the not-found handler
    /// instead of a route. A table under that key is dropped.
    pub fn insert(&mut self, name: &str, node: RouteNode) -> Option<RouteNode> {
        if name == NOT_FOUND_KEY {
            return match node {
                RouteNode::Handler(handler) => {
                    self.not_found.replace(handler).map(RouteNode::Handler)
                }
                RouteNode::Table(_) => {
                    warn!(key = NOT_FOUND_KEY, "Ignoring nested table under not-found key");
                    None
                }
            };
        }
        self.routes.insert(name.to_owned(), node)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RouteNode> {
        self.routes.get(name)
    }

    /// The not-found handler stored on this level, if any
    #[must_use]
    pub fn not_found_handler(&self) -> Option<&Handler> {
        self.not_found.as_ref()
    }

    /// Remove and return the not-found handler of this level.
    pub fn take_not_found(&mut self) -> Option<Handler> {
        self.not_found.take()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteNode)> {
        self.routes.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Every fragment that reaches a handler, in key order.
    ///
    /// Index handlers are listed under their table's own fragment, so
    /// `{_: f, clients: {_: g, list: h}}` yields `["", "clients", "clients/list"]`.
    #[must_use]
    pub fn fragments(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_fragments("", &mut out);
        out
    }

    fn collect_fragments(&self, prefix: &str, out: &mut Vec<String>) {
        if let Some(RouteNode::Handler(_)) = self.routes.get(ROOT_KEY) {
            out.push(prefix.to_owned());
        }
        for (name, node) in &self.routes {
            if name == ROOT_KEY {
                continue;
            }
            let fragment = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            match node {
                RouteNode::Handler(_) => out.push(fragment),
                RouteNode::Table(table) => table.collect_fragments(&fragment, out),
            }
        }
    }
}

/// Outcome of resolving a segment sequence against a table.
#[derive(Clone)]
pub enum Resolution {
    /// A leaf handler matched
    Matched {
        handler: Handler,
        /// The segment name that selected the handler
        route: String,
        /// Leftover segments, passed as positional arguments
        args: Vec<String>,
    },
    /// A table's index handler matched
    Root {
        handler: Handler,
        /// Name of the table entry whose index was reached, or `_` at the top level
        route: String,
    },
    /// Nothing matched
    NotFound,
}

impl Resolution {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }

    /// Matched route name, if any
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        match self {
            Resolution::Matched { route, .. } | Resolution::Root { route, .. } => {
                Some(route.as_str())
            }
            Resolution::NotFound => None,
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Matched { route, args, .. } => f
                .debug_struct("Matched")
                .field("route", route)
                .field("args", args)
                .finish(),
            Resolution::Root { route, .. } => {
                f.debug_struct("Root").field("route", route).finish()
            }
            Resolution::NotFound => f.write_str("NotFound"),
        }
    }
}

/// Resolve `segments` against `table`.
///
/// An absent table resolves to [`Resolution::NotFound`]. An empty sequence or
/// one whose first segment is empty selects the level's index handler.
#[must_use]
pub fn resolve(segments: &[String], table: Option<&RouteTable>) -> Resolution {
    resolve_level(segments, table, ROOT_KEY)
}

fn resolve_level(segments: &[String], table: Option<&RouteTable>, parent: &str) -> Resolution {
    let Some(table) = table else {
        return Resolution::NotFound;
    };

    if is_root(segments) {
        return match table.get(ROOT_KEY) {
            Some(RouteNode::Handler(handler)) => Resolution::Root {
                handler: Arc::clone(handler),
                route: parent.to_owned(),
            },
            _ => Resolution::NotFound,
        };
    }

    let Some((name, rest)) = segments.split_first() else {
        return Resolution::NotFound;
    };

    match table.get(name) {
        None => Resolution::NotFound,
        Some(RouteNode::Handler(handler)) => Resolution::Matched {
            handler: Arc::clone(handler),
            route: name.clone(),
            args: rest.to_vec(),
        },
        Some(RouteNode::Table(nested)) => resolve_level(rest, Some(nested), name),
    }
}

/// Owns a route table and resolves fragments against it.
#[derive(Clone, Debug, Default)]
pub struct Router {
    table: RouteTable,
}

impl Router {
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        debug!(
            routes_count = table.fragments().len(),
            has_not_found = table.not_found_handler().is_some(),
            "Route table loaded"
        );
        Self { table }
    }

    /// Resolve a raw fragment.
    #[must_use]
    pub fn route(&self, fragment: &str) -> Resolution {
        let segments = extract_segments(fragment);
        self.resolve(&segments)
    }

    /// Resolve already-extracted segments.
    #[must_use]
    pub fn resolve(&self, segments: &[String]) -> Resolution {
        resolve(segments, Some(&self.table))
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }
}
