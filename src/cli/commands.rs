use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use serde::Serialize;

use crate::dispatcher::{Dispatcher, RequestContext};
use crate::history::HistorySnapshot;
use crate::host::{Location, MemoryLocation};
use crate::path::extract_segments;
use crate::router::{Handler, Resolution, RouteTable};
use crate::runtime_config::RuntimeConfig;
use crate::table::{build_table_with, list_entries, load_table_value};

/// Token that steps the simulated history back.
pub const BACK_TOKEN: &str = "@back";
/// Token that steps the simulated history forward.
pub const FORWARD_TOKEN: &str = "@forward";

/// Command-line interface for hashrouter
#[derive(Parser, Debug)]
#[command(name = "hashrouter")]
#[command(about = "Inspect and exercise fragment route tables", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every authored entry and the fragments that reach a handler
    Inspect {
        /// Route table file (.json, .yaml, .yml or .toml)
        #[arg(short, long, env = "HASHR_TABLE")]
        table: PathBuf,

        /// Emit JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Resolve one fragment against a table without dispatching
    Resolve {
        #[arg(short, long, env = "HASHR_TABLE")]
        table: PathBuf,

        /// Fragment to resolve (a leading `#` is ignored)
        fragment: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Drive a dispatcher over an in-memory host
    ///
    /// Each step is a fragment to navigate to, or `@back` / `@forward`.
    Simulate {
        #[arg(short, long, env = "HASHR_TABLE")]
        table: PathBuf,

        /// Fragment the host starts at
        #[arg(long, default_value = "")]
        start: String,

        /// Navigation steps
        steps: Vec<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Run the parsed command, writing results to stdout.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &mut out)
}

/// Run `command`, writing results to `out`.
pub fn execute(command: &Commands, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        Commands::Inspect { table, json } => inspect(table, *json, out),
        Commands::Resolve {
            table,
            fragment,
            json,
        } => {
            let report = resolve_fragment(table, fragment)?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            } else {
                writeln!(out, "{}", report)?;
            }
            Ok(())
        }
        Commands::Simulate {
            table,
            start,
            steps,
            json,
        } => {
            let report = simulate(table, start, steps)?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            } else {
                report.write_text(out)?;
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct InspectReport {
    entries: Vec<crate::table::TableEntry>,
    fragments: Vec<String>,
}

fn inspect(path: &Path, json: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    let value = load_table_value(path)?;
    let entries = list_entries(&value)?;
    let table = build_table_with(&value, |_| Some(noop_handler()))?;
    let report = InspectReport {
        entries,
        fragments: table.fragments(),
    };

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    writeln!(out, "entries:")?;
    for entry in &report.entries {
        writeln!(out, "  {:<24} -> {}", entry.key_path, entry.handler)?;
    }
    writeln!(out, "reachable fragments:")?;
    for fragment in &report.fragments {
        writeln!(out, "  #{}", fragment)?;
    }
    Ok(())
}

fn noop_handler() -> Handler {
    Arc::new(|_: &RequestContext, _: &[String]| {})
}

/// Outcome of `hashrouter resolve`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ResolveReport {
    pub fragment: String,
    pub segments: Vec<String>,
    /// `matched`, `root` or `not_found`
    pub outcome: &'static str,
    pub route: Option<String>,
    pub handler: Option<String>,
    pub args: Vec<String>,
}

impl std::fmt::Display for ResolveReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} -> {}", self.fragment, self.outcome)?;
        if let (Some(route), Some(handler)) = (&self.route, &self.handler) {
            write!(f, " route={} handler={}", route, handler)?;
        }
        if !self.args.is_empty() {
            write!(f, " args={:?}", self.args)?;
        }
        Ok(())
    }
}

/// Resolve `fragment` against the table at `path`, naming the matched handler.
pub fn resolve_fragment(path: &Path, fragment: &str) -> anyhow::Result<ResolveReport> {
    let value = load_table_value(path)?;
    let named: Mutex<Vec<(Handler, String)>> = Mutex::new(Vec::new());
    let table = build_table_with(&value, |name| {
        let handler = noop_handler();
        named.lock().push((Arc::clone(&handler), name.to_owned()));
        Some(handler)
    })?;
    let named = named.into_inner();
    let name_of = |handler: &Handler| {
        named
            .iter()
            .find(|(h, _)| Arc::ptr_eq(h, handler))
            .map(|(_, name)| name.clone())
    };

    let fragment = fragment.strip_prefix('#').unwrap_or(fragment).to_owned();
    let segments = extract_segments(&fragment).into_vec();
    let report = match crate::router::resolve(&segments, Some(&table)) {
        Resolution::Matched {
            handler,
            route,
            args,
        } => ResolveReport {
            outcome: "matched",
            handler: name_of(&handler),
            route: Some(route),
            args,
            fragment,
            segments,
        },
        Resolution::Root { handler, route } => ResolveReport {
            outcome: "root",
            handler: name_of(&handler),
            route: Some(route),
            args: Vec::new(),
            fragment,
            segments,
        },
        Resolution::NotFound => ResolveReport {
            outcome: "not_found",
            handler: table.not_found_handler().and_then(name_of),
            route: None,
            args: vec![fragment.clone()],
            fragment,
            segments,
        },
    };
    Ok(report)
}

/// One handler invocation observed during `hashrouter simulate`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Visit {
    pub fragment: String,
    pub route: Option<String>,
    pub handler: String,
    pub args: Vec<String>,
}

/// Outcome of `hashrouter simulate`.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub visits: Vec<Visit>,
    pub history: HistorySnapshot,
    pub native_history: Vec<String>,
}

impl SimulationReport {
    fn write_text(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "visits:")?;
        for visit in &self.visits {
            writeln!(
                out,
                "  #{:<20} {} {}{:?}",
                visit.fragment,
                visit.route.as_deref().unwrap_or("-"),
                visit.handler,
                visit.args
            )?;
        }
        writeln!(out, "history (cursor {}):", self.history.cursor())?;
        for (i, entry) in self.history.entries().iter().enumerate() {
            let marker = if i == self.history.cursor() { ">" } else { " " };
            writeln!(out, " {} #{}", marker, entry)?;
        }
        writeln!(out, "native history: {:?}", self.native_history)
    }
}

/// Replay `steps` against a dispatcher started on the table at `path`.
///
/// Every handler records its invocation instead of doing work. Without a
/// `404` entry in the table a recording not-found handler named `<none>` is used.
pub fn simulate(path: &Path, start: &str, steps: &[String]) -> anyhow::Result<SimulationReport> {
    let value = load_table_value(path)?;
    let visits: Arc<Mutex<Vec<Visit>>> = Arc::new(Mutex::new(Vec::new()));

    let table: RouteTable = build_table_with(&value, |name| Some(recording(&visits, name)))?;

    let location = Arc::new(MemoryLocation::new(start));
    let host: Arc<dyn Location> = Arc::clone(&location) as Arc<dyn Location>;
    let dispatcher = Dispatcher::with_config(host, RuntimeConfig::from_env());
    dispatcher.set_not_found(recording(&visits, "<none>"));
    dispatcher.start(table).context("initial dispatch failed")?;

    for step in steps {
        match step.as_str() {
            BACK_TOKEN => {
                dispatcher.back();
            }
            FORWARD_TOKEN => {
                dispatcher.forward();
            }
            fragment => location.set_fragment(fragment),
        }
    }

    let visits = visits.lock().clone();
    Ok(SimulationReport {
        visits,
        history: dispatcher.history(),
        native_history: location.native_history(),
    })
}

fn recording(visits: &Arc<Mutex<Vec<Visit>>>, name: &str) -> Handler {
    let visits = Arc::clone(visits);
    let name = name.to_owned();
    Arc::new(move |ctx: &RequestContext, args: &[String]| {
        visits.lock().push(Visit {
            fragment: ctx.fragment().to_owned(),
            route: ctx.route().map(str::to_owned),
            handler: name.clone(),
            args: args.to_vec(),
        });
    })
}
