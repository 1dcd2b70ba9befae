#![allow(dead_code)]

use std::sync::Arc;

use hashrouter::{Dispatcher, Location, MemoryLocation, RequestContext, RuntimeConfig};
use parking_lot::Mutex;

/// One observed handler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub handler: &'static str,
    pub fragment: String,
    pub route: Option<String>,
    pub parameters: Vec<String>,
    pub args: Vec<String>,
}

/// Shared log that recording handlers append to.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that records itself under `name`.
    pub fn handler(
        &self,
        name: &'static str,
    ) -> impl Fn(&RequestContext, &[String]) + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        move |ctx: &RequestContext, args: &[String]| {
            calls.lock().push(Call {
                handler: name,
                fragment: ctx.fragment().to_owned(),
                route: ctx.route().map(str::to_owned),
                parameters: ctx.parameters().to_vec(),
                args: args.to_vec(),
            });
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Handler names in invocation order
    pub fn names(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(|c| c.handler).collect()
    }

    pub fn last(&self) -> Option<Call> {
        self.calls.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// A dispatcher over a fresh in-memory host with default config.
pub fn setup(fragment: &str) -> (Arc<MemoryLocation>, Dispatcher) {
    setup_with(fragment, RuntimeConfig::default())
}

pub fn setup_with(fragment: &str, config: RuntimeConfig) -> (Arc<MemoryLocation>, Dispatcher) {
    let location = Arc::new(MemoryLocation::new(fragment));
    let host: Arc<dyn Location> = Arc::clone(&location) as Arc<dyn Location>;
    (location, Dispatcher::with_config(host, config))
}

pub mod temp_files {
    use std::io::Write;

    /// Write `content` to a temp file with the given extension.
    pub fn create_temp_table(content: &str, ext: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("hashr_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }
}
