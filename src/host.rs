//! Host location collaborator.
//!
//! The dispatcher never touches a real URL. It talks to a [`Location`], which
//! can read the current fragment, write a new one (either contributing to or
//! hidden from the host's native history) and deliver fragment-change
//! notifications.
//!
//! [`MemoryLocation`] is an in-process host with browser-like semantics:
//! writing the fragment that is already current is silent, and every real
//! change synchronously notifies all subscribers.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// How a navigation interacts with the host's native history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    /// Add a native history entry (visible)
    #[default]
    Push,
    /// Replace the current native history entry (hidden)
    Replace,
}

impl NavigationMode {
    /// Parse `push` / `replace`, case-insensitive.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "push" => Some(NavigationMode::Push),
            "replace" => Some(NavigationMode::Replace),
            _ => None,
        }
    }
}

/// Callback invoked with the new fragment after every change.
pub type FragmentListener = Arc<dyn Fn(&str) + Send + Sync>;

/// The host environment's fragment API.
pub trait Location: Send + Sync {
    /// Current fragment, without the leading `#`
    fn fragment(&self) -> String;

    /// Write a new fragment.
    fn navigate(&self, fragment: &str, mode: NavigationMode);

    /// Register a fragment-change listener.
    fn subscribe(&self, listener: FragmentListener);
}

#[derive(Debug)]
struct MemoryState {
    fragment: String,
    native: Vec<String>,
}

/// In-memory [`Location`] with a native history log.
pub struct MemoryLocation {
    state: Mutex<MemoryState>,
    listeners: RwLock<Vec<FragmentListener>>,
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl MemoryLocation {
    /// Start at `fragment` (a leading `#` is stripped).
    #[must_use]
    pub fn new(fragment: &str) -> Self {
        let fragment = strip_marker(fragment).to_owned();
        Self {
            state: Mutex::new(MemoryState {
                native: vec![fragment.clone()],
                fragment,
            }),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Simulate the user editing the address bar.
    pub fn set_fragment(&self, fragment: &str) {
        self.navigate(fragment, NavigationMode::Push);
    }

    /// Native history entries, oldest first
    #[must_use]
    pub fn native_history(&self) -> Vec<String> {
        self.state.lock().native.clone()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl Location for MemoryLocation {
    fn fragment(&self) -> String {
        self.state.lock().fragment.clone()
    }

    fn navigate(&self, fragment: &str, mode: NavigationMode) {
        let fragment = strip_marker(fragment);
        {
            let mut state = self.state.lock();
            if state.fragment == fragment {
                trace!(fragment, "Fragment unchanged, no notification");
                return;
            }
            state.fragment = fragment.to_owned();
            match mode {
                NavigationMode::Push => state.native.push(fragment.to_owned()),
                NavigationMode::Replace => {
                    state.native.pop();
                    state.native.push(fragment.to_owned());
                }
            }
        }

        // Listeners may navigate again; never hold a lock while calling out.
        let listeners: Vec<FragmentListener> = self.listeners.read().iter().cloned().collect();
        for listener in listeners {
            listener(fragment);
        }
    }

    fn subscribe(&self, listener: FragmentListener) {
        self.listeners.write().push(listener);
    }
}

pub(crate) fn strip_marker(fragment: &str) -> &str {
    fragment.strip_prefix('#').unwrap_or(fragment)
}
