use std::fmt;

use serde::{Serialize, Serializer};
use ulid::Ulid;

/// ULID assigned to each dispatch cycle.
///
/// Carried by every [`RequestContext`](crate::dispatcher::RequestContext) and
/// recorded on the `dispatch` span, so log lines from one cycle can be grouped.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct CycleId(Ulid);

impl CycleId {
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for CycleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
