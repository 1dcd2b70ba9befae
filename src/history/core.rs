use std::collections::VecDeque;

use serde::Serialize;

/// Result of [`HistoryTracker::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The entry was appended at `index` and the cursor moved there
    Appended { index: usize },
    /// The entry was the target of a back/forward step and was not appended
    Revisit { index: usize },
}

/// A back/forward target waiting for its dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingRevisit {
    entry: String,
    cursor: usize,
}

/// Append-only log of visited fragments plus a cursor.
#[derive(Debug, Default)]
pub struct HistoryTracker {
    entries: Vec<String>,
    cursor: usize,
    /// Back/forward targets in the order their dispatches will arrive
    pending_revisits: VecDeque<PendingRevisit>,
}

impl HistoryTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the fragment that triggered a dispatch cycle.
    ///
    /// A fragment matching the oldest expected re-visit consumes it and puts
    /// the cursor back where that back/forward step left it. Anything else is
    /// appended and later expectations are kept.
    pub fn record(&mut self, entry: &str) -> RecordOutcome {
        if let Some(pending) = self.pending_revisits.front() {
            if pending.entry == entry {
                self.cursor = pending.cursor;
                self.pending_revisits.pop_front();
                return RecordOutcome::Revisit { index: self.cursor };
            }
        }
        self.entries.push(entry.to_owned());
        self.cursor = self.entries.len() - 1;
        RecordOutcome::Appended { index: self.cursor }
    }

    /// Move the cursor one entry back and return the fragment to navigate to.
    ///
    /// Returns `None` when the cursor is already at the first entry.
    pub fn step_back(&mut self) -> Option<String> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).cloned()
    }

    /// Move the cursor one entry forward and return the fragment to navigate to.
    ///
    /// Returns `None` when the cursor is already at the last entry.
    pub fn step_forward(&mut self) -> Option<String> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).cloned()
    }

    /// Expect a dispatch of `entry` from the back/forward step that just
    /// moved the cursor.
    pub fn expect_revisit(&mut self, entry: &str) {
        self.pending_revisits.push_back(PendingRevisit {
            entry: entry.to_owned(),
            cursor: self.cursor,
        });
    }

    /// Drop expected re-visits whose dispatch never arrived.
    ///
    /// Returns how many were dropped.
    pub fn clear_pending_revisits(&mut self) -> usize {
        let dropped = self.pending_revisits.len();
        self.pending_revisits.clear();
        dropped
    }

    #[must_use]
    pub fn pending_revisits(&self) -> usize {
        self.pending_revisits.len()
    }

    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry under the cursor, if anything has been recorded
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Owned copy of the log and cursor.
    #[must_use]
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            entries: self.entries.clone(),
            cursor: self.cursor,
        }
    }
}

/// Read-only copy of the history taken when a request context is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistorySnapshot {
    entries: Vec<String>,
    cursor: usize,
}

impl HistorySnapshot {
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with(entries: &[&str]) -> HistoryTracker {
        let mut tracker = HistoryTracker::new();
        for entry in entries {
            tracker.record(entry);
        }
        tracker
    }

    #[test]
    fn test_cursor_follows_records() {
        let tracker = tracker_with(&["", "pages/1", "about"]);
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.cursor(), 2);
        assert_eq!(tracker.current(), Some("about"));
    }

    #[test]
    fn test_back_at_start_is_noop() {
        let mut tracker = tracker_with(&["home"]);
        assert_eq!(tracker.step_back(), None);
        assert_eq!(tracker.cursor(), 0);

        let mut empty = HistoryTracker::new();
        assert_eq!(empty.step_back(), None);
        assert_eq!(empty.step_forward(), None);
        assert_eq!(empty.cursor(), 0);
    }

    #[test]
    fn test_forward_at_end_is_noop() {
        let mut tracker = tracker_with(&["a", "b"]);
        assert_eq!(tracker.step_forward(), None);
        assert_eq!(tracker.cursor(), 1);
    }

    #[test]
    fn test_back_then_forward_restores_cursor() {
        let mut tracker = tracker_with(&["a", "b", "c"]);
        assert_eq!(tracker.step_back().as_deref(), Some("b"));
        assert_eq!(tracker.cursor(), 1);
        assert_eq!(tracker.step_forward().as_deref(), Some("c"));
        assert_eq!(tracker.cursor(), 2);
    }

    #[test]
    fn test_revisit_is_not_appended() {
        let mut tracker = tracker_with(&["a", "b"]);
        let target = tracker.step_back().unwrap();
        tracker.expect_revisit(&target);
        assert_eq!(tracker.record(&target), RecordOutcome::Revisit { index: 0 });
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.cursor(), 0);
    }

    #[test]
    fn test_consecutive_revisits_are_matched_in_order() {
        let mut tracker = tracker_with(&["", "a", "cancel"]);
        let first = tracker.step_back().unwrap();
        tracker.expect_revisit(&first);
        let second = tracker.step_back().unwrap();
        tracker.expect_revisit(&second);

        assert_eq!(tracker.record("a"), RecordOutcome::Revisit { index: 1 });
        assert_eq!(tracker.record(""), RecordOutcome::Revisit { index: 0 });
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.cursor(), 0);
        assert_eq!(tracker.pending_revisits(), 0);
    }

    #[test]
    fn test_unrelated_record_keeps_revisit_cursor() {
        let mut tracker = tracker_with(&["", "a"]);
        let target = tracker.step_back().unwrap();
        tracker.expect_revisit(&target);

        assert_eq!(tracker.record("b"), RecordOutcome::Appended { index: 2 });
        assert_eq!(tracker.pending_revisits(), 1);
        assert_eq!(tracker.record(""), RecordOutcome::Revisit { index: 0 });
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.cursor(), 0);
    }

    #[test]
    fn test_cleared_revisit_no_longer_matches() {
        let mut tracker = tracker_with(&["a", "b"]);
        tracker.expect_revisit("a");
        assert_eq!(tracker.clear_pending_revisits(), 1);
        assert_eq!(tracker.record("a"), RecordOutcome::Appended { index: 2 });
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut tracker = tracker_with(&["a"]);
        let snapshot = tracker.snapshot();
        tracker.record("b");
        assert_eq!(snapshot.entries(), &["a".to_string()]);
        assert_eq!(snapshot.cursor(), 0);
        assert_eq!(tracker.snapshot().len(), 2);
    }
}
