//! Path extraction from fragment identifiers.
//!
//! A fragment such as `pages/45/foo` is split on `/` into the ordered segment
//! sequence `["pages", "45", "foo"]`. The empty fragment yields `[""]`, which
//! is the canonical root representation. The resolver also treats a
//! zero-length sequence as root, so hand-built paths agree with extracted ones.

use smallvec::SmallVec;

/// Maximum number of segments kept inline before spilling to the heap.
/// Fragment routes rarely nest deeper than this.
pub const MAX_INLINE_SEGMENTS: usize = 8;

/// Ordered segment sequence produced by [`extract_segments`].
pub type SegmentVec = SmallVec<[String; MAX_INLINE_SEGMENTS]>;

/// Split a fragment (without its leading `#`) into path segments.
///
/// Never fails. Empty segments are preserved, so `pages//x` yields
/// `["pages", "", "x"]` and `""` yields `[""]`.
#[must_use]
pub fn extract_segments(fragment: &str) -> SegmentVec {
    fragment.split('/').map(str::to_owned).collect()
}

/// Returns true when `segments` denotes the root of a table level.
#[inline]
#[must_use]
pub fn is_root(segments: &[String]) -> bool {
    segments.first().map_or(true, String::is_empty)
}
