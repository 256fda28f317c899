/// Handle to a capture slot. Slot numbers are assigned fresh for every
/// [`Matcher`](../tokenrex_engine/struct.Matcher.html) built from a
/// pattern, by a depth-first pre-order walk over the pattern tree keyed
/// on node identity rather than textual order — the tree itself stays
/// immutable and shareable. Slot 0 is always the whole-match span; see
/// [`crate::WHOLE_MATCH_SLOT`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SlotId(u32);

impl SlotId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl PartialOrd for SlotId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SlotId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

/// Whether a capture slot is anonymous (`(pattern)`) or named
/// (`(?<name> pattern)` / legacy `(?$name pattern)`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotKind {
    Anonymous,
    Named(String),
}

/// A snapshot of one capture slot's span once a match has been returned.
///
/// `begin`/`end` are `-1` (represented here as `None`) when the slot never
/// matched within the reported span. Snapshots are copies taken at report
/// time, so later matcher mutation (backtracking into a new `find()` call)
/// never disturbs a group already handed to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureGroup {
    pub slot: SlotId,
    span: Option<(usize, usize)>,
}

impl CaptureGroup {
    pub fn unmatched(slot: SlotId) -> Self {
        Self { slot, span: None }
    }

    pub fn matched(slot: SlotId, begin: usize, end: usize) -> Self {
        Self {
            slot,
            span: Some((begin, end)),
        }
    }

    /// `true` if this slot has a span (`begin >= 0`).
    pub fn is_matched(&self) -> bool {
        self.span.is_some()
    }

    pub fn start(&self) -> Option<usize> {
        self.span.map(|(b, _)| b)
    }

    pub fn end(&self) -> Option<usize> {
        self.span.map(|(_, e)| e)
    }

    pub fn span(&self) -> Option<(usize, usize)> {
        self.span
    }
}
