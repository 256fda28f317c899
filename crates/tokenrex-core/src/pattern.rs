//! The compiled pattern tree: the shared vocabulary between the compiler
//! (which builds it) and the engine (which interprets it). Kept here,
//! rather than split across both crates, so the IR types live in one place
//! both the compiler and the engine depend on.

use std::sync::Arc;

use crate::capture::SlotKind;

/// Stable identity for a node, assigned once when the node is built and
/// never reused. Two nodes never share an id, even when one is a clone of
/// the other produced by inlining a variable at two different call sites:
/// a subpattern reused via a variable receives a fresh slot in every outer
/// pattern it appears in.
///
/// This is *not* the slot id a capture is reported under — that numbering
/// is recomputed per [`crate::CaptureTable`] (see `tokenrex-engine`) by a
/// depth-first walk at matcher-construction time, so that `Pattern` stays
/// immutable and freely shareable across matchers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Case sensitivity for literal-string comparisons and the global regex
/// flag. Regex case-sensitivity is independent and must be requested via
/// `(?i)` unless the caller also forces the global flag.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

/// Comparison operator for integer-valued predicates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn apply(self, lhs: i32, rhs: i32) -> bool {
        match self {
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
        }
    }
}

/// Inclusive-inclusive repeat bounds, `0 <= min <= max`. `max` may be
/// [`u32::MAX`], standing in for "unbounded": interpret as the largest
/// representable non-negative integer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RepeatBounds {
    pub min: u32,
    pub max: u32,
}

impl RepeatBounds {
    pub const UNBOUNDED: u32 = u32::MAX;

    pub fn new(min: u32, max: u32) -> Self {
        debug_assert!(min <= max, "RepeatBounds invariant: min <= max");
        Self { min, max }
    }

    pub fn exact(n: u32) -> Self {
        Self::new(n, n)
    }

    pub fn at_least(n: u32) -> Self {
        Self::new(n, Self::UNBOUNDED)
    }
}

/// Greedy (eager, longest-first) or reluctant (shortest-first) repeat
/// preference.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Laziness {
    Greedy,
    Reluctant,
}

/// One of the two shapes a [`NodeKind::SequenceRepeat`] node can take: a
/// list of sub-patterns, or a single sub-pattern plus bounds.
#[derive(Clone, Debug)]
pub enum Repetition {
    /// A fixed ordered list, each matched exactly once.
    List(Vec<Node>),
    /// One sub-pattern matched `bounds.min..=bounds.max` times.
    Repeat {
        body: Box<Node>,
        bounds: RepeatBounds,
        laziness: Laziness,
    },
}

/// A single-token predicate, zero-width anchor, single-token boolean
/// combinator, multi-token combinator, or the empty pattern.
#[derive(Clone, Debug)]
pub enum NodeKind {
    // --- single-token predicates (consume exactly 1 token) ---
    Literal {
        key: String,
        value: String,
        case: CaseSensitivity,
    },
    Regex {
        key: String,
        regex: Arc<regex::Regex>,
    },
    IntCompare {
        key: String,
        op: CompareOp,
        rhs: i32,
    },
    NullCheck {
        key: String,
    },
    Wildcard,

    // --- zero-width anchors (consume 0 tokens) ---
    AnchorStart,
    AnchorEnd,

    // --- single-token boolean combinators (operand lengths agree) ---
    Conjunction1(Box<Node>, Box<Node>),
    Disjunction1(Box<Node>, Box<Node>),
    Negation1(Box<Node>),

    // --- multi-token combinators (variable consumption) ---
    SequenceRepeat(Repetition),
    ConjunctionN(Box<Node>, Box<Node>),
    DisjunctionN(Box<Node>, Box<Node>),

    // --- matches nothing, consumes 0 tokens (only for the empty pattern
    // source `""`) ---
    Empty,
}

/// An immutable node in the compiled pattern tree.
///
/// `capture` records whether this node owns a capture slot and, if named,
/// its name; the numeric slot id is assigned per-matcher, not here (see
/// the [`NodeId`] doc comment).
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub capture: Option<SlotKind>,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            capture: None,
            kind,
        }
    }

    pub fn with_capture(mut self, capture: SlotKind) -> Self {
        self.capture = Some(capture);
        self
    }

    /// The fixed number of tokens this node consumes when it is a
    /// single-token node (predicate, anchor, or single-token combinator);
    /// `None` for multi-token/variable-length nodes.
    pub fn fixed_len(&self) -> Option<u32> {
        match &self.kind {
            NodeKind::Literal { .. }
            | NodeKind::Regex { .. }
            | NodeKind::IntCompare { .. }
            | NodeKind::NullCheck { .. }
            | NodeKind::Wildcard => Some(1),
            NodeKind::AnchorStart | NodeKind::AnchorEnd => Some(0),
            NodeKind::Conjunction1(..) | NodeKind::Disjunction1(..) | NodeKind::Negation1(..) => {
                Some(if self.is_zero_width_combinator() { 0 } else { 1 })
            }
            NodeKind::Empty => Some(0),
            NodeKind::SequenceRepeat(..)
            | NodeKind::ConjunctionN(..)
            | NodeKind::DisjunctionN(..) => None,
        }
    }

    fn is_zero_width_combinator(&self) -> bool {
        // Single-token combinators only ever wrap operands that already
        // agree on length; inspect the first operand to recover it.
        match &self.kind {
            NodeKind::Conjunction1(a, _) | NodeKind::Disjunction1(a, _) => {
                a.fixed_len() == Some(0)
            }
            NodeKind::Negation1(a) => a.fixed_len() == Some(0),
            _ => false,
        }
    }
}
