//! Core data structures shared by the tokenrex compiler and engine.
//!
//! A `Token` is an opaque `key -> value?` lookup; an input sequence is an
//! indexable, immutable slice of tokens. Everything in this crate is pure
//! data — no lexing, parsing, or matching logic lives here.

mod capture;
mod error;
mod pattern;
mod token;

pub use capture::{CaptureGroup, SlotId, SlotKind};
pub use error::{CompileError, MatchError};
pub use pattern::{
    CaseSensitivity, CompareOp, Laziness, Node, NodeId, NodeKind, RepeatBounds, Repetition,
};
pub use token::Token;

/// Reserved slot id for the whole-match span. Slot 0 is always the
/// whole-match span.
pub const WHOLE_MATCH_SLOT: SlotId = SlotId::new(0);
