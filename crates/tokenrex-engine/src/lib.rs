//! Lazy backtracking match engine for compiled tokenrex patterns.
//!
//! `tokenrex-core` defines the pattern tree and the value types; this
//! crate interprets that tree against a caller-supplied token sequence,
//! implementing the `consume`/`commit` matching contract and the
//! `matches`/`find` driver on top of it.

mod bitset;
mod consume;
mod ctx;
mod display;
mod eval;
mod matcher;
mod multi;
mod repeat;
mod seq;

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;

pub use ctx::{CaptureTable, MatchCtx, Tokens};
pub use display::{to_string, Pretty};
pub use matcher::Matcher;
