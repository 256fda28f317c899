//! The "lazy sequence of end indices" abstraction. Unlike
//! `std::iter::Iterator`, `next` takes the match
//! context and input explicitly rather than capturing them, so an
//! `EndIter` only ever borrows from the immutable pattern tree and can be
//! stacked for backtracking without fighting the borrow checker.

use tokenrex_core::{MatchError, Node};

use crate::ctx::{MatchCtx, Tokens};
use crate::eval::eval_and_record;

pub trait EndIter {
    fn next(&mut self, ctx: &mut MatchCtx, input: &dyn Tokens) -> Result<Option<usize>, MatchError>;
}

/// Single-token predicates, anchors, the empty node, and single-token
/// boolean combinators all have at most one end index per start index.
pub struct SingleTokenIter<'p> {
    node: &'p Node,
    start: usize,
    done: bool,
}

impl<'p> SingleTokenIter<'p> {
    pub fn new(node: &'p Node, start: usize) -> Self {
        Self { node, start, done: false }
    }
}

impl EndIter for SingleTokenIter<'_> {
    fn next(&mut self, ctx: &mut MatchCtx, input: &dyn Tokens) -> Result<Option<usize>, MatchError> {
        if self.done {
            return Ok(None);
        }
        self.done = true;
        Ok(eval_and_record(self.node, ctx, input, self.start))
    }
}
