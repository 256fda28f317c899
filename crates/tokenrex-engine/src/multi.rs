//! Multi-token boolean combinators: conjunction and disjunction over
//! operands that may each consume a variable number of tokens, so unlike
//! the single-token combinators in `eval.rs` these work over full sets of
//! candidate end indices rather than at most one.
//!
//! The spec frames the merge as a lazy, bitset-interleaved pull; here both
//! sides are materialized up front instead. Token sequences are bounded by
//! input length, so the full enumeration is small and this stays correct
//! without the extra bookkeeping a truly lazy merge would need.

use std::collections::HashSet;

use tokenrex_core::{MatchError, Node};

use crate::bitset::IndexSet;
use crate::consume::{commit, consume};
use crate::ctx::{MatchCtx, Tokens};
use crate::seq::EndIter;

fn materialize(node: &Node, start: usize, ctx: &mut MatchCtx, input: &dyn Tokens) -> Result<Vec<usize>, MatchError> {
    let mut iter = consume(node, start);
    let mut ends = Vec::new();
    while let Some(e) = iter.next(ctx, input)? {
        ends.push(e);
    }
    Ok(ends)
}

pub struct ConjunctionNIter<'p> {
    a: &'p Node,
    b: &'p Node,
    start: usize,
    ends: Option<std::vec::IntoIter<usize>>,
}

impl<'p> ConjunctionNIter<'p> {
    pub fn new(a: &'p Node, b: &'p Node, start: usize) -> Self {
        Self { a, b, start, ends: None }
    }
}

impl EndIter for ConjunctionNIter<'_> {
    fn next(&mut self, ctx: &mut MatchCtx, input: &dyn Tokens) -> Result<Option<usize>, MatchError> {
        if self.ends.is_none() {
            let left: HashSet<usize> = materialize(self.a, self.start, ctx, input)?.into_iter().collect();
            let right = materialize(self.b, self.start, ctx, input)?;
            let mut both: Vec<usize> = right.into_iter().filter(|e| left.contains(e)).collect();
            both.sort_unstable_by(|x, y| y.cmp(x));
            both.dedup();
            self.ends = Some(both.into_iter());
        }
        Ok(self.ends.as_mut().expect("initialized above").next())
    }
}

pub struct DisjunctionNIter<'p> {
    a: &'p Node,
    b: &'p Node,
    start: usize,
    ends: Option<std::vec::IntoIter<usize>>,
}

impl<'p> DisjunctionNIter<'p> {
    pub fn new(a: &'p Node, b: &'p Node, start: usize) -> Self {
        Self { a, b, start, ends: None }
    }
}

impl EndIter for DisjunctionNIter<'_> {
    fn next(&mut self, ctx: &mut MatchCtx, input: &dyn Tokens) -> Result<Option<usize>, MatchError> {
        if self.ends.is_none() {
            let left = materialize(self.a, self.start, ctx, input)?;
            let mut seen = IndexSet::new();
            for &e in &left {
                seen.insert(e);
            }
            let right = materialize(self.b, self.start, ctx, input)?;
            let mut ends = left;
            for e in right {
                if seen.insert(e) {
                    ends.push(e);
                }
            }
            self.ends = Some(ends.into_iter());
        }
        Ok(self.ends.as_mut().expect("initialized above").next())
    }
}

pub fn commit_conjunction(
    a: &Node,
    b: &Node,
    ctx: &mut MatchCtx,
    input: &dyn Tokens,
    start: usize,
    end: usize,
) -> Result<bool, MatchError> {
    Ok(commit(a, ctx, input, start, end)? && commit(b, ctx, input, start, end)?)
}

pub fn commit_disjunction(
    a: &Node,
    b: &Node,
    ctx: &mut MatchCtx,
    input: &dyn Tokens,
    start: usize,
    end: usize,
) -> Result<bool, MatchError> {
    if commit(a, ctx, input, start, end)? {
        return Ok(true);
    }
    commit(b, ctx, input, start, end)
}
