//! Top-level `consume`/`commit` dispatch: routes each `NodeKind` to its
//! matching-contract implementation.

use tokenrex_core::{MatchError, Node, NodeKind};

use crate::ctx::{MatchCtx, Tokens};
use crate::eval::eval_and_record;
use crate::multi::{self, ConjunctionNIter, DisjunctionNIter};
use crate::repeat::{self, RepeatIter};
use crate::seq::{EndIter, SingleTokenIter};

/// `node.consume(input, start, context) -> lazy sequence of end indices`.
pub fn consume<'p>(node: &'p Node, start: usize) -> Box<dyn EndIter + 'p> {
    match &node.kind {
        NodeKind::Literal { .. }
        | NodeKind::Regex { .. }
        | NodeKind::IntCompare { .. }
        | NodeKind::NullCheck { .. }
        | NodeKind::Wildcard
        | NodeKind::AnchorStart
        | NodeKind::AnchorEnd
        | NodeKind::Conjunction1(..)
        | NodeKind::Disjunction1(..)
        | NodeKind::Negation1(..)
        | NodeKind::Empty => Box::new(SingleTokenIter::new(node, start)),
        NodeKind::SequenceRepeat(rep) => Box::new(RepeatIter::new(rep, start)),
        NodeKind::ConjunctionN(a, b) => Box::new(ConjunctionNIter::new(a, b, start)),
        NodeKind::DisjunctionN(a, b) => Box::new(DisjunctionNIter::new(a, b, start)),
    }
}

/// Re-derives whether `node` matches exactly `start..end`, recording every
/// capture slot along the way. Called once per reported match, so it
/// favours a plain recursive search over the lazy, explicit-stack
/// machinery `consume` uses for enumeration.
pub fn commit(
    node: &Node,
    ctx: &mut MatchCtx,
    input: &dyn Tokens,
    start: usize,
    end: usize,
) -> Result<bool, MatchError> {
    ctx.check_deadline()?;
    let ok = match &node.kind {
        NodeKind::Literal { .. }
        | NodeKind::Regex { .. }
        | NodeKind::IntCompare { .. }
        | NodeKind::NullCheck { .. }
        | NodeKind::Wildcard
        | NodeKind::AnchorStart
        | NodeKind::AnchorEnd
        | NodeKind::Conjunction1(..)
        | NodeKind::Disjunction1(..)
        | NodeKind::Negation1(..)
        | NodeKind::Empty => {
            // eval_and_record already registers node's own capture.
            return Ok(eval_and_record(node, ctx, input, start) == Some(end));
        }
        NodeKind::SequenceRepeat(tokenrex_core::Repetition::List(items)) => {
            repeat::commit_list(items, ctx, input, start, end)?
        }
        NodeKind::SequenceRepeat(tokenrex_core::Repetition::Repeat { body, bounds, laziness }) => {
            repeat::commit_repeat(body, *bounds, *laziness, ctx, input, start, end)?
        }
        NodeKind::ConjunctionN(a, b) => multi::commit_conjunction(a, b, ctx, input, start, end)?,
        NodeKind::DisjunctionN(a, b) => multi::commit_disjunction(a, b, ctx, input, start, end)?,
    };
    if ok {
        ctx.record_if_capturing(node, start, end);
    }
    Ok(ok)
}
