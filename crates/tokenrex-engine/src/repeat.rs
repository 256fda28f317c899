//! Sequence + repeat, the hard part of the engine. One node shape covers
//! both a fixed ordered list of sub-patterns and one sub-pattern repeated
//! `[min, max]` times; matching is explicit-stack backtracking so pattern
//! depth is bounded by heap, not thread stack.

use tokenrex_core::{Laziness, MatchError, Node, RepeatBounds, Repetition};

use crate::consume::{commit, consume};
use crate::ctx::{MatchCtx, Tokens};
use crate::seq::EndIter;

enum Shape<'p> {
    List(&'p [Node]),
    Repeat { body: &'p Node, bounds: RepeatBounds },
}

impl<'p> Shape<'p> {
    fn min(&self) -> u32 {
        match self {
            Shape::List(items) => items.len() as u32,
            Shape::Repeat { bounds, .. } => bounds.min,
        }
    }

    fn max(&self) -> u32 {
        match self {
            Shape::List(items) => items.len() as u32,
            Shape::Repeat { bounds, .. } => bounds.max,
        }
    }

    fn component(&self, k: u32) -> Option<&'p Node> {
        match self {
            Shape::List(items) => items.get(k as usize),
            Shape::Repeat { body, bounds } => (k < bounds.max).then_some(*body),
        }
    }

    /// `true` when every repetition reuses the same sub-pattern node, so a
    /// zero-width match at index `k` would repeat forever without a guard.
    fn reused_body(&self) -> bool {
        matches!(self, Shape::Repeat { .. })
    }
}

struct ResumeFrame<'p> {
    k: u32,
    i_start: usize,
    sub: Box<dyn EndIter + 'p>,
}

enum Frame<'p> {
    Resume(ResumeFrame<'p>),
    Sentinel(usize),
}

pub struct RepeatIter<'p> {
    shape: Shape<'p>,
    start: usize,
    laziness: Laziness,
    stack: Vec<Frame<'p>>,
    effective_max: u32,
    started: bool,
    cur: Option<(usize, u32)>,
    done: bool,
}

impl<'p> RepeatIter<'p> {
    pub fn new(rep: &'p Repetition, start: usize) -> Self {
        let shape = match rep {
            Repetition::List(items) => Shape::List(items),
            Repetition::Repeat { body, bounds, .. } => Shape::Repeat { body, bounds: *bounds },
        };
        // A fixed-arity list has no user-facing laziness; there is exactly
        // one valid component count (`min == max == len`), so the greedy
        // dive-then-backtrack machinery is used unconditionally - it visits
        // every decomposition regardless of which order it would report
        // intermediate stops in, and a list never has an intermediate stop.
        let laziness = match rep {
            Repetition::List(_) => Laziness::Greedy,
            Repetition::Repeat { laziness, .. } => *laziness,
        };
        let max = shape.max();
        Self {
            shape,
            start,
            laziness,
            stack: Vec::new(),
            effective_max: max,
            started: false,
            cur: None,
            done: false,
        }
    }

    fn in_bounds(&self, k: u32) -> bool {
        k >= self.shape.min() && k <= self.shape.max()
    }

    /// Attempts component `k` starting at `i`; on success, pushes the
    /// resume frame, clamps `effective_max` if no progress was made on a
    /// reused body, and returns the new `(i, k)`.
    fn accept(
        &mut self,
        k: u32,
        i: usize,
        ctx: &mut MatchCtx,
        input: &dyn Tokens,
    ) -> Result<Option<(usize, u32)>, MatchError> {
        let Some(component) = self.shape.component(k) else {
            return Ok(None);
        };
        let mut sub = consume(component, i);
        let Some(e) = sub.next(ctx, input)? else {
            return Ok(None);
        };
        if e == i && self.shape.reused_body() {
            self.effective_max = self.effective_max.min(k + 1);
        }
        self.stack.push(Frame::Resume(ResumeFrame { k, i_start: i, sub }));
        Ok(Some((e, k + 1)))
    }

    /// Greedy: dives as deep as possible from `(i, k)`, pushing a sentinel
    /// at every intermediate in-bounds stop, and returns the deepest index
    /// reachable (the caller reports it directly; shallower stops are
    /// recovered later via backtracking).
    fn dive_greedy(
        &mut self,
        mut i: usize,
        mut k: u32,
        ctx: &mut MatchCtx,
        input: &dyn Tokens,
    ) -> Result<Option<usize>, MatchError> {
        loop {
            ctx.check_deadline()?;
            if k >= self.effective_max {
                break;
            }
            match self.accept(k, i, ctx, input)? {
                None => break,
                Some((e, k_after)) => {
                    if self.in_bounds(k_after) {
                        self.stack.push(Frame::Sentinel(e));
                    }
                    i = e;
                    k = k_after;
                }
            }
        }
        Ok(self.in_bounds(k).then_some(i))
    }

    fn next_greedy(&mut self, ctx: &mut MatchCtx, input: &dyn Tokens) -> Result<Option<usize>, MatchError> {
        if let Some((i, k)) = self.cur.take() {
            if let Some(e) = self.dive_greedy(i, k, ctx, input)? {
                return Ok(Some(e));
            }
        }
        loop {
            match self.stack.pop() {
                None => return Ok(None),
                Some(Frame::Sentinel(i)) => return Ok(Some(i)),
                Some(Frame::Resume(ResumeFrame { k, i_start, mut sub })) => {
                    let Some(e) = sub.next(ctx, input)? else {
                        continue;
                    };
                    self.stack.push(Frame::Resume(ResumeFrame { k, i_start, sub }));
                    let k_after = k + 1;
                    if self.in_bounds(k_after) {
                        self.stack.push(Frame::Sentinel(e));
                    }
                    if let Some(e2) = self.dive_greedy(e, k_after, ctx, input)? {
                        return Ok(Some(e2));
                    }
                }
            }
        }
    }

    fn next_reluctant(&mut self, ctx: &mut MatchCtx, input: &dyn Tokens) -> Result<Option<usize>, MatchError> {
        if !self.started {
            self.started = true;
            let mut i = self.start;
            let mut k = 0;
            while k < self.shape.min() {
                let Some((e, k_after)) = self.accept(k, i, ctx, input)? else {
                    return Ok(None);
                };
                i = e;
                k = k_after;
            }
            self.cur = Some((i, k));
            return Ok(Some(i));
        }
        loop {
            let (i, k) = self.cur.expect("reluctant iterator started without cur");
            if k < self.effective_max {
                if let Some((e, k_after)) = self.accept(k, i, ctx, input)? {
                    self.cur = Some((e, k_after));
                    return Ok(Some(e));
                }
            }
            // Extending failed (or we are at max): backtrack one component.
            match self.stack.pop() {
                None => return Ok(None),
                Some(Frame::Sentinel(_)) => unreachable!("reluctant search never pushes sentinels"),
                Some(Frame::Resume(ResumeFrame { k, i_start: _, mut sub })) => {
                    let Some(e) = sub.next(ctx, input)? else {
                        continue;
                    };
                    self.stack.push(Frame::Resume(ResumeFrame { k, i_start: 0, sub }));
                    self.cur = Some((e, k + 1));
                    return Ok(Some(e));
                }
            }
        }
    }
}

impl EndIter for RepeatIter<'_> {
    fn next(&mut self, ctx: &mut MatchCtx, input: &dyn Tokens) -> Result<Option<usize>, MatchError> {
        if self.done {
            return Ok(None);
        }
        let result = match self.laziness {
            Laziness::Greedy => {
                if !self.started {
                    self.started = true;
                    self.cur = Some((self.start, 0));
                }
                self.next_greedy(ctx, input)?
            }
            Laziness::Reluctant => self.next_reluctant(ctx, input)?,
        };
        if result.is_none() {
            self.done = true;
        }
        result.map_or(Ok(None), |e| Ok(Some(e)))
    }
}

/// Recovers a decomposition of `start..end` over a fixed list and commits
/// each component, trying list-item alternatives in the item's own order.
pub fn commit_list(
    items: &[Node],
    ctx: &mut MatchCtx,
    input: &dyn Tokens,
    start: usize,
    end: usize,
) -> Result<bool, MatchError> {
    commit_list_from(items, 0, ctx, input, start, end)
}

fn commit_list_from(
    items: &[Node],
    k: usize,
    ctx: &mut MatchCtx,
    input: &dyn Tokens,
    i: usize,
    target: usize,
) -> Result<bool, MatchError> {
    ctx.check_deadline()?;
    let Some(node) = items.get(k) else {
        return Ok(i == target);
    };
    let mut sub = consume(node, i);
    while let Some(e) = sub.next(ctx, input)? {
        if commit_list_from(items, k + 1, ctx, input, e, target)? {
            commit(node, ctx, input, i, e)?;
            return Ok(true);
        }
    }
    Ok(false)
}

/// Recovers a decomposition of `start..end` over a bounded repeat and
/// commits each repetition, trying "extend" and "stop here" in the order
/// the laziness prefers so the chosen decomposition matches what the
/// corresponding `RepeatIter` would report first for the same span.
pub fn commit_repeat(
    body: &Node,
    bounds: RepeatBounds,
    laziness: Laziness,
    ctx: &mut MatchCtx,
    input: &dyn Tokens,
    start: usize,
    end: usize,
) -> Result<bool, MatchError> {
    commit_repeat_from(body, bounds, laziness, 0, true, ctx, input, start, end)
}

#[allow(clippy::too_many_arguments)]
fn commit_repeat_from(
    body: &Node,
    bounds: RepeatBounds,
    laziness: Laziness,
    count: u32,
    allow_zero_width: bool,
    ctx: &mut MatchCtx,
    input: &dyn Tokens,
    i: usize,
    target: usize,
) -> Result<bool, MatchError> {
    ctx.check_deadline()?;
    let can_stop = i == target && count >= bounds.min && count <= bounds.max;
    let can_extend = count < bounds.max;

    let try_stop = |_ctx: &mut MatchCtx| -> bool { can_stop };
    let try_extend =
        |ctx: &mut MatchCtx| -> Result<bool, MatchError> {
            if !can_extend {
                return Ok(false);
            }
            let mut sub = consume(body, i);
            while let Some(e) = sub.next(ctx, input)? {
                if e == i && !allow_zero_width {
                    continue;
                }
                let next_allows_zero_width = e != i;
                // Commit this repetition's span before recursing into the
                // next one: every repetition shares `body`'s NodeId (and so
                // its capture slot), and a capturing group nested directly
                // in a quantified repeat must report the *last* iteration's
                // span. Writing forward (this repetition, then the next)
                // means the last repetition's write is the one still
                // standing once the recursion unwinds.
                commit(body, ctx, input, i, e)?;
                if commit_repeat_from(
                    body,
                    bounds,
                    laziness,
                    count + 1,
                    next_allows_zero_width,
                    ctx,
                    input,
                    e,
                    target,
                )? {
                    return Ok(true);
                }
            }
            Ok(false)
        };

    match laziness {
        Laziness::Greedy => {
            if try_extend(ctx)? {
                return Ok(true);
            }
            Ok(try_stop(ctx))
        }
        Laziness::Reluctant => {
            if try_stop(ctx) {
                return Ok(true);
            }
            try_extend(ctx)
        }
    }
}
