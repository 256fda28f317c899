//! The public match driver: `matches` (whole-input) and `find` (next
//! subsequence), plus capture-group accessors.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;
use std::time::{Duration, Instant};

use tokenrex_core::{CaptureGroup, MatchError, Node, SlotId, WHOLE_MATCH_SLOT};
use tracing::{debug, debug_span, trace};

use crate::consume::{commit, consume};
use crate::ctx::{CaptureTable, MatchCtx, Tokens};
use crate::seq::EndIter;

/// Matches a compiled pattern against one borrowed input sequence.
///
/// Built fresh per input (`Matcher::new`), but the `CaptureTable` it
/// derives from the pattern is cheap to rebuild and the pattern itself is
/// freely shared across matchers.
pub struct Matcher<'p, 'i> {
    root: &'p Node,
    input: &'i dyn Tokens,
    table: Rc<CaptureTable>,
    ctx: MatchCtx,
    cursor: usize,
    active: Option<Box<dyn EndIter + 'p>>,
    returned: HashSet<(usize, usize)>,
    has_match: bool,
}

impl<'p, 'i> Matcher<'p, 'i> {
    pub fn new(root: &'p Node, input: &'i dyn Tokens) -> Self {
        let table = Rc::new(CaptureTable::build(root));
        let ctx = MatchCtx::new(table.clone());
        Self {
            root,
            input,
            table,
            ctx,
            cursor: 0,
            active: None,
            returned: HashSet::new(),
            has_match: false,
        }
    }

    /// Whole-input match: does some end-index sequence from the root at 0
    /// reach the input's length?
    pub fn matches(&mut self, time_limit: Option<Duration>) -> Result<bool, MatchError> {
        let _span = debug_span!(
            "matches",
            start_index = 0usize,
            deadline_ms = time_limit.map(|d| d.as_millis() as u64),
        )
        .entered();
        debug!(input_len = self.input.len(), "matches: whole-input match");
        self.ctx.reset();
        self.has_match = false;
        self.ctx.set_deadline(time_limit.map(|d| Instant::now() + d));
        let n = self.input.len();
        let mut iter = consume(self.root, 0);
        loop {
            self.ctx.check_deadline().inspect_err(|_| debug!("matches: deadline exceeded"))?;
            match iter.next(&mut self.ctx, self.input)? {
                None => {
                    trace!("matches: end-index sequence exhausted without reaching input length");
                    return Ok(false);
                }
                Some(end) if end == n => {
                    commit(self.root, &mut self.ctx, self.input, 0, end)?;
                    self.ctx.set_whole_match(0, end);
                    self.has_match = true;
                    return Ok(true);
                }
                Some(end) => {
                    trace!(end, "matches: candidate end index short of input length");
                    continue;
                }
            }
        }
    }

    /// Next non-duplicate subsequence match at or after the current
    /// cursor; advances the cursor across calls.
    pub fn find(&mut self, time_limit: Option<Duration>) -> Result<bool, MatchError> {
        let _span = debug_span!(
            "find",
            start_index = self.cursor,
            deadline_ms = time_limit.map(|d| d.as_millis() as u64),
        )
        .entered();
        trace!("find: seeking next subsequence match");
        self.ctx.set_deadline(time_limit.map(|d| Instant::now() + d));
        let n = self.input.len();
        loop {
            self.ctx.check_deadline()?;
            if self.cursor > n {
                return Ok(false);
            }
            if self.active.is_none() {
                self.active = Some(consume(self.root, self.cursor));
            }
            let end = self.active.as_mut().expect("seeded above").next(&mut self.ctx, self.input)?;
            match end {
                Some(end) => {
                    let span = (self.cursor, end);
                    if !self.returned.insert(span) {
                        continue;
                    }
                    self.ctx.reset();
                    commit(self.root, &mut self.ctx, self.input, span.0, span.1)?;
                    self.ctx.set_whole_match(span.0, span.1);
                    self.has_match = true;
                    debug!(start = span.0, end = span.1, "find: match reported");
                    return Ok(true);
                }
                None => {
                    self.cursor += 1;
                    self.active = None;
                }
            }
        }
    }

    /// Rewinds to the start of the input and clears dedup/capture state.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.active = None;
        self.returned.clear();
        self.ctx.reset();
        self.has_match = false;
    }

    pub fn start(&self) -> Result<usize, MatchError> {
        self.group(WHOLE_MATCH_SLOT)?.start().ok_or(MatchError::NoMatch)
    }

    pub fn end(&self) -> Result<usize, MatchError> {
        self.group(WHOLE_MATCH_SLOT)?.end().ok_or(MatchError::NoMatch)
    }

    pub fn group(&self, slot: SlotId) -> Result<CaptureGroup, MatchError> {
        if !self.has_match {
            return Err(MatchError::NoMatch);
        }
        if slot.index() >= self.table.slot_count() {
            return Err(MatchError::OutOfBoundsGroup);
        }
        Ok(self.ctx.group(slot).unwrap_or_else(|| CaptureGroup::unmatched(slot)))
    }

    pub fn group_by_name(&self, name: &str) -> Result<CaptureGroup, MatchError> {
        if !self.has_match {
            return Err(MatchError::NoMatch);
        }
        let slot = *self.table.slots_named(name).first().ok_or(MatchError::OutOfBoundsGroup)?;
        self.group(slot)
    }

    pub fn named_capture_groups(&self) -> Result<BTreeMap<String, CaptureGroup>, MatchError> {
        if !self.has_match {
            return Err(MatchError::NoMatch);
        }
        self.table
            .names()
            .map(|name| {
                let slot = self.table.slots_named(name)[0];
                (name.to_owned(), self.ctx.group(slot).unwrap_or_else(|| CaptureGroup::unmatched(slot)))
            })
            .map(Ok)
            .collect()
    }

    pub fn string_capture_groups(&self) -> Result<&HashMap<String, String>, MatchError> {
        if !self.has_match {
            return Err(MatchError::NoMatch);
        }
        Ok(self.ctx.string_captures())
    }
}
