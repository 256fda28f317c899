//! Per-match mutable scratch state and the input-sequence abstraction the
//! engine matches against.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use tokenrex_core::{CaptureGroup, MatchError, Node, NodeId, SlotId, SlotKind, Token};

/// An indexable, immutable-during-matching sequence of tokens.
///
/// Implemented for any `[T] where T: Token`, so callers can match against a
/// plain `Vec<HashMap<String, String>>` or any custom token type.
pub trait Tokens {
    fn len(&self) -> usize;
    fn at(&self, index: usize) -> &dyn Token;
}

impl<T: Token> Tokens for [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn at(&self, index: usize) -> &dyn Token {
        &self[index]
    }
}

/// Assigns a [`SlotId`] to every node that carries a capture marker, by a
/// depth-first pre-order walk over the tree. Owned by the matcher, not the
/// pattern, so one compiled pattern can back many matchers.
#[derive(Debug, Clone)]
pub struct CaptureTable {
    node_to_slot: HashMap<u32, SlotId>,
    name_to_slots: HashMap<String, Vec<SlotId>>,
    slot_count: u32,
}

impl CaptureTable {
    pub fn build(root: &Node) -> Self {
        let mut table = CaptureTable {
            node_to_slot: HashMap::new(),
            name_to_slots: HashMap::new(),
            // Slot 0 is reserved for the whole-match span.
            slot_count: 1,
        };
        table.visit(root);
        table
    }

    fn visit(&mut self, node: &Node) {
        if let Some(kind) = &node.capture {
            let slot = SlotId::new(self.slot_count);
            self.slot_count += 1;
            self.node_to_slot.insert(node.id.as_u32(), slot);
            if let SlotKind::Named(name) = kind {
                self.name_to_slots.entry(name.clone()).or_default().push(slot);
            }
        }
        for child in children(node) {
            self.visit(child);
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count as usize
    }

    pub fn slot_of(&self, id: NodeId) -> Option<SlotId> {
        self.node_to_slot.get(&id.as_u32()).copied()
    }

    pub fn slots_named(&self, name: &str) -> &[SlotId] {
        self.name_to_slots.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.name_to_slots.keys().map(String::as_str)
    }
}

fn children(node: &Node) -> Vec<&Node> {
    use tokenrex_core::{NodeKind, Repetition};
    match &node.kind {
        NodeKind::Literal { .. }
        | NodeKind::Regex { .. }
        | NodeKind::IntCompare { .. }
        | NodeKind::NullCheck { .. }
        | NodeKind::Wildcard
        | NodeKind::AnchorStart
        | NodeKind::AnchorEnd
        | NodeKind::Empty => vec![],
        NodeKind::Conjunction1(a, b) | NodeKind::Disjunction1(a, b) => vec![a, b],
        NodeKind::Negation1(a) => vec![a],
        NodeKind::ConjunctionN(a, b) | NodeKind::DisjunctionN(a, b) => vec![a, b],
        NodeKind::SequenceRepeat(Repetition::List(items)) => items.iter().collect(),
        NodeKind::SequenceRepeat(Repetition::Repeat { body, .. }) => vec![body],
    }
}

/// Mutable state threaded through a single match session: capture slots,
/// the string-capture map for intra-token regex named groups, and the
/// wall-clock deadline.
///
/// Holds the [`CaptureTable`] via `Rc` rather than by reference: a
/// `Matcher` owns both the table and this context, and a borrow would make
/// that struct self-referential.
pub struct MatchCtx {
    table: Rc<CaptureTable>,
    slots: Vec<Option<(usize, usize)>>,
    string_captures: HashMap<String, String>,
    deadline: Option<Instant>,
}

impl MatchCtx {
    pub fn new(table: Rc<CaptureTable>) -> Self {
        Self {
            slots: vec![None; table.slot_count()],
            string_captures: HashMap::new(),
            deadline: None,
            table,
        }
    }

    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.string_captures.clear();
    }

    pub fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.deadline = deadline;
    }

    /// Checked cooperatively inside the sequence/repeat backtracking loop,
    /// not on every predicate.
    pub fn check_deadline(&self) -> Result<(), MatchError> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(MatchError::Timeout);
            }
        }
        Ok(())
    }

    pub fn set_whole_match(&mut self, start: usize, end: usize) {
        self.slots[tokenrex_core::WHOLE_MATCH_SLOT.index()] = Some((start, end));
    }

    /// Registers `node`'s capture span, if it carries one.
    pub fn record_if_capturing(&mut self, node: &Node, start: usize, end: usize) {
        if let Some(slot) = self.table.slot_of(node.id) {
            self.slots[slot.index()] = Some((start, end));
        }
    }

    pub fn record_named_capture(&mut self, name: String, value: String) {
        self.string_captures.insert(name, value);
    }

    pub fn group(&self, slot: SlotId) -> Option<CaptureGroup> {
        if slot.index() >= self.slots.len() {
            return None;
        }
        Some(match self.slots[slot.index()] {
            Some((b, e)) => CaptureGroup::matched(slot, b, e),
            None => CaptureGroup::unmatched(slot),
        })
    }

    pub fn table(&self) -> &CaptureTable {
        &self.table
    }

    pub fn string_captures(&self) -> &HashMap<String, String> {
        &self.string_captures
    }
}
