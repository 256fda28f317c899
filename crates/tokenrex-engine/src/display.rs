//! Stable pattern-to-string rendering.
//!
//! Round-tripping is not guaranteed to preserve every source formatting
//! choice — a capture around a disjunction may vanish, and the global
//! case-sensitivity flag passed to the builder has no surface syntax to
//! restore here — but re-parsing the rendered form must match the
//! original's matching semantics.

use std::fmt;

use tokenrex_core::{CompareOp, Laziness, Node, NodeKind, RepeatBounds, Repetition, SlotKind};

/// Wraps a node for `{}`-formatting; `Node` lives in `tokenrex-core` so it
/// cannot implement `Display` directly here.
pub struct Pretty<'a>(pub &'a Node);

impl fmt::Display for Pretty<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self.0))
    }
}

pub fn to_string(node: &Node) -> String {
    render(node)
}

fn render(node: &Node) -> String {
    let raw = render_uncaptured(node);
    match &node.capture {
        None => raw,
        Some(SlotKind::Anonymous) => format!("({raw})"),
        Some(SlotKind::Named(name)) => format!("(?<{name}> {raw})"),
    }
}

fn render_uncaptured(node: &Node) -> String {
    match &node.kind {
        NodeKind::AnchorStart => "^".to_owned(),
        NodeKind::AnchorEnd => "$".to_owned(),
        NodeKind::Empty => "\"\"".to_owned(),
        NodeKind::Literal { .. }
        | NodeKind::Regex { .. }
        | NodeKind::IntCompare { .. }
        | NodeKind::NullCheck { .. }
        | NodeKind::Wildcard
        | NodeKind::Conjunction1(..)
        | NodeKind::Disjunction1(..)
        | NodeKind::Negation1(..) => format!("[{}]", token_body(node)),
        NodeKind::SequenceRepeat(Repetition::List(items)) => {
            items.iter().map(render).collect::<Vec<_>>().join(" ")
        }
        NodeKind::SequenceRepeat(Repetition::Repeat { body, bounds, laziness }) => {
            format!("{}{}", render(body), repeat_suffix(*bounds, *laziness))
        }
        NodeKind::ConjunctionN(a, b) => format!("{} & {}", render(a), render(b)),
        NodeKind::DisjunctionN(a, b) => format!("{} | {}", render(a), render(b)),
    }
}

/// Renders the inside of a single token's `[ ]`, where boolean combinators
/// over key/value predicates live (grammar's `token_body`).
fn token_body(node: &Node) -> String {
    match &node.kind {
        NodeKind::Conjunction1(a, b) => format!("{} & {}", token_body_atom(a), token_body_atom(b)),
        NodeKind::Disjunction1(a, b) => format!("{} | {}", token_body_atom(a), token_body_atom(b)),
        _ => token_body_atom(node),
    }
}

fn token_body_atom(node: &Node) -> String {
    match &node.kind {
        NodeKind::Negation1(a) => format!("!{}", token_body_atom(a)),
        NodeKind::Conjunction1(..) | NodeKind::Disjunction1(..) => format!("({})", token_body(node)),
        _ => leaf_kv(node),
    }
}

fn leaf_kv(node: &Node) -> String {
    match &node.kind {
        NodeKind::Literal { key, value, .. } => format!("{key}:{}", quote(value)),
        NodeKind::Regex { key, regex } => format!("{key}:/{}/", regex.as_str()),
        NodeKind::IntCompare { key, op, rhs } => format!("{key}{}{rhs}", op_str(*op)),
        NodeKind::NullCheck { key } => format!("!{key}"),
        NodeKind::Wildcard => String::new(),
        _ => unreachable!("leaf_kv called on a non-leaf NodeKind"),
    }
}

fn op_str(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
        CompareOp::Eq => "=",
        CompareOp::Ne => "!=",
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn repeat_suffix(bounds: RepeatBounds, laziness: Laziness) -> String {
    let base = match (bounds.min, bounds.max) {
        (0, 1) => "?".to_owned(),
        (0, RepeatBounds::UNBOUNDED) => "*".to_owned(),
        (1, RepeatBounds::UNBOUNDED) => "+".to_owned(),
        (n, m) if n == m => format!("{{{n}}}"),
        (n, RepeatBounds::UNBOUNDED) => format!("{{{n},}}"),
        (n, m) => format!("{{{n},{m}}}"),
    };
    if laziness == Laziness::Reluctant {
        format!("{base}?")
    } else {
        base
    }
}
