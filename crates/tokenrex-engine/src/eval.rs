//! Evaluates the single-token node family: predicates, anchors, the empty
//! pattern, and the single-token boolean combinators that wrap them.
//!
//! These all share one trait: given a fixed start index, there is at most
//! one possible end index, so matching and commit collapse into the same
//! recursive evaluator.

use tokenrex_core::{CaseSensitivity, Node, NodeKind};

use crate::ctx::{MatchCtx, Tokens};

fn parse_runtime_int(s: &str) -> Option<i32> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude: u32 = digits.parse().ok()?;
    if negative {
        if magnitude == i32::MIN.unsigned_abs() {
            return Some(i32::MIN);
        }
        i32::try_from(magnitude).ok().map(|m| -m)
    } else {
        i32::try_from(magnitude).ok()
    }
}

fn literal_eq(case: CaseSensitivity, value: &str, candidate: &str) -> bool {
    match case {
        CaseSensitivity::Sensitive => value == candidate,
        // length-then-code-point comparison with upper-case folding, no
        // lower-case fallback.
        CaseSensitivity::Insensitive => {
            value.chars().count() == candidate.chars().count()
                && value
                    .chars()
                    .flat_map(char::to_uppercase)
                    .eq(candidate.chars().flat_map(char::to_uppercase))
        }
    }
}

/// Evaluates a leaf (non-combinator) single-token `NodeKind` at `i`.
/// Returns the end index and any named regex captures on success.
fn eval_leaf(kind: &NodeKind, input: &dyn Tokens, i: usize) -> Option<(usize, Vec<(String, String)>)> {
    match kind {
        NodeKind::Literal { key, value, case } => {
            if i >= input.len() {
                return None;
            }
            let candidate = input.at(i).get(key)?;
            literal_eq(*case, value, candidate).then_some((i + 1, Vec::new()))
        }
        NodeKind::Regex { key, regex } => {
            if i >= input.len() {
                return None;
            }
            let candidate = input.at(i).get(key)?;
            let caps = regex.captures(candidate)?;
            // Full-match only: a partial regex hit at either edge doesn't count.
            let whole = caps.get(0)?;
            if whole.start() != 0 || whole.end() != candidate.len() {
                return None;
            }
            let named = regex
                .capture_names()
                .flatten()
                .filter_map(|name| caps.name(name).map(|m| (name.to_owned(), m.as_str().to_owned())))
                .collect();
            Some((i + 1, named))
        }
        NodeKind::IntCompare { key, op, rhs } => {
            if i >= input.len() {
                return None;
            }
            let candidate = input.at(i).get(key)?;
            let lhs = parse_runtime_int(candidate)?;
            op.apply(lhs, *rhs).then_some((i + 1, Vec::new()))
        }
        NodeKind::NullCheck { key } => {
            if i >= input.len() {
                return None;
            }
            input.at(i).get(key).is_none().then_some((i + 1, Vec::new()))
        }
        NodeKind::Wildcard => (i < input.len()).then_some((i + 1, Vec::new())),
        NodeKind::AnchorStart => (i == 0).then_some((i, Vec::new())),
        NodeKind::AnchorEnd => (i == input.len()).then_some((i, Vec::new())),
        NodeKind::Empty => Some((i, Vec::new())),
        _ => unreachable!("eval_leaf called on a non-leaf NodeKind"),
    }
}

/// Does `node` (single-token family only) match at `i`, ignoring captures?
/// Used by `Negation1`, which never records sub-captures for its operand.
pub fn probe_single(node: &Node, input: &dyn Tokens, i: usize) -> bool {
    match &node.kind {
        NodeKind::Conjunction1(a, b) => probe_single(a, input, i) && probe_single(b, input, i),
        NodeKind::Disjunction1(a, b) => probe_single(a, input, i) || probe_single(b, input, i),
        NodeKind::Negation1(a) => !probe_single(a, input, i),
        kind => eval_leaf(kind, input, i).is_some(),
    }
}

/// Evaluates any single-token-family node at `i`, recording its own capture
/// (and any nested captures) on success.
pub fn eval_and_record(node: &Node, ctx: &mut MatchCtx, input: &dyn Tokens, i: usize) -> Option<usize> {
    let end = match &node.kind {
        NodeKind::Conjunction1(a, b) => {
            // Probe both operands before recording either one's captures: if
            // `b` fails, `a`'s (possibly nested) captures must not be left
            // behind in the table, since a Conjunction1 can itself be a
            // losing arm of an enclosing Disjunction1.
            if !probe_single(a, input, i) || !probe_single(b, input, i) {
                return None;
            }
            let ea = eval_and_record(a, ctx, input, i).expect("probe_single already confirmed a match");
            let eb = eval_and_record(b, ctx, input, i).expect("probe_single already confirmed a match");
            debug_assert_eq!(ea, eb, "Conjunction1 operands must agree on length");
            ea
        }
        NodeKind::Disjunction1(a, b) => match eval_and_record(a, ctx, input, i) {
            Some(e) => e,
            None => eval_and_record(b, ctx, input, i)?,
        },
        NodeKind::Negation1(a) => {
            if probe_single(a, input, i) {
                return None;
            }
            i + node.fixed_len().expect("Negation1 is single-token") as usize
        }
        kind => {
            let (end, named) = eval_leaf(kind, input, i)?;
            for (name, value) in named {
                ctx.record_named_capture(name, value);
            }
            end
        }
    };
    ctx.record_if_capturing(node, i, end);
    Some(end)
}
