use std::collections::HashMap;
use std::time::Duration;

use indexmap::IndexMap;
use tokenrex_core::CaseSensitivity;

use crate::Matcher;

fn compile(source: &str) -> tokenrex_core::Node {
    tokenrex_compiler::compile(source, CaseSensitivity::Sensitive, "text", &IndexMap::new())
        .unwrap_or_else(|e| panic!("failed to compile {source:?}: {e}"))
}

fn tok(text: &str) -> HashMap<String, String> {
    HashMap::from([("text".to_owned(), text.to_owned())])
}

fn tok_kv(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

#[test]
fn disjunction_of_literal_and_repeated_predicate() {
    let node = compile(r#"hello (world | [{movie:"Star Wars"}]+)"#);
    let input = vec![tok("hello"), tok_kv(&[("text", "there"), ("movie", "Star Wars")])];
    let mut matcher = Matcher::new(&node, &input[..]);
    assert!(matcher.matches(None).unwrap());
    assert_eq!(matcher.start().unwrap(), 0);
    assert_eq!(matcher.end().unwrap(), 2);
}

#[test]
fn named_entity_pattern_over_annotated_sentence() {
    let node = compile("[{ner:PERSON}]+ [{lemma:be}] born in [{ner:LOCATION}]+");
    let input = vec![
        tok_kv(&[("text", "Obama"), ("ner", "PERSON")]),
        tok_kv(&[("text", "was"), ("lemma", "be")]),
        tok("born"),
        tok("in"),
        tok_kv(&[("text", "Hawaii"), ("ner", "LOCATION")]),
    ];
    let mut matcher = Matcher::new(&node, &input[..]);
    assert!(matcher.matches(None).unwrap());
}

// Greedy emits longest-first, reluctant emits shortest-first.
#[test]
fn greedy_plus_emits_lengths_decreasing() {
    let node = compile("hello+");
    let input = vec![tok("hello"), tok("hello"), tok("hello")];
    let mut iter = crate::consume::consume(&node, 0);
    let table = crate::ctx::CaptureTable::build(&node);
    let mut ctx = crate::ctx::MatchCtx::new(std::rc::Rc::new(table));
    let mut ends = Vec::new();
    while let Some(e) = iter.next(&mut ctx, &input[..]).unwrap() {
        ends.push(e);
    }
    assert_eq!(ends, vec![3, 2, 1]);
}

#[test]
fn reluctant_plus_emits_lengths_increasing() {
    let node = compile("hello+?");
    let input = vec![tok("hello"), tok("hello"), tok("hello")];
    let mut iter = crate::consume::consume(&node, 0);
    let table = crate::ctx::CaptureTable::build(&node);
    let mut ctx = crate::ctx::MatchCtx::new(std::rc::Rc::new(table));
    let mut ends = Vec::new();
    while let Some(e) = iter.next(&mut ctx, &input[..]).unwrap() {
        ends.push(e);
    }
    assert_eq!(ends, vec![1, 2, 3]);
}

// A deadline already in the past is honoured on the very first check
// regardless of how fast the pattern itself would resolve.
#[test]
fn deadline_already_elapsed_times_out_before_any_work() {
    let node = compile("(((((a*)*)*)*)*)*");
    let input: Vec<_> = std::iter::repeat_with(|| tok("a")).take(30).collect();
    let mut matcher = Matcher::new(&node, &input[..]);
    let err = matcher.matches(Some(Duration::from_secs(0))).unwrap_err();
    assert_eq!(err, tokenrex_core::MatchError::Timeout);
}

#[test]
fn find_suppresses_duplicate_spans_across_calls() {
    let node = compile("(a{1} | a{2}) (a{2} | a{1})");
    let input = vec![tok("a"), tok("a"), tok("a"), tok("a"), tok("a")];
    let mut matcher = Matcher::new(&node, &input[..]);
    let mut spans = Vec::new();
    while matcher.find(None).unwrap() {
        spans.push((matcher.start().unwrap(), matcher.end().unwrap()));
    }
    let mut dedup_check = spans.clone();
    dedup_check.sort_unstable();
    dedup_check.dedup();
    assert_eq!(spans.len(), dedup_check.len(), "find must never repeat a span");
    assert!(spans.contains(&(0, 3)));
    assert!(spans.contains(&(0, 2)));
}

#[test]
fn named_regex_groups_populate_string_captures() {
    let node = compile(r"/(?<y>[0-9]{4})(?<m>[0-9]{2})(?<d>[0-9]{2})/");
    let input = vec![tok("20191225")];
    let mut matcher = Matcher::new(&node, &input[..]);
    assert!(matcher.matches(None).unwrap());
    let strings = matcher.string_capture_groups().unwrap();
    assert_eq!(strings.get("y").map(String::as_str), Some("2019"));
    assert_eq!(strings.get("m").map(String::as_str), Some("12"));
    assert_eq!(strings.get("d").map(String::as_str), Some("25"));
}

// Boundary cases

#[test]
fn empty_pattern_matches_only_empty_input() {
    let node = compile("");
    let empty: Vec<HashMap<String, String>> = vec![];
    let mut empty_matcher = Matcher::new(&node, &empty[..]);
    assert!(empty_matcher.matches(None).unwrap());

    let nonempty = vec![tok("a")];
    let mut matcher = Matcher::new(&node, &nonempty[..]);
    assert!(!matcher.matches(None).unwrap());
}

#[test]
fn wildcard_on_empty_input_yields_no_matches() {
    let node = compile("[]");
    let empty: Vec<HashMap<String, String>> = vec![];
    let mut matcher = Matcher::new(&node, &empty[..]);
    assert!(!matcher.matches(None).unwrap());
}

#[test]
fn anchors_are_zero_width_and_position_specific() {
    let node = compile("^ hello $");
    let exact = vec![tok("hello")];
    let mut matcher = Matcher::new(&node, &exact[..]);
    assert!(matcher.matches(None).unwrap());

    let trailing = vec![tok("hello"), tok("world")];
    let mut matcher = Matcher::new(&node, &trailing[..]);
    assert!(!matcher.matches(None).unwrap());
}

#[test]
fn int_compare_against_i32_min_does_not_overflow() {
    let node = compile("[count<=-2147483648]");
    let input = vec![tok_kv(&[("count", "-2147483648")])];
    let mut matcher = Matcher::new(&node, &input[..]);
    assert!(matcher.matches(None).unwrap());
}

#[test]
fn repeat_n_with_trailing_qmark_is_equivalent_to_exact_n() {
    let node = compile("a{2}?");
    let input = vec![tok("a"), tok("a")];
    let mut matcher = Matcher::new(&node, &input[..]);
    assert!(matcher.matches(None).unwrap());
}

// `matches` agrees with "some end-index sequence reaches N".
#[test]
fn matches_agrees_with_end_index_reaching_input_length() {
    let node = compile("hello world");
    let input = vec![tok("hello"), tok("world")];
    let table = crate::ctx::CaptureTable::build(&node);
    let mut ctx = crate::ctx::MatchCtx::new(std::rc::Rc::new(table));
    let mut iter = crate::consume::consume(&node, 0);
    let mut reaches_end = false;
    while let Some(e) = iter.next(&mut ctx, &input[..]).unwrap() {
        reaches_end |= e == input.len();
    }
    let mut matcher = Matcher::new(&node, &input[..]);
    assert_eq!(matcher.matches(None).unwrap(), reaches_end);
}

// find always advances start, or reports a distinct end at the same start.
#[test]
fn find_advances_start_or_end_each_call() {
    let node = compile("a+?");
    let input = vec![tok("a"), tok("a"), tok("a")];
    let mut matcher = Matcher::new(&node, &input[..]);
    let mut last: Option<(usize, usize)> = None;
    while matcher.find(None).unwrap() {
        let span = (matcher.start().unwrap(), matcher.end().unwrap());
        if let Some(prev) = last {
            assert!(span.0 > prev.0 || (span.0 == prev.0 && span.1 != prev.1));
        }
        last = Some(span);
    }
}

// Rendering then recompiling preserves matching semantics.
#[test]
fn to_string_then_recompile_preserves_semantics() {
    let node = compile(r#"hello+ [{pos:"NN"} & {lemma:"dog"}]"#);
    let rendered = crate::display::to_string(&node);
    let recompiled = compile(&rendered);

    let input = vec![
        tok("hello"),
        tok("hello"),
        tok_kv(&[("pos", "NN"), ("lemma", "dog")]),
    ];
    let mut original = Matcher::new(&node, &input[..]);
    let mut round_tripped = Matcher::new(&recompiled, &input[..]);
    assert_eq!(original.matches(None).unwrap(), round_tripped.matches(None).unwrap());
}

#[test]
fn group_before_match_is_illegal_state() {
    let node = compile("hello");
    let input = vec![tok("hello")];
    let matcher = Matcher::new(&node, &input[..]);
    assert_eq!(matcher.start().unwrap_err(), tokenrex_core::MatchError::NoMatch);
}

#[test]
fn out_of_range_group_id_is_an_error() {
    let node = compile("hello");
    let input = vec![tok("hello")];
    let mut matcher = Matcher::new(&node, &input[..]);
    assert!(matcher.matches(None).unwrap());
    let bogus = tokenrex_core::SlotId::new(999);
    assert_eq!(matcher.group(bogus).unwrap_err(), tokenrex_core::MatchError::OutOfBoundsGroup);
}

#[test]
fn reset_clears_cursor_and_dedup_state() {
    let node = compile("a");
    let input = vec![tok("a"), tok("a")];
    let mut matcher = Matcher::new(&node, &input[..]);
    assert!(matcher.find(None).unwrap());
    assert_eq!(matcher.start().unwrap(), 0);
    matcher.reset();
    assert!(matcher.find(None).unwrap());
    assert_eq!(matcher.start().unwrap(), 0);
}

// A capturing group directly inside a quantified repeat reports the last
// iteration's span, matching standard backtracking-regex semantics.
#[test]
fn capture_inside_repeat_reports_last_iteration() {
    let node = compile("(?<g> [])+");
    let input = vec![tok("a"), tok("b"), tok("c")];
    let mut matcher = Matcher::new(&node, &input[..]);
    assert!(matcher.matches(None).unwrap());
    let group = matcher.group_by_name("g").unwrap();
    assert_eq!(group.start(), Some(2));
    assert_eq!(group.end(), Some(3));
}

// A capturing node inside a failing Conjunction1 arm of a Disjunction1
// must not leave its slot populated once the other arm wins the match.
#[test]
fn losing_conjunction1_arm_does_not_leak_captures() {
    let node = compile(r#"((?<g> [{movie:"Some Movie"}]) & world) | foo"#);
    let input = vec![tok_kv(&[("text", "foo"), ("movie", "Some Movie")])];
    let mut matcher = Matcher::new(&node, &input[..]);
    assert!(matcher.matches(None).unwrap());
    let group = matcher.group_by_name("g").unwrap();
    assert!(!group.is_matched(), "losing Conjunction1 arm must not record its capture");
}

#[test]
fn conjunctionn_reports_intersection_of_both_sides() {
    let node = compile("(hello world) & (hello [])");
    let input = vec![tok("hello"), tok("world")];
    let mut matcher = Matcher::new(&node, &input[..]);
    assert!(matcher.matches(None).unwrap());
}
