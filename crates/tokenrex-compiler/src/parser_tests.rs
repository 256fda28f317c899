use super::*;
use crate::ast::*;

#[test]
fn bare_literal_atom() {
    let pattern = parse("hello").unwrap();
    match pattern {
        Pattern::Concat(atoms) => {
            assert_eq!(atoms.len(), 1);
            assert!(matches!(
                &atoms[0].kind,
                AtomKind::Token(Token::Value(Value::Unquoted(s))) if s == "hello"
            ));
        }
        _ => panic!("expected Concat"),
    }
}

#[test]
fn wildcard_token() {
    let pattern = parse("[]").unwrap();
    match pattern {
        Pattern::Concat(atoms) => {
            assert!(matches!(&atoms[0].kind, AtomKind::Token(Token::Wildcard)));
        }
        _ => panic!(),
    }
}

#[test]
fn anchors() {
    let pattern = parse("^ hello $").unwrap();
    match pattern {
        Pattern::Concat(atoms) => {
            assert_eq!(atoms.len(), 3);
            assert!(matches!(&atoms[0].kind, AtomKind::Token(Token::AnchorStart)));
            assert!(matches!(&atoms[2].kind, AtomKind::Token(Token::AnchorEnd)));
        }
        _ => panic!(),
    }
}

#[test]
fn bracketed_key_value() {
    let pattern = parse(r#"[{pos:"NN"}]"#).unwrap();
    let Pattern::Concat(atoms) = pattern else {
        panic!()
    };
    let AtomKind::Token(Token::Body(TokenBody::Atom(atom))) = &atoms[0].kind else {
        panic!()
    };
    let TokenBodyAtomKind::Kv(Kv::Eq { key, value }) = &atom.kind else {
        panic!()
    };
    assert_eq!(key, "pos");
    assert_eq!(*value, Value::Quoted("NN".to_owned()));
}

#[test]
fn bracket_free_key_value_shorthand() {
    let pattern = parse("[pos:NN]").unwrap();
    let Pattern::Concat(atoms) = pattern else {
        panic!()
    };
    assert!(matches!(
        &atoms[0].kind,
        AtomKind::Token(Token::Body(TokenBody::Atom(_)))
    ));
}

#[test]
fn numeric_comparison_operators() {
    for (src, expected) in [
        ("[count=3]", NumericOp::Eq),
        ("[count==3]", NumericOp::Eq),
        ("[count<3]", NumericOp::Lt),
        ("[count<=3]", NumericOp::Le),
        ("[count>3]", NumericOp::Gt),
        ("[count>=3]", NumericOp::Ge),
        ("[count!=3]", NumericOp::Ne),
    ] {
        let pattern = parse(src).unwrap();
        let Pattern::Concat(atoms) = pattern else {
            panic!()
        };
        let AtomKind::Token(Token::Body(TokenBody::Atom(atom))) = &atoms[0].kind else {
            panic!()
        };
        let TokenBodyAtomKind::Kv(Kv::Cmp { op, .. }) = &atom.kind else {
            panic!()
        };
        assert_eq!(*op, expected, "source: {src}");
    }
}

#[test]
fn null_check() {
    let pattern = parse("[{!pos}]").unwrap();
    let Pattern::Concat(atoms) = pattern else {
        panic!()
    };
    let AtomKind::Token(Token::Body(TokenBody::Atom(atom))) = &atoms[0].kind else {
        panic!()
    };
    assert!(matches!(&atom.kind, TokenBodyAtomKind::Kv(Kv::NullCheck { key }) if key == "pos"));
}

#[test]
fn negated_body_atom() {
    let pattern = parse("[!{pos:NN}]").unwrap();
    let Pattern::Concat(atoms) = pattern else {
        panic!()
    };
    let AtomKind::Token(Token::Body(TokenBody::Atom(atom))) = &atoms[0].kind else {
        panic!()
    };
    assert!(matches!(&atom.kind, TokenBodyAtomKind::Not(_)));
}

#[test]
fn conjunction_and_disjunction_body() {
    let pattern = parse("[{pos:NN} & {lemma:dog}]").unwrap();
    let Pattern::Concat(atoms) = pattern else {
        panic!()
    };
    assert!(matches!(
        &atoms[0].kind,
        AtomKind::Token(Token::Body(TokenBody::And(_, _)))
    ));

    let pattern = parse("[{pos:NN} | {pos:VB}]").unwrap();
    let Pattern::Concat(atoms) = pattern else {
        panic!()
    };
    assert!(matches!(
        &atoms[0].kind,
        AtomKind::Token(Token::Body(TokenBody::Or(_, _)))
    ));
}

#[test]
fn anonymous_and_named_parens() {
    let pattern = parse("(hello)").unwrap();
    let Pattern::Concat(atoms) = pattern else {
        panic!()
    };
    assert!(matches!(
        &atoms[0].kind,
        AtomKind::Paren {
            capture: CaptureMarker::Anonymous,
            ..
        }
    ));

    let pattern = parse("(?<greeting> hello)").unwrap();
    let Pattern::Concat(atoms) = pattern else {
        panic!()
    };
    assert!(matches!(
        &atoms[0].kind,
        AtomKind::Paren {
            capture: CaptureMarker::Named(name),
            ..
        } if name == "greeting"
    ));

    let pattern = parse("(?$greeting hello)").unwrap();
    let Pattern::Concat(atoms) = pattern else {
        panic!()
    };
    assert!(matches!(
        &atoms[0].kind,
        AtomKind::Paren {
            capture: CaptureMarker::Named(name),
            ..
        } if name == "greeting"
    ));
}

#[test]
fn repeat_suffixes() {
    let cases: &[(&str, fn(&RepeatSpec) -> bool, bool)] = &[
        ("hello*", |s| matches!(s, RepeatSpec::Star), false),
        ("hello+", |s| matches!(s, RepeatSpec::Plus), false),
        ("hello?", |s| matches!(s, RepeatSpec::Opt), false),
        ("hello+?", |s| matches!(s, RepeatSpec::Plus), true),
        ("hello{3}", |s| matches!(s, RepeatSpec::Exact(_)), false),
        ("hello{3,}", |s| matches!(s, RepeatSpec::AtLeast(_)), false),
        ("hello{3,5}", |s| matches!(s, RepeatSpec::Range(_, _)), false),
        ("hello{3,5}?", |s| matches!(s, RepeatSpec::Range(_, _)), true),
    ];
    for (src, check, reluctant) in cases {
        let pattern = parse(src).unwrap();
        let Pattern::Concat(atoms) = pattern else {
            panic!()
        };
        let AtomKind::Repeat {
            spec,
            reluctant: got_reluctant,
            ..
        } = &atoms[0].kind
        else {
            panic!("not a repeat: {src}")
        };
        assert!(check(spec), "wrong spec shape for {src}");
        assert_eq!(*got_reluctant, *reluctant, "wrong laziness for {src}");
    }
}

#[test]
fn variable_atom() {
    let pattern = parse("$greeting").unwrap();
    let Pattern::Concat(atoms) = pattern else {
        panic!()
    };
    assert!(matches!(&atoms[0].kind, AtomKind::Variable(name) if name == "greeting"));
}

#[test]
fn top_level_conjunction_and_disjunction() {
    let pattern = parse("hello & world").unwrap();
    assert!(matches!(pattern, Pattern::And(_, _)));

    let pattern = parse("hello | world").unwrap();
    assert!(matches!(pattern, Pattern::Or(_, _)));
}

#[test]
fn regex_literal_unslash_keeps_escapes() {
    let pattern = parse(r"/a\/b\d/").unwrap();
    let Pattern::Concat(atoms) = pattern else {
        panic!()
    };
    assert!(matches!(
        &atoms[0].kind,
        AtomKind::Token(Token::Value(Value::Regex(s))) if s == r"a/b\d"
    ));
}

#[test]
fn quoted_value_unescapes() {
    let pattern = parse(r#"[{pos:"a \"quoted\" word"}]"#).unwrap();
    let Pattern::Concat(atoms) = pattern else {
        panic!()
    };
    let AtomKind::Token(Token::Body(TokenBody::Atom(atom))) = &atoms[0].kind else {
        panic!()
    };
    let TokenBodyAtomKind::Kv(Kv::Eq { value, .. }) = &atom.kind else {
        panic!()
    };
    assert_eq!(*value, Value::Quoted("a \"quoted\" word".to_owned()));
}

#[test]
fn unterminated_string_is_an_error() {
    let err = parse("[{pos:\"unterminated}]").unwrap_err();
    assert!(err.message.contains("unterminated"));
}

#[test]
fn bad_repeat_suffix_is_an_error() {
    assert!(parse("hello{}").is_err());
}

#[test]
fn unbalanced_paren_is_an_error() {
    assert!(parse("(hello").is_err());
}
