//! Recursive-descent parser for the pattern grammar.
//!
//! Unlike a lossless syntax-tree parser, this one fails fast: the first
//! unexpected token raises a [`CompileError`] and parsing stops, so the
//! builder never partially constructs a pattern. There is no
//! error-recovery/synchronization pass because there is no CST consumer
//! downstream that would benefit from one.

use tokenrex_core::CompileError;

use crate::ast::{
    Atom, AtomKind, CaptureMarker, Kv, NumberLit, NumericOp, Pattern, RepeatSpec, Token,
    TokenBody, TokenBodyAtom, TokenBodyAtomKind, Value,
};
use crate::lexer::{lex, token_text, SyntaxKind};

/// Guards against unbounded recursion on the parse path: pattern depth is
/// attacker-controlled, and a deeply nested `((((...))))` should fail
/// cleanly rather than blow the parser's stack.
const MAX_RECURSION_DEPTH: usize = 256;

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<crate::lexer::Token>,
    pos: usize,
    depth: usize,
}

pub fn parse(source: &str) -> Result<Pattern, CompileError> {
    let tokens: Vec<_> = lex(source)
        .into_iter()
        .filter(|t| t.kind != SyntaxKind::Garbage)
        .collect();
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        depth: 0,
    };
    let pattern = parser.parse_pattern()?;
    if !parser.eof() {
        return Err(parser.error_here("expected end of pattern"));
    }
    Ok(pattern)
}

impl<'s> Parser<'s> {
    fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<SyntaxKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn peek_nth(&self, n: usize) -> Option<SyntaxKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn current_offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.span.start)
            .unwrap_or(self.source.len())
    }

    fn current_text(&self) -> &'s str {
        let token = &self.tokens[self.pos];
        token_text(self.source, token)
    }

    fn bump(&mut self) -> &crate::lexer::Token {
        let token = &self.tokens[self.pos];
        self.pos += 1;
        token
    }

    fn error_here(&self, message: impl Into<String>) -> CompileError {
        CompileError::new(self.current_offset(), message.into())
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) -> Result<&'s str, CompileError> {
        if self.peek() == Some(kind) {
            let text = self.current_text();
            self.bump();
            Ok(text)
        } else {
            Err(self.error_here(format!("expected {what}")))
        }
    }

    fn enter(&mut self) -> Result<(), CompileError> {
        self.depth += 1;
        if self.depth > MAX_RECURSION_DEPTH {
            return Err(self.error_here("pattern nesting is too deep"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // pattern : atom+ | atom+ '&' pattern | atom+ '|' pattern
    fn parse_pattern(&mut self) -> Result<Pattern, CompileError> {
        self.enter()?;
        let mut atoms = Vec::new();
        atoms.push(self.parse_atom()?);
        while self.starts_atom() {
            atoms.push(self.parse_atom()?);
        }

        let result = match self.peek() {
            Some(SyntaxKind::And) => {
                self.bump();
                Pattern::And(atoms, Box::new(self.parse_pattern()?))
            }
            Some(SyntaxKind::Or) => {
                self.bump();
                Pattern::Or(atoms, Box::new(self.parse_pattern()?))
            }
            _ => Pattern::Concat(atoms),
        };
        self.leave();
        Ok(result)
    }

    fn starts_atom(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                SyntaxKind::OpenSquare
                    | SyntaxKind::OpenParen
                    | SyntaxKind::Caret
                    | SyntaxKind::Dollar
                    | SyntaxKind::Variable
                    | SyntaxKind::UnquotedStringLiteral
                    | SyntaxKind::QuotedStringLiteral
                    | SyntaxKind::RegexLiteral
                    | SyntaxKind::Number
            )
        )
    }

    // atom : token | parenthetical | atom repeat_suffix | Variable
    fn parse_atom(&mut self) -> Result<Atom, CompileError> {
        self.enter()?;
        let offset = self.current_offset();

        let mut atom = match self.peek() {
            Some(SyntaxKind::OpenParen) => self.parse_parenthetical()?,
            Some(SyntaxKind::Variable) => {
                let text = self.current_text();
                self.bump();
                Atom {
                    offset,
                    kind: AtomKind::Variable(text[1..].to_owned()),
                }
            }
            _ => {
                let token = self.parse_token()?;
                Atom {
                    offset,
                    kind: AtomKind::Token(token),
                }
            }
        };

        loop {
            let suffix_offset = self.current_offset();
            let spec = match self.peek() {
                Some(SyntaxKind::Star) => {
                    self.bump();
                    RepeatSpec::Star
                }
                Some(SyntaxKind::Plus) => {
                    self.bump();
                    RepeatSpec::Plus
                }
                Some(SyntaxKind::QMark) => {
                    self.bump();
                    RepeatSpec::Opt
                }
                Some(SyntaxKind::OpenBrace) => {
                    self.bump();
                    self.parse_repeat_braces()?
                }
                _ => break,
            };
            let reluctant = if self.peek() == Some(SyntaxKind::QMark) {
                self.bump();
                true
            } else {
                false
            };
            atom = Atom {
                offset: suffix_offset,
                kind: AtomKind::Repeat {
                    body: Box::new(atom),
                    spec,
                    reluctant,
                },
            };
        }

        self.leave();
        Ok(atom)
    }

    fn parse_repeat_braces(&mut self) -> Result<RepeatSpec, CompileError> {
        let first = self.parse_number_lit()?;
        let spec = if self.peek() == Some(SyntaxKind::Comma) {
            self.bump();
            if self.peek() == Some(SyntaxKind::Number) {
                let second = self.parse_number_lit()?;
                RepeatSpec::Range(first, second)
            } else {
                RepeatSpec::AtLeast(first)
            }
        } else {
            RepeatSpec::Exact(first)
        };
        self.expect(SyntaxKind::CloseBrace, "'}'")?;
        Ok(spec)
    }

    // parenthetical : '(' pattern ')'
    //               | '(' '?' '<' Unquoted '>' pattern ')'
    //               | '(' '?' Variable pattern ')'
    fn parse_parenthetical(&mut self) -> Result<Atom, CompileError> {
        let offset = self.current_offset();
        self.bump(); // '('

        let capture = if self.peek() == Some(SyntaxKind::QMark) {
            self.bump();
            if self.peek() == Some(SyntaxKind::LT) {
                self.bump();
                let name = self
                    .expect(SyntaxKind::UnquotedStringLiteral, "a capture name")?
                    .to_owned();
                self.expect(SyntaxKind::GT, "'>'")?;
                CaptureMarker::Named(name)
            } else if self.peek() == Some(SyntaxKind::Variable) {
                let text = self.current_text();
                self.bump();
                CaptureMarker::Named(text[1..].to_owned())
            } else {
                return Err(self.error_here("expected '<name>' or a variable after '(?'"));
            }
        } else {
            CaptureMarker::Anonymous
        };

        let inner = self.parse_pattern()?;
        self.expect(SyntaxKind::CloseParen, "')'")?;

        Ok(Atom {
            offset,
            kind: AtomKind::Paren {
                capture,
                inner: Box::new(inner),
            },
        })
    }

    // token : value | '[' token_body ']' | '[' ']' | '^' | '$'
    fn parse_token(&mut self) -> Result<Token, CompileError> {
        match self.peek() {
            Some(SyntaxKind::Caret) => {
                self.bump();
                Ok(Token::AnchorStart)
            }
            Some(SyntaxKind::Dollar) => {
                self.bump();
                Ok(Token::AnchorEnd)
            }
            Some(SyntaxKind::OpenSquare) => {
                self.bump();
                if self.peek() == Some(SyntaxKind::CloseSquare) {
                    self.bump();
                    return Ok(Token::Wildcard);
                }
                let body = self.parse_token_body()?;
                self.expect(SyntaxKind::CloseSquare, "']'")?;
                Ok(Token::Body(body))
            }
            _ => Ok(Token::Value(self.parse_value()?)),
        }
    }

    // token_body : token_body_atom (('&' | '|') token_body_atom)*
    fn parse_token_body(&mut self) -> Result<TokenBody, CompileError> {
        let mut body = TokenBody::Atom(self.parse_token_body_atom()?);
        loop {
            match self.peek() {
                Some(SyntaxKind::And) => {
                    self.bump();
                    let rhs = self.parse_token_body_atom()?;
                    body = TokenBody::And(Box::new(body), Box::new(rhs));
                }
                Some(SyntaxKind::Or) => {
                    self.bump();
                    let rhs = self.parse_token_body_atom()?;
                    body = TokenBody::Or(Box::new(body), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(body)
    }

    // token_body_atom : key_value_pair | '(' token_body ')' | '!' token_body_atom
    fn parse_token_body_atom(&mut self) -> Result<TokenBodyAtom, CompileError> {
        self.enter()?;
        let offset = self.current_offset();
        let result = match self.peek() {
            Some(SyntaxKind::Not) => {
                self.bump();
                let inner = self.parse_token_body_atom()?;
                Ok(TokenBodyAtom {
                    offset,
                    kind: TokenBodyAtomKind::Not(Box::new(inner)),
                })
            }
            Some(SyntaxKind::OpenParen) => {
                self.bump();
                let inner = self.parse_token_body()?;
                self.expect(SyntaxKind::CloseParen, "')'")?;
                Ok(TokenBodyAtom {
                    offset,
                    kind: TokenBodyAtomKind::Paren(Box::new(inner)),
                })
            }
            _ => {
                let kv = self.parse_key_value_pair()?;
                Ok(TokenBodyAtom {
                    offset,
                    kind: TokenBodyAtomKind::Kv(kv),
                })
            }
        };
        self.leave();
        result
    }

    // key_value_pair : '{' kv '}' | kv
    fn parse_key_value_pair(&mut self) -> Result<Kv, CompileError> {
        if self.peek() == Some(SyntaxKind::OpenBrace) {
            self.bump();
            let kv = self.parse_kv()?;
            self.expect(SyntaxKind::CloseBrace, "'}'")?;
            Ok(kv)
        } else {
            self.parse_kv()
        }
    }

    // kv : Unquoted ':' value | Unquoted numeric_op Number | '!' Unquoted
    fn parse_kv(&mut self) -> Result<Kv, CompileError> {
        if self.peek() == Some(SyntaxKind::Not) {
            self.bump();
            let key = self
                .expect(SyntaxKind::UnquotedStringLiteral, "a key")?
                .to_owned();
            return Ok(Kv::NullCheck { key });
        }

        let key = self
            .expect(SyntaxKind::UnquotedStringLiteral, "a key")?
            .to_owned();

        if self.peek() == Some(SyntaxKind::Colon) {
            self.bump();
            let value = self.parse_value()?;
            return Ok(Kv::Eq { key, value });
        }

        let op = self.parse_numeric_op()?;
        let rhs = self.parse_number_lit()?;
        Ok(Kv::Cmp { key, op, rhs })
    }

    fn parse_numeric_op(&mut self) -> Result<NumericOp, CompileError> {
        match self.peek() {
            Some(SyntaxKind::LT) => {
                self.bump();
                Ok(self.maybe_or_equals(NumericOp::Lt, NumericOp::Le))
            }
            Some(SyntaxKind::GT) => {
                self.bump();
                Ok(self.maybe_or_equals(NumericOp::Gt, NumericOp::Ge))
            }
            Some(SyntaxKind::EQ) => {
                self.bump();
                // Spec: both `=n` and `==n` mean Eq.
                if self.peek() == Some(SyntaxKind::EQ) {
                    self.bump();
                }
                Ok(NumericOp::Eq)
            }
            Some(SyntaxKind::Not) => {
                self.bump();
                self.expect(SyntaxKind::EQ, "'=' after '!'")?;
                Ok(NumericOp::Ne)
            }
            _ => Err(self.error_here("expected a comparison operator")),
        }
    }

    fn maybe_or_equals(&mut self, plain: NumericOp, with_equals: NumericOp) -> NumericOp {
        if self.peek() == Some(SyntaxKind::EQ) {
            self.bump();
            with_equals
        } else {
            plain
        }
    }

    // value : Unquoted | Quoted | Regex | Number | ','
    fn parse_value(&mut self) -> Result<Value, CompileError> {
        match self.peek() {
            Some(SyntaxKind::UnquotedStringLiteral) => {
                let text = self.current_text().to_owned();
                self.bump();
                Ok(Value::Unquoted(text))
            }
            Some(SyntaxKind::QuotedStringLiteral) => {
                let text = unquote(self.current_text());
                self.bump();
                Ok(Value::Quoted(text))
            }
            Some(SyntaxKind::RegexLiteral) => {
                let text = unslash(self.current_text());
                self.bump();
                Ok(Value::Regex(text))
            }
            Some(SyntaxKind::Number) => Ok(Value::Number(self.parse_number_lit()?)),
            Some(SyntaxKind::Comma) => {
                self.bump();
                Ok(Value::Comma)
            }
            Some(SyntaxKind::UnterminatedStringLiteral) => {
                Err(self.error_here("unterminated quoted string"))
            }
            Some(SyntaxKind::UnterminatedRegexLiteral) => {
                Err(self.error_here("unterminated regex literal"))
            }
            _ => Err(self.error_here("expected a value")),
        }
    }

    fn parse_number_lit(&mut self) -> Result<NumberLit, CompileError> {
        let offset = self.current_offset();
        let text = self
            .expect(SyntaxKind::Number, "a number")?
            .to_owned();
        Ok(NumberLit { text, offset })
    }
}

/// Strips the surrounding quotes and resolves `\"`/`\\` escapes.
fn unquote(text: &str) -> String {
    let inner = &text[1..text.len() - 1];
    unescape(inner)
}

/// Strips the surrounding slashes and resolves only `\/` (into `/`); every
/// other escape (`\d`, `\\`, `\.`, ...) is left intact for the downstream
/// regex engine to interpret.
fn unslash(text: &str) -> String {
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'/') {
            out.push('/');
            chars.next();
        } else {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
        }
    }
    out
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod parser_tests;
