//! Lexer for the pattern language.
//!
//! Produces span-based tokens without storing text — text is sliced from
//! source only when needed.
//!
//! ## Error handling
//!
//! The lexer coalesces consecutive error characters into single `Garbage`
//! tokens rather than producing one error per character, matching-related
//! constructs (unterminated strings, unterminated regexes) get their own
//! distinct token kinds instead of falling into `Garbage`, so the parser can
//! report a precise diagnostic.

use std::ops::Range;

use logos::Logos;

/// Every terminal of the pattern grammar, plus `Garbage` for unrecognized
/// input.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*(?:[^*]|\*[^/])*\*/")]
pub enum SyntaxKind {
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("[")]
    OpenSquare,
    #[token("]")]
    CloseSquare,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(":")]
    Colon,
    #[token("&")]
    And,
    #[token("|")]
    Or,
    #[token("!")]
    Not,
    #[token("+")]
    Plus,
    #[token("*")]
    Star,
    #[token("?")]
    QMark,
    #[token(",")]
    Comma,
    #[token("^")]
    Caret,
    #[token("<")]
    LT,
    #[token(">")]
    GT,
    #[token("=")]
    EQ,

    /// Bare `$`, the end-of-sequence anchor. Never matches when `$` is
    /// immediately followed by an identifier character — that is a
    /// [`SyntaxKind::Variable`] instead, and wins on longest match.
    #[token("$")]
    Dollar,

    /// `$name` — always longer than a bare [`SyntaxKind::Dollar`] for the
    /// same input, so logos prefers this variant whenever an identifier
    /// follows.
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*")]
    Variable,

    /// `-*[0-9]+`. Sign collapsing and overflow checking happen in
    /// [`crate::numeric`], not here — the lexer only recognizes the shape.
    #[regex(r"-*[0-9]+")]
    Number,

    /// An unquoted atom: starts with a non-special, non-digit, non-dash
    /// character; or one-or-more dashes followed by a non-digit,
    /// non-special head; or a pure run of dashes. `Number` is strictly
    /// longer whenever the text is dashes-then-digits, so the two never
    /// tie.
    #[regex(r#"[^\s(){}\[\]:&|!+*?,$^<>="/0-9-][^\s(){}\[\]:&|!+*?,$^<>="/]*"#)]
    #[regex(r#"-+[^\s(){}\[\]:&|!+*?,$^<>="/0-9-][^\s(){}\[\]:&|!+*?,$^<>="/]*"#)]
    #[regex(r"-+")]
    UnquotedStringLiteral,

    /// `"..."` with `\"` and `\\` escapes, not crossing a newline.
    #[regex(r#""(?:\\.|[^"\\\n])*""#)]
    QuotedStringLiteral,

    /// A `"` opened but never closed before a newline or end of input.
    #[regex(r#""(?:\\.|[^"\\\n])*"#)]
    UnterminatedStringLiteral,

    /// `/.../ ` with `\/` and `\\` escapes, not crossing a newline. The
    /// body's first character excludes a bare `*` so that `/*` is left to
    /// the block-comment pattern above (spec: "`/*` at the start would be
    /// a block comment and is excluded").
    #[regex(r"/(?:\\.|[^*/\\\n])(?:\\.|[^/\\\n])*/")]
    RegexLiteral,

    /// A `/` opened but never closed before a newline or end of input.
    #[regex(r"/(?:\\.|[^*/\\\n])(?:\\.|[^/\\\n])*")]
    UnterminatedRegexLiteral,

    Garbage,

    #[doc(hidden)]
    __Last,
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        false
    }
}

/// Zero-copy token: kind + span, text retrieved via [`token_text`] when
/// needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: Range<usize>,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }
}

/// Tokenizes source into a vector of span-based tokens, coalescing
/// consecutive lexer errors into single `Garbage` tokens.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = SyntaxKind::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(start) = error_start.take() {
                    let end = lexer.span().start;
                    tokens.push(Token::new(SyntaxKind::Garbage, start..end));
                }
                tokens.push(Token::new(kind, lexer.span()));
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token::new(SyntaxKind::Garbage, start..source.len()));
                }
                break;
            }
        }
    }

    tokens
}

/// Retrieves the text slice for a token. O(1) slice into source.
#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[token.span.clone()]
}

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod lexer_tests;
