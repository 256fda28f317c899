//! Concrete syntax tree produced by the parser (§6 grammar). Variables are
//! still unresolved names here and capture slots are markers only — both
//! get resolved by [`crate::build`] when the tree is folded into
//! `tokenrex_core::Node`s.

/// `pattern : atom+ | atom+ '&' pattern | atom+ '|' pattern`
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Concat(Vec<Atom>),
    And(Vec<Atom>, Box<Pattern>),
    Or(Vec<Atom>, Box<Pattern>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub offset: usize,
    pub kind: AtomKind,
}

/// `atom : token | parenthetical | atom repeat | Variable`
#[derive(Debug, Clone, PartialEq)]
pub enum AtomKind {
    Token(Token),
    Paren {
        capture: CaptureMarker,
        inner: Box<Pattern>,
    },
    Repeat {
        body: Box<Atom>,
        spec: RepeatSpec,
        reluctant: bool,
    },
    Variable(String),
}

/// `parenthetical`'s capture form: `(pattern)`, `(?<name> pattern)`, or the
/// legacy `(?$name pattern)`.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureMarker {
    Anonymous,
    Named(String),
}

/// A parsed `atom '{' ... '}' '?'?` / `'*' '?'?` / `'+' '?'?` / `'?' '?'?`
/// suffix, before bounds validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RepeatSpec {
    Exact(NumberLit),
    AtLeast(NumberLit),
    Range(NumberLit, NumberLit),
    Star,
    Plus,
    Opt,
}

/// `token : value | '[' token_body ']' | '[' ']' | '^' | '$'`
///
/// The grammar's fourth `token` alternative, `(':' | numeric_op | '!')+`, is
/// a bracket-free bare `kv` with no concrete scenario exercising it and no
/// way to distinguish it from garbage input; it is treated as unreachable
/// and not implemented (see DESIGN.md).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Value(Value),
    Body(TokenBody),
    Wildcard,
    AnchorStart,
    AnchorEnd,
}

/// `token_body : token_body_atom | token_body '&' token_body_atom | token_body '|' token_body_atom`
#[derive(Debug, Clone, PartialEq)]
pub enum TokenBody {
    Atom(TokenBodyAtom),
    And(Box<TokenBody>, Box<TokenBodyAtom>),
    Or(Box<TokenBody>, Box<TokenBodyAtom>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenBodyAtom {
    pub offset: usize,
    pub kind: TokenBodyAtomKind,
}

/// `token_body_atom : key_value_pair | '(' token_body ')' | '!' token_body_atom`
#[derive(Debug, Clone, PartialEq)]
pub enum TokenBodyAtomKind {
    Kv(Kv),
    Paren(Box<TokenBody>),
    Not(Box<TokenBodyAtom>),
}

/// `kv : Unquoted ':' value | Unquoted numeric_op Number | '!' Unquoted`
#[derive(Debug, Clone, PartialEq)]
pub enum Kv {
    Eq { key: String, value: Value },
    Cmp { key: String, op: NumericOp, rhs: NumberLit },
    NullCheck { key: String },
}

/// `value : Unquoted | Quoted | Regex | Number | ','`
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unquoted(String),
    Quoted(String),
    Regex(String),
    Number(NumberLit),
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberLit {
    pub text: String,
    pub offset: usize,
}

/// `numeric_op : ('>'|'<'|'=') '='? | '!' '='`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}
