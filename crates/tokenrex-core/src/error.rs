/// A compile-time failure: a parse error or a semantic violation (unbound
/// variable, invalid repeat bounds, integer literal overflow, negation of a
/// multi-token pattern, a cyclic variable). The builder never partially
/// constructs a pattern — every such failure is surfaced through this single
/// taxonomy.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid pattern at byte {offset}: {message}")]
pub struct CompileError {
    /// Byte offset into the source text of the offending construct.
    pub offset: usize,
    pub message: String,
}

impl CompileError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// A match-time failure. Note that integer overflow or a non-integer value
/// during a numeric comparison is deliberately *not* represented here — it is
/// a local non-match, propagated internally rather than through this error
/// type.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    /// `start`/`end`/`group` called before `matches`/`find` has succeeded.
    #[error("no match is available")]
    NoMatch,

    /// A group id or name was requested that the pattern does not define.
    #[error("group index out of bounds")]
    OutOfBoundsGroup,

    /// The search deadline elapsed before the match (or non-match) could be
    /// determined.
    #[error("match timed out")]
    Timeout,
}
