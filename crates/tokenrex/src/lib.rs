//! A regular-expression engine whose alphabet is structured `key -> value?`
//! tokens instead of characters.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use indexmap::IndexMap;
//! use tokenrex::{CaseSensitivity, Pattern};
//!
//! let variables = IndexMap::new();
//! let pattern = Pattern::compile("hello [world]", CaseSensitivity::Sensitive, "text", &variables)
//!     .expect("valid pattern");
//!
//! let input: Vec<HashMap<String, String>> = vec![
//!     HashMap::from([("text".to_owned(), "hello".to_owned())]),
//!     HashMap::from([("text".to_owned(), "world".to_owned())]),
//! ];
//! let mut matcher = pattern.matcher(&input[..]);
//! assert!(matcher.matches(None).unwrap());
//! ```

use indexmap::IndexMap;

pub use tokenrex_core::{
    CaptureGroup, CaseSensitivity, CompileError, MatchError, Node, NodeId, NodeKind, SlotId,
};
pub use tokenrex_engine::{Matcher, Tokens};

/// A compiled pattern, ready to build [`Matcher`]s against any number of
/// input sequences.
#[derive(Clone, Debug)]
pub struct Pattern(Node);

impl Pattern {
    /// `compile(source, caseSensitive, defaultKey, variables) -> Pattern`.
    /// `variables` must already be compiled, typically via
    /// [`Pattern::compile_variables`].
    pub fn compile(
        source: &str,
        case: CaseSensitivity,
        default_key: &str,
        variables: &IndexMap<String, Node>,
    ) -> Result<Self, CompileError> {
        tokenrex_compiler::compile(source, case, default_key, variables).map(Pattern)
    }

    /// `compileVariables(name -> source, caseSensitive, defaultKey) -> (name -> Pattern)`.
    pub fn compile_variables(
        sources: &IndexMap<String, String>,
        case: CaseSensitivity,
        default_key: &str,
    ) -> Result<IndexMap<String, Node>, CompileError> {
        tokenrex_compiler::compile_variables(sources, case, default_key)
    }

    /// The underlying pattern tree, for callers that build their own
    /// variable tables out of sub-patterns.
    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn matcher<'p, 'i>(&'p self, input: &'i dyn Tokens) -> Matcher<'p, 'i> {
        Matcher::new(&self.0, input)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", tokenrex_engine::Pretty(&self.0))
    }
}

impl From<Node> for Pattern {
    fn from(node: Node) -> Self {
        Pattern(node)
    }
}
