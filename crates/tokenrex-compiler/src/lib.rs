//! Lexer, parser, and pattern-tree builder: turns pattern source text into
//! the `tokenrex_core::Node` tree the engine interprets.

mod ast;
mod build;
mod lexer;
mod numeric;
mod parser;

use indexmap::IndexMap;
use tracing::debug_span;

pub use tokenrex_core::{CaseSensitivity, CompileError, Node, NodeId, NodeKind};

/// `compile(source, caseSensitive, defaultKey, variables) -> Pattern`.
/// `variables` must already be compiled, e.g. via [`compile_variables`].
pub fn compile(
    source: &str,
    case: CaseSensitivity,
    default_key: &str,
    variables: &IndexMap<String, Node>,
) -> Result<Node, CompileError> {
    let _span = debug_span!(
        "compile",
        source_len = source.len(),
        case_sensitive = case == CaseSensitivity::Sensitive,
    )
    .entered();

    let non_trivial = lexer::lex(source)
        .into_iter()
        .any(|t| t.kind != lexer::SyntaxKind::Garbage);
    if !non_trivial {
        // The Empty node exists only for the empty pattern source `""`,
        // which the grammar itself cannot produce (it requires at least
        // one atom) — handled here instead.
        return Ok(Node::new(NodeId::new(0), NodeKind::Empty));
    }

    let ast = parser::parse(source)?;
    build::build(&ast, default_key, case, variables)
}

/// `compileVariables(name -> source, caseSensitive, defaultKey) -> (name -> Pattern)`.
pub fn compile_variables(
    sources: &IndexMap<String, String>,
    case: CaseSensitivity,
    default_key: &str,
) -> Result<IndexMap<String, Node>, CompileError> {
    // A leading `$` on a key is stripped.
    let stripped: IndexMap<String, String> = sources
        .iter()
        .map(|(k, v)| (k.strip_prefix('$').unwrap_or(k).to_owned(), v.clone()))
        .collect();
    build::build_variables(&stripped, default_key, case)
}
