//! Folds the parsed [`crate::ast`] tree into an executable
//! `tokenrex_core::Node` tree: resolves case-sensitivity and the default
//! lookup key, downgrades trivial regexes to literals, collapses
//! single-token boolean combinators, validates repeat bounds, and
//! substitutes variables.

use indexmap::IndexMap;

use tokenrex_core::{CaseSensitivity, CompareOp, CompileError, Laziness, Node, NodeId, NodeKind, RepeatBounds, Repetition, SlotKind};

use crate::ast;
use crate::numeric::parse_signed_i32;

/// Regex metacharacters that disqualify the "downgrade to literal" fast
/// path.
const REGEX_METACHARS: &str = "\\[]^$&|{}?*.+";

fn is_plain_literal(regex_src: &str) -> bool {
    !regex_src.chars().any(|c| REGEX_METACHARS.contains(c))
}

enum Resolved {
    Ready(Node),
    Pending,
    Missing,
}

trait VariableResolver {
    fn resolve(&self, name: &str) -> Resolved;
}

struct FixedResolver<'a>(&'a IndexMap<String, Node>);

impl VariableResolver for FixedResolver<'_> {
    fn resolve(&self, name: &str) -> Resolved {
        match self.0.get(name) {
            Some(node) => Resolved::Ready(node.clone()),
            None => Resolved::Missing,
        }
    }
}

struct FixpointResolver<'a> {
    compiled: &'a IndexMap<String, Node>,
    sources: &'a IndexMap<String, String>,
}

impl VariableResolver for FixpointResolver<'_> {
    fn resolve(&self, name: &str) -> Resolved {
        if let Some(node) = self.compiled.get(name) {
            Resolved::Ready(node.clone())
        } else if self.sources.contains_key(name) {
            Resolved::Pending
        } else {
            Resolved::Missing
        }
    }
}

enum BuildError {
    Pending,
    Compile(CompileError),
}

impl From<CompileError> for BuildError {
    fn from(e: CompileError) -> Self {
        BuildError::Compile(e)
    }
}

struct Ctx<'a, R: VariableResolver> {
    default_key: &'a str,
    case: CaseSensitivity,
    resolver: &'a R,
    next_id: u32,
}

impl<R: VariableResolver> Ctx<'_, R> {
    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Deep-clones a precompiled variable's tree with brand-new node ids,
    /// so every use site of a variable gets its own capture identity: a
    /// subpattern reused via a variable receives a fresh slot in every
    /// outer pattern it appears in.
    fn reinstantiate(&mut self, node: &Node) -> Node {
        let id = self.fresh_id();
        let kind = match &node.kind {
            NodeKind::Literal { key, value, case } => NodeKind::Literal {
                key: key.clone(),
                value: value.clone(),
                case: *case,
            },
            NodeKind::Regex { key, regex } => NodeKind::Regex {
                key: key.clone(),
                regex: regex.clone(),
            },
            NodeKind::IntCompare { key, op, rhs } => NodeKind::IntCompare {
                key: key.clone(),
                op: *op,
                rhs: *rhs,
            },
            NodeKind::NullCheck { key } => NodeKind::NullCheck { key: key.clone() },
            NodeKind::Wildcard => NodeKind::Wildcard,
            NodeKind::AnchorStart => NodeKind::AnchorStart,
            NodeKind::AnchorEnd => NodeKind::AnchorEnd,
            NodeKind::Conjunction1(a, b) => NodeKind::Conjunction1(
                Box::new(self.reinstantiate(a)),
                Box::new(self.reinstantiate(b)),
            ),
            NodeKind::Disjunction1(a, b) => NodeKind::Disjunction1(
                Box::new(self.reinstantiate(a)),
                Box::new(self.reinstantiate(b)),
            ),
            NodeKind::Negation1(a) => NodeKind::Negation1(Box::new(self.reinstantiate(a))),
            NodeKind::SequenceRepeat(rep) => NodeKind::SequenceRepeat(match rep {
                Repetition::List(items) => {
                    Repetition::List(items.iter().map(|n| self.reinstantiate(n)).collect())
                }
                Repetition::Repeat {
                    body,
                    bounds,
                    laziness,
                } => Repetition::Repeat {
                    body: Box::new(self.reinstantiate(body)),
                    bounds: *bounds,
                    laziness: *laziness,
                },
            }),
            NodeKind::ConjunctionN(a, b) => NodeKind::ConjunctionN(
                Box::new(self.reinstantiate(a)),
                Box::new(self.reinstantiate(b)),
            ),
            NodeKind::DisjunctionN(a, b) => NodeKind::DisjunctionN(
                Box::new(self.reinstantiate(a)),
                Box::new(self.reinstantiate(b)),
            ),
            NodeKind::Empty => NodeKind::Empty,
        };
        let mut fresh = Node::new(id, kind);
        fresh.capture = node.capture.clone();
        fresh
    }

    /// Builds the node for `key: value` (the default key is used by a bare
    /// `token : value` and by `[value]`-less literals; an explicit key
    /// comes from a `kv` inside a token body).
    fn key_value_node(&mut self, key: &str, value: &ast::Value) -> Result<Node, BuildError> {
        let id = self.fresh_id();
        let kind = match value {
            ast::Value::Unquoted(s) | ast::Value::Quoted(s) => NodeKind::Literal {
                key: key.to_owned(),
                value: s.clone(),
                case: self.case,
            },
            ast::Value::Comma => NodeKind::Literal {
                key: key.to_owned(),
                value: ",".to_owned(),
                case: self.case,
            },
            ast::Value::Number(n) => {
                let parsed = parse_signed_i32(&n.text).ok_or_else(|| {
                    CompileError::new(n.offset, "integer literal overflows a 32-bit signed integer")
                })?;
                NodeKind::Literal {
                    key: key.to_owned(),
                    value: parsed.to_string(),
                    case: self.case,
                }
            }
            ast::Value::Regex(src) => self.build_regex_kind(key, src)?,
        };
        Ok(Node::new(id, kind))
    }

    fn build_regex_kind(&self, key: &str, src: &str) -> Result<NodeKind, BuildError> {
        if is_plain_literal(src) {
            return Ok(NodeKind::Literal {
                key: key.to_owned(),
                value: src.to_owned(),
                case: self.case,
            });
        }
        let insensitive = matches!(self.case, CaseSensitivity::Insensitive);
        let regex = regex::RegexBuilder::new(src)
            .case_insensitive(insensitive)
            .build()
            .map_err(|e| CompileError::new(0, format!("invalid regex /{src}/: {e}")))?;
        Ok(NodeKind::Regex {
            key: key.to_owned(),
            regex: std::sync::Arc::new(regex),
        })
    }

    fn build_kv(&mut self, kv: &ast::Kv) -> Result<Node, BuildError> {
        match kv {
            ast::Kv::Eq { key, value } => self.key_value_node(key, value),
            ast::Kv::Cmp { key, op, rhs } => {
                let parsed = parse_signed_i32(&rhs.text).ok_or_else(|| {
                    CompileError::new(rhs.offset, "integer literal overflows a 32-bit signed integer")
                })?;
                let id = self.fresh_id();
                Ok(Node::new(
                    id,
                    NodeKind::IntCompare {
                        key: key.clone(),
                        op: translate_op(*op),
                        rhs: parsed,
                    },
                ))
            }
            ast::Kv::NullCheck { key } => {
                let id = self.fresh_id();
                Ok(Node::new(id, NodeKind::NullCheck { key: key.clone() }))
            }
        }
    }

    fn build_token_body_atom(&mut self, atom: &ast::TokenBodyAtom) -> Result<Node, BuildError> {
        match &atom.kind {
            ast::TokenBodyAtomKind::Kv(kv) => self.build_kv(kv),
            ast::TokenBodyAtomKind::Paren(body) => self.build_token_body(body),
            ast::TokenBodyAtomKind::Not(inner) => {
                let inner_node = self.build_token_body_atom(inner)?;
                if inner_node.fixed_len().is_none() {
                    return Err(CompileError::new(
                        atom.offset,
                        "negation only applies to a single-token pattern",
                    )
                    .into());
                }
                let id = self.fresh_id();
                Ok(Node::new(id, NodeKind::Negation1(Box::new(inner_node))))
            }
        }
    }

    fn build_token_body(&mut self, body: &ast::TokenBody) -> Result<Node, BuildError> {
        match body {
            ast::TokenBody::Atom(atom) => self.build_token_body_atom(atom),
            ast::TokenBody::And(lhs, rhs) => {
                let left = self.build_token_body(lhs)?;
                let right = self.build_token_body_atom(rhs)?;
                self.combine_conjunction(left, right)
            }
            ast::TokenBody::Or(lhs, rhs) => {
                let left = self.build_token_body(lhs)?;
                let right = self.build_token_body_atom(rhs)?;
                self.combine_disjunction(left, right)
            }
        }
    }

    fn combine_conjunction(&mut self, left: Node, right: Node) -> Result<Node, BuildError> {
        let id = self.fresh_id();
        let kind = if left.fixed_len().is_some() && left.fixed_len() == right.fixed_len() {
            NodeKind::Conjunction1(Box::new(left), Box::new(right))
        } else {
            NodeKind::ConjunctionN(Box::new(left), Box::new(right))
        };
        Ok(Node::new(id, kind))
    }

    fn combine_disjunction(&mut self, left: Node, right: Node) -> Result<Node, BuildError> {
        let id = self.fresh_id();
        let kind = if left.fixed_len().is_some() && left.fixed_len() == right.fixed_len() {
            NodeKind::Disjunction1(Box::new(left), Box::new(right))
        } else {
            NodeKind::DisjunctionN(Box::new(left), Box::new(right))
        };
        Ok(Node::new(id, kind))
    }

    fn build_token(&mut self, token: &ast::Token) -> Result<Node, BuildError> {
        match token {
            ast::Token::Value(v) => {
                let key = self.default_key.to_owned();
                self.key_value_node(&key, v)
            }
            ast::Token::Body(body) => self.build_token_body(body),
            ast::Token::Wildcard => {
                let id = self.fresh_id();
                Ok(Node::new(id, NodeKind::Wildcard))
            }
            ast::Token::AnchorStart => {
                let id = self.fresh_id();
                Ok(Node::new(id, NodeKind::AnchorStart))
            }
            ast::Token::AnchorEnd => {
                let id = self.fresh_id();
                Ok(Node::new(id, NodeKind::AnchorEnd))
            }
        }
    }

    fn repeat_bounds(&self, spec: &ast::RepeatSpec, offset: usize) -> Result<RepeatBounds, BuildError> {
        let to_u32 = |lit: &ast::NumberLit| -> Result<u32, BuildError> {
            let parsed = parse_signed_i32(&lit.text).ok_or_else(|| {
                CompileError::new(lit.offset, "integer literal overflows a 32-bit signed integer")
            })?;
            if parsed < 0 {
                return Err(CompileError::new(lit.offset, "repeat bound must not be negative").into());
            }
            Ok(parsed as u32)
        };
        Ok(match spec {
            ast::RepeatSpec::Exact(n) => RepeatBounds::exact(to_u32(n)?),
            ast::RepeatSpec::AtLeast(n) => RepeatBounds::at_least(to_u32(n)?),
            ast::RepeatSpec::Range(n, m) => {
                let (min, max) = (to_u32(n)?, to_u32(m)?);
                if min > max {
                    return Err(CompileError::new(offset, "repeat minimum exceeds maximum").into());
                }
                RepeatBounds::new(min, max)
            }
            ast::RepeatSpec::Star => RepeatBounds::new(0, RepeatBounds::UNBOUNDED),
            ast::RepeatSpec::Plus => RepeatBounds::new(1, RepeatBounds::UNBOUNDED),
            ast::RepeatSpec::Opt => RepeatBounds::new(0, 1),
        })
    }

    fn build_atom(&mut self, atom: &ast::Atom) -> Result<Node, BuildError> {
        match &atom.kind {
            ast::AtomKind::Token(token) => self.build_token(token),
            ast::AtomKind::Paren { capture, inner } => {
                let mut node = self.build_pattern(inner)?;
                node.capture = Some(match capture {
                    ast::CaptureMarker::Anonymous => SlotKind::Anonymous,
                    ast::CaptureMarker::Named(name) => SlotKind::Named(name.clone()),
                });
                Ok(node)
            }
            ast::AtomKind::Repeat {
                body,
                spec,
                reluctant,
            } => {
                let body_node = self.build_atom(body)?;
                let bounds = self.repeat_bounds(spec, atom.offset)?;
                let laziness = if *reluctant {
                    Laziness::Reluctant
                } else {
                    Laziness::Greedy
                };
                let id = self.fresh_id();
                Ok(Node::new(
                    id,
                    NodeKind::SequenceRepeat(Repetition::Repeat {
                        body: Box::new(body_node),
                        bounds,
                        laziness,
                    }),
                ))
            }
            ast::AtomKind::Variable(name) => match self.resolver.resolve(name) {
                Resolved::Ready(node) => Ok(self.reinstantiate(&node)),
                Resolved::Pending => Err(BuildError::Pending),
                Resolved::Missing => {
                    Err(CompileError::new(atom.offset, format!("unbound variable '${name}'")).into())
                }
            },
        }
    }

    fn build_concat(&mut self, atoms: &[ast::Atom]) -> Result<Node, BuildError> {
        if atoms.len() == 1 {
            return self.build_atom(&atoms[0]);
        }
        let nodes = atoms
            .iter()
            .map(|a| self.build_atom(a))
            .collect::<Result<Vec<_>, _>>()?;
        let id = self.fresh_id();
        Ok(Node::new(id, NodeKind::SequenceRepeat(Repetition::List(nodes))))
    }

    fn build_pattern(&mut self, pattern: &ast::Pattern) -> Result<Node, BuildError> {
        match pattern {
            ast::Pattern::Concat(atoms) => self.build_concat(atoms),
            ast::Pattern::And(atoms, rest) => {
                let left = self.build_concat(atoms)?;
                let right = self.build_pattern(rest)?;
                self.combine_conjunction(left, right)
            }
            ast::Pattern::Or(atoms, rest) => {
                let left = self.build_concat(atoms)?;
                let right = self.build_pattern(rest)?;
                self.combine_disjunction(left, right)
            }
        }
    }
}

fn translate_op(op: ast::NumericOp) -> CompareOp {
    match op {
        ast::NumericOp::Lt => CompareOp::Lt,
        ast::NumericOp::Le => CompareOp::Le,
        ast::NumericOp::Gt => CompareOp::Gt,
        ast::NumericOp::Ge => CompareOp::Ge,
        ast::NumericOp::Eq => CompareOp::Eq,
        ast::NumericOp::Ne => CompareOp::Ne,
    }
}

/// Builds a single pattern, given a fully-resolved variable map.
pub fn build(
    ast: &ast::Pattern,
    default_key: &str,
    case: CaseSensitivity,
    variables: &IndexMap<String, Node>,
) -> Result<Node, CompileError> {
    let resolver = FixedResolver(variables);
    let mut ctx = Ctx {
        default_key,
        case,
        resolver: &resolver,
        next_id: 0,
    };
    match ctx.build_pattern(ast) {
        Ok(node) => Ok(node),
        Err(BuildError::Compile(e)) => Err(e),
        Err(BuildError::Pending) => {
            unreachable!("FixedResolver never reports Pending")
        }
    }
}

/// Compiles a `name -> source` map to a `name -> Node` map via fixpoint
/// iteration: in each pass, attempt every not-yet-compiled entry against
/// the already-compiled set; stop when a pass makes no progress. A
/// non-empty remaining fringe is either a cyclic reference or an
/// unresolved external one.
pub fn build_variables(
    sources: &IndexMap<String, String>,
    default_key: &str,
    case: CaseSensitivity,
) -> Result<IndexMap<String, Node>, CompileError> {
    let mut compiled: IndexMap<String, Node> = IndexMap::new();
    let mut pending: Vec<String> = sources.keys().cloned().collect();

    loop {
        let mut made_progress = false;
        let mut still_pending = Vec::new();
        let mut first_hard_error: Option<CompileError> = None;

        for name in pending {
            let source = &sources[&name];
            let ast = match crate::parser::parse(source) {
                Ok(ast) => ast,
                Err(e) => {
                    first_hard_error.get_or_insert(e);
                    still_pending.push(name);
                    continue;
                }
            };
            let resolver = FixpointResolver {
                compiled: &compiled,
                sources,
            };
            let mut ctx = Ctx {
                default_key,
                case,
                resolver: &resolver,
                next_id: 0,
            };
            match ctx.build_pattern(&ast) {
                Ok(node) => {
                    compiled.insert(name, node);
                    made_progress = true;
                }
                Err(BuildError::Pending) => still_pending.push(name),
                Err(BuildError::Compile(e)) => {
                    first_hard_error.get_or_insert(e);
                    still_pending.push(name);
                }
            }
        }

        if still_pending.is_empty() {
            return Ok(compiled);
        }
        if !made_progress {
            return Err(first_hard_error.unwrap_or_else(|| {
                CompileError::new(0, "cyclic or unresolved variable reference")
            }));
        }
        pending = still_pending;
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod build_tests;
