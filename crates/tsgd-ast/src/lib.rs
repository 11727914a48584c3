//! # tsgd AST
//!
//! Abstract Syntax Tree definitions for the TypeScript subset that tsgd
//! lowers to GDScript. Every syntax category is a closed enum so the
//! transpiler can match exhaustively.

use std::fmt;

// =============================================================================
// Core Types (kept in lib.rs - used by all modules)
// =============================================================================

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub file_id: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, file_id: usize) -> Self {
        Self { start, end, file_id }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            file_id: self.file_id,
        }
    }

    /// 1-based line and column of `start` within `source`.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let mut line = 1;
        let mut col = 1;
        for (i, ch) in source.char_indices() {
            if i >= self.start {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }
}

/// Per-file identity of a syntax node. The parser hands out ids in source
/// order; nodes built outside the parser carry [`NodeId::DUMMY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);

    pub fn is_dummy(self) -> bool {
        self == Self::DUMMY
    }
}

/// AST node wrapper that includes span information
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub id: NodeId,
    pub span: Span,
    pub value: T,
}

impl<T> Node<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self {
            id: NodeId::DUMMY,
            span,
            value,
        }
    }

    pub fn with_id(id: NodeId, value: T, span: Span) -> Self {
        Self { id, span, value }
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// =============================================================================
// Decorators
// =============================================================================

/// Looks up a decorator by name. `@tool` yields an empty argument list,
/// `@scene("res://main.tscn")` yields its call arguments.
pub fn find_decorator<'a>(decorators: &'a [Node<Expr>], name: &str) -> Option<&'a [Node<Expr>]> {
    decorators.iter().find_map(|decorator| match &decorator.value {
        Expr::Ident(ident) if ident.name == name => Some(&[][..]),
        Expr::Call { callee, args, .. } => match &callee.value {
            Expr::Ident(ident) if ident.name == name => Some(args.as_slice()),
            _ => None,
        },
        _ => None,
    })
}

/// First string argument of a decorator, e.g. the path in `@scene("...")`.
pub fn decorator_string_arg(decorators: &[Node<Expr>], name: &str) -> Option<String> {
    let args = find_decorator(decorators, name)?;
    match args.first().map(|arg| &arg.value) {
        Some(Expr::Literal(Literal::String(value))) => Some(value.clone()),
        _ => None,
    }
}

// =============================================================================
// Module Declarations
// =============================================================================

pub mod types;
pub mod expr;
pub mod stmt;
pub mod decl;
pub mod module;

// =============================================================================
// Re-exports
// =============================================================================

pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;
pub use module::*;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_span() -> Span {
        Span::new(0, 0, 0)
    }

    fn make_node<T>(value: T) -> Node<T> {
        Node::new(value, dummy_span())
    }

    #[test]
    fn test_basic_types() {
        assert_eq!(format!("{}", PrimitiveType::Number), "number");

        let array_type = Type::Array(Box::new(make_node(Type::Primitive(PrimitiveType::String))));
        assert!(matches!(array_type, Type::Array(_)));
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(4, 9, 1);
        let b = Span::new(2, 6, 1);
        let merged = a.merge(&b);
        assert_eq!(merged.start, 2);
        assert_eq!(merged.end, 9);
    }

    #[test]
    fn test_line_col() {
        let source = "let a = 1;\nlet b = 2;";
        assert_eq!(Span::new(0, 3, 0).line_col(source), (1, 1));
        assert_eq!(Span::new(15, 16, 0).line_col(source), (2, 5));
    }

    #[test]
    fn test_node_ids() {
        let node = make_node(Expr::This);
        assert!(node.id.is_dummy());
        let node = Node::with_id(NodeId(3), Expr::This, dummy_span());
        assert_eq!(node.id, NodeId(3));
    }

    #[test]
    fn test_find_decorator() {
        let tool = make_node(Expr::Ident(Ident::new("tool")));
        let scene = make_node(Expr::Call {
            callee: Box::new(make_node(Expr::Ident(Ident::new("scene")))),
            type_args: None,
            args: vec![make_node(Expr::Literal(Literal::String("res://main.tscn".into())))],
        });
        let decorators = vec![tool, scene];

        assert_eq!(find_decorator(&decorators, "tool").map(|a| a.len()), Some(0));
        assert_eq!(
            decorator_string_arg(&decorators, "scene").as_deref(),
            Some("res://main.tscn")
        );
        assert!(find_decorator(&decorators, "autoload").is_none());
    }

    #[test]
    fn test_operators_display() {
        assert_eq!(format!("{}", BinaryOp::StrictEq), "===");
        assert_eq!(format!("{}", UnaryOp::Not), "!");
        assert_eq!(format!("{}", AssignmentOp::AddAssign), "+=");
    }
}
