//! Statement definitions for the AST

use super::*;
use std::fmt;

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression statement
    Expr(Node<Expr>),

    /// Variable declaration: let/const/var name: Type = value
    VarDecl(VarDecl),

    /// Declaration nested in a block (function, class, enum, ...)
    Decl(Box<Node<Decl>>),

    /// Return statement
    Return(Option<Node<Expr>>),

    /// If statement
    If {
        condition: Node<Expr>,
        then_stmt: Box<Node<Stmt>>,
        else_stmt: Option<Box<Node<Stmt>>>,
    },

    /// For statement
    For {
        init: Option<ForInit>,
        condition: Option<Node<Expr>>,
        update: Option<Node<Expr>>,
        body: Box<Node<Stmt>>,
    },

    /// For-in statement: for (left in right) body
    ForIn {
        left: ForInLeft,
        right: Node<Expr>,
        body: Box<Node<Stmt>>,
    },

    /// For-of statement: for (left of right) body
    ForOf {
        left: ForInLeft,
        right: Node<Expr>,
        body: Box<Node<Stmt>>,
    },

    /// While statement
    While {
        condition: Node<Expr>,
        body: Box<Node<Stmt>>,
    },

    /// Do-while statement
    DoWhile {
        body: Box<Node<Stmt>>,
        condition: Node<Expr>,
    },

    /// Block statement: { stmts }
    Block(BlockStmt),

    /// Break statement
    Break(Option<Node<Ident>>),

    /// Continue statement
    Continue(Option<Node<Ident>>),

    /// Switch statement
    Switch {
        discriminant: Node<Expr>,
        cases: Vec<SwitchCase>,
    },

    /// Empty statement: ;
    Empty,

    /// Debugger statement
    Debugger,

    /// Statement with no GDScript counterpart (`throw`, `try`, labels),
    /// parsed in full and kept only by kind
    Unsupported(&'static str),
}

/// Block statement
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub stmts: Vec<Node<Stmt>>,
}

/// Variable declaration
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarDeclKind,
    pub declarations: Vec<VarDeclarator>,
    pub is_declare: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarDeclKind {
    Let,
    Const,
    Var,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub pattern: Node<Pattern>,
    pub init: Option<Node<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    VarDecl(VarDecl),
    Expr(Node<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInLeft {
    VarDecl(VarDecl),
    Pattern(Node<Pattern>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub test: Option<Node<Expr>>,
    pub consequent: Vec<Node<Stmt>>,
}

/// Pattern for destructuring
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Identifier pattern
    Ident {
        name: Node<Ident>,
        type_annotation: Option<Box<Node<Type>>>,
    },

    /// Array pattern: [a, b, ...rest]
    Array {
        elements: Vec<Option<Node<Pattern>>>,
        rest: Option<Box<Node<Pattern>>>,
        type_annotation: Option<Box<Node<Type>>>,
    },

    /// Object pattern: { a, b: c, ...rest }
    Object {
        properties: Vec<ObjectPatternProperty>,
        rest: Option<Box<Node<Pattern>>>,
        type_annotation: Option<Box<Node<Type>>>,
    },

    /// Assignment pattern: pattern = default_value
    Assignment {
        pattern: Box<Node<Pattern>>,
        default: Box<Node<Expr>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPatternProperty {
    pub key: PropertyName,
    pub value: Node<Pattern>,
    pub shorthand: bool,
}

impl Pattern {
    /// Type annotation attached directly to the pattern, if any.
    pub fn type_annotation(&self) -> Option<&Node<Type>> {
        match self {
            Pattern::Ident { type_annotation, .. }
            | Pattern::Array { type_annotation, .. }
            | Pattern::Object { type_annotation, .. } => type_annotation.as_deref(),
            Pattern::Assignment { pattern, .. } => pattern.value.type_annotation(),
        }
    }

    /// Name bound by a plain identifier pattern.
    pub fn ident_name(&self) -> Option<&str> {
        match self {
            Pattern::Ident { name, .. } => Some(name.value.name.as_str()),
            Pattern::Assignment { pattern, .. } => pattern.value.ident_name(),
            _ => None,
        }
    }

    /// Every identifier this pattern binds, in source order.
    pub fn bound_names(&self) -> Vec<&Node<Ident>> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a Node<Ident>>) {
        match self {
            Pattern::Ident { name, .. } => out.push(name),
            Pattern::Array { elements, rest, .. } => {
                for element in elements.iter().flatten() {
                    element.value.collect_names(out);
                }
                if let Some(rest) = rest {
                    rest.value.collect_names(out);
                }
            }
            Pattern::Object { properties, rest, .. } => {
                for property in properties {
                    property.value.value.collect_names(out);
                }
                if let Some(rest) = rest {
                    rest.value.collect_names(out);
                }
            }
            Pattern::Assignment { pattern, .. } => pattern.value.collect_names(out),
        }
    }
}

impl Stmt {
    /// Human-readable name of the statement kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Expr(_) => "expression statement",
            Stmt::VarDecl(_) => "variable declaration",
            Stmt::Decl(_) => "declaration",
            Stmt::Return(_) => "return statement",
            Stmt::If { .. } => "if statement",
            Stmt::For { .. } => "for statement",
            Stmt::ForIn { .. } => "for-in statement",
            Stmt::ForOf { .. } => "for-of statement",
            Stmt::While { .. } => "while statement",
            Stmt::DoWhile { .. } => "do-while statement",
            Stmt::Block(_) => "block",
            Stmt::Break(_) => "break statement",
            Stmt::Continue(_) => "continue statement",
            Stmt::Switch { .. } => "switch statement",
            Stmt::Empty => "empty statement",
            Stmt::Debugger => "debugger statement",
            Stmt::Unsupported(kind) => *kind,
        }
    }
}

// Display implementations

impl fmt::Display for VarDeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarDeclKind::Let => write!(f, "let"),
            VarDeclKind::Const => write!(f, "const"),
            VarDeclKind::Var => write!(f, "var"),
        }
    }
}
