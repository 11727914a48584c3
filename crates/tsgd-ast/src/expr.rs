//! Expression definitions for the AST

use super::*;
use std::fmt;

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal values
    Literal(Literal),

    /// Identifier
    Ident(Ident),

    /// Binary operation: left op right
    Binary {
        left: Box<Node<Expr>>,
        op: BinaryOp,
        right: Box<Node<Expr>>,
    },

    /// Unary operation: op expr (prefix and postfix update included)
    Unary {
        op: UnaryOp,
        expr: Box<Node<Expr>>,
    },

    /// Assignment: target = value
    Assignment {
        target: Box<Node<Expr>>,
        op: AssignmentOp,
        value: Box<Node<Expr>>,
    },

    /// Function call: callee(args)
    Call {
        callee: Box<Node<Expr>>,
        type_args: Option<Vec<Node<Type>>>,
        args: Vec<Node<Expr>>,
    },

    /// Member access: object.property
    Member {
        object: Box<Node<Expr>>,
        property: Node<Ident>,
    },

    /// Index access: object[index]
    Index {
        object: Box<Node<Expr>>,
        index: Box<Node<Expr>>,
    },

    /// Array literal: [elem1, elem2, ...]
    Array(Vec<Option<Node<Expr>>>),

    /// Object literal: { key1: value1, key2: value2 }
    Object(Vec<ObjectProperty>),

    /// Arrow function: (params) => body
    Arrow {
        params: Vec<Param>,
        return_type: Option<Box<Node<Type>>>,
        body: ArrowBody,
        is_async: bool,
    },

    /// Function expression: function name?(params) { body }
    Function {
        name: Option<Node<Ident>>,
        params: Vec<Param>,
        return_type: Option<Box<Node<Type>>>,
        body: Box<Node<BlockStmt>>,
        is_async: bool,
        is_generator: bool,
    },

    /// Ternary/conditional: condition ? then_expr : else_expr
    Ternary {
        condition: Box<Node<Expr>>,
        then_expr: Box<Node<Expr>>,
        else_expr: Box<Node<Expr>>,
    },

    /// Template literal: `hello ${expr}`. `quasis` always has one more
    /// entry than `exprs`.
    Template {
        quasis: Vec<String>,
        exprs: Vec<Node<Expr>>,
    },

    /// Tagged template literal: tag`template`
    TaggedTemplate {
        tag: Box<Node<Expr>>,
        quasis: Vec<String>,
        exprs: Vec<Node<Expr>>,
    },

    /// New expression: new Constructor(args)
    New {
        callee: Box<Node<Expr>>,
        type_args: Option<Vec<Node<Type>>>,
        args: Vec<Node<Expr>>,
    },

    /// Type cast: expr as Type
    TypeCast {
        expr: Box<Node<Expr>>,
        ty: Box<Node<Type>>,
    },

    /// Satisfies expression: expr satisfies Type
    Satisfies {
        expr: Box<Node<Expr>>,
        ty: Box<Node<Type>>,
    },

    /// Non-null assertion: expr!
    NonNullAssertion(Box<Node<Expr>>),

    /// Await expression: await expr
    Await(Box<Node<Expr>>),

    /// Yield expression: yield expr, yield* expr
    Yield {
        argument: Option<Box<Node<Expr>>>,
        delegate: bool,
    },

    /// Parenthesized expression
    Paren(Box<Node<Expr>>),

    /// This expression
    This,

    /// Super expression
    Super,

    /// Sequence expression: expr1, expr2, ...
    Sequence(Vec<Node<Expr>>),

    /// Spread expression: ...expr (in call args, array literals)
    Spread(Box<Node<Expr>>),

    /// Optional chaining member: expr?.prop
    OptionalMember {
        object: Box<Node<Expr>>,
        property: Node<Ident>,
    },

    /// Optional chaining call: expr?.(args)
    OptionalCall {
        callee: Box<Node<Expr>>,
        args: Vec<Node<Expr>>,
    },

    /// Optional chaining index: expr?.[index]
    OptionalIndex {
        object: Box<Node<Expr>>,
        index: Box<Node<Expr>>,
    },
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Numeric literal. `raw` keeps the source spelling so `5` and `5.0`
    /// can be told apart.
    Number { value: f64, raw: String },
    String(String),
    Boolean(bool),
    Null,
    Undefined,
    RegExp { pattern: String, flags: String },
}

impl Literal {
    pub fn number(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = parse_number(&raw);
        Literal::Number { value, raw }
    }
}

/// Parses a numeric literal spelling, including `0x`, `0o` and `0b` prefixes.
pub fn parse_number(raw: &str) -> f64 {
    let radix_value = |digits: &str, radix: u32| {
        i64::from_str_radix(digits, radix).map(|v| v as f64).unwrap_or(0.0)
    };
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        radix_value(hex, 16)
    } else if let Some(oct) = raw.strip_prefix("0o").or_else(|| raw.strip_prefix("0O")) {
        radix_value(oct, 8)
    } else if let Some(bin) = raw.strip_prefix("0b").or_else(|| raw.strip_prefix("0B")) {
        radix_value(bin, 2)
    } else {
        raw.parse::<f64>().unwrap_or(0.0)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // Comparison
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,
    NullishCoalesce,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    UnsignedRightShift,

    // Other
    In,
    InstanceOf,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::StrictEq
                | BinaryOp::StrictNotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::In
                | BinaryOp::InstanceOf
        )
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    TypeOf,
    Void,
    Delete,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub fn is_update(self) -> bool {
        matches!(
            self,
            UnaryOp::PreIncrement | UnaryOp::PreDecrement | UnaryOp::PostIncrement | UnaryOp::PostDecrement
        )
    }
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    PowAssign,
    LeftShiftAssign,
    RightShiftAssign,
    UnsignedRightShiftAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    AndAssign,
    OrAssign,
    NullishAssign,
}

/// Arrow function body
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expr(Box<Node<Expr>>),
    Block(Box<Node<BlockStmt>>),
}

/// Object property
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectProperty {
    Property {
        key: PropertyName,
        value: Node<Expr>,
        shorthand: bool,
    },
    Method {
        key: PropertyName,
        params: Vec<Param>,
        return_type: Option<Box<Node<Type>>>,
        body: Node<BlockStmt>,
    },
    Spread(Node<Expr>),
}

/// Property name
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyName {
    Ident(Node<Ident>),
    String(String),
    Number(f64),
    Computed(Box<Node<Expr>>),
}

impl PropertyName {
    /// Static spelling of the key, if it has one.
    pub fn as_static(&self) -> Option<String> {
        match self {
            PropertyName::Ident(ident) => Some(ident.value.name.clone()),
            PropertyName::String(s) => Some(s.clone()),
            PropertyName::Number(n) => Some(format!("{}", n)),
            PropertyName::Computed(_) => None,
        }
    }
}

impl Expr {
    /// Human-readable name of the expression kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Literal(Literal::RegExp { .. }) => "regular expression",
            Expr::Literal(_) => "literal",
            Expr::Ident(_) => "identifier",
            Expr::Binary { .. } => "binary expression",
            Expr::Unary { .. } => "unary expression",
            Expr::Assignment { .. } => "assignment",
            Expr::Call { .. } => "call",
            Expr::Member { .. } => "member access",
            Expr::Index { .. } => "element access",
            Expr::Array(_) => "array literal",
            Expr::Object(_) => "object literal",
            Expr::Arrow { .. } => "arrow function",
            Expr::Function { .. } => "function expression",
            Expr::Ternary { .. } => "conditional expression",
            Expr::Template { .. } => "template literal",
            Expr::TaggedTemplate { .. } => "tagged template",
            Expr::New { .. } => "new expression",
            Expr::TypeCast { .. } => "type assertion",
            Expr::Satisfies { .. } => "satisfies expression",
            Expr::NonNullAssertion(_) => "non-null assertion",
            Expr::Await(_) => "await expression",
            Expr::Yield { .. } => "yield expression",
            Expr::Paren(_) => "parenthesized expression",
            Expr::This => "this",
            Expr::Super => "super",
            Expr::Sequence(_) => "comma expression",
            Expr::Spread(_) => "spread element",
            Expr::OptionalMember { .. } | Expr::OptionalCall { .. } | Expr::OptionalIndex { .. } => {
                "optional chaining"
            }
        }
    }

    /// Strips parentheses and type-only wrappers (`as`, `!`, `satisfies`).
    pub fn unwrap_transparent(node: &Node<Expr>) -> &Node<Expr> {
        match &node.value {
            Expr::Paren(inner)
            | Expr::TypeCast { expr: inner, .. }
            | Expr::Satisfies { expr: inner, .. }
            | Expr::NonNullAssertion(inner) => Expr::unwrap_transparent(inner),
            _ => node,
        }
    }
}

// Display implementations

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::NullishCoalesce => "??",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::UnsignedRightShift => ">>>",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for AssignmentOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignmentOp::Assign => "=",
            AssignmentOp::AddAssign => "+=",
            AssignmentOp::SubAssign => "-=",
            AssignmentOp::MulAssign => "*=",
            AssignmentOp::DivAssign => "/=",
            AssignmentOp::ModAssign => "%=",
            AssignmentOp::PowAssign => "**=",
            AssignmentOp::LeftShiftAssign => "<<=",
            AssignmentOp::RightShiftAssign => ">>=",
            AssignmentOp::UnsignedRightShiftAssign => ">>>=",
            AssignmentOp::BitAndAssign => "&=",
            AssignmentOp::BitOrAssign => "|=",
            AssignmentOp::BitXorAssign => "^=",
            AssignmentOp::AndAssign => "&&=",
            AssignmentOp::OrAssign => "||=",
            AssignmentOp::NullishAssign => "??=",
        };
        write!(f, "{}", s)
    }
}
