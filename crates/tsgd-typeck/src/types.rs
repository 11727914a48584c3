//! Internal type representation

use std::fmt;
use tsgd_ast as ast;

/// Types as seen by GDScript. The source language has one `number` type;
/// here it splits into `Int` and `Float`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float,
    String,
    Bool,
    Null,
    Void,

    /// Array with a known element type
    Array(Box<Type>),

    /// Object literals and `Dictionary`
    Dictionary,

    /// Engine or script class instance, e.g. `Sprite`
    Object(String),

    /// The enum object itself; its members are `Int`
    Enum(String),

    /// Callable value with its return type
    Function(Box<Type>),

    /// Explicitly `any`
    Any,

    /// Inference gave up
    Unknown,
}

impl Type {
    pub fn is_int(&self) -> bool {
        matches!(self, Type::Int)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// `any`/unknown: nothing can be concluded statically.
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Type::Any | Type::Unknown)
    }

    /// Maps a source-level type name. `number` is a float, `int` and `float`
    /// are the engine's own numeric types.
    pub fn from_name(name: &str) -> Type {
        match name {
            "int" => Type::Int,
            "float" | "number" => Type::Float,
            "string" | "String" => Type::String,
            "boolean" | "bool" => Type::Bool,
            "void" => Type::Void,
            "null" | "undefined" => Type::Null,
            "any" => Type::Any,
            "unknown" | "never" => Type::Unknown,
            "Dictionary" | "object" | "Object" | "Record" => Type::Dictionary,
            "Array" => Type::Array(Box::new(Type::Unknown)),
            _ => Type::Object(name.to_string()),
        }
    }

    /// Converts a type annotation.
    pub fn from_annotation(ty: &ast::Node<ast::Type>) -> Type {
        match &ty.value {
            ast::Type::Primitive(primitive) => match primitive {
                ast::PrimitiveType::Number => Type::Float,
                ast::PrimitiveType::String => Type::String,
                ast::PrimitiveType::Boolean => Type::Bool,
                ast::PrimitiveType::Void => Type::Void,
                ast::PrimitiveType::Null | ast::PrimitiveType::Undefined => Type::Null,
                ast::PrimitiveType::Any => Type::Any,
                ast::PrimitiveType::Never | ast::PrimitiveType::Unknown => Type::Unknown,
            },
            ast::Type::Array(element) => Type::Array(Box::new(Type::from_annotation(element))),
            ast::Type::Tuple(_) => Type::Array(Box::new(Type::Unknown)),
            ast::Type::Union(members) => {
                // `T | null` keeps T
                let mut non_null = members
                    .iter()
                    .map(Type::from_annotation)
                    .filter(|ty| *ty != Type::Null);
                match (non_null.next(), non_null.next()) {
                    (Some(only), None) => only,
                    _ => Type::Unknown,
                }
            }
            ast::Type::Intersection(_) => Type::Unknown,
            ast::Type::Function(function) => {
                Type::Function(Box::new(Type::from_annotation(&function.return_type)))
            }
            ast::Type::TypeRef { name, type_args } => {
                let args = type_args.as_deref().unwrap_or(&[]);
                match name.value.name.as_str() {
                    "Array" => Type::Array(Box::new(
                        args.first().map(Type::from_annotation).unwrap_or(Type::Unknown),
                    )),
                    // NodeAt<"Main/Player", Sprite> carries the node type last
                    "NodeAt" => args.last().map(Type::from_annotation).unwrap_or(Type::Unknown),
                    other => Type::from_name(other),
                }
            }
            ast::Type::Object(_) => Type::Dictionary,
            ast::Type::Literal(literal) => match literal {
                ast::LiteralType::String(_) => Type::String,
                ast::LiteralType::Number(value) if value.fract() == 0.0 => Type::Int,
                ast::LiteralType::Number(_) => Type::Float,
                ast::LiteralType::Boolean(_) => Type::Bool,
            },
            ast::Type::Paren(inner) => Type::from_annotation(inner),
            ast::Type::IndexedAccess { .. } | ast::Type::Keyof(_) | ast::Type::TypeofType(_) => Type::Unknown,
        }
    }

    /// Type of a numeric literal from its source text: `3` is an int,
    /// `3.0` and `1e3` are floats.
    pub fn of_number_literal(raw: &str) -> Type {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("0x") || lower.starts_with("0o") || lower.starts_with("0b") {
            return Type::Int;
        }
        if lower.contains('.') || lower.contains('e') {
            Type::Float
        } else {
            Type::Int
        }
    }

    /// Common type of two branches.
    pub fn join(&self, other: &Type) -> Type {
        match (self, other) {
            (a, b) if a == b => a.clone(),
            (Type::Int, Type::Float) | (Type::Float, Type::Int) => Type::Float,
            (Type::Null, other) | (other, Type::Null) => other.clone(),
            _ => Type::Unknown,
        }
    }

    /// Class name for member lookups. Primitives with engine methods map to
    /// their builtin class.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Object(name) => Some(name.as_str()),
            Type::String => Some("String"),
            Type::Array(_) => Some("Array"),
            Type::Dictionary => Some("Dictionary"),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::String => write!(f, "string"),
            Type::Bool => write!(f, "boolean"),
            Type::Null => write!(f, "null"),
            Type::Void => write!(f, "void"),
            Type::Array(element) => write!(f, "{}[]", element),
            Type::Dictionary => write!(f, "Dictionary"),
            Type::Object(name) | Type::Enum(name) => write!(f, "{}", name),
            Type::Function(ret) => write!(f, "() => {}", ret),
            Type::Any => write!(f, "any"),
            Type::Unknown => write!(f, "unknown"),
        }
    }
}
