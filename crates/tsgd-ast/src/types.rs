//! Type annotation definitions for the AST

use super::*;
use std::fmt;

/// Type expression
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Primitive types: number, string, boolean, void, null, undefined, any, never, unknown
    Primitive(PrimitiveType),

    /// Array type: T[]
    Array(Box<Node<Type>>),

    /// Tuple type: [T1, T2, ...]
    Tuple(Vec<Node<Type>>),

    /// Union type: T1 | T2 | ...
    Union(Vec<Node<Type>>),

    /// Intersection type: T1 & T2 & ...
    Intersection(Vec<Node<Type>>),

    /// Function type: (args) => ReturnType
    Function(FunctionType),

    /// Type reference: `Sprite`, `Array<int>`, `Foo.Bar`
    TypeRef {
        name: Node<Ident>,
        type_args: Option<Vec<Node<Type>>>,
    },

    /// Object type: { prop1: Type1, prop2: Type2 }
    Object(ObjectType),

    /// Literal type: "hello" | 42 | true
    Literal(LiteralType),

    /// Parenthesized type
    Paren(Box<Node<Type>>),

    /// Indexed access type: T[K]
    IndexedAccess {
        object_type: Box<Node<Type>>,
        index_type: Box<Node<Type>>,
    },

    /// keyof type: keyof T
    Keyof(Box<Node<Type>>),

    /// typeof type: typeof expr
    TypeofType(Node<Ident>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Number,
    String,
    Boolean,
    Void,
    Null,
    Undefined,
    Any,
    Never,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub params: Vec<Param>,
    pub return_type: Box<Node<Type>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub members: Vec<ObjectTypeMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectTypeMember {
    Property {
        name: PropertyName,
        ty: Option<Node<Type>>,
        optional: bool,
        readonly: bool,
    },
    Method {
        name: PropertyName,
        params: Vec<Param>,
        return_type: Option<Node<Type>>,
        optional: bool,
    },
    IndexSignature {
        key_name: Node<Ident>,
        key_type: Node<Type>,
        value_type: Node<Type>,
    },
    CallSignature {
        params: Vec<Param>,
        return_type: Option<Node<Type>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    String(String),
    Number(f64),
    Boolean(bool),
}

/// Generic type parameter: `T extends Node = Node`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: Node<Ident>,
    pub constraint: Option<Box<Node<Type>>>,
    pub default: Option<Box<Node<Type>>>,
}

impl Type {
    /// Name of a plain type reference, e.g. `int` or `Sprite`.
    pub fn ref_name(&self) -> Option<&str> {
        match self {
            Type::TypeRef { name, .. } => Some(name.value.name.as_str()),
            Type::Paren(inner) => inner.value.ref_name(),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveType::Number => "number",
            PrimitiveType::String => "string",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Void => "void",
            PrimitiveType::Null => "null",
            PrimitiveType::Undefined => "undefined",
            PrimitiveType::Any => "any",
            PrimitiveType::Never => "never",
            PrimitiveType::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
