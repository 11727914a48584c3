//! Declaration definitions for the AST

use super::*;
use std::fmt;

/// Top-level declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    /// Function declaration
    Function(FunctionDecl),

    /// Class declaration
    Class(ClassDecl),

    /// Interface declaration
    Interface(InterfaceDecl),

    /// Type alias declaration
    TypeAlias(TypeAliasDecl),

    /// Enum declaration
    Enum(EnumDecl),

    /// `namespace`, `module` or `declare global`. Only the name is kept.
    Namespace(NamespaceDecl),

    /// Variable declaration
    Var(VarDecl),
}

/// Function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Node<Ident>,
    pub type_params: Option<Vec<TypeParam>>,
    pub params: Vec<Param>,
    pub return_type: Option<Box<Node<Type>>>,
    pub body: Option<Node<BlockStmt>>,
    pub is_async: bool,
    pub is_generator: bool,
    pub is_declare: bool,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub pattern: Node<Pattern>,
    pub type_annotation: Option<Box<Node<Type>>>,
    pub optional: bool,
    pub is_rest: bool,
    /// `constructor(private x: int)` parameter properties
    pub accessibility: Option<AccessModifier>,
}

/// Class declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Node<Ident>,
    pub type_params: Option<Vec<TypeParam>>,
    pub extends: Option<ClassExtends>,
    pub implements: Vec<Node<Type>>,
    pub members: Vec<Node<ClassMember>>,
    pub is_abstract: bool,
    pub is_declare: bool,
    pub decorators: Vec<Node<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassExtends {
    pub base: Box<Node<Expr>>,
    pub type_args: Option<Vec<Node<Type>>>,
}

/// Class member
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    /// Constructor
    Constructor {
        params: Vec<Param>,
        body: Option<Node<BlockStmt>>,
        access: AccessModifier,
    },

    /// Method
    Method {
        name: PropertyName,
        params: Vec<Param>,
        return_type: Option<Box<Node<Type>>>,
        body: Option<Node<BlockStmt>>,
        access: AccessModifier,
        is_static: bool,
        is_async: bool,
        is_abstract: bool,
        is_generator: bool,
        decorators: Vec<Node<Expr>>,
    },

    /// Property/field
    Property {
        name: PropertyName,
        type_annotation: Option<Box<Node<Type>>>,
        init: Option<Node<Expr>>,
        access: AccessModifier,
        is_static: bool,
        is_readonly: bool,
        is_optional: bool,
        is_definite: bool,
        decorators: Vec<Node<Expr>>,
    },

    /// `get` or `set` accessor. GDScript 3 has no accessor syntax, so the
    /// body is parsed and dropped; the type of the accessed value is kept.
    Accessor {
        name: PropertyName,
        is_setter: bool,
        value_type: Option<Box<Node<Type>>>,
    },

    /// Index signature
    IndexSignature {
        key_name: Node<Ident>,
        key_type: Node<Type>,
        value_type: Node<Type>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessModifier {
    Public,
    Private,
    Protected,
}

/// Interface declaration
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: Node<Ident>,
    pub type_params: Option<Vec<TypeParam>>,
    pub extends: Vec<Node<Type>>,
    pub members: Vec<ObjectTypeMember>,
    pub is_declare: bool,
}

/// Type alias declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub name: Node<Ident>,
    pub type_params: Option<Vec<TypeParam>>,
    pub ty: Node<Type>,
    pub is_declare: bool,
}

/// Enum declaration
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Node<Ident>,
    pub members: Vec<EnumMember>,
    pub is_const: bool,
    pub is_declare: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: Node<Ident>,
    pub init: Option<Node<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    /// Dotted name, or the quoted module name
    pub name: String,
    pub is_declare: bool,
}

impl ClassMember {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ClassMember::Constructor { .. } => "constructor",
            ClassMember::Method { .. } => "method",
            ClassMember::Property { .. } => "property",
            ClassMember::Accessor { is_setter: false, .. } => "getter",
            ClassMember::Accessor { is_setter: true, .. } => "setter",
            ClassMember::IndexSignature { .. } => "index signature",
        }
    }
}

impl Decl {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Decl::Function(_) => "function declaration",
            Decl::Class(_) => "class declaration",
            Decl::Interface(_) => "interface declaration",
            Decl::TypeAlias(_) => "type alias",
            Decl::Enum(_) => "enum declaration",
            Decl::Namespace(_) => "namespace declaration",
            Decl::Var(_) => "variable declaration",
        }
    }
}

// Display implementations

impl fmt::Display for AccessModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessModifier::Public => write!(f, "public"),
            AccessModifier::Private => write!(f, "private"),
            AccessModifier::Protected => write!(f, "protected"),
        }
    }
}
