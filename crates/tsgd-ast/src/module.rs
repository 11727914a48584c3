//! Module system definitions for the AST

use super::*;

/// Module item (top-level in a module)
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleItem {
    /// Import declaration
    Import(ImportDecl),

    /// Export declaration
    Export(ExportDecl),

    /// Statement
    Stmt(Node<Stmt>),

    /// Declaration
    Decl(Node<Decl>),
}

/// Import declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: String,
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// import name from "module"
    Default(Node<Ident>),

    /// import * as name from "module"
    Namespace(Node<Ident>),

    /// import { name } from "module" or import { name as alias } from "module"
    Named {
        imported: Node<Ident>,
        local: Option<Node<Ident>>,
        type_only: bool,
    },
}

impl ImportSpecifier {
    /// Name the specifier binds in the importing file.
    pub fn local_name(&self) -> &Node<Ident> {
        match self {
            ImportSpecifier::Default(name) | ImportSpecifier::Namespace(name) => name,
            ImportSpecifier::Named { imported, local, .. } => local.as_ref().unwrap_or(imported),
        }
    }
}

/// Export declaration
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// export { name }
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
        type_only: bool,
    },

    /// export default expr
    Default(Node<Expr>),

    /// export default declaration
    DefaultDecl(Box<Node<Decl>>),

    /// export * from "module"
    All {
        source: String,
        as_name: Option<Node<Ident>>,
    },

    /// export declaration
    Decl(Box<Node<Decl>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: Node<Ident>,
    pub exported: Option<Node<Ident>>,
    pub type_only: bool,
}

/// Root AST node - represents a complete source file
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Node<ModuleItem>>,
    pub span: Span,
}

impl Program {
    /// Top-level declarations in source order, looking through `export`.
    pub fn declarations(&self) -> impl Iterator<Item = (&Node<Decl>, bool)> {
        self.items.iter().filter_map(|item| match &item.value {
            ModuleItem::Decl(decl) => Some((decl, false)),
            ModuleItem::Export(ExportDecl::Decl(decl)) | ModuleItem::Export(ExportDecl::DefaultDecl(decl)) => {
                Some((decl.as_ref(), true))
            }
            _ => None,
        })
    }

    /// Classes declared at the top level, with their exported flag.
    pub fn classes(&self) -> impl Iterator<Item = (&Node<Decl>, &ClassDecl, bool)> {
        self.declarations().filter_map(|(decl, exported)| match &decl.value {
            Decl::Class(class) => Some((decl, class, exported)),
            _ => None,
        })
    }

    /// The class a script compiles to: the first exported class, else the
    /// first class in the file.
    pub fn main_class(&self) -> Option<&ClassDecl> {
        self.classes()
            .find(|(_, _, exported)| *exported)
            .or_else(|| self.classes().next())
            .map(|(_, class, _)| class)
    }
}
