//! Lexical scopes for one compile
//!
//! Scopes live in an arena indexed by [`ScopeId`]; each record keeps only
//! the id of its parent. Entering a class, function or block pushes a
//! record, leaving it pops back to the parent and drops the record's
//! bindings, so nothing declared inside is reachable afterwards.

use std::collections::HashMap;
use tsgd_ast::Span;
use tsgd_typeck::Type;
use crate::error::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Engine and project globals
    Global,
    File,
    Class,
    Function,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    Local,
    Parameter,
    Function,
    /// Field bound to a scene node; `path` runs from the scene root
    NodePath { path: String },
    Member,
    Constant,
    Class,
    Global,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub kind: BindingKind,
    pub ty: Type,
    /// Text emitted for a reference
    pub emit: String,
    /// Declared parameter types, for functions and methods
    pub params: Vec<Type>,
    pub span: Span,
}

impl Binding {
    pub fn new(kind: BindingKind, emit: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            ty: Type::Unknown,
            emit: emit.into(),
            params: Vec::new(),
            span,
        }
    }

    pub fn with_type(mut self, ty: Type) -> Self {
        self.ty = ty;
        self
    }

    pub fn with_params(mut self, params: Vec<Type>) -> Self {
        self.params = params;
        self
    }

    pub fn is_local(&self) -> bool {
        matches!(self.kind, BindingKind::Local | BindingKind::Parameter)
    }
}

#[derive(Debug)]
struct ScopeRecord {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    bindings: HashMap<String, Binding>,
}

#[derive(Debug)]
pub struct ScopeResolver {
    scopes: Vec<ScopeRecord>,
    current: ScopeId,
}

impl ScopeResolver {
    /// Starts with a single global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![ScopeRecord {
                kind: ScopeKind::Global,
                parent: None,
                bindings: HashMap::new(),
            }],
            current: ScopeId(0),
        }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.scopes[self.current.0].kind
    }

    pub fn push(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(ScopeRecord {
            kind,
            parent: Some(self.current),
            bindings: HashMap::new(),
        });
        self.current = id;
        id
    }

    /// Leaves the current scope. The global scope is never popped.
    pub fn pop(&mut self) {
        let record = &mut self.scopes[self.current.0];
        if let Some(parent) = record.parent {
            record.bindings.clear();
            self.current = parent;
        }
    }

    /// Binds `name` in the current scope. Shadowing an enclosing scope is
    /// fine; rebinding within the same scope is not.
    pub fn declare(&mut self, name: &str, binding: Binding) -> Result<(), CompileError> {
        let scope = &mut self.scopes[self.current.0];
        if scope.bindings.contains_key(name) {
            return Err(CompileError::DuplicateDeclaration {
                name: name.to_string(),
                span: binding.span,
            });
        }
        scope.bindings.insert(name.to_string(), binding);
        Ok(())
    }

    /// Class members are not lexically visible; they are reached through
    /// [`ScopeResolver::resolve_member`].
    pub fn lookup(&self, name: &str) -> Option<(ScopeId, &Binding)> {
        self.chain(self.current)
            .filter(|id| self.scopes[id.0].kind != ScopeKind::Class)
            .find_map(|id| self.scopes[id.0].bindings.get(name).map(|binding| (id, binding)))
    }

    /// Resolves `name` from the current scope outwards.
    pub fn resolve(&self, name: &str, span: Span) -> Result<&Binding, CompileError> {
        self.lookup(name)
            .map(|(_, binding)| binding)
            .ok_or_else(|| CompileError::unresolved(name, span))
    }

    /// Member of the innermost enclosing class.
    pub fn resolve_member(&self, name: &str) -> Option<&Binding> {
        let class = self
            .chain(self.current)
            .find(|id| self.scopes[id.0].kind == ScopeKind::Class)?;
        self.scopes[class.0].bindings.get(name)
    }

    /// Number of function boundaries between the current scope and the
    /// scope binding `name`. Zero means the binding belongs to the innermost
    /// function (or is not a function-level binding at all).
    pub fn capture_depth(&self, name: &str) -> Option<usize> {
        let (owner, _) = self.lookup(name)?;
        Some(
            self.chain(self.current)
                .take_while(|id| *id != owner)
                .filter(|id| self.scopes[id.0].kind == ScopeKind::Function)
                .count(),
        )
    }

    /// Whether any enclosing scope is a function body.
    pub fn in_function(&self) -> bool {
        self.chain(self.current)
            .any(|id| self.scopes[id.0].kind == ScopeKind::Function)
    }

    fn chain(&self, start: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        let mut next = Some(start);
        std::iter::from_fn(move || {
            let id = next?;
            next = self.scopes[id.0].parent;
            Some(id)
        })
    }
}

impl Default for ScopeResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 0, 0)
    }

    fn local(name: &str) -> Binding {
        Binding::new(BindingKind::Local, name, span())
    }

    #[test]
    fn test_declare_and_resolve() {
        let mut scopes = ScopeResolver::new();
        scopes.push(ScopeKind::File);
        scopes.declare("speed", local("speed")).unwrap();
        assert_eq!(scopes.resolve("speed", span()).unwrap().emit, "speed");
        assert!(matches!(
            scopes.resolve("missing", span()),
            Err(CompileError::UnresolvedSymbol { .. })
        ));
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut scopes = ScopeResolver::new();
        scopes.push(ScopeKind::Function);
        scopes.declare("x", local("x")).unwrap();
        let error = scopes.declare("x", local("x")).unwrap_err();
        assert!(matches!(error, CompileError::DuplicateDeclaration { ref name, .. } if name == "x"));
    }

    #[test]
    fn test_shadowing_enclosing_scope() {
        let mut scopes = ScopeResolver::new();
        scopes.push(ScopeKind::Function);
        scopes.declare("x", local("outer")).unwrap();
        scopes.push(ScopeKind::Block);
        scopes.declare("x", local("inner")).unwrap();
        assert_eq!(scopes.resolve("x", span()).unwrap().emit, "inner");
        scopes.pop();
        assert_eq!(scopes.resolve("x", span()).unwrap().emit, "outer");
    }

    #[test]
    fn test_popped_scope_is_gone() {
        let mut scopes = ScopeResolver::new();
        scopes.push(ScopeKind::Function);
        scopes.push(ScopeKind::Block);
        scopes.declare("tmp", local("tmp")).unwrap();
        scopes.pop();
        assert!(scopes.lookup("tmp").is_none());
        // Re-entering creates a fresh scope
        scopes.push(ScopeKind::Block);
        assert!(scopes.lookup("tmp").is_none());
    }

    #[test]
    fn test_global_scope_never_popped() {
        let mut scopes = ScopeResolver::new();
        scopes.declare("print", Binding::new(BindingKind::Global, "print", span())).unwrap();
        scopes.pop();
        assert_eq!(scopes.current_kind(), ScopeKind::Global);
        assert!(scopes.lookup("print").is_some());
    }

    #[test]
    fn test_capture_depth() {
        let mut scopes = ScopeResolver::new();
        scopes.push(ScopeKind::File);
        scopes.declare("top", Binding::new(BindingKind::Member, "top", span())).unwrap();
        scopes.push(ScopeKind::Function);
        scopes.declare("x", local("x")).unwrap();
        scopes.push(ScopeKind::Block);
        assert_eq!(scopes.capture_depth("x"), Some(0));

        // Arrow body inside the method
        scopes.push(ScopeKind::Function);
        scopes.declare("arg", Binding::new(BindingKind::Parameter, "arg", span())).unwrap();
        assert_eq!(scopes.capture_depth("arg"), Some(0));
        assert_eq!(scopes.capture_depth("x"), Some(1));
        assert_eq!(scopes.capture_depth("missing"), None);
        assert!(scopes.in_function());
    }

    #[test]
    fn test_resolve_member() {
        let mut scopes = ScopeResolver::new();
        scopes.push(ScopeKind::File);
        scopes.push(ScopeKind::Class);
        scopes
            .declare(
                "player",
                Binding::new(
                    BindingKind::NodePath {
                        path: "Main/Player".into(),
                    },
                    "player",
                    span(),
                ),
            )
            .unwrap();
        scopes.push(ScopeKind::Function);
        scopes.declare("player", local("player")).unwrap();
        let member = scopes.resolve_member("player").unwrap();
        assert!(matches!(member.kind, BindingKind::NodePath { .. }));
        assert_eq!(scopes.resolve("player", span()).unwrap().kind, BindingKind::Local);
    }

    #[test]
    fn test_members_not_lexically_visible() {
        let mut scopes = ScopeResolver::new();
        scopes.push(ScopeKind::File);
        scopes.push(ScopeKind::Class);
        scopes.declare("hp", Binding::new(BindingKind::Member, "hp", span())).unwrap();
        scopes.push(ScopeKind::Function);
        assert!(scopes.lookup("hp").is_none());
        assert!(scopes.resolve_member("hp").is_some());
    }
}
