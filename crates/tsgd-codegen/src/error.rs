//! Transpiler error types

use thiserror::Error;
use tsgd_ast::Span;
use tsgd_typeck::{Diagnostic, DiagnosticCode};

/// A failure attached to one source position. Every variant becomes one
/// error [`Diagnostic`] in the compiled unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("{what} is not supported in GDScript output")]
    UnsupportedSyntax { what: String, span: Span },

    #[error("`{name}` is already declared in this scope")]
    DuplicateDeclaration { name: String, span: Span },

    #[error("cannot resolve `{name}`{reason}")]
    UnresolvedSymbol { name: String, reason: String, span: Span },

    #[error("cannot tell whether {what} is an int or a float; add a type annotation")]
    AmbiguousNumericType { what: String, span: Span },

    #[error("`{path}` is not a resource in this project")]
    UnknownResourcePath { path: String, span: Span },

    #[error("`{action}` is not an input action of this project")]
    UnknownInputAction { action: String, span: Span },
}

impl CompileError {
    pub fn unsupported(what: impl Into<String>, span: Span) -> Self {
        CompileError::UnsupportedSyntax {
            what: what.into(),
            span,
        }
    }

    pub fn unresolved(name: impl Into<String>, span: Span) -> Self {
        CompileError::UnresolvedSymbol {
            name: name.into(),
            reason: String::new(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CompileError::UnsupportedSyntax { span, .. }
            | CompileError::DuplicateDeclaration { span, .. }
            | CompileError::UnresolvedSymbol { span, .. }
            | CompileError::AmbiguousNumericType { span, .. }
            | CompileError::UnknownResourcePath { span, .. }
            | CompileError::UnknownInputAction { span, .. } => *span,
        }
    }

    pub fn code(&self) -> DiagnosticCode {
        match self {
            CompileError::UnsupportedSyntax { .. } => DiagnosticCode::UnsupportedSyntax,
            CompileError::DuplicateDeclaration { .. } => DiagnosticCode::DuplicateDeclaration,
            CompileError::UnresolvedSymbol { .. } => DiagnosticCode::UnresolvedSymbol,
            CompileError::AmbiguousNumericType { .. } => DiagnosticCode::AmbiguousNumericType,
            CompileError::UnknownResourcePath { .. } => DiagnosticCode::UnknownResourcePath,
            CompileError::UnknownInputAction { .. } => DiagnosticCode::UnknownInputAction,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code(), self.to_string(), self.span())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let span = Span::new(3, 9, 0);
        let error = CompileError::unsupported("try statement", span);
        assert_eq!(error.to_string(), "try statement is not supported in GDScript output");
        assert_eq!(error.code(), DiagnosticCode::UnsupportedSyntax);

        let error = CompileError::UnresolvedSymbol {
            name: "player".into(),
            reason: ": node `Player` is not in res://main.tscn".into(),
            span,
        };
        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.span, span);
        assert_eq!(diagnostic.code.as_str(), "UnresolvedSymbol");
        assert!(diagnostic.message.starts_with("cannot resolve `player`: node"));
    }
}
