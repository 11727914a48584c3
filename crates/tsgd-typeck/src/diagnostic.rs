//! Diagnostics shared by the analysis session, the transpiler and the
//! project pipeline.

use std::fmt;
use tsgd_ast::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

/// Stable code per error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticCode {
    ParseError,
    UnsupportedSyntax,
    DuplicateDeclaration,
    UnresolvedSymbol,
    AmbiguousNumericType,
    UnknownResourcePath,
    UnknownInputAction,
    UnsupportedAssetKind,
    SceneParse,
    Collision,
    Io,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::ParseError => "ParseError",
            DiagnosticCode::UnsupportedSyntax => "UnsupportedSyntax",
            DiagnosticCode::DuplicateDeclaration => "DuplicateDeclaration",
            DiagnosticCode::UnresolvedSymbol => "UnresolvedSymbol",
            DiagnosticCode::AmbiguousNumericType => "AmbiguousNumericType",
            DiagnosticCode::UnknownResourcePath => "UnknownResourcePath",
            DiagnosticCode::UnknownInputAction => "UnknownInputAction",
            DiagnosticCode::UnsupportedAssetKind => "UnsupportedAssetKind",
            DiagnosticCode::SceneParse => "SceneParse",
            DiagnosticCode::Collision => "Collision",
            DiagnosticCode::Io => "Io",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}[{}]: {}", level, self.code, self.message)
    }
}
