//! Errors raised while loading assets and servicing project events.
//!
//! Each one concerns a single path; the pipeline reports it and keeps
//! going.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tsgd_typeck::DiagnosticCode;
use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("unsupported asset kind: {}", path.display())]
    UnsupportedAssetKind { path: PathBuf },

    #[error("{} is outside the project root", path.display())]
    OutsideProject { path: PathBuf },

    #[error("resource path {res_path} collides with {existing}")]
    Collision { res_path: String, existing: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("file watcher: {0}")]
    Watch(#[from] notify::Error),
}

impl ProjectError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ProjectError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> DiagnosticCode {
        match self {
            ProjectError::UnsupportedAssetKind { .. } | ProjectError::OutsideProject { .. } => {
                DiagnosticCode::UnsupportedAssetKind
            }
            ProjectError::Collision { .. } => DiagnosticCode::Collision,
            ProjectError::Io { .. } | ProjectError::Config(_) | ProjectError::Watch(_) => DiagnosticCode::Io,
        }
    }
}
