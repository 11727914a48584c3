//! Project configuration from `tsgd.json`
//!
//! Every key is optional:
//!
//! ```json
//! { "source": "src", "destination": "compiled", "definitions": "godot_defs" }
//! ```

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "tsgd.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("project root {} is not a directory", path.display())]
    NotADirectory { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Root of the TypeScript sources
    pub source: PathBuf,
    /// Root of the generated GDScript
    pub destination: PathBuf,
    /// Where derived declaration files are written
    pub definitions: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::from("."),
            destination: PathBuf::from("compiled"),
            definitions: PathBuf::from("godot_defs"),
        }
    }
}

impl Config {
    /// Reads `tsgd.json` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                log::debug!("no {} in {}, using defaults", CONFIG_FILE, root.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        Self::parse(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Absolute locations derived from a project root and its [`Config`].
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub defs_dir: PathBuf,
    /// Canonical form of `root`, for watcher paths that resolve symlinks
    canonical_root: Option<PathBuf>,
}

impl ProjectPaths {
    pub fn new(root: &Path, config: &Config) -> Self {
        Self {
            root: root.to_path_buf(),
            source_dir: join_normal(root, &config.source),
            output_dir: join_normal(root, &config.destination),
            defs_dir: join_normal(root, &config.definitions),
            canonical_root: root.canonicalize().ok(),
        }
    }

    /// Path of `path` relative to the project root.
    pub fn relative(&self, path: &Path) -> Option<PathBuf> {
        if let Ok(rel) = path.strip_prefix(&self.root) {
            return Some(rel.to_path_buf());
        }
        let canonical_root = self.canonical_root.as_ref()?;
        if let Ok(rel) = path.strip_prefix(canonical_root) {
            return Some(rel.to_path_buf());
        }
        // Removed files can no longer be canonicalized; their parent can
        let parent = path.parent()?.canonicalize().ok()?;
        let rel = parent.strip_prefix(canonical_root).ok()?;
        Some(rel.join(path.file_name()?))
    }

    /// `res://` path of a file inside the project.
    pub fn res_path(&self, path: &Path) -> Option<String> {
        let rel = self.relative(path)?;
        let parts: Vec<String> = rel
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(format!("res://{}", parts.join("/")))
    }

    /// Generated files, declaration files, VCS and import caches and `.d.ts`
    /// stubs are never project assets.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(rel) = self.relative(path) else {
            return true;
        };
        if rel.components().any(|component| {
            matches!(component, Component::Normal(part) if part == ".git" || part == ".import")
        }) {
            return true;
        }
        let full = self.root.join(&rel);
        for generated in [&self.output_dir, &self.defs_dir] {
            if generated != &self.root && full.starts_with(generated) {
                return true;
            }
        }
        let name = rel.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
        name.ends_with(".d.ts")
            || name == CONFIG_FILE
            || (name.ends_with(".gd") && self.is_generated_script(&full))
    }

    /// Whether `path` is GDScript generated from a TypeScript source on
    /// disk: its primary output `<stem>.gd` or an auxiliary
    /// `<stem>_<Name>.gd`.
    fn is_generated_script(&self, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(&self.output_dir) else {
            return false;
        };
        let Some(stem) = rel.file_stem().map(|stem| stem.to_string_lossy().into_owned()) else {
            return false;
        };
        let dir = match rel.parent() {
            Some(parent) => self.source_dir.join(parent),
            None => self.source_dir.clone(),
        };
        let mut candidate = stem.as_str();
        loop {
            if dir.join(format!("{}.ts", candidate)).is_file() {
                return true;
            }
            match candidate.rsplit_once('_') {
                Some((head, _)) => candidate = head,
                None => return false,
            }
        }
    }

    /// Filesystem and `res://` path of the GDScript generated for a script.
    pub fn script_output(&self, script: &Path) -> Option<(PathBuf, String)> {
        let full = self.root.join(self.relative(script)?);
        let rel = full
            .strip_prefix(&self.source_dir)
            .or_else(|_| full.strip_prefix(&self.root))
            .ok()?
            .with_extension("gd");
        let output = self.output_dir.join(rel);
        let res_path = self.res_path(&output)?;
        Some((output, res_path))
    }
}

fn join_normal(root: &Path, rel: &Path) -> PathBuf {
    rel.components().fold(root.to_path_buf(), |path, component| match component {
        Component::Normal(part) => path.join(part),
        Component::ParentDir => path.parent().map(Path::to_path_buf).unwrap_or(path),
        _ => path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(config: &Config) -> ProjectPaths {
        ProjectPaths::new(Path::new("/game"), config)
    }

    #[test]
    fn test_defaults_and_partial_config() {
        assert_eq!(Config::parse("{}").unwrap(), Config::default());
        let config = Config::parse(r#"{ "source": "src" }"#).unwrap();
        assert_eq!(config.source, PathBuf::from("src"));
        assert_eq!(config.destination, PathBuf::from("compiled"));
        assert!(Config::parse(r#"{ "source": 3 }"#).is_err());
    }

    #[test]
    fn test_res_paths() {
        let paths = paths(&Config::default());
        assert_eq!(
            paths.res_path(Path::new("/game/scenes/main.tscn")).as_deref(),
            Some("res://scenes/main.tscn")
        );
        assert_eq!(paths.res_path(Path::new("/elsewhere/main.tscn")), None);
    }

    #[test]
    fn test_generated_scripts_next_to_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("player.ts"), "").unwrap();
        let config = Config {
            destination: PathBuf::from("."),
            ..Config::default()
        };
        let paths = ProjectPaths::new(dir.path(), &config);
        assert!(paths.is_ignored(&dir.path().join("player.gd")));
        assert!(paths.is_ignored(&dir.path().join("player_State.gd")));
        assert!(!paths.is_ignored(&dir.path().join("tool.gd")));
    }

    #[test]
    fn test_ignored_paths() {
        let paths = paths(&Config::default());
        assert!(paths.is_ignored(Path::new("/game/compiled/player.gd")));
        assert!(paths.is_ignored(Path::new("/game/godot_defs/@asset_paths.d.ts")));
        assert!(paths.is_ignored(Path::new("/game/.git/HEAD")));
        assert!(paths.is_ignored(Path::new("/game/.import/icon.png-1.stex")));
        assert!(paths.is_ignored(Path::new("/game/lib/engine.d.ts")));
        assert!(paths.is_ignored(Path::new("/game/tsgd.json")));
        assert!(!paths.is_ignored(Path::new("/game/player.ts")));
        assert!(!paths.is_ignored(Path::new("/game/compiled_notes/player.ts")));
    }

    #[test]
    fn test_script_output() {
        let config = Config::parse(r#"{ "source": "src", "destination": "gen" }"#).unwrap();
        let paths = paths(&config);
        let (output, res_path) = paths.script_output(Path::new("/game/src/actors/player.ts")).unwrap();
        assert_eq!(output, PathBuf::from("/game/gen/actors/player.gd"));
        assert_eq!(res_path, "res://gen/actors/player.gd");

        // Scripts outside the source root keep their root-relative layout
        let (output, _) = paths.script_output(Path::new("/game/tools/debug.ts")).unwrap();
        assert_eq!(output, PathBuf::from("/game/gen/tools/debug.gd"));
    }
}
