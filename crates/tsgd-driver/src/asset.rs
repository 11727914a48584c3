//! Classified project files

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use crate::error::ProjectError;

pub const PROJECT_FILE: &str = "project.godot";

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".svg", ".webp", ".bmp", ".tga"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    Script,
    /// Hand-written GDScript
    GodotScript,
    Scene,
    Font,
    Image,
    /// glTF model, imported as a scene
    Model,
    ProjectConfig,
}

impl AssetKind {
    /// Classifies `path` by its name alone.
    pub fn classify(path: &Path) -> Result<AssetKind, ProjectError> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let kind = if name == PROJECT_FILE {
            AssetKind::ProjectConfig
        } else if name.ends_with(".ts") && !name.ends_with(".d.ts") {
            AssetKind::Script
        } else if name.ends_with(".gd") {
            AssetKind::GodotScript
        } else if name.ends_with(".tscn") {
            AssetKind::Scene
        } else if name.ends_with(".ttf") || name.ends_with(".otf") {
            AssetKind::Font
        } else if IMAGE_EXTENSIONS.iter().any(|extension| name.ends_with(extension)) {
            AssetKind::Image
        } else if name.ends_with(".glb") || name.ends_with(".gltf") {
            AssetKind::Model
        } else {
            return Err(ProjectError::UnsupportedAssetKind {
                path: path.to_path_buf(),
            });
        };
        Ok(kind)
    }

    /// Declaration type of the resource in `AssetType`.
    pub fn declared_type(self) -> Option<&'static str> {
        match self {
            AssetKind::Script | AssetKind::GodotScript => Some("Script"),
            AssetKind::Scene | AssetKind::Model => Some("PackedScene"),
            AssetKind::Font => Some("DynamicFontData"),
            AssetKind::Image => Some("StreamTexture"),
            AssetKind::ProjectConfig => None,
        }
    }

    /// Loaded by path only; nothing is derived from the contents.
    pub fn is_opaque(self) -> bool {
        matches!(
            self,
            AssetKind::GodotScript | AssetKind::Font | AssetKind::Image | AssetKind::Model
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub kind: AssetKind,
    pub fs_path: PathBuf,
    /// Unique across the project
    pub res_path: String,
    /// SHA-256 of the contents when last seen
    pub signature: String,
}

/// An asset together with the bytes it was classified from.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub asset: Asset,
    pub contents: Vec<u8>,
}

impl LoadedAsset {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents).into_owned()
    }
}

/// Hex digest of `bytes`.
pub fn signature(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let kind = |path: &str| AssetKind::classify(Path::new(path)).ok();
        assert_eq!(kind("/game/player.ts"), Some(AssetKind::Script));
        assert_eq!(kind("/game/main.tscn"), Some(AssetKind::Scene));
        assert_eq!(kind("/game/fonts/Mono.TTF"), Some(AssetKind::Font));
        assert_eq!(kind("/game/fonts/serif.otf"), Some(AssetKind::Font));
        assert_eq!(kind("/game/project.godot"), Some(AssetKind::ProjectConfig));
        assert_eq!(kind("/game/tools/editor.gd"), Some(AssetKind::GodotScript));
        assert_eq!(kind("/game/icon.PNG"), Some(AssetKind::Image));
        assert_eq!(kind("/game/art/bg.webp"), Some(AssetKind::Image));
        assert_eq!(kind("/game/models/ship.glb"), Some(AssetKind::Model));
        assert_eq!(kind("/game/engine.d.ts"), None);
        assert!(matches!(
            AssetKind::classify(Path::new("/game/theme.wav")),
            Err(ProjectError::UnsupportedAssetKind { .. })
        ));
    }

    #[test]
    fn test_signature() {
        assert_eq!(
            signature(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(signature(b"a"), signature(b"a"));
        assert_ne!(signature(b"a"), signature(b"b"));
    }
}
