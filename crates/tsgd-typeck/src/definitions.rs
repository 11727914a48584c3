//! Project-derived definitions pushed into the analysis session.
//!
//! Built by the project pipeline from scene trees and the asset set, and
//! read by inference and the transpiler. Every collection is ordered so the
//! same project always produces the same output.

use std::collections::{BTreeMap, BTreeSet};

/// A node a script field is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    /// Slash-joined names from the scene root, root included
    pub path: String,
    pub engine_type: String,
}

/// Structural type derived from one scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneShape {
    pub res_path: String,
    pub type_name: String,
    pub root_name: String,
    pub root_type: String,
    /// Field name to bound node, one entry per resolved binding site
    pub fields: BTreeMap<String, NodeRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    /// Scene resource path to derived shape
    pub scenes: BTreeMap<String, SceneShape>,
    /// Every valid `res://` path in the project
    pub resource_paths: BTreeSet<String>,
    /// Resource paths of all scenes
    pub scene_names: BTreeSet<String>,
    /// Project script classes: `class_name` to generated script path
    pub classes: BTreeMap<String, String>,
    /// Autoload name to the script or scene it loads
    pub autoloads: BTreeMap<String, String>,
    pub main_scene: Option<String>,
    /// Input action names, the engine's defaults included
    pub input_actions: BTreeSet<String>,
    /// Group name to the engine types of the scene nodes in it
    pub groups: BTreeMap<String, BTreeSet<String>>,
}

impl Definitions {
    pub fn scene(&self, res_path: &str) -> Option<&SceneShape> {
        self.scenes.get(res_path)
    }

    /// The node bound to `field` in `scene`.
    pub fn node_ref(&self, scene: &str, field: &str) -> Option<&NodeRef> {
        self.scenes.get(scene)?.fields.get(field)
    }

    pub fn is_known_resource(&self, path: &str) -> bool {
        self.resource_paths.contains(path)
    }

    pub fn is_input_action(&self, action: &str) -> bool {
        self.input_actions.contains(action)
    }

    /// Whether the generated script at `res_path` is loaded as an autoload.
    pub fn is_autoload(&self, res_path: &str) -> bool {
        self.autoloads.values().any(|path| path == res_path)
    }

    /// Class declared by the generated script at `res_path`.
    pub fn class_for_script(&self, res_path: &str) -> Option<&str> {
        self.classes
            .iter()
            .find(|(_, path)| path.as_str() == res_path)
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        let mut defs = Definitions::default();
        let mut fields = BTreeMap::new();
        fields.insert(
            "player".to_string(),
            NodeRef {
                path: "Main/Player".to_string(),
                engine_type: "Sprite".to_string(),
            },
        );
        defs.scenes.insert(
            "res://main.tscn".to_string(),
            SceneShape {
                res_path: "res://main.tscn".to_string(),
                type_name: "Scene_main_tscn".to_string(),
                root_name: "Main".to_string(),
                root_type: "Node".to_string(),
                fields,
            },
        );
        defs.autoloads.insert("Globals".to_string(), "res://compiled/globals.gd".to_string());
        defs.classes.insert("Globals".to_string(), "res://compiled/globals.gd".to_string());

        assert_eq!(defs.node_ref("res://main.tscn", "player").map(|n| n.path.as_str()), Some("Main/Player"));
        assert!(defs.node_ref("res://main.tscn", "hero").is_none());
        assert!(defs.is_autoload("res://compiled/globals.gd"));
        assert_eq!(defs.class_for_script("res://compiled/globals.gd"), Some("Globals"));
    }
}
