//! Scene-derived definitions
//!
//! The [`DefinitionSynthesizer`] turns parsed scenes, the binding sites of
//! every script and the project's asset set into
//!
//! - one structural type per scene, with a field for every binding site
//!   that resolves to a node of that scene,
//! - the closed unions of valid resource paths and scene names,
//! - the project's input action names and scene groups,
//!
//! both as [`Definitions`] for the analysis session and as declaration
//! files (`@scenes/<TypeName>.d.ts`, `@asset_paths.d.ts`).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use tsgd_ast::Span;
use tsgd_typeck::{Definitions, Diagnostic, DiagnosticCode, NodeRef, SceneShape, ScriptBindings};
use crate::asset::AssetKind;
use crate::godot_project::GodotProject;
use crate::scene::{SceneNodeId, SceneTree};

/// Engine type of nodes whose type cannot be determined
pub const BASE_NODE_TYPE: &str = "Node";

pub const ASSET_PATHS_FILE: &str = "@asset_paths.d.ts";
pub const SCENES_DIR: &str = "@scenes";

/// Declaration file of one scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDeclaration {
    pub type_name: String,
    pub text: String,
}

impl SceneDeclaration {
    pub fn file_name(&self) -> String {
        format!("{}.d.ts", self.type_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Synthesis {
    pub definitions: Definitions,
    /// Scene resource path to its declaration
    pub scenes: BTreeMap<String, SceneDeclaration>,
    pub asset_paths: String,
    /// Collisions, keyed by the scene they are reported against
    pub diagnostics: BTreeMap<String, Vec<Diagnostic>>,
}

pub struct DefinitionSynthesizer<'a> {
    scenes: &'a BTreeMap<String, SceneTree>,
    bindings: &'a BTreeMap<String, ScriptBindings>,
    /// Resource path to kind; scripts appear under their generated path
    resources: BTreeMap<String, AssetKind>,
    project: Option<&'a GodotProject>,
    classes: BTreeMap<String, String>,
}

impl<'a> DefinitionSynthesizer<'a> {
    pub fn new(scenes: &'a BTreeMap<String, SceneTree>, bindings: &'a BTreeMap<String, ScriptBindings>) -> Self {
        Self {
            scenes,
            bindings,
            resources: BTreeMap::new(),
            project: None,
            classes: BTreeMap::new(),
        }
    }

    pub fn with_resources(mut self, resources: impl IntoIterator<Item = (String, AssetKind)>) -> Self {
        self.resources.extend(resources);
        self
    }

    pub fn with_project(mut self, project: &'a GodotProject) -> Self {
        self.project = Some(project);
        self
    }

    /// Project script classes: `class_name` to generated script path.
    pub fn with_classes(mut self, classes: BTreeMap<String, String>) -> Self {
        self.classes = classes;
        self
    }

    pub fn run(self) -> Synthesis {
        let mut synthesis = Synthesis::default();
        // Type name to the scene that claimed it
        let mut claimed: BTreeMap<String, String> = BTreeMap::new();

        for (res_path, tree) in self.scenes {
            let type_name = scene_type_name(res_path);
            if let Some(owner) = claimed.get(&type_name) {
                push_diagnostic(
                    &mut synthesis.diagnostics,
                    res_path,
                    format!("derived type {} of {} is already used by {}", type_name, res_path, owner),
                );
                continue;
            }
            claimed.insert(type_name.clone(), res_path.clone());

            let shape = self.scene_shape(res_path, tree, type_name, &mut synthesis.diagnostics);
            synthesis.scenes.insert(
                res_path.clone(),
                SceneDeclaration {
                    type_name: shape.type_name.clone(),
                    text: render_scene(&shape),
                },
            );
            synthesis.definitions.scenes.insert(res_path.clone(), shape);
        }

        let definitions = &mut synthesis.definitions;
        definitions.resource_paths = self.resources.keys().cloned().collect();
        definitions.scene_names = self
            .resources
            .iter()
            .filter(|(_, kind)| **kind == AssetKind::Scene)
            .map(|(path, _)| path.clone())
            .collect();
        definitions.classes = self.classes.clone();
        match self.project {
            Some(project) => {
                definitions.autoloads = project.autoloads.clone();
                definitions.main_scene = project.main_scene.clone();
                definitions.input_actions = project.all_input_actions();
            }
            None => definitions.input_actions = GodotProject::default().all_input_actions(),
        }
        definitions.groups = self.groups();

        synthesis.asset_paths = render_asset_paths(&self.resources, &synthesis.scenes);
        synthesis.asset_paths.push_str(&render_project_unions(&synthesis.definitions));
        synthesis
    }

    fn scene_shape(
        &self,
        res_path: &str,
        tree: &SceneTree,
        type_name: String,
        diagnostics: &mut BTreeMap<String, Vec<Diagnostic>>,
    ) -> SceneShape {
        let root = tree.root();
        let mut fields: BTreeMap<String, (NodeRef, &str)> = BTreeMap::new();

        let bound = self
            .bindings
            .iter()
            .filter(|(_, bindings)| bindings.scene.as_deref() == Some(res_path));
        for (script, bindings) in bound {
            for site in &bindings.sites {
                let Some(node) = tree.resolve(&site.target) else {
                    log::debug!("{}: `{}` has no node in {}", script, site.field, res_path);
                    continue;
                };
                let path = tree.path(node);
                if let Some((existing, owner)) = fields.get(&site.field) {
                    if existing.path != path {
                        let message = format!(
                            "field `{}` of {} binds {} but {} already binds it to {}",
                            site.field, script, path, owner, existing.path
                        );
                        push_diagnostic(diagnostics, res_path, message);
                    }
                    continue;
                }
                let engine_type = self.node_type(res_path, node, &mut vec![res_path.to_string()]);
                fields.insert(site.field.clone(), (NodeRef { path, engine_type }, script.as_str()));
            }
        }

        SceneShape {
            res_path: res_path.to_string(),
            type_name,
            root_name: tree.node(root).name.clone(),
            root_type: self.node_type(res_path, root, &mut vec![res_path.to_string()]),
            fields: fields.into_iter().map(|(field, (node, _))| (field, node)).collect(),
        }
    }

    /// Engine types of the nodes in each group, across every scene.
    fn groups(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (res_path, tree) in self.scenes {
            for (group, node) in tree.group_members() {
                let engine_type = self.node_type(res_path, node, &mut vec![res_path.to_string()]);
                groups.entry(group.to_string()).or_default().insert(engine_type);
            }
        }
        groups
    }

    /// Declared type of a node; an instancing node takes the root type of
    /// the scene it instances. Instancing cycles fall back to `Node`.
    fn node_type(&self, scene: &str, node: SceneNodeId, visiting: &mut Vec<String>) -> String {
        let Some(tree) = self.scenes.get(scene) else {
            return BASE_NODE_TYPE.to_string();
        };
        let node = tree.node(node);
        if let Some(engine_type) = &node.engine_type {
            return engine_type.clone();
        }
        let Some(instanced) = &node.instance else {
            return BASE_NODE_TYPE.to_string();
        };
        if visiting.contains(instanced) {
            log::warn!("{} instances itself through {}", scene, instanced);
            return BASE_NODE_TYPE.to_string();
        }
        let Some(inner) = self.scenes.get(instanced) else {
            return BASE_NODE_TYPE.to_string();
        };
        visiting.push(instanced.clone());
        let engine_type = self.node_type(instanced, inner.root(), visiting);
        visiting.pop();
        engine_type
    }
}

/// `Scene_` followed by the resource path with every character outside
/// `[A-Za-z0-9]` replaced by `_`.
pub fn scene_type_name(res_path: &str) -> String {
    let rel = res_path.strip_prefix("res://").unwrap_or(res_path);
    let sanitized: String = rel
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("Scene_{}", sanitized)
}

fn push_diagnostic(diagnostics: &mut BTreeMap<String, Vec<Diagnostic>>, scene: &str, message: String) {
    log::warn!("{}: {}", scene, message);
    diagnostics
        .entry(scene.to_string())
        .or_default()
        .push(Diagnostic::error(DiagnosticCode::Collision, message, Span::new(0, 0, 0)));
}

fn render_scene(shape: &SceneShape) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// Generated from {}", shape.res_path);
    let _ = writeln!(out, "declare class {} extends {} {{", shape.type_name, shape.root_type);
    for (field, node) in &shape.fields {
        let _ = writeln!(out, "  {}: NodeAt<{}, {}>;", field, ts_string(&node.path, '"'), node.engine_type);
    }
    out.push_str("}\n");
    out
}

fn render_asset_paths(resources: &BTreeMap<String, AssetKind>, scenes: &BTreeMap<String, SceneDeclaration>) -> String {
    let mut out = String::from("declare type AssetType = {\n");
    for (path, kind) in resources {
        let Some(declared) = kind.declared_type() else {
            continue;
        };
        let ty = match scenes.get(path) {
            Some(scene) if *kind == AssetKind::Scene => format!("{}<{}>", declared, scene.type_name),
            _ => declared.to_string(),
        };
        let _ = writeln!(out, "  {}: {},", ts_string(path, '\''), ty);
    }
    out.push_str("}\n\ndeclare type SceneName =\n");

    let mut any_scene = false;
    for (path, _) in resources.iter().filter(|(_, kind)| **kind == AssetKind::Scene) {
        let _ = writeln!(out, "  | {}", ts_string(path, '\''));
        any_scene = true;
    }
    if !any_scene {
        out.push_str("  never\n");
    }
    out.push_str("\ndeclare type AssetPath = keyof AssetType;\n");
    out
}

fn render_project_unions(definitions: &Definitions) -> String {
    let mut out = String::from("\ndeclare type InputActionName =\n");
    for action in &definitions.input_actions {
        let _ = writeln!(out, "  | {}", ts_string(action, '\''));
    }
    out.push_str("\ndeclare type Groups = {\n");
    for (group, types) in &definitions.groups {
        let types: Vec<&str> = types.iter().map(String::as_str).collect();
        let _ = writeln!(out, "  {}: {},", ts_string(group, '\''), types.join(" | "));
    }
    out.push_str("}\n\ndeclare type GroupName = keyof Groups;\n");
    out
}

fn ts_string(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        if c == quote || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsgd_typeck::{BindingSite, BindingTarget};

    const MAIN: &str = r#"
[ext_resource path="res://enemy.tscn" type="PackedScene" id=1]
[node name="Main" type="Node"]
[node name="Player" type="Sprite" parent="."]
[node name="Enemy" parent="." instance=ExtResource( 1 )]
"#;
    const ENEMY: &str = "[node name=\"Enemy\" type=\"KinematicBody2D\"]\n";

    fn scenes(list: &[(&str, &str)]) -> BTreeMap<String, SceneTree> {
        list.iter()
            .map(|(path, source)| (path.to_string(), SceneTree::parse(source).unwrap()))
            .collect()
    }

    fn bound(scene: &str, sites: &[(&str, &str)]) -> ScriptBindings {
        ScriptBindings {
            scene: Some(scene.to_string()),
            sites: sites
                .iter()
                .map(|(field, target)| BindingSite {
                    field: field.to_string(),
                    target: BindingTarget::parse(target),
                    span: Span::new(0, 0, 0),
                })
                .collect(),
        }
    }

    fn resources(list: &[(&str, AssetKind)]) -> Vec<(String, AssetKind)> {
        list.iter().map(|(path, kind)| (path.to_string(), *kind)).collect()
    }

    #[test]
    fn test_scene_shape_from_bindings() {
        let scenes = scenes(&[("res://main.tscn", MAIN), ("res://enemy.tscn", ENEMY)]);
        let mut bindings = BTreeMap::new();
        bindings.insert(
            "res://main.ts".to_string(),
            bound("res://main.tscn", &[("player", "Player"), ("enemy", "Main/Enemy"), ("ghost", "Ghost")]),
        );

        let synthesis = DefinitionSynthesizer::new(&scenes, &bindings).run();
        let shape = synthesis.definitions.scene("res://main.tscn").unwrap();
        assert_eq!(shape.type_name, "Scene_main_tscn");
        assert_eq!(shape.root_name, "Main");
        assert_eq!(shape.root_type, "Node");
        assert_eq!(
            shape.fields.get("player"),
            Some(&NodeRef {
                path: "Main/Player".into(),
                engine_type: "Sprite".into()
            })
        );
        // Instanced scenes take the instanced root's type
        assert_eq!(shape.fields["enemy"].engine_type, "KinematicBody2D");
        assert!(!shape.fields.contains_key("ghost"));

        let declaration = &synthesis.scenes["res://main.tscn"];
        assert_eq!(declaration.file_name(), "Scene_main_tscn.d.ts");
        assert_eq!(
            declaration.text,
            "// Generated from res://main.tscn\n\
             declare class Scene_main_tscn extends Node {\n  \
             enemy: NodeAt<\"Main/Enemy\", KinematicBody2D>;\n  \
             player: NodeAt<\"Main/Player\", Sprite>;\n\
             }\n"
        );
        assert!(synthesis.diagnostics.is_empty());
        // Scenes nobody binds to still get a type
        assert!(synthesis.scenes["res://enemy.tscn"].text.contains("extends KinematicBody2D {\n}"));
    }

    #[test]
    fn test_instancing_cycle_falls_back_to_node() {
        let a = "[ext_resource path=\"res://b.tscn\" type=\"PackedScene\" id=1]\n[node name=\"A\" instance=ExtResource( 1 )]\n";
        let b = "[ext_resource path=\"res://a.tscn\" type=\"PackedScene\" id=1]\n[node name=\"B\" instance=ExtResource( 1 )]\n";
        let scenes = scenes(&[("res://a.tscn", a), ("res://b.tscn", b)]);
        let bindings = BTreeMap::new();
        let synthesis = DefinitionSynthesizer::new(&scenes, &bindings).run();
        assert_eq!(synthesis.definitions.scenes["res://a.tscn"].root_type, BASE_NODE_TYPE);
        assert_eq!(synthesis.definitions.scenes["res://b.tscn"].root_type, BASE_NODE_TYPE);
    }

    #[test]
    fn test_field_collision_first_wins() {
        let scenes = scenes(&[("res://main.tscn", MAIN)]);
        let mut bindings = BTreeMap::new();
        bindings.insert("res://a.ts".to_string(), bound("res://main.tscn", &[("target", "Player")]));
        bindings.insert("res://b.ts".to_string(), bound("res://main.tscn", &[("target", "Enemy")]));
        bindings.insert("res://c.ts".to_string(), bound("res://main.tscn", &[("target", "Main/Player")]));

        let synthesis = DefinitionSynthesizer::new(&scenes, &bindings).run();
        assert_eq!(
            synthesis.definitions.node_ref("res://main.tscn", "target").map(|n| n.path.as_str()),
            Some("Main/Player")
        );
        let diagnostics = &synthesis.diagnostics["res://main.tscn"];
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::Collision);
        assert!(diagnostics[0].message.contains("res://b.ts"));
    }

    #[test]
    fn test_type_name_collision() {
        let scenes = scenes(&[("res://ui/main.tscn", MAIN), ("res://ui_main.tscn", MAIN)]);
        let bindings = BTreeMap::new();
        let synthesis = DefinitionSynthesizer::new(&scenes, &bindings).run();
        assert_eq!(synthesis.scenes.len(), 1);
        assert!(synthesis.scenes.contains_key("res://ui/main.tscn"));
        assert_eq!(synthesis.diagnostics["res://ui_main.tscn"][0].code, DiagnosticCode::Collision);
    }

    #[test]
    fn test_input_actions_and_groups() {
        let level = r#"
[ext_resource path="res://enemy.tscn" type="PackedScene" id=1]
[node name="Level" type="Node2D"]
[node name="Crate" type="RigidBody2D" parent="." groups=["solid"]]
[node name="Enemy" parent="." instance=ExtResource( 1 ) groups=["enemies", "solid"]]
"#;
        let scenes = scenes(&[("res://level.tscn", level), ("res://enemy.tscn", ENEMY)]);
        let bindings = BTreeMap::new();
        let project = GodotProject::parse("[input]\n\njump={\n\"deadzone\": 0.5,\n\"events\": [  ]\n}\n");
        let synthesis = DefinitionSynthesizer::new(&scenes, &bindings).with_project(&project).run();

        let definitions = &synthesis.definitions;
        assert!(definitions.is_input_action("jump"));
        assert!(definitions.is_input_action("ui_cancel"));
        assert!(!definitions.is_input_action("fire"));
        let solid: Vec<&str> = definitions.groups["solid"].iter().map(String::as_str).collect();
        assert_eq!(solid, vec!["KinematicBody2D", "RigidBody2D"]);

        let text = &synthesis.asset_paths;
        assert!(text.contains("declare type InputActionName =\n  | 'jump'\n  | 'ui_accept'\n"), "{}", text);
        assert!(text.contains("  'enemies': KinematicBody2D,\n"), "{}", text);
        assert!(text.contains("  'solid': KinematicBody2D | RigidBody2D,\n"), "{}", text);
        assert!(text.ends_with("declare type GroupName = keyof Groups;\n"), "{}", text);
    }

    #[test]
    fn test_project_unions() {
        let scenes = scenes(&[("res://main.tscn", MAIN)]);
        let bindings = BTreeMap::new();
        let project = GodotProject::parse("[autoload]\nGlobals=\"*res://compiled/globals.gd\"\n");
        let synthesis = DefinitionSynthesizer::new(&scenes, &bindings)
            .with_resources(resources(&[
                ("res://main.tscn", AssetKind::Scene),
                ("res://compiled/player.gd", AssetKind::Script),
                ("res://fonts/mono.ttf", AssetKind::Font),
            ]))
            .with_project(&project)
            .run();

        let definitions = &synthesis.definitions;
        assert!(definitions.is_known_resource("res://fonts/mono.ttf"));
        assert!(definitions.is_known_resource("res://compiled/player.gd"));
        assert!(!definitions.is_known_resource("res://player.ts"));
        assert_eq!(definitions.scene_names.len(), 1);
        assert_eq!(definitions.autoloads["Globals"], "res://compiled/globals.gd");

        assert!(synthesis.asset_paths.starts_with(
            "declare type AssetType = {\n  \
             'res://compiled/player.gd': Script,\n  \
             'res://fonts/mono.ttf': DynamicFontData,\n  \
             'res://main.tscn': PackedScene<Scene_main_tscn>,\n\
             }\n\n\
             declare type SceneName =\n  \
             | 'res://main.tscn'\n\n\
             declare type AssetPath = keyof AssetType;\n"
        ));
    }

    #[test]
    fn test_empty_scene_union() {
        let scenes = BTreeMap::new();
        let bindings = BTreeMap::new();
        let synthesis = DefinitionSynthesizer::new(&scenes, &bindings).run();
        assert!(synthesis.asset_paths.contains("declare type SceneName =\n  never\n"));
    }
}
