//! End-to-end tests of the incremental pipeline over real project trees.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tsgd_driver::{BuildStep, ProjectError, ProjectModel, WatchEvent};
use tsgd_typeck::DiagnosticCode;

const MAIN_SCENE: &str = r#"[gd_scene format=2]

[node name="Main" type="Node"]

[node name="Player" type="Sprite" parent="."]
"#;

const MAIN_SCRIPT: &str = r#"
@scene("res://main.tscn")
export class Main extends Node {
    @node("Player") player: Sprite;

    _ready() {
        this.player.show();
    }
}
"#;

const HUD_SCRIPT: &str = r#"
@scene("res://main.tscn")
export class Hud extends Node {
    @node("Player") player: Sprite;
}
"#;

const ENEMY_SCENE: &str = r#"[gd_scene format=2]

[node name="Enemy" type="KinematicBody2D"]

[node name="Body" type="Sprite" parent="."]
"#;

const ENEMY_SCRIPT: &str = r#"
@scene("res://enemy.tscn")
export class Enemy extends KinematicBody2D {
    @node("Body") body: Sprite;

    _ready() {
        this.body.show();
    }
}
"#;

const LEVEL_SCENE: &str = r#"[gd_scene load_steps=2 format=2]

[ext_resource path="res://enemy.tscn" type="PackedScene" id=1]

[node name="Level" type="Node2D"]

[node name="Enemy" parent="." instance=ExtResource( 1 )]
"#;

const LEVEL_SCRIPT: &str = r#"
@scene("res://level.tscn")
export class Level extends Node2D {
    @node("Enemy") enemy: KinematicBody2D;

    _ready() {
        this.enemy.hide();
    }
}
"#;

const MAIN_OUTPUT: &str =
    "extends Node\nclass_name Main\n\nfunc _ready():\n\tget_node(\"Player\").show()\n";

struct Project {
    dir: TempDir,
    model: ProjectModel,
}

impl Project {
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            write(dir.path(), name, contents);
        }
        let mut model = ProjectModel::open(dir.path()).unwrap();
        model.scan().unwrap();
        model.clear_log();
        Self { dir, model }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    fn read(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.path(name)).ok()
    }

    /// Writes `name` and delivers the matching event.
    fn edit(&mut self, name: &str, contents: &str) {
        let existed = self.path(name).exists();
        write(self.root(), name, contents);
        let path = self.path(name);
        let event = if existed {
            WatchEvent::Change(path)
        } else {
            WatchEvent::Add(path)
        };
        self.model.clear_log();
        self.model.handle(event).unwrap();
    }

    fn delete(&mut self, name: &str) {
        fs::remove_file(self.path(name)).unwrap();
        self.model.clear_log();
        self.model.handle(WatchEvent::Remove(self.path(name))).unwrap();
    }

    fn codes(&self, res_path: &str) -> Vec<DiagnosticCode> {
        self.model.diagnostics(res_path).iter().map(|d| d.code).collect()
    }
}

fn write(root: &Path, name: &str, contents: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn synthesized(path: &str) -> BuildStep {
    BuildStep::Synthesized(path.to_string())
}

fn compiled(path: &str) -> BuildStep {
    BuildStep::Compiled(path.to_string())
}

#[test]
fn test_build_bound_script() {
    let project = Project::new(&[("main.tscn", MAIN_SCENE), ("main.ts", MAIN_SCRIPT)]);

    assert!(project.model.diagnostics("res://main.ts").is_empty());
    assert_eq!(project.read("compiled/main.gd").as_deref(), Some(MAIN_OUTPUT));

    let declaration = project.read("godot_defs/@scenes/Scene_main_tscn.d.ts").unwrap();
    assert!(declaration.contains("declare class Scene_main_tscn extends Node {"), "{}", declaration);
    assert!(declaration.contains("  player: NodeAt<\"Main/Player\", Sprite>;"), "{}", declaration);

    let asset_paths = project.read("godot_defs/@asset_paths.d.ts").unwrap();
    assert!(asset_paths.contains("'res://main.tscn': PackedScene<Scene_main_tscn>,"), "{}", asset_paths);
    assert!(asset_paths.contains("'res://compiled/main.gd': Script,"), "{}", asset_paths);
    assert_eq!(project.model.error_count(), 0);
}

#[test]
fn test_scene_rename_breaks_binding() {
    let mut project = Project::new(&[("main.tscn", MAIN_SCENE), ("main.ts", MAIN_SCRIPT)]);

    project.edit("main.tscn", &MAIN_SCENE.replace("Player", "Hero"));

    assert_eq!(
        project.model.build_log(),
        &[synthesized("res://main.tscn"), compiled("res://main.ts")]
    );
    assert!(project.codes("res://main.ts").contains(&DiagnosticCode::UnresolvedSymbol));
    // The last good output stays on disk
    assert_eq!(project.read("compiled/main.gd").as_deref(), Some(MAIN_OUTPUT));
    assert_eq!(
        project.model.unit("res://main.ts").map(|unit| unit.text.as_str()),
        Some(MAIN_OUTPUT)
    );

    let declaration = project.read("godot_defs/@scenes/Scene_main_tscn.d.ts").unwrap();
    assert!(!declaration.contains("player"), "{}", declaration);

    // Renaming it back recovers
    project.edit("main.tscn", MAIN_SCENE);
    assert!(project.model.diagnostics("res://main.ts").is_empty());
}

#[test]
fn test_remove_script() {
    let mut project = Project::new(&[
        ("a.ts", "let a = 1;"),
        ("b.ts", "let b = 2;"),
    ]);
    let before = project.model.unit("res://b.ts").cloned();
    assert!(project.path("compiled/a.gd").exists());

    project.delete("a.ts");

    assert!(project.model.unit("res://a.ts").is_none());
    assert!(project.model.asset("res://a.ts").is_none());
    assert!(!project.path("compiled/a.gd").exists());
    assert_eq!(project.model.unit("res://b.ts").cloned(), before);
    assert!(project.model.build_log().is_empty());
}

#[test]
fn test_change_rebuilds_only_that_script() {
    let mut project = Project::new(&[
        ("main.tscn", MAIN_SCENE),
        ("main.ts", MAIN_SCRIPT),
        ("hud.ts", HUD_SCRIPT),
        ("util.ts", "let speed = 1;"),
    ]);
    assert!(project.model.diagnostics("res://hud.ts").is_empty());

    project.edit("util.ts", "let speed = 2;");

    assert_eq!(project.model.build_log(), &[compiled("res://util.ts")]);
    assert_eq!(project.read("compiled/util.gd").as_deref(), Some("var speed = 2\n"));
}

#[test]
fn test_unchanged_contents_are_ignored() {
    let mut project = Project::new(&[("util.ts", "let speed = 1;")]);
    project.edit("util.ts", "let speed = 1;");
    assert!(project.model.build_log().is_empty());
}

#[test]
fn test_rebuild_is_idempotent() {
    let project = Project::new(&[("main.tscn", MAIN_SCENE), ("main.ts", MAIN_SCRIPT)]);
    let declaration = project.read("godot_defs/@scenes/Scene_main_tscn.d.ts");
    let output = project.read("compiled/main.gd");

    let mut again = ProjectModel::open(project.root()).unwrap();
    again.scan().unwrap();

    assert_eq!(project.read("godot_defs/@scenes/Scene_main_tscn.d.ts"), declaration);
    assert_eq!(project.read("compiled/main.gd"), output);
    assert_eq!(again.unit("res://main.ts"), project.model.unit("res://main.ts"));
}

#[test]
fn test_stale_aux_files_are_removed() {
    let mut project = Project::new(&[(
        "player.ts",
        "enum State { Idle, Running }\nlet s = State.Idle;",
    )]);
    assert!(project.path("compiled/player_State.gd").exists());

    project.edit("player.ts", "let s = 0;");

    assert!(project.model.diagnostics("res://player.ts").is_empty());
    assert!(!project.path("compiled/player_State.gd").exists());
    assert_eq!(project.read("compiled/player.gd").as_deref(), Some("var s = 0\n"));
}

#[test]
fn test_errors_keep_previous_output() {
    let mut project = Project::new(&[("util.ts", "let speed = 1;")]);

    project.edit("util.ts", "let = ;");

    assert_eq!(project.model.build_log(), &[compiled("res://util.ts")]);
    assert!(project.codes("res://util.ts").contains(&DiagnosticCode::ParseError));
    assert_eq!(project.read("compiled/util.gd").as_deref(), Some("var speed = 1\n"));
    assert!(project.model.error_count() > 0);
}

#[test]
fn test_added_resource_recompiles_referrer() {
    let mut project = Project::new(&[("hud.ts", "let font = load(\"res://fonts/title.ttf\");")]);
    assert!(project.codes("res://hud.ts").contains(&DiagnosticCode::UnknownResourcePath));
    assert!(!project.path("compiled/hud.gd").exists());

    project.edit("fonts/title.ttf", "not really a font");

    assert!(project.model.build_log().contains(&compiled("res://hud.ts")));
    assert!(project.model.diagnostics("res://hud.ts").is_empty());
    assert!(project.path("compiled/hud.gd").exists());

    project.delete("fonts/title.ttf");
    assert!(project.codes("res://hud.ts").contains(&DiagnosticCode::UnknownResourcePath));
}

#[test]
fn test_autoload_drops_class_name() {
    let mut project = Project::new(&[("globals.ts", "export class Globals extends Node {}")]);
    assert_eq!(
        project.read("compiled/globals.gd").as_deref(),
        Some("extends Node\nclass_name Globals\n")
    );

    project.edit(
        "project.godot",
        "config_version=4\n\n[autoload]\n\nGlobals=\"*res://compiled/globals.gd\"\n",
    );

    assert_eq!(project.model.build_log(), &[compiled("res://globals.ts")]);
    assert_eq!(project.read("compiled/globals.gd").as_deref(), Some("extends Node\n"));
}

#[test]
fn test_broken_scene_keeps_previous_tree() {
    let mut project = Project::new(&[("main.tscn", MAIN_SCENE), ("main.ts", MAIN_SCRIPT)]);

    project.edit("main.tscn", "[node name=\"Main\" type=\"Node\"]\n[node name=\"Gun\" parent=\"Missing\"]\n");

    assert!(project.codes("res://main.tscn").contains(&DiagnosticCode::SceneParse));
    assert!(project.model.diagnostics("res://main.ts").is_empty());
    assert!(project.model.scene("res://main.tscn").is_some());
}

#[test]
fn test_unsupported_files_are_rejected() {
    let mut project = Project::new(&[]);
    write(project.root(), "theme.wav", "wav");
    let result = project.model.handle(WatchEvent::Add(project.path("theme.wav")));
    assert!(matches!(result, Err(ProjectError::UnsupportedAssetKind { .. })));
    assert!(project.model.asset("res://theme.wav").is_none());
}

#[test]
fn test_generated_files_are_not_assets() {
    let project = Project::new(&[("util.ts", "let speed = 1;"), ("engine.d.ts", "declare class Foo {}")]);
    let assets: Vec<&str> = project.model.assets().map(|asset| asset.res_path.as_str()).collect();
    assert_eq!(assets, vec!["res://util.ts"]);
}

#[test]
fn test_instanced_scene_change_propagates() {
    let mut project = Project::new(&[
        ("enemy.tscn", ENEMY_SCENE),
        ("enemy.ts", ENEMY_SCRIPT),
        ("level.tscn", LEVEL_SCENE),
        ("level.ts", LEVEL_SCRIPT),
    ]);
    assert!(project.model.diagnostics("res://enemy.ts").is_empty());
    assert!(project.model.diagnostics("res://level.ts").is_empty());
    // Lookups are relative to the scene root, so they hold wherever the scene is instanced
    let enemy_output = project.read("compiled/enemy.gd").unwrap();
    assert!(enemy_output.contains("\tget_node(\"Body\").show()\n"), "{}", enemy_output);
    let level_output = project.read("compiled/level.gd").unwrap();
    assert!(level_output.contains("\tget_node(\"Enemy\").hide()\n"), "{}", level_output);

    project.edit("enemy.tscn", &format!("{}\n[node name=\"Gun\" type=\"Node2D\" parent=\".\"]\n", ENEMY_SCENE));

    assert_eq!(
        project.model.build_log(),
        &[
            synthesized("res://enemy.tscn"),
            synthesized("res://level.tscn"),
            compiled("res://enemy.ts"),
            compiled("res://level.ts"),
        ]
    );
}

#[test]
fn test_instanced_root_type_reaches_parent_declaration() {
    let mut project = Project::new(&[
        ("enemy.tscn", ENEMY_SCENE),
        ("level.tscn", LEVEL_SCENE),
        ("level.ts", LEVEL_SCRIPT),
    ]);
    let declaration = project.read("godot_defs/@scenes/Scene_level_tscn.d.ts").unwrap();
    assert!(declaration.contains("  enemy: NodeAt<\"Level/Enemy\", KinematicBody2D>;"), "{}", declaration);

    project.edit("enemy.tscn", &ENEMY_SCENE.replace("KinematicBody2D", "StaticBody2D"));

    let declaration = project.read("godot_defs/@scenes/Scene_level_tscn.d.ts").unwrap();
    assert!(declaration.contains("  enemy: NodeAt<\"Level/Enemy\", StaticBody2D>;"), "{}", declaration);
    assert!(project.model.build_log().contains(&compiled("res://level.ts")));
}

#[test]
fn test_scene_removal_recompiles_dependents() {
    let mut project = Project::new(&[
        ("enemy.tscn", ENEMY_SCENE),
        ("enemy.ts", ENEMY_SCRIPT),
        ("level.tscn", LEVEL_SCENE),
        ("level.ts", LEVEL_SCRIPT),
        ("spawner.ts", "let enemy = load(\"res://enemy.tscn\");"),
    ]);
    assert!(project.model.diagnostics("res://spawner.ts").is_empty());
    let enemy_output = project.read("compiled/enemy.gd");

    project.delete("enemy.tscn");

    assert_eq!(
        project.model.build_log(),
        &[
            synthesized("res://level.tscn"),
            compiled("res://enemy.ts"),
            compiled("res://level.ts"),
            compiled("res://spawner.ts"),
        ]
    );
    assert!(project.codes("res://enemy.ts").contains(&DiagnosticCode::UnknownResourcePath));
    assert!(project.codes("res://spawner.ts").contains(&DiagnosticCode::UnknownResourcePath));
    assert!(!project.path("godot_defs/@scenes/Scene_enemy_tscn.d.ts").exists());
    // The bound script keeps its last good output
    assert_eq!(project.read("compiled/enemy.gd"), enemy_output);
}

#[test]
fn test_binding_change_rebuilds_siblings_only_when_type_changes() {
    let mut project = Project::new(&[
        ("main.tscn", MAIN_SCENE),
        ("main.ts", MAIN_SCRIPT),
        ("hud.ts", HUD_SCRIPT),
    ]);

    // `player` stays bound by main.ts, so the scene's type is unchanged
    project.edit("hud.ts", "@scene(\"res://main.tscn\")\nexport class Hud extends Node {}\n");
    assert_eq!(
        project.model.build_log(),
        &[synthesized("res://main.tscn"), compiled("res://hud.ts")]
    );

    // A new field changes the scene's type; main.ts sees it too
    project.edit(
        "hud.ts",
        "@scene(\"res://main.tscn\")\nexport class Hud extends Node {\n    @node(\"Player\") sprite: Sprite;\n}\n",
    );
    assert_eq!(
        project.model.build_log(),
        &[synthesized("res://main.tscn"), compiled("res://hud.ts"), compiled("res://main.ts")]
    );
    let declaration = project.read("godot_defs/@scenes/Scene_main_tscn.d.ts").unwrap();
    assert!(declaration.contains("  sprite: NodeAt<\"Main/Player\", Sprite>;"), "{}", declaration);
}

#[test]
fn test_res_path_case_collision() {
    let mut project = Project::new(&[("util.ts", "let speed = 1;")]);
    write(project.root(), "Util.ts", "let speed = 2;");

    let result = project.model.handle(WatchEvent::Add(project.path("Util.ts")));

    match result {
        Err(ProjectError::Collision { res_path, existing }) => {
            assert_eq!(res_path, "res://Util.ts");
            assert_eq!(existing, "res://util.ts");
        }
        other => panic!("expected a collision, got {:?}", other),
    }
    assert!(project.model.asset("res://Util.ts").is_none());
    assert_eq!(project.read("compiled/util.gd").as_deref(), Some("var speed = 1\n"));
}

#[test]
fn test_derived_type_name_collision() {
    let mut project = Project::new(&[("a-b.tscn", "[node name=\"First\" type=\"Node2D\"]\n")]);

    project.edit("a_b.tscn", "[node name=\"Second\" type=\"Sprite\"]\n");

    let codes = project.codes("res://a_b.tscn");
    assert_eq!(codes, vec![DiagnosticCode::Collision]);
    assert!(project.model.diagnostics("res://a-b.tscn").is_empty());
    let declaration = project.read("godot_defs/@scenes/Scene_a_b_tscn.d.ts").unwrap();
    assert!(declaration.contains("declare class Scene_a_b_tscn extends Node2D {"), "{}", declaration);
}

#[test]
fn test_images_models_and_gdscript_are_resources() {
    let project = Project::new(&[
        (
            "hud.ts",
            "let icon = load(\"res://icon.png\");\nlet ship = load(\"res://models/ship.glb\");\nlet helper = load(\"res://tools/helper.gd\");",
        ),
        ("icon.png", "png"),
        ("models/ship.glb", "glb"),
        ("tools/helper.gd", "extends Node\n"),
    ]);

    assert!(project.model.diagnostics("res://hud.ts").is_empty());
    assert!(project.path("compiled/hud.gd").exists());
    let asset_paths = project.read("godot_defs/@asset_paths.d.ts").unwrap();
    assert!(asset_paths.contains("'res://icon.png': StreamTexture,"), "{}", asset_paths);
    assert!(asset_paths.contains("'res://models/ship.glb': PackedScene,"), "{}", asset_paths);
    assert!(asset_paths.contains("'res://tools/helper.gd': Script,"), "{}", asset_paths);
}

#[test]
fn test_generated_scripts_beside_sources_are_not_assets() {
    let project = Project::new(&[
        ("tsgd.json", r#"{ "destination": "." }"#),
        ("util.ts", "let speed = 1;"),
        ("helper.gd", "extends Node\n"),
    ]);
    assert_eq!(project.read("util.gd").as_deref(), Some("var speed = 1\n"));

    let mut again = ProjectModel::open(project.root()).unwrap();
    again.scan().unwrap();
    let assets: Vec<&str> = again.assets().map(|asset| asset.res_path.as_str()).collect();
    assert_eq!(assets, vec!["res://helper.gd", "res://util.ts"]);
}

#[test]
fn test_input_actions_from_project() {
    let mut project = Project::new(&[("player.ts", "let jumping = Input.is_action_pressed(\"jump\");")]);
    assert!(project.codes("res://player.ts").contains(&DiagnosticCode::UnknownInputAction));

    project.edit(
        "project.godot",
        "config_version=4\n\n[input]\n\njump={\n\"deadzone\": 0.5,\n\"events\": [  ]\n}\n",
    );

    assert_eq!(project.model.build_log(), &[compiled("res://player.ts")]);
    assert!(project.model.diagnostics("res://player.ts").is_empty());
    let asset_paths = project.read("godot_defs/@asset_paths.d.ts").unwrap();
    assert!(asset_paths.contains("  | 'jump'\n"), "{}", asset_paths);
}
