//! # tsgd GDScript Generator
//!
//! Renders one analyzed script as Godot 3 GDScript. The entry point is
//! [`compile`], which never fails: every problem is reported as a diagnostic
//! in the returned [`CompiledUnit`].
//!
//! Identifier resolution goes through the [`ScopeResolver`]; fields bound to
//! scene nodes resolve to a static `get_node` lookup computed from the
//! project definitions.

mod error;
mod expr;
mod gdscript;
mod output;
mod scope;
mod stmt;
mod transpiler;

pub use error::CompileError;
pub use scope::{Binding, BindingKind, ScopeId, ScopeKind, ScopeResolver};

use std::collections::BTreeSet;
use tsgd_ast::Span;
use tsgd_typeck::{AnalysisContext, Diagnostic, DiagnosticCode};
use crate::transpiler::Transpiler;

/// The script to compile and where its output will live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileTarget {
    /// Key of the script in the analysis session
    pub file: String,
    /// `res://` path of the primary generated script
    pub output_res_path: String,
}

/// A generated file written next to the primary script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxFile {
    pub name: String,
    pub content: String,
}

/// Result of compiling one script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledUnit {
    pub text: String,
    pub aux_files: Vec<AuxFile>,
    pub diagnostics: Vec<Diagnostic>,
    /// Scene named by the main class's `@scene`
    pub bound_scene: Option<String>,
    /// `res://` literals checked against the project, known or not
    pub resource_refs: BTreeSet<String>,
    /// `class_name` declared by the script, if any
    pub class_name: Option<String>,
}

impl CompiledUnit {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Compiles `target` using the syntax tree, types and definitions held by
/// `ctx`.
pub fn compile(target: &CompileTarget, ctx: &dyn AnalysisContext) -> CompiledUnit {
    let mut diagnostics = ctx.get_diagnostics(&target.file);
    let Some(program) = ctx.program(&target.file) else {
        if !diagnostics.iter().any(Diagnostic::is_error) {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::ParseError,
                format!("no syntax tree for {}", target.file),
                Span::new(0, 0, 0),
            ));
        }
        return CompiledUnit {
            diagnostics,
            ..CompiledUnit::default()
        };
    };

    log::debug!("compiling {} -> {}", target.file, target.output_res_path);
    let mut unit = Transpiler::new(target, ctx).run(program);
    diagnostics.append(&mut unit.diagnostics);
    unit.diagnostics = diagnostics;
    unit
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tsgd_typeck::{Analyzer, Definitions, NodeRef, SceneShape};

    const FILE: &str = "res://player.ts";

    fn target() -> CompileTarget {
        CompileTarget {
            file: FILE.to_string(),
            output_res_path: "res://compiled/player.gd".to_string(),
        }
    }

    fn compile_with(source: &str, definitions: Definitions) -> CompiledUnit {
        let mut analyzer = Analyzer::new();
        analyzer.set_definitions(definitions);
        analyzer.set_source(FILE, source);
        analyzer.check(FILE);
        compile(&target(), &analyzer)
    }

    fn compile_source(source: &str) -> CompiledUnit {
        compile_with(source, Definitions::default())
    }

    fn codes(unit: &CompiledUnit) -> Vec<DiagnosticCode> {
        unit.diagnostics.iter().map(|d| d.code).collect()
    }

    fn main_scene(fields: &[(&str, &str, &str)]) -> Definitions {
        let mut definitions = Definitions::default();
        let fields: BTreeMap<String, NodeRef> = fields
            .iter()
            .map(|(field, path, ty)| {
                (
                    field.to_string(),
                    NodeRef {
                        path: path.to_string(),
                        engine_type: ty.to_string(),
                    },
                )
            })
            .collect();
        definitions.scenes.insert(
            "res://main.tscn".to_string(),
            SceneShape {
                res_path: "res://main.tscn".to_string(),
                type_name: "Scene_main".to_string(),
                root_name: "Main".to_string(),
                root_type: "Node".to_string(),
                fields,
            },
        );
        definitions.scene_names.insert("res://main.tscn".to_string());
        definitions.resource_paths.insert("res://main.tscn".to_string());
        definitions
    }

    const BOUND_SCRIPT: &str = r#"
        @scene("res://main.tscn")
        export class Main extends Node {
            @node("Player") player: Sprite;

            _ready() {
                this.player.show();
            }
        }
    "#;

    #[test]
    fn test_node_binding_is_static_lookup() {
        let unit = compile_with(BOUND_SCRIPT, main_scene(&[("player", "Main/Player", "Sprite")]));
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        assert_eq!(
            unit.text,
            "extends Node\nclass_name Main\n\nfunc _ready():\n\tget_node(\"Player\").show()\n"
        );
        assert_eq!(unit.bound_scene.as_deref(), Some("res://main.tscn"));
        assert!(unit.resource_refs.contains("res://main.tscn"));
        assert_eq!(unit.class_name.as_deref(), Some("Main"));
    }

    #[test]
    fn test_node_lookup_is_relative_to_scene_root() {
        let source = r#"
            @scene("res://main.tscn")
            export class Main extends Node {
                @node("Gun") gun: Node2D;
                @node("Main") me: Node;

                _ready() {
                    this.gun.hide();
                    print(this.me);
                }
            }
        "#;
        let unit = compile_with(
            source,
            main_scene(&[("gun", "Main/Player/Gun", "Node2D"), ("me", "Main", "Node")]),
        );
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        assert!(unit.text.contains("\tget_node(\"Player/Gun\").hide()\n"), "{}", unit.text);
        assert!(unit.text.contains("\tprint(get_node(\".\"))\n"), "{}", unit.text);
        assert!(!unit.text.contains("/root"), "{}", unit.text);
    }

    #[test]
    fn test_missing_node_is_unresolved() {
        let unit = compile_with(BOUND_SCRIPT, main_scene(&[]));
        assert!(codes(&unit).contains(&DiagnosticCode::UnresolvedSymbol));
        assert!(unit.has_errors());
    }

    #[test]
    fn test_unknown_scene() {
        let unit = compile_with(BOUND_SCRIPT, Definitions::default());
        assert!(codes(&unit).contains(&DiagnosticCode::UnknownResourcePath));
    }

    #[test]
    fn test_int_division() {
        let unit = compile_source("let a = 7;\nlet b = 2;\nlet c = a / b;");
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        assert_eq!(unit.text, "var a = 7\nvar b = 2\nvar c = float(a) / b\n");
    }

    #[test]
    fn test_compound_division_evaluates_target_once() {
        let unit = compile_source(
            "function pick(): int {\n  return 0;\n}\nfunction halve(a: int[], b: int[]): void {\n  a[pick()] /= 2;\n  b[0] /= 2;\n}",
        );
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        assert!(
            unit.text.contains("\tvar _tmp_0 = pick()\n\ta[_tmp_0] = float(a[_tmp_0]) / 2\n"),
            "{}",
            unit.text
        );
        // Plain targets are read back directly
        assert!(unit.text.contains("\tb[0] = float(b[0]) / 2\n"), "{}", unit.text);
    }

    #[test]
    fn test_float_modulo() {
        let unit = compile_source("let x = 5.5;\nlet y = x % 2;");
        assert!(unit.text.contains("var y = fmod(x, 2)"), "{}", unit.text);
    }

    #[test]
    fn test_ambiguous_division() {
        let unit = compile_source("function half(v: any): void {\n  print(v / 2);\n}");
        assert!(codes(&unit).contains(&DiagnosticCode::AmbiguousNumericType));
    }

    #[test]
    fn test_float_literal_in_float_position() {
        let unit = compile_source("let speed: number = 5;\nlet hp = 5;");
        assert!(unit.text.contains("var speed = 5.0\n"), "{}", unit.text);
        assert!(unit.text.contains("var hp = 5\n"), "{}", unit.text);
    }

    #[test]
    fn test_string_escapes_survive() {
        let unit = compile_source(r"let s = 'a\u{1F600}b\x41\b😀';");
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        assert_eq!(unit.text, "var s = \"a\u{1F600}bA\\b\u{1F600}\"\n");
    }

    #[test]
    fn test_malformed_literals_are_parse_errors() {
        for source in [r"let s = 'a\x4';", "let x = 0x;", "let x = 99999999999999999999;"] {
            let unit = compile_source(source);
            assert!(codes(&unit).contains(&DiagnosticCode::ParseError), "{}", source);
            assert!(unit.text.is_empty(), "{}", source);
        }
    }

    #[test]
    fn test_operator_mapping() {
        let unit = compile_source(
            "let a = true;\nlet b = false;\nlet c = !a && (b || a);\nlet d = 2 ** 3;\nlet e = a ? 1 : 2;",
        );
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        assert!(unit.text.contains("var c = not a and (b or a)\n"), "{}", unit.text);
        assert!(unit.text.contains("var d = pow(2, 3)\n"), "{}", unit.text);
        assert!(unit.text.contains("var e = (1 if a else 2)\n"), "{}", unit.text);
    }

    #[test]
    fn test_enum_aux_file() {
        let unit = compile_source("enum State { Idle, Running = 5, Done }\nlet s = State.Done;");
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        assert_eq!(unit.aux_files.len(), 1);
        assert_eq!(unit.aux_files[0].name, "player_State.gd");
        assert_eq!(
            unit.aux_files[0].content,
            "const Idle = 0\nconst Running = 5\nconst Done = 6\n"
        );
        assert_eq!(
            unit.text,
            "const State = preload(\"res://compiled/player_State.gd\")\n\nvar s = State.Done\n"
        );
    }

    #[test]
    fn test_for_loop_update_before_continue() {
        let source = r#"
            function count(): void {
                for (let i = 0; i < 10; i++) {
                    if (i == 5) {
                        continue;
                    }
                    print(i);
                }
            }
        "#;
        let unit = compile_source(source);
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        assert_eq!(
            unit.text,
            "func count():\n\tvar i = 0\n\twhile i < 10:\n\t\tif i == 5:\n\t\t\ti += 1\n\t\t\tcontinue\n\t\tprint(i)\n\t\ti += 1\n"
        );
    }

    #[test]
    fn test_switch_becomes_match() {
        let source = r#"
            function describe(n: int): string {
                switch (n) {
                    case 1:
                    case 2:
                        return "small";
                    case 3:
                        print("three");
                        break;
                    default:
                        return "other";
                }
                return "";
            }
        "#;
        let unit = compile_source(source);
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        assert!(
            unit.text.contains(
                "\tmatch n:\n\t\t1, 2:\n\t\t\treturn \"small\"\n\t\t3:\n\t\t\tprint(\"three\")\n\t\t_:\n\t\t\treturn \"other\"\n\treturn \"\"\n"
            ),
            "{}",
            unit.text
        );
    }

    #[test]
    fn test_switch_fall_through_unsupported() {
        let source = r#"
            function f(n: int): void {
                switch (n) {
                    case 1:
                        print("one");
                    case 2:
                        print("two");
                }
            }
        "#;
        let unit = compile_source(source);
        assert_eq!(codes(&unit), vec![DiagnosticCode::UnsupportedSyntax]);
    }

    #[test]
    fn test_arrow_connect_is_hoisted() {
        let source = r#"
            export class Main extends Node {
                _ready() {
                    this.get_tree().connect("idle_frame", () => print("tick"));
                }
            }
        "#;
        let unit = compile_source(source);
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        assert_eq!(
            unit.text,
            "extends Node\nclass_name Main\n\nfunc _ready():\n\tself.get_tree().connect(\"idle_frame\", self, \"_gen_0\")\n\nfunc _gen_0():\n\tprint(\"tick\")\n"
        );
    }

    #[test]
    fn test_closure_capturing_local() {
        let unit = compile_source("function f(): void {\n  let x = 1;\n  let g = () => x;\n}");
        assert!(codes(&unit).contains(&DiagnosticCode::UnsupportedSyntax));
    }

    #[test]
    fn test_try_is_unsupported_and_rest_still_emitted() {
        let source = "function f(): void {\n  try { print(1); } catch (e) { }\n  print(2);\n}";
        let unit = compile_source(source);
        assert_eq!(codes(&unit), vec![DiagnosticCode::UnsupportedSyntax]);
        assert!(unit.text.contains("\tprint(2)\n"), "{}", unit.text);
    }

    #[test]
    fn test_accessors_labels_and_namespaces_are_unsupported() {
        let source = r#"
            namespace Util { export const scale = 2; }
            declare namespace Engine { function tick(): void; }
            export class Main extends Node {
                speed = 1;
                get fast(): boolean { return this.speed > 1; }
                _ready(): void {
                    outer: while (true) { break; }
                    throw "stop";
                }
            }
        "#;
        let unit = compile_source(source);
        let messages: Vec<&str> = unit.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "namespace is not supported in GDScript output",
                "getter is not supported in GDScript output",
                "labeled statement is not supported in GDScript output",
                "throw statement is not supported in GDScript output",
            ]
        );
        assert!(unit.text.contains("var speed = 1\n"), "{}", unit.text);
    }

    #[test]
    fn test_shadowed_local_gets_fresh_name() {
        let source = "function f(): void {\n  let x = 1;\n  {\n    let x = 2;\n    print(x);\n  }\n  print(x);\n}";
        let unit = compile_source(source);
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        assert_eq!(
            unit.text,
            "func f():\n\tvar x = 1\n\tvar x_1 = 2\n\tprint(x_1)\n\tprint(x)\n"
        );
    }

    #[test]
    fn test_sibling_blocks_reuse_name() {
        let source = "function f(c: boolean): void {\n  if (c) {\n    let x = 1;\n    print(x);\n  }\n  {\n    let y = 1;\n  }\n  {\n    let y = 2;\n    print(y);\n  }\n}";
        let unit = compile_source(source);
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        assert_eq!(
            unit.text,
            "func f(c):\n\tif c:\n\t\tvar x = 1\n\t\tprint(x)\n\tvar y = 1\n\ty = 2\n\tprint(y)\n"
        );
    }

    #[test]
    fn test_duplicate_declaration() {
        let unit = compile_source("function f(): void {\n  let x = 1;\n  let x = 2;\n}");
        assert_eq!(codes(&unit), vec![DiagnosticCode::DuplicateDeclaration]);
    }

    #[test]
    fn test_resource_paths_checked() {
        let mut definitions = Definitions::default();
        definitions.resource_paths.insert("res://icon.png".to_string());
        let unit = compile_with(
            "let ok = load(\"res://icon.png\");\nlet bad = load(\"res://missing.png\");",
            definitions,
        );
        assert_eq!(codes(&unit), vec![DiagnosticCode::UnknownResourcePath]);
        assert!(unit.resource_refs.contains("res://icon.png"));
        // Unknown paths are still recorded so the script rebuilds once they exist
        assert!(unit.resource_refs.contains("res://missing.png"));
    }

    #[test]
    fn test_input_actions_checked() {
        let mut definitions = Definitions::default();
        definitions.input_actions.insert("jump".to_string());
        let source = "function f(event: InputEvent): void {\n  print(Input.is_action_pressed(\"jump\"));\n  print(event.is_action_pressed(\"jmp\"));\n  print(Input.get_action_strength(\"fire\"));\n}";
        let unit = compile_with(source, definitions);

        let unknown: Vec<&str> = unit
            .diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::UnknownInputAction)
            .map(|d| &source[d.span.start..d.span.end])
            .collect();
        assert_eq!(unknown, vec!["\"jmp\"", "\"fire\""]);
    }

    #[test]
    fn test_autoload_omits_class_name() {
        let mut definitions = Definitions::default();
        definitions
            .autoloads
            .insert("Globals".to_string(), "res://compiled/player.gd".to_string());
        let unit = compile_with("export class Globals extends Node {}", definitions);
        assert_eq!(unit.text, "extends Node\n");
        assert_eq!(unit.class_name, None);
    }

    #[test]
    fn test_parse_error_yields_empty_unit() {
        let unit = compile_source("let = ;");
        assert!(unit.has_errors());
        assert!(unit.text.is_empty());
        assert_eq!(codes(&unit)[0], DiagnosticCode::ParseError);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let definitions = main_scene(&[("player", "Main/Player", "Sprite")]);
        let first = compile_with(BOUND_SCRIPT, definitions.clone());
        let second = compile_with(BOUND_SCRIPT, definitions);
        assert_eq!(first, second);
    }
}
