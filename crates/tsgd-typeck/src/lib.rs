//! # tsgd Analysis
//!
//! Semantic-analysis session for tsgd scripts: parses sources, infers a
//! best-effort GDScript type for every expression, collects node-path
//! binding sites, and carries the definitions derived from the project's
//! scenes and resources.
//!
//! The transpiler consumes all of this through [`AnalysisContext`].

mod analyzer;
mod bindings;
mod builtins;
mod definitions;
mod diagnostic;
mod env;
mod infer;
mod types;

// Re-export public API
pub use analyzer::{AnalysisContext, Analyzer};
pub use bindings::{collect_bindings, BindingSite, BindingTarget, ScriptBindings};
pub use builtins::{BuiltinRegistry, ClassInfo};
pub use definitions::{Definitions, NodeRef, SceneShape};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use env::TypeEnv;
pub use types::Type;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tsgd_ast::{ClassMember, Expr, ModuleItem, Node, Program, Stmt};

    const FILE: &str = "res://player.ts";

    fn analyze(source: &str) -> Analyzer {
        let mut analyzer = Analyzer::new();
        analyzer.set_source(FILE, source);
        analyzer.check(FILE);
        analyzer
    }

    /// Init expression of the top-level variable `name`.
    fn init_of<'a>(program: &'a Program, name: &str) -> &'a Node<Expr> {
        program
            .items
            .iter()
            .find_map(|item| match &item.value {
                ModuleItem::Stmt(Node { value: Stmt::VarDecl(var), .. }) => var
                    .declarations
                    .iter()
                    .find(|d| d.pattern.value.ident_name() == Some(name))
                    .and_then(|d| d.init.as_ref()),
                _ => None,
            })
            .unwrap()
    }

    fn type_of(analyzer: &Analyzer, name: &str) -> Type {
        let program = analyzer.program(FILE).unwrap();
        analyzer.get_type(FILE, init_of(program, name).id)
    }

    #[test]
    fn test_numeric_literals() {
        let analyzer = analyze("let a = 3;\nlet b = 3.0;\nlet c = 1e3;\nlet d = 0xff;");
        assert_eq!(type_of(&analyzer, "a"), Type::Int);
        assert_eq!(type_of(&analyzer, "b"), Type::Float);
        assert_eq!(type_of(&analyzer, "c"), Type::Float);
        assert_eq!(type_of(&analyzer, "d"), Type::Int);
    }

    #[test]
    fn test_arithmetic_propagation() {
        let source = r#"
            let i = 4;
            let f: number = 2;
            let sum = i + 1;
            let mixed = i * f;
            let ratio = i / 2;
            let text = "hp " + i;
            let flag = i > 2;
        "#;
        let analyzer = analyze(source);
        assert_eq!(type_of(&analyzer, "sum"), Type::Int);
        assert_eq!(type_of(&analyzer, "mixed"), Type::Float);
        assert_eq!(type_of(&analyzer, "ratio"), Type::Float);
        assert_eq!(type_of(&analyzer, "text"), Type::String);
        assert_eq!(type_of(&analyzer, "flag"), Type::Bool);
    }

    #[test]
    fn test_builtin_members() {
        let source = r#"
            let items = [1, 2, 3];
            let count = items.length;
            let first = items[0];
            let ticks = OS.get_ticks_msec();
            let floored = Math.floor(2.5);
            let v = Vector2(1, 2);
            let len = v.length();
        "#;
        let analyzer = analyze(source);
        assert_eq!(type_of(&analyzer, "items"), Type::Array(Box::new(Type::Int)));
        assert_eq!(type_of(&analyzer, "count"), Type::Int);
        assert_eq!(type_of(&analyzer, "first"), Type::Int);
        assert_eq!(type_of(&analyzer, "ticks"), Type::Int);
        assert_eq!(type_of(&analyzer, "floored"), Type::Float);
        assert_eq!(type_of(&analyzer, "v"), Type::Object("Vector2".into()));
        assert_eq!(type_of(&analyzer, "len"), Type::Float);
    }

    #[test]
    fn test_class_fields_and_methods() {
        let source = r#"
            export class Player extends Sprite {
                speed = 10;
                hp: number = 3;

                heal(): int { return 1; }

                _process(delta: float) {
                    let a = this.speed;
                    let b = this.hp;
                    let c = this.heal();
                    let d = this.position;
                    let e = delta;
                }
            }
        "#;
        let analyzer = analyze(source);
        let program = analyzer.program(FILE).unwrap();
        let class = program.main_class().unwrap();

        // Property types are recorded on the member node
        assert_eq!(analyzer.get_type(FILE, class.members[0].id), Type::Int);
        assert_eq!(analyzer.get_type(FILE, class.members[1].id), Type::Float);

        let body = match &class.members[3].value {
            ClassMember::Method { body: Some(body), .. } => body,
            other => panic!("unexpected {:?}", other),
        };
        let expected = [
            Type::Int,
            Type::Float,
            Type::Int,
            Type::Object("Vector2".into()),
            Type::Float,
        ];
        for (stmt, expected) in body.value.stmts.iter().zip(expected) {
            match &stmt.value {
                Stmt::VarDecl(var) => {
                    let init = var.declarations[0].init.as_ref().unwrap();
                    assert_eq!(analyzer.get_type(FILE, init.id), expected);
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_node_binding_types_from_definitions() {
        let source = r#"
            @scene("res://main.tscn")
            export class Main extends Node {
                @node("Player") player;
                _ready() { let p = this.player; }
            }
        "#;
        let mut analyzer = Analyzer::new();
        analyzer.set_source(FILE, source);

        let mut fields = BTreeMap::new();
        fields.insert(
            "player".to_string(),
            NodeRef {
                path: "Main/Player".to_string(),
                engine_type: "Sprite".to_string(),
            },
        );
        let mut definitions = Definitions::default();
        definitions.scenes.insert(
            "res://main.tscn".to_string(),
            SceneShape {
                res_path: "res://main.tscn".to_string(),
                type_name: "Scene_main_tscn".to_string(),
                root_name: "Main".to_string(),
                root_type: "Node".to_string(),
                fields,
            },
        );
        analyzer.set_definitions(definitions);
        analyzer.check(FILE);

        let program = analyzer.program(FILE).unwrap();
        let class = program.main_class().unwrap();
        assert_eq!(analyzer.get_type(FILE, class.members[0].id), Type::Object("Sprite".into()));
    }

    #[test]
    fn test_set_source_reports_change() {
        let mut analyzer = Analyzer::new();
        assert!(analyzer.set_source(FILE, "let a = 1;"));
        assert!(!analyzer.set_source(FILE, "let a = 1;"));
        let id = analyzer.file_id(FILE);
        assert!(analyzer.set_source(FILE, "let a = 2;"));
        assert_eq!(analyzer.file_id(FILE), id);
        assert_eq!(analyzer.file_name(id.unwrap()), Some(FILE));
    }

    #[test]
    fn test_parse_errors_become_diagnostics() {
        let analyzer = analyze("let = ;");
        assert!(analyzer.program(FILE).is_none());
        let diagnostics = analyzer.get_diagnostics(FILE);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::ParseError);
        assert!(diagnostics[0].is_error());
    }

    #[test]
    fn test_unknown_stays_unknown() {
        let analyzer = analyze("let a = mystery;\nlet b = a + 1;");
        assert_eq!(type_of(&analyzer, "a"), Type::Unknown);
        assert_eq!(type_of(&analyzer, "b"), Type::Unknown);
        assert_eq!(analyzer.get_type("res://missing.ts", tsgd_ast::NodeId(0)), Type::Unknown);
    }

    #[test]
    fn test_type_from_name() {
        assert_eq!(Type::from_name("number"), Type::Float);
        assert_eq!(Type::from_name("int"), Type::Int);
        assert_eq!(Type::from_name("Sprite"), Type::Object("Sprite".into()));
        assert_eq!(format!("{}", Type::Array(Box::new(Type::Int))), "int[]");
    }
}
