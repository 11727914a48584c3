//! # tsgd Parser
//!
//! Recursive descent parser for the TypeScript subset accepted by tsgd.
//! Uses Pratt parsing for expressions with proper operator precedence.
//! Every node receives a [`NodeId`] unique within its file so later passes
//! can attach inferred types to it.

use tsgd_ast::*;
use tsgd_lexer::{Lexer, Token, TokenKind};

// Module declarations
mod decl;
mod error;
mod expr;
mod helpers;
mod parser;
mod pattern;
mod stmt;
mod types;

// Re-export public types
pub use error::{ParseError, ParseResult};
pub use parser::Parser;

/// Lexes and parses one source file.
pub fn parse_source(source: &str, file_id: usize) -> Result<Program, Vec<ParseError>> {
    let tokens = Lexer::with_file_id(source, file_id).tokenize();
    Parser::new(tokens).parse_program()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Program, Vec<ParseError>> {
        parse_source(source, 0)
    }

    fn first_stmt(program: &Program) -> &Stmt {
        match &program.items[0].value {
            ModuleItem::Stmt(stmt) => &stmt.value,
            other => panic!("expected statement, got {:?}", other),
        }
    }

    fn first_init(program: &Program) -> &Expr {
        match first_stmt(program) {
            Stmt::VarDecl(decl) => &decl.declarations[0].init.as_ref().unwrap().value,
            other => panic!("expected variable declaration, got {:?}", other),
        }
    }

    fn first_class(program: &Program) -> &ClassDecl {
        program.classes().next().map(|(_, class, _)| class).unwrap()
    }

    #[test]
    fn test_parse_variable_declaration() {
        let program = parse("let x: number = 42;").unwrap();
        assert_eq!(program.items.len(), 1);
        match first_stmt(&program) {
            Stmt::VarDecl(decl) => {
                assert_eq!(decl.kind, VarDeclKind::Let);
                let pattern = &decl.declarations[0].pattern.value;
                assert_eq!(pattern.ident_name(), Some("x"));
                assert!(pattern.type_annotation().is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_function_declaration() {
        let program = parse("function add(a: int, b: int): int { return a + b; }").unwrap();
        let (decl, _) = program.declarations().next().unwrap();
        match &decl.value {
            Decl::Function(func) => {
                assert_eq!(func.name.value.name, "add");
                assert_eq!(func.params.len(), 2);
                assert!(func.body.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_arrow_function() {
        let program = parse("const add = (a: number, b: number): number => a + b;").unwrap();
        assert!(matches!(first_init(&program), Expr::Arrow { .. }));

        let program = parse("const twice = x => x * 2;").unwrap();
        match first_init(&program) {
            Expr::Arrow { params, body, .. } => {
                assert_eq!(params.len(), 1);
                assert!(matches!(body, ArrowBody::Expr(_)));
            }
            other => panic!("unexpected {:?}", other),
        }

        // A parenthesized expression is not an arrow
        let program = parse("const y = (a + b) * c;").unwrap();
        assert!(matches!(first_init(&program), Expr::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_parse_class_with_decorators() {
        let source = r#"
            @tool
            @scene("res://player.tscn")
            export class Player extends KinematicBody2D {
                @node("Sprite")
                sprite: Sprite;
                speed = 200;
                private static readonly MAX = 3;

                _ready(): void {
                    this.sprite.visible = true;
                }

                get fast(): boolean { return this.speed > 100; }
                set fast(value: boolean) { this.speed = value ? 300 : 100; }
            }
        "#;
        let program = parse(source).unwrap();
        let class = first_class(&program);
        assert_eq!(class.name.value.name, "Player");
        assert_eq!(class.decorators.len(), 2);
        assert_eq!(
            decorator_string_arg(&class.decorators, "scene").as_deref(),
            Some("res://player.tscn")
        );
        assert!(class.extends.is_some());
        assert_eq!(class.members.len(), 6);

        match &class.members[0].value {
            ClassMember::Property { name, decorators, .. } => {
                assert_eq!(name.as_static().as_deref(), Some("sprite"));
                assert_eq!(decorator_string_arg(decorators, "node").as_deref(), Some("Sprite"));
            }
            other => panic!("unexpected {:?}", other),
        }
        match &class.members[2].value {
            ClassMember::Property {
                is_static,
                is_readonly,
                access,
                ..
            } => {
                assert!(*is_static);
                assert!(*is_readonly);
                assert_eq!(*access, AccessModifier::Private);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(class.members[4].value, ClassMember::Accessor { is_setter: false, .. }));
        match &class.members[5].value {
            ClassMember::Accessor {
                is_setter: true,
                value_type: Some(ty),
                ..
            } => assert!(matches!(ty.value, Type::Primitive(_)), "{:?}", ty.value),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decorator_on_function_is_error() {
        let errors = parse("@tool\nfunction f() {}").unwrap_err();
        assert!(errors[0].message.contains("Decorators"));
    }

    #[test]
    fn test_parse_interface_and_type_alias() {
        let source = r#"
            interface Drawable {
                draw(): void;
                readonly name: string
                [key: string]: any;
            }
            type Pair = [int, int];
            type Callback = (delta: float) => void;
        "#;
        let program = parse(source).unwrap();
        assert_eq!(program.items.len(), 3);
        match &program.items[0].value {
            ModuleItem::Decl(decl) => match &decl.value {
                Decl::Interface(iface) => assert_eq!(iface.members.len(), 3),
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_generics() {
        let program = parse("let grid: Array<Array<int>> = [];").unwrap();
        match first_stmt(&program) {
            Stmt::VarDecl(decl) => {
                let ty = decl.declarations[0].pattern.value.type_annotation().unwrap();
                match &ty.value {
                    Type::TypeRef { type_args: Some(args), .. } => {
                        assert!(matches!(args[0].value, Type::TypeRef { .. }))
                    }
                    other => panic!("unexpected {:?}", other),
                }
            }
            other => panic!("unexpected {:?}", other),
        }

        // Shift stays a shift outside type arguments
        let program = parse("let a = b < c >> d;").unwrap();
        assert!(matches!(first_init(&program), Expr::Binary { op: BinaryOp::Lt, .. }));
    }

    #[test]
    fn test_parse_generic_call() {
        let program = parse("let n = get_node<Sprite>(\"Sprite\");").unwrap();
        match first_init(&program) {
            Expr::Call { type_args, args, .. } => {
                assert!(type_args.is_some());
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_control_flow() {
        let source = r#"
            if (x > 0) {
                print("positive");
            } else {
                print("negative");
            }

            for (let i = 0; i < 10; i++) {
                print(i);
            }

            for (const item of items) { print(item); }

            while (true) {
                break;
            }
        "#;
        let program = parse(source).unwrap();
        assert_eq!(program.items.len(), 4);
        assert!(matches!(program.items[2].value, ModuleItem::Stmt(Node { value: Stmt::ForOf { .. }, .. })));
    }

    #[test]
    fn test_return_asi() {
        let program = parse("function f() {\n  return\n  1\n}").unwrap();
        let (decl, _) = program.declarations().next().unwrap();
        match &decl.value {
            Decl::Function(func) => {
                let body = func.body.as_ref().unwrap();
                assert_eq!(body.value.stmts.len(), 2);
                assert!(matches!(body.value.stmts[0].value, Stmt::Return(None)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_template_literal() {
        let source = "let s = `hp: ${this.hp} of ${max}`;";
        let program = parse(source).unwrap();
        match first_init(&program) {
            Expr::Template { quasis, exprs } => {
                assert_eq!(quasis, &vec!["hp: ".to_string(), " of ".to_string(), String::new()]);
                assert_eq!(exprs.len(), 2);
                assert!(matches!(exprs[0].value, Expr::Member { .. }));
                // Hole spans point into the whole file
                assert_eq!(&source[exprs[1].span.start..exprs[1].span.end], "max");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_template_escapes() {
        let program = parse(r"let s = `\u{1F600}${a}\x41\${b}`;").unwrap();
        match first_init(&program) {
            Expr::Template { quasis, exprs } => {
                assert_eq!(quasis, &vec!["\u{1F600}".to_string(), "A${b}".to_string()]);
                assert_eq!(exprs.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_escape_is_parse_error() {
        assert!(parse(r"let s = 'a\xZZ';").is_err());
        assert!(parse(r"let s = `a\u{}`;").is_err());
    }

    #[test]
    fn test_node_ids_are_unique() {
        let program = parse("let a = 1 + 2;\nlet b = `x${a}y${a}`;").unwrap();
        let mut ids = Vec::new();
        for item in &program.items {
            ids.push(item.id);
            if let ModuleItem::Stmt(stmt) = &item.value {
                ids.push(stmt.id);
                if let Stmt::VarDecl(decl) = &stmt.value {
                    let init = decl.declarations[0].init.as_ref().unwrap();
                    ids.push(init.id);
                    if let Expr::Template { exprs, .. } = &init.value {
                        ids.extend(exprs.iter().map(|e| e.id));
                    }
                }
            }
        }
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert!(ids.iter().all(|id| !id.is_dummy()));
    }

    #[test]
    fn test_parse_optional_chaining() {
        let program = parse("let x = obj?.prop;").unwrap();
        assert!(matches!(first_init(&program), Expr::OptionalMember { .. }));

        let program = parse("let y = arr?.[0];").unwrap();
        assert!(matches!(first_init(&program), Expr::OptionalIndex { .. }));

        let program = parse("let z = cb?.();").unwrap();
        assert!(matches!(first_init(&program), Expr::OptionalCall { .. }));

        let program = parse("let w = flag ? 1 : 2;").unwrap();
        assert!(matches!(first_init(&program), Expr::Ternary { .. }));
    }

    #[test]
    fn test_parse_non_null_and_casts() {
        let program = parse("let n = this.target!.position as Vector2;").unwrap();
        match first_init(&program) {
            Expr::TypeCast { expr, .. } => assert!(matches!(expr.value, Expr::Member { .. })),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_enum_and_namespace() {
        let source = r#"
            enum State { Idle, Run = 2, Jump }
            declare namespace Godot.Util { function clamp(v: float): float; }
        "#;
        let program = parse(source).unwrap();
        assert_eq!(program.items.len(), 2);
        let mut declarations = program.declarations();
        match &declarations.next().unwrap().0.value {
            Decl::Enum(e) => assert_eq!(e.members.len(), 3),
            other => panic!("unexpected {:?}", other),
        }
        match &declarations.next().unwrap().0.value {
            Decl::Namespace(namespace) => {
                assert_eq!(namespace.name, "Godot.Util");
                assert!(namespace.is_declare);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unrenderable_statements_are_kept_by_kind() {
        let source = r#"
            function f(): void {
                outer: for (let i = 0; i < 3; i++) { break outer; }
                try { g(); } catch (e) { throw e; } finally { h(); }
                throw "done";
            }
        "#;
        let program = parse(source).unwrap();
        let (decl, _) = program.declarations().next().unwrap();
        let Decl::Function(function) = &decl.value else {
            panic!("unexpected {:?}", decl.value);
        };
        let kinds: Vec<&str> = function
            .body
            .as_ref()
            .unwrap()
            .value
            .stmts
            .iter()
            .map(|stmt| stmt.value.kind_name())
            .collect();
        assert_eq!(kinds, vec!["labeled statement", "try statement", "throw statement"]);

        let errors = parse("function f(): void { try { g(); } }").unwrap_err();
        assert!(errors[0].message.contains("catch or finally"));
    }

    #[test]
    fn test_parse_import_export() {
        let source = r#"
            import { foo, bar as baz } from "./module";
            import type { Thing } from "./types";
            export function qux() {}
            export default class Main extends Node {}
        "#;
        let program = parse(source).unwrap();
        assert_eq!(program.items.len(), 4);
        assert_eq!(program.classes().count(), 1);
    }

    #[test]
    fn test_parse_destructuring() {
        let program = parse("const { a, b: [c, d = 4], ...rest } = value;").unwrap();
        match first_stmt(&program) {
            Stmt::VarDecl(decl) => {
                let names: Vec<_> = decl.declarations[0]
                    .pattern
                    .value
                    .bound_names()
                    .into_iter()
                    .map(|n| n.value.name.clone())
                    .collect();
                assert_eq!(names, vec!["a", "c", "d", "rest"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_error_recovery_reports_all() {
        let errors = parse("let = ;\nlet ok = 1;\nlet = 2;").unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
