//! Node-path binding sites declared by a script.
//!
//! A class opts into a scene with `@scene("res://main.tscn")`; each field
//! decorated `@node("Player")` binds to a node of that scene. A target
//! containing `/` is an exact path below the root, anything else names a
//! node found by breadth-first search.

use tsgd_ast::{decorator_string_arg, ClassMember, Program, Span};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingTarget {
    Name(String),
    Path(String),
}

impl BindingTarget {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim_matches('/');
        if trimmed.contains('/') {
            BindingTarget::Path(trimmed.to_string())
        } else {
            BindingTarget::Name(trimmed.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSite {
    pub field: String,
    pub target: BindingTarget,
    pub span: Span,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptBindings {
    /// Resource path of the scene the main class is bound to
    pub scene: Option<String>,
    pub sites: Vec<BindingSite>,
}

impl ScriptBindings {
    pub fn is_empty(&self) -> bool {
        self.scene.is_none() && self.sites.is_empty()
    }
}

/// Collects the binding sites of the script's main class.
pub fn collect_bindings(program: &Program) -> ScriptBindings {
    let Some(class) = program.main_class() else {
        return ScriptBindings::default();
    };

    let scene = decorator_string_arg(&class.decorators, "scene");
    let sites = class
        .members
        .iter()
        .filter_map(|member| match &member.value {
            ClassMember::Property { name, decorators, .. } => {
                let field = name.as_static()?;
                let raw = decorator_string_arg(decorators, "node")?;
                Some(BindingSite {
                    field,
                    target: BindingTarget::parse(&raw),
                    span: member.span,
                })
            }
            _ => None,
        })
        .collect();

    ScriptBindings { scene, sites }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_bindings() {
        let source = r#"
            @scene("res://main.tscn")
            export class Main extends Node {
                @node("Player") player: Sprite;
                @node("Main/HUD/Score") score: Label;
                speed = 3;
            }
        "#;
        let program = tsgd_parser::parse_source(source, 0).unwrap();
        let bindings = collect_bindings(&program);
        assert_eq!(bindings.scene.as_deref(), Some("res://main.tscn"));
        assert_eq!(bindings.sites.len(), 2);
        assert_eq!(bindings.sites[0].field, "player");
        assert_eq!(bindings.sites[0].target, BindingTarget::Name("Player".into()));
        assert_eq!(bindings.sites[1].target, BindingTarget::Path("Main/HUD/Score".into()));
    }

    #[test]
    fn test_no_class_no_bindings() {
        let program = tsgd_parser::parse_source("let x = 1;", 0).unwrap();
        assert!(collect_bindings(&program).is_empty());
    }
}
