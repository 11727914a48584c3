//! The parts of `project.godot` that affect generated scripts.

use std::collections::{BTreeMap, BTreeSet};

/// Actions every Godot 3 project has, whether or not `[input]` lists them.
pub const DEFAULT_INPUT_ACTIONS: &[&str] = &[
    "ui_accept", "ui_select", "ui_cancel", "ui_focus_next", "ui_focus_prev", "ui_left",
    "ui_right", "ui_up", "ui_down", "ui_page_up", "ui_page_down", "ui_home", "ui_end",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GodotProject {
    /// `application/run/main_scene`
    pub main_scene: Option<String>,
    /// Autoload name to the resource it loads
    pub autoloads: BTreeMap<String, String>,
    /// Actions declared in `[input]`
    pub input_actions: BTreeSet<String>,
}

impl GodotProject {
    /// Reads the main scene, the `[autoload]` section and the names in
    /// `[input]`. Unknown sections and malformed lines are skipped.
    pub fn parse(source: &str) -> Self {
        let mut project = GodotProject::default();
        let mut section = String::new();
        // Nesting of a value that spans lines, such as an input action
        let mut depth = 0usize;

        for line in source.lines() {
            let line = line.trim();
            if depth > 0 {
                depth = nesting(depth, line);
                continue;
            }
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
                section = name.trim().to_string();
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            depth = nesting(0, value);
            if section == "input" {
                project.input_actions.insert(key.to_string());
                continue;
            }
            let Some(value) = unquote(value) else {
                continue;
            };
            match section.as_str() {
                "application" if key == "run/main_scene" => project.main_scene = Some(value),
                "autoload" => {
                    // A leading `*` marks the autoload as a global singleton
                    let path = value.strip_prefix('*').unwrap_or(&value).to_string();
                    project.autoloads.insert(key.to_string(), path);
                }
                _ => {}
            }
        }

        project
    }

    /// Declared actions together with the engine's defaults.
    pub fn all_input_actions(&self) -> BTreeSet<String> {
        DEFAULT_INPUT_ACTIONS
            .iter()
            .map(|action| action.to_string())
            .chain(self.input_actions.iter().cloned())
            .collect()
    }
}

/// Bracket depth after `text`, starting from `depth`. Brackets inside
/// strings do not count.
fn nesting(mut depth: usize, text: &str) -> usize {
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' | '[' | '(' if !in_string => depth += 1,
            '}' | ']' | ')' if !in_string => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

fn unquote(value: &str) -> Option<String> {
    let inner = value.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.replace("\\\"", "\"").replace("\\\\", "\\"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project() {
        let source = r#"; Engine configuration file.
config_version=4

[application]

config/name="Demo"
run/main_scene="res://main.tscn"

[autoload]

Globals="*res://compiled/globals.gd"
Sound="res://compiled/sound.gd"

[rendering]

quality/driver/driver_name="GLES2"
"#;
        let project = GodotProject::parse(source);
        assert_eq!(project.main_scene.as_deref(), Some("res://main.tscn"));
        assert_eq!(project.autoloads.len(), 2);
        assert_eq!(project.autoloads["Globals"], "res://compiled/globals.gd");
        assert_eq!(project.autoloads["Sound"], "res://compiled/sound.gd");
    }

    #[test]
    fn test_input_actions() {
        let source = r#"[input]

jump={
"deadzone": 0.5,
"events": [ Object(InputEventKey,"resource_local_to_scene":false,"scancode":32,"unicode":0,"echo":false,"script":null)
 ]
}
fire={
"deadzone": 0.5,
"events": [  ]
}

[autoload]

Globals="*res://compiled/globals.gd"
"#;
        let project = GodotProject::parse(source);
        let actions: Vec<&str> = project.input_actions.iter().map(String::as_str).collect();
        assert_eq!(actions, vec!["fire", "jump"]);
        // Nested values do not hide the following sections
        assert_eq!(project.autoloads["Globals"], "res://compiled/globals.gd");

        let all = project.all_input_actions();
        assert!(all.contains("jump"));
        assert!(all.contains("ui_accept"));
    }

    #[test]
    fn test_empty_project() {
        assert_eq!(GodotProject::parse(""), GodotProject::default());
        assert_eq!(GodotProject::parse("[application]\nrun/main_scene=3\n").main_scene, None);
    }
}
