//! Godot text scene (`.tscn`) reader
//!
//! Only the section headers matter here: `[ext_resource ...]` lines map
//! resource ids to paths and `[node ...]` lines build the node tree.
//! Property lines between headers are skipped.
//!
//! ```text
//! [ext_resource path="res://enemy.tscn" type="PackedScene" id=1]
//!
//! [node name="Main" type="Node"]
//! [node name="Player" type="Sprite" parent="."]
//! [node name="Enemy" parent="." instance=ExtResource( 1 )]
//! [node name="Gun" type="Node2D" parent="Player"]
//! ```

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;
use tsgd_typeck::BindingTarget;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: parent `{parent}` of node `{name}` does not exist")]
    MissingParent { line: usize, name: String, parent: String },

    #[error("scene has no root node")]
    NoRoot,
}

impl SceneError {
    /// 1-based line the error was found on, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            SceneError::Syntax { line, .. } | SceneError::MissingParent { line, .. } => Some(*line),
            SceneError::NoRoot => None,
        }
    }
}

fn syntax(line: usize, message: impl Into<String>) -> SceneError {
    SceneError::Syntax {
        line,
        message: message.into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneNodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneNode {
    pub name: String,
    /// Declared engine type; absent for instanced scenes
    pub engine_type: Option<String>,
    /// Resource path of the scene this node instances
    pub instance: Option<String>,
    /// Groups the node joins when the scene is instanced
    pub groups: Vec<String>,
    pub parent: Option<SceneNodeId>,
    pub children: Vec<SceneNodeId>,
}

/// Node tree of one scene. The root is always the first node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneTree {
    nodes: Vec<SceneNode>,
}

impl SceneTree {
    pub fn parse(source: &str) -> Result<SceneTree, SceneError> {
        let mut resources: HashMap<String, String> = HashMap::new();
        let mut nodes: Vec<SceneNode> = Vec::new();
        // Paths below the root, e.g. "Player/Gun"
        let mut by_path: HashMap<String, SceneNodeId> = HashMap::new();

        for (index, text) in source.lines().enumerate() {
            let line = index + 1;
            let Some(section) = Section::parse(text, line)? else {
                continue;
            };
            match section.kind.as_str() {
                "ext_resource" => {
                    if let (Some(id), Some(path)) = (section.get("id"), section.get("path")) {
                        resources.insert(id.to_string(), path.to_string());
                    }
                }
                "node" => {
                    let name = section
                        .get("name")
                        .ok_or_else(|| syntax(line, "node without a name"))?
                        .to_string();
                    let instance = match section.get("instance") {
                        Some(raw) => {
                            let id = ext_resource_id(raw)
                                .ok_or_else(|| syntax(line, format!("unrecognized instance `{}`", raw)))?;
                            let path = resources
                                .get(id)
                                .ok_or_else(|| syntax(line, format!("unknown ext_resource id {}", id)))?;
                            Some(path.clone())
                        }
                        None => None,
                    };
                    let groups = match section.get("groups") {
                        Some(raw) => string_array(raw)
                            .ok_or_else(|| syntax(line, format!("unrecognized groups `{}`", raw)))?,
                        None => Vec::new(),
                    };

                    let id = SceneNodeId(nodes.len());
                    let parent = match section.get("parent") {
                        None if nodes.is_empty() => None,
                        None => return Err(syntax(line, format!("second root node `{}`", name))),
                        Some(_) if nodes.is_empty() => {
                            return Err(syntax(line, format!("first node `{}` has a parent", name)))
                        }
                        Some(".") => {
                            by_path.insert(name.clone(), id);
                            Some(SceneNodeId(0))
                        }
                        Some(parent) => {
                            let Some(&parent_id) = by_path.get(parent) else {
                                return Err(SceneError::MissingParent {
                                    line,
                                    name,
                                    parent: parent.to_string(),
                                });
                            };
                            by_path.insert(format!("{}/{}", parent, name), id);
                            Some(parent_id)
                        }
                    };
                    if let Some(parent) = parent {
                        nodes[parent.0].children.push(id);
                    }
                    nodes.push(SceneNode {
                        name,
                        engine_type: section.get("type").map(str::to_string),
                        instance,
                        groups,
                        parent,
                        children: Vec::new(),
                    });
                }
                _ => {}
            }
        }

        if nodes.is_empty() {
            return Err(SceneError::NoRoot);
        }
        Ok(SceneTree { nodes })
    }

    pub fn root(&self) -> SceneNodeId {
        SceneNodeId(0)
    }

    pub fn node(&self, id: SceneNodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Slash-joined names from the root to `id`, root included.
    pub fn path(&self, id: SceneNodeId) -> String {
        let mut names = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            let node = self.node(current);
            names.push(node.name.as_str());
            next = node.parent;
        }
        names.reverse();
        names.join("/")
    }

    /// Shallowest node called `name`; ties go to the first in document
    /// order.
    pub fn find_by_name(&self, name: &str) -> Option<SceneNodeId> {
        let mut queue = VecDeque::from([self.root()]);
        while let Some(id) = queue.pop_front() {
            let node = self.node(id);
            if node.name == name {
                return Some(id);
            }
            queue.extend(node.children.iter().copied());
        }
        None
    }

    /// Node at `path`. Paths starting with the root's name are taken from
    /// the root, others from just below it.
    pub fn find_by_path(&self, path: &str) -> Option<SceneNodeId> {
        let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();
        let root = self.root();
        let from_root = match segments.split_first() {
            Some((first, rest)) if *first == self.node(root).name => self.walk(root, rest),
            _ => None,
        };
        from_root.or_else(|| self.walk(root, &segments))
    }

    pub fn resolve(&self, target: &BindingTarget) -> Option<SceneNodeId> {
        match target {
            BindingTarget::Name(name) => self.find_by_name(name),
            BindingTarget::Path(path) => self.find_by_path(path),
        }
    }

    /// Every node that joins a group, once per group.
    pub fn group_members(&self) -> impl Iterator<Item = (&str, SceneNodeId)> + '_ {
        self.nodes.iter().enumerate().flat_map(|(index, node)| {
            node.groups.iter().map(move |group| (group.as_str(), SceneNodeId(index)))
        })
    }

    /// Scenes instanced anywhere in this tree.
    pub fn instanced_scenes(&self) -> BTreeSet<String> {
        self.nodes.iter().filter_map(|node| node.instance.clone()).collect()
    }

    fn walk(&self, from: SceneNodeId, segments: &[&str]) -> Option<SceneNodeId> {
        segments.iter().try_fold(from, |current, segment| {
            self.node(current)
                .children
                .iter()
                .copied()
                .find(|child| self.node(*child).name == *segment)
        })
    }
}

/// One `[kind key=value ...]` header.
struct Section {
    kind: String,
    attributes: Vec<(String, String)>,
}

impl Section {
    /// `None` for lines that are not section headers.
    fn parse(text: &str, line: usize) -> Result<Option<Section>, SceneError> {
        let text = text.trim();
        let Some(inner) = text.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) else {
            return Ok(None);
        };
        let kind_len = inner
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(inner.len());
        let (kind, rest) = inner.split_at(kind_len);
        // Array values also start with `[`
        if kind.is_empty() || !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
            return Ok(None);
        }
        Ok(Some(Section {
            kind: kind.to_string(),
            attributes: parse_attributes(rest, line)?,
        }))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

fn parse_attributes(text: &str, line: usize) -> Result<Vec<(String, String)>, SceneError> {
    let mut attributes = Vec::new();
    let mut chars = text.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            return Ok(attributes);
        }
        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=' && !c.is_whitespace()) {
            key.push(c);
        }
        if chars.next() != Some('=') {
            return Err(syntax(line, format!("expected `=` after `{}`", key)));
        }
        let value = if chars.next_if_eq(&'"').is_some() {
            read_string(&mut chars, line)?
        } else {
            read_raw(&mut chars, line)?
        };
        attributes.push((key, value));
    }
}

/// Body of a quoted string; the opening quote is already consumed.
fn read_string(chars: &mut Peekable<Chars<'_>>, line: usize) -> Result<String, SceneError> {
    let mut value = String::new();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Ok(value),
            '\\' => match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some(other) => value.push(other),
                None => break,
            },
            _ => value.push(c),
        }
    }
    Err(syntax(line, "unterminated string"))
}

/// Unquoted value such as `1` or `ExtResource( 1 )`, up to whitespace
/// outside brackets.
fn read_raw(chars: &mut Peekable<Chars<'_>>, line: usize) -> Result<String, SceneError> {
    let mut value = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    while let Some(&c) = chars.peek() {
        if depth == 0 && !in_string && c.is_whitespace() {
            break;
        }
        chars.next();
        value.push(c);
        match c {
            '"' => in_string = !in_string,
            '(' | '[' | '{' if !in_string => depth += 1,
            ')' | ']' | '}' if !in_string => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| syntax(line, format!("unbalanced `{}`", c)))?;
            }
            _ => {}
        }
    }
    if depth != 0 || in_string {
        return Err(syntax(line, format!("unterminated value `{}`", value)));
    }
    Ok(value)
}

/// `["a", "b"]` as its strings.
fn string_array(raw: &str) -> Option<Vec<String>> {
    let inner = raw.strip_prefix('[')?.strip_suffix(']')?.trim();
    if inner.is_empty() {
        return Some(Vec::new());
    }
    inner
        .split(',')
        .map(|item| {
            let item = item.trim();
            let name = item.strip_prefix('"')?.strip_suffix('"')?;
            Some(name.to_string())
        })
        .collect()
}

/// `1` from `ExtResource( 1 )`, `1_ab` from `ExtResource("1_ab")`.
fn ext_resource_id(raw: &str) -> Option<&str> {
    let inner = raw.strip_prefix("ExtResource")?.trim_start();
    let inner = inner.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.trim().trim_matches('"'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: &str = r#"[gd_scene load_steps=3 format=2]

[ext_resource path="res://enemy.tscn" type="PackedScene" id=1]
[ext_resource path="res://compiled/main.gd" type="Script" id=2]

[node name="Main" type="Node"]
script = ExtResource( 2 )

[node name="Player" type="Sprite" parent="."]
position = Vector2( 10, 20 )

[node name="Gun" type="Node2D" parent="Player"]

[node name="Enemy" parent="." instance=ExtResource( 1 )]

[node name="Muzzle" type="Position2D" parent="Player/Gun" groups=[ "weapons", "fx" ]]
"#;

    #[test]
    fn test_parse_tree() {
        let tree = SceneTree::parse(MAIN).unwrap();
        assert_eq!(tree.len(), 5);
        let root = tree.node(tree.root());
        assert_eq!(root.name, "Main");
        assert_eq!(root.engine_type.as_deref(), Some("Node"));
        let names: Vec<&str> = root.children.iter().map(|id| tree.node(*id).name.as_str()).collect();
        assert_eq!(names, vec!["Player", "Enemy"]);

        let enemy = tree.find_by_name("Enemy").unwrap();
        assert_eq!(tree.node(enemy).engine_type, None);
        assert_eq!(tree.node(enemy).instance.as_deref(), Some("res://enemy.tscn"));
        assert_eq!(
            tree.instanced_scenes().into_iter().collect::<Vec<_>>(),
            vec!["res://enemy.tscn".to_string()]
        );

        let muzzle = tree.find_by_name("Muzzle").unwrap();
        assert_eq!(tree.path(muzzle), "Main/Player/Gun/Muzzle");
        assert_eq!(tree.node(muzzle).groups, vec!["weapons".to_string(), "fx".to_string()]);
        assert!(root.groups.is_empty());
    }

    #[test]
    fn test_find_by_name_is_shallowest() {
        let source = r#"
[node name="Root" type="Node"]
[node name="Deep" type="Node" parent="."]
[node name="Label" type="Label" parent="Deep"]
[node name="Label" type="RichTextLabel" parent="."]
"#;
        let tree = SceneTree::parse(source).unwrap();
        let label = tree.find_by_name("Label").unwrap();
        assert_eq!(tree.path(label), "Root/Label");
        assert_eq!(tree.node(label).engine_type.as_deref(), Some("RichTextLabel"));
        assert_eq!(tree.find_by_name("Root"), Some(tree.root()));
        assert_eq!(tree.find_by_name("Missing"), None);
    }

    #[test]
    fn test_find_by_path() {
        let tree = SceneTree::parse(MAIN).unwrap();
        let gun = tree.find_by_name("Gun").unwrap();
        assert_eq!(tree.find_by_path("Main/Player/Gun"), Some(gun));
        assert_eq!(tree.find_by_path("Player/Gun"), Some(gun));
        assert_eq!(tree.find_by_path("Main"), Some(tree.root()));
        assert_eq!(tree.find_by_path("Main/Gun"), None);
        assert_eq!(
            tree.resolve(&BindingTarget::parse("Main/Player/Gun/Muzzle")),
            tree.find_by_name("Muzzle")
        );
    }

    #[test]
    fn test_string_resource_ids() {
        let source = r#"
[ext_resource type="PackedScene" path="res://hud.tscn" id="1_x8k2"]
[node name="Main" type="Control"]
[node name="Hud" parent="." instance=ExtResource("1_x8k2")]
"#;
        let tree = SceneTree::parse(source).unwrap();
        let hud = tree.find_by_name("Hud").unwrap();
        assert_eq!(tree.node(hud).instance.as_deref(), Some("res://hud.tscn"));
    }

    #[test]
    fn test_errors() {
        assert_eq!(SceneTree::parse("[gd_scene format=2]\n"), Err(SceneError::NoRoot));

        let missing = "[node name=\"Main\" type=\"Node\"]\n[node name=\"Gun\" type=\"Node\" parent=\"Player\"]\n";
        assert!(matches!(
            SceneTree::parse(missing),
            Err(SceneError::MissingParent { line: 2, ref parent, .. }) if parent == "Player"
        ));

        let unknown = "[node name=\"Main\" type=\"Node\"]\n[node name=\"E\" parent=\".\" instance=ExtResource( 9 )]\n";
        assert_eq!(SceneTree::parse(unknown).unwrap_err().line(), Some(2));

        let groups = "[node name=\"Main\" type=\"Node\" groups=[ enemies ]]\n";
        assert!(matches!(SceneTree::parse(groups), Err(SceneError::Syntax { line: 1, .. })));

        let unterminated = "[node name=\"Main type=\"Node\"]\n";
        assert!(matches!(SceneTree::parse(unterminated), Err(SceneError::Syntax { line: 1, .. })));
    }

    #[test]
    fn test_property_arrays_are_not_headers() {
        let source = "[node name=\"Main\" type=\"Node\"]\npoints = [\n[ 1, 2 ]\n]\n";
        let tree = SceneTree::parse(source).unwrap();
        assert_eq!(tree.len(), 1);
    }
}
