//! Dependency graph between scripts, scenes and resource paths

use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Edges of one script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptNode {
    /// Scene the script binds node paths against
    pub scene: Option<String>,
    /// `res://` paths the script refers to
    pub resources: BTreeSet<String>,
}

/// Dependency graph for deciding what a change invalidates.
///
/// Every key is a `res://` path; scripts are keyed by their source path.
pub struct DepGraph {
    /// Map from script to its edges
    scripts: BTreeMap<String, ScriptNode>,
    /// Map from scene to the scenes it instances
    instances: BTreeMap<String, BTreeSet<String>>,
}

impl DepGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self {
            scripts: BTreeMap::new(),
            instances: BTreeMap::new(),
        }
    }

    /// Set the scene a script is bound to
    pub fn set_bound_scene(&mut self, script: &str, scene: Option<String>) {
        self.scripts.entry(script.to_string()).or_default().scene = scene;
    }

    /// Replace the resource paths a script refers to
    pub fn set_resources(&mut self, script: &str, resources: BTreeSet<String>) {
        self.scripts.entry(script.to_string()).or_default().resources = resources;
    }

    /// Drop a script and all of its edges
    pub fn remove_script(&mut self, script: &str) -> Option<ScriptNode> {
        self.scripts.remove(script)
    }

    /// Get the edges of a script
    pub fn script(&self, script: &str) -> Option<&ScriptNode> {
        self.scripts.get(script)
    }

    /// Replace the scenes instanced by `scene`
    pub fn set_instances(&mut self, scene: &str, instanced: BTreeSet<String>) {
        if instanced.is_empty() {
            self.instances.remove(scene);
        } else {
            self.instances.insert(scene.to_string(), instanced);
        }
    }

    /// Drop the instancing edges leaving `scene`
    pub fn remove_scene(&mut self, scene: &str) {
        self.instances.remove(scene);
    }

    /// Scripts bound to `scene`, in path order
    pub fn scripts_bound_to(&self, scene: &str) -> Vec<String> {
        self.scripts
            .iter()
            .filter(|(_, node)| node.scene.as_deref() == Some(scene))
            .map(|(script, _)| script.clone())
            .collect()
    }

    /// Scripts referring to `resource` by path, in path order
    pub fn scripts_referencing(&self, resource: &str) -> Vec<String> {
        self.scripts
            .iter()
            .filter(|(_, node)| node.resources.contains(resource))
            .map(|(script, _)| script.clone())
            .collect()
    }

    /// Scenes that instance `scene` directly or through other scenes,
    /// nearest first. `scene` itself is never included, even on a cycle.
    pub fn instancing_closure(&self, scene: &str) -> Vec<String> {
        let mut seen: BTreeSet<&str> = BTreeSet::from([scene]);
        let mut result = Vec::new();
        let mut queue = VecDeque::from([scene]);

        while let Some(current) = queue.pop_front() {
            for (parent, instanced) in &self.instances {
                if instanced.contains(current) && seen.insert(parent.as_str()) {
                    result.push(parent.clone());
                    queue.push_back(parent.as_str());
                }
            }
        }

        result
    }
}

impl Default for DepGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn test_scene_edges() {
        let mut graph = DepGraph::new();
        graph.set_bound_scene("res://b.ts", Some("res://main.tscn".into()));
        graph.set_bound_scene("res://a.ts", Some("res://main.tscn".into()));
        graph.set_bound_scene("res://c.ts", Some("res://menu.tscn".into()));
        graph.set_bound_scene("res://d.ts", None);

        assert_eq!(graph.scripts_bound_to("res://main.tscn"), vec!["res://a.ts", "res://b.ts"]);
        assert_eq!(graph.scripts_bound_to("res://menu.tscn"), vec!["res://c.ts"]);
        assert!(graph.scripts_bound_to("res://other.tscn").is_empty());

        graph.remove_script("res://a.ts");
        assert_eq!(graph.scripts_bound_to("res://main.tscn"), vec!["res://b.ts"]);
    }

    #[test]
    fn test_resource_edges() {
        let mut graph = DepGraph::new();
        graph.set_resources("res://a.ts", set(&["res://icon.png", "res://main.tscn"]));
        graph.set_resources("res://b.ts", set(&["res://icon.png"]));
        assert_eq!(graph.scripts_referencing("res://icon.png"), vec!["res://a.ts", "res://b.ts"]);

        // Resources are replaced wholesale, the bound scene is kept
        graph.set_bound_scene("res://a.ts", Some("res://main.tscn".into()));
        graph.set_resources("res://a.ts", set(&[]));
        assert_eq!(graph.scripts_referencing("res://icon.png"), vec!["res://b.ts"]);
        assert_eq!(graph.script("res://a.ts").and_then(|n| n.scene.as_deref()), Some("res://main.tscn"));
    }

    #[test]
    fn test_instancing_closure() {
        let mut graph = DepGraph::new();
        graph.set_instances("res://level.tscn", set(&["res://enemy.tscn"]));
        graph.set_instances("res://world.tscn", set(&["res://level.tscn"]));
        graph.set_instances("res://menu.tscn", set(&["res://button.tscn"]));

        assert_eq!(
            graph.instancing_closure("res://enemy.tscn"),
            vec!["res://level.tscn", "res://world.tscn"]
        );
        assert!(graph.instancing_closure("res://world.tscn").is_empty());

        graph.remove_scene("res://world.tscn");
        assert_eq!(graph.instancing_closure("res://enemy.tscn"), vec!["res://level.tscn"]);
    }

    #[test]
    fn test_instancing_cycle() {
        let mut graph = DepGraph::new();
        graph.set_instances("res://a.tscn", set(&["res://b.tscn"]));
        graph.set_instances("res://b.tscn", set(&["res://a.tscn"]));
        assert_eq!(graph.instancing_closure("res://a.tscn"), vec!["res://b.tscn"]);
    }
}
