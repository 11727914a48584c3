//! Built-in engine type registry
//!
//! This module defines the parts of the Godot 3 API surface that inference
//! needs: global functions, singletons, and engine classes with their
//! properties, method return types and base class. It also carries the
//! source-level globals `Math` and `console`, which the transpiler rewrites.

use std::collections::HashMap;
use crate::types::Type;

/// An engine class.
#[derive(Debug, Clone, Default)]
pub struct ClassInfo {
    pub base: Option<String>,
    pub properties: HashMap<String, Type>,
    /// Method name to return type
    pub methods: HashMap<String, Type>,
}

/// Registry of engine globals and classes
pub struct BuiltinRegistry {
    functions: HashMap<String, Type>,
    constants: HashMap<String, Type>,
    classes: HashMap<String, ClassInfo>,
    singletons: Vec<String>,
    value_types: Vec<String>,
}

fn obj(name: &str) -> Type {
    Type::Object(name.to_string())
}

fn array_of(element: Type) -> Type {
    Type::Array(Box::new(element))
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
            constants: HashMap::new(),
            classes: HashMap::new(),
            singletons: Vec::new(),
            value_types: Vec::new(),
        };
        registry.register_all_builtins();
        registry
    }

    /// Return type of a global function such as `len` or `randf`.
    pub fn function_return(&self, name: &str) -> Option<&Type> {
        self.functions.get(name)
    }

    /// Type of a global constant such as `PI`.
    pub fn constant_type(&self, name: &str) -> Option<&Type> {
        self.constants.get(name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn is_singleton(&self, name: &str) -> bool {
        self.singletons.iter().any(|s| s == name)
    }

    /// Built-in value types are constructed by calling the type, not `.new()`.
    pub fn is_value_type(&self, name: &str) -> bool {
        self.value_types.iter().any(|s| s == name)
    }

    /// Whether `name` denotes anything global in the engine.
    pub fn is_global(&self, name: &str) -> bool {
        self.functions.contains_key(name)
            || self.constants.contains_key(name)
            || self.classes.contains_key(name)
    }

    /// Every global name, in no particular order.
    pub fn global_names(&self) -> impl Iterator<Item = &str> {
        self.functions
            .keys()
            .chain(self.constants.keys())
            .chain(self.classes.keys())
            .map(|name| name.as_str())
    }

    /// Looks up a property through the class hierarchy.
    pub fn property_type(&self, class: &str, property: &str) -> Option<&Type> {
        self.ancestors(class)
            .find_map(|info| info.properties.get(property))
    }

    /// Looks up a method return type through the class hierarchy.
    pub fn method_return(&self, class: &str, method: &str) -> Option<&Type> {
        self.ancestors(class).find_map(|info| info.methods.get(method))
    }

    /// Whether `class` is `base` or derives from it.
    pub fn inherits(&self, class: &str, base: &str) -> bool {
        let mut current = Some(class);
        let mut steps = 0;
        while let Some(name) = current {
            if name == base {
                return true;
            }
            steps += 1;
            if steps > 32 {
                return false;
            }
            current = self.classes.get(name).and_then(|info| info.base.as_deref());
        }
        false
    }

    fn ancestors<'a>(&'a self, class: &str) -> impl Iterator<Item = &'a ClassInfo> + 'a {
        let mut next = self.classes.get(class);
        let mut steps = 0;
        std::iter::from_fn(move || {
            let info = next?;
            steps += 1;
            next = if steps > 32 {
                None
            } else {
                info.base.as_deref().and_then(|base| self.classes.get(base))
            };
            Some(info)
        })
    }

    fn register_class(&mut self, name: &str, base: Option<&str>, properties: Vec<(&str, Type)>, methods: Vec<(&str, Type)>) {
        let info = ClassInfo {
            base: base.map(str::to_string),
            properties: properties.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            methods: methods.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        };
        self.classes.insert(name.to_string(), info);
    }

    fn register_all_builtins(&mut self) {
        self.register_global_functions();
        self.register_constants();
        self.register_core_classes();
        self.register_node_classes();
        self.register_value_types();
        self.register_singletons();
        self.register_source_globals();
    }

    fn register_global_functions(&mut self) {
        let functions = [
            ("print", Type::Void),
            ("prints", Type::Void),
            ("printerr", Type::Void),
            ("push_error", Type::Void),
            ("push_warning", Type::Void),
            ("assert", Type::Void),
            ("str", Type::String),
            ("len", Type::Int),
            ("int", Type::Int),
            ("float", Type::Float),
            ("bool", Type::Bool),
            ("range", array_of(Type::Int)),
            ("randi", Type::Int),
            ("randf", Type::Float),
            ("rand_range", Type::Float),
            ("randomize", Type::Void),
            ("abs", Type::Float),
            ("floor", Type::Float),
            ("ceil", Type::Float),
            ("round", Type::Float),
            ("sqrt", Type::Float),
            ("pow", Type::Float),
            ("fmod", Type::Float),
            ("clamp", Type::Float),
            ("lerp", Type::Float),
            ("min", Type::Float),
            ("max", Type::Float),
            ("sign", Type::Float),
            ("sin", Type::Float),
            ("cos", Type::Float),
            ("tan", Type::Float),
            ("atan2", Type::Float),
            ("deg2rad", Type::Float),
            ("rad2deg", Type::Float),
            ("stepify", Type::Float),
            ("hash", Type::Int),
            ("typeof", Type::Int),
            ("to_json", Type::String),
            ("parse_json", Type::Any),
            ("is_instance_valid", Type::Bool),
            ("preload", obj("Resource")),
            ("load", obj("Resource")),
            ("funcref", obj("FuncRef")),
            ("weakref", obj("WeakRef")),
            ("instance_from_id", obj("Object")),
            ("get_stack", array_of(Type::Dictionary)),
            ("Yield", Type::Any),
        ];
        for (name, ret) in functions {
            self.functions.insert(name.to_string(), ret);
        }
    }

    fn register_constants(&mut self) {
        for name in ["PI", "TAU", "INF", "NAN"] {
            self.constants.insert(name.to_string(), Type::Float);
        }
    }

    fn register_core_classes(&mut self) {
        self.register_class(
            "Object",
            None,
            vec![],
            vec![
                ("get", Type::Any),
                ("set", Type::Void),
                ("call", Type::Any),
                ("connect", Type::Int),
                ("disconnect", Type::Void),
                ("emit_signal", Type::Void),
                ("has_method", Type::Bool),
                ("get_class", Type::String),
                ("is_class", Type::Bool),
                ("free", Type::Void),
                ("get_instance_id", Type::Int),
            ],
        );
        self.register_class("Reference", Some("Object"), vec![], vec![]);
        self.register_class("Resource", Some("Reference"), vec![("resource_path", Type::String)], vec![]);
        self.register_class("PackedScene", Some("Resource"), vec![], vec![("instance", obj("Node"))]);
        self.register_class(
            "Texture",
            Some("Resource"),
            vec![],
            vec![("get_width", Type::Int), ("get_height", Type::Int), ("get_size", obj("Vector2"))],
        );
        self.register_class("Font", Some("Resource"), vec![], vec![("get_height", Type::Float)]);
        self.register_class("DynamicFont", Some("Font"), vec![("size", Type::Int)], vec![]);
        self.register_class("FuncRef", Some("Reference"), vec![], vec![("call_func", Type::Any)]);
        self.register_class("WeakRef", Some("Reference"), vec![], vec![("get_ref", obj("Object"))]);
        self.register_class(
            "SceneTree",
            Some("Object"),
            vec![("paused", Type::Bool), ("root", obj("Viewport")), ("current_scene", obj("Node"))],
            vec![
                ("change_scene", Type::Int),
                ("reload_current_scene", Type::Int),
                ("quit", Type::Void),
                ("get_nodes_in_group", array_of(obj("Node"))),
                ("create_timer", obj("SceneTreeTimer")),
            ],
        );
        self.register_class("SceneTreeTimer", Some("Reference"), vec![("time_left", Type::Float)], vec![]);
        self.register_class(
            "InputEvent",
            Some("Resource"),
            vec![],
            vec![("is_action_pressed", Type::Bool), ("is_action_released", Type::Bool), ("is_pressed", Type::Bool)],
        );
        self.register_class(
            "InputEventKey",
            Some("InputEvent"),
            vec![("scancode", Type::Int), ("pressed", Type::Bool), ("echo", Type::Bool)],
            vec![],
        );
        self.register_class(
            "InputEventMouseButton",
            Some("InputEvent"),
            vec![("button_index", Type::Int), ("position", obj("Vector2")), ("pressed", Type::Bool)],
            vec![],
        );
        self.register_class(
            "KinematicCollision2D",
            Some("Reference"),
            vec![("collider", obj("Object")), ("normal", obj("Vector2")), ("position", obj("Vector2"))],
            vec![],
        );
        self.register_class(
            "String",
            None,
            vec![],
            vec![
                ("length", Type::Int),
                ("to_upper", Type::String),
                ("to_lower", Type::String),
                ("split", array_of(Type::String)),
                ("substr", Type::String),
                ("find", Type::Int),
                ("begins_with", Type::Bool),
                ("ends_with", Type::Bool),
                ("to_int", Type::Int),
                ("to_float", Type::Float),
                ("replace", Type::String),
                ("strip_edges", Type::String),
            ],
        );
        self.register_class(
            "Array",
            None,
            vec![],
            vec![
                ("size", Type::Int),
                ("append", Type::Void),
                ("push_back", Type::Void),
                ("pop_back", Type::Any),
                ("pop_front", Type::Any),
                ("has", Type::Bool),
                ("find", Type::Int),
                ("erase", Type::Void),
                ("clear", Type::Void),
                ("empty", Type::Bool),
                ("sort", Type::Void),
                ("front", Type::Any),
                ("back", Type::Any),
                ("insert", Type::Void),
                ("remove", Type::Void),
                ("shuffle", Type::Void),
                ("invert", Type::Void),
            ],
        );
        self.register_class(
            "Dictionary",
            None,
            vec![],
            vec![
                ("size", Type::Int),
                ("has", Type::Bool),
                ("keys", array_of(Type::Unknown)),
                ("values", array_of(Type::Unknown)),
                ("erase", Type::Bool),
                ("get", Type::Any),
                ("clear", Type::Void),
                ("empty", Type::Bool),
                ("duplicate", Type::Dictionary),
            ],
        );
    }

    fn register_node_classes(&mut self) {
        self.register_class(
            "Node",
            Some("Object"),
            vec![("name", Type::String), ("owner", obj("Node")), ("pause_mode", Type::Int)],
            vec![
                ("get_node", obj("Node")),
                ("get_node_or_null", obj("Node")),
                ("has_node", Type::Bool),
                ("get_parent", obj("Node")),
                ("get_tree", obj("SceneTree")),
                ("get_viewport", obj("Viewport")),
                ("get_children", array_of(obj("Node"))),
                ("get_child", obj("Node")),
                ("get_child_count", Type::Int),
                ("add_child", Type::Void),
                ("remove_child", Type::Void),
                ("queue_free", Type::Void),
                ("is_inside_tree", Type::Bool),
                ("is_in_group", Type::Bool),
                ("add_to_group", Type::Void),
                ("set_process", Type::Void),
                ("set_physics_process", Type::Void),
                ("set_process_input", Type::Void),
            ],
        );
        self.register_class(
            "Viewport",
            Some("Node"),
            vec![("size", obj("Vector2"))],
            vec![("get_mouse_position", obj("Vector2"))],
        );
        self.register_class(
            "CanvasItem",
            Some("Node"),
            vec![("visible", Type::Bool), ("modulate", obj("Color")), ("self_modulate", obj("Color"))],
            vec![
                ("show", Type::Void),
                ("hide", Type::Void),
                ("update", Type::Void),
                ("get_global_mouse_position", obj("Vector2")),
                ("draw_line", Type::Void),
                ("draw_rect", Type::Void),
                ("draw_circle", Type::Void),
            ],
        );
        self.register_class(
            "Node2D",
            Some("CanvasItem"),
            vec![
                ("position", obj("Vector2")),
                ("global_position", obj("Vector2")),
                ("rotation", Type::Float),
                ("rotation_degrees", Type::Float),
                ("scale", obj("Vector2")),
                ("z_index", Type::Int),
            ],
            vec![("translate", Type::Void), ("rotate", Type::Void), ("look_at", Type::Void)],
        );
        self.register_class(
            "Sprite",
            Some("Node2D"),
            vec![
                ("texture", obj("Texture")),
                ("flip_h", Type::Bool),
                ("flip_v", Type::Bool),
                ("frame", Type::Int),
                ("hframes", Type::Int),
                ("vframes", Type::Int),
                ("centered", Type::Bool),
                ("offset", obj("Vector2")),
            ],
            vec![],
        );
        self.register_class(
            "AnimatedSprite",
            Some("Node2D"),
            vec![("animation", Type::String), ("frame", Type::Int), ("playing", Type::Bool)],
            vec![("play", Type::Void), ("stop", Type::Void)],
        );
        self.register_class("Position2D", Some("Node2D"), vec![], vec![]);
        self.register_class("Camera2D", Some("Node2D"), vec![("zoom", obj("Vector2")), ("current", Type::Bool)], vec![]);
        self.register_class("TileMap", Some("Node2D"), vec![("cell_size", obj("Vector2"))], vec![("get_cell", Type::Int), ("set_cell", Type::Void)]);
        self.register_class("Particles2D", Some("Node2D"), vec![("emitting", Type::Bool), ("amount", Type::Int)], vec![]);
        self.register_class("CollisionObject2D", Some("Node2D"), vec![], vec![]);
        self.register_class("PhysicsBody2D", Some("CollisionObject2D"), vec![("collision_layer", Type::Int), ("collision_mask", Type::Int)], vec![]);
        self.register_class(
            "KinematicBody2D",
            Some("PhysicsBody2D"),
            vec![],
            vec![
                ("move_and_slide", obj("Vector2")),
                ("move_and_collide", obj("KinematicCollision2D")),
                ("is_on_floor", Type::Bool),
                ("is_on_wall", Type::Bool),
                ("is_on_ceiling", Type::Bool),
            ],
        );
        self.register_class(
            "RigidBody2D",
            Some("PhysicsBody2D"),
            vec![("linear_velocity", obj("Vector2")), ("mass", Type::Float)],
            vec![("apply_impulse", Type::Void)],
        );
        self.register_class("StaticBody2D", Some("PhysicsBody2D"), vec![], vec![]);
        self.register_class(
            "Area2D",
            Some("CollisionObject2D"),
            vec![("monitoring", Type::Bool)],
            vec![("get_overlapping_bodies", array_of(obj("Node"))), ("get_overlapping_areas", array_of(obj("Area2D")))],
        );
        self.register_class("CollisionShape2D", Some("Node2D"), vec![("disabled", Type::Bool)], vec![]);
        self.register_class(
            "Control",
            Some("CanvasItem"),
            vec![("rect_position", obj("Vector2")), ("rect_size", obj("Vector2")), ("mouse_filter", Type::Int)],
            vec![("grab_focus", Type::Void), ("has_focus", Type::Bool)],
        );
        self.register_class("Label", Some("Control"), vec![("text", Type::String), ("autowrap", Type::Bool)], vec![]);
        self.register_class("Button", Some("Control"), vec![("text", Type::String), ("disabled", Type::Bool), ("pressed", Type::Bool)], vec![]);
        self.register_class("LineEdit", Some("Control"), vec![("text", Type::String)], vec![]);
        self.register_class("Panel", Some("Control"), vec![], vec![]);
        self.register_class("ColorRect", Some("Control"), vec![("color", obj("Color"))], vec![]);
        self.register_class("TextureRect", Some("Control"), vec![("texture", obj("Texture"))], vec![]);
        self.register_class("ProgressBar", Some("Control"), vec![("value", Type::Float), ("max_value", Type::Float)], vec![]);
        self.register_class(
            "Timer",
            Some("Node"),
            vec![("wait_time", Type::Float), ("one_shot", Type::Bool), ("autostart", Type::Bool), ("time_left", Type::Float)],
            vec![("start", Type::Void), ("stop", Type::Void), ("is_stopped", Type::Bool)],
        );
        self.register_class(
            "AnimationPlayer",
            Some("Node"),
            vec![("current_animation", Type::String), ("playback_speed", Type::Float)],
            vec![("play", Type::Void), ("stop", Type::Void), ("is_playing", Type::Bool)],
        );
        self.register_class(
            "Tween",
            Some("Node"),
            vec![],
            vec![("interpolate_property", Type::Bool), ("start", Type::Bool), ("stop_all", Type::Bool)],
        );
        self.register_class(
            "AudioStreamPlayer",
            Some("Node"),
            vec![("playing", Type::Bool), ("volume_db", Type::Float)],
            vec![("play", Type::Void), ("stop", Type::Void)],
        );
        self.register_class("Spatial", Some("Node"), vec![("translation", obj("Vector3")), ("visible", Type::Bool)], vec![]);
    }

    fn register_value_types(&mut self) {
        let vector2_ops = vec![
            ("length", Type::Float),
            ("length_squared", Type::Float),
            ("normalized", obj("Vector2")),
            ("distance_to", Type::Float),
            ("angle", Type::Float),
            ("angle_to", Type::Float),
            ("dot", Type::Float),
            ("rotated", obj("Vector2")),
            ("linear_interpolate", obj("Vector2")),
            ("move_toward", obj("Vector2")),
        ];
        self.register_class("Vector2", None, vec![("x", Type::Float), ("y", Type::Float)], vector2_ops);
        self.register_class(
            "Vector3",
            None,
            vec![("x", Type::Float), ("y", Type::Float), ("z", Type::Float)],
            vec![("length", Type::Float), ("normalized", obj("Vector3")), ("distance_to", Type::Float), ("dot", Type::Float)],
        );
        self.register_class(
            "Color",
            None,
            vec![("r", Type::Float), ("g", Type::Float), ("b", Type::Float), ("a", Type::Float)],
            vec![("lightened", obj("Color")), ("darkened", obj("Color"))],
        );
        self.register_class(
            "Rect2",
            None,
            vec![("position", obj("Vector2")), ("size", obj("Vector2")), ("end", obj("Vector2"))],
            vec![("has_point", Type::Bool), ("intersects", Type::Bool)],
        );
        self.register_class("Transform2D", None, vec![("origin", obj("Vector2"))], vec![]);
        self.register_class("NodePath", None, vec![], vec![("is_empty", Type::Bool)]);
        for name in ["Vector2", "Vector3", "Color", "Rect2", "Transform2D", "NodePath"] {
            self.value_types.push(name.to_string());
        }
    }

    fn register_singletons(&mut self) {
        self.register_class(
            "Input",
            Some("Object"),
            vec![],
            vec![
                ("is_action_pressed", Type::Bool),
                ("is_action_just_pressed", Type::Bool),
                ("is_action_just_released", Type::Bool),
                ("get_action_strength", Type::Float),
                ("is_key_pressed", Type::Bool),
                ("is_mouse_button_pressed", Type::Bool),
            ],
        );
        self.register_class(
            "OS",
            Some("Object"),
            vec![("window_size", obj("Vector2"))],
            vec![("get_ticks_msec", Type::Int), ("get_unix_time", Type::Int), ("get_name", Type::String)],
        );
        self.register_class(
            "Engine",
            Some("Object"),
            vec![("editor_hint", Type::Bool), ("time_scale", Type::Float)],
            vec![("get_frames_per_second", Type::Float)],
        );
        self.register_class("ProjectSettings", Some("Object"), vec![], vec![("get_setting", Type::Any)]);
        self.register_class("ResourceLoader", Some("Object"), vec![], vec![("load", obj("Resource")), ("exists", Type::Bool)]);
        for name in ["Input", "OS", "Engine", "ProjectSettings", "ResourceLoader"] {
            self.singletons.push(name.to_string());
        }
    }

    /// `Math` and `console` exist only in source; every `Math` member lowers
    /// to a float-returning engine builtin.
    fn register_source_globals(&mut self) {
        let math_methods = [
            "abs", "floor", "ceil", "round", "sqrt", "pow", "min", "max", "sin", "cos", "tan", "atan2",
            "random", "sign", "trunc",
        ];
        self.register_class(
            "Math",
            None,
            vec![("PI", Type::Float), ("E", Type::Float)],
            math_methods.iter().map(|m| (*m, Type::Float)).collect(),
        );
        self.register_class("console", None, vec![], vec![("log", Type::Void), ("error", Type::Void), ("warn", Type::Void)]);
        self.singletons.push("Math".to_string());
        self.singletons.push("console".to_string());
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_functions() {
        let registry = BuiltinRegistry::new();
        assert_eq!(registry.function_return("len"), Some(&Type::Int));
        assert_eq!(registry.function_return("randf"), Some(&Type::Float));
        assert!(registry.function_return("readFileSync").is_none());
    }

    #[test]
    fn test_inherited_lookup() {
        let registry = BuiltinRegistry::new();
        assert_eq!(registry.property_type("Sprite", "position"), Some(&obj("Vector2")));
        assert_eq!(registry.method_return("KinematicBody2D", "queue_free"), Some(&Type::Void));
        assert_eq!(registry.method_return("Sprite", "get_tree"), Some(&obj("SceneTree")));
        assert!(registry.property_type("Sprite", "text").is_none());
    }

    #[test]
    fn test_inherits() {
        let registry = BuiltinRegistry::new();
        assert!(registry.inherits("Sprite", "Node"));
        assert!(registry.inherits("Label", "CanvasItem"));
        assert!(!registry.inherits("Node", "Sprite"));
    }

    #[test]
    fn test_value_types_and_singletons() {
        let registry = BuiltinRegistry::new();
        assert!(registry.is_value_type("Vector2"));
        assert!(!registry.is_value_type("Sprite"));
        assert!(registry.is_singleton("Input"));
        assert!(registry.is_global("Sprite"));
        assert!(registry.is_global("PI"));
        assert_eq!(registry.method_return("Math", "floor"), Some(&Type::Float));
    }
}
