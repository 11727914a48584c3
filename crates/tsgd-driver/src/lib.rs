//! tsgd Project Pipeline
//!
//! Keeps the generated GDScript of a Godot project in step with its
//! TypeScript sources and scene assets. The [`ProjectModel`] owns every
//! classified asset, synthesizes the scene-derived definitions the
//! analyzer needs, and recompiles only the scripts a change can affect.

pub mod asset;
pub mod config;
pub mod definitions;
pub mod dep_graph;
pub mod error;
pub mod godot_project;
pub mod project;
pub mod report;
pub mod scene;
pub mod watch;

pub use asset::{Asset, AssetKind, LoadedAsset};
pub use config::{Config, ProjectPaths};
pub use definitions::{DefinitionSynthesizer, Synthesis};
pub use dep_graph::DepGraph;
pub use error::ProjectError;
pub use godot_project::GodotProject;
pub use project::{BuildStep, ProjectModel};
pub use scene::{SceneNode, SceneNodeId, SceneTree};
pub use watch::{EventQueue, WatchEvent};
