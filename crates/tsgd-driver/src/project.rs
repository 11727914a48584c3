//! The project asset graph
//!
//! [`ProjectModel`] owns every classified asset and services add, change
//! and remove events one at a time. An event first updates the asset set,
//! then regenerates the scene-derived definitions and pushes them into the
//! analysis session, and only then recompiles the scripts the event can
//! affect:
//!
//! - a script change recompiles that script; if its node bindings moved,
//!   the scenes involved are regenerated and their other scripts rebuilt
//!   when the derived type actually changed
//! - a scene change regenerates that scene and every scene instancing it,
//!   then recompiles every script bound to any of them
//! - adding or removing an asset recompiles the scripts naming its path
//! - a `project.godot` change recompiles scripts whose autoload status
//!   flipped
//!
//! A compile that reports errors leaves the previous output in place.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use log::{debug, error, info, warn};
use tsgd_ast::Span;
use tsgd_codegen::{CompileTarget, CompiledUnit};
use tsgd_typeck::{AnalysisContext, Analyzer, Definitions, Diagnostic, DiagnosticCode, ScriptBindings};
use crate::asset::{signature, Asset, AssetKind, LoadedAsset};
use crate::config::{Config, ConfigError, ProjectPaths};
use crate::definitions::{DefinitionSynthesizer, Synthesis, ASSET_PATHS_FILE, SCENES_DIR};
use crate::dep_graph::DepGraph;
use crate::error::ProjectError;
use crate::godot_project::GodotProject;
use crate::scene::SceneTree;
use crate::watch::{self, WatchEvent};

/// One unit of work, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStep {
    /// A scene's derived type was regenerated
    Synthesized(String),
    /// A script was compiled
    Compiled(String),
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStep::Synthesized(scene) => write!(f, "synthesized {}", scene),
            BuildStep::Compiled(script) => write!(f, "compiled {}", script),
        }
    }
}

/// Work triggered by one event
#[derive(Debug, Default)]
struct Rebuild {
    scenes: BTreeSet<String>,
    scripts: BTreeSet<String>,
}

pub struct ProjectModel {
    paths: ProjectPaths,
    analyzer: Analyzer,
    /// Keyed by resource path
    assets: BTreeMap<String, Asset>,
    scenes: BTreeMap<String, SceneTree>,
    scene_errors: BTreeMap<String, Diagnostic>,
    bindings: BTreeMap<String, ScriptBindings>,
    godot: GodotProject,
    graph: DepGraph,
    synthesis: Synthesis,
    /// Last successful compile of each script
    units: BTreeMap<String, CompiledUnit>,
    /// Diagnostics of the latest compile of each script
    diagnostics: BTreeMap<String, Vec<Diagnostic>>,
    log: Vec<BuildStep>,
    /// Set once the initial enumeration has been built
    ready: bool,
}

impl ProjectModel {
    /// Opens the project rooted at `root`, reading its `tsgd.json`.
    pub fn open(root: &Path) -> Result<Self, ProjectError> {
        if !root.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: root.to_path_buf(),
            }
            .into());
        }
        let config = Config::load(root)?;
        Ok(Self::with_config(root, &config))
    }

    pub fn with_config(root: &Path, config: &Config) -> Self {
        Self {
            paths: ProjectPaths::new(root, config),
            analyzer: Analyzer::new(),
            assets: BTreeMap::new(),
            scenes: BTreeMap::new(),
            scene_errors: BTreeMap::new(),
            bindings: BTreeMap::new(),
            godot: GodotProject::default(),
            graph: DepGraph::new(),
            synthesis: Synthesis::default(),
            units: BTreeMap::new(),
            diagnostics: BTreeMap::new(),
            log: Vec::new(),
            ready: false,
        }
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Classifies and reads `path` without touching the project.
    pub fn load(&self, path: &Path) -> Result<LoadedAsset, ProjectError> {
        let kind = AssetKind::classify(path)?;
        let res_path = self
            .paths
            .res_path(path)
            .ok_or_else(|| ProjectError::OutsideProject {
                path: path.to_path_buf(),
            })?;
        let contents = fs::read(path).map_err(|source| ProjectError::io(path, source))?;
        Ok(LoadedAsset {
            asset: Asset {
                kind,
                fs_path: path.to_path_buf(),
                res_path,
                signature: signature(&contents),
            },
            contents,
        })
    }

    /// Loads every supported file below the root without building anything.
    /// Returns the number of assets known afterwards.
    pub fn discover(&mut self) -> usize {
        for path in watch::enumerate(&self.paths) {
            if let Err(error) = self.on_add(&path) {
                warn!("{}: {}", error.code(), error);
            }
        }
        self.assets.len()
    }

    /// Loads the whole project, then writes every definition and compiles
    /// every script.
    pub fn scan(&mut self) -> Result<usize, ProjectError> {
        let count = self.discover();
        info!("found {} asset(s) in {}", count, self.paths.root.display());
        self.handle(WatchEvent::Ready)?;
        Ok(count)
    }

    pub fn handle(&mut self, event: WatchEvent) -> Result<(), ProjectError> {
        match event {
            WatchEvent::Add(path) => self.on_add(&path),
            WatchEvent::Change(path) => self.on_change(&path),
            WatchEvent::Remove(path) => self.on_remove(&path),
            WatchEvent::Ready => {
                self.build_all();
                Ok(())
            }
        }
    }

    // =========================================================================
    // Full builds
    // =========================================================================

    /// Rewrites every declaration file and compiles every script.
    pub fn build_all(&mut self) {
        self.build_definitions();
        let scripts: Vec<String> = self.scripts().collect();
        for script in scripts {
            self.compile_script(&script);
        }
    }

    /// Rewrites every declaration file.
    pub fn build_definitions(&mut self) {
        self.ready = true;
        self.resynthesize(true);
        self.clean_scene_declarations();
        let scenes: Vec<String> = self.synthesis.scenes.keys().cloned().collect();
        self.log.extend(scenes.into_iter().map(BuildStep::Synthesized));
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// A new file appeared. A path already known is handled as a change.
    pub fn on_add(&mut self, path: &Path) -> Result<(), ProjectError> {
        if self.paths.is_ignored(path) {
            return Ok(());
        }
        let loaded = self.load(path)?;
        self.upsert(loaded)
    }

    /// A file changed. An unknown path is handled as an addition, an
    /// unchanged signature is a no-op.
    pub fn on_change(&mut self, path: &Path) -> Result<(), ProjectError> {
        self.on_add(path)
    }

    pub fn on_remove(&mut self, path: &Path) -> Result<(), ProjectError> {
        if self.paths.is_ignored(path) {
            return Ok(());
        }
        let Some(res_path) = self.paths.res_path(path) else {
            return Ok(());
        };
        let old_autoloads = self.autoload_scripts();
        let old_actions = self.godot.input_actions.clone();
        let Some(asset) = self.assets.remove(&res_path) else {
            debug!("remove of unknown asset {}", res_path);
            return Ok(());
        };
        if self.ready {
            info!("remove: {}", res_path);
        }

        let mut rebuild = Rebuild::default();
        let mut old_bindings = None;
        match asset.kind {
            AssetKind::Script => {
                self.analyzer.remove(&res_path);
                old_bindings = self.bindings.remove(&res_path);
                self.graph.remove_script(&res_path);
                self.diagnostics.remove(&res_path);
                let unit = self.units.remove(&res_path);
                if let Some((output, output_res)) = self.paths.script_output(&asset.fs_path) {
                    remove_outputs(&output, unit.as_ref());
                    rebuild.scripts.extend(self.graph.scripts_referencing(&output_res));
                }
            }
            AssetKind::Scene => {
                self.scenes.remove(&res_path);
                self.scene_errors.remove(&res_path);
                self.plan_scene(&res_path, &mut rebuild);
                rebuild.scenes.remove(&res_path);
                rebuild.scripts.extend(self.graph.scripts_referencing(&res_path));
                self.graph.remove_scene(&res_path);
            }
            kind if kind.is_opaque() => {
                rebuild.scripts.extend(self.graph.scripts_referencing(&res_path));
            }
            _ => {
                self.godot = GodotProject::default();
            }
        }
        if !self.ready {
            return Ok(());
        }

        let changed = self.resynthesize(false);
        if let Some(scene) = old_bindings.and_then(|bindings| bindings.scene) {
            self.plan_bound_scene(scene, &changed, &mut rebuild);
        }
        if asset.kind == AssetKind::ProjectConfig {
            self.plan_project(&old_autoloads, &old_actions, &mut rebuild);
        }
        self.execute(rebuild);
        Ok(())
    }

    fn upsert(&mut self, loaded: LoadedAsset) -> Result<(), ProjectError> {
        let res_path = loaded.asset.res_path.clone();
        let kind = loaded.asset.kind;
        let is_new = match self.assets.get(&res_path) {
            Some(previous) if previous.signature == loaded.asset.signature => {
                debug!("unchanged: {}", res_path);
                return Ok(());
            }
            Some(_) => false,
            None => {
                self.check_collision(&loaded.asset)?;
                true
            }
        };
        if self.ready {
            info!("{}: {}", if is_new { "add" } else { "change" }, res_path);
        }

        let old_bindings = self.bindings.get(&res_path).cloned();
        let old_autoloads = self.autoload_scripts();
        let old_actions = self.godot.input_actions.clone();
        self.ingest(loaded);
        if !self.ready {
            return Ok(());
        }

        let changed = self.resynthesize(false);
        let mut rebuild = Rebuild::default();
        match kind {
            AssetKind::Script => {
                rebuild.scripts.insert(res_path.clone());
                let new_bindings = self.bindings.get(&res_path);
                if old_bindings.as_ref() != new_bindings {
                    let scenes: BTreeSet<String> = old_bindings
                        .iter()
                        .chain(new_bindings)
                        .filter_map(|bindings| bindings.scene.clone())
                        .collect();
                    for scene in scenes {
                        self.plan_bound_scene(scene, &changed, &mut rebuild);
                    }
                }
                if is_new {
                    if let Some(output) = self.output_res_path(&res_path) {
                        rebuild.scripts.extend(self.graph.scripts_referencing(&output));
                    }
                }
            }
            AssetKind::Scene => {
                self.plan_scene(&res_path, &mut rebuild);
                if is_new {
                    rebuild.scripts.extend(self.graph.scripts_referencing(&res_path));
                }
            }
            AssetKind::ProjectConfig => self.plan_project(&old_autoloads, &old_actions, &mut rebuild),
            _ => {
                if is_new {
                    rebuild.scripts.extend(self.graph.scripts_referencing(&res_path));
                }
            }
        }
        self.execute(rebuild);
        Ok(())
    }

    /// Records the asset and updates the state derived from its contents.
    fn ingest(&mut self, loaded: LoadedAsset) {
        let text = loaded.text();
        let asset = loaded.asset;
        let res_path = asset.res_path.clone();
        match asset.kind {
            AssetKind::Script => {
                self.analyzer.set_source(&res_path, &text);
                let bindings = self.analyzer.bindings(&res_path);
                self.graph.set_bound_scene(&res_path, bindings.scene.clone());
                self.bindings.insert(res_path.clone(), bindings);
            }
            AssetKind::Scene => match SceneTree::parse(&text) {
                Ok(tree) => {
                    self.graph.set_instances(&res_path, tree.instanced_scenes());
                    self.scenes.insert(res_path.clone(), tree);
                    self.scene_errors.remove(&res_path);
                }
                Err(scene_error) => {
                    // The last good tree stays in effect until the scene parses again
                    warn!("{}: {}", res_path, scene_error);
                    let span = scene_error
                        .line()
                        .map_or(Span::new(0, 0, 0), |line| line_span(&text, line));
                    self.scene_errors.insert(
                        res_path.clone(),
                        Diagnostic::error(DiagnosticCode::SceneParse, scene_error.to_string(), span),
                    );
                }
            },
            AssetKind::ProjectConfig => self.godot = GodotProject::parse(&text),
            _ => {}
        }
        self.assets.insert(res_path, asset);
    }

    /// Resource paths are compared case-insensitively; generated script
    /// paths must be unique too.
    fn check_collision(&self, asset: &Asset) -> Result<(), ProjectError> {
        if let Some(existing) = self
            .assets
            .keys()
            .find(|existing| existing.eq_ignore_ascii_case(&asset.res_path))
        {
            return Err(ProjectError::Collision {
                res_path: asset.res_path.clone(),
                existing: existing.clone(),
            });
        }
        if asset.kind != AssetKind::Script {
            return Ok(());
        }
        let Some((_, output)) = self.paths.script_output(&asset.fs_path) else {
            return Ok(());
        };
        let clash = self
            .assets
            .values()
            .filter(|other| other.kind == AssetKind::Script)
            .find(|other| {
                self.paths
                    .script_output(&other.fs_path)
                    .is_some_and(|(_, other_output)| other_output == output)
            });
        if let Some(other) = clash {
            return Err(ProjectError::Collision {
                res_path: output,
                existing: other.res_path.clone(),
            });
        }
        Ok(())
    }

    // =========================================================================
    // Planning
    // =========================================================================

    /// `scene` and every scene instancing it are regenerated; their scripts
    /// are recompiled.
    fn plan_scene(&self, scene: &str, rebuild: &mut Rebuild) {
        rebuild.scenes.insert(scene.to_string());
        rebuild.scripts.extend(self.graph.scripts_bound_to(scene));
        for parent in self.graph.instancing_closure(scene) {
            rebuild.scripts.extend(self.graph.scripts_bound_to(&parent));
            rebuild.scenes.insert(parent);
        }
    }

    /// A script's bindings against `scene` changed; the scene's other
    /// scripts only rebuild if its derived type changed.
    fn plan_bound_scene(&self, scene: String, changed: &BTreeSet<String>, rebuild: &mut Rebuild) {
        if !self.scenes.contains_key(&scene) {
            return;
        }
        if changed.contains(&scene) {
            rebuild.scripts.extend(self.graph.scripts_bound_to(&scene));
        }
        rebuild.scenes.insert(scene);
    }

    /// Scripts that became or stopped being autoloads rebuild; a changed
    /// set of input actions rebuilds every script.
    fn plan_project(
        &self,
        old_autoloads: &BTreeSet<String>,
        old_actions: &BTreeSet<String>,
        rebuild: &mut Rebuild,
    ) {
        if *old_actions != self.godot.input_actions {
            rebuild.scripts.extend(self.scripts());
            return;
        }
        let new = self.autoload_scripts();
        rebuild.scripts.extend(old_autoloads.symmetric_difference(&new).cloned());
    }

    fn execute(&mut self, rebuild: Rebuild) {
        for scene in rebuild.scenes {
            debug!("synthesized {}", scene);
            self.log.push(BuildStep::Synthesized(scene));
        }
        for script in rebuild.scripts {
            self.compile_script(&script);
        }
    }

    // =========================================================================
    // Definitions
    // =========================================================================

    /// Regenerates the derived definitions, writes the declaration files
    /// that changed (all of them when `force`) and pushes the result into
    /// the analysis session. Returns the scenes whose declaration changed.
    fn resynthesize(&mut self, force: bool) -> BTreeSet<String> {
        let resources: Vec<(String, AssetKind)> = self
            .assets
            .values()
            .filter_map(|asset| match asset.kind {
                AssetKind::Script => self
                    .paths
                    .script_output(&asset.fs_path)
                    .map(|(_, res)| (res, AssetKind::Script)),
                AssetKind::ProjectConfig => None,
                kind => Some((asset.res_path.clone(), kind)),
            })
            .collect();
        let synthesis = DefinitionSynthesizer::new(&self.scenes, &self.bindings)
            .with_resources(resources)
            .with_project(&self.godot)
            .with_classes(self.script_classes())
            .run();

        let previous = std::mem::take(&mut self.synthesis.scenes);
        let scenes_dir = self.paths.defs_dir.join(SCENES_DIR);
        let mut changed = BTreeSet::new();
        for (scene, declaration) in &previous {
            let kept = matches!(
                synthesis.scenes.get(scene),
                Some(current) if current.type_name == declaration.type_name
            );
            if !kept {
                changed.insert(scene.clone());
                remove_file(&scenes_dir.join(declaration.file_name()));
            }
        }
        for (scene, declaration) in &synthesis.scenes {
            if force || previous.get(scene) != Some(declaration) {
                changed.insert(scene.clone());
                if let Err(error) = write_if_changed(&scenes_dir.join(declaration.file_name()), &declaration.text) {
                    error!("{}", error);
                }
            }
        }
        if force || synthesis.asset_paths != self.synthesis.asset_paths {
            let path = self.paths.defs_dir.join(ASSET_PATHS_FILE);
            if let Err(error) = write_if_changed(&path, &synthesis.asset_paths) {
                error!("{}", error);
            }
        }

        self.analyzer.set_definitions(synthesis.definitions.clone());
        self.synthesis = synthesis;
        changed
    }

    /// Deletes declaration files left behind by scenes that no longer exist.
    fn clean_scene_declarations(&self) {
        let scenes_dir = self.paths.defs_dir.join(SCENES_DIR);
        let Ok(entries) = fs::read_dir(&scenes_dir) else {
            return;
        };
        let current: BTreeSet<String> = self.synthesis.scenes.values().map(|d| d.file_name()).collect();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".d.ts") && !current.contains(&name) {
                debug!("removing stale {}", name);
                remove_file(&entry.path());
            }
        }
    }

    /// `class_name` of every non-autoload script, mapped to its generated
    /// path.
    fn script_classes(&self) -> BTreeMap<String, String> {
        self.assets
            .values()
            .filter(|asset| asset.kind == AssetKind::Script)
            .filter_map(|asset| {
                let (_, output) = self.paths.script_output(&asset.fs_path)?;
                if self.godot.autoloads.values().any(|path| *path == output) {
                    return None;
                }
                let class = self.analyzer.program(&asset.res_path)?.main_class()?;
                Some((class.name.value.name.clone(), output))
            })
            .collect()
    }

    fn autoload_scripts(&self) -> BTreeSet<String> {
        self.assets
            .values()
            .filter(|asset| asset.kind == AssetKind::Script)
            .filter(|asset| {
                self.paths
                    .script_output(&asset.fs_path)
                    .is_some_and(|(_, output)| self.godot.autoloads.values().any(|path| *path == output))
            })
            .map(|asset| asset.res_path.clone())
            .collect()
    }

    // =========================================================================
    // Compiling
    // =========================================================================

    fn compile_script(&mut self, script: &str) {
        let Some(asset) = self.assets.get(script) else {
            return;
        };
        let Some((output, output_res_path)) = self.paths.script_output(&asset.fs_path) else {
            warn!("{}: no output path", script);
            return;
        };

        self.analyzer.check(script);
        let target = CompileTarget {
            file: script.to_string(),
            output_res_path,
        };
        let unit = tsgd_codegen::compile(&target, &self.analyzer);
        self.log.push(BuildStep::Compiled(script.to_string()));
        self.graph.set_resources(script, unit.resource_refs.clone());
        self.diagnostics.insert(script.to_string(), unit.diagnostics.clone());

        if unit.has_errors() {
            let count = unit.diagnostics.iter().filter(|d| d.is_error()).count();
            warn!("{}: {} error(s), keeping the previous output", script, count);
            return;
        }
        if let Err(error) = write_unit(&output, &unit, self.units.get(script)) {
            error!("{}", error);
            self.diagnostics
                .entry(script.to_string())
                .or_default()
                .push(Diagnostic::error(DiagnosticCode::Io, error.to_string(), Span::new(0, 0, 0)));
            return;
        }
        debug!("compiled {} -> {}", script, output.display());
        self.units.insert(script.to_string(), unit);
    }

    fn output_res_path(&self, script: &str) -> Option<String> {
        let asset = self.assets.get(script)?;
        self.paths.script_output(&asset.fs_path).map(|(_, res)| res)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn asset(&self, res_path: &str) -> Option<&Asset> {
        self.assets.get(res_path)
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    /// Resource paths of all scripts, in order.
    pub fn scripts(&self) -> impl Iterator<Item = String> + '_ {
        self.assets
            .values()
            .filter(|asset| asset.kind == AssetKind::Script)
            .map(|asset| asset.res_path.clone())
    }

    /// Last successfully compiled unit of `script`.
    pub fn unit(&self, script: &str) -> Option<&CompiledUnit> {
        self.units.get(script)
    }

    pub fn scene(&self, res_path: &str) -> Option<&SceneTree> {
        self.scenes.get(res_path)
    }

    pub fn definitions(&self) -> &Definitions {
        &self.synthesis.definitions
    }

    pub fn synthesis(&self) -> &Synthesis {
        &self.synthesis
    }

    /// Current diagnostics of one asset: the latest compile of a script, or
    /// parse errors and collisions of a scene.
    pub fn diagnostics(&self, res_path: &str) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics.get(res_path).cloned().unwrap_or_default();
        diagnostics.extend(self.scene_errors.get(res_path).cloned());
        if let Some(collisions) = self.synthesis.diagnostics.get(res_path) {
            diagnostics.extend(collisions.iter().cloned());
        }
        diagnostics
    }

    /// Resource paths of every asset with diagnostics, in order.
    pub fn assets_with_diagnostics(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .filter(|(_, diagnostics)| !diagnostics.is_empty())
            .map(|(path, _)| path)
            .chain(self.scene_errors.keys())
            .chain(self.synthesis.diagnostics.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.assets_with_diagnostics()
            .iter()
            .map(|path| self.diagnostics(path).iter().filter(|d| d.is_error()).count())
            .sum()
    }

    /// Source text of an asset, for reporting.
    pub fn source_of(&self, res_path: &str) -> Option<String> {
        if let Some(source) = self.analyzer.source(res_path) {
            return Some(source.to_string());
        }
        let asset = self.assets.get(res_path)?;
        fs::read_to_string(&asset.fs_path).ok()
    }

    pub fn build_log(&self) -> &[BuildStep] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

/// Writes the primary script and its auxiliary files, deleting auxiliary
/// files the previous compile produced and this one did not.
fn write_unit(output: &Path, unit: &CompiledUnit, previous: Option<&CompiledUnit>) -> Result<(), ProjectError> {
    let dir = output.parent().map(Path::to_path_buf).unwrap_or_default();
    write_if_changed(output, &unit.text)?;
    for aux in &unit.aux_files {
        write_if_changed(&dir.join(&aux.name), &aux.content)?;
    }
    if let Some(previous) = previous {
        for stale in &previous.aux_files {
            if !unit.aux_files.iter().any(|aux| aux.name == stale.name) {
                debug!("removing stale {}", stale.name);
                remove_file(&dir.join(&stale.name));
            }
        }
    }
    Ok(())
}

fn remove_outputs(output: &Path, unit: Option<&CompiledUnit>) {
    remove_file(output);
    if let (Some(dir), Some(unit)) = (output.parent(), unit) {
        for aux in &unit.aux_files {
            remove_file(&dir.join(&aux.name));
        }
    }
}

/// Leaves the file alone when it already holds `contents`, so the engine
/// does not see a spurious modification.
fn write_if_changed(path: &Path, contents: &str) -> Result<(), ProjectError> {
    if fs::read_to_string(path).is_ok_and(|existing| existing == contents) {
        return Ok(());
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| ProjectError::io(dir, source))?;
    }
    fs::write(path, contents).map_err(|source| ProjectError::io(path, source))
}

fn remove_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => warn!("failed to remove {}: {}", path.display(), error),
    }
}

/// Span covering line `line` (1-based) of `text`.
fn line_span(text: &str, line: usize) -> Span {
    let mut start = 0;
    for (index, content) in text.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            return Span::new(start, start + content.trim_end().len(), 0);
        }
        start += content.len();
    }
    Span::new(0, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_span() {
        let text = "[node name=\"A\"]\n[node oops]\n";
        let span = line_span(text, 2);
        assert_eq!(&text[span.start..span.end], "[node oops]");
        assert_eq!(line_span(text, 9), Span::new(0, 0, 0));
    }

    #[test]
    fn test_write_unit_removes_stale_aux() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("compiled/player.gd");
        let aux = |name: &str| tsgd_codegen::AuxFile {
            name: name.to_string(),
            content: "const A = 0\n".to_string(),
        };
        let first = CompiledUnit {
            text: "extends Node\n".into(),
            aux_files: vec![aux("player_State.gd"), aux("player_Mode.gd")],
            ..CompiledUnit::default()
        };
        write_unit(&output, &first, None).unwrap();
        assert!(dir.path().join("compiled/player_Mode.gd").exists());

        let second = CompiledUnit {
            text: "extends Node2D\n".into(),
            aux_files: vec![aux("player_State.gd")],
            ..CompiledUnit::default()
        };
        write_unit(&output, &second, Some(&first)).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "extends Node2D\n");
        assert!(dir.path().join("compiled/player_State.gd").exists());
        assert!(!dir.path().join("compiled/player_Mode.gd").exists());
    }
}
