//! Incremental analysis session
//!
//! The [`Analyzer`] owns the current source, syntax tree and inferred types
//! of every script. Sources are re-parsed only when their text changes, and
//! inference is re-run lazily after a source or the project definitions
//! change. Consumers query it through [`AnalysisContext`] so tests can
//! substitute a stub.

use std::collections::{BTreeMap, HashMap};
use tsgd_ast::{NodeId, Program};
use crate::bindings::{collect_bindings, ScriptBindings};
use crate::builtins::BuiltinRegistry;
use crate::definitions::Definitions;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::infer::Inferencer;
use crate::types::Type;

/// What the transpiler may ask of the analysis session.
pub trait AnalysisContext {
    /// Parsed syntax tree, `None` if the file is unknown or failed to parse.
    fn program(&self, file: &str) -> Option<&Program>;

    /// Inferred type of a node; `Unknown` when nothing is known.
    fn get_type(&self, file: &str, node: NodeId) -> Type;

    /// Diagnostics produced while parsing and analyzing `file`.
    fn get_diagnostics(&self, file: &str) -> Vec<Diagnostic>;

    /// Project-derived definitions currently in effect.
    fn definitions(&self) -> &Definitions;

    /// Engine globals and classes.
    fn builtins(&self) -> &BuiltinRegistry;
}

#[derive(Debug)]
struct FileState {
    file_id: usize,
    source: String,
    program: Option<Program>,
    diagnostics: Vec<Diagnostic>,
    types: HashMap<NodeId, Type>,
    checked: bool,
}

/// Analysis session over a set of named source files.
pub struct Analyzer {
    files: BTreeMap<String, FileState>,
    definitions: Definitions,
    builtins: BuiltinRegistry,
    next_file_id: usize,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
            definitions: Definitions::default(),
            builtins: BuiltinRegistry::new(),
            next_file_id: 0,
        }
    }

    /// Sets the text of `file`, re-parsing it if it changed. Returns whether
    /// the text changed.
    pub fn set_source(&mut self, file: &str, source: &str) -> bool {
        if let Some(state) = self.files.get(file) {
            if state.source == source {
                return false;
            }
        }

        let file_id = match self.files.get(file) {
            Some(state) => state.file_id,
            None => {
                let id = self.next_file_id;
                self.next_file_id += 1;
                id
            }
        };

        let (program, diagnostics) = match tsgd_parser::parse_source(source, file_id) {
            Ok(program) => (Some(program), Vec::new()),
            Err(errors) => {
                log::debug!("{}: {} parse error(s)", file, errors.len());
                let diagnostics = errors
                    .into_iter()
                    .map(|error| Diagnostic::error(DiagnosticCode::ParseError, error.message, error.span))
                    .collect();
                (None, diagnostics)
            }
        };

        self.files.insert(
            file.to_string(),
            FileState {
                file_id,
                source: source.to_string(),
                program,
                diagnostics,
                types: HashMap::new(),
                checked: false,
            },
        );
        true
    }

    pub fn remove(&mut self, file: &str) -> bool {
        self.files.remove(file).is_some()
    }

    pub fn contains(&self, file: &str) -> bool {
        self.files.contains_key(file)
    }

    pub fn source(&self, file: &str) -> Option<&str> {
        self.files.get(file).map(|state| state.source.as_str())
    }

    pub fn file_id(&self, file: &str) -> Option<usize> {
        self.files.get(file).map(|state| state.file_id)
    }

    /// File registered under `file_id`.
    pub fn file_name(&self, file_id: usize) -> Option<&str> {
        self.files
            .iter()
            .find(|(_, state)| state.file_id == file_id)
            .map(|(name, _)| name.as_str())
    }

    /// Replaces the project definitions. Every file is re-inferred on its
    /// next check.
    pub fn set_definitions(&mut self, definitions: Definitions) {
        if self.definitions == definitions {
            return;
        }
        self.definitions = definitions;
        for state in self.files.values_mut() {
            state.checked = false;
        }
    }

    /// Runs inference for `file` if its types are stale.
    pub fn check(&mut self, file: &str) {
        let Some(state) = self.files.get_mut(file) else {
            return;
        };
        if state.checked {
            return;
        }
        state.types = match &state.program {
            Some(program) => Inferencer::new(&self.builtins, &self.definitions).infer_program(program),
            None => HashMap::new(),
        };
        state.checked = true;
    }

    /// Binding sites of `file`'s main class.
    pub fn bindings(&self, file: &str) -> ScriptBindings {
        self.program(file).map(collect_bindings).unwrap_or_default()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisContext for Analyzer {
    fn program(&self, file: &str) -> Option<&Program> {
        self.files.get(file)?.program.as_ref()
    }

    fn get_type(&self, file: &str, node: NodeId) -> Type {
        self.files
            .get(file)
            .and_then(|state| state.types.get(&node))
            .cloned()
            .unwrap_or(Type::Unknown)
    }

    fn get_diagnostics(&self, file: &str) -> Vec<Diagnostic> {
        self.files
            .get(file)
            .map(|state| state.diagnostics.clone())
            .unwrap_or_default()
    }

    fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    fn builtins(&self) -> &BuiltinRegistry {
        &self.builtins
    }
}
