//! GDScript transpiler
//!
//! Walks one syntax tree depth first and renders GDScript text, one emission
//! rule per node kind. A failing statement or member is recorded as a
//! diagnostic and the walk moves on to the next one, so a single compile
//! reports every problem in the file.
//!
//! The file's main class becomes the script itself; later classes become
//! inner classes. Closures are hoisted into generated methods that are
//! flushed right after the member that produced them.

use std::collections::{BTreeSet, HashSet};
use tsgd_ast::{
    decorator_string_arg, find_decorator, ClassDecl, ClassExtends, ClassMember, Decl, EnumDecl,
    ExportDecl, Expr, FunctionDecl, ImportDecl, ImportSpecifier, Literal, ModuleItem, Node, NodeId,
    Param, Pattern, Program, PropertyName, Span, Stmt, UnaryOp, VarDecl, VarDeclKind,
};
use tsgd_typeck::{AnalysisContext, Diagnostic, Type};
use crate::error::CompileError;
use crate::gdscript;
use crate::output::Output;
use crate::scope::{Binding, BindingKind, ScopeKind, ScopeResolver};
use crate::{AuxFile, CompileTarget, CompiledUnit};

pub(crate) type EmitResult<T> = Result<T, CompileError>;

/// Enclosing construct that `break` and `continue` refer to.
#[derive(Debug, Clone)]
pub(crate) enum Flow {
    /// Lines emitted before every `continue`
    Loop { continue_prelude: Vec<String> },
    Switch,
}

pub(crate) enum FnBody<'b> {
    Block(&'b [Node<Stmt>]),
    Expr(&'b Node<Expr>),
}

pub(crate) struct FunctionSpec<'b> {
    pub name: String,
    pub params: &'b [Param],
    pub body: FnBody<'b>,
    pub is_static: bool,
    pub return_type: Type,
    /// Arguments forwarded to the parent constructor
    pub super_args: Option<&'b [Node<Expr>]>,
}

pub(crate) struct Transpiler<'a> {
    pub(crate) ctx: &'a dyn AnalysisContext,
    target: &'a CompileTarget,
    pub(crate) scopes: ScopeResolver,
    pub(crate) out: Output,
    pending_functions: Vec<Vec<String>>,
    /// Indentation of class-level declarations currently being emitted
    member_indent: usize,
    aux_files: Vec<AuxFile>,
    preloads: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    pub(crate) resource_refs: BTreeSet<String>,
    bound_scene: Option<String>,
    next_gen_id: usize,
    pub(crate) next_temp_id: usize,
    pub(crate) flow: Vec<Flow>,
    pub(crate) return_types: Vec<Type>,
    /// Names already declared with `var` in each open GDScript block
    pub(crate) block_vars: Vec<HashSet<String>>,
}

impl<'a> Transpiler<'a> {
    pub(crate) fn new(target: &'a CompileTarget, ctx: &'a dyn AnalysisContext) -> Self {
        Self {
            ctx,
            target,
            scopes: ScopeResolver::new(),
            out: Output::new(),
            pending_functions: Vec::new(),
            member_indent: 0,
            aux_files: Vec::new(),
            preloads: Vec::new(),
            diagnostics: Vec::new(),
            resource_refs: BTreeSet::new(),
            bound_scene: None,
            next_gen_id: 0,
            next_temp_id: 0,
            flow: Vec::new(),
            return_types: Vec::new(),
            block_vars: Vec::new(),
        }
    }

    pub(crate) fn run(mut self, program: &Program) -> CompiledUnit {
        self.seed_globals();
        self.scopes.push(ScopeKind::File);
        self.hoist(program);

        let main = program.main_class();
        for item in &program.items {
            if let Err(error) = self.emit_module_item(item, main) {
                self.report(error);
            }
            self.flush_pending();
        }

        let mut header = Output::new();
        let mut class_name = None;
        if let Some(class) = main {
            if find_decorator(&class.decorators, "tool").is_some() {
                header.line("tool");
            }
            if let Some(extends) = &class.extends {
                match self.extends_name(extends) {
                    Ok(base) => header.line(format!("extends {}", base)),
                    Err(error) => self.report(error),
                }
            }
            if !self.ctx.definitions().is_autoload(&self.target.output_res_path) {
                let name = class.name.value.name.clone();
                header.line(format!("class_name {}", name));
                class_name = Some(name);
            }
        }
        if !self.preloads.is_empty() {
            header.blank();
            header.raw_lines(std::mem::take(&mut self.preloads));
        }
        let body = std::mem::take(&mut self.out);
        if !body.is_empty() && !header.is_empty() {
            header.blank();
        }
        header.raw_lines(body.into_lines());

        CompiledUnit {
            text: header.finish(),
            aux_files: self.aux_files,
            diagnostics: self.diagnostics,
            bound_scene: self.bound_scene,
            resource_refs: self.resource_refs,
            class_name,
        }
    }

    pub(crate) fn report(&mut self, error: CompileError) {
        log::debug!("{}: {}", self.target.file, error);
        self.diagnostics.push(error.to_diagnostic());
    }

    pub(crate) fn type_of(&self, id: NodeId) -> Type {
        self.ctx.get_type(&self.target.file, id)
    }

    fn flush_pending(&mut self) {
        for lines in std::mem::take(&mut self.pending_functions) {
            self.out.blank();
            self.out.raw_lines(lines);
        }
    }

    // =========================================================================
    // Global scope
    // =========================================================================

    fn seed_globals(&mut self) {
        let ctx = self.ctx;
        let mut names: Vec<&str> = ctx.builtins().global_names().collect();
        names.sort_unstable();
        names.dedup();
        for name in names {
            self.seed(name, Binding::new(BindingKind::Global, name, Span::new(0, 0, 0)));
        }
        self.seed("Infinity", Binding::new(BindingKind::Global, "INF", Span::new(0, 0, 0)));
        self.seed("NaN", Binding::new(BindingKind::Global, "NAN", Span::new(0, 0, 0)));

        let definitions = ctx.definitions();
        for class in definitions.classes.keys() {
            self.seed(class, Binding::new(BindingKind::Class, class.as_str(), Span::new(0, 0, 0)));
        }
        for autoload in definitions.autoloads.keys() {
            self.seed(autoload, Binding::new(BindingKind::Global, autoload.as_str(), Span::new(0, 0, 0)));
        }
    }

    fn seed(&mut self, name: &str, binding: Binding) {
        // Project names may repeat engine names; the first one wins.
        let _ = self.scopes.declare(name, binding);
    }

    /// Declares every top-level name before emission so forward references
    /// resolve.
    fn hoist(&mut self, program: &Program) {
        for item in &program.items {
            let result = match &item.value {
                ModuleItem::Import(import) => self.bind_import(import),
                ModuleItem::Decl(decl) => self.hoist_decl(decl),
                ModuleItem::Export(ExportDecl::Decl(decl)) | ModuleItem::Export(ExportDecl::DefaultDecl(decl)) => {
                    self.hoist_decl(decl)
                }
                ModuleItem::Export(_) => Ok(()),
                ModuleItem::Stmt(stmt) => match &stmt.value {
                    Stmt::VarDecl(var) => self.hoist_var(var),
                    Stmt::Decl(decl) => self.hoist_decl(decl),
                    _ => Ok(()),
                },
            };
            if let Err(error) = result {
                self.report(error);
            }
        }
    }

    fn bind_import(&mut self, import: &ImportDecl) -> EmitResult<()> {
        if import.type_only {
            return Ok(());
        }
        let ctx = self.ctx;
        for specifier in &import.specifiers {
            let (imported, type_only) = match specifier {
                ImportSpecifier::Named { imported, type_only, .. } => (imported.value.name.as_str(), *type_only),
                ImportSpecifier::Default(name) | ImportSpecifier::Namespace(name) => (name.value.name.as_str(), false),
            };
            if type_only {
                continue;
            }
            let local = specifier.local_name();
            let kind = if ctx.definitions().classes.contains_key(imported) {
                BindingKind::Class
            } else {
                BindingKind::Global
            };
            self.scopes
                .declare(&local.value.name, Binding::new(kind, imported, local.span))?;
        }
        Ok(())
    }

    fn hoist_decl(&mut self, decl: &Node<Decl>) -> EmitResult<()> {
        let (name, binding) = match &decl.value {
            Decl::Function(func) if func.is_declare => (&func.name, Binding::new(BindingKind::Global, func.name.value.name.as_str(), func.name.span)),
            Decl::Function(func) => {
                if func.body.is_none() {
                    // Overload signature
                    return Ok(());
                }
                let binding = Binding::new(BindingKind::Function, gdscript::ident(&func.name.value.name), func.name.span)
                    .with_type(Type::Function(Box::new(annotation_type(func.return_type.as_deref()))))
                    .with_params(param_types(&func.params));
                (&func.name, binding)
            }
            Decl::Class(class) if class.is_declare => (&class.name, Binding::new(BindingKind::Global, class.name.value.name.as_str(), class.name.span)),
            Decl::Class(class) => (&class.name, Binding::new(BindingKind::Class, class.name.value.name.as_str(), class.name.span)),
            Decl::Enum(decl) if decl.is_declare => (&decl.name, Binding::new(BindingKind::Global, decl.name.value.name.as_str(), decl.name.span)),
            Decl::Enum(decl) => (
                &decl.name,
                Binding::new(BindingKind::Constant, decl.name.value.name.as_str(), decl.name.span)
                    .with_type(Type::Enum(decl.name.value.name.clone())),
            ),
            Decl::Var(var) => return self.hoist_var(var),
            Decl::Interface(_) | Decl::TypeAlias(_) | Decl::Namespace(_) => return Ok(()),
        };
        self.scopes.declare(&name.value.name, binding)
    }

    fn hoist_var(&mut self, var: &VarDecl) -> EmitResult<()> {
        for declarator in &var.declarations {
            let constant = var.kind == VarDeclKind::Const
                && declarator.init.as_ref().is_some_and(|init| is_literal(init) || constant_group(init).is_some());
            for name in declarator.pattern.value.bound_names() {
                let binding = if var.is_declare {
                    Binding::new(BindingKind::Global, name.value.name.as_str(), name.span)
                } else if constant {
                    Binding::new(BindingKind::Constant, gdscript::ident(&name.value.name), name.span)
                } else {
                    Binding::new(BindingKind::Member, gdscript::ident(&name.value.name), name.span)
                };
                let binding = binding.with_type(self.type_of(declarator.pattern.id));
                self.scopes.declare(&name.value.name, binding)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Module items
    // =========================================================================

    fn emit_module_item(&mut self, item: &Node<ModuleItem>, main: Option<&ClassDecl>) -> EmitResult<()> {
        match &item.value {
            // Bound during hoisting
            ModuleItem::Import(_) => Ok(()),
            ModuleItem::Export(export) => match export {
                ExportDecl::Decl(decl) => self.emit_top_level_decl(decl, main),
                ExportDecl::Named { .. } | ExportDecl::All { .. } => Ok(()),
                ExportDecl::Default(_) | ExportDecl::DefaultDecl(_) => {
                    Err(CompileError::unsupported("`export default`", item.span))
                }
            },
            ModuleItem::Decl(decl) => self.emit_top_level_decl(decl, main),
            ModuleItem::Stmt(stmt) => match &stmt.value {
                Stmt::VarDecl(var) => self.emit_top_level_var(var),
                Stmt::Decl(decl) => self.emit_top_level_decl(decl, main),
                Stmt::Empty => Ok(()),
                other => Err(CompileError::unsupported(
                    format!("top-level {}", other.kind_name()),
                    stmt.span,
                )),
            },
        }
    }

    fn emit_top_level_decl(&mut self, decl: &Node<Decl>, main: Option<&ClassDecl>) -> EmitResult<()> {
        match &decl.value {
            Decl::Class(class) if class.is_declare => Ok(()),
            Decl::Class(class) => {
                if main.is_some_and(|main| std::ptr::eq(main, class)) {
                    self.emit_main_class(class, decl.span)
                } else {
                    self.emit_inner_class(class)
                }
            }
            Decl::Function(func) => {
                if func.is_declare || func.body.is_none() {
                    return Ok(());
                }
                self.emit_script_function(func, decl.span)
            }
            Decl::Var(var) => self.emit_top_level_var(var),
            Decl::Enum(decl) if decl.is_declare => Ok(()),
            Decl::Enum(decl) => self.emit_enum(decl),
            Decl::Interface(_) | Decl::TypeAlias(_) => Ok(()),
            Decl::Namespace(namespace) if namespace.is_declare => Ok(()),
            Decl::Namespace(_) => Err(CompileError::unsupported("namespace", decl.span)),
        }
    }

    fn emit_script_function(&mut self, func: &FunctionDecl, span: Span) -> EmitResult<()> {
        if func.is_async {
            return Err(CompileError::unsupported("async function", span));
        }
        if func.is_generator {
            return Err(CompileError::unsupported("generator function", span));
        }
        let Some(body) = &func.body else {
            return Ok(());
        };
        self.emit_function(FunctionSpec {
            name: gdscript::ident(&func.name.value.name).into_owned(),
            params: &func.params,
            body: FnBody::Block(&body.value.stmts),
            is_static: false,
            return_type: annotation_type(func.return_type.as_deref()),
            super_args: None,
        })
    }

    fn emit_top_level_var(&mut self, var: &VarDecl) -> EmitResult<()> {
        if var.is_declare {
            return Ok(());
        }
        for declarator in &var.declarations {
            let Pattern::Ident { name, .. } = &declarator.pattern.value else {
                self.report(CompileError::unsupported("top-level destructuring", declarator.pattern.span));
                continue;
            };
            let result = self.emit_top_level_binding(var.kind, name, declarator.pattern.id, declarator.init.as_ref());
            if let Err(error) = result {
                self.report(error);
            }
        }
        Ok(())
    }

    fn emit_top_level_binding(
        &mut self,
        kind: VarDeclKind,
        name: &Node<tsgd_ast::Ident>,
        pattern_id: NodeId,
        init: Option<&Node<Expr>>,
    ) -> EmitResult<()> {
        let gd_name = gdscript::ident(&name.value.name).into_owned();
        let ty = self.type_of(pattern_id);
        if kind == VarDeclKind::Const {
            if let Some(init) = init {
                if let Some(entries) = constant_group(init) {
                    let mut group = Output::new();
                    for (key, value) in entries {
                        let value = self.emit_expr(value)?;
                        group.line(format!("const {} = {}", key, value));
                    }
                    self.add_aux(&name.value.name, group);
                    return Ok(());
                }
                if is_literal(init) {
                    let value = self.emit_expr_expecting(init, &ty)?;
                    self.out.line(format!("const {} = {}", gd_name, value));
                    return Ok(());
                }
            }
        }
        match init {
            Some(init) => {
                let value = self.emit_expr_expecting(init, &ty)?;
                self.out.line(format!("var {} = {}", gd_name, value));
            }
            None => self.out.line(format!("var {}", gd_name)),
        }
        Ok(())
    }

    fn emit_enum(&mut self, decl: &EnumDecl) -> EmitResult<()> {
        let mut out = Output::new();
        let mut next = Some(0.0);
        for member in &decl.members {
            let value = match &member.init {
                None => match next {
                    Some(value) => {
                        next = Some(value + 1.0);
                        format_number(value)
                    }
                    None => {
                        return Err(CompileError::unsupported(
                            "enum member without an initializer after a string member",
                            member.name.span,
                        ))
                    }
                },
                Some(init) => match enum_value(init) {
                    Some(EnumValue::Number(value)) => {
                        next = Some(value + 1.0);
                        format_number(value)
                    }
                    Some(EnumValue::String(value)) => {
                        next = None;
                        gdscript::string_literal(&value)
                    }
                    None => return Err(CompileError::unsupported("computed enum member", init.span)),
                },
            };
            out.line(format!("const {} = {}", gdscript::ident(&member.name.value.name), value));
        }
        self.add_aux(&decl.name.value.name, out);
        Ok(())
    }

    /// Registers `<Stem>_<name>.gd` next to the primary output and preloads
    /// it under `name`.
    fn add_aux(&mut self, name: &str, content: Output) {
        let path = &self.target.output_res_path;
        let (dir, file) = match path.rfind('/') {
            Some(index) => path.split_at(index + 1),
            None => ("", path.as_str()),
        };
        let stem = file.strip_suffix(".gd").unwrap_or(file);
        let file_name = format!("{}_{}.gd", stem, name);
        let res_path = format!("{}{}", dir, file_name);
        self.preloads.push(format!(
            "const {} = preload({})",
            name,
            gdscript::string_literal(&res_path)
        ));
        self.aux_files.push(AuxFile {
            name: file_name,
            content: content.finish(),
        });
    }

    // =========================================================================
    // Classes
    // =========================================================================

    fn extends_name(&self, extends: &ClassExtends) -> EmitResult<String> {
        fn dotted(expr: &Node<Expr>) -> Option<String> {
            match &expr.value {
                Expr::Ident(ident) => Some(ident.name.clone()),
                Expr::Member { object, property } => Some(format!("{}.{}", dotted(object)?, property.value.name)),
                _ => None,
            }
        }
        dotted(&extends.base)
            .ok_or_else(|| CompileError::unsupported("computed base class", extends.base.span))
    }

    fn emit_main_class(&mut self, class: &ClassDecl, span: Span) -> EmitResult<()> {
        self.scopes.push(ScopeKind::Class);
        let saved_indent = std::mem::replace(&mut self.member_indent, self.out.level());
        let scene = self.bind_scene(class, span);
        self.declare_members(class, scene.as_deref(), true);
        self.emit_members(class);
        self.member_indent = saved_indent;
        self.scopes.pop();
        Ok(())
    }

    fn emit_inner_class(&mut self, class: &ClassDecl) -> EmitResult<()> {
        let name = &class.name.value.name;
        let header = match &class.extends {
            Some(extends) => format!("class {} extends {}:", name, self.extends_name(extends)?),
            None => format!("class {}:", name),
        };
        self.out.blank();
        self.out.line(header);
        self.out.indent();
        self.scopes.push(ScopeKind::Class);
        let saved_indent = std::mem::replace(&mut self.member_indent, self.out.level());

        self.declare_members(class, None, false);
        let start = self.out.len();
        self.emit_members(class);
        if self.out.len() == start {
            self.out.line("pass");
        }

        self.member_indent = saved_indent;
        self.scopes.pop();
        self.out.dedent();
        Ok(())
    }

    /// Scene named by `@scene`, if it exists in the project.
    fn bind_scene(&mut self, class: &ClassDecl, span: Span) -> Option<String> {
        let args = find_decorator(&class.decorators, "scene")?;
        let arg_span = args.first().map_or(span, |arg| arg.span);
        let Some(path) = decorator_string_arg(&class.decorators, "scene") else {
            self.report(CompileError::unsupported("`@scene` without a string path", arg_span));
            return None;
        };
        self.bound_scene = Some(path.clone());
        self.resource_refs.insert(path.clone());
        if !self.ctx.definitions().scene_names.contains(&path) {
            self.report(CompileError::UnknownResourcePath { path, span: arg_span });
            return None;
        }
        Some(path)
    }

    fn declare_members(&mut self, class: &ClassDecl, scene: Option<&str>, is_main: bool) {
        let has_scene = find_decorator(&class.decorators, "scene").is_some();
        for member in &class.members {
            let result = match &member.value {
                ClassMember::Property { name, decorators, .. } => match name.as_static() {
                    Some(field) if find_decorator(decorators, "node").is_some() => {
                        self.declare_node_field(&field, scene, has_scene, is_main, member.span)
                    }
                    Some(field) => {
                        let binding = Binding::new(BindingKind::Member, gdscript::ident(&field), member.span)
                            .with_type(self.type_of(member.id));
                        self.scopes.declare(&field, binding)
                    }
                    None => Ok(()),
                },
                ClassMember::Method {
                    name,
                    params,
                    return_type,
                    body: Some(_),
                    ..
                } => match name.as_static() {
                    Some(method) => {
                        let binding = Binding::new(BindingKind::Function, gdscript::ident(&method), member.span)
                            .with_type(Type::Function(Box::new(annotation_type(return_type.as_deref()))))
                            .with_params(param_types(params));
                        self.scopes.declare(&method, binding)
                    }
                    None => Ok(()),
                },
                _ => Ok(()),
            };
            if let Err(error) = result {
                self.report(error);
            }
        }
    }

    fn declare_node_field(
        &mut self,
        field: &str,
        scene: Option<&str>,
        has_scene: bool,
        is_main: bool,
        span: Span,
    ) -> EmitResult<()> {
        if !is_main {
            return Err(CompileError::unsupported("`@node` outside the main class", span));
        }
        let Some(scene) = scene else {
            if has_scene {
                // The scene path itself was already reported
                return Ok(());
            }
            return Err(CompileError::UnresolvedSymbol {
                name: field.to_string(),
                reason: ": `@node` needs an `@scene` on its class".to_string(),
                span,
            });
        };
        let Some(node) = self.ctx.definitions().node_ref(scene, field) else {
            return Err(CompileError::UnresolvedSymbol {
                name: field.to_string(),
                reason: format!(": no node is bound to it in {}", scene),
                span,
            });
        };
        // Relative to the scene root, which holds the script
        let relative = node.path.split_once('/').map_or(".", |(_, below_root)| below_root);
        let lookup = format!("get_node({})", gdscript::string_literal(relative));
        let binding = Binding::new(BindingKind::NodePath { path: node.path.clone() }, lookup, span)
            .with_type(Type::Object(node.engine_type.clone()));
        self.scopes.declare(field, binding)
    }

    fn emit_members(&mut self, class: &ClassDecl) {
        for member in &class.members {
            if let Err(error) = self.emit_class_member(member) {
                self.report(error);
            }
            self.flush_pending();
        }
    }

    fn emit_class_member(&mut self, member: &Node<ClassMember>) -> EmitResult<()> {
        let span = member.span;
        match &member.value {
            ClassMember::Property {
                name,
                type_annotation,
                init,
                is_static,
                decorators,
                ..
            } => {
                if find_decorator(decorators, "node").is_some() {
                    return Ok(());
                }
                if *is_static {
                    return Err(CompileError::unsupported("static field", span));
                }
                let field = member_name(name, span)?;
                if let Some(params) = signal_params(type_annotation.as_deref()) {
                    self.out.line(format!("signal {}{}", field, params));
                    return Ok(());
                }
                let ty = self.type_of(member.id);
                let value = match init {
                    Some(init) => Some(self.emit_expr_expecting(init, &ty)?),
                    None => None,
                };
                let keyword = if find_decorator(decorators, "exports").is_some() {
                    match (&value, export_hint(&ty)) {
                        (None, Some(hint)) => format!("export({}) var", hint),
                        _ => "export var".to_string(),
                    }
                } else {
                    "var".to_string()
                };
                match value {
                    Some(value) => self.out.line(format!("{} {} = {}", keyword, field, value)),
                    None => self.out.line(format!("{} {}", keyword, field)),
                }
                Ok(())
            }
            ClassMember::Constructor { params, body, .. } => {
                let Some(body) = body else {
                    return Ok(());
                };
                if params.iter().any(|param| param.accessibility.is_some()) {
                    return Err(CompileError::unsupported("constructor parameter property", span));
                }
                let (super_args, stmts) = split_super_call(&body.value.stmts);
                self.emit_function(FunctionSpec {
                    name: "_init".to_string(),
                    params,
                    body: FnBody::Block(stmts),
                    is_static: false,
                    return_type: Type::Void,
                    super_args,
                })
            }
            ClassMember::Method {
                name,
                params,
                return_type,
                body,
                is_static,
                is_async,
                is_generator,
                ..
            } => {
                let Some(body) = body else {
                    return Ok(());
                };
                if *is_async {
                    return Err(CompileError::unsupported("async method", span));
                }
                if *is_generator {
                    return Err(CompileError::unsupported("generator method", span));
                }
                self.emit_function(FunctionSpec {
                    name: member_name(name, span)?,
                    params,
                    body: FnBody::Block(&body.value.stmts),
                    is_static: *is_static,
                    return_type: annotation_type(return_type.as_deref()),
                    super_args: None,
                })
            }
            ClassMember::Accessor { .. } => Err(CompileError::unsupported(member.value.kind_name(), span)),
            ClassMember::IndexSignature { .. } => Ok(()),
        }
    }

    // =========================================================================
    // Functions
    // =========================================================================

    pub(crate) fn emit_function(&mut self, spec: FunctionSpec<'_>) -> EmitResult<()> {
        self.out.blank();
        self.scopes.push(ScopeKind::Function);
        let saved_flow = std::mem::take(&mut self.flow);
        self.return_types.push(spec.return_type.clone());
        let result = self.emit_function_inner(spec);
        self.return_types.pop();
        self.flow = saved_flow;
        self.scopes.pop();
        result
    }

    fn emit_function_inner(&mut self, spec: FunctionSpec<'_>) -> EmitResult<()> {
        let mut params = Vec::with_capacity(spec.params.len());
        for param in spec.params {
            params.push(self.emit_param(param)?);
        }
        let mut header = format!(
            "{}func {}({})",
            if spec.is_static { "static " } else { "" },
            spec.name,
            params.join(", ")
        );
        if let Some(args) = spec.super_args.filter(|args| !args.is_empty()) {
            header.push_str(&format!(".({})", self.emit_args(args, &[])?));
        }
        header.push(':');
        self.out.line(header);

        match spec.body {
            FnBody::Block(stmts) => self.emit_block(stmts, &[]),
            FnBody::Expr(expr) => {
                self.out.indent();
                let result = if self.type_of(expr.id) == Type::Void {
                    self.emit_expr_stmt(expr)
                } else {
                    self.emit_return(Some(expr))
                };
                self.out.dedent();
                result?;
            }
        }
        Ok(())
    }

    fn emit_param(&mut self, param: &Param) -> EmitResult<String> {
        let span = param.pattern.span;
        if param.is_rest {
            return Err(CompileError::unsupported("rest parameter", span));
        }
        if param.accessibility.is_some() {
            return Err(CompileError::unsupported("parameter property", span));
        }
        let (pattern, default) = match &param.pattern.value {
            Pattern::Assignment { pattern, default } => (pattern.as_ref(), Some(default.as_ref())),
            _ => (&param.pattern, None),
        };
        let Pattern::Ident { name, .. } = &pattern.value else {
            return Err(CompileError::unsupported("destructured parameter", span));
        };
        let ty = match param.type_annotation.as_deref() {
            Some(annotation) => Type::from_annotation(annotation),
            None => self.type_of(pattern.id),
        };
        let default = match default {
            Some(default) => Some(self.emit_expr_expecting(default, &ty)?),
            None if param.optional => Some("null".to_string()),
            None => None,
        };
        let gd_name = gdscript::ident(&name.value.name).into_owned();
        self.scopes.declare(
            &name.value.name,
            Binding::new(BindingKind::Parameter, gd_name.as_str(), name.span).with_type(ty),
        )?;
        Ok(match default {
            Some(default) => format!("{} = {}", gd_name, default),
            None => gd_name,
        })
    }

    /// Renders a closure as a generated method of the enclosing class and
    /// returns the method's name.
    pub(crate) fn hoist_closure(&mut self, params: &[Param], body: FnBody<'_>, return_type: Type) -> EmitResult<String> {
        let name = format!("_gen_{}", self.next_gen_id);
        self.next_gen_id += 1;

        let saved_out = std::mem::replace(&mut self.out, Output::with_indent(self.member_indent));
        let saved_vars = std::mem::take(&mut self.block_vars);
        let result = self.emit_function(FunctionSpec {
            name: name.clone(),
            params,
            body,
            is_static: false,
            return_type,
            super_args: None,
        });
        let rendered = std::mem::replace(&mut self.out, saved_out);
        self.block_vars = saved_vars;

        result?;
        self.pending_functions.push(rendered.into_lines());
        Ok(name)
    }
}

// =============================================================================
// Helpers
// =============================================================================

pub(crate) fn annotation_type(annotation: Option<&Node<tsgd_ast::Type>>) -> Type {
    annotation.map_or(Type::Unknown, Type::from_annotation)
}

fn param_types(params: &[Param]) -> Vec<Type> {
    params
        .iter()
        .map(|param| annotation_type(param.type_annotation.as_deref()))
        .collect()
}

fn member_name(name: &PropertyName, span: Span) -> EmitResult<String> {
    match name.as_static() {
        Some(name) if gdscript::is_identifier(&name) => Ok(gdscript::ident(&name).into_owned()),
        _ => Err(CompileError::unsupported("computed member name", span)),
    }
}

/// `Signal` fields become `signal` declarations; parameter names come from
/// a function type argument such as `Signal<(damage: int) => void>`.
fn signal_params(annotation: Option<&Node<tsgd_ast::Type>>) -> Option<String> {
    let tsgd_ast::Type::TypeRef { name, type_args } = &annotation?.value else {
        return None;
    };
    if name.value.name != "Signal" {
        return None;
    }
    let params = match type_args.as_deref() {
        Some([arg]) => match &arg.value {
            tsgd_ast::Type::Function(function) => function
                .params
                .iter()
                .filter_map(|param| param.pattern.value.ident_name())
                .map(|name| gdscript::ident(name).into_owned())
                .collect::<Vec<_>>(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    if params.is_empty() {
        Some(String::new())
    } else {
        Some(format!("({})", params.join(", ")))
    }
}

fn export_hint(ty: &Type) -> Option<String> {
    match ty {
        Type::Int => Some("int".to_string()),
        Type::Float => Some("float".to_string()),
        Type::String => Some("String".to_string()),
        Type::Bool => Some("bool".to_string()),
        Type::Object(name) => Some(name.clone()),
        _ => None,
    }
}

/// Leading `super(...)` call of a constructor body.
fn split_super_call(stmts: &[Node<Stmt>]) -> (Option<&[Node<Expr>]>, &[Node<Stmt>]) {
    if let Some(Stmt::Expr(Node {
        value: Expr::Call { callee, args, .. },
        ..
    })) = stmts.first().map(|stmt| &stmt.value)
    {
        if matches!(callee.value, Expr::Super) {
            return (Some(args.as_slice()), &stmts[1..]);
        }
    }
    (None, stmts)
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

enum EnumValue {
    Number(f64),
    String(String),
}

fn enum_value(expr: &Node<Expr>) -> Option<EnumValue> {
    match &Expr::unwrap_transparent(expr).value {
        Expr::Literal(Literal::Number { value, .. }) => Some(EnumValue::Number(*value)),
        Expr::Literal(Literal::String(value)) => Some(EnumValue::String(value.clone())),
        Expr::Unary { op: UnaryOp::Minus, expr } => match enum_value(expr)? {
            EnumValue::Number(value) => Some(EnumValue::Number(-value)),
            EnumValue::String(_) => None,
        },
        _ => None,
    }
}

/// Literal that GDScript accepts as a `const` value.
fn is_literal(expr: &Node<Expr>) -> bool {
    match &Expr::unwrap_transparent(expr).value {
        Expr::Literal(Literal::RegExp { .. }) => false,
        Expr::Literal(_) => true,
        Expr::Unary { op: UnaryOp::Minus, expr } => matches!(
            Expr::unwrap_transparent(expr).value,
            Expr::Literal(Literal::Number { .. })
        ),
        _ => false,
    }
}

/// `const Name = { key: literal, ... }` entries, if `init` is such a group.
fn constant_group(init: &Node<Expr>) -> Option<Vec<(String, &Node<Expr>)>> {
    let Expr::Object(properties) = &Expr::unwrap_transparent(init).value else {
        return None;
    };
    if properties.is_empty() {
        return None;
    }
    properties
        .iter()
        .map(|property| match property {
            tsgd_ast::ObjectProperty::Property { key, value, .. } => {
                let key = key.as_static().filter(|key| gdscript::is_identifier(key))?;
                is_literal(value).then(|| (key, value))
            }
            _ => None,
        })
        .collect()
}
