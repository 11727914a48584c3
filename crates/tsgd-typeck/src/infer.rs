//! Best-effort type inference
//!
//! Walks one program in source order and records a [`Type`] for every
//! expression node, every binding pattern and every class property. This is
//! not a type checker: anything it cannot work out is `Unknown`, and it
//! reports nothing. The transpiler decides what an unknown type means for
//! the construct at hand.

use std::collections::HashMap;
use tsgd_ast::{self as ast, decorator_string_arg, BinaryOp, ClassMember, Expr, Node, NodeId, Pattern, Stmt, UnaryOp};
use crate::builtins::BuiltinRegistry;
use crate::definitions::Definitions;
use crate::env::TypeEnv;
use crate::types::Type;

const MAX_CLASS_DEPTH: usize = 32;

/// Members of a class declared in the file being inferred.
#[derive(Debug, Clone, Default)]
struct ClassShape {
    base: Option<String>,
    fields: HashMap<String, Type>,
    /// Method name to return type
    methods: HashMap<String, Type>,
}

pub(crate) struct Inferencer<'a> {
    builtins: &'a BuiltinRegistry,
    definitions: &'a Definitions,
    env: TypeEnv,
    types: HashMap<NodeId, Type>,
    classes: HashMap<String, ClassShape>,
    current_class: Option<String>,
}

impl<'a> Inferencer<'a> {
    pub(crate) fn new(builtins: &'a BuiltinRegistry, definitions: &'a Definitions) -> Self {
        Self {
            builtins,
            definitions,
            env: TypeEnv::new(),
            types: HashMap::new(),
            classes: HashMap::new(),
            current_class: None,
        }
    }

    pub(crate) fn infer_program(mut self, program: &ast::Program) -> HashMap<NodeId, Type> {
        for item in &program.items {
            self.hoist_item(item);
        }
        for item in &program.items {
            self.module_item(item);
        }
        self.types
    }

    // =========================================================================
    // Hoisting
    // =========================================================================

    fn hoist_item(&mut self, item: &Node<ast::ModuleItem>) {
        match &item.value {
            ast::ModuleItem::Import(import) => {
                for specifier in &import.specifiers {
                    let local = &specifier.local_name().value.name;
                    let imported = match specifier {
                        ast::ImportSpecifier::Named { imported, .. } => imported.value.name.as_str(),
                        _ => local.as_str(),
                    };
                    let ty = if self.definitions.classes.contains_key(imported) {
                        Type::Object(imported.to_string())
                    } else {
                        Type::Unknown
                    };
                    self.env.declare(local.clone(), ty);
                }
            }
            ast::ModuleItem::Export(ast::ExportDecl::Decl(decl))
            | ast::ModuleItem::Export(ast::ExportDecl::DefaultDecl(decl)) => self.hoist_decl(decl),
            ast::ModuleItem::Decl(decl) => self.hoist_decl(decl),
            ast::ModuleItem::Stmt(Node { value: Stmt::Decl(decl), .. }) => self.hoist_decl(decl),
            _ => {}
        }
    }

    fn hoist_decl(&mut self, decl: &Node<ast::Decl>) {
        match &decl.value {
            ast::Decl::Function(func) => {
                let ret = annotation_or_unknown(func.return_type.as_deref());
                self.env.declare(func.name.value.name.clone(), Type::Function(Box::new(ret)));
            }
            ast::Decl::Class(class) => {
                let name = class.name.value.name.clone();
                let shape = self.class_shape(class);
                self.classes.insert(name.clone(), shape);
                self.env.declare(name.clone(), Type::Object(name));
            }
            ast::Decl::Enum(decl) => {
                let name = decl.name.value.name.clone();
                self.env.declare(name.clone(), Type::Enum(name));
            }
            ast::Decl::Var(var) if var.is_declare => {
                for declarator in &var.declarations {
                    let ty = annotation_or_unknown(declarator.pattern.value.type_annotation());
                    for name in declarator.pattern.value.bound_names() {
                        self.env.declare(name.value.name.clone(), ty.clone());
                    }
                }
            }
            _ => {}
        }
    }

    fn class_shape(&self, class: &ast::ClassDecl) -> ClassShape {
        let base = class.extends.as_ref().and_then(|extends| match &extends.base.value {
            Expr::Ident(ident) => Some(ident.name.clone()),
            _ => None,
        });
        let scene = decorator_string_arg(&class.decorators, "scene");
        let mut shape = ClassShape {
            base,
            ..ClassShape::default()
        };

        for member in &class.members {
            match &member.value {
                ClassMember::Property {
                    name,
                    type_annotation,
                    decorators,
                    ..
                } => {
                    let Some(key) = name.as_static() else { continue };
                    let bound = scene.as_deref().and_then(|scene| {
                        decorator_string_arg(decorators, "node")?;
                        self.definitions.node_ref(scene, &key)
                    });
                    let ty = match (type_annotation, bound) {
                        (Some(annotation), _) => Type::from_annotation(annotation),
                        (None, Some(node)) => Type::Object(node.engine_type.clone()),
                        (None, None) => Type::Unknown,
                    };
                    shape.fields.insert(key, ty);
                }
                ClassMember::Method { name, return_type, .. } => {
                    if let Some(key) = name.as_static() {
                        shape.methods.insert(key, annotation_or_unknown(return_type.as_deref()));
                    }
                }
                ClassMember::Accessor {
                    name,
                    is_setter,
                    value_type,
                } => {
                    if let Some(key) = name.as_static() {
                        let ty = annotation_or_unknown(value_type.as_deref());
                        // The getter's type wins over the setter's
                        if *is_setter {
                            shape.fields.entry(key).or_insert(ty);
                        } else {
                            shape.fields.insert(key, ty);
                        }
                    }
                }
                ClassMember::Constructor { params, .. } => {
                    for param in params.iter().filter(|p| p.accessibility.is_some()) {
                        if let Some(name) = param.pattern.value.ident_name() {
                            shape
                                .fields
                                .insert(name.to_string(), annotation_or_unknown(param.type_annotation.as_deref()));
                        }
                    }
                }
                ClassMember::IndexSignature { .. } => {}
            }
        }

        shape
    }

    // =========================================================================
    // Declarations and statements
    // =========================================================================

    fn module_item(&mut self, item: &Node<ast::ModuleItem>) {
        match &item.value {
            ast::ModuleItem::Import(_) => {}
            ast::ModuleItem::Export(export) => match export {
                ast::ExportDecl::Decl(decl) | ast::ExportDecl::DefaultDecl(decl) => self.decl(decl),
                ast::ExportDecl::Default(expr) => {
                    self.expr(expr);
                }
                ast::ExportDecl::Named { .. } | ast::ExportDecl::All { .. } => {}
            },
            ast::ModuleItem::Stmt(stmt) => self.stmt(stmt),
            ast::ModuleItem::Decl(decl) => self.decl(decl),
        }
    }

    fn decl(&mut self, decl: &Node<ast::Decl>) {
        match &decl.value {
            ast::Decl::Function(func) => {
                let ret = annotation_or_unknown(func.return_type.as_deref());
                self.env.declare(func.name.value.name.clone(), Type::Function(Box::new(ret)));
                if let Some(body) = &func.body {
                    self.function_body(&func.params, body);
                }
            }
            ast::Decl::Class(class) => self.class(class),
            ast::Decl::Enum(decl) => {
                let name = decl.name.value.name.clone();
                self.env.declare(name.clone(), Type::Enum(name));
                for member in &decl.members {
                    if let Some(init) = &member.init {
                        self.expr(init);
                    }
                }
            }
            ast::Decl::Var(var) => self.var_decl(var),
            ast::Decl::Interface(_) | ast::Decl::TypeAlias(_) | ast::Decl::Namespace(_) => {}
        }
    }

    fn class(&mut self, class: &ast::ClassDecl) {
        let name = class.name.value.name.clone();
        if !self.classes.contains_key(&name) {
            let shape = self.class_shape(class);
            self.classes.insert(name.clone(), shape);
        }
        self.env.declare(name.clone(), Type::Object(name.clone()));
        let previous = self.current_class.replace(name.clone());

        // Fields first so method bodies see inferred field types
        for member in &class.members {
            if let ClassMember::Property {
                name: key,
                type_annotation,
                init,
                ..
            } = &member.value
            {
                let key = key.as_static();
                if let Some(init) = init {
                    let init_ty = self.expr(init);
                    if let (None, Some(key)) = (type_annotation, &key) {
                        if let Some(shape) = self.classes.get_mut(&name) {
                            let slot = shape.fields.entry(key.clone()).or_insert(Type::Unknown);
                            if slot.is_indeterminate() {
                                *slot = init_ty;
                            }
                        }
                    }
                }
                let ty = key
                    .and_then(|key| self.class_member(&name, &key, false))
                    .unwrap_or(Type::Unknown);
                self.types.insert(member.id, ty);
            }
        }

        for member in &class.members {
            match &member.value {
                ClassMember::Constructor { params, body, .. } => {
                    if let Some(body) = body {
                        self.function_body(params, body);
                    }
                }
                ClassMember::Method { params, body, .. } => {
                    if let Some(body) = body {
                        self.function_body(params, body);
                    }
                }
                ClassMember::Property { .. } | ClassMember::Accessor { .. } | ClassMember::IndexSignature { .. } => {}
            }
        }

        self.current_class = previous;
    }

    fn function_body(&mut self, params: &[ast::Param], body: &Node<ast::BlockStmt>) {
        self.env.push_scope();
        self.params(params);
        self.block(&body.value);
        self.env.pop_scope();
    }

    fn params(&mut self, params: &[ast::Param]) {
        for param in params {
            let ty = match param.type_annotation.as_deref() {
                Some(annotation) if param.is_rest => match Type::from_annotation(annotation) {
                    array @ Type::Array(_) => array,
                    _ => Type::Array(Box::new(Type::Unknown)),
                },
                Some(annotation) => Type::from_annotation(annotation),
                None => Type::Unknown,
            };
            self.bind_pattern(&param.pattern, ty);
        }
    }

    fn block(&mut self, block: &ast::BlockStmt) {
        for stmt in &block.stmts {
            if let Stmt::Decl(decl) = &stmt.value {
                self.hoist_decl(decl);
            }
        }
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
    }

    fn scoped_stmt(&mut self, stmt: &Node<Stmt>) {
        self.env.push_scope();
        self.stmt(stmt);
        self.env.pop_scope();
    }

    fn var_decl(&mut self, var: &ast::VarDecl) {
        for declarator in &var.declarations {
            let annotated = declarator.pattern.value.type_annotation().map(Type::from_annotation);
            let init = declarator.init.as_ref().map(|init| self.expr(init));
            let ty = match (annotated, init) {
                (Some(annotated), _) => annotated,
                (None, Some(init)) => init,
                (None, None) => Type::Unknown,
            };
            self.bind_pattern(&declarator.pattern, ty);
        }
    }

    fn bind_pattern(&mut self, pattern: &Node<Pattern>, ty: Type) {
        self.types.insert(pattern.id, ty.clone());
        match &pattern.value {
            Pattern::Ident { name, .. } => self.env.declare(name.value.name.clone(), ty),
            Pattern::Array { elements, rest, .. } => {
                let element = match &ty {
                    Type::Array(element) => (**element).clone(),
                    _ => Type::Unknown,
                };
                for element_pattern in elements.iter().flatten() {
                    self.bind_pattern(element_pattern, element.clone());
                }
                if let Some(rest) = rest {
                    self.bind_pattern(rest, Type::Array(Box::new(element)));
                }
            }
            Pattern::Object { properties, rest, .. } => {
                for property in properties {
                    let property_ty = property
                        .key
                        .as_static()
                        .map(|key| self.member_access_type(&ty, &key))
                        .unwrap_or(Type::Unknown);
                    self.bind_pattern(&property.value, property_ty);
                }
                if let Some(rest) = rest {
                    self.bind_pattern(rest, Type::Dictionary);
                }
            }
            Pattern::Assignment { pattern: inner, default } => {
                let default_ty = self.expr(default);
                let ty = if ty.is_indeterminate() { default_ty } else { ty };
                self.bind_pattern(inner, ty);
            }
        }
    }

    fn for_left(&mut self, left: &ast::ForInLeft, element: Type) {
        match left {
            ast::ForInLeft::VarDecl(var) => {
                for declarator in &var.declarations {
                    let ty = declarator
                        .pattern
                        .value
                        .type_annotation()
                        .map(Type::from_annotation)
                        .unwrap_or_else(|| element.clone());
                    self.bind_pattern(&declarator.pattern, ty);
                }
            }
            ast::ForInLeft::Pattern(pattern) => {
                self.types.insert(pattern.id, element);
            }
        }
    }

    fn stmt(&mut self, stmt: &Node<Stmt>) {
        match &stmt.value {
            Stmt::Expr(expr) => {
                self.expr(expr);
            }
            Stmt::VarDecl(var) => self.var_decl(var),
            Stmt::Decl(decl) => self.decl(decl),
            Stmt::Return(value) => {
                if let Some(value) = value {
                    self.expr(value);
                }
            }
            Stmt::If {
                condition,
                then_stmt,
                else_stmt,
            } => {
                self.expr(condition);
                self.scoped_stmt(then_stmt);
                if let Some(else_stmt) = else_stmt {
                    self.scoped_stmt(else_stmt);
                }
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                self.env.push_scope();
                match init {
                    Some(ast::ForInit::VarDecl(var)) => self.var_decl(var),
                    Some(ast::ForInit::Expr(expr)) => {
                        self.expr(expr);
                    }
                    None => {}
                }
                if let Some(condition) = condition {
                    self.expr(condition);
                }
                if let Some(update) = update {
                    self.expr(update);
                }
                self.stmt(body);
                self.env.pop_scope();
            }
            Stmt::ForIn { left, right, body } => {
                self.expr(right);
                self.env.push_scope();
                self.for_left(left, Type::Unknown);
                self.stmt(body);
                self.env.pop_scope();
            }
            Stmt::ForOf { left, right, body } => {
                let element = match self.expr(right) {
                    Type::Array(element) => *element,
                    Type::String => Type::String,
                    _ => Type::Unknown,
                };
                self.env.push_scope();
                self.for_left(left, element);
                self.stmt(body);
                self.env.pop_scope();
            }
            Stmt::While { condition, body } | Stmt::DoWhile { body, condition } => {
                self.expr(condition);
                self.scoped_stmt(body);
            }
            Stmt::Block(block) => {
                self.env.push_scope();
                self.block(block);
                self.env.pop_scope();
            }
            Stmt::Switch { discriminant, cases } => {
                self.expr(discriminant);
                for case in cases {
                    if let Some(test) = &case.test {
                        self.expr(test);
                    }
                    self.env.push_scope();
                    for stmt in &case.consequent {
                        self.stmt(stmt);
                    }
                    self.env.pop_scope();
                }
            }
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty | Stmt::Debugger | Stmt::Unsupported(_) => {}
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn expr(&mut self, expr: &Node<Expr>) -> Type {
        let ty = self.infer_expr(expr);
        self.types.insert(expr.id, ty.clone());
        ty
    }

    fn infer_expr(&mut self, expr: &Node<Expr>) -> Type {
        match &expr.value {
            Expr::Literal(literal) => literal_type(literal),
            Expr::Ident(ident) => self.ident_type(&ident.name),
            Expr::Binary { left, op, right } => {
                let left = self.expr(left);
                let right = self.expr(right);
                binary_type(*op, &left, &right)
            }
            Expr::Unary { op, expr: operand } => {
                let operand = self.expr(operand);
                match op {
                    UnaryOp::Not | UnaryOp::Delete => Type::Bool,
                    UnaryOp::TypeOf => Type::String,
                    UnaryOp::Void => Type::Null,
                    UnaryOp::BitNot => Type::Int,
                    _ => operand,
                }
            }
            Expr::Assignment { target, op, value } => {
                let target_ty = self.expr(target);
                let value_ty = self.expr(value);
                if let (Expr::Ident(ident), ast::AssignmentOp::Assign) = (&target.value, op) {
                    self.env.refine(&ident.name, value_ty.clone());
                }
                if target_ty.is_indeterminate() {
                    value_ty
                } else {
                    target_ty
                }
            }
            Expr::Call { callee, type_args, args } => {
                for arg in args {
                    self.expr(arg);
                }
                let ret = self.call_type(callee);
                match type_args.as_deref().and_then(|args| args.first()) {
                    // get_node<Sprite>("Sprite")
                    Some(node_type) if is_get_node(callee) => Type::from_annotation(node_type),
                    _ => ret,
                }
            }
            Expr::OptionalCall { callee, args } => {
                for arg in args {
                    self.expr(arg);
                }
                self.call_type(callee)
            }
            Expr::Member { object, property } | Expr::OptionalMember { object, property } => {
                let object = self.expr(object);
                self.member_access_type(&object, &property.value.name)
            }
            Expr::Index { object, index } | Expr::OptionalIndex { object, index } => {
                let object = self.expr(object);
                self.expr(index);
                match object {
                    Type::Array(element) => *element,
                    Type::String => Type::String,
                    _ => Type::Unknown,
                }
            }
            Expr::Array(elements) => {
                let mut element: Option<Type> = None;
                for item in elements.iter().flatten() {
                    let item_ty = match self.expr(item) {
                        Type::Array(inner) if matches!(item.value, Expr::Spread(_)) => *inner,
                        other => other,
                    };
                    element = Some(match element {
                        None => item_ty,
                        Some(previous) => previous.join(&item_ty),
                    });
                }
                Type::Array(Box::new(element.unwrap_or(Type::Unknown)))
            }
            Expr::Object(properties) => {
                for property in properties {
                    match property {
                        ast::ObjectProperty::Property { key, value, .. } => {
                            if let ast::PropertyName::Computed(key) = key {
                                self.expr(key);
                            }
                            self.expr(value);
                        }
                        ast::ObjectProperty::Method { params, body, .. } => self.function_body(params, body),
                        ast::ObjectProperty::Spread(value) => {
                            self.expr(value);
                        }
                    }
                }
                Type::Dictionary
            }
            Expr::Arrow {
                params,
                return_type,
                body,
                ..
            } => {
                self.env.push_scope();
                self.params(params);
                let body_ty = match body {
                    ast::ArrowBody::Expr(body) => self.expr(body),
                    ast::ArrowBody::Block(block) => {
                        self.block(&block.value);
                        Type::Unknown
                    }
                };
                self.env.pop_scope();
                let ret = return_type.as_deref().map(Type::from_annotation).unwrap_or(body_ty);
                Type::Function(Box::new(ret))
            }
            Expr::Function {
                params,
                return_type,
                body,
                ..
            } => {
                self.function_body(params, body);
                Type::Function(Box::new(annotation_or_unknown(return_type.as_deref())))
            }
            Expr::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                self.expr(condition);
                let then_ty = self.expr(then_expr);
                let else_ty = self.expr(else_expr);
                then_ty.join(&else_ty)
            }
            Expr::Template { exprs, .. } => {
                for part in exprs {
                    self.expr(part);
                }
                Type::String
            }
            Expr::TaggedTemplate { tag, exprs, .. } => {
                self.expr(tag);
                for part in exprs {
                    self.expr(part);
                }
                Type::Unknown
            }
            Expr::New { callee, args, .. } => {
                for arg in args {
                    self.expr(arg);
                }
                self.expr(callee);
                match &callee.value {
                    Expr::Ident(ident) => Type::Object(ident.name.clone()),
                    Expr::Member { property, .. } => Type::Object(property.value.name.clone()),
                    _ => Type::Unknown,
                }
            }
            Expr::TypeCast { expr: inner, ty } => {
                let inner_ty = self.expr(inner);
                if ty.value.ref_name() == Some("const") {
                    inner_ty
                } else {
                    Type::from_annotation(ty)
                }
            }
            Expr::Satisfies { expr: inner, .. }
            | Expr::NonNullAssertion(inner)
            | Expr::Paren(inner)
            | Expr::Spread(inner) => self.expr(inner),
            Expr::Await(inner) => {
                self.expr(inner);
                Type::Unknown
            }
            Expr::Yield { argument, .. } => {
                if let Some(argument) = argument {
                    self.expr(argument);
                }
                Type::Unknown
            }
            Expr::This => self
                .current_class
                .clone()
                .map(Type::Object)
                .unwrap_or(Type::Unknown),
            Expr::Super => self
                .current_class
                .as_ref()
                .and_then(|class| self.classes.get(class))
                .and_then(|shape| shape.base.clone())
                .map(Type::Object)
                .unwrap_or(Type::Unknown),
            Expr::Sequence(items) => {
                let mut last = Type::Unknown;
                for item in items {
                    last = self.expr(item);
                }
                last
            }
        }
    }

    fn ident_type(&self, name: &str) -> Type {
        if let Some(ty) = self.env.lookup(name) {
            return ty.clone();
        }
        if let Some(ty) = self.builtins.constant_type(name) {
            return ty.clone();
        }
        if self.builtins.is_class(name) || self.definitions.classes.contains_key(name) {
            return Type::Object(name.to_string());
        }
        if let Some(target) = self.definitions.autoloads.get(name) {
            return self
                .definitions
                .class_for_script(target)
                .map(|class| Type::Object(class.to_string()))
                .unwrap_or(Type::Unknown);
        }
        if let Some(ret) = self.builtins.function_return(name) {
            return Type::Function(Box::new(ret.clone()));
        }
        Type::Unknown
    }

    fn call_type(&mut self, callee: &Node<Expr>) -> Type {
        match &callee.value {
            Expr::Member { object, property } | Expr::OptionalMember { object, property } => {
                let object = self.expr(object);
                let ret = object
                    .class_name()
                    .and_then(|class| self.class_member(class, &property.value.name, true))
                    .unwrap_or(Type::Unknown);
                self.types.insert(callee.id, Type::Function(Box::new(ret.clone())));
                ret
            }
            Expr::Super => {
                self.expr(callee);
                Type::Void
            }
            _ => match self.expr(callee) {
                Type::Function(ret) => *ret,
                // Vector2(1, 2)
                Type::Object(name) if self.builtins.is_value_type(&name) => Type::Object(name),
                _ => Type::Unknown,
            },
        }
    }

    fn member_access_type(&self, object: &Type, name: &str) -> Type {
        if let Type::Enum(_) = object {
            return Type::Int;
        }
        if name == "length" && (object.is_indeterminate() || matches!(object, Type::Array(_) | Type::String)) {
            return Type::Int;
        }
        let Some(class) = object.class_name() else {
            return Type::Unknown;
        };
        if let Some(ty) = self.class_member(class, name, false) {
            return ty;
        }
        self.class_member(class, name, true)
            .map(|ret| Type::Function(Box::new(ret)))
            .unwrap_or(Type::Unknown)
    }

    /// Member of an in-file class or engine class, walking base classes.
    fn class_member(&self, class: &str, name: &str, method: bool) -> Option<Type> {
        let mut current = class.to_string();
        for _ in 0..MAX_CLASS_DEPTH {
            let Some(shape) = self.classes.get(&current) else {
                let found = if method {
                    self.builtins.method_return(&current, name)
                } else {
                    self.builtins.property_type(&current, name)
                };
                return found.cloned();
            };
            let found = if method { shape.methods.get(name) } else { shape.fields.get(name) };
            if let Some(ty) = found {
                return Some(ty.clone());
            }
            current = shape.base.clone()?;
        }
        None
    }
}

fn annotation_or_unknown(annotation: Option<&Node<ast::Type>>) -> Type {
    annotation.map(Type::from_annotation).unwrap_or(Type::Unknown)
}

fn is_get_node(callee: &Node<Expr>) -> bool {
    match &callee.value {
        Expr::Ident(ident) => ident.name == "get_node",
        Expr::Member { property, .. } => property.value.name == "get_node",
        _ => false,
    }
}

fn literal_type(literal: &ast::Literal) -> Type {
    match literal {
        ast::Literal::Number { raw, .. } => Type::of_number_literal(raw),
        ast::Literal::String(_) => Type::String,
        ast::Literal::Boolean(_) => Type::Bool,
        ast::Literal::Null | ast::Literal::Undefined => Type::Null,
        ast::Literal::RegExp { .. } => Type::Unknown,
    }
}

fn arithmetic_type(left: &Type, right: &Type) -> Type {
    match (left, right) {
        (Type::Int, Type::Int) => Type::Int,
        (l, r) if l.is_numeric() && r.is_numeric() => Type::Float,
        // Vector math keeps the vector type
        (Type::Object(name), r) if r.is_numeric() || *r == Type::Object(name.clone()) => Type::Object(name.clone()),
        (l, Type::Object(name)) if l.is_numeric() => Type::Object(name.clone()),
        _ => Type::Unknown,
    }
}

pub(crate) fn binary_type(op: BinaryOp, left: &Type, right: &Type) -> Type {
    match op {
        BinaryOp::Add if *left == Type::String || *right == Type::String => Type::String,
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => arithmetic_type(left, right),
        BinaryOp::Div => match arithmetic_type(left, right) {
            // int / int is emitted as true division
            Type::Int => Type::Float,
            other => other,
        },
        BinaryOp::Mod => match (left, right) {
            (Type::Int, Type::Int) => Type::Int,
            (l, r) if l.is_numeric() && r.is_numeric() => Type::Float,
            _ => Type::Unknown,
        },
        BinaryOp::Pow => Type::Float,
        BinaryOp::And | BinaryOp::Or => Type::Bool,
        BinaryOp::NullishCoalesce => left.join(right),
        BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::LeftShift
        | BinaryOp::RightShift
        | BinaryOp::UnsignedRightShift => Type::Int,
        op if op.is_comparison() => Type::Bool,
        _ => Type::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_numeric_rules() {
        assert_eq!(binary_type(BinaryOp::Add, &Type::Int, &Type::Int), Type::Int);
        assert_eq!(binary_type(BinaryOp::Add, &Type::Int, &Type::Float), Type::Float);
        assert_eq!(binary_type(BinaryOp::Div, &Type::Int, &Type::Int), Type::Float);
        assert_eq!(binary_type(BinaryOp::Mod, &Type::Int, &Type::Int), Type::Int);
        assert_eq!(binary_type(BinaryOp::Mod, &Type::Float, &Type::Int), Type::Float);
        assert_eq!(binary_type(BinaryOp::Add, &Type::String, &Type::Int), Type::String);
        assert_eq!(binary_type(BinaryOp::Lt, &Type::Int, &Type::Float), Type::Bool);
        assert_eq!(binary_type(BinaryOp::Sub, &Type::Unknown, &Type::Int), Type::Unknown);
    }

    #[test]
    fn test_vector_math() {
        let vector = Type::Object("Vector2".into());
        assert_eq!(binary_type(BinaryOp::Mul, &vector, &Type::Float), vector);
        assert_eq!(binary_type(BinaryOp::Mul, &Type::Int, &vector), vector);
        assert_eq!(binary_type(BinaryOp::Add, &vector, &vector), vector);
    }
}
