//! Statement emission

use std::collections::HashSet;
use tsgd_ast::{
    AssignmentOp, Decl, Expr, ForInLeft, ForInit, Ident, Node, Pattern, PropertyName, Span, Stmt,
    SwitchCase, UnaryOp, VarDecl,
};
use tsgd_typeck::Type;
use crate::error::CompileError;
use crate::gdscript;
use crate::output::Output;
use crate::scope::{Binding, BindingKind, ScopeKind};
use crate::transpiler::{EmitResult, Flow, Transpiler};

impl<'a> Transpiler<'a> {
    /// Emits each statement, recording failures and carrying on.
    pub(crate) fn emit_stmts(&mut self, stmts: &[Node<Stmt>]) {
        for stmt in stmts {
            if let Err(error) = self.emit_stmt(stmt) {
                self.report(error);
            }
        }
    }

    /// Indented block with its own scope; `pass` when nothing was emitted.
    pub(crate) fn emit_block(&mut self, stmts: &[Node<Stmt>], trailer: &[String]) {
        self.emit_block_with(|_| Ok(()), stmts, trailer);
    }

    fn emit_block_with(
        &mut self,
        prologue: impl FnOnce(&mut Self) -> EmitResult<()>,
        stmts: &[Node<Stmt>],
        trailer: &[String],
    ) {
        self.out.indent();
        self.block_vars.push(HashSet::new());
        self.scopes.push(ScopeKind::Block);
        let start = self.out.len();

        if let Err(error) = prologue(self) {
            self.report(error);
        }
        self.emit_stmts(stmts);
        for line in trailer {
            self.out.line(line);
        }
        if self.out.len() == start {
            self.out.line("pass");
        }

        self.scopes.pop();
        self.block_vars.pop();
        self.out.dedent();
    }

    pub(crate) fn emit_stmt(&mut self, stmt: &Node<Stmt>) -> EmitResult<()> {
        let span = stmt.span;
        match &stmt.value {
            Stmt::Expr(expr) => self.emit_expr_stmt(expr),
            Stmt::VarDecl(var) => self.emit_var_decl(var),
            Stmt::Decl(decl) => self.emit_nested_decl(decl),
            Stmt::Return(value) => self.emit_return(value.as_ref()),
            Stmt::If {
                condition,
                then_stmt,
                else_stmt,
            } => self.emit_if(condition, then_stmt, else_stmt.as_deref()),
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                self.scopes.push(ScopeKind::Block);
                let result = self.emit_for(init.as_ref(), condition.as_ref(), update.as_ref(), body);
                self.scopes.pop();
                result
            }
            Stmt::ForIn { left, right, body } | Stmt::ForOf { left, right, body } => {
                let iterable = self.emit_expr(right)?;
                self.scopes.push(ScopeKind::Block);
                let result = self.emit_for_in(left, iterable, body);
                self.scopes.pop();
                result
            }
            Stmt::While { condition, body } => {
                let condition = self.emit_expr(condition)?;
                self.out.line(format!("while {}:", condition));
                self.emit_loop_body(body, Vec::new());
                Ok(())
            }
            Stmt::DoWhile { body, condition } => {
                let condition = self.emit_expr(condition)?;
                self.out.line("while true:");
                self.emit_loop_body(body, vec![format!("if not ({}): break", condition)]);
                Ok(())
            }
            Stmt::Block(block) => {
                // GDScript has no bare blocks; the statements join the
                // enclosing one but keep their own source scope.
                self.scopes.push(ScopeKind::Block);
                self.emit_stmts(&block.stmts);
                self.scopes.pop();
                Ok(())
            }
            Stmt::Break(label) => {
                if label.is_some() {
                    return Err(CompileError::unsupported("labeled break", span));
                }
                if matches!(self.flow.last(), Some(Flow::Switch)) {
                    return Err(CompileError::unsupported("`break` before the end of a switch case", span));
                }
                self.out.line("break");
                Ok(())
            }
            Stmt::Continue(label) => {
                if label.is_some() {
                    return Err(CompileError::unsupported("labeled continue", span));
                }
                self.emit_continue(span)
            }
            Stmt::Switch { discriminant, cases } => self.emit_switch(discriminant, cases, span),
            Stmt::Debugger => {
                self.out.line("breakpoint");
                Ok(())
            }
            Stmt::Empty => Ok(()),
            Stmt::Unsupported(kind) => Err(CompileError::unsupported(*kind, span)),
        }
    }

    fn emit_nested_decl(&mut self, decl: &Node<Decl>) -> EmitResult<()> {
        match &decl.value {
            Decl::Var(var) => self.emit_var_decl(var),
            Decl::Interface(_) | Decl::TypeAlias(_) => Ok(()),
            Decl::Function(_) => Err(CompileError::unsupported("nested function declaration", decl.span)),
            other => Err(CompileError::unsupported(
                format!("nested {}", other.kind_name()),
                decl.span,
            )),
        }
    }

    // =========================================================================
    // Expression statements
    // =========================================================================

    pub(crate) fn emit_expr_stmt(&mut self, expr: &Node<Expr>) -> EmitResult<()> {
        match &expr.value {
            Expr::Unary { op, expr: target } if op.is_update() => {
                let target = self.emit_assign_target(target)?;
                let op = match op {
                    UnaryOp::PreIncrement | UnaryOp::PostIncrement => "+=",
                    _ => "-=",
                };
                self.out.line(format!("{} {} 1", target, op));
            }
            Expr::Assignment { target, op, value } => {
                let text = self.emit_assignment(target, *op, value, expr.span)?;
                self.out.line(text);
            }
            Expr::Sequence(items) => {
                for item in items {
                    self.emit_expr_stmt(item)?;
                }
            }
            Expr::Paren(inner) => self.emit_expr_stmt(inner)?,
            _ => {
                let text = self.emit_expr(expr)?;
                self.out.line(text);
            }
        }
        Ok(())
    }

    fn emit_assign_target(&mut self, target: &Node<Expr>) -> EmitResult<String> {
        match &target.value {
            Expr::Ident(ident) => {
                let binding = self.scopes.resolve(&ident.name, target.span)?;
                match binding.kind {
                    BindingKind::Constant | BindingKind::Class | BindingKind::Function => Err(
                        CompileError::unsupported(format!("assignment to `{}`", ident.name), target.span),
                    ),
                    _ => self.emit_expr(target),
                }
            }
            Expr::Member { object, property } => {
                if matches!(object.value, Expr::This) {
                    let bound = self
                        .scopes
                        .resolve_member(&property.value.name)
                        .is_some_and(|binding| matches!(binding.kind, BindingKind::NodePath { .. }));
                    if bound {
                        return Err(CompileError::unsupported("assignment to a node-bound field", target.span));
                    }
                }
                self.emit_expr(target)
            }
            Expr::Index { .. } => self.emit_expr(target),
            Expr::Paren(inner) | Expr::NonNullAssertion(inner) => self.emit_assign_target(inner),
            Expr::TypeCast { expr, .. } => self.emit_assign_target(expr),
            _ => Err(CompileError::unsupported("destructuring assignment", target.span)),
        }
    }

    /// Target of an assignment whose value reads the target back. Objects and
    /// indices that may have side effects are evaluated once, into temps.
    fn emit_reread_target(&mut self, target: &Node<Expr>) -> EmitResult<String> {
        match &target.value {
            Expr::Index { object, index } if !is_stable(object) || !is_stable(index) => {
                let object = self.emit_stable(object)?;
                let index = self.emit_stable(index)?;
                Ok(format!("{}[{}]", object, index))
            }
            Expr::Member { object, property } if !is_stable(object) => {
                let object = self.emit_stable(object)?;
                Ok(format!("{}.{}", object, gdscript::ident(&property.value.name)))
            }
            Expr::Paren(inner) | Expr::NonNullAssertion(inner) => self.emit_reread_target(inner),
            Expr::TypeCast { expr, .. } => self.emit_reread_target(expr),
            _ => self.emit_assign_target(target),
        }
    }

    fn emit_stable(&mut self, expr: &Node<Expr>) -> EmitResult<String> {
        if is_stable(expr) {
            return self.emit_operand(expr, gdscript::PREC_ATOM, false);
        }
        let text = self.emit_expr(expr)?;
        Ok(self.temp_var(text))
    }

    fn emit_assignment(
        &mut self,
        target: &Node<Expr>,
        op: AssignmentOp,
        value: &Node<Expr>,
        span: Span,
    ) -> EmitResult<String> {
        let target_type = self.type_of(target.id);
        let value_type = self.type_of(value.id);
        let rereads = match op {
            AssignmentOp::DivAssign => division(&target_type, &value_type) == NumericForm::Int,
            AssignmentOp::ModAssign => modulo(&target_type, &value_type) == NumericForm::Float,
            AssignmentOp::PowAssign => true,
            _ => false,
        };
        let lhs = if rereads {
            self.emit_reread_target(target)?
        } else {
            self.emit_assign_target(target)?
        };
        let text = match op {
            AssignmentOp::Assign => format!("{} = {}", lhs, self.emit_expr_expecting(value, &target_type)?),
            AssignmentOp::AddAssign => {
                if target_type == Type::String && needs_str(&value_type) {
                    format!("{} += str({})", lhs, self.emit_expr(value)?)
                } else {
                    format!("{} += {}", lhs, self.emit_expr_expecting(value, &target_type)?)
                }
            }
            AssignmentOp::SubAssign => format!("{} -= {}", lhs, self.emit_expr_expecting(value, &target_type)?),
            AssignmentOp::MulAssign => format!("{} *= {}", lhs, self.emit_expr(value)?),
            AssignmentOp::DivAssign => match division(&target_type, &value_type) {
                NumericForm::Float => format!("{} /= {}", lhs, self.emit_expr(value)?),
                NumericForm::Int => format!(
                    "{} = float({}) / {}",
                    lhs,
                    lhs,
                    self.emit_operand(value, gdscript::PREC_MUL, true)?
                ),
                NumericForm::Ambiguous => {
                    return Err(CompileError::AmbiguousNumericType {
                        what: "the operands of `/=`".to_string(),
                        span,
                    })
                }
            },
            AssignmentOp::ModAssign => match modulo(&target_type, &value_type) {
                NumericForm::Float => format!("{} = fmod({}, {})", lhs, lhs, self.emit_expr(value)?),
                NumericForm::Int => format!("{} %= {}", lhs, self.emit_expr(value)?),
                NumericForm::Ambiguous => {
                    return Err(CompileError::AmbiguousNumericType {
                        what: "the operands of `%=`".to_string(),
                        span,
                    })
                }
            },
            AssignmentOp::PowAssign => format!("{} = pow({}, {})", lhs, lhs, self.emit_expr(value)?),
            AssignmentOp::LeftShiftAssign
            | AssignmentOp::RightShiftAssign
            | AssignmentOp::BitAndAssign
            | AssignmentOp::BitOrAssign
            | AssignmentOp::BitXorAssign => format!("{} {} {}", lhs, op, self.emit_expr(value)?),
            AssignmentOp::UnsignedRightShiftAssign
            | AssignmentOp::AndAssign
            | AssignmentOp::OrAssign
            | AssignmentOp::NullishAssign => {
                return Err(CompileError::unsupported(format!("`{}`", op), span));
            }
        };
        Ok(text)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn emit_var_decl(&mut self, var: &VarDecl) -> EmitResult<()> {
        if var.is_declare {
            return Ok(());
        }
        for declarator in &var.declarations {
            match &declarator.pattern.value {
                Pattern::Ident { name, .. } => {
                    let ty = self.type_of(declarator.pattern.id);
                    let value = match &declarator.init {
                        Some(init) => Some(self.emit_expr_expecting(init, &ty)?),
                        None => None,
                    };
                    let gd_name = self.declare_local(name, ty)?;
                    self.emit_var_line(&gd_name, value);
                }
                _ => {
                    let Some(init) = &declarator.init else {
                        return Err(CompileError::unsupported(
                            "destructuring without an initializer",
                            declarator.pattern.span,
                        ));
                    };
                    let source = self.emit_expr(init)?;
                    self.emit_destructure(&declarator.pattern, source)?;
                }
            }
        }
        Ok(())
    }

    /// A local shadowing one of the same function gets a fresh name; GDScript
    /// blocks cannot redeclare a name that is still visible.
    fn declare_local(&mut self, name: &Node<Ident>, ty: Type) -> EmitResult<String> {
        let mut gd_name = gdscript::ident(&name.value.name).into_owned();
        if self.shadows_function_local(&name.value.name) {
            gd_name = self.fresh_local_name(&gd_name);
        }
        self.scopes.declare(
            &name.value.name,
            Binding::new(BindingKind::Local, gd_name.as_str(), name.span).with_type(ty),
        )?;
        Ok(gd_name)
    }

    fn shadows_function_local(&self, name: &str) -> bool {
        self.scopes.in_function()
            && self.scopes.capture_depth(name) == Some(0)
            && self.scopes.lookup(name).is_some_and(|(_, binding)| binding.is_local())
    }

    fn fresh_local_name(&self, base: &str) -> String {
        let mut suffix = 1;
        loop {
            let candidate = format!("{}_{}", base, suffix);
            let taken = self.scopes.lookup(&candidate).is_some()
                || self.block_vars.iter().any(|vars| vars.contains(&candidate));
            if !taken {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// `var name = value`, or a plain assignment when the enclosing GDScript
    /// block already declared `name`.
    fn emit_var_line(&mut self, name: &str, value: Option<String>) {
        let fresh = self
            .block_vars
            .last_mut()
            .map_or(true, |vars| vars.insert(name.to_string()));
        let line = match (fresh, value) {
            (true, Some(value)) => format!("var {} = {}", name, value),
            (true, None) => format!("var {}", name),
            (false, Some(value)) => format!("{} = {}", name, value),
            (false, None) => format!("{} = null", name),
        };
        self.out.line(line);
    }

    fn temp_var(&mut self, source: String) -> String {
        let name = format!("_tmp_{}", self.next_temp_id);
        self.next_temp_id += 1;
        self.emit_var_line(&name, Some(source));
        name
    }

    fn emit_destructure(&mut self, pattern: &Node<Pattern>, source: String) -> EmitResult<()> {
        match &pattern.value {
            Pattern::Ident { name, .. } => {
                let gd_name = self.declare_local(name, self.type_of(pattern.id))?;
                self.emit_var_line(&gd_name, Some(source));
            }
            Pattern::Assignment { .. } => {
                return Err(CompileError::unsupported("default value in destructuring", pattern.span));
            }
            Pattern::Array { elements, rest, .. } => {
                let temp = self.temp_var(source);
                for (index, element) in elements.iter().enumerate() {
                    if let Some(element) = element {
                        self.emit_destructure(element, format!("{}[{}]", temp, index))?;
                    }
                }
                if let Some(rest) = rest {
                    let slice = format!("{}.slice({}, {}.size() - 1)", temp, elements.len(), temp);
                    self.emit_destructure(rest, slice)?;
                }
            }
            Pattern::Object { properties, rest, .. } => {
                if rest.is_some() {
                    return Err(CompileError::unsupported("object rest pattern", pattern.span));
                }
                let temp = self.temp_var(source);
                for property in properties {
                    let key = match &property.key {
                        PropertyName::Computed(expr) => self.emit_expr(expr)?,
                        key => gdscript::string_literal(&key.as_static().unwrap_or_default()),
                    };
                    self.emit_destructure(&property.value, format!("{}[{}]", temp, key))?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn emit_return(&mut self, value: Option<&Node<Expr>>) -> EmitResult<()> {
        match value {
            Some(value) => {
                let expected = self.return_types.last().cloned().unwrap_or(Type::Unknown);
                let text = self.emit_expr_expecting(value, &expected)?;
                self.out.line(format!("return {}", text));
            }
            None => self.out.line("return"),
        }
        Ok(())
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn emit_if(
        &mut self,
        condition: &Node<Expr>,
        then_stmt: &Node<Stmt>,
        else_stmt: Option<&Node<Stmt>>,
    ) -> EmitResult<()> {
        let condition = self.emit_expr(condition)?;
        self.out.line(format!("if {}:", condition));
        self.emit_block(body_stmts(then_stmt), &[]);

        let mut next = else_stmt;
        while let Some(stmt) = next {
            match &stmt.value {
                Stmt::If {
                    condition,
                    then_stmt,
                    else_stmt,
                } => {
                    let condition = self.emit_expr(condition)?;
                    self.out.line(format!("elif {}:", condition));
                    self.emit_block(body_stmts(then_stmt), &[]);
                    next = else_stmt.as_deref();
                }
                _ => {
                    self.out.line("else:");
                    self.emit_block(body_stmts(stmt), &[]);
                    next = None;
                }
            }
        }
        Ok(())
    }

    /// Loop body where `continue_prelude` also runs at the end of every
    /// iteration.
    fn emit_loop_body(&mut self, body: &Node<Stmt>, continue_prelude: Vec<String>) {
        self.flow.push(Flow::Loop {
            continue_prelude: continue_prelude.clone(),
        });
        self.emit_block(body_stmts(body), &continue_prelude);
        self.flow.pop();
    }

    fn emit_for(
        &mut self,
        init: Option<&ForInit>,
        condition: Option<&Node<Expr>>,
        update: Option<&Node<Expr>>,
        body: &Node<Stmt>,
    ) -> EmitResult<()> {
        match init {
            Some(ForInit::VarDecl(var)) => self.emit_var_decl(var)?,
            Some(ForInit::Expr(expr)) => self.emit_expr_stmt(expr)?,
            None => {}
        }
        let condition = match condition {
            Some(condition) => self.emit_expr(condition)?,
            None => "true".to_string(),
        };
        let update = match update {
            Some(update) => self.render_lines(|this| this.emit_expr_stmt(update))?,
            None => Vec::new(),
        };
        self.out.line(format!("while {}:", condition));
        self.emit_loop_body(body, update);
        Ok(())
    }

    fn emit_for_in(&mut self, left: &ForInLeft, iterable: String, body: &Node<Stmt>) -> EmitResult<()> {
        let (pattern, declares) = match left {
            ForInLeft::VarDecl(var) => match var.declarations.as_slice() {
                [declarator] => (&declarator.pattern, true),
                _ => {
                    return Err(CompileError::unsupported(
                        "several loop variables",
                        body.span,
                    ))
                }
            },
            ForInLeft::Pattern(pattern) => (pattern, false),
        };

        match &pattern.value {
            Pattern::Ident { name, .. } => {
                let variable = if declares {
                    self.declare_local(name, self.type_of(pattern.id))?
                } else {
                    self.emit_ident_ref(&name.value.name, name.span)?
                };
                self.out.line(format!("for {} in {}:", variable, iterable));
                self.emit_loop_body(body, Vec::new());
            }
            _ => {
                let temp = format!("_tmp_{}", self.next_temp_id);
                self.next_temp_id += 1;
                self.out.line(format!("for {} in {}:", temp, iterable));
                self.flow.push(Flow::Loop {
                    continue_prelude: Vec::new(),
                });
                self.emit_block_with(
                    |this| this.emit_destructure(pattern, temp),
                    body_stmts(body),
                    &[],
                );
                self.flow.pop();
            }
        }
        Ok(())
    }

    fn emit_continue(&mut self, span: Span) -> EmitResult<()> {
        let mut prelude = Vec::new();
        for flow in self.flow.iter().rev() {
            match flow {
                // Inside `match`, GDScript's `continue` moves on to the next
                // pattern instead of the next iteration.
                Flow::Switch => return Err(CompileError::unsupported("`continue` inside a switch", span)),
                Flow::Loop { continue_prelude } => {
                    prelude = continue_prelude.clone();
                    break;
                }
            }
        }
        for line in prelude {
            self.out.line(line);
        }
        self.out.line("continue");
        Ok(())
    }

    fn emit_switch(&mut self, discriminant: &Node<Expr>, cases: &[SwitchCase], span: Span) -> EmitResult<()> {
        let subject = self.emit_expr(discriminant)?;
        self.out.line(format!("match {}:", subject));
        self.out.indent();
        self.flow.push(Flow::Switch);
        let result = self.emit_cases(cases, span);
        self.flow.pop();
        self.out.dedent();
        result
    }

    fn emit_cases(&mut self, cases: &[SwitchCase], span: Span) -> EmitResult<()> {
        let mut patterns = Vec::new();
        for (index, case) in cases.iter().enumerate() {
            let last = index + 1 == cases.len();
            let case_span = case
                .test
                .as_ref()
                .map(|test| test.span)
                .or_else(|| case.consequent.first().map(|stmt| stmt.span))
                .unwrap_or(span);
            match &case.test {
                Some(test) => patterns.push(self.emit_expr(test)?),
                None => patterns.push("_".to_string()),
            }
            if case.consequent.is_empty() && !last {
                continue;
            }
            if !last && patterns.iter().any(|pattern| pattern == "_") {
                self.report(CompileError::unsupported("`default` before the last case", case_span));
            }

            let body = match strip_trailing_break(&case.consequent) {
                Some(body) => body,
                None => {
                    if !last && !ends_in_jump(&case.consequent) {
                        self.report(CompileError::unsupported("switch fall-through", case_span));
                    }
                    case.consequent.as_slice()
                }
            };
            self.out.line(format!("{}:", patterns.join(", ")));
            patterns.clear();
            self.emit_block(body, &[]);
        }
        Ok(())
    }

    /// Lines a statement renders to, without indentation.
    fn render_lines(&mut self, emit: impl FnOnce(&mut Self) -> EmitResult<()>) -> EmitResult<Vec<String>> {
        let saved = std::mem::replace(&mut self.out, Output::new());
        let result = emit(self);
        let rendered = std::mem::replace(&mut self.out, saved);
        result.map(|_| rendered.into_lines())
    }
}

/// Statements of a loop or branch body.
/// Evaluating it twice reads the same value and runs nothing.
fn is_stable(expr: &Node<Expr>) -> bool {
    match &expr.value {
        Expr::Ident(_) | Expr::This | Expr::Literal(_) => true,
        Expr::Member { object, .. } => is_stable(object),
        Expr::Paren(inner) | Expr::NonNullAssertion(inner) => is_stable(inner),
        _ => false,
    }
}

fn body_stmts(stmt: &Node<Stmt>) -> &[Node<Stmt>] {
    match &stmt.value {
        Stmt::Block(block) => &block.stmts,
        _ => std::slice::from_ref(stmt),
    }
}

/// Case body without its final `break`, looking into a trailing block.
fn strip_trailing_break(stmts: &[Node<Stmt>]) -> Option<&[Node<Stmt>]> {
    match stmts.split_last() {
        Some((last, rest)) => match &last.value {
            Stmt::Break(None) => Some(rest),
            Stmt::Block(block) if rest.is_empty() => strip_trailing_break(&block.stmts),
            _ => None,
        },
        None => None,
    }
}

fn ends_in_jump(stmts: &[Node<Stmt>]) -> bool {
    match stmts.last().map(|stmt| &stmt.value) {
        Some(Stmt::Return(_) | Stmt::Continue(_) | Stmt::Break(_) | Stmt::Unsupported("throw statement")) => true,
        Some(Stmt::Block(block)) => ends_in_jump(&block.stmts),
        _ => false,
    }
}

/// How a numeric operator must be written for the operand types at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumericForm {
    Int,
    Float,
    Ambiguous,
}

/// `/`: any float operand gives true division; two ints need a `float()`
/// conversion; anything else unknown cannot be decided.
pub(crate) fn division(left: &Type, right: &Type) -> NumericForm {
    if left.is_float() || right.is_float() {
        NumericForm::Float
    } else if left.is_int() && right.is_int() {
        NumericForm::Int
    } else if left.is_indeterminate() || right.is_indeterminate() {
        NumericForm::Ambiguous
    } else {
        NumericForm::Float
    }
}

/// `%`: any float operand needs `fmod`; ints and strings use `%`.
pub(crate) fn modulo(left: &Type, right: &Type) -> NumericForm {
    if left.is_float() || right.is_float() {
        NumericForm::Float
    } else if (left.is_int() && right.is_int()) || *left == Type::String {
        NumericForm::Int
    } else if left.is_indeterminate() || right.is_indeterminate() {
        NumericForm::Ambiguous
    } else {
        NumericForm::Int
    }
}

/// Whether a value of `ty` must go through `str()` to join a string.
pub(crate) fn needs_str(ty: &Type) -> bool {
    !matches!(ty, Type::String | Type::Unknown | Type::Any)
}
