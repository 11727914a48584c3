//! Expression emission

use tsgd_ast::{
    ArrowBody, BinaryOp, Expr, Ident, Literal, Node, ObjectProperty, PropertyName, Span, UnaryOp,
};
use tsgd_typeck::Type;
use crate::error::CompileError;
use crate::gdscript::{
    self, PREC_ADD, PREC_AND, PREC_ASSIGN, PREC_ATOM, PREC_BIT_AND, PREC_BIT_NOT, PREC_BIT_OR,
    PREC_BIT_XOR, PREC_COMPARE, PREC_IN, PREC_IS, PREC_MUL, PREC_NEG, PREC_NOT, PREC_OR, PREC_SHIFT,
};
use crate::scope::BindingKind;
use crate::stmt::{division, modulo, needs_str, NumericForm};
use crate::transpiler::{annotation_type, EmitResult, FnBody, Transpiler};

/// `Math` members that exist as GDScript builtins under the same name.
const MATH_BUILTINS: &[&str] = &[
    "abs", "floor", "ceil", "round", "sqrt", "pow", "sin", "cos", "tan", "asin", "acos", "atan",
    "atan2", "exp", "log", "sign",
];

/// Engine methods whose first argument names an input action.
const INPUT_ACTION_METHODS: &[&str] = &[
    "is_action_pressed",
    "is_action_just_pressed",
    "is_action_just_released",
    "is_action_released",
    "get_action_strength",
    "is_action",
];

impl<'a> Transpiler<'a> {
    pub(crate) fn emit_expr(&mut self, expr: &Node<Expr>) -> EmitResult<String> {
        let span = expr.span;
        match &expr.value {
            Expr::Literal(literal) => self.emit_literal(literal, span),
            Expr::Ident(ident) => self.emit_ident_ref(&ident.name, span),
            Expr::Binary { left, op, right } => self.emit_binary(left, *op, right, span),
            Expr::Unary { op, expr: operand } => self.emit_unary(*op, operand, span),
            Expr::Assignment { .. } => Err(CompileError::unsupported("assignment inside an expression", span)),
            Expr::Call { callee, args, .. } => self.emit_call(callee, args, span),
            Expr::Member { object, property } => self.emit_member(object, property, span),
            Expr::Index { object, index } => Ok(format!(
                "{}[{}]",
                self.emit_operand(object, PREC_ATOM, false)?,
                self.emit_expr(index)?
            )),
            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    match element {
                        Some(Node {
                            value: Expr::Spread(_),
                            span,
                            ..
                        }) => return Err(CompileError::unsupported("spread element", *span)),
                        Some(element) => items.push(self.emit_expr(element)?),
                        None => items.push("null".to_string()),
                    }
                }
                Ok(format!("[{}]", items.join(", ")))
            }
            Expr::Object(properties) => self.emit_object(properties, span),
            Expr::Arrow { .. } | Expr::Function { .. } => {
                let method = self.closure_method(expr)?;
                Ok(format!("funcref(self, {})", gdscript::string_literal(&method)))
            }
            Expr::Ternary {
                condition,
                then_expr,
                else_expr,
            } => Ok(format!(
                "({} if {} else {})",
                self.emit_expr(then_expr)?,
                self.emit_expr(condition)?,
                self.emit_expr(else_expr)?
            )),
            Expr::Template { quasis, exprs } => self.emit_template(quasis, exprs),
            Expr::New { callee, args, .. } => self.emit_new(callee, args),
            Expr::Paren(inner)
            | Expr::TypeCast { expr: inner, .. }
            | Expr::Satisfies { expr: inner, .. }
            | Expr::NonNullAssertion(inner) => self.emit_expr(inner),
            Expr::This => Ok("self".to_string()),
            Expr::Super => Err(CompileError::unsupported("`super` outside a method call", span)),
            Expr::Await(_)
            | Expr::Yield { .. }
            | Expr::Sequence(_)
            | Expr::Spread(_)
            | Expr::TaggedTemplate { .. }
            | Expr::OptionalMember { .. }
            | Expr::OptionalCall { .. }
            | Expr::OptionalIndex { .. } => Err(CompileError::unsupported(expr.value.kind_name(), span)),
        }
    }

    /// Like [`Transpiler::emit_expr`], converting an int into a float where
    /// `expected` is a float.
    pub(crate) fn emit_expr_expecting(&mut self, expr: &Node<Expr>, expected: &Type) -> EmitResult<String> {
        if !expected.is_float() {
            return self.emit_expr(expr);
        }
        if let Some(literal) = float_literal_of(Expr::unwrap_transparent(expr)) {
            return Ok(literal);
        }
        if self.type_of(expr.id).is_int() {
            return Ok(format!("float({})", self.emit_expr(expr)?));
        }
        self.emit_expr(expr)
    }

    /// Emits `expr` as the operand of an operator binding at `parent`,
    /// parenthesized where GDScript would otherwise regroup it.
    pub(crate) fn emit_operand(&mut self, expr: &Node<Expr>, parent: u8, right_side: bool) -> EmitResult<String> {
        let text = self.emit_expr(expr)?;
        let own = self.precedence_of(expr);
        if own < parent || (right_side && own == parent && own != PREC_ATOM) {
            Ok(format!("({})", text))
        } else {
            Ok(text)
        }
    }

    /// Call arguments, converted to float where the callee declares one.
    pub(crate) fn emit_args(&mut self, args: &[Node<Expr>], params: &[Type]) -> EmitResult<String> {
        let mut parts = Vec::with_capacity(args.len());
        for (index, arg) in args.iter().enumerate() {
            if matches!(arg.value, Expr::Spread(_)) {
                return Err(CompileError::unsupported("spread argument", arg.span));
            }
            let expected = params.get(index).cloned().unwrap_or(Type::Unknown);
            parts.push(self.emit_expr_expecting(arg, &expected)?);
        }
        Ok(parts.join(", "))
    }

    /// Reference to a lexically visible name.
    pub(crate) fn emit_ident_ref(&mut self, name: &str, span: Span) -> EmitResult<String> {
        let binding = self.scopes.resolve(name, span)?.clone();
        match binding.kind {
            BindingKind::Local | BindingKind::Parameter => {
                if self.scopes.capture_depth(name).unwrap_or(0) > 0 {
                    return Err(CompileError::unsupported(
                        format!("closure capturing the local `{}`", name),
                        span,
                    ));
                }
                Ok(binding.emit)
            }
            BindingKind::Function => Ok(format!("funcref(self, {})", gdscript::string_literal(&binding.emit))),
            _ => Ok(binding.emit),
        }
    }

    fn precedence_of(&self, expr: &Node<Expr>) -> u8 {
        match &expr.value {
            Expr::Binary { left, op, right } => match op {
                BinaryOp::Mod if modulo(&self.type_of(left.id), &self.type_of(right.id)) == NumericForm::Float => {
                    PREC_ATOM
                }
                op => binary_precedence(*op),
            },
            Expr::Unary { op, .. } => match op {
                UnaryOp::Minus | UnaryOp::Plus => PREC_NEG,
                UnaryOp::Not => PREC_NOT,
                UnaryOp::BitNot => PREC_BIT_NOT,
                _ => PREC_ATOM,
            },
            Expr::Template { exprs, .. } if !exprs.is_empty() => PREC_ADD,
            Expr::Assignment { .. } => PREC_ASSIGN,
            Expr::Paren(inner)
            | Expr::TypeCast { expr: inner, .. }
            | Expr::Satisfies { expr: inner, .. }
            | Expr::NonNullAssertion(inner) => self.precedence_of(inner),
            _ => PREC_ATOM,
        }
    }

    /// Whether `name` still refers to the engine-level global of that name.
    fn is_global(&self, name: &str) -> bool {
        matches!(
            self.scopes.lookup(name),
            Some((_, binding)) if binding.kind == BindingKind::Global && binding.emit == name
        )
    }

    // =========================================================================
    // Literals
    // =========================================================================

    fn emit_literal(&mut self, literal: &Literal, span: Span) -> EmitResult<String> {
        match literal {
            Literal::Number { value, raw } => Ok(gdscript::number_literal(*value, raw)),
            Literal::String(value) => {
                if value.starts_with("res://") {
                    self.resource_refs.insert(value.clone());
                    if !self.ctx.definitions().is_known_resource(value) {
                        return Err(CompileError::UnknownResourcePath {
                            path: value.clone(),
                            span,
                        });
                    }
                }
                Ok(gdscript::string_literal(value))
            }
            Literal::Boolean(value) => Ok(value.to_string()),
            Literal::Null | Literal::Undefined => Ok("null".to_string()),
            Literal::RegExp { .. } => Err(CompileError::unsupported("regular expression", span)),
        }
    }

    fn emit_template(&mut self, quasis: &[String], exprs: &[Node<Expr>]) -> EmitResult<String> {
        let mut parts = Vec::new();
        for (index, quasi) in quasis.iter().enumerate() {
            if !quasi.is_empty() {
                parts.push(gdscript::string_literal(quasi));
            }
            if let Some(expr) = exprs.get(index) {
                if self.type_of(expr.id) == Type::String {
                    parts.push(self.emit_operand(expr, PREC_ADD, !parts.is_empty())?);
                } else {
                    parts.push(format!("str({})", self.emit_expr(expr)?));
                }
            }
        }
        if parts.is_empty() {
            return Ok("\"\"".to_string());
        }
        Ok(parts.join(" + "))
    }

    fn emit_object(&mut self, properties: &[ObjectProperty], span: Span) -> EmitResult<String> {
        let mut entries = Vec::with_capacity(properties.len());
        for property in properties {
            match property {
                ObjectProperty::Property { key, value, .. } => {
                    let key = match key {
                        PropertyName::Computed(key) => self.emit_expr(key)?,
                        key => gdscript::string_literal(&key.as_static().unwrap_or_default()),
                    };
                    entries.push(format!("{}: {}", key, self.emit_expr(value)?));
                }
                ObjectProperty::Method { .. } => {
                    return Err(CompileError::unsupported("method in an object literal", span))
                }
                ObjectProperty::Spread(value) => {
                    return Err(CompileError::unsupported("object spread", value.span))
                }
            }
        }
        if entries.is_empty() {
            Ok("{}".to_string())
        } else {
            Ok(format!("{{{}}}", entries.join(", ")))
        }
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn emit_binary(&mut self, left: &Node<Expr>, op: BinaryOp, right: &Node<Expr>, span: Span) -> EmitResult<String> {
        let prec = binary_precedence(op);
        let left_type = self.type_of(left.id);
        let right_type = self.type_of(right.id);
        let symbol = match op {
            BinaryOp::Pow => {
                return Ok(format!("pow({}, {})", self.emit_expr(left)?, self.emit_expr(right)?));
            }
            BinaryOp::Div => match division(&left_type, &right_type) {
                NumericForm::Float => "/",
                NumericForm::Int => {
                    let numerator = match float_literal_of(Expr::unwrap_transparent(left)) {
                        Some(literal) => literal,
                        None => format!("float({})", self.emit_expr(left)?),
                    };
                    return Ok(format!("{} / {}", numerator, self.emit_operand(right, PREC_MUL, true)?));
                }
                NumericForm::Ambiguous => {
                    return Err(CompileError::AmbiguousNumericType {
                        what: "the operands of `/`".to_string(),
                        span,
                    })
                }
            },
            BinaryOp::Mod => match modulo(&left_type, &right_type) {
                NumericForm::Int => "%",
                NumericForm::Float => {
                    return Ok(format!("fmod({}, {})", self.emit_expr(left)?, self.emit_expr(right)?));
                }
                NumericForm::Ambiguous => {
                    return Err(CompileError::AmbiguousNumericType {
                        what: "the operands of `%`".to_string(),
                        span,
                    })
                }
            },
            BinaryOp::Add => {
                if left_type == Type::String && needs_str(&right_type) {
                    return Ok(format!(
                        "{} + str({})",
                        self.emit_operand(left, PREC_ADD, false)?,
                        self.emit_expr(right)?
                    ));
                }
                if right_type == Type::String && needs_str(&left_type) {
                    return Ok(format!(
                        "str({}) + {}",
                        self.emit_expr(left)?,
                        self.emit_operand(right, PREC_ADD, true)?
                    ));
                }
                "+"
            }
            BinaryOp::StrictEq => "==",
            BinaryOp::StrictNotEq => "!=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::InstanceOf => {
                let value = self.emit_operand(left, PREC_IS, false)?;
                let class = self.emit_class_ref(right)?;
                return Ok(format!("{} is {}", value, class));
            }
            BinaryOp::NullishCoalesce | BinaryOp::UnsignedRightShift => {
                return Err(CompileError::unsupported(format!("`{}`", op), span));
            }
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::In => "in",
        };
        Ok(format!(
            "{} {} {}",
            self.emit_operand(left, prec, false)?,
            symbol,
            self.emit_operand(right, prec, true)?
        ))
    }

    fn emit_unary(&mut self, op: UnaryOp, operand: &Node<Expr>, span: Span) -> EmitResult<String> {
        match op {
            UnaryOp::Minus => Ok(format!("-{}", self.emit_operand(operand, PREC_NEG, true)?)),
            UnaryOp::Plus => {
                if self.type_of(operand.id).is_numeric() {
                    self.emit_operand(operand, PREC_NEG, true)
                } else {
                    Ok(format!("float({})", self.emit_expr(operand)?))
                }
            }
            UnaryOp::Not => Ok(format!("not {}", self.emit_operand(operand, PREC_NOT, true)?)),
            UnaryOp::BitNot => Ok(format!("~{}", self.emit_operand(operand, PREC_BIT_NOT, true)?)),
            UnaryOp::TypeOf | UnaryOp::Void | UnaryOp::Delete => {
                Err(CompileError::unsupported(format!("`{}`", op), span))
            }
            UnaryOp::PreIncrement | UnaryOp::PreDecrement | UnaryOp::PostIncrement | UnaryOp::PostDecrement => Err(
                CompileError::unsupported(format!("`{}` inside an expression", op), span),
            ),
        }
    }

    // =========================================================================
    // Calls and member access
    // =========================================================================

    fn emit_call(&mut self, callee: &Node<Expr>, args: &[Node<Expr>], span: Span) -> EmitResult<String> {
        match &callee.value {
            Expr::Member { object, property } => self.emit_method_call(object, property, args, span),
            Expr::Ident(ident) => self.emit_function_call(ident, callee.span, args),
            Expr::Super => Err(CompileError::unsupported(
                "`super(...)` anywhere but the start of a constructor",
                span,
            )),
            _ => Ok(format!(
                "{}.call_func({})",
                self.emit_operand(callee, PREC_ATOM, false)?,
                self.emit_args(args, &[])?
            )),
        }
    }

    fn emit_function_call(&mut self, ident: &Ident, span: Span, args: &[Node<Expr>]) -> EmitResult<String> {
        let binding = self.scopes.resolve(&ident.name, span)?.clone();
        match binding.kind {
            BindingKind::Global if ident.name == "Yield" => Ok(format!("yield({})", self.emit_args(args, &[])?)),
            BindingKind::Function => Ok(format!(
                "{}({})",
                binding.emit,
                self.emit_args(args, &binding.params)?
            )),
            BindingKind::Local | BindingKind::Parameter | BindingKind::Member => {
                let value = self.emit_ident_ref(&ident.name, span)?;
                Ok(format!("{}.call_func({})", value, self.emit_args(args, &[])?))
            }
            BindingKind::Class => Err(CompileError::unsupported(
                format!("calling the class `{}` without `new`", ident.name),
                span,
            )),
            _ => Ok(format!("{}({})", binding.emit, self.emit_args(args, &[])?)),
        }
    }

    fn emit_method_call(
        &mut self,
        object: &Node<Expr>,
        property: &Node<Ident>,
        args: &[Node<Expr>],
        span: Span,
    ) -> EmitResult<String> {
        let name = property.value.name.as_str();
        match &object.value {
            Expr::Ident(global) if global.name == "console" && self.is_global("console") => {
                return self.emit_console(name, args, span);
            }
            Expr::Ident(global) if global.name == "Math" && self.is_global("Math") => {
                return self.emit_math(name, args, span);
            }
            Expr::Super => return Ok(format!(".{}({})", name, self.emit_args(args, &[])?)),
            Expr::This => {
                if let Some(binding) = self.scopes.resolve_member(name).cloned() {
                    match binding.kind {
                        BindingKind::Function => {
                            return Ok(format!(
                                "self.{}({})",
                                binding.emit,
                                self.emit_args(args, &binding.params)?
                            ));
                        }
                        BindingKind::Member if matches!(binding.ty, Type::Function(_)) => {
                            return Ok(format!(
                                "self.{}.call_func({})",
                                binding.emit,
                                self.emit_args(args, &[])?
                            ));
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        if INPUT_ACTION_METHODS.contains(&name) && self.takes_input_actions(object) {
            self.check_input_action(args.first())?;
        }
        if name == "connect" {
            if let Some(text) = self.emit_connect(object, args)? {
                return Ok(text);
            }
        }
        let receiver = self.emit_operand(object, PREC_ATOM, false)?;
        if name == "push" && args.len() == 1 {
            return Ok(format!("{}.append({})", receiver, self.emit_args(args, &[])?));
        }
        Ok(format!("{}.{}({})", receiver, name, self.emit_args(args, &[])?))
    }

    /// The `Input` singleton or an input event.
    fn takes_input_actions(&self, object: &Node<Expr>) -> bool {
        if let Expr::Ident(global) = &object.value {
            if global.name == "Input" && self.is_global("Input") {
                return true;
            }
        }
        matches!(
            self.type_of(object.id),
            Type::Object(class) if self.ctx.builtins().inherits(&class, "InputEvent")
        )
    }

    /// A literal action name must be one the project declares.
    fn check_input_action(&self, arg: Option<&Node<Expr>>) -> EmitResult<()> {
        let Some(arg) = arg.map(Expr::unwrap_transparent) else {
            return Ok(());
        };
        if let Expr::Literal(Literal::String(action)) = &arg.value {
            if !self.ctx.definitions().is_input_action(action) {
                return Err(CompileError::UnknownInputAction {
                    action: action.clone(),
                    span: arg.span,
                });
            }
        }
        Ok(())
    }

    /// `x.connect("signal", handler)` with a closure or method handler
    /// becomes the engine's three-argument form.
    fn emit_connect(&mut self, object: &Node<Expr>, args: &[Node<Expr>]) -> EmitResult<Option<String>> {
        let [signal, handler] = args else {
            return Ok(None);
        };
        let handler = Expr::unwrap_transparent(handler);
        let is_closure = matches!(handler.value, Expr::Arrow { .. } | Expr::Function { .. });
        let method = match &handler.value {
            _ if is_closure => None,
            Expr::Member { object: this, property } if matches!(this.value, Expr::This) => {
                match self.scopes.resolve_member(&property.value.name) {
                    Some(binding) if binding.kind == BindingKind::Function => Some(binding.emit.clone()),
                    _ => return Ok(None),
                }
            }
            _ => return Ok(None),
        };

        let receiver = self.emit_operand(object, PREC_ATOM, false)?;
        let signal = self.emit_expr(signal)?;
        let method = match method {
            Some(method) => method,
            None => self.closure_method(handler)?,
        };
        Ok(Some(format!(
            "{}.connect({}, self, {})",
            receiver,
            signal,
            gdscript::string_literal(&method)
        )))
    }

    fn emit_console(&mut self, name: &str, args: &[Node<Expr>], span: Span) -> EmitResult<String> {
        let function = match name {
            "log" | "info" | "debug" | "warn" => "print",
            "error" => "printerr",
            _ => return Err(CompileError::unsupported(format!("`console.{}`", name), span)),
        };
        Ok(format!("{}({})", function, self.emit_args(args, &[])?))
    }

    fn emit_math(&mut self, name: &str, args: &[Node<Expr>], span: Span) -> EmitResult<String> {
        match name {
            "random" => Ok("randf()".to_string()),
            "trunc" => match args {
                [value] => Ok(format!("float(int({}))", self.emit_expr(value)?)),
                _ => Err(CompileError::unsupported("`Math.trunc` without exactly one argument", span)),
            },
            "min" | "max" => match args {
                [_, _] => Ok(format!("{}({})", name, self.emit_args(args, &[])?)),
                _ => Err(CompileError::unsupported(
                    format!("`Math.{}` without exactly two arguments", name),
                    span,
                )),
            },
            name if MATH_BUILTINS.contains(&name) => Ok(format!("{}({})", name, self.emit_args(args, &[])?)),
            _ => Err(CompileError::unsupported(format!("`Math.{}`", name), span)),
        }
    }

    fn emit_member(&mut self, object: &Node<Expr>, property: &Node<Ident>, span: Span) -> EmitResult<String> {
        let name = property.value.name.as_str();
        match &object.value {
            Expr::This => {
                return Ok(match self.scopes.resolve_member(name) {
                    Some(binding) => match binding.kind {
                        BindingKind::NodePath { .. } => binding.emit.clone(),
                        BindingKind::Function => {
                            format!("funcref(self, {})", gdscript::string_literal(&binding.emit))
                        }
                        _ => format!("self.{}", binding.emit),
                    },
                    // Inherited engine property
                    None => format!("self.{}", name),
                });
            }
            Expr::Super => return Err(CompileError::unsupported("property access on `super`", span)),
            Expr::Ident(global) if global.name == "Math" && self.is_global("Math") => {
                return match name {
                    "PI" => Ok("PI".to_string()),
                    "E" => Ok(format!("{:?}", std::f64::consts::E)),
                    _ => Err(CompileError::unsupported(format!("`Math.{}`", name), span)),
                };
            }
            _ => {}
        }

        let object_type = self.type_of(object.id);
        if name == "length" && !matches!(object_type, Type::Object(_) | Type::Dictionary) {
            return Ok(format!("len({})", self.emit_expr(object)?));
        }
        let receiver = self.emit_operand(object, PREC_ATOM, false)?;
        match object_type {
            // Enum members are emitted as constants with keyword-safe names
            Type::Enum(_) => Ok(format!("{}.{}", receiver, gdscript::ident(name))),
            _ => Ok(format!("{}.{}", receiver, name)),
        }
    }

    fn emit_new(&mut self, callee: &Node<Expr>, args: &[Node<Expr>]) -> EmitResult<String> {
        let class = self.emit_class_ref(callee)?;
        let args = self.emit_args(args, &[])?;
        let constructed_by_call = match &callee.value {
            Expr::Ident(ident) => {
                self.ctx.builtins().is_value_type(&ident.name)
                    || matches!(ident.name.as_str(), "Array" | "Dictionary" | "String")
            }
            _ => false,
        };
        if constructed_by_call {
            Ok(format!("{}({})", class, args))
        } else {
            Ok(format!("{}.new({})", class, args))
        }
    }

    /// Class operand of `new` or `instanceof`. Capitalized names the
    /// registry does not know are taken to be engine classes.
    fn emit_class_ref(&mut self, expr: &Node<Expr>) -> EmitResult<String> {
        match &expr.value {
            Expr::Ident(ident) => {
                if self.scopes.lookup(&ident.name).is_none() && ident.name.starts_with(|c: char| c.is_ascii_uppercase()) {
                    return Ok(ident.name.clone());
                }
                self.emit_ident_ref(&ident.name, expr.span)
            }
            _ => self.emit_operand(expr, PREC_ATOM, false),
        }
    }

    /// Hoists an arrow or function expression and returns the generated
    /// method's name.
    fn closure_method(&mut self, expr: &Node<Expr>) -> EmitResult<String> {
        let span = expr.span;
        match &expr.value {
            Expr::Arrow {
                params,
                return_type,
                body,
                is_async,
            } => {
                if *is_async {
                    return Err(CompileError::unsupported("async arrow function", span));
                }
                let body = match body {
                    ArrowBody::Expr(value) => FnBody::Expr(value),
                    ArrowBody::Block(block) => FnBody::Block(&block.value.stmts),
                };
                self.hoist_closure(params, body, annotation_type(return_type.as_deref()))
            }
            Expr::Function {
                params,
                return_type,
                body,
                is_async,
                is_generator,
                ..
            } => {
                if *is_async || *is_generator {
                    return Err(CompileError::unsupported(expr.value.kind_name(), span));
                }
                self.hoist_closure(
                    params,
                    FnBody::Block(&body.value.stmts),
                    annotation_type(return_type.as_deref()),
                )
            }
            other => Err(CompileError::unsupported(other.kind_name(), span)),
        }
    }
}

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => PREC_OR,
        BinaryOp::And => PREC_AND,
        BinaryOp::In => PREC_IN,
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::StrictEq
        | BinaryOp::StrictNotEq
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq => PREC_COMPARE,
        BinaryOp::InstanceOf => PREC_IS,
        BinaryOp::BitOr => PREC_BIT_OR,
        BinaryOp::BitXor => PREC_BIT_XOR,
        BinaryOp::BitAnd => PREC_BIT_AND,
        BinaryOp::LeftShift | BinaryOp::RightShift | BinaryOp::UnsignedRightShift => PREC_SHIFT,
        BinaryOp::Add | BinaryOp::Sub => PREC_ADD,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => PREC_MUL,
        BinaryOp::Pow | BinaryOp::NullishCoalesce => PREC_ATOM,
    }
}

/// Float spelling of an integer literal, possibly negated.
fn float_literal_of(expr: &Node<Expr>) -> Option<String> {
    match &expr.value {
        Expr::Literal(Literal::Number { value, raw }) if Type::of_number_literal(raw).is_int() => {
            Some(gdscript::float_literal(*value, raw))
        }
        Expr::Unary {
            op: UnaryOp::Minus,
            expr: inner,
        } => float_literal_of(Expr::unwrap_transparent(inner)).map(|literal| format!("-{}", literal)),
        _ => None,
    }
}
