//! Expression parsing

use super::*;
use tsgd_lexer::{cook, Lexer};

/// Operand precedence for prefix operators: binds tighter than `**`, looser
/// than member access and postfix operators.
const UNARY_OPERAND: u8 = 17;

impl Parser {
    /// Full expression, including the comma operator.
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Node<Expr>> {
        self.parse_expression_with_precedence(0)
    }

    /// Expression without a top-level comma: call arguments, initializers,
    /// array elements.
    pub(crate) fn parse_assignment_expression(&mut self) -> ParseResult<Node<Expr>> {
        self.parse_expression_with_precedence(2)
    }

    pub(crate) fn parse_expression_with_precedence(&mut self, min_precedence: u8) -> ParseResult<Node<Expr>> {
        let mut left = self.parse_prefix_expression()?;

        loop {
            let precedence = self.get_infix_precedence();

            if precedence == 0 || precedence < min_precedence {
                break;
            }

            left = self.parse_infix_expression(left)?;
        }

        Ok(left)
    }

    fn parse_prefix_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;

        let op = match self.current_token().kind {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::TypeOf),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            TokenKind::PlusPlus => Some(UnaryOp::PreIncrement),
            TokenKind::MinusMinus => Some(UnaryOp::PreDecrement),
            _ => None,
        };

        let expr = if let Some(op) = op {
            self.advance();
            let expr = Box::new(self.parse_expression_with_precedence(UNARY_OPERAND)?);
            Expr::Unary { op, expr }
        } else if self.check(&TokenKind::Await) && self.starts_operand(1) {
            self.advance();
            let expr = Box::new(self.parse_expression_with_precedence(UNARY_OPERAND)?);
            Expr::Await(expr)
        } else if self.check(&TokenKind::Yield) {
            self.advance();
            let delegate = if self.check(&TokenKind::Star) {
                self.advance();
                true
            } else {
                false
            };
            let argument = if self.at_statement_end()
                || self.check(&TokenKind::Comma)
                || self.check(&TokenKind::RParen)
                || self.check(&TokenKind::RBracket)
            {
                None
            } else {
                Some(Box::new(self.parse_assignment_expression()?))
            };
            Expr::Yield { argument, delegate }
        } else {
            return self.parse_primary_expression();
        };

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(expr, span))
    }

    /// Whether the token at `offset` can begin an operand. Distinguishes
    /// `await x` from an identifier named `await`.
    fn starts_operand(&self, offset: usize) -> bool {
        match self.peek_kind(offset) {
            Some(kind) => {
                kind.is_word()
                    || matches!(
                        kind,
                        TokenKind::NumberLiteral
                            | TokenKind::StringLiteral
                            | TokenKind::TemplateLiteral
                            | TokenKind::LParen
                            | TokenKind::LBracket
                            | TokenKind::LBrace
                            | TokenKind::Bang
                            | TokenKind::Minus
                    )
            }
            None => false,
        }
    }

    fn parse_infix_expression(&mut self, left: Node<Expr>) -> ParseResult<Node<Expr>> {
        let start = left.span;

        let expr = match self.current_token().kind.clone() {
            // Assignment operators (right associative)
            TokenKind::Eq
            | TokenKind::PlusEq
            | TokenKind::MinusEq
            | TokenKind::StarEq
            | TokenKind::SlashEq
            | TokenKind::PercentEq
            | TokenKind::StarStarEq
            | TokenKind::AmpAmpEq
            | TokenKind::PipePipeEq
            | TokenKind::QuestionQuestionEq
            | TokenKind::LtLtEq
            | TokenKind::GtGtEq
            | TokenKind::GtGtGtEq
            | TokenKind::AmpEq
            | TokenKind::PipeEq
            | TokenKind::CaretEq => {
                let op = self.parse_assignment_operator()?;
                let value = Box::new(self.parse_expression_with_precedence(2)?);
                Expr::Assignment {
                    target: Box::new(left),
                    op,
                    value,
                }
            }

            // Comma operator
            TokenKind::Comma => {
                let mut exprs = vec![left];
                while self.check(&TokenKind::Comma) {
                    self.advance();
                    exprs.push(self.parse_assignment_expression()?);
                }
                Expr::Sequence(exprs)
            }

            // Ternary operator
            TokenKind::Question => {
                self.advance();
                let then_expr = Box::new(self.parse_assignment_expression()?);
                self.consume(TokenKind::Colon)?;
                let else_expr = Box::new(self.parse_expression_with_precedence(2)?);
                Expr::Ternary {
                    condition: Box::new(left),
                    then_expr,
                    else_expr,
                }
            }

            // Generic call: f<T>(args)
            TokenKind::Lt if self.is_generic_call_ahead() => {
                let type_args = self.parse_type_arguments()?;
                self.consume(TokenKind::LParen)?;
                let args = self.parse_arguments()?;
                Expr::Call {
                    callee: Box::new(left),
                    type_args,
                    args,
                }
            }

            // Binary operators
            TokenKind::PipePipe
            | TokenKind::AmpAmp
            | TokenKind::Pipe
            | TokenKind::Caret
            | TokenKind::Amp
            | TokenKind::EqEq
            | TokenKind::BangEq
            | TokenKind::EqEqEq
            | TokenKind::BangEqEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LtEq
            | TokenKind::GtEq
            | TokenKind::In
            | TokenKind::Instanceof
            | TokenKind::LtLt
            | TokenKind::GtGt
            | TokenKind::GtGtGt
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::StarStar
            | TokenKind::QuestionQuestion => {
                let precedence = self.get_infix_precedence();
                let op = self.parse_binary_operator()?;
                // `**` is right associative
                let next = if op == BinaryOp::Pow { precedence } else { precedence + 1 };
                let right = Box::new(self.parse_expression_with_precedence(next)?);
                Expr::Binary {
                    left: Box::new(left),
                    op,
                    right,
                }
            }

            // Member access
            TokenKind::Dot => {
                self.advance();
                let property = self.parse_identifier_name()?;
                Expr::Member {
                    object: Box::new(left),
                    property,
                }
            }

            // Optional chaining
            TokenKind::QuestionDot => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_arguments()?;
                    Expr::OptionalCall {
                        callee: Box::new(left),
                        args,
                    }
                } else if self.check(&TokenKind::LBracket) {
                    self.advance();
                    let index = Box::new(self.parse_expression()?);
                    self.consume(TokenKind::RBracket)?;
                    Expr::OptionalIndex {
                        object: Box::new(left),
                        index,
                    }
                } else {
                    let property = self.parse_identifier_name()?;
                    Expr::OptionalMember {
                        object: Box::new(left),
                        property,
                    }
                }
            }

            // Index access
            TokenKind::LBracket => {
                self.advance();
                let index = Box::new(self.parse_expression()?);
                self.consume(TokenKind::RBracket)?;
                Expr::Index {
                    object: Box::new(left),
                    index,
                }
            }

            // Function call
            TokenKind::LParen => {
                self.advance();
                let args = self.parse_arguments()?;
                Expr::Call {
                    callee: Box::new(left),
                    type_args: None,
                    args,
                }
            }

            // Tagged template
            TokenKind::TemplateLiteral => {
                let token = self.advance().clone();
                let (quasis, exprs) = self.parse_template_parts(&token.value, token.span)?;
                Expr::TaggedTemplate {
                    tag: Box::new(left),
                    quasis,
                    exprs,
                }
            }

            // Type cast
            TokenKind::As => {
                self.advance();
                let ty = if self.check(&TokenKind::Const) {
                    let span = self.advance().span;
                    let name = self.node(Ident::new("const"), span);
                    self.node(Type::TypeRef { name, type_args: None }, span)
                } else {
                    self.parse_type()?
                };
                Expr::TypeCast {
                    expr: Box::new(left),
                    ty: Box::new(ty),
                }
            }

            // Satisfies operator
            TokenKind::Satisfies => {
                self.advance();
                let ty = Box::new(self.parse_type()?);
                Expr::Satisfies {
                    expr: Box::new(left),
                    ty,
                }
            }

            // Postfix operators
            TokenKind::PlusPlus => {
                self.advance();
                Expr::Unary {
                    op: UnaryOp::PostIncrement,
                    expr: Box::new(left),
                }
            }

            TokenKind::MinusMinus => {
                self.advance();
                Expr::Unary {
                    op: UnaryOp::PostDecrement,
                    expr: Box::new(left),
                }
            }

            // Non-null assertion: expr!
            TokenKind::Bang => {
                self.advance();
                Expr::NonNullAssertion(Box::new(left))
            }

            _ => return Ok(left),
        };

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(expr, span))
    }

    /// Looks ahead over `<...>` to see whether it is a type argument list
    /// followed by `(`.
    fn is_generic_call_ahead(&mut self) -> bool {
        let mark = self.mark();
        let result = self.parse_type_arguments().is_ok() && self.check(&TokenKind::LParen);
        self.reset(mark);
        result
    }

    pub(crate) fn parse_primary_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;

        let expr = match self.current_token().kind {
            // Literals
            TokenKind::NumberLiteral => {
                let raw = self.advance().value.clone();
                Expr::Literal(Literal::number(raw))
            }
            TokenKind::StringLiteral => {
                let value = self.advance().value.clone();
                Expr::Literal(Literal::String(value))
            }
            TokenKind::RegexLiteral => {
                let value = self.advance().value.clone();
                let (pattern, flags) = value.rsplit_once('/').unwrap_or((value.as_str(), ""));
                Expr::Literal(Literal::RegExp {
                    pattern: pattern.to_string(),
                    flags: flags.to_string(),
                })
            }
            TokenKind::True => {
                self.advance();
                Expr::Literal(Literal::Boolean(true))
            }
            TokenKind::False => {
                self.advance();
                Expr::Literal(Literal::Boolean(false))
            }
            TokenKind::Null => {
                self.advance();
                Expr::Literal(Literal::Null)
            }
            TokenKind::Undefined if self.peek_kind(1) != Some(&TokenKind::FatArrow) => {
                self.advance();
                Expr::Literal(Literal::Undefined)
            }

            // Template literal
            TokenKind::TemplateLiteral => {
                let token = self.advance().clone();
                let (quasis, exprs) = self.parse_template_parts(&token.value, token.span)?;
                Expr::Template { quasis, exprs }
            }

            // Async function expression or async arrow function
            TokenKind::Async if self.peek_kind(1) == Some(&TokenKind::Function) => {
                self.advance();
                return self.parse_function_expression(true);
            }
            TokenKind::Async
                if !self.peek_is_newline(1)
                    && matches!(self.peek_kind(1), Some(TokenKind::LParen) | Some(TokenKind::Identifier)) =>
            {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    let mut arrow = self.parse_paren_or_arrow()?;
                    if let Expr::Arrow { is_async, .. } = &mut arrow.value {
                        *is_async = true;
                        arrow.span = start.merge(&arrow.span);
                        return Ok(arrow);
                    }
                    return Err(self.error("Expected arrow function after async".to_string()));
                }
                return self.parse_arrow_function(None, None, true, start);
            }

            // Identifiers, including single-parameter arrows: x => x + 1
            _ if self.is_identifier_token() => {
                if self.peek_kind(1) == Some(&TokenKind::FatArrow) {
                    return self.parse_arrow_function(None, None, false, start);
                }
                let name = self.advance().value.clone();
                Expr::Ident(Ident::new(name))
            }

            // This
            TokenKind::This => {
                self.advance();
                Expr::This
            }

            // Super
            TokenKind::Super => {
                self.advance();
                Expr::Super
            }

            // Array literal
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();

                while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
                    if self.check(&TokenKind::Comma) {
                        elements.push(None);
                        self.advance();
                        continue;
                    }
                    if self.check(&TokenKind::DotDotDot) {
                        let spread_start = self.advance().span;
                        let expr = self.parse_assignment_expression()?;
                        let span = spread_start.merge(&expr.span);
                        elements.push(Some(self.node(Expr::Spread(Box::new(expr)), span)));
                    } else {
                        elements.push(Some(self.parse_assignment_expression()?));
                    }
                    if !self.check(&TokenKind::RBracket) {
                        self.consume(TokenKind::Comma)?;
                    }
                }

                self.consume(TokenKind::RBracket)?;
                Expr::Array(elements)
            }

            // Object literal
            TokenKind::LBrace => Expr::Object(self.parse_object_literal()?),

            // Parenthesized expression or arrow function
            TokenKind::LParen => {
                return self.parse_paren_or_arrow();
            }

            // Function expression
            TokenKind::Function => {
                return self.parse_function_expression(false);
            }

            // New expression
            TokenKind::New => {
                self.advance();
                let callee_start = self.current_token().span;
                let mut callee = self.parse_primary_expression()?;
                while self.check(&TokenKind::Dot) {
                    self.advance();
                    let property = self.parse_identifier_name()?;
                    let span = callee_start.merge(&property.span);
                    callee = self.node(
                        Expr::Member {
                            object: Box::new(callee),
                            property,
                        },
                        span,
                    );
                }

                let type_args = if self.check(&TokenKind::Lt) {
                    self.parse_type_arguments()?
                } else {
                    None
                };

                let args = if self.check(&TokenKind::LParen) {
                    self.advance();
                    self.parse_arguments()?
                } else {
                    Vec::new()
                };

                Expr::New {
                    callee: Box::new(callee),
                    type_args,
                    args,
                }
            }

            _ => {
                return Err(self.error(format!(
                    "Unexpected token in expression: {:?}",
                    self.current_token().kind
                )))
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(expr, span))
    }

    pub(crate) fn peek_is_newline(&self, offset: usize) -> bool {
        self.tokens
            .get(self.current + offset)
            .map_or(false, |token| token.newline_before)
    }

    fn parse_object_literal(&mut self) -> ParseResult<Vec<ObjectProperty>> {
        self.consume(TokenKind::LBrace)?;
        let mut properties = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.check(&TokenKind::DotDotDot) {
                self.advance();
                let expr = self.parse_assignment_expression()?;
                properties.push(ObjectProperty::Spread(expr));
            } else {
                let key_span = self.current_token().span;
                let key = self.parse_property_name()?;

                if self.check(&TokenKind::LParen) {
                    // Method shorthand
                    self.advance();
                    let params = self.parse_function_params()?;
                    self.consume(TokenKind::RParen)?;
                    let return_type = self.parse_optional_return_type()?;
                    let body = self.parse_block_statement()?;
                    properties.push(ObjectProperty::Method {
                        key,
                        params,
                        return_type,
                        body,
                    });
                } else if self.check(&TokenKind::Colon) {
                    self.advance();
                    let value = self.parse_assignment_expression()?;
                    properties.push(ObjectProperty::Property {
                        key,
                        value,
                        shorthand: false,
                    });
                } else if let PropertyName::Ident(ident) = &key {
                    // Shorthand property
                    let value_expr = Expr::Ident(ident.value.clone());
                    let value = self.node(value_expr, key_span);
                    properties.push(ObjectProperty::Property {
                        key,
                        value,
                        shorthand: true,
                    });
                } else {
                    return Err(self.error("Invalid property shorthand".to_string()));
                }
            }

            if !self.check(&TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RBrace)?;
        Ok(properties)
    }

    fn parse_function_expression(&mut self, is_async: bool) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        self.consume(TokenKind::Function)?;

        let is_generator = if self.check(&TokenKind::Star) {
            self.advance();
            true
        } else {
            false
        };

        let name = if self.is_identifier_token() {
            Some(self.parse_identifier()?)
        } else {
            None
        };

        self.parse_type_parameters()?;
        self.consume(TokenKind::LParen)?;
        let params = self.parse_function_params()?;
        self.consume(TokenKind::RParen)?;
        let return_type = self.parse_optional_return_type()?;
        let body = Box::new(self.parse_block_statement()?);

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(
            Expr::Function {
                name,
                params,
                return_type,
                body,
                is_async,
                is_generator,
            },
            span,
        ))
    }

    pub(crate) fn parse_optional_return_type(&mut self) -> ParseResult<Option<Box<Node<Type>>>> {
        if self.check(&TokenKind::Colon) {
            self.advance();
            Ok(Some(Box::new(self.parse_return_type()?)))
        } else {
            Ok(None)
        }
    }

    fn parse_paren_or_arrow(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let mark = self.mark();

        // Try parsing as arrow function parameters first
        if let Some((params, return_type)) = self.try_parse_arrow_head() {
            return self.parse_arrow_function(Some(params), return_type, false, start);
        }

        // Reset and parse as parenthesized expression
        self.reset(mark);

        self.consume(TokenKind::LParen)?;
        let expr = self.parse_expression()?;
        self.consume(TokenKind::RParen)?;

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(Expr::Paren(Box::new(expr)), span))
    }

    /// `(params): Ret =>` with the cursor left on `=>`; `None` when the
    /// parenthesis does not open an arrow function.
    fn try_parse_arrow_head(&mut self) -> Option<(Vec<Param>, Option<Box<Node<Type>>>)> {
        self.consume(TokenKind::LParen).ok()?;
        let params = self.parse_function_params().ok()?;
        self.consume(TokenKind::RParen).ok()?;

        let return_type = if self.check(&TokenKind::Colon) {
            self.advance();
            Some(Box::new(self.parse_return_type().ok()?))
        } else {
            None
        };

        if self.check(&TokenKind::FatArrow) && !self.current_token().newline_before {
            Some((params, return_type))
        } else {
            None
        }
    }

    fn parse_arrow_function(
        &mut self,
        params: Option<Vec<Param>>,
        return_type: Option<Box<Node<Type>>>,
        is_async: bool,
        start: Span,
    ) -> ParseResult<Node<Expr>> {
        let params = match params {
            Some(params) => params,
            None => {
                // Single parameter without parentheses
                let ident = self.parse_identifier()?;
                let span = ident.span;
                let pattern = self.node(
                    Pattern::Ident {
                        name: ident,
                        type_annotation: None,
                    },
                    span,
                );
                vec![Param {
                    pattern,
                    type_annotation: None,
                    optional: false,
                    is_rest: false,
                    accessibility: None,
                }]
            }
        };

        self.consume(TokenKind::FatArrow)?;

        let body = if self.check(&TokenKind::LBrace) {
            ArrowBody::Block(Box::new(self.parse_block_statement()?))
        } else {
            ArrowBody::Expr(Box::new(self.parse_assignment_expression()?))
        };

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(
            Expr::Arrow {
                params,
                return_type,
                body,
                is_async,
            },
            span,
        ))
    }

    // =========================================================================
    // Template Literals
    // =========================================================================

    /// Splits a raw template body into cooked string parts and parsed hole
    /// expressions. Hole expressions keep spans relative to the whole file.
    pub(crate) fn parse_template_parts(
        &mut self,
        raw: &str,
        span: Span,
    ) -> ParseResult<(Vec<String>, Vec<Node<Expr>>)> {
        // Content starts after the opening backtick
        let content_start = span.start + 1;
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();
        // Raw text of the part being read; escapes are decoded once it ends
        let mut current = String::new();
        let mut chars = raw.char_indices().peekable();
        let cooked = |part: &str| {
            cook(part).map_err(|message| ParseError { message, span })
        };

        while let Some((index, ch)) = chars.next() {
            match ch {
                '\\' => {
                    current.push(ch);
                    if let Some((_, escaped)) = chars.next() {
                        current.push(escaped);
                    }
                }
                '$' if chars.peek().map(|(_, c)| *c) == Some('{') => {
                    chars.next();
                    let hole_start = index + 2;
                    let hole_end = find_hole_end(raw, hole_start).ok_or_else(|| ParseError {
                        message: "Unterminated template expression".to_string(),
                        span,
                    })?;

                    let source = &raw[hole_start..hole_end];
                    let expr = self.parse_sub_expression(source, content_start + hole_start, span.file_id)?;
                    quasis.push(cooked(&std::mem::take(&mut current))?);
                    exprs.push(expr);

                    // Skip past the closing brace
                    while let Some((i, _)) = chars.peek() {
                        if *i > hole_end {
                            break;
                        }
                        chars.next();
                    }
                }
                _ => current.push(ch),
            }
        }

        quasis.push(cooked(&current)?);
        Ok((quasis, exprs))
    }

    fn parse_sub_expression(&mut self, source: &str, offset: usize, file_id: usize) -> ParseResult<Node<Expr>> {
        let tokens = Lexer::with_offset(source, file_id, offset).tokenize();
        let mut sub = Parser::with_first_id(tokens, self.next_id);
        let expr = sub.parse_expression()?;
        if !sub.is_at_end() {
            return Err(sub.error("Unexpected token in template expression".to_string()));
        }
        self.next_id = sub.next_id;
        Ok(expr)
    }
}

/// Byte index of the `}` closing a `${` hole that starts at `start`.
fn find_hole_end(raw: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '{' => depth += 1,
            '}' if depth == 0 => return Some(start + offset),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}
