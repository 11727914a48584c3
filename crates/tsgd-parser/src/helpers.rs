//! Helper methods and utilities

use super::*;

impl Parser {
    /// Parses a binding identifier. Contextual keywords such as `type` or
    /// `from` are accepted.
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<Node<Ident>> {
        if !self.is_identifier_token() {
            return Err(self.error(format!(
                "Expected identifier, found {:?}",
                self.current_token().kind
            )));
        }
        let token = self.advance().clone();
        Ok(self.node(Ident::new(token.value), token.span))
    }

    /// Parses any word, reserved or not. Used after `.` and for object keys.
    pub(crate) fn parse_identifier_name(&mut self) -> ParseResult<Node<Ident>> {
        if !self.current_token().kind.is_word() {
            return Err(self.error(format!(
                "Expected property name, found {:?}",
                self.current_token().kind
            )));
        }
        let token = self.advance().clone();
        Ok(self.node(Ident::new(token.value), token.span))
    }

    pub(crate) fn is_identifier_token(&self) -> bool {
        let kind = &self.current_token().kind;
        *kind == TokenKind::Identifier || kind.is_contextual_keyword()
    }

    pub(crate) fn parse_property_name(&mut self) -> ParseResult<PropertyName> {
        match self.current_token().kind {
            TokenKind::StringLiteral => {
                let value = self.advance().value.clone();
                Ok(PropertyName::String(value))
            }
            TokenKind::NumberLiteral => {
                let value = self.advance().value.clone();
                Ok(PropertyName::Number(parse_number(&value)))
            }
            TokenKind::LBracket => {
                self.advance();
                let expr = Box::new(self.parse_expression()?);
                self.consume(TokenKind::RBracket)?;
                Ok(PropertyName::Computed(expr))
            }
            _ if self.current_token().kind.is_word() => {
                Ok(PropertyName::Ident(self.parse_identifier_name()?))
            }
            _ => Err(self.error("Expected property name".to_string())),
        }
    }

    pub(crate) fn parse_function_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            params.push(self.parse_function_param()?);
            if !self.check(&TokenKind::RParen) {
                self.consume(TokenKind::Comma)?;
            }
        }

        Ok(params)
    }

    pub(crate) fn parse_function_param(&mut self) -> ParseResult<Param> {
        while self.check(&TokenKind::At) {
            // Parameter decorators carry no meaning for GDScript.
            self.parse_decorators()?;
        }

        let mut accessibility = None;
        loop {
            let is_modifier = matches!(
                self.current_token().kind,
                TokenKind::Public | TokenKind::Private | TokenKind::Protected | TokenKind::Readonly
            ) && self.peek_kind(1).map_or(false, |k| k.is_word() || *k == TokenKind::LBrace || *k == TokenKind::LBracket);
            if !is_modifier {
                break;
            }
            accessibility = match self.advance().kind {
                TokenKind::Private => Some(AccessModifier::Private),
                TokenKind::Protected => Some(AccessModifier::Protected),
                _ => Some(accessibility.unwrap_or(AccessModifier::Public)),
            };
        }

        let is_rest = if self.check(&TokenKind::DotDotDot) {
            self.advance();
            true
        } else {
            false
        };

        let start = self.current_token().span;
        let mut pattern = self.parse_binding_target()?;

        let optional = if self.check(&TokenKind::Question) {
            self.advance();
            true
        } else {
            false
        };

        let type_annotation = if self.check(&TokenKind::Colon) {
            self.advance();
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };

        if self.check(&TokenKind::Eq) {
            self.advance();
            let default = Box::new(self.parse_assignment_expression()?);
            let span = start.merge(&default.span);
            pattern = self.node(
                Pattern::Assignment {
                    pattern: Box::new(pattern),
                    default,
                },
                span,
            );
        }

        Ok(Param {
            pattern,
            type_annotation,
            optional,
            is_rest,
            accessibility,
        })
    }

    /// `@name` or `@name(args)`, repeated.
    pub(crate) fn parse_decorators(&mut self) -> ParseResult<Vec<Node<Expr>>> {
        let mut decorators = Vec::new();

        while self.check(&TokenKind::At) {
            let start = self.advance().span;
            let mut expr = {
                let ident = self.parse_identifier()?;
                let span = ident.span;
                self.node(Expr::Ident(ident.value), span)
            };

            while self.check(&TokenKind::Dot) {
                self.advance();
                let property = self.parse_identifier_name()?;
                let span = start.merge(&property.span);
                expr = self.node(
                    Expr::Member {
                        object: Box::new(expr),
                        property,
                    },
                    span,
                );
            }

            if self.check(&TokenKind::LParen) {
                self.advance();
                let args = self.parse_arguments()?;
                let span = start.merge(&self.previous_token().span);
                expr = self.node(
                    Expr::Call {
                        callee: Box::new(expr),
                        type_args: None,
                        args,
                    },
                    span,
                );
            }

            decorators.push(expr);
        }

        Ok(decorators)
    }

    /// Parses call arguments after the opening `(`, consuming the `)`.
    pub(crate) fn parse_arguments(&mut self) -> ParseResult<Vec<Node<Expr>>> {
        let mut args = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            if self.check(&TokenKind::DotDotDot) {
                let spread_start = self.current_token().span;
                self.advance();
                let expr = self.parse_assignment_expression()?;
                let spread_span = spread_start.merge(&expr.span);
                args.push(self.node(Expr::Spread(Box::new(expr)), spread_span));
            } else {
                args.push(self.parse_assignment_expression()?);
            }
            if !self.check(&TokenKind::RParen) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RParen)?;
        Ok(args)
    }

    pub(crate) fn parse_binary_operator(&mut self) -> ParseResult<BinaryOp> {
        let op = match self.current_token().kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::StarStar => BinaryOp::Pow,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::NotEq,
            TokenKind::EqEqEq => BinaryOp::StrictEq,
            TokenKind::BangEqEq => BinaryOp::StrictNotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::PipePipe => BinaryOp::Or,
            TokenKind::QuestionQuestion => BinaryOp::NullishCoalesce,
            TokenKind::Amp => BinaryOp::BitAnd,
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::Caret => BinaryOp::BitXor,
            TokenKind::LtLt => BinaryOp::LeftShift,
            TokenKind::GtGt => BinaryOp::RightShift,
            TokenKind::GtGtGt => BinaryOp::UnsignedRightShift,
            TokenKind::In => BinaryOp::In,
            TokenKind::Instanceof => BinaryOp::InstanceOf,
            _ => return Err(self.error("Expected binary operator".to_string())),
        };
        self.advance();
        Ok(op)
    }

    pub(crate) fn parse_assignment_operator(&mut self) -> ParseResult<AssignmentOp> {
        let op = match self.current_token().kind {
            TokenKind::Eq => AssignmentOp::Assign,
            TokenKind::PlusEq => AssignmentOp::AddAssign,
            TokenKind::MinusEq => AssignmentOp::SubAssign,
            TokenKind::StarEq => AssignmentOp::MulAssign,
            TokenKind::SlashEq => AssignmentOp::DivAssign,
            TokenKind::PercentEq => AssignmentOp::ModAssign,
            TokenKind::StarStarEq => AssignmentOp::PowAssign,
            TokenKind::AmpAmpEq => AssignmentOp::AndAssign,
            TokenKind::PipePipeEq => AssignmentOp::OrAssign,
            TokenKind::QuestionQuestionEq => AssignmentOp::NullishAssign,
            TokenKind::LtLtEq => AssignmentOp::LeftShiftAssign,
            TokenKind::GtGtEq => AssignmentOp::RightShiftAssign,
            TokenKind::GtGtGtEq => AssignmentOp::UnsignedRightShiftAssign,
            TokenKind::AmpEq => AssignmentOp::BitAndAssign,
            TokenKind::PipeEq => AssignmentOp::BitOrAssign,
            TokenKind::CaretEq => AssignmentOp::BitXorAssign,
            _ => return Err(self.error("Expected assignment operator".to_string())),
        };
        self.advance();
        Ok(op)
    }

    // =========================================================================
    // Operator Precedence
    // =========================================================================

    pub(crate) fn get_infix_precedence(&self) -> u8 {
        match self.current_token().kind {
            TokenKind::Comma => 1,
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
            | TokenKind::CaretEq => 2,
            TokenKind::Question => 3,
            TokenKind::QuestionQuestion => 4,
            TokenKind::PipePipe => 5,
            TokenKind::AmpAmp => 6,
            TokenKind::Pipe => 7,
            TokenKind::Caret => 8,
            TokenKind::Amp => 9,
            TokenKind::EqEq | TokenKind::BangEq | TokenKind::EqEqEq | TokenKind::BangEqEq => 10,
            TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LtEq
            | TokenKind::GtEq
            | TokenKind::In
            | TokenKind::Instanceof => 11,
            TokenKind::LtLt | TokenKind::GtGt | TokenKind::GtGtGt => 12,
            TokenKind::Plus | TokenKind::Minus => 13,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 14,
            TokenKind::StarStar => 15,
            TokenKind::As | TokenKind::Satisfies if !self.current_token().newline_before => 16,
            TokenKind::PlusPlus | TokenKind::MinusMinus if !self.current_token().newline_before => 17,
            TokenKind::Bang if !self.current_token().newline_before => 17,
            TokenKind::Dot
            | TokenKind::QuestionDot
            | TokenKind::LBracket
            | TokenKind::LParen
            | TokenKind::TemplateLiteral => 18,
            _ => 0,
        }
    }

    // =========================================================================
    // Utility Methods (Token Manipulation)
    // =========================================================================

    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        &self.tokens[(self.current.saturating_sub(1)).min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous_token()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && &self.current_token().kind == kind
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.current + offset).map(|t| &t.kind)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn consume(&mut self, kind: TokenKind) -> ParseResult<&Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {:?}, found {:?}", kind, self.current_token().kind)))
        }
    }

    pub(crate) fn consume_semicolon(&mut self) {
        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// `break`/`continue`/`return` end at a line break (ASI).
    pub(crate) fn at_statement_end(&self) -> bool {
        self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.is_at_end()
            || self.current_token().newline_before
    }

    pub(crate) fn is_declaration_start(&self) -> bool {
        match self.current_token().kind {
            TokenKind::Function | TokenKind::Class | TokenKind::Enum => true,
            TokenKind::Async => self.peek_kind(1) == Some(&TokenKind::Function),
            TokenKind::Abstract => self.peek_kind(1) == Some(&TokenKind::Class),
            TokenKind::Const => self.peek_kind(1) == Some(&TokenKind::Enum),
            TokenKind::Declare => self.peek_kind(1).map_or(false, |k| k.is_word()),
            TokenKind::Interface | TokenKind::Type => {
                self.peek_kind(1) == Some(&TokenKind::Identifier)
                    || self.peek_kind(1).map_or(false, |k| k.is_contextual_keyword())
            }
            TokenKind::Namespace | TokenKind::Module => {
                matches!(self.peek_kind(1), Some(TokenKind::Identifier) | Some(TokenKind::StringLiteral))
            }
            _ => false,
        }
    }

    pub(crate) fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            span: self.current_token().span,
        }
    }

    pub(crate) fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous_token().kind == TokenKind::Semicolon {
                return;
            }

            match self.current_token().kind {
                TokenKind::Class
                | TokenKind::Function
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return
                | TokenKind::Import
                | TokenKind::Export
                | TokenKind::At => return,
                _ => {}
            }

            self.advance();
        }
    }
}
