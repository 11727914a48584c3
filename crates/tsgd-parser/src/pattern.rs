//! Pattern parsing

use super::*;

impl Parser {
    /// Binding pattern with an optional type annotation, as in `let` and
    /// `catch` clauses.
    pub(crate) fn parse_pattern(&mut self) -> ParseResult<Node<Pattern>> {
        let start = self.current_token().span;
        let mut pattern = self.parse_binding_target()?;

        // Definite assignment: let x!: number
        if self.check(&TokenKind::Bang) {
            self.advance();
        }

        if self.check(&TokenKind::Colon) {
            self.advance();
            let ty = Box::new(self.parse_type()?);
            match &mut pattern.value {
                Pattern::Ident { type_annotation, .. }
                | Pattern::Array { type_annotation, .. }
                | Pattern::Object { type_annotation, .. } => *type_annotation = Some(ty),
                Pattern::Assignment { .. } => {}
            }
            pattern.span = start.merge(&self.previous_token().span);
        }

        Ok(pattern)
    }

    /// Identifier, array or object pattern without annotation.
    pub(crate) fn parse_binding_target(&mut self) -> ParseResult<Node<Pattern>> {
        let start = self.current_token().span;

        let pattern = match self.current_token().kind {
            TokenKind::LBracket => self.parse_array_pattern()?,
            TokenKind::LBrace => self.parse_object_pattern()?,
            _ if self.is_identifier_token() => {
                let name = self.parse_identifier()?;
                Pattern::Ident {
                    name,
                    type_annotation: None,
                }
            }
            _ => {
                return Err(self.error(format!(
                    "Expected pattern, found {:?}",
                    self.current_token().kind
                )))
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(pattern, span))
    }

    /// Nested pattern that may carry a default value.
    fn parse_pattern_with_default(&mut self) -> ParseResult<Node<Pattern>> {
        let mut result = self.parse_binding_target()?;

        if self.check(&TokenKind::Eq) {
            self.advance();
            let default = Box::new(self.parse_assignment_expression()?);
            let span = result.span.merge(&default.span);
            result = self.node(
                Pattern::Assignment {
                    pattern: Box::new(result),
                    default,
                },
                span,
            );
        }

        Ok(result)
    }

    fn parse_array_pattern(&mut self) -> ParseResult<Pattern> {
        self.consume(TokenKind::LBracket)?;
        let mut elements = Vec::new();
        let mut rest = None;

        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            if self.check(&TokenKind::DotDotDot) {
                self.advance();
                rest = Some(Box::new(self.parse_binding_target()?));
                break;
            } else if self.check(&TokenKind::Comma) {
                elements.push(None);
                self.advance();
            } else {
                elements.push(Some(self.parse_pattern_with_default()?));
                if !self.check(&TokenKind::RBracket) {
                    self.consume(TokenKind::Comma)?;
                }
            }
        }

        self.consume(TokenKind::RBracket)?;

        Ok(Pattern::Array {
            elements,
            rest,
            type_annotation: None,
        })
    }

    fn parse_object_pattern(&mut self) -> ParseResult<Pattern> {
        self.consume(TokenKind::LBrace)?;
        let mut properties = Vec::new();
        let mut rest = None;

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.check(&TokenKind::DotDotDot) {
                self.advance();
                rest = Some(Box::new(self.parse_binding_target()?));
                break;
            }

            let key = self.parse_property_name()?;

            let (mut value, shorthand) = if self.check(&TokenKind::Colon) {
                self.advance();
                (self.parse_binding_target()?, false)
            } else if let PropertyName::Ident(ident) = &key {
                let pattern = Pattern::Ident {
                    name: ident.clone(),
                    type_annotation: None,
                };
                let span = ident.span;
                (self.node(pattern, span), true)
            } else {
                return Err(self.error("Invalid object pattern shorthand".to_string()));
            };

            if self.check(&TokenKind::Eq) {
                self.advance();
                let default = Box::new(self.parse_assignment_expression()?);
                let span = value.span.merge(&default.span);
                value = self.node(
                    Pattern::Assignment {
                        pattern: Box::new(value),
                        default,
                    },
                    span,
                );
            }

            properties.push(ObjectPatternProperty {
                key,
                value,
                shorthand,
            });

            if !self.check(&TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RBrace)?;

        Ok(Pattern::Object {
            properties,
            rest,
            type_annotation: None,
        })
    }
}
