//! Type annotation parsing

use super::*;

impl Parser {
    pub(crate) fn parse_type(&mut self) -> ParseResult<Node<Type>> {
        self.parse_union_type()
    }

    /// Return type position: also accepts type predicates (`x is Sprite`),
    /// which are treated as `boolean`.
    pub(crate) fn parse_return_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        if (self.is_identifier_token() || self.check(&TokenKind::This))
            && self.peek_kind(1) == Some(&TokenKind::Is)
        {
            self.advance();
            self.advance();
            self.parse_type()?;
            let span = start.merge(&self.previous_token().span);
            return Ok(self.node(Type::Primitive(PrimitiveType::Boolean), span));
        }
        self.parse_type()
    }

    fn parse_union_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;

        // Leading `|` in multi-line unions
        if self.check(&TokenKind::Pipe) {
            self.advance();
        }

        let mut types = vec![self.parse_intersection_type()?];

        while self.check(&TokenKind::Pipe) {
            self.advance();
            types.push(self.parse_intersection_type()?);
        }

        if types.len() == 1 {
            Ok(types.remove(0))
        } else {
            let span = start.merge(&self.previous_token().span);
            Ok(self.node(Type::Union(types), span))
        }
    }

    fn parse_intersection_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;

        if self.check(&TokenKind::Amp) {
            self.advance();
        }

        let mut types = vec![self.parse_postfix_type()?];

        while self.check(&TokenKind::Amp) {
            self.advance();
            types.push(self.parse_postfix_type()?);
        }

        if types.len() == 1 {
            Ok(types.remove(0))
        } else {
            let span = start.merge(&self.previous_token().span);
            Ok(self.node(Type::Intersection(types), span))
        }
    }

    fn parse_postfix_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        let mut ty = self.parse_base_type()?;

        // Array suffix and indexed access types
        while self.check(&TokenKind::LBracket) && !self.current_token().newline_before {
            if self.peek_kind(1) == Some(&TokenKind::RBracket) {
                self.advance();
                self.advance();
                let span = start.merge(&self.previous_token().span);
                ty = self.node(Type::Array(Box::new(ty)), span);
            } else {
                self.advance();
                let index_type = Box::new(self.parse_type()?);
                self.consume(TokenKind::RBracket)?;
                let span = start.merge(&self.previous_token().span);
                ty = self.node(
                    Type::IndexedAccess {
                        object_type: Box::new(ty),
                        index_type,
                    },
                    span,
                );
            }
        }

        Ok(ty)
    }

    fn parse_base_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;

        let ty = match self.current_token().kind {
            TokenKind::Void => {
                self.advance();
                Type::Primitive(PrimitiveType::Void)
            }
            TokenKind::Null => {
                self.advance();
                Type::Primitive(PrimitiveType::Null)
            }
            TokenKind::Undefined => {
                self.advance();
                Type::Primitive(PrimitiveType::Undefined)
            }
            TokenKind::Any => {
                self.advance();
                Type::Primitive(PrimitiveType::Any)
            }
            TokenKind::Never => {
                self.advance();
                Type::Primitive(PrimitiveType::Never)
            }
            TokenKind::Unknown => {
                self.advance();
                Type::Primitive(PrimitiveType::Unknown)
            }

            // Literal types
            TokenKind::StringLiteral => {
                let value = self.advance().value.clone();
                Type::Literal(LiteralType::String(value))
            }
            TokenKind::NumberLiteral => {
                let value = parse_number(&self.advance().value);
                Type::Literal(LiteralType::Number(value))
            }
            TokenKind::Minus if self.peek_kind(1) == Some(&TokenKind::NumberLiteral) => {
                self.advance();
                let value = parse_number(&self.advance().value);
                Type::Literal(LiteralType::Number(-value))
            }
            TokenKind::True => {
                self.advance();
                Type::Literal(LiteralType::Boolean(true))
            }
            TokenKind::False => {
                self.advance();
                Type::Literal(LiteralType::Boolean(false))
            }

            // keyof T
            TokenKind::Keyof => {
                self.advance();
                Type::Keyof(Box::new(self.parse_postfix_type()?))
            }

            // typeof value
            TokenKind::Typeof => {
                self.advance();
                Type::TypeofType(self.parse_dotted_name()?)
            }

            // readonly T[]
            TokenKind::Readonly => {
                self.advance();
                return self.parse_postfix_type();
            }

            TokenKind::This => {
                let span = self.advance().span;
                let name = self.node(Ident::new("this"), span);
                Type::TypeRef { name, type_args: None }
            }

            // Tuple type
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
                    if self.check(&TokenKind::DotDotDot) {
                        self.advance();
                    }
                    // Named tuple member: [x: number]
                    if self.is_identifier_token()
                        && (self.peek_kind(1) == Some(&TokenKind::Colon)
                            || (self.peek_kind(1) == Some(&TokenKind::Question)
                                && self.peek_kind(2) == Some(&TokenKind::Colon)))
                    {
                        self.advance();
                        if self.check(&TokenKind::Question) {
                            self.advance();
                        }
                        self.consume(TokenKind::Colon)?;
                    }
                    elements.push(self.parse_type()?);
                    if self.check(&TokenKind::Question) {
                        self.advance();
                    }
                    if !self.check(&TokenKind::RBracket) {
                        self.consume(TokenKind::Comma)?;
                    }
                }
                self.consume(TokenKind::RBracket)?;
                Type::Tuple(elements)
            }

            // Object type literal
            TokenKind::LBrace => {
                self.advance();
                let members = self.parse_object_type_members()?;
                self.consume(TokenKind::RBrace)?;
                Type::Object(ObjectType { members })
            }

            // Generic function type: <T>(x: T) => T
            TokenKind::Lt => {
                self.parse_type_parameters()?;
                return self.parse_function_type(start);
            }

            // Constructor type: new (...) => T
            TokenKind::New => {
                self.advance();
                return self.parse_function_type(start);
            }

            // Function type or parenthesized type
            TokenKind::LParen => {
                let mark = self.mark();
                if let Ok(function) = self.parse_function_type(start) {
                    return Ok(function);
                }
                self.reset(mark);

                self.advance();
                let inner = self.parse_type()?;
                self.consume(TokenKind::RParen)?;
                Type::Paren(Box::new(inner))
            }

            _ if self.is_identifier_token() => {
                let name = self.current_token().value.clone();
                let primitive = match name.as_str() {
                    "number" => Some(PrimitiveType::Number),
                    "string" => Some(PrimitiveType::String),
                    "boolean" => Some(PrimitiveType::Boolean),
                    _ => None,
                };

                if let Some(primitive) = primitive {
                    self.advance();
                    Type::Primitive(primitive)
                } else {
                    let name = self.parse_dotted_name()?;
                    let type_args = if self.check(&TokenKind::Lt) && !self.current_token().newline_before {
                        self.parse_type_arguments()?
                    } else {
                        None
                    };
                    Type::TypeRef { name, type_args }
                }
            }

            _ => {
                return Err(self.error(format!(
                    "Expected type, found {:?}",
                    self.current_token().kind
                )))
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(ty, span))
    }

    /// `(params) => Ret`
    fn parse_function_type(&mut self, start: Span) -> ParseResult<Node<Type>> {
        self.consume(TokenKind::LParen)?;
        let params = self.parse_function_params()?;
        self.consume(TokenKind::RParen)?;
        self.consume(TokenKind::FatArrow)?;
        let return_type = Box::new(self.parse_return_type()?);

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(Type::Function(FunctionType { params, return_type }), span))
    }

    /// `Foo` or `Foo.Bar.Baz`, joined into one identifier.
    fn parse_dotted_name(&mut self) -> ParseResult<Node<Ident>> {
        let first = self.parse_identifier()?;
        let mut name = first.value.name;
        let mut span = first.span;

        while self.check(&TokenKind::Dot) {
            self.advance();
            let part = self.parse_identifier_name()?;
            name.push('.');
            name.push_str(&part.value.name);
            span = span.merge(&part.span);
        }

        Ok(self.node(Ident::new(name), span))
    }

    /// Members of an object type literal or interface body, up to `}`.
    pub(crate) fn parse_object_type_members(&mut self) -> ParseResult<Vec<ObjectTypeMember>> {
        let mut members = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            members.push(self.parse_object_type_member()?);

            if self.check(&TokenKind::Semicolon) || self.check(&TokenKind::Comma) {
                self.advance();
            } else if !self.check(&TokenKind::RBrace) && !self.current_token().newline_before {
                return Err(self.error("Expected ';' or ',' between type members".to_string()));
            }
        }

        Ok(members)
    }

    fn parse_object_type_member(&mut self) -> ParseResult<ObjectTypeMember> {
        // Call signature: (x: T): U
        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            self.parse_type_parameters()?;
            self.consume(TokenKind::LParen)?;
            let params = self.parse_function_params()?;
            self.consume(TokenKind::RParen)?;
            let return_type = self.parse_member_return_type()?;
            return Ok(ObjectTypeMember::CallSignature { params, return_type });
        }

        // Construct signature: new (x: T): U
        if self.check(&TokenKind::New) && self.peek_kind(1) == Some(&TokenKind::LParen) {
            self.advance();
            self.advance();
            let params = self.parse_function_params()?;
            self.consume(TokenKind::RParen)?;
            let return_type = self.parse_member_return_type()?;
            return Ok(ObjectTypeMember::CallSignature { params, return_type });
        }

        // Index signature: [key: string]: T
        if self.check(&TokenKind::LBracket)
            && self.peek_kind(2) == Some(&TokenKind::Colon)
        {
            self.advance();
            let key_name = self.parse_identifier()?;
            self.consume(TokenKind::Colon)?;
            let key_type = self.parse_type()?;
            self.consume(TokenKind::RBracket)?;
            self.consume(TokenKind::Colon)?;
            let value_type = self.parse_type()?;
            return Ok(ObjectTypeMember::IndexSignature {
                key_name,
                key_type,
                value_type,
            });
        }

        let readonly = if self.check(&TokenKind::Readonly)
            && self.peek_kind(1).map_or(false, |k| k.is_word() || *k == TokenKind::StringLiteral)
        {
            self.advance();
            true
        } else {
            false
        };

        let name = self.parse_property_name()?;

        let optional = if self.check(&TokenKind::Question) {
            self.advance();
            true
        } else {
            false
        };

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            self.parse_type_parameters()?;
            self.consume(TokenKind::LParen)?;
            let params = self.parse_function_params()?;
            self.consume(TokenKind::RParen)?;
            let return_type = self.parse_member_return_type()?;
            return Ok(ObjectTypeMember::Method {
                name,
                params,
                return_type,
                optional,
            });
        }

        let ty = if self.check(&TokenKind::Colon) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };

        Ok(ObjectTypeMember::Property {
            name,
            ty,
            optional,
            readonly,
        })
    }

    fn parse_member_return_type(&mut self) -> ParseResult<Option<Node<Type>>> {
        if self.check(&TokenKind::Colon) {
            self.advance();
            Ok(Some(self.parse_return_type()?))
        } else {
            Ok(None)
        }
    }

    // =========================================================================
    // Generics
    // =========================================================================

    /// `<A, B>` in type position. Returns `None` when no `<` follows.
    pub(crate) fn parse_type_arguments(&mut self) -> ParseResult<Option<Vec<Node<Type>>>> {
        if !self.check(&TokenKind::Lt) {
            return Ok(None);
        }
        self.advance();

        let mut args = Vec::new();
        while !self.check_type_close() && !self.is_at_end() {
            args.push(self.parse_type()?);
            if !self.check_type_close() {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume_type_close()?;

        Ok(Some(args))
    }

    /// `<T extends Node = Node, U>` on declarations.
    pub(crate) fn parse_type_parameters(&mut self) -> ParseResult<Option<Vec<TypeParam>>> {
        if !self.check(&TokenKind::Lt) {
            return Ok(None);
        }
        self.advance();

        let mut params = Vec::new();
        while !self.check_type_close() && !self.is_at_end() {
            let name = self.parse_identifier()?;

            let constraint = if self.check(&TokenKind::Extends) {
                self.advance();
                Some(Box::new(self.parse_type()?))
            } else {
                None
            };

            let default = if self.check(&TokenKind::Eq) {
                self.advance();
                Some(Box::new(self.parse_type()?))
            } else {
                None
            };

            params.push(TypeParam {
                name,
                constraint,
                default,
            });

            if !self.check_type_close() {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume_type_close()?;

        Ok(Some(params))
    }

    fn check_type_close(&self) -> bool {
        matches!(
            self.current_token().kind,
            TokenKind::Gt | TokenKind::GtGt | TokenKind::GtGtGt | TokenKind::GtEq | TokenKind::GtGtEq
        )
    }

    /// Consumes one `>` closing a type argument list. Tokens such as `>>` in
    /// `Array<Array<int>>` are split and the remainder stays current.
    fn consume_type_close(&mut self) -> ParseResult<()> {
        let remainder = match self.current_token().kind {
            TokenKind::Gt => {
                self.advance();
                return Ok(());
            }
            TokenKind::GtGt => TokenKind::Gt,
            TokenKind::GtGtGt => TokenKind::GtGt,
            TokenKind::GtEq => TokenKind::Eq,
            TokenKind::GtGtEq => TokenKind::GtEq,
            _ => return Err(self.error(format!("Expected '>', found {:?}", self.current_token().kind))),
        };

        let index = self.current;
        self.split_tokens.push((index, self.tokens[index].clone()));
        let token = &mut self.tokens[index];
        token.kind = remainder;
        token.span.start += 1;
        token.value = token.value.chars().skip(1).collect();
        token.newline_before = false;
        Ok(())
    }
}
