//! Declaration parsing

use super::*;

impl Parser {
    pub(crate) fn parse_declaration(&mut self) -> ParseResult<Node<Decl>> {
        let start = self.current_token().span;

        let is_declare = if self.check(&TokenKind::Declare) {
            self.advance();
            true
        } else {
            false
        };

        let decl = match self.current_token().kind {
            TokenKind::Function | TokenKind::Async => Decl::Function(self.parse_function_declaration(is_declare)?),
            TokenKind::Class | TokenKind::Abstract => {
                let mut class_decl = self.parse_class_declaration(is_declare)?;
                class_decl.decorators = std::mem::take(&mut self.pending_decorators);
                Decl::Class(class_decl)
            }
            TokenKind::Interface => Decl::Interface(self.parse_interface_declaration(is_declare)?),
            TokenKind::Type => Decl::TypeAlias(self.parse_type_alias_declaration(is_declare)?),
            TokenKind::Enum => Decl::Enum(self.parse_enum_declaration(is_declare)?),
            TokenKind::Const if self.peek_kind(1) == Some(&TokenKind::Enum) => {
                Decl::Enum(self.parse_enum_declaration(is_declare)?)
            }
            TokenKind::Module | TokenKind::Namespace => Decl::Namespace(self.parse_namespace_declaration(is_declare)?),
            // declare global { ... }
            TokenKind::Identifier if is_declare && self.current_token().value == "global" => {
                Decl::Namespace(self.parse_namespace_declaration(is_declare)?)
            }
            TokenKind::Const | TokenKind::Let | TokenKind::Var => {
                let mut var_decl = self.parse_var_declaration()?;
                var_decl.is_declare = is_declare;
                Decl::Var(var_decl)
            }
            _ => {
                return Err(self.error(format!(
                    "Expected declaration, found {:?}",
                    self.current_token().kind
                )))
            }
        };

        if !self.pending_decorators.is_empty() {
            self.pending_decorators.clear();
            return Err(ParseError {
                message: "Decorators are only valid on classes".to_string(),
                span: start,
            });
        }

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(decl, span))
    }

    fn parse_function_declaration(&mut self, is_declare: bool) -> ParseResult<FunctionDecl> {
        let is_async = if self.check(&TokenKind::Async) {
            self.advance();
            true
        } else {
            false
        };

        self.consume(TokenKind::Function)?;

        let is_generator = if self.check(&TokenKind::Star) {
            self.advance();
            true
        } else {
            false
        };

        let name = self.parse_identifier()?;
        let type_params = self.parse_type_parameters()?;

        self.consume(TokenKind::LParen)?;
        let params = self.parse_function_params()?;
        self.consume(TokenKind::RParen)?;

        let return_type = self.parse_optional_return_type()?;

        let body = if is_declare || !self.check(&TokenKind::LBrace) {
            self.consume_semicolon();
            None
        } else {
            Some(self.parse_block_statement()?)
        };

        Ok(FunctionDecl {
            name,
            type_params,
            params,
            return_type,
            body,
            is_async,
            is_generator,
            is_declare,
        })
    }

    fn parse_class_declaration(&mut self, is_declare: bool) -> ParseResult<ClassDecl> {
        let is_abstract = if self.check(&TokenKind::Abstract) {
            self.advance();
            true
        } else {
            false
        };

        self.consume(TokenKind::Class)?;
        let name = self.parse_identifier()?;
        let type_params = self.parse_type_parameters()?;

        let extends = if self.check(&TokenKind::Extends) {
            self.advance();
            let start = self.current_token().span;
            let mut base = self.parse_primary_expression()?;
            while self.check(&TokenKind::Dot) {
                self.advance();
                let property = self.parse_identifier_name()?;
                let span = start.merge(&property.span);
                base = self.node(
                    Expr::Member {
                        object: Box::new(base),
                        property,
                    },
                    span,
                );
            }
            let type_args = self.parse_type_arguments()?;
            Some(ClassExtends {
                base: Box::new(base),
                type_args,
            })
        } else {
            None
        };

        let mut implements = Vec::new();
        if self.check(&TokenKind::Implements) {
            self.advance();
            loop {
                implements.push(self.parse_type()?);
                if !self.check(&TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }

        self.consume(TokenKind::LBrace)?;
        let mut members = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.check(&TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            members.push(self.parse_class_member()?);
        }

        self.consume(TokenKind::RBrace)?;

        Ok(ClassDecl {
            name,
            type_params,
            extends,
            implements,
            members,
            is_abstract,
            is_declare,
            decorators: Vec::new(),
        })
    }

    /// Whether the current word is a modifier rather than the member name,
    /// e.g. `static x` versus a method called `static()`.
    fn is_member_modifier(&self) -> bool {
        let is_modifier_word = matches!(
            self.current_token().kind,
            TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Static
                | TokenKind::Readonly
                | TokenKind::Abstract
                | TokenKind::Override
                | TokenKind::Declare
                | TokenKind::Async
        );
        is_modifier_word
            && !self.peek_is_newline(1)
            && self.peek_kind(1).map_or(false, |kind| {
                kind.is_word()
                    || matches!(
                        kind,
                        TokenKind::LBracket | TokenKind::StringLiteral | TokenKind::NumberLiteral | TokenKind::Star
                    )
            })
    }

    fn is_accessor_start(&self) -> bool {
        matches!(self.current_token().kind, TokenKind::Get | TokenKind::Set)
            && self.peek_kind(1).map_or(false, |kind| {
                kind.is_word() || matches!(kind, TokenKind::LBracket | TokenKind::StringLiteral)
            })
    }

    fn parse_class_member(&mut self) -> ParseResult<Node<ClassMember>> {
        let start = self.current_token().span;
        let decorators = self.parse_decorators()?;

        let mut access = AccessModifier::Public;
        let mut is_static = false;
        let mut is_readonly = false;
        let mut is_abstract = false;
        let mut is_async = false;

        while self.is_member_modifier() {
            match self.advance().kind {
                TokenKind::Public => access = AccessModifier::Public,
                TokenKind::Private => access = AccessModifier::Private,
                TokenKind::Protected => access = AccessModifier::Protected,
                TokenKind::Static => is_static = true,
                TokenKind::Readonly => is_readonly = true,
                TokenKind::Abstract => is_abstract = true,
                TokenKind::Async => is_async = true,
                _ => {}
            }
        }

        let member = self.parse_class_member_body(
            decorators,
            access,
            is_static,
            is_readonly,
            is_abstract,
            is_async,
        )?;

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(member, span))
    }

    fn parse_class_member_body(
        &mut self,
        decorators: Vec<Node<Expr>>,
        access: AccessModifier,
        is_static: bool,
        is_readonly: bool,
        is_abstract: bool,
        is_async: bool,
    ) -> ParseResult<ClassMember> {
        // Constructor
        if self.check(&TokenKind::Identifier)
            && self.current_token().value == "constructor"
            && self.peek_kind(1) == Some(&TokenKind::LParen)
        {
            self.advance();
            self.consume(TokenKind::LParen)?;
            let params = self.parse_function_params()?;
            self.consume(TokenKind::RParen)?;
            let body = self.parse_optional_body()?;

            return Ok(ClassMember::Constructor { params, body, access });
        }

        // Index signature
        if self.check(&TokenKind::LBracket) && self.peek_kind(2) == Some(&TokenKind::Colon) {
            self.advance();
            let key_name = self.parse_identifier()?;
            self.consume(TokenKind::Colon)?;
            let key_type = self.parse_type()?;
            self.consume(TokenKind::RBracket)?;
            self.consume(TokenKind::Colon)?;
            let value_type = self.parse_type()?;
            self.consume_semicolon();

            return Ok(ClassMember::IndexSignature {
                key_name,
                key_type,
                value_type,
            });
        }

        // Getter or setter
        if self.is_accessor_start() {
            let is_setter = self.advance().kind == TokenKind::Set;
            let name = self.parse_property_name()?;
            self.consume(TokenKind::LParen)?;

            let value_type = if is_setter {
                let param = self.parse_function_param()?;
                self.consume(TokenKind::RParen)?;
                self.parse_optional_return_type()?;
                param.type_annotation
            } else {
                self.consume(TokenKind::RParen)?;
                self.parse_optional_return_type()?
            };
            self.parse_optional_body()?;
            return Ok(ClassMember::Accessor {
                name,
                is_setter,
                value_type,
            });
        }

        let is_generator = if self.check(&TokenKind::Star) {
            self.advance();
            true
        } else {
            false
        };

        let name = self.parse_property_name()?;

        let is_optional = if self.check(&TokenKind::Question) {
            self.advance();
            true
        } else {
            false
        };

        let is_definite = if self.check(&TokenKind::Bang) {
            self.advance();
            true
        } else {
            false
        };

        // Method
        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            self.parse_type_parameters()?;
            self.consume(TokenKind::LParen)?;
            let params = self.parse_function_params()?;
            self.consume(TokenKind::RParen)?;
            let return_type = self.parse_optional_return_type()?;
            let body = self.parse_optional_body()?;

            return Ok(ClassMember::Method {
                name,
                params,
                return_type,
                body,
                access,
                is_static,
                is_async,
                is_abstract,
                is_generator,
                decorators,
            });
        }

        // Property
        let type_annotation = if self.check(&TokenKind::Colon) {
            self.advance();
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };

        let init = if self.check(&TokenKind::Eq) {
            self.advance();
            Some(self.parse_assignment_expression()?)
        } else {
            None
        };

        if !self.check(&TokenKind::Semicolon) && !self.check(&TokenKind::RBrace) && !self.current_token().newline_before {
            return Err(self.error(format!(
                "Expected ';' after class property, found {:?}",
                self.current_token().kind
            )));
        }
        self.consume_semicolon();

        Ok(ClassMember::Property {
            name,
            type_annotation,
            init,
            access,
            is_static,
            is_readonly,
            is_optional,
            is_definite,
            decorators,
        })
    }

    /// Block body, or `;` for overloads and abstract members.
    fn parse_optional_body(&mut self) -> ParseResult<Option<Node<BlockStmt>>> {
        if self.check(&TokenKind::LBrace) {
            Ok(Some(self.parse_block_statement()?))
        } else {
            self.consume_semicolon();
            Ok(None)
        }
    }

    fn parse_interface_declaration(&mut self, is_declare: bool) -> ParseResult<InterfaceDecl> {
        self.consume(TokenKind::Interface)?;
        let name = self.parse_identifier()?;
        let type_params = self.parse_type_parameters()?;

        let mut extends = Vec::new();
        if self.check(&TokenKind::Extends) {
            self.advance();
            loop {
                extends.push(self.parse_type()?);
                if !self.check(&TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }

        self.consume(TokenKind::LBrace)?;
        let members = self.parse_object_type_members()?;
        self.consume(TokenKind::RBrace)?;

        Ok(InterfaceDecl {
            name,
            type_params,
            extends,
            members,
            is_declare,
        })
    }

    fn parse_type_alias_declaration(&mut self, is_declare: bool) -> ParseResult<TypeAliasDecl> {
        self.consume(TokenKind::Type)?;
        let name = self.parse_identifier()?;
        let type_params = self.parse_type_parameters()?;
        self.consume(TokenKind::Eq)?;
        let ty = self.parse_type()?;
        self.consume_semicolon();

        Ok(TypeAliasDecl {
            name,
            type_params,
            ty,
            is_declare,
        })
    }

    fn parse_enum_declaration(&mut self, is_declare: bool) -> ParseResult<EnumDecl> {
        let is_const = if self.check(&TokenKind::Const) {
            self.advance();
            true
        } else {
            false
        };

        self.consume(TokenKind::Enum)?;
        let name = self.parse_identifier()?;
        self.consume(TokenKind::LBrace)?;

        let mut members = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let member_name = if self.check(&TokenKind::StringLiteral) {
                let token = self.advance().clone();
                self.node(Ident::new(token.value), token.span)
            } else {
                self.parse_identifier_name()?
            };

            let init = if self.check(&TokenKind::Eq) {
                self.advance();
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };

            members.push(EnumMember {
                name: member_name,
                init,
            });

            if !self.check(&TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RBrace)?;

        Ok(EnumDecl {
            name,
            members,
            is_const,
            is_declare,
        })
    }

    fn parse_namespace_declaration(&mut self, is_declare: bool) -> ParseResult<NamespaceDecl> {
        // `namespace`, `module`, or `global`
        if matches!(self.current_token().kind, TokenKind::Namespace | TokenKind::Module) {
            self.advance();
        }

        let mut name = if self.check(&TokenKind::StringLiteral) {
            self.advance().value.clone()
        } else {
            self.parse_identifier()?.value.name
        };
        while self.check(&TokenKind::Dot) {
            self.advance();
            name.push('.');
            name.push_str(&self.parse_identifier()?.value.name);
        }

        if self.check(&TokenKind::LBrace) {
            self.advance();
            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                self.parse_module_item()?;
            }
            self.consume(TokenKind::RBrace)?;
        } else {
            // declare module "foo";
            self.consume_semicolon();
        }

        Ok(NamespaceDecl { name, is_declare })
    }
}
