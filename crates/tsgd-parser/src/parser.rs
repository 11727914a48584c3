//! Core Parser struct and main parsing methods

use super::*;

/// Recursive descent parser for the TypeScript subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
    /// Next [`NodeId`] to hand out; ids are unique within one file.
    pub(crate) next_id: u32,
    /// Decorators seen before `export`/`class`, claimed by the class parser.
    pub(crate) pending_decorators: Vec<Node<Expr>>,
    /// Original tokens replaced while splitting `>>` in type argument lists.
    pub(crate) split_tokens: Vec<(usize, Token)>,
}

/// Saved parser position for speculative parsing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Mark {
    current: usize,
    next_id: u32,
    splits: usize,
}

impl Parser {
    /// Creates a new parser from a token stream
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_first_id(tokens, 0)
    }

    pub(crate) fn with_first_id(tokens: Vec<Token>, next_id: u32) -> Self {
        Self {
            tokens,
            current: 0,
            next_id,
            pending_decorators: Vec::new(),
            split_tokens: Vec::new(),
        }
    }

    pub(crate) fn mark(&self) -> Mark {
        Mark {
            current: self.current,
            next_id: self.next_id,
            splits: self.split_tokens.len(),
        }
    }

    /// Rewinds to `mark`, undoing any token splits made since.
    pub(crate) fn reset(&mut self, mark: Mark) {
        while self.split_tokens.len() > mark.splits {
            if let Some((index, token)) = self.split_tokens.pop() {
                self.tokens[index] = token;
            }
        }
        self.current = mark.current;
        self.next_id = mark.next_id;
    }

    /// Parses a complete program
    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let start_span = self.current_token().span;
        let mut items = Vec::new();
        let mut errors = Vec::new();

        while !self.is_at_end() {
            match self.parse_module_item() {
                Ok(item) => items.push(item),
                Err(err) => {
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        if let Some(error_token) = self.tokens.iter().find(|t| t.kind == TokenKind::Error) {
            let lexer_error = ParseError {
                message: error_token.value.clone(),
                span: error_token.span,
            };
            if !errors.contains(&lexer_error) {
                errors.insert(0, lexer_error);
            }
        }

        if errors.is_empty() {
            let end_span = items.last().map(|item| item.span).unwrap_or(start_span);
            Ok(Program {
                items,
                span: start_span.merge(&end_span),
            })
        } else {
            Err(errors)
        }
    }

    /// Wraps a value in a [`Node`] with a fresh id.
    pub(crate) fn node<T>(&mut self, value: T, span: Span) -> Node<T> {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        Node::with_id(id, value, span)
    }

    // =========================================================================
    // Module Items
    // =========================================================================

    pub(crate) fn parse_module_item(&mut self) -> ParseResult<Node<ModuleItem>> {
        let start = self.current_token().span;

        if self.check(&TokenKind::At) {
            let decorators = self.parse_decorators()?;
            self.pending_decorators.extend(decorators);
            if !self.check(&TokenKind::Export) && !self.check(&TokenKind::Class) && !self.check(&TokenKind::Abstract) {
                self.pending_decorators.clear();
                return Err(self.error("Decorators are only valid on classes".to_string()));
            }
        }

        let item = match self.current_token().kind {
            TokenKind::Import if self.peek_kind(1) != Some(&TokenKind::LParen) => {
                ModuleItem::Import(self.parse_import_decl()?)
            }
            TokenKind::Export => ModuleItem::Export(self.parse_export_decl()?),
            _ if self.is_declaration_start() => ModuleItem::Decl(self.parse_declaration()?),
            _ => ModuleItem::Stmt(self.parse_statement()?),
        };

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(item, span))
    }

    // =========================================================================
    // Import/Export
    // =========================================================================

    pub(crate) fn parse_import_decl(&mut self) -> ParseResult<ImportDecl> {
        self.consume(TokenKind::Import)?;

        let type_only = if self.check(&TokenKind::Type)
            && matches!(self.peek_kind(1), Some(TokenKind::LBrace) | Some(TokenKind::Star))
        {
            self.advance();
            true
        } else {
            false
        };

        let mut specifiers = Vec::new();

        // import "module"
        if self.check(&TokenKind::StringLiteral) {
            let source = self.advance().value.clone();
            self.consume_semicolon();
            return Ok(ImportDecl {
                specifiers,
                source,
                type_only,
            });
        }

        // import defaultName from "module"
        if self.is_identifier_token() {
            let name = self.parse_identifier()?;
            specifiers.push(ImportSpecifier::Default(name));

            if self.check(&TokenKind::Comma) {
                self.advance();
            }
        }

        // import * as name from "module"
        if self.check(&TokenKind::Star) {
            self.advance();
            self.consume(TokenKind::As)?;
            let name = self.parse_identifier()?;
            specifiers.push(ImportSpecifier::Namespace(name));
        }
        // import { a, b as c } from "module"
        else if self.check(&TokenKind::LBrace) {
            self.advance();

            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                let spec_type_only = if self.check(&TokenKind::Type) && self.peek_kind(1).map_or(false, |k| k.is_word()) {
                    self.advance();
                    true
                } else {
                    false
                };

                let imported = self.parse_identifier_name()?;
                let local = if self.check(&TokenKind::As) {
                    self.advance();
                    Some(self.parse_identifier()?)
                } else {
                    None
                };

                specifiers.push(ImportSpecifier::Named {
                    imported,
                    local,
                    type_only: spec_type_only,
                });

                if !self.check(&TokenKind::RBrace) {
                    self.consume(TokenKind::Comma)?;
                }
            }

            self.consume(TokenKind::RBrace)?;
        }

        self.consume(TokenKind::From)?;
        let source = self.consume(TokenKind::StringLiteral)?.value.clone();
        self.consume_semicolon();

        Ok(ImportDecl {
            specifiers,
            source,
            type_only,
        })
    }

    pub(crate) fn parse_export_decl(&mut self) -> ParseResult<ExportDecl> {
        self.consume(TokenKind::Export)?;

        if self.check(&TokenKind::At) {
            let decorators = self.parse_decorators()?;
            self.pending_decorators.extend(decorators);
        }

        // export type { ... }
        let type_only = if self.check(&TokenKind::Type) && self.peek_kind(1) == Some(&TokenKind::LBrace) {
            self.advance();
            true
        } else {
            false
        };

        // export default
        if self.check(&TokenKind::Default) {
            self.advance();

            if self.is_declaration_start() {
                let decl = self.parse_declaration()?;
                return Ok(ExportDecl::DefaultDecl(Box::new(decl)));
            }
            let expr = self.parse_expression()?;
            self.consume_semicolon();
            return Ok(ExportDecl::Default(expr));
        }

        // export * from "module"
        if self.check(&TokenKind::Star) {
            self.advance();

            let as_name = if self.check(&TokenKind::As) {
                self.advance();
                Some(self.parse_identifier()?)
            } else {
                None
            };

            self.consume(TokenKind::From)?;
            let source = self.consume(TokenKind::StringLiteral)?.value.clone();
            self.consume_semicolon();

            return Ok(ExportDecl::All { source, as_name });
        }

        // export { ... }
        if self.check(&TokenKind::LBrace) {
            self.advance();
            let mut specifiers = Vec::new();

            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                let local = self.parse_identifier_name()?;
                let exported = if self.check(&TokenKind::As) {
                    self.advance();
                    Some(self.parse_identifier_name()?)
                } else {
                    None
                };

                specifiers.push(ExportSpecifier {
                    local,
                    exported,
                    type_only,
                });

                if !self.check(&TokenKind::RBrace) {
                    self.consume(TokenKind::Comma)?;
                }
            }

            self.consume(TokenKind::RBrace)?;

            let source = if self.check(&TokenKind::From) {
                self.advance();
                Some(self.consume(TokenKind::StringLiteral)?.value.clone())
            } else {
                None
            };

            self.consume_semicolon();

            return Ok(ExportDecl::Named {
                specifiers,
                source,
                type_only,
            });
        }

        // export declaration
        let decl = self.parse_declaration()?;
        Ok(ExportDecl::Decl(Box::new(decl)))
    }
}
