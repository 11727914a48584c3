//! Statement parsing

use super::*;

impl Parser {
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.current_token().span;

        let stmt = match self.current_token().kind {
            TokenKind::LBrace => Stmt::Block(self.parse_block_statement()?.value),
            TokenKind::If => self.parse_if_statement()?,
            TokenKind::For => self.parse_for_statement()?,
            TokenKind::While => self.parse_while_statement()?,
            TokenKind::Do => self.parse_do_while_statement()?,
            TokenKind::Switch => self.parse_switch_statement()?,
            TokenKind::Return => self.parse_return_statement()?,
            TokenKind::Break => {
                self.advance();
                Stmt::Break(self.parse_jump_label()?)
            }
            TokenKind::Continue => {
                self.advance();
                Stmt::Continue(self.parse_jump_label()?)
            }
            TokenKind::Throw => self.parse_throw_statement()?,
            TokenKind::Try => self.parse_try_statement()?,
            TokenKind::Debugger => {
                self.advance();
                self.consume_semicolon();
                Stmt::Debugger
            }
            TokenKind::Semicolon => {
                self.advance();
                Stmt::Empty
            }
            _ if self.is_declaration_start() => Stmt::Decl(Box::new(self.parse_declaration()?)),
            TokenKind::Const | TokenKind::Let | TokenKind::Var => {
                let var_decl = self.parse_var_declaration()?;
                Stmt::VarDecl(var_decl)
            }
            _ if self.is_identifier_token() && self.peek_kind(1) == Some(&TokenKind::Colon) => {
                self.parse_identifier()?;
                self.consume(TokenKind::Colon)?;
                self.parse_statement()?;
                Stmt::Unsupported("labeled statement")
            }
            _ => {
                let expr = self.parse_expression()?;
                self.consume_semicolon();
                Stmt::Expr(expr)
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(stmt, span))
    }

    pub(crate) fn parse_block_statement(&mut self) -> ParseResult<Node<BlockStmt>> {
        let start = self.current_token().span;
        self.consume(TokenKind::LBrace)?;

        let mut stmts = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_statement()?);
        }

        self.consume(TokenKind::RBrace)?;
        let span = start.merge(&self.previous_token().span);

        Ok(self.node(BlockStmt { stmts }, span))
    }

    pub(crate) fn parse_var_declaration(&mut self) -> ParseResult<VarDecl> {
        let decl = self.parse_var_declaration_list()?;
        self.consume_semicolon();
        Ok(decl)
    }

    /// `let a = 1, b` without the trailing semicolon.
    fn parse_var_declaration_list(&mut self) -> ParseResult<VarDecl> {
        let kind = match self.current_token().kind {
            TokenKind::Const => VarDeclKind::Const,
            TokenKind::Let => VarDeclKind::Let,
            TokenKind::Var => VarDeclKind::Var,
            _ => return Err(self.error("Expected var, let, or const".to_string())),
        };
        self.advance();

        let mut declarations = Vec::new();

        loop {
            let pattern = self.parse_pattern()?;
            let init = if self.check(&TokenKind::Eq) {
                self.advance();
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };

            declarations.push(VarDeclarator { pattern, init });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        Ok(VarDecl {
            kind,
            declarations,
            is_declare: false,
        })
    }

    fn parse_if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::If)?;
        self.consume(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RParen)?;

        let then_stmt = Box::new(self.parse_statement()?);

        let else_stmt = if self.check(&TokenKind::Else) {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_stmt,
            else_stmt,
        })
    }

    fn parse_for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::For)?;
        self.consume(TokenKind::LParen)?;

        let mark = self.mark();

        // for (const x of xs) / for (const k in obj)
        if matches!(
            self.current_token().kind,
            TokenKind::Const | TokenKind::Let | TokenKind::Var
        ) {
            let var_decl = self.parse_var_declaration_list()?;
            if let Some(stmt) = self.parse_for_in_of_rest(ForInLeft::VarDecl(var_decl.clone()))? {
                return Ok(stmt);
            }
            return self.parse_for_rest(Some(ForInit::VarDecl(var_decl)));
        }

        // for (x of xs) with an existing binding
        if !self.check(&TokenKind::Semicolon) {
            if let Ok(pattern) = self.parse_binding_target() {
                if let Some(stmt) = self.parse_for_in_of_rest(ForInLeft::Pattern(pattern))? {
                    return Ok(stmt);
                }
            }
            self.reset(mark);
        }

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(ForInit::Expr(self.parse_expression()?))
        };
        self.parse_for_rest(init)
    }

    /// Parses `in expr) body` or `of expr) body` if the head continues that way.
    fn parse_for_in_of_rest(&mut self, left: ForInLeft) -> ParseResult<Option<Stmt>> {
        let is_of = match self.current_token().kind {
            TokenKind::In => false,
            TokenKind::Of => true,
            _ => return Ok(None),
        };
        self.advance();

        let right = self.parse_assignment_expression()?;
        self.consume(TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);

        Ok(Some(if is_of {
            Stmt::ForOf { left, right, body }
        } else {
            Stmt::ForIn { left, right, body }
        }))
    }

    fn parse_for_rest(&mut self, init: Option<ForInit>) -> ParseResult<Stmt> {
        self.consume(TokenKind::Semicolon)?;

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.consume(TokenKind::Semicolon)?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.consume(TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::For {
            init,
            condition,
            update,
            body,
        })
    }

    fn parse_while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::While)?;
        self.consume(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn parse_do_while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Do)?;
        let body = Box::new(self.parse_statement()?);
        self.consume(TokenKind::While)?;
        self.consume(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RParen)?;
        self.consume_semicolon();

        Ok(Stmt::DoWhile { body, condition })
    }

    fn parse_switch_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Switch)?;
        self.consume(TokenKind::LParen)?;
        let discriminant = self.parse_expression()?;
        self.consume(TokenKind::RParen)?;

        self.consume(TokenKind::LBrace)?;
        let mut cases = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let test = if self.check(&TokenKind::Case) {
                self.advance();
                Some(self.parse_expression()?)
            } else if self.check(&TokenKind::Default) {
                self.advance();
                None
            } else {
                return Err(self.error("Expected case or default in switch statement".to_string()));
            };
            self.consume(TokenKind::Colon)?;

            let mut consequent = Vec::new();
            while !self.check(&TokenKind::Case)
                && !self.check(&TokenKind::Default)
                && !self.check(&TokenKind::RBrace)
                && !self.is_at_end()
            {
                consequent.push(self.parse_statement()?);
            }

            cases.push(SwitchCase { test, consequent });
        }

        self.consume(TokenKind::RBrace)?;

        Ok(Stmt::Switch {
            discriminant,
            cases,
        })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Return)?;

        let expr = if self.at_statement_end() {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.consume_semicolon();
        Ok(Stmt::Return(expr))
    }

    fn parse_jump_label(&mut self) -> ParseResult<Option<Node<Ident>>> {
        let label = if !self.at_statement_end() && self.is_identifier_token() {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        self.consume_semicolon();
        Ok(label)
    }

    fn parse_throw_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Throw)?;
        self.parse_expression()?;
        self.consume_semicolon();
        Ok(Stmt::Unsupported("throw statement"))
    }

    fn parse_try_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Try)?;
        self.parse_block_statement()?;

        let has_catch = self.check(&TokenKind::Catch);
        if has_catch {
            self.advance();
            if self.check(&TokenKind::LParen) {
                self.advance();
                self.parse_pattern()?;
                self.consume(TokenKind::RParen)?;
            }
            self.parse_block_statement()?;
        }

        let has_finally = self.check(&TokenKind::Finally);
        if has_finally {
            self.advance();
            self.parse_block_statement()?;
        }

        if !has_catch && !has_finally {
            return Err(self.error("Try statement must have catch or finally clause".to_string()));
        }

        Ok(Stmt::Unsupported("try statement"))
    }
}
