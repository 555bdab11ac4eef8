use crate::{
    ast::{Expr, Stmt},
    interpreter::{
        lexer::{SpannedToken, Token},
        parser::core::{ParseResult, Parser},
    },
};

impl Parser<'_> {
    /// Parses a single statement.
    ///
    /// Control-flow keywords and declarations are dispatched directly;
    /// everything else is an expression statement, which covers plain
    /// expressions, assignments, deletions, and (after a speculative
    /// parse) multi-assignments.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();
        match self.current().map(|t| &t.token) {
            Some(Token::Function) => self.parse_function_def(),
            Some(Token::If) => self.parse_if(),
            Some(Token::For) => self.parse_for(),
            Some(Token::While) => self.parse_while(),
            Some(Token::Switch) => self.parse_switch(),
            Some(Token::Try) => self.parse_try_catch(),
            Some(Token::Global) => self.parse_declaration(true),
            Some(Token::Persistent) => self.parse_declaration(false),
            Some(Token::Break) => {
                self.pos += 1;
                self.skip_terminators();
                Ok(Stmt::Break { line })
            }
            Some(Token::Continue) => {
                self.pos += 1;
                self.skip_terminators();
                Ok(Stmt::Continue { line })
            }
            Some(Token::Return) => {
                // `return` takes no expression; it just leaves the function
                self.pos += 1;
                self.skip_terminators();
                Ok(Stmt::Return { line })
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// Parses an expression statement, which resolves into one of:
    /// a multi-assignment, an assignment, a deletion, or a plain
    /// expression.
    fn parse_expression_statement(&mut self) -> ParseResult<Stmt> {
        // Speculative multi-assignment: [a, ~, b] = call(...)
        if self.check(&Token::LBracket) {
            let save = self.pos;
            if let Some(stmt) = self.try_multi_assign()? {
                return Ok(stmt);
            }
            self.pos = save;
        }

        let line = self.current_line();
        let target = self.parse_expression()?;

        if self.match_token(&Token::Assign) {
            // Deletion: an indexed target assigned the empty matrix.
            if self.check(&Token::LBracket)
                && self.peek_at(1).is_some_and(|t| t.token == Token::RBracket)
                && matches!(target, Expr::Call { .. })
            {
                self.pos += 2;
                let suppress = self.finish_statement();
                return Ok(Stmt::DeleteAssign { target, suppress, line });
            }
            let value = self.parse_expression()?;
            let suppress = self.finish_statement();
            return Ok(Stmt::Assign { target, value, suppress, line });
        }

        let suppress = self.finish_statement();
        Ok(Stmt::Expr { expr: target, suppress, line })
    }

    /// Attempts to parse `[names] = expr` without committing.
    ///
    /// Returns `Ok(None)` when the bracketed prefix is not a list of
    /// identifiers and `~` placeholders followed by `]=`; the caller then
    /// rewinds and reparses as an expression. Once the `=` is consumed the
    /// branch is committed and right-hand-side failures are real errors.
    fn try_multi_assign(&mut self) -> ParseResult<Option<Stmt>> {
        if !self.match_token(&Token::LBracket) {
            return Ok(None);
        }

        let mut targets: Vec<Option<String>> = Vec::new();
        loop {
            match self.current() {
                Some(SpannedToken { token: Token::Identifier(name), .. }) => {
                    targets.push(Some(name.clone()));
                    self.pos += 1;
                }
                Some(SpannedToken { token: Token::Tilde, .. }) => {
                    targets.push(None);
                    self.pos += 1;
                }
                _ => return Ok(None),
            }
            if !self.match_token(&Token::Comma) {
                break;
            }
        }

        if !self.match_token(&Token::RBracket) {
            return Ok(None);
        }
        let line = self.current_line();
        if !self.match_token(&Token::Assign) {
            return Ok(None);
        }

        let call = self.parse_expression()?;
        let suppress = self.finish_statement();
        Ok(Some(Stmt::MultiAssign { targets, call, suppress, line }))
    }

    // ─── control flow ───────────────────────────────────────────────

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();
        self.consume(&Token::If, "'if'")?;

        let mut branches = Vec::new();
        let cond = self.parse_expression()?;
        self.skip_terminators();
        let body = self.parse_block(&[Token::Elseif, Token::Else, Token::End])?;
        branches.push((cond, body));

        while self.match_token(&Token::Elseif) {
            let cond = self.parse_expression()?;
            self.skip_terminators();
            let body = self.parse_block(&[Token::Elseif, Token::Else, Token::End])?;
            branches.push((cond, body));
        }

        let else_body = if self.match_token(&Token::Else) {
            self.skip_terminators();
            Some(self.parse_block(&[Token::End])?)
        } else {
            None
        };

        self.consume(&Token::End, "'end'")?;
        self.skip_terminators();
        Ok(Stmt::If { branches, else_body, line })
    }

    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();
        self.consume(&Token::For, "'for'")?;
        let var = self.consume_identifier("loop variable")?;
        self.consume(&Token::Assign, "'='")?;
        let target = self.parse_expression()?;
        self.skip_terminators();
        let body = self.parse_block(&[Token::End])?;
        self.consume(&Token::End, "'end'")?;
        self.skip_terminators();
        Ok(Stmt::For { var, target, body, line })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();
        self.consume(&Token::While, "'while'")?;
        let cond = self.parse_expression()?;
        self.skip_terminators();
        let body = self.parse_block(&[Token::End])?;
        self.consume(&Token::End, "'end'")?;
        self.skip_terminators();
        Ok(Stmt::While { cond, body, line })
    }

    fn parse_switch(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();
        self.consume(&Token::Switch, "'switch'")?;
        let selector = self.parse_expression()?;
        self.skip_terminators();

        let mut cases = Vec::new();
        while self.match_token(&Token::Case) {
            let case_expr = self.parse_expression()?;
            self.skip_terminators();
            let body = self.parse_block(&[Token::Case, Token::Otherwise, Token::End])?;
            cases.push((case_expr, body));
        }

        let otherwise = if self.match_token(&Token::Otherwise) {
            self.skip_terminators();
            Some(self.parse_block(&[Token::End])?)
        } else {
            None
        };

        self.consume(&Token::End, "'end'")?;
        self.skip_terminators();
        Ok(Stmt::Switch { selector, cases, otherwise, line })
    }

    fn parse_try_catch(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();
        self.consume(&Token::Try, "'try'")?;
        self.skip_terminators();
        let body = self.parse_block(&[Token::Catch, Token::End])?;

        let mut catch_var = None;
        let handler = if self.match_token(&Token::Catch) {
            if let Some(SpannedToken { token: Token::Identifier(name), .. }) = self.current() {
                catch_var = Some(name.clone());
                self.pos += 1;
            }
            self.skip_terminators();
            Some(self.parse_block(&[Token::End])?)
        } else {
            None
        };

        self.consume(&Token::End, "'end'")?;
        self.skip_terminators();
        Ok(Stmt::TryCatch { body, catch_var, handler, line })
    }

    fn parse_declaration(&mut self, global: bool) -> ParseResult<Stmt> {
        let line = self.current_line();
        self.pos += 1;
        let mut names = Vec::new();
        while let Some(SpannedToken { token: Token::Identifier(name), .. }) = self.current() {
            names.push(name.clone());
            self.pos += 1;
        }
        self.skip_terminators();
        Ok(if global {
            Stmt::Global { names, line }
        } else {
            Stmt::Persistent { names, line }
        })
    }

    // ─── function definitions ───────────────────────────────────────

    /// Whether the tokens after `function` carry an output signature
    /// (`name =` or `[name, ...] =`), checked without moving the cursor.
    fn probe_output_signature(&self) -> bool {
        if self.check(&Token::LBracket) {
            let mut probe = self.pos + 1;
            let mut depth = 1usize;
            while depth > 0 {
                match self.tokens.get(probe).map(|t| &t.token) {
                    Some(Token::LBracket) => depth += 1,
                    Some(Token::RBracket) => depth -= 1,
                    Some(_) => {}
                    None => return false,
                }
                probe += 1;
            }
            return self.tokens.get(probe).is_some_and(|t| t.token == Token::Assign);
        }
        matches!(
            self.current().map(|t| &t.token),
            Some(Token::Identifier(_))
        ) && self.peek_at(1).is_some_and(|t| t.token == Token::Assign)
    }

    /// Parses a function definition.
    ///
    /// Grammar: `function [outs =] name [(params)] body [end]` — the
    /// closing `end` is optional so a single-function file may omit it.
    fn parse_function_def(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();
        self.consume(&Token::Function, "'function'")?;

        let mut returns = Vec::new();
        if self.probe_output_signature() {
            if self.match_token(&Token::LBracket) {
                returns.push(self.consume_identifier("return variable")?);
                while self.match_token(&Token::Comma) {
                    returns.push(self.consume_identifier("return variable")?);
                }
                self.consume(&Token::RBracket, "']'")?;
            } else {
                returns.push(self.consume_identifier("return variable")?);
            }
            self.consume(&Token::Assign, "'='")?;
        }

        let name = self.consume_identifier("function name")?;

        let mut params = Vec::new();
        if self.match_token(&Token::LParen) {
            if !self.check(&Token::RParen) {
                params.push(self.consume_identifier("parameter name")?);
                while self.match_token(&Token::Comma) {
                    params.push(self.consume_identifier("parameter name")?);
                }
            }
            self.consume(&Token::RParen, "')'")?;
        }

        self.skip_terminators();
        let body = self.parse_block(&[Token::End])?;
        self.match_token(&Token::End);
        self.skip_terminators();

        Ok(Stmt::FunctionDef { name, params, returns, body, line })
    }
}
