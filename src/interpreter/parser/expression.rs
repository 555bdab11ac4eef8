use crate::{
    ast::{BinaryOperator, Expr, UnaryOperator},
    interpreter::{
        lexer::{SpannedToken, Token},
        parser::core::{ParseResult, Parser},
    },
};

impl Parser<'_> {
    /// Parses a full expression, starting at the lowest precedence level.
    ///
    /// Precedence, low to high: `||`, `&&`, `|`, `&`, comparisons, colon,
    /// additive, multiplicative, unary prefix, power (right-associative),
    /// postfix, primary. The short-circuit and element-wise logical
    /// operators occupy separate levels so `a | b && c` groups the way
    /// the language defines it.
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_short_or()
    }

    fn binary_loop(
        &mut self,
        ops: &[(Token, BinaryOperator)],
        next: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut left = next(self)?;
        'outer: loop {
            for (token, op) in ops {
                if self.check(token) {
                    let line = self.current_line();
                    self.pos += 1;
                    let right = next(self)?;
                    left = Expr::Binary {
                        op: *op,
                        left: Box::new(left),
                        right: Box::new(right),
                        line,
                    };
                    continue 'outer;
                }
            }
            break;
        }
        Ok(left)
    }

    fn parse_short_or(&mut self) -> ParseResult<Expr> {
        self.binary_loop(&[(Token::OrShort, BinaryOperator::OrOr)], Self::parse_short_and)
    }

    fn parse_short_and(&mut self) -> ParseResult<Expr> {
        self.binary_loop(&[(Token::AndShort, BinaryOperator::AndAnd)], Self::parse_elem_or)
    }

    fn parse_elem_or(&mut self) -> ParseResult<Expr> {
        self.binary_loop(&[(Token::Or, BinaryOperator::Or)], Self::parse_elem_and)
    }

    fn parse_elem_and(&mut self) -> ParseResult<Expr> {
        self.binary_loop(&[(Token::And, BinaryOperator::And)], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        self.binary_loop(
            &[
                (Token::Eq, BinaryOperator::Equal),
                (Token::Neq, BinaryOperator::NotEqual),
                (Token::Lt, BinaryOperator::Less),
                (Token::Gt, BinaryOperator::Greater),
                (Token::Leq, BinaryOperator::LessEqual),
                (Token::Geq, BinaryOperator::GreaterEqual),
            ],
            Self::parse_colon,
        )
    }

    /// Parses the colon level: `a:b` and `a:b:c`.
    fn parse_colon(&mut self) -> ParseResult<Expr> {
        let start = self.parse_additive()?;
        if !self.check(&Token::Colon) {
            return Ok(start);
        }
        let line = self.current_line();
        self.pos += 1;
        let second = self.parse_additive()?;
        if self.match_token(&Token::Colon) {
            let stop = self.parse_additive()?;
            return Ok(Expr::Range {
                start: Box::new(start),
                step: Some(Box::new(second)),
                stop: Box::new(stop),
                line,
            });
        }
        Ok(Expr::Range {
            start: Box::new(start),
            step: None,
            stop: Box::new(second),
            line,
        })
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        self.binary_loop(
            &[
                (Token::Plus, BinaryOperator::Add),
                (Token::Minus, BinaryOperator::Sub),
            ],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        self.binary_loop(
            &[
                (Token::Star, BinaryOperator::Mul),
                (Token::Slash, BinaryOperator::Div),
                (Token::Backslash, BinaryOperator::LeftDiv),
                (Token::DotStar, BinaryOperator::ElemMul),
                (Token::DotSlash, BinaryOperator::ElemDiv),
                (Token::DotBackslash, BinaryOperator::ElemLeftDiv),
            ],
            Self::parse_unary,
        )
    }

    /// Parses prefix operators. Unary minus binds tighter than power on
    /// its left but not on its right, so `-2^2` is `-(2^2)`; unary `+` is
    /// the identity and produces no node.
    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.check(&Token::Minus) {
            let line = self.current_line();
            self.pos += 1;
            let operand = self.parse_power()?;
            return Ok(Expr::Unary {
                op: UnaryOperator::Negate,
                operand: Box::new(operand),
                line,
            });
        }
        if self.check(&Token::Tilde) {
            let line = self.current_line();
            self.pos += 1;
            let operand = self.parse_power()?;
            return Ok(Expr::Unary {
                op: UnaryOperator::Not,
                operand: Box::new(operand),
                line,
            });
        }
        if self.check(&Token::Plus) {
            self.pos += 1;
            return self.parse_power();
        }
        self.parse_power()
    }

    /// Parses power, right-associative: `2^3^2` is `2^(3^2)`.
    fn parse_power(&mut self) -> ParseResult<Expr> {
        let left = self.parse_postfix()?;
        let op = match self.current().map(|t| &t.token) {
            Some(Token::Caret) => BinaryOperator::Pow,
            Some(Token::DotCaret) => BinaryOperator::ElemPow,
            _ => return Ok(left),
        };
        let line = self.current_line();
        self.pos += 1;
        let right = self.parse_unary()?;
        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            line,
        })
    }

    /// Parses postfix forms: calls/indexing `(...)`, cell indexing
    /// `{...}`, field access `.name`, and the two transposes.
    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut node = self.parse_primary()?;
        loop {
            match self.current().map(|t| &t.token) {
                Some(Token::LParen) => {
                    let line = self.current_line();
                    self.pos += 1;
                    let mut args = Vec::new();
                    if !self.check(&Token::RParen) {
                        args.push(self.parse_expression()?);
                        while self.match_token(&Token::Comma) {
                            args.push(self.parse_expression()?);
                        }
                    }
                    self.consume(&Token::RParen, "')'")?;
                    node = Expr::Call { target: Box::new(node), args, line };
                }
                Some(Token::LBrace) => {
                    let line = self.current_line();
                    self.pos += 1;
                    let mut indices = vec![self.parse_expression()?];
                    while self.match_token(&Token::Comma) {
                        indices.push(self.parse_expression()?);
                    }
                    self.consume(&Token::RBrace, "'}'")?;
                    node = Expr::CellIndex { target: Box::new(node), indices, line };
                }
                Some(Token::Dot)
                    if matches!(
                        self.peek_at(1).map(|t| &t.token),
                        Some(Token::Identifier(_))
                    ) =>
                {
                    let line = self.current_line();
                    self.pos += 1;
                    let field = self.consume_identifier("field name")?;
                    node = Expr::FieldAccess { target: Box::new(node), field, line };
                }
                Some(Token::Apostrophe) => {
                    let line = self.current_line();
                    self.pos += 1;
                    node = Expr::Unary {
                        op: UnaryOperator::Transpose,
                        operand: Box::new(node),
                        line,
                    };
                }
                Some(Token::DotApostrophe) => {
                    let line = self.current_line();
                    self.pos += 1;
                    node = Expr::Unary {
                        op: UnaryOperator::ElemTranspose,
                        operand: Box::new(node),
                        line,
                    };
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let line = self.current_line();
        match self.current().map(|t| t.token.clone()) {
            Some(Token::Number(lit)) => {
                self.pos += 1;
                Ok(if lit.imag {
                    Expr::ImagNumber { value: lit.value, line }
                } else {
                    Expr::Number { value: lit.value, line }
                })
            }
            Some(Token::Str(value)) => {
                self.pos += 1;
                Ok(Expr::Str { value, line })
            }
            Some(Token::True) => {
                self.pos += 1;
                Ok(Expr::Bool { value: true, line })
            }
            Some(Token::False) => {
                self.pos += 1;
                Ok(Expr::Bool { value: false, line })
            }
            Some(Token::End) => {
                self.pos += 1;
                Ok(Expr::End { line })
            }
            Some(Token::Identifier(name)) => {
                self.pos += 1;
                Ok(Expr::Identifier { name, line })
            }
            Some(Token::At) => self.parse_anon_func(),
            Some(Token::LParen) => {
                self.pos += 1;
                let expr = self.parse_expression()?;
                self.consume(&Token::RParen, "')'")?;
                Ok(expr)
            }
            Some(Token::LBracket) => self.parse_rows(&Token::RBracket, line),
            Some(Token::LBrace) => self.parse_rows(&Token::RBrace, line),
            Some(Token::Colon) => {
                self.pos += 1;
                Ok(Expr::Colon { line })
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Parses an `@` form: `@name` is a handle to an existing function,
    /// `@(params) expr` an anonymous function.
    fn parse_anon_func(&mut self) -> ParseResult<Expr> {
        let line = self.current_line();
        self.consume(&Token::At, "'@'")?;

        if let Some(SpannedToken { token: Token::Identifier(name), .. }) = self.current()
            && !self.peek_at(1).is_some_and(|t| t.token == Token::LParen)
        {
            let name = name.clone();
            self.pos += 1;
            return Ok(Expr::FuncHandle { name, line });
        }

        self.consume(&Token::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            params.push(self.consume_identifier("parameter name")?);
            while self.match_token(&Token::Comma) {
                params.push(self.consume_identifier("parameter name")?);
            }
        }
        self.consume(&Token::RParen, "')'")?;
        let body = self.parse_expression()?;
        Ok(Expr::AnonFunc { params, body: Box::new(body), line })
    }

    /// Parses the row structure shared by matrix and cell literals.
    ///
    /// Rows are separated by `;` (or a newline the lexer converted into
    /// one); elements within a row by commas, or by nothing when the
    /// lexer injected no comma and two expressions simply abut. Empty
    /// rows are dropped.
    fn parse_rows(&mut self, close: &Token, line: usize) -> ParseResult<Expr> {
        let is_cell = *close == Token::RBrace;
        self.pos += 1;

        let mut rows: Vec<Vec<Expr>> = Vec::new();
        if self.match_token(close) {
            return Ok(if is_cell {
                Expr::Cell { rows, line }
            } else {
                Expr::Matrix { rows, line }
            });
        }

        let mut row = vec![self.parse_expression()?];
        while !self.check(close) && !self.is_at_end() {
            if self.check(&Token::Semicolon) || self.check(&Token::NewLine) {
                rows.push(std::mem::take(&mut row));
                self.pos += 1;
                while self.check(&Token::NewLine) || self.check(&Token::Semicolon) {
                    self.pos += 1;
                }
                if self.check(close) {
                    break;
                }
            } else if self.check(&Token::Comma) {
                self.pos += 1;
            }
            if !self.check(close)
                && !self.check(&Token::Semicolon)
                && !self.check(&Token::NewLine)
            {
                row.push(self.parse_expression()?);
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }

        self.consume(close, if is_cell { "'}'" } else { "']'" })?;
        Ok(if is_cell {
            Expr::Cell { rows, line }
        } else {
            Expr::Matrix { rows, line }
        })
    }
}
