use crate::{
    ast::Block,
    error::ParseError,
    interpreter::lexer::{SpannedToken, Token},
};

/// Result type used throughout the parser.
pub type ParseResult<T> = Result<T, ParseError>;

/// A recursive-descent parser over the token stream.
///
/// The parser owns a position into the token slice so that speculative
/// parses (multi-assignment lookahead) can rewind by restoring it. The
/// statement rules live in `statement.rs` and the expression precedence
/// ladder in `expression.rs`.
pub struct Parser<'t> {
    pub(super) tokens: &'t [SpannedToken],
    pub(super) pos: usize,
}

impl<'t> Parser<'t> {
    /// Creates a parser over a tokenized source.
    #[must_use]
    pub fn new(tokens: &'t [SpannedToken]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses the whole input into the root block.
    ///
    /// # Errors
    /// Returns a [`ParseError`] with the position of the offending token.
    pub fn parse(&mut self) -> ParseResult<Block> {
        let mut block = Block::default();
        self.skip_newlines();
        while !self.is_at_end() {
            block.stmts.push(self.parse_statement()?);
            self.skip_newlines();
        }
        Ok(block)
    }

    // ─── navigation ─────────────────────────────────────────────────

    pub(super) fn current(&self) -> Option<&'t SpannedToken> {
        self.tokens.get(self.pos)
    }

    pub(super) fn peek_at(&self, offset: usize) -> Option<&'t SpannedToken> {
        self.tokens.get(self.pos + offset)
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// The line of the current token, or of the last token at end of input.
    pub(super) fn current_line(&self) -> usize {
        self.current()
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn current_col(&self) -> usize {
        self.current()
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.col)
    }

    pub(super) fn check(&self, token: &Token) -> bool {
        self.current().is_some_and(|t| &t.token == token)
    }

    /// Consumes the current token when it equals `token`.
    pub(super) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            return true;
        }
        false
    }

    /// Consumes the current token, requiring it to equal `token`.
    pub(super) fn consume(&mut self, token: &Token, expected: &str) -> ParseResult<()> {
        if self.match_token(token) {
            return Ok(());
        }
        Err(self.unexpected(expected))
    }

    /// Consumes and returns an identifier name.
    pub(super) fn consume_identifier(&mut self, expected: &str) -> ParseResult<String> {
        if let Some(SpannedToken { token: Token::Identifier(name), .. }) = self.current() {
            self.pos += 1;
            return Ok(name.clone());
        }
        Err(self.unexpected(expected))
    }

    /// Builds the error for an unexpected token (or end of input) at the
    /// current position.
    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) => ParseError::UnexpectedToken {
                token: t.token.to_string(),
                expected: expected.to_string(),
                line: t.line,
                col: t.col,
            },
            None => ParseError::UnexpectedEndOfInput {
                expected: expected.to_string(),
                line: self.current_line(),
                col: self.current_col(),
            },
        }
    }

    // ─── separators ─────────────────────────────────────────────────

    /// Skips newline and semicolon tokens.
    pub(super) fn skip_newlines(&mut self) {
        while matches!(
            self.current().map(|t| &t.token),
            Some(Token::NewLine | Token::Semicolon)
        ) {
            self.pos += 1;
        }
    }

    /// Skips newline, semicolon, and comma tokens.
    pub(super) fn skip_terminators(&mut self) {
        while matches!(
            self.current().map(|t| &t.token),
            Some(Token::NewLine | Token::Semicolon | Token::Comma)
        ) {
            self.pos += 1;
        }
    }

    /// Consumes the statement separator, returning the suppress flag:
    /// `;` suppresses display, `,` and newline do not.
    pub(super) fn finish_statement(&mut self) -> bool {
        let suppress = self.match_token(&Token::Semicolon);
        if !suppress {
            self.match_token(&Token::Comma);
        }
        self.skip_newlines();
        suppress
    }

    /// Whether the current token is one of the block terminators.
    pub(super) fn at_terminator(&self, terminators: &[Token]) -> bool {
        self.current().is_some_and(|t| terminators.contains(&t.token))
    }

    /// Parses statements until one of `terminators` or end of input.
    pub(super) fn parse_block(&mut self, terminators: &[Token]) -> ParseResult<Block> {
        let mut block = Block::default();
        while !self.is_at_end() {
            if self.at_terminator(terminators) {
                break;
            }
            block.stmts.push(self.parse_statement()?);
            self.skip_newlines();
        }
        Ok(block)
    }
}
