use logos::{FilterResult, Logos};

use crate::error::LexError;

/// The payload of a numeric literal token.
///
/// Hex, binary, exponent, and underscore grouping are resolved during
/// lexing, so the parser only sees the numeric value and whether the
/// literal carried an `i`/`j` imaginary suffix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumLit {
    /// The numeric value of the literal.
    pub value: f64,
    /// Whether the literal had an imaginary suffix.
    pub imag: bool,
}

/// Errors produced inside logos callbacks, before positions are known.
///
/// The [`tokenize`] wrapper attaches line/column information and converts
/// these into [`LexError`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawLexError {
    /// A character that starts no token (also reported for an unterminated
    /// double-quoted string, whose opening quote matches no rule).
    #[default]
    UnexpectedCharacter,
    /// A numeric literal that violates the literal grammar.
    MalformedNumber(String),
    /// A `%{` block comment with no line-anchored `%}` closer.
    UnterminatedBlockComment,
}

/// Represents a lexical token of the matrix language.
///
/// Plain operators, keywords, and brackets are ordinary logos rules.
/// The context-free part of the harder literals lives in callbacks:
/// numeric literals are scanned manually from a one-character trigger,
/// double-quoted strings decode their escapes, and `%` comments detect
/// line-anchored `%{ ... %}` blocks. Everything that depends on the
/// *emitted* token stream — transpose-vs-string quotes, implicit commas,
/// newline row separators, bracket balancing — is handled by [`tokenize`].
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = RawLexError)]
pub enum Token {
    /// Numeric literal: decimal, hex `0x…`, binary `0b…`, with optional
    /// exponent, `_` digit grouping, and `i`/`j` imaginary suffix.
    #[regex(r"[0-9]", lex_number)]
    #[regex(r"\.[0-9]", lex_number)]
    Number(NumLit),
    /// String literal. Double-quoted strings are matched here; single-quoted
    /// strings are produced by the wrapper when a `'` is not a transpose.
    #[regex(r#""([^"\\\n]|\\[^\n]|"")*""#, lex_double_quoted)]
    Str(String),
    /// Identifier: variable or function names such as `x` or `numel`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    /// `if`
    #[token("if")]
    If,
    /// `elseif`
    #[token("elseif")]
    Elseif,
    /// `else`
    #[token("else")]
    Else,
    /// `end` — closes a block, or means "dimension length" inside an index.
    #[token("end")]
    End,
    /// `for`
    #[token("for")]
    For,
    /// `while`
    #[token("while")]
    While,
    /// `break`
    #[token("break")]
    Break,
    /// `continue`
    #[token("continue")]
    Continue,
    /// `return`
    #[token("return")]
    Return,
    /// `function`
    #[token("function")]
    Function,
    /// `true`
    #[token("true")]
    True,
    /// `false`
    #[token("false")]
    False,
    /// `switch`
    #[token("switch")]
    Switch,
    /// `case`
    #[token("case")]
    Case,
    /// `otherwise`
    #[token("otherwise")]
    Otherwise,
    /// `try`
    #[token("try")]
    Try,
    /// `catch`
    #[token("catch")]
    Catch,
    /// `global`
    #[token("global")]
    Global,
    /// `persistent`
    #[token("persistent")]
    Persistent,

    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `\`
    #[token("\\")]
    Backslash,
    /// `.*`
    #[token(".*")]
    DotStar,
    /// `./`
    #[token("./")]
    DotSlash,
    /// `.\`
    #[token(".\\")]
    DotBackslash,
    /// `^`
    #[token("^")]
    Caret,
    /// `.^`
    #[token(".^")]
    DotCaret,
    /// `'` — transpose, or the opening quote of a string; the wrapper decides.
    #[token("'")]
    Apostrophe,
    /// `.'`
    #[token(".'")]
    DotApostrophe,
    /// `==`
    #[token("==")]
    Eq,
    /// `~=`
    #[token("~=")]
    Neq,
    /// `<`
    #[token("<")]
    Lt,
    /// `>`
    #[token(">")]
    Gt,
    /// `<=`
    #[token("<=")]
    Leq,
    /// `>=`
    #[token(">=")]
    Geq,
    /// `&`
    #[token("&")]
    And,
    /// `|`
    #[token("|")]
    Or,
    /// `&&`
    #[token("&&")]
    AndShort,
    /// `||`
    #[token("||")]
    OrShort,
    /// `~` — logical not, or a discard placeholder in a multi-assignment.
    #[token("~")]
    Tilde,
    /// `=`
    #[token("=")]
    Assign,
    /// `@`
    #[token("@")]
    At,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `:`
    #[token(":")]
    Colon,
    /// `.`
    #[token(".")]
    Dot,
    /// Newline. The wrapper keeps it at statement level, converts it into a
    /// row separator inside `[`/`{`, and drops it inside `(`.
    #[token("\n")]
    NewLine,

    /// `% …` line comments and line-anchored `%{ … %}` block comments.
    #[regex(r"%[^\n]*", lex_comment)]
    Comment,
    /// Line continuation: `...`, the rest of the line, and the newline.
    #[regex(r"\.\.\.[^\n]*\n?", logos::skip)]
    Continuation,
    /// Blanks, tabs, carriage returns, and form feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
}

impl Token {
    /// Whether this token can end a value, making a following `'` a
    /// transpose rather than a string.
    fn is_value(&self) -> bool {
        matches!(
            self,
            Self::Number(_)
                | Self::Str(_)
                | Self::Identifier(_)
                | Self::RParen
                | Self::RBracket
                | Self::RBrace
                | Self::Apostrophe
                | Self::DotApostrophe
                | Self::End
                | Self::True
                | Self::False
        )
    }

    /// Whether this token can start a matrix element, for implicit comma
    /// injection. Mirrors the character classes of the whitespace rule:
    /// identifiers and keywords, literals, opening brackets, `~`, `@`, and
    /// a quote; `+`/`-` are excluded so `[1 + 2]` stays a single element.
    fn starts_value(&self) -> bool {
        matches!(
            self,
            Self::Number(_)
                | Self::Str(_)
                | Self::Identifier(_)
                | Self::LParen
                | Self::LBracket
                | Self::LBrace
                | Self::Tilde
                | Self::At
                | Self::Apostrophe
                | Self::If
                | Self::Elseif
                | Self::Else
                | Self::End
                | Self::For
                | Self::While
                | Self::Break
                | Self::Continue
                | Self::Return
                | Self::Function
                | Self::True
                | Self::False
                | Self::Switch
                | Self::Case
                | Self::Otherwise
                | Self::Try
                | Self::Catch
                | Self::Global
                | Self::Persistent
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}{}", n.value, if n.imag { "i" } else { "" }),
            Self::Str(s) => write!(f, "'{s}'"),
            Self::Identifier(name) => write!(f, "{name}"),
            Self::If => write!(f, "if"),
            Self::Elseif => write!(f, "elseif"),
            Self::Else => write!(f, "else"),
            Self::End => write!(f, "end"),
            Self::For => write!(f, "for"),
            Self::While => write!(f, "while"),
            Self::Break => write!(f, "break"),
            Self::Continue => write!(f, "continue"),
            Self::Return => write!(f, "return"),
            Self::Function => write!(f, "function"),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Switch => write!(f, "switch"),
            Self::Case => write!(f, "case"),
            Self::Otherwise => write!(f, "otherwise"),
            Self::Try => write!(f, "try"),
            Self::Catch => write!(f, "catch"),
            Self::Global => write!(f, "global"),
            Self::Persistent => write!(f, "persistent"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Backslash => write!(f, "\\"),
            Self::DotStar => write!(f, ".*"),
            Self::DotSlash => write!(f, "./"),
            Self::DotBackslash => write!(f, ".\\"),
            Self::Caret => write!(f, "^"),
            Self::DotCaret => write!(f, ".^"),
            Self::Apostrophe => write!(f, "'"),
            Self::DotApostrophe => write!(f, ".'"),
            Self::Eq => write!(f, "=="),
            Self::Neq => write!(f, "~="),
            Self::Lt => write!(f, "<"),
            Self::Gt => write!(f, ">"),
            Self::Leq => write!(f, "<="),
            Self::Geq => write!(f, ">="),
            Self::And => write!(f, "&"),
            Self::Or => write!(f, "|"),
            Self::AndShort => write!(f, "&&"),
            Self::OrShort => write!(f, "||"),
            Self::Tilde => write!(f, "~"),
            Self::Assign => write!(f, "="),
            Self::At => write!(f, "@"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBracket => write!(f, "["),
            Self::RBracket => write!(f, "]"),
            Self::LBrace => write!(f, "{{"),
            Self::RBrace => write!(f, "}}"),
            Self::Comma => write!(f, ","),
            Self::Semicolon => write!(f, ";"),
            Self::Colon => write!(f, ":"),
            Self::Dot => write!(f, "."),
            Self::NewLine => write!(f, "newline"),
            Self::Comment | Self::Continuation | Self::Ignored => Ok(()),
        }
    }
}

/// A token together with the source position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token.
    pub token: Token,
    /// 1-based source line.
    pub line: usize,
    /// 1-based source column.
    pub col: usize,
}

// ─── number literal callback ────────────────────────────────────────────

fn malformed(details: &str) -> RawLexError {
    RawLexError::MalformedNumber(details.to_string())
}

/// Rejects `_` at the start or end of a digit group, and `__` inside one.
fn validate_underscores(group: &[u8]) -> Result<(), RawLexError> {
    if group.first() == Some(&b'_') {
        return Err(malformed("Number literal cannot start digit group with underscore"));
    }
    if group.last() == Some(&b'_') {
        return Err(malformed("Number literal cannot end with underscore"));
    }
    if group.windows(2).any(|w| w == b"__") {
        return Err(malformed("Number literal cannot have consecutive underscores"));
    }
    Ok(())
}

/// Scans a numeric literal from the trigger character onward.
///
/// The trigger pattern consumes a single digit (or a dot followed by a
/// digit); this callback re-scans from the literal's first character and
/// bumps the lexer over everything it consumes. The grammar:
///
/// - hex `0x…` / binary `0b…` with `_` grouping,
/// - decimal with optional fraction and `[eE][+-]?digits` exponent, where
///   a dot directly before an operator suffix (`.*`, `./`, `.^`, `.'`,
///   `.\`) or a field-access letter is not consumed,
/// - an `i`/`j` imaginary suffix when the next character is not
///   alphanumeric or `_`.
fn lex_number(lex: &mut logos::Lexer<Token>) -> Result<NumLit, RawLexError> {
    let src = lex.source();
    let b = src.as_bytes();
    let n = b.len();
    let start = lex.span().start;
    let mut pos = start;

    let peek = |p: usize| -> u8 {
        if p < n { b[p] } else { 0 }
    };
    let imag_suffix = |p: usize| -> bool {
        matches!(peek(p), b'i' | b'j') && !peek(p + 1).is_ascii_alphanumeric() && peek(p + 1) != b'_'
    };

    // Hex: 0x…
    if peek(pos) == b'0' && matches!(peek(pos + 1), b'x' | b'X') {
        pos += 2;
        if !peek(pos).is_ascii_hexdigit() {
            return Err(malformed("Invalid hex literal"));
        }
        let digit_start = pos;
        while peek(pos).is_ascii_hexdigit() || peek(pos) == b'_' {
            pos += 1;
        }
        validate_underscores(&b[digit_start..pos])?;
        let digits: String = src[digit_start..pos].chars().filter(|&c| c != '_').collect();
        let value = u64::from_str_radix(&digits, 16)
            .map_err(|_| malformed("Hex literal is too large"))? as f64;
        let imag = imag_suffix(pos);
        if imag {
            pos += 1;
        }
        lex.bump(pos - lex.span().end);
        return Ok(NumLit { value, imag });
    }

    // Binary: 0b…
    if peek(pos) == b'0' && matches!(peek(pos + 1), b'b' | b'B') {
        pos += 2;
        if !matches!(peek(pos), b'0' | b'1') {
            return Err(malformed("Invalid binary literal"));
        }
        let digit_start = pos;
        while matches!(peek(pos), b'0' | b'1' | b'_') {
            pos += 1;
        }
        validate_underscores(&b[digit_start..pos])?;
        let digits: String = src[digit_start..pos].chars().filter(|&c| c != '_').collect();
        let value = u64::from_str_radix(&digits, 2)
            .map_err(|_| malformed("Binary literal is too large"))? as f64;
        let imag = imag_suffix(pos);
        if imag {
            pos += 1;
        }
        lex.bump(pos - lex.span().end);
        return Ok(NumLit { value, imag });
    }

    // Decimal: integer part (may be empty when the literal starts with '.').
    let mut has_digits = false;
    let int_start = pos;
    while peek(pos).is_ascii_digit() || peek(pos) == b'_' {
        if peek(pos) != b'_' {
            has_digits = true;
        }
        pos += 1;
    }
    if pos > int_start {
        validate_underscores(&b[int_start..pos])?;
    }

    // Fractional part. The dot stays unconsumed before an operator suffix
    // or a field access, so `1.*x` and `s.field` lex as expected.
    if peek(pos) == b'.' {
        let next = peek(pos + 1);
        let is_dot_operator = matches!(next, b'*' | b'/' | b'^' | b'\'' | b'\\' | b'.');
        let is_field_access = (next.is_ascii_alphabetic() && next != b'e' && next != b'E')
            || next == b'('
            || next == b'[';
        if !is_dot_operator && !is_field_access {
            pos += 1;
            let frac_start = pos;
            while peek(pos).is_ascii_digit() || peek(pos) == b'_' {
                if peek(pos) != b'_' {
                    has_digits = true;
                }
                pos += 1;
            }
            if pos > frac_start {
                validate_underscores(&b[frac_start..pos])?;
            }
        }
    }

    if !has_digits {
        return Err(malformed("Invalid number literal"));
    }

    // Exponent.
    if matches!(peek(pos), b'e' | b'E') {
        pos += 1;
        if matches!(peek(pos), b'+' | b'-') {
            pos += 1;
        }
        if !peek(pos).is_ascii_digit() {
            return Err(malformed("Invalid number exponent"));
        }
        let exp_start = pos;
        while peek(pos).is_ascii_digit() || peek(pos) == b'_' {
            pos += 1;
        }
        validate_underscores(&b[exp_start..pos])?;
    }

    let imag = imag_suffix(pos);
    let mut text: String = src[start..pos].chars().filter(|&c| c != '_').collect();
    if imag {
        pos += 1;
    }
    // normalise `5.` and `1.e3` spellings for the float parser
    if text.ends_with('.') {
        text.pop();
    }
    let text = text.replace(".e", "e").replace(".E", "E");
    let value: f64 = text.parse().map_err(|_| malformed("Invalid number literal"))?;
    lex.bump(pos - lex.span().end);
    Ok(NumLit { value, imag })
}

// ─── double-quoted string callback ──────────────────────────────────────

/// Decodes the body of a matched double-quoted string.
///
/// `""` is an escaped quote; `\n \t \r \\ \"` are recognised; any other
/// backslash escape is preserved literally.
fn lex_double_quoted(lex: &logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                // the pattern guarantees this is the first of an escaped pair
                chars.next();
                out.push('"');
            }
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    out
}

// ─── comment callback ───────────────────────────────────────────────────

/// Whether the current match begins a line whose prefix is only whitespace.
fn at_line_start(lex: &logos::Lexer<Token>) -> bool {
    lex.source()[..lex.span().start]
        .chars()
        .rev()
        .take_while(|&c| c != '\n')
        .all(|c| c == ' ' || c == '\t')
}

/// Handles `%` comments.
///
/// A plain `%` comment is already fully matched and is skipped. A `%{` on
/// a line of its own opens a block comment: the callback consumes whole
/// lines until a line-anchored `%}` at the matching nesting depth, leaving
/// the final newline for the ordinary newline rule.
fn lex_comment(lex: &mut logos::Lexer<Token>) -> FilterResult<(), RawLexError> {
    if !lex.slice().starts_with("%{") || !at_line_start(lex) {
        return FilterResult::Skip;
    }

    let rem = lex.remainder();
    let mut pos = 0;
    let mut depth = 1usize;
    while depth > 0 {
        if pos >= rem.len() {
            return FilterResult::Error(RawLexError::UnterminatedBlockComment);
        }
        // step over the newline that ended the previous line
        pos += 1;
        let line_end = rem[pos..].find('\n').map_or(rem.len(), |i| pos + i);
        let line = rem[pos..line_end].trim_start_matches(|c| c == ' ' || c == '\t');
        if line.starts_with("%}") {
            depth -= 1;
        } else if line.starts_with("%{") {
            depth += 1;
        }
        pos = line_end;
    }
    lex.bump(pos);
    FilterResult::Skip
}

// ─── the context-sensitive wrapper ──────────────────────────────────────

/// Incremental byte-offset to line/column translation.
///
/// Token spans arrive in nondecreasing order, so each lookup only walks
/// the characters since the previous one.
struct PositionTracker<'s> {
    src: &'s str,
    offset: usize,
    line: usize,
    col: usize,
}

impl<'s> PositionTracker<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, offset: 0, line: 1, col: 1 }
    }

    fn locate(&mut self, target: usize) -> (usize, usize) {
        for c in self.src[self.offset..target].chars() {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.offset = target;
        (self.line, self.col)
    }
}

fn closing_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn in_matrix_context(brackets: &[(char, usize, usize)]) -> bool {
    brackets.last().is_some_and(|&(c, ..)| c == '[' || c == '{')
}

fn pop_bracket(
    brackets: &mut Vec<(char, usize, usize)>,
    found: char,
    line: usize,
    col: usize,
) -> Result<(), LexError> {
    match brackets.pop() {
        None => Err(LexError::MismatchedBracket { expected: None, found, line, col }),
        Some((open, ..)) if closing_for(open) != found => Err(LexError::MismatchedBracket {
            expected: Some(closing_for(open)),
            found,
            line,
            col,
        }),
        Some(_) => Ok(()),
    }
}

/// Scans a single-quoted string from the lexer's remainder.
///
/// Called by the wrapper after deciding that a `'` opens a string. `''`
/// is an escaped quote; a bare newline or end of input is an error. The
/// consumed bytes are bumped so the logos lexer resumes after the string.
fn read_single_quoted(
    lexer: &mut logos::Lexer<Token>,
    line: usize,
    col: usize,
) -> Result<String, LexError> {
    let rem = lexer.remainder();
    let mut out = String::new();
    let mut iter = rem.char_indices().peekable();
    while let Some((i, c)) = iter.next() {
        match c {
            '\'' => {
                if let Some(&(_, '\'')) = iter.peek() {
                    iter.next();
                    out.push('\'');
                } else {
                    lexer.bump(i + 1);
                    return Ok(out);
                }
            }
            '\n' => break,
            other => out.push(other),
        }
    }
    Err(LexError::UnterminatedString { line, col })
}

fn raw_to_lex_error(
    raw: &RawLexError,
    source: &str,
    span_start: usize,
    line: usize,
    col: usize,
) -> LexError {
    match raw {
        RawLexError::UnexpectedCharacter => {
            let character = source[span_start..].chars().next().unwrap_or('\0');
            if character == '"' {
                LexError::UnterminatedString { line, col }
            } else {
                LexError::UnexpectedCharacter { character, line, col }
            }
        }
        RawLexError::MalformedNumber(details) => {
            LexError::MalformedNumber { details: details.clone(), line, col }
        }
        RawLexError::UnterminatedBlockComment => LexError::UnterminatedBlockComment { line, col },
    }
}

/// Tokenizes a source string.
///
/// Drives the logos lexer and applies every context-sensitive rule of the
/// language:
///
/// - tracks a stack of open brackets, rejecting mismatched or unclosed
///   ones;
/// - inside `[` or `{`, injects an implicit comma when whitespace
///   separates two value tokens, except before `+`/`-` (which stay
///   binary) and before dot-operators;
/// - inside `[` or `{`, converts a newline after a value token into a row
///   separator; inside `(`, drops newlines;
/// - decides whether `'` is a transpose (the previous emitted token is a
///   value token) or opens a single-quoted string, and scans the string
///   in the latter case;
/// - assigns each token a 1-based line and column.
///
/// # Errors
/// Returns a [`LexError`] with the position of the offending character for
/// malformed literals, unterminated strings or block comments, unexpected
/// characters, and bracket mismatches.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexError> {
    let mut lexer = Token::lexer(source);
    let mut tokens: Vec<SpannedToken> = Vec::new();
    let mut brackets: Vec<(char, usize, usize)> = Vec::new();
    let mut positions = PositionTracker::new(source);
    let mut prev_end = 0usize;

    while let Some(result) = lexer.next() {
        let span_start = lexer.span().start;
        let (line, col) = positions.locate(span_start);
        let token = match result {
            Ok(t) => t,
            Err(raw) => return Err(raw_to_lex_error(&raw, source, span_start, line, col)),
        };

        // Implicit comma between whitespace-separated values inside [ ] / { }.
        let gap = span_start > prev_end;
        if gap
            && in_matrix_context(&brackets)
            && tokens.last().is_some_and(|t| t.token.is_value())
            && !matches!(token, Token::Plus | Token::Minus)
            && token.starts_value()
        {
            tokens.push(SpannedToken { token: Token::Comma, line, col });
        }

        match token {
            Token::NewLine => {
                if brackets.is_empty() {
                    tokens.push(SpannedToken { token: Token::NewLine, line, col });
                } else if in_matrix_context(&brackets)
                    && tokens.last().is_some_and(|t| t.token.is_value())
                {
                    // newline as a row separator
                    tokens.push(SpannedToken { token: Token::Semicolon, line, col });
                }
                // newlines inside ( ) are dropped
            }
            Token::Apostrophe => {
                if tokens.last().is_some_and(|t| t.token.is_value()) {
                    tokens.push(SpannedToken { token: Token::Apostrophe, line, col });
                } else {
                    let value = read_single_quoted(&mut lexer, line, col)?;
                    tokens.push(SpannedToken { token: Token::Str(value), line, col });
                }
            }
            Token::LParen => {
                brackets.push(('(', line, col));
                tokens.push(SpannedToken { token: Token::LParen, line, col });
            }
            Token::LBracket => {
                brackets.push(('[', line, col));
                tokens.push(SpannedToken { token: Token::LBracket, line, col });
            }
            Token::LBrace => {
                brackets.push(('{', line, col));
                tokens.push(SpannedToken { token: Token::LBrace, line, col });
            }
            Token::RParen => {
                pop_bracket(&mut brackets, ')', line, col)?;
                tokens.push(SpannedToken { token: Token::RParen, line, col });
            }
            Token::RBracket => {
                pop_bracket(&mut brackets, ']', line, col)?;
                tokens.push(SpannedToken { token: Token::RBracket, line, col });
            }
            Token::RBrace => {
                pop_bracket(&mut brackets, '}', line, col)?;
                tokens.push(SpannedToken { token: Token::RBrace, line, col });
            }
            other => tokens.push(SpannedToken { token: other, line, col }),
        }

        prev_end = lexer.span().end;
    }

    if let Some(&(open, line, col)) = brackets.last() {
        return Err(LexError::UnclosedBracket { open, line, col });
    }

    Ok(tokens)
}
