//! Token-level tests for the context-sensitive lexer rules: quote
//! disambiguation, matrix whitespace, row separators, comments, and the
//! numeric literal grammar.

use matra::interpreter::lexer::{NumLit, Token, tokenize};

fn tokens(src: &str) -> Vec<Token> {
    tokenize(src)
        .unwrap_or_else(|e| panic!("lexing failed: {e}\nsource: {src}"))
        .into_iter()
        .map(|t| t.token)
        .collect()
}

fn number(value: f64) -> Token {
    Token::Number(NumLit { value, imag: false })
}

fn imag(value: f64) -> Token {
    Token::Number(NumLit { value, imag: true })
}

// ─── quote disambiguation ───────────────────────────────────────────────

#[test]
fn quote_after_value_is_transpose() {
    assert_eq!(
        tokens("x'"),
        vec![Token::Identifier("x".into()), Token::Apostrophe]
    );
    assert_eq!(
        tokens("A(1)'"),
        vec![
            Token::Identifier("A".into()),
            Token::LParen,
            number(1.0),
            Token::RParen,
            Token::Apostrophe,
        ]
    );
    assert_eq!(tokens("5'"), vec![number(5.0), Token::Apostrophe]);
    assert_eq!(tokens("end'").last(), Some(&Token::Apostrophe));
}

#[test]
fn quote_elsewhere_opens_a_string() {
    assert_eq!(tokens("'abc'"), vec![Token::Str("abc".into())]);
    assert_eq!(
        tokens("x = 'abc'"),
        vec![
            Token::Identifier("x".into()),
            Token::Assign,
            Token::Str("abc".into()),
        ]
    );
    assert_eq!(
        tokens("(1)' + 'a'"),
        vec![
            Token::LParen,
            number(1.0),
            Token::RParen,
            Token::Apostrophe,
            Token::Plus,
            Token::Str("a".into()),
        ]
    );
}

#[test]
fn doubled_quote_escapes() {
    assert_eq!(tokens("'it''s'"), vec![Token::Str("it's".into())]);
    assert_eq!(tokens("''"), vec![Token::Str(String::new())]);
}

#[test]
fn transpose_chains() {
    assert_eq!(
        tokens("x''"),
        vec![
            Token::Identifier("x".into()),
            Token::Apostrophe,
            Token::Apostrophe,
        ]
    );
    assert_eq!(
        tokens("x.'"),
        vec![Token::Identifier("x".into()), Token::DotApostrophe]
    );
}

#[test]
fn string_after_transpose_inside_brackets() {
    // the injected comma turns the quote into a string opener
    assert_eq!(
        tokens("[a 'b']"),
        vec![
            Token::LBracket,
            Token::Identifier("a".into()),
            Token::Comma,
            Token::Str("b".into()),
            Token::RBracket,
        ]
    );
}

// ─── matrix whitespace ──────────────────────────────────────────────────

#[test]
fn implicit_commas_between_values() {
    assert_eq!(
        tokens("[1 2]"),
        vec![
            Token::LBracket,
            number(1.0),
            Token::Comma,
            number(2.0),
            Token::RBracket,
        ]
    );
}

#[test]
fn plus_minus_after_space_stay_binary() {
    assert_eq!(
        tokens("[1 + 2]"),
        vec![
            Token::LBracket,
            number(1.0),
            Token::Plus,
            number(2.0),
            Token::RBracket,
        ]
    );
    assert_eq!(
        tokens("[1 -2]"),
        vec![
            Token::LBracket,
            number(1.0),
            Token::Minus,
            number(2.0),
            Token::RBracket,
        ]
    );
}

#[test]
fn no_comma_outside_brackets() {
    assert_eq!(tokens("1 2"), vec![number(1.0), number(2.0)]);
}

#[test]
fn dot_operators_get_no_comma() {
    assert_eq!(
        tokens("[a .* b]"),
        vec![
            Token::LBracket,
            Token::Identifier("a".into()),
            Token::DotStar,
            Token::Identifier("b".into()),
            Token::RBracket,
        ]
    );
    // a dot before a digit starts a number, so a comma is injected
    assert_eq!(
        tokens("[1 .5]"),
        vec![
            Token::LBracket,
            number(1.0),
            Token::Comma,
            number(0.5),
            Token::RBracket,
        ]
    );
}

#[test]
fn newline_is_a_row_separator_inside_brackets() {
    assert_eq!(
        tokens("[1\n2]"),
        vec![
            Token::LBracket,
            number(1.0),
            Token::Semicolon,
            number(2.0),
            Token::RBracket,
        ]
    );
    // but not after a non-value token
    assert_eq!(
        tokens("[1,\n2]"),
        vec![
            Token::LBracket,
            number(1.0),
            Token::Comma,
            number(2.0),
            Token::RBracket,
        ]
    );
}

#[test]
fn newline_inside_parens_is_dropped() {
    assert_eq!(
        tokens("(1 +\n2)"),
        vec![
            Token::LParen,
            number(1.0),
            Token::Plus,
            number(2.0),
            Token::RParen,
        ]
    );
}

#[test]
fn newline_at_statement_level_is_kept() {
    assert_eq!(tokens("1\n2"), vec![number(1.0), Token::NewLine, number(2.0)]);
}

// ─── numeric literals ───────────────────────────────────────────────────

#[test]
fn decimal_forms() {
    assert_eq!(tokens("42"), vec![number(42.0)]);
    assert_eq!(tokens("3.14"), vec![number(3.14)]);
    assert_eq!(tokens(".5"), vec![number(0.5)]);
    assert_eq!(tokens("5."), vec![number(5.0)]);
    assert_eq!(tokens("2.5e2"), vec![number(250.0)]);
    assert_eq!(tokens("1e-3"), vec![number(0.001)]);
    assert_eq!(tokens("1.e3"), vec![number(1000.0)]);
}

#[test]
fn radix_forms() {
    assert_eq!(tokens("0xff"), vec![number(255.0)]);
    assert_eq!(tokens("0b1010"), vec![number(10.0)]);
    assert_eq!(tokens("0xA_B"), vec![number(171.0)]);
}

#[test]
fn imaginary_suffixes() {
    assert_eq!(tokens("2i"), vec![imag(2.0)]);
    assert_eq!(tokens("2j"), vec![imag(2.0)]);
    assert_eq!(tokens("1.5i"), vec![imag(1.5)]);
    assert_eq!(tokens("0b10i"), vec![imag(2.0)]);
    // a suffix followed by a word character is not a suffix
    assert_eq!(tokens("2if"), vec![number(2.0), Token::If]);
    assert_eq!(
        tokens("2iq"),
        vec![number(2.0), Token::Identifier("iq".into())]
    );
}

#[test]
fn dot_between_number_and_operator_stays_an_operator() {
    assert_eq!(tokens("1.*2"), vec![number(1.0), Token::DotStar, number(2.0)]);
    assert_eq!(tokens("1.^2"), vec![number(1.0), Token::DotCaret, number(2.0)]);
    assert_eq!(tokens("1.5.*2"), vec![number(1.5), Token::DotStar, number(2.0)]);
}

#[test]
fn underscore_grouping() {
    assert_eq!(tokens("1_000"), vec![number(1000.0)]);
    assert!(tokenize("1__000").is_err());
    assert!(tokenize("1_").is_err());
    assert!(tokenize("0x_1").is_err());
}

#[test]
fn tokenizing_preserves_numeric_value() {
    for (text, value) in [
        ("123.456", 123.456),
        ("1e10", 1e10),
        ("0x10", 16.0),
        ("0b11", 3.0),
        ("1_2_3", 123.0),
    ] {
        assert_eq!(tokens(text), vec![number(value)], "literal {text}");
    }
}

// ─── comments and continuations ─────────────────────────────────────────

#[test]
fn line_comments_are_skipped() {
    assert_eq!(tokens("1 % comment"), vec![number(1.0)]);
    assert_eq!(tokens("% whole line\n5"), vec![Token::NewLine, number(5.0)]);
}

#[test]
fn block_comments_must_be_line_anchored() {
    assert_eq!(tokens("%{\nskipped\n%}\n5"), vec![Token::NewLine, number(5.0)]);
    // not at line start: an ordinary comment, so the body is real code
    assert_eq!(tokens("1 %{\n5"), vec![number(1.0), Token::NewLine, number(5.0)]);
}

#[test]
fn continuation_joins_lines() {
    assert_eq!(tokens("1 + ...\n2"), vec![number(1.0), Token::Plus, number(2.0)]);
    assert_eq!(
        tokens("1 + ... trailing words\n2"),
        vec![number(1.0), Token::Plus, number(2.0)]
    );
}

// ─── errors and positions ───────────────────────────────────────────────

#[test]
fn bracket_mismatches_are_rejected() {
    assert!(tokenize("(1]").is_err());
    assert!(tokenize("[1 2").is_err());
    assert!(tokenize("1)").is_err());
    assert!(tokenize("{1)").is_err());
}

#[test]
fn errors_carry_positions() {
    let err = tokenize("x = 1;\ny = 'oops").expect_err("unterminated string lexed");
    let text = err.to_string();
    assert!(text.contains("line 2"), "got: {text}");

    let err = tokenize("  $").expect_err("bad character lexed");
    let text = err.to_string();
    assert!(text.contains("line 1"), "got: {text}");
    assert!(text.contains("col 3"), "got: {text}");
}

#[test]
fn tokens_carry_positions() {
    let spanned = tokenize("x = 1;\n  y = 2;").expect("lexing failed");
    let y = spanned
        .iter()
        .find(|t| t.token == Token::Identifier("y".into()))
        .expect("y not found");
    assert_eq!(y.line, 2);
    assert_eq!(y.col, 3);
}
