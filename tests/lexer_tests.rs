// tests/lexer_tests.rs

use nodex_lang::ast::Token;
use nodex_lang::lexer::{LexError, Lexer};
use rstest::rstest;

fn tokens(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut out = Vec::new();
    loop {
        let token = lexer.next_token()?;
        if token == Token::Eof {
            return Ok(out);
        }
        out.push(token);
    }
}

fn word(text: &str) -> Token {
    Token::Word {
        text: text.to_string(),
        escaped: false,
    }
}

fn escaped(text: &str) -> Token {
    Token::Word {
        text: text.to_string(),
        escaped: true,
    }
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_minimal_expression() {
    assert_eq!(
        tokens("@?value").unwrap(),
        vec![Token::At, Token::TypeSuffix("value".to_string())]
    );
}

#[test]
fn test_referenced_expression_has_two_sentinels() {
    assert_eq!(
        tokens("@@/0?value").unwrap(),
        vec![
            Token::At,
            Token::At,
            Token::Slash,
            word("0"),
            Token::TypeSuffix("value".to_string())
        ]
    );
}

#[test]
fn test_groups_and_operators() {
    assert_eq!(
        tokens("@/*/((/a/)^(/b/))?name").unwrap(),
        vec![
            Token::At,
            Token::Slash,
            word("*"),
            Token::Slash,
            Token::LParen,
            Token::LParen,
            Token::Slash,
            word("a"),
            Token::Slash,
            Token::RParen,
            word("^"),
            Token::LParen,
            Token::Slash,
            word("b"),
            Token::Slash,
            Token::RParen,
            Token::RParen,
            Token::TypeSuffix("name".to_string()),
        ]
    );
}

#[test]
fn test_type_suffix_takes_rest_of_input() {
    assert_eq!(
        tokens("@? value.int ").unwrap(),
        vec![Token::At, Token::TypeSuffix("value.int".to_string())]
    );
}

// ============================================================================
// Whitespace
// ============================================================================

#[test]
fn test_whitespace_between_tokens_is_ignored() {
    assert_eq!(
        tokens("  @/..\n    /*\n      /_mammal\n?node").unwrap(),
        vec![
            Token::At,
            Token::Slash,
            word(".."),
            Token::Slash,
            word("*"),
            Token::Slash,
            word("_mammal"),
            Token::TypeSuffix("node".to_string()),
        ]
    );
}

#[test]
fn test_whitespace_ends_a_word() {
    assert_eq!(
        tokens("/=a b").unwrap(),
        vec![Token::Slash, word("=a"), word("b")]
    );
}

// ============================================================================
// Escaping
// ============================================================================

#[rstest]
#[case(r"\*", "*")]
#[case(r"\..", "..")]
#[case(r"\.", ".")]
#[case(r"\\", "\\")]
#[case(r"\/", "/")]
#[case(r"\?x", "?x")]
fn test_leading_backslash_forces_literal_name(#[case] input: &str, #[case] text: &str) {
    assert_eq!(tokens(input).unwrap(), vec![escaped(text)]);
}

#[test]
fn test_inner_backslash_escapes_delimiter() {
    assert_eq!(tokens(r"a\/b").unwrap(), vec![word("a/b")]);
}

#[test]
fn test_trailing_backslash_is_an_error() {
    assert!(matches!(
        tokens(r"/abc\"),
        Err(LexError::DanglingEscape { .. })
    ));
}

// ============================================================================
// Literals
// ============================================================================

#[rstest]
#[case(r#""plain""#, "plain")]
#[case(r#""a/b(c)?d""#, "a/b(c)?d")]
#[case(r#""tab\there""#, "tab\there")]
#[case(r#""quote\"d""#, "quote\"d")]
#[case(r#""\\/""#, "\\/")]
#[case(r#""=/^\d+$/""#, "=/^\\d+$/")]
fn test_quoted_literal(#[case] input: &str, #[case] content: &str) {
    assert_eq!(
        tokens(input).unwrap(),
        vec![Token::Literal(content.to_string())]
    );
}

#[test]
fn test_verbatim_literal_keeps_newlines() {
    assert_eq!(
        tokens("/@\"=x\r\ny\"?name").unwrap(),
        vec![
            Token::Slash,
            Token::Literal("=x\r\ny".to_string()),
            Token::TypeSuffix("name".to_string()),
        ]
    );
}

#[test]
fn test_verbatim_literal_doubled_quote() {
    assert_eq!(
        tokens(r#"@"say ""hi"" \n""#).unwrap(),
        vec![Token::Literal(r#"say "hi" \n"#.to_string())]
    );
}

#[rstest]
#[case(r#"/"open"#)]
#[case(r#"/@"open"#)]
#[case(r#"/"escaped end\""#)]
fn test_unterminated_literal(#[case] input: &str) {
    assert!(matches!(
        tokens(input),
        Err(LexError::UnterminatedLiteral { .. })
    ));
}

#[test]
fn test_quote_inside_word_is_literal() {
    assert_eq!(tokens(r#"/a"b"#).unwrap(), vec![Token::Slash, word("a\"b")]);
}

// ============================================================================
// Positions
// ============================================================================

#[test]
fn test_unterminated_literal_reports_start() {
    let err = tokens("@/*\n/\"abc").unwrap_err();
    let LexError::UnterminatedLiteral { position } = err else {
        panic!("unexpected error {:?}", err);
    };
    assert_eq!(position.line, 2);
    assert_eq!(position.column, 2);
    assert_eq!(position.offset, 5);
}
