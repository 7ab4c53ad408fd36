use padlang_syntax::LexError;
use padlang_syntax::lexer::{tokenize, Token};

#[test]
fn test_keywords() {
    let source = "true false";
    let tokens = tokenize(source).unwrap();

    assert!(matches!(tokens[0].token, Token::True));
    assert!(matches!(tokens[1].token, Token::False));
}

#[test]
fn test_operators() {
    let source = "== != < <= > >= && || !";
    let tokens = tokenize(source).unwrap();

    let ops: Vec<_> = tokens.iter().map(|t| &t.token).collect();

    assert!(matches!(ops[0], Token::Eq));
    assert!(matches!(ops[1], Token::Ne));
    assert!(matches!(ops[2], Token::Lt));
    assert!(matches!(ops[3], Token::Le));
    assert!(matches!(ops[4], Token::Gt));
    assert!(matches!(ops[5], Token::Ge));
    assert!(matches!(ops[6], Token::AndAnd));
    assert!(matches!(ops[7], Token::OrOr));
    assert!(matches!(ops[8], Token::Bang));
}

#[test]
fn test_strings() {
    let source = r#""hello" "world with spaces" "escaped \"quotes\"" "newline\n""#;
    let tokens = tokenize(source).unwrap();

    match &tokens[0].token {
        Token::String(s) => assert_eq!(s, "hello"),
        _ => panic!("Expected string token"),
    }

    match &tokens[1].token {
        Token::String(s) => assert_eq!(s, "world with spaces"),
        _ => panic!("Expected string token"),
    }

    match &tokens[2].token {
        Token::String(s) => assert_eq!(s, "escaped \"quotes\""),
        _ => panic!("Expected string token"),
    }

    match &tokens[3].token {
        Token::String(s) => assert_eq!(s, "newline\n"),
        _ => panic!("Expected string token"),
    }
}

#[test]
fn test_numbers() {
    let tokens = tokenize("42 0 1000000").unwrap();

    assert_eq!(tokens[0].token, Token::Int(42));
    assert_eq!(tokens[1].token, Token::Int(0));
    assert_eq!(tokens[2].token, Token::Int(1000000));
}

#[test]
fn test_fractional_numbers_are_rejected() {
    let err = tokenize("3.14").unwrap_err();
    assert!(matches!(err, LexError::InvalidNumber { ref text, .. } if text == "3.14"));
}

#[test]
fn test_built_in_reference() {
    let tokens = tokenize("$hasFileExtensions([\".ts\"])").unwrap();

    assert!(matches!(tokens[0].token, Token::Dollar));
    assert!(matches!(&tokens[1].token, Token::Identifier(id) if id == "hasFileExtensions"));
    assert!(matches!(tokens[2].token, Token::LeftParen));
    assert!(matches!(tokens[3].token, Token::LeftBracket));
    assert!(matches!(&tokens[4].token, Token::String(s) if s == ".ts"));
    assert!(matches!(tokens[5].token, Token::RightBracket));
    assert!(matches!(tokens[6].token, Token::RightParen));
}

#[test]
fn test_unterminated_string() {
    let err = tokenize(r#"$addLabel("bug)"#).unwrap_err();
    assert!(matches!(err, LexError::UnterminatedString { .. }));
}

#[test]
fn test_single_ampersand_suggests_double() {
    let err = tokenize("true & false").unwrap_err();
    assert_eq!(err.to_string(), "unexpected character '&' (did you mean '&&'?)");
}

#[test]
fn test_spans_track_columns() {
    let tokens = tokenize("1 == 22").unwrap();

    assert_eq!(tokens[1].span.col, 3);
    assert_eq!(tokens[2].span.col, 6);
    assert_eq!(tokens[2].span.start, 5);
    assert_eq!(tokens[2].span.end, 7);
}
