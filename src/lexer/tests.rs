//! Unit tests for the lexer module.
//!
//! - Keywords and identifiers
//! - Integer, character and string literals with escape sequences
//! - Operators and punctuation
//! - Comments, preprocessor lines and line tracking
//! - Error cases

use super::{lexer::tokenize, tokens::TokenKind};

#[test]
fn test_tokenize_keywords() {
    let source = "int char void const if else while for return break continue".to_string();
    let tokens = tokenize(source, Some("test.c".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Int);
    assert_eq!(tokens[1].kind, TokenKind::Char);
    assert_eq!(tokens[2].kind, TokenKind::Void);
    assert_eq!(tokens[3].kind, TokenKind::Const);
    assert_eq!(tokens[4].kind, TokenKind::If);
    assert_eq!(tokens[5].kind, TokenKind::Else);
    assert_eq!(tokens[6].kind, TokenKind::While);
    assert_eq!(tokens[7].kind, TokenKind::For);
    assert_eq!(tokens[8].kind, TokenKind::Return);
    assert_eq!(tokens[9].kind, TokenKind::Break);
    assert_eq!(tokens[10].kind, TokenKind::Continue);
    assert_eq!(tokens[11].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo integer _under x1 printf".to_string();
    let tokens = tokenize(source, Some("test.c".to_string())).unwrap();

    for (token, expected) in tokens.iter().zip(["foo", "integer", "_under", "x1", "printf"]) {
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.value, expected);
    }
}

#[test]
fn test_tokenize_numbers() {
    let tokens = tokenize("42 0 1234567".to_string(), None).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].value, "0");
    assert_eq!(tokens[2].value, "1234567");
}

#[test]
fn test_tokenize_strings() {
    let tokens = tokenize("\"Hello\\n\" \"say \\\"hi\\\"\" \"\"".to_string(), None).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "Hello\n");
    assert_eq!(tokens[1].value, "say \"hi\"");
    assert_eq!(tokens[2].value, "");
}

#[test]
fn test_tokenize_chars() {
    let tokens = tokenize("'a' '\\n' '\\0' '\\'' '\\x41'".to_string(), None).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::CharLiteral);
    assert_eq!(tokens[0].value, "a");
    assert_eq!(tokens[1].value, "\n");
    assert_eq!(tokens[2].value, "\0");
    assert_eq!(tokens[3].value, "'");
    assert_eq!(tokens[4].value, "A");
}

#[test]
fn test_tokenize_operators() {
    let source = "= == ! != < <= > >= || && & ++ -- + - * / % ; , ( ) [ ] { }".to_string();
    let tokens = tokenize(source, None).unwrap();
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();

    assert_eq!(
        kinds,
        vec![
            TokenKind::Assignment,
            TokenKind::Equals,
            TokenKind::Not,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::LessEquals,
            TokenKind::Greater,
            TokenKind::GreaterEquals,
            TokenKind::Or,
            TokenKind::And,
            TokenKind::Ampersand,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_skips_comments_and_includes() {
    let source = "#include <stdio.h>\n// line comment\nint /* block\ncomment */ x;".to_string();
    let tokens = tokenize(source, None).unwrap();

    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[0].kind, TokenKind::Int);
    assert_eq!(tokens[1].value, "x");
}

#[test]
fn test_tokenize_tracks_lines() {
    let source = "int a;\n\nchar b;\n/* one\ntwo */ void".to_string();
    let tokens = tokenize(source, None).unwrap();

    assert_eq!(tokens[0].line(), 1);
    assert_eq!(tokens[3].line(), 3);
    assert_eq!(tokens[6].line(), 5);
}

#[test]
fn test_tokenize_unrecognised() {
    let error = tokenize("int a = 1;\nint b = @;".to_string(), None).unwrap_err();

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_line(), 2);
}

#[test]
fn test_tokenize_bad_escape() {
    let error = tokenize("\"\\q\"".to_string(), None).unwrap_err();

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
}
