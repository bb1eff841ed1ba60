//! Integration tests for tokenization.

use bundle_expr::lexer::{Lexer, TokenKind};

fn kinds(input: &str) -> Vec<TokenKind> {
    Lexer::tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn every_token_stream_ends_in_eof() {
    for src in ["1 + 2", "", "   ", "\"s\"", "[1,2]"] {
        let tokens = Lexer::tokenize(src).unwrap();
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }
}

#[test]
fn maximal_munch_distinguishes_power_from_multiply() {
    assert_eq!(kinds("2 ** 3"), vec![TokenKind::Number, TokenKind::Power, TokenKind::Number, TokenKind::Eof]);
    assert_eq!(kinds("2 * 3"), vec![TokenKind::Number, TokenKind::Multiply, TokenKind::Number, TokenKind::Eof]);
}

#[test]
fn maximal_munch_distinguishes_question_dot_from_question_and_dot() {
    assert_eq!(kinds("a?.b"), vec![TokenKind::Identifier, TokenKind::QuestionDot, TokenKind::Identifier, TokenKind::Eof]);
    assert_eq!(kinds("a ? b : c"), vec![
        TokenKind::Identifier,
        TokenKind::Question,
        TokenKind::Identifier,
        TokenKind::Colon,
        TokenKind::Identifier,
        TokenKind::Eof
    ]);
}

#[test]
fn dollar_brace_is_its_own_token() {
    assert_eq!(kinds("${x}"), vec![TokenKind::DollarBrace, TokenKind::Identifier, TokenKind::RBrace, TokenKind::Eof]);
}

#[test]
fn word_and_symbol_forms_of_logical_operators_both_lex() {
    assert_eq!(kinds("a && b"), kinds("a and b"));
    assert_eq!(kinds("a || b"), kinds("a or b"));
    assert_eq!(kinds("!a"), kinds("not a"));
}

#[test]
fn unterminated_string_is_a_lex_error_with_in_range_span() {
    let err = Lexer::tokenize("\"unterminated").unwrap_err();
    let span = err.span();
    assert_eq!(span.line, 1);
    assert!(span.column >= 1);
}

#[test]
fn bitwise_and_single_ampersand_is_a_lex_error() {
    assert!(Lexer::tokenize("a & b").is_err());
}

#[test]
fn numbers_narrow_to_integer_when_lossless() {
    let tokens = Lexer::tokenize("42 3.5").unwrap();
    assert_eq!(tokens[0].literal.as_ref().unwrap().to_value(), bundle_expr::Value::Integer(42));
    assert_eq!(tokens[1].literal.as_ref().unwrap().to_value(), bundle_expr::Value::Float(3.5));
}
