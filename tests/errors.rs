mod common;
use common::*;
use pretty_assertions::assert_eq;
use query_language::{lexer::TokenKind, *};

#[test]
fn grammar_errors_point_at_the_offending_token() {
    match parse_err("title:fox\nAND )") {
        SyntaxError::Grammar(error) => {
            assert_eq!(error.encountered.kind, TokenKind::RParen);
            assert_eq!((error.encountered.line, error.encountered.column), (1, 15));
            assert_eq!(error.current.as_ref().map(|token| token.kind), Some(TokenKind::And));
            assert!(error.to_string().starts_with("Encountered \")\" at line 1, column 15."));
        }
        other => panic!("expected Grammar, got: {other:?}"),
    }
}

#[test]
fn newlines_count_as_columns() {
    match parse_err("a\n)") {
        SyntaxError::Grammar(error) => {
            assert_eq!((error.encountered.line, error.encountered.column), (1, 3));
        }
        other => panic!("expected Grammar, got: {other:?}"),
    }

    match parse_err("a\n\"open") {
        SyntaxError::Lexical(error) => assert_eq!((error.line, error.column), (1, 7)),
        other => panic!("expected Lexical, got: {other:?}"),
    }
}

#[test]
fn empty_input_is_rejected() {
    assert!(matches!(parse_err(""), SyntaxError::Grammar(_)));
    assert!(matches!(parse_err("   "), SyntaxError::Grammar(_)));
}

#[test]
fn parse_errors_carry_the_query() {
    let error = parser().parse("(a OR b").unwrap_err();
    assert!(error.to_string().starts_with("Cannot parse '(a OR b': "));
    assert!(matches!(error.syntax(), Some(SyntaxError::Grammar(_))));
}

#[test]
fn leading_wildcards() {
    assert_eq!(
        parse_err("*ox"),
        SyntaxError::LeadingWildcard {
            kind: "WildcardQuery",
            term: String::from("*ox"),
        }
    );

    let parser = parser_with(ParserConfig::new(DEFAULT_FIELD).with_allow_leading_wildcard(true));
    assert_eq!(render(&parser, "*ox"), "*ox");
    assert_eq!(render(&parser, "?ox"), "?ox");
}

#[test]
fn fuzzy_similarity_limits() {
    assert_eq!(parse_err("roam~1.5"), SyntaxError::FractionalEditDistance(1.5));
    assert_eq!(render(&parser(), "roam~2"), "roam~2");
    assert_eq!(render(&parser(), "roam~0.5"), "roam~2");
}

#[test]
fn unterminated_input() {
    match parse_err("\"open phrase") {
        SyntaxError::Lexical(error) => {
            assert!(error.eof_seen);
            assert_eq!(error.character, None);
        }
        other => panic!("expected Lexical, got: {other:?}"),
    }
}

#[test]
fn clause_limit() {
    let parser = parser_with(ParserConfig::new(DEFAULT_FIELD).with_max_clause_count(2));

    assert!(parser.parse("a b").is_ok());
    assert!(matches!(
        parser.parse("a b c").unwrap_err().syntax(),
        Some(SyntaxError::TooManyClauses(_))
    ));
}

#[test]
fn nesting_limit() {
    let parser = parser_with(ParserConfig::new(DEFAULT_FIELD).with_max_nesting_depth(2));

    assert!(parser.parse("((a))").is_ok());
    assert_eq!(
        parser.parse("(((a)))").unwrap_err().syntax(),
        Some(&SyntaxError::NestingTooDeep { max: 2 })
    );
}
