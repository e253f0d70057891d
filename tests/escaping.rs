mod common;
use common::*;
use pretty_assertions::assert_eq;
use query_language::*;

fn keyword_parser() -> QueryParser {
    QueryParser::new(DEFAULT_FIELD, KeywordAnalyzer)
}

#[test]
fn escaped_specials_parse_back_to_the_same_term() {
    let parser = keyword_parser();

    for text in [
        "a:b", "(x)", "c++", "x^2", "[a]", "{b}", "say\"hi\"", "a~b", "a*b", "a?b", "a|b",
        "a&&b", "a/b", "-neg", "+pos", "back\\slash", "!bang",
    ] {
        let query = parser.parse(&escape(text)).unwrap();
        term_is(&query, DEFAULT_FIELD, text);
    }
}

#[test]
fn escaped_specials_with_the_default_parser() {
    let parser = parser();

    for text in ["Title:Fox", "C++", "(A|B)", "X^2~1", "Back\\Slash", "a*B?", "[Lo]{Hi}"] {
        let query = parser.parse(&escape(text)).unwrap();
        term_is(&query, DEFAULT_FIELD, &text.to_lowercase());
    }
}

#[test]
fn escaped_field_names() {
    let query = keyword_parser().parse(r"my\:field:value").unwrap();
    term_is(&query, "my:field", "value");
}

#[test]
fn unicode_escapes_in_terms() {
    term_is(&keyword_parser().parse(r"caf\u00E9").unwrap(), DEFAULT_FIELD, "café");
    term_is(&keyword_parser().parse(r"\uD83D\uDE00").unwrap(), DEFAULT_FIELD, "😀");
}

#[test]
fn malformed_escapes() {
    assert_eq!(
        parse_err(r"a\u12"),
        SyntaxError::Escape(error::EscapeError::TruncatedEscape)
    );
    assert_eq!(
        parse_err(r"a\u12zz"),
        SyntaxError::Escape(error::EscapeError::InvalidHexDigit('z'))
    );
    assert_eq!(
        parse_err(r"a\uD83D"),
        SyntaxError::Escape(error::EscapeError::UnpairedSurrogate)
    );
    assert!(matches!(parse_err("a\\"), SyntaxError::Lexical(_)));
}

#[test]
fn discarding_escapes_directly() {
    assert_eq!(discard_escape_char(r"a\+bA"), Ok(String::from("a+bA")));
    assert_eq!(
        discard_escape_char("a\\"),
        Err(error::EscapeError::TrailingEscape)
    );
}
