#![allow(dead_code)]
//! Shared helpers for `query-language` integration tests.

use query_language::*;

pub const DEFAULT_FIELD: &str = "text";

pub fn parser() -> QueryParser {
    QueryParser::new(DEFAULT_FIELD, WhitespaceAnalyzer { lowercase: true })
}

pub fn parser_with(config: ParserConfig) -> QueryParser {
    parser().with_config(config)
}

pub fn render(parser: &QueryParser, input: &str) -> String {
    parser.parse(input).unwrap().to_query_string(DEFAULT_FIELD)
}

pub fn parse_ok(input: &str) -> Query {
    parser().parse(input).unwrap()
}

pub fn parse_err(input: &str) -> SyntaxError {
    match parser().parse(input) {
        Err(Error::Parse { query, source }) => {
            assert_eq!(query, input);
            source
        }
        other => panic!("expected parse error for {input:?}, got: {other:?}"),
    }
}

pub fn occurs(query: &Query) -> Vec<Occur> {
    match query {
        Query::Boolean(query) => query.clauses.iter().map(|clause| clause.occur).collect(),
        other => panic!("expected Boolean, got: {other:?}"),
    }
}

pub fn clauses(query: &Query) -> &[BooleanClause] {
    match query {
        Query::Boolean(query) => &query.clauses,
        other => panic!("expected Boolean, got: {other:?}"),
    }
}

pub fn term_is(query: &Query, field: &str, text: &str) {
    match query {
        Query::Term(query) => {
            assert_eq!(query.term.field, field);
            assert_eq!(query.term.text, text);
        }
        other => panic!("expected Term, got: {other:?}"),
    }
}
