mod common;
use std::{collections::HashMap, sync::Arc};

use common::*;
use pretty_assertions::assert_eq;
use query_language::*;

fn parser() -> MultiFieldQueryParser {
    MultiFieldQueryParser::with_fields(["title", "body"], StandardAnalyzer::english())
}

#[test]
fn field_less_term_expands_to_every_field() {
    let query = parser().parse("fox").unwrap();

    assert_eq!(occurs(&query), vec![Occur::Should, Occur::Should]);
    term_is(&clauses(&query)[0].query, "title", "fox");
    term_is(&clauses(&query)[1].query, "body", "fox");
}

#[test]
fn per_field_boosts() {
    let boosts = HashMap::from([(String::from("title"), 2.0), (String::from("body"), 0.5)]);
    let query = parser().with_boosts(boosts).parse("fox").unwrap();

    assert_eq!(clauses(&query)[0].query.boost(), 2.0);
    assert_eq!(clauses(&query)[1].query.boost(), 0.5);
    assert_eq!(query.to_string(), "title:fox^2.0 body:fox^0.5");
}

#[test]
fn explicit_fields_are_not_expanded() {
    assert_eq!(parser().parse("author:Smith").unwrap(), Query::term("author", "smith"));
    assert_eq!(
        parser().parse("+fox -author:smith").unwrap().to_string(),
        "+(title:fox body:fox) -author:smith"
    );
}

#[test]
fn clause_boost_applies_to_the_expansion() {
    assert_eq!(parser().parse("fox^3").unwrap().to_string(), "(title:fox body:fox)^3.0");
}

#[test]
fn parser_config_is_shared_by_every_field() {
    let mut parser = parser();
    parser.config_mut().allow_leading_wildcard = true;

    assert_eq!(parser.parse("*ox").unwrap().to_string(), "title:*ox body:*ox");
}

#[test]
fn combinators_join_per_field_parses() {
    let analyzer: Arc<dyn Analyzer> = Arc::new(StandardAnalyzer::english());

    let query = combine(
        &["quick fox", "smith"],
        &["title", "author"],
        &[Occur::Must, Occur::MustNot],
        analyzer,
    )
    .unwrap();
    assert_eq!(query.to_string(), "+(title:quick title:fox) -author:smith");
}

#[test]
fn combinator_length_mismatch() {
    let analyzer: Arc<dyn Analyzer> = Arc::new(StandardAnalyzer::english());
    let error = combine_queries(&["a", "b", "c"], &["title", "body"], analyzer).unwrap_err();

    assert!(error.syntax().is_none());
    assert!(matches!(
        error,
        Error::ArgumentLengthMismatch { left: 3, right: 2, .. }
    ));
}

#[test]
fn combinator_reports_the_failing_query() {
    let analyzer: Arc<dyn Analyzer> = Arc::new(StandardAnalyzer::english());

    match combine_queries(&["fox", "(bad"], &["title", "body"], analyzer) {
        Err(Error::Parse { query, source }) => {
            assert_eq!(query, "(bad");
            assert!(matches!(source, SyntaxError::Grammar(_)));
        }
        other => panic!("expected Parse, got: {other:?}"),
    }
}
