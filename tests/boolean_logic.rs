mod common;
use common::*;
use pretty_assertions::assert_eq;
use query_language::*;

#[test]
fn plain_terms_are_single_term_queries() {
    for input in ["fox", "Quick", "héllo", "a1b2", "x.y"] {
        term_is(&parse_ok(input), DEFAULT_FIELD, &input.to_lowercase());
    }
}

#[test]
fn explicit_and_matches_required_modifiers() {
    for operator in [Operator::Or, Operator::And] {
        let parser = parser_with(ParserConfig::new(DEFAULT_FIELD).with_default_operator(operator));

        let conjunction = parser.parse("a AND b").unwrap();
        let modifiers = parser.parse("+a +b").unwrap();
        assert_eq!(conjunction, modifiers);
        assert_eq!(occurs(&conjunction), vec![Occur::Must, Occur::Must]);
    }
}

#[test]
fn default_operator_decides_bare_clauses() {
    let or = parser();
    assert_eq!(occurs(&or.parse("a b").unwrap()), vec![Occur::Should, Occur::Should]);

    let and = parser_with(ParserConfig::new(DEFAULT_FIELD).with_default_operator(Operator::And));
    assert_eq!(occurs(&and.parse("a b").unwrap()), vec![Occur::Must, Occur::Must]);
}

#[test]
fn or_relaxes_previous_clause_under_and() {
    let parser = parser_with(ParserConfig::new(DEFAULT_FIELD).with_default_operator(Operator::And));
    let query = parser.parse("a OR b c").unwrap();

    assert_eq!(occurs(&query), vec![Occur::Should, Occur::Should, Occur::Must]);
    assert_eq!(query.to_query_string(DEFAULT_FIELD), "a b +c");
}

#[test]
fn prohibited_clauses_stay_prohibited() {
    let parser = parser_with(ParserConfig::new(DEFAULT_FIELD).with_default_operator(Operator::And));

    assert_eq!(render(&parser, "-a OR b"), "-a b");
    assert_eq!(render(&parser, "-a AND b"), "-a +b");
    assert_eq!(render(&common::parser(), "NOT a AND b"), "-a +b");
}

#[test]
fn nested_groups() {
    let query = parse_ok("title:(+quick -(slow OR lazy)) AND fox^2");

    assert_eq!(
        query.to_query_string(DEFAULT_FIELD),
        "+(+title:quick -(title:slow title:lazy)) +fox^2.0"
    );
    assert_eq!(clauses(&query).len(), 2);
}

#[test]
fn terms_dropped_by_the_analyzer() {
    let parser = QueryParser::new(DEFAULT_FIELD, StandardAnalyzer::english());

    assert_eq!(render(&parser, "the AND fox"), "+fox");
    assert_eq!(render(&parser, "fox OR the"), "fox");
    assert_eq!(parser.parse("the a an").unwrap(), parser.parse("to be").unwrap());
    assert!(clauses(&parser.parse("the").unwrap()).is_empty());
}

#[test]
fn rendered_queries_parse_back() {
    let parser = parser();

    for input in ["fox", "title:fox", "\"quick fox\"", "\"quick fox\"~2", "+a -b c", "fo*", "f?x"] {
        let query = parser.parse(input).unwrap();
        let reparsed = parser.parse(&query.to_query_string(DEFAULT_FIELD)).unwrap();
        assert_eq!(reparsed, query, "round trip of {input:?}");
    }
}
