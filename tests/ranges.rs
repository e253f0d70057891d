mod common;
use common::*;
use pretty_assertions::assert_eq;
use query_language::*;
use time::UtcOffset;

#[test]
fn year_resolution_keeps_years() {
    let config = ParserConfig::new(DEFAULT_FIELD).with_field_date_resolution("date", DateResolution::Year);
    assert_eq!(render(&parser_with(config), "date:[2020 TO 2021]"), "date:[2020 TO 2021]");
}

#[test]
fn day_resolution_with_locale_dates() {
    let parser = parser();
    assert_eq!(render(&parser, "date:[1/2/2021 TO 2021-02-03]"), "date:[20210102 TO 20210203]");
    assert_eq!(render(&parser, "date:{1/2/2021 TO *]"), "date:{20210102 TO *]");

    let german = parser_with(ParserConfig::new(DEFAULT_FIELD).with_locale(Locale::De));
    assert_eq!(render(&german, "date:[01.02.2021 TO 03.02.2021]"), "date:[20210201 TO 20210203]");
}

#[test]
fn time_zone_shifts_encoded_dates() {
    let config = ParserConfig::new(DEFAULT_FIELD)
        .with_date_resolution(DateResolution::Hour)
        .with_time_zone(UtcOffset::from_hms(1, 0, 0).unwrap());

    assert_eq!(
        render(&parser_with(config), "date:[2021-03-14 TO 2021-03-14]"),
        "date:[2021031323 TO 2021031422]"
    );
}

#[test]
fn text_endpoints() {
    let parser = parser();

    assert_eq!(render(&parser, "name:[Apple TO melon}"), "name:[apple TO melon}");
    assert_eq!(render(&parser, "[a TO *]"), "[a TO *]");
    assert_eq!(render(&parser, r#"name:["a b" TO "c\"d"]"#), r#"name:[a b TO c"d]"#);
}

#[test]
fn boosted_ranges() {
    let query = parse_ok("name:[a TO c]^3");
    assert_eq!(query.boost(), 3.0);
    assert_eq!(query.to_query_string(DEFAULT_FIELD), "name:[a TO c]^3.0");
}

#[test]
fn analyzed_endpoints() {
    let parser = QueryParser::new(DEFAULT_FIELD, StandardAnalyzer::english())
        .with_config(ParserConfig::new(DEFAULT_FIELD).with_analyze_range_terms(true));

    assert_eq!(render(&parser, "[Apple TO Melon]"), "[apple TO melon]");
    assert!(matches!(
        parser.parse("[the TO melon]").unwrap_err().syntax(),
        Some(SyntaxError::RangeTermAnalysis { count: 0, .. })
    ));
}

#[test]
fn oversized_date_fields_stay_literal() {
    let parser = parser();

    assert_eq!(
        render(&parser, "d:[1/200000000000000/2020 TO x]"),
        "d:[1/200000000000000/2020 TO x]"
    );
    assert_eq!(render(&parser, "d:{* TO 12.31.99999999999]"), "d:{* TO 12.31.99999999999]");
}

#[test]
fn endpoints_may_start_with_a_tab() {
    assert_eq!(render(&parser(), "name:[ \tx TO y]"), "name:[\tx TO y]");
}
