//! Field resolution for clause queries.
//!
//! The grammar driver never builds a field query itself. It hands the
//! clause's field (or `None` when the clause names no field) to a
//! [`FieldQueryFactory`], which decides which field or fields the query
//! targets. [`SingleField`] uses the configured default field;
//! [`MultiFieldExpansion`](crate::MultiFieldExpansion) fans the clause out
//! over a list of fields.

use crate::{ast::Query, builder::QueryBuilder, config::ParserConfig, error::SyntaxError};

pub type FactoryResult = Result<Option<Query>, SyntaxError>;

pub trait FieldQueryFactory {
    /// Analyzed term or phrase. `quoted` is set for quoted text.
    fn term_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        text: &str,
        quoted: bool,
    ) -> FactoryResult;

    /// Quoted text with an explicit phrase slop.
    fn phrase_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        text: &str,
        slop: u32,
    ) -> FactoryResult;

    fn fuzzy_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        term: &str,
        min_similarity: f32,
    ) -> FactoryResult;

    fn prefix_query(&self, builder: &QueryBuilder<'_>, field: Option<&str>, term: &str)
        -> FactoryResult;

    fn wildcard_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        term: &str,
    ) -> FactoryResult;

    fn regexp_query(&self, builder: &QueryBuilder<'_>, field: Option<&str>, term: &str)
        -> FactoryResult;

    /// `None` endpoints are open.
    fn range_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        lower: Option<&str>,
        upper: Option<&str>,
        include_lower: bool,
        include_upper: bool,
    ) -> FactoryResult;
}

/// Targets the clause's own field, or the configured default field.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleField;

impl SingleField {
    fn resolve<'f>(config: &'f ParserConfig, field: Option<&'f str>) -> &'f str {
        field.unwrap_or(&config.default_field)
    }
}

impl FieldQueryFactory for SingleField {
    fn term_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        text: &str,
        quoted: bool,
    ) -> FactoryResult {
        let field = Self::resolve(builder.config(), field);
        builder.field_query(field, text, quoted)
    }

    fn phrase_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        text: &str,
        slop: u32,
    ) -> FactoryResult {
        let field = Self::resolve(builder.config(), field);
        builder.phrase_query(field, text, slop)
    }

    fn fuzzy_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        term: &str,
        min_similarity: f32,
    ) -> FactoryResult {
        let field = Self::resolve(builder.config(), field);
        Ok(Some(builder.fuzzy_query(field, term, min_similarity)))
    }

    fn prefix_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        term: &str,
    ) -> FactoryResult {
        let field = Self::resolve(builder.config(), field);
        builder.prefix_query(field, term).map(Some)
    }

    fn wildcard_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        term: &str,
    ) -> FactoryResult {
        let field = Self::resolve(builder.config(), field);
        builder.wildcard_query(field, term).map(Some)
    }

    fn regexp_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        term: &str,
    ) -> FactoryResult {
        let field = Self::resolve(builder.config(), field);
        Ok(Some(builder.regexp_query(field, term)))
    }

    fn range_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        lower: Option<&str>,
        upper: Option<&str>,
        include_lower: bool,
        include_upper: bool,
    ) -> FactoryResult {
        let field = Self::resolve(builder.config(), field);
        builder
            .range_query(field, lower, upper, include_lower, include_upper)
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::WhitespaceAnalyzer;

    #[test]
    fn resolves_default_field() {
        let config = ParserConfig::new("body");
        let analyzer = WhitespaceAnalyzer::default();
        let builder = QueryBuilder::new(&config, &analyzer);

        let query = SingleField.term_query(&builder, None, "fox", false).unwrap();
        assert_eq!(query, Some(Query::term("body", "fox")));

        let query = SingleField.term_query(&builder, Some("title"), "fox", false).unwrap();
        assert_eq!(query, Some(Query::term("title", "fox")));

        let query = SingleField.prefix_query(&builder, None, "fo").unwrap();
        assert_eq!(query.map(|query| query.to_string()).as_deref(), Some("body:fo*"));
    }
}
