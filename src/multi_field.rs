//! Fan-out of field-less clauses over several fields.

use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::{
    analysis::Analyzer,
    ast::{BooleanClause, BooleanQuery, Occur, Query},
    builder::QueryBuilder,
    config::ParserConfig,
    error::{Error, Result},
    factory::{FactoryResult, FieldQueryFactory, SingleField},
    parser::QueryParser,
};

/// Parser that expands clauses without a field over a list of fields.
pub type MultiFieldQueryParser = QueryParser<MultiFieldExpansion>;

/// Builds a clause without an explicit field once per configured field and
/// joins the results as optional clauses. A clause with a field behaves as
/// with [`SingleField`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiFieldExpansion {
    fields: Vec<String>,
    boosts: HashMap<String, f32>,
}

impl MultiFieldExpansion {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            boosts: HashMap::new(),
        }
    }

    /// Per-field boosts; fields without an entry stay unboosted.
    pub fn with_boosts(mut self, boosts: HashMap<String, f32>) -> Self {
        self.boosts = boosts;
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn boosts(&self) -> &HashMap<String, f32> {
        &self.boosts
    }

    fn fan_out(
        &self,
        builder: &QueryBuilder<'_>,
        mut build: impl FnMut(&str) -> FactoryResult,
    ) -> FactoryResult {
        let mut clauses = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            let Some(mut query) = build(field.as_str())? else {
                continue;
            };
            if let Some(boost) = self.boosts.get(field) {
                query.set_boost(*boost);
            }
            clauses.push(BooleanClause::new(query, Occur::Should));
        }

        if clauses.is_empty() {
            debug!(fields = ?self.fields, "no field produced a query");
        }

        builder.boolean_query(clauses, true)
    }
}

impl FieldQueryFactory for MultiFieldExpansion {
    fn term_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        text: &str,
        quoted: bool,
    ) -> FactoryResult {
        match field {
            Some(_) => SingleField.term_query(builder, field, text, quoted),
            None => self.fan_out(builder, |field| builder.field_query(field, text, quoted)),
        }
    }

    fn phrase_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        text: &str,
        slop: u32,
    ) -> FactoryResult {
        match field {
            Some(_) => SingleField.phrase_query(builder, field, text, slop),
            None => self.fan_out(builder, |field| builder.phrase_query(field, text, slop)),
        }
    }

    fn fuzzy_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        term: &str,
        min_similarity: f32,
    ) -> FactoryResult {
        match field {
            Some(_) => SingleField.fuzzy_query(builder, field, term, min_similarity),
            None => self.fan_out(builder, |field| {
                Ok(Some(builder.fuzzy_query(field, term, min_similarity)))
            }),
        }
    }

    fn prefix_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        term: &str,
    ) -> FactoryResult {
        match field {
            Some(_) => SingleField.prefix_query(builder, field, term),
            None => self.fan_out(builder, |field| builder.prefix_query(field, term).map(Some)),
        }
    }

    fn wildcard_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        term: &str,
    ) -> FactoryResult {
        match field {
            Some(_) => SingleField.wildcard_query(builder, field, term),
            None => self.fan_out(builder, |field| builder.wildcard_query(field, term).map(Some)),
        }
    }

    fn regexp_query(
        &self,
        builder: &QueryBuilder<'_>,
        field: Option<&str>,
        term: &str,
    ) -> FactoryResult {
        match field {
            Some(_) => SingleField.regexp_query(builder, field, term),
            None => self.fan_out(builder, |field| Ok(Some(builder.regexp_query(field, term)))),
        }
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
        match field {
            Some(_) => SingleField.range_query(
                builder,
                field,
                lower,
                upper,
                include_lower,
                include_upper,
            ),
            None => self.fan_out(builder, |field| {
                builder
                    .range_query(field, lower, upper, include_lower, include_upper)
                    .map(Some)
            }),
        }
    }
}

impl QueryParser<MultiFieldExpansion> {
    /// Parser expanding field-less clauses over `fields`.
    pub fn with_fields<S: Into<String>>(
        fields: impl IntoIterator<Item = S>,
        analyzer: impl Analyzer + 'static,
    ) -> Self {
        Self::with_factory(
            ParserConfig::default(),
            Arc::new(analyzer),
            MultiFieldExpansion::new(fields),
        )
    }

    pub fn with_boosts(mut self, boosts: HashMap<String, f32>) -> Self {
        self.factory_mut().boosts = boosts;
        self
    }
}

fn check_lengths(what: &'static str, left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(Error::ArgumentLengthMismatch { what, left, right });
    }
    Ok(())
}

/// Parses each query against its own default field and joins the non-empty
/// results as optional clauses.
pub fn combine_queries(
    queries: &[&str],
    fields: &[&str],
    analyzer: Arc<dyn Analyzer>,
) -> Result<Query> {
    check_lengths("queries.len() != fields.len()", queries.len(), fields.len())?;
    let occurs = vec![Occur::Should; queries.len()];
    combine_parsed(queries, fields, &occurs, analyzer)
}

/// Parses one query once per field, each time with that field as the
/// default field, and joins the results with the matching occurrence.
pub fn combine_fields(
    query: &str,
    fields: &[&str],
    occurs: &[Occur],
    analyzer: Arc<dyn Analyzer>,
) -> Result<Query> {
    check_lengths("fields.len() != occurs.len()", fields.len(), occurs.len())?;
    let queries = vec![query; fields.len()];
    combine_parsed(&queries, fields, occurs, analyzer)
}

/// Parses `queries[i]` with `fields[i]` as default field and joins the
/// results with `occurs[i]`.
pub fn combine(
    queries: &[&str],
    fields: &[&str],
    occurs: &[Occur],
    analyzer: Arc<dyn Analyzer>,
) -> Result<Query> {
    check_lengths("queries.len() != fields.len()", queries.len(), fields.len())?;
    check_lengths("queries.len() != occurs.len()", queries.len(), occurs.len())?;
    combine_parsed(queries, fields, occurs, analyzer)
}

fn combine_parsed(
    queries: &[&str],
    fields: &[&str],
    occurs: &[Occur],
    analyzer: Arc<dyn Analyzer>,
) -> Result<Query> {
    let mut combined = BooleanQuery::new(false, BooleanQuery::DEFAULT_MAX_CLAUSE_COUNT);

    for ((query, field), occur) in queries.iter().zip(fields).zip(occurs) {
        let parser = QueryParser::with_factory(
            ParserConfig::new(*field),
            Arc::clone(&analyzer),
            SingleField,
        );
        let parsed = parser.parse(query)?;

        if matches!(&parsed, Query::Boolean(parsed) if parsed.clauses.is_empty()) {
            continue;
        }

        combined
            .add(BooleanClause::new(parsed, *occur))
            .map_err(|error| Error::Parse {
                query: query.to_string(),
                source: error.into(),
            })?;
    }

    Ok(Query::Boolean(combined))
}
