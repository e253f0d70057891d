//! Construction of query nodes from parsed clause text.
//!
//! [`QueryBuilder`] holds the rules that do not depend on which field a
//! clause ends up targeting: how conjunctions and modifiers become clause
//! occurrences, how analyzed text becomes a term, phrase or boolean query,
//! and how the multi-term queries (wildcard, prefix, regexp, fuzzy, range)
//! are normalized.

use tracing::trace;

use crate::{
    analysis::Analyzer,
    ast::{
        BooleanClause, BooleanQuery, FuzzyQuery, MultiPhraseQuery, Occur, PhraseQuery, PhraseTerm,
        PrefixQuery, Query, RegexpQuery, Term, TermRangeQuery, WildcardQuery,
    },
    config::{Operator, ParserConfig},
    date,
    error::SyntaxError,
};

/// How a clause is joined to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Conjunction {
    #[default]
    None,
    And,
    Or,
}

/// Explicit prefix on a clause: `+`, or `-`/`NOT`/`!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    #[default]
    None,
    Not,
    Required,
}

#[derive(Clone, Copy)]
pub struct QueryBuilder<'a> {
    config: &'a ParserConfig,
    analyzer: &'a dyn Analyzer,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(config: &'a ParserConfig, analyzer: &'a dyn Analyzer) -> Self {
        Self { config, analyzer }
    }

    pub fn config(&self) -> &'a ParserConfig {
        self.config
    }

    pub fn analyzer(&self) -> &'a dyn Analyzer {
        self.analyzer
    }

    fn default_occur(&self) -> Occur {
        match self.config.default_operator {
            Operator::And => Occur::Must,
            Operator::Or => Occur::Should,
        }
    }

    /// Appends `query` to `clauses`, first adjusting the previous clause for
    /// an explicit conjunction. A `None` query still adjusts the previous
    /// clause but adds nothing.
    pub fn add_clause(
        &self,
        clauses: &mut Vec<BooleanClause>,
        conjunction: Conjunction,
        modifier: Modifier,
        query: Option<Query>,
    ) {
        if let Some(previous) = clauses.last_mut() {
            if conjunction == Conjunction::And && !previous.is_prohibited() {
                previous.occur = Occur::Must;
            }

            // `a OR b` under AND has already made `a` required.
            if self.config.default_operator == Operator::And
                && conjunction == Conjunction::Or
                && !previous.is_prohibited()
            {
                previous.occur = Occur::Should;
            }
        }

        let Some(query) = query else {
            return;
        };

        let prohibited = modifier == Modifier::Not;
        let required = match self.config.default_operator {
            Operator::Or => {
                modifier == Modifier::Required || (conjunction == Conjunction::And && !prohibited)
            }
            Operator::And => !prohibited && conjunction != Conjunction::Or,
        };

        let occur = match (required, prohibited) {
            (true, false) => Occur::Must,
            (false, false) => Occur::Should,
            (false, true) => Occur::MustNot,
            (true, true) => unreachable!("clause cannot be both required and prohibited"),
        };

        clauses.push(BooleanClause::new(query, occur));
    }

    /// Combines `clauses` into a boolean query; no clauses means no query.
    pub fn boolean_query(
        &self,
        clauses: Vec<BooleanClause>,
        disable_coord: bool,
    ) -> Result<Option<Query>, SyntaxError> {
        if clauses.is_empty() {
            return Ok(None);
        }

        let mut query = BooleanQuery::new(disable_coord, self.config.max_clause_count);
        for clause in clauses {
            query.add(clause)?;
        }

        Ok(Some(Query::Boolean(query)))
    }

    fn new_boolean(&self, disable_coord: bool) -> BooleanQuery {
        BooleanQuery::new(disable_coord, self.config.max_clause_count)
    }

    /// Analyzes `text` for `field` and builds a term, phrase or boolean query
    /// from the resulting terms.
    pub fn field_query(
        &self,
        field: &str,
        text: &str,
        quoted: bool,
    ) -> Result<Option<Query>, SyntaxError> {
        let quoted = quoted || self.config.auto_generate_phrase_queries;
        let tokens = self.analyzer.analyze(field, text);

        match tokens.as_slice() {
            [] => return Ok(None),
            [single] => return Ok(Some(Query::term(field, single.term.as_str()))),
            _ => {}
        }

        let stacked = tokens.iter().any(|token| token.position_increment == 0);
        let positions: u32 = tokens.iter().map(|token| token.position_increment).sum();

        if !quoted || (stacked && positions == 1) {
            if positions == 1 {
                let mut synonyms = self.new_boolean(true);
                for token in &tokens {
                    synonyms.add(BooleanClause::new(
                        Query::term(field, token.term.as_str()),
                        Occur::Should,
                    ))?;
                }
                return Ok(Some(Query::Boolean(synonyms)));
            }

            let occur = self.default_occur();
            let mut query = self.new_boolean(false);
            let mut current: Option<Query> = None;

            for token in &tokens {
                let term = Query::term(field, token.term.as_str());
                match current.take() {
                    Some(previous) if token.position_increment == 0 => {
                        let mut synonyms = match previous {
                            Query::Boolean(synonyms) => synonyms,
                            other => {
                                let mut synonyms = self.new_boolean(true);
                                synonyms.add(BooleanClause::new(other, Occur::Should))?;
                                synonyms
                            }
                        };
                        synonyms.add(BooleanClause::new(term, Occur::Should))?;
                        current = Some(Query::Boolean(synonyms));
                    }
                    previous => {
                        if let Some(previous) = previous {
                            query.add(BooleanClause::new(previous, occur))?;
                        }
                        current = Some(term);
                    }
                }
            }

            if let Some(last) = current {
                query.add(BooleanClause::new(last, occur))?;
            }
            return Ok(Some(Query::Boolean(query)));
        }

        let mut position: i64 = -1;

        if stacked {
            let mut groups: Vec<(u32, Vec<String>)> = Vec::new();
            for token in &tokens {
                position += i64::from(token.position_increment);
                let at = position.max(0) as u32;
                match groups.last_mut() {
                    Some(group) if token.position_increment == 0 => {
                        group.1.push(token.term.clone())
                    }
                    _ => groups.push((at, vec![token.term.clone()])),
                }
            }

            return Ok(Some(Query::MultiPhrase(MultiPhraseQuery {
                field: field.to_string(),
                positions: groups,
                slop: self.config.phrase_slop,
                boost: 1.0,
            })));
        }

        let terms = tokens
            .iter()
            .map(|token| {
                position += i64::from(token.position_increment);
                PhraseTerm {
                    text: token.term.clone(),
                    position: position.max(0) as u32,
                }
            })
            .collect();

        Ok(Some(Query::Phrase(PhraseQuery {
            field: field.to_string(),
            terms,
            slop: self.config.phrase_slop,
            boost: 1.0,
        })))
    }

    /// Field query for quoted text, with `slop` applied to phrase results.
    pub fn phrase_query(
        &self,
        field: &str,
        text: &str,
        slop: u32,
    ) -> Result<Option<Query>, SyntaxError> {
        let mut query = self.field_query(field, text, true)?;
        if let Some(query) = &mut query {
            query.set_slop(slop);
        }
        Ok(query)
    }

    fn expanded(&self, term: &str) -> String {
        match self.config.lowercase_expanded_terms {
            true => term.to_lowercase(),
            false => term.to_string(),
        }
    }

    pub fn fuzzy_query(&self, field: &str, term: &str, min_similarity: f32) -> Query {
        let text = self.expanded(term);
        let max_edits = FuzzyQuery::float_to_edits(min_similarity, text.chars().count());

        Query::Fuzzy(FuzzyQuery {
            term: Term::new(field, text),
            max_edits,
            prefix_length: self.config.fuzzy_prefix_length,
            boost: 1.0,
        })
    }

    pub fn prefix_query(&self, field: &str, term: &str) -> Result<Query, SyntaxError> {
        if !self.config.allow_leading_wildcard && term.starts_with('*') {
            return Err(SyntaxError::LeadingWildcard {
                kind: "PrefixQuery",
                term: term.to_string(),
            });
        }

        Ok(Query::Prefix(PrefixQuery {
            prefix: Term::new(field, self.expanded(term)),
            rewrite: self.config.multi_term_rewrite_method,
            boost: 1.0,
        }))
    }

    /// `*:*` matches every document.
    pub fn wildcard_query(&self, field: &str, term: &str) -> Result<Query, SyntaxError> {
        if field == "*" && term == "*" {
            return Ok(Query::match_all());
        }

        if !self.config.allow_leading_wildcard && term.starts_with(&['*', '?'][..]) {
            return Err(SyntaxError::LeadingWildcard {
                kind: "WildcardQuery",
                term: term.to_string(),
            });
        }

        Ok(Query::Wildcard(WildcardQuery {
            term: Term::new(field, self.expanded(term)),
            rewrite: self.config.multi_term_rewrite_method,
            boost: 1.0,
        }))
    }

    pub fn regexp_query(&self, field: &str, term: &str) -> Query {
        Query::Regexp(RegexpQuery {
            term: Term::new(field, self.expanded(term)),
            rewrite: self.config.multi_term_rewrite_method,
            boost: 1.0,
        })
    }

    /// Term range over `field`. Endpoints that parse as dates are replaced
    /// by their encoding at the field's date resolution; an inclusive upper
    /// date covers its whole day. Other endpoints are kept as text.
    pub fn range_query(
        &self,
        field: &str,
        lower: Option<&str>,
        upper: Option<&str>,
        include_lower: bool,
        include_upper: bool,
    ) -> Result<Query, SyntaxError> {
        let resolution = self.config.date_resolution(Some(field));
        let endpoint = |text: &str, end_of_day: bool| -> Result<String, SyntaxError> {
            let text = self.expanded(text);
            let text = date::normalize(
                &text,
                self.config.locale,
                self.config.time_zone,
                resolution,
                end_of_day,
            )
            .unwrap_or(text);

            match self.config.analyze_range_terms {
                true => self.analyze_range_term(field, &text),
                false => Ok(text),
            }
        };

        let lower = lower.map(|text| endpoint(text, false)).transpose()?;
        let upper = upper.map(|text| endpoint(text, include_upper)).transpose()?;

        Ok(Query::TermRange(TermRangeQuery {
            field: field.to_string(),
            lower,
            upper,
            include_lower,
            include_upper,
            rewrite: self.config.multi_term_rewrite_method,
            boost: 1.0,
        }))
    }

    /// Runs a range endpoint through the analyzer, which must keep it as
    /// exactly one term.
    pub fn analyze_range_term(&self, field: &str, text: &str) -> Result<String, SyntaxError> {
        let mut tokens = self.analyzer.analyze(field, text);
        if tokens.len() != 1 {
            return Err(SyntaxError::RangeTermAnalysis {
                term: text.to_string(),
                count: tokens.len(),
            });
        }

        Ok(tokens.remove(0).term)
    }

    /// Applies a `^` boost. Unparsable boosts and missing queries are ignored.
    pub fn handle_boost(&self, query: Option<Query>, boost: Option<&str>) -> Option<Query> {
        let mut query = query?;
        if let Some(text) = boost {
            match text.parse::<f32>() {
                Ok(boost) => query.set_boost(boost),
                Err(_) => trace!(boost = text, "ignoring unparsable boost"),
            }
        }
        Some(query)
    }
}
