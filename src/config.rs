//! Parser settings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::UtcOffset;

pub use crate::ast::RewriteMethod;

/// Occurrence given to clauses that carry no explicit conjunction or modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    Or,
    And,
}

/// Granularity that date range endpoints are truncated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum DateResolution {
    Year,
    Month,
    #[default]
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

/// Decides the short date pattern tried on range endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// `M/d/yy`
    #[default]
    EnUs,
    /// `dd/MM/yy`
    EnGb,
    /// `dd.MM.yy`
    De,
    /// `dd/MM/yy`
    Fr,
    /// `yy/MM/dd`
    Ja,
}

/// Settings shared by every parse of one parser instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Field used for clauses that do not name one.
    pub default_field: String,
    pub default_operator: Operator,
    /// Lowercase wildcard, prefix, regexp, fuzzy and range terms.
    pub lowercase_expanded_terms: bool,
    pub allow_leading_wildcard: bool,
    pub phrase_slop: u32,
    pub fuzzy_min_similarity: f32,
    pub fuzzy_prefix_length: u32,
    pub multi_term_rewrite_method: RewriteMethod,
    pub locale: Locale,
    pub time_zone: UtcOffset,
    pub default_date_resolution: DateResolution,
    pub field_date_resolutions: HashMap<String, DateResolution>,
    pub analyze_range_terms: bool,
    pub auto_generate_phrase_queries: bool,
    pub max_clause_count: usize,
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_field: String::from("text"),
            default_operator: Operator::Or,
            lowercase_expanded_terms: true,
            allow_leading_wildcard: false,
            phrase_slop: 0,
            fuzzy_min_similarity: 2.0,
            fuzzy_prefix_length: 0,
            multi_term_rewrite_method: RewriteMethod::ConstantScoreAuto,
            locale: Locale::EnUs,
            time_zone: UtcOffset::UTC,
            default_date_resolution: DateResolution::Day,
            field_date_resolutions: HashMap::new(),
            analyze_range_terms: false,
            auto_generate_phrase_queries: false,
            max_clause_count: 1024,
            max_nesting_depth: 128,
        }
    }
}

impl ParserConfig {
    pub fn new(default_field: impl Into<String>) -> Self {
        Self {
            default_field: default_field.into(),
            ..Self::default()
        }
    }

    /// Resolution for `field`, falling back to the default resolution.
    pub fn date_resolution(&self, field: Option<&str>) -> DateResolution {
        field
            .and_then(|field| self.field_date_resolutions.get(field))
            .copied()
            .unwrap_or(self.default_date_resolution)
    }

    pub fn with_default_field(mut self, field: impl Into<String>) -> Self {
        self.default_field = field.into();
        self
    }

    pub fn with_default_operator(mut self, operator: Operator) -> Self {
        self.default_operator = operator;
        self
    }

    pub fn with_lowercase_expanded_terms(mut self, lowercase: bool) -> Self {
        self.lowercase_expanded_terms = lowercase;
        self
    }

    pub fn with_allow_leading_wildcard(mut self, allow: bool) -> Self {
        self.allow_leading_wildcard = allow;
        self
    }

    pub fn with_phrase_slop(mut self, slop: u32) -> Self {
        self.phrase_slop = slop;
        self
    }

    pub fn with_fuzzy_min_similarity(mut self, similarity: f32) -> Self {
        self.fuzzy_min_similarity = similarity;
        self
    }

    pub fn with_fuzzy_prefix_length(mut self, length: u32) -> Self {
        self.fuzzy_prefix_length = length;
        self
    }

    pub fn with_multi_term_rewrite_method(mut self, method: RewriteMethod) -> Self {
        self.multi_term_rewrite_method = method;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_time_zone(mut self, offset: UtcOffset) -> Self {
        self.time_zone = offset;
        self
    }

    pub fn with_date_resolution(mut self, resolution: DateResolution) -> Self {
        self.default_date_resolution = resolution;
        self
    }

    pub fn with_field_date_resolution(
        mut self,
        field: impl Into<String>,
        resolution: DateResolution,
    ) -> Self {
        self.field_date_resolutions.insert(field.into(), resolution);
        self
    }

    pub fn with_analyze_range_terms(mut self, analyze: bool) -> Self {
        self.analyze_range_terms = analyze;
        self
    }

    pub fn with_auto_generate_phrase_queries(mut self, auto: bool) -> Self {
        self.auto_generate_phrase_queries = auto;
        self
    }

    pub fn with_max_clause_count(mut self, max: usize) -> Self {
        self.max_clause_count = max;
        self
    }

    pub fn with_max_nesting_depth(mut self, max: usize) -> Self {
        self.max_nesting_depth = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_resolution_falls_back_to_default() {
        let config = ParserConfig::default()
            .with_date_resolution(DateResolution::Month)
            .with_field_date_resolution("created", DateResolution::Hour);

        assert_eq!(config.date_resolution(Some("created")), DateResolution::Hour);
        assert_eq!(config.date_resolution(Some("modified")), DateResolution::Month);
        assert_eq!(config.date_resolution(None), DateResolution::Month);
    }

    #[test]
    fn new_keeps_defaults() {
        let config = ParserConfig::new("body");
        assert_eq!(config.default_field, "body");
        assert_eq!(config.default_operator, Operator::Or);
        assert!(config.lowercase_expanded_terms);
        assert_eq!(config.fuzzy_min_similarity, 2.0);
    }
}
