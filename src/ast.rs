//! The query tree produced by the parser.
//!
//! These types only describe a query; executing or scoring them is left to
//! the search engine that consumes the tree.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest edit distance a fuzzy query supports.
pub const MAXIMUM_SUPPORTED_DISTANCE: u32 = 2;

/// How a clause takes part in a boolean query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occur {
    Must,
    Should,
    MustNot,
}

impl Occur {
    fn prefix(self) -> &'static str {
        match self {
            Occur::Must => "+",
            Occur::Should => "",
            Occur::MustNot => "-",
        }
    }
}

/// How a multi-term query expands into index terms when it is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RewriteMethod {
    #[default]
    ConstantScoreAuto,
    ConstantScoreFilter,
    ConstantScoreBoolean,
    ScoringBoolean,
    TopTermsScoring(usize),
    TopTermsBoost(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    pub field: String,
    pub text: String,
}

impl Term {
    pub fn new(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("maxClauseCount is set to {max}")]
pub struct TooManyClauses {
    pub max: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanClause {
    pub query: Query,
    pub occur: Occur,
}

impl BooleanClause {
    pub fn new(query: Query, occur: Occur) -> Self {
        Self { query, occur }
    }

    pub fn is_prohibited(&self) -> bool {
        self.occur == Occur::MustNot
    }

    pub fn is_required(&self) -> bool {
        self.occur == Occur::Must
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    pub term: Term,
    pub boost: f32,
}

/// A phrase term and its position within the phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseTerm {
    pub text: String,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhraseQuery {
    pub field: String,
    pub terms: Vec<PhraseTerm>,
    pub slop: u32,
    pub boost: f32,
}

/// A phrase where each position may match any of several terms.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPhraseQuery {
    pub field: String,
    pub positions: Vec<(u32, Vec<String>)>,
    pub slop: u32,
    pub boost: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanQuery {
    pub clauses: Vec<BooleanClause>,
    pub disable_coord: bool,
    pub max_clause_count: usize,
    pub boost: f32,
}

impl BooleanQuery {
    pub const DEFAULT_MAX_CLAUSE_COUNT: usize = 1024;

    pub fn new(disable_coord: bool, max_clause_count: usize) -> Self {
        Self {
            clauses: Vec::new(),
            disable_coord,
            max_clause_count,
            boost: 1.0,
        }
    }

    pub fn add(&mut self, clause: BooleanClause) -> Result<(), TooManyClauses> {
        if self.clauses.len() >= self.max_clause_count {
            return Err(TooManyClauses {
                max: self.max_clause_count,
            });
        }

        self.clauses.push(clause);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WildcardQuery {
    pub term: Term,
    pub rewrite: RewriteMethod,
    pub boost: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixQuery {
    pub prefix: Term,
    pub rewrite: RewriteMethod,
    pub boost: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyQuery {
    pub term: Term,
    pub max_edits: u32,
    pub prefix_length: u32,
    pub boost: f32,
}

impl FuzzyQuery {
    /// Converts a similarity fraction into an edit distance for a term of
    /// `term_length` code points. Values of 1 or more are already distances.
    pub fn float_to_edits(min_similarity: f32, term_length: usize) -> u32 {
        if min_similarity >= 1.0 {
            min_similarity.min(MAXIMUM_SUPPORTED_DISTANCE as f32) as u32
        } else if min_similarity == 0.0 {
            0
        } else {
            let edits = ((1.0 - f64::from(min_similarity)) * term_length as f64) as u32;
            edits.min(MAXIMUM_SUPPORTED_DISTANCE)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegexpQuery {
    pub term: Term,
    pub rewrite: RewriteMethod,
    pub boost: f32,
}

/// Range over term text; `None` bounds are open.
#[derive(Debug, Clone, PartialEq)]
pub struct TermRangeQuery {
    pub field: String,
    pub lower: Option<String>,
    pub upper: Option<String>,
    pub include_lower: bool,
    pub include_upper: bool,
    pub rewrite: RewriteMethod,
    pub boost: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchAllDocsQuery {
    pub boost: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Term(TermQuery),
    Phrase(PhraseQuery),
    MultiPhrase(MultiPhraseQuery),
    Boolean(BooleanQuery),
    Wildcard(WildcardQuery),
    Prefix(PrefixQuery),
    Fuzzy(FuzzyQuery),
    Regexp(RegexpQuery),
    TermRange(TermRangeQuery),
    MatchAllDocs(MatchAllDocsQuery),
}

impl Query {
    pub fn term(field: impl Into<String>, text: impl Into<String>) -> Self {
        Query::Term(TermQuery {
            term: Term::new(field, text),
            boost: 1.0,
        })
    }

    pub fn match_all() -> Self {
        Query::MatchAllDocs(MatchAllDocsQuery { boost: 1.0 })
    }

    pub fn boost(&self) -> f32 {
        match self {
            Query::Term(q) => q.boost,
            Query::Phrase(q) => q.boost,
            Query::MultiPhrase(q) => q.boost,
            Query::Boolean(q) => q.boost,
            Query::Wildcard(q) => q.boost,
            Query::Prefix(q) => q.boost,
            Query::Fuzzy(q) => q.boost,
            Query::Regexp(q) => q.boost,
            Query::TermRange(q) => q.boost,
            Query::MatchAllDocs(q) => q.boost,
        }
    }

    pub fn set_boost(&mut self, boost: f32) {
        let slot = match self {
            Query::Term(q) => &mut q.boost,
            Query::Phrase(q) => &mut q.boost,
            Query::MultiPhrase(q) => &mut q.boost,
            Query::Boolean(q) => &mut q.boost,
            Query::Wildcard(q) => &mut q.boost,
            Query::Prefix(q) => &mut q.boost,
            Query::Fuzzy(q) => &mut q.boost,
            Query::Regexp(q) => &mut q.boost,
            Query::TermRange(q) => &mut q.boost,
            Query::MatchAllDocs(q) => &mut q.boost,
        };
        *slot = boost;
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.set_boost(boost);
        self
    }

    /// Sets the slop of phrase and multi-phrase queries; other queries are unchanged.
    pub fn set_slop(&mut self, slop: u32) {
        match self {
            Query::Phrase(q) => q.slop = slop,
            Query::MultiPhrase(q) => q.slop = slop,
            _ => {}
        }
    }

    /// Renders the query in query-string syntax, omitting the field prefix
    /// wherever it equals `default_field`.
    pub fn to_query_string(&self, default_field: &str) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out, default_field);
        out
    }

    fn write_to(&self, out: &mut String, default_field: &str) -> fmt::Result {
        let field_prefix = |out: &mut String, field: &str| {
            if field != default_field {
                out.push_str(field);
                out.push(':');
            }
        };

        match self {
            Query::Term(q) => {
                field_prefix(out, &q.term.field);
                out.push_str(&q.term.text);
            }
            Query::Phrase(q) => {
                field_prefix(out, &q.field);
                let last = q.terms.iter().map(|t| t.position).max().unwrap_or(0);
                let mut pieces: Vec<Option<String>> = vec![None; last as usize + 1];
                for term in &q.terms {
                    let piece = &mut pieces[term.position as usize];
                    match piece {
                        Some(existing) => {
                            existing.push('|');
                            existing.push_str(&term.text);
                        }
                        None => *piece = Some(term.text.clone()),
                    }
                }
                if q.terms.is_empty() {
                    pieces.clear();
                }

                out.push('"');
                for (i, piece) in pieces.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(piece.as_deref().unwrap_or("?"));
                }
                out.push('"');
                if q.slop != 0 {
                    write!(out, "~{}", q.slop)?;
                }
            }
            Query::MultiPhrase(q) => {
                field_prefix(out, &q.field);
                out.push('"');
                let mut last: Option<u32> = None;
                for (position, terms) in &q.positions {
                    if let Some(last) = last {
                        out.push(' ');
                        for _ in 1..position.saturating_sub(last) {
                            out.push_str("? ");
                        }
                    }
                    if terms.len() > 1 {
                        write!(out, "({})", terms.join(" "))?;
                    } else {
                        out.push_str(terms.first().map_or("", String::as_str));
                    }
                    last = Some(*position);
                }
                out.push('"');
                if q.slop != 0 {
                    write!(out, "~{}", q.slop)?;
                }
            }
            Query::Boolean(q) => {
                let parens = q.boost != 1.0;
                if parens {
                    out.push('(');
                }
                for (i, clause) in q.clauses.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(clause.occur.prefix());
                    match &clause.query {
                        nested @ Query::Boolean(_) => {
                            out.push('(');
                            nested.write_to(out, default_field)?;
                            out.push(')');
                        }
                        other => other.write_to(out, default_field)?,
                    }
                }
                if parens {
                    out.push(')');
                }
            }
            Query::Wildcard(q) => {
                field_prefix(out, &q.term.field);
                out.push_str(&q.term.text);
            }
            Query::Prefix(q) => {
                field_prefix(out, &q.prefix.field);
                out.push_str(&q.prefix.text);
                out.push('*');
            }
            Query::Fuzzy(q) => {
                field_prefix(out, &q.term.field);
                write!(out, "{}~{}", q.term.text, q.max_edits)?;
            }
            Query::Regexp(q) => {
                field_prefix(out, &q.term.field);
                write!(out, "/{}/", q.term.text)?;
            }
            Query::TermRange(q) => {
                field_prefix(out, &q.field);
                write!(
                    out,
                    "{}{} TO {}{}",
                    if q.include_lower { '[' } else { '{' },
                    q.lower.as_deref().unwrap_or("*"),
                    q.upper.as_deref().unwrap_or("*"),
                    if q.include_upper { ']' } else { '}' },
                )?;
            }
            Query::MatchAllDocs(_) => out.push_str("*:*"),
        }

        let boost = self.boost();
        if boost != 1.0 {
            write!(out, "^{boost:?}")?;
        }

        Ok(())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string(""))
    }
}
