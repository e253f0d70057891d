//! Lucene-style query string parsing.
//!
//! A [`QueryParser`] turns text such as
//! `title:"quick fox"~2 AND body:fox* -date:[2020 TO 2021]` into a [`Query`]
//! tree of boolean, term, phrase, wildcard, prefix, regexp, fuzzy and range
//! queries. Field text is run through an [`Analyzer`]; multi-term queries
//! are normalized by the parser itself.
//!
//! ```
//! use query_language::{QueryParser, StandardAnalyzer};
//!
//! let parser = QueryParser::new("body", StandardAnalyzer::english());
//! let query = parser.parse("title:Fox AND jump*").unwrap();
//! assert_eq!(query.to_query_string("body"), "+title:fox +jump*");
//! ```
//!
//! Clauses without a field can be expanded over several fields with a
//! [`MultiFieldQueryParser`]:
//!
//! ```
//! use query_language::{MultiFieldQueryParser, StandardAnalyzer};
//!
//! let parser = MultiFieldQueryParser::with_fields(["title", "body"], StandardAnalyzer::new());
//! assert_eq!(parser.parse("fox").unwrap().to_string(), "title:fox body:fox");
//! ```

pub mod analysis;
pub mod ast;
pub mod builder;
pub mod config;
pub mod date;
pub mod error;
pub mod escape;
pub mod factory;
pub mod lexer;
pub mod multi_field;
pub mod parser;

pub use analysis::{AnalyzedToken, Analyzer, KeywordAnalyzer, StandardAnalyzer, WhitespaceAnalyzer};
pub use ast::{BooleanClause, Occur, Query};
pub use config::{DateResolution, Locale, Operator, ParserConfig, RewriteMethod};
pub use error::{Error, Result, SyntaxError};
pub use escape::{discard_escape_char, escape};
pub use factory::{FieldQueryFactory, SingleField};
pub use multi_field::{combine, combine_fields, combine_queries, MultiFieldExpansion, MultiFieldQueryParser};
pub use parser::QueryParser;
