//! Query grammar driver.
//!
//! ```text
//! TopLevelQuery := Query EOF
//! Query         := Modifiers Clause (Conjunction Modifiers Clause)*
//! Conjunction   := [ AND | OR ]
//! Modifiers     := [ "+" | "-" | NOT ]
//! Clause        := [ (TERM | "*") ":" ] ( Term | "(" Query ")" [ "^" NUMBER ] )
//! Term          := ( TERM | "*" | PREFIXTERM | WILDTERM | REGEXPTERM | NUMBER | BAREOPER )
//!                      [ FUZZY_SLOP ] [ "^" NUMBER [ FUZZY_SLOP ] ]
//!                | ( "[" | "{" ) Endpoint TO Endpoint ( "]" | "}" ) [ "^" NUMBER ]
//!                | QUOTED [ FUZZY_SLOP ] [ "^" NUMBER ]
//! Endpoint      := RANGE_GOOP | RANGE_QUOTED | TO
//! ```
//!
//! The driver only walks the grammar. Field resolution is delegated to a
//! [`FieldQueryFactory`] and query construction to a [`QueryBuilder`].

use std::{collections::VecDeque, str::Chars, sync::Arc};

use tracing::debug;

use crate::{
    analysis::Analyzer,
    ast::{BooleanQuery, Query},
    builder::{Conjunction, Modifier, QueryBuilder},
    config::ParserConfig,
    error::{Error, GrammarError, Result, SyntaxError},
    escape::discard_escape_char,
    factory::{FieldQueryFactory, SingleField},
    lexer::{Lexer, Token, TokenKind},
};

/// Tokens that can begin a clause once its modifiers are consumed.
const CLAUSE_START: &[TokenKind] = &[
    TokenKind::BareOper,
    TokenKind::LParen,
    TokenKind::Star,
    TokenKind::Quoted,
    TokenKind::Term,
    TokenKind::PrefixTerm,
    TokenKind::WildTerm,
    TokenKind::RegexpTerm,
    TokenKind::RangeInStart,
    TokenKind::RangeExStart,
    TokenKind::Number,
];

/// Tokens that may precede a clause start in the clause loop.
const CLAUSE_PREFIX: &[TokenKind] = &[
    TokenKind::And,
    TokenKind::Or,
    TokenKind::Not,
    TokenKind::Plus,
    TokenKind::Minus,
];

const RANGE_ENDPOINT: &[TokenKind] = &[
    TokenKind::RangeGoop,
    TokenKind::RangeQuoted,
    TokenKind::RangeTo,
];

/// Parses query strings into [`Query`] trees.
///
/// The parser owns its configuration and analyzer and can be reused for any
/// number of queries. `F` decides which field a clause without an explicit
/// field targets; see [`MultiFieldQueryParser`](crate::MultiFieldQueryParser).
#[derive(Clone)]
pub struct QueryParser<F = SingleField> {
    config: ParserConfig,
    analyzer: Arc<dyn Analyzer>,
    factory: F,
}

impl QueryParser<SingleField> {
    /// Parser targeting `default_field` for clauses without a field.
    pub fn new(default_field: impl Into<String>, analyzer: impl Analyzer + 'static) -> Self {
        Self::with_factory(ParserConfig::new(default_field), Arc::new(analyzer), SingleField)
    }
}

impl<F: FieldQueryFactory> QueryParser<F> {
    pub fn with_factory(config: ParserConfig, analyzer: Arc<dyn Analyzer>, factory: F) -> Self {
        Self {
            config,
            analyzer,
            factory,
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ParserConfig {
        &mut self.config
    }

    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    /// Parses `query`. A query whose clauses all analyze to nothing yields an
    /// empty boolean query.
    pub fn parse(&self, query: &str) -> Result<Query> {
        debug!(query, "parsing query");

        let builder = QueryBuilder::new(&self.config, self.analyzer.as_ref());
        let parsed = Parser::new(query, builder, &self.factory).top_level_query();

        match parsed {
            Ok(parsed) => {
                let parsed = parsed.unwrap_or_else(|| {
                    Query::Boolean(BooleanQuery::new(false, self.config.max_clause_count))
                });
                debug!(query, clauses = clause_count(&parsed), "parsed query");
                Ok(parsed)
            }
            Err(source) => {
                debug!(query, error = %source, "query rejected");
                Err(Error::Parse {
                    query: query.to_string(),
                    source,
                })
            }
        }
    }
}

fn clause_count(query: &Query) -> usize {
    match query {
        Query::Boolean(query) => query.clauses.len(),
        _ => 1,
    }
}

type ParseResult<T> = std::result::Result<T, SyntaxError>;

struct Parser<'p, F> {
    lexer: Lexer<Chars<'p>>,
    lookahead: VecDeque<Token>,
    /// The last token consumed.
    current: Option<Token>,
    builder: QueryBuilder<'p>,
    factory: &'p F,
    depth: usize,
}

impl<'p, F: FieldQueryFactory> Parser<'p, F> {
    fn new(text: &'p str, builder: QueryBuilder<'p>, factory: &'p F) -> Self {
        Self {
            lexer: Lexer::new(text),
            lookahead: VecDeque::with_capacity(2),
            current: None,
            builder,
            factory,
            depth: 0,
        }
    }

    fn peek(&mut self, n: usize) -> ParseResult<&Token> {
        while self.lookahead.len() <= n {
            let token = self.lexer.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(&self.lookahead[n])
    }

    fn peek_kind(&mut self, n: usize) -> ParseResult<TokenKind> {
        self.peek(n).map(|token| token.kind)
    }

    fn advance(&mut self) -> ParseResult<Token> {
        let token = match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        self.current = Some(token.clone());
        Ok(token)
    }

    fn accept(&mut self, kind: TokenKind) -> ParseResult<Option<Token>> {
        if self.peek_kind(0)? == kind {
            return self.advance().map(Some);
        }
        Ok(None)
    }

    fn expect(&mut self, kinds: &[TokenKind]) -> ParseResult<Token> {
        if kinds.contains(&self.peek_kind(0)?) {
            return self.advance();
        }
        Err(self.unexpected(kinds))
    }

    fn unexpected(&mut self, expected: &[TokenKind]) -> SyntaxError {
        let encountered = match self.peek(0) {
            Ok(token) => token.clone(),
            Err(error) => return error,
        };
        let expected = expected.iter().map(|kind| vec![*kind]).collect();

        GrammarError::new(self.current.clone(), encountered, expected).into()
    }

    /// Consumes `end`, which closes a clause list.
    fn expect_end(&mut self, end: TokenKind) -> ParseResult<Token> {
        if self.peek_kind(0)? == end {
            return self.advance();
        }

        let mut expected = vec![end];
        expected.extend_from_slice(CLAUSE_PREFIX);
        expected.extend_from_slice(CLAUSE_START);
        Err(self.unexpected(&expected))
    }

    fn top_level_query(&mut self) -> ParseResult<Option<Query>> {
        let query = self.query(None)?;
        self.expect_end(TokenKind::Eof)?;
        Ok(query)
    }

    fn query(&mut self, field: Option<&str>) -> ParseResult<Option<Query>> {
        let mut clauses = Vec::new();

        let modifier = self.modifiers()?;
        let query = self.clause(field)?;
        let bare = modifier == Modifier::None && query.is_some();
        self.builder.add_clause(&mut clauses, Conjunction::None, modifier, query);

        while self.continues()? {
            let conjunction = self.conjunction()?;
            let modifier = self.modifiers()?;
            let query = self.clause(field)?;
            self.builder.add_clause(&mut clauses, conjunction, modifier, query);
        }

        if bare && clauses.len() == 1 {
            return Ok(clauses.pop().map(|clause| clause.query));
        }

        self.builder.boolean_query(clauses, false)
    }

    fn continues(&mut self) -> ParseResult<bool> {
        let kind = self.peek_kind(0)?;
        Ok(CLAUSE_PREFIX.contains(&kind) || CLAUSE_START.contains(&kind))
    }

    fn conjunction(&mut self) -> ParseResult<Conjunction> {
        let conjunction = match self.peek_kind(0)? {
            TokenKind::And => Conjunction::And,
            TokenKind::Or => Conjunction::Or,
            _ => return Ok(Conjunction::None),
        };
        self.advance()?;
        Ok(conjunction)
    }

    fn modifiers(&mut self) -> ParseResult<Modifier> {
        let modifier = match self.peek_kind(0)? {
            TokenKind::Plus => Modifier::Required,
            TokenKind::Minus | TokenKind::Not => Modifier::Not,
            _ => return Ok(Modifier::None),
        };
        self.advance()?;
        Ok(modifier)
    }

    fn clause(&mut self, field: Option<&str>) -> ParseResult<Option<Query>> {
        let explicit = self.field_name()?;
        let field = explicit.as_deref().or(field);

        if self.accept(TokenKind::LParen)?.is_none() {
            return self.term(field);
        }

        self.depth += 1;
        let max = self.builder.config().max_nesting_depth;
        if self.depth > max {
            return Err(SyntaxError::NestingTooDeep { max });
        }

        let query = self.query(field)?;
        self.expect_end(TokenKind::RParen)?;
        self.depth -= 1;

        let boost = self.boost()?;
        Ok(self.builder.handle_boost(query, boost.as_deref()))
    }

    /// `name:` or `*:` in front of a clause.
    fn field_name(&mut self) -> ParseResult<Option<String>> {
        let kind = self.peek_kind(0)?;
        if !matches!(kind, TokenKind::Term | TokenKind::Star)
            || self.peek_kind(1)? != TokenKind::Colon
        {
            return Ok(None);
        }

        let name = self.advance()?;
        self.advance()?;

        match kind {
            TokenKind::Star => Ok(Some(String::from("*"))),
            _ => Ok(Some(discard_escape_char(name.image())?)),
        }
    }

    fn boost(&mut self) -> ParseResult<Option<String>> {
        if self.accept(TokenKind::Carat)?.is_none() {
            return Ok(None);
        }

        let number = self.expect(&[TokenKind::Number])?;
        Ok(Some(number.span.value))
    }

    fn term(&mut self, field: Option<&str>) -> ParseResult<Option<Query>> {
        match self.peek_kind(0)? {
            TokenKind::Term
            | TokenKind::Star
            | TokenKind::PrefixTerm
            | TokenKind::WildTerm
            | TokenKind::RegexpTerm
            | TokenKind::Number
            | TokenKind::BareOper => {
                let token = self.advance()?;
                let mut fuzzy = self.accept(TokenKind::FuzzySlop)?;
                let boost = self.boost()?;
                if boost.is_some() {
                    if let Some(slop) = self.accept(TokenKind::FuzzySlop)? {
                        fuzzy = Some(slop);
                    }
                }

                let query = self.bare_token_query(field, &token, fuzzy.as_ref())?;
                Ok(self.builder.handle_boost(query, boost.as_deref()))
            }
            TokenKind::RangeInStart | TokenKind::RangeExStart => {
                let start = self.advance()?;
                let lower = self.expect(RANGE_ENDPOINT)?;
                self.expect(&[TokenKind::RangeTo])?;
                let upper = self.expect(RANGE_ENDPOINT)?;
                let end = self.expect(&[TokenKind::RangeInEnd, TokenKind::RangeExEnd])?;
                let boost = self.boost()?;

                let lower = range_endpoint(&lower)?;
                let upper = range_endpoint(&upper)?;
                let query = self.factory.range_query(
                    &self.builder,
                    field,
                    lower.as_deref(),
                    upper.as_deref(),
                    start.kind == TokenKind::RangeInStart,
                    end.kind == TokenKind::RangeInEnd,
                )?;
                Ok(self.builder.handle_boost(query, boost.as_deref()))
            }
            TokenKind::Quoted => {
                let token = self.advance()?;
                let slop = self.accept(TokenKind::FuzzySlop)?;
                let boost = self.boost()?;

                let query = self.quoted_term(field, &token, slop.as_ref())?;
                Ok(self.builder.handle_boost(query, boost.as_deref()))
            }
            _ => Err(self.unexpected(CLAUSE_START)),
        }
    }

    fn bare_token_query(
        &self,
        field: Option<&str>,
        token: &Token,
        fuzzy: Option<&Token>,
    ) -> ParseResult<Option<Query>> {
        let image = token.image();

        match token.kind {
            TokenKind::Star | TokenKind::WildTerm => {
                self.factory.wildcard_query(&self.builder, field, image)
            }
            TokenKind::PrefixTerm => {
                let stem = discard_escape_char(image.strip_suffix('*').unwrap_or(image))?;
                self.factory.prefix_query(&self.builder, field, &stem)
            }
            TokenKind::RegexpTerm => {
                let pattern = image
                    .strip_prefix('/')
                    .and_then(|pattern| pattern.strip_suffix('/'))
                    .unwrap_or(image);
                self.factory.regexp_query(&self.builder, field, pattern)
            }
            kind => {
                let text = match kind {
                    TokenKind::BareOper => image.chars().take(1).collect(),
                    _ => discard_escape_char(image)?,
                };

                match fuzzy {
                    Some(slop) => self.bare_fuzzy(field, &text, slop),
                    None => self.factory.term_query(&self.builder, field, &text, false),
                }
            }
        }
    }

    fn bare_fuzzy(
        &self,
        field: Option<&str>,
        term: &str,
        slop: &Token,
    ) -> ParseResult<Option<Query>> {
        let similarity = slop
            .image()
            .trim_start_matches('~')
            .parse::<f32>()
            .unwrap_or(self.builder.config().fuzzy_min_similarity);

        if similarity < 0.0 {
            return Err(SyntaxError::InvalidFuzzySimilarity(similarity));
        }
        if similarity >= 1.0 && similarity.fract() != 0.0 {
            return Err(SyntaxError::FractionalEditDistance(similarity));
        }

        self.factory.fuzzy_query(&self.builder, field, term, similarity)
    }

    fn quoted_term(
        &self,
        field: Option<&str>,
        token: &Token,
        slop: Option<&Token>,
    ) -> ParseResult<Option<Query>> {
        let default_slop = self.builder.config().phrase_slop;
        let slop = slop
            .and_then(|slop| slop.image().trim_start_matches('~').parse::<f32>().ok())
            .map_or(default_slop, |slop| slop as u32);

        let image = token.image();
        let inner = image
            .strip_prefix('"')
            .and_then(|inner| inner.strip_suffix('"'))
            .unwrap_or(image);
        let text = discard_escape_char(inner)?;

        self.factory.phrase_query(&self.builder, field, &text, slop)
    }
}

/// Unquoted `*` is an open end; quoted endpoints lose their quotes.
fn range_endpoint(token: &Token) -> ParseResult<Option<String>> {
    let image = token.image();
    let text = match token.kind {
        TokenKind::RangeQuoted => image
            .strip_prefix('"')
            .and_then(|inner| inner.strip_suffix('"'))
            .unwrap_or(image),
        _ if image == "*" => return Ok(None),
        _ => image,
    };

    Ok(Some(discard_escape_char(text)?))
}
