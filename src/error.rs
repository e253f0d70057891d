//! Error types for lexing, parsing and building queries.
//!
//! Everything raised while parsing a single query string is a [`SyntaxError`].
//! The public [`QueryParser::parse`](crate::QueryParser::parse) boundary wraps it
//! in [`Error::Parse`] together with the original query text, so callers can
//! report a failure from the top-level message alone.

use std::fmt;

use thiserror::Error;

use crate::{
    ast::TooManyClauses,
    lexer::{LexState, Token, TokenKind},
};

/// Raised by the lexer when no token matches at the current position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Lexical error at line {line}, column {column}.  Encountered: {} after : \"{}\"",
    describe_char(.character),
    .after.escape_default()
)]
pub struct LexicalError {
    /// Whether input ran out before a token could be completed.
    pub eof_seen: bool,
    pub state: LexState,
    pub line: u32,
    pub column: u32,
    /// Text consumed since the last complete token.
    pub after: String,
    /// The character that could not be matched; `None` at end of input.
    pub character: Option<char>,
}

fn describe_char(character: &Option<char>) -> String {
    match character {
        Some(c) => format!("\"{}\" ({}),", c.escape_default(), u32::from(*c)),
        None => String::from("<EOF>"),
    }
}

/// Raised when the token stream does not match the grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarError {
    /// The last token consumed successfully.
    pub current: Option<Token>,
    /// The token that could not be consumed.
    pub encountered: Token,
    /// Token sequences that would have been accepted instead.
    pub expected: Vec<Vec<TokenKind>>,
    /// Closest keyword the encountered text resembles, if any.
    pub hint: Option<&'static str>,
}

impl GrammarError {
    pub fn new(current: Option<Token>, encountered: Token, expected: Vec<Vec<TokenKind>>) -> Self {
        let hint = suggest_keyword(encountered.image(), &expected);
        Self {
            current,
            encountered,
            expected,
            hint,
        }
    }
}

fn suggest_keyword(image: &str, expected: &[Vec<TokenKind>]) -> Option<&'static str> {
    if image.is_empty() {
        return None;
    }

    let image = image.to_ascii_uppercase();
    expected
        .iter()
        .flatten()
        .filter_map(|kind| kind.literal())
        .filter(|literal| literal.chars().all(|c| c.is_ascii_alphabetic()))
        .map(|literal| (strsim::jaro_winkler(&image, literal), literal))
        .filter(|(similarity, _)| *similarity >= 0.9)
        .max_by(|(s1, _), (s2, _)| s1.total_cmp(s2))
        .map(|(_, literal)| literal)
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encountered = match self.encountered.kind {
            TokenKind::Eof => TokenKind::Eof.image().to_string(),
            _ => self.encountered.image().escape_default().to_string(),
        };

        write!(
            f,
            "Encountered \"{}\" at line {}, column {}.",
            encountered, self.encountered.line, self.encountered.column
        )?;

        let alternatives: Vec<String> = self
            .expected
            .iter()
            .map(|sequence| {
                sequence
                    .iter()
                    .map(|kind| kind.image())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        match alternatives.len() {
            0 => {}
            1 => write!(f, " Was expecting: {}", alternatives[0])?,
            _ => write!(f, " Was expecting one of: {}", alternatives.join(", "))?,
        }

        if let Some(hint) = self.hint {
            write!(f, " Did you mean \"{hint}\"?")?;
        }

        Ok(())
    }
}

impl std::error::Error for GrammarError {}

/// Raised while removing backslash escapes from query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EscapeError {
    #[error("Truncated unicode escape sequence.")]
    TruncatedEscape,
    #[error("Term can not end with escape character.")]
    TrailingEscape,
    #[error("Non-hex character in Unicode escape sequence: {0}")]
    InvalidHexDigit(char),
    #[error("Unicode escape sequence leaves an unpaired surrogate.")]
    UnpairedSurrogate,
}

/// Any failure raised while parsing one query string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Escape(#[from] EscapeError),
    #[error("'*' or '?' not allowed as first character in {kind}: {term}")]
    LeadingWildcard { kind: &'static str, term: String },
    #[error("Minimum similarity for a FuzzyQuery has to be between 0.0f and 1.0f !")]
    InvalidFuzzySimilarity(f32),
    #[error("Fractional edit distances are not allowed!")]
    FractionalEditDistance(f32),
    #[error("analyzer returned {count} terms for multiTerm term: {term}")]
    RangeTermAnalysis { term: String, count: usize },
    #[error("too many boolean clauses")]
    TooManyClauses(#[from] TooManyClauses),
    #[error("query nests more than {max} groups")]
    NestingTooDeep { max: usize },
}

/// Error returned by the public parsing entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Cannot parse '{query}': {source}")]
    Parse { query: String, source: SyntaxError },
    #[error("{what}: {left} != {right}")]
    ArgumentLengthMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },
}

impl Error {
    /// The failure behind a [`Error::Parse`].
    pub fn syntax(&self) -> Option<&SyntaxError> {
        match self {
            Error::Parse { source, .. } => Some(source),
            Error::ArgumentLengthMismatch { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Span;

    fn token(kind: TokenKind, image: &str, column: u32) -> Token {
        Token {
            kind,
            span: Span::new(image, column as usize - 1, column as usize - 1 + image.len()),
            line: 1,
            column,
        }
    }

    #[test]
    fn lexical_error_display() {
        let error = LexicalError {
            eof_seen: false,
            state: LexState::Default,
            line: 1,
            column: 3,
            after: String::new(),
            character: Some(']'),
        };

        assert_eq!(
            error.to_string(),
            "Lexical error at line 1, column 3.  Encountered: \"]\" (93), after : \"\""
        );
    }

    #[test]
    fn lexical_error_at_eof() {
        let error = LexicalError {
            eof_seen: true,
            state: LexState::Default,
            line: 1,
            column: 4,
            after: String::from("\"ab"),
            character: None,
        };

        assert_eq!(
            error.to_string(),
            "Lexical error at line 1, column 4.  Encountered: <EOF> after : \"\\\"ab\""
        );
    }

    #[test]
    fn grammar_error_lists_alternatives() {
        let error = GrammarError::new(
            Some(token(TokenKind::Term, "a", 1)),
            token(TokenKind::RParen, ")", 3),
            vec![vec![TokenKind::Eof], vec![TokenKind::Term]],
        );

        assert_eq!(
            error.to_string(),
            "Encountered \")\" at line 1, column 3. Was expecting one of: <EOF>, <TERM>"
        );
    }

    #[test]
    fn grammar_error_suggests_keyword() {
        let error = GrammarError::new(
            None,
            token(TokenKind::RangeGoop, "to", 4),
            vec![vec![TokenKind::RangeTo]],
        );

        assert_eq!(error.hint, Some("TO"));
        assert!(error.to_string().ends_with("Was expecting: \"TO\" Did you mean \"TO\"?"));
    }

    #[test]
    fn parse_error_wraps_query() {
        let error = Error::Parse {
            query: String::from("a\\"),
            source: SyntaxError::Escape(EscapeError::TrailingEscape),
        };

        assert_eq!(
            error.to_string(),
            "Cannot parse 'a\\': Term can not end with escape character."
        );
        assert_eq!(
            error.syntax(),
            Some(&SyntaxError::Escape(EscapeError::TrailingEscape))
        );
    }
}
