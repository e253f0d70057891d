//! Text analysis used to turn field text into index terms.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref REGEX_WORD: Regex = Regex::new(r"\w+").unwrap();
}

/// Words dropped by [`StandardAnalyzer::english`].
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// One analyzed term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedToken {
    pub term: String,
    /// Distance from the previous token's position; 0 stacks the token on
    /// the previous position as a synonym.
    pub position_increment: u32,
}

impl AnalyzedToken {
    pub fn new(term: impl Into<String>, position_increment: u32) -> Self {
        Self {
            term: term.into(),
            position_increment,
        }
    }
}

/// Turns a field's raw text into terms. An empty result means every term
/// was filtered away, which the parser treats as "no query", not an error.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, field: &str, text: &str) -> Vec<AnalyzedToken>;
}

/// Emits the whole text as a single term.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordAnalyzer;

impl Analyzer for KeywordAnalyzer {
    fn analyze(&self, _field: &str, text: &str) -> Vec<AnalyzedToken> {
        if text.is_empty() {
            return Vec::new();
        }
        vec![AnalyzedToken::new(text, 1)]
    }
}

/// Splits on whitespace, optionally lowercasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceAnalyzer {
    pub lowercase: bool,
}

impl Analyzer for WhitespaceAnalyzer {
    fn analyze(&self, _field: &str, text: &str) -> Vec<AnalyzedToken> {
        text.split_whitespace()
            .map(|word| match self.lowercase {
                true => AnalyzedToken::new(word.to_lowercase(), 1),
                false => AnalyzedToken::new(word, 1),
            })
            .collect()
    }
}

/// Lowercased runs of word characters, minus stop words.
#[derive(Debug, Clone, Default)]
pub struct StandardAnalyzer {
    stop_words: HashSet<String>,
}

impl StandardAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn english() -> Self {
        Self::with_stop_words(ENGLISH_STOP_WORDS.iter().copied())
    }

    pub fn with_stop_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            stop_words: words.into_iter().map(str::to_lowercase).collect(),
        }
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, _field: &str, text: &str) -> Vec<AnalyzedToken> {
        let mut tokens = Vec::new();
        let mut increment = 1;

        for word in REGEX_WORD.find_iter(text) {
            let term = word.as_str().to_lowercase();
            if self.stop_words.contains(&term) {
                increment += 1;
                continue;
            }

            tokens.push(AnalyzedToken::new(term, increment));
            increment = 1;
        }

        tokens
    }
}
