use std::{fmt, ops::Deref};

/// The mode the lexer is in, which decides the tokens it recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexState {
    Default,
    Range,
    Boost,
}

impl fmt::Display for LexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LexState::Default => "DEFAULT",
            LexState::Range => "Range",
            LexState::Boost => "Boost",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    And,
    Or,
    Not,
    Plus,
    Minus,
    BareOper,
    LParen,
    RParen,
    Colon,
    Star,
    Carat,
    Quoted,
    Term,
    FuzzySlop,
    PrefixTerm,
    WildTerm,
    RegexpTerm,
    RangeInStart,
    RangeExStart,
    Number,
    RangeTo,
    RangeInEnd,
    RangeExEnd,
    RangeQuoted,
    RangeGoop,
}

impl TokenKind {
    /// Human readable name used in "was expecting" diagnostics.
    pub fn image(self) -> &'static str {
        match self {
            TokenKind::Eof => "<EOF>",
            TokenKind::And => "<AND>",
            TokenKind::Or => "<OR>",
            TokenKind::Not => "<NOT>",
            TokenKind::Plus => "\"+\"",
            TokenKind::Minus => "\"-\"",
            TokenKind::BareOper => "<BAREOPER>",
            TokenKind::LParen => "\"(\"",
            TokenKind::RParen => "\")\"",
            TokenKind::Colon => "\":\"",
            TokenKind::Star => "\"*\"",
            TokenKind::Carat => "\"^\"",
            TokenKind::Quoted => "<QUOTED>",
            TokenKind::Term => "<TERM>",
            TokenKind::FuzzySlop => "<FUZZY_SLOP>",
            TokenKind::PrefixTerm => "<PREFIXTERM>",
            TokenKind::WildTerm => "<WILDTERM>",
            TokenKind::RegexpTerm => "<REGEXPTERM>",
            TokenKind::RangeInStart => "\"[\"",
            TokenKind::RangeExStart => "\"{\"",
            TokenKind::Number => "<NUMBER>",
            TokenKind::RangeTo => "\"TO\"",
            TokenKind::RangeInEnd => "\"]\"",
            TokenKind::RangeExEnd => "\"}\"",
            TokenKind::RangeQuoted => "<RANGE_QUOTED>",
            TokenKind::RangeGoop => "<RANGE_GOOP>",
        }
    }

    /// The exact spelling of tokens that only ever have one.
    pub fn literal(self) -> Option<&'static str> {
        match self {
            TokenKind::Plus => Some("+"),
            TokenKind::Minus => Some("-"),
            TokenKind::LParen => Some("("),
            TokenKind::RParen => Some(")"),
            TokenKind::Colon => Some(":"),
            TokenKind::Star => Some("*"),
            TokenKind::Carat => Some("^"),
            TokenKind::RangeInStart => Some("["),
            TokenKind::RangeExStart => Some("{"),
            TokenKind::RangeTo => Some("TO"),
            TokenKind::RangeInEnd => Some("]"),
            TokenKind::RangeExEnd => Some("}"),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.image())
    }
}

/// Token text together with its byte offsets in the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub value: String,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            value: value.into(),
            start,
            end,
        }
    }
}

impl Deref for Span {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// 1-based line of the first character.
    pub line: u32,
    /// 1-based column of the first character.
    pub column: u32,
}

impl Token {
    pub fn image(&self) -> &str {
        &self.span
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }
}
