//! Query lexer.
//!
//! Hand-written maximal-munch scanner. Each call to [`Lexer::next_token`]
//! matches the longest token allowed by the current [`LexState`]; when two
//! token kinds match the same length the one listed first in [`TokenKind`]
//! wins, which is how `AND` beats a term spelled `AND` while `ANDY` stays a
//! term.

use std::str::Chars;

use tracing::trace;

use crate::error::LexicalError;

mod class;
mod source;
mod token;

pub use source::{CharSource, Position};
pub use token::*;

/// Unit of a bare word: a single character or a backslash escape pair.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Unit {
    Start,
    Sign,
    Wild(char),
}

pub struct Lexer<I> {
    source: CharSource<I>,
    state: LexState,
}

impl<'a> Lexer<Chars<'a>> {
    pub fn new(text: &'a str) -> Self {
        Self::from_chars(text.chars())
    }
}

impl<I: Iterator<Item = char>> Lexer<I> {
    pub fn from_chars(input: I) -> Self {
        Self {
            source: CharSource::new(input),
            state: LexState::Default,
        }
    }

    pub fn state(&self) -> LexState {
        self.state
    }

    /// Returns the next token; at end of input this is always an `Eof` token.
    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        loop {
            let Some(first) = self.source.begin_token() else {
                return Ok(self.emit(TokenKind::Eof));
            };

            let token = match self.state {
                LexState::Boost => self.boost(first)?,
                LexState::Range => match self.range(first) {
                    Some(token) => token,
                    None => continue,
                },
                _ if class::is_whitespace(first) => continue,
                LexState::Default => self.default(first)?,
            };

            trace!(kind = ?token.kind, image = token.image(), start = token.start(), "token");
            return Ok(token);
        }
    }

    fn default(&mut self, first: char) -> Result<Token, LexicalError> {
        let kind = match first {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ':' => TokenKind::Colon,
            '^' => {
                self.switch(LexState::Boost);
                TokenKind::Carat
            }
            '[' => {
                self.switch(LexState::Range);
                TokenKind::RangeInStart
            }
            '{' => {
                self.switch(LexState::Range);
                TokenKind::RangeExStart
            }
            '+' | '-' | '!' => self.operator(first),
            '"' => self.quoted()?,
            '~' => self.fuzzy_slop(),
            '/' => self.regexp()?,
            _ => self.word(first)?,
        };

        Ok(self.emit(kind))
    }

    /// `+`, `-` and `!` directly followed by whitespace are bare operators.
    fn operator(&mut self, first: char) -> TokenKind {
        match self.source.read_char() {
            Some(c) if class::is_whitespace(c) => return TokenKind::BareOper,
            Some(_) => self.source.backup(1),
            None => {}
        }

        match first {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            _ => TokenKind::Not,
        }
    }

    fn quoted(&mut self) -> Result<TokenKind, LexicalError> {
        loop {
            match self.source.read_char() {
                Some('"') => return Ok(TokenKind::Quoted),
                Some('\\') => {
                    if self.source.read_char().is_none() {
                        return Err(self.error(None));
                    }
                }
                Some(_) => {}
                None => return Err(self.error(None)),
            }
        }
    }

    /// `~` optionally followed by digits and a fraction.
    fn fuzzy_slop(&mut self) -> TokenKind {
        if self.digits() > 0 {
            self.fraction();
        }
        TokenKind::FuzzySlop
    }

    fn regexp(&mut self) -> Result<TokenKind, LexicalError> {
        // An escaped slash may also be read as a backslash followed by the
        // closing slash; that shorter match is used when nothing longer closes.
        let mut shorter = None;

        loop {
            match self.source.read_char() {
                Some('/') => return Ok(TokenKind::RegexpTerm),
                Some('\\') => match self.source.read_char() {
                    Some('/') => shorter = Some(self.source.len()),
                    Some(_) => self.source.backup(1),
                    None => break,
                },
                Some(_) => {}
                None => break,
            }
        }

        match shorter {
            Some(len) => {
                self.source.backup(self.source.len() - len);
                Ok(TokenKind::RegexpTerm)
            }
            None => Err(self.error(None)),
        }
    }

    /// Terms, prefix terms, wildcard terms, `*` and the word operators.
    fn word(&mut self, first: char) -> Result<TokenKind, LexicalError> {
        let mut units: Vec<(Unit, usize)> = Vec::new();
        let mut raw = String::new();
        let mut next = Some(first);

        while let Some(c) = next {
            let unit = match c {
                '*' | '?' => Unit::Wild(c),
                '+' | '-' if !units.is_empty() => Unit::Sign,
                '\\' => match self.source.read_char() {
                    Some(_) => Unit::Start,
                    None if units.is_empty() => return Err(self.error(None)),
                    None => {
                        self.source.backup(1);
                        break;
                    }
                },
                c if class::is_term_start(c) => Unit::Start,
                _ if units.is_empty() => return Err(self.unexpected()),
                _ => {
                    self.source.backup(1);
                    break;
                }
            };

            raw.push(c);
            units.push((unit, self.source.len()));
            next = self.source.read_char();
        }

        let head = units[0].0;

        let run = units
            .iter()
            .take_while(|(unit, _)| matches!(unit, Unit::Start | Unit::Sign))
            .count();
        let term = match head {
            Unit::Start => units[run - 1].1,
            _ => 0,
        };
        let prefix = match (head, units.get(run)) {
            (Unit::Wild('*'), _) => 1,
            (Unit::Start, Some(&(Unit::Wild('*'), end))) => end,
            _ => 0,
        };
        let star = usize::from(head == Unit::Wild('*'));
        let wild = units.last().map_or(0, |&(_, end)| end);
        let keyword = |spelling: &str| {
            if raw.starts_with(spelling) {
                spelling.len()
            } else {
                0
            }
        };

        let candidates = [
            (TokenKind::And, keyword("AND").max(keyword("&&"))),
            (TokenKind::Or, keyword("OR").max(keyword("||"))),
            (TokenKind::Not, keyword("NOT")),
            (TokenKind::Star, star),
            (TokenKind::Term, term),
            (TokenKind::PrefixTerm, prefix),
            (TokenKind::WildTerm, wild),
        ];

        let (kind, len) = longest(&candidates);
        self.seek(len);
        Ok(kind)
    }

    /// `None` when `first` is skipped whitespace.
    fn range(&mut self, first: char) -> Option<Token> {
        let kind = match first {
            ']' => {
                self.switch(LexState::Default);
                TokenKind::RangeInEnd
            }
            '}' => {
                self.switch(LexState::Default);
                TokenKind::RangeExEnd
            }
            ' ' => return None,
            _ => {
                let quoted = if first == '"' { self.range_quoted() } else { 0 };
                self.seek(1);

                let to = match self.source.read_char() {
                    Some('O') if first == 'T' => 2,
                    _ => 0,
                };
                self.seek(1);

                let goop = self.range_goop();

                let candidates = [
                    (TokenKind::RangeTo, to),
                    (TokenKind::RangeQuoted, quoted),
                    (TokenKind::RangeGoop, goop),
                ];
                let (kind, len) = longest(&candidates);

                // Other whitespace only opens an endpoint when more goop follows.
                if class::is_whitespace(first) && len <= 1 {
                    self.seek(1);
                    return None;
                }

                self.seek(len);
                kind
            }
        };

        Some(self.emit(kind))
    }

    /// Length of a non-empty quoted range endpoint, or 0.
    fn range_quoted(&mut self) -> usize {
        let mut shorter = 0;
        let mut inner = 0;

        loop {
            match self.source.read_char() {
                Some('"') if inner > 0 => return self.source.len(),
                Some('"') => break,
                Some('\\') => {
                    inner += 1;
                    match self.source.read_char() {
                        Some('"') => shorter = self.source.len(),
                        Some(_) => self.source.backup(1),
                        None => break,
                    }
                }
                Some(_) => inner += 1,
                None => break,
            }
        }

        shorter
    }

    fn range_goop(&mut self) -> usize {
        loop {
            match self.source.read_char() {
                Some(c) if class::is_range_goop(c) => {}
                Some(_) => {
                    self.source.backup(1);
                    break;
                }
                None => break,
            }
        }

        self.source.len()
    }

    fn boost(&mut self, first: char) -> Result<Token, LexicalError> {
        if !class::is_num(first) {
            return Err(self.unexpected());
        }

        self.digits();
        self.fraction();
        self.switch(LexState::Default);
        Ok(self.emit(TokenKind::Number))
    }

    fn digits(&mut self) -> usize {
        let mut count = 0;
        loop {
            match self.source.read_char() {
                Some(c) if class::is_num(c) => count += 1,
                Some(_) => {
                    self.source.backup(1);
                    break;
                }
                None => break,
            }
        }
        count
    }

    /// An optional `.` followed by at least one digit.
    fn fraction(&mut self) {
        match self.source.read_char() {
            Some('.') => {
                if self.digits() == 0 {
                    self.source.backup(1);
                }
            }
            Some(_) => self.source.backup(1),
            None => {}
        }
    }

    /// Moves the end of the current token to `len` characters past its start.
    fn seek(&mut self, len: usize) {
        let current = self.source.len();
        if current > len {
            self.source.backup(current - len);
        }
        for _ in current..len {
            self.source.read_char();
        }
    }

    fn switch(&mut self, state: LexState) {
        trace!(from = %self.state, to = %state, "lexical state");
        self.state = state;
    }

    fn emit(&self, kind: TokenKind) -> Token {
        let begin = self.source.begin_position();
        let image = match kind {
            TokenKind::Eof => String::new(),
            _ => self.source.image(),
        };
        let end = match kind {
            TokenKind::Eof => begin.offset,
            _ => self.source.end_offset(),
        };

        Token {
            kind,
            span: Span::new(image, begin.offset, end),
            line: begin.line,
            column: begin.column,
        }
    }

    /// Error for the character just read, which no token can continue with.
    fn unexpected(&mut self) -> LexicalError {
        let position = self.source.last_position();
        let mut after = self.source.image();
        let character = after.pop();

        LexicalError {
            eof_seen: false,
            state: self.state,
            line: position.line,
            column: position.column,
            after,
            character,
        }
    }

    fn error(&self, character: Option<char>) -> LexicalError {
        let position = self.source.last_position();

        LexicalError {
            eof_seen: character.is_none(),
            state: self.state,
            line: position.line,
            column: position.column,
            after: self.source.image(),
            character,
        }
    }
}

/// The longest candidate, preferring earlier entries on ties.
fn longest(candidates: &[(TokenKind, usize)]) -> (TokenKind, usize) {
    candidates
        .iter()
        .fold((TokenKind::Eof, 0), |best, &(kind, len)| {
            if len > best.1 {
                (kind, len)
            } else {
                best
            }
        })
}

/// Tokenizes the whole query, excluding the final `Eof` token.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexicalError> {
    let mut lexer = Lexer::new(text);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        if token.kind == TokenKind::Eof {
            return Ok(tokens);
        }
        tokens.push(token);
    }
}
