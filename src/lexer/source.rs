//! Buffered, backtrackable character reader feeding the lexer.

/// Location of a character in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Byte offset of the character.
    pub offset: usize,
    /// Always 1; newlines only advance the column.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    ch: char,
    at: Position,
}

const INITIAL_CAPACITY: usize = 64;

/// Reads characters from `input` on demand, keeping everything since the
/// start of the current token so the lexer can back out of greedy matches.
///
/// Running out of input is reported as `None`, never as an error.
pub struct CharSource<I> {
    input: I,
    buffer: Vec<Slot>,
    token_begin: usize,
    cursor: usize,
    next: Position,
}

impl<I: Iterator<Item = char>> CharSource<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            buffer: Vec::with_capacity(INITIAL_CAPACITY),
            token_begin: 0,
            cursor: 0,
            next: Position::default(),
        }
    }

    /// Marks the current position as the start of a token and reads its first character.
    pub fn begin_token(&mut self) -> Option<char> {
        self.token_begin = self.cursor;
        self.read_char()
    }

    pub fn read_char(&mut self) -> Option<char> {
        if self.cursor == self.buffer.len() && !self.fill() {
            return None;
        }

        let ch = self.buffer[self.cursor].ch;
        self.cursor += 1;
        Some(ch)
    }

    /// Un-reads the last `amount` characters of the current token.
    pub fn backup(&mut self, amount: usize) {
        debug_assert!(amount <= self.len(), "cannot back up past the token start");
        self.cursor -= amount.min(self.len());
    }

    /// Number of characters read since [`CharSource::begin_token`].
    pub fn len(&self) -> usize {
        self.cursor - self.token_begin
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text of the current token.
    pub fn image(&self) -> String {
        self.buffer[self.token_begin..self.cursor]
            .iter()
            .map(|slot| slot.ch)
            .collect()
    }

    /// Position of the first character of the current token.
    pub fn begin_position(&self) -> Position {
        self.buffer
            .get(self.token_begin)
            .map(|slot| slot.at)
            .unwrap_or(self.next)
    }

    /// Position of the most recently read character.
    pub fn last_position(&self) -> Position {
        match self.cursor.checked_sub(1) {
            Some(index) => self.buffer[index].at,
            None => self.next,
        }
    }

    /// Byte offset just past the most recently read character.
    pub fn end_offset(&self) -> usize {
        self.buffer
            .get(self.cursor)
            .map(|slot| slot.at.offset)
            .unwrap_or(self.next.offset)
    }

    /// Pulls one more character into the buffer, shifting out consumed
    /// tokens or doubling capacity when the buffer is full.
    fn fill(&mut self) -> bool {
        let Some(ch) = self.input.next() else {
            return false;
        };

        if self.buffer.len() == self.buffer.capacity() {
            if self.token_begin > 0 {
                self.buffer.drain(..self.token_begin);
                self.cursor -= self.token_begin;
                self.token_begin = 0;
            }

            if self.buffer.len() == self.buffer.capacity() {
                let additional = self.buffer.capacity().max(INITIAL_CAPACITY);
                self.buffer.reserve_exact(additional);
            }
        }

        let at = self.next;
        self.next.offset += ch.len_utf8();
        self.next.column += 1;

        self.buffer.push(Slot { ch, at });
        true
    }
}
