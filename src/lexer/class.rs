//! Character classes of the query grammar.

/// Whitespace skipped between tokens. In the range state only a space is
/// always skipped; the others may start an endpoint.
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{3000}')
}

/// Characters that may begin a bare term without being escaped.
pub fn is_term_start(c: char) -> bool {
    !is_whitespace(c)
        && !matches!(
            c,
            '+' | '-'
                | '!'
                | '('
                | ')'
                | ':'
                | '^'
                | '['
                | ']'
                | '"'
                | '{'
                | '}'
                | '~'
                | '*'
                | '?'
                | '\\'
                | '/'
        )
}

/// Characters allowed inside an unquoted range endpoint.
pub fn is_range_goop(c: char) -> bool {
    !matches!(c, ' ' | ']' | '}')
}

pub fn is_num(c: char) -> bool {
    c.is_ascii_digit()
}
