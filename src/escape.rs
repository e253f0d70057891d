//! Escaping of query syntax characters.

use crate::error::EscapeError;

/// Characters with a meaning in the query grammar.
const SPECIAL: &[char] = &[
    '\\', '+', '-', '!', '(', ')', ':', '^', '[', ']', '"', '{', '}', '~', '*', '?', '|', '&', '/',
];

/// Escapes every grammar character in `text` with a backslash, so the
/// result parses back to the literal text.
///
/// ```
/// assert_eq!(query_language::escape("a+b:(c)"), "a\\+b\\:\\(c\\)");
/// ```
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Removes backslash escapes. `\uXXXX` yields the UTF-16 code unit with that
/// value, surrogate pairs combining into one character.
pub fn discard_escape_char(text: &str) -> Result<String, EscapeError> {
    let mut units: Vec<u16> = Vec::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buffer = [0; 2];
            units.extend_from_slice(c.encode_utf16(&mut buffer));
            continue;
        }

        match chars.next() {
            Some('u') => {
                let mut code: u16 = 0;
                for _ in 0..4 {
                    let digit = chars.next().ok_or(EscapeError::TruncatedEscape)?;
                    let value = digit.to_digit(16).ok_or(EscapeError::InvalidHexDigit(digit))?;
                    code = (code << 4) | value as u16;
                }
                units.push(code);
            }
            Some(escaped) => {
                let mut buffer = [0; 2];
                units.extend_from_slice(escaped.encode_utf16(&mut buffer));
            }
            None => return Err(EscapeError::TrailingEscape),
        }
    }

    String::from_utf16(&units).map_err(|_| EscapeError::UnpairedSurrogate)
}
