//! Parser for serialized drug collections such as `['aspirin', 'ibuprofen']`.
//!
//! Accepts list (`[...]`), tuple (`(...)`) and set (`{...}`, `set()`) displays whose
//! elements are all quoted string literals. Everything else is rejected: numbers,
//! nested collections, dicts (including `{}`), bare words and trailing text.

use std::collections::BTreeSet;

use crate::error::{DrugrecallError, Result};

/// Set of drug identifiers for one disease.
pub type DrugSet = BTreeSet<String>;

/// Parse a collection literal, keeping element order and duplicates.
pub fn parse_drug_list(text: &str) -> Result<Vec<String>> {
    let mut cursor = Cursor::new(text);
    cursor.skip_whitespace();

    if cursor.eat_keyword("set") {
        cursor.skip_whitespace();
        cursor.expect('(')?;
        cursor.skip_whitespace();
        cursor.expect(')')?;
        cursor.finish()?;
        return Ok(Vec::new());
    }

    let close = match cursor.next_char() {
        Some('[') => ']',
        Some('(') => ')',
        Some('{') => '}',
        Some(c) => return Err(cursor.error_at_prev(&format!("expected '[', '(' or '{{', found '{}'", c))),
        None => return Err(cursor.error("empty value is not a collection literal")),
    };

    let mut items = Vec::new();
    loop {
        cursor.skip_whitespace();
        if cursor.peek() == Some(close) {
            cursor.next_char();
            break;
        }
        items.push(cursor.string_literal()?);
        cursor.skip_whitespace();
        match cursor.next_char() {
            Some(',') => continue,
            Some(c) if c == close => break,
            Some(':') if close == '}' => {
                return Err(cursor.error_at_prev("dict literals are not drug collections"))
            }
            Some(c) => return Err(cursor.error_at_prev(&format!("expected ',' or '{}', found '{}'", close, c))),
            None => return Err(cursor.error(&format!("unterminated collection, expected '{}'", close))),
        }
    }

    // `{}` is an empty dict, not an empty set
    if close == '}' && items.is_empty() {
        return Err(cursor.error_at_prev("'{}' is an empty dict, not a drug collection"));
    }

    cursor.finish()?;
    Ok(items)
}

/// Parse a collection literal into a set of drug identifiers.
pub fn parse_drug_set(text: &str) -> Result<DrugSet> {
    Ok(parse_drug_list(text)?.into_iter().collect())
}

/// Serialize drug identifiers as a list literal that [`parse_drug_list`] reads back.
pub fn format_drug_list<'a, I>(drugs: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let quoted: Vec<String> = drugs.into_iter().map(|d| quote(d)).collect();
    format!("[{}]", quoted.join(", "))
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.next_char();
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.text[self.pos..].starts_with(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, wanted: char) -> Result<()> {
        match self.next_char() {
            Some(c) if c == wanted => Ok(()),
            Some(c) => Err(self.error_at_prev(&format!("expected '{}', found '{}'", wanted, c))),
            None => Err(self.error(&format!("expected '{}', found end of input", wanted))),
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.skip_whitespace();
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error("unexpected trailing characters")),
        }
    }

    fn string_literal(&mut self) -> Result<String> {
        let quote = match self.next_char() {
            Some(q @ ('\'' | '"')) => q,
            Some(c) => return Err(self.error_at_prev(&format!("expected a quoted string, found '{}'", c))),
            None => return Err(self.error("expected a quoted string, found end of input")),
        };

        let mut value = String::new();
        loop {
            match self.next_char() {
                Some(c) if c == quote => return Ok(value),
                Some('\\') => {
                    let start = self.pos - 1;
                    if let Some(c) = self.escape(start)? {
                        value.push(c);
                    }
                }
                Some('\n') => return Err(self.error_at_prev("newline inside string literal")),
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated string literal")),
            }
        }
    }

    /// Decode the escape after a backslash at `start`. `None` for a line continuation.
    fn escape(&mut self, start: usize) -> Result<Option<char>> {
        let c = match self.next_char() {
            Some(c) => c,
            None => return Err(self.error("unterminated string literal")),
        };
        let decoded = match c {
            '\n' => return Ok(None),
            '\\' | '\'' | '"' => c,
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'v' => '\u{0B}',
            'x' => self.hex_escape(start, 2)?,
            'u' => self.hex_escape(start, 4)?,
            'U' => self.hex_escape(start, 8)?,
            '0'..='7' => {
                let mut code = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.next_char();
                        }
                        None => break,
                    }
                }
                // at most 0o777, always a valid scalar value
                char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
            }
            'N' => return Err(self.error_at(start, "named unicode escapes are not supported")),
            other => {
                return Err(self.error_at(start, &format!("unsupported escape '\\{}'", other)))
            }
        };
        Ok(Some(decoded))
    }

    fn hex_escape(&mut self, start: usize, digits: usize) -> Result<char> {
        let mut code: u32 = 0;
        for _ in 0..digits {
            match self.peek().and_then(|d| d.to_digit(16)) {
                Some(d) => {
                    code = code * 16 + d;
                    self.next_char();
                }
                None => {
                    return Err(self.error_at(
                        start,
                        &format!("truncated escape, expected {} hex digits", digits),
                    ))
                }
            }
        }
        char::from_u32(code).ok_or_else(|| {
            self.error_at(start, &format!("escape U+{:X} is not a valid character", code))
        })
    }

    fn error(&self, reason: &str) -> DrugrecallError {
        DrugrecallError::Parse(format!("{} at offset {}", reason, self.pos))
    }

    /// Error pointing at the character just consumed.
    fn error_at_prev(&self, reason: &str) -> DrugrecallError {
        let offset = self.text[..self.pos]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.error_at(offset, reason)
    }

    fn error_at(&self, offset: usize, reason: &str) -> DrugrecallError {
        DrugrecallError::Parse(format!("{} at offset {}", reason, offset))
    }
}
