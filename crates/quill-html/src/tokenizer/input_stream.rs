//! The character source consumed by the tokenizer.
//!
//! [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
//!
//! "The input stream consists of the characters pushed into it as the input
//! byte stream is decoded." Decoding happens upstream; this stream receives
//! already-decoded text.

use crate::error::Position;

/// Decoded characters with newline normalisation and position tracking.
///
/// "Before the tokenizer stage, the user agent must normalize newlines in
/// the input stream." Every CR LF pair and every lone CR becomes a single LF.
#[derive(Debug, Clone)]
pub struct InputStream {
    chars: Vec<char>,
    pos: usize,
    /// Index of the first character of each line.
    line_starts: Vec<usize>,
    /// Every character before this index has been checked for invalid code points.
    checked_up_to: usize,
}

impl InputStream {
    /// Create a stream over already-decoded input.
    #[must_use]
    pub fn new(input: &str) -> Self {
        let mut chars = Vec::with_capacity(input.len());
        let mut source = input.chars().peekable();
        while let Some(c) = source.next() {
            if c == '\r' {
                let _ = source.next_if_eq(&'\n');
                chars.push('\n');
            } else {
                chars.push(c);
            }
        }

        let mut line_starts = vec![0];
        line_starts.extend(
            chars
                .iter()
                .enumerate()
                .filter(|&(_, &c)| c == '\n')
                .map(|(i, _)| i + 1),
        );

        Self {
            chars,
            pos: 0,
            line_starts,
            checked_up_to: 0,
        }
    }

    /// "Consume the next input character". Returns `None` at end of input.
    pub fn consume(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        Some(c)
    }

    /// Step back one character, so the next `consume` returns it again.
    pub const fn unget(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// Look at the character `offset` positions ahead without consuming it.
    #[must_use]
    pub fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// "If the next few characters are..." (exact match).
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        target
            .chars()
            .enumerate()
            .all(|(i, expected)| self.peek(i) == Some(expected))
    }

    /// "...an ASCII case-insensitive match for the word..."
    #[must_use]
    pub fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        target
            .chars()
            .enumerate()
            .all(|(i, expected)| self.peek(i).is_some_and(|c| c.eq_ignore_ascii_case(&expected)))
    }

    /// Skip `count` characters the caller has already matched.
    pub fn skip(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.chars.len());
    }

    /// Position of the most recently consumed character.
    #[must_use]
    pub fn position(&self) -> Position {
        let line_index = self.line_starts.partition_point(|&start| start <= self.pos) - 1;
        Position {
            line: line_index + 1,
            col: self.pos - self.line_starts[line_index],
        }
    }

    /// Returns the just-consumed character if it is a control character or
    /// noncharacter that has not been reported yet.
    ///
    /// "Any occurrences of any characters in the ranges U+0001 to U+0008, U+000E
    /// to U+001F, U+007F to U+009F, U+FDD0 to U+FDEF, and characters U+000B,
    /// U+FFFE, U+FFFF, ... are parse errors."
    pub fn take_invalid_code_point(&mut self) -> Option<char> {
        if self.pos == 0 || self.pos <= self.checked_up_to {
            return None;
        }
        self.checked_up_to = self.pos;
        let c = self.chars[self.pos - 1];
        (is_control(c) || is_noncharacter(u32::from(c))).then_some(c)
    }
}

/// [Infra § 4.6](https://infra.spec.whatwg.org/#control)
/// Controls, excluding ASCII whitespace and NULL (which the states handle).
#[must_use]
pub const fn is_control(c: char) -> bool {
    matches!(c, '\u{1}'..='\u{8}' | '\u{B}' | '\u{E}'..='\u{1F}' | '\u{7F}'..='\u{9F}')
}

/// [Infra § 4.6](https://infra.spec.whatwg.org/#noncharacter)
///
/// "A noncharacter is a code point that is in the range U+FDD0 to U+FDEF,
/// inclusive, or U+FFFE, U+FFFF, U+1FFFE, U+1FFFF, ..., U+10FFFE, or U+10FFFF."
#[must_use]
pub const fn is_noncharacter(code: u32) -> bool {
    matches!(code, 0xFDD0..=0xFDEF) || (code & 0xFFFE) == 0xFFFE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_crlf_and_cr() {
        let mut stream = InputStream::new("a\r\nb\rc");
        let consumed: String = std::iter::from_fn(|| stream.consume()).collect();
        assert_eq!(consumed, "a\nb\nc");
    }

    #[test]
    fn tracks_line_and_column() {
        let mut stream = InputStream::new("ab\ncd");
        assert_eq!(stream.position(), Position { line: 1, col: 0 });
        let _ = stream.consume();
        let _ = stream.consume();
        assert_eq!(stream.position(), Position { line: 1, col: 2 });
        let _ = stream.consume();
        let _ = stream.consume();
        assert_eq!(stream.position(), Position { line: 2, col: 1 });
    }

    #[test]
    fn reports_each_invalid_code_point_once() {
        let mut stream = InputStream::new("\u{1}x");
        assert_eq!(stream.consume(), Some('\u{1}'));
        assert_eq!(stream.take_invalid_code_point(), Some('\u{1}'));
        stream.unget();
        let _ = stream.consume();
        assert_eq!(stream.take_invalid_code_point(), None);
    }

    #[test]
    fn lookahead_is_case_insensitive_when_asked() {
        let stream = InputStream::new("DocType html");
        assert!(stream.next_few_characters_are_case_insensitive("doctype"));
        assert!(!stream.next_few_characters_are("doctype"));
    }
}
