//! Character stream contract between the parsing host and the scanner
//!
//! The host owns the cursor and lends it to the scanner for one call. The
//! scanner only ever moves it forward, either including characters in the
//! token being recognized or discarding them as trivia.

use crate::error::{Position, ScannerError, Span};

/// Bitfield flags for ASCII character classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterFlags(u8);

impl CharacterFlags {
    /// Whitespace that never ends a line (space, tab, carriage return)
    pub const HORIZONTAL_SPACE: Self = Self(1 << 0);
    /// Line feed
    pub const LINE_FEED: Self = Self(1 << 1);
    /// The ASCII `isspace` set (adds vertical tab and form feed)
    pub const SPACE: Self = Self(1 << 2);
    /// Characters that end a line comment during trivia skipping
    pub const LINE_END: Self = Self(1 << 3);

    /// Creates empty flags
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Checks if any of the given flags are set
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Returns the union of two flag sets
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Lookup table for O(1) ASCII character classification
#[derive(Debug, Clone)]
pub struct CharacterTable([CharacterFlags; 128]);

impl CharacterTable {
    /// Creates a new character table with compile-time initialization
    pub const fn new() -> Self {
        let mut table = [CharacterFlags::empty(); 128];
        let mut i = 0;

        while i < 128 {
            let ch = i as u8;
            let mut flags = CharacterFlags::empty();

            match ch {
                b' ' | b'\t' | b'\r' => flags = flags.union(CharacterFlags::HORIZONTAL_SPACE),
                b'\n' => flags = flags.union(CharacterFlags::LINE_FEED),
                _ => {}
            }

            match ch {
                b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r' => {
                    flags = flags.union(CharacterFlags::SPACE);
                }
                _ => {}
            }

            if ch == b'\n' || ch == b'\r' {
                flags = flags.union(CharacterFlags::LINE_END);
            }

            table[i] = flags;
            i += 1;
        }

        Self(table)
    }

    /// Tests if a character has any of the given flags
    #[inline(always)]
    pub const fn test(&self, ch: char, flags: CharacterFlags) -> bool {
        (ch as u32) < 128 && self.0[ch as usize].intersects(flags)
    }

    /// Space, tab or carriage return
    #[inline(always)]
    pub const fn is_horizontal_space(&self, ch: char) -> bool {
        self.test(ch, CharacterFlags::HORIZONTAL_SPACE)
    }

    /// Line feed
    #[inline(always)]
    pub const fn is_line_feed(&self, ch: char) -> bool {
        self.test(ch, CharacterFlags::LINE_FEED)
    }

    /// ASCII `isspace`
    #[inline(always)]
    pub const fn is_ascii_space(&self, ch: char) -> bool {
        self.test(ch, CharacterFlags::SPACE)
    }

    /// Line feed or carriage return
    #[inline(always)]
    pub const fn is_line_end(&self, ch: char) -> bool {
        self.test(ch, CharacterFlags::LINE_END)
    }
}

impl Default for CharacterTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Global character table instance
pub static CHARACTER_TABLE: CharacterTable = CharacterTable::new();

/// The host's character cursor, as seen by the scanner.
///
/// Implementations must never move backward; every character is consumed
/// at most once.
pub trait Lexer {
    /// The next unconsumed character, or `None` at end of input
    fn lookahead(&self) -> Option<char>;

    /// Consumes the lookahead. With `skip` set the character is trivia and
    /// never becomes part of a token.
    fn advance(&mut self, skip: bool);

    /// Records the current position as the end of the token being recognized
    fn mark_end(&mut self);

    /// True once the whole input has been consumed
    fn eof(&self) -> bool {
        self.lookahead().is_none()
    }

    /// Consumes the lookahead as trivia
    fn skip(&mut self) {
        self.advance(true);
    }

    /// Consumes the lookahead as token text
    fn consume(&mut self) {
        self.advance(false);
    }
}

impl<L: Lexer + ?Sized> Lexer for &mut L {
    fn lookahead(&self) -> Option<char> {
        (**self).lookahead()
    }

    fn advance(&mut self, skip: bool) {
        (**self).advance(skip)
    }

    fn mark_end(&mut self) {
        (**self).mark_end()
    }

    fn eof(&self) -> bool {
        (**self).eof()
    }
}

/// In-memory cursor over a string slice
///
/// This is the reference host cursor: it tracks where the current token
/// starts, where `mark_end` was last called and how many characters were
/// kept or skipped.
#[derive(Debug, Clone)]
pub struct StrLexer<'a> {
    /// Input text being scanned
    input: &'a str,
    /// Cursor position
    position: Position,
    /// Cached lookahead
    current_char: Option<char>,
    /// Start of the current token; skips ahead of the first kept character
    token_start: Position,
    /// Whether any character has been kept for the current token
    token_started: bool,
    /// Position recorded by the last `mark_end` call
    marked_end: Option<Position>,
    /// Characters discarded as trivia
    skipped: usize,
    /// Characters kept as token text
    consumed: usize,
}

impl<'a> StrLexer<'a> {
    /// Creates a cursor at the start of `input`
    pub fn new(input: &'a str) -> Self {
        Self::starting_at(input, Position::new())
    }

    /// Creates a cursor at byte `offset` of `input`
    pub fn at(input: &'a str, offset: usize) -> Result<Self, ScannerError> {
        if !input.is_char_boundary(offset) {
            return Err(ScannerError::InvalidOffset {
                offset,
                len: input.len(),
            });
        }
        Ok(Self::starting_at(input, Position::locate(input, offset)))
    }

    fn starting_at(input: &'a str, position: Position) -> Self {
        Self {
            input,
            position,
            current_char: input[position.offset..].chars().next(),
            token_start: position,
            token_started: false,
            marked_end: None,
            skipped: 0,
            consumed: 0,
        }
    }

    /// Returns the cursor position
    pub fn current_position(&self) -> Position {
        self.position
    }

    /// Returns the unconsumed rest of the input
    pub fn remaining(&self) -> &'a str {
        &self.input[self.position.offset..]
    }

    /// Returns the position recorded by `mark_end`, if it was called
    pub fn marked_end(&self) -> Option<Position> {
        self.marked_end
    }

    /// Returns where the current token ends: the marked end, or the cursor
    /// when `mark_end` was never called
    pub fn token_end(&self) -> Position {
        self.marked_end.unwrap_or(self.position)
    }

    /// Returns the span of the current token
    pub fn token_span(&self) -> Span {
        let end = self.token_end();
        // A token marked before any trailing trivia still starts no later than it ends.
        let start = if self.token_start.offset > end.offset {
            end
        } else {
            self.token_start
        };
        Span::new(start, end)
    }

    /// Number of characters discarded as trivia
    pub fn skipped_chars(&self) -> usize {
        self.skipped
    }

    /// Number of characters kept as token text
    pub fn consumed_chars(&self) -> usize {
        self.consumed
    }
}

impl Lexer for StrLexer<'_> {
    #[inline(always)]
    fn lookahead(&self) -> Option<char> {
        self.current_char
    }

    fn advance(&mut self, skip: bool) {
        let Some(ch) = self.current_char else {
            return;
        };
        self.position.advance(ch);
        self.current_char = self.input[self.position.offset..].chars().next();

        if skip {
            self.skipped += 1;
            if !self.token_started {
                self.token_start = self.position;
            }
        } else {
            self.consumed += 1;
            self.token_started = true;
        }
    }

    fn mark_end(&mut self) {
        self.marked_end = Some(self.position);
    }

    fn eof(&self) -> bool {
        self.position.offset >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_table_classes() {
        let table = &CHARACTER_TABLE;
        for ch in [' ', '\t', '\r'] {
            assert!(table.is_horizontal_space(ch));
            assert!(!table.is_line_feed(ch));
        }
        assert!(table.is_line_feed('\n'));
        assert!(!table.is_horizontal_space('\n'));

        for ch in [' ', '\t', '\n', '\x0B', '\x0C', '\r'] {
            assert!(table.is_ascii_space(ch), "{:?} should be ASCII space", ch);
        }
        assert!(!table.is_ascii_space('a'));
        assert!(!table.is_ascii_space('\u{00A0}'));

        assert!(table.is_line_end('\n'));
        assert!(table.is_line_end('\r'));
        assert!(!table.is_line_end(' '));
    }

    #[test]
    fn test_character_table_non_ascii() {
        let table = &CHARACTER_TABLE;
        assert!(!table.is_horizontal_space('\u{3000}'));
        assert!(!table.is_ascii_space('\u{2028}'));
        assert!(!table.is_line_end('é'));
    }

    #[test]
    fn test_str_lexer_creation() {
        let lexer = StrLexer::new("ab");
        assert_eq!(lexer.lookahead(), Some('a'));
        assert_eq!(lexer.current_position(), Position::new());
        assert!(lexer.marked_end().is_none());
        assert!(!lexer.eof());
    }

    #[test]
    fn test_str_lexer_empty_input() {
        let mut lexer = StrLexer::new("");
        assert!(lexer.eof());
        assert_eq!(lexer.lookahead(), None);

        // Advancing at end of input is a no-op
        lexer.skip();
        assert_eq!(lexer.skipped_chars(), 0);
        assert_eq!(lexer.current_position().offset, 0);
    }

    #[test]
    fn test_str_lexer_at_offset() {
        let lexer = StrLexer::at("x\ny", 2).expect("offset 2 is a boundary");
        assert_eq!(lexer.lookahead(), Some('y'));
        let pos = lexer.current_position();
        assert_eq!((pos.line, pos.column, pos.offset), (2, 1, 2));
    }

    #[test]
    fn test_str_lexer_at_end_of_input() {
        let lexer = StrLexer::at("abc", 3).expect("end of input is a boundary");
        assert!(lexer.eof());
        assert_eq!(lexer.remaining(), "");
    }

    #[test]
    fn test_str_lexer_invalid_offsets() {
        assert_eq!(
            StrLexer::at("abc", 4).unwrap_err(),
            ScannerError::InvalidOffset { offset: 4, len: 3 }
        );
        // 'é' is two bytes; offset 1 splits it
        assert_eq!(
            StrLexer::at("é", 1).unwrap_err(),
            ScannerError::InvalidOffset { offset: 1, len: 2 }
        );
    }

    #[test]
    fn test_skip_moves_token_start() {
        let mut lexer = StrLexer::new("  ab");
        lexer.skip();
        lexer.skip();
        lexer.consume();
        lexer.consume();

        let span = lexer.token_span();
        assert_eq!(span.start.offset, 2);
        assert_eq!(span.end.offset, 4);
        assert_eq!(lexer.skipped_chars(), 2);
        assert_eq!(lexer.consumed_chars(), 2);
    }

    #[test]
    fn test_skip_after_token_text_keeps_start() {
        let mut lexer = StrLexer::new("a b");
        lexer.consume();
        lexer.mark_end();
        lexer.skip();
        lexer.skip();

        let span = lexer.token_span();
        assert_eq!(span.start.offset, 0);
        assert_eq!(span.end.offset, 1);
        assert!(lexer.eof());
    }

    #[test]
    fn test_mark_end_before_trivia_yields_empty_span() {
        let mut lexer = StrLexer::new("\n\n}");
        lexer.mark_end();
        lexer.skip();
        lexer.skip();

        let span = lexer.token_span();
        assert!(span.is_empty());
        assert_eq!(span.start.offset, 0);
        assert_eq!(lexer.lookahead(), Some('}'));
    }

    #[test]
    fn test_token_end_defaults_to_cursor() {
        let mut lexer = StrLexer::new("xyz");
        lexer.consume();
        assert_eq!(lexer.token_end().offset, 1);
        lexer.mark_end();
        lexer.consume();
        assert_eq!(lexer.token_end().offset, 1);
    }

    #[test]
    fn test_position_tracking_multibyte() {
        let mut lexer = StrLexer::new("é\nü");
        lexer.consume();
        let pos = lexer.current_position();
        assert_eq!((pos.line, pos.column, pos.offset), (1, 2, 2));
        lexer.consume();
        lexer.consume();
        let pos = lexer.current_position();
        assert_eq!((pos.line, pos.column, pos.offset), (2, 2, 5));
        assert!(lexer.eof());
    }

    #[test]
    fn test_nul_is_an_ordinary_character() {
        let mut lexer = StrLexer::new("\0");
        assert_eq!(lexer.lookahead(), Some('\0'));
        assert!(!lexer.eof());
        lexer.skip();
        assert!(lexer.eof());
    }

    #[test]
    fn test_mutable_reference_is_a_lexer() {
        fn drain<L: Lexer>(mut lexer: L) {
            while !lexer.eof() {
                lexer.skip();
            }
        }

        let mut lexer = StrLexer::new("abc");
        drain(&mut lexer);
        assert_eq!(lexer.skipped_chars(), 3);
    }
}
