//! Error types and position tracking for the Zag scanner
//!
//! The scan itself never fails: every malformed situation resolves to a
//! declined verdict. The errors here cover the host-facing edges instead,
//! such as converting raw symbol indices, validating configuration and
//! positioning a cursor inside a source buffer.

use std::fmt;
use thiserror::Error;

/// Represents a position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number in characters (1-based)
    pub column: usize,
    /// Byte offset from start of input (0-based)
    pub offset: usize,
}

impl Position {
    /// Creates a new position at the start of input
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Advances the position past one character
    pub fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.offset += c.len_utf8();
    }

    /// Advances the position past every character of `text`
    pub fn advance_by(&mut self, text: &str) {
        for c in text.chars() {
            self.advance(c);
        }
    }

    /// Computes the position of byte `offset` within `source`.
    ///
    /// The caller guarantees that `offset` lies on a char boundary.
    pub(crate) fn locate(source: &str, offset: usize) -> Self {
        let mut position = Self::new();
        position.advance_by(&source[..offset]);
        position
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents a span of text in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start position of the span
    pub start: Position,
    /// End position of the span
    pub end: Position,
}

impl Span {
    /// Creates a new span from start and end positions
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Creates an empty span at a single position
    pub fn single(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Returns the length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    /// Returns true if the span covers no text
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if this span contains the given position
    pub fn contains(&self, position: Position) -> bool {
        position.offset >= self.start.offset && position.offset <= self.end.offset
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Errors raised at the host-facing edges of the scanner
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScannerError {
    /// A raw symbol index does not name any external token kind
    #[error("Unknown external token index {index}")]
    UnknownTokenKind { index: u16 },

    /// The host's valid-symbol table has the wrong number of entries
    #[error("Expected {expected} valid-symbol flags, found {found}")]
    SymbolCountMismatch { expected: usize, found: usize },

    /// A cursor offset lies past the end of the input or inside a character
    #[error("Offset {offset} is not a character boundary of input of length {len}")]
    InvalidOffset { offset: usize, len: usize },

    /// Scanner configuration was rejected
    #[error("Invalid scanner configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ScannerError {
    /// Generate suggestions for resolving the error
    pub fn suggest_fix(&self) -> Vec<String> {
        match self {
            ScannerError::UnknownTokenKind { .. } => vec![
                "Token kind indices are 0 (automatic_semicolon), 1 (template_chars) and 2 (ternary_qmark)".to_string(),
            ],
            ScannerError::SymbolCountMismatch { expected, .. } => vec![format!(
                "Pass one flag per external token ({} in total)",
                expected
            )],
            ScannerError::InvalidOffset { len, .. } => vec![format!(
                "Use a byte offset between 0 and {} that does not split a UTF-8 sequence",
                len
            )],
            ScannerError::InvalidConfig { .. } => vec![
                "Closing delimiters must not be whitespace or '/'".to_string(),
            ],
        }
    }
}
