//! External scanner for the Zag grammar
//!
//! The host calls [`Scanner::scan`] whenever its parse table reaches a state
//! where one of the external tokens is valid. The only token decided here is
//! the automatic semicolon: a zero-width statement terminator inserted at a
//! line break that is followed by a closing delimiter or by end of input.

use crate::cursor::{CHARACTER_TABLE, Lexer, StrLexer};
use crate::error::{Position, ScannerError};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use std::fmt;
use tracing::trace;

/// External token kinds, indexed in the order the host passes their flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum TokenKind {
    /// Zero-width statement terminator
    AutomaticSemicolon = 0,
    /// Raw characters inside a template literal. Never recognized here.
    TemplateChars = 1,
    /// `?` of a ternary expression. Never recognized here.
    TernaryQmark = 2,
}

impl TokenKind {
    /// Number of external token kinds
    pub const COUNT: usize = 3;

    /// Every kind, ordered by index
    pub const ALL: [TokenKind; Self::COUNT] = [
        TokenKind::AutomaticSemicolon,
        TokenKind::TemplateChars,
        TokenKind::TernaryQmark,
    ];

    /// Returns the index of this kind in the host's symbol table
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns a readable name for this kind, for logs and messages
    pub fn type_name(self) -> &'static str {
        match self {
            TokenKind::AutomaticSemicolon => "automatic_semicolon",
            TokenKind::TemplateChars => "template_chars",
            TokenKind::TernaryQmark => "ternary_qmark",
        }
    }
}

impl TryFrom<u16> for TokenKind {
    type Error = ScannerError;

    fn try_from(index: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or(ScannerError::UnknownTokenKind { index })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// The set of external token kinds the host currently accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidSymbols(u8);

impl ValidSymbols {
    /// No kind is valid
    pub const fn none() -> Self {
        Self(0)
    }

    /// Every kind is valid
    pub const fn all() -> Self {
        Self((1 << TokenKind::COUNT) - 1)
    }

    /// A set holding exactly `kind`
    pub const fn only(kind: TokenKind) -> Self {
        Self(1 << kind.index())
    }

    /// Returns this set with `kind` added
    pub const fn with(self, kind: TokenKind) -> Self {
        Self(self.0 | (1 << kind.index()))
    }

    /// Builds the set from the host's per-symbol flag table
    pub fn from_flags(flags: &[bool]) -> Result<Self, ScannerError> {
        if flags.len() != TokenKind::COUNT {
            return Err(ScannerError::SymbolCountMismatch {
                expected: TokenKind::COUNT,
                found: flags.len(),
            });
        }
        Ok(TokenKind::ALL
            .into_iter()
            .zip(flags)
            .filter(|(_, valid)| **valid)
            .map(|(kind, _)| kind)
            .collect())
    }

    /// Checks whether `kind` is valid
    pub const fn contains(self, kind: TokenKind) -> bool {
        (self.0 & (1 << kind.index())) != 0
    }

    /// Adds `kind`
    pub fn insert(&mut self, kind: TokenKind) {
        self.0 |= 1 << kind.index();
    }

    /// Removes `kind`
    pub fn remove(&mut self, kind: TokenKind) {
        self.0 &= !(1 << kind.index());
    }

    /// Returns true if no kind is valid
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the valid kinds in index order
    pub fn iter(self) -> impl Iterator<Item = TokenKind> {
        TokenKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<TokenKind> for ValidSymbols {
    fn from_iter<I: IntoIterator<Item = TokenKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Self::with)
    }
}

impl From<TokenKind> for ValidSymbols {
    fn from(kind: TokenKind) -> Self {
        Self::only(kind)
    }
}

/// Result of one scan invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A token of this kind ends at the cursor's marked end
    Recognized(TokenKind),
    /// Nothing recognized; the host falls back to its own lexer
    Declined,
}

impl Verdict {
    /// Returns true for [`Verdict::Recognized`]
    pub fn is_recognized(self) -> bool {
        matches!(self, Verdict::Recognized(_))
    }

    /// Returns the recognized kind, if any
    pub fn kind(self) -> Option<TokenKind> {
        match self {
            Verdict::Recognized(kind) => Some(kind),
            Verdict::Declined => None,
        }
    }

    fn confirm(kind: TokenKind, recognized: bool) -> Self {
        if recognized {
            Verdict::Recognized(kind)
        } else {
            Verdict::Declined
        }
    }
}

/// Outcome of [`Scanner::scan_source`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    /// The scan verdict
    pub verdict: Verdict,
    /// Where the token ends: the marked end, or the cursor if none was marked
    pub token_end: Position,
    /// Cursor position after the scan
    pub cursor: Position,
}

/// Configuration options for the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Treat every Unicode `White_Space` character as trivia when skipping.
    /// When false only the ASCII `isspace` set is skipped.
    pub unicode_whitespace: bool,
    /// Characters that justify an automatic semicolon after a line break
    pub closing_delimiters: SmallVec<[char; 4]>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            unicode_whitespace: true,
            closing_delimiters: smallvec!['}', ')', ']'],
        }
    }
}

impl ScannerConfig {
    /// Checks that the configuration can drive a scan
    pub fn validate(&self) -> Result<(), ScannerError> {
        for &ch in &self.closing_delimiters {
            if ch.is_whitespace() || ch == '/' {
                return Err(ScannerError::InvalidConfig {
                    reason: format!("{:?} cannot be a closing delimiter", ch),
                });
            }
        }
        Ok(())
    }

    fn is_closing_delimiter(&self, ch: char) -> bool {
        self.closing_delimiters.contains(&ch)
    }
}

/// The external scanner.
///
/// It carries no state between invocations, so serialization always
/// produces an empty buffer and deserialization accepts anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scanner {
    config: ScannerConfig,
}

impl Scanner {
    /// Creates a scanner with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Host lifecycle hook: create the scanner payload
    pub fn create() -> Self {
        Self::new()
    }

    /// Creates a scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Result<Self, ScannerError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the scanner configuration
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Host lifecycle hook: release the scanner payload
    pub fn destroy(self) {}

    /// Serializes the scanner state. There is none, so the result is empty.
    pub fn serialize(&self) -> SmallVec<[u8; 8]> {
        SmallVec::new()
    }

    /// Writes the scanner state into a host buffer and returns the number of
    /// bytes written, which is always zero
    pub fn serialize_into(&self, _buffer: &mut [u8]) -> usize {
        0
    }

    /// Restores the scanner state. Any input, including an empty one, leaves
    /// the scanner in its single valid state.
    pub fn deserialize(&mut self, bytes: &[u8]) {
        if !bytes.is_empty() {
            trace!(len = bytes.len(), "ignoring serialized scanner state");
        }
    }

    /// Runs one scan at the lexer's cursor.
    ///
    /// Only the kinds in `valid` are considered, and of those only the
    /// automatic semicolon is ever recognized. Characters inspected while
    /// probing stay consumed whatever the verdict.
    pub fn scan<L: Lexer + ?Sized>(&self, lexer: &mut L, valid: ValidSymbols) -> Verdict {
        trace!(?valid, "scan");
        // Index order puts the automatic semicolon first.
        for kind in valid.iter() {
            match kind {
                TokenKind::AutomaticSemicolon => return self.scan_automatic_semicolon(lexer),
                TokenKind::TemplateChars | TokenKind::TernaryQmark => {
                    trace!(%kind, "left to the grammar");
                }
            }
        }
        Verdict::Declined
    }

    /// Scans `source` from byte `offset` with a fresh [`StrLexer`]
    pub fn scan_source(
        &self,
        source: &str,
        offset: usize,
        valid: ValidSymbols,
    ) -> Result<ScanOutcome, ScannerError> {
        let mut lexer = StrLexer::at(source, offset)?;
        let verdict = self.scan(&mut lexer, valid);
        Ok(ScanOutcome {
            verdict,
            token_end: lexer.token_end(),
            cursor: lexer.current_position(),
        })
    }

    /// Skips whitespace and comments.
    ///
    /// Returns true once a character that starts neither is reached, or at
    /// end of input. Returns false on an unterminated block comment, or on
    /// a `/` that does not start a comment; the `/` has been skipped by then.
    pub fn skip_trivia<L: Lexer + ?Sized>(&self, lexer: &mut L) -> bool {
        loop {
            while lexer.lookahead().is_some_and(|ch| self.is_space(ch)) {
                lexer.skip();
            }

            if lexer.lookahead() != Some('/') {
                return true;
            }
            lexer.skip();

            match lexer.lookahead() {
                Some('/') => {
                    lexer.skip();
                    while lexer
                        .lookahead()
                        .is_some_and(|ch| !CHARACTER_TABLE.is_line_end(ch))
                    {
                        lexer.skip();
                    }
                }
                Some('*') => {
                    lexer.skip();
                    if !skip_block_comment_body(lexer, |_| {}) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }

    fn is_space(&self, ch: char) -> bool {
        if self.config.unicode_whitespace {
            ch.is_whitespace()
        } else {
            CHARACTER_TABLE.is_ascii_space(ch)
        }
    }

    fn scan_automatic_semicolon<L: Lexer + ?Sized>(&self, lexer: &mut L) -> Verdict {
        let kind = TokenKind::AutomaticSemicolon;
        lexer.mark_end();

        let mut sameline = true;
        loop {
            if lexer.eof() {
                trace!(reason = "end of input", "automatic semicolon");
                return Verdict::Recognized(kind);
            }

            match lexer.lookahead() {
                Some(ch) if CHARACTER_TABLE.is_horizontal_space(ch) => lexer.skip(),
                Some(ch) if CHARACTER_TABLE.is_line_feed(ch) => {
                    lexer.skip();
                    sameline = false;
                }
                Some('/') => {
                    lexer.skip();
                    match lexer.lookahead() {
                        // Runs through '\r'; only a line feed ends it here.
                        Some('/') => {
                            while lexer
                                .lookahead()
                                .is_some_and(|ch| !CHARACTER_TABLE.is_line_feed(ch))
                            {
                                lexer.skip();
                            }
                        }
                        Some('*') => {
                            lexer.skip();
                            let closed = skip_block_comment_body(lexer, |ch| {
                                if CHARACTER_TABLE.is_line_feed(ch) {
                                    sameline = false;
                                }
                            });
                            if !closed {
                                trace!(reason = "unterminated block comment", "declined");
                                return Verdict::Declined;
                            }
                        }
                        _ => {
                            trace!(reason = "slash outside comment", "declined");
                            return Verdict::Declined;
                        }
                    }
                }
                _ => break,
            }
        }

        if sameline {
            trace!(reason = "no line break", "declined");
            return Verdict::Declined;
        }

        let recognized = lexer
            .lookahead()
            .is_some_and(|ch| self.config.is_closing_delimiter(ch));
        trace!(lookahead = ?lexer.lookahead(), recognized, "automatic semicolon after line break");
        Verdict::confirm(kind, recognized)
    }
}

/// Skips the body of a block comment whose `/*` has already been consumed,
/// through the closing `*/`. Every character seen is reported to `observe`
/// before it is skipped. Returns false if the input ends first.
fn skip_block_comment_body<L, F>(lexer: &mut L, mut observe: F) -> bool
where
    L: Lexer + ?Sized,
    F: FnMut(char),
{
    loop {
        let Some(ch) = lexer.lookahead() else {
            return false;
        };
        observe(ch);
        lexer.skip();
        if ch == '*' && lexer.lookahead() == Some('/') {
            lexer.skip();
            return true;
        }
    }
}
