//! # Zag Scanner
//!
//! The external scanner of the Zag tree-sitter grammar.
//!
//! ## Overview
//!
//! A grammar cannot decide on its own whether a line break ends a
//! statement. This crate makes that call for the parsing host: at every
//! position where the grammar would accept an automatic semicolon, the host
//! hands the scanner its character cursor and the set of external tokens it
//! currently accepts, and the scanner either recognizes a zero-width
//! terminator or declines.
//!
//! An automatic semicolon is inserted when, skipping spaces and comments,
//! the scanner reaches end of input, or crosses at least one line break and
//! then sees a closing `}`, `)` or `]`. The terminator always ends where the
//! scan began, before the trivia that justified it.
//!
//! ## Key Features
//!
//! - **Host-agnostic cursor**: the [`Lexer`] trait models the host's
//!   character stream, so any host (or a test) can drive the scanner
//! - **Comment aware**: `//` line comments and `/* */` block comments,
//!   including block comments that span lines
//! - **Stateless**: nothing survives between scans; serialization is empty
//! - **Deterministic**: the same input and candidate set always give the
//!   same verdict and cursor advancement
//!
//! ## Quick Start
//!
//! ```rust
//! use zag_scanner::{Scanner, StrLexer, TokenKind, ValidSymbols, Verdict};
//!
//! let scanner = Scanner::create();
//! let mut lexer = StrLexer::new("\n}");
//!
//! let verdict = scanner.scan(&mut lexer, ValidSymbols::all());
//! assert_eq!(verdict, Verdict::Recognized(TokenKind::AutomaticSemicolon));
//!
//! // Zero-width: the terminator ends before the newline
//! assert_eq!(lexer.token_end().offset, 0);
//! ```
//!
//! ## Declined Scans
//!
//! ```rust
//! use zag_scanner::{Scanner, ValidSymbols};
//!
//! let scanner = Scanner::new();
//!
//! // No line break between the cursor and the brace
//! let outcome = scanner.scan_source(" }", 0, ValidSymbols::all())?;
//! assert!(!outcome.verdict.is_recognized());
//!
//! // A line break inside a block comment counts
//! let outcome = scanner.scan_source("/* a\nb */)", 0, ValidSymbols::all())?;
//! assert!(outcome.verdict.is_recognized());
//! # Ok::<(), zag_scanner::ScannerError>(())
//! ```
//!
//! ## Host Integration
//!
//! Hosts that pass a table of flags, one per external token, convert it
//! with [`ValidSymbols::from_flags`]:
//!
//! ```rust
//! use zag_scanner::{Scanner, StrLexer, ValidSymbols};
//!
//! let valid = ValidSymbols::from_flags(&[true, false, false])?;
//! let mut scanner = Scanner::create();
//! let mut lexer = StrLexer::new("\n)");
//! assert!(scanner.scan(&mut lexer, valid).is_recognized());
//!
//! let state = scanner.serialize();
//! assert!(state.is_empty());
//! scanner.deserialize(&state);
//! scanner.destroy();
//! # Ok::<(), zag_scanner::ScannerError>(())
//! ```
//!
//! ## Configuration
//!
//! [`ScannerConfig`] controls the whitespace predicate used by
//! [`Scanner::skip_trivia`] and the set of closing delimiters. It derives
//! serde traits, so hosts can load it with any serde format.

pub mod cursor;
pub mod error;
pub mod scanner;


// Re-export main types
pub use cursor::{Lexer, StrLexer};
pub use error::{Position, ScannerError, Span};
pub use scanner::{ScanOutcome, Scanner, ScannerConfig, TokenKind, ValidSymbols, Verdict};
