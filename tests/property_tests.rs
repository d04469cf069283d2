use proptest::prelude::*;
use zag_scanner::{Lexer, Scanner, StrLexer, TokenKind, ValidSymbols, Verdict};

/// Source fragments dense in trivia, delimiters and comment markers
fn trivia_heavy_source() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            3 => prop::sample::select(vec![
                " ", "\t", "\r", "\n", "/", "*", "//", "/*", "*/", "}", ")", "]",
            ])
            .prop_map(str::to_string),
            1 => "[a-z]{1,3}",
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

fn candidate_sets() -> impl Strategy<Value = ValidSymbols> {
    prop::collection::vec(any::<bool>(), TokenKind::COUNT)
        .prop_map(|flags| ValidSymbols::from_flags(&flags).expect("one flag per kind"))
}

/// Cursor wrapper that fails the test if the position ever moves backward
struct MonotonicLexer<'a> {
    inner: StrLexer<'a>,
    high_water: usize,
}

impl Lexer for MonotonicLexer<'_> {
    fn lookahead(&self) -> Option<char> {
        self.inner.lookahead()
    }

    fn advance(&mut self, skip: bool) {
        self.inner.advance(skip);
        let offset = self.inner.current_position().offset;
        assert!(offset >= self.high_water, "cursor moved backward");
        self.high_water = offset;
    }

    fn mark_end(&mut self) {
        self.inner.mark_end();
    }

    fn eof(&self) -> bool {
        self.inner.eof()
    }
}

proptest! {
    #[test]
    fn test_property_scan_is_deterministic(source in trivia_heavy_source(), valid in candidate_sets()) {
        let scanner = Scanner::new();
        let first = scanner.scan_source(&source, 0, valid).unwrap();
        let second = scanner.scan_source(&source, 0, valid).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_property_no_terminator_candidate_no_advance(source in trivia_heavy_source(), valid in candidate_sets()) {
        let mut valid = valid;
        valid.remove(TokenKind::AutomaticSemicolon);

        let mut lexer = StrLexer::new(&source);
        let verdict = Scanner::new().scan(&mut lexer, valid);
        prop_assert_eq!(verdict, Verdict::Declined);
        prop_assert_eq!(lexer.current_position().offset, 0);
    }

    #[test]
    fn test_property_terminator_is_zero_width_at_start(source in trivia_heavy_source(), start in 0usize..8) {
        let offset = (0..=start.min(source.len()))
            .rev()
            .find(|i| source.is_char_boundary(*i))
            .unwrap_or(0);
        let outcome = Scanner::new()
            .scan_source(&source, offset, ValidSymbols::all())
            .unwrap();

        prop_assert_eq!(outcome.token_end.offset, offset);
        prop_assert!(outcome.cursor.offset >= offset);
        if let Verdict::Recognized(kind) = outcome.verdict {
            prop_assert_eq!(kind, TokenKind::AutomaticSemicolon);
        }
    }

    #[test]
    fn test_property_cursor_never_moves_backward(source in trivia_heavy_source()) {
        let mut lexer = MonotonicLexer { inner: StrLexer::new(&source), high_water: 0 };
        let scanner = Scanner::new();
        scanner.scan(&mut lexer, ValidSymbols::all());
        scanner.skip_trivia(&mut lexer);
        prop_assert_eq!(lexer.inner.consumed_chars(), 0);
    }

    #[test]
    fn test_property_recognized_after_line_break_sees_delimiter(source in trivia_heavy_source()) {
        let mut lexer = StrLexer::new(&source);
        let verdict = Scanner::new().scan(&mut lexer, ValidSymbols::all());
        if verdict.is_recognized() && !lexer.eof() {
            let skipped = &source[..lexer.current_position().offset];
            prop_assert!(skipped.contains('\n'));
            let closing = matches!(lexer.lookahead(), Some('}' | ')' | ']'));
            prop_assert!(closing, "lookahead {:?} after a recognized line break", lexer.lookahead());
        }
    }
}
