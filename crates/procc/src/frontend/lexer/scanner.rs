//! Scanner built on the logos token DFA
//!
//! logos matches the longest token at each position, so a character that is
//! read only to decide whether a token continues (the `=` after `:`, the
//! character after an identifier) is left in place and starts the next token.
//! This wrapper adds what the DFA cannot express: line numbers, nested
//! block comments and scan errors.

use super::token::{Token, TokenKind};
use crate::common::{CompileError, CompileResult, Span};
use logos::Logos;

/// Scanner over a source string
pub struct Scanner<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    line: usize,
    /// Byte offset up to which newlines have been counted into `line`
    counted: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            line: 1,
            counted: 0,
        }
    }

    /// Get the next token, or `None` at end of input
    pub fn next_token(&mut self) -> CompileResult<Option<Token>> {
        loop {
            let Some(result) = self.inner.next() else {
                return Ok(None);
            };
            let range = self.inner.span();
            self.advance_to(range.start);
            let span = Span::new(range.start, range.end);

            match result {
                Ok(TokenKind::CommentOpen) => self.skip_block_comment(),
                Ok(TokenKind::CommentClose) => {
                    return Err(CompileError::scan(
                        "'*/' without a matching '/*'",
                        self.line,
                        span,
                    ));
                }
                Ok(kind) => return Ok(Some(Token::new(kind, self.line, span))),
                Err(()) => return Err(self.error(span)),
            }
        }
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize_all(mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        log::debug!("scanned {} tokens over {} lines", tokens.len(), self.line);
        Ok(tokens)
    }

    /// Count the newlines between the last counted offset and `offset`
    fn advance_to(&mut self, offset: usize) {
        let skipped = &self.inner.source()[self.counted..offset];
        self.line += skipped.bytes().filter(|&b| b == b'\n').count();
        self.counted = offset;
    }

    /// Skip past the `*/` closing the comment just opened, honouring nesting.
    /// A comment still open at end of input swallows the rest of it.
    fn skip_block_comment(&mut self) {
        let rest = self.inner.remainder().as_bytes();
        let mut depth = 1usize;
        let mut i = 0;
        while i < rest.len() {
            match (rest[i], rest.get(i + 1)) {
                (b'/', Some(b'*')) => {
                    depth += 1;
                    i += 2;
                }
                (b'*', Some(b'/')) => {
                    depth -= 1;
                    i += 2;
                    if depth == 0 {
                        break;
                    }
                }
                _ => i += 1,
            }
        }
        self.inner.bump(i.min(rest.len()));
    }

    fn error(&self, span: Span) -> CompileError {
        let text = self.inner.slice();
        let message = match text.chars().next() {
            Some('"') => "unterminated string literal".to_string(),
            Some(c) if c.is_ascii_digit() => format!("malformed numeric literal '{text}'"),
            Some(c) => format!("unrecognized character '{c}'"),
            None => "unexpected end of input".to_string(),
        };
        CompileError::scan(message, self.line, span)
    }
}

/// Scan `source` into its full token sequence, failing on the first error
pub fn scan(source: &str) -> CompileResult<Vec<Token>> {
    Scanner::new(source).tokenize_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("PROGRAM Is begin End GLOBAL procedure"),
            vec![
                TokenKind::Program,
                TokenKind::Is,
                TokenKind::Begin,
                TokenKind::End,
                TokenKind::Global,
                TokenKind::Procedure,
            ]
        );
    }

    #[test]
    fn test_identifiers_fold_to_lowercase() {
        assert_eq!(
            kinds("Foo bar_Baz x1"),
            vec![
                TokenKind::Identifier("foo".into()),
                TokenKind::Identifier("bar_baz".into()),
                TokenKind::Identifier("x1".into()),
            ]
        );
    }

    #[test]
    fn test_unicode_identifiers() {
        assert_eq!(
            kinds("Café := Größe"),
            vec![
                TokenKind::Identifier("café".into()),
                TokenKind::Assign,
                TokenKind::Identifier("größe".into()),
            ]
        );
        let tokens = scan("Café").unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 5));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 3.5 1_000 7."),
            vec![
                TokenKind::IntLiteral(42),
                TokenKind::FloatLiteral(3.5),
                TokenKind::IntLiteral(1000),
                TokenKind::FloatLiteral(7.0),
            ]
        );
    }

    #[test]
    fn test_second_dot_restarts_tokenization() {
        assert_eq!(
            kinds("1.2.3"),
            vec![TokenKind::FloatLiteral(1.2), TokenKind::Dot, TokenKind::IntLiteral(3)]
        );
    }

    #[test]
    fn test_number_overflow_is_error() {
        let err = scan("x := 99999999999999999999;").unwrap_err();
        assert!(matches!(err, CompileError::Scan { line: 1, .. }));
    }

    #[test]
    fn test_two_character_operators() {
        assert_eq!(
            kinds(":= <= >= == != : < >"),
            vec![
                TokenKind::Assign,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Colon,
                TokenKind::Lt,
                TokenKind::Gt,
            ]
        );
    }

    #[test]
    fn test_lookahead_character_is_reused() {
        // the character checked for pairing starts the next token
        assert_eq!(
            kinds("x:integer"),
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Colon,
                TokenKind::Integer,
            ]
        );
        assert_eq!(
            kinds("a<b"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Lt,
                TokenKind::Identifier("b".into()),
            ]
        );
        assert_eq!(
            kinds("a<(1)"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Lt,
                TokenKind::LParen,
                TokenKind::IntLiteral(1),
                TokenKind::RParen,
            ]
        );
        assert_eq!(
            kinds("f(x);"),
            vec![
                TokenKind::Identifier("f".into()),
                TokenKind::LParen,
                TokenKind::Identifier("x".into()),
                TokenKind::RParen,
                TokenKind::Semi,
            ]
        );
    }

    #[test]
    fn test_lookahead_newline_still_counts() {
        let tokens = scan("a<\nb").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Lt);
        assert_eq!(tokens[1].line, 1);
        assert_eq!(tokens[2].line, 2);
    }

    #[test]
    fn test_lone_equals_is_error() {
        let err = scan("x = 1").unwrap_err();
        assert!(matches!(err, CompileError::Scan { line: 1, .. }));
        assert!(scan("!x").is_err());
    }

    #[test]
    fn test_line_numbers() {
        let tokens = scan("program\n\nx\n  y").unwrap();
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 3, 4]);
    }

    #[test]
    fn test_line_comment() {
        assert_eq!(
            kinds("x // ignored := \"\ny"),
            vec![TokenKind::Identifier("x".into()), TokenKind::Identifier("y".into())]
        );
    }

    #[test]
    fn test_nested_block_comments() {
        assert_eq!(kinds("/* a /* b */ c */ x"), vec![TokenKind::Identifier("x".into())]);
    }

    #[test]
    fn test_block_comment_tracks_lines() {
        let tokens = scan("/* one\ntwo */\nx").unwrap();
        assert_eq!(tokens[0].line, 3);
    }

    #[test]
    fn test_unmatched_comment_close_is_error() {
        let err = scan("x */ y").unwrap_err();
        assert!(matches!(err, CompileError::Scan { line: 1, .. }));
    }

    #[test]
    fn test_star_and_slash_operators() {
        assert_eq!(
            kinds("a*b/c"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Star,
                TokenKind::Identifier("b".into()),
                TokenKind::Slash,
                TokenKind::Identifier("c".into()),
            ]
        );
    }

    #[test]
    fn test_string_literal() {
        let tokens = scan("\"Hello, World\" x").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral("Hello, World".into()));
        assert_eq!(tokens[1].kind, TokenKind::Identifier("x".into()));
    }

    #[test]
    fn test_multiline_string_counts_lines() {
        let tokens = scan("\"a\nb\" x").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral("a\nb".into()));
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_unterminated_string_reports_start_line() {
        let err = scan("x\n\"abc\ndef").unwrap_err();
        match err {
            CompileError::Scan { line, .. } => assert_eq!(line, 2),
            other => panic!("expected scan error, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_character() {
        let err = scan("x @ y").unwrap_err();
        assert!(matches!(err, CompileError::Scan { .. }));
    }

    #[test]
    fn test_rescanning_token_text_is_idempotent() {
        let source = "program p is variable x : float[10]; begin x[2] := -3.25 * (y <= 4); \
                      if (s != \"abc\") then end if; end program.";
        let tokens = scan(source).unwrap();
        for token in &tokens {
            let text = &source[token.span.start..token.span.end];
            let rescanned = scan(text).unwrap();
            assert_eq!(rescanned.len(), 1, "re-scanning {text:?}");
            assert_eq!(rescanned[0].kind, token.kind);
        }
    }

    #[test]
    fn test_unclosed_block_comment_ends_input() {
        assert_eq!(kinds("x /* never /* closed */"), vec![TokenKind::Identifier("x".into())]);
    }

    #[test]
    fn test_error_messages() {
        let message = |source: &str| match scan(source).unwrap_err() {
            CompileError::Scan { message, .. } => message,
            other => panic!("expected scan error, got {other:?}"),
        };
        assert_eq!(message("x @ y"), "unrecognized character '@'");
        assert_eq!(message("\"open"), "unterminated string literal");
        assert_eq!(message("*/"), "'*/' without a matching '/*'");
    }

    #[test]
    fn test_spans() {
        let tokens = scan("ab := 12").unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].span, Span::new(3, 5));
        assert_eq!(tokens[2].span, Span::new(6, 8));
    }
}
