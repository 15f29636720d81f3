//! Parse errors.

use std::fmt;

use crate::lexer::{Span, TokenKind};

/// The parser rejected the input.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    /// What the parser was looking for, when known.
    pub expected: Option<String>,
    pub found: Option<TokenKind>,
}

impl ParseError {
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: None,
            found: None,
        }
    }

    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        let expected = expected.into();
        let message = if matches!(found, TokenKind::Eof) {
            format!("unexpected end of input: expected {expected}")
        } else {
            format!("unexpected token: expected {expected}, found {found:?}")
        };
        Self {
            message,
            span,
            expected: Some(expected),
            found: Some(found),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at position {}..{}",
            self.message, self.span.start, self.span.end
        )
    }
}

impl std::error::Error for ParseError {}
