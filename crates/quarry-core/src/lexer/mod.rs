//! SQL tokenizer.
//!
//! Produces a flat token stream with byte spans. Comments are not tokens; they are
//! collected as [`Comment`] trivia so callers can read configuration out of them.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Comment, CommentKind, Keyword, Parameter, Token, TokenKind};
pub use tokenizer::Lexer;
