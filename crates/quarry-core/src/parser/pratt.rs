//! Operator precedence for the expression parser.
//!
//! Higher binding power binds tighter; `(left, right)` pairs with `left < right` are
//! left-associative.

use crate::ast::{BinaryOp, LikeOp, UnaryOp};
use crate::lexer::{Keyword, TokenKind};

pub const NOT_PREFIX: u8 = 5;
/// Right binding power used for the operands of `BETWEEN`, `LIKE` and `IN`.
pub const COMPARISON_RHS: u8 = 8;
pub const COLLATE: u8 = 19;
pub const UNARY: u8 = 21;

/// Binding power of the postfix/infix-keyword family (`IS`, `IN`, `NOT IN`, `LIKE`, ...).
pub const PREDICATE: (u8, u8) = (7, 8);

#[must_use]
pub const fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    match kind {
        TokenKind::Keyword(Keyword::Or) => Some((1, 2)),
        TokenKind::Keyword(Keyword::And) => Some((3, 4)),
        TokenKind::Eq | TokenKind::NotEq | TokenKind::NullSafeEq => Some((7, 8)),
        TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => Some((9, 10)),
        TokenKind::BitAnd
        | TokenKind::BitOr
        | TokenKind::LeftShift
        | TokenKind::RightShift => Some((11, 12)),
        TokenKind::Plus | TokenKind::Minus => Some((13, 14)),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((15, 16)),
        TokenKind::Concat | TokenKind::Arrow | TokenKind::LongArrow => Some((17, 18)),
        _ => None,
    }
}

/// Keywords that continue an expression as a predicate.
#[must_use]
pub const fn is_predicate_keyword(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Keyword(
            Keyword::Is
                | Keyword::Isnull
                | Keyword::Notnull
                | Keyword::In
                | Keyword::Between
                | Keyword::Like
                | Keyword::Glob
                | Keyword::Regexp
                | Keyword::Match
        )
    )
}

#[must_use]
pub const fn token_to_binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Percent => Some(BinaryOp::Mod),
        TokenKind::Eq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::NotEq),
        TokenKind::NullSafeEq => Some(BinaryOp::NullSafeEq),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::LtEq => Some(BinaryOp::LtEq),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::GtEq => Some(BinaryOp::GtEq),
        TokenKind::Keyword(Keyword::And) => Some(BinaryOp::And),
        TokenKind::Keyword(Keyword::Or) => Some(BinaryOp::Or),
        TokenKind::Concat => Some(BinaryOp::Concat),
        TokenKind::Arrow => Some(BinaryOp::JsonExtract),
        TokenKind::LongArrow => Some(BinaryOp::JsonExtractText),
        TokenKind::BitAnd => Some(BinaryOp::BitAnd),
        TokenKind::BitOr => Some(BinaryOp::BitOr),
        TokenKind::LeftShift => Some(BinaryOp::LeftShift),
        TokenKind::RightShift => Some(BinaryOp::RightShift),
        _ => None,
    }
}

#[must_use]
pub const fn token_to_unary_op(kind: &TokenKind) -> Option<(UnaryOp, u8)> {
    match kind {
        TokenKind::Minus => Some((UnaryOp::Neg, UNARY)),
        TokenKind::Plus => Some((UnaryOp::Plus, UNARY)),
        TokenKind::BitNot => Some((UnaryOp::BitNot, UNARY)),
        TokenKind::Keyword(Keyword::Not) => Some((UnaryOp::Not, NOT_PREFIX)),
        _ => None,
    }
}

#[must_use]
pub const fn token_to_like_op(kind: &TokenKind) -> Option<LikeOp> {
    match kind {
        TokenKind::Keyword(Keyword::Like) => Some(LikeOp::Like),
        TokenKind::Keyword(Keyword::Glob) => Some(LikeOp::Glob),
        TokenKind::Keyword(Keyword::Regexp) => Some(LikeOp::Regexp),
        TokenKind::Keyword(Keyword::Match) => Some(LikeOp::Match),
        _ => None,
    }
}
