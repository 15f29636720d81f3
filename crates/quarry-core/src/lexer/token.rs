//! Token types produced by [`Lexer`](super::Lexer).

use super::Span;

macro_rules! keywords {
    ($($variant:ident => $text:literal),+ $(,)?) => {
        /// SQL keywords recognised by the lexer.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $(
                #[doc = $text]
                $variant,
            )+
        }

        impl Keyword {
            /// Looks a keyword up case-insensitively.
            #[must_use]
            #[allow(clippy::should_implement_trait)]
            pub fn from_str(s: &str) -> Option<Self> {
                match s.to_ascii_uppercase().as_str() {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Canonical upper-case spelling.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }
    };
}

keywords! {
    Select => "SELECT",
    From => "FROM",
    Where => "WHERE",
    Group => "GROUP",
    By => "BY",
    Having => "HAVING",
    Order => "ORDER",
    Limit => "LIMIT",
    Offset => "OFFSET",
    Distinct => "DISTINCT",
    All => "ALL",
    As => "AS",
    Join => "JOIN",
    Inner => "INNER",
    Left => "LEFT",
    Right => "RIGHT",
    Full => "FULL",
    Outer => "OUTER",
    Cross => "CROSS",
    Natural => "NATURAL",
    StraightJoin => "STRAIGHT_JOIN",
    On => "ON",
    Using => "USING",
    Union => "UNION",
    Intersect => "INTERSECT",
    Except => "EXCEPT",
    Insert => "INSERT",
    Into => "INTO",
    Values => "VALUES",
    Update => "UPDATE",
    Set => "SET",
    Delete => "DELETE",
    Replace => "REPLACE",
    Default => "DEFAULT",
    Returning => "RETURNING",
    Conflict => "CONFLICT",
    Do => "DO",
    Nothing => "NOTHING",
    Duplicate => "DUPLICATE",
    Key => "KEY",
    Abort => "ABORT",
    Fail => "FAIL",
    Ignore => "IGNORE",
    Rollback => "ROLLBACK",
    Indexed => "INDEXED",
    And => "AND",
    Or => "OR",
    Not => "NOT",
    In => "IN",
    Is => "IS",
    Isnull => "ISNULL",
    Notnull => "NOTNULL",
    Null => "NULL",
    True => "TRUE",
    False => "FALSE",
    Between => "BETWEEN",
    Like => "LIKE",
    Glob => "GLOB",
    Regexp => "REGEXP",
    Match => "MATCH",
    Escape => "ESCAPE",
    Exists => "EXISTS",
    Case => "CASE",
    When => "WHEN",
    Then => "THEN",
    Else => "ELSE",
    End => "END",
    Cast => "CAST",
    Collate => "COLLATE",
    Asc => "ASC",
    Desc => "DESC",
    Nulls => "NULLS",
    First => "FIRST",
    Last => "LAST",
    With => "WITH",
    Recursive => "RECURSIVE",
    Materialized => "MATERIALIZED",
    Over => "OVER",
    Filter => "FILTER",
    Partition => "PARTITION",
    Window => "WINDOW",
    Rows => "ROWS",
    Range => "RANGE",
    Groups => "GROUPS",
    Unbounded => "UNBOUNDED",
    Preceding => "PRECEDING",
    Following => "FOLLOWING",
    Current => "CURRENT",
    Row => "ROW",
    Exclude => "EXCLUDE",
    No => "NO",
    Others => "OTHERS",
    Ties => "TIES",
    CurrentDate => "CURRENT_DATE",
    CurrentTime => "CURRENT_TIME",
    CurrentTimestamp => "CURRENT_TIMESTAMP",
}

impl Keyword {
    /// Reserved keywords cannot be used as bare identifiers or aliases.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        matches!(
            self,
            Self::Select
                | Self::From
                | Self::Where
                | Self::Group
                | Self::Having
                | Self::Order
                | Self::Limit
                | Self::Offset
                | Self::Distinct
                | Self::All
                | Self::As
                | Self::Join
                | Self::Inner
                | Self::Left
                | Self::Right
                | Self::Full
                | Self::Outer
                | Self::Cross
                | Self::Natural
                | Self::StraightJoin
                | Self::On
                | Self::Using
                | Self::Union
                | Self::Intersect
                | Self::Except
                | Self::Insert
                | Self::Into
                | Self::Values
                | Self::Update
                | Self::Set
                | Self::Delete
                | Self::Default
                | Self::Returning
                | Self::Indexed
                | Self::And
                | Self::Or
                | Self::Not
                | Self::In
                | Self::Is
                | Self::Isnull
                | Self::Notnull
                | Self::Null
                | Self::True
                | Self::False
                | Self::Between
                | Self::Like
                | Self::Glob
                | Self::Regexp
                | Self::Match
                | Self::Escape
                | Self::Exists
                | Self::Case
                | Self::When
                | Self::Then
                | Self::Else
                | Self::End
                | Self::Cast
                | Self::Collate
                | Self::Asc
                | Self::Desc
                | Self::With
                | Self::Window
                | Self::CurrentDate
                | Self::CurrentTime
                | Self::CurrentTimestamp
        )
    }
}

/// A bind parameter as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Parameter {
    /// `?`
    Anonymous,
    /// `?NNN`
    Numbered(u32),
    /// `:name`, `@name` or `$name`; the prefix is kept.
    Named { prefix: char, name: String },
}

impl Parameter {
    /// The identity used to merge repeated uses of the same bind, if any.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Anonymous => None,
            Self::Numbered(n) => Some(n.to_string()),
            Self::Named { name, .. } => Some(name.clone()),
        }
    }
}

/// Whether a comment was written `-- ...` or `/* ... */`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

/// A comment skipped by the lexer; kept as trivia for the transpiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    /// The whole comment including its delimiters.
    pub span: Span,
    /// The comment body, trimmed and without delimiters.
    pub text: String,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Integer literal that fits in 64 bits.
    Integer(i64),
    /// Float literal, or an integer literal too large for 64 bits.
    Float(f64),
    /// `'...'`
    String(String),
    /// `X'...'`
    Blob(Vec<u8>),
    /// Bare identifier.
    Identifier(String),
    /// `"..."`, `` `...` `` or `[...]`, already unquoted.
    QuotedIdentifier(String),
    Keyword(Keyword),
    Parameter(Parameter),

    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// `=` or `==`
    Eq,
    /// `!=` or `<>`
    NotEq,
    /// `<=>`
    NullSafeEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,
    /// ->
    Arrow,
    /// ->>
    LongArrow,
    /// &
    BitAnd,
    /// |
    BitOr,
    /// ~
    BitNot,
    /// <<
    LeftShift,
    /// >>
    RightShift,

    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,
    /// ::
    DoubleColon,

    Eof,
    /// Invalid input; carries a description.
    Error(String),
}

/// A token and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_ignores_case() {
        assert_eq!(Keyword::from_str("straight_join"), Some(Keyword::StraightJoin));
        assert_eq!(Keyword::from_str("Current_Timestamp"), Some(Keyword::CurrentTimestamp));
        assert_eq!(Keyword::from_str("users"), None);
        assert_eq!(Keyword::Materialized.as_str(), "MATERIALIZED");
    }

    #[test]
    fn reserved_words() {
        assert!(Keyword::Select.is_reserved());
        assert!(Keyword::Returning.is_reserved());
        assert!(!Keyword::Key.is_reserved());
        assert!(!Keyword::Replace.is_reserved());
        assert!(!Keyword::Row.is_reserved());
    }

    #[test]
    fn parameter_keys() {
        assert_eq!(Parameter::Anonymous.key(), None);
        assert_eq!(Parameter::Numbered(3).key().as_deref(), Some("3"));
        let named = Parameter::Named {
            prefix: ':',
            name: "id".into(),
        };
        assert_eq!(named.key().as_deref(), Some("id"));
    }

    #[test]
    fn token_keyword_accessor() {
        let t = Token::new(TokenKind::Keyword(Keyword::Where), Span::new(0, 5));
        assert_eq!(t.as_keyword(), Some(Keyword::Where));
        assert!(!t.is_eof());
        assert!(Token::new(TokenKind::Eof, Span::point(5)).is_eof());
    }
}
