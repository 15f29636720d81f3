//! Expression nodes.

use super::statement::{OrderingTerm, Query};
use crate::lexer::{Parameter, Span};

/// An identifier with its unquoted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// The name without quotes.
    pub value: String,
    /// Whether the source wrapped it in quotes.
    pub quoted: bool,
    pub span: Span,
}

impl Ident {
    #[must_use]
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            quoted: false,
            span,
        }
    }

    /// Case-insensitive match against `name`.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.value.eq_ignore_ascii_case(name)
    }
}

/// `schema.name` as used for tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName {
    pub schema: Option<Ident>,
    pub name: Ident,
    pub span: Span,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    /// Decimal, exponent or out-of-range integer literal.
    Float(f64),
    String(String),
    Blob(Vec<u8>),
    Boolean(bool),
    Null,
    CurrentDate,
    CurrentTime,
    CurrentTimestamp,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    /// `<=>`
    NullSafeEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Concat,
    BitAnd,
    BitOr,
    LeftShift,
    RightShift,
    /// `->`
    JsonExtract,
    /// `->>`
    JsonExtractText,
}

impl BinaryOp {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::NullSafeEq => "<=>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Concat => "||",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            Self::JsonExtract => "->",
            Self::JsonExtractText => "->>",
        }
    }

    /// Comparison operators produce booleans from any operand type.
    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::NullSafeEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
}

impl UnaryOp {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
            Self::Not => "NOT",
            Self::BitNot => "~",
        }
    }
}

/// Pattern-matching operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOp {
    Like,
    Glob,
    Regexp,
    Match,
}

/// Right-hand side of `IN`.
#[derive(Debug, Clone, PartialEq)]
pub enum InList {
    /// `(a, b, c)`; the span includes the parentheses.
    Exprs { items: Vec<Expr>, span: Span },
    /// `(SELECT ...)`
    Subquery { query: Box<Query>, span: Span },
    /// `IN table_name` (SQLite).
    Table(ObjectName),
}

impl InList {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Exprs { span, .. } | Self::Subquery { span, .. } => *span,
            Self::Table(name) => name.span,
        }
    }
}

/// Arguments of a function call.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionArgs {
    /// `f(*)`
    Star(Span),
    List(Vec<Expr>),
}

/// Frame mode of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnits {
    Rows,
    Range,
    Groups,
}

/// One end of a window frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(Box<Expr>),
    CurrentRow,
    Following(Box<Expr>),
    UnboundedFollowing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameExclude {
    NoOthers,
    CurrentRow,
    Group,
    Ties,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpec {
    pub units: FrameUnits,
    pub start: FrameBound,
    pub end: Option<FrameBound>,
    pub exclude: Option<FrameExclude>,
    pub span: Span,
}

/// A window definition, inline after `OVER` or named in a `WINDOW` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub base: Option<Ident>,
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderingTerm>,
    pub frame: Option<FrameSpec>,
    pub span: Span,
}

/// What follows `OVER`.
#[derive(Debug, Clone, PartialEq)]
pub enum Over {
    Named(Ident),
    Spec(WindowSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: Ident,
    pub args: FunctionArgs,
    pub distinct: bool,
    /// `FILTER (WHERE ...)`
    pub filter: Option<Box<Expr>>,
    pub over: Option<Over>,
}

/// `WHEN cond THEN result`
#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub condition: Expr,
    pub result: Expr,
}

/// An expression node together with its source range.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),

    /// A possibly qualified column reference.
    Column {
        schema: Option<Ident>,
        table: Option<Ident>,
        name: Ident,
    },

    /// `*` or `t.*`; only valid as a result column or `count(*)`.
    Wildcard { table: Option<Ident> },

    Bind(Parameter),

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// `IS NULL`, `ISNULL`, `NOTNULL`, `IS NOT NULL`.
    IsNull { expr: Box<Expr>, negated: bool },

    /// `a IS [NOT] [DISTINCT FROM] b`
    Is {
        left: Box<Expr>,
        right: Box<Expr>,
        negated: bool,
    },

    In {
        expr: Box<Expr>,
        list: InList,
        negated: bool,
    },

    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    Like {
        expr: Box<Expr>,
        op: LikeOp,
        pattern: Box<Expr>,
        escape: Option<Box<Expr>>,
        negated: bool,
    },

    Function(FunctionCall),

    Cast {
        expr: Box<Expr>,
        /// The type name as written, upper-cased with normalised spacing.
        type_name: String,
        type_span: Span,
    },

    Case {
        operand: Option<Box<Expr>>,
        when_clauses: Vec<WhenClause>,
        else_clause: Option<Box<Expr>>,
    },

    Exists(Box<Query>),

    /// A scalar sub-select.
    Subquery(Box<Query>),

    /// `(expr)`
    Nested(Box<Expr>),

    /// `(a, b, ...)` with at least two items.
    List(Vec<Expr>),

    /// `ROW(a, b, ...)`
    Row(Vec<Expr>),

    Collate { expr: Box<Expr>, collation: Ident },
}

impl Expr {
    #[must_use]
    pub const fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Strips any number of redundant parentheses.
    #[must_use]
    pub fn unnested(&self) -> &Self {
        let mut e = self;
        while let ExprKind::Nested(inner) = &e.kind {
            e = inner;
        }
        e
    }

    #[must_use]
    pub const fn is_bind(&self) -> bool {
        matches!(self.kind, ExprKind::Bind(_))
    }
}
