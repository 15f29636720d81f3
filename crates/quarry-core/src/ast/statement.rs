//! Statement nodes.

use super::expression::{Expr, Ident, ObjectName, WindowSpec};
use crate::lexer::Span;
use crate::query::QueryType;

/// `ASC` / `DESC` and `NULLS FIRST|LAST` on one ordering term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderingTerm {
    pub expr: Expr,
    /// `Some(true)` for `DESC`, `Some(false)` for `ASC`.
    pub desc: Option<bool>,
    /// `Some(true)` for `NULLS FIRST`.
    pub nulls_first: Option<bool>,
    pub span: Span,
}

/// `ORDER BY` with its terms; the span covers the terms only.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub terms: Vec<OrderingTerm>,
    pub span: Span,
}

/// `LIMIT n [OFFSET m]` or `LIMIT m, n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    pub count: Expr,
    pub offset: Option<Expr>,
    /// Written in the comma form.
    pub comma: bool,
    pub span: Span,
}

/// A common table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: Ident,
    pub columns: Vec<Ident>,
    /// `Some(false)` for `NOT MATERIALIZED`.
    pub materialized: Option<bool>,
    pub query: Box<Query>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct With {
    pub recursive: bool,
    pub ctes: Vec<Cte>,
    pub span: Span,
}

/// One item of a select list.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultColumn {
    /// `*` or `t.*`
    Star { table: Option<Ident>, span: Span },
    Expr {
        expr: Expr,
        alias: Option<Ident>,
        span: Span,
    },
}

impl ResultColumn {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Star { span, .. } | Self::Expr { span, .. } => *span,
        }
    }
}

/// `INDEXED BY name` / `NOT INDEXED`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexedBy {
    NotIndexed,
    Index(Ident),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableFactor {
    Table {
        name: ObjectName,
        alias: Option<Ident>,
        indexed: Option<IndexedBy>,
        span: Span,
    },
    /// `(SELECT ...) [AS] alias`
    Derived {
        query: Box<Query>,
        alias: Option<Ident>,
        span: Span,
    },
    /// `(a JOIN b ...)`
    Nested {
        inner: Box<TableWithJoins>,
        alias: Option<Ident>,
        span: Span,
    },
}

impl TableFactor {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Table { span, .. } | Self::Derived { span, .. } | Self::Nested { span, .. } => {
                *span
            }
        }
    }
}

/// Join operators; `Comma` is the `FROM a, b` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOperator {
    Comma,
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Straight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<Ident>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub operator: JoinOperator,
    pub natural: bool,
    pub factor: TableFactor,
    pub constraint: Option<JoinConstraint>,
    pub span: Span,
}

/// A table factor followed by its joins.
#[derive(Debug, Clone, PartialEq)]
pub struct TableWithJoins {
    pub factor: TableFactor,
    pub joins: Vec<Join>,
    pub span: Span,
}

/// `WINDOW name AS (...)`
#[derive(Debug, Clone, PartialEq)]
pub struct NamedWindow {
    pub name: Ident,
    pub spec: WindowSpec,
    pub span: Span,
}

/// A row of a `VALUES` list.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuesRow {
    pub items: Vec<Expr>,
    /// Written as `ROW(...)`.
    pub row_keyword: bool,
    /// Covers the parentheses (and `ROW` when present).
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValuesList {
    pub rows: Vec<ValuesRow>,
    /// Covers `VALUES` and every row.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub distinct: bool,
    pub columns: Vec<ResultColumn>,
    pub from: Option<TableWithJoins>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub windows: Vec<NamedWindow>,
    pub span: Span,
}

impl Select {
    /// Span of the whole select list.
    #[must_use]
    pub fn columns_span(&self) -> Option<Span> {
        let first = self.columns.first()?.span();
        let last = self.columns.last()?.span();
        Some(first.merge(last))
    }
}

/// One arm of a compound select.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectCore {
    Select(Box<Select>),
    Values(ValuesList),
}

impl SelectCore {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Select(s) => s.span,
            Self::Values(v) => v.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOp {
    Union,
    Intersect,
    Except,
}

impl CompoundOp {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub op: CompoundOp,
    pub all: bool,
    pub core: SelectCore,
}

/// A full select: `WITH`, arms, and the trailing `ORDER BY` / `LIMIT`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub with: Option<With>,
    pub body: SelectCore,
    pub compounds: Vec<Compound>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<Limit>,
    pub span: Span,
}

/// `col = value` or `(a, b) = (...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub columns: Vec<Ident>,
    pub value: Expr,
    pub span: Span,
}

/// `INSERT OR <action>` / `UPDATE OR <action>` (SQLite).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    Abort,
    Fail,
    Ignore,
    Replace,
    Rollback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConflictTarget {
    pub columns: Vec<Expr>,
    pub where_clause: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertAction {
    Nothing,
    Update {
        assignments: Vec<Assignment>,
        where_clause: Option<Expr>,
    },
}

/// `ON CONFLICT [target] DO ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Upsert {
    pub target: Option<ConflictTarget>,
    pub action: UpsertAction,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    Values(ValuesList),
    Query(Box<Query>),
    DefaultValues(Span),
    /// MySQL `INSERT ... SET a = 1`.
    Set(Vec<Assignment>),
}

/// MySQL `AS alias [(cols)]` after the inserted rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RowAlias {
    pub name: Ident,
    pub columns: Vec<Ident>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Returning {
    pub columns: Vec<ResultColumn>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub with: Option<With>,
    /// `REPLACE INTO` rather than `INSERT INTO`.
    pub replace: bool,
    pub or_action: Option<ConflictResolution>,
    /// MySQL modifiers such as `LOW_PRIORITY` or `IGNORE`, upper-cased.
    pub modifiers: Vec<String>,
    pub table: ObjectName,
    pub alias: Option<Ident>,
    pub columns: Vec<Ident>,
    pub source: InsertSource,
    pub row_alias: Option<RowAlias>,
    pub upserts: Vec<Upsert>,
    /// `ON DUPLICATE KEY UPDATE`
    pub duplicate_key_update: Option<Vec<Assignment>>,
    pub returning: Option<Returning>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub with: Option<With>,
    pub or_action: Option<ConflictResolution>,
    pub modifiers: Vec<String>,
    pub table: TableWithJoins,
    pub assignments: Vec<Assignment>,
    pub from: Option<TableWithJoins>,
    pub where_clause: Option<Expr>,
    pub returning: Option<Returning>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<Limit>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub with: Option<With>,
    pub modifiers: Vec<String>,
    /// MySQL multi-table targets listed before `FROM`.
    pub targets: Vec<ObjectName>,
    pub from: TableWithJoins,
    pub using: Option<TableWithJoins>,
    pub where_clause: Option<Expr>,
    pub returning: Option<Returning>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<Limit>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Query),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Statement {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Select(q) => q.span,
            Self::Insert(i) => i.span,
            Self::Update(u) => u.span,
            Self::Delete(d) => d.span,
        }
    }

    #[must_use]
    pub const fn query_type(&self) -> QueryType {
        match self {
            Self::Select(q) => match (&q.body, q.compounds.is_empty()) {
                (SelectCore::Values(_), true) => QueryType::Values,
                _ => QueryType::Select,
            },
            Self::Insert(_) => QueryType::Insert,
            Self::Update(_) => QueryType::Update,
            Self::Delete(_) => QueryType::Delete,
        }
    }
}
