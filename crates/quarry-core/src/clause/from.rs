//! Table references and joins.

use std::fmt::Write as _;

use crate::error::{Error, Result};
use crate::expression::{write_names, write_slice_with, Expr, Expression, SqlWriter};
use crate::value::Arg;

/// SQLite index selection on a table reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexedBy {
    /// `NOT INDEXED`.
    NotIndexed,
    /// `INDEXED BY name`.
    Index(String),
}

/// Kind of a MySQL index hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexHintKind {
    /// `USE INDEX`.
    Use,
    /// `FORCE INDEX`.
    Force,
    /// `IGNORE INDEX`.
    Ignore,
}

/// Scope of a MySQL index hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexHintFor {
    /// `FOR JOIN`.
    Join,
    /// `FOR ORDER BY`.
    OrderBy,
    /// `FOR GROUP BY`.
    GroupBy,
}

/// `USE INDEX [FOR ...] (idx, ...)`.
#[derive(Debug, Clone)]
pub struct IndexHint {
    /// Hint kind.
    pub kind: IndexHintKind,
    /// Optional scope.
    pub for_: Option<IndexHintFor>,
    /// Index names; empty is only meaningful for `USE INDEX ()`.
    pub indexes: Vec<String>,
}

impl Expression for IndexHint {
    fn write_sql(&self, w: &mut SqlWriter<'_>, _start: usize) -> Result<Vec<Arg>> {
        w.write_str(match self.kind {
            IndexHintKind::Use => "USE INDEX",
            IndexHintKind::Force => "FORCE INDEX",
            IndexHintKind::Ignore => "IGNORE INDEX",
        })?;
        match self.for_ {
            Some(IndexHintFor::Join) => w.write_str(" FOR JOIN")?,
            Some(IndexHintFor::OrderBy) => w.write_str(" FOR ORDER BY")?,
            Some(IndexHintFor::GroupBy) => w.write_str(" FOR GROUP BY")?,
            None => {}
        }
        w.write_str(" (")?;
        write_names(w, &self.indexes, true, ", ")?;
        w.write_char(')')?;
        Ok(vec![])
    }
}

/// A `FROM` item and the joins hanging off it.
#[derive(Debug, Clone, Default)]
pub struct TableRef {
    /// The table, function or subquery.
    pub expression: Option<Expr>,
    /// Alias written after `AS`.
    pub alias: Option<String>,
    /// Column aliases.
    pub columns: Vec<String>,
    /// `ONLY`.
    pub only: bool,
    /// `LATERAL`.
    pub lateral: bool,
    /// `WITH ORDINALITY`.
    pub with_ordinality: bool,
    /// SQLite index selection.
    pub indexed_by: Option<IndexedBy>,
    /// MySQL partitions.
    pub partitions: Vec<String>,
    /// MySQL index hints.
    pub index_hints: Vec<IndexHint>,
    /// Joins, each written on its own line.
    pub joins: Vec<Join>,
}

impl TableRef {
    /// A reference to `expression`.
    pub fn new(expression: Expr) -> Self {
        Self {
            expression: Some(expression),
            ..Self::default()
        }
    }

    /// Appends a join.
    pub fn append_join(&mut self, join: Join) {
        self.joins.push(join);
    }

    /// Appends an index hint.
    pub fn append_index_hint(&mut self, hint: IndexHint) {
        self.index_hints.push(hint);
    }

    /// Appends partitions.
    pub fn append_partitions(&mut self, partitions: impl IntoIterator<Item = String>) {
        self.partitions.extend(partitions);
    }
}

impl Expression for TableRef {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let Some(expression) = &self.expression else {
            return Ok(vec![]);
        };

        if self.lateral {
            w.write_str("LATERAL ")?;
        }
        if self.only {
            w.write_str("ONLY ")?;
        }
        let mut args = expression.write_sql(w, start)?;
        if self.with_ordinality {
            w.write_str(" WITH ORDINALITY")?;
        }
        if !self.partitions.is_empty() {
            w.write_str(" PARTITION (")?;
            write_names(w, &self.partitions, true, ", ")?;
            w.write_char(')')?;
        }
        if let Some(alias) = &self.alias {
            w.write_str(" AS ")?;
            w.write_quoted(alias)?;
        }
        if !self.columns.is_empty() {
            w.write_char('(')?;
            write_names(w, &self.columns, true, ", ")?;
            w.write_char(')')?;
        }
        match &self.indexed_by {
            Some(IndexedBy::NotIndexed) => w.write_str(" NOT INDEXED")?,
            Some(IndexedBy::Index(name)) => {
                w.write_str(" INDEXED BY ")?;
                w.write_quoted(name)?;
            }
            None => {}
        }
        args.extend(write_slice_with(
            w,
            start + args.len(),
            &self.index_hints,
            " ",
            " ",
            "",
        )?);
        args.extend(write_slice_with(
            w,
            start + args.len(),
            &self.joins,
            "\n",
            "\n",
            "",
        )?);
        Ok(args)
    }
}

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`.
    Inner,
    /// `LEFT JOIN`.
    Left,
    /// `RIGHT JOIN`.
    Right,
    /// `FULL JOIN`.
    Full,
    /// `CROSS JOIN`.
    Cross,
    /// MySQL `STRAIGHT_JOIN`.
    Straight,
}

impl JoinKind {
    /// Returns the SQL keywords.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
            Self::Straight => "STRAIGHT_JOIN",
        }
    }
}

/// A join and its constraint.
#[derive(Debug, Clone)]
pub struct Join {
    /// The join kind.
    pub kind: JoinKind,
    /// `NATURAL`.
    pub natural: bool,
    /// The joined table.
    pub to: TableRef,
    /// `ON` conditions, AND-ed.
    pub on: Vec<Expr>,
    /// `USING` columns.
    pub using: Vec<String>,
}

impl Join {
    /// A join of `kind` to `to` with no constraint yet.
    #[must_use]
    pub const fn new(kind: JoinKind, to: TableRef) -> Self {
        Self {
            kind,
            natural: false,
            to,
            on: Vec::new(),
            using: Vec::new(),
        }
    }
}

impl Expression for Join {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let constrained = !self.on.is_empty() || !self.using.is_empty();
        if matches!(self.kind, JoinKind::Cross | JoinKind::Straight) && constrained {
            return Err(Error::Unsupported(format!(
                "{} cannot have ON or USING",
                self.kind.as_str()
            )));
        }
        if !self.on.is_empty() && !self.using.is_empty() {
            return Err(Error::Unsupported(String::from(
                "a join cannot have both ON and USING",
            )));
        }
        if self.natural && constrained {
            return Err(Error::Unsupported(String::from(
                "NATURAL join cannot have ON or USING",
            )));
        }

        if self.natural {
            w.write_str("NATURAL ")?;
        }
        write!(w, "{} ", self.kind.as_str())?;
        let mut args = self.to.write_sql(w, start)?;
        args.extend(write_slice_with(
            w,
            start + args.len(),
            &self.on,
            " ON ",
            " AND ",
            "",
        )?);
        if !self.using.is_empty() {
            w.write_str(" USING(")?;
            write_names(w, &self.using, true, ", ")?;
            w.write_char(')')?;
        }
        Ok(args)
    }
}
