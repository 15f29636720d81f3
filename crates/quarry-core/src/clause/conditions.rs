//! `WHERE`, `HAVING`, `GROUP BY`, `SET` and `RETURNING`.

use std::fmt::Write as _;

use crate::error::Result;
use crate::expression::{write_slice_with, Expr, Expression, SqlWriter};
use crate::value::Arg;

/// `WHERE cond AND cond ...`.
#[derive(Debug, Clone, Default)]
pub struct Where {
    /// The AND-ed conditions.
    pub conditions: Vec<Expr>,
}

impl Where {
    /// Appends a condition.
    pub fn append_where(&mut self, condition: Expr) {
        self.conditions.push(condition);
    }
}

impl Expression for Where {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        write_slice_with(w, start, &self.conditions, "WHERE ", " AND ", "")
    }
}

/// `HAVING cond AND cond ...`.
#[derive(Debug, Clone, Default)]
pub struct Having {
    /// The AND-ed conditions.
    pub conditions: Vec<Expr>,
}

impl Having {
    /// Appends a condition.
    pub fn append_having(&mut self, condition: Expr) {
        self.conditions.push(condition);
    }
}

impl Expression for Having {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        write_slice_with(w, start, &self.conditions, "HAVING ", " AND ", "")
    }
}

/// Grouping set suffix of `GROUP BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingSuffix {
    /// `WITH ROLLUP`.
    Rollup,
    /// `WITH CUBE`.
    Cube,
}

/// `GROUP BY [DISTINCT] expr, ... [WITH ROLLUP|CUBE]`.
#[derive(Debug, Clone, Default)]
pub struct GroupBy {
    /// Grouping expressions.
    pub groups: Vec<Expr>,
    /// `DISTINCT`.
    pub distinct: bool,
    /// Optional suffix.
    pub with: Option<GroupingSuffix>,
}

impl GroupBy {
    /// Appends a grouping expression.
    pub fn append_group(&mut self, group: Expr) {
        self.groups.push(group);
    }
}

impl Expression for GroupBy {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        if self.groups.is_empty() {
            return Ok(vec![]);
        }
        w.write_str("GROUP BY ")?;
        if self.distinct {
            w.write_str("DISTINCT ")?;
        }
        let args = write_slice_with(w, start, &self.groups, "", ", ", "")?;
        match self.with {
            Some(GroupingSuffix::Rollup) => w.write_str(" WITH ROLLUP")?,
            Some(GroupingSuffix::Cube) => w.write_str(" WITH CUBE")?,
            None => {}
        }
        Ok(args)
    }
}

/// `SET a = b, ...` items for `UPDATE`, `ON CONFLICT` and `ON DUPLICATE KEY UPDATE`.
#[derive(Debug, Clone, Default)]
pub struct Set {
    /// Assignments, each usually built with [`assign`].
    pub items: Vec<Expr>,
}

impl Set {
    /// Appends assignments.
    pub fn append_set(&mut self, items: impl IntoIterator<Item = Expr>) {
        self.items.extend(items);
    }

    /// Whether there is nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Expression for Set {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        write_slice_with(w, start, &self.items, "", ",\n", "")
    }
}

/// `"column" = value`.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// The assigned column.
    pub column: String,
    /// The new value.
    pub value: Expr,
}

/// Creates a column assignment.
pub fn assign(column: impl Into<String>, value: impl crate::expression::IntoExpr) -> Assignment {
    Assignment {
        column: column.into(),
        value: value.into_expr(),
    }
}

impl Expression for Assignment {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        w.write_quoted(&self.column)?;
        w.write_str(" = ")?;
        self.value.write_sql(w, start)
    }
}

/// `RETURNING expr, ...`.
#[derive(Debug, Clone, Default)]
pub struct Returning {
    /// Returned expressions.
    pub expressions: Vec<Expr>,
}

impl Returning {
    /// Appends returned expressions.
    pub fn append_returning(&mut self, expressions: impl IntoIterator<Item = Expr>) {
        self.expressions.extend(expressions);
    }
}

impl Expression for Returning {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        write_slice_with(w, start, &self.expressions, "RETURNING ", ", ", "")
    }
}
