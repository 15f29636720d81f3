//! `ON CONFLICT`, `ON DUPLICATE KEY UPDATE` and `VALUES`.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::clause::conditions::{Set, Where};
use crate::error::{Error, Result};
use crate::expression::{write_names, write_slice_with, Expr, Expression, SqlWriter};
use crate::query::Query;
use crate::value::Arg;

/// What `ON CONFLICT` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
    /// `DO NOTHING`.
    Nothing,
    /// `DO UPDATE SET ...`.
    Update,
}

/// The conflict target: a constraint name or indexed columns with an optional predicate.
#[derive(Debug, Clone, Default)]
pub struct ConflictTarget {
    /// `ON CONSTRAINT name`.
    pub constraint: Option<String>,
    /// Indexed columns.
    pub columns: Vec<String>,
    /// Partial index predicate.
    pub where_: Vec<Expr>,
}

/// `ON CONFLICT [target] DO NOTHING | DO UPDATE SET ... [WHERE ...]`.
#[derive(Debug, Clone, Default)]
pub struct OnConflict {
    /// The action; mandatory.
    pub action: Option<ConflictAction>,
    /// Optional target.
    pub target: ConflictTarget,
    /// Assignments for `DO UPDATE`.
    pub set: Set,
    /// Condition for `DO UPDATE`.
    pub where_: Where,
}

impl Expression for OnConflict {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let action = self
            .action
            .ok_or(Error::MissingMandatory("conflict action must be set"))?;

        w.write_str("ON CONFLICT")?;
        let mut args = Vec::new();
        if let Some(constraint) = &self.target.constraint {
            w.write_str(" ON CONSTRAINT ")?;
            w.write_quoted(constraint)?;
        } else if !self.target.columns.is_empty() {
            w.write_str(" (")?;
            write_names(w, &self.target.columns, true, ", ")?;
            w.write_char(')')?;
            args.extend(write_slice_with(
                w,
                start,
                &self.target.where_,
                " WHERE ",
                " AND ",
                "",
            )?);
        }

        match action {
            ConflictAction::Nothing => w.write_str(" DO NOTHING")?,
            ConflictAction::Update => {
                if self.set.is_empty() {
                    return Err(Error::MissingMandatory(
                        "conflict update needs at least one assignment",
                    ));
                }
                w.write_str(" DO UPDATE SET\n")?;
                args.extend(self.set.write_sql(w, start + args.len())?);
                if !self.where_.conditions.is_empty() {
                    w.write_char('\n')?;
                    args.extend(self.where_.write_sql(w, start + args.len())?);
                }
            }
        }
        Ok(args)
    }
}

/// MySQL `ON DUPLICATE KEY UPDATE a = b, ...`.
#[derive(Debug, Clone, Default)]
pub struct DuplicateKeyUpdate {
    /// The assignments.
    pub set: Set,
}

impl Expression for DuplicateKeyUpdate {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        if self.set.is_empty() {
            return Ok(vec![]);
        }
        w.write_str("ON DUPLICATE KEY UPDATE ")?;
        write_slice_with(w, start, &self.set.items, "", ", ", "")
    }
}

/// The row source of an `INSERT`: a query, literal rows or `DEFAULT VALUES`.
#[derive(Debug, Clone, Default)]
pub struct Values {
    /// An `INSERT ... SELECT` source, preferred over rows.
    pub query: Option<Arc<dyn Query>>,
    /// Literal rows.
    pub rows: Vec<Vec<Expr>>,
    /// Write each row as `ROW(...)`.
    pub row_constructor: bool,
}

impl Values {
    /// Appends one row.
    pub fn append_row(&mut self, row: Vec<Expr>) {
        self.rows.push(row);
    }

    pub(crate) fn write_rows(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let open = if self.row_constructor { "ROW(" } else { "(" };
        w.write_str("VALUES ")?;
        let mut args = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            w.ctx().check()?;
            if i > 0 {
                w.write_str(", ")?;
            }
            w.write_str(open)?;
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    w.write_str(", ")?;
                }
                args.extend(value.write_sql(w, start + args.len())?);
            }
            w.write_char(')')?;
        }
        Ok(args)
    }
}

impl Expression for Values {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        if let Some(query) = &self.query {
            return query.write_query(w, start);
        }
        if self.rows.is_empty() {
            w.write_str("DEFAULT VALUES")?;
            return Ok(vec![]);
        }
        self.write_rows(w, start)
    }
}
