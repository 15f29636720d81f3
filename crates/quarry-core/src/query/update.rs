use std::fmt::Write as _;

use super::{impl_query, write_line, ContextualMods, Hooks, QueryType};
use crate::clause::{Hints, Limit, Modifiers, OrderBy, Returning, Set, TableRef, Where, With};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::expression::{write_one_if, Expression, SqlWriter};
use crate::value::Arg;

/// An `UPDATE` statement.
///
/// `ORDER BY` and `LIMIT` are only accepted for the single-table form; an update whose target
/// has joins fails to render with them.
#[derive(Debug, Clone)]
pub struct UpdateQuery {
    pub(crate) dialect: &'static dyn Dialect,
    /// `WITH`.
    pub with: With,
    /// Optimizer hints.
    pub hints: Hints,
    /// Keywords after `UPDATE`.
    pub modifiers: Modifiers,
    /// Target table and, for MySQL, the joined tables.
    pub table: TableRef,
    /// Assignments.
    pub set: Set,
    /// `FROM` of the Postgres and SQLite form.
    pub from: TableRef,
    /// `WHERE`.
    pub where_: Where,
    /// `ORDER BY`.
    pub order_by: OrderBy,
    /// `LIMIT`.
    pub limit: Limit,
    /// `RETURNING`.
    pub returning: Returning,
    pub(crate) contextual: ContextualMods<Self>,
    pub(crate) hooks: Hooks<Self>,
}

impl UpdateQuery {
    /// An empty `UPDATE` for `dialect`.
    #[must_use]
    pub fn new(dialect: &'static dyn Dialect) -> Self {
        Self {
            dialect,
            with: With::default(),
            hints: Hints::default(),
            modifiers: Modifiers::default(),
            table: TableRef::default(),
            set: Set::default(),
            from: TableRef::default(),
            where_: Where::default(),
            order_by: OrderBy::default(),
            limit: Limit::default(),
            returning: Returning::default(),
            contextual: ContextualMods::default(),
            hooks: Hooks::default(),
        }
    }

    fn write_body(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        if self.table.expression.is_none() {
            return Err(Error::MissingMandatory("UPDATE needs a target table"));
        }
        if self.set.is_empty() {
            return Err(Error::MissingMandatory("UPDATE needs at least one assignment"));
        }
        if !self.table.joins.is_empty()
            && (!self.order_by.is_empty() || self.limit.count.is_some())
        {
            return Err(Error::Unsupported(String::from(
                "ORDER BY and LIMIT are only allowed in a single-table UPDATE",
            )));
        }

        let mut args = self.with.write_sql(w, start)?;
        w.write_str("UPDATE ")?;
        args.extend(write_one_if(w, start + args.len(), &self.hints, !self.hints.hints.is_empty(), "", " ")?);
        args.extend(write_one_if(w, start + args.len(), &self.modifiers, !self.modifiers.is_empty(), "", " ")?);
        args.extend(self.table.write_sql(w, start + args.len())?);
        args.extend(write_one_if(w, start + args.len(), &self.set, true, " SET\n", "")?);
        args.extend(write_one_if(
            w,
            start + args.len(),
            &self.from,
            self.from.expression.is_some(),
            "\nFROM ",
            "",
        )?);
        args.extend(write_line(w, start + args.len(), &self.where_, !self.where_.conditions.is_empty())?);
        args.extend(write_line(w, start + args.len(), &self.order_by, !self.order_by.is_empty())?);
        args.extend(write_line(w, start + args.len(), &self.limit, self.limit.count.is_some())?);
        args.extend(write_line(
            w,
            start + args.len(),
            &self.returning,
            !self.returning.expressions.is_empty(),
        )?);
        Ok(args)
    }
}

impl_query!(UpdateQuery, QueryType::Update);
