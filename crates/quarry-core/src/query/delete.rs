use std::fmt::Write as _;

use super::{impl_query, write_line, ContextualMods, Hooks, QueryType};
use crate::clause::{Hints, Limit, Modifiers, OrderBy, Returning, TableRef, Where, With};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::expression::{write_one_if, write_slice_with, Expression, SqlWriter};
use crate::value::Arg;

/// A `DELETE` statement.
#[derive(Debug, Clone)]
pub struct DeleteQuery {
    pub(crate) dialect: &'static dyn Dialect,
    /// `WITH`.
    pub with: With,
    /// Optimizer hints.
    pub hints: Hints,
    /// Keywords after `DELETE`.
    pub modifiers: Modifiers,
    /// Tables rows are deleted from.
    pub tables: Vec<TableRef>,
    /// `USING` of the multi-table form.
    pub using: TableRef,
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

impl DeleteQuery {
    /// An empty `DELETE` for `dialect`.
    #[must_use]
    pub fn new(dialect: &'static dyn Dialect) -> Self {
        Self {
            dialect,
            with: With::default(),
            hints: Hints::default(),
            modifiers: Modifiers::default(),
            tables: Vec::new(),
            using: TableRef::default(),
            where_: Where::default(),
            order_by: OrderBy::default(),
            limit: Limit::default(),
            returning: Returning::default(),
            contextual: ContextualMods::default(),
            hooks: Hooks::default(),
        }
    }

    fn write_body(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        if self.tables.is_empty() {
            return Err(Error::MissingMandatory("DELETE needs a target table"));
        }

        let mut args = self.with.write_sql(w, start)?;
        w.write_str("DELETE ")?;
        args.extend(write_one_if(w, start + args.len(), &self.hints, !self.hints.hints.is_empty(), "", " ")?);
        args.extend(write_one_if(w, start + args.len(), &self.modifiers, !self.modifiers.is_empty(), "", " ")?);
        args.extend(write_slice_with(w, start + args.len(), &self.tables, "FROM ", ", ", "")?);
        args.extend(write_one_if(
            w,
            start + args.len(),
            &self.using,
            self.using.expression.is_some(),
            "\nUSING ",
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

impl_query!(DeleteQuery, QueryType::Delete);
