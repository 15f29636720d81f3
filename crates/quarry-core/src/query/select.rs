use std::fmt::Write as _;

use super::{impl_query, write_line, ContextualMods, Hooks, QueryType};
use crate::clause::{
    Combine, Distinct, Fetch, GroupBy, Having, Hints, Limit, Lock, Modifiers, Offset, OrderBy,
    SelectInto, SelectList, TableRef, Where, Windows, With,
};
use crate::dialect::Dialect;
use crate::error::Result;
use crate::expression::{write_one_if, write_slice_with, Expression, SqlWriter};
use crate::value::Arg;

/// A `SELECT` statement.
///
/// Clauses render in this order: `WITH`, `SELECT` with hints, `DISTINCT` and modifiers, the
/// select list, `FROM`, `WHERE`, `GROUP BY`, `HAVING`, `WINDOW`, `ORDER BY`, `LIMIT`,
/// `OFFSET`, `FETCH`, locks, set operations, the order and limits of the combined result,
/// then `INTO`. When set operations follow a primary arm that has its own order, limit,
/// offset, fetch or locks, the primary arm is parenthesized.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    pub(crate) dialect: &'static dyn Dialect,
    /// `WITH`.
    pub with: With,
    /// Optimizer hints.
    pub hints: Hints,
    /// `DISTINCT [ON (...)]`.
    pub distinct: Option<Distinct>,
    /// Keywords after `SELECT`.
    pub modifiers: Modifiers,
    /// Selected columns.
    pub select_list: SelectList,
    /// `FROM` and joins.
    pub table: TableRef,
    /// `WHERE`.
    pub where_: Where,
    /// `GROUP BY`.
    pub group_by: GroupBy,
    /// `HAVING`.
    pub having: Having,
    /// `WINDOW`.
    pub windows: Windows,
    /// `ORDER BY` of the primary arm.
    pub order_by: OrderBy,
    /// `LIMIT` of the primary arm.
    pub limit: Limit,
    /// `OFFSET` of the primary arm.
    pub offset: Offset,
    /// `FETCH` of the primary arm.
    pub fetch: Fetch,
    /// Row locks.
    pub locks: Vec<Lock>,
    /// Set operations.
    pub combines: Vec<Combine>,
    /// `ORDER BY` of the combined result.
    pub combined_order: OrderBy,
    /// `LIMIT` of the combined result.
    pub combined_limit: Limit,
    /// `OFFSET` of the combined result.
    pub combined_offset: Offset,
    /// `INTO`.
    pub into: Option<SelectInto>,
    pub(crate) contextual: ContextualMods<Self>,
    pub(crate) hooks: Hooks<Self>,
}

impl SelectQuery {
    /// An empty `SELECT *` for `dialect`.
    #[must_use]
    pub fn new(dialect: &'static dyn Dialect) -> Self {
        Self {
            dialect,
            with: With::default(),
            hints: Hints::default(),
            distinct: None,
            modifiers: Modifiers::default(),
            select_list: SelectList::default(),
            table: TableRef::default(),
            where_: Where::default(),
            group_by: GroupBy::default(),
            having: Having::default(),
            windows: Windows::default(),
            order_by: OrderBy::default(),
            limit: Limit::default(),
            offset: Offset::default(),
            fetch: Fetch::default(),
            locks: Vec::new(),
            combines: Vec::new(),
            combined_order: OrderBy::default(),
            combined_limit: Limit::default(),
            combined_offset: Offset::default(),
            into: None,
            contextual: ContextualMods::default(),
            hooks: Hooks::default(),
        }
    }

    fn primary_needs_parens(&self) -> bool {
        !self.combines.is_empty()
            && (!self.order_by.is_empty()
                || self.limit.count.is_some()
                || self.offset.count.is_some()
                || self.fetch.count.is_some()
                || !self.locks.is_empty())
    }

    fn write_body(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let mut args = self.with.write_sql(w, start)?;

        let parens = self.primary_needs_parens();
        if parens {
            w.write_char('(')?;
        }

        w.write_str("SELECT ")?;
        args.extend(write_one_if(w, start + args.len(), &self.hints, !self.hints.hints.is_empty(), "", " ")?);
        if let Some(distinct) = &self.distinct {
            args.extend(write_one_if(w, start + args.len(), distinct, true, "", " ")?);
        }
        args.extend(write_one_if(w, start + args.len(), &self.modifiers, !self.modifiers.is_empty(), "", " ")?);
        args.extend(self.select_list.write_sql(w, start + args.len())?);

        args.extend(write_one_if(
            w,
            start + args.len(),
            &self.table,
            self.table.expression.is_some(),
            "\nFROM ",
            "",
        )?);
        args.extend(write_line(w, start + args.len(), &self.where_, !self.where_.conditions.is_empty())?);
        args.extend(write_line(w, start + args.len(), &self.group_by, !self.group_by.groups.is_empty())?);
        args.extend(write_line(w, start + args.len(), &self.having, !self.having.conditions.is_empty())?);
        args.extend(write_line(w, start + args.len(), &self.windows, !self.windows.windows.is_empty())?);
        args.extend(write_line(w, start + args.len(), &self.order_by, !self.order_by.is_empty())?);
        args.extend(write_line(w, start + args.len(), &self.limit, self.limit.count.is_some())?);
        args.extend(write_line(w, start + args.len(), &self.offset, self.offset.count.is_some())?);
        args.extend(write_line(w, start + args.len(), &self.fetch, self.fetch.count.is_some())?);
        args.extend(write_slice_with(w, start + args.len(), &self.locks, "\n", "\n", "")?);

        if parens {
            w.write_char(')')?;
        }

        args.extend(write_slice_with(w, start + args.len(), &self.combines, "\n", "\n", "")?);
        args.extend(write_line(
            w,
            start + args.len(),
            &self.combined_order,
            !self.combined_order.is_empty(),
        )?);
        args.extend(write_line(
            w,
            start + args.len(),
            &self.combined_limit,
            self.combined_limit.count.is_some(),
        )?);
        args.extend(write_line(
            w,
            start + args.len(),
            &self.combined_offset,
            self.combined_offset.count.is_some(),
        )?);

        if let Some(into) = &self.into {
            args.extend(write_line(w, start + args.len(), into, true)?);
        }
        Ok(args)
    }
}

impl_query!(SelectQuery, QueryType::Select);
