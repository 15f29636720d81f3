use super::{impl_query, write_line, ContextualMods, Hooks, QueryType};
use crate::clause::{Limit, OrderBy, Values};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::expression::SqlWriter;
use crate::value::Arg;

/// A standalone `VALUES` statement with optional `ORDER BY` and `LIMIT`.
#[derive(Debug, Clone)]
pub struct ValuesQuery {
    pub(crate) dialect: &'static dyn Dialect,
    /// The rows.
    pub values: Values,
    /// `ORDER BY`.
    pub order_by: OrderBy,
    /// `LIMIT`.
    pub limit: Limit,
    pub(crate) contextual: ContextualMods<Self>,
    pub(crate) hooks: Hooks<Self>,
}

impl ValuesQuery {
    /// An empty `VALUES` for `dialect`; rows written as `ROW(...)` when `row_constructor` is set.
    #[must_use]
    pub fn new(dialect: &'static dyn Dialect, row_constructor: bool) -> Self {
        Self {
            dialect,
            values: Values {
                row_constructor,
                ..Values::default()
            },
            order_by: OrderBy::default(),
            limit: Limit::default(),
            contextual: ContextualMods::default(),
            hooks: Hooks::default(),
        }
    }

    fn write_body(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        if self.values.rows.is_empty() {
            return Err(Error::MissingMandatory("VALUES needs at least one row"));
        }
        let mut args = self.values.write_rows(w, start)?;
        args.extend(write_line(w, start + args.len(), &self.order_by, !self.order_by.is_empty())?);
        args.extend(write_line(w, start + args.len(), &self.limit, self.limit.count.is_some())?);
        Ok(args)
    }
}

impl_query!(ValuesQuery, QueryType::Values);
