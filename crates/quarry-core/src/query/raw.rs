use super::{impl_query, ContextualMods, Hooks, QueryType};
use crate::dialect::Dialect;
use crate::error::Result;
use crate::expression::{Expression, Raw, SqlWriter};
use crate::value::Arg;

/// A query written by hand, with `?` markers rendered in the query's dialect.
#[derive(Debug, Clone)]
pub struct RawQuery {
    pub(crate) dialect: &'static dyn Dialect,
    /// The fragment.
    pub raw: Raw,
    pub(crate) contextual: ContextualMods<Self>,
    pub(crate) hooks: Hooks<Self>,
}

/// Creates a raw query in `dialect`.
#[must_use]
pub fn raw_query(dialect: &'static dyn Dialect, raw: Raw) -> RawQuery {
    RawQuery {
        dialect,
        raw,
        contextual: ContextualMods::default(),
        hooks: Hooks::default(),
    }
}

impl RawQuery {
    fn write_body(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        self.raw.write_sql(w, start)
    }
}

impl_query!(RawQuery, QueryType::Unknown);
