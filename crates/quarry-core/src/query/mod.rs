//! Top-level queries.
//!
//! A query bundles clause fragments with a dialect. Modifiers shape it at build time;
//! contextual mods run on a copy at every render and hooks run once before a build.

mod delete;
mod insert;
mod raw;
mod select;
mod update;
mod values;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use raw::{raw_query, RawQuery};
pub use select::SelectQuery;
pub use update::UpdateQuery;
pub use values::ValuesQuery;

use crate::context::RenderContext;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::expression::{Expression, SqlWriter};
use crate::value::Arg;

/// The kind of statement a query renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryType {
    /// Unknown or mixed.
    Unknown,
    /// `SELECT`.
    Select,
    /// `INSERT`.
    Insert,
    /// `UPDATE`.
    Update,
    /// `DELETE`.
    Delete,
    /// Standalone `VALUES`.
    Values,
}

impl QueryType {
    /// Returns the SQL keyword, or `UNKNOWN`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Values => "VALUES",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dialect-tagged statement.
///
/// Used as an [`Expression`] a query renders in parentheses; [`Query::write_query`] renders it
/// bare, as needed for CTE bodies, set operations and `INSERT ... SELECT`.
pub trait Query: Expression {
    /// The statement kind.
    fn query_type(&self) -> QueryType;

    /// The dialect this query renders with, whatever the enclosing query uses.
    fn dialect(&self) -> &'static dyn Dialect;

    /// Renders the statement without surrounding parentheses.
    ///
    /// # Errors
    ///
    /// Propagates any clause, contextual mod or sink error.
    fn write_query(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>>;

    /// Runs the hooks registered on this query.
    ///
    /// # Errors
    ///
    /// Returns the first hook error.
    fn run_hooks(&self, ctx: &RenderContext) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Builds the SQL and its arguments, numbering placeholders from 1.
    ///
    /// # Errors
    ///
    /// Propagates any hook or render error.
    fn build(&self) -> Result<(String, Vec<Arg>)>
    where
        Self: Sized,
    {
        build_with(&RenderContext::new(), self, 1)
    }

    /// Builds the SQL and its arguments, numbering placeholders from `start`.
    ///
    /// # Errors
    ///
    /// Propagates any hook or render error.
    fn build_n(&self, start: usize) -> Result<(String, Vec<Arg>)>
    where
        Self: Sized,
    {
        build_with(&RenderContext::new(), self, start)
    }
}

/// Builds a query under `ctx`: hooks first (unless skipped), then the render.
///
/// # Errors
///
/// Propagates any hook or render error.
pub fn build_with<Q: Query + ?Sized>(
    ctx: &RenderContext,
    query: &Q,
    start: usize,
) -> Result<(String, Vec<Arg>)> {
    if !ctx.hooks_skipped() {
        query.run_hooks(ctx)?;
    }
    let mut sql = String::new();
    let args = {
        let mut w = SqlWriter::new(ctx, &mut sql, query.dialect());
        ctx.check()?;
        query.write_query(&mut w, start)?
    };
    tracing::debug!(query_type = %query.query_type(), args = args.len(), "built query");
    Ok((sql, args))
}

/// Something that mutates a query of type `Q`.
///
/// Any `Fn(&mut Q)` is a modifier, as are the chain builders in [`crate::mods`].
pub trait Modifier<Q> {
    /// Applies the change.
    fn apply(&self, query: &mut Q);
}

impl<Q, F: Fn(&mut Q)> Modifier<Q> for F {
    fn apply(&self, query: &mut Q) {
        self(query);
    }
}

type ContextualFn<Q> = Arc<dyn Fn(&RenderContext, &mut Q) -> Result<()> + Send + Sync>;

/// Modifiers deferred to render time, applied to a per-render copy of the query.
pub struct ContextualMods<Q> {
    mods: Vec<ContextualFn<Q>>,
}

impl<Q> ContextualMods<Q> {
    /// Registers a contextual mod.
    pub fn append(&mut self, m: impl Fn(&RenderContext, &mut Q) -> Result<()> + Send + Sync + 'static) {
        self.mods.push(Arc::new(m));
    }

    /// Whether no contextual mod is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    /// Runs every mod against `query`, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error a mod reports.
    pub fn run(&self, ctx: &RenderContext, query: &mut Q) -> Result<()> {
        for m in &self.mods {
            m(ctx, query)?;
        }
        Ok(())
    }
}

impl<Q> Default for ContextualMods<Q> {
    fn default() -> Self {
        Self { mods: Vec::new() }
    }
}

impl<Q> Clone for ContextualMods<Q> {
    fn clone(&self) -> Self {
        Self {
            mods: self.mods.clone(),
        }
    }
}

impl<Q> fmt::Debug for ContextualMods<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextualMods")
            .field("len", &self.mods.len())
            .finish()
    }
}

type HookFn<Q> = Arc<dyn Fn(&RenderContext, &Q) -> Result<()> + Send + Sync>;

/// Checks run before a query is built; any of them may abort the build.
pub struct Hooks<Q> {
    hooks: Vec<HookFn<Q>>,
}

impl<Q> Hooks<Q> {
    /// Registers a hook.
    pub fn append(&mut self, hook: impl Fn(&RenderContext, &Q) -> Result<()> + Send + Sync + 'static) {
        self.hooks.push(Arc::new(hook));
    }

    /// Runs every hook, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error a hook reports.
    pub fn run(&self, ctx: &RenderContext, query: &Q) -> Result<()> {
        for hook in &self.hooks {
            hook(ctx, query)?;
        }
        Ok(())
    }
}

impl<Q> Default for Hooks<Q> {
    fn default() -> Self {
        Self { hooks: Vec::new() }
    }
}

impl<Q> Clone for Hooks<Q> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

impl<Q> fmt::Debug for Hooks<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("len", &self.hooks.len())
            .finish()
    }
}

/// Implements [`Expression`] and [`Query`] for a query struct with `dialect`, `contextual` and
/// `hooks` fields and a `write_body` method.
macro_rules! impl_query {
    ($ty:ty, $kind:expr) => {
        impl $crate::expression::Expression for $ty {
            fn write_sql(
                &self,
                w: &mut $crate::expression::SqlWriter<'_>,
                start: usize,
            ) -> $crate::error::Result<Vec<$crate::value::Arg>> {
                ::std::fmt::Write::write_char(w, '(')?;
                let args = $crate::query::Query::write_query(self, w, start)?;
                ::std::fmt::Write::write_char(w, ')')?;
                Ok(args)
            }
        }

        impl $crate::query::Query for $ty {
            fn query_type(&self) -> $crate::query::QueryType {
                $kind
            }

            fn dialect(&self) -> &'static dyn $crate::dialect::Dialect {
                self.dialect
            }

            fn write_query(
                &self,
                w: &mut $crate::expression::SqlWriter<'_>,
                start: usize,
            ) -> $crate::error::Result<Vec<$crate::value::Arg>> {
                let mut w = w.with_dialect(self.dialect);
                if self.contextual.is_empty() || w.ctx().contextual_mods_skipped() {
                    return self.write_body(&mut w, start);
                }
                let mut copy = self.clone();
                self.contextual.run(w.ctx(), &mut copy)?;
                copy.write_body(&mut w, start)
            }

            fn run_hooks(&self, ctx: &$crate::context::RenderContext) -> $crate::error::Result<()> {
                self.hooks.run(ctx, self)
            }
        }

        impl $ty {
            /// Applies a modifier and returns the query.
            #[must_use]
            pub fn apply(mut self, m: impl $crate::query::Modifier<Self>) -> Self {
                m.apply(&mut self);
                self
            }

            /// Applies a modifier in place.
            pub fn apply_mut(&mut self, m: impl $crate::query::Modifier<Self>) {
                m.apply(self);
            }

            /// Registers a contextual mod, run on a copy of the query at every render.
            #[must_use]
            pub fn contextual_mod(
                mut self,
                m: impl Fn(&$crate::context::RenderContext, &mut Self) -> $crate::error::Result<()>
                    + Send
                    + Sync
                    + 'static,
            ) -> Self {
                self.contextual.append(m);
                self
            }

            /// Registers a hook, run before every build.
            #[must_use]
            pub fn hook(
                mut self,
                hook: impl Fn(&$crate::context::RenderContext, &Self) -> $crate::error::Result<()>
                    + Send
                    + Sync
                    + 'static,
            ) -> Self {
                self.hooks.append(hook);
                self
            }
        }
    };
}

pub(crate) use impl_query;

/// Writes `clause` on its own line when `present`.
fn write_line<E: Expression + ?Sized>(
    w: &mut SqlWriter<'_>,
    start: usize,
    clause: &E,
    present: bool,
) -> Result<Vec<Arg>> {
    crate::expression::write_one_if(w, start, clause, present, "\n", "")
}
