use std::fmt::Write as _;

use super::{impl_query, write_line, ContextualMods, Hooks, QueryType};
use crate::clause::{
    DuplicateKeyUpdate, Hints, Modifiers, OnConflict, Returning, Set, Values, With,
};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::expression::{write_names, write_one_if, Expr, Expression, SqlWriter};
use crate::value::Arg;

/// An `INSERT` statement.
#[derive(Debug, Clone)]
pub struct InsertQuery {
    pub(crate) dialect: &'static dyn Dialect,
    /// `WITH`.
    pub with: With,
    /// Optimizer hints.
    pub hints: Hints,
    /// Keywords after `INSERT`, such as `IGNORE` or `OR REPLACE`.
    pub modifiers: Modifiers,
    /// The target table.
    pub table: Option<Expr>,
    /// Alias of the target table.
    pub alias: Option<String>,
    /// MySQL partitions.
    pub partitions: Vec<String>,
    /// Target columns.
    pub columns: Vec<String>,
    /// Row source.
    pub values: Values,
    /// MySQL `SET a = b` form, used instead of the row source when not empty.
    pub sets: Set,
    /// MySQL row alias `AS new[(a, b)]`.
    pub row_alias: Option<String>,
    /// Column aliases of the row alias.
    pub column_aliases: Vec<String>,
    /// `ON CONFLICT`.
    pub conflict: Option<OnConflict>,
    /// `ON DUPLICATE KEY UPDATE`.
    pub duplicate_key_update: DuplicateKeyUpdate,
    /// `RETURNING`.
    pub returning: Returning,
    pub(crate) contextual: ContextualMods<Self>,
    pub(crate) hooks: Hooks<Self>,
}

impl InsertQuery {
    /// An empty `INSERT` for `dialect`.
    #[must_use]
    pub fn new(dialect: &'static dyn Dialect) -> Self {
        Self {
            dialect,
            with: With::default(),
            hints: Hints::default(),
            modifiers: Modifiers::default(),
            table: None,
            alias: None,
            partitions: Vec::new(),
            columns: Vec::new(),
            values: Values::default(),
            sets: Set::default(),
            row_alias: None,
            column_aliases: Vec::new(),
            conflict: None,
            duplicate_key_update: DuplicateKeyUpdate::default(),
            returning: Returning::default(),
            contextual: ContextualMods::default(),
            hooks: Hooks::default(),
        }
    }

    fn write_body(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let table = self
            .table
            .as_ref()
            .ok_or(Error::MissingMandatory("INSERT needs a target table"))?;

        let mut args = self.with.write_sql(w, start)?;
        w.write_str("INSERT ")?;
        args.extend(write_one_if(w, start + args.len(), &self.hints, !self.hints.hints.is_empty(), "", " ")?);
        args.extend(write_one_if(w, start + args.len(), &self.modifiers, !self.modifiers.is_empty(), "", " ")?);

        w.write_str("INTO ")?;
        args.extend(table.write_sql(w, start + args.len())?);
        if let Some(alias) = &self.alias {
            w.write_str(" AS ")?;
            w.write_quoted(alias)?;
        }
        if !self.partitions.is_empty() {
            w.write_str(" PARTITION (")?;
            write_names(w, &self.partitions, true, ", ")?;
            w.write_char(')')?;
        }
        if !self.columns.is_empty() {
            w.write_str(" (")?;
            write_names(w, &self.columns, true, ", ")?;
            w.write_char(')')?;
        }

        if self.sets.is_empty() {
            args.extend(write_line(w, start + args.len(), &self.values, true)?);
        } else {
            args.extend(write_one_if(w, start + args.len(), &self.sets, true, "\nSET ", "")?);
        }

        if let Some(alias) = &self.row_alias {
            w.write_str(" AS ")?;
            w.write_str(alias)?;
            if !self.column_aliases.is_empty() {
                w.write_char('(')?;
                write_names(w, &self.column_aliases, false, ", ")?;
                w.write_char(')')?;
            }
        }

        if let Some(conflict) = &self.conflict {
            args.extend(write_line(w, start + args.len(), conflict, true)?);
        }
        args.extend(write_line(
            w,
            start + args.len(),
            &self.duplicate_key_update,
            !self.duplicate_key_update.set.is_empty(),
        )?);
        args.extend(write_line(
            w,
            start + args.len(),
            &self.returning,
            !self.returning.expressions.is_empty(),
        )?);
        Ok(args)
    }
}

impl_query!(InsertQuery, QueryType::Insert);
