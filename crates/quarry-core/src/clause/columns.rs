//! Select lists, `DISTINCT`, optimizer hints and statement modifiers.

use std::fmt::Write as _;

use crate::error::Result;
use crate::expression::{write_slice_with, Expr, Expression, SqlWriter};
use crate::value::Arg;

/// The columns of a `SELECT`; an empty list renders `*`.
#[derive(Debug, Clone, Default)]
pub struct SelectList {
    /// Selected expressions.
    pub columns: Vec<Expr>,
}

impl SelectList {
    /// Appends columns.
    pub fn append_columns(&mut self, columns: impl IntoIterator<Item = Expr>) {
        self.columns.extend(columns);
    }

    /// Replaces all columns.
    pub fn set_columns(&mut self, columns: impl IntoIterator<Item = Expr>) {
        self.columns = columns.into_iter().collect();
    }
}

impl Expression for SelectList {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        if self.columns.is_empty() {
            w.write_char('*')?;
            return Ok(vec![]);
        }
        write_slice_with(w, start, &self.columns, "", ", ", "")
    }
}

/// `DISTINCT [ON (expr, ...)]`.
#[derive(Debug, Clone, Default)]
pub struct Distinct {
    /// The `ON` expressions, if any.
    pub on: Vec<Expr>,
}

impl Expression for Distinct {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        w.write_str("DISTINCT")?;
        write_slice_with(w, start, &self.on, " ON (", ", ", ")")
    }
}

/// Optimizer hints rendered as `/*+ hint hint */`.
#[derive(Debug, Clone, Default)]
pub struct Hints {
    /// The hints in order.
    pub hints: Vec<String>,
}

impl Hints {
    /// Appends a hint.
    pub fn append_hint(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }
}

impl Expression for Hints {
    fn write_sql(&self, w: &mut SqlWriter<'_>, _start: usize) -> Result<Vec<Arg>> {
        if self.hints.is_empty() {
            return Ok(vec![]);
        }
        write!(w, "/*+ {} */", self.hints.join("\n    "))?;
        Ok(vec![])
    }
}

/// Keywords placed right after the statement keyword, such as `LOW_PRIORITY` or `DISTINCT`.
#[derive(Debug, Clone, Default)]
pub struct Modifiers {
    /// The modifiers, space-joined.
    pub modifiers: Vec<String>,
}

impl Modifiers {
    /// Appends a modifier once; repeated modifiers are ignored.
    pub fn append_modifier(&mut self, modifier: impl Into<String>) {
        let modifier = modifier.into();
        if !self.modifiers.contains(&modifier) {
            self.modifiers.push(modifier);
        }
    }

    /// Whether there is nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }
}

impl Expression for Modifiers {
    fn write_sql(&self, w: &mut SqlWriter<'_>, _start: usize) -> Result<Vec<Arg>> {
        w.write_str(&self.modifiers.join(" "))?;
        Ok(vec![])
    }
}
