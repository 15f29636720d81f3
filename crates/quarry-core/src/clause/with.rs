//! `WITH` clauses and common table expressions.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::expression::{write_names, write_slice_with, Expression, SqlWriter};
use crate::query::Query;
use crate::value::Arg;

/// `WITH [RECURSIVE] cte, cte ...`.
#[derive(Debug, Clone, Default)]
pub struct With {
    /// Whether `RECURSIVE` is written.
    pub recursive: bool,
    /// The common table expressions.
    pub ctes: Vec<Cte>,
}

impl With {
    /// Appends a CTE.
    pub fn append_cte(&mut self, cte: Cte) {
        self.ctes.push(cte);
    }

    /// Sets the recursive flag.
    pub fn set_recursive(&mut self, recursive: bool) {
        self.recursive = recursive;
    }
}

impl Expression for With {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let prefix = if self.recursive {
            "WITH RECURSIVE\n"
        } else {
            "WITH\n"
        };
        write_slice_with(w, start, &self.ctes, prefix, ",\n", "\n")
    }
}

/// Order of a recursive `SEARCH` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrder {
    /// `BREADTH FIRST`.
    Breadth,
    /// `DEPTH FIRST`.
    Depth,
}

/// `SEARCH {BREADTH|DEPTH} FIRST BY columns SET column`.
#[derive(Debug, Clone)]
pub struct CteSearch {
    /// Search order.
    pub order: SearchOrder,
    /// Columns searched by.
    pub columns: Vec<String>,
    /// Column receiving the sequence.
    pub set: String,
}

/// `CYCLE columns SET column [TO value DEFAULT value] USING column`.
#[derive(Debug, Clone, Default)]
pub struct CteCycle {
    /// Columns checked for cycles.
    pub columns: Vec<String>,
    /// Column marking a detected cycle.
    pub set: String,
    /// Value of the mark column for a cycle.
    pub set_to: Option<crate::expression::Expr>,
    /// Value of the mark column otherwise.
    pub set_default: Option<crate::expression::Expr>,
    /// Column holding the path.
    pub using: String,
}

/// A common table expression.
#[derive(Debug, Clone)]
pub struct Cte {
    /// The CTE name.
    pub name: String,
    /// Optional column names.
    pub columns: Vec<String>,
    /// `None` writes nothing, otherwise `MATERIALIZED` or `NOT MATERIALIZED`.
    pub materialized: Option<bool>,
    /// The body.
    pub query: Option<Arc<dyn Query>>,
    /// Optional search clause.
    pub search: Option<CteSearch>,
    /// Optional cycle clause.
    pub cycle: Option<CteCycle>,
}

impl Cte {
    /// A CTE with the given name and no body yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: vec![],
            materialized: None,
            query: None,
            search: None,
            cycle: None,
        }
    }
}

impl Expression for Cte {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let query = self
            .query
            .as_ref()
            .ok_or(Error::MissingMandatory("CTE query must be set"))?;

        w.write_quoted(&self.name)?;
        if !self.columns.is_empty() {
            w.write_char('(')?;
            write_names(w, &self.columns, true, ", ")?;
            w.write_char(')')?;
        }
        w.write_str(" AS ")?;
        match self.materialized {
            Some(true) => w.write_str("MATERIALIZED ")?,
            Some(false) => w.write_str("NOT MATERIALIZED ")?,
            None => {}
        }

        w.write_char('(')?;
        let mut args = query.write_query(w, start)?;
        w.write_char(')')?;

        if let Some(search) = &self.search {
            let order = match search.order {
                SearchOrder::Breadth => "BREADTH",
                SearchOrder::Depth => "DEPTH",
            };
            write!(w, "\nSEARCH {order} FIRST BY ")?;
            write_names(w, &search.columns, true, ", ")?;
            w.write_str(" SET ")?;
            w.write_quoted(&search.set)?;
        }

        if let Some(cycle) = &self.cycle {
            w.write_str("\nCYCLE ")?;
            write_names(w, &cycle.columns, true, ", ")?;
            w.write_str(" SET ")?;
            w.write_quoted(&cycle.set)?;
            if let (Some(to), Some(default)) = (&cycle.set_to, &cycle.set_default) {
                w.write_str(" TO ")?;
                args.extend(to.write_sql(w, start + args.len())?);
                w.write_str(" DEFAULT ")?;
                args.extend(default.write_sql(w, start + args.len())?);
            }
            w.write_str(" USING ")?;
            w.write_quoted(&cycle.using)?;
        }

        Ok(args)
    }
}
