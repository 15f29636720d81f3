//! `ORDER BY`, `LIMIT`, `OFFSET` and `FETCH`.

use std::fmt::Write as _;

use crate::error::Result;
use crate::expression::{write_slice_with, Expr, Expression, SqlWriter};
use crate::value::Arg;

/// Sort direction of an order item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Direction {
    /// `ASC`.
    Asc,
    /// `DESC`.
    Desc,
    /// Postgres `USING op`.
    Using(String),
}

/// Placement of NULLs in an order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    /// `NULLS FIRST`.
    First,
    /// `NULLS LAST`.
    Last,
}

/// One `ORDER BY` item: `expr [COLLATE c] [direction] [NULLS FIRST|LAST]`.
#[derive(Debug, Clone)]
pub struct OrderDef {
    /// The sorted expression.
    pub expression: Expr,
    /// Optional collation, written unquoted.
    pub collation: Option<String>,
    /// Optional direction.
    pub direction: Option<Direction>,
    /// Optional NULL placement.
    pub nulls: Option<Nulls>,
}

impl OrderDef {
    /// An item sorting by `expression` with no options.
    #[must_use]
    pub const fn new(expression: Expr) -> Self {
        Self {
            expression,
            collation: None,
            direction: None,
            nulls: None,
        }
    }
}

impl Expression for OrderDef {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let args = self.expression.write_sql(w, start)?;
        if let Some(collation) = &self.collation {
            write!(w, " COLLATE {collation}")?;
        }
        match &self.direction {
            Some(Direction::Asc) => w.write_str(" ASC")?,
            Some(Direction::Desc) => w.write_str(" DESC")?,
            Some(Direction::Using(op)) => write!(w, " USING {op}")?,
            None => {}
        }
        match self.nulls {
            Some(Nulls::First) => w.write_str(" NULLS FIRST")?,
            Some(Nulls::Last) => w.write_str(" NULLS LAST")?,
            None => {}
        }
        Ok(args)
    }
}

/// `ORDER BY item, ...`.
#[derive(Debug, Clone, Default)]
pub struct OrderBy {
    /// Order items.
    pub expressions: Vec<OrderDef>,
}

impl OrderBy {
    /// Appends an order item.
    pub fn append_order(&mut self, order: OrderDef) {
        self.expressions.push(order);
    }

    /// Whether there is nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

impl Expression for OrderBy {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        write_slice_with(w, start, &self.expressions, "ORDER BY ", ", ", "")
    }
}

/// `LIMIT count`; the count may be any expression.
#[derive(Debug, Clone, Default)]
pub struct Limit {
    /// The count, `None` writes nothing.
    pub count: Option<Expr>,
}

impl Limit {
    /// Replaces the count.
    pub fn set_limit(&mut self, count: Expr) {
        self.count = Some(count);
    }
}

impl Expression for Limit {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let Some(count) = &self.count else {
            return Ok(vec![]);
        };
        w.write_str("LIMIT ")?;
        count.write_sql(w, start)
    }
}

/// `OFFSET count`, or `OFFSET count ROWS` where the dialect requires it.
#[derive(Debug, Clone, Default)]
pub struct Offset {
    /// The count, `None` writes nothing.
    pub count: Option<Expr>,
}

impl Offset {
    /// Replaces the count.
    pub fn set_offset(&mut self, count: Expr) {
        self.count = Some(count);
    }
}

impl Expression for Offset {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let Some(count) = &self.count else {
            return Ok(vec![]);
        };
        w.write_str("OFFSET ")?;
        let args = count.write_sql(w, start)?;
        if w.dialect().offset_in_rows() {
            w.write_str(" ROWS")?;
        }
        Ok(args)
    }
}

/// `FETCH NEXT count ROWS {ONLY|WITH TIES}`.
#[derive(Debug, Clone, Default)]
pub struct Fetch {
    /// The count, `None` writes nothing.
    pub count: Option<Expr>,
    /// `WITH TIES` instead of `ONLY`.
    pub with_ties: bool,
}

impl Expression for Fetch {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let Some(count) = &self.count else {
            return Ok(vec![]);
        };
        w.write_str("FETCH NEXT ")?;
        let args = count.write_sql(w, start)?;
        w.write_str(if self.with_ties {
            " ROWS WITH TIES"
        } else {
            " ROWS ONLY"
        })?;
        Ok(args)
    }
}
