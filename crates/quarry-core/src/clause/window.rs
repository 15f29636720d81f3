//! Window definitions and frames.

use std::fmt::Write as _;

use crate::clause::order::OrderDef;
use crate::error::{Error, Result};
use crate::expression::{write_slice_with, Expr, Expression, SqlWriter};
use crate::value::Arg;

/// Frame unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// `RANGE`.
    Range,
    /// `ROWS`.
    Rows,
    /// `GROUPS`.
    Groups,
}

/// One end of a frame.
#[derive(Debug, Clone)]
pub enum FrameBound {
    /// `UNBOUNDED PRECEDING`.
    UnboundedPreceding,
    /// `expr PRECEDING`.
    Preceding(Expr),
    /// `CURRENT ROW`.
    CurrentRow,
    /// `expr FOLLOWING`.
    Following(Expr),
    /// `UNBOUNDED FOLLOWING`.
    UnboundedFollowing,
}

impl Expression for FrameBound {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        match self {
            Self::UnboundedPreceding => w.write_str("UNBOUNDED PRECEDING")?,
            Self::CurrentRow => w.write_str("CURRENT ROW")?,
            Self::UnboundedFollowing => w.write_str("UNBOUNDED FOLLOWING")?,
            Self::Preceding(e) => {
                let args = e.write_sql(w, start)?;
                w.write_str(" PRECEDING")?;
                return Ok(args);
            }
            Self::Following(e) => {
                let args = e.write_sql(w, start)?;
                w.write_str(" FOLLOWING")?;
                return Ok(args);
            }
        }
        Ok(vec![])
    }
}

/// Frame exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameExclusion {
    /// `EXCLUDE CURRENT ROW`.
    CurrentRow,
    /// `EXCLUDE GROUP`.
    Group,
    /// `EXCLUDE TIES`.
    Ties,
    /// `EXCLUDE NO OTHERS`.
    NoOthers,
}

/// `mode [BETWEEN] start [AND end] [EXCLUDE ...]`.
///
/// Both `mode` and `start` are mandatory; a frame missing either fails to render.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Frame unit.
    pub mode: Option<FrameMode>,
    /// Start bound.
    pub start: Option<FrameBound>,
    /// End bound, which switches to the `BETWEEN` form.
    pub end: Option<FrameBound>,
    /// Exclusion.
    pub exclusion: Option<FrameExclusion>,
}

impl Expression for Frame {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let mode = self
            .mode
            .ok_or(Error::MissingMandatory("frame mode must be set"))?;
        let first = self
            .start
            .as_ref()
            .ok_or(Error::MissingMandatory("frame start must be set"))?;

        w.write_str(match mode {
            FrameMode::Range => "RANGE ",
            FrameMode::Rows => "ROWS ",
            FrameMode::Groups => "GROUPS ",
        })?;
        if self.end.is_some() {
            w.write_str("BETWEEN ")?;
        }
        let mut args = first.write_sql(w, start)?;
        if let Some(end) = &self.end {
            w.write_str(" AND ")?;
            args.extend(end.write_sql(w, start + args.len())?);
        }
        match self.exclusion {
            Some(FrameExclusion::CurrentRow) => w.write_str(" EXCLUDE CURRENT ROW")?,
            Some(FrameExclusion::Group) => w.write_str(" EXCLUDE GROUP")?,
            Some(FrameExclusion::Ties) => w.write_str(" EXCLUDE TIES")?,
            Some(FrameExclusion::NoOthers) => w.write_str(" EXCLUDE NO OTHERS")?,
            None => {}
        }
        Ok(args)
    }
}

/// The inside of `OVER (...)` or of a named window.
#[derive(Debug, Clone, Default)]
pub struct WindowDef {
    /// Name of the window this one extends.
    pub from: Option<String>,
    /// `PARTITION BY` expressions.
    pub partition_by: Vec<Expr>,
    /// `ORDER BY` items.
    pub order_by: Vec<OrderDef>,
    /// Frame.
    pub frame: Option<Frame>,
}

impl WindowDef {
    /// Appends partition expressions.
    pub fn append_partition(&mut self, exprs: impl IntoIterator<Item = Expr>) {
        self.partition_by.extend(exprs);
    }

    /// Appends an order item.
    pub fn append_order(&mut self, order: OrderDef) {
        self.order_by.push(order);
    }
}

impl Expression for WindowDef {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        fn sep(w: &mut SqlWriter<'_>, written: &mut bool) -> Result<()> {
            if *written {
                w.write_char(' ')?;
            }
            *written = true;
            Ok(())
        }

        let mut written = false;

        if let Some(from) = &self.from {
            sep(w, &mut written)?;
            w.write_quoted(from)?;
        }

        let mut args = Vec::new();
        if !self.partition_by.is_empty() {
            sep(w, &mut written)?;
            args.extend(write_slice_with(
                w,
                start,
                &self.partition_by,
                "PARTITION BY ",
                ", ",
                "",
            )?);
        }
        if !self.order_by.is_empty() {
            sep(w, &mut written)?;
            args.extend(write_slice_with(
                w,
                start + args.len(),
                &self.order_by,
                "ORDER BY ",
                ", ",
                "",
            )?);
        }
        if let Some(frame) = &self.frame {
            sep(w, &mut written)?;
            args.extend(frame.write_sql(w, start + args.len())?);
        }
        Ok(args)
    }
}

/// `"name" AS (definition)`.
#[derive(Debug, Clone)]
pub struct NamedWindow {
    /// The window name.
    pub name: String,
    /// Its definition.
    pub definition: WindowDef,
}

impl Expression for NamedWindow {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        w.write_quoted(&self.name)?;
        w.write_str(" AS (")?;
        let args = self.definition.write_sql(w, start)?;
        w.write_char(')')?;
        Ok(args)
    }
}

/// `WINDOW w AS (...), ...`.
#[derive(Debug, Clone, Default)]
pub struct Windows {
    /// Named windows.
    pub windows: Vec<NamedWindow>,
}

impl Windows {
    /// Appends a named window.
    pub fn append_window(&mut self, window: NamedWindow) {
        self.windows.push(window);
    }
}

impl Expression for Windows {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        write_slice_with(w, start, &self.windows, "WINDOW ", ", ", "")
    }
}
