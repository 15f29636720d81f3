//! The expression protocol.
//!
//! Every piece of SQL in this crate is an [`Expression`]: given a [`SqlWriter`] and the
//! position of the first placeholder it may use, it writes its SQL and returns the arguments
//! for the placeholders it emitted, in emission order. Composite expressions pass
//! `start + args_so_far.len()` to each child, which keeps numbering linear under nesting.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::context::RenderContext;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::value::{Arg, ToSqlValue};

/// The sink, dialect and context for one render.
pub struct SqlWriter<'a> {
    ctx: &'a RenderContext,
    out: &'a mut dyn fmt::Write,
    dialect: &'a dyn Dialect,
}

impl<'a> SqlWriter<'a> {
    /// Creates a writer over `out`.
    pub fn new(ctx: &'a RenderContext, out: &'a mut dyn fmt::Write, dialect: &'a dyn Dialect) -> Self {
        Self { ctx, out, dialect }
    }

    /// The dialect placeholders and identifiers are rendered with.
    #[must_use]
    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    /// The render context.
    #[must_use]
    pub const fn ctx(&self) -> &'a RenderContext {
        self.ctx
    }

    /// Reborrows the sink under a different dialect, for queries embedded in other queries.
    pub fn with_dialect<'b>(&'b mut self, dialect: &'b dyn Dialect) -> SqlWriter<'b> {
        SqlWriter {
            ctx: self.ctx,
            out: &mut *self.out,
            dialect,
        }
    }

    /// Writes a placeholder for `position`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails.
    pub fn write_arg(&mut self, position: usize) -> Result<()> {
        self.dialect.write_arg(self.out, position)?;
        Ok(())
    }

    /// Writes a quoted identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails.
    pub fn write_quoted(&mut self, name: &str) -> Result<()> {
        self.dialect.write_quoted(self.out, name)?;
        Ok(())
    }

    /// Writes a named placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoNamedArgs`] if the dialect has no named placeholders.
    pub fn write_named_arg(&mut self, name: &str) -> Result<()> {
        self.dialect.write_named_arg(self.out, name)
    }
}

impl fmt::Write for SqlWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.write_str(s)
    }
}

/// A fragment of SQL that can render itself.
pub trait Expression: fmt::Debug + Send + Sync {
    /// Writes the SQL for this expression, numbering placeholders from `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if a mandatory part is missing, an argument cannot be rendered, the
    /// render was cancelled or the sink fails.
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>>;
}

/// A shared, type-erased expression.
#[derive(Clone)]
pub struct Expr(Arc<dyn Expression>);

impl Expr {
    /// Wraps an expression.
    pub fn new(e: impl Expression + 'static) -> Self {
        Self(Arc::new(e))
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Expression for Expr {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        self.0.write_sql(w, start)
    }
}

/// Conversion into a type-erased [`Expr`].
///
/// Plain strings convert into verbatim SQL text.
pub trait IntoExpr {
    /// Performs the conversion.
    fn into_expr(self) -> Expr;
}

impl<E: Expression + 'static> IntoExpr for E {
    fn into_expr(self) -> Expr {
        Expr::new(self)
    }
}

impl IntoExpr for &'static str {
    fn into_expr(self) -> Expr {
        Expr::new(Verbatim(Cow::Borrowed(self)))
    }
}

impl IntoExpr for String {
    fn into_expr(self) -> Expr {
        Expr::new(Verbatim(Cow::Owned(self)))
    }
}

impl From<&'static str> for Expr {
    fn from(sql: &'static str) -> Self {
        sql.into_expr()
    }
}

impl From<String> for Expr {
    fn from(sql: String) -> Self {
        sql.into_expr()
    }
}

/// SQL text written as is.
#[derive(Debug, Clone)]
pub struct Verbatim(pub Cow<'static, str>);

impl Expression for Verbatim {
    fn write_sql(&self, w: &mut SqlWriter<'_>, _start: usize) -> Result<Vec<Arg>> {
        fmt::Write::write_str(w, &self.0)?;
        Ok(vec![])
    }
}

/// Renders one expression after checking the render context.
///
/// # Errors
///
/// Propagates any error from the expression or the context.
pub fn write_one<E: Expression + ?Sized>(
    w: &mut SqlWriter<'_>,
    start: usize,
    e: &E,
) -> Result<Vec<Arg>> {
    w.ctx().check()?;
    e.write_sql(w, start)
}

/// Renders `prefix`, the expression and `suffix` when `condition` holds.
///
/// # Errors
///
/// Propagates any error from the expression or the context.
pub fn write_one_if<E: Expression + ?Sized>(
    w: &mut SqlWriter<'_>,
    start: usize,
    e: &E,
    condition: bool,
    prefix: &str,
    suffix: &str,
) -> Result<Vec<Arg>> {
    if !condition {
        return Ok(vec![]);
    }
    w.ctx().check()?;
    fmt::Write::write_str(w, prefix)?;
    let args = e.write_sql(w, start)?;
    fmt::Write::write_str(w, suffix)?;
    Ok(args)
}

/// Renders the children joined by `separator`, wrapped in `prefix` and `suffix`.
///
/// Nothing at all is written for an empty slice.
///
/// # Errors
///
/// Propagates any error from a child or the context.
pub fn write_slice_with<E: Expression>(
    w: &mut SqlWriter<'_>,
    start: usize,
    children: &[E],
    prefix: &str,
    separator: &str,
    suffix: &str,
) -> Result<Vec<Arg>> {
    if children.is_empty() {
        return Ok(vec![]);
    }
    w.ctx().check()?;
    fmt::Write::write_str(w, prefix)?;
    let mut args = Vec::new();
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            fmt::Write::write_str(w, separator)?;
        }
        let child_args = child.write_sql(w, start + args.len())?;
        args.extend(child_args);
    }
    fmt::Write::write_str(w, suffix)?;
    Ok(args)
}

/// Writes plain names joined by `separator`, quoting each one when `quoted` is set.
///
/// # Errors
///
/// Returns an error if the sink fails.
pub fn write_names(
    w: &mut SqlWriter<'_>,
    names: &[String],
    quoted: bool,
    separator: &str,
) -> Result<()> {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            fmt::Write::write_str(w, separator)?;
        }
        if quoted {
            w.write_quoted(name)?;
        } else {
            fmt::Write::write_str(w, name)?;
        }
    }
    Ok(())
}

/// An argument of a raw fragment.
#[derive(Debug, Clone)]
pub enum RawArg {
    /// Bound to a placeholder.
    Value(Arg),
    /// Rendered inline in place of the `?`.
    Expr(Expr),
}

impl<T: ToSqlValue> From<T> for RawArg {
    fn from(value: T) -> Self {
        Self::Value(Arg::Value(value.to_sql_value()))
    }
}

impl From<Arg> for RawArg {
    fn from(value: Arg) -> Self {
        Self::Value(value)
    }
}

/// Writes `text`, replacing every `?` with the dialect placeholder counted from `start`.
///
/// `\?` writes a literal `?`. An argument that is an expression is rendered inline and its own
/// arguments take its place.
///
/// # Errors
///
/// Returns [`Error::PlaceholderMismatch`] when the number of `?` differs from `args.len()`.
pub fn write_raw(
    w: &mut SqlWriter<'_>,
    start: usize,
    text: &str,
    args: &[RawArg],
) -> Result<Vec<Arg>> {
    let mut out_args = Vec::new();
    let mut total = 0;
    let mut rest = text;

    while let Some(idx) = rest.find('?') {
        if rest[..idx].ends_with('\\') {
            fmt::Write::write_str(w, &rest[..idx - 1])?;
            fmt::Write::write_char(w, '?')?;
            rest = &rest[idx + 1..];
            continue;
        }

        fmt::Write::write_str(w, &rest[..idx])?;
        match args.get(total) {
            Some(RawArg::Expr(e)) => {
                let e_args = e.write_sql(w, start + out_args.len())?;
                out_args.extend(e_args);
            }
            Some(RawArg::Value(v)) => {
                w.write_arg(start + out_args.len())?;
                out_args.push(v.clone());
            }
            None => w.write_arg(start + out_args.len())?,
        }
        total += 1;
        rest = &rest[idx + 1..];
    }
    fmt::Write::write_str(w, rest)?;

    if total != args.len() {
        return Err(Error::PlaceholderMismatch {
            expected: total,
            got: args.len(),
            sql: text.to_string(),
        });
    }

    Ok(out_args)
}

/// A raw SQL fragment with `?` markers.
#[derive(Debug, Clone)]
pub struct Raw {
    sql: String,
    args: Vec<RawArg>,
}

/// Creates a raw SQL fragment.
pub fn raw(sql: impl Into<String>) -> Raw {
    Raw {
        sql: sql.into(),
        args: vec![],
    }
}

impl Raw {
    /// Binds the value for the next `?`.
    #[must_use]
    pub fn bind(mut self, value: impl Into<Arg>) -> Self {
        self.args.push(RawArg::Value(value.into()));
        self
    }

    /// Renders an expression in place of the next `?`.
    #[must_use]
    pub fn bind_expr(mut self, e: impl IntoExpr) -> Self {
        self.args.push(RawArg::Expr(e.into_expr()));
        self
    }

    /// The SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl Expression for Raw {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        write_raw(w, start, &self.sql, &self.args)
    }
}

/// A named argument placeholder, resolved later with [`crate::value::bind_named`].
#[derive(Debug, Clone)]
pub struct Named(pub String);

/// Creates a named argument placeholder.
pub fn named(name: impl Into<String>) -> Named {
    Named(name.into())
}

impl Expression for Named {
    fn write_sql(&self, w: &mut SqlWriter<'_>, _start: usize) -> Result<Vec<Arg>> {
        w.write_named_arg(&self.0)?;
        Ok(vec![Arg::Named(self.0.clone())])
    }
}

/// Renders an expression on its own, numbering placeholders from `start`.
///
/// # Errors
///
/// Propagates any render error.
pub fn render<E: Expression + ?Sized>(
    ctx: &RenderContext,
    dialect: &dyn Dialect,
    start: usize,
    e: &E,
) -> Result<(String, Vec<Arg>)> {
    let mut sql = String::new();
    let args = {
        let mut w = SqlWriter::new(ctx, &mut sql, dialect);
        write_one(&mut w, start, e)?
    };
    Ok((sql, args))
}
