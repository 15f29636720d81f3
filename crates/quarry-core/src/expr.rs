//! Expression builder.
//!
//! Small constructors ([`quote`], [`arg`], [`s`], [`func`], ...) produce expressions, and the
//! [`Chain`] trait adds operators to every expression. Binary operators are always wrapped in
//! parentheses, so composed expressions never depend on operator precedence.
//!
//! ```rust
//! use quarry_core::dialect::MYSQL;
//! use quarry_core::expr::{arg_group, Chain};
//! use quarry_core::expression::{raw, render};
//! use quarry_core::RenderContext;
//!
//! let cond = raw("id").in_([arg_group([100, 200, 300])]);
//! let (sql, args) = render(&RenderContext::new(), &MYSQL, 1, &cond).unwrap();
//! assert_eq!(sql, "(id IN (?, ?, ?))");
//! assert_eq!(args.len(), 3);
//! ```

use std::fmt::Write as _;

use crate::clause::WindowDef;
use crate::error::Result;
use crate::expression::{
    write_one_if, write_slice_with, Expr, Expression, IntoExpr, SqlWriter,
};
use crate::value::{Arg, SqlValue, ToSqlValue};

/// Dot-joined quoted identifiers such as `"users"."id"`.
#[derive(Debug, Clone)]
pub struct Quoted(Vec<String>);

/// Creates a quoted, dot-joined identifier. Empty parts are skipped.
pub fn quote<I, S>(parts: I) -> Quoted
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Quoted(
        parts
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.is_empty())
            .collect(),
    )
}

impl Expression for Quoted {
    fn write_sql(&self, w: &mut SqlWriter<'_>, _start: usize) -> Result<Vec<Arg>> {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                w.write_char('.')?;
            }
            w.write_quoted(part)?;
        }
        Ok(vec![])
    }
}

/// Bound values rendered as comma-separated placeholders.
#[derive(Debug, Clone)]
pub struct Args {
    values: Vec<Arg>,
    grouped: bool,
}

/// Binds values as `?, ?, ?`. An empty list renders `NULL`.
pub fn arg<I, T>(values: I) -> Args
where
    I: IntoIterator<Item = T>,
    T: ToSqlValue,
{
    Args {
        values: values
            .into_iter()
            .map(|v| Arg::Value(v.to_sql_value()))
            .collect(),
        grouped: false,
    }
}

/// Like [`arg`] but wrapped in parentheses: `(?, ?, ?)`.
pub fn arg_group<I, T>(values: I) -> Args
where
    I: IntoIterator<Item = T>,
    T: ToSqlValue,
{
    Args {
        grouped: true,
        ..arg(values)
    }
}

impl Expression for Args {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        if self.grouped {
            w.write_char('(')?;
        }
        if self.values.is_empty() {
            w.write_str("NULL")?;
        }
        for i in 0..self.values.len() {
            if i > 0 {
                w.write_str(", ")?;
            }
            w.write_arg(start + i)?;
        }
        if self.grouped {
            w.write_char(')')?;
        }
        Ok(self.values.clone())
    }
}

/// `n` placeholders bound to `NULL`, to be filled in by the caller.
#[must_use]
pub fn placeholder(n: usize) -> Args {
    Args {
        values: vec![Arg::Value(SqlValue::Null); n],
        grouped: false,
    }
}

/// A string literal, single-quoted and escaped.
#[derive(Debug, Clone)]
pub struct StringLit(String);

/// Creates a string literal.
pub fn s(value: impl Into<String>) -> StringLit {
    StringLit(value.into())
}

impl Expression for StringLit {
    fn write_sql(&self, w: &mut SqlWriter<'_>, _start: usize) -> Result<Vec<Arg>> {
        write!(w, "'{}'", self.0.replace('\'', "''"))?;
        Ok(vec![])
    }
}

/// Expressions joined by a separator, optionally wrapped in parentheses.
#[derive(Debug, Clone)]
pub struct Joined {
    exprs: Vec<Expr>,
    separator: &'static str,
    wrapped: bool,
}

impl Expression for Joined {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let (open, close) = if self.wrapped { ("(", ")") } else { ("", "") };
        write_slice_with(w, start, &self.exprs, open, self.separator, close)
    }
}

/// `(a, b, c)`.
pub fn group(exprs: impl IntoIterator<Item = Expr>) -> Joined {
    Joined {
        exprs: exprs.into_iter().collect(),
        separator: ", ",
        wrapped: true,
    }
}

/// `(a AND b AND c)`.
pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Joined {
    Joined {
        exprs: exprs.into_iter().collect(),
        separator: " AND ",
        wrapped: true,
    }
}

/// `(a OR b OR c)`.
pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Joined {
    Joined {
        exprs: exprs.into_iter().collect(),
        separator: " OR ",
        wrapped: true,
    }
}

/// `(a || b || c)`.
pub fn concat(exprs: impl IntoIterator<Item = Expr>) -> Joined {
    Joined {
        exprs: exprs.into_iter().collect(),
        separator: " || ",
        wrapped: true,
    }
}

/// `(e)`.
pub fn paren(e: impl IntoExpr) -> Joined {
    group([e.into_expr()])
}

/// `NOT e`.
#[derive(Debug, Clone)]
pub struct Not(Expr);

/// Negates an expression.
pub fn not(e: impl IntoExpr) -> Not {
    Not(e.into_expr())
}

impl Expression for Not {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        w.write_str("NOT ")?;
        self.0.write_sql(w, start)
    }
}

/// An operator application produced by [`Chain`].
#[derive(Debug, Clone)]
pub enum Operation {
    /// `(left op right)`.
    Binary {
        /// Left operand.
        left: Expr,
        /// Operator text.
        op: &'static str,
        /// Right operand.
        right: Expr,
    },
    /// `(operand suffix)`.
    Postfix {
        /// The operand.
        operand: Expr,
        /// Suffix text such as `IS NULL`.
        suffix: &'static str,
    },
    /// `(operand [NOT ]BETWEEN low AND high)`.
    Between {
        /// The operand.
        operand: Expr,
        /// Lower bound.
        low: Expr,
        /// Upper bound.
        high: Expr,
        /// Whether this is `NOT BETWEEN`.
        negated: bool,
    },
    /// `(operand [NOT ]IN values)`, values comma-joined.
    In {
        /// The operand.
        operand: Expr,
        /// The values.
        values: Vec<Expr>,
        /// Whether this is `NOT IN`.
        negated: bool,
    },
    /// `operand AS "alias"`.
    Alias {
        /// The aliased expression.
        operand: Expr,
        /// The alias.
        alias: String,
    },
}

impl Expression for Operation {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        match self {
            Self::Binary { left, op, right } => {
                w.write_char('(')?;
                let mut args = left.write_sql(w, start)?;
                write!(w, " {op} ")?;
                args.extend(right.write_sql(w, start + args.len())?);
                w.write_char(')')?;
                Ok(args)
            }
            Self::Postfix { operand, suffix } => {
                w.write_char('(')?;
                let args = operand.write_sql(w, start)?;
                write!(w, " {suffix})")?;
                Ok(args)
            }
            Self::Between {
                operand,
                low,
                high,
                negated,
            } => {
                w.write_char('(')?;
                let mut args = operand.write_sql(w, start)?;
                w.write_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " })?;
                args.extend(low.write_sql(w, start + args.len())?);
                w.write_str(" AND ")?;
                args.extend(high.write_sql(w, start + args.len())?);
                w.write_char(')')?;
                Ok(args)
            }
            Self::In {
                operand,
                values,
                negated,
            } => {
                w.write_char('(')?;
                let mut args = operand.write_sql(w, start)?;
                w.write_str(if *negated { " NOT IN " } else { " IN " })?;
                args.extend(write_slice_with(w, start + args.len(), values, "", ", ", "")?);
                w.write_char(')')?;
                Ok(args)
            }
            Self::Alias { operand, alias } => {
                let args = operand.write_sql(w, start)?;
                w.write_str(" AS ")?;
                w.write_quoted(alias)?;
                Ok(args)
            }
        }
    }
}

fn binary(left: Expr, op: &'static str, right: impl IntoExpr) -> Operation {
    Operation::Binary {
        left,
        op,
        right: right.into_expr(),
    }
}

/// Operators available on every expression.
pub trait Chain: Expression + Sized + 'static {
    /// `(self = target)`.
    fn eq(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "=", target)
    }

    /// `(self <> target)`.
    fn ne(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "<>", target)
    }

    /// `(self < target)`.
    fn lt(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "<", target)
    }

    /// `(self <= target)`.
    fn lte(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "<=", target)
    }

    /// `(self > target)`.
    fn gt(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), ">", target)
    }

    /// `(self >= target)`.
    fn gte(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), ">=", target)
    }

    /// `(self <op> target)` for any operator.
    fn op(self, op: &'static str, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), op, target)
    }

    /// `(self IS target)`.
    fn is(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "IS", target)
    }

    /// `(self IS NOT target)`.
    fn is_not(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "IS NOT", target)
    }

    /// `(self IS DISTINCT FROM target)`.
    fn is_distinct_from(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "IS DISTINCT FROM", target)
    }

    /// `(self IS NOT DISTINCT FROM target)`.
    fn is_not_distinct_from(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "IS NOT DISTINCT FROM", target)
    }

    /// `(self IS NULL)`.
    fn is_null(self) -> Operation {
        Operation::Postfix {
            operand: self.into_expr(),
            suffix: "IS NULL",
        }
    }

    /// `(self IS NOT NULL)`.
    fn is_not_null(self) -> Operation {
        Operation::Postfix {
            operand: self.into_expr(),
            suffix: "IS NOT NULL",
        }
    }

    /// `(self IN v1, v2)`; pass an [`arg_group`] or a [`group`] for the parentheses.
    fn in_(self, values: impl IntoIterator<Item = impl IntoExpr>) -> Operation {
        Operation::In {
            operand: self.into_expr(),
            values: values.into_iter().map(IntoExpr::into_expr).collect(),
            negated: false,
        }
    }

    /// `(self NOT IN v1, v2)`.
    fn not_in(self, values: impl IntoIterator<Item = impl IntoExpr>) -> Operation {
        Operation::In {
            operand: self.into_expr(),
            values: values.into_iter().map(IntoExpr::into_expr).collect(),
            negated: true,
        }
    }

    /// `(self BETWEEN low AND high)`.
    fn between(self, low: impl IntoExpr, high: impl IntoExpr) -> Operation {
        Operation::Between {
            operand: self.into_expr(),
            low: low.into_expr(),
            high: high.into_expr(),
            negated: false,
        }
    }

    /// `(self NOT BETWEEN low AND high)`.
    fn not_between(self, low: impl IntoExpr, high: impl IntoExpr) -> Operation {
        Operation::Between {
            operand: self.into_expr(),
            low: low.into_expr(),
            high: high.into_expr(),
            negated: true,
        }
    }

    /// `(self LIKE pattern)`.
    fn like(self, pattern: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "LIKE", pattern)
    }

    /// `(self NOT LIKE pattern)`.
    fn not_like(self, pattern: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "NOT LIKE", pattern)
    }

    /// `(self + target)`.
    fn plus(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "+", target)
    }

    /// `(self - target)`.
    fn minus(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "-", target)
    }

    /// `(self * target)`.
    fn mul(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "*", target)
    }

    /// `(self / target)`.
    fn div(self, target: impl IntoExpr) -> Operation {
        binary(self.into_expr(), "/", target)
    }

    /// `(self || t1 || t2 ...)`.
    fn concat(self, targets: impl IntoIterator<Item = Expr>) -> Joined {
        concat(std::iter::once(self.into_expr()).chain(targets))
    }

    /// `(self AND t1 AND t2 ...)`.
    fn and(self, targets: impl IntoIterator<Item = Expr>) -> Joined {
        and(std::iter::once(self.into_expr()).chain(targets))
    }

    /// `(self OR t1 OR t2 ...)`.
    fn or(self, targets: impl IntoIterator<Item = Expr>) -> Joined {
        or(std::iter::once(self.into_expr()).chain(targets))
    }

    /// `self AS "alias"`.
    fn as_(self, alias: impl Into<String>) -> Operation {
        Operation::Alias {
            operand: self.into_expr(),
            alias: alias.into(),
        }
    }
}

impl<E: Expression + 'static> Chain for E {}

/// A function call.
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    args: Vec<Expr>,
    distinct: bool,
    star: bool,
    filter: Vec<Expr>,
    over: Option<WindowDef>,
}

/// Creates a function call `name(args...)`.
pub fn func(name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Function {
    Function {
        name: name.into(),
        args: args.into_iter().collect(),
        distinct: false,
        star: false,
        filter: vec![],
        over: None,
    }
}

impl Function {
    /// Renders `name(DISTINCT ...)`.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Renders `name(*)` instead of the argument list.
    #[must_use]
    pub const fn star(mut self) -> Self {
        self.star = true;
        self
    }

    /// Adds a `FILTER (WHERE ...)` condition; several are AND-ed.
    #[must_use]
    pub fn filter(mut self, condition: impl IntoExpr) -> Self {
        self.filter.push(condition.into_expr());
        self
    }

    /// Adds `OVER (window)`.
    #[must_use]
    pub fn over(mut self, window: impl Into<WindowDef>) -> Self {
        self.over = Some(window.into());
        self
    }
}

impl Expression for Function {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        write!(w, "{}(", self.name)?;
        if self.distinct {
            w.write_str("DISTINCT ")?;
        }
        let mut args = if self.star {
            w.write_char('*')?;
            vec![]
        } else {
            write_slice_with(w, start, &self.args, "", ", ", "")?
        };
        w.write_char(')')?;

        args.extend(write_slice_with(
            w,
            start + args.len(),
            &self.filter,
            " FILTER (WHERE ",
            " AND ",
            ")",
        )?);

        if let Some(window) = &self.over {
            w.write_str(" OVER (")?;
            args.extend(window.write_sql(w, start + args.len())?);
            w.write_char(')')?;
        }
        Ok(args)
    }
}

/// A `CASE` expression under construction.
#[derive(Debug, Clone, Default)]
pub struct Case {
    whens: Vec<(Expr, Expr)>,
    else_: Option<Expr>,
}

/// Starts a searched `CASE` expression.
#[must_use]
pub fn case() -> Case {
    Case::default()
}

impl Case {
    /// Adds `WHEN condition THEN then`.
    #[must_use]
    pub fn when(mut self, condition: impl IntoExpr, then: impl IntoExpr) -> Self {
        self.whens.push((condition.into_expr(), then.into_expr()));
        self
    }

    /// Sets the `ELSE` branch.
    #[must_use]
    pub fn else_(mut self, then: impl IntoExpr) -> Self {
        self.else_ = Some(then.into_expr());
        self
    }
}

impl Expression for Case {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        w.write_str("(CASE")?;
        let mut args = Vec::new();
        for (condition, then) in &self.whens {
            w.write_str(" WHEN ")?;
            args.extend(condition.write_sql(w, start + args.len())?);
            w.write_str(" THEN ")?;
            args.extend(then.write_sql(w, start + args.len())?);
        }
        if let Some(e) = &self.else_ {
            args.extend(write_one_if(w, start + args.len(), e, true, " ELSE ", "")?);
        }
        w.write_str(" END)")?;
        Ok(args)
    }
}

/// `CAST(e AS type)`.
#[derive(Debug, Clone)]
pub struct Cast {
    expr: Expr,
    type_name: String,
}

/// Creates a cast.
pub fn cast(e: impl IntoExpr, type_name: impl Into<String>) -> Cast {
    Cast {
        expr: e.into_expr(),
        type_name: type_name.into(),
    }
}

impl Expression for Cast {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        w.write_str("CAST(")?;
        let args = self.expr.write_sql(w, start)?;
        write!(w, " AS {})", self.type_name)?;
        Ok(args)
    }
}
