//! Builder steps that re-create a `SELECT` from its rewritten SQL.
//!
//! Every step cites byte ranges of [`ParsedQuery::sql`]. Generated code replays them
//! through a [`Template`], so a query can be extended with further modifiers without
//! parsing the SQL again at runtime.

use std::fmt::Write as _;
use std::sync::Arc;

use quarry_core::clause::{Combine, Cte, Distinct, NamedWindow, OrderDef, SetOp, TableRef, WindowDef};
use quarry_core::dialect::Dialect;
use quarry_core::expression::{raw, IntoExpr, Raw};
use quarry_core::query::raw_query;
use quarry_core::{Expr, SelectQuery, Span, SqlValue};
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::{GenError, Result};
use crate::output::{ParsedQuery, QueryArg};

/// A set operator joining two `SELECT`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    Union,
    Intersect,
    Except,
}

impl From<Combinator> for SetOp {
    fn from(c: Combinator) -> Self {
        match c {
            Combinator::Union => Self::Union,
            Combinator::Intersect => Self::Intersect,
            Combinator::Except => Self::Except,
        }
    }
}

impl Combinator {
    const fn path(self) -> &'static str {
        match self {
            Self::Union => "SetOp::Union",
            Self::Intersect => "SetOp::Intersect",
            Self::Except => "SetOp::Except",
        }
    }
}

/// One mutation of a `SELECT` under construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ModStep {
    SetRecursive,
    AppendCte {
        name: String,
        columns: Vec<String>,
        span: Span,
    },
    Distinct,
    AppendSelect {
        span: Span,
    },
    SetTable {
        span: Span,
    },
    AppendWhere {
        span: Span,
    },
    AppendGroup {
        span: Span,
    },
    AppendHaving {
        span: Span,
    },
    AppendWindow {
        name: String,
        base: Option<String>,
        partition: Option<Span>,
        /// Runs to the end of the frame, if there is one.
        order: Option<Span>,
    },
    AppendCombine {
        op: Combinator,
        all: bool,
        span: Span,
    },
    /// `combined` steps apply to the result of the set operation rather than the first arm.
    AppendOrder {
        span: Span,
        #[serde(default)]
        combined: bool,
    },
    SetLimit {
        span: Span,
        #[serde(default)]
        combined: bool,
    },
    SetOffset {
        span: Span,
        #[serde(default)]
        combined: bool,
    },
}

fn fragment_call(span: Span) -> String {
    format!("EXPR.fragment({}, {})?", span.start, span.end)
}

fn optional_range(span: Option<Span>) -> String {
    span.map_or_else(
        || String::from("None"),
        |s| format!("Some(({}, {}))", s.start, s.end),
    )
}

impl ModStep {
    /// Every source range the step cites.
    pub(crate) fn spans_mut(&mut self) -> Vec<&mut Span> {
        match self {
            Self::SetRecursive | Self::Distinct => vec![],
            Self::AppendCte { span, .. }
            | Self::AppendSelect { span }
            | Self::SetTable { span }
            | Self::AppendWhere { span }
            | Self::AppendGroup { span }
            | Self::AppendHaving { span }
            | Self::AppendCombine { span, .. }
            | Self::AppendOrder { span, .. }
            | Self::SetLimit { span, .. }
            | Self::SetOffset { span, .. } => vec![span],
            Self::AppendWindow {
                partition, order, ..
            } => partition.iter_mut().chain(order.iter_mut()).collect(),
        }
    }

    /// The step as a Rust statement against `q: SelectQuery` and `EXPR: Template`.
    #[must_use]
    pub fn render(&self) -> String {
        let prefix = |combined: bool| if combined { "combined_" } else { "" };
        match self {
            Self::SetRecursive => String::from("q.with.set_recursive(true);"),
            Self::AppendCte {
                name,
                columns,
                span,
            } => format!(
                "q.with.append_cte(EXPR.cte({name:?}, &{columns:?}, {}, {})?);",
                span.start, span.end
            ),
            Self::Distinct => String::from("q.distinct = Some(Distinct::default());"),
            Self::AppendSelect { span } => {
                format!("q.select_list.append_columns([{}]);", fragment_call(*span))
            }
            Self::SetTable { span } => format!("q.table = TableRef::new({});", fragment_call(*span)),
            Self::AppendWhere { span } => format!("q.where_.append_where({});", fragment_call(*span)),
            Self::AppendGroup { span } => {
                format!("q.group_by.append_group({});", fragment_call(*span))
            }
            Self::AppendHaving { span } => {
                format!("q.having.append_having({});", fragment_call(*span))
            }
            Self::AppendWindow {
                name,
                base,
                partition,
                order,
            } => format!(
                "q.windows.append_window(EXPR.window({name:?}, {base:?}, {}, {})?);",
                optional_range(*partition),
                optional_range(*order)
            ),
            Self::AppendCombine { op, all, span } => format!(
                "q.combines.push(EXPR.combine({}, {all}, {}, {})?);",
                op.path(),
                span.start,
                span.end
            ),
            Self::AppendOrder { span, combined } => format!(
                "q.{}order_by.append_order(OrderDef::new({}));",
                prefix(*combined),
                fragment_call(*span)
            ),
            Self::SetLimit { span, combined } => format!(
                "q.{}limit.set_limit({});",
                prefix(*combined),
                fragment_call(*span)
            ),
            Self::SetOffset { span, combined } => format!(
                "q.{}offset.set_offset({});",
                prefix(*combined),
                fragment_call(*span)
            ),
        }
    }
}

/// Renders a list of steps, one statement per line.
#[must_use]
pub fn render_steps(steps: &[ModStep]) -> String {
    let mut out = String::new();
    for step in steps {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}", step.render());
    }
    out
}

/// The rewritten SQL of a statement, sliced into builder expressions.
#[derive(Debug, Clone)]
pub struct Template {
    sql: String,
    binds: Vec<Span>,
    dialect: &'static dyn Dialect,
}

fn collect_binds(args: &[QueryArg], out: &mut Vec<Span>) {
    for arg in args {
        if arg.children.is_empty() {
            out.extend(arg.positions.iter().copied());
        } else {
            collect_binds(&arg.children, out);
        }
    }
}

impl Template {
    #[must_use]
    pub fn new(query: &ParsedQuery, engine: Engine) -> Self {
        let mut binds = Vec::new();
        collect_binds(&query.args, &mut binds);
        binds.sort_by_key(|s| s.start);
        Self {
            sql: query.sql.clone(),
            binds,
            dialect: engine.dialect(),
        }
    }

    /// The SQL between `start` and `end` as a raw fragment.
    ///
    /// Placeholders keep their position but are bound to `NULL`; callers rebind them when
    /// they execute the query. A literal `?` in the text is escaped.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Argument`] if the range is not inside the SQL.
    pub fn raw(&self, start: usize, end: usize) -> Result<Raw> {
        let span = Span::new(start, end);
        if start > end || self.sql.get(start..end).is_none() {
            return Err(GenError::argument(span, "range is outside the statement"));
        }
        let mut text = String::new();
        let mut count = 0;
        let mut cursor = start;
        for bind in self.binds.iter().filter(|b| span.contains(**b)) {
            escape_into(&mut text, &self.sql[cursor..bind.start]);
            text.push('?');
            count += 1;
            cursor = bind.end;
        }
        escape_into(&mut text, &self.sql[cursor..end]);
        Ok((0..count).fold(raw(text), |r, _| r.bind(SqlValue::Null)))
    }

    /// # Errors
    ///
    /// Returns [`GenError::Argument`] if the range is not inside the SQL.
    pub fn fragment(&self, start: usize, end: usize) -> Result<Expr> {
        Ok(self.raw(start, end)?.into_expr())
    }

    /// A CTE whose body is the given range.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Argument`] if the range is not inside the SQL.
    pub fn cte(&self, name: &str, columns: &[&str], start: usize, end: usize) -> Result<Cte> {
        Ok(Cte {
            columns: columns.iter().map(ToString::to_string).collect(),
            query: Some(Arc::new(raw_query(self.dialect, self.raw(start, end)?))),
            ..Cte::new(name)
        })
    }

    /// # Errors
    ///
    /// Returns [`GenError::Argument`] if the range is not inside the SQL.
    pub fn combine(&self, op: SetOp, all: bool, start: usize, end: usize) -> Result<Combine> {
        Ok(Combine {
            strategy: Some(op),
            all,
            query: Arc::new(raw_query(self.dialect, self.raw(start, end)?)),
        })
    }

    /// A named window; the partition and order ranges exclude their keywords.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Argument`] if a range is not inside the SQL.
    pub fn window(
        &self,
        name: &str,
        base: Option<&str>,
        partition: Option<(usize, usize)>,
        order: Option<(usize, usize)>,
    ) -> Result<NamedWindow> {
        let mut definition = WindowDef {
            from: base.map(ToString::to_string),
            ..WindowDef::default()
        };
        if let Some((start, end)) = partition {
            definition.append_partition([self.fragment(start, end)?]);
        }
        if let Some((start, end)) = order {
            definition.append_order(OrderDef::new(self.fragment(start, end)?));
        }
        Ok(NamedWindow {
            name: name.to_string(),
            definition,
        })
    }

    /// Applies `steps` to a fresh `SELECT` in the template's dialect.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Argument`] if a step cites a range outside the SQL.
    pub fn replay(&self, steps: &[ModStep]) -> Result<SelectQuery> {
        let mut q = SelectQuery::new(self.dialect);
        let pair = |s: Option<Span>| s.map(|s| (s.start, s.end));
        for step in steps {
            match step {
                ModStep::SetRecursive => q.with.set_recursive(true),
                ModStep::AppendCte {
                    name,
                    columns,
                    span,
                } => {
                    let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
                    q.with.append_cte(self.cte(name, &columns, span.start, span.end)?);
                }
                ModStep::Distinct => q.distinct = Some(Distinct::default()),
                ModStep::AppendSelect { span } => {
                    q.select_list.append_columns([self.fragment(span.start, span.end)?]);
                }
                ModStep::SetTable { span } => {
                    q.table = TableRef::new(self.fragment(span.start, span.end)?);
                }
                ModStep::AppendWhere { span } => {
                    q.where_.append_where(self.fragment(span.start, span.end)?);
                }
                ModStep::AppendGroup { span } => {
                    q.group_by.append_group(self.fragment(span.start, span.end)?);
                }
                ModStep::AppendHaving { span } => {
                    q.having.append_having(self.fragment(span.start, span.end)?);
                }
                ModStep::AppendWindow {
                    name,
                    base,
                    partition,
                    order,
                } => {
                    let window =
                        self.window(name, base.as_deref(), pair(*partition), pair(*order))?;
                    q.windows.append_window(window);
                }
                ModStep::AppendCombine { op, all, span } => {
                    let combine = self.combine((*op).into(), *all, span.start, span.end)?;
                    q.combines.push(combine);
                }
                ModStep::AppendOrder { span, combined } => {
                    let order = OrderDef::new(self.fragment(span.start, span.end)?);
                    if *combined {
                        q.combined_order.append_order(order);
                    } else {
                        q.order_by.append_order(order);
                    }
                }
                ModStep::SetLimit { span, combined } => {
                    let limit = self.fragment(span.start, span.end)?;
                    if *combined {
                        q.combined_limit.set_limit(limit);
                    } else {
                        q.limit.set_limit(limit);
                    }
                }
                ModStep::SetOffset { span, combined } => {
                    let offset = self.fragment(span.start, span.end)?;
                    if *combined {
                        q.combined_offset.set_offset(offset);
                    } else {
                        q.offset.set_offset(offset);
                    }
                }
            }
        }
        Ok(q)
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '?' {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Re-creates the `SELECT` a transpiled statement describes.
///
/// # Errors
///
/// Returns [`GenError::Unsupported`] for statements that carry no steps and
/// [`GenError::Argument`] if a step cites a range outside the SQL.
pub fn replay(query: &ParsedQuery, engine: Engine) -> Result<SelectQuery> {
    if query.steps.is_empty() {
        return Err(GenError::unsupported(
            Span::new(0, query.sql.len()),
            format!("{} has no builder steps", query.name),
        ));
    }
    Template::new(query, engine).replay(&query.steps)
}

#[cfg(test)]
mod tests {
    use quarry_core::query::Query;

    use super::*;
    use crate::config::QueryConfig;
    use crate::output::QueryCol;

    fn parsed(sql: &str, binds: &[(usize, usize)], steps: Vec<ModStep>) -> ParsedQuery {
        ParsedQuery {
            name: String::from("Q"),
            query_type: quarry_core::QueryType::Select,
            sql: sql.to_string(),
            config: QueryConfig::for_query("Q"),
            columns: vec![],
            args: binds
                .iter()
                .map(|(s, e)| QueryArg {
                    col: QueryCol::default(),
                    children: vec![],
                    positions: vec![Span::new(*s, *e)],
                    can_be_multiple: false,
                })
                .collect(),
            mods: render_steps(&steps),
            steps,
        }
    }

    fn at(sql: &str, part: &str) -> Span {
        let start = sql.find(part).unwrap();
        Span::new(start, start + part.len())
    }

    #[test]
    fn test_replay_select() {
        let sql = "SELECT \"id\" FROM \"users\" WHERE \"id\" = ?1 AND \"name\" <> '?' LIMIT ?2";
        let q1 = at(sql, "?1");
        let q2 = at(sql, "?2");
        let steps = vec![
            ModStep::AppendSelect {
                span: at(sql, "\"id\""),
            },
            ModStep::SetTable {
                span: at(sql, "\"users\""),
            },
            ModStep::AppendWhere {
                span: at(sql, "\"id\" = ?1 AND \"name\" <> '?'"),
            },
            ModStep::SetLimit {
                span: q2,
                combined: false,
            },
        ];
        let query = parsed(sql, &[(q1.start, q1.end), (q2.start, q2.end)], steps);
        let select = replay(&query, Engine::Sqlite).unwrap();
        let (out, args) = select.build().unwrap();
        assert_eq!(
            out.split_whitespace().collect::<Vec<_>>().join(" "),
            "SELECT \"id\" FROM \"users\" WHERE \"id\" = ?1 AND \"name\" <> '?' LIMIT ?2"
        );
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_replay_combine_and_cte() {
        let sql = "WITH \"x\" AS (SELECT 1) SELECT \"a\" FROM \"x\" UNION ALL SELECT 2 ORDER BY 1";
        let from = sql.find("FROM ").unwrap() + 5;
        let steps = vec![
            ModStep::AppendCte {
                name: String::from("x"),
                columns: vec![],
                span: at(sql, "SELECT 1"),
            },
            ModStep::AppendSelect {
                span: at(sql, "\"a\""),
            },
            ModStep::SetTable {
                span: Span::new(from, from + 3),
            },
            ModStep::AppendCombine {
                op: Combinator::Union,
                all: true,
                span: at(sql, "SELECT 2"),
            },
            ModStep::AppendOrder {
                span: Span::new(sql.len() - 1, sql.len()),
                combined: true,
            },
        ];
        let query = parsed(sql, &[], steps);
        let (out, _) = replay(&query, Engine::Sqlite).unwrap().build().unwrap();
        let out = out.split_whitespace().collect::<Vec<_>>().join(" ");
        assert!(out.starts_with("WITH \"x\" AS (SELECT 1) SELECT \"a\" FROM \"x\""));
        assert!(out.contains("UNION ALL SELECT 2"));
        assert!(out.ends_with("ORDER BY 1"));
    }

    #[test]
    fn test_render_steps() {
        let steps = [
            ModStep::SetRecursive,
            ModStep::AppendWhere {
                span: Span::new(3, 9),
            },
            ModStep::SetLimit {
                span: Span::new(20, 22),
                combined: true,
            },
            ModStep::AppendWindow {
                name: String::from("w"),
                base: None,
                partition: Some(Span::new(1, 2)),
                order: None,
            },
        ];
        assert_eq!(
            render_steps(&steps),
            "q.with.set_recursive(true);\n\
             q.where_.append_where(EXPR.fragment(3, 9)?);\n\
             q.combined_limit.set_limit(EXPR.fragment(20, 22)?);\n\
             q.windows.append_window(EXPR.window(\"w\", None, Some((1, 2)), None)?);\n"
        );
    }

    #[test]
    fn test_range_outside_sql_is_an_error() {
        let query = parsed("SELECT 1", &[], vec![]);
        let template = Template::new(&query, Engine::Mysql);
        assert!(matches!(template.raw(4, 40), Err(GenError::Argument { .. })));
        assert!(replay(&query, Engine::Mysql).is_err());
    }
}
