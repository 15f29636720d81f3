//! Expression typing.

use quarry_core::ast::{
    BinaryOp, Expr, ExprKind, FrameBound, FunctionArgs, FunctionCall, InList, Literal, Over,
    UnaryOp, WhenClause, WindowSpec,
};
use quarry_core::lexer::Parameter;
use quarry_core::Span;
use tracing::debug;

use super::sources::ReturnColumn;
use super::Visitor;
use crate::engine::{base_type, Engine};
use crate::error::{GenError, Result};
use crate::functions;
use crate::types::{NodeType, NodeTypes};

fn one(class: &str) -> NodeTypes {
    NodeTypes::from(NodeType::new(class))
}

fn numeric() -> NodeTypes {
    [NodeType::new("INTEGER"), NodeType::new("REAL")]
        .into_iter()
        .collect()
}

fn wildcard(nullable: bool) -> NodeTypes {
    NodeTypes::from(NodeType::new("").with_nullable(nullable))
}

/// The items of a row value, `(a, b)` or `ROW(a, b)`.
fn row_items(e: &Expr) -> Option<&[Expr]> {
    match &e.unnested().kind {
        ExprKind::List(items) | ExprKind::Row(items) => Some(items),
        _ => None,
    }
}

fn single_column(span: Span, columns: Vec<ReturnColumn>) -> Result<NodeTypes> {
    if columns.len() != 1 {
        return Err(GenError::argument(
            span,
            format!("sub-select returns {} columns - expected 1", columns.len()),
        ));
    }
    Ok(columns
        .into_iter()
        .next()
        .map(|c| c.types)
        .unwrap_or_default())
}

impl Visitor<'_> {
    /// Types `e` and its children and records them; returns the types of `e`.
    pub(super) fn expr(&mut self, e: &Expr) -> Result<NodeTypes> {
        let types = match &e.kind {
            ExprKind::Bind(parameter) => return self.bind(e, parameter),
            ExprKind::Literal(literal) => {
                if let Literal::String(text) = literal {
                    self.set_name(e.span, text);
                }
                self.literal(literal)
            }
            ExprKind::Column {
                schema,
                table,
                name,
            } => {
                if let Some(schema) = schema {
                    self.quote(schema);
                }
                if let Some(table) = table {
                    self.quote(table);
                }
                self.quote(name);
                self.set_name(e.span, &name.value);
                self.find_column(schema.as_ref(), table.as_ref(), name)?.types
            }
            ExprKind::Wildcard { .. } => {
                return Err(GenError::unsupported(
                    e.span,
                    "* is only allowed as a result column or in count(*)",
                ))
            }
            ExprKind::Unary { op, operand } => self.unary(*op, operand)?,
            ExprKind::Binary { left, op, right } => self.binary(left, *op, right)?,
            ExprKind::IsNull { expr, .. } => {
                let types = self.expr(expr)?;
                self.constrain(expr, &types, &wildcard(true))?;
                one("BOOLEAN")
            }
            ExprKind::Is { left, right, .. } => {
                self.compare(left, right)?;
                one("BOOLEAN")
            }
            ExprKind::In { expr, list, .. } => self.in_list(expr, list)?,
            ExprKind::Between {
                expr, low, high, ..
            } => {
                let t = self.expr(expr)?;
                let lt = self.expr(low)?;
                let ht = self.expr(high)?;
                self.cross_link(expr, &t, low, &lt);
                self.cross_link(expr, &t, high, &ht);
                one("BOOLEAN").with_nullable(t.is_nullable() || lt.is_nullable() || ht.is_nullable())
            }
            ExprKind::Like {
                expr,
                pattern,
                escape,
                ..
            } => {
                let mut nullable = false;
                for part in [Some(expr), Some(pattern), escape.as_ref()]
                    .into_iter()
                    .flatten()
                {
                    nullable |= self.text_operand(part)?.is_nullable();
                }
                one("BOOLEAN").with_nullable(nullable)
            }
            ExprKind::Function(call) => self.function(call, e.span)?,
            ExprKind::Cast {
                expr, type_name, ..
            } => {
                let inner = self.expr(expr)?;
                if inner.is_unknown() {
                    self.link(expr, e.span, false);
                }
                NodeTypes::from(
                    NodeType::new(self.engine.affinity(type_name)).declared(base_type(type_name)),
                )
            }
            ExprKind::Case {
                operand,
                when_clauses,
                else_clause,
            } => self.case(operand.as_deref(), when_clauses, else_clause.as_deref())?,
            ExprKind::Exists(query) => {
                self.scoped(|v| v.query(query, false))?;
                self.mark_group(e.span, false);
                one("BOOLEAN")
            }
            ExprKind::Subquery(query) => {
                let columns = self.scoped(|v| v.query(query, false))?;
                self.mark_group(e.span, false);
                single_column(e.span, columns)?.with_nullable(true)
            }
            ExprKind::Nested(inner) => self.expr(inner)?,
            ExprKind::List(items) | ExprKind::Row(items) => {
                self.mark_group(e.span, false);
                for item in items {
                    self.expr(item)?;
                }
                NodeTypes::default()
            }
            ExprKind::Collate { expr, .. } => self.text_operand(expr)?,
        };
        self.set_types(e.span, &types)
    }

    fn bind(&mut self, e: &Expr, parameter: &Parameter) -> Result<NodeTypes> {
        let key = match parameter.key() {
            Some(_) if !self.engine.named_binds() => {
                return Err(GenError::unsupported(
                    e.span,
                    format!("{} only supports anonymous ? binds", self.engine),
                ))
            }
            Some(key) => key,
            None => {
                self.anonymous += 1;
                format!("#{}", self.anonymous)
            }
        };
        let config = self.config_after(e.span);
        let node = self.node(e.span);
        if node.bind.is_none() {
            node.bind = Some(key);
            node.config = config;
        }
        Ok(self.resolved(e.span))
    }

    fn literal(&self, literal: &Literal) -> NodeTypes {
        let clock = |declared: &str| match self.engine {
            Engine::Sqlite => one("TEXT"),
            Engine::Mysql => NodeTypes::from(NodeType::new("TEXT").declared(declared)),
        };
        match literal {
            Literal::Integer(_) => one("INTEGER"),
            Literal::Float(_) => one("REAL"),
            Literal::String(_) => one("TEXT"),
            Literal::Blob(_) => one("BLOB"),
            Literal::Boolean(_) => one("BOOLEAN"),
            Literal::Null => wildcard(true),
            Literal::CurrentDate => clock("DATE"),
            Literal::CurrentTime => clock("TIME"),
            Literal::CurrentTimestamp => clock("DATETIME"),
        }
    }

    /// Gives an operand the `constraint` type if nothing is known about it yet.
    fn constrain(&mut self, e: &Expr, types: &NodeTypes, constraint: &NodeTypes) -> Result<()> {
        if types.is_unknown() {
            self.set_types(e.unnested().span, constraint)?;
        }
        Ok(())
    }

    fn text_operand(&mut self, e: &Expr) -> Result<NodeTypes> {
        let types = self.expr(e)?;
        self.constrain(e, &types, &one("TEXT"))?;
        Ok(types)
    }

    /// Lets an operand without a type take the type of the other side.
    fn cross_link(&mut self, a: &Expr, at: &NodeTypes, b: &Expr, bt: &NodeTypes) {
        if at.is_unknown() && !bt.is_unknown() {
            self.link(a, b.unnested().span, true);
        } else if bt.is_unknown() && !at.is_unknown() {
            self.link(b, a.unnested().span, true);
        }
    }

    /// Links row values item by item.
    fn pair_rows(&mut self, left: &Expr, right: &Expr) -> Result<()> {
        let (Some(l), Some(r)) = (row_items(left), row_items(right)) else {
            return Ok(());
        };
        if l.len() != r.len() {
            return Err(GenError::argument(
                right.span,
                format!("row value misused: {} values compared with {}", l.len(), r.len()),
            ));
        }
        for (a, b) in l.iter().zip(r) {
            let at = self.resolved(a.unnested().span);
            let bt = self.resolved(b.unnested().span);
            self.cross_link(a, &at, b, &bt);
            self.match_names(a, b);
        }
        Ok(())
    }

    fn compare(&mut self, left: &Expr, right: &Expr) -> Result<(NodeTypes, NodeTypes)> {
        let lt = self.expr(left)?;
        let rt = self.expr(right)?;
        self.cross_link(left, &lt, right, &rt);
        self.match_names(left, right);
        self.pair_rows(left, right)?;
        Ok((lt, rt))
    }

    fn unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<NodeTypes> {
        let types = self.expr(operand)?;
        let nullable = types.is_nullable();
        let result = match op {
            UnaryOp::Neg | UnaryOp::Plus => {
                self.constrain(operand, &types, &numeric())?;
                if types.is_unknown() {
                    numeric()
                } else {
                    types
                }
            }
            UnaryOp::Not => {
                self.constrain(operand, &types, &one("BOOLEAN"))?;
                one("BOOLEAN")
            }
            UnaryOp::BitNot => {
                self.constrain(operand, &types, &one("INTEGER"))?;
                one("INTEGER")
            }
        };
        Ok(result.with_nullable(nullable))
    }

    fn binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr) -> Result<NodeTypes> {
        if matches!(
            op,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::NullSafeEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        ) {
            let (lt, rt) = self.compare(left, right)?;
            let nullable = op != BinaryOp::NullSafeEq && (lt.is_nullable() || rt.is_nullable());
            return Ok(one("BOOLEAN").with_nullable(nullable));
        }

        let lt = self.expr(left)?;
        let rt = self.expr(right)?;
        let nullable = lt.is_nullable() || rt.is_nullable();
        let both = |v: &mut Self, constraint: &NodeTypes| -> Result<()> {
            v.constrain(left, &lt, constraint)?;
            v.constrain(right, &rt, constraint)
        };
        let result = match op {
            BinaryOp::And | BinaryOp::Or => {
                both(self, &one("BOOLEAN"))?;
                one("BOOLEAN")
            }
            BinaryOp::Concat => {
                both(self, &one("TEXT"))?;
                one("TEXT")
            }
            BinaryOp::Mod
            | BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::LeftShift
            | BinaryOp::RightShift => {
                both(self, &one("INTEGER"))?;
                one("INTEGER")
            }
            BinaryOp::JsonExtract => {
                self.constrain(right, &rt, &one("TEXT"))?;
                return Ok(NodeTypes::from(NodeType::nullable("JSON")));
            }
            BinaryOp::JsonExtractText => {
                self.constrain(right, &rt, &one("TEXT"))?;
                return Ok(wildcard(true));
            }
            _ => {
                self.cross_link(left, &lt, right, &rt);
                if lt.is_unknown() && rt.is_unknown() {
                    both(self, &numeric())?;
                    numeric()
                } else {
                    let l = if lt.is_unknown() { &rt } else { &lt };
                    let r = if rt.is_unknown() { &lt } else { &rt };
                    if l.confirmed() == "INTEGER" && r.confirmed() == "INTEGER" {
                        one("INTEGER")
                    } else {
                        one("REAL")
                    }
                }
            }
        };
        Ok(result.with_nullable(nullable))
    }

    fn in_list(&mut self, lhs: &Expr, list: &InList) -> Result<NodeTypes> {
        let lt = self.expr(lhs)?;
        let mut nullable = lt.is_nullable();
        match list {
            InList::Exprs { items, span } => {
                if let [item] = items.as_slice() {
                    let inner = item.unnested();
                    if inner.is_bind() {
                        self.node(inner.span).can_be_multiple = true;
                    } else if row_items(inner).is_some() {
                        self.mark_group(inner.span, true);
                    }
                } else {
                    self.mark_group(*span, false);
                }
                for item in items {
                    let it = self.expr(item)?;
                    self.cross_link(lhs, &lt, item, &it);
                    self.pair_rows(lhs, item)?;
                    nullable |= it.is_nullable();
                }
            }
            InList::Subquery { query, span } => {
                let columns = self.scoped(|v| v.query(query, false))?;
                let expected = row_items(lhs).map_or(1, <[Expr]>::len);
                if columns.len() != expected {
                    return Err(GenError::argument(
                        *span,
                        format!(
                            "sub-select returns {} columns - expected {expected}",
                            columns.len()
                        ),
                    ));
                }
                if expected == 1 {
                    let column = columns[0].types.clone().without_nullability();
                    self.constrain(lhs, &lt, &column)?;
                }
                self.mark_group(*span, false);
            }
            InList::Table(name) => {
                self.table(name)?;
            }
        }
        Ok(one("BOOLEAN").with_nullable(nullable))
    }

    fn function(&mut self, call: &FunctionCall, span: Span) -> Result<NodeTypes> {
        let name = call.name.value.as_str();
        let mut args = Vec::new();
        if let FunctionArgs::List(list) = &call.args {
            for arg in list {
                args.push(self.expr(arg)?);
            }
        }
        if let Some(filter) = &call.filter {
            let types = self.expr(filter)?;
            self.constrain(filter, &types, &one("BOOLEAN"))?;
        }
        match &call.over {
            Some(Over::Named(window)) => self.quote(window),
            Some(Over::Spec(spec)) => self.window_spec(spec)?,
            None => {}
        }

        let Some(function) = functions::lookup(self.engine, name) else {
            debug!(function = name, "unknown function, result type left open");
            return Ok(NodeTypes::default());
        };
        function.check(name, &args, span)?;
        let result = function.result(self.engine, &args);

        if let FunctionArgs::List(list) = &call.args {
            for (i, (arg, types)) in list.iter().zip(&args).enumerate() {
                let expected = function.expected(i);
                let hint = if expected.is_empty() {
                    result.clone()
                } else {
                    one(expected)
                };
                if !hint.is_unknown() {
                    self.constrain(arg, types, &hint.with_nullable(function.args_nullable))?;
                }
            }
        }
        Ok(result)
    }

    /// Types the expressions of a window definition.
    pub(super) fn window_spec(&mut self, spec: &WindowSpec) -> Result<()> {
        if let Some(base) = &spec.base {
            self.quote(base);
        }
        for e in &spec.partition_by {
            self.expr(e)?;
        }
        for term in &spec.order_by {
            self.expr(&term.expr)?;
        }
        if let Some(frame) = &spec.frame {
            for bound in [Some(&frame.start), frame.end.as_ref()].into_iter().flatten() {
                if let FrameBound::Preceding(e) | FrameBound::Following(e) = bound {
                    let types = self.expr(e)?;
                    self.constrain(e, &types, &one("INTEGER"))?;
                }
            }
        }
        Ok(())
    }

    fn case(
        &mut self,
        operand: Option<&Expr>,
        whens: &[WhenClause],
        otherwise: Option<&Expr>,
    ) -> Result<NodeTypes> {
        let operand_types = match operand {
            Some(o) => Some(self.expr(o)?),
            None => None,
        };
        let mut results = Vec::with_capacity(whens.len() + 1);
        for when in whens {
            let types = self.expr(&when.condition)?;
            match (operand, &operand_types) {
                (Some(o), Some(ot)) => self.cross_link(o, ot, &when.condition, &types),
                _ => self.constrain(&when.condition, &types, &one("BOOLEAN"))?,
            }
            results.push((&when.result, self.expr(&when.result)?));
        }
        if let Some(e) = otherwise {
            results.push((e, self.expr(e)?));
        }

        let chosen = results
            .iter()
            .map(|(_, t)| t)
            .find(|t| !t.is_unknown())
            .cloned()
            .unwrap_or_default();
        let nullable = otherwise.is_none() || results.iter().any(|(_, t)| t.is_nullable());
        if !chosen.is_unknown() {
            let hint = chosen.clone().without_nullability();
            for (e, types) in &results {
                self.constrain(e, types, &hint)?;
            }
        }
        Ok(chosen.with_nullable(nullable))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::run;
    use super::*;
    use crate::output::ParsedQuery;

    fn column(q: &ParsedQuery, i: usize) -> (&str, bool) {
        (q.columns[i].db_type.as_str(), q.columns[i].nullable)
    }

    #[test]
    fn test_literal_and_operator_types() {
        let q = run(
            Engine::Sqlite,
            "SELECT 1, 1.5, 'a', NULL, 1 + 2, 1 + 2.0, 7 % 2, 'a' || name, id = 1 FROM users",
        )
        .unwrap();
        assert_eq!(column(&q, 0), ("INTEGER", false));
        assert_eq!(column(&q, 1), ("REAL", false));
        assert_eq!(column(&q, 2), ("TEXT", false));
        assert_eq!(column(&q, 3), ("", true));
        assert_eq!(column(&q, 4), ("INTEGER", false));
        assert_eq!(column(&q, 5), ("REAL", false));
        assert_eq!(column(&q, 6), ("INTEGER", false));
        assert_eq!(column(&q, 7), ("TEXT", false));
        assert_eq!(column(&q, 8), ("BOOLEAN", false));
    }

    #[test]
    fn test_nullability_propagates_through_operators() {
        let q = run(
            Engine::Sqlite,
            "SELECT email || 'x', email IS NULL, coalesce(email, name), ifnull(email, NULL) FROM users",
        )
        .unwrap();
        assert_eq!(column(&q, 0), ("TEXT", true));
        assert_eq!(column(&q, 1), ("BOOLEAN", false));
        assert_eq!(column(&q, 2), ("VARCHAR", false));
        assert!(q.columns[3].nullable);
    }

    #[test]
    fn test_bind_types_follow_their_context() {
        let q = run(
            Engine::Sqlite,
            "SELECT id FROM users WHERE email = ? AND id + ? > 3 AND name LIKE ? AND CAST(? AS INT) = 1",
        )
        .unwrap();
        let types: Vec<_> = q
            .args
            .iter()
            .map(|a| (a.col.db_type.as_str(), a.col.nullable))
            .collect();
        assert_eq!(
            types,
            [
                ("VARCHAR", false),
                ("INTEGER", false),
                ("TEXT", false),
                ("INT", false)
            ]
        );
    }

    #[test]
    fn test_function_binds_take_expected_types() {
        let q = run(Engine::Sqlite, "SELECT substr(name, ?, ?) FROM users").unwrap();
        assert_eq!(q.args[0].col.db_type, "INTEGER");
        assert_eq!(q.columns[0].db_type, "TEXT");
        let q = run(Engine::Sqlite, "SELECT coalesce(email, ?) FROM users").unwrap();
        assert_eq!(q.args[0].col.db_type, "VARCHAR");
        assert!(q.args[0].col.nullable);
    }

    #[test]
    fn test_function_errors() {
        let err = run(Engine::Sqlite, "SELECT replace(name) FROM users").unwrap_err();
        assert!(matches!(err, GenError::Argument { .. }));
        let err = run(Engine::Sqlite, "SELECT instr(x'00', name) FROM users").unwrap_err();
        assert!(matches!(err, GenError::TypeConflict { .. }));
        let q = run(Engine::Sqlite, "SELECT my_udf(id) FROM users").unwrap();
        assert_eq!(q.columns[0].db_type, "");
    }

    #[test]
    fn test_case_takes_first_typed_branch() {
        let q = run(
            Engine::Sqlite,
            "SELECT CASE WHEN id > 1 THEN ? ELSE name END, CASE id WHEN ? THEN 1 END FROM users",
        )
        .unwrap();
        assert_eq!(column(&q, 0), ("TEXT", false));
        assert_eq!(column(&q, 1), ("INTEGER", true));
        assert_eq!(q.args[0].col.db_type, "TEXT");
        assert_eq!(q.args[1].col.db_type, "INTEGER");
    }

    #[test]
    fn test_scalar_subquery_is_nullable_group() {
        let q = run(
            Engine::Sqlite,
            "SELECT (SELECT count(*) FROM posts WHERE posts.user_id = users.id AND title = ?) FROM users",
        )
        .unwrap();
        assert_eq!(column(&q, 0), ("BIGINT", true));
        assert_eq!(q.args.len(), 1);
        assert!(!q.args[0].is_group());

        let err = run(Engine::Sqlite, "SELECT (SELECT id, name FROM users)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "sub-select returns 2 columns - expected 1 at position 7..35"
        );
    }

    #[test]
    fn test_in_lists() {
        let q = run(Engine::Sqlite, "SELECT id FROM users WHERE id IN (?1)").unwrap();
        assert_eq!(q.args.len(), 1);
        assert!(q.args[0].can_be_multiple);
        assert!(!q.args[0].is_group());
        assert_eq!(q.args[0].col.name, "arg");

        let q = run(
            Engine::Sqlite,
            "SELECT id FROM users WHERE (id, name) IN ((?, ?), (?, ?))",
        )
        .unwrap();
        assert_eq!(q.args.len(), 1);
        let rows = &q.args[0].children;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].children[1].col.db_type, "TEXT");

        let q = run(Engine::Sqlite, "SELECT id FROM users WHERE (id, name) IN ((?, ?))").unwrap();
        assert!(q.args[0].can_be_multiple);
        assert_eq!(q.args[0].children.len(), 2);

        let err = run(Engine::Sqlite, "SELECT id FROM users WHERE (id, name) IN ((?, ?, ?))")
            .unwrap_err();
        assert!(matches!(err, GenError::Argument { .. }));
        let err = run(
            Engine::Sqlite,
            "SELECT id FROM users WHERE id IN (SELECT id, name FROM users)",
        )
        .unwrap_err();
        assert!(matches!(err, GenError::Argument { .. }));
    }
}
