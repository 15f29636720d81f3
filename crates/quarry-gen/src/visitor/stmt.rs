//! Statements: queries, CTEs, compound selects and the data-changing statements.

use quarry_core::ast::{
    Assignment, CompoundOp, Cte, Delete, Expr, ExprKind, Ident, Insert, InsertSource, Limit,
    OrderBy, Query, ResultColumn, Returning, Select, SelectCore, TableFactor, Update,
    UpsertAction, ValuesList, With,
};

use super::sources::{QuerySource, ReturnColumn};
use super::Visitor;
use crate::error::{GenError, Result};
use crate::mods::{Combinator, ModStep};
use crate::types::{NodeType, NodeTypes};

const fn combinator(op: CompoundOp) -> Combinator {
    match op {
        CompoundOp::Union => Combinator::Union,
        CompoundOp::Intersect => Combinator::Intersect,
        CompoundOp::Except => Combinator::Except,
    }
}

/// Applies `WITH name(a, b)` column names to the columns a CTE body returns.
fn rename(cte: &Cte, mut columns: Vec<ReturnColumn>) -> Result<Vec<ReturnColumn>> {
    if cte.columns.is_empty() {
        return Ok(columns);
    }
    if cte.columns.len() != columns.len() {
        return Err(GenError::argument(
            cte.span,
            format!(
                "column names do not match {} != {}",
                cte.columns.len(),
                columns.len()
            ),
        ));
    }
    for (column, name) in columns.iter_mut().zip(&cte.columns) {
        column.name.clone_from(&name.value);
    }
    Ok(columns)
}

fn integer() -> NodeTypes {
    NodeTypes::from(NodeType::new("INTEGER"))
}

impl Visitor<'_> {
    /// Analyses a full query and returns its result columns.
    ///
    /// With `record` set, a `SELECT` query also leaves the builder steps that re-create it.
    pub(super) fn query(&mut self, query: &Query, record: bool) -> Result<Vec<ReturnColumn>> {
        let record = record && matches!(query.body, SelectCore::Select(_));
        if let Some(with) = &query.with {
            self.with(with, record)?;
        }
        if query.compounds.is_empty() {
            return self.scoped(|v| {
                let columns = v.core(&query.body, record)?;
                v.order_and_limit(query, &columns, record, false)?;
                Ok(columns)
            });
        }
        let first = self.scoped(|v| v.core(&query.body, record))?;
        let columns = self.compounds(query, first, record)?;
        self.scoped(|v| v.order_and_limit(query, &columns, record, true))?;
        Ok(columns)
    }

    /// Analyses the arms after the first, each in its own scope, and unifies their columns.
    fn compounds(
        &mut self,
        query: &Query,
        mut columns: Vec<ReturnColumn>,
        record: bool,
    ) -> Result<Vec<ReturnColumn>> {
        for compound in &query.compounds {
            let span = compound.core.span();
            let arm = self.scoped(|v| v.core(&compound.core, false))?;
            if arm.len() != columns.len() {
                return Err(GenError::argument(
                    span,
                    format!(
                        "SELECTs to the left and right of {} do not have the same number of result columns",
                        compound.op.as_str()
                    ),
                ));
            }
            for (column, other) in columns.iter_mut().zip(&arm) {
                column.types = column.types.unify(&other.types).ok_or_else(|| {
                    GenError::conflict(
                        span,
                        format!(
                            "column {} is {} on one side of {} and {} on the other",
                            column.name,
                            column.types.type_name(),
                            compound.op.as_str(),
                            other.types.type_name()
                        ),
                    )
                })?;
            }
            if record {
                self.steps.push(ModStep::AppendCombine {
                    op: combinator(compound.op),
                    all: compound.all,
                    span,
                });
            }
        }
        Ok(columns)
    }

    fn with(&mut self, with: &With, record: bool) -> Result<()> {
        if with.recursive && record {
            self.steps.push(ModStep::SetRecursive);
        }
        for cte in &with.ctes {
            self.quote(&cte.name);
            for column in &cte.columns {
                self.quote(column);
            }
            let columns = if with.recursive {
                self.recursive_cte(cte)?
            } else {
                let columns = self.scoped(|v| v.query(&cte.query, false))?;
                rename(cte, columns)?
            };
            self.sources.push(QuerySource {
                name: cte.name.value.clone(),
                columns,
                cte: true,
                ..QuerySource::default()
            });
            if record {
                self.steps.push(ModStep::AppendCte {
                    name: cte.name.value.clone(),
                    columns: cte.columns.iter().map(|c| c.value.clone()).collect(),
                    span: cte.query.span,
                });
            }
        }
        Ok(())
    }

    /// A recursive CTE sees itself, typed by its first arm, from the second arm on.
    fn recursive_cte(&mut self, cte: &Cte) -> Result<Vec<ReturnColumn>> {
        let query = &cte.query;
        if query.compounds.is_empty() {
            let columns = self.scoped(|v| v.query(query, false))?;
            return rename(cte, columns);
        }
        self.scoped(|v| {
            if let Some(with) = &query.with {
                v.with(with, false)?;
            }
            let first = v.scoped(|v| v.core(&query.body, false))?;
            let first = rename(cte, first)?;
            v.sources.push(QuerySource {
                name: cte.name.value.clone(),
                columns: first.clone(),
                cte: true,
                ..QuerySource::default()
            });
            let columns = v.compounds(query, first, false)?;
            v.scoped(|v| v.order_and_limit(query, &columns, false, true))?;
            Ok(columns)
        })
    }

    fn core(&mut self, core: &SelectCore, record: bool) -> Result<Vec<ReturnColumn>> {
        match core {
            SelectCore::Select(select) => self.select(select, record),
            SelectCore::Values(values) => self.values(values),
        }
    }

    fn select(&mut self, select: &Select, record: bool) -> Result<Vec<ReturnColumn>> {
        let base = self.sources.len();
        if let Some(from) = &select.from {
            self.table_with_joins(from)?;
        }
        let columns = self.result_columns(&select.columns, base)?;
        if let Some(condition) = &select.where_clause {
            self.expr(condition)?;
        }
        for group in &select.group_by {
            self.expr(group)?;
        }
        if let Some(having) = &select.having {
            self.expr(having)?;
        }
        for window in &select.windows {
            self.quote(&window.name);
            self.window_spec(&window.spec)?;
        }
        if record {
            self.select_steps(select)?;
        }
        Ok(columns)
    }

    fn select_steps(&mut self, select: &Select) -> Result<()> {
        if let Some(from) = &select.from {
            self.steps.push(ModStep::SetTable { span: from.span });
        }
        if select.distinct {
            self.steps.push(ModStep::Distinct);
        }
        for column in &select.columns {
            self.steps.push(ModStep::AppendSelect {
                span: column.span(),
            });
        }
        if let Some(condition) = &select.where_clause {
            self.steps.push(ModStep::AppendWhere {
                span: condition.span,
            });
        }
        for group in &select.group_by {
            self.steps.push(ModStep::AppendGroup { span: group.span });
        }
        if let Some(having) = &select.having {
            self.steps.push(ModStep::AppendHaving { span: having.span });
        }
        for window in &select.windows {
            let spec = &window.spec;
            let mut partition = spec
                .partition_by
                .first()
                .zip(spec.partition_by.last())
                .map(|(a, b)| a.span.merge(b.span));
            let mut order = spec
                .order_by
                .first()
                .zip(spec.order_by.last())
                .map(|(a, b)| a.span.merge(b.span));
            if let Some(frame) = &spec.frame {
                match (order.as_mut(), partition.as_mut()) {
                    (Some(order), _) => *order = order.merge(frame.span),
                    (None, Some(partition)) => *partition = partition.merge(frame.span),
                    (None, None) => {
                        return Err(GenError::unsupported(
                            frame.span,
                            "a window frame needs PARTITION BY or ORDER BY",
                        ))
                    }
                }
            }
            self.steps.push(ModStep::AppendWindow {
                name: window.name.value.clone(),
                base: spec.base.as_ref().map(|b| b.value.clone()),
                partition,
                order,
            });
        }
        Ok(())
    }

    /// Types the select list, expanding stars over the sources pushed since `base`.
    fn result_columns(
        &mut self,
        columns: &[ResultColumn],
        base: usize,
    ) -> Result<Vec<ReturnColumn>> {
        let mut out = Vec::with_capacity(columns.len());
        for column in columns {
            match column {
                ResultColumn::Star { table, span } => {
                    out.extend(self.expand_star(table.as_ref(), *span, base)?);
                }
                ResultColumn::Expr { expr, alias, span } => {
                    let types = self.expr(expr)?;
                    let name = match (alias, &expr.unnested().kind) {
                        (Some(alias), _) => {
                            self.quote(alias);
                            alias.value.clone()
                        }
                        (None, ExprKind::Column { name, .. }) => {
                            name.value.clone()
                        }
                        (None, _) => expr.span.text(self.source).to_string(),
                    };
                    out.push(ReturnColumn {
                        name,
                        types,
                        config: self.config_after(*span),
                    });
                }
            }
        }
        Ok(out)
    }

    /// `ORDER BY` sees the result columns by name on top of the sources in scope.
    fn order_and_limit(
        &mut self,
        query: &Query,
        columns: &[ReturnColumn],
        record: bool,
        combined: bool,
    ) -> Result<()> {
        if let Some(order_by) = &query.order_by {
            self.sources.push(QuerySource {
                columns: columns.to_vec(),
                ..QuerySource::default()
            });
            self.order_by(order_by)?;
            if record {
                for term in &order_by.terms {
                    self.steps.push(ModStep::AppendOrder {
                        span: term.span,
                        combined,
                    });
                }
            }
        }
        if let Some(limit) = &query.limit {
            self.limit(limit)?;
            if record {
                self.steps.push(ModStep::SetLimit {
                    span: limit.count.span,
                    combined,
                });
                if let Some(offset) = &limit.offset {
                    self.steps.push(ModStep::SetOffset {
                        span: offset.span,
                        combined,
                    });
                }
            }
        }
        Ok(())
    }

    fn order_by(&mut self, order_by: &OrderBy) -> Result<()> {
        for term in &order_by.terms {
            self.expr(&term.expr)?;
        }
        Ok(())
    }

    fn limit(&mut self, limit: &Limit) -> Result<()> {
        if limit.comma {
            return Err(GenError::unsupported(
                limit.span,
                "LIMIT with a comma is not supported, use LIMIT ... OFFSET ...",
            ));
        }
        for e in std::iter::once(&limit.count).chain(&limit.offset) {
            let types = self.expr(e)?;
            if types.is_unknown() {
                self.set_types(e.unnested().span, &integer())?;
            }
        }
        Ok(())
    }

    /// A bare `VALUES` list; every row is a group and a single row may take a slice.
    fn values(&mut self, values: &ValuesList) -> Result<Vec<ReturnColumn>> {
        let single = values.rows.len() == 1;
        let mut columns: Vec<ReturnColumn> = Vec::new();
        for row in &values.rows {
            self.mark_group(row.span, single);
            if !columns.is_empty() && row.items.len() != columns.len() {
                return Err(GenError::argument(
                    row.span,
                    "all VALUES must have the same number of terms",
                ));
            }
            for (i, item) in row.items.iter().enumerate() {
                let types = self.expr(item)?;
                match columns.get_mut(i) {
                    Some(column) => {
                        column.types = column.types.unify(&types).ok_or_else(|| {
                            GenError::conflict(
                                item.span,
                                format!(
                                    "VALUES column {} mixes {} and {}",
                                    i + 1,
                                    column.types.type_name(),
                                    types.type_name()
                                ),
                            )
                        })?;
                    }
                    None => columns.push(ReturnColumn {
                        name: self.engine.values_column(i),
                        types,
                        ..ReturnColumn::default()
                    }),
                }
            }
        }
        Ok(columns)
    }

    /// Sets the type of each assigned value from the column it is assigned to.
    fn assignments(&mut self, assignments: &[Assignment], base: usize) -> Result<()> {
        for assignment in assignments {
            let mut targets = Vec::with_capacity(assignment.columns.len());
            for ident in &assignment.columns {
                self.quote(ident);
                let column = self.sources[base..]
                    .iter()
                    .rev()
                    .find_map(|s| s.columns.iter().find(|c| ident.matches(&c.name)))
                    .cloned()
                    .ok_or_else(|| {
                        GenError::lookup(ident.span, format!("column not found: {}", ident.value))
                    })?;
                self.set_types(ident.span, &column.types)?;
                targets.push(column.types);
            }
            let value = &assignment.value;
            self.expr(value)?;
            match (targets.as_slice(), &value.unnested().kind) {
                ([target], _) => {
                    self.set_name(value.unnested().span, &assignment.columns[0].value);
                    self.assign(value, target)?;
                }
                (
                    targets,
                    ExprKind::List(items)
                    | ExprKind::Row(items),
                ) => {
                    if items.len() != targets.len() {
                        return Err(GenError::argument(
                            assignment.span,
                            format!(
                                "{} columns assigned {} values",
                                targets.len(),
                                items.len()
                            ),
                        ));
                    }
                    let named = items.iter().zip(targets).zip(&assignment.columns);
                    for ((item, target), ident) in named {
                        self.set_name(item.unnested().span, &ident.value);
                        self.assign(item, target)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Gives a value without a type the type of its target column.
    fn assign(&mut self, value: &Expr, target: &NodeTypes) -> Result<()> {
        let span = value.unnested().span;
        if self.resolved(span).is_unknown() {
            self.set_types(span, target)?;
        }
        Ok(())
    }

    fn returning(&mut self, returning: Option<&Returning>, base: usize) -> Result<Vec<ReturnColumn>> {
        match returning {
            Some(returning) => self.result_columns(&returning.columns, base),
            None => Ok(Vec::new()),
        }
    }

    pub(super) fn insert(&mut self, insert: &Insert) -> Result<Vec<ReturnColumn>> {
        if insert.replace {
            return Err(GenError::unsupported(
                insert.span,
                "REPLACE INTO is not supported, use INSERT ... ON CONFLICT",
            ));
        }
        if let Some(with) = &insert.with {
            self.with(with, false)?;
        }
        let base = self.sources.len();
        let mut table = self.table(&insert.table)?;
        if let Some(alias) = &insert.alias {
            self.quote(alias);
            table.name.clone_from(&alias.value);
        }

        let names: Vec<String> = if insert.columns.is_empty() {
            table.columns.iter().map(|c| c.name.clone()).collect()
        } else {
            insert.columns.iter().map(|c| c.value.clone()).collect()
        };
        let targets: Vec<NodeTypes> = if insert.columns.is_empty() {
            table.columns.iter().map(|c| c.types.clone()).collect()
        } else {
            let mut targets = Vec::with_capacity(insert.columns.len());
            for ident in &insert.columns {
                self.quote(ident);
                let column = table
                    .columns
                    .iter()
                    .find(|c| ident.matches(&c.name))
                    .ok_or_else(|| {
                        GenError::lookup(ident.span, format!("column not found: {}", ident.value))
                    })?;
                self.set_types(ident.span, &column.types)?;
                targets.push(column.types.clone());
            }
            targets
        };

        match &insert.source {
            InsertSource::Values(values) => {
                let single = values.rows.len() == 1;
                for row in &values.rows {
                    self.mark_group(row.span, single);
                    self.set_name(row.span, &insert.table.name.value);
                    if row.items.len() != targets.len() {
                        return Err(GenError::argument(
                            row.span,
                            format!(
                                "{} values for {} columns",
                                row.items.len(),
                                targets.len()
                            ),
                        ));
                    }
                    for ((item, target), name) in row.items.iter().zip(&targets).zip(&names) {
                        self.expr(item)?;
                        self.set_name(item.unnested().span, name);
                        self.assign(item, target)?;
                    }
                }
            }
            InsertSource::Query(query) => {
                let columns = self.scoped(|v| v.query(query, false))?;
                if columns.len() != targets.len() {
                    return Err(GenError::argument(
                        query.span,
                        format!(
                            "table {} has {} columns but {} values were supplied",
                            insert.table.name.value,
                            targets.len(),
                            columns.len()
                        ),
                    ));
                }
            }
            InsertSource::DefaultValues(_) => {}
            InsertSource::Set(assignments) => {
                self.sources.push(table.clone());
                self.assignments(assignments, base)?;
            }
        }

        self.sources.truncate(base);
        self.sources.push(table.clone());
        if let Some(alias) = &insert.row_alias {
            self.quote(&alias.name);
            let mut columns = table.columns.clone();
            if !alias.columns.is_empty() {
                if alias.columns.len() != columns.len() {
                    return Err(GenError::argument(
                        alias.span,
                        format!(
                            "row alias names {} columns, the table has {}",
                            alias.columns.len(),
                            columns.len()
                        ),
                    ));
                }
                for (column, name) in columns.iter_mut().zip(&alias.columns) {
                    self.quote(name);
                    column.name.clone_from(&name.value);
                }
            }
            self.sources.push(QuerySource {
                name: alias.name.value.clone(),
                columns,
                ..QuerySource::default()
            });
        }

        if !insert.upserts.is_empty() {
            self.sources.push(QuerySource {
                name: String::from("excluded"),
                ..table.clone()
            });
        }
        for upsert in &insert.upserts {
            if let Some(target) = &upsert.target {
                for column in &target.columns {
                    self.expr(column)?;
                }
                if let Some(condition) = &target.where_clause {
                    self.expr(condition)?;
                }
            }
            if let UpsertAction::Update {
                assignments,
                where_clause,
            } = &upsert.action
            {
                self.assignments(assignments, base)?;
                if let Some(condition) = where_clause {
                    self.expr(condition)?;
                }
            }
        }
        if let Some(assignments) = &insert.duplicate_key_update {
            self.assignments(assignments, base)?;
        }

        self.sources.truncate(base);
        self.sources.push(table);
        self.returning(insert.returning.as_ref(), base)
    }

    pub(super) fn update(&mut self, update: &Update) -> Result<Vec<ReturnColumn>> {
        let multi_table = !update.table.joins.is_empty() || update.from.is_some();
        if multi_table && (update.order_by.is_some() || update.limit.is_some()) {
            return Err(GenError::unsupported(
                update.span,
                "ORDER BY and LIMIT are not supported in a multi-table UPDATE",
            ));
        }
        if let Some(with) = &update.with {
            self.with(with, false)?;
        }
        let base = self.sources.len();
        self.table_with_joins(&update.table)?;
        if let Some(from) = &update.from {
            self.table_with_joins(from)?;
        }
        self.assignments(&update.assignments, base)?;
        if let Some(condition) = &update.where_clause {
            self.expr(condition)?;
        }
        if let Some(order_by) = &update.order_by {
            self.order_by(order_by)?;
        }
        if let Some(limit) = &update.limit {
            self.limit(limit)?;
        }
        self.returning(update.returning.as_ref(), base)
    }

    pub(super) fn delete(&mut self, delete: &Delete) -> Result<Vec<ReturnColumn>> {
        let multi_table = !delete.targets.is_empty() || !delete.from.joins.is_empty();
        if multi_table && delete.using.is_none() {
            return Err(GenError::unsupported(
                delete.span,
                "multi-table DELETE is only supported with USING",
            ));
        }
        if let Some(with) = &delete.with {
            self.with(with, false)?;
        }
        for target in &delete.targets {
            self.quote_name(target.schema.as_ref(), &target.name);
        }
        let base = self.sources.len();
        match &delete.using {
            Some(using) => {
                self.table_with_joins(using)?;
                self.quote_targets(&delete.from.factor);
                for join in &delete.from.joins {
                    self.quote_targets(&join.factor);
                }
            }
            None => self.table_with_joins(&delete.from)?,
        }
        if let Some(condition) = &delete.where_clause {
            self.expr(condition)?;
        }
        if let Some(order_by) = &delete.order_by {
            self.order_by(order_by)?;
        }
        if let Some(limit) = &delete.limit {
            self.limit(limit)?;
        }
        self.returning(delete.returning.as_ref(), base)
    }

    fn quote_name(
        &mut self,
        schema: Option<&Ident>,
        name: &Ident,
    ) {
        if let Some(schema) = schema {
            self.quote(schema);
        }
        self.quote(name);
    }

    /// The tables listed before `USING` name sources from `USING`, so they are only quoted.
    fn quote_targets(&mut self, factor: &TableFactor) {
        if let TableFactor::Table { name, alias, .. } = factor {
            self.quote_name(name.schema.as_ref(), &name.name);
            if let Some(alias) = alias {
                self.quote(alias);
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::super::testing::run;
    use super::*;
    use crate::engine::Engine;
    use crate::output::ParsedQuery;

    fn names(q: &ParsedQuery) -> Vec<&str> {
        q.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_cte_and_union_steps() {
        let q = run(
            Engine::Sqlite,
            "WITH recent AS (SELECT id, title FROM posts WHERE score > ?) \
             SELECT id, name FROM users UNION ALL SELECT id, title FROM recent ORDER BY id LIMIT ?",
        )
        .unwrap();
        assert_eq!(names(&q), ["id", "name"]);
        assert_eq!(q.steps.len(), 7);
        let ModStep::AppendCte { name, span, .. } = &q.steps[0] else {
            panic!("expected a CTE step, got {:?}", q.steps[0]);
        };
        assert_eq!(name, "recent");
        assert_eq!(
            span.text(&q.sql),
            "SELECT \"id\", \"title\" FROM \"posts\" WHERE \"score\" > ?1"
        );
        let ModStep::AppendCombine { op, all, span } = &q.steps[4] else {
            panic!("expected a combine step, got {:?}", q.steps[4]);
        };
        assert_eq!(*op, Combinator::Union);
        assert!(*all);
        assert_eq!(span.text(&q.sql), "SELECT \"id\", \"title\" FROM \"recent\"");
        assert!(matches!(
            q.steps[6],
            ModStep::SetLimit { combined: true, .. }
        ));
        assert_eq!(q.args.len(), 2);
        assert_eq!(q.args[1].col.type_name, "i64");
    }

    #[test]
    fn test_compound_arms_must_agree() {
        let err = run(
            Engine::Sqlite,
            "SELECT id, name FROM users UNION SELECT id FROM posts",
        )
        .unwrap_err();
        assert!(matches!(err, GenError::Argument { .. }));
        let err = run(
            Engine::Sqlite,
            "SELECT id FROM users UNION SELECT x'00' FROM posts",
        )
        .unwrap_err();
        assert!(matches!(err, GenError::TypeConflict { .. }));
    }

    #[test]
    fn test_recursive_cte_sees_itself() {
        let q = run(
            Engine::Sqlite,
            "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < ?) SELECT x FROM n",
        )
        .unwrap();
        assert!(matches!(q.steps[0], ModStep::SetRecursive));
        assert_eq!(names(&q), ["x"]);
        assert_eq!(q.columns[0].type_name, "i64");
        assert_eq!(q.args[0].col.type_name, "i64");
    }

    #[test]
    fn test_named_window_step() {
        let q = run(
            Engine::Sqlite,
            "SELECT id, row_number() OVER w FROM posts WINDOW w AS (PARTITION BY user_id ORDER BY score DESC)",
        )
        .unwrap();
        let Some(ModStep::AppendWindow {
            name,
            partition: Some(partition),
            order: Some(order),
            ..
        }) = q.steps.last()
        else {
            panic!("expected a window step, got {:?}", q.steps.last());
        };
        assert_eq!(name, "w");
        assert_eq!(partition.text(&q.sql), "\"user_id\"");
        assert_eq!(order.text(&q.sql), "\"score\" DESC");
    }

    #[test]
    fn test_values_columns_are_named_per_engine() {
        let q = run(Engine::Sqlite, "VALUES (1, 'a'), (2, 'b')").unwrap();
        assert_eq!(names(&q), ["column1", "column2"]);
        assert!(q.steps.is_empty());
        let q = run(Engine::Mysql, "VALUES ROW(1, 'a')").unwrap();
        assert_eq!(names(&q), ["column_0", "column_1"]);
        let err = run(Engine::Sqlite, "VALUES (1, 'a'), (2)").unwrap_err();
        assert!(matches!(err, GenError::Argument { .. }));
    }

    #[test]
    fn test_insert_values_take_column_types() {
        let q = run(
            Engine::Sqlite,
            "INSERT INTO users (id, name) VALUES (?, ?) RETURNING id",
        )
        .unwrap();
        assert_eq!(
            q.sql,
            "INSERT INTO \"users\" (\"id\", \"name\") VALUES (?1, ?2) RETURNING \"id\""
        );
        assert_eq!(names(&q), ["id"]);
        assert_eq!(q.args.len(), 1);
        let group = &q.args[0];
        assert!(group.is_group());
        assert!(group.can_be_multiple);
        let types: Vec<_> = group
            .children
            .iter()
            .map(|c| c.col.type_name.as_str())
            .collect();
        assert_eq!(types, ["i64", "String"]);
    }

    #[test]
    fn test_insert_value_count_must_match() {
        let err = run(Engine::Sqlite, "INSERT INTO users (id, name) VALUES (?)").unwrap_err();
        assert!(matches!(err, GenError::Argument { .. }));
        let err = run(Engine::Sqlite, "INSERT INTO users (nope) VALUES (1)").unwrap_err();
        assert!(matches!(err, GenError::SchemaLookup { .. }));
    }

    #[test]
    fn test_upserts() {
        let q = run(
            Engine::Sqlite,
            "INSERT INTO users (id, name) VALUES (?, ?) \
             ON CONFLICT (id) DO UPDATE SET name = excluded.name WHERE users.email IS NULL",
        )
        .unwrap();
        assert!(q.sql.contains("SET \"name\" = \"excluded\".\"name\""));

        let q = run(
            Engine::Mysql,
            "INSERT INTO users (id, name) VALUES (?, ?) AS new ON DUPLICATE KEY UPDATE name = new.name",
        )
        .unwrap();
        assert!(q
            .sql
            .ends_with("AS `new` ON DUPLICATE KEY UPDATE `name` = `new`.`name`"));
    }

    #[test]
    fn test_replace_into_is_unsupported() {
        let err = run(Engine::Mysql, "REPLACE INTO users (id) VALUES (1)").unwrap_err();
        assert!(matches!(err, GenError::Unsupported { .. }));
    }

    #[test]
    fn test_update_assignments_type_binds() {
        let q = run(Engine::Sqlite, "UPDATE users SET name = ?, email = NULL WHERE id = ?").unwrap();
        let types: Vec<_> = q.args.iter().map(|a| a.col.type_name.as_str()).collect();
        assert_eq!(types, ["String", "i64"]);
        assert!(q.columns.is_empty());

        let err = run(
            Engine::Sqlite,
            "UPDATE users SET name = ? FROM posts WHERE posts.user_id = users.id LIMIT 1",
        )
        .unwrap_err();
        assert!(matches!(err, GenError::Unsupported { .. }));
    }

    #[test]
    fn test_delete_returning_star() {
        let q = run(Engine::Sqlite, "DELETE FROM posts WHERE user_id = ? RETURNING *").unwrap();
        assert_eq!(names(&q), ["id", "user_id", "title", "score"]);
        assert!(q
            .sql
            .ends_with("RETURNING \"posts\".\"id\", \"posts\".\"user_id\", \"posts\".\"title\", \"posts\".\"score\""));
    }

    #[test]
    fn test_comma_limit_is_unsupported() {
        let err = run(Engine::Mysql, "SELECT id FROM users LIMIT 1, 2").unwrap_err();
        assert!(matches!(err, GenError::Unsupported { .. }));
    }
}
