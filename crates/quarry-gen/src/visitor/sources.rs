//! Tables, joins and column lookup.

use std::ops::Range;

use quarry_core::ast::{
    Ident, IndexedBy, JoinConstraint, JoinOperator, ObjectName, TableFactor, TableWithJoins,
};
use quarry_core::Span;

use super::Visitor;
use crate::catalog::same_schema;
use crate::config::ColumnConfig;
use crate::engine::base_type;
use crate::error::{GenError, Result};
use crate::types::{NodeType, NodeTypes};

/// Something columns can be selected from: a table, a CTE or a sub-select.
#[derive(Debug, Clone, Default)]
pub(super) struct QuerySource {
    /// The catalog schema of a table; empty for CTEs and sub-selects.
    pub schema: String,
    /// The name columns are qualified with; the alias when there is one.
    pub name: String,
    pub columns: Vec<ReturnColumn>,
    /// A CTE is only a candidate for `FROM`; its columns are not in scope by themselves.
    pub cte: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ReturnColumn {
    pub name: String,
    pub types: NodeTypes,
    pub config: ColumnConfig,
}

impl Visitor<'_> {
    /// Pushes the sources of a `FROM` item and its joins.
    pub(super) fn table_with_joins(&mut self, from: &TableWithJoins) -> Result<()> {
        let first = self.sources.len();
        self.table_factor(&from.factor)?;
        for join in &from.joins {
            if join.operator == JoinOperator::Comma && !self.engine.comma_joins() {
                return Err(GenError::unsupported(
                    join.span,
                    format!("comma joins are not supported on {}, use JOIN", self.engine),
                ));
            }
            let left = first..self.sources.len();
            self.table_factor(&join.factor)?;
            let right = left.end..self.sources.len();
            match join.operator {
                JoinOperator::Left => self.make_nullable(right.clone()),
                JoinOperator::Right => self.make_nullable(left),
                JoinOperator::Full => {
                    self.make_nullable(left);
                    self.make_nullable(right.clone());
                }
                _ => {}
            }
            match &join.constraint {
                Some(JoinConstraint::On(on)) => {
                    self.expr(on)?;
                }
                Some(JoinConstraint::Using(columns)) => {
                    for column in columns {
                        self.quote(column);
                        self.find_column(None, None, column)?;
                    }
                }
                None => {}
            }
        }
        Ok(())
    }

    fn table_factor(&mut self, factor: &TableFactor) -> Result<()> {
        match factor {
            TableFactor::Table {
                name,
                alias,
                indexed,
                ..
            } => {
                let mut source = self.table(name)?;
                if let Some(alias) = alias {
                    self.quote(alias);
                    source.name.clone_from(&alias.value);
                }
                if let Some(IndexedBy::Index(index)) = indexed {
                    self.quote(index);
                }
                self.sources.push(source);
            }
            TableFactor::Derived { query, alias, .. } => {
                let columns = self.scoped(|v| v.query(query, false))?;
                let name = alias.as_ref().map_or_else(String::new, |a| a.value.clone());
                if let Some(alias) = alias {
                    self.quote(alias);
                }
                self.sources.push(QuerySource {
                    name,
                    columns,
                    ..QuerySource::default()
                });
            }
            TableFactor::Nested { inner, alias, .. } => {
                if let Some(alias) = alias {
                    self.quote(alias);
                }
                self.table_with_joins(inner)?;
            }
        }
        Ok(())
    }

    /// Resolves a table name against the CTEs in scope, then the catalog.
    pub(super) fn table(&mut self, name: &ObjectName) -> Result<QuerySource> {
        if let Some(schema) = &name.schema {
            self.quote(schema);
        }
        self.quote(&name.name);

        if name.schema.is_none() {
            let cte = self
                .sources
                .iter()
                .rev()
                .find(|s| s.cte && name.name.matches(&s.name));
            if let Some(cte) = cte {
                return Ok(QuerySource {
                    cte: false,
                    ..cte.clone()
                });
            }
        }

        let schema = name.schema.as_ref().map(|s| s.value.as_str());
        let table = self
            .catalog
            .table(schema, &name.name.value)
            .ok_or_else(|| {
                GenError::lookup(name.span, format!("table not found: {}", name.name.value))
            })?;
        let columns = table
            .columns
            .iter()
            .map(|c| ReturnColumn {
                name: c.name.clone(),
                types: NodeTypes::from(
                    NodeType::new(self.engine.affinity(&c.db_type))
                        .declared(base_type(&c.db_type))
                        .with_nullable(c.nullable),
                ),
                config: ColumnConfig::default(),
            })
            .collect();
        Ok(QuerySource {
            schema: table.schema.clone(),
            name: table.name.clone(),
            columns,
            cte: false,
        })
    }

    fn make_nullable(&mut self, range: Range<usize>) {
        for source in &mut self.sources[range] {
            for column in &mut source.columns {
                column.types = std::mem::take(&mut column.types).with_nullable(true);
            }
        }
    }

    /// Finds a column in the sources in scope, innermost first.
    ///
    /// A `schema.table.column` reference only matches a table from that schema.
    pub(super) fn find_column(
        &self,
        schema: Option<&Ident>,
        table: Option<&Ident>,
        name: &Ident,
    ) -> Result<ReturnColumn> {
        let mut table_seen = false;
        for source in self.sources.iter().rev().filter(|s| !s.cte) {
            if let Some(table) = table {
                let in_schema = schema.is_none_or(|s| same_schema(&s.value, &source.schema));
                if !in_schema || !table.matches(&source.name) {
                    continue;
                }
                table_seen = true;
            }
            if let Some(column) = source.columns.iter().find(|c| name.matches(&c.name)) {
                return Ok(column.clone());
            }
        }
        match table {
            Some(table) if !table_seen => Err(GenError::lookup(
                table.span,
                format!("table not found: {}", table.value),
            )),
            _ => Err(GenError::lookup(
                name.span,
                format!("column not found: {}", name.value),
            )),
        }
    }

    /// Rewrites `*` or `t.*` into the quoted columns of the sources pushed since `base`.
    pub(super) fn expand_star(
        &mut self,
        table: Option<&Ident>,
        span: Span,
        base: usize,
    ) -> Result<Vec<ReturnColumn>> {
        let sources: Vec<_> = self.sources[base..]
            .iter()
            .filter(|s| !s.cte && table.is_none_or(|t| t.matches(&s.name)))
            .collect();
        if sources.is_empty() {
            return Err(match table {
                Some(t) => GenError::lookup(t.span, format!("table not found: {}", t.value)),
                None => GenError::lookup(span, "no tables specified for *"),
            });
        }

        let mut names = Vec::new();
        let mut columns = Vec::new();
        for source in sources {
            for column in &source.columns {
                let quoted = self.engine.quote(&column.name);
                names.push(if source.name.is_empty() {
                    quoted
                } else {
                    format!("{}.{quoted}", self.engine.quote(&source.name))
                });
                columns.push(column.clone());
            }
        }
        self.edits.delete(span);
        self.edits.insert(span.start, names.join(", "));
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::run;
    use super::*;
    use crate::engine::Engine;
    use crate::output::ParsedQuery;

    fn nullability(q: &ParsedQuery) -> Vec<bool> {
        q.columns.iter().map(|c| c.nullable).collect()
    }

    #[test]
    fn test_join_nullability() {
        let join = |kind: &str| {
            let sql = format!(
                "SELECT u.name, p.title FROM users u {kind} JOIN posts p ON p.user_id = u.id"
            );
            nullability(&run(Engine::Sqlite, &sql).unwrap())
        };
        assert_eq!(join("LEFT"), [false, true]);
        assert_eq!(join("RIGHT"), [true, false]);
        assert_eq!(join("FULL"), [true, true]);
        assert_eq!(join("INNER"), [false, false]);
    }

    #[test]
    fn test_qualified_star_expands_one_table() {
        let q = run(
            Engine::Mysql,
            "SELECT p.* FROM users AS u JOIN posts p ON p.user_id = u.id",
        )
        .unwrap();
        assert!(q
            .sql
            .starts_with("SELECT `p`.`id`, `p`.`user_id`, `p`.`title`, `p`.`score` FROM `users` AS `u`"));
        let names: Vec<_> = q.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "user_id", "title", "score"]);
        assert_eq!(nullability(&q), [false, false, false, true]);
    }

    #[test]
    fn test_lookup_errors() {
        let err = run(Engine::Sqlite, "SELECT nope FROM users").unwrap_err();
        assert_eq!(err.to_string(), "column not found: nope at position 7..11");
        let err = run(Engine::Sqlite, "SELECT c.id FROM users").unwrap_err();
        assert!(err.to_string().starts_with("table not found: c"));
        let err = run(Engine::Sqlite, "SELECT * FROM missing").unwrap_err();
        assert!(matches!(err, GenError::SchemaLookup { .. }));
    }

    #[test]
    fn test_comma_join_depends_on_engine() {
        let sql = "SELECT name, title FROM users, posts WHERE posts.user_id = users.id";
        assert!(run(Engine::Sqlite, sql).is_ok());
        assert!(matches!(
            run(Engine::Mysql, sql),
            Err(GenError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_derived_table_columns() {
        let q = run(
            Engine::Sqlite,
            "SELECT s.total FROM (SELECT count(*) AS total FROM posts) s",
        )
        .unwrap();
        assert_eq!(q.columns[0].name, "total");
        assert_eq!(q.columns[0].db_type, "BIGINT");
        assert!(!q.columns[0].nullable);
    }

    #[test]
    fn test_using_columns_must_exist() {
        assert!(run(Engine::Sqlite, "SELECT title FROM posts JOIN users USING (id)").is_ok());
        assert!(run(Engine::Sqlite, "SELECT title FROM posts JOIN users USING (nope)").is_err());
    }
}
