//! The per-statement walk over the syntax tree.
//!
//! A [`Visitor`] records what it learns about every node in a table keyed by the node's
//! span, queues rewrite rules for the edit engine and, for `SELECT`s, the builder steps.
//! [`Visitor::transpile`] then rewrites the statement and turns the table into typed
//! columns and arguments.

mod expr;
mod sources;
mod stmt;

use std::collections::HashSet;

use indexmap::IndexMap;
use quarry_core::ast::{Expr, Statement};
use quarry_core::lexer::{Comment, CommentKind};
use quarry_core::Span;
use tracing::debug;

use crate::args::{self, Bind, GROUP_NAME};
use crate::catalog::Catalog;
use crate::config::{ColumnConfig, QueryConfig};
use crate::edit::{EditError, Edits};
use crate::engine::Engine;
use crate::error::{GenError, Result};
use crate::mods::{render_steps, ModStep};
use crate::output::{ParsedQuery, QueryArg};
use crate::types::NodeTypes;

use sources::{QuerySource, ReturnColumn};

/// What the visitor knows about one node.
#[derive(Debug, Clone, Default)]
struct NodeInfo {
    types: NodeTypes,
    /// Another node this one takes its type from.
    expr_ref: Option<Span>,
    ignore_ref_nullability: bool,
    /// The identity of a bind; uses of the same key are one argument.
    bind: Option<String>,
    is_group: bool,
    can_be_multiple: bool,
    config: ColumnConfig,
}

pub(crate) struct Visitor<'a> {
    engine: Engine,
    catalog: &'a Catalog,
    source: &'a str,
    comments: &'a [Comment],
    nodes: IndexMap<Span, NodeInfo>,
    /// Source names of nodes, used to label arguments. The first name recorded wins.
    names: IndexMap<Span, String>,
    sources: Vec<QuerySource>,
    edits: Edits,
    steps: Vec<ModStep>,
    anonymous: usize,
}

impl<'a> Visitor<'a> {
    /// A visitor for one statement of `source`; spans are relative to `source`.
    pub(crate) fn new(
        engine: Engine,
        catalog: &'a Catalog,
        source: &'a str,
        comments: &'a [Comment],
    ) -> Self {
        Self {
            engine,
            catalog,
            source,
            comments,
            nodes: IndexMap::new(),
            names: IndexMap::new(),
            sources: Vec::new(),
            edits: Edits::new(),
            steps: Vec::new(),
            anonymous: 0,
        }
    }

    /// Analyses `statement` and produces its rewritten SQL, columns and arguments.
    pub(crate) fn transpile(
        mut self,
        statement: &Statement,
        name: &str,
        config: &QueryConfig,
    ) -> Result<ParsedQuery> {
        let columns = match statement {
            Statement::Select(query) => self.scoped(|v| v.query(query, true))?,
            Statement::Insert(insert) => self.scoped(|v| v.insert(insert))?,
            Statement::Update(update) => self.scoped(|v| v.update(update))?,
            Statement::Delete(delete) => self.scoped(|v| v.delete(delete))?,
        };
        debug!(
            name,
            columns = columns.len(),
            nodes = self.nodes.len(),
            "statement analysed"
        );
        self.finish(statement, name, config, columns)
    }

    /// Runs `f` and drops every source it pushed, whether it succeeds or not.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let depth = self.sources.len();
        let out = f(self);
        self.sources.truncate(depth);
        out
    }

    fn node(&mut self, span: Span) -> &mut NodeInfo {
        self.nodes.entry(span).or_default()
    }

    /// Narrows the candidate types of a node.
    fn set_types(&mut self, span: Span, types: &NodeTypes) -> Result<NodeTypes> {
        let node = self.node(span);
        let merged = node.types.unify(types).ok_or_else(|| {
            GenError::conflict(
                span,
                format!(
                    "type mismatch: {} and {}",
                    node.types.type_name(),
                    types.type_name()
                ),
            )
        })?;
        node.types = merged.clone();
        Ok(merged)
    }

    /// Makes the innermost node of `from` take its type from `to`, unless it already has a
    /// type source.
    fn link(&mut self, from: &Expr, to: Span, ignore_nullability: bool) {
        let span = from.unnested().span;
        if span == to {
            return;
        }
        let node = self.node(span);
        if node.expr_ref.is_none() {
            node.expr_ref = Some(to);
            node.ignore_ref_nullability = ignore_nullability;
        }
    }

    fn mark_group(&mut self, span: Span, can_be_multiple: bool) {
        let node = self.node(span);
        node.is_group = true;
        node.can_be_multiple |= can_be_multiple;
    }

    /// The types of a node after following its references.
    fn resolved(&self, span: Span) -> NodeTypes {
        let mut seen = HashSet::new();
        self.resolve_from(span, &mut seen)
    }

    fn resolve_from(&self, span: Span, seen: &mut HashSet<Span>) -> NodeTypes {
        let Some(node) = self.nodes.get(&span) else {
            return NodeTypes::default();
        };
        let Some(target) = node.expr_ref.filter(|_| seen.insert(span)) else {
            return node.types.clone();
        };
        let mut other = self.resolve_from(target, seen);
        if node.ignore_ref_nullability {
            other = other.without_nullability();
        }
        node.types.unify(&other).unwrap_or_else(|| node.types.clone())
    }

    fn quote(&mut self, ident: &quarry_core::ast::Ident) {
        let quoted = self.engine.quote(&ident.value);
        self.edits.replace(ident.span, quoted);
        self.set_name(ident.span, &ident.value);
    }

    fn set_name(&mut self, span: Span, name: &str) {
        if !name.is_empty() {
            self.names.entry(span).or_insert_with(|| name.to_string());
        }
    }

    /// Lets each side of a comparison take the other's name if it has none.
    fn match_names(&mut self, a: &Expr, b: &Expr) {
        let (a, b) = (a.unnested().span, b.unnested().span);
        if let Some(name) = self.names.get(&b).cloned() {
            self.set_name(a, &name);
        }
        if let Some(name) = self.names.get(&a).cloned() {
            self.set_name(b, &name);
        }
    }

    /// The config in a block comment directly after `span`, if any.
    fn config_after(&self, span: Span) -> ColumnConfig {
        self.comments
            .iter()
            .filter(|c| c.kind == CommentKind::Block && c.span.start >= span.end)
            .find(|c| {
                self.source
                    .get(span.end..c.span.start)
                    .is_some_and(|gap| gap.trim().is_empty())
            })
            .map(|c| ColumnConfig::parse(&c.text))
            .unwrap_or_default()
    }

    fn finish(
        mut self,
        statement: &Statement,
        name: &str,
        config: &QueryConfig,
        columns: Vec<ReturnColumn>,
    ) -> Result<ParsedQuery> {
        let range = statement.span();

        let mut binds: Vec<(Span, String)> = self
            .nodes
            .iter()
            .filter_map(|(span, node)| node.bind.clone().map(|key| (*span, key)))
            .collect();
        binds.sort_by_key(|(span, _)| (span.start, span.end));

        let mut numbers: IndexMap<&str, usize> = IndexMap::new();
        for (span, key) in &binds {
            let next = numbers.len() + 1;
            let n = *numbers.entry(key.as_str()).or_insert(next);
            self.edits.replace(*span, self.engine.placeholder(n));
            self.edits.record(*span);
        }
        let groups: Vec<Span> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.is_group)
            .map(|(span, _)| *span)
            .collect();
        for span in &groups {
            self.edits.record(*span);
        }
        for step in &mut self.steps {
            for span in step.spans_mut() {
                self.edits.record(*span);
            }
        }
        for comment in self.comments {
            if range.contains(comment.span) {
                self.edits.delete(comment.span);
            }
        }

        let edited = self.edits.apply(self.source, range)?;
        let at = |span: Span| edited.position(span).ok_or(EditError::Unmappable(span));

        let mut occurrences = Vec::with_capacity(binds.len());
        for (span, key) in &binds {
            let types = self.resolved(*span);
            let node = &self.nodes[span];
            occurrences.push(Bind {
                key: key.clone(),
                name: self.names.get(span).cloned().unwrap_or_default(),
                config: node.config.clone(),
                db_type: types.type_name().to_string(),
                nullable: types.is_nullable(),
                position: at(*span)?,
                can_be_multiple: node.can_be_multiple,
            });
        }
        let merged = args::merge_binds(self.engine, occurrences);

        let mut group_args = Vec::with_capacity(groups.len());
        for span in &groups {
            let node = &self.nodes[span];
            let name = self.names.get(span).map_or(GROUP_NAME, String::as_str);
            group_args.push(QueryArg {
                col: args::column(self.engine, &node.config, "", false, name),
                children: Vec::new(),
                positions: vec![at(*span)?],
                can_be_multiple: node.can_be_multiple,
            });
        }

        let mut steps = std::mem::take(&mut self.steps);
        for step in &mut steps {
            for span in step.spans_mut() {
                *span = at(*span)?;
            }
        }

        let columns = columns
            .iter()
            .map(|c| {
                let mut col = args::column(
                    self.engine,
                    &c.config,
                    c.types.type_name(),
                    c.types.is_nullable(),
                    &c.name,
                );
                col.db_name.clone_from(&c.name);
                col
            })
            .collect();

        Ok(ParsedQuery {
            name: name.to_string(),
            query_type: statement.query_type(),
            sql: edited.text,
            config: QueryConfig::for_query(name).merge(config),
            columns,
            args: args::resolve(merged, group_args),
            mods: render_steps(&steps),
            steps,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use quarry_core::Parser;

    use super::Visitor;
    use crate::catalog::{Catalog, Column, Table};
    use crate::config::QueryConfig;
    use crate::engine::Engine;
    use crate::error::Result;
    use crate::output::ParsedQuery;

    pub(crate) fn catalog() -> Catalog {
        Catalog {
            tables: vec![
                Table::new(
                    "users",
                    vec![
                        Column::new("id", "INTEGER", false),
                        Column::new("name", "TEXT", false),
                        Column::new("email", "VARCHAR(255)", true),
                    ],
                ),
                Table::new(
                    "posts",
                    vec![
                        Column::new("id", "INTEGER", false),
                        Column::new("user_id", "INTEGER", false),
                        Column::new("title", "TEXT", false),
                        Column::new("score", "REAL", true),
                    ],
                ),
            ],
        }
    }

    /// Transpiles a single statement against [`catalog`].
    pub(crate) fn run(engine: Engine, sql: &str) -> Result<ParsedQuery> {
        let catalog = catalog();
        let mut parser = Parser::new(sql);
        let statement = parser.parse_statement()?;
        let comments = parser.comments().to_vec();
        Visitor::new(engine, &catalog, sql, &comments).transpile(
            &statement,
            "Q",
            &QueryConfig::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::testing::run;
    use super::*;

    #[test]
    fn test_identifiers_are_quoted_and_binds_numbered() {
        let q = run(
            Engine::Sqlite,
            "SELECT id, name FROM users WHERE email = :email OR name = :email AND id > ?",
        )
        .unwrap();
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\" FROM \"users\" WHERE \"email\" = ?1 OR \"name\" = ?1 AND \"id\" > ?2"
        );
        assert_eq!(q.args.len(), 2);
        assert_eq!(q.args[0].positions.len(), 2);
        assert_eq!(q.args[0].col.db_type, "VARCHAR");
        assert!(!q.args[0].col.nullable);
        assert_eq!(q.args[1].col.type_name, "i64");
    }

    #[test]
    fn test_comments_are_removed_and_configs_applied() {
        let q = run(
            Engine::Mysql,
            "SELECT id /* user_id:u64 */, name FROM users WHERE id = ? /* wanted */",
        )
        .unwrap();
        assert_eq!(q.sql, "SELECT `id` , `name` FROM `users` WHERE `id` = ?");
        assert_eq!(q.columns[0].name, "user_id");
        assert_eq!(q.columns[0].type_name, "u64");
        assert_eq!(q.columns[0].db_name, "id");
        assert_eq!(q.args[0].col.name, "wanted");
    }

    fn arg_names(q: &ParsedQuery) -> Vec<&str> {
        q.args.iter().map(|a| a.col.name.as_str()).collect()
    }

    #[test]
    fn test_binds_are_named_after_what_they_meet() {
        let q = run(
            Engine::Mysql,
            "SELECT id FROM users WHERE name = ? AND email = ?",
        )
        .unwrap();
        assert_eq!(arg_names(&q), ["name", "email"]);

        let q = run(Engine::Mysql, "UPDATE users SET name = ? WHERE id = ?").unwrap();
        assert_eq!(arg_names(&q), ["name", "id"]);

        let q = run(
            Engine::Sqlite,
            "SELECT u.id FROM users u WHERE ? = u.name OR u.id IN (?) OR u.email = 'x@y'",
        )
        .unwrap();
        assert_eq!(arg_names(&q), ["name", "arg"]);
    }

    #[test]
    fn test_insert_rows_are_named_after_table_and_columns() {
        let q = run(
            Engine::Sqlite,
            "INSERT INTO users (id, name) VALUES (?, ?), (?, ?)",
        )
        .unwrap();
        assert_eq!(arg_names(&q), ["users", "users_2"]);
        let children: Vec<_> = q.args[1].children.iter().map(|c| c.col.name.as_str()).collect();
        assert_eq!(children, ["id", "name"]);
    }

    #[test]
    fn test_mysql_rejects_numbered_binds() {
        let err = run(Engine::Mysql, "SELECT id FROM users WHERE id = ?1").unwrap_err();
        assert!(matches!(err, GenError::Unsupported { .. }));
    }

    #[test]
    fn test_recorded_positions_point_into_rewritten_sql() {
        let q = run(Engine::Sqlite, "SELECT * FROM users WHERE id IN (?, ?)").unwrap();
        assert_eq!(
            q.sql,
            "SELECT \"users\".\"id\", \"users\".\"name\", \"users\".\"email\" FROM \"users\" WHERE \"id\" IN (?1, ?2)"
        );
        let group = &q.args[0];
        assert_eq!(group.children.len(), 2);
        assert_eq!(group.span().text(&q.sql), "(?1, ?2)");
        assert_eq!(group.children[1].span().text(&q.sql), "?2");
        let ModStep::AppendSelect { span } = &q.steps[1] else {
            panic!("expected a select step, got {:?}", q.steps[1]);
        };
        assert_eq!(
            span.text(&q.sql),
            "\"users\".\"id\", \"users\".\"name\", \"users\".\"email\""
        );
    }
}
