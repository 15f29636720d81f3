#![allow(dead_code)]

use quarry_gen::catalog::{Column, Table};
use quarry_gen::{Catalog, Engine, GenError, ParsedQuery, Transpiler};

/// `users(id, name, email)` and `posts(id, user_id, title, score)`.
pub fn blog() -> Catalog {
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

pub fn transpile(engine: Engine, sql: &str) -> Vec<ParsedQuery> {
    Transpiler::new(engine, blog())
        .parse_queries(sql)
        .unwrap_or_else(|e| panic!("Failed to transpile: {sql}\nError: {e}"))
}

pub fn one(engine: Engine, sql: &str) -> ParsedQuery {
    let mut queries = transpile(engine, sql);
    assert_eq!(queries.len(), 1, "Expected one statement in: {sql}");
    queries.remove(0)
}

pub fn fail(engine: Engine, sql: &str) -> GenError {
    match Transpiler::new(engine, blog()).parse_queries(sql) {
        Ok(q) => panic!("Expected an error for: {sql}\nGot: {q:?}"),
        Err(e) => e,
    }
}

/// `(name, nullable)` of every result column.
pub fn columns(q: &ParsedQuery) -> Vec<(&str, bool)> {
    q.columns
        .iter()
        .map(|c| (c.name.as_str(), c.nullable))
        .collect()
}

/// Collapses every run of whitespace to one space.
pub fn normalize(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}
