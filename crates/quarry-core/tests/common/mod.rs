#![allow(dead_code)]

use quarry_core::ast::{Delete, Insert, Query as SelectStmt, Update};
use quarry_core::{Arg, ParseError, Parser, Query, SqlValue, Statement};

/// Collapses every run of whitespace to one space.
pub fn normalize(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn build<Q: Query>(q: &Q) -> (String, Vec<Arg>) {
    q.build()
        .unwrap_or_else(|e| panic!("Failed to build: {q:?}\nError: {e}"))
}

pub fn build_n<Q: Query>(q: &Q, start: usize) -> (String, Vec<Arg>) {
    q.build_n(start)
        .unwrap_or_else(|e| panic!("Failed to build from {start}: {q:?}\nError: {e}"))
}

pub fn values(args: &[Arg]) -> Vec<SqlValue> {
    args.iter()
        .map(|a| {
            a.value()
                .cloned()
                .unwrap_or_else(|| panic!("Expected a bound value, got {a:?}"))
        })
        .collect()
}

/// Numbers of every `?N` placeholder, in order of appearance.
pub fn numbered_placeholders(sql: &str) -> Vec<usize> {
    let bytes = sql.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'?' {
            let digits: String = sql[i + 1..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            if let Ok(n) = digits.parse() {
                found.push(n);
            }
            i += digits.len();
        }
        i += 1;
    }
    found
}

pub fn parse(sql: &str) -> Statement {
    Parser::new(sql)
        .parse_statement()
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e}"))
}

pub fn parse_err(sql: &str) -> ParseError {
    Parser::new(sql)
        .parse_statement()
        .expect_err(&format!("Expected parse error for: {sql}"))
}

pub fn parse_select(sql: &str) -> SelectStmt {
    match parse(sql) {
        Statement::Select(s) => s,
        other => panic!("Expected SELECT, got {other:?}"),
    }
}

pub fn parse_insert(sql: &str) -> Insert {
    match parse(sql) {
        Statement::Insert(i) => i,
        other => panic!("Expected INSERT, got {other:?}"),
    }
}

pub fn parse_update(sql: &str) -> Update {
    match parse(sql) {
        Statement::Update(u) => u,
        other => panic!("Expected UPDATE, got {other:?}"),
    }
}

pub fn parse_delete(sql: &str) -> Delete {
    match parse(sql) {
        Statement::Delete(d) => d,
        other => panic!("Expected DELETE, got {other:?}"),
    }
}
