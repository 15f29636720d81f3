//! Tests for the parser surface used by code generation: spans, binds and statement shapes.

mod common;
use common::*;

use quarry_core::ast::{
    ExprKind, InList, InsertSource, Literal, ResultColumn, SelectCore, TableFactor, UpsertAction,
};
use quarry_core::lexer::Parameter;
use quarry_core::query::QueryType;
use quarry_core::Parser;

fn select_core(q: &quarry_core::ast::Query) -> &quarry_core::ast::Select {
    match &q.body {
        SelectCore::Select(s) => s,
        SelectCore::Values(_) => panic!("Expected a SELECT core"),
    }
}

#[test]
fn bind_kinds() {
    let sql = "SELECT * FROM t WHERE a = ? AND b = ?2 AND c = :name AND d = @other";
    let q = parse_select(sql);
    let mut binds = Vec::new();
    let mut stack = vec![select_core(&q).where_clause.clone().expect("where")];
    while let Some(e) = stack.pop() {
        match e.kind {
            ExprKind::Binary { left, right, .. } => {
                stack.push(*right);
                stack.push(*left);
            }
            ExprKind::Bind(p) => binds.push((p, e.span.text(sql).to_string())),
            _ => {}
        }
    }
    assert_eq!(
        binds,
        vec![
            (Parameter::Anonymous, String::from("?")),
            (Parameter::Numbered(2), String::from("?2")),
            (
                Parameter::Named {
                    prefix: ':',
                    name: String::from("name")
                },
                String::from(":name")
            ),
            (
                Parameter::Named {
                    prefix: '@',
                    name: String::from("other")
                },
                String::from("@other")
            ),
        ]
    );
}

#[test]
fn result_column_spans_include_aliases() {
    let sql = "SELECT id, lower(name) AS lname, t.* FROM t";
    let q = parse_select(sql);
    let texts: Vec<&str> = select_core(&q)
        .columns
        .iter()
        .map(|c| c.span().text(sql))
        .collect();
    assert_eq!(texts, vec!["id", "lower(name) AS lname", "t.*"]);
    assert!(matches!(
        &select_core(&q).columns[2],
        ResultColumn::Star { table: Some(t), .. } if t.value == "t"
    ));
}

#[test]
fn quoted_identifiers_are_unquoted() {
    let q = parse_select("SELECT \"User Id\", `name` FROM [my table]");
    let s = select_core(&q);
    let ResultColumn::Expr { expr, .. } = &s.columns[0] else {
        panic!("Expected an expression column");
    };
    assert!(matches!(
        &expr.kind,
        ExprKind::Column { name, .. } if name.value == "User Id" && name.quoted
    ));
    let Some(from) = &s.from else {
        panic!("Expected FROM");
    };
    assert!(matches!(
        &from.factor,
        TableFactor::Table { name, .. } if name.name.value == "my table"
    ));
}

#[test]
fn schema_qualified_table_and_derived_table() {
    let q = parse_select("SELECT x.id FROM main.users JOIN (SELECT id FROM posts) AS x ON x.id = users.id");
    let from = select_core(&q).from.as_ref().expect("from");
    assert!(matches!(
        &from.factor,
        TableFactor::Table { name, .. }
            if name.schema.as_ref().is_some_and(|s| s.value == "main") && name.name.value == "users"
    ));
    assert!(matches!(
        &from.joins[0].factor,
        TableFactor::Derived { alias: Some(a), .. } if a.value == "x"
    ));
}

#[test]
fn in_list_span_covers_parentheses() {
    let sql = "SELECT * FROM t WHERE id IN (?, ?, ?)";
    let q = parse_select(sql);
    let ExprKind::In { list, .. } = &select_core(&q).where_clause.as_ref().expect("where").kind else {
        panic!("Expected IN");
    };
    assert_eq!(list.span().text(sql), "(?, ?, ?)");
    assert!(matches!(list, InList::Exprs { items, .. } if items.len() == 3));
}

#[test]
fn values_rows_have_spans() {
    let sql = "INSERT INTO t (a, b) VALUES (?, ?), (1, 'x')";
    let ins = parse_insert(sql);
    let InsertSource::Values(values) = &ins.source else {
        panic!("Expected VALUES");
    };
    let rows: Vec<&str> = values.rows.iter().map(|r| r.span.text(sql)).collect();
    assert_eq!(rows, vec!["(?, ?)", "(1, 'x')"]);
    assert_eq!(values.span.text(sql), "VALUES (?, ?), (1, 'x')");
    assert_eq!(
        values.rows[1].items[1].kind,
        ExprKind::Literal(Literal::String(String::from("x")))
    );
}

#[test]
fn upsert_do_nothing_and_update() {
    let ins = parse_insert(
        "INSERT INTO t (a) VALUES (1) ON CONFLICT (a) DO NOTHING ON CONFLICT DO UPDATE SET a = 2",
    );
    assert_eq!(ins.upserts.len(), 2);
    assert!(matches!(ins.upserts[0].action, UpsertAction::Nothing));
    assert!(ins.upserts[1].target.is_none());
    assert!(matches!(
        &ins.upserts[1].action,
        UpsertAction::Update { assignments, where_clause: None } if assignments.len() == 1
    ));
}

#[test]
fn update_returning_and_from() {
    let upd = parse_update("UPDATE t SET a = o.a, b = ? FROM other AS o WHERE t.id = o.id RETURNING id, a");
    assert_eq!(upd.assignments.len(), 2);
    assert!(upd.from.is_some());
    assert_eq!(upd.returning.as_ref().map(|r| r.columns.len()), Some(2));
}

#[test]
fn delete_using() {
    let del = parse_delete("DELETE FROM orders USING customers WHERE orders.cid = customers.id");
    assert!(del.using.is_some());
    assert!(del.where_clause.is_some());
}

#[test]
fn query_types() {
    assert_eq!(parse("SELECT 1").query_type(), QueryType::Select);
    assert_eq!(parse("VALUES (1)").query_type(), QueryType::Values);
    assert_eq!(parse("VALUES (1) UNION SELECT 2").query_type(), QueryType::Select);
    assert_eq!(parse("INSERT INTO t DEFAULT VALUES").query_type(), QueryType::Insert);
    assert_eq!(parse("DELETE FROM t").query_type(), QueryType::Delete);
}

#[test]
fn statements_and_comment_text() {
    let sql = "-- GetUser user:users:true\nSELECT * FROM users WHERE id = ?;\n\n-- ListUsers\nSELECT * FROM users;";
    let mut parser = Parser::new(sql);
    let statements = parser.parse_statements().expect("statements");
    assert_eq!(statements.len(), 2);
    let texts: Vec<&str> = parser.comments().iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["GetUser user:users:true", "ListUsers"]);
    assert_eq!(
        statements[0].span().text(sql),
        "SELECT * FROM users WHERE id = ?"
    );
}

#[test]
fn syntax_errors() {
    assert!(parse_err("SELECT * FROM").message.contains("expected"));
    assert!(parse_err("UPDATE t WHERE a = 1").message.contains("SET"));
    assert!(parse_err("SELECT 1 SELECT 2").span.start >= 9);
}
