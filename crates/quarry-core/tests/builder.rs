//! Tests for building queries from modifiers.

mod common;
use common::*;

use quarry_core::dialect::{MSSQL, MYSQL, POSTGRES, SQLITE};
use quarry_core::expr::{arg, arg_group, func, quote, Chain};
use quarry_core::expression::{raw, IntoExpr};
use quarry_core::mods::{dm, im, sm, um, vm};
use quarry_core::query::{DeleteQuery, InsertQuery, SelectQuery, UpdateQuery, ValuesQuery};
use quarry_core::{Error, Query, SqlValue};

fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}

// ===================================================================
// SELECT
// ===================================================================

#[test]
fn select_in_list() {
    let q = SelectQuery::new(&MYSQL)
        .apply(sm::columns(["id".into(), "name".into()]))
        .apply(sm::from("users"))
        .apply(sm::where_(raw("id").in_([arg_group([100, 200, 300])])));
    let (sql, args) = build(&q);
    assert_eq!(
        normalize(&sql),
        "SELECT id, name FROM users WHERE (id IN (?, ?, ?))"
    );
    assert_eq!(
        values(&args),
        vec![SqlValue::Int(100), SqlValue::Int(200), SqlValue::Int(300)]
    );
}

#[test]
fn select_defaults_to_star() {
    let (sql, args) = build(&SelectQuery::new(&SQLITE).apply(sm::from("t")));
    assert_eq!(normalize(&sql), "SELECT * FROM t");
    assert!(args.is_empty());
}

#[test]
fn select_joins_group_and_order() {
    let q = SelectQuery::new(&POSTGRES)
        .apply(sm::columns([quote(["u", "id"]).into_expr(), func("count", [raw("*").into_expr()]).into_expr()]))
        .apply(sm::from("users").as_("u"))
        .apply(sm::left_join("posts").as_("p").on(raw("p.user_id = u.id")))
        .apply(sm::where_(quote(["u", "age"]).gte(arg([18]))))
        .apply(sm::group_by(quote(["u", "id"])))
        .apply(sm::having(raw("count(*) > ?").bind(2)))
        .apply(sm::order_by(quote(["u", "id"])).desc().nulls_last())
        .apply(sm::limit(arg([10])));
    let (sql, args) = build(&q);
    assert_eq!(
        normalize(&sql),
        "SELECT \"u\".\"id\", count(*) FROM users AS \"u\" \
         LEFT JOIN posts AS \"p\" ON p.user_id = u.id \
         WHERE (\"u\".\"age\" >= $1) GROUP BY \"u\".\"id\" HAVING count(*) > $2 \
         ORDER BY \"u\".\"id\" DESC NULLS LAST LIMIT $3"
    );
    assert_eq!(args.len(), 3);
}

#[test]
fn select_union_parenthesizes_limited_primary_arm() {
    let other = SelectQuery::new(&SQLITE)
        .apply(sm::from("b"))
        .apply(sm::where_(raw("x = ?").bind(2)));
    let q = SelectQuery::new(&SQLITE)
        .apply(sm::from("a"))
        .apply(sm::where_(raw("x = ?").bind(1)))
        .apply(sm::limit("5"))
        .apply(sm::union_all(other))
        .apply(sm::limit_combined(arg([20])));
    let (sql, args) = build(&q);
    assert_eq!(
        normalize(&sql),
        "(SELECT * FROM a WHERE x = ?1 LIMIT 5) UNION ALL SELECT * FROM b WHERE x = ?2 LIMIT ?3"
    );
    assert_eq!(values(&args), vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(20)]);
}

#[test]
fn select_cte_numbers_placeholders_first() {
    let body = SelectQuery::new(&SQLITE)
        .apply(sm::from("events"))
        .apply(sm::where_(raw("kind = ?").bind("click")));
    let q = SelectQuery::new(&SQLITE)
        .apply(sm::with("recent").columns(["id"]).as_(body).materialized())
        .apply(sm::from("recent"))
        .apply(sm::where_(raw("id > ?").bind(5)));
    let (sql, args) = build(&q);
    assert_eq!(
        normalize(&sql),
        "WITH \"recent\"(\"id\") AS MATERIALIZED (SELECT * FROM events WHERE kind = ?1) \
         SELECT * FROM recent WHERE id > ?2"
    );
    assert_eq!(values(&args), vec![text("click"), SqlValue::Int(5)]);
}

#[test]
fn select_window_frame_defaults() {
    let q = SelectQuery::new(&POSTGRES)
        .apply(sm::columns([func("sum", [raw("amount").into_expr()])
            .over(sm::window().partition_by([raw("account").into_expr()]).to_current_row())
            .into_expr()]))
        .apply(sm::from("ledger"));
    let (sql, _) = build(&q);
    assert_eq!(
        normalize(&sql),
        "SELECT sum(amount) OVER (PARTITION BY account RANGE BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW) FROM ledger"
    );
}

#[test]
fn select_offset_fetch_mssql() {
    let q = SelectQuery::new(&MSSQL)
        .apply(sm::from("t"))
        .apply(sm::order_by("id"))
        .apply(sm::offset(arg([10])))
        .apply(sm::fetch(arg([5]), false));
    let (sql, args) = build(&q);
    assert_eq!(
        normalize(&sql),
        "SELECT * FROM t ORDER BY id OFFSET @p1 ROWS FETCH NEXT @p2 ROWS ONLY"
    );
    assert_eq!(args.len(), 2);
}

#[test]
fn select_lock() {
    let q = SelectQuery::new(&POSTGRES)
        .apply(sm::from("jobs"))
        .apply(sm::for_update().of(["jobs"]).skip_locked());
    let (sql, _) = build(&q);
    assert_eq!(normalize(&sql), "SELECT * FROM jobs FOR UPDATE OF \"jobs\" SKIP LOCKED");
}

#[test]
fn subquery_expression_is_parenthesized() {
    let sub = SelectQuery::new(&MYSQL)
        .apply(sm::columns(["sales_person".into()]))
        .apply(sm::from("accounts"))
        .apply(sm::where_(raw("name").eq(arg(["Acme Corporation"]))));
    let q = UpdateQuery::new(&MYSQL)
        .apply(um::table("employees"))
        .apply(um::set("sales_count", raw("sales_count + 1")))
        .apply(um::where_(raw("id").eq(sub)));
    let (sql, args) = build(&q);
    assert_eq!(
        normalize(&sql),
        "UPDATE employees SET `sales_count` = sales_count + 1 \
         WHERE (id = (SELECT sales_person FROM accounts WHERE (name = ?)))"
    );
    assert_eq!(sql.matches('?').count(), 1);
    assert_eq!(values(&args), vec![text("Acme Corporation")]);
}

// ===================================================================
// INSERT / UPDATE / DELETE / VALUES
// ===================================================================

#[test]
fn insert_rows_and_conflict() {
    let q = InsertQuery::new(&SQLITE)
        .apply(im::into("users", ["id", "name"]))
        .apply(im::values([arg([1]).into_expr(), arg(["a"]).into_expr()]))
        .apply(im::values([arg([2]).into_expr(), arg(["b"]).into_expr()]))
        .apply(im::on_conflict(["id"]).do_update().set_excluded(["name"]))
        .apply(im::returning([raw("id").into_expr()]));
    let (sql, args) = build(&q);
    assert_eq!(
        normalize(&sql),
        "INSERT INTO users (\"id\", \"name\") VALUES (?1, ?2), (?3, ?4) \
         ON CONFLICT (\"id\") DO UPDATE SET \"name\" = EXCLUDED.\"name\" RETURNING id"
    );
    assert_eq!(args.len(), 4);
}

#[test]
fn insert_without_rows_uses_default_values() {
    let (sql, _) = build(&InsertQuery::new(&SQLITE).apply(im::into("t", Vec::<String>::new())));
    assert_eq!(normalize(&sql), "INSERT INTO t DEFAULT VALUES");
}

#[test]
fn insert_requires_table() {
    let err = InsertQuery::new(&MYSQL).build().unwrap_err();
    assert!(matches!(err, Error::MissingMandatory(_)));
}

#[test]
fn insert_select_is_not_parenthesized() {
    let source = SelectQuery::new(&SQLITE)
        .apply(sm::from("staging"))
        .apply(sm::where_(raw("ok = ?").bind(true)));
    let q = InsertQuery::new(&SQLITE)
        .apply(im::into("t", ["a"]))
        .apply(im::query(source));
    let (sql, args) = build(&q);
    assert_eq!(normalize(&sql), "INSERT INTO t (\"a\") SELECT * FROM staging WHERE ok = ?1");
    assert_eq!(values(&args), vec![SqlValue::Bool(true)]);
}

#[test]
fn update_multi_table_rejects_order_and_limit() {
    let q = UpdateQuery::new(&MYSQL)
        .apply(um::table("a"))
        .apply(um::inner_join("b").on("a.id = b.id"))
        .apply(um::set("x", arg([1])))
        .apply(um::limit("1"));
    assert!(matches!(q.build(), Err(Error::Unsupported(_))));
}

#[test]
fn delete_with_using() {
    let q = DeleteQuery::new(&POSTGRES)
        .apply(dm::from("orders"))
        .apply(dm::using("customers"))
        .apply(dm::where_(raw("orders.customer_id = customers.id AND customers.name = ?").bind("x")));
    let (sql, args) = build(&q);
    assert_eq!(
        normalize(&sql),
        "DELETE FROM orders USING customers WHERE orders.customer_id = customers.id AND customers.name = $1"
    );
    assert_eq!(args.len(), 1);
}

#[test]
fn values_rows_keep_argument_order() {
    let q = ValuesQuery::new(&MYSQL, true)
        .apply(vm::row([
            arg(["one"]).into_expr(),
            arg([2]).into_expr(),
            arg([3]).into_expr(),
        ]))
        .apply(vm::row([
            arg(["five"]).into_expr(),
            arg([6]).into_expr(),
            arg([7]).into_expr(),
        ]))
        .apply(vm::order_by("column_1").desc());
    let (sql, args) = build(&q);
    assert_eq!(
        normalize(&sql),
        "VALUES ROW(?, ?, ?), ROW(?, ?, ?) ORDER BY column_1 DESC"
    );
    assert_eq!(
        values(&args),
        vec![
            text("one"),
            SqlValue::Int(2),
            SqlValue::Int(3),
            text("five"),
            SqlValue::Int(6),
            SqlValue::Int(7),
        ]
    );
}

#[test]
fn values_rejects_empty_rows() {
    let err = ValuesQuery::new(&SQLITE, false).build().unwrap_err();
    assert_eq!(err.to_string(), "VALUES needs at least one row");
}

// ===================================================================
// Modifier behaviour
// ===================================================================

#[test]
fn scalar_modifier_is_idempotent() {
    let m = sm::limit("10");
    let once = SelectQuery::new(&SQLITE).apply(sm::from("t")).apply(m.clone());
    let twice = once.clone().apply(m);
    assert_eq!(build(&once), build(&twice));
}

#[test]
fn list_modifier_appends_each_time() {
    let m = sm::where_(raw("a = ?").bind(1));
    let once = SelectQuery::new(&SQLITE).apply(sm::from("t")).apply(m.clone());
    let twice = once.clone().apply(m);
    assert_eq!(once.where_.conditions.len(), 1);
    assert_eq!(twice.where_.conditions.len(), 2);
    let (sql, args) = build(&twice);
    assert_eq!(normalize(&sql), "SELECT * FROM t WHERE a = ?1 AND a = ?2");
    assert_eq!(args.len(), 2);
}

#[test]
fn build_n_shifts_numbering() {
    let q = SelectQuery::new(&POSTGRES)
        .apply(sm::from("t"))
        .apply(sm::where_(raw("a = ? AND b = ?").bind(1).bind(2)));
    let (sql, args) = build_n(&q, 4);
    assert_eq!(normalize(&sql), "SELECT * FROM t WHERE a = $4 AND b = $5");
    assert_eq!(args.len(), 2);
}
