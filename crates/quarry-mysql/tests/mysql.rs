//! End-to-end MySQL statements.

use quarry_core::expr::{arg, s, Chain};
use quarry_core::expression::{raw, IntoExpr};
use quarry_core::query::Query;
use quarry_core::{Arg, SqlValue};
use quarry_mysql::{hints, im, sm, vm, IndexHints};

fn normalize(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn values(args: &[Arg]) -> Vec<SqlValue> {
    args.iter()
        .map(|a| a.value().cloned().expect("bound value"))
        .collect()
}

fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}

#[test]
fn upsert_through_row_alias() {
    let q = quarry_mysql::insert()
        .apply(im::into("distributors", ["did", "dname"]))
        .apply(im::values([arg([8]).into_expr(), arg(["Anvil Distribution"]).into_expr()]))
        .apply(im::values([arg([9]).into_expr(), arg(["Sentry Distribution"]).into_expr()]))
        .apply(im::as_("new", Vec::<String>::new()))
        .apply(im::on_duplicate_key_update().set(
            "dbname",
            raw("new.dname").concat([
                s(" (formerly ").into_expr(),
                raw("d.dname").into_expr(),
                s(")").into_expr(),
            ]),
        ));
    let (sql, args) = q.build().unwrap();
    assert_eq!(
        normalize(&sql),
        "INSERT INTO distributors (`did`, `dname`) VALUES (?, ?), (?, ?) AS new \
         ON DUPLICATE KEY UPDATE `dbname` = (new.dname || ' (formerly ' || d.dname || ')')"
    );
    assert_eq!(
        values(&args),
        vec![
            SqlValue::Int(8),
            text("Anvil Distribution"),
            SqlValue::Int(9),
            text("Sentry Distribution"),
        ]
    );
}

#[test]
fn values_statement_uses_row_constructors() {
    let q = quarry_mysql::values()
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
        .apply(vm::order_by("column_1").desc())
        .apply(vm::limit(arg([1])));
    let (sql, args) = q.build().unwrap();
    assert_eq!(
        normalize(&sql),
        "VALUES ROW(?, ?, ?), ROW(?, ?, ?) ORDER BY column_1 DESC LIMIT ?"
    );
    assert_eq!(args.len(), 7);
    assert_eq!(values(&args)[3], text("five"));
}

#[test]
fn select_with_hints_index_hints_and_lock() {
    let q = quarry_mysql::select()
        .apply(hints::join_order(["u", "o"]))
        .apply(sm::straight())
        .apply(sm::columns(["u.id".into(), "count(*)".into()]))
        .apply(sm::from("users").as_("u").use_index(["PRIMARY"], None))
        .apply(sm::left_join("orders").as_("o").on("o.user_id = u.id"))
        .apply(sm::where_(raw("u.active").eq(arg([true]))))
        .apply(sm::group_by("u.id"))
        .apply(sm::with_rollup())
        .apply(sm::for_update().skip_locked());
    let (sql, args) = q.build().unwrap();
    assert_eq!(
        normalize(&sql),
        "SELECT /*+ JOIN_ORDER(u, o) */ STRAIGHT_JOIN u.id, count(*) \
         FROM users AS `u` USE INDEX (`PRIMARY`) \
         LEFT JOIN orders AS `o` ON o.user_id = u.id \
         WHERE (u.active = ?) GROUP BY u.id WITH ROLLUP FOR UPDATE SKIP LOCKED"
    );
    assert_eq!(values(&args), vec![SqlValue::Bool(true)]);
}

#[test]
fn named_arguments_are_rejected() {
    let q = quarry_mysql::select()
        .apply(sm::from("t"))
        .apply(sm::where_(raw("id").eq(quarry_core::expression::named("id"))));
    assert!(matches!(q.build(), Err(quarry_core::Error::NoNamedArgs)));
}
