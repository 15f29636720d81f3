//! Render-time behaviour: hooks, contextual mods, cancellation and named arguments.

mod common;
use common::*;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use quarry_core::dialect::{MYSQL, SQLITE};
use quarry_core::expr::{arg, Chain};
use quarry_core::expression::{named, raw};
use quarry_core::mods::sm;
use quarry_core::query::build_with;
use quarry_core::value::bind_named;
use quarry_core::{CancellationToken, Error, Query, RenderContext, SelectQuery, SqlValue};

fn users() -> SelectQuery {
    SelectQuery::new(&SQLITE).apply(sm::from("users"))
}

#[test]
fn hook_runs_once_per_build() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let q = users().hook(move |_, _| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    build(&q);
    build(&q);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn failing_hook_aborts_the_build() {
    let q = users().hook(|_, q| {
        if q.where_.conditions.is_empty() {
            return Err(Error::Hook(String::from("refusing unfiltered read")));
        }
        Ok(())
    });
    let err = q.build().unwrap_err();
    assert_eq!(err.to_string(), "hook failed: refusing unfiltered read");

    let filtered = q.apply(sm::where_(raw("id = ?").bind(1)));
    assert!(filtered.build().is_ok());
}

#[test]
fn skipped_hooks_do_not_run() {
    let q = users().hook(|_, _| Err(Error::Hook(String::from("boom"))));
    let ctx = RenderContext::new().skip_hooks();
    let (sql, _) = build_with(&ctx, &q, 1).unwrap();
    assert_eq!(normalize(&sql), "SELECT * FROM users");
}

#[test]
fn contextual_mod_applies_to_a_copy() {
    let q = users().contextual_mod(|_, q| {
        q.apply_mut(sm::where_(raw("deleted_at IS NULL")));
        Ok(())
    });
    let (first, _) = build(&q);
    let (second, _) = build(&q);
    assert_eq!(normalize(&first), "SELECT * FROM users WHERE deleted_at IS NULL");
    assert_eq!(first, second);
    assert!(q.where_.conditions.is_empty());
}

#[test]
fn contextual_mod_can_be_skipped() {
    let q = users().contextual_mod(|_, q| {
        q.apply_mut(sm::limit("1"));
        Ok(())
    });
    let ctx = RenderContext::new().skip_contextual_mods();
    let (sql, _) = build_with(&ctx, &q, 1).unwrap();
    assert_eq!(normalize(&sql), "SELECT * FROM users");
}

#[test]
fn contextual_mod_error_propagates() {
    let q = users().contextual_mod(|_, _| Err(Error::Unsupported(String::from("tenant missing"))));
    assert!(matches!(q.build(), Err(Error::Unsupported(msg)) if msg == "tenant missing"));
}

#[test]
fn cancelled_render_fails() {
    let token = CancellationToken::new();
    token.cancel();
    let ctx = RenderContext::new().with_cancellation(token);
    let q = users().apply(sm::where_(raw("id = ?").bind(1)));
    assert!(matches!(build_with(&ctx, &q, 1), Err(Error::Cancelled)));
}

#[test]
fn elapsed_deadline_fails() {
    let past = Instant::now()
        .checked_sub(Duration::from_secs(1))
        .unwrap_or_else(Instant::now);
    let ctx = RenderContext::new().with_deadline(past);
    assert!(matches!(build_with(&ctx, &users(), 1), Err(Error::DeadlineExceeded)));
}

#[test]
fn named_arguments_bind_by_name() {
    let q = users()
        .apply(sm::where_(raw("id").eq(named("id"))))
        .apply(sm::where_(raw("owner").eq(named("id"))));
    let (sql, args) = build(&q);
    assert_eq!(
        normalize(&sql),
        "SELECT * FROM users WHERE (id = :id) AND (owner = :id)"
    );
    let mut bindings = HashMap::new();
    bindings.insert(String::from("id"), SqlValue::Int(9));
    assert_eq!(
        bind_named(args, &bindings).unwrap(),
        vec![SqlValue::Int(9), SqlValue::Int(9)]
    );
}

#[test]
fn named_arguments_need_dialect_support() {
    let q = SelectQuery::new(&MYSQL)
        .apply(sm::from("users"))
        .apply(sm::where_(raw("id").eq(named("id"))));
    assert!(matches!(q.build(), Err(Error::NoNamedArgs)));
}

#[test]
fn mixing_named_and_positional_is_rejected() {
    let q = users()
        .apply(sm::where_(raw("id").eq(named("id"))))
        .apply(sm::where_(raw("age").gt(arg([3]))));
    let (_, args) = build(&q);
    assert!(matches!(
        bind_named(args, &HashMap::new()),
        Err(Error::MixedArgs)
    ));
}

#[test]
fn embedded_query_keeps_its_own_dialect() {
    let inner = SelectQuery::new(&MYSQL)
        .apply(sm::columns(["`id`".into()]))
        .apply(sm::from("accounts"))
        .apply(sm::where_(raw("name = ?").bind("x")));
    let q = users().apply(sm::where_(raw("account_id").in_([inner])));
    let (sql, args) = build(&q);
    assert_eq!(
        normalize(&sql),
        "SELECT * FROM users WHERE (account_id IN (SELECT `id` FROM accounts WHERE name = ?))"
    );
    assert_eq!(args.len(), 1);
}
