//! Property tests for the edit engine, type unification and join nullability.

mod common;
use common::*;

use proptest::prelude::*;

use quarry_core::Span;
use quarry_gen::catalog::{Column, Table};
use quarry_gen::edit::Edits;
use quarry_gen::types::{NodeType, NodeTypes};
use quarry_gen::{Catalog, Engine, Transpiler};

/// Word boundaries of a space-separated text.
fn words(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start = 0;
    for word in text.split(' ') {
        spans.push(Span::new(start, start + word.len()));
        start += word.len() + 1;
    }
    spans
}

fn candidate() -> impl Strategy<Value = NodeType> {
    (
        prop::sample::select(vec!["", "INTEGER", "REAL", "TEXT", "BLOB"]),
        any::<bool>(),
    )
        .prop_map(|(class, nullable)| NodeType::new(class).with_nullable(nullable))
}

fn candidates() -> impl Strategy<Value = NodeTypes> {
    prop::collection::vec(candidate(), 0..4).prop_map(|v| v.into_iter().collect())
}

/// A candidate set in a canonical order.
fn sorted(types: Option<NodeTypes>) -> Option<Vec<(String, Option<bool>)>> {
    types.map(|t| {
        let mut v: Vec<_> = t.0.into_iter().map(|c| (c.db_type, c.nullable)).collect();
        v.sort();
        v
    })
}

fn table(name: &str, columns: usize) -> Table {
    Table::new(
        name,
        (0..columns)
            .map(|i| Column::new(format!("c{i}"), "INTEGER", false))
            .collect(),
    )
}

proptest! {
    #[test]
    fn edits_cover_the_source(
        text in prop::collection::vec("[a-z]{1,6}", 1..12).prop_map(|w| w.join(" ")),
        picks in prop::collection::vec((any::<prop::sample::Index>(), 0u8..3), 0..6),
    ) {
        let spans = words(&text);
        let mut edits = Edits::new();
        let mut used = std::collections::HashSet::new();
        for (index, kind) in picks {
            let span = spans[index.index(spans.len())];
            if !used.insert(span) {
                continue;
            }
            match kind {
                0 => edits.replace(span, "\"x\""),
                1 => edits.delete(span),
                _ => edits.insert(span.start, "y."),
            }
        }
        let out = edits.apply(&text, Span::new(0, text.len())).unwrap();

        let mut cursor = 0;
        let mut rebuilt = String::new();
        for segment in &out.segments {
            prop_assert_eq!(segment.source.start, cursor);
            cursor = segment.source.end;
            rebuilt.push_str(segment.output.text(&out.text));
            if !segment.edited {
                prop_assert_eq!(segment.output.text(&out.text), segment.source.text(&text));
            }
        }
        prop_assert_eq!(cursor, text.len());
        prop_assert_eq!(rebuilt, out.text.clone());
    }

    #[test]
    fn unification_is_associative(a in candidates(), b in candidates(), c in candidates()) {
        let left = a.unify(&b).and_then(|ab| ab.unify(&c));
        let right = b.unify(&c).and_then(|bc| a.unify(&bc));
        prop_assert_eq!(sorted(left), sorted(right));
    }

    #[test]
    fn left_join_nullability(left in 1usize..5, right in 1usize..5) {
        let catalog = Catalog { tables: vec![table("a", left), table("b", right)] };
        let queries = Transpiler::new(Engine::Sqlite, catalog)
            .parse_queries("SELECT a.*, b.* FROM a LEFT JOIN b ON b.c0 = a.c0")
            .unwrap();
        let nullable: Vec<bool> = queries[0].columns.iter().map(|c| c.nullable).collect();
        let expected: Vec<bool> = std::iter::repeat(false)
            .take(left)
            .chain(std::iter::repeat(true).take(right))
            .collect();
        prop_assert_eq!(nullable, expected);
    }

    #[test]
    fn placeholders_follow_output_order(n in 1usize..8) {
        let conditions: Vec<String> = (0..n).map(|i| format!("id > ?{}", n - i)).collect();
        let sql = format!("SELECT id FROM users WHERE {}", conditions.join(" OR "));
        let q = one(Engine::Sqlite, &sql);
        let expected: Vec<String> = (1..=n).map(|i| format!("?{i}")).collect();
        let found: Vec<&str> = q.sql.match_indices('?').map(|(i, _)| {
            let len = q.sql[i + 1..].chars().take_while(char::is_ascii_digit).count();
            &q.sql[i..=i + len]
        }).collect();
        prop_assert_eq!(found, expected);
        prop_assert_eq!(q.args.len(), n);
    }
}
