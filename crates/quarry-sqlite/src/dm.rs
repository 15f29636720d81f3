//! `DELETE` modifiers.

use quarry_core::clause::IndexedBy;
use quarry_core::query::{DeleteQuery, Modifier};

pub use quarry_core::mods::dm::*;

/// `INDEXED BY index` on the last table added with `from`.
pub fn indexed_by(index: impl Into<String>) -> impl Modifier<DeleteQuery> + Clone {
    let index = IndexedBy::Index(index.into());
    move |q: &mut DeleteQuery| {
        if let Some(table) = q.tables.last_mut() {
            table.indexed_by = Some(index.clone());
        }
    }
}

/// `NOT INDEXED` on the last table added with `from`.
#[must_use]
pub fn not_indexed() -> impl Modifier<DeleteQuery> + Clone {
    |q: &mut DeleteQuery| {
        if let Some(table) = q.tables.last_mut() {
            table.indexed_by = Some(IndexedBy::NotIndexed);
        }
    }
}

#[cfg(test)]
mod tests {
    use quarry_core::query::Query;

    use super::*;

    #[test]
    fn test_not_indexed_applies_to_last_table() {
        let q = crate::delete()
            .apply(from("logs"))
            .apply(not_indexed())
            .apply(where_("created < 0"))
            .apply(returning(["id".into()]));
        let (sql, _) = q.build().unwrap();
        assert_eq!(sql, "DELETE FROM logs NOT INDEXED\nWHERE created < 0\nRETURNING id");
    }

    #[test]
    fn test_indexed_by_without_table_is_a_no_op() {
        let q = crate::delete().apply(indexed_by("i")).apply(from("t"));
        let (sql, _) = q.build().unwrap();
        assert_eq!(sql, "DELETE FROM t");
    }
}
