//! `DELETE` modifiers.

use quarry_core::clause::TableRef;
use quarry_core::expression::IntoExpr;
use quarry_core::query::{DeleteQuery, Modifier};

pub use quarry_core::mods::dm::*;

/// `LOW_PRIORITY`.
#[must_use]
pub fn low_priority() -> impl Modifier<DeleteQuery> + Clone {
    modifier("LOW_PRIORITY")
}

/// `QUICK`: the storage engine skips merging index leaves.
#[must_use]
pub fn quick() -> impl Modifier<DeleteQuery> + Clone {
    modifier("QUICK")
}

/// `IGNORE`.
#[must_use]
pub fn ignore() -> impl Modifier<DeleteQuery> + Clone {
    modifier("IGNORE")
}

/// Adds a table to delete from, restricted to the named partitions.
pub fn from_partition<I, S>(table: impl IntoExpr, partitions: I) -> impl Modifier<DeleteQuery> + Clone
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut table = TableRef::new(table.into_expr());
    table.append_partitions(partitions.into_iter().map(Into::into));
    move |q: &mut DeleteQuery| q.tables.push(table.clone())
}

#[cfg(test)]
mod tests {
    use quarry_core::query::Query;

    use super::*;

    #[test]
    fn test_modifiers_and_partition() {
        let q = crate::delete()
            .apply(low_priority())
            .apply(quick())
            .apply(ignore())
            .apply(from_partition("t", ["p0"]))
            .apply(where_("a = 1"))
            .apply(limit("5"));
        let (sql, _) = q.build().unwrap();
        assert_eq!(
            sql,
            "DELETE LOW_PRIORITY QUICK IGNORE FROM t PARTITION (`p0`)\nWHERE a = 1\nLIMIT 5"
        );
    }

    #[test]
    fn test_multi_table_delete_with_using() {
        let q = crate::delete()
            .apply(from("t1"))
            .apply(from("t2"))
            .apply(using("t1"))
            .apply(inner_join("t2").on("t1.id = t2.id"));
        let (sql, _) = q.build().unwrap();
        assert_eq!(
            sql.split_whitespace().collect::<Vec<_>>().join(" "),
            "DELETE FROM t1, t2 USING t1 INNER JOIN t2 ON t1.id = t2.id"
        );
    }
}
