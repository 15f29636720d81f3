//! Index hints and partition selection on table references.

use quarry_core::clause::{IndexHint, IndexHintFor, IndexHintKind, TableRef};
use quarry_core::mods::{FromChain, JoinChain};

fn index_hint<I, S>(kind: IndexHintKind, for_: Option<IndexHintFor>, indexes: I) -> IndexHint
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    IndexHint {
        kind,
        for_,
        indexes: indexes.into_iter().map(Into::into).collect(),
    }
}

/// MySQL additions to `FROM` and join chains.
///
/// ```rust
/// use quarry_core::query::Query;
/// use quarry_mysql::{sm, IndexHints};
///
/// let q = quarry_mysql::select().apply(sm::from("t1").force_index(["i1"], None));
/// let (sql, _) = q.build().unwrap();
/// assert_eq!(sql, "SELECT *\nFROM t1 FORCE INDEX (`i1`)");
/// ```
pub trait IndexHints: Sized {
    /// Edits the underlying table reference.
    #[must_use]
    fn edit_table(self, f: impl FnOnce(&mut TableRef)) -> Self;

    /// `USE INDEX [FOR ...] (indexes)`; no indexes means "use none".
    #[must_use]
    fn use_index<I, S>(self, indexes: I, for_: Option<IndexHintFor>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hint = index_hint(IndexHintKind::Use, for_, indexes);
        self.edit_table(|t| t.append_index_hint(hint))
    }

    /// `FORCE INDEX [FOR ...] (indexes)`.
    #[must_use]
    fn force_index<I, S>(self, indexes: I, for_: Option<IndexHintFor>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hint = index_hint(IndexHintKind::Force, for_, indexes);
        self.edit_table(|t| t.append_index_hint(hint))
    }

    /// `IGNORE INDEX [FOR ...] (indexes)`.
    #[must_use]
    fn ignore_index<I, S>(self, indexes: I, for_: Option<IndexHintFor>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hint = index_hint(IndexHintKind::Ignore, for_, indexes);
        self.edit_table(|t| t.append_index_hint(hint))
    }

    /// `PARTITION (names)`.
    #[must_use]
    fn partition<I, S>(self, partitions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let partitions: Vec<String> = partitions.into_iter().map(Into::into).collect();
        self.edit_table(|t| t.append_partitions(partitions))
    }
}

impl IndexHints for FromChain {
    fn edit_table(self, f: impl FnOnce(&mut TableRef)) -> Self {
        self.with_table(f)
    }
}

impl IndexHints for JoinChain {
    fn edit_table(self, f: impl FnOnce(&mut TableRef)) -> Self {
        self.with_table(f)
    }
}

#[cfg(test)]
mod tests {
    use quarry_core::query::Query;

    use super::*;
    use crate::sm;

    fn sql(q: &impl Query) -> String {
        let (sql, _) = q.build().unwrap();
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_index_hints_in_order() {
        let q = crate::select()
            .apply(
                sm::from("t1")
                    .as_("a")
                    .use_index(["i1", "i2"], Some(IndexHintFor::OrderBy))
                    .ignore_index(["i3"], None),
            )
            .apply(sm::inner_join("t2").force_index(["i4"], Some(IndexHintFor::Join)).on("a.id = t2.id"));
        assert_eq!(
            sql(&q),
            "SELECT * FROM t1 AS `a` USE INDEX FOR ORDER BY (`i1`, `i2`) IGNORE INDEX (`i3`) \
             INNER JOIN t2 FORCE INDEX FOR JOIN (`i4`) ON a.id = t2.id"
        );
    }

    #[test]
    fn test_partition_selection() {
        let q = crate::select().apply(sm::from("t").partition(["p0", "p1"]));
        assert_eq!(sql(&q), "SELECT * FROM t PARTITION (`p0`, `p1`)");
    }
}
