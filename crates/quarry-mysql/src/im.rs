//! `INSERT` modifiers, including `ON DUPLICATE KEY UPDATE` and row aliases.

use quarry_core::clause::{assign, Set};
use quarry_core::expr::{func, quote};
use quarry_core::expression::{Expr, IntoExpr};
use quarry_core::query::{InsertQuery, Modifier};

pub use quarry_core::mods::im::*;

/// `LOW_PRIORITY`.
#[must_use]
pub fn low_priority() -> impl Modifier<InsertQuery> + Clone {
    modifier("LOW_PRIORITY")
}

/// `HIGH_PRIORITY`.
#[must_use]
pub fn high_priority() -> impl Modifier<InsertQuery> + Clone {
    modifier("HIGH_PRIORITY")
}

/// `IGNORE`: rows that would cause errors are dropped with a warning.
#[must_use]
pub fn ignore() -> impl Modifier<InsertQuery> + Clone {
    modifier("IGNORE")
}

/// `PARTITION (names)` after the target table.
pub fn partition<I, S>(partitions: I) -> impl Modifier<InsertQuery> + Clone
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let partitions: Vec<String> = partitions.into_iter().map(Into::into).collect();
    move |q: &mut InsertQuery| q.partitions.extend(partitions.iter().cloned())
}

/// Row alias `AS alias[(columns)]`, for referring to the new row in
/// `ON DUPLICATE KEY UPDATE`.
pub fn as_<I, S>(alias: impl Into<String>, columns: I) -> impl Modifier<InsertQuery> + Clone
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let alias = alias.into();
    let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
    move |q: &mut InsertQuery| {
        q.row_alias = Some(alias.clone());
        q.column_aliases.clone_from(&columns);
    }
}

/// Assignments collected for `ON DUPLICATE KEY UPDATE`.
#[derive(Debug, Clone, Default)]
pub struct DuplicateKeyChain {
    set: Set,
}

/// `ON DUPLICATE KEY UPDATE`; assignments are added on the chain and appended on apply.
#[must_use]
pub fn on_duplicate_key_update() -> DuplicateKeyChain {
    DuplicateKeyChain::default()
}

impl DuplicateKeyChain {
    /// Adds hand-written assignments.
    #[must_use]
    pub fn update(mut self, items: impl IntoIterator<Item = Expr>) -> Self {
        self.set.append_set(items);
        self
    }

    /// `"column" = value`.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl IntoExpr) -> Self {
        self.set.append_set([assign(column, value).into_expr()]);
        self
    }

    /// `"column" = alias."column"` for each column, reading the row alias.
    #[must_use]
    pub fn update_with_alias<I, S>(mut self, alias: impl AsRef<str>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column = column.into();
            let value = quote([alias.as_ref(), column.as_str()]);
            self.set.append_set([assign(column, value).into_expr()]);
        }
        self
    }

    /// `"column" = VALUES("column")` for each column.
    #[must_use]
    pub fn update_with_values<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column = column.into();
            let value = func("VALUES", [quote([column.as_str()]).into_expr()]);
            self.set.append_set([assign(column, value).into_expr()]);
        }
        self
    }
}

impl Modifier<InsertQuery> for DuplicateKeyChain {
    fn apply(&self, query: &mut InsertQuery) {
        query
            .duplicate_key_update
            .set
            .append_set(self.set.items.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use quarry_core::expr::arg;
    use quarry_core::query::Query;

    use super::*;

    fn sql(q: &InsertQuery) -> String {
        let (sql, _) = q.build().unwrap();
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_ignore_and_partition() {
        let q = crate::insert()
            .apply(ignore())
            .apply(low_priority())
            .apply(into("t", ["a"]))
            .apply(partition(["p1"]))
            .apply(values([arg([1]).into_expr()]));
        assert_eq!(
            sql(&q),
            "INSERT IGNORE LOW_PRIORITY INTO t PARTITION (`p1`) (`a`) VALUES (?)"
        );
    }

    #[test]
    fn test_update_with_values_and_alias() {
        let q = crate::insert()
            .apply(into("t", ["a", "b"]))
            .apply(values([arg([1]).into_expr(), arg([2]).into_expr()]))
            .apply(as_("new", ["x", "y"]))
            .apply(
                on_duplicate_key_update()
                    .update_with_values(["a"])
                    .update_with_alias("new", ["b"]),
            );
        assert_eq!(
            sql(&q),
            "INSERT INTO t (`a`, `b`) VALUES (?, ?) AS new(x, y) \
             ON DUPLICATE KEY UPDATE `a` = VALUES(`a`), `b` = `new`.`b`"
        );
    }

    #[test]
    fn test_set_form() {
        let q = crate::insert()
            .apply(into("t", Vec::<String>::new()))
            .apply(set("a", arg([1])))
            .apply(set("b", arg([2])));
        let (sql, args) = q.build().unwrap();
        assert_eq!(
            sql.split_whitespace().collect::<Vec<_>>().join(" "),
            "INSERT INTO t SET `a` = ?, `b` = ?"
        );
        assert_eq!(args.len(), 2);
    }
}
