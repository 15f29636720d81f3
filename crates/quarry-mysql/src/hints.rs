//! [Optimizer hints](https://dev.mysql.com/doc/refman/8.0/en/optimizer-hints.html).
//!
//! Every hint works on any statement that carries hints. Hints are collected in order
//! and written as one `/*+ ... */` block after the statement keyword.

use quarry_core::mods::{hint, HasHints};
use quarry_core::query::Modifier;

fn list<I, S>(tables: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tables.into_iter().map(Into::into).collect::<Vec<_>>().join(", ")
}

macro_rules! table_hints {
    ($($(#[$doc:meta])* $name:ident => $keyword:literal;)+) => {
        $(
            $(#[$doc])*
            pub fn $name<Q, I, S>(tables: I) -> impl Modifier<Q> + Clone
            where
                Q: HasHints,
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                hint(format!(concat!($keyword, "({})"), list(tables)))
            }
        )+
    };
}

/// `QB_NAME(name)`.
pub fn qb_name<Q: HasHints>(name: impl AsRef<str>) -> impl Modifier<Q> + Clone {
    hint(format!("QB_NAME({})", name.as_ref()))
}

/// `SET_VAR(statement)`.
pub fn set_var<Q: HasHints>(statement: impl AsRef<str>) -> impl Modifier<Q> + Clone {
    hint(format!("SET_VAR({})", statement.as_ref()))
}

/// `MAX_EXECUTION_TIME(ms)`.
#[must_use]
pub fn max_execution_time<Q: HasHints>(ms: u64) -> impl Modifier<Q> + Clone {
    hint(format!("MAX_EXECUTION_TIME({ms})"))
}

/// `RESOURCE_GROUP(name)`.
pub fn resource_group<Q: HasHints>(name: impl AsRef<str>) -> impl Modifier<Q> + Clone {
    hint(format!("RESOURCE_GROUP({})", name.as_ref()))
}

/// `SUBQUERY(strategy)`.
pub fn subquery<Q: HasHints>(strategy: impl AsRef<str>) -> impl Modifier<Q> + Clone {
    hint(format!("SUBQUERY({})", strategy.as_ref()))
}

/// `JOIN_FIXED_ORDER(query block)`.
pub fn join_fixed_order<Q: HasHints>(name: impl AsRef<str>) -> impl Modifier<Q> + Clone {
    hint(format!("JOIN_FIXED_ORDER({})", name.as_ref()))
}

table_hints! {
    /// `BKA(tables)`.
    bka => "BKA";
    /// `NO_BKA(tables)`.
    no_bka => "NO_BKA";
    /// `BNL(tables)`.
    bnl => "BNL";
    /// `NO_BNL(tables)`.
    no_bnl => "NO_BNL";
    /// `DERIVED_CONDITION_PUSHDOWN(tables)`.
    derived_condition_pushdown => "DERIVED_CONDITION_PUSHDOWN";
    /// `NO_DERIVED_CONDITION_PUSHDOWN(tables)`.
    no_derived_condition_pushdown => "NO_DERIVED_CONDITION_PUSHDOWN";
    /// `HASH_JOIN(tables)`.
    hash_join => "HASH_JOIN";
    /// `NO_HASH_JOIN(tables)`.
    no_hash_join => "NO_HASH_JOIN";
    /// `MERGE(tables)`.
    merge => "MERGE";
    /// `NO_MERGE(tables)`.
    no_merge => "NO_MERGE";
    /// `INDEX(table indexes)`.
    index => "INDEX";
    /// `NO_INDEX(table indexes)`.
    no_index => "NO_INDEX";
    /// `GROUP_INDEX(table indexes)`.
    group_index => "GROUP_INDEX";
    /// `NO_GROUP_INDEX(table indexes)`.
    no_group_index => "NO_GROUP_INDEX";
    /// `JOIN_INDEX(table indexes)`.
    join_index => "JOIN_INDEX";
    /// `NO_JOIN_INDEX(table indexes)`.
    no_join_index => "NO_JOIN_INDEX";
    /// `ORDER_INDEX(table indexes)`.
    order_index => "ORDER_INDEX";
    /// `NO_ORDER_INDEX(table indexes)`.
    no_order_index => "NO_ORDER_INDEX";
    /// `INDEX_MERGE(table indexes)`.
    index_merge => "INDEX_MERGE";
    /// `NO_INDEX_MERGE(table indexes)`.
    no_index_merge => "NO_INDEX_MERGE";
    /// `MRR(table indexes)`.
    mrr => "MRR";
    /// `NO_MRR(table indexes)`.
    no_mrr => "NO_MRR";
    /// `NO_ICP(table indexes)`.
    no_icp => "NO_ICP";
    /// `NO_RANGE_OPTIMIZATION(table indexes)`.
    no_range_optimization => "NO_RANGE_OPTIMIZATION";
    /// `SKIP_SCAN(table indexes)`.
    skip_scan => "SKIP_SCAN";
    /// `NO_SKIP_SCAN(table indexes)`.
    no_skip_scan => "NO_SKIP_SCAN";
    /// `SEMIJOIN(strategies)`.
    semijoin => "SEMIJOIN";
    /// `NO_SEMIJOIN(strategies)`.
    no_semijoin => "NO_SEMIJOIN";
    /// `JOIN_ORDER(tables)`.
    join_order => "JOIN_ORDER";
    /// `JOIN_PREFIX(tables)`.
    join_prefix => "JOIN_PREFIX";
    /// `JOIN_SUFFIX(tables)`.
    join_suffix => "JOIN_SUFFIX";
}

#[cfg(test)]
mod tests {
    use quarry_core::query::{Query, SelectQuery, UpdateQuery};

    use super::*;
    use crate::{sm, um};

    #[test]
    fn test_hints_share_one_block() {
        let q: SelectQuery = crate::select()
            .apply(max_execution_time(500))
            .apply(bka(["t1", "t2"]))
            .apply(qb_name("qb1"))
            .apply(sm::from("t1"));
        let (sql, _) = q.build().unwrap();
        assert!(sql.starts_with(
            "SELECT /*+ MAX_EXECUTION_TIME(500)\n    BKA(t1, t2)\n    QB_NAME(qb1) */ *"
        ));
    }

    #[test]
    fn test_hints_on_update() {
        let q: UpdateQuery = crate::update()
            .apply(no_range_optimization(["t", "idx_a"]))
            .apply(um::table("t"))
            .apply(um::set("a", "1"));
        let (sql, _) = q.build().unwrap();
        assert!(sql.starts_with("UPDATE /*+ NO_RANGE_OPTIMIZATION(t, idx_a) */ t SET"));
    }
}
