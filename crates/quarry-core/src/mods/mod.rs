//! Modifiers.
//!
//! Generic modifiers work on any query that has the clause they touch, expressed through the
//! `Has*` traits. Query-specific modifiers live in [`sm`], [`im`], [`um`], [`dm`] and [`vm`],
//! which also re-export the generic ones that apply.
//!
//! ```rust
//! use quarry_core::dialect::MYSQL;
//! use quarry_core::mods::sm;
//! use quarry_core::query::{Query, SelectQuery};
//!
//! let q = SelectQuery::new(&MYSQL)
//!     .apply(sm::columns(["id".into(), "name".into()]))
//!     .apply(sm::from("users"))
//!     .apply(sm::order_by("id").desc());
//! let (sql, _) = q.build().unwrap();
//! assert_eq!(sql, "SELECT id, name\nFROM users\nORDER BY id DESC");
//! ```

mod chains;

use std::sync::Arc;

pub use chains::{
    cross_join, for_key_share, for_no_key_update, for_share, for_update, from, full_join,
    inner_join, left_join, on_conflict, on_conflict_on_constraint, order_by, right_join,
    straight_join, window, with, ConflictChain, CteChain, FromChain, JoinChain, LockChain,
    OrderChain, WindowChain,
};

use crate::clause::{
    Hints, Limit, Modifiers, OrderBy, Returning, TableRef, Where, With,
};
use crate::expression::{Expr, IntoExpr};
use crate::query::{DeleteQuery, InsertQuery, Modifier, SelectQuery, UpdateQuery, ValuesQuery};

/// Queries with a `WITH` clause.
pub trait HasWith {
    /// The `WITH` clause.
    fn with_mut(&mut self) -> &mut With;
}

/// Queries with a `WHERE` clause.
pub trait HasWhere {
    /// The `WHERE` clause.
    fn where_mut(&mut self) -> &mut Where;
}

/// Queries with an `ORDER BY` clause.
pub trait HasOrderBy {
    /// The `ORDER BY` clause.
    fn order_by_mut(&mut self) -> &mut OrderBy;
}

/// Queries with a `LIMIT` clause.
pub trait HasLimit {
    /// The `LIMIT` clause.
    fn limit_mut(&mut self) -> &mut Limit;
}

/// Queries with a `RETURNING` clause.
pub trait HasReturning {
    /// The `RETURNING` clause.
    fn returning_mut(&mut self) -> &mut Returning;
}

/// Queries with optimizer hints.
pub trait HasHints {
    /// The hints.
    fn hints_mut(&mut self) -> &mut Hints;
}

/// Queries with keywords after the statement keyword.
pub trait HasModifiers {
    /// The modifiers.
    fn modifiers_mut(&mut self) -> &mut Modifiers;
}

/// Queries with a `FROM` item (`USING` for deletes).
pub trait HasFrom {
    /// The `FROM` table reference.
    fn from_mut(&mut self) -> &mut TableRef;
}

/// Queries that can join tables.
pub trait HasJoins {
    /// The table reference joins hang off.
    fn joins_mut(&mut self) -> &mut TableRef;
}

macro_rules! impl_has {
    ($trait:ident, $method:ident -> $clause:ty, $field:ident: $($ty:ty),+) => {
        $(
            impl $trait for $ty {
                fn $method(&mut self) -> &mut $clause {
                    &mut self.$field
                }
            }
        )+
    };
}

impl_has!(HasWith, with_mut -> With, with: SelectQuery, InsertQuery, UpdateQuery, DeleteQuery);
impl_has!(HasWhere, where_mut -> Where, where_: SelectQuery, UpdateQuery, DeleteQuery);
impl_has!(HasOrderBy, order_by_mut -> OrderBy, order_by: SelectQuery, UpdateQuery, DeleteQuery, ValuesQuery);
impl_has!(HasLimit, limit_mut -> Limit, limit: SelectQuery, UpdateQuery, DeleteQuery, ValuesQuery);
impl_has!(HasReturning, returning_mut -> Returning, returning: InsertQuery, UpdateQuery, DeleteQuery);
impl_has!(HasHints, hints_mut -> Hints, hints: SelectQuery, InsertQuery, UpdateQuery, DeleteQuery);
impl_has!(HasModifiers, modifiers_mut -> Modifiers, modifiers: SelectQuery, InsertQuery, UpdateQuery, DeleteQuery);
impl_has!(HasFrom, from_mut -> TableRef, table: SelectQuery);
impl_has!(HasFrom, from_mut -> TableRef, from: UpdateQuery);
impl_has!(HasFrom, from_mut -> TableRef, using: DeleteQuery);
impl_has!(HasJoins, joins_mut -> TableRef, table: SelectQuery, UpdateQuery);
impl_has!(HasJoins, joins_mut -> TableRef, using: DeleteQuery);

/// Adds a `WHERE` condition.
pub fn where_<Q: HasWhere>(condition: impl IntoExpr) -> impl Modifier<Q> + Clone {
    let condition = condition.into_expr();
    move |q: &mut Q| q.where_mut().append_where(condition.clone())
}

/// Sets `LIMIT`.
pub fn limit<Q: HasLimit>(count: impl IntoExpr) -> impl Modifier<Q> + Clone {
    let count = count.into_expr();
    move |q: &mut Q| q.limit_mut().set_limit(count.clone())
}

/// Adds `RETURNING` expressions.
pub fn returning<Q: HasReturning>(exprs: impl IntoIterator<Item = Expr>) -> impl Modifier<Q> + Clone {
    let exprs: Vec<Expr> = exprs.into_iter().collect();
    move |q: &mut Q| q.returning_mut().append_returning(exprs.iter().cloned())
}

/// Adds an optimizer hint.
pub fn hint<Q: HasHints>(hint: impl Into<String>) -> impl Modifier<Q> + Clone {
    let hint = hint.into();
    move |q: &mut Q| q.hints_mut().append_hint(hint.clone())
}

/// Adds a statement modifier such as `LOW_PRIORITY`.
pub fn modifier<Q: HasModifiers>(modifier: impl Into<String>) -> impl Modifier<Q> + Clone {
    let modifier = modifier.into();
    move |q: &mut Q| q.modifiers_mut().append_modifier(modifier.clone())
}

/// Sets the `RECURSIVE` flag of `WITH`.
pub fn recursive<Q: HasWith>(recursive: bool) -> impl Modifier<Q> + Clone {
    move |q: &mut Q| q.with_mut().set_recursive(recursive)
}

/// `SELECT` modifiers.
pub mod sm {
    use super::{Arc, Expr, IntoExpr, Modifier, SelectQuery};
    use crate::clause::{Combine, Distinct, GroupingSuffix, NamedWindow, SetOp};
    use crate::query::Query;

    pub use super::{
        cross_join, for_key_share, for_no_key_update, for_share, for_update, from, full_join,
        hint, inner_join, left_join, limit, modifier, order_by, recursive, right_join,
        straight_join, where_, window, with, OrderChain, WindowChain,
    };

    /// Adds selected columns.
    pub fn columns(exprs: impl IntoIterator<Item = Expr>) -> impl Modifier<SelectQuery> + Clone {
        let exprs: Vec<Expr> = exprs.into_iter().collect();
        move |q: &mut SelectQuery| q.select_list.append_columns(exprs.iter().cloned())
    }

    /// `DISTINCT`.
    #[must_use]
    pub fn distinct() -> impl Modifier<SelectQuery> + Clone {
        |q: &mut SelectQuery| q.distinct = Some(Distinct::default())
    }

    /// `DISTINCT ON (exprs)`.
    pub fn distinct_on(exprs: impl IntoIterator<Item = Expr>) -> impl Modifier<SelectQuery> + Clone {
        let on: Vec<Expr> = exprs.into_iter().collect();
        move |q: &mut SelectQuery| q.distinct = Some(Distinct { on: on.clone() })
    }

    /// Adds a `GROUP BY` expression.
    pub fn group_by(e: impl IntoExpr) -> impl Modifier<SelectQuery> + Clone {
        let e = e.into_expr();
        move |q: &mut SelectQuery| q.group_by.append_group(e.clone())
    }

    /// `GROUP BY DISTINCT`.
    #[must_use]
    pub fn group_by_distinct() -> impl Modifier<SelectQuery> + Clone {
        |q: &mut SelectQuery| q.group_by.distinct = true
    }

    /// `WITH ROLLUP`.
    #[must_use]
    pub fn with_rollup() -> impl Modifier<SelectQuery> + Clone {
        |q: &mut SelectQuery| q.group_by.with = Some(GroupingSuffix::Rollup)
    }

    /// `WITH CUBE`.
    #[must_use]
    pub fn with_cube() -> impl Modifier<SelectQuery> + Clone {
        |q: &mut SelectQuery| q.group_by.with = Some(GroupingSuffix::Cube)
    }

    /// Adds a `HAVING` condition.
    pub fn having(condition: impl IntoExpr) -> impl Modifier<SelectQuery> + Clone {
        let condition = condition.into_expr();
        move |q: &mut SelectQuery| q.having.append_having(condition.clone())
    }

    /// Adds a named window.
    pub fn named_window(name: impl Into<String>, definition: WindowChain) -> impl Modifier<SelectQuery> + Clone {
        let window = NamedWindow {
            name: name.into(),
            definition: definition.into_def(),
        };
        move |q: &mut SelectQuery| q.windows.append_window(window.clone())
    }

    /// Sets `OFFSET`.
    pub fn offset(count: impl IntoExpr) -> impl Modifier<SelectQuery> + Clone {
        let count = count.into_expr();
        move |q: &mut SelectQuery| q.offset.set_offset(count.clone())
    }

    /// Sets `FETCH NEXT count ROWS ONLY`, or `WITH TIES`.
    pub fn fetch(count: impl IntoExpr, with_ties: bool) -> impl Modifier<SelectQuery> + Clone {
        let count = count.into_expr();
        move |q: &mut SelectQuery| {
            q.fetch.count = Some(count.clone());
            q.fetch.with_ties = with_ties;
        }
    }

    fn combine(strategy: SetOp, all: bool, query: impl Query + 'static) -> impl Modifier<SelectQuery> + Clone {
        let query: Arc<dyn Query> = Arc::new(query);
        move |q: &mut SelectQuery| {
            q.combines.push(Combine {
                strategy: Some(strategy),
                all,
                query: Arc::clone(&query),
            });
        }
    }

    /// `UNION query`.
    pub fn union(query: impl Query + 'static) -> impl Modifier<SelectQuery> + Clone {
        combine(SetOp::Union, false, query)
    }

    /// `UNION ALL query`.
    pub fn union_all(query: impl Query + 'static) -> impl Modifier<SelectQuery> + Clone {
        combine(SetOp::Union, true, query)
    }

    /// `INTERSECT query`.
    pub fn intersect(query: impl Query + 'static) -> impl Modifier<SelectQuery> + Clone {
        combine(SetOp::Intersect, false, query)
    }

    /// `INTERSECT ALL query`.
    pub fn intersect_all(query: impl Query + 'static) -> impl Modifier<SelectQuery> + Clone {
        combine(SetOp::Intersect, true, query)
    }

    /// `EXCEPT query`.
    pub fn except(query: impl Query + 'static) -> impl Modifier<SelectQuery> + Clone {
        combine(SetOp::Except, false, query)
    }

    /// `EXCEPT ALL query`.
    pub fn except_all(query: impl Query + 'static) -> impl Modifier<SelectQuery> + Clone {
        combine(SetOp::Except, true, query)
    }

    /// Adds an `ORDER BY` item applied to the combined result.
    #[must_use]
    pub fn order_combined(order: OrderChain) -> impl Modifier<SelectQuery> + Clone {
        let def = order.into_def();
        move |q: &mut SelectQuery| q.combined_order.append_order(def.clone())
    }

    /// Sets the `LIMIT` of the combined result.
    pub fn limit_combined(count: impl IntoExpr) -> impl Modifier<SelectQuery> + Clone {
        let count = count.into_expr();
        move |q: &mut SelectQuery| q.combined_limit.set_limit(count.clone())
    }

    /// Sets the `OFFSET` of the combined result.
    pub fn offset_combined(count: impl IntoExpr) -> impl Modifier<SelectQuery> + Clone {
        let count = count.into_expr();
        move |q: &mut SelectQuery| q.combined_offset.set_offset(count.clone())
    }
}

/// `INSERT` modifiers.
pub mod im {
    use super::{Arc, Expr, IntoExpr, InsertQuery, Modifier};
    use crate::clause::assign;
    use crate::query::Query;

    pub use super::{
        hint, modifier, on_conflict, on_conflict_on_constraint, recursive, returning, with,
        ConflictChain,
    };

    /// `INTO table (columns)`.
    pub fn into<I, S>(table: impl IntoExpr, columns: I) -> impl Modifier<InsertQuery> + Clone
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = table.into_expr();
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        move |q: &mut InsertQuery| {
            q.table = Some(table.clone());
            q.columns.clone_from(&columns);
        }
    }

    /// `INTO table AS alias (columns)`.
    pub fn into_as<I, S>(
        table: impl IntoExpr,
        alias: impl Into<String>,
        columns: I,
    ) -> impl Modifier<InsertQuery> + Clone
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let into = into(table, columns);
        let alias = alias.into();
        move |q: &mut InsertQuery| {
            into.apply(q);
            q.alias = Some(alias.clone());
        }
    }

    /// Adds one row of values.
    pub fn values(row: impl IntoIterator<Item = Expr>) -> impl Modifier<InsertQuery> + Clone {
        let row: Vec<Expr> = row.into_iter().collect();
        move |q: &mut InsertQuery| q.values.append_row(row.clone())
    }

    /// Inserts the rows of `query`.
    pub fn query(query: impl Query + 'static) -> impl Modifier<InsertQuery> + Clone {
        let query: Arc<dyn Query> = Arc::new(query);
        move |q: &mut InsertQuery| q.values.query = Some(Arc::clone(&query))
    }

    /// Adds `column = value` to the `SET` form.
    pub fn set(column: impl Into<String>, value: impl IntoExpr) -> impl Modifier<InsertQuery> + Clone {
        let item = assign(column, value).into_expr();
        move |q: &mut InsertQuery| q.sets.append_set([item.clone()])
    }
}

/// `UPDATE` modifiers.
pub mod um {
    use super::{Expr, IntoExpr, Modifier, UpdateQuery};
    use crate::clause::assign;

    pub use super::{
        cross_join, from, full_join, hint, inner_join, left_join, limit, modifier, order_by,
        recursive, returning, right_join, straight_join, where_, with,
    };

    /// Sets the target table.
    pub fn table(table: impl IntoExpr) -> impl Modifier<UpdateQuery> + Clone {
        let table = table.into_expr();
        move |q: &mut UpdateQuery| q.table.expression = Some(table.clone())
    }

    /// Sets the target table with an alias.
    pub fn table_as(table: impl IntoExpr, alias: impl Into<String>) -> impl Modifier<UpdateQuery> + Clone {
        let table = table.into_expr();
        let alias = alias.into();
        move |q: &mut UpdateQuery| {
            q.table.expression = Some(table.clone());
            q.table.alias = Some(alias.clone());
        }
    }

    /// Adds `"column" = value`.
    pub fn set(column: impl Into<String>, value: impl IntoExpr) -> impl Modifier<UpdateQuery> + Clone {
        let item = assign(column, value).into_expr();
        move |q: &mut UpdateQuery| q.set.append_set([item.clone()])
    }

    /// Adds an assignment written by hand.
    pub fn set_expr(items: impl IntoIterator<Item = Expr>) -> impl Modifier<UpdateQuery> + Clone {
        let items: Vec<Expr> = items.into_iter().collect();
        move |q: &mut UpdateQuery| q.set.append_set(items.iter().cloned())
    }
}

/// `DELETE` modifiers.
pub mod dm {
    use super::{DeleteQuery, IntoExpr, Modifier};
    use crate::clause::TableRef;

    pub use super::{
        cross_join, full_join, hint, inner_join, left_join, limit, modifier, order_by, recursive,
        returning, right_join, straight_join, where_, with,
    };

    /// Adds a table to delete from.
    pub fn from(table: impl IntoExpr) -> impl Modifier<DeleteQuery> + Clone {
        let table = TableRef::new(table.into_expr());
        move |q: &mut DeleteQuery| q.tables.push(table.clone())
    }

    /// Adds an aliased table to delete from.
    pub fn from_as(table: impl IntoExpr, alias: impl Into<String>) -> impl Modifier<DeleteQuery> + Clone {
        let mut table = TableRef::new(table.into_expr());
        table.alias = Some(alias.into());
        move |q: &mut DeleteQuery| q.tables.push(table.clone())
    }

    /// `USING table`; joins added afterwards attach to it.
    pub fn using(table: impl IntoExpr) -> super::FromChain {
        super::from(table)
    }
}

/// Standalone `VALUES` modifiers.
pub mod vm {
    use super::{Expr, Modifier, ValuesQuery};

    pub use super::{limit, order_by};

    /// Adds one row.
    pub fn row(values: impl IntoIterator<Item = Expr>) -> impl Modifier<ValuesQuery> + Clone {
        let row: Vec<Expr> = values.into_iter().collect();
        move |q: &mut ValuesQuery| q.values.append_row(row.clone())
    }
}
