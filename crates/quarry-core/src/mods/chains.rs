//! Chain builders: fluent values that become modifiers.

use std::sync::Arc;

use super::{HasFrom, HasJoins, HasOrderBy, HasWith};
use crate::clause::{
    assign, ConflictAction, ConflictTarget, Cte, CteCycle, CteSearch, Direction, Frame,
    FrameBound, FrameExclusion, FrameMode, Join, JoinKind, Lock, LockStrength, LockWait, Nulls,
    OnConflict, OrderDef, SearchOrder, TableRef, WindowDef,
};
use crate::expr::quote;
use crate::expression::{raw, Expr, IntoExpr};
use crate::query::{InsertQuery, Modifier, Query, SelectQuery};

/// An `ORDER BY` item under construction.
#[derive(Debug, Clone)]
pub struct OrderChain {
    def: OrderDef,
}

/// Starts an order item for `e`.
pub fn order_by(e: impl IntoExpr) -> OrderChain {
    OrderChain {
        def: OrderDef::new(e.into_expr()),
    }
}

impl OrderChain {
    /// `ASC`.
    #[must_use]
    pub fn asc(mut self) -> Self {
        self.def.direction = Some(Direction::Asc);
        self
    }

    /// `DESC`.
    #[must_use]
    pub fn desc(mut self) -> Self {
        self.def.direction = Some(Direction::Desc);
        self
    }

    /// `USING op`.
    #[must_use]
    pub fn using(mut self, op: impl Into<String>) -> Self {
        self.def.direction = Some(Direction::Using(op.into()));
        self
    }

    /// `NULLS FIRST`.
    #[must_use]
    pub const fn nulls_first(mut self) -> Self {
        self.def.nulls = Some(Nulls::First);
        self
    }

    /// `NULLS LAST`.
    #[must_use]
    pub const fn nulls_last(mut self) -> Self {
        self.def.nulls = Some(Nulls::Last);
        self
    }

    /// `COLLATE collation`.
    #[must_use]
    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.def.collation = Some(collation.into());
        self
    }

    /// The finished item.
    #[must_use]
    pub fn into_def(self) -> OrderDef {
        self.def
    }
}

impl<Q: HasOrderBy> Modifier<Q> for OrderChain {
    fn apply(&self, query: &mut Q) {
        query.order_by_mut().append_order(self.def.clone());
    }
}

/// A `FROM` item under construction.
#[derive(Debug, Clone)]
pub struct FromChain {
    table: TableRef,
}

/// Starts a `FROM` item.
pub fn from(e: impl IntoExpr) -> FromChain {
    FromChain {
        table: TableRef::new(e.into_expr()),
    }
}

impl FromChain {
    /// `AS alias`.
    #[must_use]
    pub fn as_(mut self, alias: impl Into<String>) -> Self {
        self.table.alias = Some(alias.into());
        self
    }

    /// Column aliases.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// `ONLY`.
    #[must_use]
    pub const fn only(mut self) -> Self {
        self.table.only = true;
        self
    }

    /// `LATERAL`.
    #[must_use]
    pub const fn lateral(mut self) -> Self {
        self.table.lateral = true;
        self
    }

    /// `WITH ORDINALITY`.
    #[must_use]
    pub const fn with_ordinality(mut self) -> Self {
        self.table.with_ordinality = true;
        self
    }

    /// Edits the table reference directly; used by dialect extensions.
    #[must_use]
    pub fn with_table(mut self, f: impl FnOnce(&mut TableRef)) -> Self {
        f(&mut self.table);
        self
    }
}

impl<Q: HasFrom> Modifier<Q> for FromChain {
    fn apply(&self, query: &mut Q) {
        let target = query.from_mut();
        let joins = std::mem::take(&mut target.joins);
        *target = self.table.clone();
        target.joins.extend(joins);
    }
}

/// A join under construction.
#[derive(Debug, Clone)]
pub struct JoinChain {
    join: Join,
}

fn join(kind: JoinKind, to: impl IntoExpr) -> JoinChain {
    JoinChain {
        join: Join::new(kind, TableRef::new(to.into_expr())),
    }
}

/// `INNER JOIN to`.
pub fn inner_join(to: impl IntoExpr) -> JoinChain {
    join(JoinKind::Inner, to)
}

/// `LEFT JOIN to`.
pub fn left_join(to: impl IntoExpr) -> JoinChain {
    join(JoinKind::Left, to)
}

/// `RIGHT JOIN to`.
pub fn right_join(to: impl IntoExpr) -> JoinChain {
    join(JoinKind::Right, to)
}

/// `FULL JOIN to`.
pub fn full_join(to: impl IntoExpr) -> JoinChain {
    join(JoinKind::Full, to)
}

/// `CROSS JOIN to`.
pub fn cross_join(to: impl IntoExpr) -> JoinChain {
    join(JoinKind::Cross, to)
}

/// `STRAIGHT_JOIN to`.
pub fn straight_join(to: impl IntoExpr) -> JoinChain {
    join(JoinKind::Straight, to)
}

impl JoinChain {
    /// `AS alias` on the joined table.
    #[must_use]
    pub fn as_(mut self, alias: impl Into<String>) -> Self {
        self.join.to.alias = Some(alias.into());
        self
    }

    /// `NATURAL`.
    #[must_use]
    pub const fn natural(mut self) -> Self {
        self.join.natural = true;
        self
    }

    /// `LATERAL` on the joined table.
    #[must_use]
    pub const fn lateral(mut self) -> Self {
        self.join.to.lateral = true;
        self
    }

    /// Adds an `ON` condition.
    #[must_use]
    pub fn on(mut self, condition: impl IntoExpr) -> Self {
        self.join.on.push(condition.into_expr());
        self
    }

    /// Adds `USING` columns.
    #[must_use]
    pub fn using<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.join.using.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Edits the joined table reference directly; used by dialect extensions.
    #[must_use]
    pub fn with_table(mut self, f: impl FnOnce(&mut TableRef)) -> Self {
        f(&mut self.join.to);
        self
    }
}

impl<Q: HasJoins> Modifier<Q> for JoinChain {
    fn apply(&self, query: &mut Q) {
        query.joins_mut().append_join(self.join.clone());
    }
}

/// A common table expression under construction.
#[derive(Debug, Clone)]
pub struct CteChain {
    cte: Cte,
    recursive: bool,
}

/// Starts a CTE named `name`.
pub fn with(name: impl Into<String>) -> CteChain {
    CteChain {
        cte: Cte::new(name),
        recursive: false,
    }
}

impl CteChain {
    /// Column names.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cte.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// The body.
    #[must_use]
    pub fn as_(mut self, query: impl Query + 'static) -> Self {
        self.cte.query = Some(Arc::new(query));
        self
    }

    /// Marks the whole `WITH` as `RECURSIVE`.
    #[must_use]
    pub const fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// `MATERIALIZED`.
    #[must_use]
    pub const fn materialized(mut self) -> Self {
        self.cte.materialized = Some(true);
        self
    }

    /// `NOT MATERIALIZED`.
    #[must_use]
    pub const fn not_materialized(mut self) -> Self {
        self.cte.materialized = Some(false);
        self
    }

    fn search(mut self, order: SearchOrder, columns: Vec<String>, set: String) -> Self {
        self.cte.search = Some(CteSearch {
            order,
            columns,
            set,
        });
        self
    }

    /// `SEARCH BREADTH FIRST BY columns SET set`.
    #[must_use]
    pub fn search_breadth<I, S>(self, columns: I, set: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        self.search(SearchOrder::Breadth, columns, set.into())
    }

    /// `SEARCH DEPTH FIRST BY columns SET set`.
    #[must_use]
    pub fn search_depth<I, S>(self, columns: I, set: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        self.search(SearchOrder::Depth, columns, set.into())
    }

    /// `CYCLE columns SET set USING using`.
    #[must_use]
    pub fn cycle<I, S>(mut self, columns: I, set: impl Into<String>, using: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cycle = self.cte.cycle.get_or_insert_with(CteCycle::default);
        cycle.columns = columns.into_iter().map(Into::into).collect();
        cycle.set = set.into();
        cycle.using = using.into();
        self
    }

    /// `TO value DEFAULT default` of the cycle mark.
    #[must_use]
    pub fn cycle_value(mut self, value: impl IntoExpr, default: impl IntoExpr) -> Self {
        let cycle = self.cte.cycle.get_or_insert_with(CteCycle::default);
        cycle.set_to = Some(value.into_expr());
        cycle.set_default = Some(default.into_expr());
        self
    }
}

impl<Q: HasWith> Modifier<Q> for CteChain {
    fn apply(&self, query: &mut Q) {
        let with = query.with_mut();
        if self.recursive {
            with.set_recursive(true);
        }
        with.append_cte(self.cte.clone());
    }
}

/// A window definition under construction, for `OVER (...)` or a named window.
///
/// Frame methods start from `RANGE UNBOUNDED PRECEDING` when no frame exists yet.
#[derive(Debug, Clone, Default)]
pub struct WindowChain {
    def: WindowDef,
}

/// Starts an empty window definition.
#[must_use]
pub fn window() -> WindowChain {
    WindowChain::default()
}

impl WindowChain {
    /// Extends the named window `base`.
    #[must_use]
    pub fn from(mut self, base: impl Into<String>) -> Self {
        self.def.from = Some(base.into());
        self
    }

    /// Adds `PARTITION BY` expressions.
    #[must_use]
    pub fn partition_by(mut self, exprs: impl IntoIterator<Item = Expr>) -> Self {
        self.def.append_partition(exprs);
        self
    }

    /// Adds an `ORDER BY` item.
    #[must_use]
    pub fn order_by(mut self, order: OrderChain) -> Self {
        self.def.append_order(order.into_def());
        self
    }

    fn frame(&mut self) -> &mut Frame {
        self.def.frame.get_or_insert_with(|| Frame {
            mode: Some(FrameMode::Range),
            start: Some(FrameBound::UnboundedPreceding),
            end: None,
            exclusion: None,
        })
    }

    /// Frame unit `RANGE`.
    #[must_use]
    pub fn range(mut self) -> Self {
        self.frame().mode = Some(FrameMode::Range);
        self
    }

    /// Frame unit `ROWS`.
    #[must_use]
    pub fn rows(mut self) -> Self {
        self.frame().mode = Some(FrameMode::Rows);
        self
    }

    /// Frame unit `GROUPS`.
    #[must_use]
    pub fn groups(mut self) -> Self {
        self.frame().mode = Some(FrameMode::Groups);
        self
    }

    /// Frame start.
    #[must_use]
    pub fn start(mut self, bound: FrameBound) -> Self {
        self.frame().start = Some(bound);
        self
    }

    /// Frame end, which switches to the `BETWEEN` form.
    #[must_use]
    pub fn end(mut self, bound: FrameBound) -> Self {
        self.frame().end = Some(bound);
        self
    }

    /// Frame start `n PRECEDING`.
    #[must_use]
    pub fn preceding(self, n: impl IntoExpr) -> Self {
        self.start(FrameBound::Preceding(n.into_expr()))
    }

    /// Frame end `CURRENT ROW`.
    #[must_use]
    pub fn to_current_row(self) -> Self {
        self.end(FrameBound::CurrentRow)
    }

    /// Frame end `n FOLLOWING`.
    #[must_use]
    pub fn following(self, n: impl IntoExpr) -> Self {
        self.end(FrameBound::Following(n.into_expr()))
    }

    /// Frame end `UNBOUNDED FOLLOWING`.
    #[must_use]
    pub fn to_unbounded_following(self) -> Self {
        self.end(FrameBound::UnboundedFollowing)
    }

    /// Frame exclusion.
    #[must_use]
    pub fn exclude(mut self, exclusion: FrameExclusion) -> Self {
        self.frame().exclusion = Some(exclusion);
        self
    }

    /// The finished definition.
    #[must_use]
    pub fn into_def(self) -> WindowDef {
        self.def
    }
}

impl From<WindowChain> for WindowDef {
    fn from(chain: WindowChain) -> Self {
        chain.def
    }
}

/// A row lock under construction.
#[derive(Debug, Clone)]
pub struct LockChain {
    lock: Lock,
}

fn lock(strength: LockStrength) -> LockChain {
    LockChain {
        lock: Lock {
            strength: Some(strength),
            tables: Vec::new(),
            wait: None,
        },
    }
}

/// `FOR UPDATE`.
#[must_use]
pub fn for_update() -> LockChain {
    lock(LockStrength::Update)
}

/// `FOR NO KEY UPDATE`.
#[must_use]
pub fn for_no_key_update() -> LockChain {
    lock(LockStrength::NoKeyUpdate)
}

/// `FOR SHARE`.
#[must_use]
pub fn for_share() -> LockChain {
    lock(LockStrength::Share)
}

/// `FOR KEY SHARE`.
#[must_use]
pub fn for_key_share() -> LockChain {
    lock(LockStrength::KeyShare)
}

impl LockChain {
    /// `OF tables`.
    #[must_use]
    pub fn of<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock.tables.extend(tables.into_iter().map(Into::into));
        self
    }

    /// `NOWAIT`.
    #[must_use]
    pub const fn nowait(mut self) -> Self {
        self.lock.wait = Some(LockWait::NoWait);
        self
    }

    /// `SKIP LOCKED`.
    #[must_use]
    pub const fn skip_locked(mut self) -> Self {
        self.lock.wait = Some(LockWait::SkipLocked);
        self
    }
}

impl Modifier<SelectQuery> for LockChain {
    fn apply(&self, query: &mut SelectQuery) {
        query.locks.push(self.lock.clone());
    }
}

/// An `ON CONFLICT` clause under construction.
#[derive(Debug, Clone, Default)]
pub struct ConflictChain {
    conflict: OnConflict,
}

/// `ON CONFLICT (columns)`; no columns leaves the target out.
pub fn on_conflict<I, S>(columns: I) -> ConflictChain
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ConflictChain {
        conflict: OnConflict {
            target: ConflictTarget {
                columns: columns.into_iter().map(Into::into).collect(),
                ..ConflictTarget::default()
            },
            ..OnConflict::default()
        },
    }
}

/// `ON CONFLICT ON CONSTRAINT name`.
pub fn on_conflict_on_constraint(name: impl Into<String>) -> ConflictChain {
    ConflictChain {
        conflict: OnConflict {
            target: ConflictTarget {
                constraint: Some(name.into()),
                ..ConflictTarget::default()
            },
            ..OnConflict::default()
        },
    }
}

impl ConflictChain {
    /// Predicate of a partial unique index.
    #[must_use]
    pub fn where_(mut self, condition: impl IntoExpr) -> Self {
        self.conflict.target.where_.push(condition.into_expr());
        self
    }

    /// `DO NOTHING`.
    #[must_use]
    pub fn do_nothing(mut self) -> Self {
        self.conflict.action = Some(ConflictAction::Nothing);
        self
    }

    /// `DO UPDATE` with the assignments added by [`set`](Self::set) and friends.
    #[must_use]
    pub fn do_update(mut self) -> Self {
        self.conflict.action = Some(ConflictAction::Update);
        self
    }

    /// Adds `"column" = value`.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl IntoExpr) -> Self {
        self.conflict.set.append_set([assign(column, value).into_expr()]);
        self
    }

    /// Adds `"column" = EXCLUDED."column"` for each column.
    #[must_use]
    pub fn set_excluded<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column = column.into();
            let excluded = raw("EXCLUDED.?").bind_expr(quote([column.clone()]));
            self.conflict.set.append_set([assign(column, excluded).into_expr()]);
        }
        self
    }

    /// Condition of `DO UPDATE`.
    #[must_use]
    pub fn update_where(mut self, condition: impl IntoExpr) -> Self {
        self.conflict.where_.append_where(condition.into_expr());
        self
    }

    /// The finished clause.
    #[must_use]
    pub fn into_clause(self) -> OnConflict {
        self.conflict
    }
}

impl Modifier<InsertQuery> for ConflictChain {
    fn apply(&self, query: &mut InsertQuery) {
        query.conflict = Some(self.conflict.clone());
    }
}
