//! # quarry-sqlite
//!
//! SQLite-specific modifiers for `quarry-core` queries.
//!
//! # How SQLite differs from other dialects
//!
//! - **Placeholders**: arguments are numbered, `?1`, `?2`, ..., and named arguments are
//!   written as `:name`. See [binding parameters].
//! - **[UPSERT]**: `INSERT ... ON CONFLICT (target) DO NOTHING` or
//!   `DO UPDATE SET ...`, with `excluded.column` for the proposed row.
//! - **[RETURNING]** on `INSERT`, `UPDATE` and `DELETE` (since SQLite 3.35.0).
//! - **Conflict resolution**: `INSERT OR REPLACE`, `OR IGNORE` and friends, also on
//!   `UPDATE`. See [ON CONFLICT].
//! - **[INDEXED BY]**: a table reference can name the index the planner must use, or
//!   forbid indexes with `NOT INDEXED`.
//! - **Identifier quoting**: double quotes (`"`), though backticks and square brackets are
//!   accepted when parsing.
//!
//! [binding parameters]: https://www.sqlite.org/lang_expr.html#varparam
//! [UPSERT]: https://www.sqlite.org/lang_upsert.html
//! [RETURNING]: https://www.sqlite.org/lang_returning.html
//! [ON CONFLICT]: https://www.sqlite.org/lang_conflict.html
//! [INDEXED BY]: https://www.sqlite.org/lang_indexedby.html
//!
//! ## Example
//!
//! ```rust
//! use quarry_core::expr::arg;
//! use quarry_core::expression::IntoExpr;
//! use quarry_core::query::Query;
//! use quarry_sqlite::im;
//!
//! let (sql, args) = quarry_sqlite::insert()
//!     .apply(im::into("users", ["id", "name"]))
//!     .apply(im::values([arg([1]).into_expr(), arg(["Alice"]).into_expr()]))
//!     .apply(im::on_conflict(["id"]).do_update().set_excluded(["name"]))
//!     .build()
//!     .unwrap();
//! assert_eq!(
//!     sql,
//!     "INSERT INTO users (\"id\", \"name\")\nVALUES (?1, ?2)\n\
//!      ON CONFLICT (\"id\") DO UPDATE SET\n\"name\" = EXCLUDED.\"name\""
//! );
//! assert_eq!(args.len(), 2);
//! ```

pub mod dm;
pub mod im;
mod index;
pub mod sm;
pub mod um;

pub use index::Indexing;

use quarry_core::dialect::SQLITE;
use quarry_core::mods::HasModifiers;
use quarry_core::query::{
    DeleteQuery, InsertQuery, Modifier, SelectQuery, UpdateQuery, ValuesQuery,
};

/// An empty SQLite `SELECT`.
#[must_use]
pub fn select() -> SelectQuery {
    SelectQuery::new(&SQLITE)
}

/// An empty SQLite `INSERT`.
#[must_use]
pub fn insert() -> InsertQuery {
    InsertQuery::new(&SQLITE)
}

/// An empty SQLite `UPDATE`.
#[must_use]
pub fn update() -> UpdateQuery {
    UpdateQuery::new(&SQLITE)
}

/// An empty SQLite `DELETE`.
#[must_use]
pub fn delete() -> DeleteQuery {
    DeleteQuery::new(&SQLITE)
}

/// An empty SQLite `VALUES` statement.
#[must_use]
pub fn values() -> ValuesQuery {
    ValuesQuery::new(&SQLITE, false)
}

/// Conflict resolution algorithm of `INSERT OR ...` and `UPDATE OR ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrAction {
    /// `OR ABORT`, the default behaviour.
    Abort,
    /// `OR FAIL`.
    Fail,
    /// `OR IGNORE`.
    Ignore,
    /// `OR REPLACE`.
    Replace,
    /// `OR ROLLBACK`.
    Rollback,
}

impl OrAction {
    /// Returns the SQL keywords.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Abort => "OR ABORT",
            Self::Fail => "OR FAIL",
            Self::Ignore => "OR IGNORE",
            Self::Replace => "OR REPLACE",
            Self::Rollback => "OR ROLLBACK",
        }
    }
}

/// Sets the conflict resolution; a later call replaces an earlier one.
pub(crate) fn or_action<Q: HasModifiers>(action: OrAction) -> impl Modifier<Q> + Clone {
    move |q: &mut Q| {
        let modifiers = q.modifiers_mut();
        modifiers.modifiers.retain(|m| !m.starts_with("OR "));
        modifiers.append_modifier(action.as_str());
    }
}
