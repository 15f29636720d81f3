//! # quarry-mysql
//!
//! MySQL-specific modifiers for `quarry-core` queries.
//!
//! # How MySQL differs from other dialects
//!
//! - **Placeholders**: every argument is written as a bare `?`; numbering is implied by
//!   position. Named arguments are not available.
//! - **Identifier quoting**: backticks (`` ` ``), see [identifiers].
//! - **[Optimizer hints]**: `/*+ ... */` right after the statement keyword, built with the
//!   functions in [`hints`].
//! - **[Index hints]**: `USE INDEX`, `FORCE INDEX` and `IGNORE INDEX` on table references,
//!   added through [`IndexHints`].
//! - **[ON DUPLICATE KEY UPDATE]** instead of `ON CONFLICT`, optionally referring to the new
//!   row through a row alias (`INSERT ... AS new`).
//! - **[SELECT ... INTO]**: results can go to variables, a dump file or an outfile with field
//!   and line options.
//! - **Statement modifiers** such as `HIGH_PRIORITY`, `LOW_PRIORITY`, `IGNORE`, `QUICK` and
//!   `SQL_SMALL_RESULT`.
//! - **[VALUES] statements** write each row as `ROW(...)`.
//!
//! [identifiers]: https://dev.mysql.com/doc/refman/8.0/en/identifiers.html
//! [Optimizer hints]: https://dev.mysql.com/doc/refman/8.0/en/optimizer-hints.html
//! [Index hints]: https://dev.mysql.com/doc/refman/8.0/en/index-hints.html
//! [ON DUPLICATE KEY UPDATE]: https://dev.mysql.com/doc/refman/8.0/en/insert-on-duplicate.html
//! [SELECT ... INTO]: https://dev.mysql.com/doc/refman/8.0/en/select-into.html
//! [VALUES]: https://dev.mysql.com/doc/refman/8.0/en/values.html
//!
//! ## Example
//!
//! ```rust
//! use quarry_core::expr::{arg, Chain};
//! use quarry_core::expression::IntoExpr;
//! use quarry_core::query::Query;
//! use quarry_mysql::{hints, sm};
//!
//! let q = quarry_mysql::select()
//!     .apply(hints::max_execution_time(1000))
//!     .apply(sm::high_priority())
//!     .apply(sm::from("users"))
//!     .apply(sm::where_("id".into_expr().eq(arg([1]))));
//! let (sql, args) = q.build().unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT /*+ MAX_EXECUTION_TIME(1000) */ HIGH_PRIORITY *\nFROM users\nWHERE (id = ?)"
//! );
//! assert_eq!(args.len(), 1);
//! ```

pub mod dm;
pub mod hints;
pub mod im;
mod index;
pub mod sm;
pub mod um;
pub mod vm;

pub use index::IndexHints;

use quarry_core::dialect::MYSQL;
use quarry_core::query::{DeleteQuery, InsertQuery, SelectQuery, UpdateQuery, ValuesQuery};

/// An empty MySQL `SELECT`.
#[must_use]
pub fn select() -> SelectQuery {
    SelectQuery::new(&MYSQL)
}

/// An empty MySQL `INSERT`.
#[must_use]
pub fn insert() -> InsertQuery {
    InsertQuery::new(&MYSQL)
}

/// An empty MySQL `UPDATE`.
#[must_use]
pub fn update() -> UpdateQuery {
    UpdateQuery::new(&MYSQL)
}

/// An empty MySQL `DELETE`.
#[must_use]
pub fn delete() -> DeleteQuery {
    DeleteQuery::new(&MYSQL)
}

/// An empty MySQL `VALUES` statement; rows are written as `ROW(...)`.
#[must_use]
pub fn values() -> ValuesQuery {
    ValuesQuery::new(&MYSQL, true)
}
