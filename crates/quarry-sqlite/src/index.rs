//! `INDEXED BY` and `NOT INDEXED` on table references.

use quarry_core::clause::{IndexedBy, TableRef};
use quarry_core::mods::{FromChain, JoinChain};

/// SQLite index selection on `FROM` and join chains.
///
/// ```rust
/// use quarry_core::query::Query;
/// use quarry_sqlite::{sm, Indexing};
///
/// let q = quarry_sqlite::select().apply(sm::from("users").indexed_by("users_email"));
/// let (sql, _) = q.build().unwrap();
/// assert_eq!(sql, "SELECT *\nFROM users INDEXED BY \"users_email\"");
/// ```
pub trait Indexing: Sized {
    /// Edits the underlying table reference.
    #[must_use]
    fn edit_table(self, f: impl FnOnce(&mut TableRef)) -> Self;

    /// `INDEXED BY index`; the statement fails to prepare if the index cannot be used.
    #[must_use]
    fn indexed_by(self, index: impl Into<String>) -> Self {
        let index = IndexedBy::Index(index.into());
        self.edit_table(|t| t.indexed_by = Some(index))
    }

    /// `NOT INDEXED`.
    #[must_use]
    fn not_indexed(self) -> Self {
        self.edit_table(|t| t.indexed_by = Some(IndexedBy::NotIndexed))
    }
}

impl Indexing for FromChain {
    fn edit_table(self, f: impl FnOnce(&mut TableRef)) -> Self {
        self.with_table(f)
    }
}

impl Indexing for JoinChain {
    fn edit_table(self, f: impl FnOnce(&mut TableRef)) -> Self {
        self.with_table(f)
    }
}
