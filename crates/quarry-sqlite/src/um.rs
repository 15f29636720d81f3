//! `UPDATE` modifiers.

use quarry_core::clause::IndexedBy;
use quarry_core::query::{Modifier, UpdateQuery};

use crate::{or_action, OrAction};

pub use quarry_core::mods::um::*;

/// `UPDATE OR <action>`.
#[must_use]
pub fn or(action: OrAction) -> impl Modifier<UpdateQuery> + Clone {
    or_action(action)
}

/// `INDEXED BY index` on the target table.
pub fn table_indexed_by(index: impl Into<String>) -> impl Modifier<UpdateQuery> + Clone {
    let index = IndexedBy::Index(index.into());
    move |q: &mut UpdateQuery| q.table.indexed_by = Some(index.clone())
}

/// `NOT INDEXED` on the target table.
#[must_use]
pub fn table_not_indexed() -> impl Modifier<UpdateQuery> + Clone {
    |q: &mut UpdateQuery| q.table.indexed_by = Some(IndexedBy::NotIndexed)
}

#[cfg(test)]
mod tests {
    use quarry_core::expr::arg;
    use quarry_core::query::Query;

    use super::*;

    #[test]
    fn test_update_or_and_indexed_by() {
        let q = crate::update()
            .apply(or(OrAction::Rollback))
            .apply(table_as("users", "u"))
            .apply(table_indexed_by("users_email"))
            .apply(set("name", arg(["x"])))
            .apply(where_("email = 'a@b'"))
            .apply(returning(["id".into()]));
        let (sql, args) = q.build().unwrap();
        assert_eq!(
            sql,
            "UPDATE OR ROLLBACK users AS \"u\" INDEXED BY \"users_email\" SET\n\"name\" = ?1\n\
             WHERE email = 'a@b'\nRETURNING id"
        );
        assert_eq!(args.len(), 1);
    }
}
