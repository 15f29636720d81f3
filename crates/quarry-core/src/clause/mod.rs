//! Clause fragments.
//!
//! Every clause is an [`Expression`](crate::expression::Expression) owned by a query. Empty
//! clauses write nothing, so queries can render them unconditionally.

mod columns;
mod combine;
mod conditions;
mod conflict;
mod from;
mod into;
mod order;
mod window;
mod with;

pub use columns::{Distinct, Hints, Modifiers, SelectList};
pub use combine::{Combine, Lock, LockStrength, LockWait, SetOp};
pub use conditions::{assign, Assignment, GroupBy, GroupingSuffix, Having, Returning, Set, Where};
pub use conflict::{ConflictAction, ConflictTarget, DuplicateKeyUpdate, OnConflict, Values};
pub use from::{IndexHint, IndexHintFor, IndexHintKind, IndexedBy, Join, JoinKind, TableRef};
pub use into::{FieldOptions, IntoTarget, LineOptions, SelectInto};
pub use order::{Direction, Fetch, Limit, Nulls, Offset, OrderBy, OrderDef};
pub use window::{Frame, FrameBound, FrameExclusion, FrameMode, NamedWindow, WindowDef, Windows};
pub use with::{Cte, CteCycle, CteSearch, SearchOrder, With};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RenderContext;
    use crate::dialect::{MSSQL, MYSQL, POSTGRES, SQLITE};
    use crate::error::Error;
    use crate::expr::{arg, quote};
    use crate::expression::{raw, render, Expression, IntoExpr};

    fn pg(e: &dyn Expression) -> crate::error::Result<String> {
        render(&RenderContext::new(), &POSTGRES, 1, e).map(|(sql, _)| sql)
    }

    #[test]
    fn test_empty_clauses_write_nothing() {
        assert_eq!(pg(&Where::default()).unwrap(), "");
        assert_eq!(pg(&GroupBy::default()).unwrap(), "");
        assert_eq!(pg(&OrderBy::default()).unwrap(), "");
        assert_eq!(pg(&Limit::default()).unwrap(), "");
        assert_eq!(pg(&With::default()).unwrap(), "");
        assert_eq!(pg(&Returning::default()).unwrap(), "");
    }

    #[test]
    fn test_select_list_defaults_to_star() {
        assert_eq!(pg(&SelectList::default()).unwrap(), "*");
    }

    #[test]
    fn test_order_def_parts() {
        let order = OrderDef {
            collation: Some(String::from("\"C\"")),
            direction: Some(Direction::Desc),
            nulls: Some(Nulls::Last),
            ..OrderDef::new(quote(["name"]).into_expr())
        };
        assert_eq!(pg(&order).unwrap(), "\"name\" COLLATE \"C\" DESC NULLS LAST");
    }

    #[test]
    fn test_frame_requires_mode_and_start() {
        let err = pg(&Frame::default()).unwrap_err();
        assert!(matches!(err, Error::MissingMandatory(_)));

        let frame = Frame {
            mode: Some(FrameMode::Rows),
            start: Some(FrameBound::Preceding(arg([3]).into_expr())),
            end: Some(FrameBound::CurrentRow),
            exclusion: Some(FrameExclusion::Ties),
        };
        assert_eq!(
            pg(&frame).unwrap(),
            "ROWS BETWEEN $1 PRECEDING AND CURRENT ROW EXCLUDE TIES"
        );
    }

    #[test]
    fn test_window_def_joins_parts_with_spaces() {
        let def = WindowDef {
            from: Some(String::from("base")),
            partition_by: vec![raw("a").into_expr()],
            order_by: vec![OrderDef::new(raw("b").into_expr())],
            frame: None,
        };
        let named = Windows {
            windows: vec![NamedWindow {
                name: String::from("w"),
                definition: def,
            }],
        };
        assert_eq!(
            pg(&named).unwrap(),
            "WINDOW \"w\" AS (\"base\" PARTITION BY a ORDER BY b)"
        );
    }

    #[test]
    fn test_lock_requires_strength() {
        let lock = Lock {
            wait: Some(LockWait::NoWait),
            ..Lock::default()
        };
        assert!(matches!(pg(&lock), Err(Error::MissingMandatory(_))));

        let lock = Lock {
            strength: Some(LockStrength::NoKeyUpdate),
            tables: vec![String::from("t")],
            wait: Some(LockWait::SkipLocked),
        };
        assert_eq!(pg(&lock).unwrap(), "FOR NO KEY UPDATE OF \"t\" SKIP LOCKED");
    }

    #[test]
    fn test_join_constraints() {
        let mut join = Join::new(JoinKind::Left, TableRef::new(quote(["posts"]).into_expr()));
        join.on.push(raw("posts.user_id = users.id").into_expr());
        assert_eq!(
            pg(&join).unwrap(),
            "LEFT JOIN \"posts\" ON posts.user_id = users.id"
        );

        let mut cross = Join::new(JoinKind::Cross, TableRef::new(quote(["b"]).into_expr()));
        cross.using.push(String::from("id"));
        assert!(matches!(pg(&cross), Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_table_ref_dialect_options() {
        let mut table = TableRef::new(quote(["users"]).into_expr());
        table.alias = Some(String::from("u"));
        table.indexed_by = Some(IndexedBy::Index(String::from("idx")));
        let (sql, _) = render(&RenderContext::new(), &SQLITE, 1, &table).unwrap();
        assert_eq!(sql, "\"users\" AS \"u\" INDEXED BY \"idx\"");

        let mut table = TableRef::new(quote(["users"]).into_expr());
        table.partitions.push(String::from("p0"));
        table.index_hints.push(IndexHint {
            kind: IndexHintKind::Force,
            for_: Some(IndexHintFor::OrderBy),
            indexes: vec![String::from("i1")],
        });
        let (sql, _) = render(&RenderContext::new(), &MYSQL, 1, &table).unwrap();
        assert_eq!(
            sql,
            "`users` PARTITION (`p0`) FORCE INDEX FOR ORDER BY (`i1`)"
        );
    }

    #[test]
    fn test_offset_rows_on_mssql() {
        let offset = Offset {
            count: Some(arg([10]).into_expr()),
        };
        let (sql, _) = render(&RenderContext::new(), &MSSQL, 1, &offset).unwrap();
        assert_eq!(sql, "OFFSET @p1 ROWS");
        let fetch = Fetch {
            count: Some(arg([5]).into_expr()),
            with_ties: true,
        };
        let (sql, _) = render(&RenderContext::new(), &MSSQL, 2, &fetch).unwrap();
        assert_eq!(sql, "FETCH NEXT @p2 ROWS WITH TIES");
    }

    #[test]
    fn test_conflict_update() {
        let conflict = OnConflict {
            action: Some(ConflictAction::Update),
            target: ConflictTarget {
                columns: vec![String::from("id")],
                ..ConflictTarget::default()
            },
            set: Set {
                items: vec![assign("name", raw("EXCLUDED.name")).into_expr()],
            },
            where_: Where::default(),
        };
        assert_eq!(
            pg(&conflict).unwrap(),
            "ON CONFLICT (\"id\") DO UPDATE SET\n\"name\" = EXCLUDED.name"
        );
        assert!(matches!(
            pg(&OnConflict::default()),
            Err(Error::MissingMandatory(_))
        ));
    }

    #[test]
    fn test_values_default_and_rows() {
        assert_eq!(pg(&Values::default()).unwrap(), "DEFAULT VALUES");
        let values = Values {
            rows: vec![
                vec![arg([1]).into_expr(), arg([2]).into_expr()],
                vec![arg([3]).into_expr(), arg([4]).into_expr()],
            ],
            ..Values::default()
        };
        assert_eq!(pg(&values).unwrap(), "VALUES ($1, $2), ($3, $4)");
    }

    #[test]
    fn test_into_outfile_symmetric_options() {
        let into = SelectInto {
            target: IntoTarget::Outfile {
                file: String::from("/tmp/out.csv"),
                charset: None,
                fields: FieldOptions {
                    terminated_by: Some(String::from(",")),
                    enclosed_by: Some(String::from("\"")),
                    optionally_enclosed: true,
                    escaped_by: None,
                },
                lines: LineOptions {
                    starting_by: None,
                    terminated_by: Some(String::from("\n")),
                },
            },
        };
        let (sql, _) = render(&RenderContext::new(), &MYSQL, 1, &into).unwrap();
        assert_eq!(
            sql,
            "INTO OUTFILE '/tmp/out.csv' FIELDS TERMINATED BY ',' OPTIONALLY ENCLOSED BY '\"' LINES TERMINATED BY '\n'"
        );
    }
}
