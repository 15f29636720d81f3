//! End-to-end transpiler tests over the blog catalog.

mod common;
use common::*;

use std::fs;

use quarry_core::query::Query;
use quarry_core::QueryType;
use quarry_gen::catalog::{Column, Table};
use quarry_gen::{replay, Catalog, Engine, GenError, ModStep, Transpiler};

#[test]
fn single_bind_in_list_can_take_a_slice() {
    let q = one(Engine::Sqlite, "SELECT id FROM users WHERE id IN (?1);");
    assert_eq!(q.sql, "SELECT \"id\" FROM \"users\" WHERE \"id\" IN (?1)");
    assert_eq!(q.args.len(), 1);
    let arg = &q.args[0];
    assert_eq!(arg.col.name, "arg");
    assert!(arg.can_be_multiple);
    assert!(!arg.is_group());
    assert_eq!(arg.col.type_name, "i64");
}

#[test]
fn left_join_makes_the_right_side_nullable() {
    let catalog = Catalog {
        tables: vec![
            Table::new(
                "users",
                vec![
                    Column::new("id", "INT", false),
                    Column::new("name", "TEXT", false),
                ],
            ),
            Table::new(
                "posts",
                vec![
                    Column::new("id", "INT", false),
                    Column::new("user_id", "INT", false),
                    Column::new("title", "TEXT", false),
                ],
            ),
        ],
    };
    for engine in [Engine::Sqlite, Engine::Mysql] {
        let queries = Transpiler::new(engine, catalog.clone())
            .parse_queries("SELECT u.name, p.title FROM users u LEFT JOIN posts p ON p.user_id = u.id")
            .unwrap();
        assert_eq!(columns(&queries[0]), [("name", false), ("title", true)]);
    }
}

#[test]
fn statement_metadata() {
    let queries = transpile(
        Engine::Sqlite,
        "-- InsertUser\n\
         INSERT INTO users (id, name, email) VALUES (?, ?, ?) RETURNING id;\n\
         -- RenameUser\n\
         UPDATE users SET name = :name WHERE id = :id;\n\
         -- DeletePost\n\
         DELETE FROM posts WHERE id = ?;\n\
         -- Pairs\n\
         VALUES (1, 'a');\n",
    );
    let kinds: Vec<_> = queries.iter().map(|q| (q.name.as_str(), q.query_type)).collect();
    assert_eq!(
        kinds,
        [
            ("InsertUser", QueryType::Insert),
            ("RenameUser", QueryType::Update),
            ("DeletePost", QueryType::Delete),
            ("Pairs", QueryType::Values),
        ]
    );

    let rename = &queries[1];
    assert_eq!(rename.sql, "UPDATE \"users\" SET \"name\" = ?1 WHERE \"id\" = ?2");
    let names: Vec<_> = rename.args.iter().map(|a| a.col.name.as_str()).collect();
    assert_eq!(names, ["name", "id"]);

    let insert = &queries[0];
    let group = &insert.args[0];
    assert!(group.is_group());
    assert_eq!(group.col.name, "users");
    let children: Vec<_> = group
        .children
        .iter()
        .map(|c| (c.col.name.as_str(), c.col.type_name.as_str(), c.col.nullable))
        .collect();
    assert_eq!(
        children,
        [
            ("id", "i64", false),
            ("name", "String", false),
            ("email", "String", true)
        ]
    );
}

#[test]
fn mysql_upsert_with_row_alias() {
    let q = one(
        Engine::Mysql,
        "INSERT INTO users (id, name) VALUES (?, ?), (?, ?) AS new \
         ON DUPLICATE KEY UPDATE name = CONCAT(new.name, ' (formerly ', users.name, ')')",
    );
    assert_eq!(
        q.sql,
        "INSERT INTO `users` (`id`, `name`) VALUES (?, ?), (?, ?) AS `new` \
         ON DUPLICATE KEY UPDATE `name` = CONCAT(`new`.`name`, ' (formerly ', `users`.`name`, ')')"
    );
    assert_eq!(q.args.len(), 2);
    let rows: Vec<_> = q.args.iter().map(|a| a.col.name.as_str()).collect();
    assert_eq!(rows, ["users", "users_2"]);
    for row in &q.args {
        assert!(row.is_group());
        assert!(!row.can_be_multiple);
        assert_eq!(row.children.len(), 2);
    }
}

#[test]
fn positional_binds_take_column_names() {
    for engine in [Engine::Sqlite, Engine::Mysql] {
        let q = one(engine, "SELECT id FROM users WHERE name = ? AND email = ?");
        let names: Vec<_> = q.args.iter().map(|a| a.col.name.as_str()).collect();
        assert_eq!(names, ["name", "email"]);
    }
}

#[test]
fn correlated_subquery_in_set() {
    let q = one(
        Engine::Mysql,
        "UPDATE posts SET score = score + 1 WHERE user_id = (SELECT id FROM users WHERE name = ?)",
    );
    assert_eq!(q.sql.matches('?').count(), 1);
    assert_eq!(q.args.len(), 1);
    assert_eq!(q.args[0].col.type_name, "String");
}

#[test]
fn cte_and_compound_columns() {
    let q = one(
        Engine::Sqlite,
        "WITH counts(user_id, total) AS (SELECT user_id, count(*) FROM posts GROUP BY user_id) \
         SELECT u.name, c.total FROM users u LEFT JOIN counts c ON c.user_id = u.id",
    );
    assert_eq!(columns(&q), [("name", false), ("total", true)]);
    assert_eq!(q.columns[1].type_name, "i64");

    let err = fail(
        Engine::Sqlite,
        "WITH counts(user_id) AS (SELECT user_id, count(*) FROM posts GROUP BY user_id) SELECT * FROM counts",
    );
    assert!(err.to_string().starts_with("column names do not match 1 != 2"));
}

#[test]
fn schema_qualified_columns_resolve_in_their_schema() {
    let mut audit = Table::new(
        "users",
        vec![
            Column::new("id", "TEXT", false),
            Column::new("changed_by", "INTEGER", false),
        ],
    );
    audit.schema = String::from("audit");
    let mut catalog = blog();
    catalog.tables.push(audit);

    let queries = Transpiler::new(Engine::Sqlite, catalog)
        .parse_queries(
            "SELECT main.users.name FROM audit.users \
             JOIN users ON main.users.id = audit.users.changed_by \
             WHERE audit.users.id = ?",
        )
        .unwrap();
    let q = &queries[0];
    assert_eq!(columns(q), [("name", false)]);
    assert_eq!(q.args[0].col.db_type, "TEXT");
    assert_eq!(q.args[0].col.type_name, "String");
}

#[test]
fn unsupported_constructs_are_reported() {
    let cases = [
        (Engine::Mysql, "SELECT id FROM users LIMIT 5, 10"),
        (Engine::Mysql, "REPLACE INTO users (id, name) VALUES (1, 'a')"),
        (
            Engine::Mysql,
            "DELETE posts FROM posts JOIN users ON users.id = posts.user_id WHERE users.id = ?",
        ),
        (Engine::Mysql, "SELECT title FROM users, posts"),
        (Engine::Mysql, "SELECT id FROM users WHERE id = :id"),
    ];
    for (engine, sql) in cases {
        assert!(
            matches!(fail(engine, sql), GenError::Unsupported { .. }),
            "expected {sql} to be unsupported on {engine}"
        );
    }
}

#[test]
fn comments_configure_columns_and_binds() {
    let q = one(
        Engine::Sqlite,
        "-- ScoreOf Score\n\
         SELECT score /* points:f32:notnull */ FROM posts WHERE id = ? /* post_id:u32 */;",
    );
    assert_eq!(q.config.row_name, "Score");
    assert_eq!(q.sql, "SELECT \"score\"  FROM \"posts\" WHERE \"id\" = ?1");
    assert_eq!(q.columns[0].name, "points");
    assert_eq!(q.columns[0].type_name, "f32");
    assert!(!q.columns[0].nullable);
    assert_eq!(q.args[0].col.name, "post_id");
    assert_eq!(q.args[0].col.type_name, "u32");
}

#[test]
fn replayed_select_renders_the_template() {
    let q = one(
        Engine::Sqlite,
        "SELECT id, name FROM users WHERE id = ? ORDER BY name LIMIT 10",
    );
    let (sql, args) = replay(&q, Engine::Sqlite).unwrap().build().unwrap();
    assert_eq!(
        normalize(&sql),
        "SELECT \"id\", \"name\" FROM \"users\" WHERE \"id\" = ?1 ORDER BY \"name\" LIMIT 10"
    );
    assert_eq!(args.len(), 1);
    assert!(q.mods.contains("q.where_.append_where("));

    let delete = one(Engine::Sqlite, "DELETE FROM users WHERE id = 1");
    assert!(delete.steps.is_empty());
    assert!(replay(&delete, Engine::Sqlite).is_err());
}

#[test]
fn steps_are_serialised_with_tags() {
    let q = one(Engine::Sqlite, "SELECT DISTINCT name FROM users");
    assert!(matches!(q.steps[1], ModStep::Distinct));
    let json = serde_json::to_value(&q).unwrap();
    assert_eq!(json["type"], "SELECT");
    assert_eq!(json["steps"][1]["step"], "distinct");
    assert_eq!(json["columns"][0]["type"], "String");
}

#[test]
fn folders_are_walked_and_generated_files_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("users")).unwrap();
    fs::write(
        dir.path().join("users/queries.sql"),
        "-- AllUsers\nSELECT * FROM users;\n-- OneUser\nSELECT * FROM users WHERE id = ?;\n",
    )
    .unwrap();
    fs::write(dir.path().join("users/models.bob.sql"), "this is not sql").unwrap();
    fs::write(dir.path().join("notes.txt"), "nothing here").unwrap();

    let folders = Transpiler::new(Engine::Sqlite, blog())
        .parse_folders(&[dir.path()])
        .unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].path, dir.path().join("users"));
    assert_eq!(folders[0].files.len(), 1);
    let names: Vec<_> = folders[0].files[0]
        .queries
        .iter()
        .map(|q| q.name.as_str())
        .collect();
    assert_eq!(names, ["AllUsers", "OneUser"]);
}

#[test]
fn file_errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.sql");
    fs::write(&path, "SELECT id FROM nowhere;").unwrap();
    let err = Transpiler::new(Engine::Sqlite, blog())
        .parse_file(&path)
        .unwrap_err();
    let GenError::File { path: reported, source } = &err else {
        panic!("expected a file error, got {err:?}");
    };
    assert_eq!(reported, &path);
    assert!(matches!(**source, GenError::SchemaLookup { .. }));
    assert!(err.to_string().contains("table not found: nowhere"));
}

#[test]
fn every_failing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a_bad.sql"), "SELECT nope FROM users;").unwrap();
    fs::write(dir.path().join("b_good.sql"), "-- Ids\nSELECT id FROM users;").unwrap();
    fs::write(dir.path().join("c_bad.sql"), "SELECT id FROM nowhere;").unwrap();

    let err = Transpiler::new(Engine::Sqlite, blog())
        .parse_folders(&[dir.path()])
        .unwrap_err();
    let GenError::Multiple(errors) = &err else {
        panic!("expected one error per bad file, got {err:?}");
    };
    let failed: Vec<_> = errors
        .iter()
        .map(|e| match e {
            GenError::File { path, .. } => path.file_name().unwrap().to_str().unwrap(),
            other => panic!("expected a file error, got {other:?}"),
        })
        .collect();
    assert_eq!(failed, ["a_bad.sql", "c_bad.sql"]);
    assert!(err.to_string().starts_with("2 failures, first: "));
    assert!(err.to_string().contains("column not found: nope"));
}
