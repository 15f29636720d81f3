//! # quarry-gen
//!
//! Reads annotated `.sql` files and turns every statement into something a code generator
//! can consume: the rewritten SQL template, its result columns with inferred types, a tree
//! of typed arguments, and the builder steps that re-create a `SELECT` with quarry.
//!
//! Each statement is resolved against a [`Catalog`] of tables for one [`Engine`]:
//! - Identifiers are quoted and every bind becomes the engine's positional placeholder
//! - `*` and `t.*` expand to explicit column lists
//! - Column types and nullability flow through joins, CTEs, sub-selects and functions
//!
//! ```rust
//! use quarry_gen::{Catalog, Engine, Transpiler};
//!
//! let catalog = Catalog::from_json(
//!     r#"{"tables": [{"name": "users", "columns": [
//!         {"name": "id", "type": "INTEGER"},
//!         {"name": "name", "type": "TEXT", "nullable": true}
//!     ]}]}"#,
//! )
//! .unwrap();
//! let queries = Transpiler::new(Engine::Sqlite, catalog)
//!     .parse_queries("-- ByName\nSELECT * FROM users WHERE name = ?;")
//!     .unwrap();
//!
//! let q = &queries[0];
//! assert_eq!(q.sql, r#"SELECT "users"."id", "users"."name" FROM "users" WHERE "name" = ?1"#);
//! assert_eq!(q.columns[1].type_name, "String");
//! assert!(q.columns[1].nullable);
//! assert_eq!(q.args[0].col.type_name, "String");
//! ```

mod args;
pub mod catalog;
pub mod config;
pub mod edit;
pub mod engine;
pub mod error;
mod functions;
pub mod mods;
pub mod output;
mod transpile;
pub mod types;
mod visitor;
mod walk;

pub use catalog::Catalog;
pub use config::{ColumnConfig, QueryConfig};
pub use engine::Engine;
pub use error::{GenError, Result};
pub use mods::{render_steps, replay, Combinator, ModStep, Template};
pub use output::{ParsedQuery, QueryArg, QueryCol, QueryFile, QueryFolder};
pub use transpile::Transpiler;
