//! # quarry-core
//!
//! Composable SQL for MySQL, SQLite, MSSQL and Postgres.
//!
//! This crate provides:
//! - The [`Expression`](expression::Expression) protocol: every fragment writes itself and
//!   returns its arguments, numbering placeholders from a given start position
//! - Clause fragments, query types and modifiers to assemble statements
//! - A hand-written SQL lexer and recursive descent parser producing a span-annotated
//!   syntax tree, used by the code generator
//!
//! ## Building queries
//!
//! ```rust
//! use quarry_core::dialect::SQLITE;
//! use quarry_core::expr::{arg, quote, Chain};
//! use quarry_core::expression::IntoExpr;
//! use quarry_core::mods::{sm, where_};
//! use quarry_core::query::{Query, SelectQuery};
//!
//! let q = SelectQuery::new(&SQLITE)
//!     .apply(sm::columns([quote(["id"]).into_expr()]))
//!     .apply(sm::from("users"))
//!     .apply(where_(quote(["age"]).gte(arg([21]))));
//! let (sql, args) = q.build().unwrap();
//! assert_eq!(sql, "SELECT \"id\"\nFROM users\nWHERE (\"age\" >= ?1)");
//! assert_eq!(args.len(), 1);
//! ```
//!
//! ## Parsing
//!
//! ```rust
//! use quarry_core::{Parser, Statement};
//!
//! let stmt = Parser::new("SELECT id FROM users WHERE id = ?").parse_statement().unwrap();
//! assert!(matches!(stmt, Statement::Select(_)));
//! ```

pub mod ast;
pub mod clause;
pub mod context;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod expression;
pub mod lexer;
pub mod mods;
pub mod parser;
pub mod query;
pub mod value;

pub use ast::Statement;
pub use context::{CancellationToken, RenderContext};
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use expression::{Expr, Expression, IntoExpr, SqlWriter};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{ParseError, Parser};
pub use query::{
    DeleteQuery, InsertQuery, Modifier, Query, QueryType, SelectQuery, UpdateQuery, ValuesQuery,
};
pub use value::{Arg, SqlValue};
