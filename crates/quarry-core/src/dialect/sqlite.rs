//! SQLite dialect.

use std::fmt;

use super::Dialect;
use crate::error::Result;

/// SQLite dialect: numbered `?N` placeholders, double-quote quoting and `:name` arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

/// The SQLite dialect value.
pub const SQLITE: SqliteDialect = SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn write_arg(&self, out: &mut dyn fmt::Write, position: usize) -> fmt::Result {
        write!(out, "?{position}")
    }

    fn write_named_arg(&self, out: &mut dyn fmt::Write, name: &str) -> Result<()> {
        write!(out, ":{name}")?;
        Ok(())
    }
}
