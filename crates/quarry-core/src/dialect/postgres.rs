//! PostgreSQL dialect.

use std::fmt;

use super::Dialect;

/// PostgreSQL dialect: `$N` placeholders and double-quote quoting.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

/// The PostgreSQL dialect value.
pub const POSTGRES: PostgresDialect = PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn write_arg(&self, out: &mut dyn fmt::Write, position: usize) -> fmt::Result {
        write!(out, "${position}")
    }
}
