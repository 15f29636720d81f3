//! Microsoft SQL Server dialect.

use std::fmt;

use super::Dialect;
use crate::error::Result;

/// SQL Server dialect: `@pN` placeholders, bracket quoting and `@name` arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct MsSqlDialect;

/// The SQL Server dialect value.
pub const MSSQL: MsSqlDialect = MsSqlDialect;

impl Dialect for MsSqlDialect {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('[', ']')
    }

    fn write_arg(&self, out: &mut dyn fmt::Write, position: usize) -> fmt::Result {
        write!(out, "@p{position}")
    }

    fn offset_in_rows(&self) -> bool {
        true
    }

    fn write_named_arg(&self, out: &mut dyn fmt::Write, name: &str) -> Result<()> {
        write!(out, "@{name}")?;
        Ok(())
    }
}
