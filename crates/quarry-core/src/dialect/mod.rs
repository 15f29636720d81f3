//! SQL Dialect support.
//!
//! Different databases render placeholders and quoted identifiers differently. A dialect is a
//! stateless capability value; the four supported ones are plain constants.

mod mssql;
mod mysql;
mod postgres;
mod sqlite;

use std::fmt;

pub use mssql::{MsSqlDialect, MSSQL};
pub use mysql::{MySqlDialect, MYSQL};
pub use postgres::{PostgresDialect, POSTGRES};
pub use sqlite::{SqliteDialect, SQLITE};

use crate::error::{Error, Result};

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the opening and closing identifier quote characters.
    fn identifier_quote(&self) -> (char, char) {
        ('"', '"')
    }

    /// Writes the placeholder for the argument at `position` (1-based).
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails.
    fn write_arg(&self, out: &mut dyn fmt::Write, position: usize) -> fmt::Result;

    /// Writes `name` surrounded by the dialect's identifier quotes.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails.
    fn write_quoted(&self, out: &mut dyn fmt::Write, name: &str) -> fmt::Result {
        let (open, close) = self.identifier_quote();
        out.write_char(open)?;
        for c in name.chars() {
            if c == close {
                out.write_char(close)?;
            }
            out.write_char(c)?;
        }
        out.write_char(close)
    }

    /// Writes a named argument placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoNamedArgs`] for dialects without named placeholders.
    fn write_named_arg(&self, out: &mut dyn fmt::Write, name: &str) -> Result<()> {
        let _ = (out, name);
        Err(Error::NoNamedArgs)
    }

    /// Whether `OFFSET n` must be written as `OFFSET n ROWS`.
    fn offset_in_rows(&self) -> bool {
        false
    }

    /// Quotes an identifier into a new string.
    fn quote_identifier(&self, name: &str) -> String {
        let mut quoted = String::with_capacity(name.len() + 2);
        // Writing into a String cannot fail.
        let _ = self.write_quoted(&mut quoted, name);
        quoted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(d: &dyn Dialect, position: usize) -> String {
        let mut out = String::new();
        d.write_arg(&mut out, position).unwrap();
        out
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(arg(&MYSQL, 3), "?");
        assert_eq!(arg(&SQLITE, 3), "?3");
        assert_eq!(arg(&MSSQL, 3), "@p3");
        assert_eq!(arg(&POSTGRES, 3), "$3");
    }

    #[test]
    fn test_quoting() {
        assert_eq!(MYSQL.quote_identifier("id"), "`id`");
        assert_eq!(SQLITE.quote_identifier("id"), "\"id\"");
        assert_eq!(MSSQL.quote_identifier("id"), "[id]");
        assert_eq!(POSTGRES.quote_identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(MSSQL.quote_identifier("a]b"), "[a]]b]");
    }

    #[test]
    fn test_named_args() {
        let mut out = String::new();
        SQLITE.write_named_arg(&mut out, "id").unwrap();
        MSSQL.write_named_arg(&mut out, "id").unwrap();
        assert_eq!(out, ":id@id");
        assert!(matches!(
            MYSQL.write_named_arg(&mut out, "id"),
            Err(Error::NoNamedArgs)
        ));
        assert!(matches!(
            POSTGRES.write_named_arg(&mut out, "id"),
            Err(Error::NoNamedArgs)
        ));
    }
}
