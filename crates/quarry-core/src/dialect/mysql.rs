//! MySQL dialect.

use std::fmt;

use super::Dialect;

/// MySQL dialect: `?` placeholders and backtick quoting.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

/// The MySQL dialect value.
pub const MYSQL: MySqlDialect = MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('`', '`')
    }

    fn write_arg(&self, out: &mut dyn fmt::Write, _position: usize) -> fmt::Result {
        out.write_char('?')
    }
}
