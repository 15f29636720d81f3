//! Database engines the transpiler understands.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use quarry_core::dialect::{Dialect, MYSQL, SQLITE};
use regex::Regex;
use serde::{Deserialize, Serialize};

static TYPE_PARAMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").expect("type parameter pattern"));

/// The SQL engine a query file is written for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Sqlite,
    Mysql,
}

impl Engine {
    /// The builder dialect that renders this engine's SQL.
    #[must_use]
    pub const fn dialect(self) -> &'static dyn Dialect {
        match self {
            Self::Sqlite => &SQLITE,
            Self::Mysql => &MYSQL,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Mysql => "mysql",
        }
    }

    /// The positional placeholder for the `n`th bind (1-based) in a template.
    #[must_use]
    pub fn placeholder(self, n: usize) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.dialect().write_arg(&mut out, n);
        out
    }

    #[must_use]
    pub fn quote(self, name: &str) -> String {
        self.dialect().quote_identifier(name)
    }

    /// Whether the engine accepts `:name`, `@name`, `$name` and `?NNN` binds.
    #[must_use]
    pub const fn named_binds(self) -> bool {
        matches!(self, Self::Sqlite)
    }

    /// Whether `a, b` in a `FROM` clause is accepted as a join.
    #[must_use]
    pub const fn comma_joins(self) -> bool {
        matches!(self, Self::Sqlite)
    }

    /// The name the engine gives to the `i`th (0-based) column of a bare `VALUES` list.
    #[must_use]
    pub fn values_column(self, i: usize) -> String {
        match self {
            Self::Sqlite => format!("column{}", i + 1),
            Self::Mysql => format!("column_{i}"),
        }
    }

    /// The type class a declared column type belongs to.
    ///
    /// Both engines follow the SQLite affinity rules; MySQL additionally maps its binary
    /// string types to `BLOB`.
    #[must_use]
    pub fn affinity(self, declared: &str) -> String {
        let declared = declared.to_ascii_uppercase();
        if declared.is_empty() {
            return String::new();
        }
        let class = if declared.contains("INT") {
            "INTEGER"
        } else if declared.contains("CHAR") || declared.contains("CLOB") || declared.contains("TEXT") {
            "TEXT"
        } else if declared.contains("BLOB")
            || (self == Self::Mysql && declared.contains("BINARY"))
        {
            "BLOB"
        } else if declared.contains("REAL") || declared.contains("FLOA") || declared.contains("DOUB") {
            "REAL"
        } else {
            "NUMERIC"
        };
        class.to_string()
    }

    /// The Rust type used for values of a declared or inferred SQL type.
    #[must_use]
    pub fn rust_type(self, db_type: &str) -> &'static str {
        let base = base_type(db_type);
        match base.as_str() {
            "TINYINT" | "INT8" => "i8",
            "SMALLINT" | "INT2" => "i16",
            "MEDIUMINT" | "INT" => "i32",
            "INTEGER" => match self {
                Self::Sqlite => "i64",
                Self::Mysql => "i32",
            },
            "BIGINT" => "i64",
            "UNSIGNED BIG INT" | "BIGINT UNSIGNED" => "u64",
            "INT UNSIGNED" | "INTEGER UNSIGNED" => "u32",
            "FLOAT" => "f32",
            "REAL" | "DOUBLE" | "DOUBLE PRECISION" => "f64",
            "NUMERIC" | "DECIMAL" => "rust_decimal::Decimal",
            "BOOLEAN" | "BOOL" => "bool",
            "DATE" => "time::Date",
            "TIME" => "time::Time",
            "DATETIME" | "TIMESTAMP" => "time::PrimitiveDateTime",
            "JSON" => "serde_json::Value",
            "BLOB" | "BINARY" | "VARBINARY" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => "Vec<u8>",
            _ => match self.affinity(&base).as_str() {
                "INTEGER" => "i64",
                "REAL" => "f64",
                "BLOB" => "Vec<u8>",
                _ => "String",
            },
        }
    }
}

/// Upper-cases a declared type and strips its parameters: `varchar(20)` is `VARCHAR`.
#[must_use]
pub fn base_type(declared: &str) -> String {
    TYPE_PARAMS
        .replace_all(declared.trim(), "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The engine name was not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown engine '{0}', expected sqlite or mysql")]
pub struct UnknownEngine(pub String);

impl FromStr for Engine {
    type Err = UnknownEngine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "mysql" => Ok(Self::Mysql),
            _ => Err(UnknownEngine(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_and_quotes() {
        assert_eq!(Engine::Sqlite.placeholder(3), "?3");
        assert_eq!(Engine::Mysql.placeholder(3), "?");
        assert_eq!(Engine::Sqlite.quote("user"), "\"user\"");
        assert_eq!(Engine::Mysql.quote("a`b"), "`a``b`");
    }

    #[test]
    fn test_affinity() {
        let e = Engine::Sqlite;
        assert_eq!(e.affinity("BIGINT"), "INTEGER");
        assert_eq!(e.affinity("varchar(20)"), "TEXT");
        assert_eq!(e.affinity("CLOB"), "TEXT");
        assert_eq!(e.affinity("blob"), "BLOB");
        assert_eq!(e.affinity("DOUBLE PRECISION"), "REAL");
        assert_eq!(e.affinity("FLOAT"), "REAL");
        assert_eq!(e.affinity("DECIMAL(10,5)"), "NUMERIC");
        assert_eq!(e.affinity("BOOLEAN"), "NUMERIC");
        assert_eq!(e.affinity(""), "");
        assert_eq!(e.affinity("VARBINARY"), "NUMERIC");
        assert_eq!(Engine::Mysql.affinity("VARBINARY(16)"), "BLOB");
    }

    #[test]
    fn test_rust_types() {
        let e = Engine::Sqlite;
        assert_eq!(e.rust_type("INTEGER"), "i64");
        assert_eq!(e.rust_type("int"), "i32");
        assert_eq!(e.rust_type("varchar(255)"), "String");
        assert_eq!(e.rust_type("BLOB"), "Vec<u8>");
        assert_eq!(e.rust_type("BOOLEAN"), "bool");
        assert_eq!(e.rust_type("DATETIME"), "time::PrimitiveDateTime");
        assert_eq!(e.rust_type("unsigned big int"), "u64");
        assert_eq!(e.rust_type("NVARCHAR(10)"), "String");
        assert_eq!(e.rust_type(""), "String");
    }

    #[test]
    fn test_parse_engine() {
        assert_eq!("SQLite".parse::<Engine>().unwrap(), Engine::Sqlite);
        assert_eq!("mysql".parse::<Engine>().unwrap(), Engine::Mysql);
        assert!("oracle".parse::<Engine>().is_err());
    }
}
