//! The schema catalog the transpiler resolves tables and columns against.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

/// Tables known to the transpiler, usually exported from the live database.
///
/// ```rust
/// use quarry_gen::Catalog;
///
/// let catalog = Catalog::from_json(
///     r#"{"tables": [{"name": "users", "columns": [{"name": "id", "type": "INTEGER"}]}]}"#,
/// )
/// .unwrap();
/// assert!(catalog.table(Some("main"), "USERS").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Empty for the default schema.
    #[serde(default)]
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// The declared type as written in the DDL.
    #[serde(rename = "type", default)]
    pub db_type: String,
    #[serde(default)]
    pub nullable: bool,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, db_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            db_type: db_type.into(),
            nullable,
        }
    }
}

impl Table {
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            schema: String::new(),
            name: name.into(),
            columns,
        }
    }
}

impl Catalog {
    /// # Errors
    ///
    /// Returns [`GenError::Catalog`] if `json` is not a catalog document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a catalog document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Io`] if the file cannot be read and [`GenError::Catalog`] if it
    /// does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| GenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Finds a table by name, ignoring ASCII case. `main` and no schema both mean the
    /// default schema.
    #[must_use]
    pub fn table(&self, schema: Option<&str>, name: &str) -> Option<&Table> {
        let schema = normalize_schema(schema.unwrap_or_default());
        self.tables.iter().find(|t| {
            t.name.eq_ignore_ascii_case(name)
                && normalize_schema(&t.schema).eq_ignore_ascii_case(schema)
        })
    }
}

/// Whether two schema names refer to the same schema.
pub(crate) fn same_schema(a: &str, b: &str) -> bool {
    normalize_schema(a).eq_ignore_ascii_case(normalize_schema(b))
}

fn normalize_schema(schema: &str) -> &str {
    if schema.eq_ignore_ascii_case("main") {
        ""
    } else {
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_fields_are_missing() {
        let catalog =
            Catalog::from_json(r#"{"tables": [{"name": "t", "columns": [{"name": "a"}]}]}"#)
                .unwrap();
        let table = &catalog.tables[0];
        assert_eq!(table.schema, "");
        assert_eq!(table.columns[0], Column::new("a", "", false));
    }

    #[test]
    fn test_schema_lookup() {
        let mut audit = Table::new("log", vec![]);
        audit.schema = String::from("audit");
        let catalog = Catalog {
            tables: vec![Table::new("log", vec![]), audit],
        };
        assert_eq!(catalog.table(None, "log").unwrap().schema, "");
        assert_eq!(catalog.table(Some("main"), "log").unwrap().schema, "");
        assert_eq!(catalog.table(Some("AUDIT"), "LOG").unwrap().schema, "audit");
        assert!(catalog.table(Some("other"), "log").is_none());
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            Catalog::from_json("{\"tables\": 1}"),
            Err(GenError::Catalog(_))
        ));
    }
}
