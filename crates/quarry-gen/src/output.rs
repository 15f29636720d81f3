//! What the transpiler produces for each statement, file and folder.

use std::path::PathBuf;

use quarry_core::{QueryType, Span};
use serde::{Deserialize, Serialize};

use crate::config::QueryConfig;
use crate::mods::ModStep;

/// A result column or argument with its inferred types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCol {
    /// Name used in generated code.
    pub name: String,
    /// Name as written in the SQL, for result columns.
    pub db_name: String,
    /// The SQL type, e.g. `VARCHAR` or `INTEGER`; empty when unknown.
    pub db_type: String,
    /// The Rust type values map to.
    #[serde(rename = "type")]
    pub type_name: String,
    pub nullable: bool,
}

/// One argument of a statement: a bind, or a group of nested arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryArg {
    pub col: QueryCol,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<QueryArg>,
    /// Where the argument appears in [`ParsedQuery::sql`]; a bind used twice has two.
    pub positions: Vec<Span>,
    /// Whether the caller may pass a slice, expanded into repeated placeholders or rows.
    pub can_be_multiple: bool,
}

impl QueryArg {
    /// The first occurrence of the argument.
    #[must_use]
    pub fn span(&self) -> Span {
        self.positions.first().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

/// One transpiled statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub name: String,
    #[serde(rename = "type")]
    pub query_type: QueryType,
    /// The rewritten SQL every position refers to.
    pub sql: String,
    pub config: QueryConfig,
    pub columns: Vec<QueryCol>,
    pub args: Vec<QueryArg>,
    /// Builder steps that re-create a `SELECT` from [`ParsedQuery::sql`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<ModStep>,
    /// [`ParsedQuery::steps`] rendered as Rust builder code.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mods: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFile {
    pub path: PathBuf,
    pub queries: Vec<ParsedQuery>,
}

/// The SQL files found directly inside one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFolder {
    pub path: PathBuf,
    pub files: Vec<QueryFile>,
}
