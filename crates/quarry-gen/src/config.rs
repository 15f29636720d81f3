//! Configuration written in SQL comments.
//!
//! A statement is named by the line comment before it, optionally followed by a row
//! config: `-- UserPosts UserPost:UserPosts:true`. Columns and binds take a block comment
//! right after them: `id /* user_id:i64:notnull */`. Empty fields keep their default.

use serde::{Deserialize, Serialize};

/// Shape of the generated row type for a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    pub row_name: String,
    pub row_slice_name: String,
    pub generate_row: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            row_name: String::new(),
            row_slice_name: String::new(),
            generate_row: true,
        }
    }
}

impl QueryConfig {
    /// Parses `row_name:row_slice_name:generate_row`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut parts = text.trim().splitn(3, ':');
        let row_name = parts.next().unwrap_or_default().trim().to_string();
        let row_slice_name = parts.next().unwrap_or_default().trim().to_string();
        let generate_row = !matches!(
            parts.next().unwrap_or_default().trim().to_ascii_lowercase().as_str(),
            "false" | "no" | "skip"
        );
        Self {
            row_name,
            row_slice_name,
            generate_row,
        }
    }

    /// The config a statement called `name` gets when its comment says nothing.
    #[must_use]
    pub fn for_query(name: &str) -> Self {
        Self {
            row_name: format!("{name}Row"),
            ..Self::default()
        }
    }

    /// Overrides fields that `other` sets; a row is generated only if both agree.
    #[must_use]
    pub fn merge(mut self, other: &Self) -> Self {
        if !other.row_name.is_empty() {
            self.row_name.clone_from(&other.row_name);
        }
        if !other.row_slice_name.is_empty() {
            self.row_slice_name.clone_from(&other.row_slice_name);
        }
        self.generate_row = self.generate_row && other.generate_row;
        self
    }
}

/// Overrides for one result column or argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub nullable: Option<bool>,
}

impl ColumnConfig {
    /// Parses `name:type:nullability`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut parts = text.trim().splitn(3, ':');
        let name = parts.next().unwrap_or_default().trim().to_string();
        let type_name = parts.next().unwrap_or_default().trim().to_string();
        let nullable = parse_nullable(parts.next().unwrap_or_default());
        Self {
            name,
            type_name,
            nullable,
        }
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Overrides fields that `other` sets.
    #[must_use]
    pub fn merge(mut self, other: &Self) -> Self {
        if !other.name.is_empty() {
            self.name.clone_from(&other.name);
        }
        if !other.type_name.is_empty() {
            self.type_name.clone_from(&other.type_name);
        }
        if other.nullable.is_some() {
            self.nullable = other.nullable;
        }
        self
    }

    /// Fills only the fields that are still empty.
    pub fn fill(&mut self, other: &Self) {
        if self.name.is_empty() {
            self.name.clone_from(&other.name);
        }
        if self.type_name.is_empty() {
            self.type_name.clone_from(&other.type_name);
        }
        if self.nullable.is_none() {
            self.nullable = other.nullable;
        }
    }
}

fn parse_nullable(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "null" | "true" | "yes" => Some(true),
        "notnull" | "nnull" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Splits a leading statement comment into its name and the rest.
pub(crate) fn split_name(comment: &str) -> (&str, &str) {
    let comment = comment.trim();
    comment
        .split_once(char::is_whitespace)
        .map_or((comment, ""), |(name, rest)| (name, rest.trim()))
}
