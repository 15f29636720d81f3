//! SQL values and bind arguments.
//!
//! Rendering never inlines a bound value: every value becomes an [`Arg`] returned next to the
//! placeholder that refers to it.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// A SQL value that can be bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: Prefer binding the value instead.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

macro_rules! int_to_sql_value {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )*
    };
}

int_to_sql_value!(i8, i16, i32, i64, u8, u16, u32);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        self.map_or(SqlValue::Null, ToSqlValue::to_sql_value)
    }
}

/// One bind argument produced while rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A concrete value for a positional placeholder.
    Value(SqlValue),
    /// A named argument whose value is supplied later with [`bind_named`].
    Named(String),
}

impl<T: ToSqlValue> From<T> for Arg {
    fn from(value: T) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl Arg {
    /// Returns the bound value, if this is not a named argument.
    #[must_use]
    pub const fn value(&self) -> Option<&SqlValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::Named(_) => None,
        }
    }
}

/// Replaces named arguments with the supplied values.
///
/// If no argument is named, the rendered arguments are returned as values unchanged.
///
/// # Errors
///
/// Returns [`Error::MixedArgs`] when named and positional arguments are mixed and
/// [`Error::MissingNamedArg`] when a name has no value.
pub fn bind_named(args: Vec<Arg>, values: &HashMap<String, SqlValue>) -> Result<Vec<SqlValue>> {
    let named = args.iter().filter(|a| matches!(a, Arg::Named(_))).count();
    if named == 0 {
        return Ok(args
            .into_iter()
            .filter_map(|a| match a {
                Arg::Value(v) => Some(v),
                Arg::Named(_) => None,
            })
            .collect());
    }
    if named != args.len() {
        return Err(Error::MixedArgs);
    }

    args.into_iter()
        .map(|a| match a {
            Arg::Named(name) => values
                .get(&name)
                .cloned()
                .ok_or(Error::MissingNamedArg(name)),
            Arg::Value(v) => Ok(v),
        })
        .collect()
}
