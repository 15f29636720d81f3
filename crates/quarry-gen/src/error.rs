//! Transpiler errors.

use std::path::PathBuf;

use quarry_core::parser::ParseError;
use quarry_core::Span;

use crate::edit::EditError;

/// Errors raised while transpiling SQL files.
///
/// Every variant that comes from a statement carries the byte range of the offending
/// source text, relative to the statement's file.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// The parser rejected the statement.
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),

    /// The statement parses but uses a construct the transpiler does not handle.
    #[error("{message} at position {span}")]
    Unsupported { span: Span, message: String },

    /// A table or column has no match in the catalog or the sources in scope.
    #[error("{message} at position {span}")]
    SchemaLookup { span: Span, message: String },

    /// Two type constraints on one node have nothing in common.
    #[error("{message} at position {span}")]
    TypeConflict { span: Span, message: String },

    /// A function call or value list has the wrong shape.
    #[error("{message} at position {span}")]
    Argument { span: Span, message: String },

    /// The rewrite rules for a statement are inconsistent.
    #[error("edit failed: {0}")]
    Edit(#[from] EditError),

    /// A file or folder could not be read.
    #[error("{path}: {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schema catalog is not valid JSON.
    #[error("invalid schema catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    /// An error inside a specific SQL file.
    #[error("{path}: {source}", path = path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<GenError>,
    },

    /// Several statements or files failed; each error is kept in the order it was found.
    #[error("{} failures, first: {}", .0.len(), .0.first().map_or_else(String::new, ToString::to_string))]
    Multiple(Vec<GenError>),
}

impl GenError {
    pub(crate) fn unsupported(span: Span, message: impl Into<String>) -> Self {
        Self::Unsupported {
            span,
            message: message.into(),
        }
    }

    pub(crate) fn lookup(span: Span, message: impl Into<String>) -> Self {
        Self::SchemaLookup {
            span,
            message: message.into(),
        }
    }

    pub(crate) fn conflict(span: Span, message: impl Into<String>) -> Self {
        Self::TypeConflict {
            span,
            message: message.into(),
        }
    }

    pub(crate) fn argument(span: Span, message: impl Into<String>) -> Self {
        Self::Argument {
            span,
            message: message.into(),
        }
    }

    /// The source range of the error, when it comes from a statement.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Parse(e) => Some(e.span),
            Self::Unsupported { span, .. }
            | Self::SchemaLookup { span, .. }
            | Self::TypeConflict { span, .. }
            | Self::Argument { span, .. } => Some(*span),
            Self::Edit(e) => Some(e.span()),
            Self::File { source, .. } => source.span(),
            Self::Io { .. } | Self::Catalog(_) | Self::Multiple(_) => None,
        }
    }

    /// Shifts statement-relative spans so they point into the whole file.
    #[must_use]
    pub(crate) fn offset(self, by: usize) -> Self {
        let shift = |s: Span| Span::new(s.start + by, s.end + by);
        match self {
            Self::Parse(mut e) => {
                e.span = shift(e.span);
                Self::Parse(e)
            }
            Self::Unsupported { span, message } => Self::Unsupported {
                span: shift(span),
                message,
            },
            Self::SchemaLookup { span, message } => Self::SchemaLookup {
                span: shift(span),
                message,
            },
            Self::TypeConflict { span, message } => Self::TypeConflict {
                span: shift(span),
                message,
            },
            Self::Argument { span, message } => Self::Argument {
                span: shift(span),
                message,
            },
            other => other,
        }
    }

    /// Collapses a list of errors: one error stays itself, several become [`GenError::Multiple`].
    pub(crate) fn collect(mut errors: Vec<Self>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }
}

/// Result type for transpiler operations.
pub type Result<T> = std::result::Result<T, GenError>;
