//! Error types for rendering expressions and queries.

use std::fmt;

/// Errors that can occur while building or rendering SQL.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A clause was rendered without one of its mandatory parts.
    #[error("{0}")]
    MissingMandatory(&'static str),

    /// A raw fragment has a different number of `?` markers than arguments.
    #[error("Bad Statement: has {expected} placeholders but {got} args: {sql}")]
    PlaceholderMismatch {
        /// Number of placeholders found in the fragment.
        expected: usize,
        /// Number of arguments supplied.
        got: usize,
        /// The offending fragment.
        sql: String,
    },

    /// A placeholder refers to an argument that does not exist.
    #[error("placeholder {position} is out of range, only {available} args are available")]
    PlaceholderOutOfRange {
        /// The position that was requested.
        position: usize,
        /// How many arguments were available.
        available: usize,
    },

    /// The dialect cannot render named arguments.
    #[error("Dialect does not support named arguments")]
    NoNamedArgs,

    /// A named argument was rendered but no value was supplied for it.
    #[error("missing value for named argument '{0}'")]
    MissingNamedArg(String),

    /// Named and positional arguments were mixed in one query.
    #[error("cannot mix named and non-named arguments")]
    MixedArgs,

    /// The output sink returned an error.
    #[error("failed to write SQL: {0}")]
    Render(#[from] fmt::Error),

    /// Rendering was cancelled through the render context.
    #[error("rendering was cancelled")]
    Cancelled,

    /// The render deadline elapsed.
    #[error("render deadline exceeded")]
    DeadlineExceeded,

    /// A hook or contextual mod vetoed the render.
    #[error("hook failed: {0}")]
    Hook(String),

    /// A construct that the dialect or query type cannot express.
    #[error("not supported: {0}")]
    Unsupported(String),
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;
