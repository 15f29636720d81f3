//! Set operations and row locking.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::expression::{write_names, Expression, SqlWriter};
use crate::query::Query;
use crate::value::Arg;

/// Set operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    /// `UNION`.
    Union,
    /// `INTERSECT`.
    Intersect,
    /// `EXCEPT`.
    Except,
}

impl SetOp {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }
}

/// `UNION [ALL] query`.
#[derive(Debug, Clone)]
pub struct Combine {
    /// The operator; a combine without one fails to render.
    pub strategy: Option<SetOp>,
    /// `ALL`.
    pub all: bool,
    /// The right-hand query.
    pub query: Arc<dyn Query>,
}

impl Expression for Combine {
    fn write_sql(&self, w: &mut SqlWriter<'_>, start: usize) -> Result<Vec<Arg>> {
        let strategy = self
            .strategy
            .ok_or(Error::MissingMandatory("Combination strategy must be set"))?;
        w.write_str(strategy.as_str())?;
        if self.all {
            w.write_str(" ALL")?;
        }
        w.write_char(' ')?;
        self.query.write_query(w, start)
    }
}

/// Lock strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStrength {
    /// `UPDATE`.
    Update,
    /// `NO KEY UPDATE`.
    NoKeyUpdate,
    /// `SHARE`.
    Share,
    /// `KEY SHARE`.
    KeyShare,
}

/// What to do with rows that are already locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockWait {
    /// `NOWAIT`.
    NoWait,
    /// `SKIP LOCKED`.
    SkipLocked,
}

/// `FOR strength [OF table, ...] [NOWAIT|SKIP LOCKED]`.
#[derive(Debug, Clone, Default)]
pub struct Lock {
    /// The strength; mandatory.
    pub strength: Option<LockStrength>,
    /// Tables restricted by `OF`.
    pub tables: Vec<String>,
    /// Wait policy.
    pub wait: Option<LockWait>,
}

impl Expression for Lock {
    fn write_sql(&self, w: &mut SqlWriter<'_>, _start: usize) -> Result<Vec<Arg>> {
        let strength = self
            .strength
            .ok_or(Error::MissingMandatory("lock strength must be set"))?;
        w.write_str(match strength {
            LockStrength::Update => "FOR UPDATE",
            LockStrength::NoKeyUpdate => "FOR NO KEY UPDATE",
            LockStrength::Share => "FOR SHARE",
            LockStrength::KeyShare => "FOR KEY SHARE",
        })?;
        if !self.tables.is_empty() {
            w.write_str(" OF ")?;
            write_names(w, &self.tables, true, ", ")?;
        }
        match self.wait {
            Some(LockWait::NoWait) => w.write_str(" NOWAIT")?,
            Some(LockWait::SkipLocked) => w.write_str(" SKIP LOCKED")?,
            None => {}
        }
        Ok(vec![])
    }
}
