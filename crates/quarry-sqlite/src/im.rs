//! `INSERT` modifiers.

use quarry_core::query::{InsertQuery, Modifier};

use crate::{or_action, OrAction};

pub use quarry_core::mods::im::*;

/// `INSERT OR <action>`.
#[must_use]
pub fn or(action: OrAction) -> impl Modifier<InsertQuery> + Clone {
    or_action(action)
}

/// `INSERT OR ABORT`.
#[must_use]
pub fn or_abort() -> impl Modifier<InsertQuery> + Clone {
    or(OrAction::Abort)
}

/// `INSERT OR FAIL`.
#[must_use]
pub fn or_fail() -> impl Modifier<InsertQuery> + Clone {
    or(OrAction::Fail)
}

/// `INSERT OR IGNORE`.
#[must_use]
pub fn or_ignore() -> impl Modifier<InsertQuery> + Clone {
    or(OrAction::Ignore)
}

/// `INSERT OR REPLACE`.
#[must_use]
pub fn or_replace() -> impl Modifier<InsertQuery> + Clone {
    or(OrAction::Replace)
}

/// `INSERT OR ROLLBACK`.
#[must_use]
pub fn or_rollback() -> impl Modifier<InsertQuery> + Clone {
    or(OrAction::Rollback)
}
