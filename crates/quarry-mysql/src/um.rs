//! `UPDATE` modifiers.

use quarry_core::query::{Modifier, UpdateQuery};

pub use quarry_core::mods::um::*;

/// `LOW_PRIORITY`.
#[must_use]
pub fn low_priority() -> impl Modifier<UpdateQuery> + Clone {
    modifier("LOW_PRIORITY")
}

/// `IGNORE`.
#[must_use]
pub fn ignore() -> impl Modifier<UpdateQuery> + Clone {
    modifier("IGNORE")
}
