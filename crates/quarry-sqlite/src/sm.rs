//! `SELECT` modifiers.
//!
//! SQLite has no select-specific extensions beyond [`Indexing`](crate::Indexing) on table
//! references, so this re-exports the shared modifiers.

pub use quarry_core::mods::sm::*;
