//! Modifiers for standalone `VALUES` statements.

pub use quarry_core::mods::vm::*;
