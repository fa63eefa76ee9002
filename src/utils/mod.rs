//! Utility modules shared across the crate.

pub mod fs;
pub mod hash;
pub mod path;
mod plural;

pub use plural::plural_count;
