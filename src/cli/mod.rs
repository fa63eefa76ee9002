//! Command-line interface module.

mod args;
pub mod sources;
pub mod version;
pub mod watch;

pub use args::{Cli, Commands, VersionArgs};
