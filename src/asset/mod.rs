//! Asset versioning: content hashing, manifest and cleanup.

mod error;
pub mod manifest;
mod route;
pub mod version;

pub use version::{VersionOptions, VersionReport, Versioner};
