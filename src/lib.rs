//! gclient-sync - mirror a gclient checkout as git submodules
//!
//! This crate reads a `.gclient` solutions file and the DEPS file it names,
//! resolves the DEPS variables and string concatenations into a flat map of
//! dependency paths to pinned revisions, and reconciles a git superproject
//! against that map by adding, checking out and committing submodules.

pub mod core;
pub mod ops;
pub mod parser;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and mocks for unit tests.
#[cfg(test)]
pub mod test_support;

pub use self::core::{DepRecord, DepSet};
pub use parser::ManifestError;
pub use sources::{GitCli, Vcs, VcsError};
pub use util::config::SyncConfig;
pub use util::context::GlobalContext;
