//! Version-control backends.

pub mod git;
pub mod vcs;

pub use git::GitCli;
pub use vcs::{Vcs, VcsError};
