//! Core data structures: dependency records and the manifest pipeline.

pub mod dep;
pub mod manifest;

pub use dep::{DepRecord, DepSet};
pub use manifest::{parse_deps, parse_deps_file, parse_solutions, parse_vars};
