//! Variable resolution and dependency extraction.
//!
//! The resolver is pure: it only sees parsed trees and the configuration,
//! never the filesystem.

pub mod extract;
pub mod passes;
pub mod vars;

pub use extract::{extract_deps, interpolate, passes_filter, rewrite_github, url_field};
pub use passes::{fold_constants, resolve, substitute_references, References};
pub use vars::{build_var_table, VarTable};
