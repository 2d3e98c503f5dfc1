//! The two-stage gclient manifest.
//!
//! A solutions file (`.gclient`) holds `solutions = [ ... ]`, whose entries
//! name a DEPS file through `deps_file`. The DEPS file holds `vars = { ... }`
//! and `deps = { ... }`.

use crate::core::dep::DepSet;
use crate::parser::{
    find_first, locate_assignment, normalize_comments, parse, Delimiter, ExprNode, ManifestError,
    Node, Pattern,
};
use crate::resolver::{build_var_table, extract_deps, resolve, References, VarTable};
use crate::util::config::SyncConfig;

/// Top-level assignment holding the solution list.
pub const SOLUTIONS: &str = "solutions";

/// Top-level assignment holding variables.
pub const VARS: &str = "vars";

/// Top-level assignment holding dependencies.
pub const DEPS: &str = "deps";

/// Solution property naming the DEPS file.
pub const DEPS_FILE: &str = "deps_file";

/// Carve, normalize and parse one top-level assignment.
fn parse_region(name: &str, text: &str, shape: Delimiter) -> Result<ExprNode, ManifestError> {
    let region = locate_assignment(name, text, shape)?;
    parse(&normalize_comments(region))
}

/// Name of the DEPS file referenced by a solutions file.
pub fn parse_solutions(text: &str) -> Result<String, ManifestError> {
    let tree = parse_region(SOLUTIONS, text, Delimiter::Bracket)?;

    let prop = find_first(&Pattern::property_named(DEPS_FILE), &tree)
        .and_then(Node::as_property)
        .ok_or_else(|| ManifestError::not_found(format!("`{}` in `{}`", DEPS_FILE, SOLUTIONS)))?;

    match prop.value.as_literal().and_then(|lit| lit.as_str()) {
        Some(deps_file) => Ok(deps_file.to_string()),
        None => Err(ManifestError::unsupported(
            format!("`{}` must be a string", DEPS_FILE),
            &prop.value.to_string(),
        )),
    }
}

/// The `vars` table of a DEPS file.
pub fn parse_vars(text: &str) -> Result<VarTable, ManifestError> {
    let tree = parse_region(VARS, text, Delimiter::Brace)?;
    build_var_table(&tree)
}

/// The filtered dependency set of a DEPS file, given its variables.
pub fn parse_deps(text: &str, vars: &VarTable, config: &SyncConfig) -> Result<DepSet, ManifestError> {
    let tree = parse_region(DEPS, text, Delimiter::Brace)?;
    let tree = resolve(tree, vars, References::VarCalls)?;
    extract_deps(&tree, vars, config)
}

/// Parse a whole DEPS file.
pub fn parse_deps_file(text: &str, config: &SyncConfig) -> Result<DepSet, ManifestError> {
    let vars = parse_vars(text)?;
    let deps = parse_deps(text, &vars, config)?;
    tracing::debug!("{} vars, {} deps after filtering", vars.len(), deps.len());
    Ok(deps)
}
