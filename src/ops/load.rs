//! Manifest loading: pick a solutions file and extract its dependencies.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::dep::DepSet;
use crate::core::manifest::{parse_deps_file, parse_solutions};
use crate::util::config::SyncConfig;
use crate::util::diagnostic::suggestions;
use crate::util::shell::{Shell, Status};

/// Error context naming the manifest file a failure came from.
///
/// Attached with `with_context`, so callers can recover the path with
/// `anyhow::Error::downcast_ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContext {
    Parse(PathBuf),
    Read { path: PathBuf, named_by: PathBuf },
}

impl FileContext {
    pub fn path(&self) -> &Path {
        match self {
            FileContext::Parse(path) | FileContext::Read { path, .. } => path,
        }
    }
}

impl fmt::Display for FileContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileContext::Parse(path) => write!(f, "failed to parse {}", path.display()),
            FileContext::Read { path, named_by } => write!(
                f,
                "failed to read {} (named by {})",
                path.display(),
                named_by.display()
            ),
        }
    }
}

/// A fully extracted manifest.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    /// The solutions file that was used
    pub gclient_file: PathBuf,

    /// The DEPS file it named
    pub deps_file: PathBuf,

    /// Filtered dependencies
    pub deps: DepSet,
}

/// Load the first readable `gclient-file` candidate under `root`.
///
/// Candidates that cannot be read are skipped with a `Skipped` status line.
/// Once one is read, every later failure is fatal.
pub fn load_manifest(root: &Path, config: &SyncConfig, shell: &Shell) -> Result<LoadedManifest> {
    for candidate in &config.gclient_files {
        let path = root.join(candidate);
        match std::fs::read_to_string(&path) {
            Ok(text) => return load_from(root, path, &text, config),
            Err(e) => {
                tracing::debug!("cannot read {}: {}", path.display(), e);
                shell.status(Status::Skipped, format!("{} ({})", path.display(), e));
            }
        }
    }

    bail!(
        "no gclient file found in {} (tried: {})\nhelp: {}",
        root.display(),
        config.gclient_files.join(", "),
        suggestions::NO_GCLIENT_FILE
    )
}

fn load_from(root: &Path, gclient_file: PathBuf, text: &str, config: &SyncConfig) -> Result<LoadedManifest> {
    tracing::debug!("reading solutions from {}", gclient_file.display());

    let deps_name =
        parse_solutions(text).with_context(|| FileContext::Parse(gclient_file.clone()))?;

    let deps_file = root.join(&deps_name);
    let deps_text = std::fs::read_to_string(&deps_file).with_context(|| FileContext::Read {
        path: deps_file.clone(),
        named_by: gclient_file.clone(),
    })?;

    let deps =
        parse_deps_file(&deps_text, config).with_context(|| FileContext::Parse(deps_file.clone()))?;

    Ok(LoadedManifest {
        gclient_file,
        deps_file,
        deps,
    })
}
