//! Version-control collaborator interface.
//!
//! The reconciliation driver never runs git itself; it asks a [`Vcs`] to. Every
//! operation names the directory it runs in, so nothing depends on the
//! process working directory.

use std::path::Path;

use thiserror::Error;

/// Output fragments git prints when there was nothing to do.
pub const NO_CHANGE_SIGNATURES: &[&str] = &[
    "no changes added",
    "nothing to commit",
    "nothing added to commit",
];

/// Phrase a successful checkout prints.
pub const CHECKOUT_SENTINEL: &str = "HEAD is now at";

/// A failed version-control operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VcsError {
    #[error("`{command}` failed with exit code {}", display_code(.code))]
    Failure {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("failed to run `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("failed to create {path}: {message}")]
    Io { path: String, message: String },

    #[error("checkout of `{revision}` in {dir} was not confirmed")]
    Unconfirmed {
        dir: String,
        revision: String,
        output: String,
    },
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none (killed by signal)".to_string(), |c| c.to_string())
}

impl VcsError {
    /// Whether the tool reported that there was nothing to change.
    pub fn is_no_change(&self) -> bool {
        match self {
            VcsError::Failure { stdout, stderr, .. } => NO_CHANGE_SIGNATURES
                .iter()
                .any(|sig| stdout.contains(sig) || stderr.contains(sig)),
            _ => false,
        }
    }

    /// The tool's own output, for error reports.
    pub fn output(&self) -> Option<String> {
        let text = match self {
            VcsError::Failure { stdout, stderr, .. } => format!("{}{}", stdout, stderr),
            VcsError::Unconfirmed { output, .. } => output.clone(),
            VcsError::Spawn { .. } | VcsError::Io { .. } => return None,
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Operations the reconciliation driver needs from version control.
pub trait Vcs {
    /// Get the backend name for display.
    fn name(&self) -> &str;

    /// Register `location` as a new nested checkout `leaf` inside `dir`.
    ///
    /// `dir` may not exist yet.
    fn add_submodule(&mut self, dir: &Path, location: &str, leaf: &str) -> Result<(), VcsError>;

    /// Move the checkout at `dir` to `revision`, returning the tool's output.
    fn checkout(&mut self, dir: &Path, revision: &str) -> Result<String, VcsError>;

    /// Stage `path` (relative to `dir`) for commit.
    fn stage(&mut self, dir: &Path, path: &str) -> Result<(), VcsError>;

    /// Commit staged changes of the repository containing `dir`.
    fn commit(&mut self, dir: &Path, message: &str) -> Result<(), VcsError>;

    /// Whether `path` exists on disk.
    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
