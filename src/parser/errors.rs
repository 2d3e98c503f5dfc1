//! Manifest parsing error types and diagnostics.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Longest excerpt of manifest text carried inside an error.
const SNIPPET_LIMIT: usize = 80;

/// Error while extracting a dependency manifest.
///
/// Every variant is fatal: a manifest that fails any stage is never
/// partially trusted.
#[derive(Debug, Clone, PartialEq, Error, MietteDiagnostic)]
pub enum ManifestError {
    #[error("`{name}` is not followed by `=`")]
    #[diagnostic(code(gclient_sync::parse::missing_assignment))]
    MissingAssignment { name: String },

    #[error("`{name}` should be assigned a value starting with `{expected}`, found `{found}`")]
    #[diagnostic(code(gclient_sync::parse::unexpected_shape))]
    UnexpectedValueShape {
        name: String,
        expected: char,
        found: String,
    },

    #[error("invalid start character `{found}` at offset {index}")]
    #[diagnostic(code(gclient_sync::parse::invalid_start))]
    InvalidStartCharacter { index: usize, found: String },

    #[error("unable to find {what}")]
    #[diagnostic(code(gclient_sync::parse::not_found))]
    NotFound { what: String },

    #[error("unsupported syntax: {reason}")]
    #[diagnostic(code(gclient_sync::parse::unsupported_syntax))]
    UnsupportedSyntax { reason: String, snippet: String },

    #[error("unknown variable: `{name}`")]
    #[diagnostic(
        code(gclient_sync::resolve::unknown_variable),
        help("Define `{name}` in the `vars` block of the DEPS file")
    )]
    UnknownVariable { name: String },

    #[error("no revision for `{path}`: {value}")]
    #[diagnostic(
        code(gclient_sync::resolve::missing_revision),
        help("Dependency values must have the form `location@revision`")
    )]
    MissingRevision { path: String, value: String },
}

impl ManifestError {
    /// Build an `UnsupportedSyntax` error, clipping the excerpt.
    pub fn unsupported(reason: impl Into<String>, snippet: &str) -> Self {
        ManifestError::UnsupportedSyntax {
            reason: reason.into(),
            snippet: clip(snippet),
        }
    }

    /// Build a `NotFound` error.
    pub fn not_found(what: impl Into<String>) -> Self {
        ManifestError::NotFound { what: what.into() }
    }

    /// Convert to a user-friendly diagnostic, tagged with the error code.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = self.describe();
        if let Some(code) = MietteDiagnostic::code(self) {
            diag.message = format!("{} [{}]", diag.message, code);
        }
        diag
    }

    fn describe(&self) -> Diagnostic {
        match self {
            ManifestError::MissingAssignment { name } => {
                Diagnostic::error(format!("could not find an assignment to `{}`", name))
                    .with_context(format!("`{}` was found but is not followed by `=`", name))
                    .with_suggestion(format!(
                        "Make sure the file contains a top-level `{} = ...` statement",
                        name
                    ))
            }

            ManifestError::UnexpectedValueShape {
                name,
                expected,
                found,
            } => Diagnostic::error(format!("unexpected value for `{}`", name))
                .with_context(format!("expected `{}`, found `{}`", expected, found)),

            ManifestError::InvalidStartCharacter { index, found } => {
                Diagnostic::error(format!("cannot match brackets from `{}`", found))
                    .with_context(format!("at offset {}", index))
            }

            ManifestError::NotFound { what } => {
                Diagnostic::error(format!("unable to find {}", what))
                    .with_suggestion("Check that the manifest is complete and its brackets balance")
            }

            ManifestError::UnsupportedSyntax { reason, snippet } => {
                let mut diag = Diagnostic::error(format!("unsupported syntax: {}", reason));
                if !snippet.is_empty() {
                    diag = diag.with_context(format!("near `{}`", snippet));
                }
                diag
            }

            ManifestError::UnknownVariable { name } => {
                Diagnostic::error(format!("unknown variable `{}`", name))
                    .with_suggestion(format!("Define `{}` in the `vars` block", name))
            }

            ManifestError::MissingRevision { path, value } => {
                Diagnostic::error(format!("dependency `{}` has no revision", path))
                    .with_context(format!("value: {}", value))
                    .with_suggestion("Pin the dependency with `location@revision`")
            }
        }
    }
}

/// Clip a snippet to a single readable excerpt.
fn clip(snippet: &str) -> String {
    let trimmed = snippet.trim();
    match trimmed.char_indices().nth(SNIPPET_LIMIT) {
        Some((end, _)) => format!("{}...", &trimmed[..end]),
        None => trimmed.to_string(),
    }
}
