//! User-facing diagnostic messages.
//!
//! Every error shown at the top level names its cause and, where one exists,
//! a way to fix it.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// No solutions file could be opened.
    pub const NO_GCLIENT_FILE: &str =
        "Run inside the checkout root, or name the file with `--gclient-file`";

    /// Sync was started outside a git work tree.
    pub const NOT_A_WORK_TREE: &str =
        "Run `git init` first, or point `-C` at the superproject";

    /// Git is not installed or not on PATH.
    pub const GIT_NOT_FOUND: &str = "Install git, or set `GIT` to its path";
}

/// An error message with optional context and suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// The file the problem was found in
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let label = if color { "\x1b[1;31merror\x1b[0m" } else { "error" };
        output.push_str(&format!("{}: {}\n", label, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            if let [only] = self.suggestions.as_slice() {
                output.push_str(&format!("{}: {}\n", help_prefix, only));
            } else {
                output.push_str(&format!("{}: consider:\n", help_prefix));
                for (i, suggestion) in self.suggestions.iter().enumerate() {
                    output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
                }
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
