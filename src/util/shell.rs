//! Centralized shell output and progress management.
//!
//! Status lines go to stderr as `{status:>12} {message}`, the way cargo
//! prints them. Standard output is reserved for command results such as
//! `list`.

use std::fmt::Display;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only, no progress
    Quiet,
    /// Default: status messages + progress bars
    #[default]
    Normal,
    /// --verbose: status lines only, no progress bars
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Added,
    Updated,
    Finished,

    // In-progress statuses (cyan)
    Reading,

    // Info statuses (blue)
    Unchanged,

    // Warning statuses (yellow)
    Skipped,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Added => "Added",
            Status::Updated => "Updated",
            Status::Finished => "Finished",
            Status::Reading => "Reading",
            Status::Unchanged => "Unchanged",
            Status::Skipped => "Skipped",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Added | Status::Updated | Status::Finished => "\x1b[1;32m",
            Status::Reading => "\x1b[1;36m",
            Status::Unchanged => "\x1b[1;34m",
            Status::Skipped => "\x1b[1;33m",
        }
    }
}

const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
}

impl Shell {
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };

        Shell {
            verbosity,
            use_color,
        }
    }

    /// Create a shell from CLI flags. Quiet wins over verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Shell::new(verbosity, color)
    }

    /// A shell that prints nothing, for tests and library callers.
    pub fn quiet() -> Self {
        Shell::new(Verbosity::Quiet, ColorChoice::Never)
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status message. Quiet mode prints none; errors are rendered
    /// separately as diagnostics.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        if self.use_color {
            format!("{}{:>width$}\x1b[0m", status.color_code(), text, width = STATUS_WIDTH)
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }

    /// Create a progress bar over `total` items.
    ///
    /// Only drawn in normal mode on a terminal.
    pub fn progress(self: &Arc<Self>, total: u64, msg: impl Display) -> Progress {
        let pb = if self.verbosity == Verbosity::Normal && total > 1 && io::stderr().is_terminal() {
            let pb = ProgressBar::new(total);
            if let Ok(style) =
                ProgressStyle::default_bar().template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.set_message(msg.to_string());
            Some(pb)
        } else {
            None
        };

        Progress {
            shell: Arc::clone(self),
            pb,
        }
    }
}

/// Progress bar wrapper that keeps status lines readable.
pub struct Progress {
    shell: Arc<Shell>,
    pb: Option<ProgressBar>,
}

impl Progress {
    /// Print a status line above the bar.
    pub fn status(&self, status: Status, msg: impl Display) {
        match &self.pb {
            Some(pb) => pb.suspend(|| self.shell.status(status, msg)),
            None => self.shell.status(status, msg),
        }
    }

    pub fn inc(&self) {
        if let Some(pb) = &self.pb {
            pb.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Format a duration in a human-readable way.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
