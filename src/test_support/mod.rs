//! Test utilities and mocks for gclient-sync unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use gclient_sync::test_support::{MockVcs, MockProcessOutput};
//!
//! let mut vcs = MockVcs::new();
//! vcs.expect_contains("commit", MockProcessOutput::failure(1, "nothing to commit"));
//! ```

pub mod fixtures;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::sources::vcs::{Vcs, VcsError, CHECKOUT_SENTINEL};

pub use fixtures::*;

/// Mock process output for a scripted VCS call.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockProcessOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn with_output(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    fn into_result(self, command: &str) -> Result<String, VcsError> {
        if self.status == 0 {
            Ok(self.stdout + &self.stderr)
        } else {
            Err(VcsError::Failure {
                command: command.to_string(),
                code: Some(self.status),
                stdout: self.stdout,
                stderr: self.stderr,
            })
        }
    }
}

/// Pattern for matching recorded commands.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    Exact(String),
    StartsWith(String),
    Contains(String),
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

/// Scripted output for the commands matching a pattern.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    pub pattern: CommandPattern,
    pub output: MockProcessOutput,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    pub used: usize,
}

impl CommandExpectation {
    pub fn new(pattern: CommandPattern, output: MockProcessOutput) -> Self {
        CommandExpectation {
            pattern,
            output,
            times: None,
            used: 0,
        }
    }

    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    fn available(&self) -> bool {
        self.times.is_none_or(|n| self.used < n)
    }
}

/// In-memory [`Vcs`] that records calls and replays scripted outputs.
///
/// Calls are recorded as `git` command lines prefixed with the directory
/// they run in, e.g. `[/w/src/third_party] git add zlib`. Unscripted calls
/// succeed; an unscripted checkout prints the checkout sentinel. A
/// successful submodule add makes the checkout path exist.
#[derive(Debug, Default)]
pub struct MockVcs {
    expectations: Vec<CommandExpectation>,
    calls: Vec<String>,
    existing: HashSet<PathBuf>,
}

impl MockVcs {
    pub fn new() -> Self {
        MockVcs::default()
    }

    /// Mark a path as already present on disk.
    pub fn add_existing(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.existing.insert(path.into());
        self
    }

    /// Script the output of commands containing `substring`.
    pub fn expect_contains(&mut self, substring: &str, output: MockProcessOutput) -> &mut Self {
        self.expectations.push(CommandExpectation::new(
            CommandPattern::Contains(substring.to_string()),
            output,
        ));
        self
    }

    /// Add a custom expectation.
    pub fn expect_pattern(&mut self, expectation: CommandExpectation) -> &mut Self {
        self.expectations.push(expectation);
        self
    }

    /// Get all commands that were called.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Recorded commands containing `substring`.
    pub fn calls_matching(&self, substring: &str) -> Vec<&str> {
        self.calls
            .iter()
            .filter(|c| c.contains(substring))
            .map(String::as_str)
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, dir: &Path, args: &[&str], default: MockProcessOutput) -> Result<String, VcsError> {
        let command = format!("git {}", args.join(" "));
        self.calls.push(format!("[{}] {}", dir.display(), command));

        let output = self
            .expectations
            .iter_mut()
            .find(|exp| exp.pattern.matches(&command) && exp.available())
            .map(|exp| {
                exp.used += 1;
                exp.output.clone()
            })
            .unwrap_or(default);

        output.into_result(&command)
    }
}

impl Vcs for MockVcs {
    fn name(&self) -> &str {
        "mock"
    }

    fn add_submodule(&mut self, dir: &Path, location: &str, leaf: &str) -> Result<(), VcsError> {
        self.record(
            dir,
            &["submodule", "add", "-f", location, leaf],
            MockProcessOutput::default(),
        )?;
        self.existing.insert(dir.join(leaf));
        Ok(())
    }

    fn checkout(&mut self, dir: &Path, revision: &str) -> Result<String, VcsError> {
        let sentinel = format!("{} {}\n", CHECKOUT_SENTINEL, revision);
        self.record(
            dir,
            &["checkout", revision],
            MockProcessOutput::with_output(0, "", sentinel),
        )
    }

    fn stage(&mut self, dir: &Path, path: &str) -> Result<(), VcsError> {
        self.record(dir, &["add", path], MockProcessOutput::default())
            .map(drop)
    }

    fn commit(&mut self, dir: &Path, message: &str) -> Result<(), VcsError> {
        self.record(dir, &["commit", "-m", message], MockProcessOutput::default())
            .map(drop)
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.existing.contains(path)
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_vcs_records_calls() {
        let mut vcs = MockVcs::new();
        let dir = Path::new("/w/src");

        vcs.add_submodule(dir, "https://example.com/a.git", "a").unwrap();
        assert!(vcs.path_exists(&dir.join("a")));

        let output = vcs.checkout(&dir.join("a"), "abc").unwrap();
        assert!(output.contains("HEAD is now at abc"));

        assert_eq!(
            vcs.calls(),
            &[
                "[/w/src] git submodule add -f https://example.com/a.git a".to_string(),
                "[/w/src/a] git checkout abc".to_string(),
            ]
        );
    }

    #[test]
    fn test_mock_vcs_expectation_times() {
        let mut vcs = MockVcs::new();
        vcs.expect_pattern(
            CommandExpectation::new(
                CommandPattern::StartsWith("git commit".to_string()),
                MockProcessOutput::success(""),
            )
            .times(1),
        )
        .expect_contains(
            "commit",
            MockProcessOutput::with_output(1, "nothing to commit, working tree clean", ""),
        );

        let dir = Path::new("/w");
        assert!(vcs.commit(dir, "first").is_ok());
        let err = vcs.commit(dir, "second").unwrap_err();
        assert!(err.is_no_change());
    }
}
