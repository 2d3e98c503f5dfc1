//! Git backend: runs the `git` command line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::sources::vcs::{Vcs, VcsError};
use crate::util::diagnostic::suggestions;
use crate::util::process::{find_git, ProcessBuilder};

/// [`Vcs`] implementation that shells out to git.
#[derive(Debug, Clone)]
pub struct GitCli {
    git: PathBuf,
}

impl GitCli {
    /// Locate git on PATH (or through `GIT`).
    pub fn new() -> Result<Self> {
        let git = find_git()
            .with_context(|| format!("git executable not found\nhelp: {}", suggestions::GIT_NOT_FOUND))?;
        tracing::debug!("using git at {}", git.display());
        Ok(GitCli { git })
    }

    /// Use a specific git executable.
    pub fn with_executable(git: impl Into<PathBuf>) -> Self {
        GitCli { git: git.into() }
    }

    fn command(&self, dir: &Path) -> ProcessBuilder {
        // Output is matched against English phrases.
        ProcessBuilder::new(&self.git)
            .cwd(dir)
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
    }

    /// Run a command, returning stdout and stderr on success.
    fn run(&self, cmd: ProcessBuilder) -> Result<(String, String), VcsError> {
        let command = cmd.get_args().join(" ");
        let output = cmd.exec().map_err(|e| VcsError::Spawn {
            command: format!("git {}", command),
            message: format!("{:#}", e),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            Ok((stdout, stderr))
        } else {
            Err(VcsError::Failure {
                command: format!("git {}", command),
                code: output.status.code(),
                stdout,
                stderr,
            })
        }
    }
}

impl Vcs for GitCli {
    fn name(&self) -> &str {
        "git"
    }

    fn add_submodule(&mut self, dir: &Path, location: &str, leaf: &str) -> Result<(), VcsError> {
        std::fs::create_dir_all(dir).map_err(|e| VcsError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        self.run(
            self.command(dir)
                .args(["submodule", "add", "-f", location, leaf]),
        )?;
        Ok(())
    }

    fn checkout(&mut self, dir: &Path, revision: &str) -> Result<String, VcsError> {
        let (stdout, stderr) = self.run(self.command(dir).args(["checkout", revision]))?;
        Ok(stdout + &stderr)
    }

    fn stage(&mut self, dir: &Path, path: &str) -> Result<(), VcsError> {
        self.run(self.command(dir).args(["add", path]))?;
        Ok(())
    }

    fn commit(&mut self, dir: &Path, message: &str) -> Result<(), VcsError> {
        self.run(self.command(dir).args(["commit", "-m", message]))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        find_git().is_some()
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_AUTHOR_NAME", "test")
            .env("GIT_AUTHOR_EMAIL", "test@example.com")
            .env("GIT_COMMITTER_NAME", "test")
            .env("GIT_COMMITTER_EMAIL", "test@example.com")
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    #[test]
    fn test_missing_executable_is_spawn_error() {
        let mut vcs = GitCli::with_executable("/nonexistent/git");
        let tmp = TempDir::new().unwrap();
        let err = vcs.stage(tmp.path(), "x").unwrap_err();
        assert!(matches!(err, VcsError::Spawn { ref command, .. } if command == "git add x"));
    }

    #[test]
    fn test_failure_carries_output() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let mut vcs = GitCli::new().unwrap();

        // Not a repository.
        let err = vcs.checkout(tmp.path(), "deadbeef").unwrap_err();
        match err {
            VcsError::Failure { command, stderr, .. } => {
                assert_eq!(command, "git checkout deadbeef");
                assert!(!stderr.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_checkout_reports_sentinel() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path();
        git(repo, &["init", "-q"]);
        std::fs::write(repo.join("a.txt"), "a").unwrap();
        git(repo, &["add", "a.txt"]);
        git(repo, &["commit", "-q", "-m", "first"]);

        let mut vcs = GitCli::new().unwrap();
        let output = vcs.checkout(repo, "HEAD~0").unwrap();
        assert!(output.contains(crate::sources::vcs::CHECKOUT_SENTINEL));
    }
}
