//! Global context for gclient-sync operations.
//!
//! Holds the working root every relative path is resolved against, and the
//! location of the global configuration file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use git2::Repository;

use crate::util::config::{global_config_path, project_config_path, ConfigOverrides, SyncConfig};

/// Global context containing the working root and configuration paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Directory manifests are read from and dependency paths are relative to
    root: PathBuf,

    /// Global configuration file, if a home directory exists
    global_config: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a context rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_root(cwd))
    }

    /// Create a context rooted at `root`.
    pub fn with_root(root: PathBuf) -> Self {
        GlobalContext {
            root,
            global_config: global_config_path(),
        }
    }

    /// Replace the global configuration path (`None` disables it).
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config = path;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_config_path(&self) -> PathBuf {
        project_config_path(&self.root)
    }

    /// Build the effective configuration for this root.
    pub fn load_config(&self, overrides: &ConfigOverrides) -> Result<SyncConfig> {
        SyncConfig::load(
            self.global_config.as_deref(),
            &self.project_config_path(),
            overrides,
        )
    }

    /// Require the root to be inside a non-bare git work tree.
    ///
    /// Returns the top of that work tree.
    pub fn ensure_work_tree(&self) -> Result<PathBuf> {
        let repo = Repository::discover(&self.root).with_context(|| {
            format!("`{}` is not inside a git repository", self.root.display())
        })?;

        match repo.workdir() {
            Some(workdir) => Ok(workdir.to_path_buf()),
            None => bail!("`{}` is a bare git repository", self.root.display()),
        }
    }
}
