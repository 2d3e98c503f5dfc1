//! Configuration for gclient-sync.
//!
//! Options are read, lowest to highest precedence, from:
//! - built-in defaults
//! - Global: `~/.gclient-sync/config.toml`
//! - Project: `<root>/.gclient-sync.toml`
//! - environment variables and command-line flags
//!
//! Every option is a semicolon-separated list. Empty segments are dropped, so
//! an empty string means "no entries".

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the project configuration file.
pub const PROJECT_CONFIG_NAME: &str = ".gclient-sync.toml";

/// Default manifest candidates, tried in order.
pub const DEFAULT_GCLIENT_FILES: &str = ".gclient;standalone.gclient";

/// Default path allow-list.
pub const DEFAULT_FILTER_DIRS: &str = "third_party";

/// Effective configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Candidate solutions files (`gclient-file`)
    pub gclient_files: Vec<String>,

    /// Path substrings a dependency must contain to be kept (`filter-dir`)
    pub filter_dirs: Vec<String>,

    /// Substrings that suppress the GitHub rewrite (`no-github`)
    pub no_github: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            gclient_files: split_list(DEFAULT_GCLIENT_FILES),
            filter_dirs: split_list(DEFAULT_FILTER_DIRS),
            no_github: Vec::new(),
        }
    }
}

/// A list option as written in TOML: either `"a;b"` or `["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionList {
    Joined(String),
    Items(Vec<String>),
}

impl OptionList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OptionList::Joined(s) => split_list(&s),
            OptionList::Items(items) => items
                .iter()
                .flat_map(|item| split_list(item))
                .collect(),
        }
    }
}

/// Contents of a configuration file. Absent keys leave the value unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConfigFile {
    pub gclient_file: Option<OptionList>,
    pub filter_dir: Option<OptionList>,
    pub no_github: Option<OptionList>,
}

impl ConfigFile {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub gclient_file: Option<String>,
    pub filter_dir: Option<String>,
    pub no_github: Option<String>,
}

impl SyncConfig {
    /// Merge a configuration file into this one (file takes precedence).
    pub fn merge(&mut self, file: ConfigFile) {
        if let Some(list) = file.gclient_file {
            self.gclient_files = list.into_vec();
        }
        if let Some(list) = file.filter_dir {
            self.filter_dirs = list.into_vec();
        }
        if let Some(list) = file.no_github {
            self.no_github = list.into_vec();
        }
    }

    /// Apply command-line/environment values (highest precedence).
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref s) = overrides.gclient_file {
            self.gclient_files = split_list(s);
        }
        if let Some(ref s) = overrides.filter_dir {
            self.filter_dirs = split_list(s);
        }
        if let Some(ref s) = overrides.no_github {
            self.no_github = split_list(s);
        }
    }

    /// Build the effective configuration.
    ///
    /// Missing files are skipped; a file that exists but does not parse is an
    /// error.
    pub fn load(
        global_path: Option<&Path>,
        project_path: &Path,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        let mut config = SyncConfig::default();

        for path in global_path.into_iter().chain(std::iter::once(project_path)) {
            if path.exists() {
                tracing::debug!("loading config from {}", path.display());
                config.merge(ConfigFile::load(path)?);
            }
        }

        config.apply_overrides(overrides);
        Ok(config)
    }
}

/// Split a semicolon-separated option value.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Get the global config directory (~/.gclient-sync).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".gclient-sync"))
}

/// Get the global config path (~/.gclient-sync/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (<root>/.gclient-sync.toml).
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(PROJECT_CONFIG_NAME)
}
