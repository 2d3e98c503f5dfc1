//! CLI definitions using clap.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use gclient_sync::util::config::ConfigOverrides;
use gclient_sync::util::shell::{ColorChoice, Shell};
use gclient_sync::util::GlobalContext;

/// gclient-sync - mirror gclient DEPS as git submodules
#[derive(Parser)]
#[command(name = "gclient-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Defaults to `sync`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Run as if started in DIR
    #[arg(short = 'C', long = "directory", value_name = "DIR", global = true)]
    pub directory: Option<PathBuf>,

    /// Coloring: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto", global = true)]
    pub color: ColorChoice,

    /// Semicolon-separated solutions files to try, in order
    #[arg(long, value_name = "FILES", env = "GCLIENT_SYNC_GCLIENT_FILE", global = true)]
    pub gclient_file: Option<String>,

    /// Semicolon-separated path fragments a dependency must contain (empty: keep all)
    #[arg(long, value_name = "DIRS", env = "GCLIENT_SYNC_FILTER_DIR", global = true)]
    pub filter_dir: Option<String>,

    /// Semicolon-separated fragments that keep a GitHub mirror location as-is
    #[arg(long, value_name = "PATTERNS", env = "GCLIENT_SYNC_NO_GITHUB", global = true)]
    pub no_github: Option<String>,
}

impl GlobalArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            gclient_file: self.gclient_file.clone(),
            filter_dir: self.filter_dir.clone(),
            no_github: self.no_github.clone(),
        }
    }

    pub fn context(&self) -> Result<GlobalContext> {
        match self.directory {
            Some(ref dir) => Ok(GlobalContext::with_root(dir.clone())),
            None => GlobalContext::new(),
        }
    }

    pub fn shell(&self) -> Arc<Shell> {
        Arc::new(Shell::from_flags(self.quiet, self.verbose, self.color))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add, check out and commit every dependency as a submodule
    Sync(SyncArgs),

    /// Print the resolved dependency set
    List(ListArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Default)]
pub struct SyncArgs {
    /// Show what would be done without running git
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
