//! gclient-sync CLI - mirror gclient DEPS as git submodules

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, SyncArgs};
use gclient_sync::ops::FileContext;
use gclient_sync::util::diagnostic::{emit, Diagnostic};
use gclient_sync::util::Shell;
use gclient_sync::{ManifestError, VcsError};

fn main() {
    let cli = Cli::parse();
    let shell = cli.global.shell();

    let filter = if cli.global.verbose {
        EnvFilter::new("gclient_sync=debug")
    } else if cli.global.quiet {
        EnvFilter::new("gclient_sync=error")
    } else {
        EnvFilter::new("gclient_sync=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(cli, &shell) {
        emit(&to_diagnostic(&e), shell.use_color());
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Arc<Shell>) -> Result<()> {
    match cli.command.unwrap_or(Commands::Sync(SyncArgs::default())) {
        Commands::Sync(args) => commands::sync::execute(args, &cli.global, shell),
        Commands::List(args) => commands::list::execute(args, &cli.global, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Render an error chain: manifest errors keep their own diagnostic, the
/// surrounding context becomes context lines and the failing manifest file
/// becomes the location.
fn to_diagnostic(err: &anyhow::Error) -> Diagnostic {
    let diag = describe(err);
    match err.downcast_ref::<FileContext>() {
        Some(file) => diag.with_location(file.path()),
        None => diag,
    }
}

fn describe(err: &anyhow::Error) -> Diagnostic {
    let Some(manifest) = err.downcast_ref::<ManifestError>() else {
        let mut diag = Diagnostic::error(err.to_string());
        for cause in err.chain().skip(1) {
            diag = diag.with_context(cause.to_string());
        }
        if let Some(output) = err.downcast_ref::<VcsError>().and_then(VcsError::output) {
            diag = diag.with_context(format!("git output:\n{}", output));
        }
        return diag;
    };

    err.chain()
        .take_while(|cause| !cause.is::<ManifestError>())
        .fold(manifest.to_diagnostic(), |diag, cause| {
            diag.with_context(cause.to_string())
        })
}
