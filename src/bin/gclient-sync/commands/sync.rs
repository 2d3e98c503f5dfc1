//! `gclient-sync sync` command

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, SyncArgs};
use gclient_sync::ops::{self, load_manifest, SyncOptions};
use gclient_sync::util::diagnostic::suggestions;
use gclient_sync::util::shell::{Shell, Status};
use gclient_sync::GitCli;

pub fn execute(args: SyncArgs, global: &GlobalArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = global.context()?;
    let config = ctx.load_config(&global.overrides())?;
    tracing::debug!("configuration: {:?}", config);

    let loaded = load_manifest(ctx.root(), &config, shell)?;
    shell.status(
        Status::Reading,
        format!(
            "{} ({} dependencies)",
            loaded.deps_file.display(),
            loaded.deps.len()
        ),
    );

    let workdir = ctx
        .ensure_work_tree()
        .with_context(|| format!("cannot sync submodules\nhelp: {}", suggestions::NOT_A_WORK_TREE))?;
    tracing::debug!("superproject at {}", workdir.display());

    let mut vcs = GitCli::new()?;
    let opts = SyncOptions {
        dry_run: args.dry_run,
    };

    ops::sync(ctx.root(), &loaded.deps, &mut vcs, shell, &opts)?;
    Ok(())
}
