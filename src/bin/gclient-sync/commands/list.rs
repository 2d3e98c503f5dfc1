//! `gclient-sync list` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalArgs, ListArgs};
use gclient_sync::ops::load_manifest;
use gclient_sync::util::Shell;
use gclient_sync::DepRecord;

pub fn execute(args: ListArgs, global: &GlobalArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = global.context()?;
    let config = ctx.load_config(&global.overrides())?;
    let loaded = load_manifest(ctx.root(), &config, shell)?;

    let records: Vec<&DepRecord> = loaded.deps.values().collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let width = records.iter().map(|r| r.path.len()).max().unwrap_or(0);
    for record in records {
        println!("{:<width$}  {}", record.path, record, width = width);
    }

    Ok(())
}
