//! Reconciliation: bring nested checkouts in line with a dependency set.
//!
//! Each record becomes a git submodule at its path, checked out at its
//! revision and committed in the enclosing repository. Entries are handled
//! one at a time in path order; the first hard failure stops the run and
//! nothing already applied is undone.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::core::dep::{DepRecord, DepSet};
use crate::sources::vcs::{Vcs, VcsError, CHECKOUT_SENTINEL};
use crate::util::shell::{format_duration, Shell, Status};

/// Options for the sync operation.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Report what would happen without running any VCS command
    pub dry_run: bool,
}

/// What happened to one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Registered as a new submodule and committed
    Added,
    /// Existing checkout moved and committed
    Updated,
    /// Already at the recorded revision; nothing to commit
    Unchanged,
}

impl SyncAction {
    fn status(self) -> Status {
        match self {
            SyncAction::Added => Status::Added,
            SyncAction::Updated => Status::Updated,
            SyncAction::Unchanged => Status::Unchanged,
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncAction::Added => "added",
            SyncAction::Updated => "updated",
            SyncAction::Unchanged => "unchanged",
        };
        f.write_str(s)
    }
}

/// Outcome for a single dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEntry {
    pub path: String,
    pub revision: String,
    pub action: SyncAction,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub entries: Vec<SyncEntry>,
    pub dry_run: bool,
}

impl SyncReport {
    pub fn count(&self, action: SyncAction) -> usize {
        self.entries.iter().filter(|e| e.action == action).count()
    }
}

/// Commit message recorded for a reconciled dependency.
pub fn commit_message(leaf: &str, revision: &str) -> String {
    format!("update {} to {}", leaf, revision)
}

/// Reconcile every record of `deps` under `root`.
pub fn sync(
    root: &Path,
    deps: &DepSet,
    vcs: &mut dyn Vcs,
    shell: &Arc<Shell>,
    opts: &SyncOptions,
) -> Result<SyncReport> {
    let start = Instant::now();
    let mut report = SyncReport {
        entries: Vec::with_capacity(deps.len()),
        dry_run: opts.dry_run,
    };

    tracing::debug!("syncing {} dependencies with {}", deps.len(), vcs.name());
    let progress = shell.progress(deps.len() as u64, "Syncing");

    for record in deps.values() {
        let action = if opts.dry_run {
            plan_one(root, record, vcs)
        } else {
            sync_one(root, record, vcs)
                .with_context(|| format!("failed to sync `{}` to {}", record.path, record.revision))?
        };

        let verb = if opts.dry_run { " (dry run)" } else { "" };
        progress.status(
            action.status(),
            format!("{} at {}{}", record.path, record.revision, verb),
        );
        progress.inc();

        report.entries.push(SyncEntry {
            path: record.path.clone(),
            revision: record.revision.clone(),
            action,
        });
    }
    progress.finish();

    shell.status(
        Status::Finished,
        format!(
            "{} dependencies ({} added, {} updated, {} unchanged) in {}",
            report.entries.len(),
            report.count(SyncAction::Added),
            report.count(SyncAction::Updated),
            report.count(SyncAction::Unchanged),
            format_duration(start.elapsed())
        ),
    );

    Ok(report)
}

/// Directory holding the checkout, and the checkout itself.
fn checkout_dirs(root: &Path, record: &DepRecord) -> (PathBuf, PathBuf) {
    let (parent, leaf) = record.parent_and_leaf();
    let dir = parent.map_or_else(|| root.to_path_buf(), |p| root.join(p));
    let checkout = dir.join(leaf);
    (dir, checkout)
}

fn plan_one(root: &Path, record: &DepRecord, vcs: &dyn Vcs) -> SyncAction {
    let (_, checkout) = checkout_dirs(root, record);
    if vcs.path_exists(&checkout) {
        SyncAction::Updated
    } else {
        SyncAction::Added
    }
}

fn sync_one(root: &Path, record: &DepRecord, vcs: &mut dyn Vcs) -> Result<SyncAction, VcsError> {
    let (dir, checkout) = checkout_dirs(root, record);
    let (_, leaf) = record.parent_and_leaf();

    let existed = vcs.path_exists(&checkout);
    if !existed {
        tracing::info!("adding {} from {}", record.path, record.location);
        tolerate(vcs.add_submodule(&dir, &record.location, leaf))?;
    }

    let output = vcs.checkout(&checkout, &record.revision)?;
    if !output.contains(CHECKOUT_SENTINEL) {
        return Err(VcsError::Unconfirmed {
            dir: checkout.display().to_string(),
            revision: record.revision.clone(),
            output,
        });
    }

    tolerate(vcs.stage(&dir, leaf))?;
    let committed = tolerate(vcs.commit(&dir, &commit_message(leaf, &record.revision)))?;

    Ok(match (committed, existed) {
        (false, _) => SyncAction::Unchanged,
        (true, true) => SyncAction::Updated,
        (true, false) => SyncAction::Added,
    })
}

/// Treat a "nothing changed" failure as success. Returns whether anything
/// changed.
fn tolerate(result: Result<(), VcsError>) -> Result<bool, VcsError> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_no_change() => {
            tracing::debug!("{}: nothing to do", e);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
