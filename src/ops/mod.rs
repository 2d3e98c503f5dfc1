//! High-level operations.

pub mod load;
pub mod sync;

pub use load::{load_manifest, FileContext, LoadedManifest};
pub use sync::{commit_message, sync, SyncAction, SyncEntry, SyncOptions, SyncReport};
