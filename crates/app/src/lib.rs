//! Application service tying the local ledger to the spreadsheet mirror.
//!
//! Every mutation follows the same two-phase contract: phase 1 commits to
//! the local ledger and its cache (and is the only phase that can fail on
//! validation); phase 2 mirrors the change into the spreadsheet,
//! best-effort, and never rolls phase 1 back.

pub mod service;
pub mod status;

pub use service::{Committed, RemoteSync, Stockbook};
pub use status::SyncStatus;

/// Install process-wide logging. Safe to call repeatedly.
pub fn init_telemetry() {
    stockbook_observability::init();
}
