//! User-visible sync status.

use serde::{Deserialize, Serialize};

/// Outcome of the most recent remote sync attempt.
///
/// The status is transient by design: it reflects only the last attempt,
/// and a failure leaves local and remote state diverged beyond this
/// signal. A not-configured short-circuit is not an attempt and leaves
/// the status untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Success,
    Error,
}
