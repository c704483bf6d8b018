//! Sync error taxonomy.

use thiserror::Error;

/// Result type used across the sheets sync layer.
pub type SheetsResult<T> = Result<T, SheetsError>;

/// Failure of a remote sync operation.
///
/// Every variant is terminal for the attempt that produced it: sync errors
/// are surfaced once at the call site and never retried automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SheetsError {
    /// The credential bundle is incomplete. Checked before any network
    /// call; a short-circuit on this variant is not a sync attempt.
    #[error("Google Sheets not configured")]
    NotConfigured,

    /// The OAuth token exchange failed.
    #[error("token refresh failed: {0}")]
    Auth(String),

    /// Non-2xx response from the spreadsheet API.
    #[error("Google Sheets API error: {0} - {1}")]
    Api(u16, String),

    /// A row expected during update/delete was absent from the sheet.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport-level failure (connection, body decode).
    #[error("network error: {0}")]
    Network(String),
}
