//! Credential bundle for the spreadsheet sync.

use serde::{Deserialize, Serialize};

use crate::error::{SheetsError, SheetsResult};

/// The five-field credential bundle stored under the
/// `google_sheets_config` cache key.
///
/// Field names are a compatibility contract with existing caches (hence
/// camelCase); "configured" means all five fields are non-empty. The
/// bundle is handed to the gateway at construction; swapping it is the
/// app's explicit reconfigure operation, never an implicit re-read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetsConfig {
    pub api_key: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub spreadsheet_id: String,
}

impl SheetsConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
            && !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.refresh_token.is_empty()
            && !self.spreadsheet_id.is_empty()
    }

    pub fn validate(&self) -> SheetsResult<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(SheetsError::NotConfigured)
        }
    }
}
