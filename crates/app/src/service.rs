//! The `Stockbook` service: local-first mutations with best-effort
//! spreadsheet mirroring.

use std::future::Future;

use chrono::Utc;
use tokio::sync::watch;

use stockbook_core::{DomainResult, ItemId};
use stockbook_inventory::{Item, ItemPatch, NewItem, NewMovement, StockAggregates, StockMovement};
use stockbook_reports::{
    build_report, recent_movements, to_csv, DateRange, InventorySummary, Report, ReportKind,
};
use stockbook_sheets::{SheetsConfig, SheetsError, SheetsMirror, SheetsResult};
use stockbook_store::{keys, KeyValueStore, LocalLedger};

use crate::status::SyncStatus;

/// Phase-2 outcome attached to a committed local mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSync {
    /// No credential bundle is stored; no network attempt was made.
    NotConfigured,
    Synced,
    Failed(SheetsError),
}

/// A local mutation that has committed, plus the best-effort remote
/// outcome. The record is authoritative either way.
#[derive(Debug, Clone)]
pub struct Committed<T> {
    pub record: T,
    pub remote: RemoteSync,
}

/// Application service owning the ledger, the credential slot and the
/// optional mirror.
///
/// Local commits strictly precede their remote sync attempt; remote
/// failures are reported in the returned [`Committed`], reflected in the
/// status channel and logged once, never retried and never rolled back.
pub struct Stockbook<K> {
    ledger: LocalLedger<K>,
    kv: K,
    mirror: Option<SheetsMirror>,
    status: watch::Sender<SyncStatus>,
}

impl<K: KeyValueStore + Clone> Stockbook<K> {
    /// Load local state from the cache and connect the mirror when a
    /// complete credential bundle is already stored.
    pub fn open(kv: K) -> Self {
        let config = load_config(&kv);
        let mirror = build_mirror(&config);
        Self::assemble(kv, mirror)
    }

    /// Open with an explicit mirror, bypassing the stored bundle. For
    /// tests and embedders that construct their own `SheetsApi`.
    pub fn with_mirror(kv: K, mirror: SheetsMirror) -> Self {
        Self::assemble(kv, Some(mirror))
    }

    fn assemble(kv: K, mirror: Option<SheetsMirror>) -> Self {
        let ledger = LocalLedger::load(kv.clone());
        let (status, _) = watch::channel(SyncStatus::Idle);
        Self {
            ledger,
            kv,
            mirror,
            status,
        }
    }

    /// Whether a mirror is active (a complete bundle was provided).
    pub fn is_configured(&self) -> bool {
        self.mirror.is_some()
    }

    // Mutations, two-phase.

    pub async fn create_item(&self, draft: NewItem) -> DomainResult<Committed<Item>> {
        let item = self.ledger.create_item(draft)?;
        let remote = match &self.mirror {
            None => RemoteSync::NotConfigured,
            Some(mirror) => self.attempt(mirror.push_item_created(&item)).await,
        };
        Ok(Committed {
            record: item,
            remote,
        })
    }

    pub async fn update_item(&self, id: ItemId, patch: ItemPatch) -> DomainResult<Committed<Item>> {
        let item = self.ledger.update_item(id, patch)?;
        let remote = match &self.mirror {
            None => RemoteSync::NotConfigured,
            Some(mirror) => self.attempt(mirror.push_item_updated(&item)).await,
        };
        Ok(Committed {
            record: item,
            remote,
        })
    }

    /// Delete an item, cascading its local movements. The remote master
    /// row is removed best-effort; the remote history sheet is never
    /// touched.
    pub async fn delete_item(&self, id: ItemId) -> DomainResult<Committed<Item>> {
        let removed = self.ledger.delete_item(id)?;
        let remote = match &self.mirror {
            None => RemoteSync::NotConfigured,
            Some(mirror) => self.attempt(mirror.push_item_deleted(removed.code())).await,
        };
        Ok(Committed {
            record: removed,
            remote,
        })
    }

    /// Record a movement and refresh its item's stock figures, then mirror
    /// the history append plus the refreshed snapshot row.
    pub async fn record_movement(
        &self,
        draft: NewMovement,
    ) -> DomainResult<Committed<(StockMovement, Item)>> {
        let (movement, item) = self.ledger.record_movement(draft)?;
        let remote = match &self.mirror {
            None => RemoteSync::NotConfigured,
            Some(mirror) => self.attempt(mirror.push_movement(&item, &movement)).await,
        };
        Ok(Committed {
            record: (movement, item),
            remote,
        })
    }

    // Reads.

    pub fn items(&self) -> Vec<Item> {
        self.ledger.list_items()
    }

    pub fn item(&self, id: ItemId) -> DomainResult<Item> {
        self.ledger.get_item(id)
    }

    pub fn movements(&self) -> Vec<StockMovement> {
        self.ledger.list_movements()
    }

    pub fn movements_for(&self, id: ItemId) -> Vec<StockMovement> {
        self.ledger.movements_for(id)
    }

    pub fn aggregates_for(&self, id: ItemId) -> StockAggregates {
        self.ledger.aggregates_for(id)
    }

    // Reports and dashboard.

    pub fn report(&self, kind: ReportKind, range: DateRange) -> Report {
        build_report(
            kind,
            range,
            &self.ledger.list_items(),
            &self.ledger.list_movements(),
            Utc::now(),
        )
    }

    pub fn report_csv(&self, kind: ReportKind, range: DateRange) -> String {
        to_csv(&self.report(kind, range))
    }

    pub fn summary(&self) -> InventorySummary {
        InventorySummary::compute(&self.ledger.list_items())
    }

    pub fn recent_movements(&self, limit: usize) -> Vec<StockMovement> {
        recent_movements(&self.ledger.list_movements(), limit)
    }

    // Sync management.

    /// Check the connection and report the spreadsheet title.
    pub async fn test_connection(&self) -> SheetsResult<String> {
        let mirror = self.mirror.as_ref().ok_or(SheetsError::NotConfigured)?;
        self.status.send_replace(SyncStatus::Syncing);
        match mirror.test_connection().await {
            Ok(title) => {
                self.status.send_replace(SyncStatus::Success);
                Ok(title)
            }
            Err(err) => {
                tracing::warn!("connection test failed: {err}");
                self.status.send_replace(SyncStatus::Error);
                Err(err)
            }
        }
    }

    /// Explicitly provision the master sheet (the setup flow's action).
    pub async fn provision_master_sheet(&self) -> SheetsResult<()> {
        let mirror = self.mirror.as_ref().ok_or(SheetsError::NotConfigured)?;
        mirror.provision_master_sheet().await
    }

    /// Persist a new credential bundle and rebuild the mirror from it. An
    /// incomplete bundle disables mirroring instead of failing.
    pub fn reconfigure(&mut self, config: SheetsConfig) {
        match serde_json::to_string(&config) {
            Ok(json) => self.kv.set(keys::SHEETS_CONFIG, &json),
            Err(err) => tracing::error!("failed to serialize sheets config: {err}"),
        }
        self.mirror = build_mirror(&config);
        self.status.send_replace(SyncStatus::Idle);
    }

    /// Status of the most recent sync attempt.
    pub fn sync_status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    pub fn subscribe_sync_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Drive one remote attempt: Syncing, then Success or Error. Failures
    /// are logged once here and surfaced to the caller; no retries.
    async fn attempt<F>(&self, push: F) -> RemoteSync
    where
        F: Future<Output = SheetsResult<()>>,
    {
        self.status.send_replace(SyncStatus::Syncing);
        match push.await {
            Ok(()) => {
                self.status.send_replace(SyncStatus::Success);
                RemoteSync::Synced
            }
            Err(err) => {
                tracing::warn!("remote sync failed: {err}");
                self.status.send_replace(SyncStatus::Error);
                RemoteSync::Failed(err)
            }
        }
    }
}

fn load_config<K: KeyValueStore>(kv: &K) -> SheetsConfig {
    match kv.get(keys::SHEETS_CONFIG) {
        None => SheetsConfig::default(),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("corrupt sheets config in cache, ignoring: {err}");
                SheetsConfig::default()
            }
        },
    }
}

fn build_mirror(config: &SheetsConfig) -> Option<SheetsMirror> {
    if !config.is_configured() {
        return None;
    }
    match SheetsMirror::connect(config) {
        Ok(mirror) => Some(mirror),
        Err(err) => {
            tracing::warn!("sheets mirror unavailable: {err}");
            None
        }
    }
}
