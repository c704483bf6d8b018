//! Facade over the sync operations, driven by the app layer after each
//! local commit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use stockbook_inventory::{Item, ItemCode, StockMovement};

use crate::config::SheetsConfig;
use crate::error::SheetsResult;
use crate::gateway::{HttpSheetsApi, SheetsApi, SheetsGateway};
use crate::history::append_history_row;
use crate::master::{append_master_row, delete_master_row, update_master_row};
use crate::provision::{ensure_item_sheet, ensure_master_sheet};

/// Remote mirror of the local ledger.
///
/// The spreadsheet has no transaction or row-lock primitive, so the
/// master-sheet scan-then-write sequence is racy between concurrent
/// writers for the same code. The mirror holds one async lock per item
/// code and serializes that code's remote writes behind it; writes for
/// different codes still interleave freely and land in no guaranteed
/// order.
pub struct SheetsMirror {
    api: Arc<dyn SheetsApi>,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SheetsMirror {
    /// Mirror over the real HTTP API for a configured credential bundle.
    pub fn connect(config: &SheetsConfig) -> SheetsResult<Self> {
        let gateway = SheetsGateway::new(config)?;
        Ok(Self::new(Arc::new(HttpSheetsApi::new(gateway))))
    }

    pub fn new(api: Arc<dyn SheetsApi>) -> Self {
        Self {
            api,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch spreadsheet metadata and report the spreadsheet's title.
    pub async fn test_connection(&self) -> SheetsResult<String> {
        let meta = self.api.spreadsheet_meta().await?;
        Ok(meta.title)
    }

    /// Explicitly provision the master sheet (the setup flow's action).
    pub async fn provision_master_sheet(&self) -> SheetsResult<()> {
        ensure_master_sheet(self.api.as_ref()).await
    }

    /// Mirror a newly created item: its master row plus its history sheet.
    pub async fn push_item_created(&self, item: &Item) -> SheetsResult<()> {
        let _guard = self.lock_code(item.code()).await;
        ensure_master_sheet(self.api.as_ref()).await?;
        append_master_row(self.api.as_ref(), item).await?;
        ensure_item_sheet(self.api.as_ref(), item.code()).await
    }

    /// Mirror an edited item by rewriting its master row in place.
    pub async fn push_item_updated(&self, item: &Item) -> SheetsResult<()> {
        let _guard = self.lock_code(item.code()).await;
        ensure_master_sheet(self.api.as_ref()).await?;
        update_master_row(self.api.as_ref(), item).await
    }

    /// Mirror a deletion by removing the master row. The history sheet is
    /// left behind; its rows are write-once.
    pub async fn push_item_deleted(&self, code: &ItemCode) -> SheetsResult<()> {
        let _guard = self.lock_code(code).await;
        delete_master_row(self.api.as_ref(), code).await
    }

    /// Mirror a recorded movement: append it to the item's history sheet,
    /// then rewrite the master row so the snapshot carries the new figures.
    /// The two writes are independent best-effort steps; a failure between
    /// them leaves the history ahead of the snapshot until the next sync.
    pub async fn push_movement(&self, item: &Item, movement: &StockMovement) -> SheetsResult<()> {
        let _guard = self.lock_code(item.code()).await;
        append_history_row(self.api.as_ref(), item.code(), movement, item.aggregates()).await?;
        update_master_row(self.api.as_ref(), item).await
    }

    async fn lock_code(&self, code: &ItemCode) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(code.as_str().to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SheetsError;
    use crate::memory::InMemorySheets;
    use crate::provision::MASTER_SHEET;
    use chrono::Utc;
    use serde_json::json;
    use stockbook_inventory::{MovementEntry, NewItem, NewMovement, StockAggregates};

    fn test_item(code: &str) -> Item {
        let draft = NewItem {
            code: Some(ItemCode::new(code).unwrap()),
            name: "Smart Watch".to_string(),
            category: "Electronics".to_string(),
            supplier: "Tech Supplier B".to_string(),
            price: 20000,
            cost_price: 8000,
            low_stock_threshold: None,
        };
        Item::create(draft, Utc::now()).unwrap()
    }

    fn mirror_over(api: Arc<InMemorySheets>) -> SheetsMirror {
        SheetsMirror::new(api)
    }

    #[tokio::test]
    async fn item_creation_provisions_master_and_history_sheets() {
        let api = Arc::new(InMemorySheets::new("Inventory"));
        let mirror = mirror_over(Arc::clone(&api));
        let item = test_item("ITM-001");

        mirror.push_item_created(&item).await.unwrap();

        assert_eq!(
            api.sheet_titles(),
            vec![MASTER_SHEET.to_string(), "ITM-001_Stock".to_string()]
        );
        let rows = api.rows(MASTER_SHEET).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "ITM-001");
    }

    #[tokio::test]
    async fn movement_push_appends_history_and_refreshes_the_snapshot() {
        let api = Arc::new(InMemorySheets::new("Inventory"));
        let mirror = mirror_over(Arc::clone(&api));
        let mut item = test_item("ITM-001");
        mirror.push_item_created(&item).await.unwrap();

        item.apply_aggregates(StockAggregates {
            total_stock: 50,
            sold_quantity: 0,
            remaining_stock: 50,
        });
        let movement = StockMovement::record(
            NewMovement::new(item.id(), MovementEntry::Restock { quantity: 50 }),
            Utc::now(),
        )
        .unwrap();

        mirror.push_movement(&item, &movement).await.unwrap();

        let history = api.rows("ITM-001_Stock").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1][2], json!(50));

        let master = api.rows(MASTER_SHEET).unwrap();
        assert_eq!(master[1][7], json!(50), "snapshot reflects new figures");
    }

    #[tokio::test]
    async fn deletion_removes_the_master_row_but_keeps_history() {
        let api = Arc::new(InMemorySheets::new("Inventory"));
        let mirror = mirror_over(Arc::clone(&api));
        let item = test_item("ITM-001");
        mirror.push_item_created(&item).await.unwrap();

        mirror.push_item_deleted(item.code()).await.unwrap();

        assert_eq!(api.rows(MASTER_SHEET).unwrap().len(), 1, "header only");
        assert!(
            api.rows("ITM-001_Stock").is_some(),
            "history sheet outlives the item"
        );
    }

    #[tokio::test]
    async fn update_for_an_unknown_code_surfaces_not_found() {
        let api = Arc::new(InMemorySheets::new("Inventory"));
        let mirror = mirror_over(api);
        let err = mirror.push_item_updated(&test_item("ITM-404")).await.unwrap_err();
        assert!(matches!(err, SheetsError::NotFound(_)));
    }

    #[tokio::test]
    async fn writes_for_one_code_are_serialized() {
        let api = Arc::new(InMemorySheets::new("Inventory"));
        let mirror = Arc::new(mirror_over(Arc::clone(&api)));
        let item = test_item("ITM-001");
        mirror.push_item_created(&item).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let mirror = Arc::clone(&mirror);
            let item = item.clone();
            tasks.push(tokio::spawn(async move {
                mirror.push_item_updated(&item).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        // Serialized scan-then-write sequences never duplicate the row.
        assert_eq!(api.rows(MASTER_SHEET).unwrap().len(), 2);
    }
}
