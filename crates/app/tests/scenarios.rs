//! End-to-end scenarios over the service: local-first commits, cascade
//! deletion, and best-effort mirroring against an in-memory spreadsheet.

use std::sync::Arc;

use async_trait::async_trait;

use stockbook_app::{RemoteSync, Stockbook, SyncStatus};
use stockbook_core::DomainError;
use stockbook_inventory::{ItemCode, ItemPatch, MovementEntry, NewItem, NewMovement};
use stockbook_sheets::{
    InMemorySheets, Row, SheetsApi, SheetsConfig, SheetsError, SheetsMirror, SheetsResult,
    SpreadsheetMeta,
};
use stockbook_store::{keys, InMemoryKvStore, KeyValueStore};

fn draft(code: &str) -> NewItem {
    NewItem {
        code: Some(ItemCode::new(code).unwrap()),
        name: "Wireless Headphones".to_string(),
        category: "Electronics".to_string(),
        supplier: "Tech Supplier A".to_string(),
        price: 10000,
        cost_price: 4000,
        low_stock_threshold: Some(10),
    }
}

fn local_only() -> Stockbook<Arc<InMemoryKvStore>> {
    Stockbook::open(Arc::new(InMemoryKvStore::new()))
}

fn mirrored() -> (Stockbook<Arc<InMemoryKvStore>>, Arc<InMemorySheets>) {
    let sheets = Arc::new(InMemorySheets::new("Inventory"));
    let mirror = SheetsMirror::new(sheets.clone());
    let app = Stockbook::with_mirror(Arc::new(InMemoryKvStore::new()), mirror);
    (app, sheets)
}

#[tokio::test]
async fn restock_sale_and_adjustment_drive_the_aggregates() {
    let app = local_only();
    let item = app.create_item(draft("ITM-001")).await.unwrap().record;

    let (_, item) = app
        .record_movement(NewMovement::new(
            item.id(),
            MovementEntry::Restock { quantity: 50 },
        ))
        .await
        .unwrap()
        .record;
    assert_eq!(
        (item.total_stock(), item.sold_quantity(), item.remaining_stock()),
        (50, 0, 50)
    );

    let (_, item) = app
        .record_movement(NewMovement::new(
            item.id(),
            MovementEntry::Sale { sold_quantity: 20 },
        ))
        .await
        .unwrap()
        .record;
    assert_eq!(
        (item.total_stock(), item.sold_quantity(), item.remaining_stock()),
        (50, 20, 30)
    );

    let (_, item) = app
        .record_movement(NewMovement::new(
            item.id(),
            MovementEntry::Adjustment { quantity: -5 },
        ))
        .await
        .unwrap()
        .record;
    assert_eq!(
        (item.total_stock(), item.sold_quantity(), item.remaining_stock()),
        (45, 20, 25)
    );
}

#[tokio::test]
async fn overselling_is_accepted_and_goes_negative() {
    let app = local_only();
    let item = app.create_item(draft("ITM-001")).await.unwrap().record;

    app.record_movement(NewMovement::new(
        item.id(),
        MovementEntry::Restock { quantity: 10 },
    ))
    .await
    .unwrap();
    let (_, item) = app
        .record_movement(NewMovement::new(
            item.id(),
            MovementEntry::Sale { sold_quantity: 15 },
        ))
        .await
        .unwrap()
        .record;

    assert_eq!(item.remaining_stock(), -5);
    assert_eq!(item.remaining_stock(), item.total_stock() - item.sold_quantity());
}

#[tokio::test]
async fn deleting_an_item_cascades_its_movements() {
    let app = local_only();
    let item = app.create_item(draft("ITM-001")).await.unwrap().record;
    for entry in [
        MovementEntry::Restock { quantity: 50 },
        MovementEntry::Sale { sold_quantity: 20 },
        MovementEntry::Adjustment { quantity: -5 },
    ] {
        app.record_movement(NewMovement::new(item.id(), entry))
            .await
            .unwrap();
    }

    app.delete_item(item.id()).await.unwrap();

    assert!(app.items().is_empty());
    assert!(app.movements_for(item.id()).is_empty());
    assert_eq!(app.aggregates_for(item.id()).total_stock, 0);
    assert!(matches!(app.item(item.id()), Err(DomainError::NotFound)));
}

#[tokio::test]
async fn unconfigured_sync_short_circuits_without_an_attempt() {
    let app = local_only();
    assert!(!app.is_configured());

    let committed = app.create_item(draft("ITM-001")).await.unwrap();
    assert_eq!(committed.remote, RemoteSync::NotConfigured);
    // A short-circuit is not a sync attempt; the status stays idle.
    assert_eq!(app.sync_status(), SyncStatus::Idle);

    assert_eq!(
        app.test_connection().await,
        Err(SheetsError::NotConfigured)
    );
    assert_eq!(
        app.provision_master_sheet().await,
        Err(SheetsError::NotConfigured)
    );
}

#[tokio::test]
async fn mirrored_lifecycle_writes_master_and_history_sheets() {
    let (app, sheets) = mirrored();

    let committed = app.create_item(draft("ITM-001")).await.unwrap();
    assert_eq!(committed.remote, RemoteSync::Synced);
    assert_eq!(app.sync_status(), SyncStatus::Success);
    assert_eq!(
        sheets.sheet_titles(),
        vec!["Master_Items".to_string(), "ITM-001_Stock".to_string()]
    );

    let item = committed.record;
    app.record_movement(NewMovement::new(
        item.id(),
        MovementEntry::Restock { quantity: 50 },
    ))
    .await
    .unwrap();

    let history = sheets.rows("ITM-001_Stock").unwrap();
    assert_eq!(history.len(), 2, "header plus one movement");
    let master = sheets.rows("Master_Items").unwrap();
    assert_eq!(master[1][7], serde_json::json!(50), "snapshot refreshed");

    app.delete_item(item.id()).await.unwrap();
    assert_eq!(sheets.rows("Master_Items").unwrap().len(), 1);
    assert!(
        sheets.rows("ITM-001_Stock").is_some(),
        "history sheet survives deletion"
    );
}

#[tokio::test]
async fn edits_rewrite_the_master_row_in_place() {
    let (app, sheets) = mirrored();
    let item = app.create_item(draft("ITM-001")).await.unwrap().record;

    let patch = ItemPatch {
        name: Some("Renamed".to_string()),
        ..ItemPatch::default()
    };
    let committed = app.update_item(item.id(), patch).await.unwrap();
    assert_eq!(committed.remote, RemoteSync::Synced);

    let master = sheets.rows("Master_Items").unwrap();
    assert_eq!(master.len(), 2, "update never appends");
    assert_eq!(master[1][1], "Renamed");
}

/// A spreadsheet backend that rejects everything.
struct FailingApi;

#[async_trait]
impl SheetsApi for FailingApi {
    async fn spreadsheet_meta(&self) -> SheetsResult<SpreadsheetMeta> {
        Err(SheetsError::Api(500, "backend down".to_string()))
    }
    async fn add_sheet(&self, _title: &str) -> SheetsResult<()> {
        Err(SheetsError::Api(500, "backend down".to_string()))
    }
    async fn delete_rows(&self, _sheet_id: i64, _start: i64, _end: i64) -> SheetsResult<()> {
        Err(SheetsError::Api(500, "backend down".to_string()))
    }
    async fn put_values(&self, _range: &str, _rows: Vec<Row>) -> SheetsResult<()> {
        Err(SheetsError::Api(500, "backend down".to_string()))
    }
    async fn append_values(&self, _sheet: &str, _rows: Vec<Row>) -> SheetsResult<()> {
        Err(SheetsError::Api(500, "backend down".to_string()))
    }
    async fn get_values(&self, _range: &str) -> SheetsResult<Vec<Row>> {
        Err(SheetsError::Api(500, "backend down".to_string()))
    }
}

#[tokio::test]
async fn remote_failure_never_rolls_back_the_local_commit() {
    let kv = Arc::new(InMemoryKvStore::new());
    let app = Stockbook::with_mirror(kv, SheetsMirror::new(Arc::new(FailingApi)));

    let committed = app.create_item(draft("ITM-001")).await.unwrap();
    assert!(matches!(
        committed.remote,
        RemoteSync::Failed(SheetsError::Api(500, _))
    ));
    assert_eq!(app.sync_status(), SyncStatus::Error);
    assert_eq!(app.items().len(), 1, "local commit stands");

    // Movements also commit locally despite the dead backend.
    let committed = app
        .record_movement(NewMovement::new(
            committed.record.id(),
            MovementEntry::Restock { quantity: 5 },
        ))
        .await
        .unwrap();
    assert!(matches!(committed.remote, RemoteSync::Failed(_)));
    assert_eq!(committed.record.1.total_stock(), 5);
}

#[tokio::test]
async fn update_for_a_row_missing_remotely_surfaces_not_found() {
    let sheets = Arc::new(InMemorySheets::new("Inventory"));
    let kv = Arc::new(InMemoryKvStore::new());
    let app = Stockbook::with_mirror(kv, SheetsMirror::new(sheets.clone()));

    let item = app.create_item(draft("ITM-001")).await.unwrap().record;
    // Someone removed the row out-of-band.
    sheets
        .delete_rows(
            sheets
                .spreadsheet_meta()
                .await
                .unwrap()
                .sheet("Master_Items")
                .unwrap()
                .sheet_id,
            1,
            2,
        )
        .await
        .unwrap();

    let committed = app
        .update_item(
            item.id(),
            ItemPatch {
                price: Some(12000),
                ..ItemPatch::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        committed.remote,
        RemoteSync::Failed(SheetsError::NotFound(_))
    ));
    assert_eq!(committed.record.price(), 12000, "local edit stands");
}

#[tokio::test]
async fn reconfigure_persists_the_bundle_and_gates_the_mirror() {
    let kv = Arc::new(InMemoryKvStore::new());
    let mut app = Stockbook::open(kv.clone());
    assert!(!app.is_configured());

    let config = SheetsConfig {
        api_key: "key".to_string(),
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        refresh_token: "refresh".to_string(),
        spreadsheet_id: "sheet-1".to_string(),
    };
    app.reconfigure(config.clone());
    assert!(app.is_configured());
    assert_eq!(app.sync_status(), SyncStatus::Idle);

    let stored: SheetsConfig =
        serde_json::from_str(&kv.get(keys::SHEETS_CONFIG).unwrap()).unwrap();
    assert_eq!(stored, config);

    // An incomplete bundle disables mirroring rather than failing.
    app.reconfigure(SheetsConfig::default());
    assert!(!app.is_configured());
}

#[tokio::test]
async fn local_state_survives_a_reopen() {
    let kv = Arc::new(InMemoryKvStore::new());
    {
        let app = Stockbook::open(kv.clone());
        let item = app.create_item(draft("ITM-001")).await.unwrap().record;
        app.record_movement(NewMovement::new(
            item.id(),
            MovementEntry::Restock { quantity: 7 },
        ))
        .await
        .unwrap();
    }

    let reopened = Stockbook::open(kv);
    let items = reopened.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].total_stock(), 7);
    assert_eq!(reopened.movements().len(), 1);
}

#[tokio::test]
async fn status_subscription_sees_the_latest_transition() {
    let (app, _sheets) = mirrored();
    let mut rx = app.subscribe_sync_status();
    assert_eq!(*rx.borrow(), SyncStatus::Idle);

    app.create_item(draft("ITM-001")).await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), SyncStatus::Success);
}
