//! Sheet provisioning: guarantee the master and per-item sheets exist with
//! their fixed header rows before any row write.

use serde_json::{json, Value};

use stockbook_inventory::ItemCode;

use crate::error::SheetsResult;
use crate::gateway::SheetsApi;

/// Title of the master snapshot sheet.
pub const MASTER_SHEET: &str = "Master_Items";

/// Header row of the master sheet, columns A through M.
pub const MASTER_HEADERS: [&str; 13] = [
    "Item Code",
    "Name",
    "Category",
    "Supplier",
    "Unit Price",
    "Cost Price",
    "Low Stock Threshold",
    "Total Stock",
    "Sold Quantity",
    "Remaining Stock",
    "Profit Margin",
    "Created Date",
    "Status",
];

/// Header row of a per-item history sheet, columns A through H.
pub const HISTORY_HEADERS: [&str; 8] = [
    "Date",
    "Transaction Type",
    "Quantity",
    "Sold Quantity",
    "Remaining Stock",
    "Agent/Person",
    "Notes",
    "Total Stock",
];

/// Title of the append-only history sheet for one item code.
pub fn history_sheet_name(code: &ItemCode) -> String {
    format!("{code}_Stock")
}

/// Create the master sheet with its header row when absent. Calling while
/// it already exists is a no-op that still reports success.
pub async fn ensure_master_sheet(api: &dyn SheetsApi) -> SheetsResult<()> {
    ensure_sheet(api, MASTER_SHEET, &MASTER_HEADERS, "A1:M1").await
}

/// Create an item's history sheet with its header row when absent.
pub async fn ensure_item_sheet(api: &dyn SheetsApi, code: &ItemCode) -> SheetsResult<()> {
    ensure_sheet(api, &history_sheet_name(code), &HISTORY_HEADERS, "A1:H1").await
}

async fn ensure_sheet(
    api: &dyn SheetsApi,
    title: &str,
    headers: &[&str],
    header_range: &str,
) -> SheetsResult<()> {
    let meta = api.spreadsheet_meta().await?;
    if meta.sheet(title).is_some() {
        return Ok(());
    }

    api.add_sheet(title).await?;
    let header_row: Vec<Value> = headers.iter().map(|header| json!(header)).collect();
    api.put_values(&format!("{title}!{header_range}"), vec![header_row])
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySheets;

    #[tokio::test]
    async fn master_sheet_is_created_with_its_header_row() {
        let sheets = InMemorySheets::new("Inventory");
        ensure_master_sheet(&sheets).await.unwrap();

        let rows = sheets.rows(MASTER_SHEET).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 13);
        assert_eq!(rows[0][0], "Item Code");
        assert_eq!(rows[0][12], "Status");
    }

    #[tokio::test]
    async fn provisioning_is_idempotent() {
        let sheets = InMemorySheets::new("Inventory");
        ensure_master_sheet(&sheets).await.unwrap();
        ensure_master_sheet(&sheets).await.unwrap();

        assert_eq!(sheets.sheet_titles(), vec![MASTER_SHEET.to_string()]);
        assert_eq!(sheets.rows(MASTER_SHEET).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn item_sheet_is_named_after_the_code() {
        let sheets = InMemorySheets::new("Inventory");
        let code = ItemCode::new("ITM-001").unwrap();
        ensure_item_sheet(&sheets, &code).await.unwrap();

        let rows = sheets.rows("ITM-001_Stock").unwrap();
        assert_eq!(rows[0].len(), 8);
        assert_eq!(rows[0][1], "Transaction Type");
        assert_eq!(rows[0][5], "Agent/Person");
    }
}
