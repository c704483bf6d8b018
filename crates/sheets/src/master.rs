//! Master snapshot sync: one denormalized row per item, keyed by item code
//! in column A and located by linear scan.

use serde_json::{json, Value};

use stockbook_inventory::{money, Item, ItemCode};

use crate::error::{SheetsError, SheetsResult};
use crate::gateway::{Row, SheetsApi};
use crate::provision::MASTER_SHEET;

/// Fixed value of the master sheet's Status column; there is no archival
/// state in this model.
const STATUS_ACTIVE: &str = "Active";

/// Encode an item's 13 master columns, A through M. Prices are written in
/// major units, the margin as a percentage string, the created date as
/// `YYYY-MM-DD`.
pub fn master_row(item: &Item) -> Row {
    vec![
        json!(item.code().as_str()),
        json!(item.name()),
        json!(item.category()),
        json!(item.supplier()),
        json!(money::to_major_units(item.price())),
        json!(money::to_major_units(item.cost_price())),
        json!(item.low_stock_threshold()),
        json!(item.total_stock()),
        json!(item.sold_quantity()),
        json!(item.remaining_stock()),
        json!(format!("{:.2}%", item.profit_margin())),
        json!(item.created_at().format("%Y-%m-%d").to_string()),
        json!(STATUS_ACTIVE),
    ]
}

/// Append the item's snapshot row. No existence check: appending twice for
/// one code leaves two rows, and update/delete then resolve to the first
/// match. Documented limitation, not deduplicated here.
pub async fn append_master_row(api: &dyn SheetsApi, item: &Item) -> SheetsResult<()> {
    api.append_values(MASTER_SHEET, vec![master_row(item)]).await
}

/// Overwrite the snapshot row for the item's code in place.
///
/// Scans column A top to bottom, skipping the header, for the first exact
/// match. Fails with [`SheetsError::NotFound`] when the code is absent;
/// never falls back to an append.
pub async fn update_master_row(api: &dyn SheetsApi, item: &Item) -> SheetsResult<()> {
    let row_index = find_row(api, item.code()).await?;
    // Sheet ranges are 1-indexed, so scan index i addresses row i + 1.
    let row_number = row_index + 1;
    api.put_values(
        &format!("{MASTER_SHEET}!A{row_number}:M{row_number}"),
        vec![master_row(item)],
    )
    .await
}

/// Delete the snapshot row for a code via a batch row-delete.
///
/// The deleteDimension span is zero-based, so the scan index is used as
/// is. Fails with [`SheetsError::NotFound`] when the code is absent.
pub async fn delete_master_row(api: &dyn SheetsApi, code: &ItemCode) -> SheetsResult<()> {
    let row_index = find_row(api, code).await?;
    let meta = api.spreadsheet_meta().await?;
    let sheet = meta
        .sheet(MASTER_SHEET)
        .ok_or_else(|| SheetsError::NotFound(format!("{MASTER_SHEET} sheet not found")))?;
    api.delete_rows(sheet.sheet_id, row_index as i64, row_index as i64 + 1)
        .await
}

/// Zero-based index of the first row whose column A equals the code.
async fn find_row(api: &dyn SheetsApi, code: &ItemCode) -> SheetsResult<usize> {
    let column = api.get_values(&format!("{MASTER_SHEET}!A:A")).await?;
    column
        .iter()
        .enumerate()
        .skip(1) // row 0 is the header
        .find(|(_, row)| row.first().and_then(Value::as_str) == Some(code.as_str()))
        .map(|(index, _)| index)
        .ok_or_else(|| SheetsError::NotFound(format!("item {code} not found in master sheet")))
}
