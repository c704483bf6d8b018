//! History append sync: one write-once row per movement in the item's
//! `{code}_Stock` sheet.

use serde_json::json;

use stockbook_inventory::{ItemCode, StockAggregates, StockMovement};

use crate::error::SheetsResult;
use crate::gateway::{Row, SheetsApi};
use crate::provision::{ensure_item_sheet, history_sheet_name};

/// Encode a movement's 8 history columns, A through H. The two stock
/// columns carry the item's figures as recomputed after this movement.
pub fn history_row(movement: &StockMovement, aggregates: StockAggregates) -> Row {
    vec![
        json!(movement.occurred_at().format("%Y-%m-%d").to_string()),
        json!(movement.kind().as_str()),
        json!(movement.quantity()),
        json!(movement.sold_quantity()),
        json!(aggregates.remaining_stock),
        json!(movement.agent()),
        json!(movement.notes()),
        json!(aggregates.total_stock),
    ]
}

/// Append one movement to the item's history sheet, creating the sheet
/// first when it is missing. Rows are never updated or deleted once
/// written, matching the movement's immutability; the sheet outlives even
/// its item's deletion.
pub async fn append_history_row(
    api: &dyn SheetsApi,
    code: &ItemCode,
    movement: &StockMovement,
    aggregates: StockAggregates,
) -> SheetsResult<()> {
    ensure_item_sheet(api, code).await?;
    api.append_values(
        &history_sheet_name(code),
        vec![history_row(movement, aggregates)],
    )
    .await
}
