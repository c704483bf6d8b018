//! Derivation of an item's stock figures from its movement history.

use serde::{Deserialize, Serialize};

use crate::movement::{MovementKind, StockMovement};

/// Snapshot of the three derived stock figures for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAggregates {
    pub total_stock: i64,
    pub sold_quantity: i64,
    pub remaining_stock: i64,
}

/// Recompute stock figures from a full movement history.
///
/// A pure fold over sums, so the result is independent of movement order:
/// restocks and adjustments contribute their quantity to the total, sales
/// contribute their count to the sold figure, and the remainder is the
/// difference. Nothing is clamped; overselling leaves the remainder
/// negative rather than failing.
pub fn recompute_aggregates(movements: &[StockMovement]) -> StockAggregates {
    let mut total_stock: i64 = 0;
    let mut sold_quantity: i64 = 0;

    for movement in movements {
        match movement.kind() {
            MovementKind::Restock | MovementKind::Adjustment => {
                total_stock += movement.quantity();
            }
            MovementKind::Sale => {
                sold_quantity += movement.sold_quantity();
            }
        }
    }

    StockAggregates {
        total_stock,
        sold_quantity,
        remaining_stock: total_stock - sold_quantity,
    }
}
