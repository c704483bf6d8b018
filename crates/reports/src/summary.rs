//! Dashboard figures derived from current item state.

use serde::Serialize;

use stockbook_inventory::{Item, StockMovement};

/// Headline stats for the dashboard. Monetary fields in minor units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_items: usize,
    /// Σ total stock × unit price.
    pub total_stock_value: i64,
    /// Σ total stock × cost price.
    pub total_cost_value: i64,
    /// Σ sold quantity × unit price.
    pub total_sales: i64,
    /// Σ sold quantity × cost price.
    pub total_cogs: i64,
    pub gross_profit: i64,
    /// Zero when nothing has been sold.
    pub profit_margin: f64,
    pub low_stock_items: usize,
    pub out_of_stock_items: usize,
    /// Items at or below their threshold, in ledger order.
    pub low_stock_list: Vec<Item>,
}

impl InventorySummary {
    pub fn compute(items: &[Item]) -> Self {
        let total_stock_value: i64 = items.iter().map(|i| i.total_stock() * i.price()).sum();
        let total_cost_value: i64 = items.iter().map(|i| i.total_stock() * i.cost_price()).sum();
        let total_sales: i64 = items.iter().map(|i| i.sold_quantity() * i.price()).sum();
        let total_cogs: i64 = items.iter().map(|i| i.sold_quantity() * i.cost_price()).sum();
        let gross_profit = total_sales - total_cogs;

        let low_stock_list: Vec<Item> = items
            .iter()
            .filter(|i| i.remaining_stock() <= i64::from(i.low_stock_threshold()))
            .cloned()
            .collect();

        Self {
            total_items: items.len(),
            total_stock_value,
            total_cost_value,
            total_sales,
            total_cogs,
            gross_profit,
            profit_margin: if total_sales > 0 {
                (gross_profit as f64 / total_sales as f64) * 100.0
            } else {
                0.0
            },
            low_stock_items: low_stock_list.len(),
            out_of_stock_items: items.iter().filter(|i| i.remaining_stock() == 0).count(),
            low_stock_list,
        }
    }
}

/// Newest movements first, capped at `limit`.
pub fn recent_movements(movements: &[StockMovement], limit: usize) -> Vec<StockMovement> {
    let mut sorted = movements.to_vec();
    sorted.sort_by_key(|movement| std::cmp::Reverse(movement.occurred_at()));
    sorted.truncate(limit);
    sorted
}
