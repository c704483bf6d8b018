//! Report builders, one tagged body per report type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stockbook_inventory::{Item, MovementKind, StockMovement, StockStatus};

use crate::range::DateRange;

/// Which report to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Inventory,
    Sales,
    Profitability,
    StockMovement,
}

impl ReportKind {
    /// Title line of the rendered report.
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Inventory => "Inventory Report",
            ReportKind::Sales => "Sales Report",
            ReportKind::Profitability => "Profitability Report",
            ReportKind::StockMovement => "Stock Movement Report",
        }
    }
}

/// A generated report: header plus the type-specific body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub range: DateRange,
    pub body: ReportBody,
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self.body {
            ReportBody::Inventory { .. } => ReportKind::Inventory,
            ReportBody::Sales { .. } => ReportKind::Sales,
            ReportBody::Profitability { .. } => ReportKind::Profitability,
            ReportBody::StockMovement { .. } => ReportKind::StockMovement,
        }
    }
}

/// Report data, tagged per report type so each carries only its own
/// validated fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReportBody {
    Inventory {
        rows: Vec<InventoryRow>,
    },
    Sales {
        rows: Vec<SalesRow>,
        summary: SalesSummary,
    },
    Profitability {
        rows: Vec<ProfitabilityRow>,
        summary: ProfitabilitySummary,
    },
    StockMovement {
        groups: Vec<MovementGroup>,
    },
}

/// One item's current stock position. Monetary fields in minor units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    pub code: String,
    pub name: String,
    pub category: String,
    pub supplier: String,
    pub current_stock: i64,
    pub total_stock: i64,
    pub sold_quantity: i64,
    pub cost_price: i64,
    pub unit_price: i64,
    /// remaining × cost price.
    pub total_cost_value: i64,
    /// remaining × unit price.
    pub total_value: i64,
    pub profit_margin: f64,
    pub status: StockStatus,
}

/// One item's sales over the filtered window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRow {
    pub code: String,
    pub name: String,
    pub category: String,
    pub cost_price: i64,
    pub unit_price: i64,
    pub total_sold: i64,
    pub total_revenue: i64,
    pub total_cogs: i64,
    pub gross_profit: i64,
    pub profit_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_revenue: i64,
    pub total_cogs: i64,
    pub total_gross_profit: i64,
    pub overall_profit_margin: f64,
    pub total_quantity: i64,
    pub item_count: usize,
}

/// Lifetime profitability of one item, from its aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilityRow {
    pub code: String,
    pub name: String,
    pub category: String,
    pub units_sold: i64,
    pub cost_price: i64,
    pub selling_price: i64,
    pub revenue: i64,
    pub cogs: i64,
    pub gross_profit: i64,
    pub profit_margin: f64,
    pub profit_per_unit: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilitySummary {
    pub total_revenue: i64,
    pub total_cogs: i64,
    pub total_gross_profit: i64,
    pub overall_profit_margin: f64,
    pub profitable_items: usize,
    pub total_items: usize,
}

/// One item's movements over the filtered window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementGroup {
    pub code: String,
    pub name: String,
    pub category: String,
    pub movements: Vec<MovementLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementLine {
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub quantity: i64,
    pub sold_quantity: i64,
    pub agent: String,
    pub notes: String,
}

/// Build a report of the requested kind as of `now`.
///
/// The range filters the movement-derived bodies (sales, stock movement).
/// Inventory and profitability read current item state regardless; the
/// range is still recorded in the header.
pub fn build_report(
    kind: ReportKind,
    range: DateRange,
    items: &[Item],
    movements: &[StockMovement],
    now: DateTime<Utc>,
) -> Report {
    let body = match kind {
        ReportKind::Inventory => ReportBody::Inventory {
            rows: items.iter().map(inventory_row).collect(),
        },
        ReportKind::Sales => sales_body(items, movements, range, now),
        ReportKind::Profitability => profitability_body(items),
        ReportKind::StockMovement => ReportBody::StockMovement {
            groups: movement_groups(items, movements, range, now),
        },
    };
    Report {
        generated_at: now,
        range,
        body,
    }
}

fn inventory_row(item: &Item) -> InventoryRow {
    InventoryRow {
        code: item.code().to_string(),
        name: item.name().to_string(),
        category: item.category().to_string(),
        supplier: item.supplier().to_string(),
        current_stock: item.remaining_stock(),
        total_stock: item.total_stock(),
        sold_quantity: item.sold_quantity(),
        cost_price: item.cost_price(),
        unit_price: item.price(),
        total_cost_value: item.remaining_stock() * item.cost_price(),
        total_value: item.remaining_stock() * item.price(),
        profit_margin: item.profit_margin(),
        status: item.stock_status(),
    }
}

fn sales_body(
    items: &[Item],
    movements: &[StockMovement],
    range: DateRange,
    now: DateTime<Utc>,
) -> ReportBody {
    let mut rows = Vec::new();
    for item in items {
        let total_sold: i64 = movements
            .iter()
            .filter(|movement| {
                movement.item_id() == item.id()
                    && movement.kind() == MovementKind::Sale
                    && range.contains(movement.occurred_at(), now)
            })
            .map(StockMovement::sold_quantity)
            .sum();
        if total_sold == 0 {
            continue;
        }

        let total_revenue = total_sold * item.price();
        let total_cogs = total_sold * item.cost_price();
        let gross_profit = total_revenue - total_cogs;
        rows.push(SalesRow {
            code: item.code().to_string(),
            name: item.name().to_string(),
            category: item.category().to_string(),
            cost_price: item.cost_price(),
            unit_price: item.price(),
            total_sold,
            total_revenue,
            total_cogs,
            gross_profit,
            profit_margin: margin(gross_profit, total_revenue),
        });
    }

    let total_revenue: i64 = rows.iter().map(|row| row.total_revenue).sum();
    let total_cogs: i64 = rows.iter().map(|row| row.total_cogs).sum();
    let total_gross_profit = total_revenue - total_cogs;
    let summary = SalesSummary {
        total_revenue,
        total_cogs,
        total_gross_profit,
        overall_profit_margin: margin(total_gross_profit, total_revenue),
        total_quantity: rows.iter().map(|row| row.total_sold).sum(),
        item_count: rows.len(),
    };
    ReportBody::Sales { rows, summary }
}

fn profitability_body(items: &[Item]) -> ReportBody {
    let mut rows: Vec<ProfitabilityRow> = items
        .iter()
        .filter(|item| item.sold_quantity() > 0)
        .map(|item| {
            let units_sold = item.sold_quantity();
            let revenue = units_sold * item.price();
            let cogs = units_sold * item.cost_price();
            let gross_profit = revenue - cogs;
            ProfitabilityRow {
                code: item.code().to_string(),
                name: item.name().to_string(),
                category: item.category().to_string(),
                units_sold,
                cost_price: item.cost_price(),
                selling_price: item.price(),
                revenue,
                cogs,
                gross_profit,
                profit_margin: margin(gross_profit, revenue),
                profit_per_unit: item.price() - item.cost_price(),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.gross_profit.cmp(&a.gross_profit));

    let total_revenue: i64 = rows.iter().map(|row| row.revenue).sum();
    let total_cogs: i64 = rows.iter().map(|row| row.cogs).sum();
    let total_gross_profit = total_revenue - total_cogs;
    let summary = ProfitabilitySummary {
        total_revenue,
        total_cogs,
        total_gross_profit,
        overall_profit_margin: margin(total_gross_profit, total_revenue),
        profitable_items: rows.iter().filter(|row| row.gross_profit > 0).count(),
        total_items: rows.len(),
    };
    ReportBody::Profitability { rows, summary }
}

fn movement_groups(
    items: &[Item],
    movements: &[StockMovement],
    range: DateRange,
    now: DateTime<Utc>,
) -> Vec<MovementGroup> {
    let mut groups = Vec::new();
    for item in items {
        let lines: Vec<MovementLine> = movements
            .iter()
            .filter(|movement| {
                movement.item_id() == item.id() && range.contains(movement.occurred_at(), now)
            })
            .map(|movement| MovementLine {
                date: movement.occurred_at(),
                kind: movement.kind(),
                quantity: movement.quantity(),
                sold_quantity: movement.sold_quantity(),
                agent: movement.agent().to_string(),
                notes: movement.notes().to_string(),
            })
            .collect();
        if lines.is_empty() {
            continue;
        }
        groups.push(MovementGroup {
            code: item.code().to_string(),
            name: item.name().to_string(),
            category: item.category().to_string(),
            movements: lines,
        });
    }
    groups
}

fn margin(profit: i64, revenue: i64) -> f64 {
    if revenue > 0 {
        (profit as f64 / revenue as f64) * 100.0
    } else {
        0.0
    }
}
