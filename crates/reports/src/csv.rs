//! CSV rendering of generated reports.
//!
//! Pure formatting over already-computed report rows: a three-line
//! preamble, a blank line, then the header row and data rows for the
//! report type. Money renders in major units with two decimals, margins
//! with one decimal and a percent sign.

use std::fmt::Write;

use stockbook_inventory::money;

use crate::report::{Report, ReportBody};

pub fn to_csv(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.kind().title());
    let _ = writeln!(
        out,
        "Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "Date Range: {}", report.range);
    out.push('\n');

    match &report.body {
        ReportBody::Inventory { rows } => {
            out.push_str(
                "Code,Name,Category,Supplier,Current Stock,Cost Price,Unit Price,\
                 Total Cost Value,Total Value,Profit Margin,Status\n",
            );
            for row in rows {
                let _ = writeln!(
                    out,
                    "{},{},{},{},{},{},{},{},{},{:.1}%,{}",
                    row.code,
                    row.name,
                    row.category,
                    row.supplier,
                    row.current_stock,
                    money::format_major(row.cost_price),
                    money::format_major(row.unit_price),
                    money::format_major(row.total_cost_value),
                    money::format_major(row.total_value),
                    row.profit_margin,
                    row.status,
                );
            }
        }
        ReportBody::Sales { rows, .. } => {
            out.push_str(
                "Code,Name,Category,Cost Price,Unit Price,Total Sold,Total Revenue,\
                 Total COGS,Gross Profit,Profit Margin\n",
            );
            for row in rows {
                let _ = writeln!(
                    out,
                    "{},{},{},{},{},{},{},{},{},{:.1}%",
                    row.code,
                    row.name,
                    row.category,
                    money::format_major(row.cost_price),
                    money::format_major(row.unit_price),
                    row.total_sold,
                    money::format_major(row.total_revenue),
                    money::format_major(row.total_cogs),
                    money::format_major(row.gross_profit),
                    row.profit_margin,
                );
            }
        }
        ReportBody::Profitability { rows, .. } => {
            out.push_str(
                "Code,Name,Category,Units Sold,Cost Price,Selling Price,Revenue,\
                 COGS,Gross Profit,Profit Margin,Profit Per Unit\n",
            );
            for row in rows {
                let _ = writeln!(
                    out,
                    "{},{},{},{},{},{},{},{},{},{:.1}%,{}",
                    row.code,
                    row.name,
                    row.category,
                    row.units_sold,
                    money::format_major(row.cost_price),
                    money::format_major(row.selling_price),
                    money::format_major(row.revenue),
                    money::format_major(row.cogs),
                    money::format_major(row.gross_profit),
                    row.profit_margin,
                    money::format_major(row.profit_per_unit),
                );
            }
        }
        ReportBody::StockMovement { groups } => {
            out.push_str("Code,Name,Category,Date,Type,Quantity,Sold Quantity,Agent,Notes\n");
            for group in groups {
                for line in &group.movements {
                    let _ = writeln!(
                        out,
                        "{},{},{},{},{},{},{},{},\"{}\"",
                        group.code,
                        group.name,
                        group.category,
                        line.date.format("%Y-%m-%d"),
                        line.kind,
                        line.quantity,
                        line.sold_quantity,
                        line.agent,
                        line.notes.replace('"', "\"\""),
                    );
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::DateRange;
    use crate::report::{build_report, ReportKind};
    use chrono::{DateTime, TimeZone, Utc};
    use stockbook_inventory::{
        recompute_aggregates, Item, ItemCode, MovementEntry, NewItem, NewMovement, StockMovement,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 28, 12, 0, 0).unwrap()
    }

    fn fixture() -> (Vec<Item>, Vec<StockMovement>) {
        let mut item = Item::create(
            NewItem {
                code: Some(ItemCode::new("ITM-001").unwrap()),
                name: "Wireless Headphones".to_string(),
                category: "Electronics".to_string(),
                supplier: "Tech Supplier A".to_string(),
                price: 10000,
                cost_price: 4000,
                low_stock_threshold: Some(10),
            },
            now(),
        )
        .unwrap();

        let mut history = Vec::new();
        for entry in [
            MovementEntry::Restock { quantity: 50 },
            MovementEntry::Sale { sold_quantity: 20 },
        ] {
            let mut draft = NewMovement::new(item.id(), entry);
            draft.occurred_at = Some(now());
            draft.notes = Some("said \"rush\"".to_string());
            history.push(StockMovement::record(draft, now()).unwrap());
        }
        item.apply_aggregates(recompute_aggregates(&history));
        (vec![item], history)
    }

    #[test]
    fn inventory_csv_matches_the_export_layout() {
        let (items, movements) = fixture();
        let report = build_report(ReportKind::Inventory, DateRange::All, &items, &movements, now());
        let csv = to_csv(&report);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Inventory Report");
        assert_eq!(lines[1], "Generated: 2024-05-28 12:00:00");
        assert_eq!(lines[2], "Date Range: all");
        assert_eq!(lines[3], "");
        assert_eq!(
            lines[4],
            "Code,Name,Category,Supplier,Current Stock,Cost Price,Unit Price,\
             Total Cost Value,Total Value,Profit Margin,Status"
        );
        assert_eq!(
            lines[5],
            "ITM-001,Wireless Headphones,Electronics,Tech Supplier A,30,40.00,100.00,\
             1200.00,3000.00,60.0%,In Stock"
        );
    }

    #[test]
    fn sales_csv_renders_money_in_major_units() {
        let (items, movements) = fixture();
        let report = build_report(ReportKind::Sales, DateRange::All, &items, &movements, now());
        let csv = to_csv(&report);
        let row = csv.lines().nth(5).unwrap();
        assert_eq!(
            row,
            "ITM-001,Wireless Headphones,Electronics,40.00,100.00,20,2000.00,800.00,1200.00,60.0%"
        );
    }

    #[test]
    fn movement_csv_quotes_and_escapes_notes() {
        let (items, movements) = fixture();
        let report = build_report(
            ReportKind::StockMovement,
            DateRange::All,
            &items,
            &movements,
            now(),
        );
        let csv = to_csv(&report);
        let row = csv.lines().nth(5).unwrap();
        assert!(row.ends_with(",\"said \"\"rush\"\"\""), "row: {row}");
        assert!(row.contains(",restock,50,0,System,"));
    }

    #[test]
    fn profitability_csv_carries_the_profit_per_unit_column() {
        let (items, movements) = fixture();
        let report = build_report(
            ReportKind::Profitability,
            DateRange::All,
            &items,
            &movements,
            now(),
        );
        let csv = to_csv(&report);
        assert!(csv.lines().nth(4).unwrap().ends_with("Profit Per Unit"));
        assert!(csv.lines().nth(5).unwrap().ends_with(",60.00"));
    }
}
