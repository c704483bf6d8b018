//! Pure report building, CSV rendering and dashboard summaries over the
//! ledger's items and movements. Nothing in this crate performs IO; every
//! builder takes its inputs and the current time as arguments.

pub mod csv;
pub mod range;
pub mod report;
pub mod summary;

pub use csv::to_csv;
pub use range::DateRange;
pub use report::{
    build_report, InventoryRow, MovementGroup, MovementLine, ProfitabilityRow,
    ProfitabilitySummary, Report, ReportBody, ReportKind, SalesRow, SalesSummary,
};
pub use summary::{recent_movements, InventorySummary};
