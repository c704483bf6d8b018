//! Money helpers.
//!
//! All prices in this crate are stored in minor units (cents) as `i64`.
//! Spreadsheet cells and CSV exports want major units, so conversion lives
//! here rather than at every call site.

/// Convert minor units to major units (e.g. 4500 -> 45.0).
pub fn to_major_units(minor: i64) -> f64 {
    minor as f64 / 100.0
}

/// Render minor units with two decimals (e.g. 9999 -> "99.99").
pub fn format_major(minor: i64) -> String {
    format!("{:.2}", to_major_units(minor))
}
