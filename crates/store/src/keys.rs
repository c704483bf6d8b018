//! Well-known cache keys.
//!
//! These names are a compatibility contract with existing caches; do not
//! rename them.

/// Serialized `Vec<Item>`.
pub const ITEMS: &str = "inventory_items";

/// Serialized `Vec<StockMovement>`.
pub const MOVEMENTS: &str = "inventory_stocks";

/// UI theme preference (`"dark"` / `"light"`). Owned by the shell; stored
/// here so every frontend shares one slot.
pub const THEME: &str = "inventory_theme";

/// Serialized `SheetsConfig` credential bundle.
pub const SHEETS_CONFIG: &str = "google_sheets_config";
