use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{DomainError, DomainResult, ItemId};

use crate::ledger::StockAggregates;

/// Default low-stock threshold applied when a draft leaves it out.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// Characters Google Sheets rejects in sheet titles. An item's code doubles
/// as the title of its history sheet, so codes must stay legal as titles.
const SHEET_TITLE_FORBIDDEN: &[char] = &['[', ']', '*', '?', ':', '/', '\\'];

const MAX_CODE_CHARS: usize = 64;

/// Unique, immutable item code (e.g. `ITM-1716820000000`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCode(String);

impl ItemCode {
    pub fn new(code: impl Into<String>) -> DomainResult<Self> {
        let code = code.into().trim().to_string();
        if code.is_empty() {
            return Err(DomainError::validation("item code cannot be empty"));
        }
        if code.chars().count() > MAX_CODE_CHARS {
            return Err(DomainError::validation("item code too long"));
        }
        if code.contains(SHEET_TITLE_FORBIDDEN) {
            return Err(DomainError::validation(
                r"item code may not contain [ ] * ? : / \",
            ));
        }
        Ok(Self(code))
    }

    /// Generate a fresh code from the wall clock: `ITM-{unix millis}`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        Self(format!("ITM-{}", now.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stock situation of an item relative to its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Label used in sheet rows and CSV exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry plus its derived stock figures.
///
/// The three stock fields are projections of the item's movement history.
/// They are private and only writable through [`Item::apply_aggregates`];
/// everything else that edits an item goes through [`ItemPatch`], which
/// cannot name them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    id: ItemId,
    code: ItemCode,
    name: String,
    category: String,
    supplier: String,
    /// Selling price per unit, minor units (cents).
    price: i64,
    /// Cost per unit, minor units (cents).
    cost_price: i64,
    low_stock_threshold: u32,
    total_stock: i64,
    sold_quantity: i64,
    remaining_stock: i64,
    created_at: DateTime<Utc>,
}

/// Draft for creating an item. All fields are validated by [`Item::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    /// Explicit code, or `None` to generate one from the clock.
    pub code: Option<ItemCode>,
    pub name: String,
    pub category: String,
    pub supplier: String,
    /// Selling price per unit, minor units (cents).
    pub price: i64,
    /// Cost per unit, minor units (cents).
    pub cost_price: i64,
    pub low_stock_threshold: Option<u32>,
}

/// Partial edit of an item's catalog fields.
///
/// Code, id and the derived stock figures are not editable by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub price: Option<i64>,
    pub cost_price: Option<i64>,
    pub low_stock_threshold: Option<u32>,
}

impl Item {
    /// Validate a draft and build the item. New items start with zero stock;
    /// figures only change as movements are recorded against them.
    pub fn create(draft: NewItem, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = required_text("name", &draft.name)?;
        let category = required_text("category", &draft.category)?;
        let supplier = required_text("supplier", &draft.supplier)?;
        validate_prices(draft.price, draft.cost_price)?;

        let code = match draft.code {
            Some(code) => code,
            None => ItemCode::generate(now),
        };

        Ok(Self {
            id: ItemId::new(),
            code,
            name,
            category,
            supplier,
            price: draft.price,
            cost_price: draft.cost_price,
            low_stock_threshold: draft
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            total_stock: 0,
            sold_quantity: 0,
            remaining_stock: 0,
            created_at: now,
        })
    }

    /// Apply a partial edit. Validates every provided field, plus the
    /// cost-below-price rule on the patched result, before mutating.
    pub fn apply_patch(&mut self, patch: ItemPatch) -> DomainResult<()> {
        let name = match &patch.name {
            Some(name) => Some(required_text("name", name)?),
            None => None,
        };
        let category = match &patch.category {
            Some(category) => Some(required_text("category", category)?),
            None => None,
        };
        let supplier = match &patch.supplier {
            Some(supplier) => Some(required_text("supplier", supplier)?),
            None => None,
        };
        let price = patch.price.unwrap_or(self.price);
        let cost_price = patch.cost_price.unwrap_or(self.cost_price);
        validate_prices(price, cost_price)?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(supplier) = supplier {
            self.supplier = supplier;
        }
        self.price = price;
        self.cost_price = cost_price;
        if let Some(threshold) = patch.low_stock_threshold {
            self.low_stock_threshold = threshold;
        }
        Ok(())
    }

    /// Overwrite the derived stock figures with a freshly recomputed
    /// snapshot. This is the only writer of those fields.
    pub fn apply_aggregates(&mut self, aggregates: StockAggregates) {
        self.total_stock = aggregates.total_stock;
        self.sold_quantity = aggregates.sold_quantity;
        self.remaining_stock = aggregates.remaining_stock;
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn code(&self) -> &ItemCode {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn cost_price(&self) -> i64 {
        self.cost_price
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    pub fn total_stock(&self) -> i64 {
        self.total_stock
    }

    pub fn sold_quantity(&self) -> i64 {
        self.sold_quantity
    }

    pub fn remaining_stock(&self) -> i64 {
        self.remaining_stock
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn aggregates(&self) -> StockAggregates {
        StockAggregates {
            total_stock: self.total_stock,
            sold_quantity: self.sold_quantity,
            remaining_stock: self.remaining_stock,
        }
    }

    /// Margin percentage, e.g. 55.0 for an item sold at 100 costing 45.
    pub fn profit_margin(&self) -> f64 {
        ((self.price - self.cost_price) as f64 / self.price as f64) * 100.0
    }

    pub fn stock_status(&self) -> StockStatus {
        if self.remaining_stock == 0 {
            StockStatus::OutOfStock
        } else if self.remaining_stock <= i64::from(self.low_stock_threshold) {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

fn required_text(field: &str, value: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

fn validate_prices(price: i64, cost_price: i64) -> DomainResult<()> {
    if price <= 0 {
        return Err(DomainError::validation("price must be positive"));
    }
    if cost_price <= 0 {
        return Err(DomainError::validation("cost price must be positive"));
    }
    if cost_price >= price {
        return Err(DomainError::validation(
            "cost price must be less than selling price",
        ));
    }
    Ok(())
}
