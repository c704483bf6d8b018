//! Inventory domain module.
//!
//! This crate contains the business rules for items and their stock ledger,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage). Stock figures on an item are always derived from its movement
//! history via [`ledger::recompute_aggregates`].

pub mod item;
pub mod ledger;
pub mod money;
pub mod movement;

pub use item::{Item, ItemCode, ItemPatch, NewItem, StockStatus, DEFAULT_LOW_STOCK_THRESHOLD};
pub use ledger::{recompute_aggregates, StockAggregates};
pub use movement::{MovementEntry, MovementKind, NewMovement, StockMovement};
