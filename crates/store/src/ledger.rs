use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use stockbook_core::{DomainError, DomainResult, ItemId};
use stockbook_inventory::{
    recompute_aggregates, Item, ItemPatch, NewItem, NewMovement, StockAggregates, StockMovement,
};

use crate::keys;
use crate::kv::KeyValueStore;

#[derive(Debug, Default)]
struct LedgerState {
    items: Vec<Item>,
    movements: Vec<StockMovement>,
}

/// Repository owning the item and movement collections.
///
/// This is the source of truth: every mutation commits here first and is
/// written through to the cache before any remote mirroring happens.
/// Collections are kept in insertion order, as they are serialized.
#[derive(Debug)]
pub struct LocalLedger<K> {
    kv: K,
    state: RwLock<LedgerState>,
}

impl<K: KeyValueStore> LocalLedger<K> {
    /// Load both collections from the cache. A missing key means an empty
    /// collection; a corrupt payload is logged and treated the same way.
    pub fn load(kv: K) -> Self {
        let items = read_collection(&kv, keys::ITEMS);
        let movements = read_collection(&kv, keys::MOVEMENTS);
        Self {
            kv,
            state: RwLock::new(LedgerState { items, movements }),
        }
    }

    pub fn list_items(&self) -> Vec<Item> {
        self.read_state().items.clone()
    }

    pub fn get_item(&self, id: ItemId) -> DomainResult<Item> {
        self.read_state()
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    pub fn find_by_code(&self, code: &str) -> Option<Item> {
        self.read_state()
            .items
            .iter()
            .find(|item| item.code().as_str() == code)
            .cloned()
    }

    /// Validate and insert a new item. Item codes are unique across the
    /// ledger; a duplicate is a conflict, not an upsert.
    pub fn create_item(&self, draft: NewItem) -> DomainResult<Item> {
        let item = Item::create(draft, Utc::now())?;
        if self.find_by_code(item.code().as_str()).is_some() {
            return Err(DomainError::conflict(format!(
                "item code {} already exists",
                item.code()
            )));
        }

        let mut state = self.write_state();
        state.items.push(item.clone());
        self.persist_items(&state);
        Ok(item)
    }

    /// Apply a partial edit to an item's catalog fields.
    pub fn update_item(&self, id: ItemId, patch: ItemPatch) -> DomainResult<Item> {
        let mut state = self.write_state();
        let item = state
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(DomainError::NotFound)?;
        item.apply_patch(patch)?;
        let updated = item.clone();
        self.persist_items(&state);
        Ok(updated)
    }

    /// Remove an item and every movement recorded against it, returning the
    /// removed item so callers can mirror the deletion.
    pub fn delete_item(&self, id: ItemId) -> DomainResult<Item> {
        let mut state = self.write_state();
        let position = state
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(DomainError::NotFound)?;
        let removed = state.items.remove(position);
        state.movements.retain(|movement| movement.item_id() != id);
        self.persist_items(&state);
        self.persist_movements(&state);
        Ok(removed)
    }

    /// Record a movement and refresh its item's stock figures from the full
    /// history. Returns the stored movement together with the updated item.
    pub fn record_movement(&self, draft: NewMovement) -> DomainResult<(StockMovement, Item)> {
        let item_id = draft.item_id;
        let movement = StockMovement::record(draft, Utc::now())?;

        let mut state = self.write_state();
        let position = state
            .items
            .iter()
            .position(|item| item.id() == item_id)
            .ok_or(DomainError::NotFound)?;

        state.movements.push(movement.clone());
        let history: Vec<StockMovement> = state
            .movements
            .iter()
            .filter(|m| m.item_id() == item_id)
            .cloned()
            .collect();
        let aggregates = recompute_aggregates(&history);
        state.items[position].apply_aggregates(aggregates);
        let updated = state.items[position].clone();

        self.persist_items(&state);
        self.persist_movements(&state);
        Ok((movement, updated))
    }

    pub fn list_movements(&self) -> Vec<StockMovement> {
        self.read_state().movements.clone()
    }

    pub fn movements_for(&self, id: ItemId) -> Vec<StockMovement> {
        self.read_state()
            .movements
            .iter()
            .filter(|movement| movement.item_id() == id)
            .cloned()
            .collect()
    }

    /// Current stock figures for an item; zeroes when the item is unknown.
    pub fn aggregates_for(&self, id: ItemId) -> StockAggregates {
        let history = self.movements_for(id);
        if history.is_empty() {
            return StockAggregates::default();
        }
        recompute_aggregates(&history)
    }

    fn persist_items(&self, state: &LedgerState) {
        write_collection(&self.kv, keys::ITEMS, &state.items);
    }

    fn persist_movements(&self, state: &LedgerState) {
        write_collection(&self.kv, keys::MOVEMENTS, &state.movements);
    }

    // The collections stay well formed across panics (mutations are single
    // push/remove/retain steps), so a poisoned guard is still usable.
    fn read_state(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_collection<K: KeyValueStore, T: DeserializeOwned>(kv: &K, key: &str) -> Vec<T> {
    match kv.get(key) {
        None => Vec::new(),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!("corrupt cache payload under {key}, starting empty: {err}");
                Vec::new()
            }
        },
    }
}

fn write_collection<K: KeyValueStore, T: Serialize>(kv: &K, key: &str, collection: &[T]) {
    match serde_json::to_string(collection) {
        Ok(json) => kv.set(key, &json),
        Err(err) => {
            tracing::error!("failed to serialize {key} for the cache: {err}");
        }
    }
}
