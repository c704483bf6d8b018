//! Local persistence: the key/value cache contract and the ledger
//! repository that owns the item and movement collections.

pub mod keys;
pub mod kv;
pub mod ledger;

pub use kv::{InMemoryKvStore, KeyValueStore};
pub use ledger::LocalLedger;
