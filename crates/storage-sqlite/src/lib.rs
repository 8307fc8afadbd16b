//! SQLite-backed local slot store.
//!
//! One table, one row per named slot; each row holds a whole serialized
//! collection. Durability over structure: the sync layer treats payloads as
//! opaque strings.

mod errors;
mod slot_store;

pub use errors::StorageError;
pub use slot_store::SqliteLocalStore;
