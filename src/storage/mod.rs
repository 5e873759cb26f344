// Key-value persistence for the service and alert collections
pub mod collections;
pub mod memory;
pub mod migrations;
pub mod sqlite;

use anyhow::Result;

pub use collections::{load_collection, save_collection, ALERTS_KEY, SERVICES_KEY};
pub use memory::MemoryStore;
pub use sqlite::Database;

/// Minimal string key-value storage
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Returns whether the key existed
    fn remove(&self, key: &str) -> Result<bool>;
}
