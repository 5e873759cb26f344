use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

use crate::storage::KeyValueStore;

pub const SERVICES_KEY: &str = "sentinel_services";
pub const ALERTS_KEY: &str = "sentinel_alerts";

/// Read a JSON array stored under `key`.
///
/// Returns `None` when the key is absent or its value can't be parsed; a
/// corrupt collection is logged and treated like a missing one so the caller
/// falls back to its default. Only read failures from the store propagate.
pub fn load_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<Vec<T>>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => Ok(Some(items)),
        Err(e) => {
            tracing::warn!(key, error = %e, "Stored collection is malformed, falling back to default");
            Ok(None)
        }
    }
}

/// Rewrite the whole collection under `key`
pub fn save_collection<T: Serialize>(store: &dyn KeyValueStore, key: &str, items: &[T]) -> Result<()> {
    let json = serde_json::to_string(items)
        .with_context(|| format!("Failed to serialize collection: {}", key))?;
    store.set(key, &json)
}
