//! Persistent Store Adapter
//!
//! Raw string key/value access. Callers own JSON encoding; `read_json`
//! and `write_json` are the helpers every repository goes through.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::CollectionKey;
use crate::error::{DomainError, DomainResult};

/// Per-origin durable key/value store (browser `localStorage` in the app)
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> DomainResult<Option<String>>;

    fn write(&self, key: &str, value: &str) -> DomainResult<()>;

    fn remove(&self, key: &str) -> DomainResult<()>;

    fn contains(&self, key: &str) -> bool {
        matches!(self.read(key), Ok(Some(_)))
    }
}

/// In-process store used by tests and when `localStorage` is unavailable
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }
}

fn poisoned<T>(_: T) -> DomainError {
    DomainError::Storage("Memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> DomainResult<Option<String>> {
        Ok(self.entries.lock().map_err(poisoned)?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> DomainResult<()> {
        self.entries.lock().map_err(poisoned)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        self.entries.lock().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

/// Read and decode a value. Missing, unreadable and corrupt entries all
/// come back as `None`; corruption is logged, never surfaced.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: CollectionKey) -> Option<T> {
    let raw = match store.read(key.as_str()) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Failed to read '{}': {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring corrupt data under '{}': {}", key, e);
            None
        }
    }
}

/// Encode and write a value, replacing whatever was stored
pub fn write_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: CollectionKey, value: &T) -> DomainResult<()> {
    let raw = serde_json::to_string(value)?;
    store.write(key.as_str(), &raw).map_err(|e| {
        log::error!("Failed to write '{}': {}", key, e);
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_json_reads_as_absent() {
        let store = MemoryStore::with_entries([("chamados", "[{not json")]);
        let value: Option<Vec<serde_json::Value>> = read_json(&store, CollectionKey::Tickets);
        assert!(value.is_none());
        assert!(store.contains("chamados"));
    }

    #[test]
    fn test_write_then_read() {
        let store = MemoryStore::new();
        write_json(&store, CollectionKey::Tasks, &vec![1, 2, 3]).unwrap();
        assert_eq!(store.read("adminTasks").unwrap().as_deref(), Some("[1,2,3]"));
        let back: Option<Vec<u8>> = read_json(&store, CollectionKey::Tasks);
        assert_eq!(back, Some(vec![1, 2, 3]));
        store.remove("adminTasks").unwrap();
        assert!(!store.contains("adminTasks"));
    }
}
