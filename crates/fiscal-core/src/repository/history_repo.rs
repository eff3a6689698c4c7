//! Validation History
//!
//! Capped list of checked XML files, newest first. Every insert rewrites
//! the list truncated to the capacity; entries that no longer decode are
//! carried along rather than dropped.

use super::collection::fresh_id;
use super::store::{write_json, KeyValueStore};
use super::bus::ChangeBus;
use crate::clock::Clock;
use crate::domain::{CollectionKey, ValidationHistoryItem, ValidationStatus};
use crate::error::{DomainError, DomainResult};

use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

#[derive(Clone)]
pub struct ValidationHistory {
    store: Arc<dyn KeyValueStore>,
    bus: ChangeBus,
    clock: Arc<dyn Clock>,
    capacity: usize,
}

impl ValidationHistory {
    pub fn new(store: Arc<dyn KeyValueStore>, bus: ChangeBus, clock: Arc<dyn Clock>, capacity: usize) -> Self {
        Self {
            store,
            bus,
            clock,
            capacity: capacity.max(1),
        }
    }

    /// Entries, newest first
    pub fn list(&self) -> Vec<ValidationHistoryItem> {
        match self.load() {
            Ok(values) => values
                .into_iter()
                .filter_map(|value| serde_json::from_value(value).ok())
                .collect(),
            Err(e) => {
                log::warn!("Listing validation history as empty: {}", e);
                Vec::new()
            }
        }
    }

    fn load(&self) -> DomainResult<Vec<Value>> {
        let key = CollectionKey::ValidationHistory;
        match self.store.read(key.as_str())? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| DomainError::Storage(format!("'{}' is not a readable list: {}", key, e))),
            None => Ok(Vec::new()),
        }
    }

    pub fn record(&self, file_name: &str, status: ValidationStatus) -> DomainResult<ValidationHistoryItem> {
        let mut items = self.record_many(&[(file_name.to_string(), status)])?;
        Ok(items.remove(0))
    }

    /// Record a whole batch with one write; the last file of the batch ends up first
    pub fn record_many(&self, files: &[(String, ValidationStatus)]) -> DomainResult<Vec<ValidationHistoryItem>> {
        let mut items = self.load()?;
        let now = self.clock.now();
        let mut added = Vec::with_capacity(files.len());
        for (file_name, status) in files {
            let id = fresh_id(
                now.timestamp_millis(),
                items.iter().filter_map(|i| i.get("id").and_then(Value::as_str)),
            );
            let item = ValidationHistoryItem {
                id,
                file_name: file_name.clone(),
                date: now,
                status: *status,
            };
            items.insert(0, serde_json::to_value(&item)?);
            added.insert(0, item);
        }
        items.truncate(self.capacity);
        write_json(self.store.as_ref(), CollectionKey::ValidationHistory, &items)?;
        self.bus.notify(CollectionKey::ValidationHistory);
        Ok(added)
    }

    pub fn clear(&self) -> DomainResult<()> {
        self.store.remove(CollectionKey::ValidationHistory.as_str())?;
        self.bus.notify(CollectionKey::ValidationHistory);
        Ok(())
    }
}
