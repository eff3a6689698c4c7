//! Generic collection repository
//!
//! One JSON array per collection key. Ids are the entity's natural key
//! when it has one, otherwise the creation time in milliseconds (bumped
//! until unique within the collection).
//!
//! Elements are decoded one by one. An element that no longer fits the
//! entity shape is left out of `list` but written back untouched by every
//! mutation. A key that is not a JSON array at all blocks mutations with
//! `DomainError::Storage` instead of being overwritten.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::bus::ChangeBus;
use super::store::{write_json, KeyValueStore};
use super::traits::Repository;
use crate::clock::Clock;
use crate::domain::{ApplyPatch, Entity};
use crate::error::{DomainError, DomainResult};

pub struct CollectionRepository<T: Entity> {
    store: Arc<dyn KeyValueStore>,
    bus: ChangeBus,
    clock: Arc<dyn Clock>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for CollectionRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            bus: self.bus.clone(),
            clock: Arc::clone(&self.clock),
            _entity: PhantomData,
        }
    }
}

/// One stored element
#[derive(Serialize)]
#[serde(untagged)]
enum Slot<T> {
    Known(T),
    /// Kept verbatim; does not decode as `T`
    Unknown(Value),
}

impl<T: Entity> Slot<T> {
    fn known(&self) -> Option<&T> {
        match self {
            Slot::Known(entity) => Some(entity),
            Slot::Unknown(_) => None,
        }
    }

    fn id(&self) -> Option<&str> {
        match self {
            Slot::Known(entity) => Some(entity.id()),
            Slot::Unknown(raw) => raw.get("id").and_then(Value::as_str),
        }
    }
}

/// Smallest millisecond id at or after `now_ms` not already taken
pub(crate) fn fresh_id<'a>(now_ms: i64, taken: impl Iterator<Item = &'a str> + Clone) -> String {
    let mut candidate = now_ms;
    loop {
        let id = candidate.to_string();
        if !taken.clone().any(|t| t == id) {
            return id;
        }
        candidate += 1;
    }
}

impl<T: Entity> CollectionRepository<T> {
    pub fn new(store: Arc<dyn KeyValueStore>, bus: ChangeBus, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            bus,
            clock,
            _entity: PhantomData,
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Whether the collection key exists at all
    pub fn contains_key(&self) -> bool {
        self.store.contains(T::COLLECTION.as_str())
    }

    fn load(&self) -> DomainResult<Vec<Slot<T>>> {
        let key = T::COLLECTION;
        let Some(raw) = self.store.read(key.as_str())? else {
            return Ok(Vec::new());
        };
        let values: Vec<Value> = serde_json::from_str(&raw)
            .map_err(|e| DomainError::Storage(format!("'{}' is not a readable list: {}", key, e)))?;
        Ok(values
            .into_iter()
            .map(|value| match serde_json::from_value::<T>(value.clone()) {
                Ok(entity) => Slot::Known(entity),
                Err(e) => {
                    log::warn!("Keeping unreadable record in '{}' as is: {}", key, e);
                    Slot::Unknown(value)
                }
            })
            .collect())
    }

    fn store_slots(&self, slots: &[Slot<T>]) -> DomainResult<()> {
        write_json(self.store.as_ref(), T::COLLECTION, slots)?;
        self.bus.notify(T::COLLECTION);
        Ok(())
    }

    pub(crate) fn save(&self, items: &[T]) -> DomainResult<()> {
        write_json(self.store.as_ref(), T::COLLECTION, items)?;
        self.bus.notify(T::COLLECTION);
        Ok(())
    }

    /// Apply several patches to one entity in a single write
    pub fn update_many(&self, id: &str, patches: Vec<T::Patch>) -> DomainResult<T> {
        let mut slots = self.load()?;
        let entity = slots
            .iter_mut()
            .find_map(|slot| match slot {
                Slot::Known(entity) if entity.id() == id => Some(entity),
                _ => None,
            })
            .ok_or_else(|| DomainError::NotFound(format!("{} '{}'", T::COLLECTION, id)))?;
        for patch in patches {
            patch.apply(entity);
        }
        // Patches never move an entity to another id
        entity.set_id(id.to_string());
        let updated = entity.clone();
        self.store_slots(&slots)?;
        log::debug!("Updated {} '{}'", T::COLLECTION, id);
        Ok(updated)
    }
}

impl<T: Entity> Repository<T> for CollectionRepository<T> {
    fn list(&self) -> Vec<T> {
        match self.load() {
            Ok(slots) => slots
                .into_iter()
                .filter_map(|slot| match slot {
                    Slot::Known(entity) => Some(entity),
                    Slot::Unknown(_) => None,
                })
                .collect(),
            Err(e) => {
                log::warn!("Listing '{}' as empty: {}", T::COLLECTION, e);
                Vec::new()
            }
        }
    }

    fn seed_if_absent(&self, defaults: Vec<T>) -> DomainResult<bool> {
        if self.contains_key() {
            return Ok(false);
        }
        log::info!("Seeding '{}' with {} default record(s)", T::COLLECTION, defaults.len());
        self.save(&defaults)?;
        Ok(true)
    }

    fn create(&self, mut entity: T) -> DomainResult<T> {
        let mut slots = self.load()?;
        let id = match entity.natural_id() {
            Some(key) => {
                let taken = slots.iter().any(|slot| {
                    slot.id() == Some(key.as_str())
                        || slot.known().and_then(|e| e.natural_id()).as_deref() == Some(key.as_str())
                });
                if taken {
                    return Err(DomainError::Conflict(format!("{} '{}' already exists", T::COLLECTION, key)));
                }
                key
            }
            None => fresh_id(self.clock.now().timestamp_millis(), slots.iter().filter_map(Slot::id)),
        };
        entity.set_id(id);
        slots.push(Slot::Known(entity.clone()));
        self.store_slots(&slots)?;
        log::info!("Created {} '{}'", T::COLLECTION, entity.id());
        Ok(entity)
    }

    fn update_by_id(&self, id: &str, patch: T::Patch) -> DomainResult<T> {
        self.update_many(id, vec![patch])
    }

    fn delete_by_id(&self, id: &str) -> DomainResult<bool> {
        let mut slots = self.load()?;
        let before = slots.len();
        slots.retain(|slot| slot.known().map_or(true, |e| e.id() != id));
        if slots.len() == before {
            return Ok(false);
        }
        self.store_slots(&slots)?;
        log::info!("Deleted {} '{}'", T::COLLECTION, id);
        Ok(true)
    }

    fn replace_all(&self, entities: Vec<T>) -> DomainResult<()> {
        self.save(&entities)?;
        log::info!("Replaced '{}' with {} record(s)", T::COLLECTION, entities.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_id_skips_taken() {
        let taken = ["100", "101", "103"];
        assert_eq!(fresh_id(100, taken.iter().copied()), "102");
        assert_eq!(fresh_id(200, taken.iter().copied()), "200");
    }
}
