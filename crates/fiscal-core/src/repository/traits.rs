//! Repository Layer - Core Traits
//!
//! The contract every collection repository offers. Writes always replace
//! the whole serialized collection (last write wins) and publish a change.

use crate::domain::Entity;
use crate::error::DomainResult;

/// CRUD over one stored collection
pub trait Repository<T: Entity> {
    /// Current snapshot; records that no longer decode are left out
    fn list(&self) -> Vec<T>;

    fn find_by_id(&self, id: &str) -> Option<T> {
        self.list().into_iter().find(|e| e.id() == id)
    }

    /// Write `defaults` only when nothing is stored yet. Returns whether it wrote.
    fn seed_if_absent(&self, defaults: Vec<T>) -> DomainResult<bool>;

    /// Store a new entity under a fresh id and return it
    fn create(&self, entity: T) -> DomainResult<T>;

    /// Apply a patch to the matching entity
    fn update_by_id(&self, id: &str, patch: T::Patch) -> DomainResult<T>;

    /// Remove the matching entity. Returns whether anything was removed.
    fn delete_by_id(&self, id: &str) -> DomainResult<bool>;

    /// Overwrite the collection unconditionally
    fn replace_all(&self, entities: Vec<T>) -> DomainResult<()>;
}

/// Extension for repositories that support text search
pub trait SearchableRepository<T: Entity>: Repository<T> {
    fn search(&self, query: &str) -> Vec<T>;
}
