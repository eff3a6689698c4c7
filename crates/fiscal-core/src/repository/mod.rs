//! Repository Layer
//!
//! Store adapter, change bus and the repositories built on them. A
//! `DataContext` is created once at startup and handed to whoever needs
//! data; nothing here is a hidden global.

mod bus;
mod collection;
mod history_repo;
mod notebook_repo;
mod password_repo;
mod store;
mod traits;

#[cfg(test)]
mod tests;

pub use bus::{ChangeBus, ChangeEvent, Subscription};
pub use collection::CollectionRepository;
pub use history_repo::{ValidationHistory, DEFAULT_HISTORY_CAPACITY};
pub use notebook_repo::{NotebookRepository, PageRemoval};
pub use password_repo::{AdminPasswordRepository, DEFAULT_ADMIN_PASSWORD};
pub use store::{read_json, write_json, KeyValueStore, MemoryStore};
pub use traits::{Repository, SearchableRepository};

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::DeskConfig;
use crate::domain::{
    default_providers, default_tax_rates, AdminTask, Entity, NotaFiscal, Provider, ProviderPatch, RejectedNote,
    TaxRateRow, Ticket,
};
use crate::error::{DomainError, DomainResult};
use crate::validation::FieldErrors;
use crate::views::provider_matches;

/// Everything the screens need to reach stored data
#[derive(Clone)]
pub struct DataContext {
    pub store: Arc<dyn KeyValueStore>,
    pub bus: ChangeBus,
    pub clock: Arc<dyn Clock>,
}

impl DataContext {
    pub fn new(store: Arc<dyn KeyValueStore>, bus: ChangeBus, clock: Arc<dyn Clock>) -> Self {
        Self { store, bus, clock }
    }

    /// Memory-backed context on the wall clock
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), ChangeBus::new(), Arc::new(SystemClock))
    }

    pub fn collection<T: Entity>(&self) -> CollectionRepository<T> {
        CollectionRepository::new(Arc::clone(&self.store), self.bus.clone(), Arc::clone(&self.clock))
    }

    pub fn tickets(&self) -> CollectionRepository<Ticket> {
        self.collection()
    }

    pub fn tax_rates(&self) -> CollectionRepository<TaxRateRow> {
        self.collection()
    }

    pub fn providers(&self) -> CollectionRepository<Provider> {
        self.collection()
    }

    pub fn rejected_notes(&self) -> CollectionRepository<RejectedNote> {
        self.collection()
    }

    pub fn tasks(&self) -> CollectionRepository<AdminTask> {
        self.collection()
    }

    pub fn notas_fiscais(&self) -> CollectionRepository<NotaFiscal> {
        self.collection()
    }

    pub fn notebooks(&self) -> NotebookRepository {
        NotebookRepository::new(self.collection())
    }

    pub fn validation_history(&self) -> ValidationHistory {
        // Config may shrink the history, never grow it past the default
        let capacity = self.config().history_capacity.min(DEFAULT_HISTORY_CAPACITY);
        ValidationHistory::new(Arc::clone(&self.store), self.bus.clone(), Arc::clone(&self.clock), capacity)
    }

    pub fn admin_password(&self) -> AdminPasswordRepository {
        AdminPasswordRepository::new(Arc::clone(&self.store), self.bus.clone(), Arc::clone(&self.clock))
    }

    pub fn config(&self) -> DeskConfig {
        DeskConfig::load(self.store.as_ref())
    }

    /// First-run seeding of the lookup tables; existing data is never touched
    pub fn seed_defaults(&self) -> DomainResult<()> {
        self.tax_rates().seed_if_absent(default_tax_rates())?;
        self.providers().seed_if_absent(default_providers())?;
        Ok(())
    }
}

impl CollectionRepository<TaxRateRow> {
    /// Overwrite every edit with the built-in table
    pub fn restore_defaults(&self) -> DomainResult<()> {
        log::warn!("Restoring default tax rates; admin edits are discarded");
        self.replace_all(default_tax_rates())
    }
}

impl CollectionRepository<Provider> {
    /// Full edit from the provider form. The supplier code is the record's
    /// key: it cannot change once set, and may not collide with another record.
    pub fn replace_provider(&self, id: &str, provider: Provider) -> DomainResult<Provider> {
        let existing = self
            .find_by_id(id)
            .ok_or_else(|| DomainError::NotFound(format!("{} '{}'", Provider::COLLECTION, id)))?;
        let new_key = provider.natural_id();
        if let Some(old_key) = existing.natural_id() {
            if new_key.as_deref() != Some(old_key.as_str()) {
                return Err(FieldErrors::single("fornecedor", "Código do fornecedor não pode ser alterado").into());
            }
        } else if let Some(key) = new_key.as_deref() {
            let taken = self
                .list()
                .iter()
                .any(|p| p.id() != id && (p.id() == key || p.natural_id().as_deref() == Some(key)));
            if taken {
                return Err(FieldErrors::single("fornecedor", "Fornecedor já cadastrado").into());
            }
        }
        self.update_by_id(id, ProviderPatch::Replace(Box::new(provider)))
    }
}

impl SearchableRepository<Provider> for CollectionRepository<Provider> {
    fn search(&self, query: &str) -> Vec<Provider> {
        self.list().into_iter().filter(|p| provider_matches(p, query)).collect()
    }
}
