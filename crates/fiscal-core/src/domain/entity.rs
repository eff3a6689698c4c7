//! Domain Layer - Core Entity Trait
//!
//! Every record lives inside one JSON array stored under its collection key.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Store keys owned by the desk. The string forms are the keys already
/// present in users' browsers and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollectionKey {
    Tickets,
    TaxRates,
    Providers,
    Notebooks,
    RejectedNotes,
    Tasks,
    NotasFiscais,
    ValidationHistory,
    AdminPassword,
    DeskConfig,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 10] = [
        CollectionKey::Tickets,
        CollectionKey::TaxRates,
        CollectionKey::Providers,
        CollectionKey::Notebooks,
        CollectionKey::RejectedNotes,
        CollectionKey::Tasks,
        CollectionKey::NotasFiscais,
        CollectionKey::ValidationHistory,
        CollectionKey::AdminPassword,
        CollectionKey::DeskConfig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKey::Tickets => "chamados",
            CollectionKey::TaxRates => "taxRates",
            CollectionKey::Providers => "prestadores",
            CollectionKey::Notebooks => "manualsNotebooks",
            CollectionKey::RejectedNotes => "rejectedNotes",
            CollectionKey::Tasks => "adminTasks",
            CollectionKey::NotasFiscais => "notasFiscais",
            CollectionKey::ValidationHistory => "xmlValidationHistory",
            CollectionKey::AdminPassword => "adminPassword",
            CollectionKey::DeskConfig => "deskConfig",
        }
    }

    /// Map a raw store key back to its collection (e.g. from a `storage` event)
    pub fn from_store_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl std::fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core trait for all stored entities
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection the entity is stored in
    const COLLECTION: CollectionKey;

    /// Field-level changes accepted by `update_by_id`
    type Patch: ApplyPatch<Self>;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Natural key, when the entity carries one (state code, supplier code)
    fn natural_id(&self) -> Option<String> {
        None
    }
}

/// A typed change to one entity
pub trait ApplyPatch<T> {
    fn apply(self, target: &mut T);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_keys_round_trip() {
        for key in CollectionKey::ALL {
            assert_eq!(CollectionKey::from_store_key(key.as_str()), Some(key));
        }
        assert_eq!(CollectionKey::from_store_key("somethingElse"), None);
    }

    #[test]
    fn test_legacy_key_names() {
        assert_eq!(CollectionKey::Tickets.as_str(), "chamados");
        assert_eq!(CollectionKey::Notebooks.as_str(), "manualsNotebooks");
        assert_eq!(CollectionKey::ValidationHistory.as_str(), "xmlValidationHistory");
    }
}
