//! Browser Storage
//!
//! `localStorage` behind the core `KeyValueStore` trait, plus the bridge
//! that turns writes from other tabs into change-bus notifications.

use std::sync::Arc;

use fiscal_core::domain::CollectionKey;
use fiscal_core::repository::{ChangeBus, DataContext, KeyValueStore, MemoryStore};
use fiscal_core::{DomainError, DomainResult, SystemClock};
use wasm_bindgen::JsCast;

/// Per-origin `localStorage`. Looked up on every call so the type stays
/// `Send + Sync` and holds no JS handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

fn js_err(action: &str, err: wasm_bindgen::JsValue) -> DomainError {
    DomainError::Storage(format!("localStorage {} failed: {:?}", action, err))
}

impl LocalStorage {
    fn storage(&self) -> DomainResult<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| DomainError::Storage("no window".to_string()))?
            .local_storage()
            .map_err(|e| js_err("access", e))?
            .ok_or_else(|| DomainError::Storage("localStorage unavailable".to_string()))
    }

    pub fn available() -> bool {
        LocalStorage.storage().is_ok()
    }
}

impl KeyValueStore for LocalStorage {
    fn read(&self, key: &str) -> DomainResult<Option<String>> {
        self.storage()?.get_item(key).map_err(|e| js_err("read", e))
    }

    fn write(&self, key: &str, value: &str) -> DomainResult<()> {
        self.storage()?.set_item(key, value).map_err(|e| js_err("write", e))
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        self.storage()?.remove_item(key).map_err(|e| js_err("remove", e))
    }
}

/// Data context over `localStorage`, or memory when the browser refuses
/// storage (private mode, disabled cookies)
pub fn open_data_context() -> DataContext {
    let store: Arc<dyn KeyValueStore> = if LocalStorage::available() {
        Arc::new(LocalStorage)
    } else {
        log::warn!("localStorage unavailable, data will not survive a reload");
        Arc::new(MemoryStore::new())
    };
    DataContext::new(store, ChangeBus::new(), Arc::new(SystemClock))
}

/// Forward `storage` events (fired for writes made by other tabs) to the bus.
/// A cleared store (`key == null`) refreshes every collection.
pub fn bridge_storage_events(bus: ChangeBus) {
    use wasm_bindgen::closure::Closure;

    let on_storage = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(move |ev: web_sys::StorageEvent| {
        match ev.key() {
            Some(key) => {
                if let Some(collection) = CollectionKey::from_store_key(&key) {
                    log::debug!("'{}' changed in another tab", key);
                    bus.notify(collection);
                }
            }
            None => {
                for collection in CollectionKey::ALL {
                    bus.notify(collection);
                }
            }
        }
    });

    if let Some(window) = web_sys::window() {
        let _ = window.add_event_listener_with_callback("storage", on_storage.as_ref().unchecked_ref());
    }
    on_storage.forget();
}
