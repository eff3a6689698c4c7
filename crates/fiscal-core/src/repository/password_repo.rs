//! Admin Password
//!
//! A single string under `adminPassword`. Changes are written JSON-encoded;
//! older builds wrote the bare text, which is still accepted when the stored
//! value is not a JSON string. Falls back to "admin" when nothing is stored.

use std::sync::Arc;

use super::bus::ChangeBus;
use super::store::KeyValueStore;
use crate::clock::Clock;
use crate::domain::CollectionKey;
use crate::error::{DomainError, DomainResult};
use crate::validation::{FieldErrors, LoginForm, PasswordChangeForm, Validate};

pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

#[derive(Clone)]
pub struct AdminPasswordRepository {
    store: Arc<dyn KeyValueStore>,
    bus: ChangeBus,
    clock: Arc<dyn Clock>,
}

impl AdminPasswordRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, bus: ChangeBus, clock: Arc<dyn Clock>) -> Self {
        Self { store, bus, clock }
    }

    fn current(&self) -> String {
        match self.store.read(CollectionKey::AdminPassword.as_str()) {
            Ok(Some(raw)) => serde_json::from_str::<String>(&raw).unwrap_or(raw),
            Ok(None) => DEFAULT_ADMIN_PASSWORD.to_string(),
            Err(e) => {
                log::warn!("Failed to read admin password, using default: {}", e);
                DEFAULT_ADMIN_PASSWORD.to_string()
            }
        }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        self.current() == candidate
    }

    pub fn login(&self, form: &LoginForm) -> DomainResult<()> {
        let password = form.validate(self.clock.now())?;
        if self.verify(&password) {
            Ok(())
        } else {
            Err(FieldErrors::single("password", "Senha incorreta").into())
        }
    }

    pub fn change(&self, form: &PasswordChangeForm) -> DomainResult<()> {
        let new_password = form.validate(self.clock.now())?;
        if !self.verify(&form.current) {
            return Err(DomainError::InvalidInput(FieldErrors::single(
                "currentPassword",
                "Senha atual incorreta",
            )));
        }
        let encoded = serde_json::to_string(&new_password)?;
        self.store.write(CollectionKey::AdminPassword.as_str(), &encoded)?;
        self.bus.notify(CollectionKey::AdminPassword);
        log::info!("Admin password changed");
        Ok(())
    }
}
