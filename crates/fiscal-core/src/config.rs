//! Desk Configuration
//!
//! Stored like any other value, under `deskConfig`. Missing or corrupt
//! config silently falls back to the defaults.

use serde::{Deserialize, Serialize};

use crate::domain::CollectionKey;
use crate::error::DomainResult;
use crate::repository::{read_json, write_json, KeyValueStore, DEFAULT_HISTORY_CAPACITY};

pub const DEFAULT_ASSISTANT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_ASSISTANT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssistantConfig {
    /// OpenAI-compatible chat completions endpoint
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ASSISTANT_ENDPOINT.to_string(),
            model: DEFAULT_ASSISTANT_MODEL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeskConfig {
    pub assistant: AssistantConfig,
    /// How many XML checks the history keeps
    pub history_capacity: usize,
    /// Pause before a tax lookup result is shown
    pub lookup_delay_ms: u32,
    /// `log` level name: error, warn, info, debug, trace
    pub log_level: String,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            assistant: AssistantConfig::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            lookup_delay_ms: 600,
            log_level: "info".to_string(),
        }
    }
}

impl DeskConfig {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        read_json(store, CollectionKey::DeskConfig).unwrap_or_default()
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> DomainResult<()> {
        write_json(store, CollectionKey::DeskConfig, self)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;

    #[test]
    fn test_missing_config_uses_defaults() {
        let store = MemoryStore::new();
        let config = DeskConfig::load(&store);
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let store = MemoryStore::with_entries([("deskConfig", r#"{"lookupDelayMs": 0, "logLevel": "debug"}"#)]);
        let config = DeskConfig::load(&store);
        assert_eq!(config.lookup_delay_ms, 0);
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.log_level(), log::LevelFilter::Debug);
        assert_eq!(config.assistant.model, DEFAULT_ASSISTANT_MODEL);
    }

    #[test]
    fn test_save_round_trip() {
        let store = MemoryStore::new();
        let mut config = DeskConfig::default();
        config.assistant.api_key = Some("sk-test".into());
        config.save(&store).unwrap();
        assert_eq!(DeskConfig::load(&store), config);
    }
}
