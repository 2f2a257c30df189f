use std::sync::Arc;

use studybot_core::Config;
use studybot_llm::{ConfigError, Gateway};
use studybot_storage::{MemoryStore, Store};

pub struct AppState {
    pub config: Config,
    pub gateway: Gateway,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(config: Config, gateway: Gateway, store: Arc<dyn Store>) -> Self {
        Self {
            config,
            gateway,
            store,
        }
    }

    /// Gateway from config, backed by the in-memory store.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let gateway = Gateway::from_config(&config.llm, &config.segment)?;
        Ok(Self::new(config, gateway, Arc::new(MemoryStore::new())))
    }
}
