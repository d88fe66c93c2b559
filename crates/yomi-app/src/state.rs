use std::sync::Arc;

use yomi_config::Config;
use yomi_dictionary::{Store, StoreError};
use yomi_lang_japanese::JapaneseProcessor;

pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    pub processor: JapaneseProcessor,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, StoreError> {
        let store = Arc::new(Store::from_config(&config.store)?);
        tracing::debug!("Opened store at {}", store.path().display());

        let processor = JapaneseProcessor::new(Arc::clone(&store), &config);

        Ok(Self {
            config,
            store,
            processor,
        })
    }
}
