use std::env;

use serde::{Deserialize, Serialize};

fn default_batch_size() -> usize {
    1000
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ImportConfig {
    /// Records buffered before each bulk insert
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl ImportConfig {
    pub fn new() -> Self {
        let batch_size = env::var("YOMI_IMPORT_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or_else(default_batch_size);

        Self { batch_size }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}
