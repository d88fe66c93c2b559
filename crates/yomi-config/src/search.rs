use std::env;

use serde::{Deserialize, Serialize};

fn default_max_results() -> usize {
    50
}

fn default_scan_length() -> usize {
    10
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Hits kept after ranking, 0 keeps everything
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Longest prefix (in characters) tried when scanning a sentence
    #[serde(default = "default_scan_length")]
    pub scan_length: usize,
}

impl SearchConfig {
    pub fn new() -> Self {
        let scan_length = env::var("YOMI_SCAN_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or_else(default_scan_length);

        Self {
            max_results: default_max_results(),
            scan_length,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            scan_length: default_scan_length(),
        }
    }
}
