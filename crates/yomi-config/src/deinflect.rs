use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_max_depth() -> usize {
    8
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DeinflectConfig {
    /// Longest rule chain followed from a surface form
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Rule table to use instead of the embedded one
    pub rules_path: Option<PathBuf>,
}

impl DeinflectConfig {
    pub fn new() -> Self {
        let max_depth = env::var("YOMI_DEINFLECT_MAX_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_depth);

        let rules_path = env::var("YOMI_DEINFLECT_RULES").ok().map(PathBuf::from);

        Self {
            max_depth,
            rules_path,
        }
    }
}

impl Default for DeinflectConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            rules_path: None,
        }
    }
}
