use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_db_path() -> PathBuf {
    PathBuf::from("yomi.db")
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file holding every imported dictionary
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// How long a reader waits on a locked database before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    pub fn new() -> Self {
        let db_path = env::var("YOMI_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());

        Self {
            db_path,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}
