use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use self::deinflect::DeinflectConfig;
use self::import::ImportConfig;
use self::search::SearchConfig;
use self::store::StoreConfig;

pub mod deinflect;
pub mod import;
pub mod search;
pub mod store;

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub import: ImportConfig,
    pub deinflect: DeinflectConfig,
    pub search: SearchConfig,

    /// Tracing filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Build from environment variables, falling back to defaults
    pub fn new() -> Self {
        let log_level = env::var("YOMI_LOG").unwrap_or_else(|_| default_log_level());

        Config {
            store: StoreConfig::new(),
            import: ImportConfig::new(),
            deinflect: DeinflectConfig::new(),
            search: SearchConfig::new(),

            log_level,
        }
    }

    /// Load a JSON config file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            import: ImportConfig::default(),
            deinflect: DeinflectConfig::default(),
            search: SearchConfig::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"import": {{"batch_size": 10}}, "search": {{}}}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.import.batch_size, 10);
        assert_eq!(config.search.scan_length, 10);
        assert_eq!(config.deinflect.max_depth, 8);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
