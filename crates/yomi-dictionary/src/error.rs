#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode definitions: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store connection lock poisoned")]
    LockPoisoned,

    #[error("Another import is already running against this store")]
    ImportInProgress,
}

/// Structural failure inside one bank file.
///
/// Field-level type mismatches never end up here; they are coerced.
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("expected a JSON array of records")]
    NotAnArray,

    #[error("record {index}: {source}")]
    Json {
        index: usize,
        source: serde_json::Error,
    },

    #[error("unexpected byte {found:?} after record {index}")]
    UnexpectedByte { index: usize, found: char },

    #[error("unexpected end of file after record {index}")]
    UnexpectedEnd { index: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Archive has no index.json")]
    MissingIndex,

    #[error("Malformed index.json: {0}")]
    MalformedIndex(String),

    #[error("Failed to read archive: {0}")]
    ArchiveRead(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed bank {file}: {source}")]
    MalformedBank {
        file: String,
        #[source]
        source: BankError,
    },

    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),

    #[error("Import cancelled")]
    Cancelled,
}

impl From<rusqlite::Error> for ImportError {
    fn from(e: rusqlite::Error) -> Self {
        ImportError::Storage(StoreError::Sqlite(e))
    }
}
