//! SQLite-backed dictionary store.
//!
//! Two connections share one WAL-mode database file: imports write through
//! `writer` inside a single immediate transaction while queries keep using
//! `reader`, which only ever observes committed state.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::Duration;

use rusqlite::{Connection, TransactionBehavior, params};
use tracing::{debug, info};
use yomi_config::store::StoreConfig;

use crate::error::StoreError;

mod read;
mod schema;
mod write;

pub use schema::SCHEMA_VERSION;
pub use write::ImportWriter;

pub struct Store {
    path: PathBuf,
    reader: Mutex<Connection>,
    writer: Mutex<Connection>,
}

impl Store {
    /// Open (and create if needed) the store at `db_path`
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_timeout(db_path, Duration::from_millis(5000))
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::open_with_timeout(
            &config.db_path,
            Duration::from_millis(config.busy_timeout_ms),
        )
    }

    fn open_with_timeout(db_path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, StoreError> {
        let path = db_path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let writer = open_connection(&path, busy_timeout)?;
        schema::init_schema(&writer)?;
        let reader = open_connection(&path, busy_timeout)?;

        info!("Opened dictionary store at {}", path.display());

        Ok(Self {
            path,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` inside the one write transaction of an import.
    ///
    /// Everything `f` inserts is committed together when it returns `Ok`,
    /// and rolled back when it returns `Err`. Only one import may run per
    /// store; a second caller gets [`StoreError::ImportInProgress`] instead
    /// of waiting.
    pub fn with_import<T, E>(&self, f: impl FnOnce(&ImportWriter<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut conn = match self.writer.try_lock() {
            Ok(conn) => conn,
            Err(TryLockError::WouldBlock) => return Err(StoreError::ImportInProgress.into()),
            Err(TryLockError::Poisoned(_)) => return Err(StoreError::LockPoisoned.into()),
        };

        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;

        // Dropping `tx` on the error path rolls everything back
        let value = f(&ImportWriter::new(&tx))?;
        tx.commit().map_err(StoreError::from)?;

        Ok(value)
    }

    /// Delete a dictionary and, by cascade, every row it owns.
    /// Returns whether a dictionary was removed.
    pub fn delete_dictionary(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.lock_writer()?;
        let removed = conn.execute("DELETE FROM dictionaries WHERE id = ?1", params![id])?;
        debug!("Deleted dictionary {} ({} rows)", id, removed);
        Ok(removed > 0)
    }

    pub fn set_dictionary_enabled(&self, id: i64, enabled: bool) -> Result<bool, StoreError> {
        let conn = self.lock_writer()?;
        let changed = conn.execute(
            "UPDATE dictionaries SET enabled = ?1 WHERE id = ?2",
            params![enabled, id],
        )?;
        Ok(changed > 0)
    }

    fn lock_writer(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.writer.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn lock_reader(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.reader.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

fn open_connection(path: &Path, busy_timeout: Duration) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;")?;
    conn.busy_timeout(busy_timeout)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::{IndexRecord, KanjiRecord, MetaRecord, TagRecord, TermRecord};
    use crate::types::Definition;
    use tempfile::TempDir;

    fn create_test_store() -> (Store, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("dict.db")).unwrap();
        (store, temp_dir)
    }

    fn index(title: &str) -> IndexRecord {
        IndexRecord {
            title: title.to_string(),
            revision: "1".to_string(),
            format: 3,
            sequenced: true,
            ..Default::default()
        }
    }

    fn term(expression: &str, reading: &str, rules: &str, score: i64, sequence: i64) -> TermRecord {
        TermRecord {
            expression: expression.to_string(),
            reading: reading.to_string(),
            tags: String::new(),
            rules: rules.to_string(),
            score,
            definitions: vec![Definition::text(format!("{expression} gloss"))],
            sequence,
            term_tags: String::new(),
        }
    }

    fn import_terms(store: &Store, title: &str, terms: &[TermRecord]) -> i64 {
        store
            .with_import(|w| -> Result<i64, StoreError> {
                let dict = w.insert_dictionary(&index(title))?;
                w.insert_terms(dict.id, terms)?;
                Ok(dict.id)
            })
            .unwrap()
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("dict.db");
        let store = Store::open(&path).unwrap();
        assert_eq!(store.path(), path);
        assert_eq!(store.counts().unwrap().dictionaries, 0);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dict.db");
        {
            let store = Store::open(&path).unwrap();
            import_terms(&store, "A", &[term("見る", "みる", "v1", 1, 1)]);
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(store.counts().unwrap().terms, 1);
    }

    #[test]
    fn test_failed_import_rolls_back_everything() {
        let (store, _temp) = create_test_store();

        let result = store.with_import(|w| -> Result<(), StoreError> {
            let dict = w.insert_dictionary(&index("Broken"))?;
            w.insert_terms(dict.id, &[term("見る", "みる", "v1", 1, 1)])?;
            Err(StoreError::LockPoisoned)
        });
        assert!(result.is_err());

        let counts = store.counts().unwrap();
        assert_eq!(counts.dictionaries, 0);
        assert_eq!(counts.terms, 0);
    }

    #[test]
    fn test_second_import_is_rejected_while_one_runs() {
        let (store, _temp) = create_test_store();

        let inner = store
            .with_import(|_w| -> Result<Result<(), StoreError>, StoreError> {
                Ok(store.with_import(|_w| -> Result<(), StoreError> { Ok(()) }))
            })
            .unwrap();
        assert!(matches!(inner, Err(StoreError::ImportInProgress)));
    }

    #[test]
    fn test_readers_do_not_see_in_flight_import() {
        let (store, _temp) = create_test_store();
        import_terms(&store, "Committed", &[term("見る", "みる", "v1", 1, 1)]);

        store
            .with_import(|w| -> Result<(), StoreError> {
                let dict = w.insert_dictionary(&index("Pending"))?;
                w.insert_terms(dict.id, &[term("見", "み", "", 1, 2)])?;

                // The committed dictionary stays readable, the pending one is invisible
                let counts = store.counts()?;
                assert_eq!(counts.dictionaries, 1);
                assert_eq!(counts.terms, 1);
                assert!(store.find_terms_exact(&["見".to_string()], None)?.is_empty());
                Ok(())
            })
            .unwrap();

        assert_eq!(store.counts().unwrap().dictionaries, 2);
    }

    #[test]
    fn test_delete_cascades_to_all_children() {
        let (store, _temp) = create_test_store();

        let id = store
            .with_import(|w| -> Result<i64, StoreError> {
                let dict = w.insert_dictionary(&index("Full"))?;
                w.insert_terms(dict.id, &[term("打つ", "うつ", "v5t", 1, 1)])?;
                w.insert_kanji(
                    dict.id,
                    &[KanjiRecord {
                        character: "打".into(),
                        onyomi: "ダ".into(),
                        kunyomi: "う.つ".into(),
                        tags: String::new(),
                        meanings: vec!["hit".into()],
                    }],
                )?;
                let meta = MetaRecord {
                    key: "打".into(),
                    mode: "freq".into(),
                    data: "1".into(),
                };
                w.insert_term_meta(dict.id, std::slice::from_ref(&meta))?;
                w.insert_kanji_meta(dict.id, std::slice::from_ref(&meta))?;
                w.insert_tag_meta(
                    dict.id,
                    &[TagRecord {
                        name: "P".into(),
                        category: "popular".into(),
                        order: -10,
                        notes: "popular term".into(),
                        score: 10,
                    }],
                )?;
                Ok(dict.id)
            })
            .unwrap();
        let other = import_terms(&store, "Other", &[term("見る", "みる", "v1", 1, 1)]);

        assert!(store.delete_dictionary(id).unwrap());
        assert!(!store.delete_dictionary(id).unwrap());

        let counts = store.counts().unwrap();
        assert_eq!(counts.dictionaries, 1);
        assert_eq!(counts.terms, 1);
        assert_eq!(counts.kanji, 0);
        assert_eq!(counts.term_meta, 0);
        assert_eq!(counts.kanji_meta, 0);
        assert_eq!(counts.tag_meta, 0);
        assert!(store.terms_in_dictionaries(&[id]).unwrap().is_empty());
        assert_eq!(store.terms_in_dictionaries(&[other]).unwrap().len(), 1);
        assert!(store.dictionary(id).unwrap().is_none());
    }

    #[test]
    fn test_enable_flag_drives_active_ids() {
        let (store, _temp) = create_test_store();
        let a = import_terms(&store, "A", &[]);
        let b = import_terms(&store, "B", &[]);

        assert_eq!(store.active_dictionary_ids().unwrap(), [a, b]);
        assert!(store.set_dictionary_enabled(a, false).unwrap());
        assert_eq!(store.active_dictionary_ids().unwrap(), [b]);
        assert!(!store.dictionary(a).unwrap().unwrap().enabled);
        assert!(!store.set_dictionary_enabled(999, true).unwrap());
    }

    #[test]
    fn test_reimport_creates_independent_dictionary() {
        let (store, _temp) = create_test_store();
        let first = import_terms(&store, "Same", &[term("見る", "みる", "v1", 1, 1)]);
        let second = import_terms(&store, "Same", &[term("見る", "みる", "v1", 1, 1)]);

        assert_ne!(first, second);
        assert_eq!(store.find_terms_exact(&["見る".to_string()], None).unwrap().len(), 2);
    }
}
