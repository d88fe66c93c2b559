use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use yomi_config::import::ImportConfig;

use crate::archive::{ArchiveReader, BankEntry, BankRole};
use crate::bank::{BankRecord, BankRecords, IndexRecord, KanjiRecord, MetaRecord, TagRecord, TermRecord};
use crate::error::{ImportError, StoreError};
use crate::store::Store;
use crate::types::Dictionary;

/// Reported once per bank file, after its rows are inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportProgress {
    /// Bank files finished so far, 1..=total
    pub processed: usize,
    pub total: usize,
    pub file_name: String,
}

/// Imports Yomitan archives into a [`Store`].
///
/// The whole archive goes through one store transaction: either the new
/// dictionary is committed with every row, or nothing is.
pub struct YomitanImporter<'s> {
    store: &'s Store,
    batch_size: usize,
}

impl<'s> YomitanImporter<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self::with_config(store, &ImportConfig::default())
    }

    pub fn with_config(store: &'s Store, config: &ImportConfig) -> Self {
        Self {
            store,
            batch_size: config.batch_size.max(1),
        }
    }

    pub fn import_file(
        &self,
        path: &Path,
        progress: impl FnMut(&ImportProgress),
    ) -> Result<Dictionary, ImportError> {
        self.import_file_with_cancel(path, progress, &CancellationToken::new())
    }

    pub fn import_file_with_cancel(
        &self,
        path: &Path,
        progress: impl FnMut(&ImportProgress),
        cancel: &CancellationToken,
    ) -> Result<Dictionary, ImportError> {
        let file = File::open(path)?;
        self.import_reader_with_cancel(BufReader::new(file), progress, cancel)
    }

    pub fn import_bytes(
        &self,
        bytes: &[u8],
        progress: impl FnMut(&ImportProgress),
    ) -> Result<Dictionary, ImportError> {
        self.import_reader(Cursor::new(bytes), progress)
    }

    pub fn import_reader<R: Read + Seek>(
        &self,
        reader: R,
        progress: impl FnMut(&ImportProgress),
    ) -> Result<Dictionary, ImportError> {
        self.import_reader_with_cancel(reader, progress, &CancellationToken::new())
    }

    /// Import an archive, checking `cancel` between bank files.
    ///
    /// A cancelled import returns [`ImportError::Cancelled`] and leaves the
    /// store untouched.
    pub fn import_reader_with_cancel<R: Read + Seek>(
        &self,
        reader: R,
        mut progress: impl FnMut(&ImportProgress),
        cancel: &CancellationToken,
    ) -> Result<Dictionary, ImportError> {
        // Everything structural about the archive is checked before any write
        let mut archive = ArchiveReader::open(reader)?;
        let index = IndexRecord::parse(&archive.read_index()?)?;
        let banks = archive.banks().to_vec();
        let total = banks.len();

        info!(
            "Importing '{}' (revision {}, format {}) from {} bank files",
            index.title, index.revision, index.format, total
        );

        let dictionary = self.store.with_import(|writer| -> Result<Dictionary, ImportError> {
            let dictionary = writer.insert_dictionary(&index)?;
            let id = dictionary.id;

            for (i, bank) in banks.iter().enumerate() {
                if cancel.is_cancelled() {
                    info!("Import of '{}' cancelled before {}", index.title, bank.name);
                    return Err(ImportError::Cancelled);
                }

                let bytes = archive.read_bank(bank)?;
                let inserted = match bank.role {
                    BankRole::Term => self.load_bank::<TermRecord>(bank, &bytes, |b| writer.insert_terms(id, b))?,
                    BankRole::Kanji => self.load_bank::<KanjiRecord>(bank, &bytes, |b| writer.insert_kanji(id, b))?,
                    BankRole::TermMeta => {
                        self.load_bank::<MetaRecord>(bank, &bytes, |b| writer.insert_term_meta(id, b))?
                    }
                    BankRole::KanjiMeta => {
                        self.load_bank::<MetaRecord>(bank, &bytes, |b| writer.insert_kanji_meta(id, b))?
                    }
                    BankRole::Tag => self.load_bank::<TagRecord>(bank, &bytes, |b| writer.insert_tag_meta(id, b))?,
                };

                info!(
                    "[{}/{}] {} ({} {} records)",
                    i + 1,
                    total,
                    bank.name,
                    inserted,
                    bank.role.as_str()
                );

                progress(&ImportProgress {
                    processed: i + 1,
                    total,
                    file_name: bank.name.clone(),
                });
            }

            if cancel.is_cancelled() {
                return Err(ImportError::Cancelled);
            }
            Ok(dictionary)
        })?;

        info!("Imported '{}' as dictionary {}", dictionary.title, dictionary.id);
        Ok(dictionary)
    }

    /// Stream one bank's records into the store in `batch_size` chunks
    fn load_bank<T: BankRecord>(
        &self,
        bank: &BankEntry,
        bytes: &[u8],
        mut insert: impl FnMut(&[T]) -> Result<usize, StoreError>,
    ) -> Result<usize, ImportError> {
        let mut records = BankRecords::<T>::new(bytes);
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut inserted = 0;

        for record in records.by_ref() {
            let record = record.map_err(|source| ImportError::MalformedBank {
                file: bank.name.clone(),
                source,
            })?;
            batch.push(record);

            if batch.len() >= self.batch_size {
                inserted += insert(&batch)?;
                debug!("Flushed {} rows from {}", batch.len(), bank.name);
                batch.clear();
            }
        }
        if !batch.is_empty() {
            inserted += insert(&batch)?;
        }

        if records.skipped() > 0 {
            warn!("Skipped {} non-array records in {}", records.skipped(), bank.name);
        }

        Ok(inserted)
    }
}
