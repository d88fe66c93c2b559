use std::io::{Read, Seek};

use tracing::debug;
use zip::ZipArchive;

use crate::error::ImportError;

pub const INDEX_FILE_NAME: &str = "index.json";

/// What a bank file holds, decided by its file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankRole {
    Term,
    Kanji,
    TermMeta,
    KanjiMeta,
    Tag,
}

impl BankRole {
    const PREFIXES: [(&'static str, BankRole); 5] = [
        ("term_meta_bank_", BankRole::TermMeta),
        ("kanji_meta_bank_", BankRole::KanjiMeta),
        ("term_bank_", BankRole::Term),
        ("kanji_bank_", BankRole::Kanji),
        ("tag_bank_", BankRole::Tag),
    ];

    /// Classify a basename such as `term_bank_2.json`, ignoring case
    pub fn from_basename(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if !lower.ends_with(".json") {
            return None;
        }
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| lower.starts_with(prefix))
            .map(|(_, role)| *role)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BankRole::Term => "term",
            BankRole::Kanji => "kanji",
            BankRole::TermMeta => "term meta",
            BankRole::KanjiMeta => "kanji meta",
            BankRole::Tag => "tag",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankEntry {
    /// Final path segment inside the archive
    pub name: String,
    /// Full path inside the archive
    pub path: String,
    pub role: BankRole,
    zip_index: usize,
}

/// Last path segment, accepting both separators
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Zip-backed view of a dictionary archive.
///
/// Opening only reads the central directory; entry contents are inflated
/// on demand.
pub struct ArchiveReader<R> {
    archive: ZipArchive<R>,
    index: usize,
    banks: Vec<BankEntry>,
}

impl<R: Read + Seek> ArchiveReader<R> {
    pub fn open(reader: R) -> Result<Self, ImportError> {
        let mut archive = ZipArchive::new(reader)?;

        let mut index = Vec::new();
        let mut banks = Vec::new();

        for i in 0..archive.len() {
            let file = archive.by_index_raw(i)?;
            if file.is_dir() {
                continue;
            }
            let path = file.name().to_string();
            let name = basename(&path).to_string();

            if name.eq_ignore_ascii_case(INDEX_FILE_NAME) {
                index.push(i);
            } else if let Some(role) = BankRole::from_basename(&name) {
                banks.push(BankEntry {
                    name,
                    path,
                    role,
                    zip_index: i,
                });
            } else {
                debug!("Skipping archive entry {}", path);
            }
        }

        let index = match index.as_slice() {
            [] => return Err(ImportError::MissingIndex),
            [only] => *only,
            many => {
                return Err(ImportError::MalformedIndex(format!(
                    "archive contains {} index.json entries",
                    many.len()
                )));
            }
        };

        // Processing order is a property of the names, not the zip layout
        banks.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));

        Ok(Self {
            archive,
            index,
            banks,
        })
    }

    pub fn banks(&self) -> &[BankEntry] {
        &self.banks
    }

    pub fn read_index(&mut self) -> Result<Vec<u8>, ImportError> {
        self.read_entry(self.index)
    }

    pub fn read_bank(&mut self, entry: &BankEntry) -> Result<Vec<u8>, ImportError> {
        self.read_entry(entry.zip_index)
    }

    fn read_entry(&mut self, zip_index: usize) -> Result<Vec<u8>, ImportError> {
        let mut file = self.archive.by_index(zip_index)?;
        let mut bytes = Vec::with_capacity(file.size() as usize);
        // A corrupt deflate stream surfaces as an io error here
        file.read_to_end(&mut bytes)
            .map_err(|e| ImportError::ArchiveRead(zip::result::ZipError::Io(e)))?;
        Ok(bytes)
    }
}
