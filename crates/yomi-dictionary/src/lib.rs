//! Yomitan-format dictionary archives: reading, parsing, storing.
//!
//! An archive flows `ArchiveReader` → bank parsers → `YomitanImporter` →
//! `Store`. The store is the only persistent state; search code in the
//! language crates reads it through [`Store`]'s query methods.

pub mod archive;
pub mod bank;
pub mod error;
pub mod loaders;
pub mod store;
pub mod types;

pub use archive::{ArchiveReader, BankEntry, BankRole};
pub use error::{BankError, ImportError, StoreError};
pub use loaders::yomitan::{ImportProgress, YomitanImporter};
pub use store::Store;
pub use types::{
    Definition, DefinitionKind, Dictionary, DictionarySummary, Kanji, KanjiMeta, StoreCounts,
    TagMeta, Term, TermMeta,
};
