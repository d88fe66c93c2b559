use rusqlite::{Connection, params};

use crate::bank::{IndexRecord, KanjiRecord, MetaRecord, TagRecord, TermRecord};
use crate::error::StoreError;
use crate::types::{Dictionary, encode_definitions};

/// Bulk-insert handle, only reachable inside [`Store::with_import`].
///
/// Rows are written with `INSERT OR REPLACE`: a colliding identity replaces
/// the old row instead of merging into it.
///
/// [`Store::with_import`]: super::Store::with_import
pub struct ImportWriter<'c> {
    conn: &'c Connection,
}

impl<'c> ImportWriter<'c> {
    pub(super) fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn insert_dictionary(&self, index: &IndexRecord) -> Result<Dictionary, StoreError> {
        self.conn.execute(
            "INSERT INTO dictionaries (title, revision, format, sequenced, enabled, author, description, attribution, url)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6, ?7, ?8)",
            params![
                index.title,
                index.revision,
                index.format,
                index.sequenced,
                index.author,
                index.description,
                index.attribution,
                index.url,
            ],
        )?;

        Ok(Dictionary {
            id: self.conn.last_insert_rowid(),
            title: index.title.clone(),
            revision: index.revision.clone(),
            format: index.format,
            sequenced: index.sequenced,
            enabled: true,
            author: index.author.clone(),
            description: index.description.clone(),
            attribution: index.attribution.clone(),
            url: index.url.clone(),
        })
    }

    pub fn insert_terms(&self, dictionary_id: i64, records: &[TermRecord]) -> Result<usize, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT OR REPLACE INTO terms
                (dictionary_id, expression, reading, tags, rules, score, sequence, term_tags, definitions)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for record in records {
            let definitions = encode_definitions(&record.definitions)?;
            stmt.execute(params![
                dictionary_id,
                record.expression,
                record.reading,
                record.tags,
                record.rules,
                record.score,
                record.sequence,
                record.term_tags,
                definitions,
            ])?;
        }
        Ok(records.len())
    }

    pub fn insert_kanji(&self, dictionary_id: i64, records: &[KanjiRecord]) -> Result<usize, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT OR REPLACE INTO kanji (dictionary_id, character, onyomi, kunyomi, tags, meanings)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for record in records {
            stmt.execute(params![
                dictionary_id,
                record.character,
                record.onyomi,
                record.kunyomi,
                record.tags,
                record.meanings.join("\n"),
            ])?;
        }
        Ok(records.len())
    }

    pub fn insert_term_meta(&self, dictionary_id: i64, records: &[MetaRecord]) -> Result<usize, StoreError> {
        self.insert_meta(
            "INSERT OR REPLACE INTO term_meta (dictionary_id, expression, mode, data) VALUES (?1, ?2, ?3, ?4)",
            dictionary_id,
            records,
        )
    }

    pub fn insert_kanji_meta(&self, dictionary_id: i64, records: &[MetaRecord]) -> Result<usize, StoreError> {
        self.insert_meta(
            "INSERT OR REPLACE INTO kanji_meta (dictionary_id, character, mode, data) VALUES (?1, ?2, ?3, ?4)",
            dictionary_id,
            records,
        )
    }

    fn insert_meta(&self, sql: &str, dictionary_id: i64, records: &[MetaRecord]) -> Result<usize, StoreError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        for record in records {
            stmt.execute(params![dictionary_id, record.key, record.mode, record.data])?;
        }
        Ok(records.len())
    }

    pub fn insert_tag_meta(&self, dictionary_id: i64, records: &[TagRecord]) -> Result<usize, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT OR REPLACE INTO tag_meta (dictionary_id, name, category, order_index, notes, score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for record in records {
            stmt.execute(params![
                dictionary_id,
                record.name,
                record.category,
                record.order,
                record.notes,
                record.score,
            ])?;
        }
        Ok(records.len())
    }
}
