use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use tracing::debug;

use super::Store;
use crate::error::StoreError;
use crate::types::{
    Dictionary, DictionarySummary, Kanji, KanjiMeta, StoreCounts, TagMeta, Term, TermMeta,
    decode_definitions,
};

const DICTIONARY_COLUMNS: &str =
    "id, title, revision, format, sequenced, enabled, author, description, attribution, url";

const TERM_COLUMNS: &str =
    "id, dictionary_id, expression, reading, tags, rules, score, sequence, term_tags, definitions";

fn dictionary_from_row(row: &Row<'_>) -> rusqlite::Result<Dictionary> {
    Ok(Dictionary {
        id: row.get(0)?,
        title: row.get(1)?,
        revision: row.get(2)?,
        format: row.get(3)?,
        sequenced: row.get(4)?,
        enabled: row.get(5)?,
        author: row.get(6)?,
        description: row.get(7)?,
        attribution: row.get(8)?,
        url: row.get(9)?,
    })
}

fn term_from_row(row: &Row<'_>) -> rusqlite::Result<Term> {
    let encoded: String = row.get(9)?;
    let definitions = decode_definitions(&encoded)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

    Ok(Term {
        id: row.get(0)?,
        dictionary_id: row.get(1)?,
        expression: row.get(2)?,
        reading: row.get(3)?,
        tags: row.get(4)?,
        rules: row.get(5)?,
        score: row.get(6)?,
        sequence: row.get(7)?,
        term_tags: row.get(8)?,
        definitions,
    })
}

fn kanji_from_row(row: &Row<'_>) -> rusqlite::Result<Kanji> {
    Ok(Kanji {
        id: row.get(0)?,
        dictionary_id: row.get(1)?,
        character: row.get(2)?,
        onyomi: row.get(3)?,
        kunyomi: row.get(4)?,
        tags: row.get(5)?,
        meanings: row.get(6)?,
    })
}

fn term_meta_from_row(row: &Row<'_>) -> rusqlite::Result<TermMeta> {
    Ok(TermMeta {
        id: row.get(0)?,
        dictionary_id: row.get(1)?,
        expression: row.get(2)?,
        mode: row.get(3)?,
        data: row.get(4)?,
    })
}

fn kanji_meta_from_row(row: &Row<'_>) -> rusqlite::Result<KanjiMeta> {
    Ok(KanjiMeta {
        id: row.get(0)?,
        dictionary_id: row.get(1)?,
        character: row.get(2)?,
        mode: row.get(3)?,
        data: row.get(4)?,
    })
}

fn tag_meta_from_row(row: &Row<'_>) -> rusqlite::Result<TagMeta> {
    Ok(TagMeta {
        id: row.get(0)?,
        dictionary_id: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        order: row.get(4)?,
        notes: row.get(5)?,
        score: row.get(6)?,
    })
}

fn count(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let n: i64 = row.get(idx)?;
    Ok(n.max(0) as u64)
}

/// `?start, ?start+1, ...` for an `IN (...)` list
fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn text_values(values: &[String]) -> impl Iterator<Item = Value> + '_ {
    values.iter().map(|v| Value::Text(v.clone()))
}

fn int_values(values: &[i64]) -> impl Iterator<Item = Value> + '_ {
    values.iter().map(|v| Value::Integer(*v))
}

fn query_rows<T>(
    conn: &Connection,
    sql: &str,
    values: Vec<Value>,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params_from_iter(values), map)?;
    rows.collect()
}

impl Store {
    fn read<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> Result<T, StoreError> {
        let conn = self.lock_reader()?;
        Ok(f(&conn)?)
    }

    pub fn dictionary(&self, id: i64) -> Result<Option<Dictionary>, StoreError> {
        self.read(|conn| {
            conn.prepare_cached(&format!("SELECT {DICTIONARY_COLUMNS} FROM dictionaries WHERE id = ?1"))?
                .query_row(params![id], dictionary_from_row)
                .optional()
        })
    }

    pub fn dictionaries(&self) -> Result<Vec<Dictionary>, StoreError> {
        self.read(|conn| {
            query_rows(
                conn,
                &format!("SELECT {DICTIONARY_COLUMNS} FROM dictionaries ORDER BY id"),
                Vec::new(),
                dictionary_from_row,
            )
        })
    }

    /// Every dictionary with its term and kanji counts
    pub fn dictionary_summaries(&self) -> Result<Vec<DictionarySummary>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT d.id, d.title, d.revision, d.format, d.sequenced, d.enabled,
                        d.author, d.description, d.attribution, d.url,
                        (SELECT COUNT(*) FROM terms t WHERE t.dictionary_id = d.id),
                        (SELECT COUNT(*) FROM kanji k WHERE k.dictionary_id = d.id)
                 FROM dictionaries d ORDER BY d.id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(DictionarySummary {
                    dictionary: dictionary_from_row(row)?,
                    term_count: count(row, 10)?,
                    kanji_count: count(row, 11)?,
                })
            })?;
            rows.collect()
        })
    }

    pub fn active_dictionary_ids(&self) -> Result<Vec<i64>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare_cached("SELECT id FROM dictionaries WHERE enabled = 1 ORDER BY id")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect()
        })
    }

    pub fn counts(&self) -> Result<StoreCounts, StoreError> {
        self.read(|conn| {
            conn.query_row(
                "SELECT (SELECT COUNT(*) FROM dictionaries), (SELECT COUNT(*) FROM terms),
                        (SELECT COUNT(*) FROM kanji), (SELECT COUNT(*) FROM term_meta),
                        (SELECT COUNT(*) FROM kanji_meta), (SELECT COUNT(*) FROM tag_meta)",
                [],
                |row| {
                    Ok(StoreCounts {
                        dictionaries: count(row, 0)?,
                        terms: count(row, 1)?,
                        kanji: count(row, 2)?,
                        term_meta: count(row, 3)?,
                        kanji_meta: count(row, 4)?,
                        tag_meta: count(row, 5)?,
                    })
                },
            )
        })
    }

    pub fn term(&self, id: i64) -> Result<Option<Term>, StoreError> {
        self.read(|conn| {
            conn.prepare_cached(&format!("SELECT {TERM_COLUMNS} FROM terms WHERE id = ?1"))?
                .query_row(params![id], term_from_row)
                .optional()
        })
    }

    /// Terms whose expression or reading equals any variant.
    ///
    /// `dictionary_ids` restricts the result to those dictionaries; an
    /// empty filter matches nothing.
    pub fn find_terms_exact(
        &self,
        variants: &[String],
        dictionary_ids: Option<&[i64]>,
    ) -> Result<Vec<Term>, StoreError> {
        if variants.is_empty() || dictionary_ids.is_some_and(|ids| ids.is_empty()) {
            return Ok(Vec::new());
        }

        let keys = placeholders(1, variants.len());
        let mut sql = format!("SELECT {TERM_COLUMNS} FROM terms WHERE (expression IN ({keys}) OR reading IN ({keys}))");
        let mut values: Vec<Value> = text_values(variants).collect();

        if let Some(ids) = dictionary_ids {
            sql.push_str(&format!(
                " AND dictionary_id IN ({})",
                placeholders(values.len() + 1, ids.len())
            ));
            values.extend(int_values(ids));
        }
        sql.push_str(" ORDER BY id");

        debug!("Exact term lookup for {} variants", variants.len());
        self.read(|conn| query_rows(conn, &sql, values, term_from_row))
    }

    pub fn find_term_exact(&self, expression: &str, reading: &str) -> Result<Vec<Term>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {TERM_COLUMNS} FROM terms WHERE expression = ?1 AND reading = ?2 ORDER BY id"
            ))?;
            let rows = stmt.query_map(params![expression, reading], term_from_row)?;
            rows.collect()
        })
    }

    /// Terms whose expression or reading starts with `prefix`.
    /// Comparison is exact: case matters and `%`/`_` are plain characters.
    pub fn find_terms_by_prefix(&self, prefix: &str) -> Result<Vec<Term>, StoreError> {
        self.find_terms_affix(
            "substr(expression, 1, length(?1)) = ?1 OR substr(reading, 1, length(?1)) = ?1",
            prefix,
        )
    }

    /// Terms whose expression or reading ends with `suffix`
    pub fn find_terms_by_suffix(&self, suffix: &str) -> Result<Vec<Term>, StoreError> {
        self.find_terms_affix(
            "(length(expression) >= length(?1) AND substr(expression, length(expression) - length(?1) + 1) = ?1)
             OR (length(reading) >= length(?1) AND substr(reading, length(reading) - length(?1) + 1) = ?1)",
            suffix,
        )
    }

    fn find_terms_affix(&self, condition: &str, needle: &str) -> Result<Vec<Term>, StoreError> {
        self.read(|conn| {
            let mut stmt =
                conn.prepare_cached(&format!("SELECT {TERM_COLUMNS} FROM terms WHERE {condition} ORDER BY id"))?;
            let rows = stmt.query_map(params![needle], term_from_row)?;
            rows.collect()
        })
    }

    pub fn find_terms_by_sequence(&self, sequences: &[i64]) -> Result<Vec<Term>, StoreError> {
        if sequences.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {TERM_COLUMNS} FROM terms WHERE sequence IN ({}) ORDER BY id",
            placeholders(1, sequences.len())
        );
        self.read(|conn| query_rows(conn, &sql, int_values(sequences).collect(), term_from_row))
    }

    pub fn terms_in_dictionaries(&self, dictionary_ids: &[i64]) -> Result<Vec<Term>, StoreError> {
        if dictionary_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {TERM_COLUMNS} FROM terms WHERE dictionary_id IN ({}) ORDER BY id",
            placeholders(1, dictionary_ids.len())
        );
        self.read(|conn| query_rows(conn, &sql, int_values(dictionary_ids).collect(), term_from_row))
    }

    pub fn find_kanji(&self, characters: &[String]) -> Result<Vec<Kanji>, StoreError> {
        if characters.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, dictionary_id, character, onyomi, kunyomi, tags, meanings
             FROM kanji WHERE character IN ({}) ORDER BY id",
            placeholders(1, characters.len())
        );
        self.read(|conn| query_rows(conn, &sql, text_values(characters).collect(), kanji_from_row))
    }

    /// Meta rows keyed by any of `expressions`, optionally limited to some
    /// dictionaries
    pub fn find_term_meta(
        &self,
        expressions: &[String],
        dictionary_ids: Option<&[i64]>,
    ) -> Result<Vec<TermMeta>, StoreError> {
        if expressions.is_empty() || dictionary_ids.is_some_and(|ids| ids.is_empty()) {
            return Ok(Vec::new());
        }

        let mut sql = format!(
            "SELECT id, dictionary_id, expression, mode, data FROM term_meta WHERE expression IN ({})",
            placeholders(1, expressions.len())
        );
        let mut values: Vec<Value> = text_values(expressions).collect();
        if let Some(ids) = dictionary_ids {
            sql.push_str(&format!(
                " AND dictionary_id IN ({})",
                placeholders(values.len() + 1, ids.len())
            ));
            values.extend(int_values(ids));
        }
        sql.push_str(" ORDER BY id");

        self.read(|conn| query_rows(conn, &sql, values, term_meta_from_row))
    }

    pub fn find_kanji_meta(&self, characters: &[String]) -> Result<Vec<KanjiMeta>, StoreError> {
        if characters.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, dictionary_id, character, mode, data FROM kanji_meta WHERE character IN ({}) ORDER BY id",
            placeholders(1, characters.len())
        );
        self.read(|conn| query_rows(conn, &sql, text_values(characters).collect(), kanji_meta_from_row))
    }

    /// Tag display metadata as declared by the dictionary titled `dictionary_title`
    pub fn find_tag(&self, name: &str, dictionary_title: &str) -> Result<Option<TagMeta>, StoreError> {
        self.read(|conn| {
            conn.prepare_cached(
                "SELECT t.id, t.dictionary_id, t.name, t.category, t.order_index, t.notes, t.score
                 FROM tag_meta t JOIN dictionaries d ON d.id = t.dictionary_id
                 WHERE t.name = ?1 AND d.title = ?2
                 ORDER BY t.id LIMIT 1",
            )?
            .query_row(params![name, dictionary_title], tag_meta_from_row)
            .optional()
        })
    }
}
