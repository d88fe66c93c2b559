use rusqlite::Connection;

use crate::error::StoreError;

/// Bumped whenever the table layout changes
pub const SCHEMA_VERSION: i64 = 1;

pub(crate) fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS dictionaries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            revision TEXT NOT NULL,
            format INTEGER NOT NULL DEFAULT 0,
            sequenced INTEGER NOT NULL DEFAULT 0,
            enabled INTEGER NOT NULL DEFAULT 1,
            author TEXT,
            description TEXT,
            attribution TEXT,
            url TEXT
        );

        -- Definitions are embedded as a JSON list; they have no identity of their own
        CREATE TABLE IF NOT EXISTS terms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dictionary_id INTEGER NOT NULL REFERENCES dictionaries(id) ON DELETE CASCADE,
            expression TEXT NOT NULL,
            reading TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '',
            rules TEXT NOT NULL DEFAULT '',
            score INTEGER NOT NULL DEFAULT 0,
            sequence INTEGER NOT NULL DEFAULT 0,
            term_tags TEXT NOT NULL DEFAULT '',
            definitions TEXT NOT NULL DEFAULT '[]'
        );
        CREATE INDEX IF NOT EXISTS idx_terms_expression ON terms(expression);
        CREATE INDEX IF NOT EXISTS idx_terms_reading ON terms(reading);
        CREATE INDEX IF NOT EXISTS idx_terms_sequence ON terms(sequence);
        CREATE INDEX IF NOT EXISTS idx_terms_dictionary ON terms(dictionary_id);

        CREATE TABLE IF NOT EXISTS kanji (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dictionary_id INTEGER NOT NULL REFERENCES dictionaries(id) ON DELETE CASCADE,
            character TEXT NOT NULL,
            onyomi TEXT NOT NULL DEFAULT '',
            kunyomi TEXT NOT NULL DEFAULT '',
            tags TEXT NOT NULL DEFAULT '',
            meanings TEXT NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS idx_kanji_character ON kanji(character);
        CREATE INDEX IF NOT EXISTS idx_kanji_dictionary ON kanji(dictionary_id);

        -- Meta rows reference headwords by value, not by key
        CREATE TABLE IF NOT EXISTS term_meta (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dictionary_id INTEGER NOT NULL REFERENCES dictionaries(id) ON DELETE CASCADE,
            expression TEXT NOT NULL,
            mode TEXT NOT NULL,
            data TEXT NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS idx_term_meta_expression ON term_meta(expression);
        CREATE INDEX IF NOT EXISTS idx_term_meta_dictionary ON term_meta(dictionary_id);

        CREATE TABLE IF NOT EXISTS kanji_meta (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dictionary_id INTEGER NOT NULL REFERENCES dictionaries(id) ON DELETE CASCADE,
            character TEXT NOT NULL,
            mode TEXT NOT NULL,
            data TEXT NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS idx_kanji_meta_character ON kanji_meta(character);
        CREATE INDEX IF NOT EXISTS idx_kanji_meta_dictionary ON kanji_meta(dictionary_id);

        CREATE TABLE IF NOT EXISTS tag_meta (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dictionary_id INTEGER NOT NULL REFERENCES dictionaries(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT '',
            order_index INTEGER NOT NULL DEFAULT 0,
            notes TEXT NOT NULL DEFAULT '',
            score INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_tag_meta_name ON tag_meta(name);
        CREATE INDEX IF NOT EXISTS idx_tag_meta_dictionary ON tag_meta(dictionary_id);
        "#,
    )?;

    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }

    Ok(())
}
