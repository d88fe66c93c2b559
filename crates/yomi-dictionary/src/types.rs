use serde::{Deserialize, Serialize};

/// One imported archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    pub id: i64,
    pub title: String,
    pub revision: String,
    pub format: i64,
    /// Whether term sequence numbers are meaningful
    pub sequenced: bool,
    pub enabled: bool,
    pub author: Option<String>,
    pub description: Option<String>,
    pub attribution: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionarySummary {
    pub dictionary: Dictionary,
    pub term_count: u64,
    pub kanji_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Text,
    /// Serialized JSON kept verbatim from the archive
    Structured,
}

/// A gloss owned by its [`Term`]; stored inline, no identity of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: DefinitionKind,
}

impl Definition {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: DefinitionKind::Text,
        }
    }

    pub fn structured(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: DefinitionKind::Structured,
        }
    }
}

/// Encode the embedded definition list the way the `terms.definitions`
/// column stores it.
pub fn encode_definitions(definitions: &[Definition]) -> Result<String, serde_json::Error> {
    serde_json::to_string(definitions)
}

/// Decode a `terms.definitions` column value. Empty text decodes to no
/// definitions.
pub fn decode_definitions(encoded: &str) -> Result<Vec<Definition>, serde_json::Error> {
    if encoded.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(encoded)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    pub id: i64,
    pub dictionary_id: i64,
    pub expression: String,
    pub reading: String,
    /// Space-separated definition tags
    pub tags: String,
    /// Space-separated deinflection rule tags (`v1`, `v5k`, ...)
    pub rules: String,
    pub score: i64,
    pub sequence: i64,
    pub term_tags: String,
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kanji {
    pub id: i64,
    pub dictionary_id: i64,
    pub character: String,
    pub onyomi: String,
    pub kunyomi: String,
    pub tags: String,
    /// Newline-separated
    pub meanings: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermMeta {
    pub id: i64,
    pub dictionary_id: i64,
    pub expression: String,
    pub mode: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KanjiMeta {
    pub id: i64,
    pub dictionary_id: i64,
    pub character: String,
    pub mode: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagMeta {
    pub id: i64,
    pub dictionary_id: i64,
    pub name: String,
    pub category: String,
    pub order: i64,
    pub notes: String,
    pub score: i64,
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub dictionaries: u64,
    pub terms: u64,
    pub kanji: u64,
    pub term_meta: u64,
    pub kanji_meta: u64,
    pub tag_meta: u64,
}
