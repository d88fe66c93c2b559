use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use yomi_config::Config;
use yomi_core::language::{LanguageProcessor, LookupResult, Token};
use yomi_core::preprocess::{DefaultPreprocessor, Preprocessor};
use yomi_dictionary::{Definition, DefinitionKind, Store, TermMeta};

use crate::deinflector::RuleDeinflector;
use crate::frequency::{FREQUENCY_MODE, Frequency, FrequencyLevel};
use crate::pitch_accent::{PITCH_MODE, PitchAccent};
use crate::search::{SearchEngine, SearchError, SearchHit};

/// Hits for the longest matching prefix of a scanned sentence
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub matched: String,
    /// Length of `matched` in characters
    pub length: usize,
    pub hits: Vec<SearchHit>,
}

/// Japanese language processor
pub struct JapaneseProcessor {
    engine: SearchEngine,
    scan_length: usize,
}

impl JapaneseProcessor {
    pub fn new(store: Arc<Store>, config: &Config) -> Self {
        let deinflector = Arc::new(RuleDeinflector::from_config(&config.deinflect));
        let engine = SearchEngine::new(store, deinflector, &config.search);
        Self::with_engine(engine, config.search.scan_length)
    }

    pub fn with_engine(engine: SearchEngine, scan_length: usize) -> Self {
        Self {
            engine,
            scan_length: scan_length.max(1),
        }
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Find the longest prefix of `text` (up to `scan_length` characters)
    /// that has dictionary hits
    pub fn scan(&self, text: &str) -> Result<Option<ScanResult>, SearchError> {
        let normalized = self.normalize(text);
        let chars: Vec<char> = normalized.chars().collect();

        for length in (1..=chars.len().min(self.scan_length)).rev() {
            let prefix: String = chars[..length].iter().collect();
            let hits = self.engine.search(&prefix)?;
            if !hits.is_empty() {
                return Ok(Some(ScanResult {
                    matched: prefix,
                    length,
                    hits,
                }));
            }
        }

        Ok(None)
    }

    /// Attach display data (definitions, frequency, pitch accent) to hits
    pub fn enrich(&self, hits: &[SearchHit]) -> Result<Vec<LookupResult>, SearchError> {
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let mut expressions: Vec<String> = hits.iter().map(|h| h.term.expression.clone()).collect();
        expressions.sort();
        expressions.dedup();
        let active = self.engine.active_dictionary_ids()?;
        let meta = self.engine.store().find_term_meta(&expressions, Some(active.as_slice()))?;

        Ok(hits.iter().map(|hit| lookup_result(hit, &meta)).collect())
    }
}

fn lookup_result(hit: &SearchHit, meta: &[TermMeta]) -> LookupResult {
    let term = &hit.term;
    let mut metadata = HashMap::new();

    metadata.insert("dictionary".to_string(), hit.dictionary.clone());
    metadata.insert("reading".to_string(), term.reading.clone());
    if !hit.deinflection.is_empty() {
        metadata.insert("deinflection".to_string(), hit.deinflection.join(" < "));
    }
    if !term.tags.is_empty() {
        metadata.insert("tags".to_string(), term.tags.clone());
    }

    let rows = meta.iter().filter(|m| m.expression == term.expression);

    let frequencies: Vec<Frequency> = rows
        .clone()
        .filter(|m| m.mode == FREQUENCY_MODE)
        .filter_map(|m| Frequency::parse(&m.data))
        .filter(|f| f.applies_to(&term.reading))
        .collect();
    if !frequencies.is_empty() {
        let display: Vec<&str> = frequencies.iter().map(|f| f.display.as_str()).collect();
        metadata.insert("frequency".to_string(), display.join(", "));

        let best = frequencies.iter().filter_map(|f| f.rank).filter(|r| *r > 0).min();
        metadata.insert(
            "frequency_level".to_string(),
            FrequencyLevel::from_rank(best).as_str().to_string(),
        );
        let stars = FrequencyLevel::stars(best);
        if stars > 0 {
            metadata.insert("frequency_stars".to_string(), "★".repeat(stars as usize));
        }
    }

    let pitches: Vec<String> = rows
        .filter(|m| m.mode == PITCH_MODE)
        .filter_map(|m| PitchAccent::parse(&m.data))
        .filter(|p| p.reading == term.reading)
        .map(|p| p.notation())
        .collect();
    if !pitches.is_empty() {
        metadata.insert("pitch_accent".to_string(), pitches.join(" "));
    }

    LookupResult {
        term: term.expression.clone(),
        readings: vec![term.reading.clone()],
        definitions: term.definitions.iter().map(definition_text).collect(),
        metadata,
    }
}

/// Plain text of a definition; structured content is flattened to its
/// text nodes.
pub fn definition_text(definition: &Definition) -> String {
    match definition.kind {
        DefinitionKind::Text => definition.content.clone(),
        DefinitionKind::Structured => match serde_json::from_str::<Value>(&definition.content) {
            Ok(value) => {
                let mut out = String::new();
                collect_text(&value, &mut out);
                if out.is_empty() { definition.content.clone() } else { out }
            }
            Err(_) => definition.content.clone(),
        },
    }
}

fn collect_text(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Array(items) => items.iter().for_each(|item| collect_text(item, out)),
        Value::Object(map) => {
            if map.get("tag").and_then(Value::as_str) == Some("br") {
                out.push('\n');
            }
            if let Some(content) = map.get("content") {
                collect_text(content, out);
            }
        }
        _ => {}
    }
}

impl LanguageProcessor for JapaneseProcessor {
    fn language_code(&self) -> &str {
        "ja"
    }

    fn normalize(&self, text: &str) -> String {
        DefaultPreprocessor.process(text)
    }

    fn tokenize(&self, text: &str) -> Vec<Token> {
        let normalized = self.normalize(text);
        let chars: Vec<char> = normalized.chars().collect();

        (1..=chars.len().min(self.scan_length))
            .rev()
            .map(|len| {
                let surface: String = chars[..len].iter().collect();
                Token {
                    surface: surface.clone(),
                    normalized: surface,
                    position: 0,
                }
            })
            .collect()
    }

    fn lookup(&self, token: &Token) -> Vec<LookupResult> {
        let result = self
            .engine
            .search(&token.normalized)
            .and_then(|hits| self.enrich(&hits));

        match result {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Lookup of '{}' failed: {}", token.normalized, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_definitions_flatten_to_text() {
        let def = Definition::structured(
            r#"{"type":"structured-content","content":["to hit",{"tag":"br"},{"tag":"span","content":"to strike"}]}"#,
        );
        assert_eq!(definition_text(&def), "to hit\nto strike");
        assert_eq!(definition_text(&Definition::text("plain")), "plain");
        assert_eq!(definition_text(&Definition::structured("{broken")), "{broken");
    }
}
