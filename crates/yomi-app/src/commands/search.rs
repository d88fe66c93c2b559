use std::fmt::Write;

use anyhow::Result;
use yomi_core::language::{LanguageProcessor, LookupResult};

use crate::state::AppState;

pub fn search(state: &AppState, text: &str) -> Result<String> {
    let processor = &state.processor;
    let hits = processor.engine().search(text)?;
    if hits.is_empty() {
        return Ok(format!("No results for '{}'\n", processor.normalize(text)));
    }

    Ok(render(&processor.enrich(&hits)?))
}

pub fn scan(state: &AppState, text: &str) -> Result<String> {
    let processor = &state.processor;
    let Some(scan) = processor.scan(text)? else {
        return Ok(format!("No word found at the start of '{}'\n", processor.normalize(text)));
    };

    let mut out = format!("Matched '{}' ({} characters)\n", scan.matched, scan.length);
    out.push_str(&render(&processor.enrich(&scan.hits)?));
    Ok(out)
}

/// One line per candidate: lemma, required class, rule chain
pub fn deinflect(state: &AppState, text: &str) -> String {
    let processor = &state.processor;
    let normalized = processor.normalize(text);

    let mut out = String::new();
    for candidate in processor.engine().deinflector().deinflect(&normalized) {
        let chain = if candidate.chain.is_empty() {
            "(as written)".to_string()
        } else {
            candidate.describe()
        };
        let _ = writeln!(out, "{}\t{}\t{}", candidate.lemma, candidate.class, chain);
    }
    out
}

/// Plain-text rendering of enriched results, one block per term
pub fn render(results: &[LookupResult]) -> String {
    let mut out = String::new();

    for result in results {
        let mut header = result.term.clone();
        let readings = result.readings.join(", ");
        if !readings.is_empty() && readings != result.term {
            let _ = write!(header, " 【{readings}】");
        }
        if let Some(dictionary) = result.metadata.get("dictionary") {
            let _ = write!(header, " [{dictionary}]");
        }
        if let Some(pitch) = result.metadata.get("pitch_accent") {
            let _ = write!(header, " {pitch}");
        }
        if let Some(stars) = result.metadata.get("frequency_stars") {
            let _ = write!(header, " {stars}");
        }
        let _ = writeln!(out, "{header}");

        if let Some(chain) = result.metadata.get("deinflection") {
            let _ = writeln!(out, "  ({chain})");
        }
        if let Some(frequency) = result.metadata.get("frequency") {
            let _ = writeln!(out, "  frequency: {frequency}");
        }
        for (i, definition) in result.definitions.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, definition.replace('\n', "\n     "));
        }
    }

    out
}
