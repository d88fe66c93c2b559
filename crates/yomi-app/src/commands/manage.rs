use std::fmt::Write;

use anyhow::{Result, bail};

use crate::state::AppState;

pub fn list(state: &AppState) -> Result<String> {
    let summaries = state.store.dictionary_summaries()?;
    if summaries.is_empty() {
        return Ok("No dictionaries imported\n".to_string());
    }

    let mut out = String::new();
    for summary in summaries {
        let dictionary = &summary.dictionary;
        let status = if dictionary.enabled { "" } else { " (disabled)" };
        let _ = writeln!(
            out,
            "{:>4}  {} rev {}: {} terms, {} kanji{}",
            dictionary.id,
            dictionary.title,
            dictionary.revision,
            summary.term_count,
            summary.kanji_count,
            status
        );
    }
    Ok(out)
}

pub fn delete(state: &AppState, id: i64) -> Result<()> {
    if !state.store.delete_dictionary(id)? {
        bail!("No dictionary with id {id}");
    }
    state.processor.engine().invalidate_active_dictionaries();
    tracing::info!("Deleted dictionary {}", id);
    Ok(())
}

pub fn set_enabled(state: &AppState, id: i64, enabled: bool) -> Result<()> {
    if !state.store.set_dictionary_enabled(id, enabled)? {
        bail!("No dictionary with id {id}");
    }
    state.processor.engine().invalidate_active_dictionaries();
    Ok(())
}
