use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::debug;
use yomi_config::search::SearchConfig;
use yomi_core::language::{Deinflection, Deinflector, RuleClass};
use yomi_core::preprocess::{DefaultPreprocessor, Preprocessor};
use yomi_dictionary::{Store, StoreError, Term};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// A validated, ranked match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub term: Term,
    /// Title of the dictionary the term came from
    pub dictionary: String,
    /// Rules that led from the input to this term, surface side first;
    /// empty when the input matched as written
    pub deinflection: Vec<String>,
}

#[derive(Debug)]
struct ActiveSet {
    ids: Vec<i64>,
    titles: HashMap<i64, String>,
}

/// Turns raw text into ranked dictionary hits.
///
/// The set of enabled dictionaries is cached after the first search; call
/// [`SearchEngine::invalidate_active_dictionaries`] after enabling,
/// disabling, importing or deleting a dictionary.
pub struct SearchEngine {
    store: Arc<Store>,
    deinflector: Arc<dyn Deinflector>,
    active: RwLock<Option<Arc<ActiveSet>>>,
    /// Bumped by every invalidation; a set loaded under an older value is
    /// never cached
    generation: AtomicU64,
    max_results: usize,
}

impl SearchEngine {
    pub fn new(store: Arc<Store>, deinflector: Arc<dyn Deinflector>, config: &SearchConfig) -> Self {
        Self {
            store,
            deinflector,
            active: RwLock::new(None),
            generation: AtomicU64::new(0),
            max_results: config.max_results,
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn deinflector(&self) -> &dyn Deinflector {
        self.deinflector.as_ref()
    }

    pub fn invalidate_active_dictionaries(&self) {
        let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
        self.generation.fetch_add(1, Ordering::AcqRel);
        *active = None;
    }

    pub fn active_dictionary_ids(&self) -> Result<Vec<i64>, SearchError> {
        Ok(self.active_set()?.ids.clone())
    }

    fn active_set(&self) -> Result<Arc<ActiveSet>, SearchError> {
        if let Some(set) = self.active.read().unwrap_or_else(|e| e.into_inner()).as_ref() {
            return Ok(Arc::clone(set));
        }

        let generation = self.generation.load(Ordering::Acquire);
        let set = Arc::new(self.load_active_set()?);
        self.publish(&set, generation);
        Ok(set)
    }

    fn load_active_set(&self) -> Result<ActiveSet, SearchError> {
        let mut ids = Vec::new();
        let mut titles = HashMap::new();
        for dictionary in self.store.dictionaries()?.into_iter().filter(|d| d.enabled) {
            ids.push(dictionary.id);
            titles.insert(dictionary.id, dictionary.title);
        }
        debug!("Active dictionaries: {:?}", ids);

        Ok(ActiveSet { ids, titles })
    }

    /// Cache `set` unless an invalidation happened since `generation` was
    /// read. Returns whether it was cached.
    fn publish(&self, set: &Arc<ActiveSet>, generation: u64) -> bool {
        let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
        if self.generation.load(Ordering::Acquire) != generation {
            debug!("Active dictionaries changed while loading, not caching");
            return false;
        }
        *active = Some(Arc::clone(set));
        true
    }

    /// Look up `text`, trying every form it could be an inflection of.
    ///
    /// Blank input, no enabled dictionaries and no matches all give an
    /// empty list.
    pub fn search(&self, text: &str) -> Result<Vec<SearchHit>, SearchError> {
        let text = DefaultPreprocessor.process(text);
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let active = self.active_set()?;
        if active.ids.is_empty() {
            debug!("No enabled dictionaries, skipping lookup of '{}'", text);
            return Ok(Vec::new());
        }

        let candidates = self.deinflector.deinflect(&text);
        let mut unique = HashSet::new();
        let variants: Vec<String> = candidates
            .iter()
            .filter(|c| unique.insert(c.lemma.as_str()))
            .map(|c| c.lemma.clone())
            .collect();

        let terms = self.store.find_terms_exact(&variants, Some(active.ids.as_slice()))?;
        debug!(
            "'{}': {} candidates, {} variants, {} rows",
            text,
            candidates.len(),
            variants.len(),
            terms.len()
        );

        let mut hits: Vec<SearchHit> = terms
            .into_iter()
            .filter_map(|term| {
                let matched = validate(&term, &candidates)?;
                Some(SearchHit {
                    deinflection: matched.chain.clone(),
                    dictionary: active.titles.get(&term.dictionary_id).cloned().unwrap_or_default(),
                    term,
                })
            })
            .collect();

        rank(&mut hits);
        if self.max_results > 0 {
            hits.truncate(self.max_results);
        }

        Ok(hits)
    }
}

/// The candidate that justifies `term`, if any.
///
/// Terms without rule tags accept any candidate naming them. Otherwise the
/// candidate's class has to overlap the term's tags, or be the wildcard of
/// the unmodified input.
fn validate<'c>(term: &Term, candidates: &'c [Deinflection]) -> Option<&'c Deinflection> {
    let mut naming = candidates
        .iter()
        .filter(|c| c.lemma == term.expression || c.lemma == term.reading);

    let has_rules = term.rules.split([' ', ',']).any(|tag| !tag.trim().is_empty());
    if !has_rules {
        return naming.next();
    }

    let classes = RuleClass::from_term_rules(&term.rules);
    naming.find(|c| c.class.is_wildcard() || c.class.intersects(classes))
}

/// Ascending score with non-positive scores last, then shorter headwords.
/// The sort is stable, so store order breaks remaining ties.
fn rank(hits: &mut [SearchHit]) {
    hits.sort_by_key(|hit| {
        let score = if hit.term.score > 0 { hit.term.score } else { i64::MAX };
        (score, hit.term.expression.chars().count())
    });
}
