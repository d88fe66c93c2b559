use std::collections::{HashSet, VecDeque};
use std::path::Path;

use yomi_config::deinflect::DeinflectConfig;
use yomi_core::language::{Deinflection, Deinflector, RuleClass};

/// Rule table shipped with the crate
pub const DEFAULT_RULES: &str = include_str!("../data/deinflect.tsv");

#[derive(Debug, thiserror::Error)]
pub enum RuleTableError {
    #[error("line {line}: expected 5 tab-separated fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: unknown rule class '{name}'")]
    UnknownClass { line: usize, name: String },

    #[error("line {line}: {column} classes are empty")]
    NoClasses { line: usize, column: &'static str },

    #[error("line {line}: input suffix is empty")]
    EmptyInput { line: usize },

    #[error("Failed to read rule table {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// One suffix rewrite: a form ending in `input` whose class intersects
/// `source` may be rewritten to end in `output`, gaining class `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub input: String,
    pub output: String,
    pub source: RuleClass,
    pub target: RuleClass,
    pub reason: String,
}

fn parse_classes(field: &str, line: usize, column: &'static str) -> Result<RuleClass, RuleTableError> {
    let mut class = RuleClass::NONE;
    for name in field.split('|').map(str::trim).filter(|n| !n.is_empty()) {
        class |= RuleClass::from_name(name).ok_or_else(|| RuleTableError::UnknownClass {
            line,
            name: name.to_string(),
        })?;
    }
    if class.is_empty() {
        return Err(RuleTableError::NoClasses { line, column });
    }
    Ok(class)
}

/// Parse a tab-separated rule table.
///
/// Blank lines and lines starting with `#` are ignored. Line numbers in
/// errors are 1-based.
pub fn parse_rules(text: &str) -> Result<Vec<Rule>, RuleTableError> {
    let mut rules = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let raw = raw.trim_end_matches('\r');
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = raw.split('\t').collect();
        let &[input, output, source, target, reason] = fields.as_slice() else {
            return Err(RuleTableError::FieldCount {
                line,
                found: fields.len(),
            });
        };

        let input = input.trim();
        if input.is_empty() {
            return Err(RuleTableError::EmptyInput { line });
        }

        rules.push(Rule {
            input: input.to_string(),
            output: output.trim().to_string(),
            source: parse_classes(source, line, "source")?,
            target: parse_classes(target, line, "target")?,
            reason: reason.trim().to_string(),
        });
    }

    Ok(rules)
}

/// Table-driven deinflector.
///
/// Starting from the surface form, rules are applied breadth first, each
/// step only where the rule's source class matches the class the previous
/// step produced. The search is bounded by `max_depth` and by remembering
/// every (lemma, class) pair already reached.
pub struct RuleDeinflector {
    rules: Vec<Rule>,
    max_depth: usize,
}

impl RuleDeinflector {
    pub fn new(mut rules: Vec<Rule>, max_depth: usize) -> Self {
        // Longest suffix first; ties keep table order
        rules.sort_by_key(|r| std::cmp::Reverse(r.input.chars().count()));
        Self { rules, max_depth }
    }

    /// No rules at all: every surface only deinflects to itself
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    pub fn embedded(max_depth: usize) -> Result<Self, RuleTableError> {
        Ok(Self::new(parse_rules(DEFAULT_RULES)?, max_depth))
    }

    pub fn from_file(path: &Path, max_depth: usize) -> Result<Self, RuleTableError> {
        let text = std::fs::read_to_string(path).map_err(|source| RuleTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(parse_rules(&text)?, max_depth))
    }

    /// Build from config, degrading to the embedded table and then to no
    /// rules instead of failing.
    pub fn from_config(config: &DeinflectConfig) -> Self {
        if let Some(path) = &config.rules_path {
            match Self::from_file(path, config.max_depth) {
                Ok(deinflector) => {
                    tracing::info!(
                        "Loaded {} deinflection rules from {}",
                        deinflector.rules.len(),
                        path.display()
                    );
                    return deinflector;
                }
                Err(e) => tracing::warn!("{}, falling back to the embedded rule table", e),
            }
        }

        match Self::embedded(config.max_depth) {
            Ok(deinflector) => deinflector,
            Err(e) => {
                tracing::error!("Embedded rule table is invalid: {}", e);
                tracing::warn!("Deinflection disabled, only exact forms will match");
                Self::empty()
            }
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl Deinflector for RuleDeinflector {
    fn deinflect(&self, surface: &str) -> Vec<Deinflection> {
        let mut results = vec![Deinflection::identity(surface)];
        let mut seen: HashSet<(String, RuleClass)> = HashSet::new();
        seen.insert((surface.to_string(), RuleClass::WILDCARD));

        // Indices into `results` still to expand, with their chain length
        let mut queue: VecDeque<(usize, usize)> = VecDeque::from([(0, 0)]);

        while let Some((idx, depth)) = queue.pop_front() {
            if depth >= self.max_depth {
                continue;
            }

            for rule in &self.rules {
                let current = &results[idx];
                if !current.class.intersects(rule.source) {
                    continue;
                }
                let Some(stem) = current.lemma.strip_suffix(rule.input.as_str()) else {
                    continue;
                };

                let lemma = format!("{}{}", stem, rule.output);
                if lemma.is_empty() || !seen.insert((lemma.clone(), rule.target)) {
                    continue;
                }

                let mut chain = current.chain.clone();
                chain.push(rule.reason.clone());
                results.push(Deinflection {
                    lemma,
                    class: rule.target,
                    chain,
                });
                queue.push_back((results.len() - 1, depth + 1));
            }
        }

        results
    }
}
