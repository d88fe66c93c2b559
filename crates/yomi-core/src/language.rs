use std::collections::HashMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Text processing and lookup interface for language implementations
pub trait LanguageProcessor: Send + Sync {
    /// Language identifier (ISO 639-1 code: "ja", "zh", "ko", etc.)
    fn language_code(&self) -> &str;

    /// Normalize text (Unicode normalization, whitespace, etc.)
    fn normalize(&self, text: &str) -> String;

    /// Break text into lookup candidates, longest first
    fn tokenize(&self, text: &str) -> Vec<Token>;

    /// Look up a token in the active dictionaries
    fn lookup(&self, token: &Token) -> Vec<LookupResult>;
}

/// Expands an inflected surface form into candidate dictionary forms.
///
/// Implementations must be pure: the output depends only on the input and
/// the rule data the implementation was built with.
pub trait Deinflector: Send + Sync {
    fn deinflect(&self, surface: &str) -> Vec<Deinflection>;
}

/// Conjugation classes a word form can belong to, as a bitmask.
///
/// The low five bits line up with the rule tags dictionaries put on terms
/// (`v1`, `v5*`, `adj-i`, `vk`, `vs*`). `TE`, `MASU` and `INITIAL` only
/// exist inside rule chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RuleClass(u16);

impl RuleClass {
    pub const NONE: Self = Self(0);
    pub const ICHIDAN: Self = Self(1);
    pub const GODAN: Self = Self(1 << 1);
    pub const ADJ_I: Self = Self(1 << 2);
    pub const KURU: Self = Self(1 << 3);
    pub const SURU: Self = Self(1 << 4);
    pub const TE: Self = Self(1 << 5);
    pub const MASU: Self = Self(1 << 6);
    pub const INITIAL: Self = Self(1 << 7);
    /// Carried by the raw surface form; compatible with every term.
    pub const WILDCARD: Self = Self(0xFF);

    const NAMES: [(&'static str, RuleClass); 8] = [
        ("v1", Self::ICHIDAN),
        ("v5", Self::GODAN),
        ("adj-i", Self::ADJ_I),
        ("vk", Self::KURU),
        ("vs", Self::SURU),
        ("te", Self::TE),
        ("masu", Self::MASU),
        ("initial", Self::INITIAL),
    ];

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_wildcard(self) -> bool {
        self.0 & Self::WILDCARD.0 == Self::WILDCARD.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Parse a single class name as written in rule tables (`v1`, `te`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, class)| *class)
    }

    /// Classes declared by a term's space- or comma-separated rule string.
    ///
    /// Unknown tags contribute nothing; a blank string yields `NONE`.
    pub fn from_term_rules(rules: &str) -> Self {
        rules
            .split([' ', ','])
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .fold(Self::NONE, |acc, tag| {
                acc | match tag.as_str() {
                    "v1" => Self::ICHIDAN,
                    "adj-i" => Self::ADJ_I,
                    "vk" => Self::KURU,
                    t if t.starts_with("v5") => Self::GODAN,
                    t if t.starts_with("vs") => Self::SURU,
                    _ => Self::NONE,
                }
            })
    }
}

impl BitOr for RuleClass {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RuleClass {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for RuleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wildcard() {
            return f.write_str("*");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(_, class)| self.intersects(*class))
            .map(|(name, _)| *name)
            .collect();
        f.write_str(&names.join("|"))
    }
}

/// One candidate produced by a [`Deinflector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deinflection {
    /// Candidate dictionary form
    pub lemma: String,
    /// Class the candidate must belong to
    pub class: RuleClass,
    /// Reasons of the applied rules, surface side first
    pub chain: Vec<String>,
}

impl Deinflection {
    /// The surface itself, no inflection assumed
    pub fn identity(surface: &str) -> Self {
        Self {
            lemma: surface.to_string(),
            class: RuleClass::WILDCARD,
            chain: Vec::new(),
        }
    }

    pub fn describe(&self) -> String {
        self.chain.join(" < ")
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub surface: String,
    pub normalized: String,
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct LookupResult {
    pub term: String,
    pub readings: Vec<String>,
    pub definitions: Vec<String>,
    pub metadata: HashMap<String, String>,
}
