pub mod deinflector;
pub mod frequency;
pub mod pitch_accent;
pub mod processor;
pub mod search;

pub use deinflector::{Rule, RuleDeinflector, RuleTableError, parse_rules};
pub use frequency::{Frequency, FrequencyLevel};
pub use pitch_accent::{PatternType, PitchAccent, PitchPattern};
pub use processor::{JapaneseProcessor, ScanResult};
pub use search::{SearchEngine, SearchError, SearchHit};
