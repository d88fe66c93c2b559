pub mod language;
pub mod preprocess;

pub use language::{Deinflection, Deinflector, LanguageProcessor, LookupResult, RuleClass, Token};
pub use preprocess::{DefaultPreprocessor, Preprocessor};
