use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor {
    // Default JP preprocessor, tuned for OCR and clipboard input
    fn process(&self, text: &str) -> String {
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        // Half-width katakana and full-width ASCII fold here
        let text: String = text.nfkc().collect();

        text.chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}
