pub mod core;
pub mod generator;

pub use self::core::{Corpus, CorpusError};
pub use self::generator::{
    estimate_length, CorpusGenerator, TextMode, TextSource, FALLBACK_SENTENCE,
};

/// A source that always hands out the same prompt. Handy for retries of a
/// known text and for tests.
#[derive(Debug, Clone)]
pub struct FixedText(pub String);

impl TextSource for FixedText {
    fn generate(&self, _mode: TextMode, _length: usize) -> String {
        self.0.clone()
    }
}
