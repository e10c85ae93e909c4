use clap::ValueEnum;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use super::core::Corpus;

/// Used whenever the corpus cannot supply anything
pub const FALLBACK_SENTENCE: &str = "The quick brown fox jumps over the lazy dog.";

/// Typing speed the duration estimate assumes
const BASELINE_WPM: f64 = 40.0;
/// Head room so fast typists don't run out of text
const LENGTH_BUFFER: f64 = 1.5;
const CHARS_PER_WORD: usize = 5;
/// How far past the target a sentence prompt may run
const SENTENCE_OVERSHOOT: usize = 50;
const MIN_WORD_BATCH: usize = 5;
const MAX_WORD_BATCH: usize = 14;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TextMode {
    #[default]
    Words,
    Sentences,
    Mixed,
}

/// Supplies the prompt for a session
pub trait TextSource {
    /// `length` is a word count in `Words` mode and a character count otherwise
    fn generate(&self, mode: TextMode, length: usize) -> String;

    fn generate_for_duration(&self, secs: u32, mode: TextMode) -> String {
        self.generate(mode, estimate_length(secs, mode))
    }
}

/// Words (or characters, for sentence based modes) a baseline typist needs
/// to keep busy for `secs`
pub fn estimate_length(secs: u32, mode: TextMode) -> usize {
    let words = (BASELINE_WPM * (secs as f64 / 60.0) * LENGTH_BUFFER).ceil() as usize;
    let words = words.max(1);
    match mode {
        TextMode::Words => words,
        TextMode::Sentences | TextMode::Mixed => words * CHARS_PER_WORD,
    }
}

/// Draws prompts at random from a corpus
#[derive(Debug, Clone)]
pub struct CorpusGenerator {
    corpus: Corpus,
}

impl CorpusGenerator {
    pub fn new(corpus: Corpus) -> Self {
        Self { corpus }
    }

    fn random_words<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<&str> {
        (0..count)
            .filter_map(|_| self.corpus.words.choose(rng).map(String::as_str))
            .collect()
    }

    fn words(&self, count: usize) -> String {
        let mut rng = rand::thread_rng();
        self.random_words(&mut rng, count).join(" ")
    }

    fn sentences(&self, target_len: usize) -> String {
        let mut rng = rand::thread_rng();
        let mut pool: Vec<&String> = self.corpus.sentences.iter().collect();
        pool.shuffle(&mut rng);

        let mut picked: Vec<&str> = Vec::new();
        let mut len = 0;
        for sentence in pool {
            if len >= target_len {
                break;
            }
            let sentence_len = sentence.chars().count();
            let next_len = if picked.is_empty() {
                sentence_len
            } else {
                len + 1 + sentence_len
            };
            if next_len > target_len + SENTENCE_OVERSHOOT && !picked.is_empty() {
                break;
            }
            picked.push(sentence);
            len = next_len;
        }

        picked.join(" ")
    }

    fn mixed(&self, target_len: usize) -> String {
        let mut rng = rand::thread_rng();
        let mut pieces: Vec<String> = Vec::new();
        let mut len = 0;
        let mut words_next = true;

        while len <= target_len {
            let piece = if words_next {
                let count = rng.gen_range(MIN_WORD_BATCH..=MAX_WORD_BATCH);
                self.random_words(&mut rng, count).join(" ")
            } else {
                self.corpus
                    .sentences
                    .choose(&mut rng)
                    .cloned()
                    .unwrap_or_default()
            };
            words_next = !words_next;

            if piece.is_empty() {
                // nothing can ever be drawn
                if self.corpus.words.is_empty() && self.corpus.sentences.is_empty() {
                    break;
                }
                continue;
            }
            len += piece.chars().count() + usize::from(!pieces.is_empty());
            pieces.push(piece);
        }

        truncate_at_word(&pieces.join(" "), target_len)
    }
}

impl Default for CorpusGenerator {
    fn default() -> Self {
        Self::new(Corpus::english())
    }
}

impl TextSource for CorpusGenerator {
    fn generate(&self, mode: TextMode, length: usize) -> String {
        let text = match mode {
            TextMode::Words => self.words(length),
            TextMode::Sentences => self.sentences(length),
            TextMode::Mixed => self.mixed(length),
        };

        if text.trim().is_empty() {
            FALLBACK_SENTENCE.to_string()
        } else {
            text
        }
    }
}

/// Cuts `text` right before the first space at or after char `limit`
pub fn truncate_at_word(text: &str, limit: usize) -> String {
    text.char_indices()
        .skip(limit)
        .find(|&(_, c)| c == ' ')
        .map(|(byte_idx, _)| text[..byte_idx].to_string())
        .unwrap_or_else(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_corpus() -> Corpus {
        Corpus::new(
            vec!["alpha".into(), "beta".into(), "gamma".into()],
            vec![
                "One short line.".into(),
                "Another short line.".into(),
                "A third line of text.".into(),
            ],
        )
    }

    #[test]
    fn test_words_mode_token_count() {
        let corpus = tiny_corpus();
        let generator = CorpusGenerator::new(corpus.clone());
        let text = generator.generate(TextMode::Words, 5);
        let tokens: Vec<&str> = text.split(' ').collect();

        assert_eq!(tokens.len(), 5);
        assert!(tokens.iter().all(|t| corpus.words.iter().any(|w| w == t)));
    }

    #[test]
    fn test_sentences_are_distinct_and_reach_target() {
        let corpus = tiny_corpus();
        let generator = CorpusGenerator::new(corpus.clone());
        let text = generator.generate(TextMode::Sentences, 30);

        assert!(text.chars().count() >= 30);
        assert!(text.chars().count() <= 30 + SENTENCE_OVERSHOOT);
        for sentence in &corpus.sentences {
            assert!(text.matches(sentence.as_str()).count() <= 1);
        }
    }

    #[test]
    fn test_sentences_always_returns_one() {
        let long = "x".repeat(200);
        let generator = CorpusGenerator::new(Corpus::new(vec![], vec![long.clone()]));

        assert_eq!(generator.generate(TextMode::Sentences, 10), long);
    }

    #[test]
    fn test_mixed_never_splits_words() {
        let generator = CorpusGenerator::new(Corpus::english());
        let text = generator.generate(TextMode::Mixed, 120);

        assert!(text.chars().count() >= 120);
        assert!(!text.ends_with(' '));
        // anything past the limit is the tail of one word
        let tail: String = text.chars().skip(120).collect();
        assert!(!tail.contains(' '));
    }

    #[test]
    fn test_mixed_includes_sentences() {
        let generator = CorpusGenerator::new(tiny_corpus());
        let text = generator.generate(TextMode::Mixed, 120);

        // the word list never contains "line", every sentence does
        assert!(text.contains("line"));
        let first = text.split(' ').next().unwrap();
        assert!(["alpha", "beta", "gamma"].contains(&first));
    }

    #[test]
    fn test_generate_for_duration_sentences() {
        let corpus = tiny_corpus();
        let generator = CorpusGenerator::new(corpus.clone());

        // 10s estimates 50 chars, which takes all three sentences
        let text = generator.generate_for_duration(10, TextMode::Sentences);

        assert_eq!(text.chars().count(), 57);
        for sentence in &corpus.sentences {
            assert_eq!(text.matches(sentence.as_str()).count(), 1);
        }
    }

    #[test]
    fn test_empty_corpus_falls_back() {
        let generator = CorpusGenerator::new(Corpus::default());

        for mode in [TextMode::Words, TextMode::Sentences, TextMode::Mixed] {
            assert_eq!(generator.generate(mode, 10), FALLBACK_SENTENCE);
        }
    }

    #[test]
    fn test_estimate_length() {
        // 40 wpm for 30s with a 1.5x buffer is 30 words
        assert_eq!(estimate_length(30, TextMode::Words), 30);
        assert_eq!(estimate_length(30, TextMode::Sentences), 150);
        assert_eq!(estimate_length(0, TextMode::Words), 1);
        assert_eq!(estimate_length(15, TextMode::Mixed), 75);
    }

    #[test]
    fn test_generate_for_duration_words() {
        let generator = CorpusGenerator::new(tiny_corpus());
        let text = generator.generate_for_duration(60, TextMode::Words);
        assert_eq!(text.split(' ').count(), 60);
    }

    #[test]
    fn test_truncate_at_word() {
        assert_eq!(truncate_at_word("hello brave new world", 7), "hello brave");
        assert_eq!(truncate_at_word("hello brave new world", 5), "hello");
        assert_eq!(truncate_at_word("hello", 2), "hello");
    }

    #[test]
    fn test_text_mode_display() {
        assert_eq!(TextMode::Words.to_string(), "words");
        assert_eq!(TextMode::Mixed.to_string(), "mixed");
    }
}
