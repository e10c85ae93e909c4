use include_dir::{include_dir, Dir};
use log::warn;
use serde::Deserialize;
use thiserror::Error;

static CORPUS_DIR: Dir = include_dir!("src/corpus/data");

pub const DEFAULT_CORPUS: &str = "english";

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus file {0} not found")]
    NotFound(String),
    #[error("corpus file {0} is not valid utf-8")]
    Encoding(String),
    #[error("unable to deserialize corpus: {0}")]
    Json(#[from] serde_json::Error),
}

/// Word and sentence lists that prompts are drawn from
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Corpus {
    pub name: String,
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub sentences: Vec<String>,
}

impl Corpus {
    pub fn new(words: Vec<String>, sentences: Vec<String>) -> Self {
        Self {
            name: "custom".to_string(),
            words,
            sentences,
        }
    }

    /// Loads an embedded corpus by name, e.g. `english`
    pub fn load(name: &str) -> Result<Self, CorpusError> {
        let file_name = format!("{name}.json");
        let file = CORPUS_DIR
            .get_file(&file_name)
            .ok_or_else(|| CorpusError::NotFound(file_name.clone()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| CorpusError::Encoding(file_name.clone()))?;

        Ok(serde_json::from_str(contents)?)
    }

    /// The embedded english corpus, or an empty one if it cannot be read.
    /// Generation falls back to a fixed sentence when the lists are empty.
    pub fn english() -> Self {
        Self::load(DEFAULT_CORPUS).unwrap_or_else(|e| {
            warn!("falling back to empty corpus: {e}");
            Self::default()
        })
    }
}
