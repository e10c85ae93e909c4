use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzer::{Analysis, CharacterState, Mistake};
use crate::corpus::TextMode;
use crate::metrics::{accuracy, net_wpm, wpm};

const PREVIEW_CHARS: usize = 100;

/// Final record of a completed session. Built once, never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub wpm: u32,
    #[serde(rename = "netWPM")]
    pub net_wpm: u32,
    pub accuracy: f64,
    pub mistakes: usize,
    pub total_characters: usize,
    pub correct_characters: usize,
    pub incorrect_characters: usize,
    pub time_elapsed: f64,
    pub time_limit: u32,
    pub text_mode: TextMode,
    pub test_text_preview: String,
    pub timestamp: DateTime<Utc>,
    pub character_states: Vec<CharacterState>,
    pub mistake_details: Vec<Mistake>,
}

impl SessionResult {
    pub fn new(
        target: &[char],
        analysis: Analysis,
        elapsed_secs: f64,
        time_limit: u32,
        text_mode: TextMode,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let gross = wpm(analysis.correct, elapsed_secs);

        Self {
            wpm: gross,
            net_wpm: net_wpm(gross, analysis.mistakes.len(), elapsed_secs),
            accuracy: accuracy(analysis.correct, analysis.total_typed),
            mistakes: analysis.mistakes.len(),
            total_characters: analysis.total_typed,
            correct_characters: analysis.correct,
            incorrect_characters: analysis.incorrect,
            time_elapsed: elapsed_secs,
            time_limit,
            text_mode,
            test_text_preview: preview(target),
            timestamp,
            character_states: analysis.states,
            mistake_details: analysis.mistakes,
        }
    }
}

fn preview(target: &[char]) -> String {
    let mut text: String = target.iter().take(PREVIEW_CHARS).collect();
    if target.len() > PREVIEW_CHARS {
        text.push_str("...");
    }
    text
}

/// A result as handed back by a store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: i64,
    #[serde(flatten)]
    pub result: SessionResult,
}
