use serde::{Deserialize, Serialize};

use crate::analyzer::analyze;
use crate::util::round_to;

/// Average word length used to turn characters into words
pub const CHARS_PER_WORD: f64 = 5.0;

/// Gross words per minute from correctly typed characters
pub fn wpm(correct_chars: usize, elapsed_secs: f64) -> u32 {
    if elapsed_secs <= 0.0 {
        return 0;
    }
    let minutes = elapsed_secs / 60.0;
    ((correct_chars as f64 / CHARS_PER_WORD) / minutes).round() as u32
}

/// Accuracy as a percentage with one decimal place
pub fn accuracy(correct_chars: usize, total_chars: usize) -> f64 {
    if total_chars == 0 {
        return 100.0;
    }
    round_to(correct_chars as f64 / total_chars as f64 * 100.0, 1)
}

/// Gross wpm minus mistakes per minute, floored at zero
pub fn net_wpm(gross_wpm: u32, mistakes: usize, elapsed_secs: f64) -> u32 {
    if elapsed_secs <= 0.0 {
        return 0;
    }
    let minutes = elapsed_secs / 60.0;
    let net = (gross_wpm as f64 - mistakes as f64 / minutes).round();
    net.max(0.0) as u32
}

/// Snapshot of the running numbers shown while typing
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStats {
    pub wpm: u32,
    pub accuracy: f64,
    pub correct_characters: usize,
    pub incorrect_characters: usize,
    pub total_characters: usize,
    pub mistake_count: usize,
    pub progress_percent: f64,
}

impl LiveStats {
    pub fn compute(target: &[char], typed: &[char], elapsed_secs: f64) -> Self {
        let analysis = analyze(target, typed);
        let progress_percent = if target.is_empty() {
            0.0
        } else {
            (typed.len() as f64 / target.len() as f64 * 100.0).min(100.0)
        };

        Self {
            wpm: wpm(analysis.correct, elapsed_secs),
            accuracy: accuracy(analysis.correct, analysis.total_typed),
            correct_characters: analysis.correct,
            incorrect_characters: analysis.incorrect,
            total_characters: analysis.total_typed,
            mistake_count: analysis.mistakes.len(),
            progress_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_wpm_zero_inputs() {
        assert_eq!(wpm(0, 12.5), 0);
        assert_eq!(wpm(0, 60.0), 0);
        assert_eq!(wpm(250, 0.0), 0);
    }

    #[test]
    fn test_wpm() {
        // 11 chars in 10s: (11 / 5) / (10 / 60) = 13.2
        assert_eq!(wpm(11, 10.0), 13);
        assert_eq!(wpm(300, 60.0), 60);
        // 12.5 rounds up
        assert_eq!(wpm(125, 120.0), 13);
    }

    #[test]
    fn test_accuracy_zero_total() {
        assert_eq!(accuracy(0, 0), 100.0);
        assert_eq!(accuracy(7, 0), 100.0);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(10, 10), 100.0);
        assert_eq!(accuracy(2, 3), 66.7);
        assert_eq!(accuracy(1, 8), 12.5);
        assert_eq!(accuracy(0, 4), 0.0);
    }

    #[test]
    fn test_net_wpm() {
        assert_eq!(net_wpm(13, 0, 10.0), 13);
        // 2 mistakes in 30s is 4 per minute
        assert_eq!(net_wpm(40, 2, 30.0), 36);
        assert_eq!(net_wpm(5, 30, 60.0), 0);
        assert_eq!(net_wpm(40, 3, 0.0), 0);
    }

    #[test]
    fn test_live_stats_exact_match() {
        let target = chars("the cat sat");
        let stats = LiveStats::compute(&target, &target, 10.0);

        assert_eq!(stats.correct_characters, 11);
        assert_eq!(stats.incorrect_characters, 0);
        assert_eq!(stats.wpm, 13);
        assert_eq!(stats.accuracy, 100.0);
        assert_eq!(stats.progress_percent, 100.0);
    }

    #[test]
    fn test_live_stats_partial() {
        let stats = LiveStats::compute(&chars("abcd"), &chars("ax"), 0.0);

        assert_eq!(stats.wpm, 0);
        assert_eq!(stats.correct_characters, 1);
        assert_eq!(stats.incorrect_characters, 1);
        assert_eq!(stats.total_characters, 2);
        assert_eq!(stats.mistake_count, 1);
        assert_eq!(stats.accuracy, 50.0);
        assert_eq!(stats.progress_percent, 50.0);
    }

    #[test]
    fn test_live_stats_empty_target() {
        let stats = LiveStats::compute(&[], &[], 5.0);
        assert_eq!(stats.progress_percent, 0.0);
        assert_eq!(stats.accuracy, 100.0);
    }
}
