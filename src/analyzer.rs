use serde::{Deserialize, Serialize};

/// Classification of a single position in the prompt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterState {
    Correct,
    Incorrect,
    /// next character awaiting input
    Current,
    /// not reached yet
    Pending,
    /// never typed (final analysis only)
    Missed,
    /// typed beyond the prompt (final analysis only)
    Extra,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MistakeKind {
    Substitution,
    Insertion,
}

/// A deviation between typed and expected text at one position.
///
/// `expected` is `None` for insertions. Both sides serialize as strings,
/// with an empty string standing in for a missing character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mistake {
    pub position: usize,
    #[serde(with = "char_or_empty")]
    pub expected: Option<char>,
    #[serde(with = "char_or_empty")]
    pub typed: Option<char>,
    #[serde(rename = "type")]
    pub kind: MistakeKind,
}

impl Mistake {
    pub fn substitution(position: usize, expected: char, typed: char) -> Self {
        Self {
            position,
            expected: Some(expected),
            typed: Some(typed),
            kind: MistakeKind::Substitution,
        }
    }

    pub fn insertion(position: usize, typed: char) -> Self {
        Self {
            position,
            expected: None,
            typed: Some(typed),
            kind: MistakeKind::Insertion,
        }
    }
}

/// Full comparison of typed text against the prompt
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Analysis {
    pub correct: usize,
    pub incorrect: usize,
    pub total_typed: usize,
    pub mistakes: Vec<Mistake>,
    pub states: Vec<CharacterState>,
}

/// Compares every position up to the longer of the two inputs.
pub fn analyze(target: &[char], typed: &[char]) -> Analysis {
    let len = target.len().max(typed.len());
    let mut analysis = Analysis {
        total_typed: typed.len(),
        states: Vec::with_capacity(len),
        ..Default::default()
    };

    for i in 0..len {
        match (target.get(i), typed.get(i)) {
            (Some(&expected), Some(&got)) if expected == got => {
                analysis.correct += 1;
                analysis.states.push(CharacterState::Correct);
            }
            (Some(&expected), Some(&got)) => {
                analysis.incorrect += 1;
                analysis.states.push(CharacterState::Incorrect);
                analysis
                    .mistakes
                    .push(Mistake::substitution(i, expected, got));
            }
            (_, None) => analysis.states.push(CharacterState::Missed),
            // only reachable when the buffer outgrew the prompt
            (None, Some(&got)) => {
                analysis.incorrect += 1;
                analysis.states.push(CharacterState::Extra);
                analysis.mistakes.push(Mistake::insertion(i, got));
            }
        }
    }

    analysis
}

/// Cheap per-keystroke classification for rendering. Builds no mistake list.
pub fn live_states(target: &[char], typed: &[char], cursor_pos: usize) -> Vec<CharacterState> {
    target
        .iter()
        .enumerate()
        .map(|(i, expected)| match typed.get(i) {
            Some(got) if got == expected => CharacterState::Correct,
            Some(_) => CharacterState::Incorrect,
            None if i == cursor_pos => CharacterState::Current,
            None => CharacterState::Pending,
        })
        .collect()
}

mod char_or_empty {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<char>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(c) => s.collect_str(c),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<char>, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(raw.chars().next())
    }
}
