//! Core data model types for recall.
//!
//! These are the fundamental types that the rest of the workspace uses to
//! represent stimuli, participants and recall results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ExperimentError;

/// An association between a meaning, a word and a sign.
///
/// One row of the input table. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    /// The meaning participants should learn.
    pub meaning: String,
    /// File name of the spoken word, relative to the sound directory.
    pub word: String,
    /// File name of the sign video, relative to the video directory.
    pub sign: String,
    /// Difficulty category of the word. Empty when the column is absent.
    #[serde(default)]
    pub word_difficulty: String,
    /// Difficulty category of the sign. Empty when the column is absent.
    #[serde(default)]
    pub sign_difficulty: String,
}

impl Association {
    /// The media reference used for a phase of the given kind.
    pub fn stimulus(&self, kind: StimulusKind) -> &str {
        match kind {
            StimulusKind::Word => &self.word,
            StimulusKind::Sign => &self.sign,
        }
    }

    /// The difficulty category that buckets this association for `kind`.
    pub fn difficulty(&self, kind: StimulusKind) -> &str {
        match kind {
            StimulusKind::Word => &self.word_difficulty,
            StimulusKind::Sign => &self.sign_difficulty,
        }
    }
}

/// The modality of a stimulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StimulusKind {
    /// A spoken word, presented as audio.
    Word,
    /// A sign, presented as video.
    Sign,
}

impl fmt::Display for StimulusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StimulusKind::Word => write!(f, "word"),
            StimulusKind::Sign => write!(f, "sign"),
        }
    }
}

impl FromStr for StimulusKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "word" | "words" => Ok(StimulusKind::Word),
            "sign" | "signs" => Ok(StimulusKind::Sign),
            other => Err(format!("unknown stimulus kind: {other}")),
        }
    }
}

/// Hearing status of a participant. Decides the word/sign mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hearing {
    Hearing,
    Deaf,
}

impl fmt::Display for Hearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hearing::Hearing => write!(f, "yes"),
            Hearing::Deaf => write!(f, "no"),
        }
    }
}

impl FromStr for Hearing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" | "hearing" => Ok(Hearing::Hearing),
            "no" | "n" | "false" | "deaf" => Ok(Hearing::Deaf),
            other => Err(format!("hearing must be yes or no, got: {other}")),
        }
    }
}

/// A participant taking part in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant id, used to name the output files.
    pub id: String,
    /// Hearing status.
    pub hearing: Hearing,
}

impl Participant {
    /// Create a participant, rejecting ids that cannot name an output file.
    pub fn new(id: &str, hearing: Hearing) -> Result<Self, ExperimentError> {
        let id = id.trim();
        let invalid = |reason: &str| ExperimentError::InvalidParticipant {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        if id.is_empty() {
            return Err(invalid("id is empty"));
        }
        if id == "." || id == ".." {
            return Err(invalid("id is a relative path component"));
        }
        if let Some(c) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '-')))
        {
            return Err(invalid(&format!("character '{c}' is not allowed")));
        }

        Ok(Self {
            id: id.to_string(),
            hearing,
        })
    }
}

/// How many phases of each kind a participant group receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCounts {
    /// Number of word phases.
    #[serde(default)]
    pub words: usize,
    /// Number of sign phases.
    #[serde(default)]
    pub signs: usize,
}

impl PhaseCounts {
    pub fn new(words: usize, signs: usize) -> Self {
        Self { words, signs }
    }

    pub fn total(&self) -> usize {
        self.words + self.signs
    }
}

/// One recalled answer: the ground truth, the stimulus and what was typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallRecord {
    pub meaning: String,
    pub stimulus: String,
    pub recalled_text: String,
}

/// Ordered, append-only list of recall records for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    records: Vec<RecallRecord>,
}

impl SessionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Records keep their presentation order.
    pub fn push(&mut self, record: RecallRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[RecallRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<RecallRecord> {
        self.records
    }
}
