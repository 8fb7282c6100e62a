//! Experiment error types.
//!
//! Every failure in a session is fatal: there is no retry or recovery path.
//! The variants exist so the CLI can report precisely what went wrong and
//! pick an exit status without string matching.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::StimulusKind;

/// A media file referenced by the input table that does not exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMedia {
    /// Meaning of the association that references the file.
    pub meaning: String,
    /// Whether the file is a word sound or a sign video.
    pub kind: StimulusKind,
    /// The resolved path that was checked.
    pub path: PathBuf,
}

impl fmt::Display for MissingMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" ({} {})",
            self.meaning,
            self.kind,
            self.path.display()
        )
    }
}

fn list_missing(missing: &[MissingMedia]) -> String {
    missing
        .iter()
        .map(|m| format!("\n    - {m}"))
        .collect::<String>()
}

/// Errors that can end an experiment session.
#[derive(Debug, Error)]
pub enum ExperimentError {
    /// The input table does not exist.
    #[error("could not find input table at {}", .path.display())]
    MissingInput { path: PathBuf },

    /// The input table exists but holds no associations.
    #[error("input table {} contains no associations", .path.display())]
    EmptyInput { path: PathBuf },

    /// The input table could not be parsed.
    #[error("malformed input table {}: {message}", .path.display())]
    MalformedInput { path: PathBuf, message: String },

    /// One or more referenced media files are absent. Lists all of them.
    #[error("could not find {} required media file(s):{}", .missing.len(), list_missing(.missing))]
    MissingMedia { missing: Vec<MissingMedia> },

    /// Fewer associations than the total number of requested phases.
    #[error("requested {requested} phases but only {available} associations are available")]
    NotEnoughAssociations { requested: usize, available: usize },

    /// The requested count does not split evenly across difficulty buckets.
    #[error("cannot split {requested} {kind} phases evenly across {buckets} difficulty buckets")]
    ImbalancedRequest {
        kind: StimulusKind,
        requested: usize,
        buckets: usize,
    },

    /// A difficulty bucket holds fewer members than its share of the request.
    #[error("{kind} difficulty bucket '{bucket}' has {available} associations, {needed} needed")]
    InsufficientData {
        kind: StimulusKind,
        bucket: String,
        available: usize,
        needed: usize,
    },

    /// The participant id cannot be used to name output files.
    #[error("invalid participant id '{id}': {reason}")]
    InvalidParticipant { id: String, reason: String },

    /// The participant or experimenter aborted the session.
    #[error("session cancelled")]
    Cancelled,

    /// The presentation backend failed.
    #[error("display error: {0}")]
    Display(String),

    /// Filesystem failure while reading or writing session data.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExperimentError {
    /// Returns `true` if the session ended because of an abort signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExperimentError::Cancelled)
    }

    /// Returns `true` if the error happened before any session could start,
    /// i.e. the experiment materials or the request are at fault.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            ExperimentError::MissingInput { .. }
                | ExperimentError::EmptyInput { .. }
                | ExperimentError::MalformedInput { .. }
                | ExperimentError::MissingMedia { .. }
                | ExperimentError::NotEnoughAssociations { .. }
                | ExperimentError::ImbalancedRequest { .. }
                | ExperimentError::InsufficientData { .. }
                | ExperimentError::InvalidParticipant { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_media_lists_every_file() {
        let err = ExperimentError::MissingMedia {
            missing: vec![
                MissingMedia {
                    meaning: "house".into(),
                    kind: StimulusKind::Sign,
                    path: PathBuf::from("video/house.mp4"),
                },
                MissingMedia {
                    meaning: "tree".into(),
                    kind: StimulusKind::Word,
                    path: PathBuf::from("sound/tree.wav"),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.starts_with("could not find 2 required media file(s)"));
        assert!(text.contains("\"house\" (sign video/house.mp4)"));
        assert!(text.contains("\"tree\" (word sound/tree.wav)"));
    }

    #[test]
    fn classification() {
        assert!(ExperimentError::Cancelled.is_cancelled());
        assert!(!ExperimentError::Cancelled.is_setup_error());
        let imbalanced = ExperimentError::ImbalancedRequest {
            kind: StimulusKind::Word,
            requested: 5,
            buckets: 2,
        };
        assert!(imbalanced.is_setup_error());
        assert!(!imbalanced.is_cancelled());
    }
}
