//! JSON session summary with persistence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use recall_core::model::{Hearing, Participant, PhaseCounts, RecallRecord, SessionResult};
use recall_core::session::ResultSink;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::table::CsvSink;

/// Everything known about one completed session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Unique session identifier.
    pub session_id: Uuid,
    pub participant: String,
    pub hearing: Hearing,
    /// Requested phase counts.
    pub counts: PhaseCounts,
    /// RNG seed, when the session was seeded.
    pub seed: Option<u64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Recall records in presentation order.
    pub records: Vec<RecallRecord>,
}

impl SessionSummary {
    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summary from {}", path.display()))?;
        let summary: SessionSummary =
            serde_json::from_str(&content).context("failed to parse summary JSON")?;
        Ok(summary)
    }

    /// Fraction of answers that match the meaning, ignoring case and
    /// surrounding whitespace. `None` for an empty session.
    pub fn exact_match_rate(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let hits = self
            .records
            .iter()
            .filter(|r| r.recalled_text.trim().eq_ignore_ascii_case(r.meaning.trim()))
            .count();
        Some(hits as f64 / self.records.len() as f64)
    }
}

/// Writes the output table and a `<participant_id>-session.json` summary
/// next to it.
#[derive(Debug)]
pub struct SummarySink {
    table: CsvSink,
    session_id: Uuid,
    counts: PhaseCounts,
    seed: Option<u64>,
    started_at: DateTime<Utc>,
    last_summary: Option<PathBuf>,
}

impl SummarySink {
    /// Start timing a session. Call before the session begins.
    pub fn new(output_dir: impl Into<PathBuf>, counts: PhaseCounts, seed: Option<u64>) -> Self {
        Self {
            table: CsvSink::new(output_dir),
            session_id: Uuid::new_v4(),
            counts,
            seed,
            started_at: Utc::now(),
            last_summary: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn table(&self) -> &CsvSink {
        &self.table
    }

    /// Path of the summary written by the last successful `write`.
    pub fn summary_path(&self) -> Option<&Path> {
        self.last_summary.as_deref()
    }
}

impl ResultSink for SummarySink {
    fn write(&mut self, participant: &Participant, result: &SessionResult) -> Result<()> {
        self.table.write(participant, result)?;

        let summary = SessionSummary {
            session_id: self.session_id,
            participant: participant.id.clone(),
            hearing: participant.hearing,
            counts: self.counts,
            seed: self.seed,
            started_at: self.started_at,
            finished_at: Utc::now(),
            records: result.records().to_vec(),
        };
        let path = self
            .table
            .output_dir()
            .join(format!("{}-session.json", participant.id));
        summary.save_json(&path)?;
        tracing::info!(
            session_id = %self.session_id,
            exact_match_rate = summary.exact_match_rate().unwrap_or_default(),
            "wrote summary to {}",
            path.display()
        );
        self.last_summary = Some(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::read_results;

    fn result() -> SessionResult {
        let mut result = SessionResult::new();
        for (meaning, text) in [("dog", "Dog "), ("cat", ""), ("sun", "moon"), ("sky", "sky")] {
            result.push(RecallRecord {
                meaning: meaning.into(),
                stimulus: format!("{meaning}.mp4"),
                recalled_text: text.into(),
            });
        }
        result
    }

    #[test]
    fn writes_table_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let participant = Participant::new("P3", Hearing::Deaf).unwrap();
        let mut sink = SummarySink::new(dir.path(), PhaseCounts::new(0, 4), Some(42));
        sink.write(&participant, &result()).unwrap();

        let table = read_results(&dir.path().join("P3-output.csv")).unwrap();
        assert_eq!(table.len(), 4);

        let path = dir.path().join("P3-session.json");
        assert_eq!(sink.summary_path(), Some(path.as_path()));
        let summary = SessionSummary::load_json(&path).unwrap();
        assert_eq!(summary.session_id, sink.session_id());
        assert_eq!(summary.participant, "P3");
        assert_eq!(summary.hearing, Hearing::Deaf);
        assert_eq!(summary.counts, PhaseCounts::new(0, 4));
        assert_eq!(summary.seed, Some(42));
        assert!(summary.finished_at >= summary.started_at);
        assert_eq!(summary.records, table);
    }

    #[test]
    fn summary_json_uses_lowercase_enums() {
        let dir = tempfile::tempdir().unwrap();
        let participant = Participant::new("P4", Hearing::Hearing).unwrap();
        let mut sink = SummarySink::new(dir.path(), PhaseCounts::new(4, 0), None);
        sink.write(&participant, &result()).unwrap();

        let json: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("P4-session.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(json["hearing"], "hearing");
        assert!(json["seed"].is_null());
        assert_eq!(json["records"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn exact_match_rate_ignores_case_and_whitespace() {
        let summary = SessionSummary {
            session_id: Uuid::nil(),
            participant: "P".into(),
            hearing: Hearing::Deaf,
            counts: PhaseCounts::new(0, 4),
            seed: None,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            records: result().into_records(),
        };
        assert_eq!(summary.exact_match_rate(), Some(0.5));

        let empty = SessionSummary {
            records: Vec::new(),
            ..summary
        };
        assert_eq!(empty.exact_match_rate(), None);
    }
}
