//! Participant output table.
//!
//! One headerless row per recall record, in presentation order:
//! `meaning,stimulus,recalled_text`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use recall_core::model::{Participant, RecallRecord, SessionResult};
use recall_core::session::ResultSink;

/// Writes `<output_dir>/<participant_id>-output.csv`.
#[derive(Debug, Clone)]
pub struct CsvSink {
    output_dir: PathBuf,
}

impl CsvSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the table for `participant` goes.
    pub fn path_for(&self, participant: &Participant) -> PathBuf {
        self.output_dir
            .join(format!("{}-output.csv", participant.id))
    }
}

impl ResultSink for CsvSink {
    fn write(&mut self, participant: &Participant, result: &SessionResult) -> Result<()> {
        let path = self.path_for(participant);
        if path.exists() {
            tracing::warn!(
                participant = %participant.id,
                "overwriting existing output {}",
                path.display()
            );
        }
        write_results(&path, result)?;
        tracing::info!(
            participant = %participant.id,
            rows = result.len(),
            "wrote results to {}",
            path.display()
        );
        Ok(())
    }
}

/// Write `result` as a headerless table, replacing any existing file.
pub fn write_results(path: &Path, result: &SessionResult) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    for record in result.records() {
        writer
            .write_record([&record.meaning, &record.stimulus, &record.recalled_text])
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Load an output table back into records.
pub fn read_results(path: &Path) -> Result<Vec<RecallRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to read results from {}", path.display()))?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("failed to parse {}", path.display()))?;
        if row.len() != 3 {
            anyhow::bail!(
                "{}:{}: expected 3 columns, found {}",
                path.display(),
                index + 1,
                row.len()
            );
        }
        records.push(RecallRecord {
            meaning: row[0].to_string(),
            stimulus: row[1].to_string(),
            recalled_text: row[2].to_string(),
        });
    }
    Ok(records)
}
