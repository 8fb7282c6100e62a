//! Stimulus catalog loader.
//!
//! Loads associations from the headerless CSV input table and checks that
//! every referenced sound and video exists before a session starts.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::{ExperimentError, MissingMedia};
use crate::model::{Association, StimulusKind};

/// Where word sounds and sign videos live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLayout {
    /// Directory holding the files named in the `word` column.
    pub sound_dir: PathBuf,
    /// Directory holding the files named in the `sign` column.
    pub video_dir: PathBuf,
}

impl MediaLayout {
    pub fn new(sound_dir: impl Into<PathBuf>, video_dir: impl Into<PathBuf>) -> Self {
        Self {
            sound_dir: sound_dir.into(),
            video_dir: video_dir.into(),
        }
    }

    /// The conventional `sound/` and `video/` folders under `base`.
    pub fn under(base: &Path) -> Self {
        Self::new(base.join("sound"), base.join("video"))
    }

    /// Resolve a stimulus file name to a path.
    pub fn resolve(&self, kind: StimulusKind, stimulus: &str) -> PathBuf {
        match kind {
            StimulusKind::Word => self.sound_dir.join(stimulus),
            StimulusKind::Sign => self.video_dir.join(stimulus),
        }
    }
}

/// Load associations from a CSV file.
pub fn load(path: &Path) -> Result<Vec<Association>, ExperimentError> {
    if !path.is_file() {
        return Err(ExperimentError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let content = String::from_utf8(std::fs::read(path)?).map_err(|e| {
        ExperimentError::MalformedInput {
            path: path.to_path_buf(),
            message: format!("not valid UTF-8: {e}"),
        }
    })?;
    parse_str(&content, path)
}

/// Parse CSV content into associations (useful for testing).
///
/// Columns are `meaning, word, sign[, word_difficulty, sign_difficulty]`.
/// A leading `meaning,word,sign` header row is skipped.
pub fn parse_str(content: &str, source: &Path) -> Result<Vec<Association>, ExperimentError> {
    let malformed = |message: String| ExperimentError::MalformedInput {
        path: source.to_path_buf(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut associations = Vec::new();
    let mut seen_row = false;

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| malformed(e.to_string()))?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);

        if record.iter().all(str::is_empty) {
            continue;
        }
        let first_row = !seen_row;
        seen_row = true;
        if first_row && is_header(&record) {
            continue;
        }
        if !(3..=5).contains(&record.len()) {
            return Err(malformed(format!(
                "line {line}: expected 3 to 5 columns, found {}",
                record.len()
            )));
        }

        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        let association = Association {
            meaning: field(0),
            word: field(1),
            sign: field(2),
            word_difficulty: field(3),
            sign_difficulty: field(4),
        };
        if association.meaning.is_empty() {
            return Err(malformed(format!("line {line}: meaning is empty")));
        }
        associations.push(association);
    }

    if associations.is_empty() {
        return Err(ExperimentError::EmptyInput {
            path: source.to_path_buf(),
        });
    }

    tracing::debug!(
        count = associations.len(),
        "loaded associations from {}",
        source.display()
    );
    Ok(associations)
}

fn is_header(record: &csv::StringRecord) -> bool {
    let expected = ["meaning", "word", "sign"];
    record.len() >= expected.len()
        && expected
            .iter()
            .zip(record.iter())
            .all(|(want, got)| got.eq_ignore_ascii_case(want))
}

/// Every referenced media file that does not exist.
///
/// Missing sign videos are listed first, then missing word sounds, each in
/// input order, so the experimenter gets a complete report in one run.
pub fn find_missing_media(associations: &[Association], layout: &MediaLayout) -> Vec<MissingMedia> {
    [StimulusKind::Sign, StimulusKind::Word]
        .into_iter()
        .flat_map(|kind| {
            associations.iter().filter_map(move |a| {
                let path = layout.resolve(kind, a.stimulus(kind));
                (!path.is_file()).then(|| MissingMedia {
                    meaning: a.meaning.clone(),
                    kind,
                    path,
                })
            })
        })
        .collect()
}

/// Load associations and fail if any referenced media file is missing.
pub fn load_verified(
    path: &Path,
    layout: &MediaLayout,
) -> Result<Vec<Association>, ExperimentError> {
    let associations = load(path)?;
    let missing = find_missing_media(&associations, layout);
    if !missing.is_empty() {
        return Err(ExperimentError::MissingMedia { missing });
    }
    Ok(associations)
}

/// Number of associations in each difficulty bucket for `kind`.
pub fn bucket_sizes(associations: &[Association], kind: StimulusKind) -> BTreeMap<String, usize> {
    let mut sizes = BTreeMap::new();
    for a in associations {
        *sizes.entry(a.difficulty(kind).to_string()).or_insert(0) += 1;
    }
    sizes
}

/// A non-fatal issue found in a catalog.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The meaning of the offending association (if applicable).
    pub meaning: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a catalog for issues that do not prevent a session.
pub fn validate_catalog(associations: &[Association]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate meanings make recall answers ambiguous
    let mut seen = std::collections::HashSet::new();
    for a in associations {
        if !seen.insert(a.meaning.to_lowercase()) {
            warnings.push(ValidationWarning {
                meaning: Some(a.meaning.clone()),
                message: format!("duplicate meaning: {}", a.meaning),
            });
        }
    }

    // The same media file used by several rows
    for kind in [StimulusKind::Word, StimulusKind::Sign] {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for a in associations {
            let stimulus = a.stimulus(kind);
            if let Some(first) = owners.insert(stimulus, &a.meaning) {
                warnings.push(ValidationWarning {
                    meaning: Some(a.meaning.clone()),
                    message: format!("{kind} file {stimulus} is also used by \"{first}\""),
                });
            }
        }
    }

    // Unequal buckets limit how many phases can be drawn
    for kind in [StimulusKind::Word, StimulusKind::Sign] {
        let sizes = bucket_sizes(associations, kind);
        let smallest = sizes.values().copied().min().unwrap_or(0);
        let largest = sizes.values().copied().max().unwrap_or(0);
        if smallest != largest {
            warnings.push(ValidationWarning {
                meaning: None,
                message: format!(
                    "{kind} difficulty buckets are unequal ({smallest} to {largest} members); at most {} {kind} phases can be drawn",
                    smallest * sizes.len()
                ),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CSV: &str = "\
house,house.wav,house.mp4,easy,hard
tree,tree.wav,tree.mp4,hard,easy
water,water.wav,water.mp4,easy,easy
fire,fire.wav,fire.mp4,hard,hard
";

    fn src() -> PathBuf {
        PathBuf::from("input.csv")
    }

    #[test]
    fn parse_valid_csv() {
        let associations = parse_str(VALID_CSV, &src()).unwrap();
        assert_eq!(associations.len(), 4);
        assert_eq!(associations[0].meaning, "house");
        assert_eq!(associations[1].word, "tree.wav");
        assert_eq!(associations[2].sign, "water.mp4");
        assert_eq!(associations[3].word_difficulty, "hard");
        assert_eq!(associations[0].sign_difficulty, "hard");
    }

    #[test]
    fn parse_without_difficulty_columns() {
        let associations = parse_str("a,a.wav,a.mp4\nb,b.wav,b.mp4\n", &src()).unwrap();
        assert_eq!(associations.len(), 2);
        assert!(associations.iter().all(|a| a.word_difficulty.is_empty()));
        assert_eq!(bucket_sizes(&associations, StimulusKind::Word).len(), 1);
    }

    #[test]
    fn parse_skips_header_and_blank_lines() {
        let csv = "Meaning,Word,Sign,word_difficulty,sign_difficulty\n\na, a.wav , a.mp4,x,y\n";
        let associations = parse_str(csv, &src()).unwrap();
        assert_eq!(associations.len(), 1);
        assert_eq!(associations[0].word, "a.wav");
    }

    #[test]
    fn header_after_empty_rows_is_skipped() {
        let csv = ",,,\n\nmeaning,word,sign\na,a.wav,a.mp4\n";
        let associations = parse_str(csv, &src()).unwrap();
        assert_eq!(associations.len(), 1);
        assert_eq!(associations[0].meaning, "a");
    }

    #[test]
    fn header_only_on_first_row() {
        let csv = "a,a.wav,a.mp4\nmeaning,word,sign\n";
        let associations = parse_str(csv, &src()).unwrap();
        assert_eq!(associations.len(), 2);
        assert_eq!(associations[1].meaning, "meaning");
    }

    #[test]
    fn parse_too_many_columns() {
        let err = parse_str("a,a.wav,a.mp4,easy,hard,extra\n", &src()).unwrap_err();
        match err {
            ExperimentError::MalformedInput { message, .. } => {
                assert!(message.contains("found 6"), "got: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_rejects_non_utf8_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.csv");
        std::fs::write(&input, b"caf\xe9,cafe.wav,cafe.mp4\n").unwrap();
        match load(&input).unwrap_err() {
            ExperimentError::MalformedInput { path, message } => {
                assert_eq!(path, input);
                assert!(message.contains("UTF-8"), "got: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_quoted_meaning() {
        let csv = "\"to go, quickly\",run.wav,run.mp4\n";
        let associations = parse_str(csv, &src()).unwrap();
        assert_eq!(associations[0].meaning, "to go, quickly");
    }

    #[test]
    fn parse_too_few_columns_reports_line() {
        let err = parse_str("a,a.wav,a.mp4\nb,b.wav\n", &src()).unwrap_err();
        match err {
            ExperimentError::MalformedInput { message, .. } => {
                assert!(message.contains("line 2"), "got: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_empty_content() {
        let err = parse_str("\n\n", &src()).unwrap_err();
        assert!(matches!(err, ExperimentError::EmptyInput { .. }));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("input.csv")).unwrap_err();
        assert!(matches!(err, ExperimentError::MissingInput { .. }));
    }

    #[test]
    fn missing_media_enumerates_all() {
        let dir = tempfile::tempdir().unwrap();
        let layout = MediaLayout::under(dir.path());
        std::fs::create_dir_all(&layout.sound_dir).unwrap();
        std::fs::create_dir_all(&layout.video_dir).unwrap();
        std::fs::write(layout.sound_dir.join("house.wav"), b"").unwrap();
        std::fs::write(layout.video_dir.join("tree.mp4"), b"").unwrap();

        let associations = parse_str(VALID_CSV, &src()).unwrap();
        let missing = find_missing_media(&associations, &layout);

        // 3 videos + 3 sounds are absent
        assert_eq!(missing.len(), 6);
        assert_eq!(missing[0].kind, StimulusKind::Sign);
        assert_eq!(missing[0].meaning, "house");
        assert!(missing.iter().all(|m| m.meaning != "tree" || m.kind == StimulusKind::Word));
        assert_eq!(
            missing.iter().filter(|m| m.kind == StimulusKind::Word).count(),
            3
        );
    }

    #[test]
    fn load_verified_fails_with_full_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.csv");
        std::fs::write(&input, VALID_CSV).unwrap();

        let err = load_verified(&input, &MediaLayout::under(dir.path())).unwrap_err();
        match err {
            ExperimentError::MissingMedia { missing } => assert_eq!(missing.len(), 8),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_verified_succeeds_when_media_present() {
        let dir = tempfile::tempdir().unwrap();
        let layout = MediaLayout::under(dir.path());
        std::fs::create_dir_all(&layout.sound_dir).unwrap();
        std::fs::create_dir_all(&layout.video_dir).unwrap();
        let input = dir.path().join("input.csv");
        std::fs::write(&input, VALID_CSV).unwrap();
        for a in parse_str(VALID_CSV, &src()).unwrap() {
            std::fs::write(layout.sound_dir.join(&a.word), b"").unwrap();
            std::fs::write(layout.video_dir.join(&a.sign), b"").unwrap();
        }

        let associations = load_verified(&input, &layout).unwrap();
        assert_eq!(associations.len(), 4);
    }

    #[test]
    fn validate_duplicates_and_buckets() {
        let csv = "a,a.wav,a.mp4,easy\nA,b.wav,a.mp4,easy\nc,c.wav,c.mp4,hard\n";
        let associations = parse_str(csv, &src()).unwrap();
        let warnings = validate_catalog(&associations);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate meaning")));
        assert!(warnings.iter().any(|w| w.message.contains("sign file a.mp4")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("word difficulty buckets are unequal")));
    }

    #[test]
    fn validate_clean_catalog() {
        let associations = parse_str(VALID_CSV, &src()).unwrap();
        assert!(validate_catalog(&associations).is_empty());
    }
}
