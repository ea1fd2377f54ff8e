// Preprocessing pipeline: collector files -> ProcessedRows + PendingTerms.
//
// Reads the latest weekly file of every source kind, flattens each record
// through its adapter, and runs clean -> tokenize -> n-grams -> match. Bad
// records and unreadable files are logged, counted and skipped; only a run
// with no input files at all stops early.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::matcher::pending::PendingMiner;
use crate::matcher::Matcher;
use crate::sources::{self, SourceKind, SourceWeights};
use crate::store::models::{PendingTerm, ProcessedRow};
use crate::store::SnapshotStore;
use crate::text;

/// Number of n-grams shown per record in debug mode.
const DEBUG_NGRAM_SAMPLE: usize = 10;

/// Per-source contribution counts for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceStats {
    /// Records recognized as this kind.
    pub records: usize,
    /// Records that produced at least one entity match.
    pub matched: usize,
    /// Total credited mentions across all matched records.
    pub mentions: u64,
    pub low_confidence: usize,
    pub rejected: usize,
    pub corrupt: usize,
}

/// Everything one preprocessing run produced.
#[derive(Debug, Default)]
pub struct PreprocessReport {
    pub files: Vec<PathBuf>,
    pub failed_files: usize,
    pub unrecognized: usize,
    pub per_source: BTreeMap<SourceKind, SourceStats>,
    pub rows: Vec<ProcessedRow>,
    pub pending: Vec<PendingTerm>,
    /// Distinct unknown terms before the top-K cut.
    pub distinct_unknown: usize,
}

/// Stateful per-run processor. Owns the run's unknown-term accumulator.
pub struct Preprocessor<'d> {
    matcher: Matcher<'d>,
    weights: SourceWeights,
    miner: PendingMiner,
    debug: bool,
    report: PreprocessReport,
}

impl<'d> Preprocessor<'d> {
    pub fn new(matcher: Matcher<'d>, weights: SourceWeights, miner: PendingMiner) -> Self {
        Self {
            matcher,
            weights,
            miner,
            debug: false,
            report: PreprocessReport::default(),
        }
    }

    /// Log source detection, n-gram samples and matches for every record.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Process one collector file. A file holds a single record or an
    /// array of records. Unreadable or unparsable files are counted and
    /// skipped.
    pub fn process_file(&mut self, path: &Path) {
        self.report.files.push(path.to_path_buf());
        match read_json(path) {
            Ok(value) => self.process_document(&value, &path.display().to_string()),
            Err(e) => {
                warn!(
                    file = %path.display(),
                    error = %format!("{e:#}"),
                    "Skipping unreadable file"
                );
                self.report.failed_files += 1;
            }
        }
    }

    /// Process an already-parsed document (object or array of objects).
    pub fn process_document(&mut self, document: &Value, provenance: &str) {
        let records: &[Value] = match document {
            Value::Array(items) => items,
            single => std::slice::from_ref(single),
        };

        for record in records {
            match self.process_record(record, provenance) {
                Ok(Some(row)) => self.report.rows.push(row),
                Ok(None) => {}
                Err(e) => {
                    warn!(file = provenance, error = %e, "Skipping record");
                    match e {
                        PipelineError::UnrecognizedSourceFormat { .. } => {
                            self.report.unrecognized += 1;
                        }
                        PipelineError::CorruptRecordPayload { kind, .. } => {
                            self.report.per_source.entry(kind).or_default().corrupt += 1;
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Run one record through the whole text pipeline. Returns a row only
    /// when at least one entity matched.
    pub fn process_record(
        &mut self,
        record: &Value,
        provenance: &str,
    ) -> Result<Option<ProcessedRow>, PipelineError> {
        let kind = sources::detect(record)?;
        if self.debug {
            let keys: Vec<&str> = record
                .as_object()
                .map(|o| o.keys().take(5).map(String::as_str).collect())
                .unwrap_or_default();
            info!(source = %kind, ?keys, "Source detected");
        }

        let (_, content) = sources::extract(record)?;
        self.report.per_source.entry(kind).or_default().records += 1;
        if content.is_empty() {
            return Ok(None);
        }

        let cleaned = text::clean_text(&content);
        let tokens = text::tokenize(&cleaned);
        let candidates: Vec<String> = text::candidates(&tokens).collect();
        if candidates.is_empty() {
            return Ok(None);
        }
        if self.debug {
            let sample: Vec<&str> = candidates
                .iter()
                .take(DEBUG_NGRAM_SAMPLE)
                .map(String::as_str)
                .collect();
            info!(source = %kind, count = candidates.len(), ?sample, "Extracted n-grams");
        }

        let matches = self.matcher.match_record(&candidates);
        for (term, count) in &matches.unknown {
            self.miner.observe(term, u64::from(*count));
        }

        let stats = self.report.per_source.entry(kind).or_default();
        stats.low_confidence += matches.low_confidence;
        stats.rejected += matches.rejected;

        if self.debug {
            info!(source = %kind, matched = ?matches.entities, "Matched tools");
        }
        if matches.entities.is_empty() {
            return Ok(None);
        }

        stats.matched += 1;
        stats.mentions += matches.entities.values().map(|&c| u64::from(c)).sum::<u64>();

        Ok(Some(ProcessedRow::new(
            kind,
            self.weights.weight(kind),
            &content,
            matches.entities,
            provenance,
        )))
    }

    /// Close the run: cut the unknown terms down to the top `pending_limit`.
    pub fn finish(mut self, pending_limit: usize) -> PreprocessReport {
        self.report.distinct_unknown = self.miner.distinct();
        self.report.pending = self.miner.top(pending_limit);
        self.report
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Discover the latest collector files and process them all.
///
/// Fails with `NoProcessableInput` when the data directory holds no
/// weekly files for any source kind.
pub fn run(
    preprocessor: Preprocessor<'_>,
    data_dir: &Path,
    pending_limit: usize,
) -> Result<PreprocessReport> {
    let files = sources::discover::latest_weekly_files(data_dir)?;
    if files.is_empty() {
        return Err(PipelineError::NoProcessableInput.into());
    }
    let mut preprocessor = preprocessor;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("  Files [{bar:30}] {pos}/{len} ({eta})")?);
    for path in &files {
        debug!(file = %path.display(), "Processing");
        preprocessor.process_file(path);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let report = preprocessor.finish(pending_limit);
    info!(
        files = report.files.len(),
        rows = report.rows.len(),
        pending = report.pending.len(),
        "Preprocessing complete"
    );
    Ok(report)
}

/// Persist the run as the processed snapshot of `run_date`.
pub fn save(
    store: &dyn SnapshotStore,
    run_date: NaiveDate,
    report: &PreprocessReport,
) -> Result<()> {
    store
        .save_processed(run_date, &report.rows, &report.pending)
        .with_context(|| format!("Failed to save processed snapshot for {run_date}"))?;
    info!(%run_date, rows = report.rows.len(), "Saved processed snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{CanonicalEntity, Dictionary};
    use crate::matcher::MatchThresholds;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn dict() -> Dictionary {
        let mut claude = CanonicalEntity::new("Claude", "multi-ai");
        claude.variants = vec!["claude".to_string()];
        let mut cursor = CanonicalEntity::new("Cursor", "coding");
        cursor.variants = vec!["cursor".to_string()];
        Dictionary::from_entities(vec![claude, cursor])
    }

    fn preprocessor(d: &Dictionary) -> Preprocessor<'_> {
        Preprocessor::new(
            Matcher::new(d, MatchThresholds::default()),
            SourceWeights::default(),
            PendingMiner::new(),
        )
    }

    #[test]
    fn matched_record_becomes_a_row() {
        let d = dict();
        let mut p = preprocessor(&d);
        let record = json!({
            "subreddit": "ClaudeAI",
            "title": "claude writes code",
            "selftext": ""
        });
        let row = p.process_record(&record, "reddit_20250613.json").unwrap().unwrap();
        assert_eq!(row.source_kind, SourceKind::Reddit);
        assert_eq!(row.matched_entities["Claude"], 2);
        assert_eq!(row.provenance, "reddit_20250613.json");
    }

    #[test]
    fn unmatched_record_feeds_only_the_miner() {
        let d = dict();
        let mut p = preprocessor(&d);
        let record = json!({"subreddit": "x", "title": "weather forecast"});
        assert!(p.process_record(&record, "f.json").unwrap().is_none());
        let report = p.finish(10);
        assert!(report.rows.is_empty());
        assert!(report.pending.iter().any(|t| t.term == "weather forecast"));
        assert_eq!(report.per_source[&SourceKind::Reddit].records, 1);
        assert_eq!(report.per_source[&SourceKind::Reddit].matched, 0);
    }

    #[test]
    fn bad_records_are_counted_and_skipped() {
        let d = dict();
        let mut p = preprocessor(&d);
        let doc = json!([
            {"foo": 1},
            {"channels": [1, 2], "total_channels": 2},
            {"subreddit": "x", "title": "cursor and claude"}
        ]);
        p.process_document(&doc, "mixed.json");
        let report = p.finish(10);
        assert_eq!(report.unrecognized, 1);
        assert_eq!(report.per_source[&SourceKind::Youtube].corrupt, 1);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].matched_entities.len(), 2);
    }

    #[test]
    fn unreadable_file_does_not_abort() {
        let d = dict();
        let tmp = tempfile::tempdir().unwrap();
        let bad = tmp.path().join("broken.json");
        std::fs::write(&bad, "{not json").unwrap();

        let mut p = preprocessor(&d);
        p.process_file(&bad);
        let report = p.finish(10);
        assert_eq!(report.failed_files, 1);
        assert_eq!(report.files.len(), 1);
    }

    #[test]
    fn empty_data_dir_is_no_processable_input() {
        let d = dict();
        let tmp = tempfile::tempdir().unwrap();
        let err = run(preprocessor(&d), tmp.path(), 10).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NoProcessableInput)
        ));
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logs_of(debug: bool) -> String {
        let d = dict();
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let record = json!({"subreddit": "x", "title": "cursor tips"});
        tracing::subscriber::with_default(subscriber, || {
            let mut p = preprocessor(&d).with_debug(debug);
            p.process_record(&record, "f.json").unwrap();
        });

        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn debug_mode_logs_each_record_stage() {
        let out = logs_of(true);
        assert!(out.contains("Source detected"), "{out}");
        assert!(out.contains("source=reddit"), "{out}");
        assert!(out.contains("Extracted n-grams"), "{out}");
        assert!(out.contains("cursor tips"), "{out}");
        assert!(out.contains("Matched tools"), "{out}");
        assert!(out.contains("Cursor"), "{out}");
    }

    #[test]
    fn record_stages_are_silent_without_debug() {
        let out = logs_of(false);
        assert!(!out.contains("Source detected"), "{out}");
        assert!(!out.contains("Matched tools"), "{out}");
    }

    #[test]
    fn weights_are_stamped_on_rows() {
        let d = dict();
        let weights = SourceWeights {
            rss: 0.5,
            ..SourceWeights::default()
        };
        let mut p = Preprocessor::new(
            Matcher::new(&d, MatchThresholds::default()),
            weights,
            PendingMiner::new(),
        );
        let record = json!({"summary": "x", "week_start": "2025-06-09", "sites": {
            "techcrunch": [{"title": "cursor raises", "summary": ""}]
        }});
        let row = p.process_record(&record, "weekly_summary.json").unwrap().unwrap();
        assert_eq!(row.source_kind, SourceKind::Rss);
        assert_eq!(row.weight, 0.5);
    }
}
