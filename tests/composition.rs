// Composition tests: the whole pipeline from collector files on disk to
// stored weekly rankings.
//
// Files -> Preprocessor -> processed snapshot -> run_week -> ledger
// using a temp data dir and an in-memory store.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde_json::json;

use toolrank::dictionary::genres::default_genres;
use toolrank::dictionary::Dictionary;
use toolrank::error::PipelineError;
use toolrank::matcher::pending::PendingMiner;
use toolrank::matcher::{MatchThresholds, Matcher};
use toolrank::pipeline::preprocess::{self, PreprocessReport, Preprocessor};
use toolrank::pipeline::weekly::{run_week, WeeklyParams};
use toolrank::sources::{SourceKind, SourceWeights};
use toolrank::store::models::ProcessedRow;
use toolrank::store::{SnapshotStore, SqliteStore};
use toolrank::week::WeekId;

const TOOLS: &str = r#"
[[tool]]
canonical = "Claude"
genre = "multi-ai"
variants = ["claude"]

[[tool]]
canonical = "ChatGPT"
genre = "multi-ai"
variants = ["chatgpt"]

[[tool]]
canonical = "Midjourney"
genre = "image"
variants = ["midjourney"]

[[tool]]
canonical = "Sora"
genre = "video"
variants = ["sora"]

[[tool]]
canonical = "Cursor"
genre = "coding"
match_mode = "exact_only"
variants = ["cursor"]

[[tool]]
canonical = "Python"
genre = "coding"
aggregate = false
variants = ["python"]
"#;

fn write_json(dir: &Path, rel: &str, value: serde_json::Value) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn seed_collectors(dir: &Path) {
    write_json(
        dir,
        "reddit/weekly/reddit_20250613.json",
        json!([
            {
                "subreddit": "ClaudeAI",
                "title": "Claude is amazing",
                "selftext": "claude helped me refactor"
            },
            {"subreddit": "LocalLLaMA", "title": "weather", "selftext": ""}
        ]),
    );
    write_json(
        dir,
        "youtube/weekly/youtube_weekly_20250613.json",
        json!({
            "total_channels": 1,
            "channels": {
                "AI Explained": {
                    "videos": [
                        {
                            "title": "Sora video tests",
                            "description": "midjourney comparison",
                            "tags": ["sora"]
                        }
                    ]
                }
            }
        }),
    );
    write_json(
        dir,
        "rss/weekly/weekly_summary_20250613.json",
        json!({
            "week_start": "2025-06-09",
            "sites": {
                "techcrunch": [
                    {"title": "ChatGPT adds memory", "summary": "OpenAI ships chatgpt update"}
                ]
            }
        }),
    );
    write_json(
        dir,
        "aiweekly/weekly/aiweekly_20250613.json",
        json!({
            "rss_url": "https://aiweekly.co/issues.rss",
            "articles": [
                {"title": "Cursor raises", "content": "cursor python tooling"}
            ]
        }),
    );
}

fn preprocess_dir(dict: &Dictionary, data_dir: &Path) -> anyhow::Result<PreprocessReport> {
    let preprocessor = Preprocessor::new(
        Matcher::new(dict, MatchThresholds::default()),
        SourceWeights::default(),
        PendingMiner::new(),
    );
    preprocess::run(preprocessor, data_dir, 150)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn week(s: &str) -> WeekId {
    s.parse().unwrap()
}

fn rows_for(tool: &str, count: u32) -> Vec<ProcessedRow> {
    vec![ProcessedRow::new(
        SourceKind::Rss,
        1.0,
        "",
        [(tool.to_string(), count)].into(),
        "weekly_summary.json",
    )]
}

// ============================================================
// Files -> processed snapshot
// ============================================================

#[test]
fn preprocess_reads_every_source_kind() {
    let tmp = tempfile::tempdir().unwrap();
    seed_collectors(tmp.path());
    let dict = Dictionary::from_toml_str(TOOLS).unwrap();

    let report = preprocess_dir(&dict, tmp.path()).unwrap();
    assert_eq!(report.files.len(), 4);
    assert_eq!(report.rows.len(), 4, "the weather post matches nothing");

    let by_kind = |kind: SourceKind| {
        report
            .rows
            .iter()
            .find(|r| r.source_kind == kind)
            .map(|r| r.matched_entities.clone())
            .unwrap()
    };
    // Canonical names count as aliases, so "Claude" and "claude" both hit.
    assert_eq!(by_kind(SourceKind::Reddit)["Claude"], 4);
    assert_eq!(by_kind(SourceKind::Youtube)["Sora"], 4);
    assert_eq!(by_kind(SourceKind::Youtube)["Midjourney"], 2);
    assert_eq!(by_kind(SourceKind::Rss)["ChatGPT"], 4);
    assert_eq!(by_kind(SourceKind::Aiweekly)["Cursor"], 4);

    for kind in SourceKind::ALL {
        let expected = if kind == SourceKind::Reddit { 2 } else { 1 };
        assert_eq!(report.per_source[&kind].records, expected);
    }
    assert!(report.pending.iter().any(|t| t.term == "weather"));
    assert!(report.pending.iter().any(|t| t.term == "OpenAI"));
}

#[test]
fn no_collector_files_is_a_no_op() {
    let tmp = tempfile::tempdir().unwrap();
    let dict = Dictionary::from_toml_str(TOOLS).unwrap();
    let err = preprocess_dir(&dict, tmp.path()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::NoProcessableInput)
    ));
}

// ============================================================
// Files -> rankings
// ============================================================

#[test]
fn end_to_end_first_week() {
    let tmp = tempfile::tempdir().unwrap();
    seed_collectors(tmp.path());
    let dict = Dictionary::from_toml_str(TOOLS).unwrap();
    let store = SqliteStore::in_memory().unwrap();

    let report = preprocess_dir(&dict, tmp.path()).unwrap();
    preprocess::save(&store, date(2025, 6, 13), &report).unwrap();

    let genres = default_genres();
    let outcome =
        run_week(&store, &dict, &genres, week("2025-W24"), WeeklyParams::default()).unwrap();

    let got: Vec<(&str, u32, &str, f64, bool)> = outcome
        .rankings
        .iter()
        .map(|r| (r.genre.as_str(), r.rank, r.tool.as_str(), r.score, r.is_new))
        .collect();
    assert_eq!(
        got,
        vec![
            // Tie at 4.0 keeps dictionary order.
            ("multi-ai", 1, "Claude", 4.0, true),
            ("multi-ai", 2, "ChatGPT", 4.0, true),
            ("image", 1, "Midjourney", 2.0, true),
            ("video", 1, "Sora", 4.0, true),
            ("coding", 1, "Cursor", 4.0, true),
        ]
    );
    assert!(outcome.scores.iter().all(|s| s.tool != "Python"));
    assert_eq!(store.rankings(&week("2025-W24")).unwrap(), outcome.rankings);
}

#[test]
fn scenario_two_weeks_with_decay() {
    let dict = Dictionary::from_toml_str(TOOLS).unwrap();
    let store = SqliteStore::in_memory().unwrap();
    let genres = default_genres();
    let params = WeeklyParams {
        decay_factor: 0.3,
        ..WeeklyParams::default()
    };

    store.save_processed(date(2025, 6, 4), &rows_for("Claude", 10), &[]).unwrap();
    run_week(&store, &dict, &genres, week("2025-W23"), params).unwrap();

    store.save_processed(date(2025, 6, 11), &rows_for("Claude", 5), &[]).unwrap();
    let outcome = run_week(&store, &dict, &genres, week("2025-W24"), params).unwrap();

    assert!(outcome.had_history);
    let claude = outcome.rankings.iter().find(|r| r.tool == "Claude").unwrap();
    assert!((claude.score - 8.0).abs() < 1e-9);
    assert!(!claude.is_new);

    // The previous week is read, never rewritten.
    let w23 = store.weekly_scores(&week("2025-W23")).unwrap();
    assert_eq!(w23.len(), 1);
    assert_eq!(w23[0].score, 10.0);
}

#[test]
fn decayed_tool_without_mentions_is_not_new_and_keeps_ranking() {
    let dict = Dictionary::from_toml_str(TOOLS).unwrap();
    let store = SqliteStore::in_memory().unwrap();
    let genres = default_genres();
    let params = WeeklyParams {
        decay_factor: 1.0,
        ..WeeklyParams::default()
    };

    store.save_processed(date(2025, 6, 4), &rows_for("Sora", 3), &[]).unwrap();
    run_week(&store, &dict, &genres, week("2025-W23"), params).unwrap();

    store.save_processed(date(2025, 6, 11), &rows_for("Claude", 1), &[]).unwrap();
    let outcome = run_week(&store, &dict, &genres, week("2025-W24"), params).unwrap();

    let sora = outcome.rankings.iter().find(|r| r.tool == "Sora").unwrap();
    assert_eq!(sora.score, 3.0);
    assert!(!sora.is_new);
    let claude = outcome.rankings.iter().find(|r| r.tool == "Claude").unwrap();
    assert!(claude.is_new);
}

#[test]
fn missing_history_is_a_cold_start() {
    let dict = Dictionary::from_toml_str(TOOLS).unwrap();
    let store = SqliteStore::in_memory().unwrap();
    store.save_processed(date(2025, 6, 11), &rows_for("Claude", 2), &[]).unwrap();

    let params = WeeklyParams {
        decay_factor: 0.5,
        ..WeeklyParams::default()
    };
    let outcome = run_week(&store, &dict, &default_genres(), week("2025-W24"), params).unwrap();
    assert!(!outcome.had_history);
    assert_eq!(outcome.rankings.len(), 1);
    assert_eq!(outcome.rankings[0].score, 2.0);
}

#[test]
fn ranking_an_older_week_after_a_newer_one_is_refused() {
    let dict = Dictionary::from_toml_str(TOOLS).unwrap();
    let store = SqliteStore::in_memory().unwrap();
    let genres = default_genres();

    store.save_processed(date(2025, 6, 4), &rows_for("Claude", 1), &[]).unwrap();
    store.save_processed(date(2025, 6, 11), &rows_for("Claude", 1), &[]).unwrap();
    run_week(&store, &dict, &genres, week("2025-W24"), WeeklyParams::default()).unwrap();

    let err = run_week(&store, &dict, &genres, week("2025-W23"), WeeklyParams::default())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::ClosedWeek { .. })
    ));
}
