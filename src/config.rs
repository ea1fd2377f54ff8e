use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::matcher::{MatchThresholds, LOW_CONFIDENCE_SCORE, MIN_FUZZY_SCORE};
use crate::matcher::pending::MAX_PENDING_TERMS;
use crate::scoring::ranking::TOP_N;
use crate::sources::SourceWeights;

/// Central configuration loaded from environment variables.
///
/// Nothing is required: every value has a default, so a bare checkout runs
/// against ./data, ./config and ./toolrank.db. The .env file is loaded
/// automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of collector output (`<kind>/weekly/*.json`).
    pub data_dir: PathBuf,
    pub dict_path: PathBuf,
    pub genres_path: PathBuf,
    pub db_path: String,
    /// Weight of the previous week's score in the merge. 0.0 disables carry-over.
    pub decay_factor: f64,
    pub thresholds: MatchThresholds,
    pub pending_limit: usize,
    pub top_n: usize,
    pub weights: SourceWeights,
    /// Exclude English stop words from unknown-term mining.
    pub pending_stop_words: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. `load()` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let decay_factor: f64 = parse_or(&lookup, "TOOLRANK_DECAY_FACTOR", 0.0)?;
        if !(0.0..=1.0).contains(&decay_factor) {
            anyhow::bail!("TOOLRANK_DECAY_FACTOR must be between 0 and 1, got {decay_factor}");
        }

        let thresholds = MatchThresholds {
            min_fuzzy_score: parse_or(&lookup, "TOOLRANK_FUZZY_THRESHOLD", MIN_FUZZY_SCORE)?,
            low_confidence_score: parse_or(
                &lookup,
                "TOOLRANK_LOW_CONFIDENCE",
                LOW_CONFIDENCE_SCORE,
            )?,
        };
        for (name, value) in [
            ("TOOLRANK_FUZZY_THRESHOLD", thresholds.min_fuzzy_score),
            ("TOOLRANK_LOW_CONFIDENCE", thresholds.low_confidence_score),
        ] {
            if !(0.0..=100.0).contains(&value) {
                anyhow::bail!("{name} must be between 0 and 100, got {value}");
            }
        }

        let weights = SourceWeights {
            reddit: parse_or(&lookup, "TOOLRANK_WEIGHT_REDDIT", 1.0)?,
            youtube: parse_or(&lookup, "TOOLRANK_WEIGHT_YOUTUBE", 1.0)?,
            rss: parse_or(&lookup, "TOOLRANK_WEIGHT_RSS", 1.0)?,
            aiweekly: parse_or(&lookup, "TOOLRANK_WEIGHT_AIWEEKLY", 1.0)?,
        };
        // A negative weight would push scores below zero, and the merge drops those.
        for (name, value) in [
            ("TOOLRANK_WEIGHT_REDDIT", weights.reddit),
            ("TOOLRANK_WEIGHT_YOUTUBE", weights.youtube),
            ("TOOLRANK_WEIGHT_RSS", weights.rss),
            ("TOOLRANK_WEIGHT_AIWEEKLY", weights.aiweekly),
        ] {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("{name} must be a non-negative number, got {value}");
            }
        }

        let pending_stop_words = match lookup("TOOLRANK_PENDING_STOP_WORDS").as_deref() {
            Some("english") => true,
            // unset or anything else keeps every term
            _ => false,
        };

        Ok(Self {
            data_dir: lookup("TOOLRANK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            dict_path: lookup("TOOLRANK_DICT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./config/tools.toml")),
            genres_path: lookup("TOOLRANK_GENRES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./config/genres.toml")),
            db_path: lookup("TOOLRANK_DB_PATH").unwrap_or_else(|| "./toolrank.db".to_string()),
            decay_factor,
            thresholds,
            pending_limit: parse_or(&lookup, "TOOLRANK_PENDING_LIMIT", MAX_PENDING_TERMS)?,
            top_n: parse_or(&lookup, "TOOLRANK_TOP_N", TOP_N)?,
            weights,
            pending_stop_words,
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset or empty.
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        _ => Ok(default),
    }
}
