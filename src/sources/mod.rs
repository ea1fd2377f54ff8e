// Source adapters: turn one raw collector record into a flat text blob.
//
// Source kinds are a closed set. Each kind has one adapter that knows the
// structural fingerprint of its records and how to flatten them. Detection
// walks the adapters in a fixed order and takes the first fingerprint hit,
// so adding a source means adding a variant and an adapter.

pub mod aiweekly;
pub mod discover;
pub mod reddit;
pub mod rss;
pub mod youtube;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Reddit,
    Youtube,
    Rss,
    Aiweekly,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Reddit,
        SourceKind::Youtube,
        SourceKind::Rss,
        SourceKind::Aiweekly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Reddit => "reddit",
            SourceKind::Youtube => "youtube",
            SourceKind::Rss => "rss",
            SourceKind::Aiweekly => "aiweekly",
        }
    }

    /// The adapter that flattens records of this kind.
    pub fn adapter(&self) -> &'static dyn SourceAdapter {
        match self {
            SourceKind::Reddit => &reddit::RedditAdapter,
            SourceKind::Youtube => &youtube::YoutubeAdapter,
            SourceKind::Rss => &rss::RssAdapter,
            SourceKind::Aiweekly => &aiweekly::AiWeeklyAdapter,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reddit" => Ok(SourceKind::Reddit),
            "youtube" => Ok(SourceKind::Youtube),
            "rss" => Ok(SourceKind::Rss),
            "aiweekly" => Ok(SourceKind::Aiweekly),
            other => anyhow::bail!("unknown source kind: {other}"),
        }
    }
}

/// Per-kind structural fingerprint and text extraction.
pub trait SourceAdapter: Sync {
    fn kind(&self) -> SourceKind;

    /// Whether the record carries this kind's distinguishing keys.
    fn matches(&self, record: &Map<String, Value>) -> bool;

    /// Flatten the record into one text blob. Missing leaf fields count as
    /// empty strings; malformed containers are a `CorruptRecordPayload`.
    fn extract(&self, record: &Map<String, Value>) -> Result<String, PipelineError>;
}

/// Fingerprint precedence. Newsletter records also carry a `summary`, so the
/// aiweekly check must run before the bare-summary rss fallback.
const DETECTION_ORDER: [SourceKind; 4] = [
    SourceKind::Reddit,
    SourceKind::Youtube,
    SourceKind::Aiweekly,
    SourceKind::Rss,
];

/// Classify a raw record by structural fingerprinting.
pub fn detect(record: &Value) -> Result<SourceKind, PipelineError> {
    let Some(obj) = record.as_object() else {
        return Err(PipelineError::UnrecognizedSourceFormat { keys: Vec::new() });
    };

    DETECTION_ORDER
        .into_iter()
        .find(|kind| kind.adapter().matches(obj))
        .ok_or_else(|| PipelineError::UnrecognizedSourceFormat {
            keys: obj.keys().cloned().collect(),
        })
}

/// Detect the kind and extract its text in one step.
pub fn extract(record: &Value) -> Result<(SourceKind, String), PipelineError> {
    let kind = detect(record)?;
    // detect() only succeeds on objects
    let obj = record.as_object().ok_or(PipelineError::UnrecognizedSourceFormat {
        keys: Vec::new(),
    })?;
    let text = kind.adapter().extract(obj)?;
    Ok((kind, text))
}

/// Per-kind weights applied to matched counts during aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceWeights {
    pub reddit: f64,
    pub youtube: f64,
    pub rss: f64,
    pub aiweekly: f64,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            reddit: 1.0,
            youtube: 1.0,
            rss: 1.0,
            aiweekly: 1.0,
        }
    }
}

impl SourceWeights {
    pub fn weight(&self, kind: SourceKind) -> f64 {
        match kind {
            SourceKind::Reddit => self.reddit,
            SourceKind::Youtube => self.youtube,
            SourceKind::Rss => self.rss,
            SourceKind::Aiweekly => self.aiweekly,
        }
    }
}

// --- JSON helpers shared by the adapters ---

/// A string field, or "" when missing or not a string.
fn text_field<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a str {
    obj.get(key).and_then(Value::as_str).unwrap_or("")
}

/// An array field. Missing or null is an empty slice; any other type is corrupt.
fn array_field<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    kind: SourceKind,
) -> Result<&'a [Value], PipelineError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(corrupt(kind, format!("'{key}' is not an array"))),
    }
}

/// An object field. Missing or null is `None`; any other type is corrupt.
fn object_field<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    kind: SourceKind,
) -> Result<Option<&'a Map<String, Value>>, PipelineError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(corrupt(kind, format!("'{key}' is not an object"))),
    }
}

fn as_object<'a>(
    value: &'a Value,
    what: &str,
    kind: SourceKind,
) -> Result<&'a Map<String, Value>, PipelineError> {
    value
        .as_object()
        .ok_or_else(|| corrupt(kind, format!("{what} is not an object")))
}

fn corrupt(kind: SourceKind, reason: String) -> PipelineError {
    PipelineError::CorruptRecordPayload { kind, reason }
}

/// Join non-empty parts with single spaces.
fn join_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
