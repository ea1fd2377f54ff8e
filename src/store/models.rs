// Row models that flow between pipeline stages and the snapshot store.
//
// Kept separate from the queries so the pipeline can use them without
// depending on rusqlite directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sources::SourceKind;

/// Maximum characters of source content kept on a processed row.
pub const EXCERPT_CHARS: usize = 500;

/// One source record that produced at least one entity match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRow {
    pub source_kind: SourceKind,
    pub weight: f64,
    pub content_excerpt: String,
    /// canonical name -> credited count
    pub matched_entities: BTreeMap<String, u32>,
    /// The source file the record came from.
    pub provenance: String,
}

impl ProcessedRow {
    pub fn new(
        source_kind: SourceKind,
        weight: f64,
        content: &str,
        matched_entities: BTreeMap<String, u32>,
        provenance: &str,
    ) -> Self {
        Self {
            source_kind,
            weight,
            content_excerpt: content.chars().take(EXCERPT_CHARS).collect(),
            matched_entities,
            provenance: provenance.to_string(),
        }
    }
}

/// A frequently seen candidate that matched no tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTerm {
    pub term: String,
    pub frequency: u64,
}

/// Cumulative score of one tool for one ISO week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyScore {
    pub week_id: String,
    pub tool: String,
    pub genre: String,
    pub score: f64,
}

/// One ranked slot of a genre leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub week_id: String,
    pub genre: String,
    pub rank: u32,
    pub tool: String,
    pub score: f64,
    pub is_new: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_is_capped_on_char_boundaries() {
        let content = "生".repeat(600);
        let row = ProcessedRow::new(SourceKind::Rss, 1.0, &content, BTreeMap::new(), "f.json");
        assert_eq!(row.content_excerpt.chars().count(), EXCERPT_CHARS);
    }

    #[test]
    fn short_content_is_kept_whole() {
        let row = ProcessedRow::new(SourceKind::Reddit, 1.0, "Claude", BTreeMap::new(), "f.json");
        assert_eq!(row.content_excerpt, "Claude");
    }
}
