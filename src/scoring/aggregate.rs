// Score aggregation across a week and into the next.
//
// The weekly recurrence is:
//
//   final[e] = current[e] + previous[e] * decay
//
// where `current` sums count * source weight over the week's processed rows
// and `previous` is last week's stored final score. Only aggregation-eligible
// entities take part, and entities whose final score is not positive are
// dropped from the ledger.

use std::collections::{HashMap, HashSet};

use crate::dictionary::Dictionary;
use crate::store::models::{ProcessedRow, WeeklyScore};
use crate::week::WeekId;

pub type ScoreMap = HashMap<String, f64>;

/// This week's score per eligible entity: sum of `count * weight`.
pub fn current_scores(rows: &[ProcessedRow], dict: &Dictionary) -> ScoreMap {
    let mut scores = ScoreMap::new();
    for row in rows {
        for (entity, &count) in &row.matched_entities {
            if dict.aggregate_genre(entity).is_some() {
                *scores.entry(entity.clone()).or_insert(0.0) += f64::from(count) * row.weight;
            }
        }
    }
    scores
}

/// Merge this week's scores with last week's decayed scores.
///
/// With `decay == 0.0` the result equals `current` exactly. With
/// `decay == 1.0` an entity absent this week keeps its previous score.
pub fn merge_scores(
    current: &ScoreMap,
    previous: &[WeeklyScore],
    decay: f64,
    dict: &Dictionary,
) -> ScoreMap {
    let mut merged: ScoreMap = current.clone();

    if decay > 0.0 {
        for prev in previous {
            if dict.aggregate_genre(&prev.tool).is_some() {
                *merged.entry(prev.tool.clone()).or_insert(0.0) += prev.score * decay;
            }
        }
    }

    merged.retain(|_, score| *score > 0.0);
    merged
}

/// Entities scoring this week that were absent from last week's ledger.
pub fn new_entities(current: &ScoreMap, previous: &[WeeklyScore]) -> HashSet<String> {
    let known: HashSet<&str> = previous.iter().map(|p| p.tool.as_str()).collect();
    current
        .iter()
        .filter(|(tool, score)| **score > 0.0 && !known.contains(tool.as_str()))
        .map(|(tool, _)| tool.clone())
        .collect()
}

/// Ledger rows for `week`, in dictionary order.
pub fn to_weekly_scores(week: &WeekId, scores: &ScoreMap, dict: &Dictionary) -> Vec<WeeklyScore> {
    dict.entities()
        .iter()
        .filter(|e| e.aggregate)
        .filter_map(|e| {
            scores.get(&e.canonical_name).map(|&score| WeeklyScore {
                week_id: week.to_string(),
                tool: e.canonical_name.clone(),
                genre: e.genre.clone(),
                score,
            })
        })
        .collect()
}
