// Per-genre leaderboards.
//
// Candidates for a genre are collected in dictionary order and then
// stable-sorted by descending score, so equal scores keep dictionary order.

use std::collections::HashSet;

use tracing::debug;

use super::aggregate::ScoreMap;
use crate::dictionary::Dictionary;
use crate::store::models::RankingEntry;
use crate::week::WeekId;

/// Default number of ranked entries per genre.
pub const TOP_N: usize = 3;

/// Rank the top `top_n` entities of every genre, in genre-list order.
/// Genres with no scoring entity are omitted.
pub fn rank_genres(
    week: &WeekId,
    scores: &ScoreMap,
    new_entities: &HashSet<String>,
    dict: &Dictionary,
    genres: &[String],
    top_n: usize,
) -> Vec<RankingEntry> {
    let mut rankings = Vec::new();

    for genre in genres {
        let mut candidates: Vec<(&str, f64)> = dict
            .entities()
            .iter()
            .filter(|e| e.aggregate && &e.genre == genre)
            .filter_map(|e| {
                scores
                    .get(&e.canonical_name)
                    .filter(|&&s| s > 0.0)
                    .map(|&s| (e.canonical_name.as_str(), s))
            })
            .collect();

        if candidates.is_empty() {
            debug!(genre = %genre, "No tools scored for genre");
            continue;
        }

        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (i, (tool, score)) in candidates.into_iter().take(top_n).enumerate() {
            rankings.push(RankingEntry {
                week_id: week.to_string(),
                genre: genre.clone(),
                rank: (i + 1) as u32,
                tool: tool.to_string(),
                score,
                is_new: new_entities.contains(tool),
            });
        }
    }

    rankings
}
