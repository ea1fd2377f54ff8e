// Entity matcher: resolves candidate n-grams to canonical tools.
//
// Each distinct candidate goes through an exact stage (hash lookup, double
// credit) and, on a miss, a fuzzy stage that scans every alias for the best
// Indel ratio. Entities marked `exact_only` never accept a
// fuzzy hit whose alias differs from the candidate.

pub mod pending;

use std::collections::{BTreeMap, HashMap};

use rapidfuzz::distance::indel;
use tracing::{debug, warn};

use crate::dictionary::{Dictionary, MatchMode};

/// Credit multiplier for an exact alias hit.
pub const EXACT_MATCH_BONUS: u32 = 2;

/// Fuzzy matches below this score (0-100) are ignored.
pub const MIN_FUZZY_SCORE: f64 = 90.0;

/// Accepted fuzzy matches below this score are flagged low-confidence.
pub const LOW_CONFIDENCE_SCORE: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    pub min_fuzzy_score: f64,
    pub low_confidence_score: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            min_fuzzy_score: MIN_FUZZY_SCORE,
            low_confidence_score: LOW_CONFIDENCE_SCORE,
        }
    }
}

/// What happened to one candidate string.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchDecision {
    /// Literal alias hit.
    Exact { entity: usize },
    /// Best alias scored at or above the fuzzy threshold.
    Fuzzy {
        entity: usize,
        alias: String,
        score: f64,
        low_confidence: bool,
    },
    /// Fuzzy hit on an `exact_only` entity with a differing alias.
    Rejected {
        entity: usize,
        alias: String,
        score: f64,
    },
    /// Nothing scored high enough.
    NoMatch { best_score: f64 },
}

impl MatchDecision {
    /// The entity credited by this decision, if any.
    pub fn credited_entity(&self) -> Option<usize> {
        match self {
            MatchDecision::Exact { entity } | MatchDecision::Fuzzy { entity, .. } => Some(*entity),
            _ => None,
        }
    }

    /// Credit awarded for `count` occurrences of the candidate.
    pub fn credit(&self, count: u32) -> u32 {
        match self {
            MatchDecision::Exact { .. } => count * EXACT_MATCH_BONUS,
            MatchDecision::Fuzzy { .. } => count,
            _ => 0,
        }
    }

    /// True when no alias came within the fuzzy threshold: a vocabulary gap.
    pub fn is_unknown(&self) -> bool {
        matches!(self, MatchDecision::NoMatch { .. })
    }
}

/// Similarity of two strings on a 0-100 scale.
///
/// Indel ratio: `(1 - indel / (len_a + len_b)) * 100`, where a substitution
/// costs one deletion plus one insertion. Compared per `char`.
pub fn similarity(a: &str, b: &str) -> f64 {
    indel::normalized_similarity(a.chars(), b.chars()) * 100.0
}

/// Matches accumulated over one record's candidates.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordMatches {
    /// canonical name -> credited count
    pub entities: BTreeMap<String, u32>,
    /// Unresolved candidates with their in-record frequency, first-seen order.
    pub unknown: Vec<(String, u32)>,
    pub low_confidence: usize,
    pub rejected: usize,
}

pub struct Matcher<'d> {
    dict: &'d Dictionary,
    thresholds: MatchThresholds,
}

impl<'d> Matcher<'d> {
    pub fn new(dict: &'d Dictionary, thresholds: MatchThresholds) -> Self {
        Self { dict, thresholds }
    }

    pub fn dictionary(&self) -> &Dictionary {
        self.dict
    }

    /// Decide a single candidate.
    pub fn decide(&self, candidate: &str) -> MatchDecision {
        if let Some(entity) = self.dict.resolve(candidate) {
            return MatchDecision::Exact { entity };
        }

        // Strictly-greater comparison keeps the first alias on ties.
        let mut best: Option<(usize, f64)> = None;
        for (i, alias) in self.dict.aliases().iter().enumerate() {
            let score = similarity(candidate, &alias.text);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }

        let Some((alias_idx, score)) = best else {
            return MatchDecision::NoMatch { best_score: 0.0 };
        };
        if score < self.thresholds.min_fuzzy_score {
            return MatchDecision::NoMatch { best_score: score };
        }

        let alias = &self.dict.aliases()[alias_idx];
        let entity = self.dict.entity(alias.entity);

        if entity.match_mode == MatchMode::ExactOnly && candidate != alias.text {
            return MatchDecision::Rejected {
                entity: alias.entity,
                alias: alias.text.clone(),
                score,
            };
        }

        MatchDecision::Fuzzy {
            entity: alias.entity,
            alias: alias.text.clone(),
            score,
            low_confidence: score < self.thresholds.low_confidence_score,
        }
    }

    /// Match every candidate of one record.
    ///
    /// Duplicates are frequency-counted first, so each distinct candidate is
    /// decided once and credited `count` (fuzzy) or `count * 2` (exact).
    pub fn match_record<S: AsRef<str>>(&self, candidates: &[S]) -> RecordMatches {
        let mut order: Vec<(&str, u32)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for candidate in candidates {
            let candidate = candidate.as_ref();
            match index.get(candidate).copied() {
                Some(i) => order[i].1 += 1,
                None => {
                    index.insert(candidate, order.len());
                    order.push((candidate, 1));
                }
            }
        }

        let mut result = RecordMatches::default();
        for (candidate, count) in order {
            let decision = self.decide(candidate);
            match &decision {
                MatchDecision::Fuzzy {
                    alias,
                    score,
                    low_confidence: true,
                    ..
                } => {
                    warn!(candidate, alias = %alias, score, "Low confidence fuzzy match");
                    result.low_confidence += 1;
                }
                MatchDecision::Rejected { alias, score, .. } => {
                    debug!(
                        candidate,
                        alias = %alias,
                        score,
                        "Exact match required, fuzzy hit rejected"
                    );
                    result.rejected += 1;
                }
                MatchDecision::NoMatch { .. } => {
                    result.unknown.push((candidate.to_string(), count));
                }
                _ => {}
            }

            if let Some(entity) = decision.credited_entity() {
                let name = &self.dict.entity(entity).canonical_name;
                *result.entities.entry(name.clone()).or_insert(0) += decision.credit(count);
            }
        }

        result
    }
}
