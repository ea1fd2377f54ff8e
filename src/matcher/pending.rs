// Unknown-term mining for dictionary curation.
//
// Counts every unresolved candidate across the whole run and keeps the top-K
// by frequency. Ties keep first-seen order.

use std::collections::{HashMap, HashSet};

use stop_words::{get, LANGUAGE};

use crate::store::models::PendingTerm;

/// Default number of unknown terms kept per run.
pub const MAX_PENDING_TERMS: usize = 150;

#[derive(Debug, Default)]
pub struct PendingMiner {
    counts: Vec<(String, u64)>,
    index: HashMap<String, usize>,
    stop_words: Option<HashSet<String>>,
}

impl PendingMiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude English stop words from the observations.
    pub fn with_english_stop_words(mut self) -> Self {
        let words: Vec<String> = get(LANGUAGE::English);
        self.stop_words = Some(words.into_iter().collect());
        self
    }

    /// Record `count` occurrences of an unresolved term.
    pub fn observe(&mut self, term: &str, count: u64) {
        if let Some(stop) = &self.stop_words {
            if stop.contains(&term.to_lowercase()) {
                return;
            }
        }
        match self.index.get(term).copied() {
            Some(i) => self.counts[i].1 += count,
            None => {
                self.index.insert(term.to_string(), self.counts.len());
                self.counts.push((term.to_string(), count));
            }
        }
    }

    /// Number of distinct terms observed.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// The `limit` most frequent terms.
    pub fn top(&self, limit: usize) -> Vec<PendingTerm> {
        let mut sorted: Vec<&(String, u64)> = self.counts.iter().collect();
        // sort_by is stable, so equal frequencies keep first-seen order
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
            .into_iter()
            .take(limit)
            .map(|(term, frequency)| PendingTerm {
                term: term.clone(),
                frequency: *frequency,
            })
            .collect()
    }
}
