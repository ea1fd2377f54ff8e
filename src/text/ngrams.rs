// Candidate generation: unigrams, bigrams and trigrams over the filtered
// token sequence, each passed through a validity filter.
//
// Output is lazy and not deduplicated. Frequency matters downstream.

use super::{MAX_CANDIDATE_LENGTH, MIN_WORD_LENGTH};

/// Largest n-gram size generated.
pub const MAX_NGRAM: usize = 3;

/// Check whether a candidate string is worth matching.
///
/// Rejects anything outside 3..=25 characters, purely numeric strings,
/// single repeated characters ("aaa") and strings with no alphanumeric.
pub fn is_valid_candidate(word: &str) -> bool {
    let normalized = word.trim().to_lowercase();
    let len = normalized.chars().count();

    if !(MIN_WORD_LENGTH..=MAX_CANDIDATE_LENGTH).contains(&len) {
        return false;
    }

    if normalized.chars().all(|c| c.is_numeric()) {
        return false;
    }

    let mut chars = normalized.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return false;
        }
    }

    normalized.chars().any(char::is_alphanumeric)
}

/// Lazily produce every valid candidate: all unigrams first, then all
/// bigrams, then all trigrams, each in token order.
pub fn candidates<'a, S: AsRef<str>>(tokens: &'a [S]) -> impl Iterator<Item = String> + 'a {
    (1..=MAX_NGRAM)
        .flat_map(move |n| tokens.windows(n))
        .map(|window| {
            window
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .join(" ")
        })
        .filter(|candidate| is_valid_candidate(candidate))
}
