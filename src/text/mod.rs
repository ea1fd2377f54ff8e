// Text-to-candidate stage: cleaning, segmentation, n-gram generation.

pub mod clean;
pub mod ngrams;
pub mod tokenizer;

pub use clean::clean_text;
pub use ngrams::{candidates, is_valid_candidate};
pub use tokenizer::tokenize;

/// Minimum character length for tokens and candidates.
pub const MIN_WORD_LENGTH: usize = 3;

/// Maximum character length for a candidate.
pub const MAX_CANDIDATE_LENGTH: usize = 25;
