// Text pipeline tests: cleaning, tokenization and candidate generation.
//
// Exercises the public text API as the preprocessor chains it:
//   clean_text -> tokenize -> candidates

use toolrank::text::{candidates, clean_text, is_valid_candidate, tokenize};

fn pipeline(raw: &str) -> Vec<String> {
    let cleaned = clean_text(raw);
    let tokens = tokenize(&cleaned);
    candidates(&tokens).collect()
}

// ============================================================
// Cleaning
// ============================================================

#[test]
fn cleaning_is_idempotent() {
    let inputs = [
        "<div class=\"post\">GPT-4o vs. Claude 3.5 Sonnet!!!</div>",
        "Check https://example.com/a?b=c and http://x.y | now",
        "  tabs\tand\nnewlines  ",
        "生成AI「Midjourney v6.1」が話題 #AI @user",
        "",
        "---...---",
    ];
    for input in inputs {
        let once = clean_text(input);
        assert_eq!(clean_text(&once), once, "not idempotent for {input:?}");
    }
}

#[test]
fn versioned_names_survive_cleaning() {
    let cleaned = clean_text("<li>Released: GPT-4.1, Veo-3 & Flux (v1.1)</li>");
    assert_eq!(cleaned, "Released GPT-4.1 Veo-3 Flux v1.1");
}

// ============================================================
// Tokens and candidates
// ============================================================

#[test]
fn short_tokens_are_dropped_before_ngrams() {
    let tokens = tokenize("Try GPT-4 at today");
    assert_eq!(tokens, vec!["Try", "GPT-4", "today"]);
}

#[test]
fn ngrams_follow_the_filtered_sequence() {
    // "is" is filtered out, so "Claude great" is a bigram.
    let cands = pipeline("Claude is great");
    assert_eq!(cands, vec!["Claude", "great", "Claude great"]);
}

#[test]
fn unigrams_then_bigrams_then_trigrams() {
    let cands = pipeline("Try GPT-4 today");
    assert_eq!(
        cands,
        vec![
            "Try",
            "GPT-4",
            "today",
            "Try GPT-4",
            "GPT-4 today",
            "Try GPT-4 today",
        ]
    );
}

#[test]
fn candidates_are_not_deduplicated() {
    let cands = pipeline("sora sora sora");
    assert_eq!(cands.iter().filter(|c| *c == "sora").count(), 3);
}

#[test]
fn every_candidate_passes_the_validity_rules() {
    let raw = "Midjourney 2025 aaaa v6.1 --- stable diffusion XL turbo 12345 \
               a-very-long-compound-product-name-that-overflows ok";
    for cand in pipeline(raw) {
        let len = cand.chars().count();
        assert!((3..=25).contains(&len), "{cand:?} has length {len}");
        assert!(!cand.chars().all(char::is_numeric), "{cand:?} is numeric");
        assert!(cand.chars().any(char::is_alphanumeric), "{cand:?} has no alphanumeric");
        let first = cand.chars().next().unwrap();
        assert!(!cand.chars().all(|c| c == first), "{cand:?} is one repeated char");
        assert!(is_valid_candidate(&cand));
    }
}

#[test]
fn long_trigrams_are_filtered_out() {
    let cands = pipeline("multimodal orchestration frameworks");
    assert!(cands.contains(&"multimodal orchestration".to_string()));
    // 35 characters
    assert!(!cands.contains(&"multimodal orchestration frameworks".to_string()));
}
