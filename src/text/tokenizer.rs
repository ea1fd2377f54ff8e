// Language-aware segmentation of cleaned text into word-like tokens.
//
// Space-delimited scripts are split on whitespace only, so "GPT-4" and
// "v6.1" stay whole. Runs of Japanese/Chinese script carry no spaces and are
// further segmented on Unicode word boundaries (UAX #29).

use unicode_segmentation::UnicodeSegmentation;

use super::MIN_WORD_LENGTH;

/// Coarse part-of-speech stand-in for a segmented token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// Contains at least one alphanumeric character.
    Word,
    /// Only hyphens/periods (what survives cleaning besides alphanumerics).
    Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub class: TokenClass,
}

impl<'a> Token<'a> {
    fn new(text: &'a str) -> Self {
        let class = if text.chars().any(char::is_alphanumeric) {
            TokenClass::Word
        } else {
            TokenClass::Symbol
        };
        Self { text, class }
    }

    /// Whether this token is kept for n-gram generation. Words and symbols
    /// are both kept; only length filters.
    pub fn is_kept(&self) -> bool {
        self.text.chars().count() >= MIN_WORD_LENGTH
    }
}

/// Scripts written without inter-word spaces.
fn is_unspaced_script(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}'   // Hiragana
        | '\u{30A0}'..='\u{30FF}' // Katakana
        | '\u{31F0}'..='\u{31FF}' // Katakana phonetic extensions
        | '\u{3400}'..='\u{4DBF}' // CJK extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
        | '\u{F900}'..='\u{FAFF}' // CJK compatibility ideographs
        | '\u{FF66}'..='\u{FF9F}' // Halfwidth katakana
    )
}

/// Segment cleaned text into every token, in original order.
pub fn segment(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();

    for chunk in text.split_whitespace() {
        if !chunk.chars().any(is_unspaced_script) {
            tokens.push(Token::new(chunk));
            continue;
        }

        // Split the chunk into script runs; only unspaced runs get
        // word-boundary segmentation.
        let mut run_start = 0;
        let mut run_unspaced = None;
        for (idx, c) in chunk.char_indices() {
            let unspaced = is_unspaced_script(c);
            match run_unspaced {
                Some(prev) if prev != unspaced => {
                    push_run(&chunk[run_start..idx], prev, &mut tokens);
                    run_start = idx;
                }
                _ => {}
            }
            run_unspaced = Some(unspaced);
        }
        if let Some(prev) = run_unspaced {
            push_run(&chunk[run_start..], prev, &mut tokens);
        }
    }

    tokens
}

fn push_run<'a>(run: &'a str, unspaced: bool, tokens: &mut Vec<Token<'a>>) {
    if unspaced {
        tokens.extend(
            run.split_word_bounds()
                .filter(|w| !w.trim().is_empty())
                .map(Token::new),
        );
    } else {
        tokens.push(Token::new(run));
    }
}

/// Segment and keep only tokens eligible for n-gram generation.
pub fn tokenize(text: &str) -> Vec<&str> {
    segment(text)
        .into_iter()
        .filter(Token::is_kept)
        .map(|t| t.text)
        .collect()
}
