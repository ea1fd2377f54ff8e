// Text cleaning ahead of tokenization.
//
// Hyphens and periods survive cleaning so versioned or compound product
// names ("GPT-4", "Claude-3.5", "v6.1") reach the tokenizer intact.

use std::sync::LazyLock;

use regex_lite::Regex;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// Strip HTML tags and URLs, replace every character that is not
/// alphanumeric, hyphen, period or whitespace with a space, then collapse
/// whitespace runs into single spaces.
///
/// Idempotent: `clean_text(&clean_text(x)) == clean_text(x)`.
pub fn clean_text(text: &str) -> String {
    let without_tags = HTML_TAG.replace_all(text, "");
    let without_urls = URL.replace_all(&without_tags, "");

    let filtered: String = without_urls
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}
