// Output formatting: colored terminal display of rankings and run reports.

pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Respects UTF-8 character boundaries, so tool names with accents or CJK
/// characters never split mid-character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(truncate_chars("Midjourney", 20), "Midjourney");
    }

    #[test]
    fn long_text_is_cut_on_char_boundaries() {
        assert_eq!(truncate_chars("画像生成モデル", 4), "画像生成...");
    }
}
