//! Markup stripping and whitespace normalisation for raw queries.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*(script|style)[^>]*>.*?<\s*/\s*(script|style)\s*>")
        .expect("script block pattern is valid")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Clean user input before any further processing.
///
/// `<script>` and `<style>` blocks are removed wholly (content included);
/// any remaining tags are stripped keeping their inner text; whitespace runs
/// collapse to a single space and the result is trimmed.
pub fn sanitize(text: &str) -> String {
    let without_blocks = SCRIPT_BLOCK.replace_all(text, " ");
    let without_tags = TAG.replace_all(&without_blocks, " ");
    WHITESPACE.replace_all(&without_tags, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize("What is diabetes?"), "What is diabetes?");
    }

    #[test]
    fn script_blocks_are_removed_with_their_content() {
        let input = "hello <script>alert('xss')</script> world";
        assert_eq!(sanitize(input), "hello world");
    }

    #[test]
    fn remaining_tags_keep_inner_text() {
        assert_eq!(sanitize("<b>bold</b> question"), "bold question");
    }

    #[test]
    fn whitespace_is_collapsed_and_trimmed() {
        assert_eq!(sanitize("  what \n\t is   asthma  "), "what is asthma");
    }

    #[test]
    fn markup_only_input_becomes_empty() {
        assert_eq!(sanitize("<div><span></span></div>"), "");
    }
}
