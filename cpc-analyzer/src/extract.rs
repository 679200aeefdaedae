//! HTML to plain text for the prompt.
//!
//! Deliberately regex based: script and style blocks go first, then every
//! remaining tag becomes a space, whitespace collapses, and the result is cut
//! to a character budget. Entities such as `&amp;` are left as written.

use regex::Regex;
use std::sync::LazyLock;

/// Character budget for the text sent to the model.
pub const MAX_TEXT_CHARS: usize = 8000;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
// Includes U+FEFF, which `\s` does not.
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\x{FEFF}]+").expect("valid regex"));

/// Strip markup from `html` and cap the result at [`MAX_TEXT_CHARS`].
pub fn extract_text(html: &str) -> String {
    extract_text_with_limit(html, MAX_TEXT_CHARS)
}

/// Same as [`extract_text`] with an explicit character budget.
///
/// ```
/// use cpc_analyzer::extract::extract_text_with_limit;
///
/// let html = "<html><style>p{}</style><p>Best  <b>credit</b>\ncards</p></html>";
/// assert_eq!(extract_text_with_limit(html, 100), "Best credit cards");
/// assert_eq!(extract_text_with_limit(html, 4), "Best");
/// ```
pub fn extract_text_with_limit(html: &str, max_chars: usize) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = TAG.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    let trimmed = text.trim();

    match trimmed.char_indices().nth(max_chars) {
        // A cut can land right after a space; drop it so a second pass is a no-op.
        Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_script_and_style_with_contents() {
        let html = r#"<head><STYLE type="text/css">
            body { color: red; }
        </STYLE><Script src="x.js"></script><script>
            var a = "<p>not text</p>";
        </SCRIPT></head><body><h1>Title</h1><p>Body text</p></body>"#;
        assert_eq!(extract_text(html), "Title Body text");
    }

    #[test]
    fn tags_become_separators() {
        assert_eq!(extract_text("one<br>two<div>three</div>"), "one two three");
    }

    #[test]
    fn keeps_entities_literally() {
        assert_eq!(
            extract_text("<p>Fish &amp; Chips&nbsp;&lt;3</p>"),
            "Fish &amp; Chips&nbsp;&lt;3"
        );
    }

    #[test]
    fn collapses_unicode_whitespace_and_trims() {
        assert_eq!(extract_text("  \n\ta\u{00a0}\u{2003} b \r\n "), "a b");
    }

    #[test]
    fn byte_order_mark_is_not_text() {
        assert_eq!(extract_text("\u{feff}<!doctype html><p>Hello</p>"), "Hello");
        assert_eq!(extract_text("\u{feff}Hello"), "Hello");
        assert_eq!(extract_text("a\u{feff}b"), "a b");
    }

    #[test]
    fn empty_and_markup_only_inputs_yield_empty() {
        assert_eq!(extract_text(""), "");
        assert_eq!(extract_text("<html><script>x()</script></html>"), "");
    }

    #[test]
    fn output_never_exceeds_budget() {
        let html = format!("<p>{}</p>", "word ".repeat(10_000));
        let out = extract_text(&html);
        assert!(out.chars().count() <= MAX_TEXT_CHARS);
        assert!(out.chars().count() >= MAX_TEXT_CHARS - 1);
    }

    #[test]
    fn budget_counts_characters_not_bytes() {
        let html = "é".repeat(MAX_TEXT_CHARS + 50);
        let out = extract_text(&html);
        assert_eq!(out.chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn is_idempotent_on_its_own_output() {
        let samples = [
            "<p>Hello <i>world</i></p>\n\n<footer>  ©  2025</footer>".to_string(),
            format!("<div>{}</div>", "ab ".repeat(5000)),
            format!("<div>{}</div>", "abcd ".repeat(3000)),
            "plain text already".to_string(),
        ];
        for html in samples {
            let once = extract_text(&html);
            assert_eq!(extract_text(&once), once);
        }
    }

    #[test]
    fn unterminated_script_is_treated_as_tags() {
        assert_eq!(extract_text("<script>alert(1) <p>after</p>"), "alert(1) after");
    }
}
