//! Turn a free-text completion into a [`RawAnalysis`].
//!
//! Models wrap JSON in Markdown fences and add commentary around it. Fences
//! are removed, then the slice from the first `{` to the last `}` is parsed.
//! The brace scan does not understand strings, so a stray `}` in trailing
//! prose widens the slice and fails the parse rather than being repaired.
//!
//! Only JSON syntax is checked, plus the top level being an object. Field
//! types are left to [`KeywordAnalysis`](crate::types::KeywordAnalysis).

use crate::types::RawAnalysis;
use regex::Regex;
use std::sync::LazyLock;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```json\s*").expect("valid regex"));
static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```\s*").expect("valid regex"));

/// The completion could not be read as the expected JSON object.
#[derive(Debug, thiserror::Error)]
#[error("AI response parse error: {source}")]
pub struct ParseFailure {
    /// Fence-stripped completion, for server-side diagnostics only.
    pub cleaned: String,
    #[source]
    pub source: serde_json::Error,
}

/// Remove Markdown code-fence markers and trim.
pub fn strip_code_fences(text: &str) -> String {
    let text = JSON_FENCE.replace_all(text, "");
    let text = FENCE.replace_all(&text, "");
    text.trim().to_string()
}

/// Slice from the first `{` to the last `}`, or the whole text if either is missing.
///
/// ```
/// use cpc_analyzer::normalize::isolate_json_object;
///
/// assert_eq!(isolate_json_object("Sure! {\"a\": {}} Hope it helps."), "{\"a\": {}}");
/// assert_eq!(isolate_json_object("no braces"), "no braces");
/// assert_eq!(isolate_json_object("} backwards {"), "");
/// ```
pub fn isolate_json_object(cleaned: &str) -> &str {
    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if end >= start => &cleaned[start..=end],
        (Some(_), Some(_)) => "",
        _ => cleaned,
    }
}

pub fn normalize_completion(text: &str) -> Result<RawAnalysis, ParseFailure> {
    let cleaned = strip_code_fences(text);
    let candidate = isolate_json_object(&cleaned);
    match serde_json::from_str::<RawAnalysis>(candidate) {
        Ok(analysis) => Ok(analysis),
        Err(source) => Err(ParseFailure { cleaned, source }),
    }
}
