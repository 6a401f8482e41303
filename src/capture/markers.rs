//! Inline `#tag` and `@location` markers in captured text.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#[\p{L}\p{N}]+(?::[\p{L}\p{N}]+)?(?:-[\p{L}\p{N}]+)?").expect("valid tag regex")
});
static LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[\p{L}0-9_-]+").expect("valid location regex"));
static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid ws regex"));

/// Tags in order of first appearance, each with its leading `#`.
pub fn tags(text: &str) -> Vec<String> {
    unique(TAG_RE.find_iter(text).map(|m| m.as_str()))
}

/// Locations in order of first appearance, each with its leading `@`.
pub fn locations(text: &str) -> Vec<String> {
    unique(LOCATION_RE.find_iter(text).map(|m| m.as_str()))
}

/// `text` with every marker removed and the gaps they leave collapsed.
pub fn strip(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, "");
    let without_locations = LOCATION_RE.replace_all(&without_tags, "");
    SPACES_RE
        .replace_all(&without_locations, " ")
        .trim()
        .to_string()
}

fn unique<'a>(found: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for marker in found {
        if !out.iter().any(|m| m == marker) {
            out.push(marker.to_string());
        }
    }
    out
}
