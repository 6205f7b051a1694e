//! Topic → storage location mapping.

use std::sync::LazyLock;

use regex::Regex;

use notecraft_shared::CategoryRule;

/// Category used when no rule matches.
pub const DEFAULT_CATEGORY: &str = "misc";

/// Runs of characters that are not ASCII word characters or CJK ideographs.
static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9_\x{4e00}-\x{9fa5}]+").expect("slug regex")
});

/// The first category whose keywords occur in `topic` (case-insensitive).
pub fn category_for<'r>(topic: &str, rules: &'r [CategoryRule]) -> &'r str {
    let lower = topic.to_lowercase();
    rules
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
        })
        .map(|rule| rule.name.as_str())
        .unwrap_or(DEFAULT_CATEGORY)
}

/// File stem for a topic: lowercase, other characters collapsed to `-`.
pub fn topic_filename(topic: &str) -> String {
    let lower = topic.to_lowercase();
    let slug = NON_SLUG_RE.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug.to_string()
    }
}

/// Store-relative path of a topic's note: `<category>/<filename>.md`.
pub fn note_path(topic: &str, rules: &[CategoryRule]) -> String {
    format!("{}/{}.md", category_for(topic, rules), topic_filename(topic))
}
