//! Kind 1337 snippet schema and read-only accessors.
//!
//! Accessors never fail: an absent tag is `None` (or an empty list) and the
//! caller picks its own display fallback. Only the title carries a built-in
//! fallback chain.

use crate::types::SnippetEvent;
use chrono::{DateTime, Utc};

/// Event kind for code snippets.
pub const KIND_CODE_SNIPPET: u16 = 1337;

pub const TAG_LANGUAGE: &str = "l";
pub const TAG_NAME: &str = "name";
pub const TAG_EXTENSION: &str = "extension";
pub const TAG_DESCRIPTION: &str = "description";
pub const TAG_RUNTIME: &str = "runtime";
pub const TAG_LICENSE: &str = "license";
pub const TAG_REPO: &str = "repo";
pub const TAG_DEPENDENCY: &str = "dep";
pub const TAG_CATEGORY: &str = "t";

/// Title shown when a snippet has neither a name nor a description.
pub const UNTITLED_SNIPPET: &str = "Untitled Snippet";

pub fn snippet_language(event: &SnippetEvent) -> Option<&str> {
    event.tag_value(TAG_LANGUAGE)
}

/// `name` tag, then `description`, then [`UNTITLED_SNIPPET`].
pub fn snippet_title(event: &SnippetEvent) -> &str {
    event
        .tag_value(TAG_NAME)
        .or_else(|| event.tag_value(TAG_DESCRIPTION))
        .unwrap_or(UNTITLED_SNIPPET)
}

pub fn snippet_extension(event: &SnippetEvent) -> Option<&str> {
    event.tag_value(TAG_EXTENSION)
}

pub fn snippet_description(event: &SnippetEvent) -> Option<&str> {
    event.tag_value(TAG_DESCRIPTION)
}

pub fn snippet_runtime(event: &SnippetEvent) -> Option<&str> {
    event.tag_value(TAG_RUNTIME)
}

pub fn snippet_license(event: &SnippetEvent) -> Option<&str> {
    event.tag_value(TAG_LICENSE)
}

pub fn snippet_repo(event: &SnippetEvent) -> Option<&str> {
    event.tag_value(TAG_REPO)
}

/// Every `dep` value in tag order. Duplicates are kept.
pub fn snippet_dependencies(event: &SnippetEvent) -> Vec<String> {
    event
        .tag_values(TAG_DEPENDENCY)
        .map(String::from)
        .collect()
}

/// Every `t` value, lowercased, in tag order.
pub fn snippet_tags(event: &SnippetEvent) -> Vec<String> {
    event
        .tag_values(TAG_CATEGORY)
        .map(str::to_lowercase)
        .collect()
}

/// Creation time as a UTC date. Out-of-range timestamps map to the epoch.
pub fn snippet_created_at(event: &SnippetEvent) -> DateTime<Utc> {
    i64::try_from(event.created_at)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_default()
}

pub fn snippet_code(event: &SnippetEvent) -> &str {
    &event.content
}

/// Values of every tag, name tag first. Body excluded.
pub(crate) fn tag_text(event: &SnippetEvent) -> Vec<&str> {
    let mut values: Vec<&str> = event.tag_value(TAG_NAME).into_iter().collect();
    for tag in &event.tags {
        if tag.first().map(String::as_str) == Some(TAG_NAME) {
            continue;
        }
        values.extend(tag.iter().skip(1).map(String::as_str));
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn snippet(tags: &[&[&str]], content: &str) -> SnippetEvent {
        SnippetEvent {
            id: "e1".to_string(),
            pubkey: "deadbeef".to_string(),
            kind: KIND_CODE_SNIPPET,
            created_at: 1_700_000_000,
            tags: tags
                .iter()
                .map(|t| t.iter().map(|s| s.to_string()).collect())
                .collect(),
            content: content.to_string(),
        }
    }

    #[test]
    fn quick_sort_accessors() {
        let ev = snippet(
            &[
                &["l", "python"],
                &["name", "Quick Sort"],
                &["t", "algorithm"],
                &["t", "sort"],
            ],
            "def quicksort(xs): ...",
        );

        assert_eq!(snippet_language(&ev), Some("python"));
        assert_eq!(snippet_title(&ev), "Quick Sort");
        assert_eq!(snippet_tags(&ev), vec!["algorithm", "sort"]);
        assert_eq!(snippet_code(&ev), "def quicksort(xs): ...");
    }

    #[test]
    fn title_falls_back_to_description_then_constant() {
        let described = snippet(&[&["description", "Sorts a list"]], "");
        assert_eq!(snippet_title(&described), "Sorts a list");

        let bare = snippet(&[], "");
        assert_eq!(snippet_title(&bare), "Untitled Snippet");
    }

    #[test]
    fn missing_tags_yield_none_or_empty() {
        let ev = snippet(&[], "x");
        assert_eq!(snippet_language(&ev), None);
        assert_eq!(snippet_extension(&ev), None);
        assert_eq!(snippet_runtime(&ev), None);
        assert_eq!(snippet_license(&ev), None);
        assert_eq!(snippet_repo(&ev), None);
        assert!(snippet_tags(&ev).is_empty());
        assert!(snippet_dependencies(&ev).is_empty());
    }

    #[test]
    fn dependencies_keep_order_and_duplicates() {
        let ev = snippet(&[&["dep", "serde"], &["dep", "tokio"], &["dep", "serde"]], "");
        assert_eq!(snippet_dependencies(&ev), vec!["serde", "tokio", "serde"]);
    }

    #[test]
    fn tags_are_lowercased() {
        let ev = snippet(&[&["t", "React"], &["t", "HOOKS"]], "");
        assert_eq!(snippet_tags(&ev), vec!["react", "hooks"]);
    }

    #[test]
    fn malformed_tag_without_value_is_skipped() {
        let ev = snippet(&[&["l"], &["t"], &["t", "ok"]], "");
        assert_eq!(snippet_language(&ev), None);
        assert_eq!(snippet_tags(&ev), vec!["ok"]);
    }

    #[test]
    fn created_at_converts_to_date() {
        let ev = snippet(&[], "");
        let date = snippet_created_at(&ev);
        assert_eq!(date.year(), 2023);
        assert_eq!(date.month(), 11);
    }
}
