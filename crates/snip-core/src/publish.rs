//! Snippet drafts: the publisher-side input turned into kind 1337 tags.
//!
//! Signing and relay transport live in `snip-relay`; this module only
//! validates the draft and lays out the tag list.

use crate::event::{
    TAG_CATEGORY, TAG_DEPENDENCY, TAG_DESCRIPTION, TAG_EXTENSION, TAG_LANGUAGE, TAG_LICENSE,
    TAG_NAME, TAG_REPO, TAG_RUNTIME,
};
use crate::language::{language_for_extension, normalize_language};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("snippet content is empty")]
    EmptyContent,
    #[error("invalid tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: String },
}

/// A snippet about to be published. Every field except `content` is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnippetDraft {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SnippetDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Language to publish: explicit value normalised, else guessed from the
    /// extension.
    pub fn effective_language(&self) -> Option<String> {
        match self.language.as_deref().map(str::trim) {
            Some(l) if !l.is_empty() => Some(normalize_language(l)),
            _ => self
                .extension
                .as_deref()
                .and_then(language_for_extension)
                .map(String::from),
        }
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        if self.content.trim().is_empty() {
            return Err(DraftError::EmptyContent);
        }
        if let Some(ref repo) = self.repo {
            let repo = repo.trim();
            if !repo.is_empty() && !repo.starts_with("http://") && !repo.starts_with("https://") {
                return Err(DraftError::InvalidTag {
                    tag: TAG_REPO.to_string(),
                    reason: format!("expected an http(s) URL, got '{}'", repo),
                });
            }
        }
        for tag in &self.tags {
            if tag.trim().chars().any(char::is_whitespace) {
                return Err(DraftError::InvalidTag {
                    tag: TAG_CATEGORY.to_string(),
                    reason: format!("category may not contain whitespace: '{}'", tag),
                });
            }
        }
        Ok(())
    }

    /// Tag list for the event, in a fixed order:
    /// `l`, `name`, `extension`, `description`, `runtime`, `license`, `repo`,
    /// then every `dep`, then every `t` (lowercased, de-duplicated).
    pub fn to_tags(&self) -> Result<Vec<Vec<String>>, DraftError> {
        self.validate()?;

        let mut tags = Vec::new();
        let mut push = |name: &str, value: Option<&str>| {
            if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
                tags.push(vec![name.to_string(), v.to_string()]);
            }
        };

        let language = self.effective_language();
        push(TAG_LANGUAGE, language.as_deref());
        push(TAG_NAME, self.title.as_deref());
        push(
            TAG_EXTENSION,
            self.extension.as_deref().map(|e| e.trim_start_matches('.')),
        );
        push(TAG_DESCRIPTION, self.description.as_deref());
        push(TAG_RUNTIME, self.runtime.as_deref());
        push(TAG_LICENSE, self.license.as_deref());
        push(TAG_REPO, self.repo.as_deref());
        for dep in &self.dependencies {
            push(TAG_DEPENDENCY, Some(dep.as_str()));
        }

        let mut categories: Vec<String> = Vec::new();
        for tag in &self.tags {
            let t = tag.trim().to_lowercase();
            if !t.is_empty() && !categories.contains(&t) {
                categories.push(t);
            }
        }
        for t in categories {
            tags.push(vec![TAG_CATEGORY.to_string(), t]);
        }

        Ok(tags)
    }
}
