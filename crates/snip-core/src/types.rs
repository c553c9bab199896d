//! Core types shared by the search, listing and publish paths.

use crate::language::normalize_language;
use serde::{Deserialize, Serialize};

/// NIP number a relay advertises when it supports server-side full-text search.
pub const SEARCH_NIP: u16 = 50;

/// A code snippet record in a nostr-sdk–independent shape.
///
/// Mirrors the wire event: `tags` keeps every tag verbatim with the tag name
/// as the first element, so repeated names (`t`, `dep`) and unknown tags
/// survive the conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnippetEvent {
    /// Event id (hex of the SHA-256 content hash).
    pub id: String,
    /// Author public key (hex).
    pub pubkey: String,
    /// Event kind, 1337 for snippets.
    pub kind: u16,
    /// Unix timestamp of creation.
    pub created_at: u64,
    /// Tags as ordered string lists, first element is the tag name.
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
    /// The code body.
    pub content: String,
}

impl SnippetEvent {
    /// First value of the first tag named `name`.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.first().map(String::as_str) == Some(name))
            .and_then(|t| t.get(1))
            .map(String::as_str)
    }

    /// First value of every tag named `name`, in tag order.
    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |t| t.first().map(String::as_str) == Some(name))
            .filter_map(|t| t.get(1))
            .map(String::as_str)
    }
}

/// Free-text query plus structural constraints.
///
/// Built once per search and handed by reference to both the capable and the
/// fallback branch so their results are comparable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchFilter {
    /// Free-text query. Blank means "no text constraint".
    pub query: String,
    /// Language constraint, matched against the `l` tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Category constraints, matched against `t` tags (any of).
    #[serde(default)]
    pub tags: Vec<String>,
    /// Author constraint (npub or hex before normalisation, hex after).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Maximum number of merged results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl SearchFilter {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when the free-text part is blank.
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Client-side check of the structural constraints.
    ///
    /// Relays are free to ignore tag filters they do not index, so records
    /// from either branch are re-checked here. Expects a normalised filter
    /// (hex author, canonical language).
    pub fn matches_structure(&self, event: &SnippetEvent) -> bool {
        if event.kind != crate::event::KIND_CODE_SNIPPET {
            return false;
        }
        if let Some(ref author) = self.author {
            if !event.pubkey.eq_ignore_ascii_case(author) {
                return false;
            }
        }
        if let Some(ref language) = self.language {
            match event.tag_value(crate::event::TAG_LANGUAGE) {
                Some(l)
                    if normalize_language(l).eq_ignore_ascii_case(&normalize_language(language)) => {}
                _ => return false,
            }
        }
        if !self.tags.is_empty() {
            let wanted: Vec<String> = self.tags.iter().map(|t| t.to_lowercase()).collect();
            let found = event
                .tag_values(crate::event::TAG_CATEGORY)
                .any(|t| wanted.contains(&t.to_lowercase()));
            if !found {
                return false;
            }
        }
        true
    }
}

/// Merged outcome of a search, with provenance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// Matched records, unique by id.
    pub snippets: Vec<SnippetEvent>,
    /// Every relay the search was sent to.
    pub relays_searched: Vec<String>,
    /// The subset confirmed to support server-side search.
    pub search_capable: Vec<String>,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

/// Whether a relay supports the search extension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Supported,
    Unsupported,
    /// Not probed yet, or the probe failed. Treated as unsupported.
    #[default]
    Unknown,
}

impl Capability {
    pub fn is_supported(self) -> bool {
        matches!(self, Capability::Supported)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Supported => write!(f, "supported"),
            Capability::Unsupported => write!(f, "unsupported"),
            Capability::Unknown => write!(f, "unknown"),
        }
    }
}

/// NIP-11 relay information document, reduced to the fields used here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayInformation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub supported_nips: Vec<u16>,
}

impl RelayInformation {
    pub fn supports_search(&self) -> bool {
        self.supported_nips.contains(&SEARCH_NIP)
    }
}

/// A relay address plus what was observed about it during this run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayDescriptor {
    pub url: String,
    pub search: Capability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub supported_nips: Vec<u16>,
}

impl RelayDescriptor {
    pub fn unknown(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            search: Capability::Unknown,
            name: None,
            supported_nips: Vec::new(),
        }
    }

    pub fn from_information(url: impl Into<String>, info: RelayInformation) -> Self {
        let search = if info.supports_search() {
            Capability::Supported
        } else {
            Capability::Unsupported
        };
        Self {
            url: url.into(),
            search,
            name: info.name,
            supported_nips: info.supported_nips,
        }
    }
}
