//! Code snippet records, accessors, local matching and merge logic for snipstr.
//!
//! This crate is the network-free half of snipstr. Snippets travel as kind
//! 1337 Nostr events; here they are handled through a generic tag-based
//! record (`SnippetEvent`) so the matching, merging and accessor logic can be
//! exercised without a relay pool. `snip-relay` converts to and from the
//! concrete nostr-sdk types.

pub mod config;
pub mod event;
pub mod language;
pub mod matcher;
pub mod merge;
pub mod publish;
pub mod relay_url;
pub mod types;

pub use config::{ConfigError, SearchSettings, SignerConfig, SnippetConfig, Timeouts};
pub use event::{
    snippet_code, snippet_created_at, snippet_dependencies, snippet_description, snippet_extension,
    snippet_language, snippet_license, snippet_repo, snippet_runtime, snippet_tags,
    snippet_title, KIND_CODE_SNIPPET, UNTITLED_SNIPPET,
};
pub use language::{language_for_extension, normalize_language};
pub use matcher::{substring_matches, FuzzyIndex, LocalMatcher, MatchStrategy};
pub use merge::{merge_branches, sort_newest_first};
pub use publish::{DraftError, SnippetDraft};
pub use relay_url::{dedup_relays, normalize_relay_url, RelayUrlError};
pub use types::{
    Capability, RelayDescriptor, RelayInformation, SearchFilter, SearchResult, SnippetEvent,
    SEARCH_NIP,
};
