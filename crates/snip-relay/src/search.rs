//! Snippet search across NIP-50 relays and plain relays.
//!
//! Candidate relays are probed concurrently and split in two. Search-capable
//! relays get the free-text query as a NIP-50 `search` field; the rest get a
//! structural-only query whose results are matched locally. Both branches run
//! concurrently, each bounded by the query timeout, and their results are
//! merged, de-duplicated and only then truncated to the requested limit.

use nostr_sdk::prelude::*;
use snip_core::{merge_branches, normalize_language, SearchFilter, SearchResult, SnippetEvent};
use tracing::{debug, info};

use crate::client::{validate_relays, SnippetClient};
use crate::convert::{parse_pubkey, snippet_from_event, snippet_kind};
use crate::error::SnippetError;

/// A search filter with author and language in canonical form.
#[derive(Debug, Clone)]
struct NormalizedQuery {
    filter: SearchFilter,
    author: Option<PublicKey>,
}

impl NormalizedQuery {
    /// Author must parse (hex or npub); language and tags are normalised
    /// permissively.
    fn new(filter: &SearchFilter) -> Result<Self, SnippetError> {
        let author = filter
            .author
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(parse_pubkey)
            .transpose()?;

        let language = filter
            .language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(normalize_language);

        let mut tags: Vec<String> = Vec::new();
        for tag in &filter.tags {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Ok(Self {
            filter: SearchFilter {
                query: filter.query.trim().to_string(),
                language,
                tags,
                author: author.map(|pk| pk.to_hex()),
                limit: filter.limit,
            },
            author,
        })
    }

    /// Relay filter carrying only the structural constraints.
    fn structural(&self, fetch_limit: usize) -> Filter {
        let mut filter = Filter::new().kind(snippet_kind()).limit(fetch_limit);
        if let Some(author) = self.author {
            filter = filter.author(author);
        }
        if let Some(ref language) = self.filter.language {
            filter = filter.custom_tag(SingleLetterTag::lowercase(Alphabet::L), language.as_str());
        }
        if !self.filter.tags.is_empty() {
            filter = filter.hashtags(self.filter.tags.iter().map(String::as_str));
        }
        filter
    }

    /// Structural filter plus the NIP-50 `search` field when there is a query.
    fn with_search(&self, fetch_limit: usize) -> Filter {
        let filter = self.structural(fetch_limit);
        if self.filter.has_query() {
            filter.search(self.filter.query.as_str())
        } else {
            filter
        }
    }

    fn keep(&self, events: Vec<Event>) -> Vec<SnippetEvent> {
        events
            .iter()
            .map(snippet_from_event)
            .filter(|e| self.filter.matches_structure(e))
            .collect()
    }
}

impl SnippetClient {
    /// Search kind 1337 snippets.
    ///
    /// Fails only on invalid input or when no candidate relay can be resolved;
    /// relay and branch failures contribute nothing instead of failing.
    pub async fn search(
        &self,
        filter: &SearchFilter,
        extra_relays: &[String],
    ) -> Result<SearchResult, SnippetError> {
        let query = NormalizedQuery::new(filter)?;
        let extras = validate_relays(extra_relays)?;

        let candidates = self
            .resolver
            .search_candidates(self.identity.as_ref(), &extras)
            .await;
        if candidates.is_empty() {
            return Err(SnippetError::NoSearchRelays);
        }

        let (capable, fallback) = self.prober.partition(&candidates).await;
        info!(
            "Searching {} relay(s): {} with NIP-50, {} with local matching",
            candidates.len(),
            capable.len(),
            fallback.len()
        );

        let (from_capable, from_fallback) = tokio::join!(
            self.capable_branch(&capable, &query),
            self.fallback_branch(&fallback, &query),
        );
        debug!(
            "Branch results: {} capable, {} fallback",
            from_capable.len(),
            from_fallback.len()
        );

        let snippets = merge_branches(from_capable, from_fallback, query.filter.limit);
        self.store.insert_all(snippets.iter().cloned());

        Ok(SearchResult {
            snippets,
            relays_searched: candidates,
            search_capable: capable,
        })
    }

    async fn capable_branch(&self, relays: &[String], query: &NormalizedQuery) -> Vec<SnippetEvent> {
        if relays.is_empty() {
            return Vec::new();
        }
        let events = self
            .query_bounded(relays, query.with_search(self.fetch_limit))
            .await;
        query.keep(events)
    }

    async fn fallback_branch(&self, relays: &[String], query: &NormalizedQuery) -> Vec<SnippetEvent> {
        if relays.is_empty() {
            return Vec::new();
        }
        let events = self
            .query_bounded(relays, query.structural(self.fetch_limit))
            .await;
        let candidates = query.keep(events);
        self.matcher.apply(&candidates, &query.filter.query)
    }
}
