//! Listing an author's snippets and fetching one snippet by id.

use nostr_sdk::prelude::*;
use snip_core::{sort_newest_first, SnippetEvent, KIND_CODE_SNIPPET};
use tracing::debug;

use crate::client::{validate_relays, SnippetClient};
use crate::convert::{parse_event_id, parse_pubkey, snippet_from_event, snippet_kind};
use crate::error::SnippetError;

impl SnippetClient {
    /// Snippets published by `author` (npub or hex), newest first.
    ///
    /// Looks on the default relays, the author's NIP-65 outbox and `extra_relays`.
    pub async fn list_by_author(
        &self,
        author: &str,
        limit: Option<usize>,
        extra_relays: &[String],
    ) -> Result<Vec<SnippetEvent>, SnippetError> {
        let author = parse_pubkey(author)?;
        let extras = validate_relays(extra_relays)?;

        let relays = self.resolver.author_relays(&author, &extras).await;
        if relays.is_empty() {
            return Err(SnippetError::NoRelays {
                operation: "list snippets",
            });
        }

        let filter = Filter::new()
            .kind(snippet_kind())
            .author(author)
            .limit(limit.unwrap_or(self.fetch_limit));
        let author_hex = author.to_hex();

        let mut snippets: Vec<SnippetEvent> = Vec::new();
        for event in self.query_bounded(&relays, filter).await {
            let snippet = snippet_from_event(&event);
            if snippet.kind == KIND_CODE_SNIPPET
                && snippet.pubkey == author_hex
                && !snippets.iter().any(|s| s.id == snippet.id)
            {
                snippets.push(snippet);
            }
        }
        sort_newest_first(&mut snippets);
        if let Some(limit) = limit {
            snippets.truncate(limit);
        }

        debug!("Listed {} snippet(s) for {author_hex}", snippets.len());
        self.store.insert_all(snippets.iter().cloned());
        Ok(snippets)
    }

    /// Snippets published by the client identity.
    pub async fn list_own(
        &self,
        limit: Option<usize>,
        extra_relays: &[String],
    ) -> Result<Vec<SnippetEvent>, SnippetError> {
        let identity = self.identity.ok_or(SnippetError::NoSigner)?;
        self.list_by_author(&identity.to_hex(), limit, extra_relays)
            .await
    }

    /// One snippet by event id (hex or note1). The local store is consulted
    /// first; `Ok(None)` means no relay had it.
    pub async fn fetch_by_id(
        &self,
        id: &str,
        extra_relays: &[String],
    ) -> Result<Option<SnippetEvent>, SnippetError> {
        let event_id = parse_event_id(id)?;
        let extras = validate_relays(extra_relays)?;

        let id_hex = event_id.to_hex();
        if let Some(hit) = self.store.get(&id_hex) {
            debug!("Snippet {id_hex} served from store");
            return Ok(Some(hit));
        }

        let relays = self
            .resolver
            .read_relays(self.identity.as_ref(), &extras)
            .await;
        if relays.is_empty() {
            return Err(SnippetError::NoRelays {
                operation: "fetch a snippet",
            });
        }

        let filter = Filter::new().id(event_id).kind(snippet_kind()).limit(1);
        let found = self
            .query_bounded(&relays, filter)
            .await
            .iter()
            .find(|e| e.id == event_id)
            .map(snippet_from_event);

        if let Some(ref snippet) = found {
            self.store.insert(snippet.clone());
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{relay_list_event, snippet_event, MockPool, Probe};
    use crate::resolver::KIND_RELAY_LIST;
    use snip_core::SnippetConfig;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    const R: &str = "wss://r.example";
    const INDEX: &str = "wss://index.example";
    const OUTBOX: &str = "wss://outbox.example";

    fn config(relays: &[&str], index: &[&str]) -> SnippetConfig {
        SnippetConfig {
            relays: relays.iter().map(|s| s.to_string()).collect(),
            search_relays: vec![],
            index_relays: index.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn lists_author_snippets_from_outbox_newest_first() {
        let author = Keys::generate();
        let stranger = Keys::generate();
        let old = snippet_event(&author, "old", &[], 10);
        let new = snippet_event(&author, "new", &[], 20);
        let foreign = snippet_event(&stranger, "foreign", &[], 30);
        let list = relay_list_event(
            &author,
            KIND_RELAY_LIST,
            vec![vec!["r".into(), OUTBOX.into(), "write".into()]],
        );
        let pool = Arc::new(
            MockPool::new()
                .relay(INDEX, Probe::Fail, vec![list])
                .relay(R, Probe::Fail, vec![old.clone()])
                .relay(OUTBOX, Probe::Fail, vec![new.clone(), foreign]),
        );
        let client = SnippetClient::new(pool.clone(), Arc::default(), &config(&[R], &[INDEX])).unwrap();

        let listed = client
            .list_by_author(&author.public_key().to_bech32().unwrap(), None, &[])
            .await
            .unwrap();
        let ids: Vec<String> = listed.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec![new.id.to_hex(), old.id.to_hex()]);

        let limited = client
            .list_by_author(&author.public_key().to_hex(), Some(1), &[])
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn list_rejects_bad_author_and_empty_relays() {
        let pool = Arc::new(MockPool::new());
        let client = SnippetClient::new(pool.clone(), Arc::default(), &config(&[], &[])).unwrap();
        assert!(matches!(
            client.list_by_author("bogus", None, &[]).await,
            Err(SnippetError::InvalidPubkey { .. })
        ));
        let author = Keys::generate().public_key().to_hex();
        assert!(matches!(
            client.list_by_author(&author, None, &[]).await,
            Err(SnippetError::NoRelays { .. })
        ));
        assert!(matches!(
            client.list_own(None, &[]).await,
            Err(SnippetError::NoSigner)
        ));
        assert_eq!(pool.network_calls(), 0);
    }

    #[tokio::test]
    async fn fetch_by_id_hits_relays_then_store() {
        let keys = Keys::generate();
        let snippet = snippet_event(&keys, "fn main() {}", &[("name", "main.rs")], 5);
        let pool = Arc::new(MockPool::new().relay(R, Probe::Fail, vec![snippet.clone()]));
        let client = SnippetClient::new(pool.clone(), Arc::default(), &config(&[R], &[])).unwrap();

        let first = client
            .fetch_by_id(&snippet.id.to_hex(), &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.content, "fn main() {}");
        assert_eq!(pool.query_calls.load(Ordering::SeqCst), 1);

        let second = client
            .fetch_by_id(&snippet.id.to_bech32().unwrap(), &[])
            .await
            .unwrap();
        assert_eq!(second, Some(first));
        assert_eq!(pool.query_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_missing_is_none() {
        let keys = Keys::generate();
        let elsewhere = snippet_event(&keys, "x", &[], 1);
        let pool = Arc::new(MockPool::new().relay(R, Probe::Fail, vec![]));
        let client = SnippetClient::new(pool, Arc::default(), &config(&[R], &[])).unwrap();
        assert_eq!(client.fetch_by_id(&elsewhere.id.to_hex(), &[]).await.unwrap(), None);
        assert!(matches!(
            client.fetch_by_id("not-an-id", &[]).await,
            Err(SnippetError::InvalidEventId { .. })
        ));
    }
}
