//! Relay-set resolution from configuration and published relay lists.
//!
//! Two kinds of replaceable records are consulted, both looked up on the
//! index relays with a bounded wait:
//! - NIP-65 (kind 10002): `r` tags, marker `read` = inbox, `write` = outbox,
//!   no marker = both.
//! - NIP-51 search relays (kind 10007): `relay` tags.
//!
//! A missing or late record just contributes nothing.

use nostr_sdk::prelude::*;
use snip_core::{dedup_relays, SnippetConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::pool::RelayPool;

pub const KIND_RELAY_LIST: u16 = 10002;
pub const KIND_SEARCH_RELAYS: u16 = 10007;

/// Inbox/outbox relays published by one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayList {
    /// Where the identity reads (its inbox).
    pub read: Vec<String>,
    /// Where the identity writes (its outbox).
    pub write: Vec<String>,
}

impl RelayList {
    pub fn from_event(event: &Event) -> Self {
        let mut read = Vec::new();
        let mut write = Vec::new();
        for tag in event.tags.iter() {
            let s = tag.as_slice();
            if s.first().map(String::as_str) != Some("r") {
                continue;
            }
            let Some(url) = s.get(1) else { continue };
            match s.get(2).map(String::as_str) {
                Some("read") => read.push(url.clone()),
                Some("write") => write.push(url.clone()),
                _ => {
                    read.push(url.clone());
                    write.push(url.clone());
                }
            }
        }
        Self {
            read: dedup_relays(read),
            write: dedup_relays(write),
        }
    }
}

/// Relay URLs from a kind 10007 record.
pub fn search_relays_from_event(event: &Event) -> Vec<String> {
    dedup_relays(event.tags.iter().filter_map(|tag| {
        let s = tag.as_slice();
        match (s.first().map(String::as_str), s.get(1)) {
            (Some("relay"), Some(url)) => Some(url.clone()),
            _ => None,
        }
    }))
}

#[derive(Clone)]
pub struct RelayResolver {
    pool: Arc<dyn RelayPool>,
    relays: Vec<String>,
    search_relays: Vec<String>,
    index_relays: Vec<String>,
    timeout: Duration,
}

impl RelayResolver {
    pub fn new(pool: Arc<dyn RelayPool>, config: &SnippetConfig) -> Self {
        Self {
            pool,
            relays: dedup_relays(&config.relays),
            search_relays: dedup_relays(&config.search_relays),
            index_relays: dedup_relays(&config.index_relays),
            timeout: config.timeouts.relay_list(),
        }
    }

    /// Configured default relays.
    pub fn configured_relays(&self) -> &[String] {
        &self.relays
    }

    /// Configured search relays.
    pub fn configured_search_relays(&self) -> &[String] {
        &self.search_relays
    }

    /// Relays consulted for relay-list records.
    pub fn configured_index_relays(&self) -> &[String] {
        &self.index_relays
    }

    fn lookup_relays(&self) -> Vec<String> {
        dedup_relays(self.index_relays.iter().chain(self.relays.iter()))
    }

    /// Newest event of `kind` authored by `pubkey`, or `None` on absence,
    /// failure or timeout.
    async fn latest_replaceable(&self, pubkey: &PublicKey, kind: u16) -> Option<Event> {
        let targets = self.lookup_relays();
        if targets.is_empty() {
            return None;
        }
        let filter = Filter::new()
            .author(*pubkey)
            .kind(Kind::from(kind))
            .limit(1);
        match tokio::time::timeout(self.timeout, self.pool.query(&targets, filter, self.timeout))
            .await
        {
            Ok(Ok(events)) => events.into_iter().max_by_key(|e| e.created_at),
            Ok(Err(e)) => {
                warn!("Kind {kind} lookup for {} failed: {e:#}", pubkey.to_hex());
                None
            }
            Err(_) => {
                warn!("Kind {kind} lookup for {} timed out", pubkey.to_hex());
                None
            }
        }
    }

    /// NIP-65 relay list of `pubkey`; empty when none was found in time.
    pub async fn relay_list(&self, pubkey: &PublicKey) -> RelayList {
        let list = self
            .latest_replaceable(pubkey, KIND_RELAY_LIST)
            .await
            .map(|e| RelayList::from_event(&e))
            .unwrap_or_default();
        debug!(
            "Relay list for {}: {} read, {} write",
            pubkey.to_hex(),
            list.read.len(),
            list.write.len()
        );
        list
    }

    /// Published search relays of `pubkey`; empty when none was found in time.
    pub async fn search_relay_list(&self, pubkey: &PublicKey) -> Vec<String> {
        self.latest_replaceable(pubkey, KIND_SEARCH_RELAYS)
            .await
            .map(|e| search_relays_from_event(&e))
            .unwrap_or_default()
    }

    /// Relays to read our own data from: defaults, our inbox, extras.
    pub async fn read_relays(&self, identity: Option<&PublicKey>, extras: &[String]) -> Vec<String> {
        let inbox = match identity {
            Some(pk) => self.relay_list(pk).await.read,
            None => Vec::new(),
        };
        dedup_relays(self.relays.iter().chain(&inbox).chain(extras))
    }

    /// Relays to find another author's records on: defaults, their outbox, extras.
    pub async fn author_relays(&self, author: &PublicKey, extras: &[String]) -> Vec<String> {
        let outbox = self.relay_list(author).await.write;
        dedup_relays(self.relays.iter().chain(&outbox).chain(extras))
    }

    /// Relays to publish to: defaults, the author's outbox, extras.
    pub async fn write_relays(&self, identity: Option<&PublicKey>, extras: &[String]) -> Vec<String> {
        let outbox = match identity {
            Some(pk) => self.relay_list(pk).await.write,
            None => Vec::new(),
        };
        dedup_relays(self.relays.iter().chain(&outbox).chain(extras))
    }

    /// Candidate relays for a search: search relays (the identity's published
    /// list if any, else the configured ones), then read relays, then extras.
    pub async fn search_candidates(
        &self,
        identity: Option<&PublicKey>,
        extras: &[String],
    ) -> Vec<String> {
        let (published, inbox) = match identity {
            Some(pk) => {
                let (search, list) = tokio::join!(self.search_relay_list(pk), self.relay_list(pk));
                (search, list.read)
            }
            None => (Vec::new(), Vec::new()),
        };
        let search = if published.is_empty() {
            &self.search_relays
        } else {
            &published
        };
        dedup_relays(
            search
                .iter()
                .chain(&self.relays)
                .chain(&inbox)
                .chain(extras),
        )
    }
}
