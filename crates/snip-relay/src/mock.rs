//! In-memory `RelayPool` for tests.

use anyhow::{bail, Result};
use async_trait::async_trait;
use nostr_sdk::prelude::*;
use parking_lot::Mutex;
use snip_core::RelayInformation;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::pool::{PublishReport, RelayPool};

#[derive(Debug, Clone)]
pub(crate) enum Probe {
    Nips(Vec<u16>),
    Fail,
    Hang,
}

/// Each relay holds its own events. Search filters are honoured by
/// case-insensitive content match, the way a NIP-50 relay would.
#[derive(Default)]
pub(crate) struct MockPool {
    probes: HashMap<String, Probe>,
    events: HashMap<String, Vec<Event>>,
    failing: HashSet<String>,
    rejecting: HashSet<String>,
    pub probe_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub queries: Mutex<Vec<(Vec<String>, Filter)>>,
    pub published: Mutex<Vec<(Vec<String>, Event)>>,
}

impl MockPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn relay(mut self, url: &str, probe: Probe, events: Vec<Event>) -> Self {
        self.probes.insert(url.to_string(), probe);
        self.events.insert(url.to_string(), events);
        self
    }

    /// Queries touching only this relay fail.
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Publishing to this relay is refused.
    pub fn rejecting(mut self, url: &str) -> Self {
        self.rejecting.insert(url.to_string());
        self
    }

    pub fn network_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
            + self.query_calls.load(Ordering::SeqCst)
            + self.published.lock().len()
    }

    fn matches(filter: &Filter, event: &Event) -> bool {
        if let Some(ref ids) = filter.ids {
            if !ids.contains(&event.id) {
                return false;
            }
        }
        if let Some(ref authors) = filter.authors {
            if !authors.contains(&event.pubkey) {
                return false;
            }
        }
        if let Some(ref kinds) = filter.kinds {
            if !kinds.contains(&event.kind) {
                return false;
            }
        }
        if let Some(ref search) = filter.search {
            if !event
                .content
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl RelayPool for MockPool {
    async fn relay_information(&self, url: &str) -> Result<RelayInformation> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        match self.probes.get(url) {
            Some(Probe::Nips(nips)) => Ok(RelayInformation {
                name: Some(format!("mock {url}")),
                description: None,
                supported_nips: nips.clone(),
            }),
            Some(Probe::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                bail!("hung")
            }
            Some(Probe::Fail) | None => bail!("connection refused: {url}"),
        }
    }

    async fn query(&self, urls: &[String], filter: Filter, _timeout: Duration) -> Result<Vec<Event>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push((urls.to_vec(), filter.clone()));

        let live: Vec<&String> = urls.iter().filter(|u| !self.failing.contains(*u)).collect();
        if live.is_empty() {
            bail!("all relays failed");
        }

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for url in live {
            for event in self.events.get(url).into_iter().flatten() {
                if Self::matches(&filter, event) && seen.insert(event.id) {
                    out.push(event.clone());
                }
            }
        }
        if let Some(limit) = filter.limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    async fn publish(&self, urls: &[String], event: &Event) -> Result<PublishReport> {
        self.published.lock().push((urls.to_vec(), event.clone()));
        let mut report = PublishReport {
            event_id: event.id.to_hex(),
            ..Default::default()
        };
        for url in urls {
            if self.rejecting.contains(url) {
                report.rejected.push((url.clone(), "blocked: test".to_string()));
            } else {
                report.accepted.push(url.clone());
            }
        }
        Ok(report)
    }
}

/// Signed kind 1337 event with the given tags and timestamp.
pub(crate) fn snippet_event(keys: &Keys, content: &str, tags: &[(&str, &str)], created_at: u64) -> Event {
    EventBuilder::new(Kind::Custom(1337), content)
        .tags(
            tags.iter()
                .map(|(k, v)| Tag::custom(TagKind::custom(k.to_string()), vec![v.to_string()])),
        )
        .custom_created_at(Timestamp::from(created_at))
        .sign_with_keys(keys)
        .unwrap()
}

/// Signed replaceable event carrying relay tags (`r` for NIP-65, `relay` for 10007).
pub(crate) fn relay_list_event(keys: &Keys, kind: u16, tags: Vec<Vec<String>>) -> Event {
    EventBuilder::new(Kind::Custom(kind), "")
        .tags(tags.into_iter().map(|mut t| {
            let name = t.remove(0);
            Tag::custom(TagKind::custom(name), t)
        }))
        .sign_with_keys(keys)
        .unwrap()
}
