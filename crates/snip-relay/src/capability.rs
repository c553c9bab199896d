//! NIP-50 capability probing.
//!
//! A relay counts as search-capable only when its NIP-11 document arrives
//! within the probe timeout and lists NIP-50. Any failure (timeout, refused
//! connection, malformed document) reports `Capability::Unknown`, which the
//! search treats as "not capable": the relay still gets searched, just
//! through the local fallback.

use futures_util::future::join_all;
use parking_lot::Mutex;
use snip_core::{Capability, RelayDescriptor};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::pool::RelayPool;

/// Successful probe results kept for a fixed time-to-live.
///
/// Failed probes are never stored, so a relay that was down is asked again
/// on the next run.
#[derive(Debug)]
pub struct CapabilityCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (RelayDescriptor, Instant)>>,
}

impl CapabilityCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, url: &str) -> Option<RelayDescriptor> {
        let mut entries = self.entries.lock();
        match entries.get(url) {
            Some((descriptor, at)) if at.elapsed() < self.ttl => Some(descriptor.clone()),
            Some(_) => {
                entries.remove(url);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, descriptor: RelayDescriptor) {
        if descriptor.search == Capability::Unknown {
            return;
        }
        self.entries
            .lock()
            .insert(descriptor.url.clone(), (descriptor, Instant::now()));
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[derive(Clone)]
pub struct CapabilityProber {
    pool: Arc<dyn RelayPool>,
    timeout: Duration,
    cache: Option<Arc<CapabilityCache>>,
}

impl CapabilityProber {
    pub fn new(pool: Arc<dyn RelayPool>, timeout: Duration) -> Self {
        Self {
            pool,
            timeout,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<CapabilityCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Describe one relay. Never fails and never waits longer than the timeout.
    pub async fn probe(&self, url: &str) -> RelayDescriptor {
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(url)) {
            debug!("Capability cache hit for {url}: {}", hit.search);
            return hit;
        }

        let descriptor =
            match tokio::time::timeout(self.timeout, self.pool.relay_information(url)).await {
                Ok(Ok(info)) => RelayDescriptor::from_information(url, info),
                Ok(Err(e)) => {
                    debug!("Probe of {url} failed: {e:#}");
                    RelayDescriptor::unknown(url)
                }
                Err(_) => {
                    debug!("Probe of {url} timed out after {:?}", self.timeout);
                    RelayDescriptor::unknown(url)
                }
            };

        if let Some(ref cache) = self.cache {
            cache.insert(descriptor.clone());
        }
        descriptor
    }

    pub async fn supports_search(&self, url: &str) -> bool {
        self.probe(url).await.search.is_supported()
    }

    /// Probe every relay concurrently; output order follows input order.
    pub async fn probe_all(&self, urls: &[String]) -> Vec<RelayDescriptor> {
        join_all(urls.iter().map(|url| self.probe(url))).await
    }

    /// Split relays into (search-capable, everything else), preserving order.
    pub async fn partition(&self, urls: &[String]) -> (Vec<String>, Vec<String>) {
        let mut capable = Vec::new();
        let mut rest = Vec::new();
        for descriptor in self.probe_all(urls).await {
            if descriptor.search.is_supported() {
                capable.push(descriptor.url);
            } else {
                rest.push(descriptor.url);
            }
        }
        (capable, rest)
    }
}
