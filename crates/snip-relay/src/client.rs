//! `SnippetClient`: the entry point for search, listing and publishing.

use nostr_sdk::prelude::*;
use snip_core::{normalize_relay_url, LocalMatcher, SnippetConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::capability::{CapabilityCache, CapabilityProber};
use crate::convert::parse_pubkey;
use crate::error::SnippetError;
use crate::pool::RelayPool;
use crate::resolver::RelayResolver;
use crate::signer::SnippetSigner;
use crate::store::EventStore;

/// Bounded waits used by the client.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Waits {
    pub query: Duration,
    pub publish: Duration,
}

/// Owns the pool handle, the event store and the relay configuration.
///
/// Cheap to clone; every clone shares the same pool, store and capability cache.
#[derive(Clone)]
pub struct SnippetClient {
    pub(crate) pool: Arc<dyn RelayPool>,
    pub(crate) store: Arc<EventStore>,
    pub(crate) resolver: RelayResolver,
    pub(crate) prober: CapabilityProber,
    pub(crate) matcher: LocalMatcher,
    pub(crate) signer: Option<Arc<dyn SnippetSigner>>,
    pub(crate) identity: Option<PublicKey>,
    pub(crate) waits: Waits,
    pub(crate) fetch_limit: usize,
}

impl SnippetClient {
    /// Build a client from configuration. Fails only on an invalid `pubkey`.
    pub fn new(
        pool: Arc<dyn RelayPool>,
        store: Arc<EventStore>,
        config: &SnippetConfig,
    ) -> Result<Self, SnippetError> {
        let identity = config.pubkey.as_deref().map(parse_pubkey).transpose()?;

        let mut prober = CapabilityProber::new(pool.clone(), config.timeouts.probe());
        if let Some(ttl) = config.capability_cache_ttl() {
            prober = prober.with_cache(Arc::new(CapabilityCache::new(ttl)));
        }

        Ok(Self {
            resolver: RelayResolver::new(pool.clone(), config),
            prober,
            matcher: LocalMatcher::new(config.search.strategy),
            signer: None,
            identity,
            waits: Waits {
                query: config.timeouts.query(),
                publish: config.timeouts.publish(),
            },
            fetch_limit: config.search.fetch_limit.max(1),
            pool,
            store,
        })
    }

    /// Attach a signer; its public key becomes the client identity.
    pub async fn with_signer(mut self, signer: Arc<dyn SnippetSigner>) -> Result<Self, SnippetError> {
        self.identity = Some(signer.public_key().await?);
        self.signer = Some(signer);
        Ok(self)
    }

    pub fn identity(&self) -> Option<&PublicKey> {
        self.identity.as_ref()
    }

    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    pub fn prober(&self) -> &CapabilityProber {
        &self.prober
    }

    pub fn resolver(&self) -> &RelayResolver {
        &self.resolver
    }

    /// Run a filter with the query timeout; failures degrade to no events.
    pub(crate) async fn query_bounded(&self, relays: &[String], filter: Filter) -> Vec<Event> {
        let wait = self.waits.query;
        match tokio::time::timeout(wait, self.pool.query(relays, filter, wait)).await {
            Ok(Ok(events)) => events,
            Ok(Err(e)) => {
                warn!("Query against {} relay(s) failed: {e:#}", relays.len());
                Vec::new()
            }
            Err(_) => {
                warn!("Query against {} relay(s) timed out after {wait:?}", relays.len());
                Vec::new()
            }
        }
    }
}

/// Normalise caller-supplied relay addresses, rejecting malformed ones.
pub(crate) fn validate_relays(extras: &[String]) -> Result<Vec<String>, SnippetError> {
    let mut out: Vec<String> = Vec::with_capacity(extras.len());
    for url in extras {
        let url = normalize_relay_url(url)?;
        if !out.contains(&url) {
            out.push(url);
        }
    }
    Ok(out)
}
