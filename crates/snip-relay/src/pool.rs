//! Relay transport: the `RelayPool` seam and its nostr-sdk implementation.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use nostr_sdk::prelude::*;
use serde::Serialize;
use snip_core::RelayInformation;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-relay outcome of sending one event.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PublishReport {
    pub event_id: String,
    /// Relays that acknowledged the event.
    pub accepted: Vec<String>,
    /// Relays that refused it or failed, with the reason.
    pub rejected: Vec<(String, String)>,
}

impl PublishReport {
    pub fn is_accepted(&self) -> bool {
        !self.accepted.is_empty()
    }

    /// One line per failing relay, for error messages.
    pub fn rejection_summary(&self) -> String {
        if self.rejected.is_empty() {
            return "no relay acknowledged the event".to_string();
        }
        self.rejected
            .iter()
            .map(|(url, reason)| format!("{url}: {reason}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Everything the snippet operations need from the network.
///
/// Implementations report transport trouble through `Err`; callers bound
/// every call with a timeout and degrade to empty results.
#[async_trait]
pub trait RelayPool: Send + Sync {
    /// Fetch the NIP-11 information document of one relay.
    async fn relay_information(&self, url: &str) -> Result<RelayInformation>;

    /// Run one filter against the given relays. Events are de-duplicated.
    async fn query(&self, urls: &[String], filter: Filter, timeout: Duration) -> Result<Vec<Event>>;

    /// Send a signed event to the given relays.
    async fn publish(&self, urls: &[String], event: &Event) -> Result<PublishReport>;
}

/// Map a relay websocket address to the HTTP address serving its NIP-11 document.
pub fn information_url(relay_url: &str) -> Result<String> {
    if let Some(rest) = relay_url.strip_prefix("wss://") {
        Ok(format!("https://{rest}"))
    } else if let Some(rest) = relay_url.strip_prefix("ws://") {
        Ok(format!("http://{rest}"))
    } else {
        bail!("not a websocket relay url: {relay_url}")
    }
}

/// `RelayPool` over a nostr-sdk `Client`, with reqwest for NIP-11.
///
/// Relays are added lazily the first time an operation names them, so one
/// pool can serve search, listing and publishing with different relay sets.
#[derive(Clone)]
pub struct NostrRelayPool {
    client: Client,
    http: reqwest::Client,
}

impl NostrRelayPool {
    /// Pool with a read-only client. Signing happens before events reach the pool.
    pub fn new() -> Result<Self> {
        Self::with_http_timeout(Duration::from_secs(10))
    }

    pub fn with_http_timeout(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("snipstr/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client: Client::default(),
            http,
        })
    }

    /// Get the underlying nostr-sdk Client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Add any relays the client does not know yet and connect them.
    /// Returns the addresses that were accepted.
    async fn ensure_relays(&self, urls: &[String]) -> Vec<String> {
        let mut added = Vec::with_capacity(urls.len());
        for url in urls {
            match self.client.add_relay(url.as_str()).await {
                Ok(_) => added.push(url.clone()),
                Err(e) => warn!("Failed to add relay {url}: {e}"),
            }
        }
        self.client.connect().await;
        added
    }
}

#[async_trait]
impl RelayPool for NostrRelayPool {
    async fn relay_information(&self, url: &str) -> Result<RelayInformation> {
        let http_url = information_url(url)?;
        let response = self
            .http
            .get(&http_url)
            .header("Accept", "application/nostr+json")
            .send()
            .await
            .with_context(|| format!("Failed to reach {http_url}"))?
            .error_for_status()
            .with_context(|| format!("NIP-11 request to {http_url} failed"))?;
        let info: RelayInformation = response
            .json()
            .await
            .with_context(|| format!("Invalid NIP-11 document from {http_url}"))?;
        debug!("{url} supports NIPs {:?}", info.supported_nips);
        Ok(info)
    }

    async fn query(&self, urls: &[String], filter: Filter, timeout: Duration) -> Result<Vec<Event>> {
        let relays = self.ensure_relays(urls).await;
        if relays.is_empty() {
            bail!("none of the {} relay(s) could be added", urls.len());
        }
        let events = self
            .client
            .fetch_events_from(relays.iter().map(String::as_str), filter, timeout)
            .await
            .context("Failed to fetch events")?;
        Ok(events.into_iter().collect())
    }

    async fn publish(&self, urls: &[String], event: &Event) -> Result<PublishReport> {
        let relays = self.ensure_relays(urls).await;
        if relays.is_empty() {
            bail!("none of the {} relay(s) could be added", urls.len());
        }
        let output = self
            .client
            .send_event_to(relays.iter().map(String::as_str), event)
            .await
            .context("Failed to send event")?;

        let mut accepted: Vec<String> = output.success.iter().map(|u| u.to_string()).collect();
        accepted.sort();
        let mut rejected: Vec<(String, String)> = output
            .failed
            .iter()
            .map(|(u, reason)| (u.to_string(), reason.clone()))
            .collect();
        rejected.sort();

        Ok(PublishReport {
            event_id: output.val.to_hex(),
            accepted,
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn information_url_maps_schemes() {
        assert_eq!(
            information_url("wss://relay.example.com").unwrap(),
            "https://relay.example.com"
        );
        assert_eq!(
            information_url("ws://127.0.0.1:7777/path").unwrap(),
            "http://127.0.0.1:7777/path"
        );
        assert!(information_url("https://relay.example.com").is_err());
    }

    #[test]
    fn rejection_summary_lists_reasons() {
        let report = PublishReport {
            event_id: "id".into(),
            accepted: vec![],
            rejected: vec![
                ("wss://a.example".into(), "blocked".into()),
                ("wss://b.example".into(), "timeout".into()),
            ],
        };
        assert!(!report.is_accepted());
        assert_eq!(
            report.rejection_summary(),
            "wss://a.example: blocked; wss://b.example: timeout"
        );
        assert_eq!(
            PublishReport::default().rejection_summary(),
            "no relay acknowledged the event"
        );
    }
}
