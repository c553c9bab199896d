//! Configuration for snippet search, listing and publishing.

use crate::matcher::MatchStrategy;
use crate::relay_url::{normalize_relay_url, RelayUrlError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid relay in `{field}`: {source}")]
    InvalidRelay {
        field: &'static str,
        #[source]
        source: RelayUrlError,
    },
    #[error("signer config sets both `nsec` and `bunker`; pick one")]
    AmbiguousSigner,
}

/// Top-level configuration. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnippetConfig {
    /// Default relays for reading and publishing.
    #[serde(default = "default_relays")]
    pub relays: Vec<String>,

    /// Relays expected to support NIP-50 search. Used when the identity has
    /// no published search relay list. An explicit empty list stays empty.
    #[serde(default = "default_search_relays")]
    pub search_relays: Vec<String>,

    /// Relays asked for relay-list records (NIP-65, kind 10007).
    #[serde(default = "default_index_relays")]
    pub index_relays: Vec<String>,

    /// Identity (npub or hex) whose relay lists are used when no signer is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubkey: Option<String>,

    #[serde(default)]
    pub timeouts: Timeouts,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub signer: SignerConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Bounded waits, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timeouts {
    #[serde(default = "default_probe_secs")]
    pub probe_secs: u64,
    #[serde(default = "default_query_secs")]
    pub query_secs: u64,
    #[serde(default = "default_relay_list_secs")]
    pub relay_list_secs: u64,
    #[serde(default = "default_publish_secs")]
    pub publish_secs: u64,
}

impl Timeouts {
    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs)
    }

    pub fn query(&self) -> Duration {
        Duration::from_secs(self.query_secs)
    }

    pub fn relay_list(&self) -> Duration {
        Duration::from_secs(self.relay_list_secs)
    }

    pub fn publish(&self) -> Duration {
        Duration::from_secs(self.publish_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchSettings {
    /// Local match strategy for relays without NIP-50.
    #[serde(default)]
    pub strategy: MatchStrategy,
    /// Relay-side `limit` sent with each branch query.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
    /// How long a successful capability probe is trusted. 0 disables the cache.
    #[serde(default)]
    pub capability_cache_secs: u64,
}

/// How events get signed. At most one of the two may be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignerConfig {
    /// Local secret key (nsec1... or hex). `SNIPSTR_NSEC` overrides at runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsec: Option<String>,
    /// NIP-46 remote signer URI (bunker://...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bunker: Option<String>,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            relays: default_relays(),
            search_relays: default_search_relays(),
            index_relays: default_index_relays(),
            pubkey: None,
            timeouts: Timeouts::default(),
            search: SearchSettings::default(),
            signer: SignerConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe_secs: default_probe_secs(),
            query_secs: default_query_secs(),
            relay_list_secs: default_relay_list_secs(),
            publish_secs: default_publish_secs(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::default(),
            fetch_limit: default_fetch_limit(),
            capability_cache_secs: 0,
        }
    }
}

fn default_relays() -> Vec<String> {
    vec![
        "wss://relay.damus.io".to_string(),
        "wss://nos.lol".to_string(),
        "wss://relay.nostr.band".to_string(),
    ]
}

fn default_search_relays() -> Vec<String> {
    vec![
        "wss://relay.nostr.band".to_string(),
        "wss://search.nos.today".to_string(),
        "wss://relay.noswhere.com".to_string(),
    ]
}

fn default_index_relays() -> Vec<String> {
    vec![
        "wss://purplepag.es".to_string(),
        "wss://relay.damus.io".to_string(),
        "wss://nos.lol".to_string(),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_probe_secs() -> u64 {
    3
}

fn default_query_secs() -> u64 {
    8
}

fn default_relay_list_secs() -> u64 {
    4
}

fn default_publish_secs() -> u64 {
    10
}

fn default_fetch_limit() -> usize {
    500
}

impl SnippetConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Reject malformed relay URLs and conflicting signer settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, list) in [
            ("relays", &self.relays),
            ("search_relays", &self.search_relays),
            ("index_relays", &self.index_relays),
        ] {
            for url in list {
                normalize_relay_url(url)
                    .map_err(|source| ConfigError::InvalidRelay { field, source })?;
            }
        }
        if self.signer.nsec.is_some() && self.signer.bunker.is_some() {
            return Err(ConfigError::AmbiguousSigner);
        }
        Ok(())
    }

    pub fn capability_cache_ttl(&self) -> Option<Duration> {
        match self.search.capability_cache_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
