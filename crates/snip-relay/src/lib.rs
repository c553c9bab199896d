//! Relay-facing half of snipstr.
//!
//! Everything that touches the network goes through the [`RelayPool`] trait;
//! [`NostrRelayPool`] is the nostr-sdk implementation. [`SnippetClient`] ties
//! the pool to an [`EventStore`], relay resolution and capability probing and
//! exposes search, listing, fetching and publishing.

pub mod capability;
pub mod client;
pub mod convert;
pub mod error;
mod listing;
pub mod pool;
pub mod publish;
pub mod resolver;
mod search;
pub mod signer;
pub mod store;

#[cfg(test)]
mod mock;

pub use capability::{CapabilityCache, CapabilityProber};
pub use client::SnippetClient;
pub use convert::{parse_event_id, parse_pubkey, snippet_builder, snippet_from_event, snippet_kind};
pub use error::SnippetError;
pub use pool::{information_url, NostrRelayPool, PublishReport, RelayPool};
pub use publish::PublishOutcome;
pub use resolver::{RelayList, RelayResolver};
pub use signer::{signer_from_config, KeysSigner, RemoteSigner, SnippetSigner};
pub use store::EventStore;
