use snip_core::{DraftError, RelayUrlError};

/// Errors surfaced to callers of the snippet operations.
///
/// Relay-level failures (timeouts, refused connections, bad NIP-11 documents)
/// never show up here; they degrade to empty or "unknown" results instead.
#[derive(Debug, thiserror::Error)]
pub enum SnippetError {
    #[error("no search relays available: configure `search_relays` or `relays`, or pass --relay")]
    NoSearchRelays,

    #[error("no relays available to {operation}")]
    NoRelays { operation: &'static str },

    #[error("invalid public key '{input}': {reason}")]
    InvalidPubkey { input: String, reason: String },

    #[error("invalid event id '{input}': {reason}")]
    InvalidEventId { input: String, reason: String },

    #[error("invalid relay url: {0}")]
    InvalidRelayUrl(#[from] RelayUrlError),

    #[error("invalid snippet: {0}")]
    InvalidDraft(#[from] DraftError),

    #[error("no signer configured: set `signer.nsec`, `signer.bunker` or SNIPSTR_NSEC")]
    NoSigner,

    #[error("signer error: {0}")]
    Signer(String),

    #[error("publish failed: {0}")]
    PublishFailed(String),
}
