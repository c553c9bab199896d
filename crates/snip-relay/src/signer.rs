//! Event signing: local keys or a NIP-46 remote signer.

use async_trait::async_trait;
use nostr_sdk::prelude::*;
use snip_core::SignerConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::SnippetError;

#[async_trait]
pub trait SnippetSigner: Send + Sync {
    async fn public_key(&self) -> Result<PublicKey, SnippetError>;

    async fn sign(&self, builder: EventBuilder) -> Result<Event, SnippetError>;
}

/// Signs with a secret key held in memory.
#[derive(Debug, Clone)]
pub struct KeysSigner {
    keys: Keys,
}

impl KeysSigner {
    pub fn new(keys: Keys) -> Self {
        Self { keys }
    }

    /// Accepts nsec1 bech32 or hex.
    pub fn parse(secret: &str) -> Result<Self, SnippetError> {
        let keys = Keys::parse(secret.trim())
            .map_err(|e| SnippetError::Signer(format!("invalid secret key: {e}")))?;
        Ok(Self { keys })
    }
}

#[async_trait]
impl SnippetSigner for KeysSigner {
    async fn public_key(&self) -> Result<PublicKey, SnippetError> {
        Ok(self.keys.public_key())
    }

    async fn sign(&self, builder: EventBuilder) -> Result<Event, SnippetError> {
        builder
            .sign_with_keys(&self.keys)
            .map_err(|e| SnippetError::Signer(e.to_string()))
    }
}

/// Any nostr-sdk signer, typically a NIP-46 bunker connection.
#[derive(Debug, Clone)]
pub struct RemoteSigner {
    inner: Arc<dyn NostrSigner>,
}

impl RemoteSigner {
    pub fn new(inner: Arc<dyn NostrSigner>) -> Self {
        Self { inner }
    }

    /// Connect to a `bunker://` URI with a fresh app key.
    #[cfg(feature = "nip46")]
    pub fn bunker(uri: &str, timeout: Duration) -> Result<Self, SnippetError> {
        use nostr_connect::prelude::{NostrConnect, NostrConnectURI};

        let uri = NostrConnectURI::parse(uri.trim())
            .map_err(|e| SnippetError::Signer(format!("invalid bunker uri: {e}")))?;
        let connect = NostrConnect::new(uri, Keys::generate(), timeout, None)
            .map_err(|e| SnippetError::Signer(e.to_string()))?;
        Ok(Self::new(Arc::new(connect)))
    }
}

#[async_trait]
impl SnippetSigner for RemoteSigner {
    async fn public_key(&self) -> Result<PublicKey, SnippetError> {
        self.inner
            .get_public_key()
            .await
            .map_err(|e| SnippetError::Signer(e.to_string()))
    }

    async fn sign(&self, builder: EventBuilder) -> Result<Event, SnippetError> {
        let public_key = self.public_key().await?;
        let unsigned = builder.build(public_key);
        self.inner
            .sign_event(unsigned)
            .await
            .map_err(|e| SnippetError::Signer(e.to_string()))
    }
}

/// Build the configured signer. `env_nsec` (from `SNIPSTR_NSEC`) wins over the file.
pub fn signer_from_config(
    config: &SignerConfig,
    env_nsec: Option<&str>,
    timeout: Duration,
) -> Result<Option<Arc<dyn SnippetSigner>>, SnippetError> {
    if let Some(nsec) = env_nsec.filter(|s| !s.trim().is_empty()) {
        info!("Using signing key from environment");
        return Ok(Some(Arc::new(KeysSigner::parse(nsec)?)));
    }
    if let Some(ref nsec) = config.nsec {
        return Ok(Some(Arc::new(KeysSigner::parse(nsec)?)));
    }
    if let Some(ref uri) = config.bunker {
        return bunker_signer(uri, timeout).map(Some);
    }
    Ok(None)
}

#[cfg(feature = "nip46")]
fn bunker_signer(uri: &str, timeout: Duration) -> Result<Arc<dyn SnippetSigner>, SnippetError> {
    info!("Using NIP-46 remote signer");
    Ok(Arc::new(RemoteSigner::bunker(uri, timeout)?))
}

#[cfg(not(feature = "nip46"))]
fn bunker_signer(_uri: &str, _timeout: Duration) -> Result<Arc<dyn SnippetSigner>, SnippetError> {
    Err(SnippetError::Signer(
        "bunker signing needs the `nip46` feature".to_string(),
    ))
}
