use serde::Serialize;
use snip_core::{SnippetDraft, SnippetEvent};
use tracing::{info, warn};

use crate::client::{validate_relays, SnippetClient};
use crate::convert::{snippet_builder, snippet_from_event};
use crate::error::SnippetError;
use crate::pool::PublishReport;

/// A published snippet and where it landed.
#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub snippet: SnippetEvent,
    pub report: PublishReport,
}

impl SnippetClient {
    /// Sign `draft` as a kind 1337 event and send it to the write relays
    /// (defaults, the signer's NIP-65 outbox, `extra_relays`).
    ///
    /// Succeeds when at least one relay acknowledged the event.
    pub async fn publish(
        &self,
        draft: &SnippetDraft,
        extra_relays: &[String],
    ) -> Result<PublishOutcome, SnippetError> {
        let signer = self.signer.as_ref().ok_or(SnippetError::NoSigner)?;
        let builder = snippet_builder(draft)?;
        let extras = validate_relays(extra_relays)?;

        let author = signer.public_key().await?;
        let relays = self.resolver.write_relays(Some(&author), &extras).await;
        if relays.is_empty() {
            return Err(SnippetError::NoRelays {
                operation: "publish",
            });
        }

        let event = signer.sign(builder).await?;
        let wait = self.waits.publish;
        let report = match tokio::time::timeout(wait, self.pool.publish(&relays, &event)).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => return Err(SnippetError::PublishFailed(format!("{e:#}"))),
            Err(_) => {
                return Err(SnippetError::PublishFailed(format!(
                    "no acknowledgement within {wait:?}"
                )))
            }
        };

        for (url, reason) in &report.rejected {
            warn!("Relay {url} rejected {}: {reason}", report.event_id);
        }
        if !report.is_accepted() {
            return Err(SnippetError::PublishFailed(report.rejection_summary()));
        }
        info!(
            "Published snippet {} to {}/{} relay(s)",
            report.event_id,
            report.accepted.len(),
            relays.len()
        );

        let snippet = snippet_from_event(&event);
        self.store.insert(snippet.clone());
        Ok(PublishOutcome { snippet, report })
    }
}
