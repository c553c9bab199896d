//! Conversion between nostr-sdk events and snip-core records.

use nostr_sdk::prelude::*;
use snip_core::{SnippetDraft, SnippetEvent, KIND_CODE_SNIPPET};

use crate::error::SnippetError;

pub fn snippet_kind() -> Kind {
    Kind::Custom(KIND_CODE_SNIPPET)
}

/// Flatten a signed event into the tag-based record used by snip-core.
pub fn snippet_from_event(event: &Event) -> SnippetEvent {
    SnippetEvent {
        id: event.id.to_hex(),
        pubkey: event.pubkey.to_hex(),
        kind: event.kind.as_u16(),
        created_at: event.created_at.as_secs(),
        tags: event.tags.iter().map(|t| t.as_slice().to_vec()).collect(),
        content: event.content.clone(),
    }
}

/// Unsigned kind 1337 builder for a validated draft.
pub fn snippet_builder(draft: &SnippetDraft) -> Result<EventBuilder, SnippetError> {
    let tags = draft
        .to_tags()?
        .into_iter()
        .filter_map(|mut values| {
            if values.is_empty() {
                return None;
            }
            let name = values.remove(0);
            Some(Tag::custom(TagKind::custom(name), values))
        });
    Ok(EventBuilder::new(snippet_kind(), draft.content.clone()).tags(tags))
}

/// Accept npub or 64-char hex.
pub fn parse_pubkey(input: &str) -> Result<PublicKey, SnippetError> {
    PublicKey::parse(input.trim()).map_err(|e| SnippetError::InvalidPubkey {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Accept note1 bech32 or 64-char hex.
pub fn parse_event_id(input: &str) -> Result<EventId, SnippetError> {
    EventId::parse(input.trim()).map_err(|e| SnippetError::InvalidEventId {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use snip_core::{snippet_language, snippet_tags, snippet_title};

    #[test]
    fn draft_signs_into_snippet_event() {
        let keys = Keys::generate();
        let draft = SnippetDraft {
            title: Some("Quick Sort".into()),
            language: Some("py".into()),
            tags: vec!["Algorithm".into()],
            ..SnippetDraft::new("def quicksort(xs): ...")
        };
        let event = snippet_builder(&draft)
            .unwrap()
            .sign_with_keys(&keys)
            .unwrap();
        assert_eq!(event.kind, snippet_kind());

        let snippet = snippet_from_event(&event);
        assert_eq!(snippet.kind, KIND_CODE_SNIPPET);
        assert_eq!(snippet.pubkey, keys.public_key().to_hex());
        assert_eq!(snippet.id, event.id.to_hex());
        assert_eq!(snippet_title(&snippet), "Quick Sort");
        assert_eq!(snippet_language(&snippet), Some("python"));
        assert_eq!(snippet_tags(&snippet), vec!["algorithm"]);
    }

    #[test]
    fn invalid_draft_is_rejected_before_signing() {
        assert!(matches!(
            snippet_builder(&SnippetDraft::new("")),
            Err(SnippetError::InvalidDraft(_))
        ));
    }

    #[test]
    fn pubkey_formats() {
        let keys = Keys::generate();
        let hex = keys.public_key().to_hex();
        let npub = keys.public_key().to_bech32().unwrap();
        assert_eq!(parse_pubkey(&hex).unwrap(), keys.public_key());
        assert_eq!(parse_pubkey(&npub).unwrap(), keys.public_key());
        assert!(matches!(
            parse_pubkey("npub1notreal"),
            Err(SnippetError::InvalidPubkey { .. })
        ));
    }

    #[test]
    fn event_id_formats() {
        let keys = Keys::generate();
        let event = EventBuilder::text_note("hi").sign_with_keys(&keys).unwrap();
        assert_eq!(parse_event_id(&event.id.to_hex()).unwrap(), event.id);
        assert!(matches!(
            parse_event_id("xyz"),
            Err(SnippetError::InvalidEventId { .. })
        ));
    }
}
