//! Human-readable rendering of snippets and relay descriptors.

use nostr_sdk::prelude::*;
use snip_core::{
    snippet_code, snippet_created_at, snippet_dependencies, snippet_description,
    snippet_extension, snippet_language, snippet_license, snippet_repo, snippet_runtime,
    snippet_tags, snippet_title, RelayDescriptor, SearchResult, SnippetEvent,
};
use snip_relay::PublishOutcome;

const PREVIEW_LINES: usize = 6;

/// npub for a hex key, or the input unchanged if it does not parse.
pub fn display_pubkey(hex: &str) -> String {
    PublicKey::from_hex(hex)
        .ok()
        .and_then(|pk| pk.to_bech32().ok())
        .unwrap_or_else(|| hex.to_string())
}

/// note1 id for a hex event id, or the input unchanged.
pub fn display_event_id(hex: &str) -> String {
    EventId::from_hex(hex)
        .ok()
        .and_then(|id| id.to_bech32().ok())
        .unwrap_or_else(|| hex.to_string())
}

fn header(event: &SnippetEvent) -> String {
    let mut line = format!("📄 {}", snippet_title(event));
    if let Some(language) = snippet_language(event) {
        line.push_str(&format!("  [{language}]"));
    }
    line.push_str(&format!("\n   id:   {}", display_event_id(&event.id)));
    line.push_str(&format!(
        "\n   by:   {}  ({})",
        display_pubkey(&event.pubkey),
        snippet_created_at(event).format("%Y-%m-%d %H:%M UTC")
    ));
    let tags = snippet_tags(event);
    if !tags.is_empty() {
        line.push_str(&format!("\n   tags: {}", tags.join(", ")));
    }
    line
}

/// Header plus the first few lines of code.
pub fn format_summary(event: &SnippetEvent) -> String {
    let mut out = header(event);
    let code = snippet_code(event);
    let total = code.lines().count();
    out.push_str("\n   ---");
    for line in code.lines().take(PREVIEW_LINES) {
        out.push_str("\n   ");
        out.push_str(line);
    }
    if total > PREVIEW_LINES {
        out.push_str(&format!("\n   ... ({} more lines)", total - PREVIEW_LINES));
    }
    out
}

/// Every known field, then the full body.
pub fn format_full(event: &SnippetEvent) -> String {
    let mut out = header(event);
    let fields = [
        ("description", snippet_description(event)),
        ("extension", snippet_extension(event)),
        ("runtime", snippet_runtime(event)),
        ("license", snippet_license(event)),
        ("repo", snippet_repo(event)),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            out.push_str(&format!("\n   {name}: {value}"));
        }
    }
    let deps = snippet_dependencies(event);
    if !deps.is_empty() {
        out.push_str(&format!("\n   deps: {}", deps.join(", ")));
    }
    out.push_str("\n---\n");
    out.push_str(snippet_code(event));
    out
}

pub fn format_search(result: &SearchResult) -> String {
    let mut out = String::new();
    if result.is_empty() {
        out.push_str("No snippets found.");
    } else {
        out.push_str(&format!("Found {} snippet(s):", result.len()));
        for event in &result.snippets {
            out.push_str("\n\n");
            out.push_str(&format_summary(event));
        }
    }
    out.push_str(&format!(
        "\n\nSearched {} relay(s), {} with NIP-50 search.",
        result.relays_searched.len(),
        result.search_capable.len()
    ));
    out
}

pub fn format_list(events: &[SnippetEvent]) -> String {
    if events.is_empty() {
        return "No snippets found.".to_string();
    }
    let mut out = format!("{} snippet(s):", events.len());
    for event in events {
        out.push_str("\n\n");
        out.push_str(&format_summary(event));
    }
    out
}

pub fn format_publish(outcome: &PublishOutcome) -> String {
    let mut out = format!(
        "✅ Published {}\n   accepted by: {}",
        display_event_id(&outcome.snippet.id),
        outcome.report.accepted.join(", ")
    );
    for (url, reason) in &outcome.report.rejected {
        out.push_str(&format!("\n   ❌ {url}: {reason}"));
    }
    out
}

pub fn format_relay(descriptor: &RelayDescriptor) -> String {
    let mut line = format!("{}  search: {}", descriptor.url, descriptor.search);
    if let Some(ref name) = descriptor.name {
        line.push_str(&format!("  ({name})"));
    }
    line
}
