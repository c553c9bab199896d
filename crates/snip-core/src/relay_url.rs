//! Relay address validation and de-duplication.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayUrlError {
    #[error("relay URL is empty")]
    Empty,
    #[error("relay URL must start with ws:// or wss://: {0}")]
    BadScheme(String),
    #[error("relay URL has no host: {0}")]
    MissingHost(String),
    #[error("relay URL contains whitespace: {0}")]
    Whitespace(String),
}

/// Validate a relay address and bring it into a comparable form.
///
/// Scheme and host are lowercased and a trailing slash is dropped, so
/// `WSS://Relay.Example.com/` and `wss://relay.example.com` dedupe to one entry.
pub fn normalize_relay_url(input: &str) -> Result<String, RelayUrlError> {
    let url = input.trim();
    if url.is_empty() {
        return Err(RelayUrlError::Empty);
    }
    if url.chars().any(char::is_whitespace) {
        return Err(RelayUrlError::Whitespace(url.to_string()));
    }

    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| RelayUrlError::BadScheme(url.to_string()))?;
    let scheme = scheme.to_lowercase();
    if scheme != "ws" && scheme != "wss" {
        return Err(RelayUrlError::BadScheme(url.to_string()));
    }

    let rest = rest.trim_end_matches('/');
    let (host, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    if host.is_empty() {
        return Err(RelayUrlError::MissingHost(url.to_string()));
    }

    Ok(format!("{}://{}{}", scheme, host.to_lowercase(), path))
}

/// Drop duplicates, keeping first-seen order.
///
/// Entries that fail validation are skipped; explicit user input is validated
/// earlier, so anything invalid here came from the network.
pub fn dedup_relays<I, S>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for url in urls {
        let Ok(normalized) = normalize_relay_url(url.as_ref()) else {
            tracing::debug!("Skipping malformed relay URL: {}", url.as_ref());
            continue;
        };
        if seen.insert(normalized.clone()) {
            out.push(normalized);
        }
    }
    out
}
