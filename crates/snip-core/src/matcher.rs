//! Client-side text matching for relays without server-side search.
//!
//! Two strategies: a plain case-insensitive substring scan, and an ephemeral
//! SQLite FTS5 index ranked by bm25. Both are deterministic for a given input
//! set: records are put in newest-first order before matching, so relay
//! delivery order does not leak into the output.

use crate::event::{tag_text, TAG_NAME};
use crate::merge::sort_newest_first;
use crate::types::SnippetEvent;
use rusqlite::{params, Connection, Result as SqlResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Case-insensitive substring over body, title and tag values.
    Substring,
    /// Tokenised full-text index, ranked by relevance.
    #[default]
    Fuzzy,
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStrategy::Substring => write!(f, "substring"),
            MatchStrategy::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// Local match engine used by the fallback search branch.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMatcher {
    strategy: MatchStrategy,
}

impl LocalMatcher {
    pub fn new(strategy: MatchStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// Return the records matching `query`, in match-engine order.
    ///
    /// A blank query matches everything (newest-first). The input is never
    /// modified; duplicate ids are collapsed to their first occurrence.
    pub fn apply(&self, events: &[SnippetEvent], query: &str) -> Vec<SnippetEvent> {
        let mut candidates = unique_by_id(events);
        sort_newest_first(&mut candidates);

        if query.trim().is_empty() {
            return candidates;
        }

        match self.strategy {
            MatchStrategy::Substring => substring_matches(&candidates, query),
            MatchStrategy::Fuzzy => match FuzzyIndex::build(&candidates) {
                Ok(index) => match index.search(query) {
                    Ok(hits) => hits.into_iter().map(|(event, _)| event).collect(),
                    Err(e) => {
                        warn!("Fuzzy index query failed, using substring match: {e}");
                        substring_matches(&candidates, query)
                    }
                },
                Err(e) => {
                    warn!("Fuzzy index build failed, using substring match: {e}");
                    substring_matches(&candidates, query)
                }
            },
        }
    }
}

fn unique_by_id(events: &[SnippetEvent]) -> Vec<SnippetEvent> {
    let mut seen = std::collections::HashSet::new();
    events
        .iter()
        .filter(|e| seen.insert(e.id.as_str()))
        .cloned()
        .collect()
}

/// Case-insensitive substring match against the body and the tag values,
/// `name` included. Keeps input order.
pub fn substring_matches(events: &[SnippetEvent], query: &str) -> Vec<SnippetEvent> {
    let needle = query.trim().to_lowercase();
    events
        .iter()
        .filter(|event| {
            event.content.to_lowercase().contains(&needle)
                || tag_text(event)
                    .iter()
                    .any(|v| v.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Ephemeral in-memory FTS5 index over a candidate set.
pub struct FuzzyIndex {
    conn: Connection,
    events: Vec<SnippetEvent>,
}

impl FuzzyIndex {
    /// Index `events`. Positions in the slice are used as row ids.
    pub fn build(events: &[SnippetEvent]) -> SqlResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE VIRTUAL TABLE snippets_fts USING fts5(
                title, body, tags,
                tokenize = 'unicode61 remove_diacritics 2'
            );",
        )?;

        {
            let mut stmt = conn.prepare(
                "INSERT INTO snippets_fts (rowid, title, body, tags) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (pos, event) in events.iter().enumerate() {
                let title = event.tag_value(TAG_NAME).unwrap_or_default();
                let tags = tag_text(event).join(" ");
                stmt.execute(params![pos as i64, title, event.content, tags])?;
            }
        }

        debug!("Built fuzzy index over {} snippet(s)", events.len());
        Ok(Self {
            conn,
            events: events.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Every hit with its relevance (higher is better), best first.
    ///
    /// Query words are OR-ed prefix terms, so partial words and partial
    /// phrases still hit. Title matches weigh more than body or tag matches.
    pub fn search(&self, query: &str) -> SqlResult<Vec<(SnippetEvent, f64)>> {
        let Some(fts_query) = to_fts_query(query) else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(
            "SELECT rowid, bm25(snippets_fts, 4.0, 1.0, 2.0) AS rank
             FROM snippets_fts
             WHERE snippets_fts MATCH ?1
             ORDER BY rank, rowid",
        )?;

        let mut hits = Vec::new();
        let mut rows = stmt.query(params![fts_query])?;
        while let Some(row) = rows.next()? {
            let pos: i64 = row.get(0)?;
            let rank: f64 = row.get(1)?;
            if let Some(event) = usize::try_from(pos).ok().and_then(|p| self.events.get(p)) {
                hits.push((event.clone(), -rank));
            }
        }
        Ok(hits)
    }
}

/// Turn free text into an FTS5 expression: each word quoted, prefix-matched
/// and OR-ed. `None` when nothing searchable is left.
fn to_fts_query(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
        .map(|w| format!("\"{}\"*", w.to_lowercase()))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}
