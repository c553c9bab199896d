//! Merging capable-branch and fallback-branch results.

use crate::types::SnippetEvent;
use std::collections::HashSet;

/// Newest first; ties broken by id so the order is total.
pub fn sort_newest_first(events: &mut [SnippetEvent]) {
    events.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Merge the two branch lists into one bounded, duplicate-free list.
///
/// `capable` is put in newest-first order; `fallback` keeps the match-engine
/// order it arrives in. The lists are interleaved one record at a time,
/// capable first, skipping ids already taken, and the limit is applied last,
/// so both branches contribute before anything is trimmed.
pub fn merge_branches(
    mut capable: Vec<SnippetEvent>,
    fallback: Vec<SnippetEvent>,
    limit: Option<usize>,
) -> Vec<SnippetEvent> {
    sort_newest_first(&mut capable);

    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::with_capacity(capable.len() + fallback.len());
    let mut left = capable.into_iter();
    let mut right = fallback.into_iter();

    loop {
        let a = left.next();
        let b = right.next();
        if a.is_none() && b.is_none() {
            break;
        }
        for event in [a, b].into_iter().flatten() {
            if seen.insert(event.id.clone()) {
                merged.push(event);
            }
        }
    }

    if let Some(limit) = limit {
        merged.truncate(limit);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(id: &str, created_at: u64) -> SnippetEvent {
        SnippetEvent {
            id: id.to_string(),
            pubkey: "pk".to_string(),
            kind: 1337,
            created_at,
            tags: vec![],
            content: String::new(),
        }
    }

    fn ids(events: &[SnippetEvent]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn duplicate_across_branches_appears_once() {
        let merged = merge_branches(
            vec![ev("a", 3), ev("shared", 2)],
            vec![ev("shared", 2), ev("b", 1)],
            None,
        );
        assert_eq!(merged.iter().filter(|e| e.id == "shared").count(), 1);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn duplicate_within_one_branch_appears_once() {
        let merged = merge_branches(vec![ev("a", 1), ev("a", 1)], vec![], None);
        assert_eq!(ids(&merged), vec!["a"]);
    }

    #[test]
    fn limit_draws_from_both_branches() {
        let capable = vec![ev("c1", 50), ev("c2", 40), ev("c3", 30)];
        let fallback = vec![ev("f1", 20), ev("f2", 10)];
        let merged = merge_branches(capable, fallback, Some(2));
        assert_eq!(ids(&merged), vec!["c1", "f1"]);
    }

    #[test]
    fn limit_is_applied_after_merge() {
        let capable = vec![ev("a", 5), ev("b", 4)];
        let fallback = vec![ev("c", 3), ev("d", 2), ev("e", 1)];
        let merged = merge_branches(capable, fallback, Some(2));
        assert_eq!(merged.len(), 2);

        let all = merge_branches(
            vec![ev("a", 5), ev("b", 4)],
            vec![ev("c", 3), ev("d", 2), ev("e", 1)],
            None,
        );
        assert_eq!(ids(&all), vec!["a", "c", "b", "d", "e"]);
    }

    #[test]
    fn capable_branch_is_sorted_newest_first_fallback_order_kept() {
        let capable = vec![ev("old", 1), ev("new", 9)];
        let fallback = vec![ev("ranked-first", 2), ev("ranked-second", 8)];
        let merged = merge_branches(capable, fallback, None);
        assert_eq!(ids(&merged), vec!["new", "ranked-first", "old", "ranked-second"]);
    }

    #[test]
    fn newest_first_breaks_ties_by_id() {
        let mut events = vec![ev("b", 1), ev("a", 1), ev("c", 2)];
        sort_newest_first(&mut events);
        assert_eq!(ids(&events), vec!["c", "a", "b"]);
    }

    #[test]
    fn limit_larger_than_results_keeps_all() {
        let merged = merge_branches(vec![ev("a", 1)], vec![], Some(10));
        assert_eq!(merged.len(), 1);
    }
}
