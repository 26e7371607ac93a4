//! Conflict detection.
//!
//! Groups the slip by event and flags every event on which the user holds
//! two or more distinct outcomes of the three-way head-to-head market.
//! Home, draw and away are pairwise exclusive, so any two distinct kinds
//! on one event make that event conflicted.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::types::{OutcomeKind, Selection};

/// Return the ids of all events holding mutually exclusive outcomes.
pub fn conflicted_event_ids(selections: &[Selection]) -> BTreeSet<String> {
    let mut by_event: BTreeMap<&str, BTreeSet<OutcomeKind>> = BTreeMap::new();
    for s in selections {
        by_event
            .entry(s.event_id.as_str())
            .or_default()
            .insert(s.outcome_kind);
    }

    let conflicted: BTreeSet<String> = by_event
        .into_iter()
        .filter(|(_, kinds)| kinds.len() >= 2)
        .map(|(event_id, _)| event_id.to_string())
        .collect();

    if !conflicted.is_empty() {
        debug!(events = ?conflicted, "Conflicting selections detected");
    }

    conflicted
}
