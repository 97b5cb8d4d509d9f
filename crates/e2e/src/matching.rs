//! Matching engine
//!
//! Decides whether a dispatched [`Event`] satisfies a consumer's
//! [`EventFilter`]. An absent field on either side makes the predicate
//! that reads it false.
//!
//! ```text
//! is_match = (reason_matches || result_matches)
//!         && (ids_match || only_primary_id_matches || tags_intersect)
//! ```

use std::collections::BTreeSet;

use tracing::trace;

use crate::event::{Event, EventFilter, Pattern};

fn full_match(value: Option<&String>, pattern: Option<&Pattern>) -> bool {
    match (value, pattern) {
        (Some(value), Some(pattern)) => pattern.is_full_match(value),
        _ => false,
    }
}

/// Both tag sets present and sharing at least one tag. Symmetric.
pub fn tag_sets_intersect(a: Option<&BTreeSet<String>>, b: Option<&BTreeSet<String>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => !a.is_disjoint(b),
        _ => false,
    }
}

pub fn tags_intersect(event: &Event<'_>, filter: &EventFilter) -> bool {
    let matches = tag_sets_intersect(event.tags.as_ref(), filter.tags.as_ref());
    trace!("tagsIntersect: {}", matches);
    matches
}

pub fn ids_match(event: &Event<'_>, filter: &EventFilter) -> bool {
    let matches = full_match(event.primary_id.as_ref(), filter.primary_id.as_ref())
        && full_match(event.secondary_id.as_ref(), filter.secondary_id.as_ref());
    trace!("idsMatch: {}", matches);
    matches
}

/// Primary id matches and the filter does not constrain the secondary id
pub fn only_primary_id_matches(event: &Event<'_>, filter: &EventFilter) -> bool {
    let matches = full_match(event.primary_id.as_ref(), filter.primary_id.as_ref())
        && filter.secondary_id.is_none();
    trace!("onlyPrimaryIdMatches: {}", matches);
    matches
}

pub fn reason_matches(event: &Event<'_>, filter: &EventFilter) -> bool {
    let matches = full_match(event.reason.as_ref(), filter.reason.as_ref());
    trace!("reasonMatches: {}", matches);
    matches
}

pub fn result_matches(event: &Event<'_>, filter: &EventFilter) -> bool {
    let matches = event.result.is_some() && event.result == filter.result;
    trace!("resultMatches: {}", matches);
    matches
}

pub fn is_match(event: &Event<'_>, filter: &EventFilter) -> bool {
    (reason_matches(event, filter) || result_matches(event, filter))
        && (ids_match(event, filter)
            || only_primary_id_matches(event, filter)
            || tags_intersect(event, filter))
}
