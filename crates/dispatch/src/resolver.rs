//! Resolution of a delivery to its most specific event type.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{headers, EventTypeId, RawHeaders, ResolutionError, Taxonomy};

/// Resolve `(headers, body)` to the deepest event type whose criteria match.
///
/// 1. The `X-GitHub-Event` header must be present, otherwise the request is
///    malformed.
/// 2. The first event root whose criteria match is selected; if none matches
///    the event is unknown.
/// 3. From there, each level's children are tested against their *own*
///    criteria. The first declared matching child is descended into.
/// 4. When no child matches, the current node is the result. This may be a
///    non-leaf node, e.g. an `issue_comment` delivery whose `action` is not
///    declared resolves to the `issue_comment` root.
///
/// Resolution is a pure function of its inputs.
///
/// # Errors
///
/// - [`ResolutionError::Malformed`] if the event-name header is missing
/// - [`ResolutionError::UnknownEvent`] if no root matches
#[instrument(skip_all, fields(event = tracing::field::Empty))]
pub fn resolve(
    taxonomy: &Taxonomy,
    headers: &RawHeaders,
    body: &Value,
) -> Result<EventTypeId, ResolutionError> {
    let event = headers::event_name(headers)?;
    tracing::Span::current().record("event", event.as_str());

    let Some(mut current) = first_matching_child(taxonomy, taxonomy.base(), headers, body) else {
        debug!("No event root matches");
        return Err(ResolutionError::UnknownEvent {
            event: event.as_str().to_string(),
        });
    };

    while let Some(child) = first_matching_child(taxonomy, current, headers, body) {
        current = child;
    }

    let node = taxonomy.node(current);
    if node.is_leaf() {
        debug!(event_type = node.name(), "Resolved event type");
    } else {
        debug!(
            event_type = node.name(),
            "Resolution stopped at a non-leaf event type; no child criteria matched"
        );
    }
    Ok(current)
}

fn first_matching_child(
    taxonomy: &Taxonomy,
    parent: EventTypeId,
    headers: &RawHeaders,
    body: &Value,
) -> Option<EventTypeId> {
    let mut matching = taxonomy
        .children(parent)
        .iter()
        .copied()
        .filter(|child| taxonomy.node(*child).matches(headers, body));

    let first = matching.next()?;
    let others: Vec<&str> = matching.map(|id| taxonomy.node(id).name()).collect();
    if !others.is_empty() {
        warn!(
            parent = taxonomy.node(parent).name(),
            selected = taxonomy.node(first).name(),
            ignored = ?others,
            "More than one sibling event type matches; using the first declared"
        );
    }
    Some(first)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
