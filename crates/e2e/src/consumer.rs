//! Event consumers

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, error, trace};

use crate::error::E2eResult;
use crate::event::{Event, EventFilter};
use crate::matching::is_match;

/// Result of one consumption: one matching filter, one `accept` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumption {
    pub consumer: String,
    /// Position of the matching filter in the consumer's list
    pub filter: usize,
    pub outcome: Result<(), String>,
}

impl Consumption {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// A named sink with an ordered list of filters.
///
/// Implementors provide [`Consumer::accept`]; matching and fault isolation
/// come from [`Consumer::consume_matching`].
pub trait Consumer: Send + Sync {
    fn name(&self) -> &str;

    fn filters(&self) -> &[EventFilter];

    fn accept(&self, event: &Event<'_>) -> E2eResult<()>;

    /// Evaluate every filter in order and call `accept` once per filter that
    /// matches. Matches are not deduplicated: an event satisfying `k`
    /// filters is accepted `k` times.
    fn consume_matching(&self, event: &Event<'_>) -> Vec<Consumption> {
        trace!("{} matchers for {:?}", self.name(), event);

        self.filters()
            .iter()
            .enumerate()
            .filter(|(_, filter)| is_match(event, filter))
            .map(|(index, _)| {
                debug!("{} is consuming {:?}", self.name(), event);
                Consumption {
                    consumer: self.name().to_string(),
                    filter: index,
                    outcome: self.accept_isolated(event),
                }
            })
            .collect()
    }

    /// Call `accept`, turning errors and panics into a logged failure
    fn accept_isolated(&self, event: &Event<'_>) -> Result<(), String> {
        let outcome = match catch_unwind(AssertUnwindSafe(|| self.accept(event))) {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };

        error!("Consumer {} failed on {:?}: {}", self.name(), event, outcome);
        Err(outcome)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}
