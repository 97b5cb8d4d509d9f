//! Event dispatcher
//!
//! Builds events and hands them, synchronously and on the caller's thread,
//! to every registered consumer in registration order. Nothing is queued
//! or retained after `fire` returns.

use std::collections::BTreeSet;

use lumen_common::{Outcome, AFTER, BEFORE, SUITE};
use tracing::debug;

use crate::consumer::{Consumer, Consumption};
use crate::context::ExecutionContext;
use crate::event::Event;
use crate::summary::RunSummary;

/// Every consumption that happened during one dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub consumptions: Vec<Consumption>,
}

impl DispatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &Consumption> {
        self.consumptions.iter().filter(|c| !c.is_ok())
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Number of `accept` calls the named consumer received
    pub fn count_for(&self, consumer: &str) -> usize {
        self.consumptions
            .iter()
            .filter(|c| c.consumer == consumer)
            .count()
    }
}

/// Routes events to consumers. Build one per run and share it by reference.
#[derive(Default)]
pub struct Dispatcher {
    consumers: Vec<Box<dyn Consumer>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, consumer: impl Consumer + 'static) {
        self.consumers.push(Box::new(consumer));
    }

    pub fn with_consumer(mut self, consumer: impl Consumer + 'static) -> Self {
        self.register(consumer);
        self
    }

    pub fn consumers(&self) -> impl Iterator<Item = &dyn Consumer> {
        self.consumers.iter().map(|c| c.as_ref())
    }

    pub fn session_opened(&self) -> DispatchReport {
        debug!("Session opened hook");
        self.fire_reason(BEFORE, &[SUITE])
    }

    pub fn session_closed(&self, summary: &RunSummary) -> DispatchReport {
        debug!("Session closed hook");
        self.fire_result(AFTER, &[SUITE], summary.outcome())
    }

    pub fn fire_reason(&self, reason: &str, tags: &[&str]) -> DispatchReport {
        self.fire(None, None, Some(reason), None, Some(tags), None)
    }

    pub fn fire_result(&self, reason: &str, tags: &[&str], result: Outcome) -> DispatchReport {
        self.fire(None, None, Some(reason), Some(result), Some(tags), None)
    }

    pub fn fire_id(&self, primary_id: &str, reason: &str) -> DispatchReport {
        self.fire(Some(primary_id), None, Some(reason), None, None, None)
    }

    pub fn fire_ids(&self, primary_id: &str, secondary_id: &str, reason: &str) -> DispatchReport {
        self.fire(Some(primary_id), Some(secondary_id), Some(reason), None, None, None)
    }

    pub fn fire(
        &self,
        primary_id: Option<&str>,
        secondary_id: Option<&str>,
        reason: Option<&str>,
        result: Option<Outcome>,
        tags: Option<&[&str]>,
        context: Option<&dyn ExecutionContext>,
    ) -> DispatchReport {
        let event = Event {
            primary_id: primary_id.map(str::to_string),
            secondary_id: secondary_id.map(str::to_string),
            tags: tags.map(|tags| tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>()),
            reason: reason.map(str::to_string),
            result,
            context,
        };

        self.dispatch(&event)
    }

    /// Offer an already built event to every consumer
    pub fn dispatch(&self, event: &Event<'_>) -> DispatchReport {
        debug!("Dispatching event {:?}", event);

        let consumptions = self
            .consumers
            .iter()
            .flat_map(|consumer| consumer.consume_matching(event))
            .collect();

        DispatchReport { consumptions }
    }
}
