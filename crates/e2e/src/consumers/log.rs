use tracing::info;

use super::describe;
use crate::consumer::Consumer;
use crate::error::E2eResult;
use crate::event::{Event, EventFilter};

/// Writes every matched event to the log
pub struct LogConsumer {
    name: String,
    filters: Vec<EventFilter>,
}

impl LogConsumer {
    pub fn new(name: impl Into<String>, filters: Vec<EventFilter>) -> Self {
        Self {
            name: name.into(),
            filters,
        }
    }
}

impl Consumer for LogConsumer {
    fn name(&self) -> &str {
        &self.name
    }

    fn filters(&self) -> &[EventFilter] {
        &self.filters
    }

    fn accept(&self, event: &Event<'_>) -> E2eResult<()> {
        info!("[{}] {}", self.name, describe(event));
        Ok(())
    }
}
