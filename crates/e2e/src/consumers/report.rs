use tracing::info;

use crate::consumer::Consumer;
use crate::error::{E2eError, E2eResult};
use crate::event::{Event, EventFilter};

/// Closes a test's report section when the test ends
pub struct ReportConsumer {
    name: String,
    filters: Vec<EventFilter>,
}

impl ReportConsumer {
    pub fn new(name: impl Into<String>, filters: Vec<EventFilter>) -> Self {
        Self {
            name: name.into(),
            filters,
        }
    }
}

impl Consumer for ReportConsumer {
    fn name(&self) -> &str {
        &self.name
    }

    fn filters(&self) -> &[EventFilter] {
        &self.filters
    }

    fn accept(&self, event: &Event<'_>) -> E2eResult<()> {
        let context = event
            .context
            .ok_or_else(|| E2eError::MissingContext(self.name.clone()))?;
        let result = event.result.ok_or_else(|| E2eError::Consumer {
            consumer: self.name.clone(),
            reason: "event carries no result".to_string(),
        })?;

        let test = context.test_data();
        let status = result.status();
        let message = format!(
            "END execution of '{} -> {}': {}",
            test.class_name, test.method_name, status
        );

        info!("{}", message);
        context.report().info(&message);
        context.report().test_end(test, status);
        Ok(())
    }
}
