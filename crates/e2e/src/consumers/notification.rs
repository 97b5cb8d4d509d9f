use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use super::describe;
use crate::consumer::Consumer;
use crate::error::E2eResult;
use crate::event::{Event, EventFilter};

/// Delivery transport of a notification (chat, mail, ...)
pub trait Notifier: Send + Sync {
    fn send(&self, payload: &Value) -> E2eResult<()>;
}

/// Sends a JSON description of every matched event through a [`Notifier`]
pub struct NotificationConsumer {
    name: String,
    filters: Vec<EventFilter>,
    notifier: Box<dyn Notifier>,
}

impl NotificationConsumer {
    pub fn new(
        name: impl Into<String>,
        filters: Vec<EventFilter>,
        notifier: impl Notifier + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            filters,
            notifier: Box::new(notifier),
        }
    }

    pub fn payload(&self, event: &Event<'_>) -> Value {
        let mut payload = json!({
            "consumer": self.name,
            "summary": describe(event),
            "primaryId": event.primary_id,
            "secondaryId": event.secondary_id,
            "reason": event.reason,
            "result": event.result,
            "tags": event.tags,
            "timestamp": Utc::now().to_rfc3339(),
        });

        if let Some(context) = event.context {
            let test = context.test_data();
            payload["test"] = json!({
                "className": test.class_name,
                "methodName": test.method_name,
            });
        }

        payload
    }
}

impl Consumer for NotificationConsumer {
    fn name(&self) -> &str {
        &self.name
    }

    fn filters(&self) -> &[EventFilter] {
        &self.filters
    }

    fn accept(&self, event: &Event<'_>) -> E2eResult<()> {
        let payload = self.payload(event);
        debug!("{} sending {}", self.name, payload);
        self.notifier.send(&payload)
    }
}
