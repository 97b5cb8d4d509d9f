//! Built-in consumers

mod log;
mod notification;
mod report;
mod video;

pub use log::LogConsumer;
pub use notification::{NotificationConsumer, Notifier};
pub use report::ReportConsumer;
pub use video::{collect_frames, fit, make_even, target_size, VideoConsumer, PLACEHOLDER_PNG};

use crate::event::Event;

/// One-line description of an event, used by log and notification output
pub(crate) fn describe(event: &Event<'_>) -> String {
    let mut parts = Vec::new();

    if let Some(primary_id) = &event.primary_id {
        match &event.secondary_id {
            Some(secondary_id) => parts.push(format!("{} -> {}", primary_id, secondary_id)),
            None => parts.push(primary_id.clone()),
        }
    }
    if let Some(reason) = &event.reason {
        parts.push(reason.clone());
    }
    if let Some(tags) = &event.tags {
        let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
        parts.push(format!("[{}]", tags.join(", ")));
    }
    if let Some(result) = event.result {
        parts.push(result.to_string());
    }

    parts.join(" ")
}
