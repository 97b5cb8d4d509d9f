//! Lumen test-execution observability
//!
//! This crate routes test lifecycle events to pluggable consumers and turns
//! browser interactions into logs, report entries, screenshots and videos:
//! - Builds events and dispatches them synchronously to consumers
//! - Matches events against regex-based filters
//! - Intercepts every driver and element call through a decorator
//! - Records frames and assembles them into one video per test
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Test runner (caller)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MonitoredDriver / MonitoredElement                         │
//! │    └── EventsListener                                       │
//! │          ├── before / after / onError hooks                 │
//! │          ├── log + ReportSink                               │
//! │          └── FrameRecorder -> screenshots/<class>/<method>  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Dispatcher::fire(...) -> DispatchReport                    │
//! │    └── for each Consumer, for each matching EventFilter     │
//! │          ├── LogConsumer                                    │
//! │          ├── ReportConsumer                                 │
//! │          ├── NotificationConsumer -> Notifier               │
//! │          └── VideoConsumer -> videos/<class>/<method>       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod consumer;
pub mod consumers;
pub mod context;
pub mod dispatcher;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod event;
pub mod listener;
pub mod matching;
pub mod monitored;
pub mod operation;
pub mod recorder;
pub mod report;
pub mod summary;

pub use consumer::{Consumer, Consumption};
pub use consumers::{LogConsumer, NotificationConsumer, Notifier, ReportConsumer, VideoConsumer};
pub use context::{ExecutionContext, TestContext, TestData};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use driver::{By, Cookie, TakesScreenshot, WebDriver, WebElement, WindowSize};
pub use encoder::{EncoderFactory, FfmpegEncoderFactory, VideoEncoder};
pub use error::{E2eError, E2eResult};
pub use event::{Event, EventFilter, Pattern};
pub use listener::EventsListener;
pub use monitored::{MonitoredDriver, MonitoredElement};
pub use operation::{Arg, Call, Group, Operation};
pub use recorder::{Frame, FrameRecorder, RecordingPolicy};
pub use report::{InMemoryReport, ReportSink};
pub use summary::RunSummary;
