//! Dispatch tests
//!
//! Routes lifecycle events through a dispatcher with several consumers.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lumen_common::{Interpolator, Outcome, AFTER, BEFORE, SUITE, TEST};
use lumen_e2e::{
    Consumer, Dispatcher, E2eError, E2eResult, Event, EventFilter, InMemoryReport,
    LogConsumer, NotificationConsumer, Notifier, ReportConsumer, RunSummary, TestContext,
    TestData,
};
use parking_lot::Mutex;
use serde_json::Value;

/// Counts accepted events, optionally failing or panicking on each
struct Probe {
    name: &'static str,
    filters: Vec<EventFilter>,
    accepted: Arc<AtomicUsize>,
    behaviour: Behaviour,
}

#[derive(Clone, Copy)]
enum Behaviour {
    Accept,
    Fail,
    Panic,
}

impl Probe {
    fn new(name: &'static str, filters: Vec<EventFilter>, behaviour: Behaviour) -> (Self, Arc<AtomicUsize>) {
        let accepted = Arc::new(AtomicUsize::new(0));
        let probe = Self {
            name,
            filters,
            accepted: accepted.clone(),
            behaviour,
        };
        (probe, accepted)
    }
}

impl Consumer for Probe {
    fn name(&self) -> &str {
        self.name
    }

    fn filters(&self) -> &[EventFilter] {
        &self.filters
    }

    fn accept(&self, _event: &Event<'_>) -> E2eResult<()> {
        self.accepted.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Accept => Ok(()),
            Behaviour::Fail => Err(E2eError::Notification("mail server down".to_string())),
            Behaviour::Panic => panic!("probe exploded"),
        }
    }
}

#[derive(Default, Clone)]
struct Outbox(Arc<Mutex<Vec<Value>>>);

impl Notifier for Outbox {
    fn send(&self, payload: &Value) -> E2eResult<()> {
        self.0.lock().push(payload.clone());
        Ok(())
    }
}

fn filter(reason: &str, tags: &[&str]) -> EventFilter {
    EventFilter::builder()
        .reason(reason)
        .tags(tags.iter().copied())
        .build()
        .unwrap()
}

#[test]
fn suite_before_is_consumed_once() {
    let (probe, accepted) = Probe::new("log", vec![filter(BEFORE, &[SUITE])], Behaviour::Accept);
    let dispatcher = Dispatcher::new().with_consumer(probe);

    let report = dispatcher.fire(None, None, Some("before"), None, Some(&["suite"]), None);

    assert_eq!(accepted.load(Ordering::SeqCst), 1);
    assert_eq!(report.count_for("log"), 1);
    assert!(report.is_clean());
}

#[test]
fn primary_id_alone_matches_filter_without_secondary() {
    let filters = vec![EventFilter::builder()
        .primary_id("Test.*")
        .reason("after")
        .build()
        .unwrap()];
    let (probe, accepted) = Probe::new("ids", filters, Behaviour::Accept);
    let dispatcher = Dispatcher::new().with_consumer(probe);

    dispatcher.fire(Some("Test1"), Some("login"), Some("after"), None, None, None);

    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_consumer_does_not_stop_dispatch() {
    let (failing, failing_count) = Probe::new("failing", vec![filter(BEFORE, &[SUITE])], Behaviour::Fail);
    let (healthy, healthy_count) = Probe::new("healthy", vec![filter(BEFORE, &[SUITE])], Behaviour::Accept);
    let dispatcher = Dispatcher::new().with_consumer(failing).with_consumer(healthy);

    let report = dispatcher.session_opened();

    assert_eq!(failing_count.load(Ordering::SeqCst), 1);
    assert_eq!(healthy_count.load(Ordering::SeqCst), 1);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].consumer, "failing");
    assert_eq!(
        failures[0].outcome,
        Err("Notification error: mail server down".to_string())
    );
}

#[test]
fn panicking_consumer_does_not_stop_dispatch() {
    let (panicking, _) = Probe::new("panicking", vec![filter(BEFORE, &[SUITE])], Behaviour::Panic);
    let (healthy, healthy_count) = Probe::new("healthy", vec![filter(BEFORE, &[SUITE])], Behaviour::Accept);
    let dispatcher = Dispatcher::new().with_consumer(panicking).with_consumer(healthy);

    let report = dispatcher.session_opened();

    assert_eq!(healthy_count.load(Ordering::SeqCst), 1);
    assert_eq!(
        report.consumptions[0].outcome,
        Err("panicked: probe exploded".to_string())
    );
    assert!(report.consumptions[1].is_ok());
}

#[test]
fn overlapping_filters_consume_once_each() {
    let filters = vec![
        filter(BEFORE, &[SUITE]),
        filter("before|after", &[SUITE, TEST]),
        filter(AFTER, &[SUITE]),
    ];
    let (probe, accepted) = Probe::new("slack", filters, Behaviour::Accept);
    let dispatcher = Dispatcher::new().with_consumer(probe);

    let report = dispatcher.session_opened();

    assert_eq!(accepted.load(Ordering::SeqCst), 2);
    assert_eq!(
        report.consumptions.iter().map(|c| c.filter).collect::<Vec<_>>(),
        vec![0, 1]
    );
}

#[test]
fn yaml_configured_consumers_route_a_run() {
    let filters = EventFilter::list_from_yaml(
        r#"
- reason: after
  tags: [suite]
- reason: after
  tags: [test]
  result: FAILED
"#,
        &Interpolator::new(),
    )
    .unwrap();

    let outbox = Outbox::default();
    let report_sink = Arc::new(InMemoryReport::new());
    let dispatcher = Dispatcher::new()
        .with_consumer(LogConsumer::new("log", vec![filter("before|after", &[SUITE, TEST])]))
        .with_consumer(ReportConsumer::new("report", vec![filter(AFTER, &[TEST])]))
        .with_consumer(NotificationConsumer::new("mail", filters, outbox.clone()));

    let mut summary = RunSummary::new();
    assert!(dispatcher.session_opened().is_clean());

    let context = TestContext::new(
        TestData::new(Path::new("reports"), "CheckoutIT", "pay"),
        Default::default(),
        report_sink.clone(),
    );
    let test_end = Event::builder()
        .primary_id("CheckoutIT")
        .secondary_id("pay")
        .reason(AFTER)
        .tags([TEST])
        .result(Outcome::Failed)
        .context(&context)
        .build();
    let report = dispatcher.dispatch(&test_end);
    summary.record(Outcome::Failed);

    assert!(report.is_clean());
    assert_eq!(report.count_for("log"), 1);
    assert_eq!(report.count_for("report"), 1);
    // result and reason both match the second filter
    assert_eq!(report.count_for("mail"), 1);

    let closed = dispatcher.session_closed(&summary);
    assert_eq!(closed.count_for("mail"), 1);
    assert_eq!(closed.count_for("report"), 0);

    let sent = outbox.0.lock();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0]["test"]["methodName"], "pay");
    assert_eq!(sent[1]["tags"], serde_json::json!(["suite"]));
    assert_eq!(sent[1]["result"], "FAILED");
    assert_eq!(report_sink.len(), 2);
}

#[test]
fn report_consumer_without_context_is_reported_as_failure() {
    let dispatcher =
        Dispatcher::new().with_consumer(ReportConsumer::new("report", vec![filter(AFTER, &[TEST])]));

    let report = dispatcher.fire_result(AFTER, &[TEST], Outcome::Successful);

    assert_eq!(report.failures().count(), 1);
}
