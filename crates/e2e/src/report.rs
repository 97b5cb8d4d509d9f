//! Report sink
//!
//! The HTML report itself is rendered elsewhere; this module only defines
//! what gets written into it.

use lumen_common::Status;
use parking_lot::Mutex;

use crate::context::TestData;

/// Destination of report entries for one test
pub trait ReportSink: Send + Sync {
    /// Informational entry; the message may carry inline markup
    fn info(&self, message: &str);

    /// Warning-styled entry; the message may carry inline markup
    fn warning(&self, message: &str);

    /// Close the test's section with its final status
    fn test_end(&self, test: &TestData, status: Status);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEntry {
    Info(String),
    Warning(String),
    TestEnd {
        class_name: String,
        method_name: String,
        status: Status,
    },
}

/// Report sink that keeps entries in memory, in arrival order
#[derive(Debug, Default)]
pub struct InMemoryReport {
    entries: Mutex<Vec<ReportEntry>>,
}

impl InMemoryReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ReportEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl ReportSink for InMemoryReport {
    fn info(&self, message: &str) {
        self.entries.lock().push(ReportEntry::Info(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.entries
            .lock()
            .push(ReportEntry::Warning(message.to_string()));
    }

    fn test_end(&self, test: &TestData, status: Status) {
        self.entries.lock().push(ReportEntry::TestEnd {
            class_name: test.class_name.clone(),
            method_name: test.method_name.clone(),
            status,
        });
    }
}
