//! Run summary

use lumen_common::Outcome;
use serde::{Deserialize, Serialize};

/// Aggregated outcome counts of all tests in a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub aborted: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Successful => self.succeeded += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Aborted => self.aborted += 1,
            Outcome::Disabled => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.aborted + self.skipped
    }

    /// Outcome of the whole run: failed as soon as one test failed or aborted
    pub fn outcome(&self) -> Outcome {
        if self.failed > 0 || self.aborted > 0 {
            Outcome::Failed
        } else {
            Outcome::Successful
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_run_is_successful() {
        assert_eq!(RunSummary::new().outcome(), Outcome::Successful);
    }

    #[test]
    fn test_skipped_tests_do_not_fail_the_run() {
        let mut summary = RunSummary::new();
        summary.record(Outcome::Successful);
        summary.record(Outcome::Disabled);
        assert_eq!(summary.outcome(), Outcome::Successful);
        assert_eq!(summary.total(), 2);
    }

    #[test]
    fn test_abort_fails_the_run() {
        let mut summary = RunSummary::new();
        summary.record(Outcome::Successful);
        summary.record(Outcome::Aborted);
        assert_eq!(summary.outcome(), Outcome::Failed);
    }
}
