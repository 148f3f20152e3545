//! Reduction of per-package outcomes into a failure report

use crate::domain::{Aggregate, FailureReport, PackageOutcome};
use chrono::Utc;

/// Reduces a batch of outcomes into a [`FailureReport`] or all-clear
#[derive(Debug, Default, Clone, Copy)]
pub struct FailureAggregator;

impl FailureAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self
    }

    /// Aggregate outcomes; failures are sorted by package name
    pub fn aggregate(&self, outcomes: &[PackageOutcome]) -> Aggregate {
        let mut failures: Vec<PackageOutcome> = outcomes
            .iter()
            .filter(|o| o.is_failure())
            .cloned()
            .collect();

        if failures.is_empty() {
            return Aggregate::AllClear {
                total_checked: outcomes.len(),
            };
        }

        failures.sort_by(|a, b| a.package.cmp(&b.package));

        Aggregate::Failures(FailureReport {
            generated_at: Utc::now(),
            total_checked: outcomes.len(),
            total_failed: failures.len(),
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BuildRequestOutcome, FailureStage, VersionCheckResult};
    use crate::error::{CheckError, TriggerError};

    fn up_to_date(name: &str) -> PackageOutcome {
        PackageOutcome::up_to_date(VersionCheckResult::new(name, "1.0.0", "1.0.0"))
    }

    fn triggered(name: &str) -> PackageOutcome {
        PackageOutcome::triggered(
            VersionCheckResult::new(name, "1.0.0", "1.1.0"),
            BuildRequestOutcome::accepted(name, Some(7)),
        )
    }

    #[test]
    fn test_aggregate_all_clear() {
        let outcomes = vec![up_to_date("a"), triggered("b")];
        let result = FailureAggregator::new().aggregate(&outcomes);
        assert_eq!(result, Aggregate::AllClear { total_checked: 2 });
    }

    #[test]
    fn test_aggregate_empty_is_all_clear() {
        let result = FailureAggregator::new().aggregate(&[]);
        assert!(result.is_all_clear());
    }

    #[test]
    fn test_aggregate_sorted_failures() {
        let outcomes = vec![
            PackageOutcome::check_failed("zsh", &CheckError::unavailable("zsh", "HTTP 500")),
            up_to_date("bash"),
            PackageOutcome::trigger_failed(
                VersionCheckResult::new("fish", "3.0.0", "3.1.0"),
                &TriggerError::rejected("fish", "invalid chroot"),
            ),
        ];

        let report = match FailureAggregator::new().aggregate(&outcomes) {
            Aggregate::Failures(report) => report,
            other => panic!("Expected failures, got {:?}", other),
        };

        assert_eq!(report.total_checked, 3);
        assert_eq!(report.total_failed, 2);
        let names: Vec<_> = report.failures.iter().map(|o| o.package.as_str()).collect();
        assert_eq!(names, vec!["fish", "zsh"]);
        assert_eq!(report.failures[0].status.stage(), Some(FailureStage::Trigger));
        assert_eq!(report.failures[1].status.stage(), Some(FailureStage::Check));
    }
}
