//! JSON output formatter for machine processing

use crate::domain::{PackageOutcome, RunVerdict};
use crate::orchestrator::RunSummary;
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Process exit status
    exit_status: u8,
    /// Final classification
    verdict: &'a RunVerdict,
    /// Counts
    summary: JsonSummary,
    /// Per-package outcomes (omitted in quiet mode)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    outcomes: Vec<&'a PackageOutcome>,
    /// Notification errors
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notification_errors: Vec<String>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    checked: usize,
    submitted: usize,
    failed: usize,
    notifications_sent: usize,
    elapsed_ms: u64,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let outcomes = if self.verbosity == Verbosity::Quiet {
            Vec::new()
        } else {
            summary.outcomes.iter().collect()
        };

        let output = JsonOutput {
            exit_status: summary.verdict.exit_status(),
            verdict: &summary.verdict,
            summary: JsonSummary {
                checked: summary.outcomes.len(),
                submitted: summary.submitted,
                failed: summary.outcomes.iter().filter(|o| o.is_failure()).count(),
                notifications_sent: summary.notifications.delivered,
                elapsed_ms: summary.elapsed.as_millis() as u64,
            },
            outcomes,
            notification_errors: summary
                .notifications
                .failed
                .iter()
                .map(|e| e.to_string())
                .collect(),
        };

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BuildRequestOutcome, VersionCheckResult};
    use crate::error::NotifyError;
    use crate::notify::DispatchSummary;
    use std::time::Duration;

    fn create_summary() -> RunSummary {
        RunSummary {
            outcomes: vec![PackageOutcome::triggered(
                VersionCheckResult::new("ripgrep", "14.0.0", "14.1.0"),
                BuildRequestOutcome::accepted("ripgrep", Some(7001)),
            )],
            verdict: RunVerdict::AllClear { total_checked: 1 },
            submitted: 1,
            notifications: DispatchSummary {
                delivered: 0,
                failed: vec![NotifyError::undeliverable("bot@example.org", "timeout")],
            },
            elapsed: Duration::from_millis(1500),
        }
    }

    fn render(verbosity: Verbosity) -> serde_json::Value {
        let mut output = Vec::new();
        JsonFormatter::new(verbosity)
            .format(&create_summary(), &mut output)
            .unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn test_json_output_structure() {
        let json = render(Verbosity::Normal);
        assert_eq!(json["exit_status"], 0);
        assert_eq!(json["verdict"]["status"], "all_clear");
        assert_eq!(json["summary"]["checked"], 1);
        assert_eq!(json["summary"]["submitted"], 1);
        assert_eq!(json["summary"]["elapsed_ms"], 1500);
        assert_eq!(json["outcomes"][0]["package"], "ripgrep");
        assert_eq!(json["outcomes"][0]["build_id"], 7001);
        assert!(json["notification_errors"][0]
            .as_str()
            .unwrap()
            .contains("timeout"));
    }

    #[test]
    fn test_json_quiet_omits_outcomes() {
        let json = render(Verbosity::Quiet);
        assert!(json.get("outcomes").is_none());
        assert_eq!(json["summary"]["checked"], 1);
    }
}
