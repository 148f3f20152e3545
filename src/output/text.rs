//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One line per package, colored by outcome
//! - A summary with counts per outcome and the run verdict
//! - Packages left unprocessed by a cancelled run

use crate::domain::{OutcomeStatus, PackageOutcome, RunVerdict};
use crate::orchestrator::RunSummary;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn paint(&self, text: &str, status: OutcomeStatus) -> String {
        if !self.color {
            return text.to_string();
        }
        match status {
            OutcomeStatus::UpToDate => text.dimmed().to_string(),
            OutcomeStatus::UpdateTriggered => text.green().to_string(),
            _ => text.red().to_string(),
        }
    }

    fn is_listed(&self, outcome: &PackageOutcome) -> bool {
        match self.verbosity {
            Verbosity::Quiet => false,
            Verbosity::Normal => outcome.status != OutcomeStatus::UpToDate,
            Verbosity::Verbose => true,
        }
    }

    fn format_outcome(
        &self,
        outcome: &PackageOutcome,
        name_width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let marker = match outcome.status {
            OutcomeStatus::UpToDate => "=",
            OutcomeStatus::UpdateTriggered => "↑",
            _ => "✗",
        };

        let detail = match (&outcome.status, &outcome.check) {
            (OutcomeStatus::UpdateTriggered, Some(check)) => {
                let build = outcome
                    .build_id
                    .map(|id| format!(", build {}", id))
                    .unwrap_or_default();
                format!(
                    "{} → {}{}",
                    check.current_version, check.latest_version, build
                )
            }
            (OutcomeStatus::UpToDate, Some(check)) => check.current_version.clone(),
            _ => outcome.error.clone().unwrap_or_default(),
        };

        writeln!(
            writer,
            "  {} {:<width$}  {}",
            self.paint(marker, outcome.status),
            outcome.package,
            self.paint(&detail, outcome.status),
            width = name_width
        )
    }

    fn format_summary(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let count = |status: OutcomeStatus| {
            summary
                .outcomes
                .iter()
                .filter(|o| o.status == status)
                .count()
        };
        let triggered = count(OutcomeStatus::UpdateTriggered);
        let up_to_date = count(OutcomeStatus::UpToDate);
        let failed = summary.outcomes.iter().filter(|o| o.is_failure()).count();

        if self.verbosity == Verbosity::Quiet {
            let line = format!(
                "{} triggered, {} up to date, {} failed",
                triggered, up_to_date, failed
            );
            return writeln!(writer, "{}", line);
        }

        if self.color {
            writeln!(writer, "{}:", "Summary".bold())?;
        } else {
            writeln!(writer, "Summary:")?;
        }
        writeln!(writer, "  {} package(s) checked", summary.outcomes.len())?;
        writeln!(
            writer,
            "  {} rebuild(s) triggered",
            self.paint(&triggered.to_string(), OutcomeStatus::UpdateTriggered)
        )?;
        writeln!(writer, "  {} up to date", up_to_date)?;
        if failed > 0 {
            writeln!(
                writer,
                "  {} failed",
                self.paint(&failed.to_string(), OutcomeStatus::CheckFailed)
            )?;
        }
        if summary.notifications.delivered > 0 || !summary.notifications.failed.is_empty() {
            writeln!(
                writer,
                "  {} notification(s) sent, {} undeliverable",
                summary.notifications.delivered,
                summary.notifications.failed.len()
            )?;
        }

        if let RunVerdict::Incomplete { abandoned, .. } = &summary.verdict {
            writeln!(writer)?;
            let heading = format!("Cancelled, {} package(s) not processed:", abandoned.len());
            if self.color {
                writeln!(writer, "{}", heading.yellow())?;
            } else {
                writeln!(writer, "{}", heading)?;
            }
            for name in abandoned {
                writeln!(writer, "  - {}", name)?;
            }
        }

        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let listed: Vec<&PackageOutcome> = summary
            .outcomes
            .iter()
            .filter(|o| self.is_listed(o))
            .collect();

        if !listed.is_empty() {
            let name_width = listed.iter().map(|o| o.package.len()).max().unwrap_or(0);
            for outcome in listed {
                self.format_outcome(outcome, name_width, writer)?;
            }
            writeln!(writer)?;
        }

        self.format_summary(summary, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BuildRequestOutcome, VersionCheckResult};
    use crate::error::CheckError;
    use crate::notify::DispatchSummary;
    use std::time::Duration;

    fn create_summary(verdict: RunVerdict) -> RunSummary {
        RunSummary {
            outcomes: vec![
                PackageOutcome::up_to_date(VersionCheckResult::new("htop", "3.3.0", "3.3.0")),
                PackageOutcome::triggered(
                    VersionCheckResult::new("ripgrep", "14.0.0", "14.1.0"),
                    BuildRequestOutcome::accepted("ripgrep", Some(7001)),
                ),
                PackageOutcome::check_failed("zola", &CheckError::unavailable("zola", "HTTP 503")),
            ],
            verdict,
            submitted: 1,
            notifications: DispatchSummary::default(),
            elapsed: Duration::from_millis(10),
        }
    }

    fn render(verbosity: Verbosity, summary: &RunSummary) -> String {
        let formatter = TextFormatter::with_color(verbosity, false);
        let mut output = Vec::new();
        formatter.format(summary, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_format_normal_hides_up_to_date() {
        let summary = create_summary(RunVerdict::AllClear { total_checked: 3 });
        let output = render(Verbosity::Normal, &summary);
        assert!(output.contains("ripgrep"));
        assert!(output.contains("14.0.0 → 14.1.0, build 7001"));
        assert!(output.contains("zola"));
        assert!(output.contains("HTTP 503"));
        assert!(!output.contains("  = htop"));
        assert!(output.contains("3 package(s) checked"));
        assert!(output.contains("1 failed"));
    }

    #[test]
    fn test_format_verbose_lists_everything() {
        let summary = create_summary(RunVerdict::AllClear { total_checked: 3 });
        let output = render(Verbosity::Verbose, &summary);
        assert!(output.contains("= htop"));
    }

    #[test]
    fn test_format_quiet() {
        let summary = create_summary(RunVerdict::AllClear { total_checked: 3 });
        let output = render(Verbosity::Quiet, &summary);
        assert_eq!(output, "1 triggered, 1 up to date, 1 failed\n");
    }

    #[test]
    fn test_format_incomplete_lists_abandoned() {
        let summary = create_summary(RunVerdict::Incomplete {
            report: None,
            abandoned: vec!["yq".to_string()],
        });
        let output = render(Verbosity::Normal, &summary);
        assert!(output.contains("Cancelled, 1 package(s) not processed:"));
        assert!(output.contains("  - yq"));
    }
}
