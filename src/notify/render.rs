//! Plain-text rendering of run reports

use crate::domain::{FailureReport, PackageOutcome, RunVerdict};
use std::fmt::Write;

/// Subject prefix for every message
pub const SUBJECT_PREFIX: &str = "[Alpa-autoupdate]";

/// HTML part appended to every message
pub const HTML_FOOTNOTE: &str = r#"<html>
  <body>
    <h4>
      This is automatically generated email via alpa-autoupdate tool.
      Don't reply to this email.
    </h4>
    If you want to know more about alpa project, please visit
    <a href="https://github.com/alpa-team">our GitHub organization</a>.
  </body>
</html>
"#;

/// A rendered message ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Render the run summary for the bot account; `None` when there is nothing to report
pub fn render_run_report(
    verdict: &RunVerdict,
    to: &str,
    confirm_all_clear: bool,
) -> Option<Email> {
    match verdict {
        RunVerdict::AllClear { total_checked } if confirm_all_clear => Some(Email {
            to: to.to_string(),
            subject: format!(
                "{} All {} packages up to date or rebuilt",
                SUBJECT_PREFIX, total_checked
            ),
            body: format!(
                "Hello! The scheduled update run finished without failures.\n\n\
                 Packages checked: {}\n",
                total_checked
            ),
        }),
        RunVerdict::AllClear { .. } => None,
        RunVerdict::Failed(report) => Some(Email {
            to: to.to_string(),
            subject: format!(
                "{} {} of {} package updates failed",
                SUBJECT_PREFIX, report.total_failed, report.total_checked
            ),
            body: render_failures(report),
        }),
        RunVerdict::Incomplete { report, abandoned } => {
            let mut body = String::from(
                "Hello! The scheduled update run was cancelled before every package finished.\n\n",
            );
            if let Some(report) = report {
                body.push_str(&render_failures(report));
                body.push('\n');
            }
            let _ = writeln!(body, "Packages not processed ({}):", abandoned.len());
            for name in abandoned {
                let _ = writeln!(body, "  - {}", name);
            }
            Some(Email {
                to: to.to_string(),
                subject: format!(
                    "{} Update run incomplete, {} packages not processed",
                    SUBJECT_PREFIX,
                    abandoned.len()
                ),
                body,
            })
        }
    }
}

/// Render the message sent to a maintainer of one failed package
pub fn render_maintainer_notice(outcome: &PackageOutcome, to: &str) -> Email {
    let stage = outcome
        .status
        .stage()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut body = format!(
        "Hello! We want to notify you, that your scheduled update of package {} failed.\n\n",
        outcome.package
    );
    let _ = writeln!(body, "Stage: {}", stage);
    if let Some(error) = &outcome.error {
        let _ = writeln!(body, "Error: {}", error);
    }
    if let Some(check) = &outcome.check {
        let _ = writeln!(
            body,
            "Packaged version: {}, upstream version: {}",
            check.current_version, check.latest_version
        );
    }

    Email {
        to: to.to_string(),
        subject: format!(
            "{} Your update of package {} failed",
            SUBJECT_PREFIX, outcome.package
        ),
        body,
    }
}

fn render_failures(report: &FailureReport) -> String {
    let mut body = format!(
        "Hello! The scheduled update run on {} finished with failures.\n\n\
         Packages checked: {}\nPackages failed: {}\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.total_checked,
        report.total_failed
    );

    for outcome in &report.failures {
        let stage = outcome
            .status
            .stage()
            .map(|s| s.to_string())
            .unwrap_or_else(|| outcome.status.to_string());
        let _ = writeln!(
            body,
            "  - {} [{}]: {}",
            outcome.package,
            stage,
            outcome.error.as_deref().unwrap_or("no detail")
        );
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionCheckResult;
    use crate::error::{CheckError, TriggerError};
    use chrono::Utc;

    fn report() -> FailureReport {
        FailureReport {
            generated_at: Utc::now(),
            total_checked: 3,
            total_failed: 2,
            failures: vec![
                PackageOutcome::check_failed("c", &CheckError::unavailable("c", "HTTP 503")),
                PackageOutcome::trigger_failed(
                    VersionCheckResult::new("d", "1.0", "1.1"),
                    &TriggerError::rejected("d", "quota exceeded"),
                ),
            ],
        }
    }

    #[test]
    fn test_all_clear_renders_nothing() {
        let verdict = RunVerdict::AllClear { total_checked: 4 };
        assert!(render_run_report(&verdict, "bot@example.org", false).is_none());
    }

    #[test]
    fn test_all_clear_confirmation_in_debug() {
        let verdict = RunVerdict::AllClear { total_checked: 4 };
        let email = render_run_report(&verdict, "bot@example.org", true).unwrap();
        assert!(email.subject.contains("All 4 packages"));
        assert!(email.body.contains("without failures"));
    }

    #[test]
    fn test_failed_report_lists_stage_and_detail() {
        let email =
            render_run_report(&RunVerdict::Failed(report()), "bot@example.org", false).unwrap();
        assert_eq!(email.to, "bot@example.org");
        assert!(email.subject.starts_with(SUBJECT_PREFIX));
        assert!(email.subject.contains("2 of 3"));
        assert!(email.body.contains("c [check]"));
        assert!(email.body.contains("HTTP 503"));
        assert!(email.body.contains("d [trigger]"));
        assert!(email.body.contains("quota exceeded"));
    }

    #[test]
    fn test_incomplete_lists_abandoned() {
        let verdict = RunVerdict::Incomplete {
            report: None,
            abandoned: vec!["x".to_string(), "y".to_string()],
        };
        let email = render_run_report(&verdict, "bot@example.org", false).unwrap();
        assert!(email.subject.contains("incomplete"));
        assert!(email.body.contains("Packages not processed (2)"));
        assert!(email.body.contains("  - y"));
    }

    #[test]
    fn test_maintainer_notice() {
        let failures = report().failures;
        let email = render_maintainer_notice(&failures[1], "me@example.org");
        assert_eq!(email.to, "me@example.org");
        assert!(email.subject.contains("package d failed"));
        assert!(email.body.contains("Stage: trigger"));
        assert!(email.body.contains("upstream version: 1.1"));
    }

    #[test]
    fn test_aborted_package_claims_no_stage() {
        let aborted = PackageOutcome::aborted("e", "update task terminated unexpectedly");
        let mut report = report();
        report.failures.push(aborted.clone());
        report.total_failed = 3;

        let email =
            render_run_report(&RunVerdict::Failed(report), "bot@example.org", false).unwrap();
        assert!(email.body.contains("e [aborted]: update task terminated unexpectedly"));

        let notice = render_maintainer_notice(&aborted, "me@example.org");
        assert!(notice.body.contains("Stage: unknown"));
    }

    #[test]
    fn test_html_footnote() {
        assert!(HTML_FOOTNOTE.contains("Don't reply"));
    }
}
