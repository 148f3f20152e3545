//! Failure notifications
//!
//! This module provides:
//! - Rendering of run reports and per-maintainer notices
//! - The mail transport seam and its SMTP implementation
//! - Dispatch that logs delivery failures instead of propagating them

mod render;
mod smtp;

pub use render::{
    render_maintainer_notice, render_run_report, Email, HTML_FOOTNOTE, SUBJECT_PREFIX,
};
pub use smtp::{SmtpSettings, SmtpTransport};

use crate::domain::{PackageSpec, RunVerdict};
use crate::error::NotifyError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Delivers one rendered message
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send `email`
    async fn send(&self, email: &Email) -> Result<(), NotifyError>;
}

/// Counts of a dispatch
#[derive(Debug, Default)]
pub struct DispatchSummary {
    /// Messages accepted by the transport
    pub delivered: usize,
    /// Messages the transport refused
    pub failed: Vec<NotifyError>,
}

/// Renders run reports and hands them to a [`MailTransport`]
pub struct NotificationDispatcher {
    transport: Arc<dyn MailTransport>,
    recipient: String,
    debug: bool,
}

impl NotificationDispatcher {
    /// Create a dispatcher sending run reports to `recipient`
    pub fn new(
        transport: Arc<dyn MailTransport>,
        recipient: impl Into<String>,
        debug: bool,
    ) -> Self {
        Self {
            transport,
            recipient: recipient.into(),
            debug,
        }
    }

    /// Send the run report and maintainer notices for `verdict`
    ///
    /// Nothing is sent for an all-clear run unless debug mode is on.
    /// Delivery failures are logged and counted, never returned.
    pub async fn dispatch(&self, verdict: &RunVerdict, specs: &[PackageSpec]) -> DispatchSummary {
        let mut messages = Vec::new();

        if let Some(email) = render_run_report(verdict, &self.recipient, self.debug) {
            messages.push(email);
        }

        if let Some(report) = verdict.report() {
            let maintainers: HashMap<&str, &[String]> = specs
                .iter()
                .map(|s| (s.name.as_str(), s.maintainers.as_slice()))
                .collect();

            for outcome in &report.failures {
                let addresses = maintainers
                    .get(outcome.package.as_str())
                    .copied()
                    .unwrap_or_default();
                for address in addresses {
                    messages.push(render_maintainer_notice(outcome, address));
                }
            }
        }

        let mut summary = DispatchSummary::default();
        for email in &messages {
            match self.transport.send(email).await {
                Ok(()) => {
                    tracing::info!(to = %email.to, subject = %email.subject, "notification sent");
                    summary.delivered += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, "sending notification failed");
                    summary.failed.push(e);
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FailureReport, PackageOutcome};
    use crate::error::CheckError;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<Email>>,
        reject: bool,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, email: &Email) -> Result<(), NotifyError> {
            if self.reject {
                return Err(NotifyError::undeliverable(&email.to, "535 authentication failed"));
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn failed_verdict() -> RunVerdict {
        RunVerdict::Failed(FailureReport {
            generated_at: Utc::now(),
            total_checked: 2,
            total_failed: 1,
            failures: vec![PackageOutcome::check_failed(
                "c",
                &CheckError::unknown("c", "c-upstream"),
            )],
        })
    }

    fn specs() -> Vec<PackageSpec> {
        vec![
            PackageSpec::new("a", "1.0", "o", "p"),
            PackageSpec::new("c", "1.0", "o", "p").with_maintainers(vec![
                "one@example.org".to_string(),
                "two@example.org".to_string(),
            ]),
        ]
    }

    #[tokio::test]
    async fn test_all_clear_sends_nothing() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = NotificationDispatcher::new(transport.clone(), "bot@example.org", false);

        let summary = dispatcher
            .dispatch(&RunVerdict::AllClear { total_checked: 2 }, &specs())
            .await;

        assert_eq!(summary.delivered, 0);
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_clear_debug_sends_confirmation() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = NotificationDispatcher::new(transport.clone(), "bot@example.org", true);

        let summary = dispatcher
            .dispatch(&RunVerdict::AllClear { total_checked: 2 }, &specs())
            .await;

        assert_eq!(summary.delivered, 1);
        assert_eq!(transport.sent.lock().unwrap()[0].to, "bot@example.org");
    }

    #[tokio::test]
    async fn test_failures_notify_bot_and_maintainers() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = NotificationDispatcher::new(transport.clone(), "bot@example.org", false);

        let summary = dispatcher.dispatch(&failed_verdict(), &specs()).await;

        assert_eq!(summary.delivered, 3);
        let sent = transport.sent.lock().unwrap();
        let recipients: Vec<_> = sent.iter().map(|e| e.to.as_str()).collect();
        assert_eq!(
            recipients,
            vec!["bot@example.org", "one@example.org", "two@example.org"]
        );
        assert!(sent[0].body.contains("c [check]"));
    }

    #[tokio::test]
    async fn test_rejected_transport_is_reported_not_raised() {
        let transport = Arc::new(RecordingTransport {
            reject: true,
            ..Default::default()
        });
        let dispatcher = NotificationDispatcher::new(transport, "bot@example.org", false);

        let summary = dispatcher.dispatch(&failed_verdict(), &[]).await;

        assert_eq!(summary.delivered, 0);
        assert_eq!(summary.failed.len(), 1);
        assert!(matches!(
            summary.failed[0],
            NotifyError::NotificationUndeliverable { .. }
        ));
    }
}
