//! Run orchestrator coordinating the whole update run
//!
//! This module provides:
//! - Workflow coordination: check → trigger → aggregate → notify
//! - Construction of the service clients from a validated [`RunConfig`]
//! - A run summary that carries the verdict and notification counts

use crate::aggregate::FailureAggregator;
use crate::build::{BuildTriggerClient, CoprClient, SubmissionGuard};
use crate::cancel::CancelToken;
use crate::config::RunConfig;
use crate::domain::{PackageOutcome, PackageSpec, RunVerdict};
use crate::error::AppError;
use crate::http::HttpClient;
use crate::notify::{DispatchSummary, MailTransport, NotificationDispatcher, SmtpTransport};
use crate::progress::Progress;
use crate::runner::BatchRunner;
use crate::task::PackageUpdateTask;
use crate::upstream::{AnityaClient, UpstreamVersionClient};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Orchestrator for one update run
pub struct Orchestrator {
    upstream: Arc<dyn UpstreamVersionClient>,
    builds: Arc<dyn BuildTriggerClient>,
    dispatcher: NotificationDispatcher,
    max_concurrency: usize,
}

/// Result of a finished or cancelled run
#[derive(Debug)]
pub struct RunSummary {
    /// Outcomes in package-list order
    pub outcomes: Vec<PackageOutcome>,
    /// Final classification
    pub verdict: RunVerdict,
    /// Rebuilds submitted
    pub submitted: usize,
    /// Notification delivery counts
    pub notifications: DispatchSummary,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl Orchestrator {
    /// Create an orchestrator talking to the configured services
    pub fn new(config: &RunConfig) -> Result<Self, AppError> {
        let check_client = HttpClient::new()?.with_max_retries(config.check_retries);
        let build_client = HttpClient::new()?;

        let upstream = AnityaClient::with_base_url(check_client, &config.anitya_url);
        let builds = CoprClient::with_base_url(
            build_client,
            &config.copr_url,
            config.copr_credentials.clone(),
        );
        if config.copr_credentials.is_none() {
            tracing::warn!("no Copr credentials configured, rebuilds will fail");
        }

        let transport = SmtpTransport::new(&config.smtp)?;

        Ok(Self::with_clients(
            config,
            Arc::new(upstream),
            Arc::new(builds),
            Arc::new(transport),
        ))
    }

    /// Create an orchestrator with custom service clients (for testing)
    pub fn with_clients(
        config: &RunConfig,
        upstream: Arc<dyn UpstreamVersionClient>,
        builds: Arc<dyn BuildTriggerClient>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            upstream,
            builds,
            dispatcher: NotificationDispatcher::new(
                transport,
                config.recipient.clone(),
                config.debug,
            ),
            max_concurrency: config.max_concurrency,
        }
    }

    /// Run every package, classify the run and send notifications
    pub async fn run(
        &self,
        specs: Vec<PackageSpec>,
        cancel: CancelToken,
        progress: &mut Progress,
    ) -> RunSummary {
        let started = Instant::now();
        tracing::info!(
            upstream = self.upstream.service_name(),
            builds = self.builds.service_name(),
            "update run started"
        );

        let guard = Arc::new(SubmissionGuard::new(Arc::clone(&self.builds)));
        let task = PackageUpdateTask::new(Arc::clone(&self.upstream), Arc::clone(&guard));
        let runner = BatchRunner::new(task, self.max_concurrency);

        let batch = runner.run(specs.clone(), cancel, progress).await;

        let aggregate = FailureAggregator::new().aggregate(&batch.outcomes);
        let incomplete = !batch.is_complete();
        let verdict = RunVerdict::new(aggregate, incomplete, batch.abandoned);

        let notifications = self.dispatcher.dispatch(&verdict, &specs).await;
        if !notifications.failed.is_empty() {
            tracing::warn!(
                failed = notifications.failed.len(),
                "some notifications could not be delivered"
            );
        }

        let summary = RunSummary {
            outcomes: batch.outcomes,
            verdict,
            submitted: guard.submitted_count(),
            notifications,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            exit_status = summary.verdict.exit_status(),
            submitted = summary.submitted,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "update run finished"
        );

        summary
    }
}
