//! Per-package update task
//!
//! Checks the upstream version and, when a newer release exists, submits
//! a rebuild. Every terminal state is returned as a [`PackageOutcome`];
//! errors never escape the task.
//!
//! The packaged version is the newer of the configured one and the last
//! successful build reported by the build service, so a rebuild submitted
//! by an earlier run is not submitted again once it has succeeded.

use crate::build::SubmissionGuard;
use crate::cancel::CancelToken;
use crate::domain::version::is_newer;
use crate::domain::{PackageOutcome, PackageSpec, VersionCheckResult};
use crate::error::CheckError;
use crate::upstream::UpstreamVersionClient;
use std::sync::Arc;

/// Check-then-trigger pipeline for a single package
pub struct PackageUpdateTask {
    upstream: Arc<dyn UpstreamVersionClient>,
    builds: Arc<SubmissionGuard>,
}

impl PackageUpdateTask {
    /// Create a task from the two service clients
    pub fn new(upstream: Arc<dyn UpstreamVersionClient>, builds: Arc<SubmissionGuard>) -> Self {
        Self { upstream, builds }
    }

    /// Run the task for `spec`
    ///
    /// Returns `None` if cancellation was observed before a terminal state
    /// was reached. A build submission that has already been issued is
    /// always awaited to completion.
    pub async fn run(&self, spec: &PackageSpec, cancel: &CancelToken) -> Option<PackageOutcome> {
        let checked = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(package = %spec.name, "abandoned during version check");
                return None;
            }
            result = self.check(spec) => result,
        };

        let check = match checked {
            Ok(check) => check,
            Err(e) => {
                tracing::error!(package = %spec.name, error = %e, "version check failed");
                return Some(PackageOutcome::check_failed(&spec.name, &e));
            }
        };

        if !check.needs_update {
            tracing::info!(package = %spec.name, version = %check.current_version, "up to date");
            return Some(PackageOutcome::up_to_date(check));
        }

        if cancel.is_cancelled() {
            tracing::debug!(package = %spec.name, "abandoned before build submission");
            return None;
        }

        match self.builds.trigger(spec, &check).await {
            Ok(build) => {
                tracing::info!(
                    package = %spec.name,
                    from = %check.current_version,
                    to = %check.latest_version,
                    "rebuild triggered"
                );
                Some(PackageOutcome::triggered(check, build))
            }
            Err(e) => {
                tracing::error!(package = %spec.name, error = %e, "build trigger failed");
                Some(PackageOutcome::trigger_failed(check, &e))
            }
        }
    }

    /// Compare upstream against the packaged version
    ///
    /// The build service is only asked when the configured version is
    /// behind upstream.
    async fn check(&self, spec: &PackageSpec) -> Result<VersionCheckResult, CheckError> {
        let upstream = self.upstream.check(spec).await?;
        if !upstream.needs_update {
            return Ok(upstream);
        }

        match self.builds.packaged_version(spec).await? {
            Some(built) if is_newer(&built, &upstream.current_version) => {
                tracing::debug!(
                    package = %spec.name,
                    configured = %upstream.current_version,
                    built = %built,
                    "build service is ahead of the package list"
                );
                Ok(VersionCheckResult::new(&spec.name, built, upstream.latest_version))
            }
            _ => Ok(upstream),
        }
    }
}
