//! Rebuild submission
//!
//! This module provides:
//! - Copr API v3 adapter, which also reports the last successfully built version
//! - A per-run guard that keeps submissions at most once per package

mod copr;
mod guard;

pub use copr::{CoprClient, CoprCredentials, DEFAULT_COPR_URL};
pub use guard::SubmissionGuard;

use crate::domain::{BuildRequestOutcome, PackageSpec, VersionCheckResult};
use crate::error::{CheckError, TriggerError};
use async_trait::async_trait;

/// Requests a rebuild of one package
///
/// Only submission is covered: implementations return as soon as the
/// service has accepted or declined the request and never wait for the
/// build itself.
#[async_trait]
pub trait BuildTriggerClient: Send + Sync {
    /// Get the service name
    fn service_name(&self) -> &'static str;

    /// Version of the last successful build of `spec`, without the release
    ///
    /// `None` when the service has never built the package or cannot tell;
    /// the configured version is used then.
    async fn packaged_version(&self, _spec: &PackageSpec) -> Result<Option<String>, CheckError> {
        Ok(None)
    }

    /// Submit a rebuild of `spec` at `check.latest_version`
    async fn trigger(
        &self,
        spec: &PackageSpec,
        check: &VersionCheckResult,
    ) -> Result<BuildRequestOutcome, TriggerError>;
}
