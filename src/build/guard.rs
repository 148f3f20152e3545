//! At-most-once submission per package per run

use crate::build::BuildTriggerClient;
use crate::domain::{BuildRequestOutcome, PackageSpec, VersionCheckResult};
use crate::error::{CheckError, TriggerError};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Wraps a [`BuildTriggerClient`] and refuses a second submission for the
/// same package within one run
pub struct SubmissionGuard {
    client: Arc<dyn BuildTriggerClient>,
    submitted: Mutex<HashSet<String>>,
}

impl SubmissionGuard {
    /// Create a guard around `client`
    pub fn new(client: Arc<dyn BuildTriggerClient>) -> Self {
        Self {
            client,
            submitted: Mutex::new(HashSet::new()),
        }
    }

    /// Record `package` as submitted; false if it already was
    fn claim(&self, package: &str) -> bool {
        let mut submitted = self
            .submitted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        submitted.insert(package.to_string())
    }

    /// Number of packages submitted so far
    pub fn submitted_count(&self) -> usize {
        self.submitted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Version last built by the wrapped service
    pub async fn packaged_version(&self, spec: &PackageSpec) -> Result<Option<String>, CheckError> {
        self.client.packaged_version(spec).await
    }

    /// Submit a rebuild of `spec` unless one was already started in this run
    pub async fn trigger(
        &self,
        spec: &PackageSpec,
        check: &VersionCheckResult,
    ) -> Result<BuildRequestOutcome, TriggerError> {
        if !self.claim(&spec.name) {
            tracing::warn!(package = %spec.name, "duplicate build submission refused");
            return Err(TriggerError::rejected(
                &spec.name,
                "already submitted in this run",
            ));
        }

        self.client.trigger(spec, check).await
    }
}
