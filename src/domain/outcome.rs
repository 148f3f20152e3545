//! Per-package results of a run

use crate::error::{CheckError, TriggerError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of asking the release-monitoring service about one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCheckResult {
    /// Package name
    pub package: String,
    /// Version currently packaged
    pub current_version: String,
    /// Latest upstream version
    pub latest_version: String,
    /// Whether upstream is newer than what is packaged
    pub needs_update: bool,
}

impl VersionCheckResult {
    /// Creates a new VersionCheckResult, deciding `needs_update` from the versions
    pub fn new(
        package: impl Into<String>,
        current_version: impl Into<String>,
        latest_version: impl Into<String>,
    ) -> Self {
        let current_version = current_version.into();
        let latest_version = latest_version.into();
        let needs_update = super::version::is_newer(&latest_version, &current_version);
        Self {
            package: package.into(),
            current_version,
            latest_version,
            needs_update,
        }
    }
}

/// Result of submitting one rebuild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequestOutcome {
    /// Package name
    pub package: String,
    /// Whether a request was issued
    pub requested: bool,
    /// Whether the service accepted the request
    pub success: bool,
    /// Build id assigned by the service, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_id: Option<u64>,
    /// Error detail when the request was not accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BuildRequestOutcome {
    /// An accepted submission
    pub fn accepted(package: impl Into<String>, build_id: Option<u64>) -> Self {
        Self {
            package: package.into(),
            requested: true,
            success: true,
            build_id,
            error: None,
        }
    }
}

/// Pipeline stage at which a package failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Version lookup
    Check,
    /// Build submission
    Trigger,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Check => write!(f, "check"),
            FailureStage::Trigger => write!(f, "trigger"),
        }
    }
}

/// Terminal state of one package update task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Already at the latest upstream version
    UpToDate,
    /// A rebuild was submitted
    UpdateTriggered,
    /// Version lookup failed
    CheckFailed,
    /// Newer version found but the rebuild could not be submitted
    TriggerFailed,
    /// The task ended without reporting how far it got
    Aborted,
}

impl OutcomeStatus {
    /// Returns true for the failure states
    pub fn is_failure(&self) -> bool {
        !matches!(self, OutcomeStatus::UpToDate | OutcomeStatus::UpdateTriggered)
    }

    /// Returns the failed stage, if it is known
    pub fn stage(&self) -> Option<FailureStage> {
        match self {
            OutcomeStatus::CheckFailed => Some(FailureStage::Check),
            OutcomeStatus::TriggerFailed => Some(FailureStage::Trigger),
            OutcomeStatus::UpToDate | OutcomeStatus::UpdateTriggered | OutcomeStatus::Aborted => {
                None
            }
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::UpToDate => write!(f, "up to date"),
            OutcomeStatus::UpdateTriggered => write!(f, "update triggered"),
            OutcomeStatus::CheckFailed => write!(f, "check failed"),
            OutcomeStatus::TriggerFailed => write!(f, "trigger failed"),
            OutcomeStatus::Aborted => write!(f, "aborted"),
        }
    }
}

/// Terminal record for one package in one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageOutcome {
    /// Package name
    pub package: String,
    /// Terminal state
    pub status: OutcomeStatus,
    /// Error detail for failure states
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Version check result, when the check succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<VersionCheckResult>,
    /// Build id of a triggered rebuild
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_id: Option<u64>,
}

impl PackageOutcome {
    /// Creates an UpToDate outcome
    pub fn up_to_date(check: VersionCheckResult) -> Self {
        Self {
            package: check.package.clone(),
            status: OutcomeStatus::UpToDate,
            error: None,
            check: Some(check),
            build_id: None,
        }
    }

    /// Creates an UpdateTriggered outcome
    pub fn triggered(check: VersionCheckResult, build: BuildRequestOutcome) -> Self {
        Self {
            package: check.package.clone(),
            status: OutcomeStatus::UpdateTriggered,
            error: None,
            check: Some(check),
            build_id: build.build_id,
        }
    }

    /// Creates a CheckFailed outcome
    pub fn check_failed(package: impl Into<String>, error: &CheckError) -> Self {
        Self::check_failed_with(package, error.to_string())
    }

    /// Creates a CheckFailed outcome from a plain message
    pub fn check_failed_with(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::failed(package, OutcomeStatus::CheckFailed, message)
    }

    /// Creates an Aborted outcome for a task that died without a result
    ///
    /// A rebuild may or may not have been submitted before the task died.
    pub fn aborted(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::failed(package, OutcomeStatus::Aborted, message)
    }

    fn failed(
        package: impl Into<String>,
        status: OutcomeStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            status,
            error: Some(message.into()),
            check: None,
            build_id: None,
        }
    }

    /// Creates a TriggerFailed outcome, keeping the successful check
    pub fn trigger_failed(check: VersionCheckResult, error: &TriggerError) -> Self {
        Self {
            package: check.package.clone(),
            status: OutcomeStatus::TriggerFailed,
            error: Some(error.to_string()),
            check: Some(check),
            build_id: None,
        }
    }

    /// Returns true if this outcome is a failure
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }
}

impl fmt::Display for PackageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.status, &self.check, &self.error) {
            (OutcomeStatus::UpdateTriggered, Some(check), _) => write!(
                f,
                "{}: {} → {} (update triggered)",
                self.package, check.current_version, check.latest_version
            ),
            (_, _, Some(error)) => write!(f, "{}: {} ({})", self.package, self.status, error),
            _ => write!(f, "{}: {}", self.package, self.status),
        }
    }
}
