//! Run-level report types

use super::PackageOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::process::ExitCode;

/// Failed outcomes of a run, sorted by package name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Number of packages with an outcome
    pub total_checked: usize,
    /// Number of failed packages
    pub total_failed: usize,
    /// Failed outcomes, sorted by package name
    pub failures: Vec<PackageOutcome>,
}

/// Reduction of a batch of outcomes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Aggregate {
    /// Every package is up to date or had a rebuild triggered
    AllClear {
        /// Number of packages with an outcome
        total_checked: usize,
    },
    /// At least one package failed
    Failures(FailureReport),
}

impl Aggregate {
    /// Returns true for AllClear
    pub fn is_all_clear(&self) -> bool {
        matches!(self, Aggregate::AllClear { .. })
    }

    /// Returns the failure report, if any
    pub fn report(&self) -> Option<&FailureReport> {
        match self {
            Aggregate::AllClear { .. } => None,
            Aggregate::Failures(report) => Some(report),
        }
    }
}

/// Exit code for a run whose packages all succeeded
pub const EXIT_ALL_CLEAR: u8 = 0;
/// Exit code for a fatal configuration error
pub const EXIT_FATAL: u8 = 1;
/// Exit code for a completed run with package failures
pub const EXIT_FAILURES: u8 = 2;
/// Exit code for a cancelled run
pub const EXIT_INCOMPLETE: u8 = 3;

/// Final classification of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunVerdict {
    /// All packages finished without failure
    AllClear {
        /// Number of packages checked
        total_checked: usize,
    },
    /// All packages finished and some failed
    Failed(FailureReport),
    /// Cancelled before every package finished
    Incomplete {
        /// Failures among the packages that did finish
        report: Option<FailureReport>,
        /// Packages abandoned by the cancellation, sorted by name
        abandoned: Vec<String>,
    },
}

impl RunVerdict {
    /// Combine the aggregate of finished outcomes with the cancellation state
    pub fn new(aggregate: Aggregate, cancelled: bool, mut abandoned: Vec<String>) -> Self {
        if cancelled {
            abandoned.sort();
            return RunVerdict::Incomplete {
                report: match aggregate {
                    Aggregate::AllClear { .. } => None,
                    Aggregate::Failures(report) => Some(report),
                },
                abandoned,
            };
        }

        match aggregate {
            Aggregate::AllClear { total_checked } => RunVerdict::AllClear { total_checked },
            Aggregate::Failures(report) => RunVerdict::Failed(report),
        }
    }

    /// Failure report, if any
    pub fn report(&self) -> Option<&FailureReport> {
        match self {
            RunVerdict::AllClear { .. } => None,
            RunVerdict::Failed(report) => Some(report),
            RunVerdict::Incomplete { report, .. } => report.as_ref(),
        }
    }

    /// Numeric process exit status
    pub fn exit_status(&self) -> u8 {
        match self {
            RunVerdict::AllClear { .. } => EXIT_ALL_CLEAR,
            RunVerdict::Failed(_) => EXIT_FAILURES,
            RunVerdict::Incomplete { .. } => EXIT_INCOMPLETE,
        }
    }

    /// Process exit code
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}
