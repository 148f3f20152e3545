//! Core domain models for alpa-autoupdate
//!
//! This module contains the fundamental types used throughout the application:
//! - Tracked package descriptions
//! - Version comparison
//! - Per-package outcomes
//! - Run-level reports and verdicts

mod outcome;
mod package;
mod report;
pub mod version;

pub use outcome::{
    BuildRequestOutcome, FailureStage, OutcomeStatus, PackageOutcome, VersionCheckResult,
};
pub use package::{BuildTarget, PackageSpec, UpstreamProject};
pub use report::{
    Aggregate, FailureReport, RunVerdict, EXIT_ALL_CLEAR, EXIT_FAILURES, EXIT_FATAL,
    EXIT_INCOMPLETE,
};
