//! Application error types using thiserror
//!
//! Error hierarchy:
//! - CheckError: Failures while looking up the upstream or the packaged version
//! - TriggerError: Failures while submitting a rebuild to the build service
//! - NotifyError: Failures while delivering the failure report
//! - ConfigError: Missing or invalid configuration, fatal before any task starts

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Notification related errors
    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// HTTP client could not be built
    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors raised by the version-check stage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// Service unreachable, non-success status or malformed response
    #[error("release monitoring unavailable for '{package}': {message}")]
    UpstreamUnavailable { package: String, message: String },

    /// Service has no record for the upstream project
    #[error("upstream project '{project}' of package '{package}' is unknown to release monitoring")]
    UnknownPackage { package: String, project: String },

    /// The build service could not report which version it last built
    #[error("packaged version of '{package}' unavailable from build service: {message}")]
    PackagedVersionUnavailable { package: String, message: String },
}

/// Errors raised by the build-trigger stage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriggerError {
    /// Transport or authentication failure
    #[error("build service unavailable for '{package}': {message}")]
    BuildServiceUnavailable { package: String, message: String },

    /// The service explicitly declined the request
    #[error("build of '{package}' rejected: {reason}")]
    BuildRejected { package: String, reason: String },
}

/// Errors raised while delivering notifications
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Transport rejected or could not deliver the message
    #[error("notification to {recipient} undeliverable: {message}")]
    NotificationUndeliverable { recipient: String, message: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required option was not supplied or is blank
    #[error("missing required option '{option}'")]
    MissingOption { option: &'static str },

    /// An option has an unusable value
    #[error("invalid value '{value}' for option '{option}': {message}")]
    InvalidOption {
        option: &'static str,
        value: String,
        message: String,
    },

    /// Failed to read the package list
    #[error("failed to read package list {path}: {source}")]
    PackagesRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Package list is not valid TOML or has the wrong shape
    #[error("failed to parse package list {path}: {message}")]
    PackagesParse { path: PathBuf, message: String },

    /// Package list contains no packages
    #[error("package list {path} contains no packages")]
    NoPackages { path: PathBuf },

    /// The same package name appears more than once
    #[error("package '{name}' is listed more than once")]
    DuplicatePackage { name: String },

    /// A single package entry is unusable
    #[error("invalid package '{name}': {message}")]
    InvalidPackage { name: String, message: String },
}

impl CheckError {
    /// Creates a new UpstreamUnavailable error
    pub fn unavailable(package: impl Into<String>, message: impl Into<String>) -> Self {
        CheckError::UpstreamUnavailable {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Creates a new UnknownPackage error
    pub fn unknown(package: impl Into<String>, project: impl Into<String>) -> Self {
        CheckError::UnknownPackage {
            package: package.into(),
            project: project.into(),
        }
    }

    /// Creates a new PackagedVersionUnavailable error
    pub fn packaged_unavailable(package: impl Into<String>, message: impl Into<String>) -> Self {
        CheckError::PackagedVersionUnavailable {
            package: package.into(),
            message: message.into(),
        }
    }
}

impl TriggerError {
    /// Creates a new BuildServiceUnavailable error
    pub fn unavailable(package: impl Into<String>, message: impl Into<String>) -> Self {
        TriggerError::BuildServiceUnavailable {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Creates a new BuildRejected error
    pub fn rejected(package: impl Into<String>, reason: impl Into<String>) -> Self {
        TriggerError::BuildRejected {
            package: package.into(),
            reason: reason.into(),
        }
    }
}

impl NotifyError {
    /// Creates a new NotificationUndeliverable error
    pub fn undeliverable(recipient: impl Into<String>, message: impl Into<String>) -> Self {
        NotifyError::NotificationUndeliverable {
            recipient: recipient.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new InvalidPackage error
    pub fn invalid_package(name: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidPackage {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidOption error
    pub fn invalid_option(
        option: &'static str,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidOption {
            option,
            value: value.into(),
            message: message.into(),
        }
    }
}
