//! Upstream version lookups
//!
//! This module provides:
//! - Anitya (release-monitoring.org) adapter

mod anitya;

pub use anitya::{AnityaClient, DEFAULT_ANITYA_URL};

use crate::domain::{PackageSpec, VersionCheckResult};
use crate::error::CheckError;
use async_trait::async_trait;

/// Asks the release-monitoring service for the latest version of a package
///
/// "No newer version" is a normal result with `needs_update == false`.
/// Implementations issue one idempotent request per call.
#[async_trait]
pub trait UpstreamVersionClient: Send + Sync {
    /// Get the service name
    fn service_name(&self) -> &'static str;

    /// Look up the latest upstream version of `spec`
    async fn check(&self, spec: &PackageSpec) -> Result<VersionCheckResult, CheckError>;
}
