//! Anitya API adapter
//!
//! Fetches the latest upstream version from release-monitoring.org.
//! API endpoint: https://release-monitoring.org/api/projects/?pattern={name}
//!
//! The pattern search may return several projects; the one whose name (and
//! backend, when configured) matches case-insensitively wins.

use crate::domain::{PackageSpec, VersionCheckResult};
use crate::error::CheckError;
use crate::http::HttpClient;
use crate::upstream::UpstreamVersionClient;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

/// Public Anitya instance
pub const DEFAULT_ANITYA_URL: &str = "https://release-monitoring.org";

/// Anitya adapter
pub struct AnityaClient {
    client: HttpClient,
    base_url: String,
}

/// Projects search response
#[derive(Debug, Deserialize)]
struct ProjectsResponse {
    /// Matching projects
    projects: Vec<Project>,
}

/// One project record
#[derive(Debug, Deserialize)]
struct Project {
    /// Project name
    name: String,
    /// Backend the project is tracked with
    #[serde(default)]
    backend: Option<String>,
    /// Latest known version
    #[serde(default)]
    version: Option<String>,
}

impl AnityaClient {
    /// Create a new adapter against the public instance
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, DEFAULT_ANITYA_URL)
    }

    /// Create a new adapter against a custom instance
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the search URL for the upstream project of `spec`
    fn build_url(&self, spec: &PackageSpec) -> Result<Url, CheckError> {
        Url::parse_with_params(
            &format!("{}/api/projects/", self.base_url),
            &[("pattern", spec.upstream.project.as_str())],
        )
        .map_err(|e| CheckError::unavailable(&spec.name, format!("invalid URL: {}", e)))
    }

    /// Pick the version of the project matching `spec` out of a search response
    fn select_version(
        spec: &PackageSpec,
        response: ProjectsResponse,
    ) -> Result<String, CheckError> {
        let wanted = &spec.upstream;
        let project = response
            .projects
            .into_iter()
            .find(|p| {
                p.name.to_lowercase() == wanted.project.to_lowercase()
                    && match (&wanted.backend, &p.backend) {
                        (None, _) => true,
                        (Some(want), Some(have)) => want.to_lowercase() == have.to_lowercase(),
                        (Some(_), None) => false,
                    }
            })
            .ok_or_else(|| CheckError::unknown(&spec.name, &wanted.project))?;

        project.version.ok_or_else(|| {
            CheckError::unavailable(
                &spec.name,
                format!("project '{}' has no recorded version", project.name),
            )
        })
    }
}

#[async_trait]
impl UpstreamVersionClient for AnityaClient {
    fn service_name(&self) -> &'static str {
        "release-monitoring.org"
    }

    #[tracing::instrument(skip_all, fields(package = %spec.name))]
    async fn check(&self, spec: &PackageSpec) -> Result<VersionCheckResult, CheckError> {
        let url = self.build_url(spec)?;

        let response: ProjectsResponse = self
            .client
            .get_json(url, &spec.name, &spec.upstream.project)
            .await?;

        let latest = Self::select_version(spec, response)?;
        let result = VersionCheckResult::new(&spec.name, &spec.current_version, latest);
        tracing::info!(
            current = %result.current_version,
            latest = %result.latest_version,
            needs_update = result.needs_update,
            "upstream version checked"
        );
        Ok(result)
    }
}
