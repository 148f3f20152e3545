//! Copr API v3 adapter
//!
//! Reports the version of the last successful build and submits a rebuild
//! of a package already defined in a Copr project.
//! API endpoints:
//! - GET {copr}/api_3/package?ownername=&projectname=&packagename=&with_latest_succeeded_build=True
//! - POST {copr}/api_3/package/build
//!
//! The build request is a single POST and is never retried: a resubmission
//! would queue a second build.

use crate::build::BuildTriggerClient;
use crate::domain::{BuildRequestOutcome, PackageSpec, VersionCheckResult};
use crate::error::{CheckError, TriggerError};
use crate::http::HttpClient;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

/// Public Fedora Copr instance
pub const DEFAULT_COPR_URL: &str = "https://copr.fedorainfracloud.org";

/// Copr API login and token
#[derive(Clone)]
pub struct CoprCredentials {
    /// API login
    pub login: String,
    /// API token
    pub token: String,
}

impl std::fmt::Debug for CoprCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoprCredentials")
            .field("login", &self.login)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Copr adapter
pub struct CoprClient {
    client: HttpClient,
    base_url: String,
    credentials: Option<CoprCredentials>,
}

/// Build request body
#[derive(Debug, Serialize)]
struct PackageBuildRequest<'a> {
    ownername: &'a str,
    projectname: &'a str,
    package_name: &'a str,
}

/// Accepted build
#[derive(Debug, Deserialize)]
struct BuildResponse {
    /// Build id
    id: Option<u64>,
}

/// Package record with its latest successful build
#[derive(Debug, Deserialize)]
struct PackageResponse {
    #[serde(default)]
    builds: PackageBuilds,
}

#[derive(Debug, Default, Deserialize)]
struct PackageBuilds {
    #[serde(default)]
    latest_succeeded: Option<LatestBuild>,
}

#[derive(Debug, Deserialize)]
struct LatestBuild {
    #[serde(default)]
    source_package: Option<SourcePackage>,
}

#[derive(Debug, Deserialize)]
struct SourcePackage {
    /// `[epoch:]version-release` of the built SRPM
    #[serde(default)]
    version: Option<String>,
}

impl PackageResponse {
    /// Upstream version of the latest successful build, if any
    fn built_version(self) -> Option<String> {
        let evr = self.builds.latest_succeeded?.source_package?.version?;
        let version = strip_release(&evr);
        (!version.is_empty()).then(|| version.to_string())
    }
}

/// Drop the epoch and the release from an `[epoch:]version-release` string
fn strip_release(evr: &str) -> &str {
    let evr = evr.trim();
    let version = evr.split_once(':').map_or(evr, |(_, rest)| rest);
    version.rsplit_once('-').map_or(version, |(version, _)| version)
}

/// Error body returned with 4xx/5xx responses
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl CoprClient {
    /// Create a new adapter against the public instance
    pub fn new(client: HttpClient, credentials: Option<CoprCredentials>) -> Self {
        Self::with_base_url(client, DEFAULT_COPR_URL, credentials)
    }

    /// Create a new adapter against a custom instance
    pub fn with_base_url(
        client: HttpClient,
        base_url: impl Into<String>,
        credentials: Option<CoprCredentials>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Build the endpoint URL
    fn build_url(&self) -> String {
        format!("{}/api_3/package/build", self.base_url)
    }

    /// Package lookup URL for `spec`
    fn package_url(&self, spec: &PackageSpec) -> Result<Url, CheckError> {
        Url::parse_with_params(
            &format!("{}/api_3/package", self.base_url),
            &[
                ("ownername", spec.target.owner.as_str()),
                ("projectname", spec.target.project.as_str()),
                ("packagename", spec.target.package.as_str()),
                ("with_latest_succeeded_build", "True"),
            ],
        )
        .map_err(|e| CheckError::packaged_unavailable(&spec.name, format!("invalid URL: {}", e)))
    }

    /// Map a non-success status and its body to a trigger error
    fn classify(package: &str, status: StatusCode, body: &str) -> TriggerError {
        let detail = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| format!("HTTP {}", status));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                TriggerError::unavailable(package, format!("authentication failed: {}", detail))
            }
            s if s.is_client_error() => TriggerError::rejected(package, detail),
            _ => TriggerError::unavailable(package, detail),
        }
    }
}

#[async_trait]
impl BuildTriggerClient for CoprClient {
    fn service_name(&self) -> &'static str {
        "Copr"
    }

    #[tracing::instrument(skip_all, fields(package = %spec.name, copr = %spec.target))]
    async fn packaged_version(&self, spec: &PackageSpec) -> Result<Option<String>, CheckError> {
        let url = self.package_url(spec)?;
        let project = format!("{}/{}", spec.target.owner, spec.target.project);

        let response: PackageResponse = self
            .client
            .get_json(url, &spec.name, &project)
            .await
            .map_err(|e| match e {
                CheckError::UnknownPackage { .. } => CheckError::packaged_unavailable(
                    &spec.name,
                    format!("package '{}' not found in {}", spec.target.package, project),
                ),
                CheckError::UpstreamUnavailable { message, .. }
                | CheckError::PackagedVersionUnavailable { message, .. } => {
                    CheckError::packaged_unavailable(&spec.name, message)
                }
            })?;

        let version = response.built_version();
        tracing::debug!(?version, "latest successful build");
        Ok(version)
    }

    #[tracing::instrument(
        skip_all,
        fields(package = %spec.name, copr = %spec.target, version = %check.latest_version)
    )]
    async fn trigger(
        &self,
        spec: &PackageSpec,
        check: &VersionCheckResult,
    ) -> Result<BuildRequestOutcome, TriggerError> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            TriggerError::unavailable(&spec.name, "no Copr credentials configured")
        })?;

        let body = PackageBuildRequest {
            ownername: &spec.target.owner,
            projectname: &spec.target.project,
            package_name: &spec.target.package,
        };

        let response = self
            .client
            .inner()
            .post(self.build_url())
            .basic_auth(&credentials.login, Some(&credentials.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| TriggerError::unavailable(&spec.name, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TriggerError::unavailable(&spec.name, e.to_string()))?;

        if !status.is_success() {
            let err = Self::classify(&spec.name, status, &text);
            tracing::error!(%status, error = %err, "build submission failed");
            return Err(err);
        }

        // The build is queued at this point; an unreadable body does not undo that.
        let build_id = serde_json::from_str::<BuildResponse>(&text)
            .ok()
            .and_then(|b| b.id);
        tracing::info!(?build_id, from = %check.current_version, "build submitted");
        Ok(BuildRequestOutcome::accepted(&spec.name, build_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(credentials: Option<CoprCredentials>) -> CoprClient {
        CoprClient::new(HttpClient::new().unwrap(), credentials)
    }

    #[test]
    fn test_service_name() {
        assert_eq!(adapter(None).service_name(), "Copr");
    }

    #[test]
    fn test_build_url() {
        assert_eq!(
            adapter(None).build_url(),
            "https://copr.fedorainfracloud.org/api_3/package/build"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = PackageBuildRequest {
            ownername: "@alpa",
            projectname: "stable",
            package_name: "htop",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["ownername"], "@alpa");
        assert_eq!(json["projectname"], "stable");
        assert_eq!(json["package_name"], "htop");
    }

    #[test]
    fn test_classify_rejected_with_error_body() {
        let err = CoprClient::classify(
            "htop",
            StatusCode::BAD_REQUEST,
            r#"{"error": "Package htop does not exist in project stable"}"#,
        );
        assert_eq!(
            err,
            TriggerError::rejected("htop", "Package htop does not exist in project stable")
        );
    }

    #[test]
    fn test_classify_auth_failure_is_unavailable() {
        let err = CoprClient::classify("htop", StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, TriggerError::BuildServiceUnavailable { .. }));
        assert!(err.to_string().contains("authentication failed"));
    }

    #[test]
    fn test_classify_server_error_is_unavailable() {
        let err = CoprClient::classify("htop", StatusCode::BAD_GATEWAY, "<html>");
        assert_eq!(err, TriggerError::unavailable("htop", "HTTP 502 Bad Gateway"));
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let creds = CoprCredentials {
            login: "bot".to_string(),
            token: "secret".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("bot"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_package_url() {
        let spec = PackageSpec::new("htop", "3.2.0", "@alpa", "stable");
        let url = adapter(None).package_url(&spec).unwrap();
        assert_eq!(
            url.as_str(),
            "https://copr.fedorainfracloud.org/api_3/package?ownername=%40alpa\
             &projectname=stable&packagename=htop&with_latest_succeeded_build=True"
        );
    }

    #[test]
    fn test_built_version_strips_release() {
        let response: PackageResponse = serde_json::from_str(
            r#"{
                "name": "htop",
                "builds": {
                    "latest_succeeded": {
                        "id": 7001,
                        "state": "succeeded",
                        "source_package": {"name": "htop", "version": "3.3.0-1"}
                    }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(response.built_version().as_deref(), Some("3.3.0"));
    }

    #[test]
    fn test_built_version_without_successful_build() {
        let response: PackageResponse =
            serde_json::from_str(r#"{"name": "htop", "builds": {"latest_succeeded": null}}"#)
                .unwrap();
        assert_eq!(response.built_version(), None);

        let response: PackageResponse = serde_json::from_str(r#"{"name": "htop"}"#).unwrap();
        assert_eq!(response.built_version(), None);
    }

    #[test]
    fn test_strip_release() {
        assert_eq!(strip_release("3.3.0-1.fc40"), "3.3.0");
        assert_eq!(strip_release("2:1.2-3"), "1.2");
        assert_eq!(strip_release("1.0"), "1.0");
    }

    #[tokio::test]
    async fn test_packaged_version_unreachable_is_check_error() {
        let client =
            CoprClient::with_base_url(HttpClient::new().unwrap(), "http://127.0.0.1:9", None);
        let spec = PackageSpec::new("htop", "3.2.0", "@alpa", "stable");
        let err = client.packaged_version(&spec).await.unwrap_err();
        assert!(matches!(err, CheckError::PackagedVersionUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_trigger_without_credentials() {
        let spec = PackageSpec::new("htop", "3.2.0", "@alpa", "stable");
        let check = VersionCheckResult::new("htop", "3.2.0", "3.3.0");
        let err = adapter(None).trigger(&spec, &check).await.unwrap_err();
        assert!(matches!(err, TriggerError::BuildServiceUnavailable { .. }));
    }
}
