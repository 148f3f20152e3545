//! Tracked package descriptions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream project as known to the release-monitoring service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamProject {
    /// Project name used for the lookup
    pub project: String,
    /// Anitya backend (e.g. "PyPI", "GitHub"); any backend matches when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

/// Copr package that gets rebuilt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTarget {
    /// Copr project owner (user or @group)
    pub owner: String,
    /// Copr project name
    pub project: String,
    /// Package name inside the Copr project
    pub package: String,
}

impl BuildTarget {
    /// Creates a new BuildTarget
    pub fn new(
        owner: impl Into<String>,
        project: impl Into<String>,
        package: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            project: project.into(),
            package: package.into(),
        }
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.project, self.package)
    }
}

/// One tracked package, loaded once per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Package name in the Alpa repository
    pub name: String,
    /// Upstream project to watch
    pub upstream: UpstreamProject,
    /// Version recorded in the package list; a newer successful build on
    /// the build service takes precedence
    pub current_version: String,
    /// Where rebuilds are submitted
    pub target: BuildTarget,
    /// Maintainers notified when this package fails
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<String>,
}

impl PackageSpec {
    /// Creates a package whose upstream project and Copr package share its name
    pub fn new(
        name: impl Into<String>,
        current_version: impl Into<String>,
        owner: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            upstream: UpstreamProject {
                project: name.clone(),
                backend: None,
            },
            current_version: current_version.into(),
            target: BuildTarget::new(owner, project, name.clone()),
            maintainers: Vec::new(),
            name,
        }
    }

    /// Sets the upstream project (builder pattern)
    pub fn with_upstream(mut self, project: impl Into<String>, backend: Option<String>) -> Self {
        self.upstream = UpstreamProject {
            project: project.into(),
            backend,
        };
        self
    }

    /// Sets the maintainers (builder pattern)
    pub fn with_maintainers(mut self, maintainers: Vec<String>) -> Self {
        self.maintainers = maintainers;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_spec_new_defaults() {
        let spec = PackageSpec::new("htop", "3.2.0", "alpa-team", "alpa");
        assert_eq!(spec.upstream.project, "htop");
        assert!(spec.upstream.backend.is_none());
        assert_eq!(spec.target.package, "htop");
        assert!(spec.maintainers.is_empty());
    }

    #[test]
    fn test_package_spec_builders() {
        let spec = PackageSpec::new("python-rich", "13.0.0", "alpa-team", "alpa")
            .with_upstream("rich", Some("PyPI".to_string()))
            .with_maintainers(vec!["me@example.org".to_string()]);
        assert_eq!(spec.upstream.project, "rich");
        assert_eq!(spec.upstream.backend.as_deref(), Some("PyPI"));
        assert_eq!(spec.maintainers, vec!["me@example.org"]);
    }

    #[test]
    fn test_build_target_display() {
        let target = BuildTarget::new("@alpa", "stable", "htop");
        assert_eq!(target.to_string(), "@alpa/stable:htop");
    }
}
