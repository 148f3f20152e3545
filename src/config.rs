//! Validated run configuration
//!
//! CLI arguments and the package list are checked once at startup. Any
//! missing required option or unusable package entry stops the run before
//! a single request is made.

use crate::build::CoprCredentials;
use crate::cli::CliArgs;
use crate::domain::{BuildTarget, PackageSpec, UpstreamProject};
use crate::error::ConfigError;
use crate::notify::SmtpSettings;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything a run needs, validated
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Sender account and SMTP server
    pub smtp: SmtpSettings,
    /// Recipient of run reports
    pub recipient: String,
    /// Debug mode
    pub debug: bool,
    /// Concurrency limit, at least one
    pub max_concurrency: usize,
    /// Wall-clock budget
    pub timeout: Option<Duration>,
    /// Retries for failed version lookups
    pub check_retries: u32,
    /// Anitya instance
    pub anitya_url: String,
    /// Copr instance
    pub copr_url: String,
    /// Copr API credentials
    pub copr_credentials: Option<CoprCredentials>,
    /// Package list location
    pub packages_path: PathBuf,
}

impl RunConfig {
    /// Validate CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, ConfigError> {
        let sender = required(&args.email_name, "email-name")?;
        let smtp_address = required(&args.smtp_address, "smtp-address")?;
        let password = required(&args.email_password, "email-password")?;

        if !sender.contains('@') {
            return Err(ConfigError::invalid_option(
                "email-name",
                sender,
                "expected an email address",
            ));
        }

        if args.max_concurrency == 0 {
            return Err(ConfigError::invalid_option(
                "max-concurrency",
                "0",
                "must be at least 1",
            ));
        }

        let recipient = optional(&args.email_recipient).unwrap_or_else(|| sender.clone());

        let copr_credentials = match (optional(&args.copr_login), optional(&args.copr_token)) {
            (Some(login), Some(token)) => Some(CoprCredentials { login, token }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingOption { option: "copr-token" }),
            (None, Some(_)) => return Err(ConfigError::MissingOption { option: "copr-login" }),
        };

        Ok(Self {
            smtp: SmtpSettings {
                sender,
                smtp_address,
                password,
            },
            recipient,
            debug: args.debug_enabled(),
            max_concurrency: args.max_concurrency,
            timeout: args.timeout,
            check_retries: args.check_retries,
            anitya_url: args.anitya_url.clone(),
            copr_url: args.copr_url.clone(),
            copr_credentials,
            packages_path: args.packages.clone(),
        })
    }
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn required(value: &Option<String>, option: &'static str) -> Result<String, ConfigError> {
    optional(value).ok_or(ConfigError::MissingOption { option })
}

/// Package list file layout
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageListFile {
    #[serde(default)]
    defaults: Defaults,
    #[serde(default, rename = "package")]
    packages: Vec<PackageEntry>,
}

/// Values applied to every package that does not override them
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Defaults {
    /// Copr project as owner/project
    copr: Option<String>,
    /// Anitya backend
    backend: Option<String>,
}

/// One `[[package]]` table
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageEntry {
    name: String,
    version: Option<String>,
    specfile: Option<PathBuf>,
    upstream: Option<String>,
    backend: Option<String>,
    copr: Option<String>,
    copr_package: Option<String>,
    #[serde(default)]
    maintainers: Vec<String>,
}

/// Load and validate the package list at `path`
pub fn load_packages(path: &Path) -> Result<Vec<PackageSpec>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::PackagesRead {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_packages(&content, path, base_dir)
}

/// Parse a package list; relative spec file paths resolve against `base_dir`
pub fn parse_packages(
    content: &str,
    path: &Path,
    base_dir: &Path,
) -> Result<Vec<PackageSpec>, ConfigError> {
    let file: PackageListFile =
        toml::from_str(content).map_err(|e| ConfigError::PackagesParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if file.packages.is_empty() {
        return Err(ConfigError::NoPackages {
            path: path.to_path_buf(),
        });
    }

    let mut seen = HashSet::new();
    let mut specs = Vec::with_capacity(file.packages.len());

    for entry in file.packages {
        let name = entry.name.trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::invalid_package("<unnamed>", "empty package name"));
        }
        if !seen.insert(name.clone()) {
            return Err(ConfigError::DuplicatePackage { name });
        }

        let current_version = match (entry.version, entry.specfile) {
            (Some(version), None) => version,
            (None, Some(specfile)) => read_spec_version(&name, &base_dir.join(specfile))?,
            (Some(_), Some(_)) => {
                return Err(ConfigError::invalid_package(
                    &name,
                    "set either 'version' or 'specfile', not both",
                ))
            }
            (None, None) => {
                return Err(ConfigError::invalid_package(
                    &name,
                    "one of 'version' or 'specfile' is required",
                ))
            }
        };

        let copr = entry
            .copr
            .or_else(|| file.defaults.copr.clone())
            .ok_or_else(|| ConfigError::invalid_package(&name, "no Copr project configured"))?;
        let (owner, project) = split_copr_project(&name, &copr)?;

        specs.push(PackageSpec {
            upstream: UpstreamProject {
                project: entry.upstream.unwrap_or_else(|| name.clone()),
                backend: entry.backend.or_else(|| file.defaults.backend.clone()),
            },
            current_version,
            target: BuildTarget::new(
                owner,
                project,
                entry.copr_package.unwrap_or_else(|| name.clone()),
            ),
            maintainers: entry.maintainers,
            name,
        });
    }

    Ok(specs)
}

fn split_copr_project(package: &str, copr: &str) -> Result<(String, String), ConfigError> {
    match copr.split_once('/') {
        Some((owner, project))
            if !owner.is_empty() && !project.is_empty() && !project.contains('/') =>
        {
            Ok((owner.to_string(), project.to_string()))
        }
        _ => Err(ConfigError::invalid_package(
            package,
            format!("Copr project '{}' is not in owner/project form", copr),
        )),
    }
}

/// Read the `Version:` tag of an RPM spec file
fn read_spec_version(package: &str, specfile: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(specfile).map_err(|e| {
        ConfigError::invalid_package(
            package,
            format!("cannot read spec file {}: {}", specfile.display(), e),
        )
    })?;

    let version = content
        .lines()
        .find_map(|line| {
            let (tag, value) = line.split_once(':')?;
            tag.trim()
                .eq_ignore_ascii_case("version")
                .then(|| value.trim().to_string())
        })
        .ok_or_else(|| {
            ConfigError::invalid_package(
                package,
                format!("no Version tag in {}", specfile.display()),
            )
        })?;

    if version.is_empty() || version.contains('%') {
        return Err(ConfigError::invalid_package(
            package,
            format!("unsupported Version value '{}' in {}", version, specfile.display()),
        ));
    }

    Ok(version)
}
