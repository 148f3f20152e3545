//! CLI argument parsing module for alpa-autoupdate
//!
//! Every option also reads from the environment so the tool can run as a
//! GitHub Action, where inputs arrive as `INPUT_*` variables.

use crate::runner::DEFAULT_CONCURRENCY;
use clap::builder::FalseyValueParser;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Parse duration string in format: Ns (seconds), Nm (minutes), Nh (hours), Nd (days)
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let (num_str, unit) = if let Some(n) = s.strip_suffix('s') {
        (n, 's')
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 'm')
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 'h')
    } else if let Some(n) = s.strip_suffix('d') {
        (n, 'd')
    } else {
        return Err(format!("invalid duration format: {}", s));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in duration: {}", num_str))?;

    let multiplier: u64 = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        _ => 24 * 60 * 60,
    };
    let seconds = num
        .checked_mul(multiplier)
        .ok_or_else(|| format!("duration too large: {}", s))?;

    Ok(Duration::from_secs(seconds))
}

/// Check tracked packages against upstream and trigger Copr rebuilds
#[derive(Parser, Debug, Clone)]
#[command(
    name = "alpa-autoupdate",
    version,
    about = "Check tracked packages against upstream releases and trigger rebuilds"
)]
pub struct CliArgs {
    /// Package list (TOML)
    #[arg(long, env = "ALPA_PACKAGES", default_value = "packages.toml")]
    pub packages: PathBuf,

    // Mail options
    /// Sender account of failure reports, also the SMTP login
    #[arg(long, env = "INPUT_EMAIL_NAME")]
    pub email_name: Option<String>,

    /// SMTP server host
    #[arg(long, env = "INPUT_SMTP_ADDRESS")]
    pub smtp_address: Option<String>,

    /// SMTP password
    #[arg(long, env = "INPUT_EMAIL_PASSWORD", hide_env_values = true)]
    pub email_password: Option<String>,

    /// Recipient of run reports (default: the sender account)
    #[arg(long, env = "INPUT_EMAIL_RECIPIENT")]
    pub email_recipient: Option<String>,

    // Run options
    /// Maximum number of packages processed at once
    #[arg(long, env = "INPUT_MAX_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Wall-clock budget for the whole run (e.g. 90s, 30m, 5h)
    #[arg(long, env = "INPUT_TIMEOUT", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Retries for failed version lookups
    #[arg(long, default_value_t = 0)]
    pub check_retries: u32,

    // Services
    /// Anitya instance
    #[arg(long, env = "ANITYA_URL", default_value = crate::upstream::DEFAULT_ANITYA_URL)]
    pub anitya_url: String,

    /// Copr instance
    #[arg(long, env = "COPR_URL", default_value = crate::build::DEFAULT_COPR_URL)]
    pub copr_url: String,

    /// Copr API login
    #[arg(long, env = "COPR_LOGIN")]
    pub copr_login: Option<String>,

    /// Copr API token
    #[arg(long, env = "COPR_TOKEN", hide_env_values = true)]
    pub copr_token: Option<String>,

    // Output options
    /// Verbose logging; an all-clear run also sends a confirmation email
    #[arg(long, env = "INPUT_DEBUG", value_parser = FalseyValueParser::new())]
    pub debug: bool,

    /// Debug mode requested by the CI runner
    #[arg(long, env = "RUNNER_DEBUG", hide = true, value_parser = FalseyValueParser::new())]
    pub runner_debug: bool,

    /// Enable quiet mode - no progress bar or summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    /// Whether debug mode is on from either source
    pub fn debug_enabled(&self) -> bool {
        self.debug || self.runner_debug
    }
}
