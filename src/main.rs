//! alpa-autoupdate - check tracked packages and trigger Copr rebuilds
//!
//! Exit status:
//! - 0: every package is up to date or had a rebuild triggered
//! - 1: fatal configuration error, nothing was checked
//! - 2: the run finished with package failures
//! - 3: the run was cancelled before every package finished

use alpa_autoupdate::cancel::{cancellation, Canceller};
use alpa_autoupdate::cli::CliArgs;
use alpa_autoupdate::config::{load_packages, RunConfig};
use alpa_autoupdate::domain::EXIT_FATAL;
use alpa_autoupdate::logging::init_tracing;
use alpa_autoupdate::orchestrator::Orchestrator;
use alpa_autoupdate::output::{create_formatter, OutputConfig};
use alpa_autoupdate::progress::Progress;
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors are fatal configuration errors, not clap's exit status 2
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_FATAL)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(args.debug_enabled());

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = RunConfig::from_cli(&args)?;
    let specs = load_packages(&config.packages_path)?;
    tracing::info!(
        packages = specs.len(),
        path = %config.packages_path.display(),
        "package list loaded"
    );

    let orchestrator = Orchestrator::new(&config)?;

    let (canceller, cancel) = cancellation();
    let watcher = tokio::spawn(watch_for_cancellation(canceller, config.timeout));

    let mut progress = Progress::for_terminal(args.quiet || args.json);
    let summary = orchestrator.run(specs, cancel, &mut progress).await;
    watcher.abort();

    let output_config = OutputConfig::from_cli(args.json, config.debug, args.quiet);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&summary, &mut stdout)?;
    stdout.flush()?;

    Ok(summary.verdict.exit_code())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() -> io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Cancel the run on a shutdown signal or when the wall-clock budget runs out
async fn watch_for_cancellation(canceller: Canceller, timeout: Option<Duration>) {
    let deadline = async {
        match timeout {
            Some(budget) => tokio::time::sleep(budget).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    tokio::select! {
        _ = &mut deadline => {
            tracing::warn!("run timeout reached, cancelling remaining packages");
        }
        result = shutdown_signal() => match result {
            Ok(()) => tracing::warn!("interrupted, cancelling remaining packages"),
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for shutdown signals");
                deadline.await;
                tracing::warn!("run timeout reached, cancelling remaining packages");
            }
        }
    }

    canceller.cancel();
}
