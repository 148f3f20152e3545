//! alpa-autoupdate - scheduled package update library
//!
//! For every tracked package this library:
//! - Asks release-monitoring.org (Anitya) for the latest upstream version
//! - Submits a Copr rebuild when upstream is newer than the packaged version
//! - Aggregates failures and emails one report per run

pub mod aggregate;
pub mod build;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod logging;
pub mod notify;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod runner;
pub mod task;
pub mod upstream;
