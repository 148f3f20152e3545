//! Bounded concurrent execution of package update tasks
//!
//! This module provides:
//! - Fan-out of one task per package with a semaphore-bounded concurrency
//! - Collection of exactly one outcome per package
//! - Cooperative cancellation that keeps finished outcomes

use crate::cancel::CancelToken;
use crate::domain::{PackageOutcome, PackageSpec};
use crate::progress::Progress;
use crate::task::PackageUpdateTask;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Default concurrency limit for update tasks
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Result of running a batch
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Outcomes of the packages that reached a terminal state
    pub outcomes: Vec<PackageOutcome>,
    /// Packages without an outcome because the run was cancelled
    pub abandoned: Vec<String>,
    /// Whether cancellation was observed
    pub cancelled: bool,
}

impl BatchResult {
    /// Returns true if every package has an outcome
    ///
    /// A cancellation that arrives after the last task finished leaves the
    /// batch complete.
    pub fn is_complete(&self) -> bool {
        self.abandoned.is_empty()
    }
}

/// Runs [`PackageUpdateTask`]s with at most `max_concurrency` in flight
pub struct BatchRunner {
    task: Arc<PackageUpdateTask>,
    max_concurrency: usize,
}

impl BatchRunner {
    /// Create a runner; a concurrency of zero is raised to one
    pub fn new(task: PackageUpdateTask, max_concurrency: usize) -> Self {
        Self {
            task: Arc::new(task),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Configured concurrency limit
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Run every package to a terminal state or until cancellation
    pub async fn run(
        &self,
        specs: Vec<PackageSpec>,
        cancel: CancelToken,
        progress: &mut Progress,
    ) -> BatchResult {
        let total = specs.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();

        progress.start(total as u64, "Checking packages");
        tracing::info!(
            packages = total,
            max_concurrency = self.max_concurrency,
            "starting batch"
        );

        for (index, spec) in specs.iter().cloned().enumerate() {
            let task = Arc::clone(&self.task);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            join_set.spawn(async move {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return (index, None),
                    permit = semaphore.acquire_owned() => permit,
                };
                // The semaphore is never closed
                let Ok(_permit) = permit else {
                    return (index, None);
                };
                (index, task.run(&spec, &cancel).await)
            });
        }

        let mut slots: Vec<Option<PackageOutcome>> = vec![None; total];
        let mut outcomes = Vec::with_capacity(total);

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Some(outcome))) => {
                    progress.set_message(&format!("{}", outcome));
                    progress.inc();
                    slots[index] = Some(outcome);
                }
                Ok((_, None)) => {}
                Err(e) => tracing::error!(error = %e, "update task terminated abnormally"),
            }
        }
        progress.finish_and_clear();

        let cancelled = cancel.is_cancelled();
        let mut abandoned = Vec::new();

        for (spec, slot) in specs.iter().zip(slots) {
            match slot {
                Some(outcome) => outcomes.push(outcome),
                None if cancelled => abandoned.push(spec.name.clone()),
                None => outcomes.push(PackageOutcome::aborted(
                    &spec.name,
                    "update task terminated unexpectedly",
                )),
            }
        }

        if cancelled {
            tracing::warn!(
                finished = outcomes.len(),
                abandoned = abandoned.len(),
                "batch cancelled before completion"
            );
        } else {
            tracing::info!(finished = outcomes.len(), "batch finished");
        }

        BatchResult {
            outcomes,
            abandoned,
            cancelled,
        }
    }
}
