//! Cooperative cancellation for a run
//!
//! A [`Canceller`] flips a watch channel once; every [`CancelToken`] clone
//! observes it at its next suspension point.

use tokio::sync::watch;

/// Sending half, owned by whoever enforces the run's deadline
#[derive(Debug)]
pub struct Canceller {
    tx: watch::Sender<bool>,
}

/// Receiving half, cloned into every task
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

/// Create a linked canceller and token
pub fn cancellation() -> (Canceller, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (Canceller { tx }, CancelToken { rx })
}

impl Canceller {
    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelToken {
    /// A token that is never cancelled
    pub fn never() -> Self {
        let (_, token) = cancellation();
        token
    }

    /// Returns true once cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when cancellation is requested; never resolves if the
    /// canceller is dropped without cancelling
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
