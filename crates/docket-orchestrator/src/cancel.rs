//! Run cancellation
//!
//! A [`CancelHandle`] flips a watch channel; every task holds a
//! [`CancelSignal`] and races it against each suspension point. Work that
//! already happened (a flattened archive, a finished model call) is not
//! rolled back.

use crate::FileError;
use std::future::Future;
use tokio::sync::watch;

/// Cancels a run
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Observes cancellation of a run
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

/// Create a connected handle and signal
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

impl CancelHandle {
    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Another signal for the same run
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl CancelSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested
    ///
    /// Never resolves if the handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Run `fut` unless cancellation arrives first
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, FileError> {
        if self.is_cancelled() {
            return Err(FileError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(FileError::Cancelled),
            out = fut => Ok(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_guard_passes_through() {
        let signal = CancelSignal::never();
        assert_eq!(signal.guard(async { 7 }).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_work() {
        let (handle, signal) = cancel_pair();
        let work = tokio::spawn(async move {
            signal
                .guard(tokio::time::sleep(Duration::from_secs(30)))
                .await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();
        assert_eq!(work.await.unwrap(), Err(FileError::Cancelled));
    }

    #[tokio::test]
    async fn test_already_cancelled() {
        let (handle, _signal) = cancel_pair();
        handle.cancel();
        let late = handle.signal();
        assert!(late.is_cancelled());
        assert_eq!(late.guard(async { 1 }).await, Err(FileError::Cancelled));
    }
}
