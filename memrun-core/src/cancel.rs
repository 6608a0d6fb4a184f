use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// One-shot cancellation signal handed to the sampling task.
///
/// Once cancelled it stays cancelled. The sampler observes it at every
/// suspension point, so a cadence point that is already due when the signal
/// fires is discarded rather than drained.
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Completes once `cancel` has been called.
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            self.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn cancelled_future_completes_after_cancel() {
        let token = Arc::new(CancelToken::default());
        assert!(!token.is_cancelled());

        let waiter = {
            let token = Arc::clone(&token);
            tokio::spawn(async move { token.cancelled().await })
        };

        token.cancel();
        assert!(token.is_cancelled());
        assert!(waiter.await.is_ok());
    }

    #[tokio::test]
    async fn cancelled_is_immediate_when_already_cancelled() {
        let token = CancelToken::default();
        token.cancel();
        token.cancelled().await;
    }
}
