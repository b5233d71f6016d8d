//! One-shot shutdown latch shared by the session's tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Cooperative one-shot latch. `trigger` is idempotent and the latch is
/// never cleared within a run; tasks observe it at their suspension points.
///
/// Also used as the producer-done signal between the stream reader and the
/// processor, which has identical semantics.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    set: AtomicBool,
    notify: Notify,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the latch and wake all waiters. Repeated calls are no-ops.
    pub fn trigger(&self) {
        if !self.inner.set.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Non-blocking observation.
    pub fn is_set(&self) -> bool {
        self.inner.set.load(Ordering::SeqCst)
    }

    /// Completes once the latch is set. Registers the waiter before
    /// re-checking the flag so a concurrent `trigger` cannot be missed.
    pub async fn triggered(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_set() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn trigger_is_idempotent_and_observable() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_set());

        signal.trigger();
        signal.trigger();
        assert!(signal.is_set());

        // Waiters registered after the trigger must complete immediately.
        timeout(Duration::from_millis(100), signal.triggered())
            .await
            .expect("triggered() should resolve on a set latch");
    }

    #[tokio::test]
    async fn waiter_wakes_on_trigger() {
        let signal = ShutdownSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.triggered().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        signal.trigger();

        timeout(Duration::from_millis(200), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }
}
