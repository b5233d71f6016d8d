//! FIFO queue decoupling the stream reader from the processor.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::{timeout_at, Instant};

use crate::record::LogRecord;

/// Unbounded FIFO with a timed, interruptible pop. Unbounded is fine here:
/// the sole producer is rate-limited by `max_events`.
#[derive(Default)]
pub struct EventQueue {
    inner: Mutex<VecDeque<LogRecord>>,
    notify: Notify,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: LogRecord) {
        self.inner.lock().push_back(record);
        // notify_one stores a permit, so a push racing with a consumer that
        // has not yet parked still wakes it.
        self.notify.notify_one();
    }

    /// Pop the oldest record, waiting up to `timeout`. Returns `None` on
    /// timeout so the consumer can re-check its termination condition.
    pub async fn pop(&self, timeout: Duration) -> Option<LogRecord> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(record) = self.inner.lock().pop_front() {
                return Some(record);
            }
            if timeout_at(deadline, self.notify.notified()).await.is_err() {
                return None;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlink_proto::{TraceEventType, TraceSeverity};
    use std::sync::Arc;

    fn record(sequence: u64) -> LogRecord {
        LogRecord {
            sequence,
            timestamp_ns: sequence as i64,
            groups_mask: 0,
            severity: TraceSeverity::Info,
            kind: TraceEventType::LogMessage,
            message: format!("record {}", sequence),
        }
    }

    #[tokio::test]
    async fn pop_preserves_push_order() {
        let queue = EventQueue::new();
        for seq in 1..=5 {
            queue.push(record(seq));
        }

        for seq in 1..=5 {
            let popped = queue.pop(Duration::from_millis(10)).await.unwrap();
            assert_eq!(popped.sequence, seq);
        }
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn pop_times_out_on_empty_queue() {
        let queue = EventQueue::new();
        let started = std::time::Instant::now();
        assert!(queue.pop(Duration::from_millis(50)).await.is_none());
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn pop_wakes_on_concurrent_push() {
        let queue = Arc::new(EventQueue::new());

        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop(Duration::from_secs(2)).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push(record(1));

        let popped = consumer.await.unwrap();
        assert_eq!(popped.unwrap().sequence, 1);
    }
}
