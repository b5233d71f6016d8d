//! Ordered consumer of queued trace records.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::queue::EventQueue;
use crate::record::LogRecord;
use crate::shutdown::ShutdownSignal;

/// How long one pop waits before the termination condition is re-checked.
const POP_TIMEOUT: Duration = Duration::from_millis(250);

/// Drains the queue in FIFO order. Exits only once the producer has
/// signalled completion AND the queue is empty; both are checked together
/// so records pushed just before the done signal are never lost.
pub struct Processor {
    queue: Arc<EventQueue>,
    producer_done: ShutdownSignal,
}

impl Processor {
    pub fn new(queue: Arc<EventQueue>, producer_done: ShutdownSignal) -> Self {
        Self {
            queue,
            producer_done,
        }
    }

    /// Returns the number of records processed.
    pub async fn run(self) -> u64 {
        let mut processed: u64 = 0;

        loop {
            match self.queue.pop(POP_TIMEOUT).await {
                Some(record) => {
                    processed += 1;
                    self.render(&record);
                }
                None => {
                    if self.producer_done.is_set() && self.queue.is_empty() {
                        break;
                    }
                }
            }
        }

        info!(processed, "Processor finished");
        processed
    }

    fn render(&self, record: &LogRecord) {
        info!(
            sequence = record.sequence,
            severity = record.severity.as_str_name(),
            kind = record.kind.as_str_name(),
            groups = %record.groups().join(","),
            "[TRACE] {}",
            record.message
        );
    }
}
