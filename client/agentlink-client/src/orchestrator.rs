//! Lifecycle owner for the concurrent session.

use std::sync::Arc;
use std::time::Duration;

use agentlink_core::RunConfig;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::poller::ParallelPoller;
use crate::processor::Processor;
use crate::queue::EventQueue;
use crate::shutdown::ShutdownSignal;
use crate::stream::BoundedStreamReader;
use crate::transport::AgentTransport;

/// Session lifecycle. No transition leads back out of `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// What one concurrent session did.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    /// Records pulled off the trace stream.
    pub records_streamed: usize,
    /// Records rendered by the processor.
    pub records_processed: u64,
    /// Completed poll cycles.
    pub poll_cycles: u64,
    /// True when an external interrupt ended the session early.
    pub interrupted: bool,
}

/// Starts the stream reader, poller and processor, enforces the total run
/// duration, and guarantees a bounded join on the way out.
pub struct Orchestrator {
    transport: Arc<dyn AgentTransport>,
}

impl Orchestrator {
    pub fn new(transport: Arc<dyn AgentTransport>) -> Self {
        Self { transport }
    }

    /// Run one session. Always returns; expected timeout and interrupt
    /// conditions are reported in the [`SessionReport`], never raised.
    pub async fn run(&self, config: &RunConfig) -> SessionReport {
        let mut state = SessionState::Idle;
        debug!(?state, "Session created");

        let shutdown = ShutdownSignal::new();
        let producer_done = ShutdownSignal::new();
        let queue = Arc::new(EventQueue::new());

        let reader = BoundedStreamReader::new(
            self.transport.clone(),
            queue.clone(),
            shutdown.clone(),
            producer_done.clone(),
        );
        let reader_handle = tokio::spawn(reader.run(config.max_events, config.stream_timeout));

        let poller = ParallelPoller::for_transport(self.transport.clone(), shutdown.clone());
        let poller_handle =
            tokio::spawn(poller.run(config.poll_interval, config.per_query_timeout));

        let processor = Processor::new(queue.clone(), producer_done.clone());
        let processor_handle = tokio::spawn(processor.run());

        state = SessionState::Running;
        info!(
            ?state,
            duration_secs = config.total_duration.as_secs(),
            poll_interval_secs = config.poll_interval.as_secs(),
            max_events = config.max_events,
            "Concurrent session started"
        );

        // The interrupt is caught exactly once, here, and translated into
        // the same shutdown signal every task observes.
        let interrupted = tokio::select! {
            _ = tokio::time::sleep(config.total_duration) => false,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received");
                true
            }
        };

        state = SessionState::Stopping;
        debug!(?state, interrupted, "Raising shutdown signal");
        shutdown.trigger();

        // The poller may legitimately spend up to per_query_timeout
        // finishing an in-flight batch; a second of slack covers
        // scheduling on top of that.
        let join_budget = config.per_query_timeout + Duration::from_secs(1);

        let records_streamed = join_bounded("stream-reader", reader_handle, join_budget)
            .await
            .unwrap_or(0);
        let poll_cycles = join_bounded("poller", poller_handle, join_budget)
            .await
            .unwrap_or(0);
        let records_processed = join_bounded("processor", processor_handle, join_budget)
            .await
            .unwrap_or(0);

        state = SessionState::Stopped;
        let report = SessionReport {
            records_streamed,
            records_processed,
            poll_cycles,
            interrupted,
        };
        info!(
            ?state,
            records_streamed = report.records_streamed,
            records_processed = report.records_processed,
            poll_cycles = report.poll_cycles,
            "Concurrent session stopped"
        );
        report
    }
}

/// Join a task within `budget`. A task that overruns is logged as a
/// warning and aborted; the session still exits cleanly.
async fn join_bounded<T>(name: &'static str, mut handle: JoinHandle<T>, budget: Duration) -> Option<T> {
    match tokio::time::timeout(budget, &mut handle).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            warn!(task = name, error = %e, "Task failed");
            None
        }
        Err(_) => {
            warn!(task = name, budget_ms = budget.as_millis() as u64, "Join timed out, proceeding");
            handle.abort();
            None
        }
    }
}
