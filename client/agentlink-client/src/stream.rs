//! Bounded, time-boxed consumer of the trace stream.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::queue::EventQueue;
use crate::record::LogRecord;
use crate::shutdown::ShutdownSignal;
use crate::transport::AgentTransport;

/// Opens exactly one streaming call and pushes decoded records into the
/// queue. Sole writer to the queue.
pub struct BoundedStreamReader {
    transport: Arc<dyn AgentTransport>,
    queue: Arc<EventQueue>,
    shutdown: ShutdownSignal,
    producer_done: ShutdownSignal,
}

impl BoundedStreamReader {
    pub fn new(
        transport: Arc<dyn AgentTransport>,
        queue: Arc<EventQueue>,
        shutdown: ShutdownSignal,
        producer_done: ShutdownSignal,
    ) -> Self {
        Self {
            transport,
            queue,
            shutdown,
            producer_done,
        }
    }

    /// Consume the stream until the first of: `max_events` emitted, the
    /// deadline passes, shutdown fires, or the stream ends/errors. Stream
    /// failures are logged and non-fatal to the run. Always fires the
    /// producer-done latch on exit. Returns the number of records emitted.
    pub async fn run(self, max_events: usize, deadline: Duration) -> usize {
        let emitted = self.pump(max_events, deadline).await;
        self.producer_done.trigger();
        info!(emitted, "Trace stream reader finished");
        emitted
    }

    async fn pump(&self, max_events: usize, deadline: Duration) -> usize {
        let mut stream = match self.transport.open_trace_stream().await {
            Ok(stream) => stream,
            Err(e) => {
                // A failed open is not distinguishable from an empty
                // stream as far as the run is concerned, but it is
                // reported distinctly here.
                warn!(error = %e, "Failed to open trace stream");
                return 0;
            }
        };

        let deadline_at = Instant::now() + deadline;
        let mut sequence: u64 = 0;

        while (sequence as usize) < max_events {
            tokio::select! {
                _ = self.shutdown.triggered() => {
                    debug!("Shutdown observed, abandoning trace stream");
                    break;
                }
                _ = tokio::time::sleep_until(deadline_at) => {
                    info!(emitted = sequence, "Trace stream deadline reached");
                    break;
                }
                item = stream.next() => match item {
                    Some(Ok(event)) => {
                        sequence += 1;
                        self.queue.push(LogRecord::decode(sequence, event));
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, emitted = sequence, "Trace stream error");
                        break;
                    }
                    None => {
                        debug!(emitted = sequence, "Trace stream closed by server");
                        break;
                    }
                }
            }
        }

        // Dropping `stream` here closes the underlying call.
        sequence as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlink_core::{AgentError, Result};
    use agentlink_proto::{IntegrationState, ServiceState, ServiceType, TraceEvent};
    use async_trait::async_trait;
    use futures_util::stream;

    use crate::transport::TraceStream;

    /// Transport whose trace stream is configurable; unary calls succeed
    /// with fixed answers.
    struct StubTransport {
        events: StubStream,
    }

    enum StubStream {
        /// Never-ending supply of events at the given pace.
        Infinite(Duration),
        /// Fails on open.
        Broken,
    }

    fn event(n: u64) -> TraceEvent {
        TraceEvent {
            timestamp_ns: n as i64,
            groups_mask: 1,
            severity: 1,
            event_type: 1,
            message: format!("event {}", n).into_bytes(),
        }
    }

    #[async_trait]
    impl AgentTransport for StubTransport {
        async fn is_driver_mock(&self) -> Result<bool> {
            Ok(true)
        }
        async fn driver_version(&self) -> Result<String> {
            Ok("0.1.0-mock".into())
        }
        async fn integration_status(&self) -> Result<IntegrationState> {
            Ok(IntegrationState::Idle)
        }
        async fn model_id(&self) -> Result<String> {
            Ok("test-model-123".into())
        }
        async fn service_status(&self, _service: ServiceType) -> Result<ServiceState> {
            Ok(ServiceState::Unknown)
        }
        async fn start_service(&self, _service: ServiceType) -> Result<()> {
            Ok(())
        }
        async fn stop_service(&self, _service: ServiceType) -> Result<()> {
            Ok(())
        }
        async fn engage_driver(&self) -> Result<()> {
            Ok(())
        }
        async fn disengage_driver(&self) -> Result<()> {
            Ok(())
        }

        async fn open_trace_stream(&self) -> Result<TraceStream> {
            match self.events {
                StubStream::Infinite(pace) => {
                    let stream = stream::unfold(0u64, move |n| async move {
                        tokio::time::sleep(pace).await;
                        Some((Ok(event(n + 1)), n + 1))
                    });
                    Ok(stream.boxed())
                }
                StubStream::Broken => Err(AgentError::Transport("connect refused".into())),
            }
        }
    }

    fn reader(transport: StubTransport) -> (BoundedStreamReader, Arc<EventQueue>, ShutdownSignal) {
        let queue = Arc::new(EventQueue::new());
        let shutdown = ShutdownSignal::new();
        let done = ShutdownSignal::new();
        let reader = BoundedStreamReader::new(
            Arc::new(transport),
            queue.clone(),
            shutdown.clone(),
            done,
        );
        (reader, queue, shutdown)
    }

    #[tokio::test]
    async fn stops_at_max_events_on_unbounded_source() {
        let (reader, queue, _shutdown) = reader(StubTransport {
            events: StubStream::Infinite(Duration::from_millis(1)),
        });

        let emitted = reader.run(5, Duration::from_secs(30)).await;
        assert_eq!(emitted, 5);
        assert_eq!(queue.len(), 5);

        // Sequence numbers are gap-free and start at 1.
        for expected in 1..=5 {
            let record = queue.pop(Duration::from_millis(10)).await.unwrap();
            assert_eq!(record.sequence, expected);
        }
    }

    #[tokio::test]
    async fn stops_at_deadline_when_source_is_slow() {
        let (reader, queue, _shutdown) = reader(StubTransport {
            events: StubStream::Infinite(Duration::from_millis(60)),
        });

        let started = std::time::Instant::now();
        let emitted = reader.run(1000, Duration::from_millis(150)).await;
        let elapsed = started.elapsed();

        assert!(emitted < 1000);
        assert!(elapsed >= Duration::from_millis(150));
        assert!(elapsed < Duration::from_millis(500));
        assert_eq!(queue.len(), emitted);
    }

    #[tokio::test]
    async fn shutdown_stops_the_reader_and_fires_done() {
        let queue = Arc::new(EventQueue::new());
        let shutdown = ShutdownSignal::new();
        let done = ShutdownSignal::new();
        let reader = BoundedStreamReader::new(
            Arc::new(StubTransport {
                events: StubStream::Infinite(Duration::from_millis(5)),
            }),
            queue.clone(),
            shutdown.clone(),
            done.clone(),
        );

        let handle = tokio::spawn(reader.run(1_000_000, Duration::from_secs(60)));
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.trigger();

        let emitted = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reader should stop promptly after shutdown")
            .unwrap();
        assert!(emitted > 0);
        assert!(done.is_set());
    }

    #[tokio::test]
    async fn failed_open_yields_zero_events_without_error() {
        let done = ShutdownSignal::new();
        let queue = Arc::new(EventQueue::new());
        let reader = BoundedStreamReader::new(
            Arc::new(StubTransport {
                events: StubStream::Broken,
            }),
            queue.clone(),
            ShutdownSignal::new(),
            done.clone(),
        );

        let emitted = reader.run(10, Duration::from_secs(1)).await;
        assert_eq!(emitted, 0);
        assert!(queue.is_empty());
        assert!(done.is_set());
    }
}
