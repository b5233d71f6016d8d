//! Fixed-cadence fan-out of status queries.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{join_all, BoxFuture};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::shutdown::ShutdownSignal;
use crate::transport::AgentTransport;

/// Value carried by a successful poll query.
#[derive(Debug, Clone, PartialEq)]
pub enum PollValue {
    Bool(bool),
    Text(String),
    State(&'static str),
}

impl fmt::Display for PollValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Text(v) => write!(f, "{}", v),
            Self::State(v) => write!(f, "{}", v),
        }
    }
}

/// Outcome of one query in one cycle. Built fresh every cycle and
/// discarded after reporting.
#[derive(Debug, Clone)]
pub struct PollResult {
    pub query: &'static str,
    pub value: Option<PollValue>,
    pub error: Option<String>,
}

type PollFn = Box<dyn Fn() -> BoxFuture<'static, agentlink_core::Result<PollValue>> + Send + Sync>;

/// Named zero-argument query callable.
pub struct PollQuery {
    name: &'static str,
    fetch: PollFn,
}

impl PollQuery {
    pub fn new<F, Fut>(name: &'static str, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = agentlink_core::Result<PollValue>> + Send + 'static,
    {
        Self {
            name,
            fetch: Box::new(move || {
                Box::pin(fetch()) as BoxFuture<'static, agentlink_core::Result<PollValue>>
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Runs the query set concurrently on a fixed interval. Each query is
/// fenced with its own timeout, so one stalled endpoint degrades only its
/// own result.
pub struct ParallelPoller {
    queries: Vec<PollQuery>,
    shutdown: ShutdownSignal,
}

impl ParallelPoller {
    pub fn new(queries: Vec<PollQuery>, shutdown: ShutdownSignal) -> Self {
        Self { queries, shutdown }
    }

    /// The standard server-info query set: mock flag, version,
    /// integration status, model id.
    pub fn for_transport(transport: Arc<dyn AgentTransport>, shutdown: ShutdownSignal) -> Self {
        let queries = vec![
            PollQuery::new("driver_mock", {
                let transport = transport.clone();
                move || {
                    let transport = transport.clone();
                    async move { transport.is_driver_mock().await.map(PollValue::Bool) }
                }
            }),
            PollQuery::new("driver_version", {
                let transport = transport.clone();
                move || {
                    let transport = transport.clone();
                    async move { transport.driver_version().await.map(PollValue::Text) }
                }
            }),
            PollQuery::new("integration_status", {
                let transport = transport.clone();
                move || {
                    let transport = transport.clone();
                    async move {
                        transport
                            .integration_status()
                            .await
                            .map(|state| PollValue::State(state.as_str_name()))
                    }
                }
            }),
            PollQuery::new("model_id", {
                let transport = transport.clone();
                move || {
                    let transport = transport.clone();
                    async move { transport.model_id().await.map(PollValue::Text) }
                }
            }),
        ];
        Self::new(queries, shutdown)
    }

    /// Poll until shutdown. No new cycle starts once the signal is set; an
    /// in-flight batch finishes, bounded by `per_query_timeout`. Returns
    /// the number of completed cycles.
    pub async fn run(self, interval: Duration, per_query_timeout: Duration) -> u64 {
        let mut cycles: u64 = 0;

        while !self.shutdown.is_set() {
            cycles += 1;
            let cycle_started = Instant::now();
            debug!(cycle = cycles, "Poll cycle starting");

            let results = self.run_cycle(per_query_timeout).await;
            report_cycle(cycles, &results, cycle_started.elapsed());

            tokio::select! {
                _ = tokio::time::sleep_until(cycle_started + interval) => {}
                _ = self.shutdown.triggered() => break,
            }
        }

        info!(cycles, "Poller stopped");
        cycles
    }

    /// One batch: all queries concurrently, each with its own fence. The
    /// returned results keep the query-set order.
    pub async fn run_cycle(&self, per_query_timeout: Duration) -> Vec<PollResult> {
        let futures = self.queries.iter().map(|query| async move {
            match tokio::time::timeout(per_query_timeout, (query.fetch)()).await {
                Ok(Ok(value)) => PollResult {
                    query: query.name,
                    value: Some(value),
                    error: None,
                },
                Ok(Err(e)) => PollResult {
                    query: query.name,
                    value: None,
                    error: Some(e.to_string()),
                },
                Err(_) => PollResult {
                    query: query.name,
                    value: None,
                    error: Some(format!("timed out after {:?}", per_query_timeout)),
                },
            }
        });

        join_all(futures).await
    }
}

fn report_cycle(cycle: u64, results: &[PollResult], elapsed: Duration) {
    for result in results {
        match (&result.value, &result.error) {
            (Some(value), _) => info!(cycle, query = result.query, value = %value, "Poll result"),
            (None, Some(error)) => {
                warn!(cycle, query = result.query, error = %error, "Poll query failed")
            }
            (None, None) => {}
        }
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    info!(
        cycle,
        ok = results.len() - failed,
        failed,
        elapsed_ms = elapsed.as_millis() as u64,
        "Poll cycle complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlink_core::AgentError;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn ok_query(name: &'static str) -> PollQuery {
        PollQuery::new(name, move || async move {
            Ok(PollValue::Text(name.to_string()))
        })
    }

    fn stalled_query(name: &'static str) -> PollQuery {
        PollQuery::new(name, || async {
            std::future::pending::<()>().await;
            unreachable!()
        })
    }

    #[tokio::test]
    async fn stalled_query_does_not_block_the_batch() {
        let poller = ParallelPoller::new(
            vec![
                ok_query("alpha"),
                stalled_query("stuck"),
                ok_query("gamma"),
            ],
            ShutdownSignal::new(),
        );

        let started = std::time::Instant::now();
        let results = poller.run_cycle(Duration::from_millis(100)).await;
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 3);
        assert!(elapsed < Duration::from_millis(400));

        assert_eq!(results[0].query, "alpha");
        assert!(results[0].error.is_none());
        assert_eq!(results[1].query, "stuck");
        assert!(results[1].error.as_ref().unwrap().contains("timed out"));
        assert_eq!(results[2].query, "gamma");
        assert!(results[2].error.is_none());
    }

    #[tokio::test]
    async fn failing_query_reports_error_not_panic() {
        let poller = ParallelPoller::new(
            vec![PollQuery::new("bad", || async {
                Err(AgentError::Rpc {
                    code: "Unavailable".into(),
                    detail: "server down".into(),
                })
            })],
            ShutdownSignal::new(),
        );

        let results = poller.run_cycle(Duration::from_millis(100)).await;
        assert!(results[0].value.is_none());
        assert!(results[0].error.as_ref().unwrap().contains("server down"));
    }

    #[tokio::test]
    async fn no_cycle_starts_after_shutdown() {
        let cycle_starts = Arc::new(AtomicU64::new(0));
        let shutdown = ShutdownSignal::new();

        let query = {
            let cycle_starts = cycle_starts.clone();
            PollQuery::new("counter", move || {
                let cycle_starts = cycle_starts.clone();
                async move {
                    cycle_starts.fetch_add(1, Ordering::SeqCst);
                    Ok(PollValue::Bool(true))
                }
            })
        };

        let poller = ParallelPoller::new(vec![query], shutdown.clone());
        let handle = tokio::spawn(poller.run(Duration::from_millis(30), Duration::from_millis(20)));

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.trigger();
        let cycles = tokio::time::timeout(Duration::from_millis(500), handle)
            .await
            .expect("poller should stop promptly")
            .unwrap();

        let observed = cycle_starts.load(Ordering::SeqCst);
        assert!(cycles >= 1);
        assert_eq!(cycles, observed);

        // Give any stray cycle a chance to show up, then confirm none did.
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cycle_starts.load(Ordering::SeqCst), observed);
    }
}
