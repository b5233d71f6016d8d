//! Agentlink Client CLI
//!
//! Modes:
//! - `concurrent` (default): the streaming-and-polling session
//! - `demo`: sequentially exercise every call, then the concurrent session
//!
//! Configuration comes from the environment (AGENT_ENDPOINT,
//! RUN_DURATION_SECS, POLL_INTERVAL_SECS, MAX_STREAM_EVENTS,
//! STREAM_TIMEOUT_SECS, QUERY_TIMEOUT_SECS).

use agentlink_client::AgentSession;
use agentlink_core::{AgentConfig, RunConfig};
use agentlink_proto::ServiceType;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agentlink_telemetry::init("agentlink-client")?;

    let agent_config = AgentConfig::from_env()?;
    let run_config = RunConfig::from_env()?;
    let mode = std::env::args().nth(1).unwrap_or_else(|| "concurrent".to_string());

    info!(endpoint = %agent_config.endpoint, mode = %mode, "Starting agentlink client");

    let session = AgentSession::connect(&agent_config).await?;

    match mode.as_str() {
        "demo" => run_demo_suite(&session, &run_config).await,
        "concurrent" => {
            let report = session.run_concurrent_session(&run_config).await;
            info!(
                records = report.records_processed,
                poll_cycles = report.poll_cycles,
                interrupted = report.interrupted,
                "Session complete"
            );
        }
        other => anyhow::bail!("unknown mode '{}', expected 'demo' or 'concurrent'", other),
    }

    Ok(())
}

/// Sequential tour of the whole service surface.
async fn run_demo_suite(session: &AgentSession, run_config: &RunConfig) {
    info!("1. Basic information");
    session.server_info().await;

    info!("2. Service management");
    for service in [
        ServiceType::Trajectory,
        ServiceType::Navigation,
        ServiceType::Inference,
    ] {
        session.service_status(service).await;
        session.start_service(service).await;
        session.service_status(service).await;
        session.stop_service(service).await;
        session.service_status(service).await;
    }

    info!("3. Driver engagement");
    session.integration_status().await;
    session.engage_driver().await;
    session.integration_status().await;
    session.disengage_driver().await;
    session.integration_status().await;

    info!("4. Concurrent streaming and polling");
    let report = session.run_concurrent_session(run_config).await;
    info!(
        records = report.records_processed,
        poll_cycles = report.poll_cycles,
        "Demo complete"
    );
}
