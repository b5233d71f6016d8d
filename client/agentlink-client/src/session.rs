//! High-level client session used by the CLI layer.

use std::sync::Arc;

use agentlink_core::{AgentConfig, AgentError, Result, RunConfig};
use agentlink_proto::{IntegrationState, ServiceState, ServiceType};
use tracing::{info, warn};

use crate::orchestrator::{Orchestrator, SessionReport};
use crate::transport::{AgentTransport, GrpcTransport};

/// Snapshot of the basic server queries; `None` marks a failed query.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    pub mock_mode: Option<bool>,
    pub version: Option<String>,
    pub integration_status: Option<IntegrationState>,
    pub model_id: Option<String>,
}

/// One client session against a test agent. Owns the transport; there is
/// no ambient channel or stub singleton.
pub struct AgentSession {
    transport: Arc<dyn AgentTransport>,
}

impl AgentSession {
    /// Connect over gRPC using the endpoint configuration.
    pub async fn connect(config: &AgentConfig) -> Result<Self> {
        let transport = GrpcTransport::connect(config).await?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn AgentTransport>) -> Self {
        Self { transport }
    }

    /// Run the concurrent streaming-and-polling session to completion.
    /// Always returns; degraded paths are logged, not raised.
    pub async fn run_concurrent_session(&self, config: &RunConfig) -> SessionReport {
        Orchestrator::new(self.transport.clone()).run(config).await
    }

    // One-off query wrappers for use outside the concurrent session.
    // A failure is logged and mapped to `None`.

    pub async fn driver_mock(&self) -> Option<bool> {
        report("driver_mock", self.transport.is_driver_mock().await)
    }

    pub async fn driver_version(&self) -> Option<String> {
        report("driver_version", self.transport.driver_version().await)
    }

    pub async fn integration_status(&self) -> Option<IntegrationState> {
        report("integration_status", self.transport.integration_status().await)
    }

    pub async fn model_id(&self) -> Option<String> {
        report("model_id", self.transport.model_id().await)
    }

    pub async fn service_status(&self, service: ServiceType) -> Option<ServiceState> {
        let status = self.transport.service_status(service).await;
        if let Ok(state) = &status {
            info!(
                service = service.as_str_name(),
                state = state.as_str_name(),
                "Service status"
            );
        }
        report("service_status", status)
    }

    // Service-management calls; `false` marks a failed call.

    pub async fn start_service(&self, service: ServiceType) -> bool {
        report("start_service", self.transport.start_service(service).await).is_some()
    }

    pub async fn stop_service(&self, service: ServiceType) -> bool {
        report("stop_service", self.transport.stop_service(service).await).is_some()
    }

    pub async fn engage_driver(&self) -> bool {
        report("engage_driver", self.transport.engage_driver().await).is_some()
    }

    pub async fn disengage_driver(&self) -> bool {
        report("disengage_driver", self.transport.disengage_driver().await).is_some()
    }

    /// All basic server information in one sweep.
    pub async fn server_info(&self) -> ServerInfo {
        info!("Fetching server information");
        ServerInfo {
            mock_mode: self.driver_mock().await,
            version: self.driver_version().await,
            integration_status: self.integration_status().await,
            model_id: self.model_id().await,
        }
    }
}

fn report<T>(query: &'static str, result: std::result::Result<T, AgentError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(query, error_code = e.error_code(), error = %e, "Query failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures_util::StreamExt;

    use crate::transport::TraceStream;

    struct FlakyTransport;

    #[async_trait]
    impl AgentTransport for FlakyTransport {
        async fn is_driver_mock(&self) -> Result<bool> {
            Ok(true)
        }
        async fn driver_version(&self) -> Result<String> {
            Err(AgentError::Rpc {
                code: "Unavailable".into(),
                detail: "version endpoint down".into(),
            })
        }
        async fn integration_status(&self) -> Result<IntegrationState> {
            Ok(IntegrationState::Av)
        }
        async fn model_id(&self) -> Result<String> {
            Ok("test-model-123".into())
        }
        async fn service_status(&self, _service: ServiceType) -> Result<ServiceState> {
            Ok(ServiceState::Running)
        }
        async fn start_service(&self, _service: ServiceType) -> Result<()> {
            Ok(())
        }
        async fn stop_service(&self, _service: ServiceType) -> Result<()> {
            Err(AgentError::Timeout("stop_service".into()))
        }
        async fn engage_driver(&self) -> Result<()> {
            Ok(())
        }
        async fn disengage_driver(&self) -> Result<()> {
            Ok(())
        }
        async fn open_trace_stream(&self) -> Result<TraceStream> {
            Ok(futures_util::stream::empty().boxed())
        }
    }

    #[tokio::test]
    async fn failures_map_to_none_not_errors() {
        let session = AgentSession::with_transport(Arc::new(FlakyTransport));

        assert_eq!(session.driver_mock().await, Some(true));
        assert_eq!(session.driver_version().await, None);
        assert_eq!(
            session.integration_status().await,
            Some(IntegrationState::Av)
        );

        let info = session.server_info().await;
        assert_eq!(info.mock_mode, Some(true));
        assert!(info.version.is_none());
        assert_eq!(info.model_id.as_deref(), Some("test-model-123"));
    }

    #[tokio::test]
    async fn management_calls_map_to_bool() {
        let session = AgentSession::with_transport(Arc::new(FlakyTransport));

        assert!(session.start_service(ServiceType::Trajectory).await);
        assert!(!session.stop_service(ServiceType::Trajectory).await);
        assert!(session.engage_driver().await);
    }
}
