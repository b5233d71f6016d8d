//! tonic-backed transport.
//!
//! The service surface is small, so calls go through
//! `tonic::client::Grpc` with static method paths instead of generated
//! stubs; the message types live in `agentlink-proto`.

use agentlink_core::{AgentConfig, AgentError, Result};
use agentlink_proto::{
    path, BooleanValue, Empty, IntegrationState, IntegrationStatusResponse, ModelIdResponse,
    ServiceState, ServiceStatusResponse, ServiceType, ServiceTypeRequest, TraceEvent,
    VersionResponse,
};
use async_trait::async_trait;
use futures_util::StreamExt;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;
use tonic::{IntoRequest, Status};

use super::{AgentTransport, TraceStream};

/// gRPC transport over one shared channel. The channel multiplexes
/// concurrent calls, so the poller's fan-out and the trace stream can
/// share a single connection.
#[derive(Clone)]
pub struct GrpcTransport {
    channel: Channel,
}

impl GrpcTransport {
    /// Connect without TLS, per the test agent's deployment.
    pub async fn connect(config: &AgentConfig) -> Result<Self> {
        let channel = Channel::from_shared(config.endpoint.clone())
            .map_err(|e| AgentError::Transport(format!("invalid endpoint: {}", e)))?
            .connect_timeout(config.connect_timeout)
            .connect()
            .await
            .map_err(|e| AgentError::Transport(e.to_string()))?;

        tracing::info!(endpoint = %config.endpoint, "Connected to test agent");
        Ok(Self { channel })
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self { channel }
    }

    async fn unary<Req, Resp>(&self, method: &'static str, request: Req) -> Result<Resp>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| AgentError::Transport(format!("service not ready: {}", e)))?;

        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        let response = grpc
            .unary(
                request.into_request(),
                PathAndQuery::from_static(method),
                codec,
            )
            .await
            .map_err(status_to_error)?;

        Ok(response.into_inner())
    }
}

#[async_trait]
impl AgentTransport for GrpcTransport {
    async fn is_driver_mock(&self) -> Result<bool> {
        let response: BooleanValue = self.unary(path::IS_DRIVER_MOCK, Empty {}).await?;
        Ok(response.value)
    }

    async fn driver_version(&self) -> Result<String> {
        let response: VersionResponse = self.unary(path::GET_DRIVER_VERSION, Empty {}).await?;
        Ok(response.version)
    }

    async fn integration_status(&self) -> Result<IntegrationState> {
        let response: IntegrationStatusResponse =
            self.unary(path::GET_INTEGRATION_STATUS, Empty {}).await?;
        Ok(IntegrationState::try_from(response.state).unwrap_or(IntegrationState::Idle))
    }

    async fn model_id(&self) -> Result<String> {
        let response: ModelIdResponse = self.unary(path::GET_MODEL_ID, Empty {}).await?;
        Ok(response.model_id)
    }

    async fn service_status(&self, service: ServiceType) -> Result<ServiceState> {
        let request = ServiceTypeRequest {
            service_type: service as i32,
        };
        let response: ServiceStatusResponse = self.unary(path::GET_SERVICE_STATUS, request).await?;
        Ok(ServiceState::try_from(response.state).unwrap_or(ServiceState::Unknown))
    }

    async fn start_service(&self, service: ServiceType) -> Result<()> {
        let request = ServiceTypeRequest {
            service_type: service as i32,
        };
        let _: Empty = self.unary(path::START_SERVICE, request).await?;
        Ok(())
    }

    async fn stop_service(&self, service: ServiceType) -> Result<()> {
        let request = ServiceTypeRequest {
            service_type: service as i32,
        };
        let _: Empty = self.unary(path::STOP_SERVICE, request).await?;
        Ok(())
    }

    async fn engage_driver(&self) -> Result<()> {
        let _: Empty = self.unary(path::ENGAGE_DRIVER, Empty {}).await?;
        Ok(())
    }

    async fn disengage_driver(&self) -> Result<()> {
        let _: Empty = self.unary(path::DISENGAGE_DRIVER, Empty {}).await?;
        Ok(())
    }

    async fn open_trace_stream(&self) -> Result<TraceStream> {
        let mut grpc = Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| AgentError::Transport(format!("service not ready: {}", e)))?;

        let codec: ProstCodec<Empty, TraceEvent> = ProstCodec::default();
        let response = grpc
            .server_streaming(
                Empty {}.into_request(),
                PathAndQuery::from_static(path::STREAM_TRACE),
                codec,
            )
            .await
            .map_err(status_to_error)?;

        let stream = response.into_inner().map(|item| item.map_err(status_to_error));
        Ok(stream.boxed())
    }
}

fn status_to_error(status: Status) -> AgentError {
    AgentError::Rpc {
        code: format!("{:?}", status.code()),
        detail: status.message().to_string(),
    }
}
