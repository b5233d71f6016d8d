//! Transport seam over the TestAgentService RPC surface.
//!
//! The session core only sees this trait; the tonic-backed implementation
//! lives in [`grpc`] and tests substitute their own mock.

use agentlink_core::Result;
use agentlink_proto::{IntegrationState, ServiceState, ServiceType, TraceEvent};
use async_trait::async_trait;
use futures_util::stream::BoxStream;

pub mod grpc;

pub use grpc::GrpcTransport;

/// Lazy sequence of trace events. Dropping the stream closes the
/// underlying call; closing early is supported and non-erroring.
pub type TraceStream = BoxStream<'static, Result<TraceEvent>>;

/// Unary and streaming calls offered by the remote test agent. The
/// implementation must tolerate concurrent independent calls on one
/// connection.
#[async_trait]
pub trait AgentTransport: Send + Sync + 'static {
    async fn is_driver_mock(&self) -> Result<bool>;

    async fn driver_version(&self) -> Result<String>;

    async fn integration_status(&self) -> Result<IntegrationState>;

    async fn model_id(&self) -> Result<String>;

    async fn service_status(&self, service: ServiceType) -> Result<ServiceState>;

    async fn start_service(&self, service: ServiceType) -> Result<()>;

    async fn stop_service(&self, service: ServiceType) -> Result<()>;

    async fn engage_driver(&self) -> Result<()>;

    async fn disengage_driver(&self) -> Result<()>;

    /// Open the server-streaming trace call. One call per stream reader.
    async fn open_trace_stream(&self) -> Result<TraceStream>;
}
