//! TestAgentService wire types
//!
//! Field tags and enum values match the server's `test_agent_service.proto`.

use serde::{Deserialize, Serialize};

/// Fully-qualified method paths of the TestAgentService.
pub mod path {
    pub const IS_DRIVER_MOCK: &str = "/testagent.TestAgentService/IsDriverMock";
    pub const GET_DRIVER_VERSION: &str = "/testagent.TestAgentService/GetDriverVersion";
    pub const GET_INTEGRATION_STATUS: &str = "/testagent.TestAgentService/GetIntegrationStatus";
    pub const GET_MODEL_ID: &str = "/testagent.TestAgentService/GetModelId";
    pub const GET_SERVICE_STATUS: &str = "/testagent.TestAgentService/GetServiceStatus";
    pub const START_SERVICE: &str = "/testagent.TestAgentService/StartService";
    pub const STOP_SERVICE: &str = "/testagent.TestAgentService/StopService";
    pub const ENGAGE_DRIVER: &str = "/testagent.TestAgentService/EngageDriver";
    pub const DISENGAGE_DRIVER: &str = "/testagent.TestAgentService/DisengageDriver";
    pub const STREAM_TRACE: &str = "/testagent.TestAgentService/StreamTrace";
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct BooleanValue {
    #[prost(bool, tag = "1")]
    pub value: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct VersionResponse {
    #[prost(string, tag = "1")]
    pub version: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct IntegrationStatusResponse {
    #[prost(enumeration = "IntegrationState", tag = "1")]
    pub state: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ModelIdResponse {
    #[prost(string, tag = "1")]
    pub model_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ServiceTypeRequest {
    #[prost(enumeration = "ServiceType", tag = "1")]
    pub service_type: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ServiceStatusResponse {
    #[prost(enumeration = "ServiceState", tag = "1")]
    pub state: i32,
}

/// One event on the trace stream. `message` is raw bytes on the wire;
/// the server emits UTF-8 text.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TraceEvent {
    #[prost(int64, tag = "1")]
    pub timestamp_ns: i64,
    #[prost(uint32, tag = "2")]
    pub groups_mask: u32,
    #[prost(enumeration = "TraceSeverity", tag = "3")]
    pub severity: i32,
    #[prost(enumeration = "TraceEventType", tag = "4")]
    pub event_type: i32,
    #[prost(bytes = "vec", tag = "5")]
    pub message: Vec<u8>,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, prost::Enumeration,
)]
#[repr(i32)]
pub enum ServiceType {
    Unspecified = 0,
    Trajectory = 1,
    Navigation = 2,
    Inference = 3,
}

impl ServiceType {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Unspecified => "SERVICE_TYPE_UNSPECIFIED",
            Self::Trajectory => "SERVICE_TYPE_TRAJECTORY",
            Self::Navigation => "SERVICE_TYPE_NAVIGATION",
            Self::Inference => "SERVICE_TYPE_INFERENCE",
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, prost::Enumeration,
)]
#[repr(i32)]
pub enum ServiceState {
    Unknown = 0,
    Running = 1,
    Stopped = 2,
}

impl ServiceState {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Unknown => "SERVICE_STATE_UNKNOWN",
            Self::Running => "SERVICE_STATE_RUNNING",
            Self::Stopped => "SERVICE_STATE_STOPPED",
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, prost::Enumeration,
)]
#[repr(i32)]
pub enum IntegrationState {
    Idle = 0,
    Av = 1,
}

impl IntegrationState {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Idle => "INTEGRATION_STATE_IDLE",
            Self::Av => "INTEGRATION_STATE_AV",
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, prost::Enumeration,
)]
#[repr(i32)]
pub enum TraceSeverity {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl TraceSeverity {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, prost::Enumeration,
)]
#[repr(i32)]
pub enum TraceEventType {
    FunctionCall = 0,
    LogMessage = 1,
}

impl TraceEventType {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::FunctionCall => "FUNCTION_CALL",
            Self::LogMessage => "LOG_MESSAGE",
        }
    }
}

/// Trace group bits for `TraceEvent::groups_mask`.
pub mod trace_group {
    pub const TRAJECTORY: u32 = 0x1;
    pub const NAVIGATION: u32 = 0x2;
    pub const INFERENCE: u32 = 0x4;
    pub const SAFETY_CRITICAL: u32 = 0x8;

    /// Names of the groups set in `mask`, in bit order.
    pub fn names(mask: u32) -> Vec<&'static str> {
        let mut out = Vec::new();
        if mask & TRAJECTORY != 0 {
            out.push("trajectory");
        }
        if mask & NAVIGATION != 0 {
            out.push("navigation");
        }
        if mask & INFERENCE != 0 {
            out.push("inference");
        }
        if mask & SAFETY_CRITICAL != 0 {
            out.push("safety_critical");
        }
        out
    }
}
