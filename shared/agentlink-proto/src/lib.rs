//! Agentlink Protocol Buffers
//!
//! Message and enum types for the TestAgentService gRPC interface, written
//! out by hand rather than generated (the service surface is small and
//! stable, and hand-written types keep the build free of protoc).

pub mod test_agent;

pub use test_agent::*;
