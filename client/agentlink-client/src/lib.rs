//! Agentlink Client - Concurrent TestAgent session core
//!
//! Consumes the server's trace-event stream while polling its status
//! endpoints on a fixed cadence, multiplexing everything onto one ordered
//! output sink:
//! - [`BoundedStreamReader`] pulls a bounded, time-boxed run of trace events
//! - [`ParallelPoller`] fans out a batch of status queries per cycle
//! - [`Processor`] drains the shared queue in arrival order
//! - [`Orchestrator`] owns the shutdown signal and the join paths
//!
//! The gRPC surface is behind the [`AgentTransport`] trait so tests can
//! substitute a mock backend.

pub mod orchestrator;
pub mod poller;
pub mod processor;
pub mod queue;
pub mod record;
pub mod session;
pub mod shutdown;
pub mod stream;
pub mod transport;

pub use orchestrator::{Orchestrator, SessionReport};
pub use poller::{ParallelPoller, PollQuery, PollResult, PollValue};
pub use processor::Processor;
pub use queue::EventQueue;
pub use record::LogRecord;
pub use session::{AgentSession, ServerInfo};
pub use shutdown::ShutdownSignal;
pub use stream::BoundedStreamReader;
pub use transport::{AgentTransport, GrpcTransport, TraceStream};
