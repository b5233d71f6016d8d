//! Agentlink Core - Shared types for the test-agent client
//!
//! This crate provides:
//! - Error handling utilities
//! - Configuration management (endpoint and run parameters)

pub mod config;
pub mod error;

pub use config::{AgentConfig, RunConfig};
pub use error::{AgentError, Result};
