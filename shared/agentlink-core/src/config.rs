//! Configuration management for the client

use crate::error::{AgentError, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Connection-level settings, read once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub log_level: String,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            endpoint: env::var("AGENT_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:50051".to_string()),
            connect_timeout: Duration::from_secs(parse_env("AGENT_CONNECT_TIMEOUT_SECS", 10)?),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Parameters for one concurrent streaming-and-polling session.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Total wall-clock budget for the session.
    pub total_duration: Duration,
    /// Cadence of the status-query batches.
    pub poll_interval: Duration,
    /// Upper bound on records pulled from the trace stream.
    pub max_events: usize,
    /// Deadline for the stream reader, independent of `max_events`;
    /// whichever limit is hit first terminates the read.
    pub stream_timeout: Duration,
    /// Fence applied to each query in a poll batch.
    pub per_query_timeout: Duration,
}

impl RunConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            total_duration: Duration::from_secs(parse_env("RUN_DURATION_SECS", 15)?),
            poll_interval: Duration::from_secs(parse_env("POLL_INTERVAL_SECS", 3)?),
            max_events: parse_env("MAX_STREAM_EVENTS", 30)? as usize,
            stream_timeout: Duration::from_secs(parse_env("STREAM_TIMEOUT_SECS", 20)?),
            per_query_timeout: Duration::from_secs(parse_env("QUERY_TIMEOUT_SECS", 2)?),
        })
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            total_duration: Duration::from_secs(15),
            poll_interval: Duration::from_secs(3),
            max_events: 30,
            stream_timeout: Duration::from_secs(20),
            per_query_timeout: Duration::from_secs(2),
        }
    }
}

fn parse_env(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AgentError::Config(format!("Invalid {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}
