//! Decoded trace records flowing from the stream reader to the processor.

use std::fmt;

use agentlink_proto::{trace_group, TraceEvent, TraceEventType, TraceSeverity};
use chrono::DateTime;

/// One trace event as observed by this client. Immutable once built;
/// ownership moves producer -> queue -> processor.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Position in the stream as seen by this client, starting at 1.
    pub sequence: u64,
    pub timestamp_ns: i64,
    pub groups_mask: u32,
    pub severity: TraceSeverity,
    pub kind: TraceEventType,
    pub message: String,
}

impl LogRecord {
    /// Decode a raw wire event. Unknown enum values fall back to the
    /// proto3 defaults rather than failing the stream.
    pub fn decode(sequence: u64, event: TraceEvent) -> Self {
        Self {
            sequence,
            timestamp_ns: event.timestamp_ns,
            groups_mask: event.groups_mask,
            severity: TraceSeverity::try_from(event.severity).unwrap_or(TraceSeverity::Debug),
            kind: TraceEventType::try_from(event.event_type)
                .unwrap_or(TraceEventType::FunctionCall),
            message: String::from_utf8_lossy(&event.message).into_owned(),
        }
    }

    pub fn groups(&self) -> Vec<&'static str> {
        trace_group::names(self.groups_mask)
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let when = DateTime::from_timestamp_nanos(self.timestamp_ns);
        write!(
            f,
            "#{} {} [{}] {} ({}) {}",
            self.sequence,
            when.format("%H:%M:%S%.3f"),
            self.severity.as_str_name(),
            self.kind.as_str_name(),
            self.groups().join(","),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_maps_fields_and_lossy_utf8() {
        let event = TraceEvent {
            timestamp_ns: 42,
            groups_mask: trace_group::INFERENCE,
            severity: TraceSeverity::Error as i32,
            event_type: TraceEventType::LogMessage as i32,
            message: vec![0x68, 0x69, 0xff],
        };

        let record = LogRecord::decode(7, event);
        assert_eq!(record.sequence, 7);
        assert_eq!(record.severity, TraceSeverity::Error);
        assert_eq!(record.kind, TraceEventType::LogMessage);
        assert_eq!(record.groups(), vec!["inference"]);
        assert!(record.message.starts_with("hi"));
    }

    #[test]
    fn decode_tolerates_unknown_enum_values() {
        let event = TraceEvent {
            timestamp_ns: 0,
            groups_mask: 0,
            severity: 99,
            event_type: 99,
            message: Vec::new(),
        };

        let record = LogRecord::decode(1, event);
        assert_eq!(record.severity, TraceSeverity::Debug);
        assert_eq!(record.kind, TraceEventType::FunctionCall);
    }
}
