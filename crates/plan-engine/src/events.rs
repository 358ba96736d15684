//! Event types for streaming plan progress.
//!
//! One event is emitted per stage transition so a host can surface
//! human-readable progress (blocking callers simply use [`NullEventSink`]).

use serde::{Deserialize, Serialize};

/// Trait for sending plan events.
///
/// Abstracts over the transport (SSE channel, in-memory vec, nothing) so the
/// engine can run in any host.
pub trait EventSink: Send + Sync {
    /// Send an event. Errors mean the receiver is gone; the engine treats
    /// that as non-fatal and keeps executing.
    fn send(&self, event: PlanEvent) -> Result<(), EventError>;
}

/// Error when sending events fails.
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

/// Events emitted during plan execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlanEvent {
    /// Execution started.
    #[serde(rename_all = "camelCase")]
    PlanStarted {
        plan_id: String,
        execution_id: String,
    },

    /// Execution reached an End node.
    #[serde(rename_all = "camelCase")]
    PlanCompleted {
        plan_id: String,
        execution_id: String,
    },

    /// Execution stopped on a fatal failure.
    #[serde(rename_all = "camelCase")]
    PlanFailed {
        plan_id: String,
        execution_id: String,
        error: String,
    },

    /// A stage started executing.
    #[serde(rename_all = "camelCase")]
    StageStarted {
        stage_id: String,
        execution_id: String,
    },

    /// A stage completed, with an optional human-readable note.
    #[serde(rename_all = "camelCase")]
    StageCompleted {
        stage_id: String,
        execution_id: String,
        note: Option<String>,
    },

    /// A stage failed fatally.
    #[serde(rename_all = "camelCase")]
    StageFailed {
        stage_id: String,
        execution_id: String,
        error: String,
    },

    /// A router chose an outgoing handle.
    #[serde(rename_all = "camelCase")]
    Routed {
        stage_id: String,
        execution_id: String,
        handle: String,
        note: Option<String>,
    },
}

/// A no-op event sink that discards all events.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: PlanEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events, for tests.
pub struct VecEventSink {
    events: std::sync::Mutex<Vec<PlanEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events.
    pub fn events(&self) -> Vec<PlanEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: PlanEvent) -> Result<(), EventError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// A sink forwarding events into a tokio mpsc channel, for streaming hosts.
pub struct ChannelEventSink {
    tx: tokio::sync::mpsc::UnboundedSender<PlanEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: tokio::sync::mpsc::UnboundedSender<PlanEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn send(&self, event: PlanEvent) -> Result<(), EventError> {
        self.tx.send(event).map_err(|_| EventError::channel_closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_event_sink_collects() {
        let sink = VecEventSink::new();
        sink.send(PlanEvent::StageStarted {
            stage_id: "parse".to_string(),
            execution_id: "exec1".to_string(),
        })
        .unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            PlanEvent::StageStarted { stage_id, .. } => assert_eq!(stage_id, "parse"),
            _ => panic!("Expected StageStarted event"),
        }
    }

    #[test]
    fn test_channel_sink_reports_closed_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        let sink = ChannelEventSink::new(tx);
        assert!(sink
            .send(PlanEvent::PlanStarted {
                plan_id: "p".to_string(),
                execution_id: "e".to_string(),
            })
            .is_err());
    }

    #[test]
    fn test_event_wire_format() {
        let event = PlanEvent::StageCompleted {
            stage_id: "hotel".to_string(),
            execution_id: "e".to_string(),
            note: Some("3 options".to_string()),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"stageCompleted\""));
        assert!(json.contains("\"stageId\":\"hotel\""));
    }
}
