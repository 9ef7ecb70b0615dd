//! Domain event system: progress reporting without coupling.
//!
//! The control loop publishes an event at every phase transition; the CLI
//! (or any other subscriber) renders them. Publishing never blocks and
//! never fails the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A session was created for an objective
    SessionStarted {
        session_id: String,
        objective: String,
        timestamp: DateTime<Utc>,
    },

    /// The planner produced the initial plan
    PlanCreated {
        session_id: String,
        steps: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// The executor finished one task
    StepExecuted {
        session_id: String,
        round: usize,
        task: String,
        document_task: bool,
        outcome_preview: String,
        timestamp: DateTime<Utc>,
    },

    /// The replanner chose to continue with new steps
    Replanned {
        session_id: String,
        round: usize,
        steps: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// The replanner produced the final response
    SessionCompleted {
        session_id: String,
        rounds: usize,
        timestamp: DateTime<Utc>,
    },

    /// The session ended with a fatal error
    SessionFailed {
        session_id: String,
        rounds: usize,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// The model answered one request
    ResponseGenerated {
        model: String,
        tokens_used: u32,
        timestamp: DateTime<Utc>,
    },

    /// A tool was executed by the ReAct agent
    ToolExecuted {
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub. Slow
/// subscribers lag and lose old events rather than stalling the loop.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine.
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Shorten text for log lines and event previews, respecting char boundaries.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::PlanCreated {
            session_id: "s1".into(),
            steps: vec!["search".into()],
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::PlanCreated { steps, .. } => assert_eq!(steps, &vec!["search"]),
            _ => panic!("Expected PlanCreated event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::SessionFailed {
            session_id: "s1".into(),
            rounds: 0,
            error_message: "no subscribers".into(),
            timestamp: Utc::now(),
        });
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("Lovelace", 4), "Love…");
        assert_eq!(preview("ééééé", 2), "éé…");
    }
}
