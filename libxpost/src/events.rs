//! Progress events for dispatch operations
//!
//! The dispatcher can publish progress on a `tokio::sync::broadcast` bus so a
//! CLI spinner or log sink can follow a fan-out as it happens. Emitting never
//! blocks: without subscribers events are dropped, and lagging subscribers
//! lose the oldest events first.
//!
//! # Example
//!
//! ```no_run
//! use libxpost::events::{Event, EventBus};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(100);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(Event::DispatchStarted {
//!     operation: "create".to_string(),
//!     platforms: vec!["devto".to_string()],
//! });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<Event>;

/// Broadcast bus for dispatch progress
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all current subscribers
    pub fn emit(&self, event: Event) {
        // Err only means nobody is listening
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Events emitted by the dispatcher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A dispatch resolved its targets and is about to fan out
    DispatchStarted {
        /// "create", "update" or "delete"
        operation: String,
        /// Target keys in invocation order
        platforms: Vec<String>,
    },

    /// One platform finished (successfully or not)
    PlatformCompleted {
        platform: String,
        success: bool,
        error: Option<String>,
    },

    /// Every target finished
    DispatchCompleted {
        total: usize,
        successful: usize,
        failed: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_emission_and_subscription() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        event_bus.emit(Event::DispatchStarted {
            operation: "create".to_string(),
            platforms: vec!["devto".to_string()],
        });

        match receiver.recv().await.unwrap() {
            Event::DispatchStarted {
                operation,
                platforms,
            } => {
                assert_eq!(operation, "create");
                assert_eq!(platforms, vec!["devto"]);
            }
            other => panic!("Wrong event type received: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        let event = Event::PlatformCompleted {
            platform: "hashnode".to_string(),
            success: false,
            error: Some("rate limited".to_string()),
        };
        event_bus.emit(event.clone());

        assert_eq!(receiver1.recv().await.unwrap(), event);
        assert_eq!(receiver2.recv().await.unwrap(), event);
    }

    #[test]
    fn test_no_subscribers() {
        let event_bus = EventBus::new(10);

        // Must not panic or block
        event_bus.emit(Event::DispatchCompleted {
            total: 0,
            successful: 0,
            failed: 0,
        });

        assert_eq!(event_bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::DispatchCompleted {
            total: 2,
            successful: 1,
            failed: 1,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"dispatch_completed\""));

        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
