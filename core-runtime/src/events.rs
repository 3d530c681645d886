//! # Event Bus System
//!
//! Broadcasts state-change notifications from the recipe session and the
//! playback controller using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: `CoreEvent` wrapping `SessionEvent` and `PlaybackEvent`
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! Events are notifications, not state. A subscriber that sees
//! `SessionEvent::RecipeAdded` re-reads the session snapshot rather than
//! reconstructing the result list from the event stream.
//!
//! ```text
//! ┌──────────────────┐  emit   ┌───────────┐  subscribe  ┌──────────────┐
//! │  RecipeSession   ├────────>│           ├────────────>│ Presentation │
//! └──────────────────┘         │ EventBus  │             └──────────────┘
//! ┌──────────────────┐  emit   │           │
//! │PlaybackController├────────>│           │
//! └──────────────────┘         └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Session(SessionEvent::ModeChanged {
//!         mode: "pantry".to_string(),
//!     }))
//!     .ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert_eq!(event.description(), "Recipe mode changed");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   Non-fatal; re-read the snapshots and keep receiving.
//! - **`RecvError::Closed`**: All senders have been dropped. Treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Recipe search and selection events
    Session(SessionEvent),
    /// Narration playback events
    Playback(PlaybackEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Session(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Session(SessionEvent::SearchFailed { .. }) => EventSeverity::Error,
            CoreEvent::Session(SessionEvent::RecipeAdded { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Unavailable { .. }) => EventSeverity::Warning,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Session Events
// ============================================================================

/// Events emitted by the recipe session orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// A search passed the blank guard and is now in flight.
    SearchStarted { query: String, mode: String },
    /// A completed recipe was prepended to the result list.
    RecipeAdded {
        recipe_id: String,
        title: String,
        has_image: bool,
    },
    /// The recipe request failed; `message` is the user-facing text.
    SearchFailed { message: String },
    /// The prompt mode switched and the stored query was cleared.
    ModeChanged { mode: String },
    /// The selected recipe changed (`None` clears the selection).
    SelectionChanged { recipe_id: Option<String> },
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::SearchStarted { .. } => "Recipe search started",
            SessionEvent::RecipeAdded { .. } => "Recipe added",
            SessionEvent::SearchFailed { .. } => "Recipe search failed",
            SessionEvent::ModeChanged { .. } => "Recipe mode changed",
            SessionEvent::SelectionChanged { .. } => "Recipe selection changed",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events related to narration playback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// Narration audio is being requested and decoded.
    Loading { recipe_id: String },
    /// Audio output began.
    Started { recipe_id: String },
    /// Playback was halted by toggle-off, stop or teardown.
    Stopped { recipe_id: String },
    /// The end of the narration buffer was reached.
    Completed { recipe_id: String },
    /// No narration could be produced; the controller is back to stopped.
    Unavailable { recipe_id: String, reason: String },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Loading { .. } => "Narration loading",
            PlaybackEvent::Started { .. } => "Narration started",
            PlaybackEvent::Stopped { .. } => "Narration stopped",
            PlaybackEvent::Completed { .. } => "Narration completed",
            PlaybackEvent::Unavailable { .. } => "Narration unavailable",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    ///
    /// ```rust
    /// use core_runtime::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.subscriber_count(), 0);
    ///
    /// let _subscriber = event_bus.subscribe();
    /// assert_eq!(event_bus.subscriber_count(), 1);
    /// ```
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let playback_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Playback(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events that match `predicate` will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe_added(id: &str) -> CoreEvent {
        CoreEvent::Session(SessionEvent::RecipeAdded {
            recipe_id: id.to_string(),
            title: "Acarajé".to_string(),
            has_image: true,
        })
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::default();
        assert!(bus.emit(recipe_added("a")).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Session(SessionEvent::SearchStarted {
            query: "Vatapá".to_string(),
            mode: "traditional".to_string(),
        });

        assert_eq!(bus.emit(event.clone()).unwrap(), 2);
        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Playback(_)));

        bus.emit(recipe_added("a")).ok();

        let playback_event = CoreEvent::Playback(PlaybackEvent::Started {
            recipe_id: "a".to_string(),
        });
        bus.emit(playback_event.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), playback_event);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(recipe_added(&format!("recipe-{}", i))).ok();
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let failed = CoreEvent::Session(SessionEvent::SearchFailed {
            message: "Eita!".to_string(),
        });
        assert_eq!(failed.severity(), EventSeverity::Error);
        assert_eq!(recipe_added("a").severity(), EventSeverity::Info);

        let unavailable = CoreEvent::Playback(PlaybackEvent::Unavailable {
            recipe_id: "a".to_string(),
            reason: "no audio".to_string(),
        });
        assert_eq!(unavailable.severity(), EventSeverity::Warning);

        let loading = CoreEvent::Playback(PlaybackEvent::Loading {
            recipe_id: "a".to_string(),
        });
        assert_eq!(loading.severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_event_description() {
        assert_eq!(recipe_added("a").description(), "Recipe added");
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = CoreEvent::Session(SessionEvent::SelectionChanged {
            recipe_id: Some("k3j9x0a1b".to_string()),
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Session");
        assert_eq!(json["payload"]["event"], "SelectionChanged");
        assert_eq!(json["payload"]["recipe_id"], "k3j9x0a1b");

        let deserialized: CoreEvent = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[tokio::test]
    async fn test_try_recv() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());
        assert!(stream.try_recv().is_none());

        let event = CoreEvent::Playback(PlaybackEvent::Completed {
            recipe_id: "a".to_string(),
        });
        bus.emit(event.clone()).ok();

        let received = stream.try_recv().unwrap().unwrap();
        assert_eq!(received, event);
    }
}
