#![forbid(unsafe_code)]

use tokio::sync::broadcast;

use crate::Event;

/// Unified event bus for the mosaic loading pipeline.
///
/// Every component receives a cloned `EventBus` and publishes into it
/// directly; subscribers observe the whole page. Lifecycle notifications
/// (selection, load success/error, progress, after-show) are delivered this
/// way — nothing in the pipeline consumes a subscriber's reaction.
///
/// `publish()` is a sync call and never blocks. With no subscribers, events
/// are silently dropped.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Accepts anything converting `Into<Event>`, so sub-enum values can be
    /// passed directly: `bus.publish(LoaderEvent::Progress { .. })`.
    pub fn publish<E: Into<Event>>(&self, event: E) {
        let _ = self.tx.send(event.into());
    }

    /// Subscribe to all future events.
    ///
    /// Each subscriber gets an independent receiver. A slow subscriber
    /// receives `RecvError::Lagged(n)` instead of blocking publishers.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
