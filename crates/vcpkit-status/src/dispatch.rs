//! Status event dispatcher.
//!
//! A typed publish/subscribe registry keyed by [`StatusChannel`].
//! Handlers run synchronously on the publishing thread; the matching
//! handler list is snapshotted before invocation so a handler may
//! subscribe, unsubscribe, or publish re-entrantly. A broadcast channel
//! mirrors every published event for async receivers on other threads.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use vcpkit_core::{StatusChannel, StatusEvent, StatusField, StatusRecord, SubscriberError};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific channels
#[derive(Debug, Clone, Default)]
pub enum ChannelFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events on any of these channels.
    Channels(Vec<StatusChannel>),
}

impl ChannelFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &StatusEvent) -> bool {
        match self {
            ChannelFilter::All => true,
            ChannelFilter::Channels(channels) => channels.contains(&event.channel()),
        }
    }
}

/// Type alias for event handler functions
type EventHandler = Arc<dyn Fn(&StatusEvent) -> Result<(), SubscriberError> + Send + Sync>;

/// Broadcast channel capacity for async receivers.
const BROADCAST_CAPACITY: usize = 1024;

/// Central dispatcher for status change events
pub struct StatusDispatcher {
    /// Broadcast channel sender for async receivers
    sender: broadcast::Sender<StatusEvent>,
    /// Registered synchronous handlers
    handlers: RwLock<HashMap<SubscriptionId, (ChannelFilter, EventHandler)>>,
}

impl StatusDispatcher {
    /// Create a new dispatcher with no subscribers
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            sender,
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Publish an event to all matching subscribers
    ///
    /// Returns the number of synchronous handlers the event was delivered
    /// to. A handler returning an error is logged and does not affect
    /// delivery to the remaining handlers.
    pub fn publish(&self, event: &StatusEvent) -> usize {
        // Snapshot the matching handlers, then invoke outside the lock so
        // handlers can re-enter the dispatcher.
        let matching: Vec<(SubscriptionId, EventHandler)> = {
            let handlers = self.handlers.read();
            handlers
                .iter()
                .filter(|(_, (filter, _))| filter.matches(event))
                .map(|(id, (_, handler))| (*id, handler.clone()))
                .collect()
        };

        let delivered = matching.len();
        for (id, handler) in matching {
            if let Err(err) = handler(event) {
                tracing::warn!(
                    "Subscriber {} failed on {}: {}",
                    id,
                    event.channel(),
                    err
                );
            }
        }

        // Mirror to async receivers; no receivers is not an error.
        let _ = self.sender.send(event.clone());

        delivered
    }

    /// Force-republish every top-level field's current value
    ///
    /// Late-subscriber catch-up: a widget created after polling started
    /// still sees the full current machine state. Fields publish in
    /// declaration order; composite events follow naturally through the
    /// built-in bridges.
    pub fn publish_all(&self, record: &StatusRecord) {
        for &field in StatusField::ALL {
            self.publish(&StatusEvent::Field {
                field,
                value: field.read(record),
            });
        }
    }

    /// Subscribe to events matching a filter
    ///
    /// The handler is called on the publishing thread, so it should return
    /// quickly to avoid stalling the poll cycle.
    pub fn subscribe<F>(&self, filter: ChannelFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&StatusEvent) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers
            .write()
            .insert(id, (filter, Arc::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Subscribe to a single channel
    pub fn subscribe_channel<F>(&self, channel: StatusChannel, handler: F) -> SubscriptionId
    where
        F: Fn(&StatusEvent) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        self.subscribe(ChannelFilter::Channels(vec![channel]), handler)
    }

    /// Get a receiver for async event consumption
    ///
    /// Lagging receivers lose the oldest events; cross-thread delivery
    /// pacing is the sink's concern.
    pub fn receiver(&self) -> broadcast::Receiver<StatusEvent> {
        self.sender.subscribe()
    }

    /// Unsubscribe from events
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Get the number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl Default for StatusDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StatusDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusDispatcher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vcpkit_core::FieldValue;

    fn flood_event(on: bool) -> StatusEvent {
        StatusEvent::Field {
            field: StatusField::Flood,
            value: FieldValue::Bool(on),
        }
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let dispatcher = StatusDispatcher::new();

        let id = dispatcher.subscribe(ChannelFilter::All, |_| Ok(()));
        assert_eq!(dispatcher.subscriber_count(), 1);

        assert!(dispatcher.unsubscribe(id));
        assert_eq!(dispatcher.subscriber_count(), 0);

        // Double unsubscribe should return false
        assert!(!dispatcher.unsubscribe(id));
    }

    #[test]
    fn test_event_delivery() {
        let dispatcher = StatusDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        dispatcher.subscribe(ChannelFilter::All, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(dispatcher.publish(&flood_event(true)), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_channel_filtering() {
        let dispatcher = StatusDispatcher::new();
        let flood_count = Arc::new(AtomicUsize::new(0));
        let mist_count = Arc::new(AtomicUsize::new(0));

        let fc = flood_count.clone();
        dispatcher.subscribe_channel(StatusChannel::Field(StatusField::Flood), move |_| {
            fc.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let mc = mist_count.clone();
        dispatcher.subscribe_channel(StatusChannel::Field(StatusField::Mist), move |_| {
            mc.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        dispatcher.publish(&flood_event(true));
        dispatcher.publish(&StatusEvent::Field {
            field: StatusField::Mist,
            value: FieldValue::Int(1),
        });
        dispatcher.publish(&flood_event(false));

        assert_eq!(flood_count.load(Ordering::SeqCst), 2);
        assert_eq!(mist_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failing_handler_does_not_block_others() {
        let dispatcher = StatusDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));

        dispatcher.subscribe(ChannelFilter::All, |_| {
            Err(SubscriberError::new("widget destroyed"))
        });
        let c = counter.clone();
        dispatcher.subscribe(ChannelFilter::All, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(dispatcher.publish(&flood_event(true)), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reentrant_subscribe_during_dispatch() {
        let dispatcher = Arc::new(StatusDispatcher::new());

        let d = dispatcher.clone();
        dispatcher.subscribe(ChannelFilter::All, move |_| {
            d.subscribe(ChannelFilter::All, |_| Ok(()));
            Ok(())
        });

        dispatcher.publish(&flood_event(true));
        assert_eq!(dispatcher.subscriber_count(), 2);
    }

    #[test]
    fn test_publish_all_is_idempotent() {
        let dispatcher = StatusDispatcher::new();
        let record = StatusRecord::default();

        let first: Arc<parking_lot::Mutex<Vec<StatusEvent>>> = Arc::default();
        let f = first.clone();
        let id = dispatcher.subscribe(ChannelFilter::All, move |event| {
            f.lock().push(event.clone());
            Ok(())
        });
        dispatcher.publish_all(&record);
        let first_pass = std::mem::take(&mut *first.lock());
        dispatcher.publish_all(&record);
        let second_pass = std::mem::take(&mut *first.lock());
        dispatcher.unsubscribe(id);

        assert_eq!(first_pass.len(), StatusField::ALL.len());
        assert_eq!(first_pass, second_pass);
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let dispatcher = StatusDispatcher::new();
        let mut receiver = dispatcher.receiver();

        dispatcher.publish(&flood_event(true));

        match receiver.try_recv() {
            Ok(StatusEvent::Field { field, .. }) => assert_eq!(field, StatusField::Flood),
            other => panic!("Wrong event received: {:?}", other),
        }
    }
}
