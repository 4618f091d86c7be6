use std::fmt;

use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};
use tracing::warn;

/// Default buffer size for a mirror's event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Largest accepted buffer size for a mirror's event channel.
pub const MAX_EVENT_CAPACITY: usize = 1 << 16;

/// Publish/subscribe dispatcher owned by a mirror.
///
/// Events are delivered to every current subscriber in the order they were
/// emitted. A subscriber that falls more than `capacity` events behind loses
/// the oldest ones and is told so through `RecvError::Lagged`.
pub struct EventHub<E: Clone + Send + 'static> {
    tx: broadcast::Sender<E>,
}

impl<E: Clone + Send + 'static> EventHub<E> {
    /// Create a hub buffering up to `capacity` undelivered events per subscriber.
    ///
    /// `capacity` is clamped to `1..=MAX_EVENT_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.clamp(1, MAX_EVENT_CAPACITY));
        Self { tx }
    }

    /// Subscribe to events emitted from now on.
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.tx.subscribe()
    }

    /// Subscribe as a stream, skipping over lag gaps.
    pub fn stream(&self) -> impl Stream<Item = E> + Send + use<E> {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|event| async move {
            match event {
                Ok(event) => Some(event),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "event subscriber lagged behind");
                    None
                }
            }
        })
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub(crate) fn emit(&self, event: E) {
        let _ = self.tx.send(event);
    }
}

impl<E: Clone + Send + 'static> fmt::Debug for EventHub<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}
