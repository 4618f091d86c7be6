#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::time::Duration;

use futures::StreamExt;
use tokio::{sync::broadcast::error::RecvError, time::timeout};

use super::{EventHub, Property};

#[tokio::test]
async fn watch_yields_current_then_changes() {
    let property = Property::new(false);
    let mut values = Box::pin(property.watch());

    assert_eq!(values.next().await, Some(false));

    property.set(true);
    assert_eq!(values.next().await, Some(true));
    assert!(property.get());
}

#[tokio::test]
async fn setting_the_same_value_wakes_nobody() {
    let property = Property::new(3_u8);
    let mut values = Box::pin(property.watch());
    values.next().await;

    property.set(3);

    let woke = timeout(Duration::from_millis(50), values.next()).await;
    assert!(woke.is_err());
}

#[tokio::test]
async fn events_arrive_in_emission_order() {
    let hub = EventHub::new(8);
    let mut first = hub.subscribe();
    let mut second = hub.subscribe();

    for n in 0..3 {
        hub.emit(n);
    }

    for receiver in [&mut first, &mut second] {
        assert_eq!(receiver.recv().await.unwrap(), 0);
        assert_eq!(receiver.recv().await.unwrap(), 1);
        assert_eq!(receiver.recv().await.unwrap(), 2);
    }
}

#[tokio::test]
async fn slow_subscriber_is_told_it_lagged() {
    let hub = EventHub::new(2);
    let mut receiver = hub.subscribe();

    for n in 0..5 {
        hub.emit(n);
    }

    assert!(matches!(receiver.recv().await, Err(RecvError::Lagged(3))));
    assert_eq!(receiver.recv().await.unwrap(), 3);
}

#[test]
fn dropping_a_receiver_unsubscribes() {
    let hub: EventHub<u8> = EventHub::new(4);
    let receiver = hub.subscribe();
    assert_eq!(hub.subscriber_count(), 1);

    drop(receiver);
    assert_eq!(hub.subscriber_count(), 0);

    hub.emit(1);
}

#[tokio::test]
async fn stream_skips_over_lag_gaps() {
    let hub = EventHub::new(1);
    let mut events = Box::pin(hub.stream());

    hub.emit(1);
    hub.emit(2);

    assert_eq!(events.next().await, Some(2));
}

#[tokio::test]
async fn oversized_capacity_is_clamped() {
    let hub = EventHub::new(usize::MAX);
    let mut receiver = hub.subscribe();

    hub.emit(7_u8);

    assert_eq!(receiver.recv().await.unwrap(), 7);
}
