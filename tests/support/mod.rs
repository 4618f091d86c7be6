//! In-memory transport for driving mirrors without a bus.

#![allow(dead_code)]
#![allow(missing_docs)]
#![allow(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use futures::StreamExt;
use ofono_mirror::{
    OfonoConfig,
    services::{
        Property,
        ofono::{
            Action, Bus, Interface, Listing, ObjectList, PropertyMap, Reply, Signal,
            SignalStream, SubscriptionState, Transport, TypedValue, WireKind, wire,
        },
    },
};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::UnboundedReceiverStream;
use zbus::zvariant::{OwnedValue, Value};

const WAIT: Duration = Duration::from_secs(2);

/// A request/reply call the fake received. Subscriptions are tracked apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetProperties { path: String, interface: Interface },
    SetProperty { path: String, interface: Interface, name: String, value: TypedValue },
    List { path: String, listing: Listing },
    Invoke { path: String, action: Action },
}

#[derive(Default)]
struct State {
    properties: HashMap<(String, Interface), PropertyMap>,
    listings: HashMap<(String, Listing), ObjectList>,
    replies: HashMap<&'static str, Reply>,
    failing: HashSet<&'static str>,
    calls: Vec<Call>,
    subscriptions: Vec<(String, Interface)>,
    feeds: HashMap<(String, Interface), Vec<mpsc::UnboundedSender<Signal>>>,
}

#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bus(&self) -> Bus {
        Bus::new(self.clone(), OfonoConfig::default())
    }

    pub fn set_properties(&self, path: &str, interface: Interface, properties: PropertyMap) {
        self.lock()
            .properties
            .insert((path.to_string(), interface), properties);
    }

    pub fn set_listing(&self, path: &str, listing: Listing, objects: ObjectList) {
        self.lock()
            .listings
            .insert((path.to_string(), listing), objects);
    }

    pub fn set_reply(&self, method: &'static str, reply: Reply) {
        self.lock().replies.insert(method, reply);
    }

    /// Make every operation with this method name fail. `Subscribe` covers
    /// signal subscriptions.
    pub fn fail(&self, method: &'static str) {
        self.lock().failing.insert(method);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn subscriptions(&self) -> Vec<(String, Interface)> {
        self.lock().subscriptions.clone()
    }

    pub fn live_subscriptions(&self, path: &str, interface: Interface) -> usize {
        self.lock()
            .feeds
            .get(&(path.to_string(), interface))
            .map_or(0, |feeds| feeds.iter().filter(|tx| !tx.is_closed()).count())
    }

    /// Deliver a signal to the newest live subscriber of `path`/`interface`.
    pub fn emit(&self, path: &str, interface: Interface, signal: Signal) {
        let state = self.lock();
        let sender = state
            .feeds
            .get(&(path.to_string(), interface))
            .and_then(|feeds| feeds.iter().rev().find(|tx| !tx.is_closed()))
            .unwrap_or_else(|| panic!("no live subscription for {path} {interface}"));
        sender.send(signal).unwrap();
    }

    pub fn emit_property(&self, path: &str, interface: Interface, name: &str, value: Value<'_>) {
        self.emit(
            path,
            interface,
            Signal::PropertyChanged {
                name: name.to_string(),
                value: owned(value),
            },
        );
    }

    pub async fn wait_for_subscription(&self, path: &str, interface: Interface) {
        self.wait_until(|fake| fake.live_subscriptions(path, interface) > 0)
            .await;
    }

    pub async fn wait_for_unsubscribe(&self, path: &str, interface: Interface) {
        self.wait_until(|fake| fake.live_subscriptions(path, interface) == 0)
            .await;
    }

    async fn wait_until(&self, condition: impl Fn(&Self) -> bool) {
        tokio::time::timeout(WAIT, async {
            while !condition(self) {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .unwrap();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn check(&self, method: &str) -> zbus::Result<()> {
        if self.lock().failing.contains(method) {
            Err(zbus::Error::Failure(format!("{method} refused")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_properties(&self, path: &str, interface: Interface) -> zbus::Result<PropertyMap> {
        self.lock().calls.push(Call::GetProperties {
            path: path.to_string(),
            interface,
        });
        self.check("GetProperties")?;

        let state = self.lock();
        let properties = state
            .properties
            .get(&(path.to_string(), interface))
            .ok_or_else(|| zbus::Error::Failure(format!("{path} has no {interface}")))?;

        Ok(clone_map(properties))
    }

    async fn set_property(
        &self,
        path: &str,
        interface: Interface,
        name: &str,
        value: OwnedValue,
    ) -> zbus::Result<()> {
        self.lock().calls.push(Call::SetProperty {
            path: path.to_string(),
            interface,
            name: name.to_string(),
            value: typed(&value),
        });
        self.check("SetProperty")
    }

    async fn list_objects(&self, path: &str, listing: Listing) -> zbus::Result<ObjectList> {
        self.lock().calls.push(Call::List {
            path: path.to_string(),
            listing,
        });
        self.check(listing.method())?;

        let state = self.lock();
        Ok(state
            .listings
            .get(&(path.to_string(), listing))
            .map(|objects| {
                objects
                    .iter()
                    .map(|(path, properties)| (path.clone(), clone_map(properties)))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn invoke(&self, path: &str, action: Action) -> zbus::Result<Reply> {
        let method = action.method();
        self.lock().calls.push(Call::Invoke {
            path: path.to_string(),
            action,
        });
        self.check(method)?;

        Ok(self
            .lock()
            .replies
            .get(method)
            .cloned()
            .unwrap_or(Reply::Empty))
    }

    async fn subscribe(&self, path: &str, interface: Interface) -> zbus::Result<SignalStream> {
        self.lock()
            .subscriptions
            .push((path.to_string(), interface));
        self.check("Subscribe")?;

        let (tx, rx) = mpsc::unbounded_channel();
        self.lock()
            .feeds
            .entry((path.to_string(), interface))
            .or_default()
            .push(tx);

        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}

pub fn owned(value: Value<'_>) -> OwnedValue {
    OwnedValue::try_from(value).unwrap()
}

pub fn map<'a>(entries: impl IntoIterator<Item = (&'a str, Value<'a>)>) -> PropertyMap {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), owned(value)))
        .collect()
}

fn clone_map(properties: &PropertyMap) -> PropertyMap {
    properties
        .iter()
        .map(|(name, value)| (name.clone(), value.try_clone().unwrap()))
        .collect()
}

fn typed(value: &Value<'_>) -> TypedValue {
    [
        WireKind::Boolean,
        WireKind::Integer,
        WireKind::String,
        WireKind::StringSequence,
    ]
    .into_iter()
    .find_map(|kind| wire::decode(value, kind).ok())
    .unwrap()
}

pub fn modem_properties(interfaces: &[&str]) -> PropertyMap {
    map([
        ("Powered", Value::from(true)),
        ("Online", Value::from(true)),
        ("Lockdown", Value::from(false)),
        ("Interfaces", Value::from(interfaces.to_vec())),
        ("Type", Value::from("hardware")),
        ("Manufacturer", Value::from("phonesim")),
    ])
}

pub fn call_properties(number: &str, state: &str) -> PropertyMap {
    map([
        ("LineIdentification", Value::from(number)),
        ("State", Value::from(state)),
        ("Multiparty", Value::from(false)),
    ])
}

/// Next event, failing the test if none arrives in time.
pub async fn next_event<E: Clone>(events: &mut broadcast::Receiver<E>) -> E {
    tokio::time::timeout(WAIT, events.recv())
        .await
        .unwrap()
        .unwrap()
}

/// First subscription state other than `Pending`.
pub async fn settled(state: &Property<SubscriptionState>) -> SubscriptionState {
    let mut states = Box::pin(state.watch());

    tokio::time::timeout(WAIT, async {
        loop {
            match states.next().await {
                Some(SubscriptionState::Pending) => {}
                Some(other) => return other,
                None => panic!("subscription state closed"),
            }
        }
    })
    .await
    .unwrap()
}

/// Let spawned tasks run without waiting on anything in particular.
pub async fn yield_to_runtime() {
    for _ in 0..2 {
        tokio::task::yield_now().await;
    }
}
