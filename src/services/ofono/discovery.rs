use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

use crate::services::common::{EventHub, Property};

use super::{
    Bus, Diagnostic, Interface, Listing, Modem, OfonoError, PropertyMap, Signal,
    core::{Mirror, MirrorMonitor, Subscription, SubscriptionState, mirror_listing},
};

/// Object path of the oFono manager.
pub const MANAGER_PATH: &str = "/";

/// Event published by the [`ModemManager`].
#[derive(Debug, Clone)]
pub enum ManagerEvent {
    /// A modem appeared. The mirror is live; keeping it is up to the receiver.
    ModemAdded(Arc<Modem>),
    /// The modem at this path went away.
    ModemRemoved(String),
    /// Something was ignored; see [`Diagnostic`].
    Diagnostic(Diagnostic),
}

/// Directory of the modems known to oFono.
///
/// Listing builds one [`Modem`] mirror per entry. Modems appearing or
/// disappearing afterwards are reported as [`ManagerEvent`]s; the manager
/// keeps no registry of its own.
#[derive(Debug)]
pub struct ModemManager {
    bus: Bus,
    events: EventHub<ManagerEvent>,
    subscription: Subscription,
}

impl ModemManager {
    /// Create the directory, subscribing to modem additions and removals in
    /// the background. Must be called within a Tokio runtime.
    pub fn new(bus: &Bus) -> Arc<Self> {
        let manager = Self::build(bus);
        MirrorMonitor::spawn(&manager, bus);

        manager
    }

    /// Create the directory and wait until its subscription is active.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the subscription fails.
    #[instrument(skip(bus), err)]
    pub async fn connect(bus: &Bus) -> Result<Arc<Self>, OfonoError> {
        let manager = Self::build(bus);
        MirrorMonitor::start(&manager, bus).await?;
        info!("Modem directory subscribed");

        Ok(manager)
    }

    fn build(bus: &Bus) -> Arc<Self> {
        Arc::new(Self {
            bus: bus.clone(),
            events: EventHub::new(bus.config().event_capacity),
            subscription: Subscription::default(),
        })
    }

    /// Subscribe to modem additions, removals and diagnostics.
    pub fn events(&self) -> broadcast::Receiver<ManagerEvent> {
        self.events.subscribe()
    }

    /// State of the change subscription. Snapshot fields only follow the
    /// remote object while it is [`SubscriptionState::Live`].
    pub fn subscription_state(&self) -> &Property<SubscriptionState> {
        self.subscription.state()
    }

    /// Event hub of the directory, for stream-based consumers.
    pub fn event_hub(&self) -> &EventHub<ManagerEvent> {
        &self.events
    }

    /// Mirrors of every modem currently known.
    ///
    /// Issues a single `GetModems`, then subscribes each mirror before
    /// returning it. Entries whose properties cannot be mirrored are skipped
    /// and logged.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if `GetModems` or a modem's
    /// subscription fails.
    #[instrument(skip(self), err)]
    pub async fn list(&self) -> Result<Vec<Arc<Modem>>, OfonoError> {
        let modems = self.bus.list_objects(MANAGER_PATH, Listing::Modems).await?;
        debug!(count = modems.len(), "GetModems returned");

        mirror_listing(MANAGER_PATH, modems, &self.bus, Modem::build).await
    }

    fn modem_added(&self, path: String, properties: &PropertyMap) {
        match Modem::from_known_data(&path, properties, &self.bus) {
            Ok(modem) => {
                info!(modem = %path, "modem added");
                self.events.emit(ManagerEvent::ModemAdded(modem));
            }
            Err(err) => self.report(Diagnostic::ChildRejected {
                path: MANAGER_PATH.to_string(),
                child: path,
                reason: err.to_string(),
            }),
        }
    }
}

impl Mirror for ModemManager {
    fn path(&self) -> &str {
        MANAGER_PATH
    }

    fn interface(&self) -> Interface {
        Interface::Manager
    }

    fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    fn handle_signal(&self, signal: Signal) {
        match signal {
            Signal::ModemAdded { path, properties } => self.modem_added(path, &properties),
            Signal::ModemRemoved { path } => {
                info!(modem = %path, "modem removed");
                self.events.emit(ManagerEvent::ModemRemoved(path));
            }
            other => self.unknown_signal(&other),
        }
    }

    fn report(&self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.events.emit(ManagerEvent::Diagnostic(diagnostic));
    }
}
