use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::instrument;

use crate::services::{
    common::{EventHub, Property},
    ofono::{
        AccessTechnology, Action, Bus, Diagnostic, Interface, Listing, OfonoError, PropertyMap,
        RegistrationMode, RegistrationStatus, Signal,
        core::{
            Mirror, MirrorMonitor, Subscription, SubscriptionState, decode_change,
            decode_properties, mirror_listing, network_operator::NetworkOperator, required,
        },
    },
};

mod properties;

pub use properties::NetworkRegistrationProperty;
use properties::NetworkRegistrationSnapshot;

/// Event published by a [`NetworkRegistration`] mirror.
#[derive(Debug, Clone)]
pub enum NetworkRegistrationEvent {
    /// A property change notification was applied.
    Changed(NetworkRegistrationProperty),
    /// Something was ignored; see [`Diagnostic`].
    Diagnostic(Diagnostic),
}

/// Live mirror of a modem's `org.ofono.NetworkRegistration` interface.
#[derive(Debug)]
pub struct NetworkRegistration {
    path: String,
    bus: Bus,

    /// Registration status.
    pub status: Property<RegistrationStatus>,

    /// Operator selection mode.
    pub mode: Property<Option<RegistrationMode>>,

    /// Location area code.
    pub location_area_code: Property<Option<u16>>,

    /// Cell id.
    pub cell_id: Property<Option<u32>>,

    /// Mobile country code of the serving network.
    pub mobile_country_code: Property<Option<String>>,

    /// Mobile network code of the serving network.
    pub mobile_network_code: Property<Option<String>>,

    /// Access technology in use.
    pub technology: Property<Option<AccessTechnology>>,

    /// Name of the current operator.
    pub name: Property<Option<String>>,

    /// Signal strength in percent.
    pub strength: Property<Option<u8>>,

    /// Cell broadcast base station name.
    pub base_station: Property<Option<String>>,

    events: EventHub<NetworkRegistrationEvent>,
    subscription: Subscription,
}

impl NetworkRegistration {
    /// Build a mirror from an already known property map. Must be called
    /// within a Tokio runtime; the subscription is established in the
    /// background.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::MissingProperty` or `OfonoError::MalformedProperty`
    /// if `Status` is absent or undecodable.
    pub fn from_known_data(
        path: &str,
        properties: &PropertyMap,
        bus: &Bus,
    ) -> Result<Arc<Self>, OfonoError> {
        let registration = Self::build(path, properties, bus)?;
        MirrorMonitor::spawn(&registration, bus);

        Ok(registration)
    }

    /// Fetch the registration properties of the modem at `path` and build a
    /// subscribed mirror.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the fetch or the subscription
    /// fails, and the construction errors of
    /// [`NetworkRegistration::from_known_data`].
    #[instrument(skip(bus), err)]
    pub async fn from_path(path: &str, bus: &Bus) -> Result<Arc<Self>, OfonoError> {
        let properties = bus
            .get_properties(path, Interface::NetworkRegistration)
            .await?;
        let registration = Self::build(path, &properties, bus)?;
        MirrorMonitor::start(&registration, bus).await?;

        Ok(registration)
    }

    fn build(path: &str, properties: &PropertyMap, bus: &Bus) -> Result<Arc<Self>, OfonoError> {
        let snapshot = NetworkRegistrationSnapshot::fold(decode_properties(path, properties)?);

        Ok(Arc::new(Self {
            path: path.to_string(),
            bus: bus.clone(),
            status: Property::new(required(snapshot.status, path, "Status")?),
            mode: Property::new(snapshot.mode),
            location_area_code: Property::new(snapshot.location_area_code),
            cell_id: Property::new(snapshot.cell_id),
            mobile_country_code: Property::new(snapshot.mobile_country_code),
            mobile_network_code: Property::new(snapshot.mobile_network_code),
            technology: Property::new(snapshot.technology),
            name: Property::new(snapshot.name),
            strength: Property::new(snapshot.strength),
            base_station: Property::new(snapshot.base_station),
            events: EventHub::new(bus.config().event_capacity),
            subscription: Subscription::default(),
        }))
    }

    /// Object path of the owning modem.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Subscribe to change and diagnostic events.
    pub fn events(&self) -> broadcast::Receiver<NetworkRegistrationEvent> {
        self.events.subscribe()
    }

    /// State of the change subscription. Snapshot fields only follow the
    /// remote object while it is [`SubscriptionState::Live`].
    pub fn subscription_state(&self) -> &Property<SubscriptionState> {
        self.subscription.state()
    }

    /// Event hub of this mirror, for stream-based consumers.
    pub fn event_hub(&self) -> &EventHub<NetworkRegistrationEvent> {
        &self.events
    }

    /// Register with the default operator, switching to automatic mode.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if registration is refused.
    pub async fn register(&self) -> Result<(), OfonoError> {
        self.bus.invoke(&self.path, Action::Register).await?;
        Ok(())
    }

    /// Operators known from the last scan, without scanning again.
    ///
    /// Each operator mirror is subscribed before it is returned; entries
    /// that cannot be mirrored are skipped and logged.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if `GetOperators` or an operator's
    /// subscription fails.
    pub async fn get_operators(&self) -> Result<Vec<Arc<NetworkOperator>>, OfonoError> {
        self.operators(Listing::Operators).await
    }

    /// Scan for operators. This can take a long time.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if `Scan` or an operator's
    /// subscription fails.
    pub async fn scan(&self) -> Result<Vec<Arc<NetworkOperator>>, OfonoError> {
        self.operators(Listing::Scan).await
    }

    async fn operators(&self, listing: Listing) -> Result<Vec<Arc<NetworkOperator>>, OfonoError> {
        let operators = self.bus.list_objects(&self.path, listing).await?;

        mirror_listing(&self.path, operators, &self.bus, NetworkOperator::build).await
    }

    fn apply(&self, property: NetworkRegistrationProperty) {
        use NetworkRegistrationProperty as P;

        match property {
            P::Status(v) => self.status.set(v),
            P::Mode(v) => self.mode.set(Some(v)),
            P::LocationAreaCode(v) => self.location_area_code.set(Some(v)),
            P::CellId(v) => self.cell_id.set(Some(v)),
            P::MobileCountryCode(v) => self.mobile_country_code.set(Some(v)),
            P::MobileNetworkCode(v) => self.mobile_network_code.set(Some(v)),
            P::Technology(v) => self.technology.set(Some(v)),
            P::Name(v) => self.name.set(Some(v)),
            P::Strength(v) => self.strength.set(Some(v)),
            P::BaseStation(v) => self.base_station.set(Some(v)),
        }
    }
}

impl Mirror for NetworkRegistration {
    fn path(&self) -> &str {
        &self.path
    }

    fn interface(&self) -> Interface {
        Interface::NetworkRegistration
    }

    fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    fn handle_signal(&self, signal: Signal) {
        match signal {
            Signal::PropertyChanged { name, value } => {
                match decode_change::<NetworkRegistrationProperty>(&self.path, &name, &value) {
                    Ok(property) => {
                        self.apply(property.clone());
                        self.events.emit(NetworkRegistrationEvent::Changed(property));
                    }
                    Err(diagnostic) => self.report(diagnostic),
                }
            }
            other => self.unknown_signal(&other),
        }
    }

    fn report(&self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.events.emit(NetworkRegistrationEvent::Diagnostic(diagnostic));
    }
}
