use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::instrument;

use crate::services::{
    common::{EventHub, Property},
    ofono::{
        AccessTechnology, Action, Bus, Diagnostic, Interface, OfonoError, OperatorStatus,
        PropertyMap, Signal,
        core::{
            Mirror, MirrorMonitor, Subscription, SubscriptionState, decode_change,
            decode_properties, required,
        },
    },
};

mod properties;

pub use properties::NetworkOperatorProperty;
use properties::NetworkOperatorSnapshot;

/// Event published by a [`NetworkOperator`] mirror.
#[derive(Debug, Clone)]
pub enum NetworkOperatorEvent {
    /// A property change notification was applied.
    Changed(NetworkOperatorProperty),
    /// Something was ignored; see [`Diagnostic`].
    Diagnostic(Diagnostic),
}

/// Live mirror of an operator found by `GetOperators` or `Scan`.
#[derive(Debug)]
pub struct NetworkOperator {
    path: String,
    bus: Bus,

    /// Operator name.
    pub name: Property<String>,

    /// Availability of the operator.
    pub status: Property<OperatorStatus>,

    /// Mobile country code.
    pub mobile_country_code: Property<Option<String>>,

    /// Mobile network code.
    pub mobile_network_code: Property<Option<String>>,

    /// Access technologies the operator offers.
    pub technologies: Property<Option<Vec<AccessTechnology>>>,

    /// Extra operator information.
    pub additional_information: Property<Option<String>>,

    events: EventHub<NetworkOperatorEvent>,
    subscription: Subscription,
}

impl NetworkOperator {
    /// Build a mirror from a listing entry. Must be called within a Tokio
    /// runtime; the subscription is established in the background.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::MissingProperty` or `OfonoError::MalformedProperty`
    /// if `Name` or `Status` is absent or undecodable.
    pub fn from_known_data(
        path: &str,
        properties: &PropertyMap,
        bus: &Bus,
    ) -> Result<Arc<Self>, OfonoError> {
        let operator = Self::build(path, properties, bus)?;
        MirrorMonitor::spawn(&operator, bus);

        Ok(operator)
    }

    /// Fetch the operator's properties and build a subscribed mirror.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the fetch or the subscription
    /// fails, and the construction errors of
    /// [`NetworkOperator::from_known_data`].
    #[instrument(skip(bus), err)]
    pub async fn from_path(path: &str, bus: &Bus) -> Result<Arc<Self>, OfonoError> {
        let properties = bus.get_properties(path, Interface::NetworkOperator).await?;
        let operator = Self::build(path, &properties, bus)?;
        MirrorMonitor::start(&operator, bus).await?;

        Ok(operator)
    }

    pub(crate) fn build(
        path: &str,
        properties: &PropertyMap,
        bus: &Bus,
    ) -> Result<Arc<Self>, OfonoError> {
        let snapshot = NetworkOperatorSnapshot::fold(decode_properties(path, properties)?);

        Ok(Arc::new(Self {
            path: path.to_string(),
            bus: bus.clone(),
            name: Property::new(required(snapshot.name, path, "Name")?),
            status: Property::new(required(snapshot.status, path, "Status")?),
            mobile_country_code: Property::new(snapshot.mobile_country_code),
            mobile_network_code: Property::new(snapshot.mobile_network_code),
            technologies: Property::new(snapshot.technologies),
            additional_information: Property::new(snapshot.additional_information),
            events: EventHub::new(bus.config().event_capacity),
            subscription: Subscription::default(),
        }))
    }

    /// Object path of the operator.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Subscribe to change and diagnostic events.
    pub fn events(&self) -> broadcast::Receiver<NetworkOperatorEvent> {
        self.events.subscribe()
    }

    /// Event hub of this mirror, for stream-based consumers.
    pub fn event_hub(&self) -> &EventHub<NetworkOperatorEvent> {
        &self.events
    }

    /// State of the change subscription. Snapshot fields only follow the
    /// remote object while it is [`SubscriptionState::Live`].
    pub fn subscription_state(&self) -> &Property<SubscriptionState> {
        self.subscription.state()
    }

    /// Manually register with this operator.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if registration is refused.
    pub async fn register(&self) -> Result<(), OfonoError> {
        self.bus.invoke(&self.path, Action::RegisterOperator).await?;
        Ok(())
    }

    fn apply(&self, property: NetworkOperatorProperty) {
        use NetworkOperatorProperty as P;

        match property {
            P::Name(v) => self.name.set(v),
            P::Status(v) => self.status.set(v),
            P::MobileCountryCode(v) => self.mobile_country_code.set(Some(v)),
            P::MobileNetworkCode(v) => self.mobile_network_code.set(Some(v)),
            P::Technologies(v) => self.technologies.set(Some(v)),
            P::AdditionalInformation(v) => self.additional_information.set(Some(v)),
        }
    }
}

impl Mirror for NetworkOperator {
    fn path(&self) -> &str {
        &self.path
    }

    fn interface(&self) -> Interface {
        Interface::NetworkOperator
    }

    fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    fn handle_signal(&self, signal: Signal) {
        match signal {
            Signal::PropertyChanged { name, value } => {
                match decode_change::<NetworkOperatorProperty>(&self.path, &name, &value) {
                    Ok(property) => {
                        self.apply(property.clone());
                        self.events.emit(NetworkOperatorEvent::Changed(property));
                    }
                    Err(diagnostic) => self.report(diagnostic),
                }
            }
            other => self.unknown_signal(&other),
        }
    }

    fn report(&self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.events.emit(NetworkOperatorEvent::Diagnostic(diagnostic));
    }
}
