use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::instrument;

use crate::services::{
    common::{EventHub, Property},
    ofono::{
        Bus, CapabilitySet, Diagnostic, Interface, ModemType, OfonoError, PropertyMap, Signal,
        core::{
            Mirror, MirrorMonitor, Subscription, SubscriptionState, decode_change,
            decode_properties, handsfree::Handsfree, network_registration::NetworkRegistration,
            required, voice_call_manager::VoiceCallManager,
        },
        require_capability,
        wire,
    },
};

mod properties;

pub use properties::ModemProperty;
use properties::ModemSnapshot;

/// Event published by a [`Modem`] mirror.
#[derive(Debug, Clone)]
pub enum ModemEvent {
    /// A property change notification was applied.
    Changed(ModemProperty),
    /// Something was ignored; see [`Diagnostic`].
    Diagnostic(Diagnostic),
}

/// Live mirror of an `org.ofono.Modem` object.
///
/// The snapshot fields are reactive: read them with `get()` or follow them
/// with `watch()`. The modem's `Interfaces` list doubles as its capability
/// set and decides which dependent mirrors can be built.
#[derive(Debug)]
pub struct Modem {
    path: String,
    bus: Bus,

    /// Whether the modem is powered.
    pub powered: Property<bool>,

    /// Whether the radio is online. Requires `powered`.
    pub online: Property<bool>,

    /// Whether the modem is locked down, refusing power-up from other clients.
    pub lockdown: Property<bool>,

    /// Interfaces the modem currently provides.
    pub interfaces: Property<Vec<String>>,

    /// Kind of device backing this modem.
    pub modem_type: Property<ModemType>,

    /// Whether an emergency call is in progress.
    pub emergency: Property<Option<bool>>,

    /// Friendly name, usually only set for Bluetooth devices.
    pub name: Property<Option<String>>,

    /// Manufacturer string.
    pub manufacturer: Property<Option<String>>,

    /// Model string.
    pub model: Property<Option<String>>,

    /// Firmware revision.
    pub revision: Property<Option<String>>,

    /// IMEI or other serial.
    pub serial: Property<Option<String>>,

    /// Sysfs path of the underlying device.
    pub system_path: Property<Option<String>>,

    /// Feature tags such as `net`, `sim` or `gprs`.
    pub features: Property<Option<Vec<String>>>,

    events: EventHub<ModemEvent>,
    subscription: Subscription,
}

impl PartialEq for Modem {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Modem {
    /// Build a mirror from a property map obtained through a listing.
    ///
    /// Issues no awaited RPC. The change subscription is established in the
    /// background; if it fails a [`Diagnostic::SubscriptionFailed`] event is
    /// published. Must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::MissingProperty` or `OfonoError::MalformedProperty`
    /// if a mandatory property is absent or undecodable.
    pub fn from_known_data(
        path: &str,
        properties: &PropertyMap,
        bus: &Bus,
    ) -> Result<Arc<Self>, OfonoError> {
        let modem = Self::build(path, properties, bus)?;
        MirrorMonitor::spawn(&modem, bus);

        Ok(modem)
    }

    /// Fetch the modem's properties and build a subscribed mirror.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the fetch or the subscription
    /// fails, and the construction errors of [`Modem::from_known_data`].
    #[instrument(skip(bus), err)]
    pub async fn from_path(path: &str, bus: &Bus) -> Result<Arc<Self>, OfonoError> {
        let properties = bus.get_properties(path, Interface::Modem).await?;
        let modem = Self::build(path, &properties, bus)?;
        MirrorMonitor::start(&modem, bus).await?;

        Ok(modem)
    }

    pub(crate) fn build(
        path: &str,
        properties: &PropertyMap,
        bus: &Bus,
    ) -> Result<Arc<Self>, OfonoError> {
        let snapshot = ModemSnapshot::fold(decode_properties(path, properties)?);

        Ok(Arc::new(Self {
            path: path.to_string(),
            bus: bus.clone(),
            powered: Property::new(required(snapshot.powered, path, "Powered")?),
            online: Property::new(required(snapshot.online, path, "Online")?),
            lockdown: Property::new(required(snapshot.lockdown, path, "Lockdown")?),
            interfaces: Property::new(required(snapshot.interfaces, path, "Interfaces")?),
            modem_type: Property::new(required(snapshot.modem_type, path, "Type")?),
            emergency: Property::new(snapshot.emergency),
            name: Property::new(snapshot.name),
            manufacturer: Property::new(snapshot.manufacturer),
            model: Property::new(snapshot.model),
            revision: Property::new(snapshot.revision),
            serial: Property::new(snapshot.serial),
            system_path: Property::new(snapshot.system_path),
            features: Property::new(snapshot.features),
            events: EventHub::new(bus.config().event_capacity),
            subscription: Subscription::default(),
        }))
    }

    /// Object path of the modem.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Subscribe to change and diagnostic events.
    pub fn events(&self) -> broadcast::Receiver<ModemEvent> {
        self.events.subscribe()
    }

    /// State of the change subscription. Snapshot fields only follow the
    /// remote object while it is [`SubscriptionState::Live`].
    pub fn subscription_state(&self) -> &Property<SubscriptionState> {
        self.subscription.state()
    }

    /// Event hub of this mirror, for stream-based consumers.
    pub fn event_hub(&self) -> &EventHub<ModemEvent> {
        &self.events
    }

    /// Capability set as currently advertised by the modem.
    pub fn capabilities(&self) -> CapabilitySet {
        self.interfaces.get().into_iter().collect()
    }

    /// Power the modem on or off.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the write is rejected.
    pub async fn set_powered(&self, powered: bool) -> Result<(), OfonoError> {
        self.write(ModemProperty::Powered(powered)).await
    }

    /// Bring the radio online or offline.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the write is rejected.
    pub async fn set_online(&self, online: bool) -> Result<(), OfonoError> {
        self.write(ModemProperty::Online(online)).await
    }

    /// Lock the modem down or release it.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the write is rejected.
    pub async fn set_lockdown(&self, lockdown: bool) -> Result<(), OfonoError> {
        self.write(ModemProperty::Lockdown(lockdown)).await
    }

    /// Call manager of this modem.
    ///
    /// Issues no RPC: the manager carries no snapshot of its own and its
    /// subscription is set up in the background.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::MissingCapability` if the modem does not
    /// currently advertise `org.ofono.VoiceCallManager`.
    pub fn voice_call_manager(&self) -> Result<Arc<VoiceCallManager>, OfonoError> {
        require_capability(&self.capabilities(), &self.path, Interface::VoiceCallManager)?;
        Ok(VoiceCallManager::new(&self.path, &self.bus))
    }

    /// Network registration mirror of this modem.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::MissingCapability` before any RPC if the modem
    /// does not advertise `org.ofono.NetworkRegistration`, and the errors of
    /// [`NetworkRegistration::from_path`] otherwise.
    pub async fn network_registration(&self) -> Result<Arc<NetworkRegistration>, OfonoError> {
        require_capability(
            &self.capabilities(),
            &self.path,
            Interface::NetworkRegistration,
        )?;
        NetworkRegistration::from_path(&self.path, &self.bus).await
    }

    /// Handsfree mirror of this modem.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::MissingCapability` before any RPC if the modem
    /// does not advertise `org.ofono.Handsfree`, and the errors of
    /// [`Handsfree::from_path`] otherwise.
    pub async fn handsfree(&self) -> Result<Arc<Handsfree>, OfonoError> {
        require_capability(&self.capabilities(), &self.path, Interface::Handsfree)?;
        Handsfree::from_path(&self.path, &self.bus).await
    }

    async fn write(&self, property: ModemProperty) -> Result<(), OfonoError> {
        let value = wire::encode(&property.to_wire())?;
        let name = property.name();

        self.apply(property);
        self.bus
            .set_property(&self.path, Interface::Modem, name, value)
            .await
    }

    fn apply(&self, property: ModemProperty) {
        match property {
            ModemProperty::Powered(v) => self.powered.set(v),
            ModemProperty::Online(v) => self.online.set(v),
            ModemProperty::Lockdown(v) => self.lockdown.set(v),
            ModemProperty::Emergency(v) => self.emergency.set(Some(v)),
            ModemProperty::Name(v) => self.name.set(Some(v)),
            ModemProperty::Manufacturer(v) => self.manufacturer.set(Some(v)),
            ModemProperty::Model(v) => self.model.set(Some(v)),
            ModemProperty::Revision(v) => self.revision.set(Some(v)),
            ModemProperty::Serial(v) => self.serial.set(Some(v)),
            ModemProperty::SystemPath(v) => self.system_path.set(Some(v)),
            ModemProperty::Interfaces(v) => self.interfaces.set(v),
            ModemProperty::Features(v) => self.features.set(Some(v)),
            ModemProperty::Type(v) => self.modem_type.set(v),
        }
    }
}

impl Mirror for Modem {
    fn path(&self) -> &str {
        &self.path
    }

    fn interface(&self) -> Interface {
        Interface::Modem
    }

    fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    fn handle_signal(&self, signal: Signal) {
        match signal {
            Signal::PropertyChanged { name, value } => {
                match decode_change::<ModemProperty>(&self.path, &name, &value) {
                    Ok(property) => {
                        self.apply(property.clone());
                        self.events.emit(ModemEvent::Changed(property));
                    }
                    Err(diagnostic) => self.report(diagnostic),
                }
            }
            other => self.unknown_signal(&other),
        }
    }

    fn report(&self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.events.emit(ModemEvent::Diagnostic(diagnostic));
    }
}
