use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::instrument;

use crate::services::{
    common::{EventHub, Property},
    ofono::{
        Action, Bus, Diagnostic, Interface, OfonoError, PropertyMap, Signal,
        core::{
            Mirror, MirrorMonitor, Subscription, SubscriptionState, decode_change,
            decode_properties, required,
        },
        wire,
    },
};

mod properties;

pub use properties::HandsfreeProperty;
use properties::HandsfreeSnapshot;

/// Event published by a [`Handsfree`] mirror.
#[derive(Debug, Clone)]
pub enum HandsfreeEvent {
    /// A property change notification was applied.
    Changed(HandsfreeProperty),
    /// Something was ignored; see [`Diagnostic`].
    Diagnostic(Diagnostic),
}

/// Live mirror of the Bluetooth Hands-Free profile of an `hfp` modem.
#[derive(Debug)]
pub struct Handsfree {
    path: String,
    bus: Bus,

    /// Features supported by the audio gateway.
    pub features: Property<Vec<String>>,

    /// Whether the gateway rings in-band.
    pub inband_ringing: Property<bool>,

    /// Whether voice recognition is active.
    pub voice_recognition: Property<bool>,

    /// Whether echo canceling and noise reduction is on.
    pub echo_canceling_noise_reduction: Property<bool>,

    /// Battery level of the gateway, 0 to 5.
    pub battery_charge_level: Property<Option<u8>>,

    events: EventHub<HandsfreeEvent>,
    subscription: Subscription,
}

impl Handsfree {
    /// Build a mirror from an already known property map. Must be called
    /// within a Tokio runtime.
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
        let handsfree = Self::build(path, properties, bus)?;
        MirrorMonitor::spawn(&handsfree, bus);

        Ok(handsfree)
    }

    /// Fetch the handsfree properties of the modem at `path` and build a
    /// subscribed mirror.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the fetch or the subscription
    /// fails, and the construction errors of [`Handsfree::from_known_data`].
    #[instrument(skip(bus), err)]
    pub async fn from_path(path: &str, bus: &Bus) -> Result<Arc<Self>, OfonoError> {
        let properties = bus.get_properties(path, Interface::Handsfree).await?;
        let handsfree = Self::build(path, &properties, bus)?;
        MirrorMonitor::start(&handsfree, bus).await?;

        Ok(handsfree)
    }

    fn build(path: &str, properties: &PropertyMap, bus: &Bus) -> Result<Arc<Self>, OfonoError> {
        let snapshot = HandsfreeSnapshot::fold(decode_properties(path, properties)?);

        Ok(Arc::new(Self {
            path: path.to_string(),
            bus: bus.clone(),
            features: Property::new(required(snapshot.features, path, "Features")?),
            inband_ringing: Property::new(required(
                snapshot.inband_ringing,
                path,
                "InbandRinging",
            )?),
            voice_recognition: Property::new(required(
                snapshot.voice_recognition,
                path,
                "VoiceRecognition",
            )?),
            echo_canceling_noise_reduction: Property::new(required(
                snapshot.echo_canceling_noise_reduction,
                path,
                "EchoCancelingNoiseReduction",
            )?),
            battery_charge_level: Property::new(snapshot.battery_charge_level),
            events: EventHub::new(bus.config().event_capacity),
            subscription: Subscription::default(),
        }))
    }

    /// Object path of the owning modem.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Subscribe to change and diagnostic events.
    pub fn events(&self) -> broadcast::Receiver<HandsfreeEvent> {
        self.events.subscribe()
    }

    /// Event hub of this mirror, for stream-based consumers.
    pub fn event_hub(&self) -> &EventHub<HandsfreeEvent> {
        &self.events
    }

    /// State of the change subscription. Snapshot fields only follow the
    /// remote object while it is [`SubscriptionState::Live`].
    pub fn subscription_state(&self) -> &Property<SubscriptionState> {
        self.subscription.state()
    }

    /// Enable or disable voice recognition on the gateway.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the write is rejected.
    pub async fn set_voice_recognition(&self, enabled: bool) -> Result<(), OfonoError> {
        self.write(HandsfreeProperty::VoiceRecognition(enabled)).await
    }

    /// Enable or disable echo canceling and noise reduction on the gateway.
    ///
    /// Only disabling is accepted by most gateways.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the write is rejected.
    pub async fn set_echo_canceling_noise_reduction(
        &self,
        enabled: bool,
    ) -> Result<(), OfonoError> {
        self.write(HandsfreeProperty::EchoCancelingNoiseReduction(enabled))
            .await
    }

    /// Ask the gateway for a number to attach to a voice tag.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the request fails.
    pub async fn request_phone_number(&self) -> Result<String, OfonoError> {
        self.bus
            .invoke(&self.path, Action::RequestPhoneNumber)
            .await?
            .into_text("RequestPhoneNumber")
    }

    async fn write(&self, property: HandsfreeProperty) -> Result<(), OfonoError> {
        let value = wire::encode(&property.to_wire())?;
        let name = property.name();

        self.apply(property);
        self.bus
            .set_property(&self.path, Interface::Handsfree, name, value)
            .await
    }

    fn apply(&self, property: HandsfreeProperty) {
        match property {
            HandsfreeProperty::Features(v) => self.features.set(v),
            HandsfreeProperty::InbandRinging(v) => self.inband_ringing.set(v),
            HandsfreeProperty::VoiceRecognition(v) => self.voice_recognition.set(v),
            HandsfreeProperty::EchoCancelingNoiseReduction(v) => {
                self.echo_canceling_noise_reduction.set(v);
            }
            HandsfreeProperty::BatteryChargeLevel(v) => self.battery_charge_level.set(Some(v)),
        }
    }
}

impl Mirror for Handsfree {
    fn path(&self) -> &str {
        &self.path
    }

    fn interface(&self) -> Interface {
        Interface::Handsfree
    }

    fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    fn handle_signal(&self, signal: Signal) {
        match signal {
            Signal::PropertyChanged { name, value } => {
                match decode_change::<HandsfreeProperty>(&self.path, &name, &value) {
                    Ok(property) => {
                        self.apply(property.clone());
                        self.events.emit(HandsfreeEvent::Changed(property));
                    }
                    Err(diagnostic) => self.report(diagnostic),
                }
            }
            other => self.unknown_signal(&other),
        }
    }

    fn report(&self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.events.emit(HandsfreeEvent::Diagnostic(diagnostic));
    }
}
