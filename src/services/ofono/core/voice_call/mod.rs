use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tokio::sync::broadcast;
use tracing::{debug, instrument};

use crate::services::{
    common::{EventHub, Property},
    ofono::{
        Action, Bus, CallState, Diagnostic, DisconnectReason, Interface, OfonoError, PropertyMap,
        Signal, WireEnum,
        core::{
            Mirror, MirrorMonitor, Subscription, SubscriptionState, decode_change,
            decode_properties, required,
        },
        wire::DecodeError,
    },
};

mod properties;

pub use properties::VoiceCallProperty;
use properties::VoiceCallSnapshot;

/// `StartTime` layout used by oFono.
const START_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Event published by a [`VoiceCall`] mirror.
#[derive(Debug, Clone)]
pub enum VoiceCallEvent {
    /// A property change notification was applied.
    Changed(VoiceCallProperty),
    /// The call was released; emitted just before it is removed.
    Disconnected(DisconnectReason),
    /// Something was ignored; see [`Diagnostic`].
    Diagnostic(Diagnostic),
}

/// Live mirror of an `org.ofono.VoiceCall` object.
#[derive(Debug)]
pub struct VoiceCall {
    path: String,
    bus: Bus,

    /// Remote party number, `withheld` when hidden.
    pub line_identification: Property<String>,

    /// Call state.
    pub state: Property<CallState>,

    /// Local line the call came in on.
    pub incoming_line: Property<Option<String>>,

    /// Calling name presentation.
    pub name: Property<Option<String>>,

    /// Whether the call is part of a multiparty call.
    pub multiparty: Property<Option<bool>>,

    /// Time the call became active, in oFono's `%Y-%m-%dT%H:%M:%S%z` layout.
    pub start_time: Property<Option<String>>,

    /// Network supplied information text.
    pub information: Property<Option<String>>,

    /// Network supplied icon identifier.
    pub icon: Property<Option<u8>>,

    /// Whether this is an emergency call.
    pub emergency: Property<Option<bool>>,

    /// Whether the remote party holds the call.
    pub remote_held: Property<Option<bool>>,

    /// Whether the remote party has joined a multiparty call.
    pub remote_multiparty: Property<Option<bool>>,

    events: EventHub<VoiceCallEvent>,
    subscription: Subscription,
}

impl PartialEq for VoiceCall {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl VoiceCall {
    /// Build a mirror from a property map, as delivered by `GetCalls` or
    /// `CallAdded`.
    ///
    /// Issues no awaited RPC; the change subscription is established in the
    /// background. Must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::MissingProperty` or `OfonoError::MalformedProperty`
    /// if `LineIdentification` or `State` is absent or undecodable.
    pub fn from_known_data(
        path: &str,
        properties: &PropertyMap,
        bus: &Bus,
    ) -> Result<Arc<Self>, OfonoError> {
        let call = Self::build(path, properties, bus)?;
        MirrorMonitor::spawn(&call, bus);

        Ok(call)
    }

    /// Fetch the call's properties and build a subscribed mirror.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the fetch or the subscription
    /// fails, and the construction errors of [`VoiceCall::from_known_data`].
    #[instrument(skip(bus), err)]
    pub async fn from_path(path: &str, bus: &Bus) -> Result<Arc<Self>, OfonoError> {
        let properties = bus.get_properties(path, Interface::VoiceCall).await?;
        let call = Self::build(path, &properties, bus)?;
        MirrorMonitor::start(&call, bus).await?;

        Ok(call)
    }

    pub(crate) fn build(
        path: &str,
        properties: &PropertyMap,
        bus: &Bus,
    ) -> Result<Arc<Self>, OfonoError> {
        let snapshot = VoiceCallSnapshot::fold(decode_properties(path, properties)?);

        Ok(Arc::new(Self {
            path: path.to_string(),
            bus: bus.clone(),
            line_identification: Property::new(required(
                snapshot.line_identification,
                path,
                "LineIdentification",
            )?),
            state: Property::new(required(snapshot.state, path, "State")?),
            incoming_line: Property::new(snapshot.incoming_line),
            name: Property::new(snapshot.name),
            multiparty: Property::new(snapshot.multiparty),
            start_time: Property::new(snapshot.start_time),
            information: Property::new(snapshot.information),
            icon: Property::new(snapshot.icon),
            emergency: Property::new(snapshot.emergency),
            remote_held: Property::new(snapshot.remote_held),
            remote_multiparty: Property::new(snapshot.remote_multiparty),
            events: EventHub::new(bus.config().event_capacity),
            subscription: Subscription::default(),
        }))
    }

    /// Object path of the call.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Subscribe to change, disconnect and diagnostic events.
    pub fn events(&self) -> broadcast::Receiver<VoiceCallEvent> {
        self.events.subscribe()
    }

    /// State of the change subscription. Snapshot fields only follow the
    /// remote object while it is [`SubscriptionState::Live`].
    pub fn subscription_state(&self) -> &Property<SubscriptionState> {
        self.subscription.state()
    }

    /// Event hub of this mirror, for stream-based consumers.
    pub fn event_hub(&self) -> &EventHub<VoiceCallEvent> {
        &self.events
    }

    /// `StartTime` parsed as a timestamp.
    ///
    /// Returns `None` while the call has not started, or if the value does
    /// not follow oFono's layout.
    pub fn started_at(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.start_time.get()?;
        match DateTime::parse_from_str(&raw, START_TIME_FORMAT) {
            Ok(time) => Some(time),
            Err(err) => {
                debug!(path = %self.path, start_time = %raw, error = %err, "unparseable StartTime");
                None
            }
        }
    }

    /// Answer an incoming call.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the call cannot be answered.
    pub async fn answer(&self) -> Result<(), OfonoError> {
        self.bus.invoke(&self.path, Action::Answer).await?;
        Ok(())
    }

    /// Release the call.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the call cannot be released.
    pub async fn hangup(&self) -> Result<(), OfonoError> {
        self.bus.invoke(&self.path, Action::Hangup).await?;
        Ok(())
    }

    /// Deflect an incoming or waiting call to another number.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the call cannot be deflected.
    pub async fn deflect(&self, number: &str) -> Result<(), OfonoError> {
        let action = Action::Deflect {
            number: number.to_string(),
        };
        self.bus.invoke(&self.path, action).await?;
        Ok(())
    }

    fn apply(&self, property: VoiceCallProperty) {
        match property {
            VoiceCallProperty::LineIdentification(v) => self.line_identification.set(v),
            VoiceCallProperty::State(v) => self.state.set(v),
            VoiceCallProperty::IncomingLine(v) => self.incoming_line.set(Some(v)),
            VoiceCallProperty::Name(v) => self.name.set(Some(v)),
            VoiceCallProperty::Multiparty(v) => self.multiparty.set(Some(v)),
            VoiceCallProperty::StartTime(v) => self.start_time.set(Some(v)),
            VoiceCallProperty::Information(v) => self.information.set(Some(v)),
            VoiceCallProperty::Icon(v) => self.icon.set(Some(v)),
            VoiceCallProperty::Emergency(v) => self.emergency.set(Some(v)),
            VoiceCallProperty::RemoteHeld(v) => self.remote_held.set(Some(v)),
            VoiceCallProperty::RemoteMultiparty(v) => self.remote_multiparty.set(Some(v)),
        }
    }
}

impl Mirror for VoiceCall {
    fn path(&self) -> &str {
        &self.path
    }

    fn interface(&self) -> Interface {
        Interface::VoiceCall
    }

    fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    fn handle_signal(&self, signal: Signal) {
        match signal {
            Signal::PropertyChanged { name, value } => {
                match decode_change::<VoiceCallProperty>(&self.path, &name, &value) {
                    Ok(property) => {
                        self.apply(property.clone());
                        self.events.emit(VoiceCallEvent::Changed(property));
                    }
                    Err(diagnostic) => self.report(diagnostic),
                }
            }
            Signal::DisconnectReason(reason) => match DisconnectReason::from_wire(&reason) {
                Some(reason) => self.events.emit(VoiceCallEvent::Disconnected(reason)),
                None => self.report(Diagnostic::DecodeAnomaly {
                    path: self.path.clone(),
                    interface: Interface::VoiceCall,
                    property: String::from("DisconnectReason"),
                    error: DecodeError::UnknownEnumMember {
                        domain: DisconnectReason::DOMAIN,
                        value: reason,
                    },
                }),
            },
            other => self.unknown_signal(&other),
        }
    }

    fn report(&self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.events.emit(VoiceCallEvent::Diagnostic(diagnostic));
    }
}
