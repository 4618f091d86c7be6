use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, instrument};
use zbus::zvariant::{ObjectPath, Value};

use crate::services::{
    common::{EventHub, Property},
    ofono::{
        Action, Bus, Diagnostic, HideCallerId, Interface, Listing, OfonoError, PropertyMap,
        Signal,
        core::{
            Mirror, MirrorMonitor, PropertySet, Subscription, SubscriptionState, decode_change,
            decode_properties, mirror_listing, voice_call::VoiceCall,
        },
        wire::{self, DecodeError},
    },
};

/// A decoded `org.ofono.VoiceCallManager` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallManagerProperty {
    /// Numbers the network treats as emergency numbers.
    EmergencyNumbers(Vec<String>),
}

impl PropertySet for CallManagerProperty {
    const INTERFACE: Interface = Interface::VoiceCallManager;
    const MANDATORY: &'static [&'static str] = &[];

    fn decode(name: &str, value: &Value<'_>) -> Result<Option<Self>, DecodeError> {
        match name {
            "EmergencyNumbers" => Ok(Some(Self::EmergencyNumbers(wire::decode_strings(value)?))),
            _ => Ok(None),
        }
    }
}

/// Event published by a [`VoiceCallManager`].
#[derive(Debug, Clone)]
pub enum CallManagerEvent {
    /// A property change notification was applied.
    Changed(CallManagerProperty),
    /// A call appeared. The mirror is live; keeping it is up to the receiver.
    CallAdded(Arc<VoiceCall>),
    /// The call at this path was removed.
    CallRemoved(String),
    /// Call barring is active for `incoming` or `outgoing` calls.
    BarringActive(String),
    /// A call was forwarded, `incoming` or `outgoing`.
    Forwarded(String),
    /// Something was ignored; see [`Diagnostic`].
    Diagnostic(Diagnostic),
}

/// Router for the voice calls of one modem.
///
/// Holds no registry of calls: each `CallAdded` notification is turned into
/// a fresh [`VoiceCall`] mirror handed out through a [`CallManagerEvent`], and
/// `CallRemoved` only reports the path.
#[derive(Debug)]
pub struct VoiceCallManager {
    path: String,
    bus: Bus,

    /// Emergency numbers, `None` until reported by the modem.
    pub emergency_numbers: Property<Option<Vec<String>>>,

    events: EventHub<CallManagerEvent>,
    subscription: Subscription,
}

impl VoiceCallManager {
    /// Create the manager for the modem at `path` without any RPC.
    ///
    /// The subscription to call and property notifications is established in
    /// the background. Must be called within a Tokio runtime.
    pub fn new(path: &str, bus: &Bus) -> Arc<Self> {
        let manager = Self::build(path, bus);
        MirrorMonitor::spawn(&manager, bus);

        manager
    }

    /// Fetch the manager's properties and subscribe before returning.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the fetch or the subscription
    /// fails.
    #[instrument(skip(bus), err)]
    pub async fn from_path(path: &str, bus: &Bus) -> Result<Arc<Self>, OfonoError> {
        let properties = bus.get_properties(path, Interface::VoiceCallManager).await?;
        let manager = Self::build(path, bus);
        for property in decode_properties::<CallManagerProperty>(path, &properties)? {
            manager.apply(property);
        }
        MirrorMonitor::start(&manager, bus).await?;

        Ok(manager)
    }

    fn build(path: &str, bus: &Bus) -> Arc<Self> {
        Arc::new(Self {
            path: path.to_string(),
            bus: bus.clone(),
            emergency_numbers: Property::new(None),
            events: EventHub::new(bus.config().event_capacity),
            subscription: Subscription::default(),
        })
    }

    /// Object path of the owning modem.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Subscribe to call, property and diagnostic events.
    pub fn events(&self) -> broadcast::Receiver<CallManagerEvent> {
        self.events.subscribe()
    }

    /// State of the change subscription. Snapshot fields only follow the
    /// remote object while it is [`SubscriptionState::Live`].
    pub fn subscription_state(&self) -> &Property<SubscriptionState> {
        self.subscription.state()
    }

    /// Event hub of this manager, for stream-based consumers.
    pub fn event_hub(&self) -> &EventHub<CallManagerEvent> {
        &self.events
    }

    /// Mirrors of every current call, each subscribed before it is returned.
    ///
    /// Entries that cannot be mirrored are skipped and logged.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if `GetCalls` or a call's
    /// subscription fails.
    pub async fn get_calls(&self) -> Result<Vec<Arc<VoiceCall>>, OfonoError> {
        let calls = self.bus.list_objects(&self.path, Listing::Calls).await?;

        mirror_listing(&self.path, calls, &self.bus, VoiceCall::build).await
    }

    /// Place a call and return the new call's path.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the call cannot be placed.
    pub async fn dial(
        &self,
        number: &str,
        hide_caller_id: HideCallerId,
    ) -> Result<String, OfonoError> {
        let action = Action::Dial {
            number: number.to_string(),
            hide_caller_id,
        };
        self.bus.invoke(&self.path, action).await?.into_path("Dial")
    }

    /// Redial the last number and return the new call's path.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the call cannot be placed.
    pub async fn dial_last(&self) -> Result<String, OfonoError> {
        self.bus
            .invoke(&self.path, Action::DialLast)
            .await?
            .into_path("DialLast")
    }

    /// Join the active and held calls and disconnect from both.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the network rejects the transfer.
    pub async fn transfer(&self) -> Result<(), OfonoError> {
        self.run(Action::Transfer).await
    }

    /// Swap the active and held calls.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the calls cannot be swapped.
    pub async fn swap_calls(&self) -> Result<(), OfonoError> {
        self.run(Action::SwapCalls).await
    }

    /// Release the active calls and answer the waiting one.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the operation fails.
    pub async fn release_and_answer(&self) -> Result<(), OfonoError> {
        self.run(Action::ReleaseAndAnswer).await
    }

    /// Release the active calls and activate the held one.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the operation fails.
    pub async fn release_and_swap(&self) -> Result<(), OfonoError> {
        self.run(Action::ReleaseAndSwap).await
    }

    /// Hold the active calls and answer the waiting one.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the operation fails.
    pub async fn hold_and_answer(&self) -> Result<(), OfonoError> {
        self.run(Action::HoldAndAnswer).await
    }

    /// Release every call.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the operation fails.
    pub async fn hangup_all(&self) -> Result<(), OfonoError> {
        self.run(Action::HangupAll).await
    }

    /// Split `call` off a multiparty call. Returns the paths of the calls
    /// that remain in the multiparty call.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::InvalidPath` if `call` is not an object path and
    /// `OfonoError::RemoteFault` if the operation fails.
    pub async fn private_chat(&self, call: &str) -> Result<Vec<String>, OfonoError> {
        ObjectPath::try_from(call).map_err(|_| OfonoError::InvalidPath(call.to_string()))?;

        let action = Action::PrivateChat {
            call: call.to_string(),
        };
        self.bus
            .invoke(&self.path, action)
            .await?
            .into_paths("PrivateChat")
    }

    /// Merge the active and held calls. Returns the multiparty members.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the operation fails.
    pub async fn create_multiparty(&self) -> Result<Vec<String>, OfonoError> {
        self.bus
            .invoke(&self.path, Action::CreateMultiparty)
            .await?
            .into_paths("CreateMultiparty")
    }

    /// Release every call of the multiparty call.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the operation fails.
    pub async fn hangup_multiparty(&self) -> Result<(), OfonoError> {
        self.run(Action::HangupMultiparty).await
    }

    /// Send DTMF tones over the active call.
    ///
    /// # Errors
    ///
    /// Returns `OfonoError::RemoteFault` if the tones are rejected.
    pub async fn send_tones(&self, tones: &str) -> Result<(), OfonoError> {
        self.run(Action::SendTones {
            tones: tones.to_string(),
        })
        .await
    }

    async fn run(&self, action: Action) -> Result<(), OfonoError> {
        self.bus.invoke(&self.path, action).await?;
        Ok(())
    }

    fn apply(&self, property: CallManagerProperty) {
        match property {
            CallManagerProperty::EmergencyNumbers(numbers) => {
                self.emergency_numbers.set(Some(numbers));
            }
        }
    }

    fn call_added(&self, path: String, properties: &PropertyMap) {
        match VoiceCall::from_known_data(&path, properties, &self.bus) {
            Ok(call) => {
                debug!(manager = %self.path, call = %path, "call added");
                self.events.emit(CallManagerEvent::CallAdded(call));
            }
            Err(err) => self.report(Diagnostic::ChildRejected {
                path: self.path.clone(),
                child: path,
                reason: err.to_string(),
            }),
        }
    }
}

impl Mirror for VoiceCallManager {
    fn path(&self) -> &str {
        &self.path
    }

    fn interface(&self) -> Interface {
        Interface::VoiceCallManager
    }

    fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    fn handle_signal(&self, signal: Signal) {
        match signal {
            Signal::PropertyChanged { name, value } => {
                match decode_change::<CallManagerProperty>(&self.path, &name, &value) {
                    Ok(property) => {
                        self.apply(property.clone());
                        self.events.emit(CallManagerEvent::Changed(property));
                    }
                    Err(diagnostic) => self.report(diagnostic),
                }
            }
            Signal::CallAdded { path, properties } => self.call_added(path, &properties),
            Signal::CallRemoved { path } => {
                debug!(manager = %self.path, call = %path, "call removed");
                self.events.emit(CallManagerEvent::CallRemoved(path));
            }
            Signal::BarringActive(kind) => self.events.emit(CallManagerEvent::BarringActive(kind)),
            Signal::Forwarded(kind) => self.events.emit(CallManagerEvent::Forwarded(kind)),
            other => self.unknown_signal(&other),
        }
    }

    fn report(&self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.events.emit(CallManagerEvent::Diagnostic(diagnostic));
    }
}
