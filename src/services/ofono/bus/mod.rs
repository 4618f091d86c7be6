//! The RPC substrate seam.
//!
//! Mirrors never talk to D-Bus directly. They go through a [`Bus`] handle,
//! which wraps a [`Transport`] implementation and the crate configuration.
//! [`DbusTransport`] is the production transport; tests supply their own.

mod dbus;

use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;
use futures::stream::BoxStream;
use tracing::instrument;
use zbus::zvariant::OwnedValue;

pub use dbus::DbusTransport;

use crate::config::OfonoConfig;

use super::{Interface, OfonoError, types::HideCallerId};

/// Raw property map as returned by `GetProperties` and the listing calls.
pub type PropertyMap = HashMap<String, OwnedValue>;

/// `(path, properties)` pairs returned by the listing calls.
pub type ObjectList = Vec<(String, PropertyMap)>;

/// Stream of signals for one subscribed object and interface.
pub type SignalStream = BoxStream<'static, Signal>;

/// A signal received for a subscribed object.
#[derive(Debug)]
pub enum Signal {
    /// `PropertyChanged(s name, v value)`
    PropertyChanged {
        /// Property name.
        name: String,
        /// New raw value.
        value: OwnedValue,
    },
    /// `ModemAdded(o, a{sv})` on the manager
    ModemAdded {
        /// Path of the new modem.
        path: String,
        /// Its full property map.
        properties: PropertyMap,
    },
    /// `ModemRemoved(o)` on the manager
    ModemRemoved {
        /// Path of the removed modem.
        path: String,
    },
    /// `CallAdded(o, a{sv})` on the call manager
    CallAdded {
        /// Path of the new call.
        path: String,
        /// Its full property map.
        properties: PropertyMap,
    },
    /// `CallRemoved(o)` on the call manager
    CallRemoved {
        /// Path of the released call.
        path: String,
    },
    /// `DisconnectReason(s)` on a voice call
    DisconnectReason(String),
    /// `BarringActive(s)` on the call manager
    BarringActive(String),
    /// `Forwarded(s)` on the call manager
    Forwarded(String),
    /// Any signal the transport does not recognise.
    Other {
        /// Signal member name.
        member: String,
    },
}

impl Signal {
    /// D-Bus member name of this signal.
    pub fn member(&self) -> &str {
        match self {
            Self::PropertyChanged { .. } => "PropertyChanged",
            Self::ModemAdded { .. } => "ModemAdded",
            Self::ModemRemoved { .. } => "ModemRemoved",
            Self::CallAdded { .. } => "CallAdded",
            Self::CallRemoved { .. } => "CallRemoved",
            Self::DisconnectReason(_) => "DisconnectReason",
            Self::BarringActive(_) => "BarringActive",
            Self::Forwarded(_) => "Forwarded",
            Self::Other { member } => member,
        }
    }
}

/// Calls returning a list of child objects with their properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listing {
    /// `org.ofono.Manager.GetModems`
    Modems,
    /// `org.ofono.VoiceCallManager.GetCalls`
    Calls,
    /// `org.ofono.NetworkRegistration.GetOperators`
    Operators,
    /// `org.ofono.NetworkRegistration.Scan`
    Scan,
}

impl Listing {
    /// Interface the listing belongs to.
    pub fn interface(self) -> Interface {
        match self {
            Self::Modems => Interface::Manager,
            Self::Calls => Interface::VoiceCallManager,
            Self::Operators | Self::Scan => Interface::NetworkRegistration,
        }
    }

    /// Remote method name.
    pub fn method(self) -> &'static str {
        match self {
            Self::Modems => "GetModems",
            Self::Calls => "GetCalls",
            Self::Operators => "GetOperators",
            Self::Scan => "Scan",
        }
    }
}

/// Action methods that have no effect on a mirror's snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `VoiceCallManager.Dial(s number, s hide_callerid) -> o`
    Dial {
        /// Number to call.
        number: String,
        /// Caller id override.
        hide_caller_id: HideCallerId,
    },
    /// `VoiceCallManager.DialLast() -> o`
    DialLast,
    /// `VoiceCallManager.Transfer()`
    Transfer,
    /// `VoiceCallManager.SwapCalls()`
    SwapCalls,
    /// `VoiceCallManager.ReleaseAndAnswer()`
    ReleaseAndAnswer,
    /// `VoiceCallManager.ReleaseAndSwap()`
    ReleaseAndSwap,
    /// `VoiceCallManager.HoldAndAnswer()`
    HoldAndAnswer,
    /// `VoiceCallManager.HangupAll()`
    HangupAll,
    /// `VoiceCallManager.PrivateChat(o call) -> ao`
    PrivateChat {
        /// Path of the multiparty member to split off.
        call: String,
    },
    /// `VoiceCallManager.CreateMultiparty() -> ao`
    CreateMultiparty,
    /// `VoiceCallManager.HangupMultiparty()`
    HangupMultiparty,
    /// `VoiceCallManager.SendTones(s tones)`
    SendTones {
        /// DTMF digits.
        tones: String,
    },
    /// `VoiceCall.Answer()`
    Answer,
    /// `VoiceCall.Hangup()`
    Hangup,
    /// `VoiceCall.Deflect(s number)`
    Deflect {
        /// Number to deflect to.
        number: String,
    },
    /// `NetworkRegistration.Register()`
    Register,
    /// `NetworkOperator.Register()`
    RegisterOperator,
    /// `Handsfree.RequestPhoneNumber() -> s`
    RequestPhoneNumber,
}

impl Action {
    /// Interface the action is invoked on.
    pub fn interface(&self) -> Interface {
        match self {
            Self::Dial { .. }
            | Self::DialLast
            | Self::Transfer
            | Self::SwapCalls
            | Self::ReleaseAndAnswer
            | Self::ReleaseAndSwap
            | Self::HoldAndAnswer
            | Self::HangupAll
            | Self::PrivateChat { .. }
            | Self::CreateMultiparty
            | Self::HangupMultiparty
            | Self::SendTones { .. } => Interface::VoiceCallManager,
            Self::Answer | Self::Hangup | Self::Deflect { .. } => Interface::VoiceCall,
            Self::Register => Interface::NetworkRegistration,
            Self::RegisterOperator => Interface::NetworkOperator,
            Self::RequestPhoneNumber => Interface::Handsfree,
        }
    }

    /// Remote method name.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Dial { .. } => "Dial",
            Self::DialLast => "DialLast",
            Self::Transfer => "Transfer",
            Self::SwapCalls => "SwapCalls",
            Self::ReleaseAndAnswer => "ReleaseAndAnswer",
            Self::ReleaseAndSwap => "ReleaseAndSwap",
            Self::HoldAndAnswer => "HoldAndAnswer",
            Self::HangupAll => "HangupAll",
            Self::PrivateChat { .. } => "PrivateChat",
            Self::CreateMultiparty => "CreateMultiparty",
            Self::HangupMultiparty => "HangupMultiparty",
            Self::SendTones { .. } => "SendTones",
            Self::Answer => "Answer",
            Self::Hangup => "Hangup",
            Self::Deflect { .. } => "Deflect",
            Self::Register | Self::RegisterOperator => "Register",
            Self::RequestPhoneNumber => "RequestPhoneNumber",
        }
    }
}

/// Reply of an action call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// No return value
    Empty,
    /// A single object path
    Path(String),
    /// A list of object paths
    Paths(Vec<String>),
    /// A string
    Text(String),
}

impl Reply {
    pub(crate) fn into_path(self, operation: &str) -> Result<String, OfonoError> {
        match self {
            Self::Path(path) => Ok(path),
            _ => Err(unexpected(operation, "an object path")),
        }
    }

    pub(crate) fn into_paths(self, operation: &str) -> Result<Vec<String>, OfonoError> {
        match self {
            Self::Paths(paths) => Ok(paths),
            _ => Err(unexpected(operation, "a list of object paths")),
        }
    }

    pub(crate) fn into_text(self, operation: &str) -> Result<String, OfonoError> {
        match self {
            Self::Text(text) => Ok(text),
            _ => Err(unexpected(operation, "a string")),
        }
    }
}

fn unexpected(operation: &str, expected: &'static str) -> OfonoError {
    OfonoError::UnexpectedReply {
        operation: operation.to_string(),
        expected,
    }
}

/// Request/reply and signal subscription primitives the mirrors are built on.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// `GetProperties()` on `interface` at `path`.
    async fn get_properties(&self, path: &str, interface: Interface) -> zbus::Result<PropertyMap>;

    /// `SetProperty(name, value)` on `interface` at `path`.
    async fn set_property(
        &self,
        path: &str,
        interface: Interface,
        name: &str,
        value: OwnedValue,
    ) -> zbus::Result<()>;

    /// One of the `(path, properties)` listing calls.
    async fn list_objects(&self, path: &str, listing: Listing) -> zbus::Result<ObjectList>;

    /// An action call.
    async fn invoke(&self, path: &str, action: Action) -> zbus::Result<Reply>;

    /// Subscribe to every signal `interface` emits at `path`.
    ///
    /// The subscription is active when this returns; signals are yielded in
    /// emission order. Dropping the stream unsubscribes.
    async fn subscribe(&self, path: &str, interface: Interface) -> zbus::Result<SignalStream>;
}

/// Shared handle to the RPC substrate.
///
/// Cloning is cheap and shares the same transport; every mirror holds one.
#[derive(Clone)]
pub struct Bus {
    transport: Arc<dyn Transport>,
    config: Arc<OfonoConfig>,
}

impl Bus {
    /// Wrap a transport.
    pub fn new(transport: impl Transport, config: OfonoConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
        }
    }

    /// Connect to oFono over D-Bus as described by `config`.
    ///
    /// # Errors
    /// Returns `OfonoError::RemoteFault` if the bus connection fails.
    pub async fn connect(config: OfonoConfig) -> Result<Self, OfonoError> {
        let transport = DbusTransport::connect(&config)
            .await
            .map_err(|err| OfonoError::remote("connect", "/", err))?;

        Ok(Self::new(transport, config))
    }

    /// Configuration this handle was created with.
    pub fn config(&self) -> &OfonoConfig {
        &self.config
    }

    #[instrument(skip(self), err)]
    pub(crate) async fn get_properties(
        &self,
        path: &str,
        interface: Interface,
    ) -> Result<PropertyMap, OfonoError> {
        self.transport
            .get_properties(path, interface)
            .await
            .map_err(|err| OfonoError::remote("GetProperties", path, err))
    }

    #[instrument(skip(self, value), err)]
    pub(crate) async fn set_property(
        &self,
        path: &str,
        interface: Interface,
        name: &str,
        value: OwnedValue,
    ) -> Result<(), OfonoError> {
        self.transport
            .set_property(path, interface, name, value)
            .await
            .map_err(|err| OfonoError::remote("SetProperty", path, err))
    }

    #[instrument(skip(self), err)]
    pub(crate) async fn list_objects(
        &self,
        path: &str,
        listing: Listing,
    ) -> Result<ObjectList, OfonoError> {
        self.transport
            .list_objects(path, listing)
            .await
            .map_err(|err| OfonoError::remote(listing.method(), path, err))
    }

    #[instrument(skip(self), err)]
    pub(crate) async fn invoke(&self, path: &str, action: Action) -> Result<Reply, OfonoError> {
        let method = action.method();
        self.transport
            .invoke(path, action)
            .await
            .map_err(|err| OfonoError::remote(method, path, err))
    }

    #[instrument(skip(self), err)]
    pub(crate) async fn subscribe(
        &self,
        path: &str,
        interface: Interface,
    ) -> Result<SignalStream, OfonoError> {
        self.transport
            .subscribe(path, interface)
            .await
            .map_err(|err| OfonoError::remote("Subscribe", path, err))
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus").field("config", &self.config).finish()
    }
}
