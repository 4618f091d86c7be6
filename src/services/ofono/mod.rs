/// RPC substrate seam and the D-Bus transport
pub mod bus;
/// Capability gate for dependent entities
pub mod capability;
/// Entity mirrors
pub mod core;
/// Non-fatal observations published by live mirrors
pub mod diagnostics;
/// Modem directory
pub mod discovery;
/// oFono mirror errors
pub mod error;
/// D-Bus proxy definitions
pub mod proxy;
/// oFono enumerations
pub mod types;
/// Wire value codec
pub mod wire;

#[cfg(test)]
mod tests;

pub use bus::{
    Action, Bus, DbusTransport, Listing, ObjectList, PropertyMap, Reply, Signal, SignalStream,
    Transport,
};
pub use capability::{CapabilitySet, Interface, require_capability};
pub use self::core::{
    SubscriptionState,
    handsfree::{Handsfree, HandsfreeEvent, HandsfreeProperty},
    modem::{Modem, ModemEvent, ModemProperty},
    network_operator::{NetworkOperator, NetworkOperatorEvent, NetworkOperatorProperty},
    network_registration::{
        NetworkRegistration, NetworkRegistrationEvent, NetworkRegistrationProperty,
    },
    voice_call::{VoiceCall, VoiceCallEvent, VoiceCallProperty},
    voice_call_manager::{CallManagerEvent, CallManagerProperty, VoiceCallManager},
};
pub use diagnostics::Diagnostic;
pub use discovery::{ManagerEvent, ModemManager};
pub use error::OfonoError;
pub use types::*;
pub use wire::{DecodeError, TypedValue, WireEnum, WireKind};
