//! oFono D-Bus proxy definitions.
//!
//! oFono does not use `org.freedesktop.DBus.Properties`; every interface
//! carries its own `GetProperties`/`SetProperty`/`PropertyChanged` triple.
//! That triple is identical everywhere and is driven generically by the
//! transport, so the proxies below only declare interface-specific methods.
//! Signals are read from a match-rule stream and decoded by the transport.

#![allow(missing_docs)]
pub mod handsfree;
pub mod manager;
pub mod network_operator;
pub mod network_registration;
pub mod voice_call;
pub mod voice_call_manager;

pub use handsfree::HandsfreeProxy;
pub use manager::ManagerProxy;
pub use network_operator::NetworkOperatorProxy;
pub use network_registration::NetworkRegistrationProxy;
pub use voice_call::VoiceCallProxy;
pub use voice_call_manager::VoiceCallManagerProxy;
