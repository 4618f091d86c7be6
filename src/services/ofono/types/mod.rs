//! oFono enumerations and their wire spellings.

mod call;
mod modem;
mod network;

pub use call::{CallState, DisconnectReason, HideCallerId};
pub use modem::ModemType;
pub use network::{AccessTechnology, OperatorStatus, RegistrationMode, RegistrationStatus};
