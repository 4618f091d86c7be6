/// Shared reactive building blocks
pub mod common;
/// oFono telephony mirrors
pub mod ofono;

pub use common::{DEFAULT_EVENT_CAPACITY, EventHub, MAX_EVENT_CAPACITY, Property};
pub use ofono::{Bus, Modem, ModemManager, OfonoError};
