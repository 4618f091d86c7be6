//! Common utilities and abstractions for services

/// In-order event fan-out for mirrors
pub mod events;
/// Reactive property system for fine-grained state updates
pub mod property;

pub use events::{DEFAULT_EVENT_CAPACITY, EventHub, MAX_EVENT_CAPACITY};
pub use property::Property;

#[cfg(test)]
mod tests;
