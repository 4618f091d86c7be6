//! oFono NetworkRegistration interface.

use std::collections::HashMap;
use zbus::{
    proxy,
    zvariant::{OwnedObjectPath, OwnedValue},
};

/// Network registration state of one modem.
#[proxy(default_service = "org.ofono", interface = "org.ofono.NetworkRegistration")]
pub trait NetworkRegistration {
    /// Register with the default operator.
    fn register(&self) -> zbus::Result<()>;

    /// Operators from the last scan, without scanning again.
    fn get_operators(&self) -> zbus::Result<Vec<(OwnedObjectPath, HashMap<String, OwnedValue>)>>;

    /// Scan for operators. May take a long time.
    fn scan(&self) -> zbus::Result<Vec<(OwnedObjectPath, HashMap<String, OwnedValue>)>>;
}
