//! oFono Manager interface.

use std::collections::HashMap;
use zbus::{
    proxy,
    zvariant::{OwnedObjectPath, OwnedValue},
};

/// Modem directory.
///
/// Lists every modem oFono knows about.
#[proxy(
    default_service = "org.ofono",
    interface = "org.ofono.Manager",
    default_path = "/"
)]
pub trait Manager {
    /// List modems together with their `org.ofono.Modem` properties.
    fn get_modems(&self) -> zbus::Result<Vec<(OwnedObjectPath, HashMap<String, OwnedValue>)>>;
}
