//! oFono Handsfree interface.

use zbus::proxy;

/// Bluetooth Hands-Free Profile features of an `hfp` modem.
#[proxy(default_service = "org.ofono", interface = "org.ofono.Handsfree")]
pub trait Handsfree {
    /// Ask the audio gateway for a number to attach to a voice tag.
    fn request_phone_number(&self) -> zbus::Result<String>;
}
