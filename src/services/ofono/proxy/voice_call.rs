//! oFono VoiceCall interface.

use zbus::proxy;

/// A single voice call.
#[proxy(default_service = "org.ofono", interface = "org.ofono.VoiceCall")]
pub trait VoiceCall {
    /// Answer an incoming call.
    fn answer(&self) -> zbus::Result<()>;

    /// Release the call.
    fn hangup(&self) -> zbus::Result<()>;

    /// Deflect an incoming or waiting call to another number.
    fn deflect(&self, number: &str) -> zbus::Result<()>;
}
