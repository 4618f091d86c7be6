//! oFono VoiceCallManager interface.

use std::collections::HashMap;
use zbus::{
    proxy,
    zvariant::{ObjectPath, OwnedObjectPath, OwnedValue},
};

/// Call control for one modem.
#[proxy(default_service = "org.ofono", interface = "org.ofono.VoiceCallManager")]
pub trait VoiceCallManager {
    /// List current calls with their properties.
    fn get_calls(&self) -> zbus::Result<Vec<(OwnedObjectPath, HashMap<String, OwnedValue>)>>;

    /// Initiate a new outgoing call.
    ///
    /// # Arguments
    /// * `number` - Number to dial
    /// * `hide_callerid` - "default", "enabled" or "disabled"
    ///
    /// # Returns
    /// Object path of the new call
    fn dial(&self, number: &str, hide_callerid: &str) -> zbus::Result<OwnedObjectPath>;

    /// Redial the last dialed number.
    fn dial_last(&self) -> zbus::Result<OwnedObjectPath>;

    /// Join the held and active calls and disconnect from both.
    fn transfer(&self) -> zbus::Result<()>;

    /// Swap the active and held calls.
    fn swap_calls(&self) -> zbus::Result<()>;

    /// Release the active calls and answer the waiting or held one.
    fn release_and_answer(&self) -> zbus::Result<()>;

    /// Release the active calls and activate the held ones.
    fn release_and_swap(&self) -> zbus::Result<()>;

    /// Put the active calls on hold and answer the waiting one.
    fn hold_and_answer(&self) -> zbus::Result<()>;

    /// Release all calls.
    fn hangup_all(&self) -> zbus::Result<()>;

    /// Split one call off a multiparty call.
    ///
    /// # Returns
    /// Calls that remain in the multiparty call
    fn private_chat(&self, call: &ObjectPath<'_>) -> zbus::Result<Vec<OwnedObjectPath>>;

    /// Join active and held calls into a multiparty call.
    fn create_multiparty(&self) -> zbus::Result<Vec<OwnedObjectPath>>;

    /// Release the multiparty call.
    fn hangup_multiparty(&self) -> zbus::Result<()>;

    /// Send DTMF tones on the active call.
    fn send_tones(&self, tones: &str) -> zbus::Result<()>;
}
