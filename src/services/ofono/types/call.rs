use crate::services::ofono::wire::wire_enum;

wire_enum! {
    /// Progress of a voice call.
    pub enum CallState as "call state" {
        /// The call is connected and audio flows.
        Active => "active",
        /// The call is on hold.
        Held => "held",
        /// Outgoing call, not yet alerting the remote party.
        Dialing => "dialing",
        /// Outgoing call, the remote party is being alerted.
        Alerting => "alerting",
        /// Incoming call waiting to be answered.
        Incoming => "incoming",
        /// Incoming call while another call is in progress.
        Waiting => "waiting",
        /// The call has ended; the object is about to be removed.
        Disconnected => "disconnected",
    }
}

impl CallState {
    /// Whether the call can still carry audio or be answered.
    pub fn is_ongoing(self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

wire_enum! {
    /// Which side tore a call down, as reported by the `DisconnectReason` signal.
    pub enum DisconnectReason as "disconnect reason" {
        /// Released by this device.
        Local => "local",
        /// Released by the remote party.
        Remote => "remote",
        /// Dropped by the network.
        Network => "network",
    }
}

wire_enum! {
    /// Calling line identification restriction override for `Dial`.
    pub enum HideCallerId as "caller id mode" {
        /// Follow the network default.
        Default => "default",
        /// Hide the caller id for this call.
        Enabled => "enabled",
        /// Show the caller id for this call.
        Disabled => "disabled",
    }
}
