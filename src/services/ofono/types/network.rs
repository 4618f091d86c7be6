use crate::services::ofono::wire::wire_enum;

wire_enum! {
    /// How the modem selects a network operator.
    pub enum RegistrationMode as "registration mode" {
        /// Automatic selection, manual selection allowed.
        Auto => "auto",
        /// Automatic selection only.
        AutoOnly => "auto-only",
        /// An operator was selected manually.
        Manual => "manual",
    }
}

wire_enum! {
    /// Network registration status.
    pub enum RegistrationStatus as "registration status" {
        /// Not registered and not searching.
        Unregistered => "unregistered",
        /// Registered on the home network.
        Registered => "registered",
        /// Searching for an operator.
        Searching => "searching",
        /// Registration was denied.
        Denied => "denied",
        /// Status could not be determined.
        Unknown => "unknown",
        /// Registered on a roaming network.
        Roaming => "roaming",
    }
}

impl RegistrationStatus {
    /// Whether the modem is attached to a network.
    pub fn is_registered(self) -> bool {
        matches!(self, Self::Registered | Self::Roaming)
    }
}

wire_enum! {
    /// Radio access technology.
    pub enum AccessTechnology as "access technology" {
        /// GSM
        Gsm => "gsm",
        /// EDGE
        Edge => "edge",
        /// UMTS
        Umts => "umts",
        /// HSPA
        Hspa => "hspa",
        /// LTE
        Lte => "lte",
    }
}

wire_enum! {
    /// Availability of an operator found by a scan.
    pub enum OperatorStatus as "operator status" {
        /// Availability unknown.
        Unknown => "unknown",
        /// Operator can be registered with.
        Available => "available",
        /// The modem is registered with this operator.
        Current => "current",
        /// Registration with this operator is forbidden.
        Forbidden => "forbidden",
    }
}
