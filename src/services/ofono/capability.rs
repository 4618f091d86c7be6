use std::{collections::HashSet, fmt};

use super::OfonoError;

/// oFono D-Bus interfaces this crate mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interface {
    /// `org.ofono.Manager`, the modem directory at `/`
    Manager,
    /// `org.ofono.Modem`
    Modem,
    /// `org.ofono.VoiceCallManager`
    VoiceCallManager,
    /// `org.ofono.VoiceCall`
    VoiceCall,
    /// `org.ofono.NetworkRegistration`
    NetworkRegistration,
    /// `org.ofono.NetworkOperator`
    NetworkOperator,
    /// `org.ofono.Handsfree`
    Handsfree,
}

impl Interface {
    /// Fully qualified D-Bus interface name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "org.ofono.Manager",
            Self::Modem => "org.ofono.Modem",
            Self::VoiceCallManager => "org.ofono.VoiceCallManager",
            Self::VoiceCall => "org.ofono.VoiceCall",
            Self::NetworkRegistration => "org.ofono.NetworkRegistration",
            Self::NetworkOperator => "org.ofono.NetworkOperator",
            Self::Handsfree => "org.ofono.Handsfree",
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interfaces a modem currently advertises.
///
/// Built on demand from the live `Interfaces` property of a modem mirror and
/// never cached on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    interfaces: HashSet<String>,
}

impl CapabilitySet {
    /// Whether the raw interface name is advertised.
    pub fn contains(&self, interface: &str) -> bool {
        self.interfaces.contains(interface)
    }

    /// Whether a mirrored interface is advertised.
    pub fn supports(&self, interface: Interface) -> bool {
        self.contains(interface.as_str())
    }

    /// Number of advertised interfaces.
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    /// Whether nothing is advertised.
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Advertised interface names, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.interfaces.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            interfaces: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Check that `object` advertises `interface` before anything talks to it.
///
/// # Errors
/// Returns `OfonoError::MissingCapability` when the interface is absent.
pub fn require_capability(
    capabilities: &CapabilitySet,
    object: &str,
    interface: Interface,
) -> Result<(), OfonoError> {
    if capabilities.supports(interface) {
        Ok(())
    } else {
        Err(OfonoError::MissingCapability {
            object: object.to_string(),
            interface,
        })
    }
}
